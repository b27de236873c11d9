use std::{io::Write, sync::Arc};

use anyhow::Context;
use subsync_core::{
    BatchRunner, DummyBackend, GitBackend, RunnerConfig, ScratchDir, SyncBackend,
    config::SubrepoConfig,
    inspect::{render_dirty, render_list, render_list_json, statuses},
    output::{render_summary, render_summary_json},
    progress::ConsoleProgress,
};
use subsync_model::SyncMode;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::{cli::Cli, exit, signal};

/// Execute the mode selected on the command line and return the process exit status.
pub async fn run(cli: &Cli) -> anyhow::Result<u8> {
    let mode = cli.sync_mode();
    let config = SubrepoConfig::load(&cli.config)?;
    debug!(?mode, root = %config.root.display(), items = config.items.len(), "configuration loaded");

    if mode.launches_units() {
        sync(cli, mode, &config).await
    } else if mode == SyncMode::List {
        list(cli, &config).await
    } else {
        dirty(&config).await
    }
}

async fn list(cli: &Cli, config: &SubrepoConfig) -> anyhow::Result<u8> {
    let rows = statuses(&config.root, &config.items).await;
    let mut out = std::io::stdout().lock();
    if cli.json {
        serde_json::to_writer_pretty(&mut out, &render_list_json(&rows))?;
        writeln!(out)?;
    } else {
        out.write_all(render_list(&rows).as_bytes())?;
    }
    Ok(exit::SUCCESS)
}

async fn dirty(config: &SubrepoConfig) -> anyhow::Result<u8> {
    let rows = statuses(&config.root, &config.items).await;
    std::io::stdout()
        .lock()
        .write_all(render_dirty(&rows).as_bytes())?;
    Ok(exit::SUCCESS)
}

async fn sync(cli: &Cli, mode: SyncMode, config: &SubrepoConfig) -> anyhow::Result<u8> {
    let scratch = ScratchDir::create()
        .context("cannot create log directory")?
        .keep(cli.keep_logs);
    if cli.verbose {
        println!("logs: {}", scratch.path().display());
    }

    let backend: Arc<dyn SyncBackend> = match mode {
        SyncMode::Test => Arc::new(DummyBackend::default()),
        _ => Arc::new(GitBackend::new()),
    };

    let cancel = CancellationToken::new();
    let listener = signal::spawn_listener(cancel.clone());

    let runner_cfg = RunnerConfig {
        jobs: cli.jobs,
        ..RunnerConfig::default()
    };
    let runner = BatchRunner::new(
        runner_cfg,
        backend,
        Arc::new(scratch),
        Arc::new(ConsoleProgress::new(cli.verbose)),
    )
    .with_cancel(cancel);

    let result = runner.run(&config.root, &config.items).await;
    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) => {
            runner.cleanup();
            listener.abort();
            return Err(e.into());
        }
    };

    // Failure tails are read from the logs, so report before cleaning up.
    if cli.json {
        println!("{}", render_summary_json(&outcome.summary)?);
    } else {
        print!("{}", render_summary(&outcome.summary));
    }
    if cli.keep_logs {
        println!("logs kept in {}", runner.scratch().path().display());
    }

    runner.cleanup();
    listener.abort();
    info!(
        ok = outcome.summary.succeeded,
        failed = outcome.summary.failed,
        interrupted = outcome.interrupted,
        "run finished"
    );

    Ok(if outcome.interrupted {
        exit::INTERRUPTED
    } else if outcome.summary.has_failures() {
        exit::FAILURE
    } else {
        exit::SUCCESS
    })
}
