use time::{UtcOffset, format_description::well_known::Rfc3339};
use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, fmt::time::OffsetTime, layer::SubscriberExt,
};

use crate::logger::{config::LoggerConfig, error::LoggerError, format::LoggerFormat};

type OutputLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Install the global subscriber: one output layer chosen by format, gated by the filter.
pub(crate) fn install(cfg: &LoggerConfig) -> Result<(), LoggerError> {
    let filter = mk_filter(&cfg.level)?;
    let output = output_layer(cfg)?;
    let subscriber = tracing_subscriber::registry().with(output.with_filter(filter));

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|_: tracing::subscriber::SetGlobalDefaultError| LoggerError::AlreadyInitialized)
}

/// Text and JSON diagnostics go to stderr: stdout carries list output, progress and the
/// run summary, which scripts read.
fn output_layer(cfg: &LoggerConfig) -> Result<OutputLayer, LoggerError> {
    let layer = match cfg.format {
        LoggerFormat::Text => fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(cfg.use_color)
            .with_target(cfg.with_targets)
            .with_timer(mk_timer())
            .boxed(),
        LoggerFormat::Json => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_ansi(false)
            .with_target(cfg.with_targets)
            .with_timer(mk_timer())
            .boxed(),
        LoggerFormat::Journald => journald_layer()?,
    };
    Ok(layer)
}

fn mk_filter(level: &str) -> Result<EnvFilter, LoggerError> {
    EnvFilter::try_new(level).map_err(|_| LoggerError::InvalidLogLevel(level.to_string()))
}

// Local offset lookup can fail once threads exist; UTC is the fallback.
fn mk_timer() -> OffsetTime<Rfc3339> {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    OffsetTime::new(offset, Rfc3339)
}

#[cfg(all(target_os = "linux", feature = "journald"))]
fn journald_layer() -> Result<OutputLayer, LoggerError> {
    let layer = tracing_journald::layer()
        .map_err(|e| LoggerError::InitializationFailed(format!("journald: {e}")))?
        .with_syslog_identifier("subsync".to_string());
    Ok(layer.boxed())
}

#[cfg(not(all(target_os = "linux", feature = "journald")))]
fn journald_layer() -> Result<OutputLayer, LoggerError> {
    Err(LoggerError::JournaldNotSupported)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(format: LoggerFormat) -> LoggerConfig {
        LoggerConfig {
            format,
            ..LoggerConfig::for_verbosity(false)
        }
    }

    #[test]
    fn rejects_malformed_filter() {
        let err = mk_filter("subsync=loud").unwrap_err();
        assert!(matches!(err, LoggerError::InvalidLogLevel(_)));
    }

    #[test]
    fn accepts_directives() {
        assert!(mk_filter("warn").is_ok());
        assert!(mk_filter("subsync_core=debug,warn").is_ok());
    }

    #[test]
    fn builds_text_and_json_layers() {
        assert!(output_layer(&cfg(LoggerFormat::Text)).is_ok());
        assert!(output_layer(&cfg(LoggerFormat::Json)).is_ok());
    }

    #[cfg(not(feature = "journald"))]
    #[test]
    fn journald_needs_the_feature() {
        let err = output_layer(&cfg(LoggerFormat::Journald)).err().unwrap();
        assert!(matches!(err, LoggerError::JournaldNotSupported));
    }

    #[test]
    fn second_install_reports_already_initialized() {
        let cfg = cfg(LoggerFormat::Text);
        // Only this test installs a global subscriber in this binary.
        install(&cfg).unwrap();
        let err = install(&cfg).unwrap_err();
        assert!(matches!(err, LoggerError::AlreadyInitialized));
    }
}
