//! Translation of a planned [`SyncAction`] into the child process that carries it out.
use subsync_exec::ProcSpec;
use subsync_model::SyncAction;

use crate::error::CoreError;

pub trait SyncBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether clone actions need a real remote base.
    fn needs_remote(&self) -> bool;

    /// Label recorded in reports for an action handled by this backend.
    fn action_label(&self, action: &SyncAction) -> &'static str {
        action.label()
    }

    fn build(&self, action: &SyncAction) -> Result<ProcSpec, CoreError>;
}

/// Real synchronization through the `git` executable.
#[derive(Debug, Clone)]
pub struct GitBackend {
    program: String,
}

impl GitBackend {
    pub fn new() -> Self {
        Self {
            program: "git".to_string(),
        }
    }
}

impl Default for GitBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncBackend for GitBackend {
    fn name(&self) -> &'static str {
        "git"
    }

    fn needs_remote(&self) -> bool {
        true
    }

    fn build(&self, action: &SyncAction) -> Result<ProcSpec, CoreError> {
        let spec = match action {
            SyncAction::Update { dir } => ProcSpec::new(&self.program).arg("pull").cwd(dir),
            SyncAction::Create { url, dir } => ProcSpec::new(&self.program)
                .arg("clone")
                .arg(url)
                .arg(dir.to_string_lossy()),
            SyncAction::Skip { .. } => {
                return Err(CoreError::Unsupported {
                    backend: self.name(),
                    action: action.label(),
                });
            }
        };
        // Never block on a credential prompt; the child has no terminal input.
        Ok(spec.env("GIT_TERMINAL_PROMPT", "0"))
    }
}

/// Stand-in for git: every unit sleeps a random number of whole seconds.
#[derive(Debug, Clone)]
pub struct DummyBackend {
    max_secs: u64,
}

impl DummyBackend {
    pub const DEFAULT_MAX_SECS: u64 = 9;

    pub fn new(max_secs: u64) -> Self {
        Self { max_secs }
    }
}

impl Default for DummyBackend {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_SECS)
    }
}

impl SyncBackend for DummyBackend {
    fn name(&self) -> &'static str {
        "dummy"
    }

    fn needs_remote(&self) -> bool {
        false
    }

    fn action_label(&self, _action: &SyncAction) -> &'static str {
        "sleep"
    }

    fn build(&self, action: &SyncAction) -> Result<ProcSpec, CoreError> {
        use rand::Rng;

        if action.is_skip() {
            return Err(CoreError::Unsupported {
                backend: self.name(),
                action: action.label(),
            });
        }
        let secs = rand::thread_rng().gen_range(0..=self.max_secs);
        Ok(ProcSpec::new("sleep").arg(secs.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn git_pull_runs_inside_checkout() {
        let spec = GitBackend::new()
            .build(&SyncAction::Update { dir: "root/lib".into() })
            .unwrap();

        assert_eq!(spec.program, "git");
        assert_eq!(spec.args, vec!["pull"]);
        assert_eq!(spec.cwd.as_deref(), Some(std::path::Path::new("root/lib")));
    }

    #[test]
    fn git_clone_targets_item_dir() {
        let spec = GitBackend::new()
            .build(&SyncAction::Create {
                url: "git@host:acme/lib".into(),
                dir: "root/lib".into(),
            })
            .unwrap();

        assert_eq!(spec.program, "git");
        assert_eq!(spec.args, vec!["clone", "git@host:acme/lib", "root/lib"]);
        assert!(spec.cwd.is_none());
        assert!(spec.env.contains(&("GIT_TERMINAL_PROMPT".into(), "0".into())));
    }

    #[test]
    fn skip_is_not_buildable() {
        let skip = SyncAction::Skip { reason: "file".into() };
        assert!(matches!(
            GitBackend::new().build(&skip),
            Err(CoreError::Unsupported { .. })
        ));
        assert!(matches!(
            DummyBackend::default().build(&skip),
            Err(CoreError::Unsupported { .. })
        ));
    }

    #[test]
    fn dummy_sleeps_within_bound() {
        let backend = DummyBackend::new(2);
        for _ in 0..20 {
            let spec = backend.build(&SyncAction::Update { dir: "x".into() }).unwrap();
            assert_eq!(spec.program, "sleep");
            let secs: u64 = spec.args[0].parse().unwrap();
            assert!(secs <= 2);
        }
        assert!(!backend.needs_remote());
    }
}
