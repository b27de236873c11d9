use std::io::IsTerminal;

use crate::logger::format::LoggerFormat;

/// Environment variable holding an `EnvFilter` directive that overrides the level.
pub const LOG_ENV: &str = "SUBSYNC_LOG";

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub format: LoggerFormat,
    /// `EnvFilter` directive, e.g. `warn` or `subsync_core=debug`.
    pub level: String,
    pub with_targets: bool,
    pub use_color: bool,
}

impl LoggerConfig {
    /// Quiet by default; `verbose` opens up debug diagnostics.
    pub fn for_verbosity(verbose: bool) -> Self {
        Self {
            level: if verbose { "debug" } else { "warn" }.to_string(),
            ..Self::default()
        }
    }

    /// Replace the level with the `SUBSYNC_LOG` value when it is set and non-empty.
    pub fn with_env_override(mut self) -> Self {
        if let Ok(level) = std::env::var(LOG_ENV)
            && !level.trim().is_empty()
        {
            self.level = level;
        }
        self
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        let use_color = std::io::stderr().is_terminal();
        Self {
            format: LoggerFormat::Text,
            level: "warn".to_string(),
            with_targets: false,
            use_color,
        }
    }
}
