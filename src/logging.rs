//! Process-wide logger setup

use std::sync::Once;

/// Logger settings.
///
/// `filter` uses `env_logger` directive syntax, e.g. `"forward_sandbox=debug,wgpu=warn"`.
/// When unset, `RUST_LOG` is consulted, then `info` is used.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: None,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

impl LoggingConfig {
    /// Builder pattern: Set the filter directives
    pub fn with_filter(mut self, filter: &str) -> Self {
        self.filter = Some(filter.to_string());
        self
    }
}

static INIT: Once = Once::new();

/// Installs the global logger. Only the first call has any effect.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();
        match config.filter.or_else(|| std::env::var("RUST_LOG").ok()) {
            Some(filter) => {
                builder.parse_filters(&filter);
            }
            None => {
                builder
                    .filter_level(log::LevelFilter::Info)
                    .filter_module("wgpu_core", log::LevelFilter::Warn)
                    .filter_module("wgpu_hal", log::LevelFilter::Warn);
            }
        }
        builder.write_style(config.write_style);

        if builder.try_init().is_err() {
            log::warn!("A logger was already installed; keeping it");
            return;
        }
        log::debug!("Logging initialised");
    });
}
