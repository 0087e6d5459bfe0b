/// Logger initialization for hosts embedding the renderer
use std::sync::Once;

/// Logger configuration.
///
/// `env_filter` uses the `env_logger` filter syntax (e.g. "warn" or
/// "strata_core=debug"). When unset, `RUST_LOG` is consulted, then `info`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

impl LoggingConfig {
    /// Warn-level, uncoloured output for hosts that draw to the same
    /// terminal the log goes to. `RUST_LOG` still takes precedence.
    pub fn quiet() -> Self {
        Self {
            env_filter: std::env::var("RUST_LOG").ok().or_else(|| Some("warn".to_string())),
            write_style: env_logger::WriteStyle::Never,
        }
    }
}

static INIT: Once = Once::new();

/// Installs the global logger. Later calls are no-ops.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        if let Some(filter) = config.env_filter {
            builder.parse_filters(&filter);
        } else if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        } else {
            builder.filter_level(log::LevelFilter::Info);
        }

        builder.write_style(config.write_style);

        // Another logger may already be installed by the host or a test harness.
        if builder.try_init().is_ok() {
            log::debug!("logging initialized");
        }
    });
}
