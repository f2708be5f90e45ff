//! Tracing/logging initialization.

use tracing_subscriber::EnvFilter;

use crate::config::{LogConfig, LogFormat};

/// Initialize tracing/logging from `RUST_LOG` / `PATRON_LOG_FORMAT`.
///
/// A malformed configuration falls back to the defaults and says so once the
/// subscriber is up. Safe to call multiple times (subsequent calls are no-ops).
pub fn init() {
    match LogConfig::from_env() {
        Ok(config) => {
            init_with(&config);
        }
        Err(err) => {
            init_with(&LogConfig::default());
            ::tracing::warn!("invalid log configuration, using defaults: {err:#}");
        }
    }
}

/// Install a subscriber for `config`. Returns `false` if one was already set.
pub fn init_with(config: &LogConfig) -> bool {
    let filter = EnvFilter::try_new(&config.filter).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false);

    let result = match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };
    result.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_is_a_no_op() {
        init();
        init();
        assert!(!init_with(&LogConfig::default()));
    }

    #[test]
    fn init_returns_unit_for_every_configuration() {
        let () = init();
        for format in [LogFormat::Json, LogFormat::Pretty, LogFormat::Compact] {
            let config = LogConfig {
                format,
                ..LogConfig::default()
            };
            assert!(!init_with(&config));
        }
    }
}
