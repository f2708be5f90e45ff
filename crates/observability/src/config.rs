use core::str::FromStr;

use anyhow::bail;

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    Pretty,
    Compact,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            other => bail!("unknown log format `{other}` (expected json, pretty or compact)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// `EnvFilter` directives, e.g. `info,patron_infra=debug`.
    pub filter: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl LogConfig {
    pub const FILTER_VAR: &'static str = "RUST_LOG";
    pub const FORMAT_VAR: &'static str = "PATRON_LOG_FORMAT";

    /// Read `RUST_LOG` and `PATRON_LOG_FORMAT`; unset variables keep defaults.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Some(filter) = lookup(Self::FILTER_VAR).filter(|f| !f.trim().is_empty()) {
            config.filter = filter;
        }
        if let Some(format) = lookup(Self::FORMAT_VAR) {
            config.format = format.parse()?;
        }

        Ok(config)
    }
}
