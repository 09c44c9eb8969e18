//! Application configuration loaded from environment variables.

use projections::FailurePolicy;

/// Output format for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format `{other}` (expected text or json)")),
        }
    }
}

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT`: `text` or `json` (default: `text`)
/// - `PROJECTION_FAILURE_POLICY`: `halt` or `skip` (default: `halt`)
///
/// Unparseable values fall back to the default with a warning on stderr,
/// since logging is not set up yet when configuration is read.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub failure_policy: FailurePolicy,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            log_format: parse_or(lookup("LOG_FORMAT"), "LOG_FORMAT", defaults.log_format),
            failure_policy: parse_or(
                lookup("PROJECTION_FAILURE_POLICY"),
                "PROJECTION_FAILURE_POLICY",
                defaults.failure_policy,
            ),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            failure_policy: FailurePolicy::Halt,
        }
    }
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr<Err = String>,
{
    match value.map(|v| v.parse::<T>()) {
        Some(Ok(parsed)) => parsed,
        Some(Err(err)) => {
            eprintln!("ignoring {key}: {err}");
            default
        }
        None => default,
    }
}
