use std::path::PathBuf;
use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "Eye Sense";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Backend the original deployment runs on.
pub const DEFAULT_API_URL: &str = "http://localhost:8090";

/// Upload size ceiling: 10 MiB.
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

const DEFAULT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default `EnvFilter` directive when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "eyesense=debug,eyesense_lib=debug"
    } else {
        "eyesense=info,eyesense_lib=info"
    }
}

/// Get the application data directory.
/// `EYESENSE_DATA_DIR` wins; otherwise ~/EyeSense/ on all platforms.
/// Falls back to the working directory when no home directory is known.
pub fn app_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("EYESENSE_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("EyeSense")
}

/// Directory where generated reports are written.
pub fn exports_dir() -> PathBuf {
    app_data_dir().join("exports")
}

/// Persisted session file (login flag + user email).
pub fn session_file() -> PathBuf {
    app_data_dir().join("session.json")
}

// ═══════════════════════════════════════════════════════════
// Runtime configuration
// ═══════════════════════════════════════════════════════════

/// Backend connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Base URL of the analysis backend, without trailing slash.
    pub api_url: String,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl AppConfig {
    /// Resolve from `EYESENSE_*` environment variables, with defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve using an arbitrary variable lookup (tests inject a map).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("EYESENSE_API_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let timeout_secs = parse_secs(lookup("EYESENSE_TIMEOUT_SECS"), DEFAULT_TIMEOUT_SECS);
        let connect_timeout_secs = parse_secs(
            lookup("EYESENSE_CONNECT_TIMEOUT_SECS"),
            DEFAULT_CONNECT_TIMEOUT_SECS,
        );

        Self {
            api_url: api_url.trim().trim_end_matches('/').to_string(),
            timeout_secs,
            connect_timeout_secs,
        }
    }

    /// Port the backend is expected on, used in connection-failure guidance.
    pub fn api_port(&self) -> Option<u16> {
        reqwest::Url::parse(&self.api_url)
            .ok()
            .and_then(|url| url.port_or_known_default())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

fn parse_secs(raw: Option<String>, default: u64) -> u64 {
    match raw {
        Some(v) => match v.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => secs,
            _ => {
                tracing::warn!(value = %v, default, "Ignoring invalid timeout setting");
                default
            }
        },
        None => default,
    }
}

/// Policy constants of the analysis workflow.
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    /// Largest accepted artifact, inclusive.
    pub max_upload_bytes: u64,
    /// Period of the simulated progress ticker.
    pub progress_tick: Duration,
    /// Upper bound of one random progress increment.
    pub progress_max_increment: f64,
    /// Simulated progress never exceeds this until the call resolves.
    pub progress_cap: f64,
    /// Auto-dismiss delay for ordinary notices.
    pub notice_duration: Duration,
    /// Auto-dismiss delay for connection failures.
    pub connection_notice_duration: Duration,
    /// Delay between hiding a notice and dropping its text.
    pub notice_fade: Duration,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: MAX_UPLOAD_BYTES,
            progress_tick: Duration::from_millis(200),
            progress_max_increment: 15.0,
            progress_cap: 95.0,
            notice_duration: Duration::from_millis(5000),
            connection_notice_duration: Duration::from_millis(8000),
            notice_fade: Duration::from_millis(300),
        }
    }
}
