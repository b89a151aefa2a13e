/// Default service endpoint, overridable via `FORGECTL_ENDPOINT`.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000";

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default bound on concurrent file uploads.
pub const DEFAULT_MAX_UPLOADS: usize = 4;

/// Connection settings for the console client.
///
/// Priority: CLI flag (applied via [`ConsoleConfig::with_endpoint`]) >
/// environment > compiled-in default.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Base URL of the service, without a trailing slash.
    pub endpoint: String,
    pub timeout_secs: u64,
    pub max_concurrent_uploads: usize,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_concurrent_uploads: DEFAULT_MAX_UPLOADS,
        }
    }
}

impl ConsoleConfig {
    /// Build a config from environment overrides, falling back to
    /// defaults. Unparseable numeric overrides fall back silently.
    pub fn from_env() -> Self {
        let endpoint = std::env::var("FORGECTL_ENDPOINT")
            .map(|e| normalize_endpoint(&e))
            .unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        let timeout_secs = env_number("FORGECTL_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS);
        let max_concurrent_uploads = env_number("FORGECTL_MAX_UPLOADS", DEFAULT_MAX_UPLOADS);
        Self {
            endpoint,
            timeout_secs,
            max_concurrent_uploads: max_concurrent_uploads.max(1),
        }
    }

    /// Apply a CLI-level endpoint override.
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = normalize_endpoint(endpoint);
        self
    }
}

fn normalize_endpoint(endpoint: &str) -> String {
    endpoint.trim().trim_end_matches('/').to_string()
}

fn env_number<T: std::str::FromStr>(var: &str, default: T) -> T {
    std::env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
