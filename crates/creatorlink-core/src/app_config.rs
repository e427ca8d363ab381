use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    /// Fully resolved API base URL (override, dev proxy, or production origin).
    pub api_base_url: String,
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub poll_interval_secs: u64,
    pub poll_max_attempts: u32,
    pub login_path: String,
    pub credentials_path: PathBuf,
    pub federated_token: Option<String>,
}

impl AppConfig {
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("api_base_url", &self.api_base_url)
            .field("log_level", &self.log_level)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("poll_interval_secs", &self.poll_interval_secs)
            .field("poll_max_attempts", &self.poll_max_attempts)
            .field("login_path", &self.login_path)
            .field("credentials_path", &self.credentials_path)
            .field(
                "federated_token",
                &self.federated_token.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}
