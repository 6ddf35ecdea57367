//! Client configuration, resolved once at startup and passed to the facade.

/// Base URL used when no environment variable provides one.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3001";

/// Environment variables consulted for the base URL, in priority order.
pub const BASE_URL_VARS: [&str; 3] = [
    "ATTENDANCE_API_BASE",
    "ATTENDANCE_BACKEND_URL",
    "ATTENDANCE_WS_URL",
];

/// Operations the backend may or may not implement.
///
/// A disabled capability turns the matching facade operation into a stub
/// that fails without touching the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendCapabilities {
    pub update_user: bool,
    pub delete_user: bool,
    pub update_attendance: bool,
    pub delete_attendance: bool,
}

impl Default for BackendCapabilities {
    fn default() -> Self {
        Self {
            update_user: true,
            delete_user: true,
            update_attendance: false,
            delete_attendance: false,
        }
    }
}

impl BackendCapabilities {
    /// Every optional operation disabled.
    pub fn read_create_only() -> Self {
        Self {
            update_user: false,
            delete_user: false,
            update_attendance: false,
            delete_attendance: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Absolute base URL without trailing slashes.
    pub base_url: String,
    pub health_path: String,
    pub log_level: String,
    pub capabilities: BackendCapabilities,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            health_path: "/api/health".to_string(),
            log_level: "info".to_string(),
            capabilities: BackendCapabilities::default(),
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration through `lookup` instead of the process
    /// environment. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let base_url = BASE_URL_VARS
            .iter()
            .find_map(|key| var(key))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let mut config = Self::new(&base_url);
        if let Some(path) = var("ATTENDANCE_HEALTH_PATH") {
            config.health_path = path;
        }
        if let Some(level) = var("ATTENDANCE_LOG_LEVEL") {
            config.log_level = level;
        }
        config
    }

    pub fn with_capabilities(mut self, capabilities: BackendCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_health_path(mut self, path: &str) -> Self {
        self.health_path = path.to_string();
        self
    }
}
