use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

pub const ENV_AUTH_MODE: &str = "FLEETGATE_AUTH_MODE";
pub const ENV_SESSION_LIFETIME_HOURS: &str = "FLEETGATE_SESSION_LIFETIME_HOURS";
pub const ENV_DATABASE_URL: &str = "FLEETGATE_DATABASE_URL";
pub const ENV_PORT: &str = "FLEETGATE_PORT";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub security: SecurityConfig,

    pub sessions: SessionConfig,

    pub bootstrap: BootstrapConfig,

    pub observability: ObservabilityConfig,
}

/// Whether the access gate enforces sessions at all.
///
/// `Bypass` must be selected explicitly; a missing setting means `Enforced`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    #[default]
    Enforced,
    Bypass,
}

impl AuthMode {
    /// Parses an operator-supplied value. Only the exact words `enforced`
    /// and `bypass` are accepted.
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim() {
            "enforced" => Ok(Self::Enforced),
            "bypass" => Ok(Self::Bypass),
            other => anyhow::bail!(
                "Invalid auth mode '{other}': expected 'enforced' or 'bypass'"
            ),
        }
    }

    #[must_use]
    pub const fn is_bypass(self) -> bool {
        matches!(self, Self::Bypass)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Argon2 memory cost in KiB (default: 8192 = 8MB)
    pub argon2_memory_cost_kib: u32,

    /// Argon2 time cost (iterations) - higher = more CPU work
    pub argon2_time_cost: u32,

    /// Argon2 parallelism (default: 1)
    pub argon2_parallelism: u32,

    pub auth_mode: AuthMode,

    /// Username reported by the fixed principal injected in bypass mode.
    pub bypass_username: String,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            argon2_memory_cost_kib: 8192,
            argon2_time_cost: 3,
            argon2_parallelism: 1,
            auth_mode: AuthMode::Enforced,
            bypass_username: "auth-bypass".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Lifetime of an issued session (default: 168 = 7 days)
    pub lifetime_hours: u32,

    /// How often expired sessions are swept (default: 60)
    pub sweep_interval_minutes: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            lifetime_hours: 7 * 24,
            sweep_interval_minutes: 60,
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub fn lifetime(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.lifetime_hours))
    }

    #[must_use]
    pub fn sweep_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(u64::from(self.sweep_interval_minutes) * 60)
    }
}

/// Credentials for the first admin account, used only while `users` is empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    pub admin_username: Option<String>,

    #[serde(skip_serializing)]
    pub admin_password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    pub loki_enabled: bool,

    pub loki_url: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,

    pub port: u16,

    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 6790,
            cors_allowed_origins: vec![
                "http://localhost:6790".to_string(),
                "http://127.0.0.1:6790".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_url: String,

    pub log_level: String,

    /// "pretty" or "json"
    pub log_format: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    /// Maximum database connections (default: 5)
    pub max_db_connections: u32,

    /// Minimum database connections (default: 1)
    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:data/fleetgate.db".to_string(),
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

impl Config {
    /// Loads the first config file found, then applies environment overrides.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::load_file()?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    fn load_file() -> Result<Self> {
        for path in &Self::config_paths() {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Applies overrides from `lookup` (normally the process environment).
    /// Empty values are treated as unset.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(mode) = get(ENV_AUTH_MODE) {
            self.security.auth_mode = AuthMode::parse(&mode)
                .with_context(|| format!("Invalid value for {ENV_AUTH_MODE}"))?;
        }

        if let Some(hours) = get(ENV_SESSION_LIFETIME_HOURS) {
            self.sessions.lifetime_hours = hours
                .trim()
                .parse()
                .with_context(|| format!("Invalid value for {ENV_SESSION_LIFETIME_HOURS}"))?;
        }

        if let Some(url) = get(ENV_DATABASE_URL) {
            self.general.database_url = url;
        }

        if let Some(port) = get(ENV_PORT) {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("Invalid value for {ENV_PORT}"))?;
        }

        Ok(())
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("fleetgate").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".fleetgate").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.sessions.lifetime_hours == 0 {
            anyhow::bail!("Session lifetime must be > 0 hours");
        }

        if self.sessions.sweep_interval_minutes == 0 {
            anyhow::bail!("Session sweep interval must be > 0 minutes");
        }

        argon2::Params::new(
            self.security.argon2_memory_cost_kib,
            self.security.argon2_time_cost,
            self.security.argon2_parallelism,
            None,
        )
        .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;

        if self.security.auth_mode.is_bypass() && self.security.bypass_username.trim().is_empty() {
            anyhow::bail!("security.bypass_username cannot be empty in bypass mode");
        }

        if self.bootstrap.admin_username.is_some() != self.bootstrap.admin_password.is_some() {
            anyhow::bail!("bootstrap.admin_username and bootstrap.admin_password must be set together");
        }

        Ok(())
    }
}
