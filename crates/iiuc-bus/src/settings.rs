use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Hosted backend URL used by unconfigured deployments.
pub const PLACEHOLDER_BACKEND_URL: &str = "https://placeholder.supabase.co";

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Origin allowed by CORS, or `*` for any.
    pub allowed_origin: String,
}

impl ServerSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
            allowed_origin: "*".into(),
        }
    }
}

/// Client-side limits for hosted backend calls, in seconds.
#[derive(Debug, Clone, Deserialize)]
pub struct TimeoutSettings {
    pub session_secs: u64,
    pub sign_in_secs: u64,
    pub lookup_secs: u64,
    pub profile_secs: u64,
    pub table_secs: u64,
}

impl TimeoutSettings {
    pub fn session(&self) -> Duration {
        Duration::from_secs(self.session_secs)
    }

    pub fn sign_in(&self) -> Duration {
        Duration::from_secs(self.sign_in_secs)
    }

    pub fn lookup(&self) -> Duration {
        Duration::from_secs(self.lookup_secs)
    }

    pub fn profile(&self) -> Duration {
        Duration::from_secs(self.profile_secs)
    }

    pub fn table(&self) -> Duration {
        Duration::from_secs(self.table_secs)
    }
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            session_secs: 8,
            sign_in_secs: 10,
            lookup_secs: 5,
            profile_secs: 10,
            table_secs: 15,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendSettings {
    pub url: String,
    pub anon_key: String,
    /// Public address of the web app, used for auth redirects.
    pub site_url: String,
    pub timeouts: TimeoutSettings,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            url: PLACEHOLDER_BACKEND_URL.into(),
            anon_key: String::new(),
            site_url: "http://localhost:5173".into(),
            timeouts: TimeoutSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssistantSettings {
    pub delay_ms: u64,
    pub jitter_ms: u64,
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            delay_ms: 1000,
            jitter_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    pub profile_ttl_secs: u64,
}

impl CacheSettings {
    pub fn profile_ttl(&self) -> Duration {
        Duration::from_secs(self.profile_ttl_secs)
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            profile_ttl_secs: 5 * 60,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScheduleSettings {
    /// JSON file replacing the bundled timetable.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub backend: BackendSettings,
    pub assistant: AssistantSettings,
    pub cache: CacheSettings,
    #[serde(default)]
    pub schedules: ScheduleSettings,
}

impl Settings {
    /// Reads `config.toml` (if present) and `IIUC_BUS__*` environment variables.
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_file("config.toml")
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("server.allowed_origin", "*")?
            .set_default("backend.url", PLACEHOLDER_BACKEND_URL)?
            .set_default("backend.anon_key", "")?
            .set_default("backend.site_url", "http://localhost:5173")?
            .set_default("backend.timeouts.session_secs", 8)?
            .set_default("backend.timeouts.sign_in_secs", 10)?
            .set_default("backend.timeouts.lookup_secs", 5)?
            .set_default("backend.timeouts.profile_secs", 10)?
            .set_default("backend.timeouts.table_secs", 15)?
            .set_default("assistant.delay_ms", 1000)?
            .set_default("assistant.jitter_ms", 1000)?
            .set_default("cache.profile_ttl_secs", 300)?
            .add_source(
                File::with_name(path)
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(Environment::with_prefix("IIUC_BUS").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
