use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;

/// Configuration for the application
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,

    #[serde(default = "default_max_connections")]
    pub database_max_connections: u32,

    /// Apply pending migrations before the UI starts
    #[serde(default)]
    pub auto_migrate: bool,

    #[serde(default = "default_log_file")]
    pub log_file: String,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Admin sessions end after this many idle minutes
    #[serde(default = "default_session_idle_minutes")]
    pub session_idle_minutes: i64,

    // Booking confirmation mail is disabled unless a server is set
    pub smtp_server: Option<String>,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_from: Option<String>,
}

fn default_max_connections() -> u32 {
    5
}

fn default_log_file() -> String {
    "clinic_manager.log".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_session_idle_minutes() -> i64 {
    30
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// This function will:
    /// 1. Load variables from .env file if it exists
    /// 2. Deserialize environment variables into Config struct
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let config = envy::from_env::<Config>()?;

        Ok(config)
    }

    /// Build a configuration from an explicit set of variables.
    pub fn from_pairs<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Ok(envy::from_iter::<_, Config>(vars)?)
    }

    /// Get a direct reference to the database URL
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn smtp_enabled(&self) -> bool {
        self.smtp_server.as_deref().is_some_and(|s| !s.trim().is_empty())
    }
}

/// Initialize environment variables and load configuration
pub fn init() -> Result<Config> {
    dotenv().ok();

    let config = Config::load()?;

    Ok(config)
}
