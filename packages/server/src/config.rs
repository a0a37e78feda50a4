use common::{Locale, MAX_REVISIONS};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// Postgres URL, or `memory:` for the in-process store.
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

/// Editorial rules for categories and posts.
#[derive(Debug, Deserialize, Clone)]
pub struct ContentConfig {
    /// Locales that must be filled in before a record is accepted.
    #[serde(default = "default_required_locales")]
    pub required_locales: Vec<Locale>,
    /// Revisions kept per post.
    #[serde(default = "default_max_revisions")]
    pub max_revisions: usize,
    /// Seconds between scheduled-publish sweeps. Default: 60.
    #[serde(default = "default_publish_sweep_interval_secs")]
    pub publish_sweep_interval_secs: u64,
}

fn default_required_locales() -> Vec<Locale> {
    Locale::ALL.to_vec()
}
fn default_max_revisions() -> usize {
    MAX_REVISIONS
}
fn default_publish_sweep_interval_secs() -> u64 {
    60
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            required_locales: default_required_locales(),
            max_revisions: default_max_revisions(),
            publish_sweep_interval_secs: default_publish_sweep_interval_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub content: ContentConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("database.url", "memory:")?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., LINGUA__AUTH__JWT_SECRET)
            .add_source(Environment::with_prefix("LINGUA").separator("__"))
            .build()?;

        let config: Self = s.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut locales = self.content.required_locales.clone();
        locales.sort();
        locales.dedup();
        if locales.len() < 2 {
            return Err(ConfigError::Message(
                "content.required_locales must name at least two locales".into(),
            ));
        }
        if self.content.max_revisions == 0 {
            return Err(ConfigError::Message(
                "content.max_revisions must be at least 1".into(),
            ));
        }
        if self.content.publish_sweep_interval_secs == 0 {
            return Err(ConfigError::Message(
                "content.publish_sweep_interval_secs must be at least 1".into(),
            ));
        }
        if self.auth.jwt_secret.len() < 16 {
            return Err(ConfigError::Message(
                "auth.jwt_secret must be at least 16 bytes".into(),
            ));
        }
        Ok(())
    }
}
