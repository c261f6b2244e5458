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
    /// Honor the `X-Forwarded-For` header for client identity. Enable only
    /// behind a trusted reverse proxy; a directly reachable server must not
    /// let clients pick their own throttle bucket.
    pub trust_forwarded_for: bool,
    pub cors: Option<CorsConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

/// Credentials for the seeded administrator account.
#[derive(Debug, Deserialize, Clone)]
pub struct AdminConfig {
    pub usuario: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Failed logins allowed before a client is locked out.
    pub max_login_attempts: u32,
    /// How long a lockout lasts, in seconds.
    pub lockout_seconds: u64,
    /// Optional admin account seeded on startup.
    pub admin: Option<AdminConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Root directory for uploaded images.
    pub root_dir: String,
    /// Maximum upload size in bytes.
    pub max_image_size: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.trust_forwarded_for", false)?
            .set_default("auth.max_login_attempts", 3)?
            .set_default("auth.lockout_seconds", 60)?
            .set_default("storage.root_dir", "./uploads")?
            .set_default("storage.max_image_size", 2 * 1024 * 1024)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., BOTICA__AUTH__JWT_SECRET)
            .add_source(Environment::with_prefix("BOTICA").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
