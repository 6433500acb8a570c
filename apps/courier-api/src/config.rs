use core_config::{FromEnv, redis::RedisConfig, server::ServerConfig};

// Re-export Environment for use in other modules
pub use core_config::Environment;

/// Application configuration, composed from shared config components.
#[derive(Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub environment: Environment,
    /// Shared token cache backend; in-process caching when absent.
    pub redis: Option<RedisConfig>,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?; // Uses defaults: HOST=0.0.0.0, PORT=8080
        let redis = RedisConfig::from_env().ok(); // Optional - requires REDIS_HOST

        Ok(Self {
            server,
            environment,
            redis,
        })
    }
}
