use std::env;

use sea_orm::ConnectOptions;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub profile: String,
    pub seed_demo: bool,
}

impl Config {
    pub fn from_env() -> Self {
        let profile = env::var("PROFILE").unwrap_or_else(|_| "default".to_string());

        let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| {
            if profile == "default" {
                "sqlite://userbase.db?mode=rwc".to_string()
            } else {
                format!("sqlite://userbase_{}.db?mode=rwc", profile)
            }
        });

        Self {
            database_url,
            max_connections: env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|n| n.parse().ok())
                .unwrap_or(10),
            profile,
            seed_demo: env::var("SEED_DEMO").is_ok(),
        }
    }

    /// Pool options for the configured store
    pub fn connect_options(&self) -> ConnectOptions {
        let mut options = ConnectOptions::new(self.database_url.clone());
        options
            .max_connections(self.max_connections)
            .sqlx_logging(false);
        options
    }
}
