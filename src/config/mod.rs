use std::env;

/// Process-wide configuration, loaded once at startup and injected into the
/// app state. Nothing else reads the environment after boot.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub port: u16,
    pub database_url: String,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiry_hours: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV")
            .or_else(|_| env::var("NODE_ENV"))
            .as_deref()
        {
            Ok("production") | Ok("prod") => Environment::Production,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("PORT") {
            self.port = v.parse().unwrap_or(self.port);
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database_url = v;
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.jwt.secret = v;
        }
        if let Ok(v) = env::var("JWT_EXPIRY_HOURS") {
            self.jwt.expiry_hours = v.parse().unwrap_or(self.jwt.expiry_hours);
        }
        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            port: 3000,
            database_url: "postgres://localhost/trailhead_dev".to_string(),
            database: DatabaseConfig { max_connections: 10 },
            jwt: JwtConfig {
                // Override via JWT_SECRET; only a convenience for local runs.
                secret: "trailhead-dev-secret".to_string(),
                expiry_hours: 24 * 90,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            port: 3000,
            database_url: String::new(),
            database: DatabaseConfig { max_connections: 50 },
            jwt: JwtConfig {
                // Empty until JWT_SECRET is provided; signing fails loudly.
                secret: String::new(),
                expiry_hours: 24,
            },
        }
    }
}
