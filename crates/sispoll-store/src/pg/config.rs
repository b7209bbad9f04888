//! Connection settings

use std::time::Duration;

use sispoll_core_types::Sensitive;

pub const DEFAULT_PORT: u16 = 5432;
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(20);

/// Where the Postgres baseline lives
#[derive(Debug, Clone)]
pub struct PgSettings {
    pub user: String,
    pub password: Sensitive<String>,
    pub database: String,
    pub host: String,
    pub port: u16,
    /// Schema put on the `search_path`; the server default when `None`
    pub schema: Option<String>,
    pub connect_timeout: Duration,
}

impl PgSettings {
    pub fn new(user: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: Sensitive::default(),
            database: database.into(),
            host: "localhost".to_string(),
            port: DEFAULT_PORT,
            schema: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    pub fn with_password(mut self, password: Sensitive<String>) -> Self {
        self.password = password;
        self
    }

    pub fn with_host(mut self, host: impl Into<String>, port: u16) -> Self {
        self.host = host.into();
        self.port = port;
        self
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        let schema = schema.into();
        self.schema = (!schema.trim().is_empty()).then_some(schema);
        self
    }

    /// Human-readable target for log lines; never includes the password
    pub fn describe(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{}@{}:{}/{}.{}", self.user, self.host, self.port, self.database, schema),
            None => format!("{}@{}:{}/{}", self.user, self.host, self.port, self.database),
        }
    }

    pub fn to_config(&self) -> postgres::Config {
        let mut config = postgres::Config::new();
        config
            .user(self.user.as_str())
            .dbname(self.database.as_str())
            .host(self.host.as_str())
            .port(self.port)
            .connect_timeout(self.connect_timeout)
            .application_name("sispoll");
        if !self.password.is_empty() {
            config.password(self.password.expose().as_str());
        }
        config
    }
}

/// Quote an SQL identifier for use in `SET search_path`
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
