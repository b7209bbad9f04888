//! Shared command-line configuration
//!
//! Flags fall back to the environment variables the poller has always read,
//! so cron entries can keep credentials out of the command line.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, ValueEnum};
use serde::Deserialize;
use sispoll_core::baseline::BaselineStore;
use sispoll_core::errors::{ExError, ExErrorKind, Result};
use sispoll_core::fetch::SourceDescriptor;
use sispoll_core::notify::DEFAULT_TOPIC;
use sispoll_core_types::Sensitive;
use sispoll_remote::ApiGatewayNotifier;
use sispoll_store::pg::DEFAULT_PORT;
use sispoll_store::{PgBaselineStore, PgSettings, SqliteBaselineStore};

pub const DEFAULT_DB_FILE: &str = "sis_poller.sqlite3";
pub const DEFAULT_STATION_XML_URL: &str =
    "https://files.anss-sis.scsn.org/production/FDSNStationXML1.1/";

const IW_KEEP: [&str; 8] = [
    "FLWY", "IMW", "LOHW", "MOOW", "REDW", "RWWY", "SNOW", "TPAW",
];
const US_KEEP: [&str; 12] = [
    "AHID", "BOZ", "BW06", "DUG", "ELK", "HLID", "HWUT", "ISCO", "LKWY", "MVCO", "TPNV", "WUAZ",
];

fn config_error(op: &str, message: impl Into<String>) -> ExError {
    ExError::new(ExErrorKind::InvalidConfig)
        .with_op(op)
        .with_message(message)
}

fn parse_sensitive(value: &str) -> std::result::Result<Sensitive<String>, String> {
    Ok(Sensitive::new(value.to_string()))
}

/// Which database holds the baseline
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    Sqlite,
    Postgres,
}

/// Location of the baseline database
#[derive(Debug, Args)]
pub struct StoreArgs {
    /// Database backend holding the baseline
    #[arg(long, env = "SIS_POLLER_BACKEND", value_enum, default_value_t = Backend::Sqlite)]
    pub backend: Backend,

    /// SQLite file holding the baseline
    #[arg(long, env = "SIS_POLLER_SQLITE3_FILE", default_value = DEFAULT_DB_FILE)]
    pub db: PathBuf,

    #[command(flatten)]
    pub postgres: PostgresArgs,
}

/// Postgres connection, read from the poller's environment
#[derive(Debug, Args)]
pub struct PostgresArgs {
    /// Postgres user with read/write access to the baseline
    #[arg(long, env = "SIS_POLLER_READ_WRITE_USER")]
    pub pg_user: Option<String>,

    /// Password for --pg-user
    #[arg(long, env = "SIS_POLLER_READ_WRITE_PASSWORD", hide_env_values = true, value_parser = parse_sensitive)]
    pub pg_password: Option<Sensitive<String>>,

    /// Postgres database name
    #[arg(long, env = "SIS_POLLER_DATABASE")]
    pub pg_database: Option<String>,

    /// Postgres host
    #[arg(long, env = "SIS_POLLER_HOST", default_value = "localhost")]
    pub pg_host: String,

    /// Postgres port
    #[arg(long, env = "SIS_POLLER_PORT", default_value_t = DEFAULT_PORT)]
    pub pg_port: u16,

    /// Schema holding the xml_update table
    #[arg(long, env = "SIS_POLLER_SCHEMA")]
    pub pg_schema: Option<String>,
}

impl PostgresArgs {
    /// Validated connection settings.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the user or database is missing.
    pub fn settings(&self) -> Result<PgSettings> {
        let required = |value: &Option<String>, what: &str| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .ok_or_else(|| config_error("store_config", format!("{} is not set", what)))
        };
        let user = required(&self.pg_user, "--pg-user / SIS_POLLER_READ_WRITE_USER")?;
        let database = required(&self.pg_database, "--pg-database / SIS_POLLER_DATABASE")?;

        let mut settings = PgSettings::new(user, database).with_host(self.pg_host.clone(), self.pg_port);
        if let Some(password) = &self.pg_password {
            settings = settings.with_password(password.clone());
        }
        if let Some(schema) = &self.pg_schema {
            settings = settings.with_schema(schema.clone());
        }
        Ok(settings)
    }
}

/// Store selection after validation; nothing is opened yet
#[derive(Debug)]
pub enum StoreTarget {
    Sqlite(PathBuf),
    Postgres(PgSettings),
}

impl StoreArgs {
    /// Validate the selected backend's settings.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the Postgres settings are incomplete.
    pub fn target(&self) -> Result<StoreTarget> {
        match self.backend {
            Backend::Sqlite => Ok(StoreTarget::Sqlite(self.db.clone())),
            Backend::Postgres => self.postgres.settings().map(StoreTarget::Postgres),
        }
    }
}

impl StoreTarget {
    /// Open an initialized baseline
    pub fn open(&self) -> Result<Box<dyn BaselineStore>> {
        let store: Box<dyn BaselineStore> = match self {
            StoreTarget::Sqlite(path) => Box::new(SqliteBaselineStore::open(path)?),
            StoreTarget::Postgres(settings) => Box::new(PgBaselineStore::open(settings)?),
        };
        tracing::info!(db = %self, "Opened baseline store");
        Ok(store)
    }

    /// Open the baseline, creating its table if needed
    pub fn create(&self) -> Result<Box<dyn BaselineStore>> {
        let store: Box<dyn BaselineStore> = match self {
            StoreTarget::Sqlite(path) => Box::new(SqliteBaselineStore::create(path)?),
            StoreTarget::Postgres(settings) => Box::new(PgBaselineStore::create(settings)?),
        };
        tracing::info!(db = %self, "Initializing baseline store");
        Ok(store)
    }
}

impl std::fmt::Display for StoreTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreTarget::Sqlite(path) => write!(f, "sqlite:{}", path.display()),
            StoreTarget::Postgres(settings) => write!(f, "postgres:{}", settings.describe()),
        }
    }
}

/// Where snapshots are fetched from
#[derive(Debug, Args)]
pub struct SourceArgs {
    /// TOML file with `[[sources]]` tables (network, url, keep); replaces the
    /// built-in UU, WY, IW and US sources
    #[arg(long)]
    pub sources: Option<PathBuf>,

    /// Base URL of the SIS StationXML listings
    #[arg(long, default_value = DEFAULT_STATION_XML_URL)]
    pub station_xml_url: String,

    #[command(flatten)]
    pub http: HttpArgs,
}

/// Settings shared by every outbound HTTP client
#[derive(Debug, Args)]
pub struct HttpArgs {
    /// Per-request HTTP timeout in seconds
    #[arg(long, default_value_t = 20)]
    pub http_timeout_secs: u64,
}

impl HttpArgs {
    /// Validated per-request timeout.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the timeout is zero.
    pub fn timeout(&self) -> Result<Duration> {
        if self.http_timeout_secs == 0 {
            return Err(config_error("http_config", "--http-timeout-secs must be positive"));
        }
        Ok(Duration::from_secs(self.http_timeout_secs))
    }
}

impl SourceArgs {
    /// Resolve the configured sources.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the sources file is unreadable or invalid.
    pub fn load(&self) -> Result<Vec<SourceDescriptor>> {
        match &self.sources {
            Some(path) => load_sources_file(path),
            None => Ok(builtin_sources(&self.station_xml_url)),
        }
    }
}

/// Default networks polled under `base_url`
pub fn builtin_sources(base_url: &str) -> Vec<SourceDescriptor> {
    let url = |net: &str| format!("{}/{}/", base_url.trim_end_matches('/'), net);
    vec![
        SourceDescriptor::new("UU", url("UU")),
        SourceDescriptor::new("WY", url("WY")),
        SourceDescriptor::new("IW", url("IW")).with_keep(IW_KEEP),
        SourceDescriptor::new("US", url("US")).with_keep(US_KEEP),
    ]
}

#[derive(Debug, Deserialize)]
struct SourcesFile {
    #[serde(default)]
    sources: Vec<SourceDescriptor>,
}

/// Parse sources from TOML text
pub fn parse_sources(text: &str) -> Result<Vec<SourceDescriptor>> {
    let file: SourcesFile =
        toml::from_str(text).map_err(|e| config_error("load_sources", e.to_string()))?;
    if file.sources.is_empty() {
        return Err(config_error("load_sources", "no [[sources]] configured"));
    }
    for source in &file.sources {
        if source.network.trim().is_empty() || source.url.trim().is_empty() {
            return Err(config_error(
                "load_sources",
                "every source needs a network and a url",
            ));
        }
    }
    Ok(file.sources)
}

fn load_sources_file(path: &Path) -> Result<Vec<SourceDescriptor>> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        config_error(
            "load_sources",
            format!("cannot read {}: {}", path.display(), e),
        )
    })?;
    parse_sources(&text)
}

/// E-mail API gateway settings
#[derive(Debug, Args)]
pub struct NotifyArgs {
    /// URL of the e-mail API gateway
    #[arg(long, env = "AWS_API_SIS_URL")]
    pub email_url: Option<String>,

    /// API key for the e-mail API gateway
    #[arg(long, env = "AWS_API_SIS_ACCESS_KEY", hide_env_values = true, value_parser = parse_sensitive)]
    pub email_api_key: Option<Sensitive<String>>,

    /// Notification topic (production or test)
    #[arg(long, default_value = DEFAULT_TOPIC)]
    pub email_topic: String,
}

impl NotifyArgs {
    /// Build the gateway notifier.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the URL, key or topic is missing.
    pub fn notifier(&self, timeout: Duration) -> Result<ApiGatewayNotifier> {
        let url = self
            .email_url
            .as_deref()
            .ok_or_else(|| config_error("notifier_config", "--email-url / AWS_API_SIS_URL is not set"))?;
        let key = self.email_api_key.clone().ok_or_else(|| {
            config_error(
                "notifier_config",
                "--email-api-key / AWS_API_SIS_ACCESS_KEY is not set",
            )
        })?;
        if self.email_topic.trim().is_empty() {
            return Err(config_error("notifier_config", "--email-topic is empty"));
        }
        ApiGatewayNotifier::new(url, key, timeout)
    }
}
