use regex::Regex;
use std::path::PathBuf;
use std::time::Duration;

/// Where the contracts dataset is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// JSON array of row objects keyed by the workbook headers.
    JsonFile(PathBuf),
    /// Postgres table holding one row per contract.
    Postgres { database_url: String, table: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_source: DataSource,
    /// Re-read the dataset after this long. `None` loads it once per process.
    pub table_ttl: Option<Duration>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let data_source = match std::env::var("DATA_FILE")
            .ok()
            .filter(|s| !s.trim().is_empty())
        {
            Some(path) => DataSource::JsonFile(PathBuf::from(path)),
            None => DataSource::Postgres {
                database_url: std::env::var("DB_URL")
                    .or_else(|_| std::env::var("DATABASE_URL"))
                    .map_err(|_| {
                        anyhow::anyhow!(
                            "DATA_FILE, DB_URL or DATABASE_URL environment variable required"
                        )
                    })
                    .and_then(|url| {
                        validate_database_url(&url)?;
                        Ok(url)
                    })?,
                table: std::env::var("DATA_TABLE")
                    .unwrap_or_else(|_| "contratos".to_string())
                    .trim()
                    .to_string(),
            },
        };

        if let DataSource::Postgres { ref table, .. } = data_source {
            validate_table_name(table)?;
        }

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            data_source,
            table_ttl: std::env::var("TABLE_TTL_SECS")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(|secs| {
                    secs.trim()
                        .parse::<u64>()
                        .map(Duration::from_secs)
                        .map_err(|_| anyhow::anyhow!("TABLE_TTL_SECS must be a whole number"))
                })
                .transpose()?,
        };

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        match &config.data_source {
            DataSource::JsonFile(path) => {
                tracing::debug!("Dataset file: {}", path.display())
            }
            DataSource::Postgres {
                database_url,
                table,
            } => {
                tracing::debug!(
                    "Database URL: {}...",
                    &database_url[..20.min(database_url.len())]
                );
                tracing::debug!("Dataset table: {}", table);
            }
        }
        tracing::debug!("Table TTL: {:?}", config.table_ttl);
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }
}

pub fn validate_database_url(url: &str) -> anyhow::Result<()> {
    if url.trim().is_empty() {
        anyhow::bail!("DB_URL cannot be empty");
    }
    if !url.starts_with("postgresql://") && !url.starts_with("postgres://") {
        anyhow::bail!("DB_URL must start with postgresql:// or postgres://");
    }
    Ok(())
}

/// Table names are interpolated into SQL, so only plain (optionally schema-qualified)
/// identifiers are accepted.
pub fn validate_table_name(table: &str) -> anyhow::Result<()> {
    let pattern = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$")?;
    if !pattern.is_match(table) {
        anyhow::bail!("DATA_TABLE must be a plain table name, got {:?}", table);
    }
    Ok(())
}
