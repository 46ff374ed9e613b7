use crate::config::DataSource;
use crate::db::Database;
use crate::errors::{AppError, ResultExt};
use crate::models::{Column, Record, RecordTable};
use bigdecimal::BigDecimal;
use serde_json::{Map, Value};
use sqlx::{PgPool, Row};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Reads the contracts dataset into a `RecordTable`.
///
/// Only the identifier column is mandatory; every other expected column that the
/// source lacks is recorded as missing and left out of the output downstream.
pub enum TableLoader {
    JsonFile(PathBuf),
    Postgres { pool: PgPool, table: String },
}

impl TableLoader {
    pub async fn connect(source: &DataSource) -> anyhow::Result<Self> {
        match source {
            DataSource::JsonFile(path) => Ok(TableLoader::JsonFile(path.clone())),
            DataSource::Postgres {
                database_url,
                table,
            } => {
                let db = Database::new(database_url).await?;
                tracing::info!("Database connection pool established");
                Ok(TableLoader::Postgres {
                    pool: db.pool,
                    table: table.clone(),
                })
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            TableLoader::JsonFile(path) => path.display().to_string(),
            TableLoader::Postgres { table, .. } => format!("postgres:{}", table),
        }
    }

    pub async fn load(&self) -> Result<RecordTable, AppError> {
        let table = match self {
            TableLoader::JsonFile(path) => load_json_file(path).await,
            TableLoader::Postgres { pool, table } => load_postgres_table(pool, table).await,
        }
        .with_context(|| format!("Loading dataset from {}", self.describe()))?;

        let missing = table.missing_columns();
        if !missing.is_empty() {
            tracing::warn!(
                "Dataset {} lacks column(s) {:?}; they will be omitted",
                table.source,
                missing.iter().map(|c| c.source_name()).collect::<Vec<_>>()
            );
        }
        tracing::info!(
            "✓ Loaded {} record(s) from {} (fingerprint {})",
            table.len(),
            table.source,
            &table.fingerprint[..12]
        );

        Ok(table)
    }
}

// ============ JSON ============

async fn load_json_file(path: &Path) -> Result<RecordTable, AppError> {
    let content = tokio::fs::read_to_string(path).await?;
    let rows: Vec<Map<String, Value>> = serde_json::from_str(&content)?;
    table_from_json_rows(rows, path.display().to_string())
}

/// Build a table from JSON row objects keyed by the workbook headers.
///
/// A column counts as present when any row carries its key.
pub fn table_from_json_rows(
    rows: Vec<Map<String, Value>>,
    source: impl Into<String>,
) -> Result<RecordTable, AppError> {
    let columns: BTreeSet<Column> = Column::ALL
        .into_iter()
        .filter(|c| rows.iter().any(|row| row.contains_key(c.source_name())))
        .collect();
    require_identifier(&columns)?;

    let records = rows
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            record_from_cells(idx, |column| {
                row.get(column.source_name()).and_then(json_cell_text)
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RecordTable::new(columns, records, source))
}

fn json_cell_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        // keeps float artifacts such as "310555.0" for the phone normalizer
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

// ============ Postgres ============

/// Expected columns the table actually has, from `information_schema`.
pub async fn present_columns(pool: &PgPool, table: &str) -> Result<BTreeSet<Column>, AppError> {
    let (schema, name) = table.split_once('.').unwrap_or(("public", table));

    let names: Vec<(String,)> = sqlx::query_as(
        "SELECT column_name::text FROM information_schema.columns WHERE table_schema = $1 AND table_name = $2 ORDER BY ordinal_position",
    )
    .bind(schema)
    .bind(name)
    .fetch_all(pool)
    .await
    .context("Inspecting dataset columns")?;

    if names.is_empty() {
        return Err(AppError::DataSource(format!(
            "table {} not found or has no columns",
            table
        )));
    }

    Ok(Column::ALL
        .into_iter()
        .filter(|c| names.iter().any(|(n,)| n == c.source_name()))
        .collect())
}

async fn load_postgres_table(pool: &PgPool, table: &str) -> Result<RecordTable, AppError> {
    let columns = present_columns(pool, table).await?;
    require_identifier(&columns)?;

    // every present column is read as text; absent ones are never selected
    let selected: Vec<Column> = columns.iter().copied().collect();
    let select_list = selected
        .iter()
        .map(|c| format!("\"{}\"::text", c.source_name()))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!("SELECT {} FROM {}", select_list, quote_table(table));

    let rows = sqlx::query(&sql)
        .fetch_all(pool)
        .await
        .context("Reading dataset rows")?;

    let records = rows
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            record_from_cells(idx, |column| {
                let pos = selected.iter().position(|c| *c == column)?;
                row.try_get::<Option<String>, _>(pos).ok().flatten()
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RecordTable::new(columns, records, format!("postgres:{}", table)))
}

fn quote_table(table: &str) -> String {
    table
        .split('.')
        .map(|part| format!("\"{}\"", part))
        .collect::<Vec<_>>()
        .join(".")
}

// ============ Shared ============

fn require_identifier(columns: &BTreeSet<Column>) -> Result<(), AppError> {
    if columns.contains(&Column::Identifier) {
        Ok(())
    } else {
        Err(AppError::DataSource(format!(
            "required column {} is missing",
            Column::Identifier.source_name()
        )))
    }
}

/// Build a record from a cell accessor returning the raw text of each column.
fn record_from_cells(
    row: usize,
    cell: impl Fn(Column) -> Option<String>,
) -> Result<Record, AppError> {
    let amount = |column: Column| -> Result<BigDecimal, AppError> {
        match cell(column) {
            Some(raw) if !raw.trim().is_empty() => {
                BigDecimal::from_str(raw.trim()).map_err(|_| {
                    AppError::DataSource(format!(
                        "row {}: {} is not a number: {:?}",
                        row + 1,
                        column.source_name(),
                        raw
                    ))
                })
            }
            _ => Ok(BigDecimal::from(0)),
        }
    };

    Ok(Record {
        identifier: cell(Column::Identifier).unwrap_or_default(),
        subscriber_name: cell(Column::SubscriberName).unwrap_or_default(),
        last_phone: cell(Column::LastPhone),
        segment: cell(Column::Segment),
        locality: cell(Column::Locality).unwrap_or_default(),
        subcategory: cell(Column::Subcategory).unwrap_or_default(),
        location: cell(Column::Location).unwrap_or_default(),
        last_purchase_line: cell(Column::LastPurchaseLine),
        contract: cell(Column::Contract).unwrap_or_default(),
        assigned_quota: amount(Column::AssignedQuota)?,
        used_quota: amount(Column::UsedQuota)?,
        available_quota: amount(Column::AvailableQuota)?,
    })
}
