//! Utility to inspect the dataset table and report which expected columns it carries.

use dotenvy::dotenv;
use rust_cupos_api::config::validate_table_name;
use rust_cupos_api::loader::present_columns;
use rust_cupos_api::models::Column;
use sqlx::postgres::PgPoolOptions;
use std::env;

/// Main entry point for the table inspection utility.
///
/// Lists every column of `DATA_TABLE` and flags the expected ones that are missing,
/// which the lookup service will leave out of its responses.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    let database_url = env::var("DATABASE_URL").or_else(|_| env::var("DB_URL"))?;
    let table = env::var("DATA_TABLE").unwrap_or_else(|_| "contratos".to_string());
    validate_table_name(&table).map_err(|e| e.to_string())?;

    let pool = PgPoolOptions::new().connect(&database_url).await?;
    let (schema, name) = table.split_once('.').unwrap_or(("public", table.as_str()));

    let columns: Vec<(String, String)> = sqlx::query_as(
        "SELECT column_name::text, data_type::text FROM information_schema.columns WHERE table_schema = $1 AND table_name = $2 ORDER BY ordinal_position"
    )
    .bind(schema)
    .bind(name)
    .fetch_all(&pool)
    .await?;

    println!("Table {}:", table);
    for (col, type_) in &columns {
        println!("  - {}: {}", col, type_);
    }
    println!();

    let present = present_columns(&pool, &table).await?;
    for column in Column::ALL {
        let mark = if present.contains(&column) { "✓" } else { "✗" };
        println!("{} {}", mark, column.source_name());
    }

    Ok(())
}
