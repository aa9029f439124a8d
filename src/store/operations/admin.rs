use crate::store::error::Result;
use chrono::{DateTime, Utc};
use deadpool_postgres::Pool;

/// The schema applied by [`apply_schema`]
pub const SCHEMA_SQL: &str = include_str!("../schema.sql");

/// Column metadata reported by `check-db`
#[derive(Debug, Clone)]
pub struct ColumnDescription {
    pub name: String,
    pub data_type: String,
    pub max_length: Option<i32>,
    pub nullable: bool,
    pub default: Option<String>,
}

/// Table metadata reported by `check-db`
#[derive(Debug, Clone)]
pub struct TableDescription {
    pub name: String,
    pub columns: Vec<ColumnDescription>,
    pub row_count: i64,
}

/// Create every table, index, function and trigger that is missing
///
/// The script is idempotent and is sent as a single simple-query batch, so a
/// PL/pgSQL body containing semicolons is never split.
pub async fn apply_schema(pool: &Pool) -> Result<()> {
    let conn = pool.get().await?;
    conn.batch_execute(SCHEMA_SQL).await?;
    Ok(())
}

/// Current database time; doubles as a liveness probe
pub async fn server_time(pool: &Pool) -> Result<DateTime<Utc>> {
    let conn = pool.get().await?;
    let row = conn.query_one("SELECT NOW() AS now", &[]).await?;
    Ok(row.try_get("now")?)
}

async fn public_tables(conn: &deadpool_postgres::Object) -> Result<Vec<String>> {
    let rows = conn
        .query(
            "SELECT table_name::text AS table_name
             FROM information_schema.tables
             WHERE table_schema = 'public' AND table_type = 'BASE TABLE'
             ORDER BY table_name",
            &[],
        )
        .await?;
    rows.iter()
        .map(|row| -> Result<String> { Ok(row.try_get("table_name")?) })
        .collect()
}

async fn count_rows(conn: &deadpool_postgres::Object, table: &str) -> Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM \"{}\"", table.replace('"', "\"\""));
    let row = conn.query_one(&sql, &[]).await?;
    Ok(row.try_get(0)?)
}

/// Row counts for every table in the public schema
pub async fn table_row_counts(pool: &Pool) -> Result<Vec<(String, i64)>> {
    let conn = pool.get().await?;
    let mut counts = Vec::new();
    for table in public_tables(&conn).await? {
        let count = count_rows(&conn, &table).await?;
        counts.push((table, count));
    }
    Ok(counts)
}

/// Columns and row counts for every table in the public schema
pub async fn describe_tables(pool: &Pool) -> Result<Vec<TableDescription>> {
    let conn = pool.get().await?;
    let mut tables = Vec::new();

    for table in public_tables(&conn).await? {
        let rows = conn
            .query(
                "SELECT column_name::text AS column_name,
                        data_type::text AS data_type,
                        character_maximum_length::int AS max_length,
                        is_nullable::text AS is_nullable,
                        column_default::text AS column_default
                 FROM information_schema.columns
                 WHERE table_schema = 'public' AND table_name = $1
                 ORDER BY ordinal_position",
                &[&table],
            )
            .await?;

        let columns = rows
            .iter()
            .map(|row| -> Result<ColumnDescription> {
                let nullable: String = row.try_get("is_nullable")?;
                Ok(ColumnDescription {
                    name: row.try_get("column_name")?,
                    data_type: row.try_get("data_type")?,
                    max_length: row.try_get("max_length")?,
                    nullable: nullable == "YES",
                    default: row.try_get("column_default")?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let row_count = count_rows(&conn, &table).await?;
        tables.push(TableDescription {
            name: table,
            columns,
            row_count,
        });
    }

    Ok(tables)
}
