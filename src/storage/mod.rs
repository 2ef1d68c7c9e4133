use crate::models::CleanedProduct;
use anyhow::{Context, Result, bail};
use duckdb::{Connection, params};
use std::path::Path;
use tracing::info;

// ── Repository ────────────────────────────────────────────────────────────────

pub struct Repository {
    conn: Connection,
}

impl Repository {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Could not create dir {:?}", parent))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open DuckDB at {:?}", path))?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self { conn: Connection::open_in_memory()? })
    }

    // ── Products ──────────────────────────────────────────────────────────────

    /// Drop and recreate `table`, then insert every product. One transaction,
    /// so a failed load leaves the previous table in place.
    pub fn replace_products(&self, table: &str, products: &[CleanedProduct]) -> Result<usize> {
        let table = checked_table_name(table)?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute_batch(&format!(
            r#"
            DROP TABLE IF EXISTS {table};
            CREATE TABLE {table} (
                title       VARCHAR   NOT NULL,
                price       DOUBLE    NOT NULL,
                rating      DOUBLE    NOT NULL,
                colors      UBIGINT   NOT NULL,
                size        VARCHAR   NOT NULL,
                gender      VARCHAR   NOT NULL,
                "timestamp" TIMESTAMP NOT NULL
            );
            "#
        ))
        .with_context(|| format!("recreate table {}", table))?;

        let sql = format!(
            r#"INSERT INTO {table} (title, price, rating, colors, size, gender, "timestamp")
               VALUES (?, ?, ?, ?, ?, ?, ?)"#
        );
        for p in products {
            tx.execute(&sql, params![
                p.title, p.price, p.rating, p.colors,
                p.size, p.gender, p.timestamp,
            ]).with_context(|| format!("insert product {:?}", p.title))?;
        }

        tx.commit()?;
        info!("{}: {} rows written", table, products.len());
        Ok(products.len())
    }

    pub fn product_count(&self, table: &str) -> Result<i64> {
        let table = checked_table_name(table)?;
        let mut s = self.conn.prepare(&format!("SELECT COUNT(*) FROM {table}"))?;
        Ok(s.query_row([], |r| r.get(0))?)
    }

    pub fn price_range(&self, table: &str) -> Result<(Option<f64>, Option<f64>)> {
        let table = checked_table_name(table)?;
        let mut s = self.conn.prepare(&format!("SELECT MIN(price), MAX(price) FROM {table}"))?;
        Ok(s.query_row([], |r| Ok((r.get(0)?, r.get(1)?)))?)
    }
}

/// Table names are spliced into SQL, so only plain identifiers pass.
fn checked_table_name(name: &str) -> Result<&str> {
    let mut chars = name.chars();
    let ok = chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !ok {
        bail!("invalid table name {:?}", name);
    }
    Ok(name)
}
