//! Query writer: schema DDL and criteria selects.
//!
//! The fluid schema is adjusted through this module only. Every identifier
//! that reaches these functions has been validated, so names can be embedded
//! into the generated SQL directly.

use rusqlite::Connection;

use fluidbean_common::{Error, Result};

use crate::bean::check_identifier;

/// SQLite reports missing schema through its error message rather than an
/// SQLSTATE; find-style operations treat these as an empty result.
pub(crate) fn is_missing_schema(err: &rusqlite::Error) -> bool {
    let msg = err.to_string();
    msg.contains("no such table") || msg.contains("no such column")
}

pub(crate) fn db_err(err: rusqlite::Error) -> Error {
    Error::database(err.to_string())
}

/// Whether a table exists.
pub fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = :name",
            rusqlite::named_params! { ":name": table },
            |row| row.get(0),
        )
        .map_err(db_err)?;
    Ok(count > 0)
}

/// Whether a column exists on a table.
pub fn column_exists(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM pragma_table_info(:table) WHERE name = :column",
            rusqlite::named_params! { ":table": table, ":column": column },
            |row| row.get(0),
        )
        .map_err(db_err)?;
    Ok(count > 0)
}

/// Create a bean table with only its id column.
pub fn create_table(conn: &Connection, table: &str) -> Result<()> {
    check_identifier(table)?;
    let sql = format!(
        "CREATE TABLE IF NOT EXISTS \"{}\" (id INTEGER PRIMARY KEY AUTOINCREMENT)",
        table
    );
    conn.execute_batch(&sql).map_err(db_err)?;
    tracing::debug!(table, "created table");
    Ok(())
}

/// Add a column to an existing table. SQLite columns are dynamically typed,
/// so no declared type is needed.
pub fn add_column(conn: &Connection, table: &str, column: &str) -> Result<()> {
    check_identifier(table)?;
    check_identifier(column)?;
    let sql = format!("ALTER TABLE \"{}\" ADD COLUMN \"{}\"", table, column);
    conn.execute_batch(&sql).map_err(db_err)?;
    tracing::debug!(table, column, "added column");
    Ok(())
}

/// Apply a uniqueness build hint as a unique index over the given columns.
/// Columns that are not present on the table yet are added first.
pub fn apply_unique_hint(conn: &Connection, table: &str, columns: &[String]) -> Result<()> {
    if columns.is_empty() {
        return Ok(());
    }
    check_identifier(table)?;
    for column in columns {
        check_identifier(column)?;
        if !column_exists(conn, table, column)? {
            add_column(conn, table, column)?;
        }
    }
    let quoted: Vec<String> = columns.iter().map(|c| format!("\"{}\"", c)).collect();
    let sql = format!(
        "CREATE UNIQUE INDEX IF NOT EXISTS \"uq_{}_{}\" ON \"{}\" ({})",
        table,
        columns.join("_"),
        table,
        quoted.join(", ")
    );
    conn.execute_batch(&sql).map_err(db_err)?;
    Ok(())
}

/// Select ids of rows whose column matches the given value. Returns an empty
/// list when the table or column does not exist yet.
pub fn select_by_crit(conn: &Connection, table: &str, column: &str, value: i64) -> Result<Vec<i64>> {
    check_identifier(table)?;
    check_identifier(column)?;
    let sql = format!("SELECT id FROM \"{}\" WHERE \"{}\" = ?", table, column);

    let result = (|| -> rusqlite::Result<Vec<i64>> {
        let mut stmt = conn.prepare(&sql)?;
        let ids = stmt
            .query_map([value], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<i64>>>()?;
        Ok(ids)
    })();

    match result {
        Ok(ids) => Ok(ids),
        Err(e) if is_missing_schema(&e) => Ok(Vec::new()),
        Err(e) => Err(db_err(e)),
    }
}
