//! Engine facade: dispense, load, store, trash, batch, and raw-SQL find.
//!
//! `store` is where the fluid schema happens: the bean's table and any
//! missing columns are created on demand, and the bean's uniqueness hint is
//! applied as a unique index, before the row is inserted or updated.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;
use rusqlite::{params_from_iter, Connection, Row};

use fluidbean_common::{Error, Result};

use crate::bean::{check_identifier, Bean};
use crate::pool::{get_conn, DbPool, PooledConnection};
use crate::value::Value;
use crate::writer;

/// The object database. Cheap to clone; clones share the pool and any
/// active pass-through transaction.
#[derive(Clone)]
pub struct Oodb {
    pool: DbPool,
    tx: Arc<Mutex<Option<PooledConnection>>>,
}

impl Oodb {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            tx: Arc::new(Mutex::new(None)),
        }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Run a closure against the active transaction connection if one is
    /// open, otherwise against a fresh pooled connection.
    pub(crate) fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let guard = self.tx.lock();
        if let Some(conn) = guard.as_ref() {
            return f(conn);
        }
        drop(guard);
        let conn = get_conn(&self.pool)?;
        f(&conn)
    }

    /// Create a fresh, unsaved bean of the given type.
    pub fn dispense(&self, type_name: &str) -> Result<Bean> {
        Bean::dispense(type_name)
    }

    /// Load a bean by id. A missing row (or a table that does not exist yet)
    /// yields a freshly dispensed bean with id 0.
    pub fn load(&self, type_name: &str, id: i64) -> Result<Bean> {
        check_identifier(type_name)?;
        let sql = format!("SELECT * FROM \"{}\" WHERE id = ?", type_name);
        self.with_conn(|conn| {
            match query_beans(conn, type_name, &sql, &[Value::Int(id)]) {
                Ok(mut beans) => match beans.pop() {
                    Some(bean) => Ok(bean),
                    None => Bean::dispense(type_name),
                },
                Err(e) if writer::is_missing_schema(&e) => Bean::dispense(type_name),
                Err(e) => Err(writer::db_err(e)),
            }
        })
    }

    /// Store a bean, creating its table and any missing columns first.
    /// Assigns and returns the row id on first store.
    pub fn store(&self, bean: &mut Bean) -> Result<i64> {
        self.with_conn(|conn| {
            prepare_schema(conn, bean)?;

            let names: Vec<&str> = bean.properties().map(|(k, _)| k).collect();
            let values: Vec<Value> = bean.properties().map(|(_, v)| v.clone()).collect();

            if bean.is_saved() {
                if !names.is_empty() {
                    let assignments: Vec<String> =
                        names.iter().map(|n| format!("\"{}\" = ?", n)).collect();
                    let sql = format!(
                        "UPDATE \"{}\" SET {} WHERE id = ?",
                        bean.type_name(),
                        assignments.join(", ")
                    );
                    let mut params = values;
                    params.push(Value::Int(bean.id()));
                    conn.execute(&sql, params_from_iter(params.iter()))
                        .map_err(|e| map_store_err(bean.type_name(), e))?;
                }
            } else {
                let sql = if names.is_empty() {
                    format!("INSERT INTO \"{}\" DEFAULT VALUES", bean.type_name())
                } else {
                    let quoted: Vec<String> = names.iter().map(|n| format!("\"{}\"", n)).collect();
                    let placeholders: Vec<&str> = names.iter().map(|_| "?").collect();
                    format!(
                        "INSERT INTO \"{}\" ({}) VALUES ({})",
                        bean.type_name(),
                        quoted.join(", "),
                        placeholders.join(", ")
                    )
                };
                conn.execute(&sql, params_from_iter(values.iter()))
                    .map_err(|e| map_store_err(bean.type_name(), e))?;
                bean.set_id(conn.last_insert_rowid());
            }
            tracing::debug!(type_name = bean.type_name(), id = bean.id(), "stored bean");
            Ok(bean.id())
        })
    }

    /// Delete a bean's row. Unsaved beans are a no-op.
    pub fn trash(&self, bean: &Bean) -> Result<()> {
        if !bean.is_saved() {
            return Ok(());
        }
        let sql = format!("DELETE FROM \"{}\" WHERE id = ?", bean.type_name());
        self.with_conn(|conn| {
            conn.execute(&sql, [bean.id()]).map_err(writer::db_err)?;
            Ok(())
        })
    }

    /// Load several beans by id. Ids without a row are skipped.
    pub fn batch(&self, type_name: &str, ids: &[i64]) -> Result<Vec<Bean>> {
        check_identifier(type_name)?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders: Vec<&str> = ids.iter().map(|_| "?").collect();
        let sql = format!(
            "SELECT * FROM \"{}\" WHERE id IN ({}) ORDER BY id",
            type_name,
            placeholders.join(", ")
        );
        let params: Vec<Value> = ids.iter().map(|id| Value::Int(*id)).collect();
        self.with_conn(|conn| match query_beans(conn, type_name, &sql, &params) {
            Ok(beans) => Ok(beans),
            Err(e) if writer::is_missing_schema(&e) => Ok(Vec::new()),
            Err(e) => Err(writer::db_err(e)),
        })
    }

    /// Find beans with a raw SQL WHERE fragment and positional parameters.
    ///
    /// Unknown-table and unknown-column errors are swallowed and yield an
    /// empty result; any other SQL error propagates.
    pub fn find(&self, type_name: &str, where_sql: &str, params: &[Value]) -> Result<Vec<Bean>> {
        check_identifier(type_name)?;
        let sql = format!("SELECT * FROM \"{}\" WHERE {}", type_name, where_sql);
        self.with_conn(|conn| match query_beans(conn, type_name, &sql, params) {
            Ok(beans) => Ok(beans),
            Err(e) if writer::is_missing_schema(&e) => Ok(Vec::new()),
            Err(e) => Err(writer::db_err(e)),
        })
    }

    /// Begin a pass-through transaction. Until `commit` or `rollback`, all
    /// operations on this engine (and its clones) run on one held connection.
    pub fn begin(&self) -> Result<()> {
        let mut slot = self.tx.lock();
        if slot.is_some() {
            return Err(Error::database("transaction already active"));
        }
        let conn = get_conn(&self.pool)?;
        conn.execute_batch("BEGIN").map_err(writer::db_err)?;
        *slot = Some(conn);
        Ok(())
    }

    /// Commit the pass-through transaction.
    pub fn commit(&self) -> Result<()> {
        match self.tx.lock().take() {
            Some(conn) => conn.execute_batch("COMMIT").map_err(writer::db_err),
            None => Err(Error::database("no active transaction")),
        }
    }

    /// Roll back the pass-through transaction.
    pub fn rollback(&self) -> Result<()> {
        match self.tx.lock().take() {
            Some(conn) => conn.execute_batch("ROLLBACK").map_err(writer::db_err),
            None => Err(Error::database("no active transaction")),
        }
    }
}

fn map_store_err(type_name: &str, e: rusqlite::Error) -> Error {
    if e.to_string().contains("UNIQUE constraint failed") {
        Error::InvalidInput(format!("duplicate value for unique column on '{}'", type_name))
    } else {
        writer::db_err(e)
    }
}

/// Create the bean's table, add missing columns, and apply the unique hint.
fn prepare_schema(conn: &Connection, bean: &Bean) -> Result<()> {
    if !writer::table_exists(conn, bean.type_name())? {
        writer::create_table(conn, bean.type_name())?;
    }
    for (name, _) in bean.properties() {
        if !writer::column_exists(conn, bean.type_name(), name)? {
            writer::add_column(conn, bean.type_name(), name)?;
        }
    }
    writer::apply_unique_hint(conn, bean.type_name(), bean.unique_hint())
}

fn query_beans(
    conn: &Connection,
    type_name: &str,
    sql: &str,
    params: &[Value],
) -> rusqlite::Result<Vec<Bean>> {
    let mut stmt = conn.prepare(sql)?;
    let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
    let mut rows = stmt.query(params_from_iter(params.iter()))?;
    let mut beans = Vec::new();
    while let Some(row) = rows.next()? {
        beans.push(row_to_bean(type_name, &columns, row)?);
    }
    Ok(beans)
}

fn row_to_bean(type_name: &str, columns: &[String], row: &Row) -> rusqlite::Result<Bean> {
    let mut id = 0i64;
    let mut properties = BTreeMap::new();
    for (idx, column) in columns.iter().enumerate() {
        let raw: rusqlite::types::Value = row.get(idx)?;
        if column == "id" {
            if let rusqlite::types::Value::Integer(i) = raw {
                id = i;
            }
        } else {
            properties.insert(column.clone(), Value::from(raw));
        }
    }
    Ok(Bean::hydrate(type_name, id, properties))
}
