//! Many-to-many association manager.
//!
//! Associations live in a join table named from the two bean types in
//! sorted order (`author_book` for `book` and `author`), with one
//! `<type>_id` column per side and a unique index for idempotency. The join
//! table is created on demand, like any other fluid table.

use rusqlite::Connection;

use fluidbean_common::{Error, Result};

use crate::bean::Bean;
use crate::oodb::Oodb;
use crate::writer;

/// Links pairs of beans through join tables.
pub struct AssociationManager {
    oodb: Oodb,
}

impl AssociationManager {
    pub fn new(oodb: Oodb) -> Self {
        Self { oodb }
    }

    fn join_table(a: &str, b: &str) -> String {
        if a <= b {
            format!("{}_{}", a, b)
        } else {
            format!("{}_{}", b, a)
        }
    }

    fn id_column(type_name: &str) -> String {
        format!("{}_id", type_name)
    }

    fn check_distinct(a: &str, b: &str) -> Result<()> {
        if a == b {
            return Err(Error::invalid_input(
                "associations between beans of the same type are not supported",
            ));
        }
        Ok(())
    }

    /// Associate two beans. Transient beans are stored first. Associating
    /// the same pair twice is a no-op.
    pub fn associate(&self, a: &mut Bean, b: &mut Bean) -> Result<()> {
        Self::check_distinct(a.type_name(), b.type_name())?;
        if !a.is_saved() {
            self.oodb.store(a)?;
        }
        if !b.is_saved() {
            self.oodb.store(b)?;
        }

        let table = Self::join_table(a.type_name(), b.type_name());
        let a_col = Self::id_column(a.type_name());
        let b_col = Self::id_column(b.type_name());
        let (a_id, b_id) = (a.id(), b.id());

        self.oodb.with_conn(|conn| {
            ensure_join_table(conn, &table, &a_col, &b_col)?;
            let sql = format!(
                "INSERT OR IGNORE INTO \"{}\" (\"{}\", \"{}\") VALUES (?, ?)",
                table, a_col, b_col
            );
            conn.execute(&sql, [a_id, b_id]).map_err(writer::db_err)?;
            Ok(())
        })
    }

    /// Remove the association between two beans, if any.
    pub fn unassociate(&self, a: &Bean, b: &Bean) -> Result<()> {
        Self::check_distinct(a.type_name(), b.type_name())?;
        let table = Self::join_table(a.type_name(), b.type_name());
        let sql = format!(
            "DELETE FROM \"{}\" WHERE \"{}\" = ? AND \"{}\" = ?",
            table,
            Self::id_column(a.type_name()),
            Self::id_column(b.type_name())
        );
        self.oodb
            .with_conn(|conn| match conn.execute(&sql, [a.id(), b.id()]) {
                Ok(_) => Ok(()),
                Err(e) if writer::is_missing_schema(&e) => Ok(()),
                Err(e) => Err(writer::db_err(e)),
            })
    }

    /// Remove all associations between a bean and the given type.
    pub fn clear_relations(&self, bean: &Bean, other_type: &str) -> Result<()> {
        Self::check_distinct(bean.type_name(), other_type)?;
        let table = Self::join_table(bean.type_name(), other_type);
        let sql = format!(
            "DELETE FROM \"{}\" WHERE \"{}\" = ?",
            table,
            Self::id_column(bean.type_name())
        );
        self.oodb
            .with_conn(|conn| match conn.execute(&sql, [bean.id()]) {
                Ok(_) => Ok(()),
                Err(e) if writer::is_missing_schema(&e) => Ok(()),
                Err(e) => Err(writer::db_err(e)),
            })
    }

    /// Ids of beans of the given type associated with this bean. Empty when
    /// the join table does not exist yet.
    pub fn related(&self, bean: &Bean, other_type: &str) -> Result<Vec<i64>> {
        Self::check_distinct(bean.type_name(), other_type)?;
        let table = Self::join_table(bean.type_name(), other_type);
        let sql = format!(
            "SELECT \"{}\" FROM \"{}\" WHERE \"{}\" = ? ORDER BY \"{}\"",
            Self::id_column(other_type),
            table,
            Self::id_column(bean.type_name()),
            Self::id_column(other_type)
        );
        self.oodb.with_conn(|conn| {
            let result = (|| -> rusqlite::Result<Vec<i64>> {
                let mut stmt = conn.prepare(&sql)?;
                let ids = stmt
                    .query_map([bean.id()], |row| row.get(0))?
                    .collect::<rusqlite::Result<Vec<i64>>>()?;
                Ok(ids)
            })();
            match result {
                Ok(ids) => Ok(ids),
                Err(e) if writer::is_missing_schema(&e) => Ok(Vec::new()),
                Err(e) => Err(writer::db_err(e)),
            }
        })
    }
}

fn ensure_join_table(conn: &Connection, table: &str, a_col: &str, b_col: &str) -> Result<()> {
    if !writer::table_exists(conn, table)? {
        writer::create_table(conn, table)?;
        writer::add_column(conn, table, a_col)?;
        writer::add_column(conn, table, b_col)?;
        writer::apply_unique_hint(conn, table, &[a_col.to_string(), b_col.to_string()])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::init_memory_pool;

    fn setup() -> (Oodb, AssociationManager) {
        let oodb = Oodb::new(init_memory_pool().unwrap());
        let assoc = AssociationManager::new(oodb.clone());
        (oodb, assoc)
    }

    fn stored(oodb: &Oodb, type_name: &str) -> Bean {
        let mut bean = oodb.dispense(type_name).unwrap();
        oodb.store(&mut bean).unwrap();
        bean
    }

    #[test]
    fn test_associate_and_related() {
        let (oodb, assoc) = setup();
        let mut book = stored(&oodb, "book");
        let mut author = stored(&oodb, "author");

        assoc.associate(&mut book, &mut author).unwrap();

        assert_eq!(assoc.related(&book, "author").unwrap(), vec![author.id()]);
        assert_eq!(assoc.related(&author, "book").unwrap(), vec![book.id()]);
    }

    #[test]
    fn test_associate_stores_transient_beans() {
        let (oodb, assoc) = setup();
        let mut book = oodb.dispense("book").unwrap();
        let mut author = oodb.dispense("author").unwrap();

        assoc.associate(&mut book, &mut author).unwrap();
        assert!(book.is_saved());
        assert!(author.is_saved());
    }

    #[test]
    fn test_associate_is_idempotent() {
        let (oodb, assoc) = setup();
        let mut book = stored(&oodb, "book");
        let mut author = stored(&oodb, "author");

        assoc.associate(&mut book, &mut author).unwrap();
        assoc.associate(&mut book, &mut author).unwrap();

        assert_eq!(assoc.related(&book, "author").unwrap().len(), 1);
    }

    #[test]
    fn test_unassociate() {
        let (oodb, assoc) = setup();
        let mut book = stored(&oodb, "book");
        let mut author = stored(&oodb, "author");

        assoc.associate(&mut book, &mut author).unwrap();
        assoc.unassociate(&book, &author).unwrap();
        assert!(assoc.related(&book, "author").unwrap().is_empty());

        // Without a join table this is a no-op, not an error.
        let page = stored(&oodb, "page");
        assoc.unassociate(&book, &page).unwrap();
    }

    #[test]
    fn test_clear_relations() {
        let (oodb, assoc) = setup();
        let mut book = stored(&oodb, "book");
        for _ in 0..3 {
            let mut author = stored(&oodb, "author");
            assoc.associate(&mut book, &mut author).unwrap();
        }

        assoc.clear_relations(&book, "author").unwrap();
        assert!(assoc.related(&book, "author").unwrap().is_empty());
    }

    #[test]
    fn test_related_without_join_table() {
        let (oodb, assoc) = setup();
        let book = stored(&oodb, "book");
        assert!(assoc.related(&book, "author").unwrap().is_empty());
    }

    #[test]
    fn test_same_type_rejected() {
        let (oodb, assoc) = setup();
        let mut a = stored(&oodb, "book");
        let mut b = stored(&oodb, "book");
        assert!(assoc.associate(&mut a, &mut b).is_err());
    }
}
