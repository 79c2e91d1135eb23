//! Parent/child attachment helper.
//!
//! Trees are flat `parent_id` references within a single bean type. There is
//! no recursion here; `children` returns the direct children only.

use fluidbean_common::Result;

use crate::bean::Bean;
use crate::oodb::Oodb;
use crate::value::Value;
use crate::writer;

const PARENT_COLUMN: &str = "parent_id";

/// Attaches beans to parent beans of the same type.
pub struct TreeManager {
    oodb: Oodb,
}

impl TreeManager {
    pub fn new(oodb: Oodb) -> Self {
        Self { oodb }
    }

    /// Attach `child` to `parent`. A transient parent is stored first so it
    /// has an id to reference; the child is stored with its `parent_id` set.
    pub fn attach(&self, parent: &mut Bean, child: &mut Bean) -> Result<()> {
        if !parent.is_saved() {
            self.oodb.store(parent)?;
        }
        child.set(PARENT_COLUMN, Value::Int(parent.id()))?;
        self.oodb.store(child)?;
        Ok(())
    }

    /// All beans attached to `parent`. Empty when the table or the
    /// `parent_id` column does not exist yet.
    pub fn children(&self, parent: &Bean) -> Result<Vec<Bean>> {
        let ids = self.oodb.with_conn(|conn| {
            writer::select_by_crit(conn, parent.type_name(), PARENT_COLUMN, parent.id())
        })?;
        self.oodb.batch(parent.type_name(), &ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::init_memory_pool;

    fn setup() -> (Oodb, TreeManager) {
        let oodb = Oodb::new(init_memory_pool().unwrap());
        let tree = TreeManager::new(oodb.clone());
        (oodb, tree)
    }

    #[test]
    fn test_attach_stores_transient_parent() {
        let (oodb, tree) = setup();
        let mut parent = oodb.dispense("page").unwrap();
        let mut child = oodb.dispense("page").unwrap();

        tree.attach(&mut parent, &mut child).unwrap();

        assert!(parent.is_saved());
        assert!(child.is_saved());
        assert_eq!(child.get("parent_id"), Some(&Value::Int(parent.id())));
    }

    #[test]
    fn test_children() {
        let (oodb, tree) = setup();
        let mut parent = oodb.dispense("page").unwrap();
        oodb.store(&mut parent).unwrap();

        for n in 0..3 {
            let mut child = oodb.dispense("page").unwrap();
            child.set("position", Value::Int(n)).unwrap();
            tree.attach(&mut parent, &mut child).unwrap();
        }

        let children = tree.children(&parent).unwrap();
        assert_eq!(children.len(), 3);
        for child in &children {
            assert_eq!(child.get("parent_id"), Some(&Value::Int(parent.id())));
        }
    }

    #[test]
    fn test_children_without_schema() {
        let (oodb, tree) = setup();

        // Table missing entirely.
        let orphan = oodb.dispense("page").unwrap();
        assert!(tree.children(&orphan).unwrap().is_empty());

        // Table exists but has no parent_id column.
        let mut solo = oodb.dispense("page").unwrap();
        oodb.store(&mut solo).unwrap();
        assert!(tree.children(&solo).unwrap().is_empty());
    }
}
