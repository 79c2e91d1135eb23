//! The schema-less record object.
//!
//! A [`Bean`] is a typed bag of properties plus an id. Id 0 means the bean
//! has not been stored yet. Beans carry a uniqueness build hint which the
//! engine turns into a unique index at store time.

use std::collections::BTreeMap;

use fluidbean_common::{Error, Result};

use crate::value::Value;

/// A schema-less record managed by the engine.
#[derive(Debug, Clone)]
pub struct Bean {
    type_name: String,
    id: i64,
    properties: BTreeMap<String, Value>,
    unique_hint: Vec<String>,
}

/// Check that a name is usable as a SQL table or column identifier.
///
/// Identifiers are restricted to `[a-z_][a-z0-9_]*` so the writer can embed
/// them into generated SQL without quoting hazards.
pub(crate) fn check_identifier(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid_first = chars
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c == '_');
    let valid_rest = name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if valid_first && valid_rest {
        Ok(())
    } else {
        Err(Error::invalid_input(format!(
            "'{}' is not a valid identifier (expected [a-z_][a-z0-9_]*)",
            name
        )))
    }
}

impl Bean {
    /// Create a fresh, unsaved bean of the given type.
    pub fn dispense(type_name: &str) -> Result<Self> {
        check_identifier(type_name)?;
        Ok(Self {
            type_name: type_name.to_string(),
            id: 0,
            properties: BTreeMap::new(),
            unique_hint: Vec::new(),
        })
    }

    /// Engine-internal constructor for rows read back from the database.
    /// The type name has already been validated upstream.
    pub(crate) fn hydrate(type_name: &str, id: i64, properties: BTreeMap<String, Value>) -> Self {
        Self {
            type_name: type_name.to_string(),
            id,
            properties,
            unique_hint: Vec::new(),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    /// Whether this bean has been stored.
    pub fn is_saved(&self) -> bool {
        self.id != 0
    }

    /// Set a property. The name must be a valid identifier; `id` is managed
    /// by the engine and cannot be assigned.
    pub fn set(&mut self, name: &str, value: Value) -> Result<()> {
        if name == "id" {
            return Err(Error::invalid_input("the id property is managed by the engine"));
        }
        check_identifier(name)?;
        self.properties.insert(name.to_string(), value);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// Iterate over the properties in name order.
    pub fn properties(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn property_count(&self) -> usize {
        self.properties.len()
    }

    /// Register the columns that should be covered by a unique index.
    /// Applied by the engine when the bean is stored.
    pub fn set_unique_hint(&mut self, columns: Vec<String>) {
        self.unique_hint = columns;
    }

    pub fn unique_hint(&self) -> &[String] {
        &self.unique_hint
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispense() {
        let bean = Bean::dispense("book").unwrap();
        assert_eq!(bean.type_name(), "book");
        assert_eq!(bean.id(), 0);
        assert!(!bean.is_saved());
        assert_eq!(bean.property_count(), 0);
    }

    #[test]
    fn test_dispense_rejects_bad_type() {
        assert!(Bean::dispense("Book").is_err());
        assert!(Bean::dispense("1book").is_err());
        assert!(Bean::dispense("book; drop").is_err());
        assert!(Bean::dispense("").is_err());
    }

    #[test]
    fn test_set_get() {
        let mut bean = Bean::dispense("book").unwrap();
        bean.set("title", Value::from("Dune")).unwrap();
        assert_eq!(bean.get("title"), Some(&Value::from("Dune")));
        assert_eq!(bean.get("missing"), None);
    }

    #[test]
    fn test_set_rejects_id_and_bad_names() {
        let mut bean = Bean::dispense("book").unwrap();
        assert!(bean.set("id", Value::Int(1)).is_err());
        assert!(bean.set("Title", Value::Null).is_err());
        assert!(bean.set("a b", Value::Null).is_err());
    }

    #[test]
    fn test_unique_hint() {
        let mut bean = Bean::dispense("user").unwrap();
        bean.set_unique_hint(vec!["email".to_string()]);
        assert_eq!(bean.unique_hint(), &["email".to_string()]);
    }
}
