//! The typed column registry.
//!
//! Models register their columns into a [`Schema`] through a builder-style
//! [`Column`]. The registry drives the setter pipeline (formatters, type
//! coercion, length check) and the validation run at save time.

use fluidbean_engine::Value;

use crate::format::Formatter;
use crate::validate::Validator;

/// Declared type of a column, used for coercion on write and decoding on
/// read. The engine itself stays schema-less; this typing lives entirely in
/// the mapping layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Str,
    Int,
    Bool,
    DateTime,
    /// JSON-serialized structured data.
    Serialized,
}

/// A single column declaration.
#[derive(Clone)]
pub struct Column {
    name: String,
    column_type: ColumnType,
    length: Option<usize>,
    verbose: Option<String>,
    default: Option<Value>,
    unique: bool,
    formatters: Vec<Formatter>,
    validators: Vec<Validator>,
}

impl Column {
    /// Start a column declaration; the type defaults to `Str`.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            column_type: ColumnType::Str,
            length: None,
            verbose: None,
            default: None,
            unique: false,
            formatters: Vec::new(),
            validators: Vec::new(),
        }
    }

    pub fn column_type(mut self, column_type: ColumnType) -> Self {
        self.column_type = column_type;
        self
    }

    /// Maximum length in characters for text values.
    pub fn length(mut self, length: usize) -> Self {
        self.length = Some(length);
        self
    }

    /// Human-readable label used in validation messages.
    pub fn verbose(mut self, verbose: &str) -> Self {
        self.verbose = Some(verbose.to_string());
        self
    }

    /// Value applied when the property is unset or null.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Mark the column for the engine's unique-index build hint.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Append a formatter; formatters run in registration order.
    pub fn formatter(mut self, formatter: Formatter) -> Self {
        self.formatters.push(formatter);
        self
    }

    /// Append a validator.
    pub fn validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get_type(&self) -> ColumnType {
        self.column_type
    }

    pub fn get_length(&self) -> Option<usize> {
        self.length
    }

    /// The verbose label, falling back to the column name.
    pub fn label(&self) -> &str {
        self.verbose.as_deref().unwrap_or(&self.name)
    }

    pub fn get_default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn is_unique(&self) -> bool {
        self.unique
    }

    pub fn formatters(&self) -> &[Formatter] {
        &self.formatters
    }

    pub fn validators(&self) -> &[Validator] {
        &self.validators
    }
}

/// Ordered collection of column declarations with name lookup.
#[derive(Clone, Default)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a column. Re-registering a name replaces the earlier
    /// declaration.
    pub fn add(&mut self, column: Column) {
        if let Some(existing) = self.columns.iter_mut().find(|c| c.name == column.name) {
            *existing = column;
        } else {
            self.columns.push(column);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Names of all columns marked unique, for the engine's build hint.
    pub fn unique_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.unique)
            .map(|c| c.name.clone())
            .collect()
    }
}
