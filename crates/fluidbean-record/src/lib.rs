//! Fluidbean-Record: ActiveRecord-style mapping layer.
//!
//! Models declare a typed column registry; records wrap an engine bean and
//! run every write through the column's formatter chain, type coercion, and
//! length check, and every save through the validator pipeline.
//!
//! # Example
//!
//! ```
//! use fluidbean_engine::{pool::init_memory_pool, Oodb};
//! use fluidbean_record::{Column, ColumnType, Formatter, Model, Record, Schema, Validator};
//!
//! struct Contact;
//!
//! impl Model for Contact {
//!     const BEAN_TYPE: &'static str = "contact";
//!
//!     fn define(schema: &mut Schema) {
//!         schema.add(
//!             Column::new("email")
//!                 .unique()
//!                 .formatter(Formatter::Trim)
//!                 .formatter(Formatter::Lowercase)
//!                 .validator(Validator::NotBlank)
//!                 .validator(Validator::Email),
//!         );
//!         schema.add(Column::new("name").length(120));
//!     }
//! }
//!
//! let oodb = Oodb::new(init_memory_pool().unwrap());
//! let mut contact = Record::<Contact>::new(&oodb).unwrap();
//! contact.set("email", "  ADA@example.ORG ").unwrap();
//! contact.save(&oodb).unwrap();
//! assert_eq!(contact.get_str("email"), Some("ada@example.org"));
//! ```

pub mod column;
pub mod format;
pub mod record;
pub mod validate;

pub use column::{Column, ColumnType, Schema};
pub use format::Formatter;
pub use record::{Model, Record};
pub use validate::Validator;
