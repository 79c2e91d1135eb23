//! Fluidbean-Engine: schema-less SQLite bean store.
//!
//! This crate provides the object database the record layer is built on,
//! using SQLite with rusqlite and r2d2 connection pooling. The schema is
//! "fluid": tables and columns are created on demand when a bean is stored.
//!
//! # Modules
//!
//! - `pool` - Connection pool management
//! - `value` - Dynamic property values
//! - `bean` - The schema-less record object
//! - `writer` - DDL and criteria-select query writer
//! - `oodb` - Engine facade: dispense/load/store/trash/batch/find
//! - `associations` - Many-to-many join-table manager
//! - `tree` - Parent/child attachment helper
//!
//! # Example
//!
//! ```
//! use fluidbean_engine::oodb::Oodb;
//! use fluidbean_engine::pool::init_memory_pool;
//! use fluidbean_engine::value::Value;
//!
//! let oodb = Oodb::new(init_memory_pool().unwrap());
//! let mut bean = oodb.dispense("book").unwrap();
//! bean.set("title", Value::from("Dune")).unwrap();
//! let id = oodb.store(&mut bean).unwrap();
//! assert!(id > 0);
//! ```

pub mod associations;
pub mod bean;
pub mod oodb;
pub mod pool;
pub mod tree;
pub mod value;
pub mod writer;

pub use bean::Bean;
pub use oodb::Oodb;
pub use value::Value;
