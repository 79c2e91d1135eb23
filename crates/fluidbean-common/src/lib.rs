//! Fluidbean-Common: shared error handling.
//!
//! This crate provides the unified error type and result alias used across
//! the fluidbean workspace.
//!
//! # Examples
//!
//! ```
//! use fluidbean_common::{Error, Result};
//!
//! fn example() -> Result<()> {
//!     Err(Error::not_found("bean"))
//! }
//! ```

pub mod error;

pub use error::{Error, Result};
