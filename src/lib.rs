//! Fluidbean - schema-less record engine with a session-gated web front.
//!
//! This library crate exposes the application wiring for integration testing.

pub mod config;
pub mod server;
