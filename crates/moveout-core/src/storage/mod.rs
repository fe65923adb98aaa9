//! Storage layer
//!
//! SQLite-backed entity collections for inspections and everything they
//! own.
//!
//! ## Architecture
//!
//! - **schema**: table layout and version tracking
//! - **database**: row-level reads and writes, cascading delete
//! - **error**: typed failures with recovery hints
//!
//! Business rules (validation, template seeding, timestamps) live in
//! [`crate::store::Store`], which wraps a [`Database`].

pub mod database;
pub mod error;
pub mod schema;

pub use database::{CascadeSummary, CollectionCounts, Database};
pub use error::{StorageError, StorageResult};
pub use schema::{init_schema, needs_init, SCHEMA_VERSION};
