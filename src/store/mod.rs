//! Record store subsystem.
//!
//! # Data Flow
//! ```text
//! startup:  db.json → database.rs (load or initialize empty) → Document in memory
//!
//! mutation: handler → Tasks repository
//!     → exclusive lock on Document
//!     → apply change in memory
//!     → serialize whole Document → temp file → rename over db.json
//!     → release lock, return result
//! ```
//!
//! # Design Decisions
//! - One JSON document holds every table; each mutation rewrites all of it
//! - Writes are awaited under the document lock, so disk order = mutation order
//! - Linear scans, no indexes, no uniqueness checks on ids
//! - One named repository per entity (`Database::tasks`)

pub mod database;
pub mod error;
pub mod task;

pub use database::{Database, Document, Tasks};
pub use error::StoreError;
pub use task::{Task, TaskField, TaskFilter, TaskPatch, TaskUpdate};
