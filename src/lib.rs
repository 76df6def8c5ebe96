//! Task management HTTP API.
//!
//! Clients create, list, update and delete tasks, or bulk-import them from a
//! CSV upload. Every task lives in one JSON file that is rewritten on each
//! mutation.

pub mod config;
pub mod error;
pub mod handlers;
pub mod http;
pub mod import;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod store;

pub use config::AppConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use store::Database;
