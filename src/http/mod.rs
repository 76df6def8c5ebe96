//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware layers)
//!     → request.rs (request ID set + propagated)
//!     → server.rs dispatch (route table lookup)
//!     → body.rs (JSON body decoding, for task handlers)
//!     → handlers (task CRUD, CSV import)
//!     → response.rs (content-type shaping)
//!     → Send to client
//! ```

pub mod body;
pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestIdExt, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
