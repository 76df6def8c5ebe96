//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup):
//!     (method, "/tasks/:id", handler)[]
//!     → matcher.rs (template → anchored regex with named groups)
//!     → router.rs (ordered, immutable RouteTable)
//!
//! Incoming Request (method, path + query)
//!     → router.rs (scan table in declared order)
//!     → matcher.rs (named params + raw query capture)
//!     → query.rs (raw query → key/value map)
//!     → Return: matched Route + RouteMatch, or None
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - First method + pattern match wins, no specificity ranking
//! - No 405 handling: a known path with the wrong method is a miss

pub mod matcher;
pub mod query;
pub mod router;

pub use matcher::{PatternError, RouteMatch, RoutePattern};
pub use query::{parse_query, QueryParams};
pub use router::{Route, RouteRequest, RouteTable};
