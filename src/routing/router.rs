//! Route table lookup.
//!
//! # Responsibilities
//! - Store compiled routes in declared order
//! - Look up the first route matching method and path
//! - Hand the matched parameters and query to the handler
//!
//! # Design Decisions
//! - Immutable after construction (shared via Arc without locks)
//! - O(n) scan over routes (the table is small and fixed)
//! - Explicit `None` on miss rather than a silent default

use std::collections::HashMap;
use std::fmt;

use axum::body::Body;
use axum::http::{Method, Request};

use crate::routing::matcher::{PatternError, RouteMatch, RoutePattern};
use crate::routing::query::QueryParams;

/// A single (method, pattern, handler) entry.
pub struct Route<H> {
    method: Method,
    pattern: RoutePattern,
    handler: H,
}

impl<H> Route<H> {
    /// Compile `template` and bind it to `method` and `handler`.
    pub fn new(method: Method, template: &str, handler: H) -> Result<Self, PatternError> {
        Ok(Self {
            method,
            pattern: RoutePattern::compile(template)?,
            handler,
        })
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }
}

impl<H> fmt::Debug for Route<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("template", &self.pattern.template())
            .finish()
    }
}

/// Ordered, immutable collection of routes.
#[derive(Debug)]
pub struct RouteTable<H> {
    routes: Vec<Route<H>>,
}

impl<H> RouteTable<H> {
    pub fn new(routes: Vec<Route<H>>) -> Self {
        Self { routes }
    }

    /// Find the first route whose method equals `method` and whose pattern
    /// matches `target` (path plus optional query string).
    pub fn resolve(&self, method: &Method, target: &str) -> Option<(&Route<H>, RouteMatch)> {
        self.routes
            .iter()
            .filter(|route| route.method == *method)
            .find_map(|route| route.pattern.captures(target).map(|matched| (route, matched)))
    }

    pub fn routes(&self) -> &[Route<H>] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// A request that matched a route, with its extracted parameters.
#[derive(Debug)]
pub struct RouteRequest {
    params: HashMap<String, String>,
    query: QueryParams,
    request: Request<Body>,
}

impl RouteRequest {
    pub fn new(matched: RouteMatch, request: Request<Body>) -> Self {
        Self {
            params: matched.params,
            query: matched.query,
            request,
        }
    }

    /// A named path parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// A query parameter value; `None` if absent or given without `=`.
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query.get(name).and_then(|value| value.as_deref())
    }

    /// Take the body out, leaving an empty one behind.
    pub fn take_body(&mut self) -> Body {
        std::mem::take(self.request.body_mut())
    }

    pub fn into_request(self) -> Request<Body> {
        self.request
    }
}
