//! Route handlers and the route table that binds them.
//!
//! | Method | Path | Handler |
//! |---|---|---|
//! | GET | `/tasks` | [`tasks::list_tasks`] |
//! | POST | `/tasks` | [`tasks::create_task`] |
//! | DELETE | `/tasks/:id` | [`tasks::delete_task`] |
//! | PUT | `/tasks/:id` | [`tasks::update_task`] |
//! | PATCH | `/tasks/:id` | [`tasks::patch_task`] |
//! | POST | `/tasks/import` | [`import::import_tasks`] |

pub mod import;
pub mod tasks;

use std::future::Future;

use axum::http::Method;
use axum::response::{IntoResponse, Response};
use futures_util::future::BoxFuture;
use serde_json::Value;

use crate::error::ApiError;
use crate::http::body::read_json;
use crate::http::response::with_json_content_type;
use crate::http::server::AppState;
use crate::routing::{PatternError, Route, RouteRequest, RouteTable};

/// Entry point stored in the route table.
pub type Handler = fn(AppState, RouteRequest) -> BoxFuture<'static, Response>;

/// The task API route table, in match order.
pub fn task_routes() -> Result<RouteTable<Handler>, PatternError> {
    Ok(RouteTable::new(vec![
        Route::new(Method::GET, "/tasks", tasks::list_tasks as Handler)?,
        Route::new(Method::POST, "/tasks", tasks::create_task as Handler)?,
        Route::new(Method::DELETE, "/tasks/:id", tasks::delete_task as Handler)?,
        Route::new(Method::PUT, "/tasks/:id", tasks::update_task as Handler)?,
        Route::new(Method::PATCH, "/tasks/:id", tasks::patch_task as Handler)?,
        Route::new(Method::POST, "/tasks/import", import::import_tasks as Handler)?,
    ]))
}

/// Decode the JSON body, run `handler`, and mark the response as JSON
/// whatever the outcome.
async fn with_json_body<F, Fut>(state: AppState, mut request: RouteRequest, handler: F) -> Response
where
    F: FnOnce(AppState, RouteRequest, Option<Value>) -> Fut,
    Fut: Future<Output = Result<Response, ApiError>>,
{
    let body = read_json(request.take_body(), state.config.limits.max_body_bytes).await;
    let response = match handler(state, request, body).await {
        Ok(response) => response,
        Err(e) => {
            tracing::debug!(error = %e, status = %e.status(), "Request rejected");
            e.into_response()
        }
    };
    with_json_content_type(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_table_order() {
        let table = task_routes().unwrap();
        let entries: Vec<_> = table
            .routes()
            .iter()
            .map(|route| (route.method().as_str(), route.pattern().template()))
            .collect();

        assert_eq!(
            entries,
            [
                ("GET", "/tasks"),
                ("POST", "/tasks"),
                ("DELETE", "/tasks/:id"),
                ("PUT", "/tasks/:id"),
                ("PATCH", "/tasks/:id"),
                ("POST", "/tasks/import"),
            ]
        );
    }

    #[test]
    fn test_import_path_reaches_import_route() {
        let table = task_routes().unwrap();
        let (route, matched) = table.resolve(&Method::POST, "/tasks/import").unwrap();
        assert_eq!(route.pattern().template(), "/tasks/import");
        assert!(matched.params.is_empty());
    }
}
