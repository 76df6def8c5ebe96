//! `POST /tasks/import`: bulk task creation from a CSV upload.

use axum::extract::{FromRequest, Multipart};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use futures_util::future::BoxFuture;
use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::handlers::tasks::insert_task;
use crate::http::server::AppState;
use crate::import::{receive_csv, CsvRecord, ImportError};
use crate::observability::metrics;
use crate::routing::RouteRequest;

/// Outcome of replaying parsed records through task creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub created: usize,
    pub failed: usize,
}

/// `POST /tasks/import`
pub fn import_tasks(state: AppState, request: RouteRequest) -> BoxFuture<'static, Response> {
    Box::pin(async move {
        match import(state, request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, status = %e.status(), "CSV import rejected");
                e.into_response()
            }
        }
    })
}

async fn import(state: AppState, request: RouteRequest) -> Result<Response, ApiError> {
    let multipart = Multipart::from_request(request.into_request(), &state)
        .await
        .map_err(|rejection| ImportError::Multipart(rejection.body_text()))?;

    let tmp_dir = state.config.import.tmp_dir.clone();
    let summary = receive_csv(multipart, &tmp_dir, move |records| async move {
        replay_records(&state, records).await
    })
    .await?;

    tracing::info!(
        created = summary.created,
        failed = summary.failed,
        "CSV import finished"
    );
    Ok((StatusCode::CREATED, "CSV file successfully uploaded").into_response())
}

/// Create one task per record, in order. Failures are logged and skipped.
pub(crate) async fn replay_records(state: &AppState, records: Vec<CsvRecord>) -> ImportSummary {
    let mut summary = ImportSummary::default();

    for (index, record) in records.into_iter().enumerate() {
        let fields: Map<String, Value> = record
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect();

        match insert_task(state, Some(Value::Object(fields))).await {
            Ok(_) => summary.created += 1,
            Err(e) => {
                tracing::warn!(row = index + 1, error = %e, "Skipping CSV record");
                summary.failed += 1;
            }
        }
    }

    metrics::record_import(summary.created, summary.failed);
    summary
}
