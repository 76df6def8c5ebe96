//! Multipart CSV reception and parsing.

use std::future::Future;
use std::path::Path;

use axum::extract::multipart::{Field, Multipart};
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;

use crate::import::{CsvRecord, ImportError};

/// The only accepted media type for uploaded files.
pub const CSV_MEDIA_TYPE: &str = "text/csv";

/// Receive every file part of `multipart`, parse them, and hand all records
/// to `on_save`.
///
/// `on_save` runs only when every file part passed the media type check and
/// was written, re-read and parsed successfully.
pub async fn receive_csv<F, Fut, T>(
    mut multipart: Multipart,
    tmp_dir: &Path,
    on_save: F,
) -> Result<T, ImportError>
where
    F: FnOnce(Vec<CsvRecord>) -> Fut,
    Fut: Future<Output = T>,
{
    let mut spooled = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ImportError::Multipart(e.body_text()))?
    {
        let Some(file_name) = field.file_name().map(str::to_owned) else {
            continue;
        };

        tracing::debug!(
            field = field.name().unwrap_or_default(),
            file_name = %file_name,
            content_type = field.content_type().unwrap_or_default(),
            "Receiving upload"
        );
        ensure_csv(field.content_type())?;

        spooled.push(spool(field, tmp_dir).await?);
    }

    if spooled.is_empty() {
        return Err(ImportError::MissingFile);
    }

    let mut records = Vec::new();
    for file in &spooled {
        let data = tokio::fs::read_to_string(file.path())
            .await
            .map_err(ImportError::Read)?;
        records.extend(parse_csv(&data)?);
    }
    let spooled_count = spooled.len();
    drop(spooled);

    tracing::info!(files = spooled_count, records = records.len(), "CSV upload parsed");
    Ok(on_save(records).await)
}

/// Reject anything but exactly `text/csv`.
pub fn ensure_csv(content_type: Option<&str>) -> Result<(), ImportError> {
    match content_type {
        Some(CSV_MEDIA_TYPE) => Ok(()),
        other => {
            tracing::warn!(content_type = ?other, "Rejected upload with unsupported media type");
            Err(ImportError::UnsupportedMediaType {
                found: other.map(str::to_owned),
            })
        }
    }
}

/// Parse CSV text using the header row as field names.
pub fn parse_csv(data: &str) -> Result<Vec<CsvRecord>, ImportError> {
    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(data.as_bytes());

    reader
        .deserialize::<CsvRecord>()
        .map(|record| record.map_err(ImportError::Parse))
        .collect()
}

/// Stream a file part into a fresh temp file under `tmp_dir`.
async fn spool(mut field: Field<'_>, tmp_dir: &Path) -> Result<NamedTempFile, ImportError> {
    tokio::fs::create_dir_all(tmp_dir)
        .await
        .map_err(ImportError::Write)?;

    let temp = tempfile::Builder::new()
        .prefix("import-")
        .suffix(".csv")
        .tempfile_in(tmp_dir)
        .map_err(ImportError::Write)?;
    let mut out = tokio::fs::File::from_std(temp.reopen().map_err(ImportError::Write)?);

    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| ImportError::Multipart(e.body_text()))?
    {
        out.write_all(&chunk).await.map_err(ImportError::Write)?;
    }
    out.flush().await.map_err(ImportError::Write)?;

    Ok(temp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::{header, Request, StatusCode};
    use std::sync::atomic::{AtomicBool, Ordering};

    const BOUNDARY: &str = "task-api-boundary";

    fn multipart(parts: &[(&str, &str, &str)]) -> Request<Body> {
        let mut body = String::new();
        for (file_name, content_type, content) in parts {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n{content}\r\n"
            ));
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));

        Request::builder()
            .method("POST")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn extract(request: Request<Body>) -> Multipart {
        Multipart::from_request(request, &()).await.unwrap()
    }

    #[test]
    fn test_parse_csv_uses_header_row() {
        let records = parse_csv("title,description\nTask 01,First\nTask 02,Second\n").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["title"], "Task 01");
        assert_eq!(records[1]["description"], "Second");
    }

    #[test]
    fn test_parse_csv_rejects_ragged_rows() {
        let err = parse_csv("title,description\nonly-one-column\n").unwrap_err();
        assert!(matches!(err, ImportError::Parse(_)));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_parse_csv_header_only() {
        assert!(parse_csv("title,description\n").unwrap().is_empty());
    }

    #[test]
    fn test_ensure_csv() {
        assert!(ensure_csv(Some("text/csv")).is_ok());
        assert!(ensure_csv(Some("text/plain")).is_err());
        assert!(ensure_csv(Some("text/csv; charset=utf-8")).is_err());
        assert!(ensure_csv(None).is_err());
    }

    #[tokio::test]
    async fn test_receive_csv_hands_records_to_callback() {
        let dir = tempfile::tempdir().unwrap();
        let request = multipart(&[(
            "tasks.csv",
            "text/csv",
            "title,description\nTask 01,Desc 01\nTask 02,Desc 02",
        )]);

        let titles = receive_csv(extract(request).await, dir.path(), |records| async move {
            records
                .into_iter()
                .map(|record| record["title"].clone())
                .collect::<Vec<_>>()
        })
        .await
        .unwrap();

        assert_eq!(titles, ["Task 01", "Task 02"]);
        // Spooled files are removed once parsed.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_wrong_media_type_never_saves() {
        let dir = tempfile::tempdir().unwrap();
        let request = multipart(&[("tasks.txt", "text/plain", "title,description\na,b")]);
        let saved = AtomicBool::new(false);

        let err = receive_csv(extract(request).await, dir.path(), |_| async {
            saved.store(true, Ordering::SeqCst);
        })
        .await
        .unwrap_err();

        assert!(matches!(err, ImportError::UnsupportedMediaType { .. }));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(!saved.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_one_bad_file_rejects_the_whole_upload() {
        let dir = tempfile::tempdir().unwrap();
        let request = multipart(&[
            ("good.csv", "text/csv", "title,description\na,b"),
            ("bad.json", "application/json", "{}"),
        ]);
        let saved = AtomicBool::new(false);

        let result = receive_csv(extract(request).await, dir.path(), |_| async {
            saved.store(true, Ordering::SeqCst);
        })
        .await;

        assert!(matches!(result, Err(ImportError::UnsupportedMediaType { .. })));
        assert!(!saved.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_upload_without_file_part() {
        let dir = tempfile::tempdir().unwrap();
        let body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhello\r\n--{BOUNDARY}--\r\n"
        );
        let request = Request::builder()
            .method("POST")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();

        let err = receive_csv(extract(request).await, dir.path(), |_| async {})
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::MissingFile));
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
