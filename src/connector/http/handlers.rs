use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use axum::extract::{Multipart, Path as UrlPath, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::application::{IngestedDocument, DEFAULT_HISTORY_LIMIT};
use crate::domain::{is_supported_extension, Answer, Document, DocumentChunk, QueryRecord};

use super::error::{ApiResult, AppError};
use super::Container;

pub const UPLOAD_SOURCE: &str = "upload";
const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub limit: Option<usize>,
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn list_documents(
    State(container): State<Arc<Container>>,
) -> ApiResult<Json<Vec<Document>>> {
    Ok(Json(container.list_use_case().execute().await?))
}

pub async fn get_document(
    State(container): State<Arc<Container>>,
    UrlPath(id): UrlPath<i64>,
) -> ApiResult<Json<Document>> {
    Ok(Json(container.list_use_case().get(id).await?))
}

pub async fn get_chunks(
    State(container): State<Arc<Container>>,
    UrlPath(id): UrlPath<i64>,
) -> ApiResult<Json<Vec<DocumentChunk>>> {
    let chunks = container.list_use_case().chunks(id).await?;
    Ok(Json(
        chunks
            .into_iter()
            .map(DocumentChunk::without_embedding)
            .collect(),
    ))
}

pub async fn delete_document(
    State(container): State<Arc<Container>>,
    UrlPath(id): UrlPath<i64>,
) -> ApiResult<Json<Value>> {
    let document = container.delete_use_case().execute(id).await?;
    Ok(Json(json!({ "deleted": document.id(), "filename": document.filename() })))
}

/// Accepts a multipart `file` field and ingests it under its original name.
pub async fn upload_document(
    State(container): State<Arc<Container>>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Value>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field
            .file_name()
            .map(str::to_string)
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| AppError::bad_request("No file selected"))?;

        let extension = Path::new(&file_name)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if !is_supported_extension(&extension) {
            return Err(AppError::bad_request(format!(
                "File type not allowed: {}",
                file_name
            )));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::bad_request(format!("Failed to read upload: {}", e)))?;

        let mut temp = tempfile::Builder::new()
            .prefix("docqa-upload-")
            .suffix(&format!(".{}", extension))
            .tempfile()?;
        temp.write_all(&bytes)?;
        temp.flush()?;

        let use_case = container.ingest_use_case();
        let processed = use_case
            .process(temp.path())
            .await?
            .with_file_name(file_name.clone());
        let ingested = use_case.store(processed, UPLOAD_SOURCE).await?;

        info!(
            "Uploaded {} as document {}",
            file_name,
            ingested.document.id()
        );

        return Ok((StatusCode::CREATED, Json(ingested_json(&ingested))));
    }

    Err(AppError::bad_request("No file part in the request"))
}

pub async fn query_document(
    State(container): State<Arc<Container>>,
    UrlPath(id): UrlPath<i64>,
    Json(request): Json<QueryRequest>,
) -> ApiResult<Json<Answer>> {
    let answer = container
        .query_use_case()
        .ask_document(id, &request.query)
        .await?;
    Ok(Json(answer))
}

pub async fn query_all(
    State(container): State<Arc<Container>>,
    Json(request): Json<QueryRequest>,
) -> ApiResult<Json<Answer>> {
    Ok(Json(container.query_use_case().ask_all(&request.query).await?))
}

pub async fn list_queries(
    State(container): State<Arc<Container>>,
    Query(params): Query<HistoryParams>,
) -> ApiResult<Json<Vec<QueryRecord>>> {
    let limit = params.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    Ok(Json(container.history_use_case().execute(limit).await?))
}

fn ingested_json(ingested: &IngestedDocument) -> Value {
    json!({
        "document": ingested.document,
        "chunk_count": ingested.chunk_count,
        "embedded_count": ingested.embedded_count,
    })
}
