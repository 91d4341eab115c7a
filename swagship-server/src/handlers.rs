// File: swagship-server/src/handlers.rs

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::error;

use swagship_common::error::Error;
use swagship_common::models::{RedeemRequest, RedemptionCode};

use crate::context::ServerContext;

pub const CODE_UPLOAD_FIELD: &str = "codeUploadFile";
pub const TRACKING_UPLOAD_FIELD: &str = "trackingUploadFile";

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiStatus {
    Success,
    Failed,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    pub status: ApiStatus,
    pub message: String,
}

impl ApiResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: ApiStatus::Success,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: ApiStatus::Failed,
            message: message.into(),
        }
    }
}

/// Adapter from core errors onto the wire contract: business and input
/// failures keep HTTP 200 with `status: FAILED` in the body (callers
/// inspect the body, not the status code); transport failures are
/// generic 500s.
pub struct AppError(pub Error);

impl From<Error> for AppError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.0.is_user_error() {
            (StatusCode::OK, Json(ApiResponse::failed(self.0.to_string()))).into_response()
        } else {
            error!("request failed: {}", self.0);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::failed("Internal server error.")),
            )
                .into_response()
        }
    }
}

pub async fn redeem_code(
    State(ctx): State<Arc<ServerContext>>,
    Json(req): Json<RedeemRequest>,
) -> Result<Json<ApiResponse>, AppError> {
    let message = ctx.redemption.redeem(&req).await?;
    Ok(Json(ApiResponse::success(message)))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub status: ApiStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub duplicates: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<String>,
}

pub async fn code_file_upload(
    State(ctx): State<Arc<ServerContext>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let data = read_upload(&mut multipart, CODE_UPLOAD_FIELD).await?;
    let report = ctx.ingest.ingest_codes(data.as_ref()).await?;
    Ok(Json(UploadResponse {
        status: ApiStatus::Success,
        message: report.message(),
        duplicates: report.duplicates,
        failures: Vec::new(),
    }))
}

pub async fn tracking_file_upload(
    State(ctx): State<Arc<ServerContext>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let data = read_upload(&mut multipart, TRACKING_UPLOAD_FIELD).await?;
    let report = ctx.ingest.ingest_tracking(data.as_ref()).await?;
    Ok(Json(UploadResponse {
        status: ApiStatus::Success,
        message: report.message(),
        duplicates: Vec::new(),
        failures: report.failures,
    }))
}

async fn read_upload(multipart: &mut Multipart, field_name: &str) -> Result<Bytes, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError(Error::Parse(e.to_string())))?
    {
        if field.name() == Some(field_name) {
            return field
                .bytes()
                .await
                .map_err(|e| AppError(Error::Parse(e.to_string())));
        }
    }
    Err(AppError(Error::Validation(vec![format!(
        "{field_name} is required."
    )])))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageQuery {
    pub page_size: i64,
    pub page_number: i64,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page_size: 50,
            page_number: 1,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    pub rows: Vec<RedemptionCode>,
    pub total_rows: i64,
}

pub async fn list_unused(
    State(ctx): State<Arc<ServerContext>>,
    Query(page): Query<PageQuery>,
) -> Result<Json<ListResponse>, AppError> {
    let (rows, total_rows) = ctx.repo.list_unused(page.page_size, page.page_number).await?;
    Ok(Json(ListResponse { rows, total_rows }))
}

pub async fn list_pending_shipping(
    State(ctx): State<Arc<ServerContext>>,
    Query(page): Query<PageQuery>,
) -> Result<Json<ListResponse>, AppError> {
    let (rows, total_rows) = ctx
        .repo
        .list_pending_shipping(page.page_size, page.page_number)
        .await?;
    Ok(Json(ListResponse { rows, total_rows }))
}

pub async fn list_shipped(
    State(ctx): State<Arc<ServerContext>>,
) -> Result<Json<ListResponse>, AppError> {
    let rows = ctx.repo.list_shipped().await?;
    let total_rows = rows.len() as i64;
    Ok(Json(ListResponse { rows, total_rows }))
}

pub async fn list_all_redeemed(
    State(ctx): State<Arc<ServerContext>>,
) -> Result<Json<ListResponse>, AppError> {
    let rows = ctx.repo.list_all_redeemed().await?;
    let total_rows = rows.len() as i64;
    Ok(Json(ListResponse { rows, total_rows }))
}

pub async fn export(
    State(ctx): State<Arc<ServerContext>>,
    Path(status): Path<String>,
) -> Result<Response, AppError> {
    let csv = ctx.export.export_csv(&status).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"export.csv\"",
            ),
        ],
        csv,
    )
        .into_response())
}

pub async fn update_tracking(
    State(ctx): State<Arc<ServerContext>>,
    Path((redeem_code, tracking)): Path<(String, String)>,
) -> Result<Json<ApiResponse>, AppError> {
    let message = ctx.redemption.assign_tracking(&redeem_code, &tracking).await?;
    Ok(Json(ApiResponse::success(message)))
}

pub async fn delete_code(
    State(ctx): State<Arc<ServerContext>>,
    Path(redeem_code): Path<String>,
) -> Result<Json<ApiResponse>, AppError> {
    ctx.repo.delete(&redeem_code).await?;
    Ok(Json(ApiResponse::success(format!("Deleted {redeem_code}."))))
}
