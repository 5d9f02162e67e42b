//! `POST /api/analyze` — one lesion photo in, one diagnostic report out.
//!
//! Accepts either multipart/form-data with an `image` part (raw bytes) or a
//! JSON body `{"image": "data:image/...;base64,..."}`. The caller's encoding
//! picks the pipeline input variant explicitly — no content sniffing past
//! the request Content-Type.

use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::pipeline::{DiagnosisReport, ImageInput};

#[derive(Deserialize)]
pub struct AnalyzeRequest {
    /// Base64 data URI (`data:image/jpeg;base64,/9j/...`)
    pub image: String,
}

pub async fn analyze(
    State(ctx): State<ApiContext>,
    req: Request,
) -> Result<Json<DiagnosisReport>, ApiError> {
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let input = if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(req, &())
            .await
            .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {e}")))?;
        image_from_multipart(multipart).await?
    } else if content_type.starts_with("application/json") {
        let Json(body) = Json::<AnalyzeRequest>::from_request(req, &())
            .await
            .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {e}")))?;
        ImageInput::DataUri(body.image)
    } else {
        return Err(ApiError::BadRequest(
            "Send the image as multipart/form-data or a JSON data URI".into(),
        ));
    };

    let request_id = Uuid::new_v4();
    tracing::info!(%request_id, ?input, "Starting image analysis");

    // The pipeline blocks (model inference + narrator round trip); keep it
    // off the async workers.
    let analyzer = ctx.analyzer.clone();
    let report = tokio::task::spawn_blocking(move || analyzer.analyze(input))
        .await
        .map_err(|e| ApiError::Internal(format!("analysis task failed: {e}")))??;

    tracing::info!(
        %request_id,
        condition = %report.condition,
        confidence = report.confidence,
        "Analysis completed"
    );

    Ok(Json(report))
}

async fn image_from_multipart(mut multipart: Multipart) -> Result<ImageInput, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart field: {e}")))?
    {
        if field.name() == Some("image") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Failed to read image part: {e}")))?;
            return Ok(ImageInput::Bytes(bytes.to_vec()));
        }
    }

    Err(ApiError::BadRequest("No image uploaded".into()))
}
