use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::assistant_chat::dtos::{AssistantResponseDto, CreateAssistantRequestDto};
use crate::features::assistant_chat::services::AssistantService;
use crate::shared::types::ApiResponse;

/// Provision a remote assistant with the code interpreter and local tools
#[utoipa::path(
    post,
    path = "/api/assistant/create",
    request_body = CreateAssistantRequestDto,
    responses(
        (status = 201, description = "Assistant created", body = ApiResponse<AssistantResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 502, description = "Assistant service error")
    ),
    tag = "assistant"
)]
pub async fn create_assistant(
    State(service): State<Arc<AssistantService>>,
    AppJson(dto): AppJson<CreateAssistantRequestDto>,
) -> Result<(StatusCode, Json<ApiResponse<AssistantResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(format!("Invalid request: {}", e)))?;

    let assistant = service.create_assistant(dto.into()).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(assistant.into()),
            Some("Assistant created; set ASSISTANT_ID to use it".to_string()),
        )),
    ))
}
