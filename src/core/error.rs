use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::modules::assistant::AssistantApiError;
use crate::shared::types::ApiResponse;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Remote service error: {0}")]
    RemoteService(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable identifier used in stream error frames
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation_error",
            AppError::Configuration(_) => "configuration_error",
            AppError::RemoteService(_) => "remote_service_error",
            AppError::UnknownTool(_) => "unknown_tool_error",
            AppError::Internal(_) => "internal_error",
        }
    }
}

impl From<AssistantApiError> for AppError {
    fn from(e: AssistantApiError) -> Self {
        AppError::RemoteService(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, errors) = match self {
            AppError::Validation(ref msg) => (
                StatusCode::BAD_REQUEST,
                msg.clone(),
                Some(vec![msg.clone()]),
            ),
            AppError::Configuration(ref msg) => {
                tracing::error!("Configuration error: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, msg.clone(), None)
            }
            AppError::RemoteService(ref msg) => {
                tracing::error!("Remote service error: {}", msg);
                (StatusCode::BAD_GATEWAY, msg.clone(), None)
            }
            AppError::UnknownTool(ref name) => {
                tracing::error!("Run requested unknown tool: {}", name);
                (
                    StatusCode::BAD_GATEWAY,
                    format!("Unknown tool: {}", name),
                    None,
                )
            }
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        let body = Json(ApiResponse::<()>::error(Some(message), errors));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
