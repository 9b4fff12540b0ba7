use axum::{
    body::Body,
    extract::{
        multipart::MultipartError, rejection::JsonRejection, FromRequest, Multipart, Request,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use tracing::debug;
use validator::Validate;

use crate::core::error::AppError;
use crate::features::assistant_chat::dtos::{ArtifactInput, ChatRequestForm};
use crate::shared::constants::{DEFAULT_ARTIFACT_FILE_NAME, DEFAULT_ARTIFACT_MEDIA_TYPE};

/// Custom JSON extractor that provides consistent error responses
pub struct AppJson<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppJsonRejection;

    async fn from_request(req: Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(value) => Ok(Self(value.0)),
            Err(rejection) => Err(AppJsonRejection(rejection)),
        }
    }
}

pub struct AppJsonRejection(JsonRejection);

impl IntoResponse for AppJsonRejection {
    fn into_response(self) -> Response {
        let message = match self.0 {
            JsonRejection::JsonDataError(err) => format!("Invalid JSON data: {}", err),
            JsonRejection::JsonSyntaxError(err) => format!("Invalid JSON syntax: {}", err),
            JsonRejection::MissingJsonContentType(err) => {
                format!("Missing JSON content type: {}", err)
            }
            _ => "Failed to parse JSON body".to_string(),
        };

        AppError::Validation(message).into_response()
    }
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::Validation("Request body too large".to_string())
    } else {
        AppError::Validation(format!("Failed to read multipart data: {}", err))
    }
}

/// Reads the `multipart/form-data` chat form and validates it.
///
/// Recognised fields: `threadId` (or `thread_id`), `message` and `file`.
/// An empty thread id counts as absent.
impl<S> FromRequest<S> for ChatRequestForm
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::Validation(format!("Invalid multipart request: {}", e)))?;

        let mut thread_id: Option<String> = None;
        let mut message: Option<String> = None;
        let mut file: Option<ArtifactInput> = None;

        while let Some(field) = multipart.next_field().await.map_err(|e| {
            debug!("Failed to read multipart field: {}", e);
            multipart_error(e)
        })? {
            let field_name = field.name().unwrap_or_default().to_string();

            match field_name.as_str() {
                "threadId" | "thread_id" => {
                    let value = field.text().await.map_err(|e| {
                        AppError::Validation(format!("Failed to read thread id: {}", e))
                    })?;
                    let value = value.trim();
                    thread_id = (!value.is_empty()).then(|| value.to_string());
                }
                "message" => {
                    let value = field.text().await.map_err(|e| {
                        AppError::Validation(format!("Failed to read message: {}", e))
                    })?;
                    message = Some(value);
                }
                "file" => {
                    let media_type = field
                        .content_type()
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| DEFAULT_ARTIFACT_MEDIA_TYPE.to_string());
                    let file_name = field
                        .file_name()
                        .filter(|name| !name.trim().is_empty())
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| DEFAULT_ARTIFACT_FILE_NAME.to_string());

                    let bytes = field.bytes().await.map_err(|e| {
                        debug!("Failed to read file bytes: {}", e);
                        multipart_error(e)
                    })?;

                    file = Some(ArtifactInput {
                        file_name,
                        media_type,
                        bytes: bytes.to_vec(),
                    });
                }
                other => debug!("Ignoring unknown field: {}", other),
            }
        }

        let form = ChatRequestForm {
            thread_id,
            message: message.ok_or_else(|| AppError::Validation("Message is required".to_string()))?,
            file,
        };

        form.validate()
            .map_err(|e| AppError::Validation(format!("Invalid request: {}", e)))?;

        Ok(form)
    }
}
