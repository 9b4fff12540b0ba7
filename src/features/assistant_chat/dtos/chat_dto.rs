use serde::Serialize;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::features::assistant_chat::services::TurnRequest;
use crate::modules::assistant::FileUpload;
use crate::shared::constants::MAX_ARTIFACT_SIZE;
use crate::shared::validation::{validate_not_blank, THREAD_ID_REGEX};

/// Media types accepted for chat artifacts
pub const ALLOWED_ARTIFACT_MEDIA_TYPES: &[&str] = &[
    // Images
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    // Documents
    "application/pdf",
    "text/plain",
    "text/markdown",
    "text/csv",
    "application/json",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
];

/// Check if a media type is allowed for chat artifacts
pub fn is_artifact_media_type_allowed(media_type: &str) -> bool {
    // Ignore parameters such as "; charset=utf-8"
    let essence = media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    ALLOWED_ARTIFACT_MEDIA_TYPES.contains(&essence.as_str()) || essence.starts_with("image/")
}

/// File part of a chat form
///
/// Serialized only into validation error params, so the content is left out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtifactInput {
    pub file_name: String,
    pub media_type: String,
    #[serde(skip_serializing)]
    pub bytes: Vec<u8>,
}

impl ArtifactInput {
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

fn validate_artifact(artifact: &ArtifactInput) -> Result<(), ValidationError> {
    // Empty parts are placeholders from forms without a selected file
    if artifact.is_empty() {
        return Ok(());
    }

    if artifact.bytes.len() > MAX_ARTIFACT_SIZE {
        let mut err = ValidationError::new("file_too_large");
        err.message = Some(
            format!(
                "File too large. Maximum size is {} MB",
                MAX_ARTIFACT_SIZE / 1024 / 1024
            )
            .into(),
        );
        return Err(err);
    }

    if !is_artifact_media_type_allowed(&artifact.media_type) {
        let mut err = ValidationError::new("file_type");
        err.message = Some(format!("File type '{}' is not allowed", artifact.media_type).into());
        return Err(err);
    }

    Ok(())
}

/// Parsed multipart chat request
#[derive(Debug, Clone, Validate)]
pub struct ChatRequestForm {
    #[validate(regex(
        path = *THREAD_ID_REGEX,
        message = "Thread ID may only contain letters, digits, '_' and '-'"
    ))]
    pub thread_id: Option<String>,

    #[validate(
        length(
            min = 1,
            max = 32000,
            message = "Message must be between 1 and 32000 characters"
        ),
        custom(function = validate_not_blank)
    )]
    pub message: String,

    #[validate(custom(function = validate_artifact))]
    pub file: Option<ArtifactInput>,
}

impl From<ChatRequestForm> for TurnRequest {
    fn from(form: ChatRequestForm) -> Self {
        TurnRequest {
            thread_id: form.thread_id,
            message: form.message,
            artifact: form.file.filter(|f| !f.is_empty()).map(|f| FileUpload {
                file_name: f.file_name,
                media_type: f.media_type,
                bytes: f.bytes,
            }),
        }
    }
}

/// Chat request form for OpenAPI documentation
/// Note: This struct is for Swagger UI documentation only.
/// The actual handler parses the multipart body into [`ChatRequestForm`].
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct ChatRequestDto {
    /// Existing thread to continue. Omit or leave empty to start a new one.
    /// `threadId` is accepted as well.
    pub thread_id: Option<String>,

    /// The user's message (1-32000 characters)
    pub message: String,

    /// Optional file made available to the assistant's code interpreter.
    /// An empty file part is ignored.
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(thread_id: Option<&str>, message: &str, file: Option<ArtifactInput>) -> ChatRequestForm {
        ChatRequestForm {
            thread_id: thread_id.map(String::from),
            message: message.to_string(),
            file,
        }
    }

    fn artifact(media_type: &str, size: usize) -> ArtifactInput {
        ArtifactInput {
            file_name: "upload".to_string(),
            media_type: media_type.to_string(),
            bytes: vec![b'x'; size],
        }
    }

    #[test]
    fn test_valid_form() {
        assert!(form(None, "hello", None).validate().is_ok());
        assert!(form(Some("thread_abc"), "hello", Some(artifact("application/pdf", 10)))
            .validate()
            .is_ok());
    }

    #[test]
    fn test_message_rules() {
        assert!(form(None, "", None).validate().is_err());
        assert!(form(None, "  \n ", None).validate().is_err());
        assert!(form(None, &"a".repeat(32_001), None).validate().is_err());
        assert!(form(None, &"a".repeat(32_000), None).validate().is_ok());
    }

    #[test]
    fn test_thread_id_rules() {
        let errors = form(Some("../etc"), "hi", None).validate().unwrap_err();
        assert!(errors.field_errors().contains_key("thread_id"));
    }

    #[test]
    fn test_file_rules() {
        assert!(form(None, "hi", Some(artifact("video/mp4", 10)))
            .validate()
            .is_err());
        assert!(form(None, "hi", Some(artifact("image/png", MAX_ARTIFACT_SIZE + 1)))
            .validate()
            .is_err());
        // An empty part is not an attachment, whatever its declared type
        assert!(form(None, "hi", Some(artifact("video/mp4", 0)))
            .validate()
            .is_ok());
    }

    #[test]
    fn test_file_error_reports_metadata_without_content() {
        let errors = form(None, "hi", Some(artifact("video/mp4", 10)))
            .validate()
            .unwrap_err();
        let field_errors = errors.field_errors();
        let file_error = &field_errors["file"][0];

        assert_eq!(file_error.code, "file_type");
        let value = &file_error.params["value"];
        assert_eq!(value["file_name"], "upload");
        assert_eq!(value["media_type"], "video/mp4");
        assert!(value.get("bytes").is_none());
    }

    #[test]
    fn test_media_type_parameters_are_ignored() {
        assert!(is_artifact_media_type_allowed("text/plain; charset=utf-8"));
        assert!(is_artifact_media_type_allowed("IMAGE/HEIC"));
        assert!(!is_artifact_media_type_allowed("application/x-msdownload"));
    }

    #[test]
    fn test_empty_file_becomes_no_artifact() {
        let turn: TurnRequest = form(None, "hi", Some(artifact("text/plain", 0))).into();
        assert!(turn.artifact.is_none());

        let turn: TurnRequest = form(Some("thread_1"), "hi", Some(artifact("text/plain", 3))).into();
        assert_eq!(turn.thread_id.as_deref(), Some("thread_1"));
        assert_eq!(turn.artifact.unwrap().bytes.len(), 3);
    }
}
