use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::assistant_chat::services::ProvisionRequest;
use crate::modules::assistant::Assistant;

/// Request DTO for provisioning a remote assistant
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct CreateAssistantRequestDto {
    /// Display name, defaults to the configured name
    #[validate(length(min = 1, max = 256, message = "Name must be between 1 and 256 characters"))]
    pub name: Option<String>,

    /// System instructions, defaults to the configured instructions
    #[validate(length(
        min = 1,
        max = 256000,
        message = "Instructions must be between 1 and 256000 characters"
    ))]
    pub instructions: Option<String>,

    /// Model name, defaults to the configured model
    #[validate(length(min = 1, max = 100, message = "Model must be between 1 and 100 characters"))]
    pub model: Option<String>,

    /// Advertise the local room temperature tools (default: true)
    pub include_local_tools: Option<bool>,
}

impl From<CreateAssistantRequestDto> for ProvisionRequest {
    fn from(dto: CreateAssistantRequestDto) -> Self {
        ProvisionRequest {
            name: dto.name,
            instructions: dto.instructions,
            model: dto.model,
            include_local_tools: dto.include_local_tools.unwrap_or(true),
        }
    }
}

/// Response DTO for a provisioned assistant
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssistantResponseDto {
    /// Identifier to configure as `ASSISTANT_ID`
    pub id: String,
    pub name: Option<String>,
    pub model: String,
    pub created_at: DateTime<Utc>,
}

impl From<Assistant> for AssistantResponseDto {
    fn from(assistant: Assistant) -> Self {
        Self {
            id: assistant.id,
            name: assistant.name,
            model: assistant.model,
            created_at: DateTime::from_timestamp(assistant.created_at, 0).unwrap_or_default(),
        }
    }
}
