use utoipa::{Modify, OpenApi};

use crate::features::assistant_chat::{dtos as assistant_dtos, handlers as assistant_handlers};
use crate::shared::types::ApiResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        assistant_handlers::chat_handler::chat_stream,
        assistant_handlers::assistant_handler::create_assistant,
    ),
    components(
        schemas(
            assistant_dtos::ChatRequestDto,
            assistant_dtos::CreateAssistantRequestDto,
            assistant_dtos::AssistantResponseDto,
            ApiResponse<assistant_dtos::AssistantResponseDto>,
        )
    ),
    tags(
        (name = "assistant", description = "Chat relay and assistant provisioning"),
    ),
    info(
        title = "Assistant Relay API",
        version = "0.1.0",
        description = "API documentation for the assistant relay",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
