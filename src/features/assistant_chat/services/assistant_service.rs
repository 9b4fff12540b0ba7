use std::sync::Arc;

use serde_json::json;
use tracing::info;

use crate::core::config::AssistantConfig;
use crate::core::error::Result;
use crate::features::assistant_chat::tools::ToolRegistry;
use crate::modules::assistant::{Assistant, AssistantApi, CreateAssistant};

/// Overrides for a provisioned assistant; unset fields use configured defaults
#[derive(Debug, Clone)]
pub struct ProvisionRequest {
    pub name: Option<String>,
    pub instructions: Option<String>,
    pub model: Option<String>,
    pub include_local_tools: bool,
}

impl Default for ProvisionRequest {
    fn default() -> Self {
        Self {
            name: None,
            instructions: None,
            model: None,
            include_local_tools: true,
        }
    }
}

/// Service for creating remote assistants wired to the local tools
pub struct AssistantService {
    api: Arc<dyn AssistantApi>,
    tools: ToolRegistry,
    default_name: String,
    default_instructions: String,
    default_model: String,
}

impl AssistantService {
    pub fn new(api: Arc<dyn AssistantApi>, tools: ToolRegistry, config: &AssistantConfig) -> Self {
        Self {
            api,
            tools,
            default_name: config.default_name.clone(),
            default_instructions: config.default_instructions.clone(),
            default_model: config.default_model.clone(),
        }
    }

    pub async fn create_assistant(&self, request: ProvisionRequest) -> Result<Assistant> {
        let mut tools = vec![json!({ "type": "code_interpreter" })];
        if request.include_local_tools {
            tools.extend(
                self.tools
                    .definitions()
                    .iter()
                    .map(|definition| definition.to_function_tool()),
            );
        }

        let body = CreateAssistant {
            name: request.name.unwrap_or_else(|| self.default_name.clone()),
            instructions: request
                .instructions
                .unwrap_or_else(|| self.default_instructions.clone()),
            model: request.model.unwrap_or_else(|| self.default_model.clone()),
            tools,
        };

        let assistant = self.api.create_assistant(&body).await?;
        info!(
            "Created assistant {} ({}) with {} tool(s)",
            assistant.id,
            assistant.model,
            body.tools.len()
        );

        Ok(assistant)
    }
}
