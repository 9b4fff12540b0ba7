use std::sync::Arc;

use tracing::{debug, info};

use crate::core::error::{AppError, Result};
use crate::modules::assistant::{AssistantApi, CreateMessage, FileUpload};
use crate::shared::constants::ARTIFACT_ATTACHMENT_TOOL;

/// One inbound conversational turn
#[derive(Debug, Clone)]
pub struct TurnRequest {
    /// Existing thread to continue; `None` starts a new one
    pub thread_id: Option<String>,
    pub message: String,
    pub artifact: Option<FileUpload>,
}

/// Thread and message the run will be started against
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedTurn {
    pub thread_id: String,
    pub message_id: String,
    pub file_id: Option<String>,
}

/// Service resolving the thread and appending the user's message
pub struct ConversationService {
    api: Arc<dyn AssistantApi>,
}

impl ConversationService {
    pub fn new(api: Arc<dyn AssistantApi>) -> Self {
        Self { api }
    }

    /// Ensure a thread exists, upload the artifact when it has content,
    /// then append the message to the thread.
    pub async fn prepare_turn(&self, request: TurnRequest) -> Result<PreparedTurn> {
        if request.message.trim().is_empty() {
            return Err(AppError::Validation("Message is required".to_string()));
        }

        let thread_id = match request.thread_id.filter(|id| !id.trim().is_empty()) {
            Some(id) => id,
            None => {
                let thread = self.api.create_thread().await?;
                info!("Created thread {}", thread.id);
                thread.id
            }
        };

        let file_id = match request.artifact {
            Some(artifact) if !artifact.bytes.is_empty() => {
                let file = self.api.upload_file(artifact).await?;
                debug!("Uploaded file {} for thread {}", file.id, thread_id);
                Some(file.id)
            }
            _ => None,
        };

        let mut message = CreateMessage::user(request.message);
        if let Some(ref id) = file_id {
            message = message.with_attachment(id.clone(), ARTIFACT_ATTACHMENT_TOOL);
        }

        let created = self.api.create_message(&thread_id, &message).await?;
        debug!("Appended message {} to thread {}", created.id, thread_id);

        Ok(PreparedTurn {
            thread_id,
            message_id: created.id,
            file_id,
        })
    }
}
