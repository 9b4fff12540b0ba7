use async_trait::async_trait;
use futures::stream::BoxStream;

use super::types::{
    Assistant, AssistantStreamEvent, CreateAssistant, CreateMessage, FileObject, FileUpload,
    Thread, ThreadMessage, ToolOutput,
};

/// Events of one run stream segment, in arrival order
pub type RunEventStream = BoxStream<'static, Result<AssistantStreamEvent, AssistantApiError>>;

#[derive(Debug, thiserror::Error)]
pub enum AssistantApiError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Assistant API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode assistant API response: {0}")]
    Decode(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Assistant API request timed out")]
    Timeout,
}

/// Operations consumed from the hosted assistant service
#[async_trait]
pub trait AssistantApi: Send + Sync {
    async fn create_thread(&self) -> Result<Thread, AssistantApiError>;

    async fn upload_file(&self, file: FileUpload) -> Result<FileObject, AssistantApiError>;

    async fn create_message(
        &self,
        thread_id: &str,
        message: &CreateMessage,
    ) -> Result<ThreadMessage, AssistantApiError>;

    /// Start a run on the thread and return its event stream
    async fn create_run_stream(
        &self,
        thread_id: &str,
        assistant_id: &str,
    ) -> Result<RunEventStream, AssistantApiError>;

    /// Resume a paused run with tool outputs and return the continued stream
    async fn submit_tool_outputs_stream(
        &self,
        thread_id: &str,
        run_id: &str,
        tool_outputs: &[ToolOutput],
    ) -> Result<RunEventStream, AssistantApiError>;

    async fn create_assistant(
        &self,
        request: &CreateAssistant,
    ) -> Result<Assistant, AssistantApiError>;
}
