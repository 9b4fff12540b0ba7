//! Hosted assistant service client
//!
//! Wire types, run-stream decoding, the `AssistantApi` seam used by the
//! chat feature, and its reqwest implementation.

mod client;
mod openai_client;
mod sse;
mod types;

pub use client::{AssistantApi, AssistantApiError, RunEventStream};
pub use openai_client::OpenAiAssistantClient;
#[cfg(test)]
pub use sse::SseDecoder;
pub use types::{
    Assistant, AssistantStreamEvent, AttachmentTool, CreateAssistant, CreateMessage, FileUpload,
    FunctionCall, Run, RunStatus, ToolCall, ToolOutput,
};
#[cfg(test)]
pub use types::{FileObject, Thread, ThreadMessage};
