//! Wire types for the hosted assistant API (threads, files, messages, runs)

use serde::{Deserialize, Serialize};

/// Remote conversation context
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Thread {
    pub id: String,
    #[serde(default)]
    pub created_at: Option<i64>,
}

/// File stored remotely for use by assistants
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FileObject {
    pub id: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub bytes: Option<u64>,
}

/// Message appended to a thread
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ThreadMessage {
    pub id: String,
    #[serde(default)]
    pub thread_id: Option<String>,
}

/// Provisioned assistant
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Assistant {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub model: String,
    pub created_at: i64,
}

/// Raw file payload handed to the remote store
#[derive(Debug, Clone, PartialEq)]
pub struct FileUpload {
    pub file_name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
}

/// Tool a message attachment is made available to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AttachmentTool {
    CodeInterpreter,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageAttachment {
    pub file_id: String,
    pub tools: Vec<AttachmentTool>,
}

/// Body of the append-message call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateMessage {
    pub role: MessageRole,
    pub content: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<MessageAttachment>,
}

impl CreateMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            attachments: Vec::new(),
        }
    }

    pub fn with_attachment(mut self, file_id: impl Into<String>, tool: AttachmentTool) -> Self {
        self.attachments.push(MessageAttachment {
            file_id: file_id.into(),
            tools: vec![tool],
        });
        self
    }
}

/// Body of the create-assistant call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateAssistant {
    pub name: String,
    pub instructions: String,
    pub model: String,
    pub tools: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Completed,
    Incomplete,
    Expired,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RunError {
    #[serde(default)]
    pub code: Option<String>,
    pub message: String,
}

/// Snapshot of a run as reported by `thread.run.*` stream events
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Run {
    pub id: String,
    #[serde(default)]
    pub thread_id: Option<String>,
    pub status: RunStatus,
    #[serde(default)]
    pub required_action: Option<RequiredAction>,
    #[serde(default)]
    pub last_error: Option<RunError>,
}

impl Run {
    /// Tool calls to satisfy when the run is paused on `submit_tool_outputs`
    pub fn pending_tool_calls(&self) -> Option<&[ToolCall]> {
        if self.status != RunStatus::RequiresAction {
            return None;
        }
        match self.required_action.as_ref()? {
            RequiredAction::SubmitToolOutputs { submit_tool_outputs } => {
                Some(&submit_tool_outputs.tool_calls)
            }
            RequiredAction::Other => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RequiredAction {
    SubmitToolOutputs {
        submit_tool_outputs: SubmitToolOutputs,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SubmitToolOutputs {
    pub tool_calls: Vec<ToolCall>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub function: FunctionCall,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded argument object
    pub arguments: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolOutput {
    pub tool_call_id: String,
    pub output: String,
}

/// One server-sent event of a run stream, kept verbatim for relaying
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantStreamEvent {
    pub event: String,
    pub data: String,
}

impl AssistantStreamEvent {
    pub fn new(event: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            data: data.into(),
        }
    }

    /// Transport sentinel closing the stream
    pub fn is_done(&self) -> bool {
        self.event == "done" || self.data == "[DONE]"
    }

    pub fn is_error(&self) -> bool {
        self.event == "error"
    }

    /// `thread.run.<status>` events carry a full run object; run step events do not
    pub fn is_run_event(&self) -> bool {
        self.event.starts_with("thread.run.") && !self.event.starts_with("thread.run.step.")
    }

    pub fn run_snapshot(&self) -> Option<Result<Run, serde_json::Error>> {
        if !self.is_run_event() {
            return None;
        }
        Some(serde_json::from_str(&self.data))
    }

    /// Human-readable message of an `error` event
    pub fn error_message(&self) -> String {
        serde_json::from_str::<serde_json::Value>(&self.data)
            .ok()
            .and_then(|v| {
                v.get("error")
                    .and_then(|e| e.get("message"))
                    .or_else(|| v.get("message"))
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| self.data.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_requires_action_snapshot_exposes_tool_calls() {
        let data = json!({
            "id": "run_1",
            "thread_id": "thread_1",
            "status": "requires_action",
            "required_action": {
                "type": "submit_tool_outputs",
                "submit_tool_outputs": {
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {"name": "getRoomTemperature", "arguments": "{\"room\":\"kitchen\"}"}
                    }]
                }
            }
        });
        let event = AssistantStreamEvent::new("thread.run.requires_action", data.to_string());

        let run = event.run_snapshot().unwrap().unwrap();
        let calls = run.pending_tool_calls().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].function.name, "getRoomTemperature");
    }

    #[test]
    fn test_run_step_events_are_not_snapshots() {
        let event = AssistantStreamEvent::new("thread.run.step.created", "{}");
        assert!(event.run_snapshot().is_none());

        let event = AssistantStreamEvent::new("thread.message.delta", "{}");
        assert!(event.run_snapshot().is_none());
    }

    #[test]
    fn test_unknown_status_and_action_are_tolerated() {
        let data = json!({
            "id": "run_1",
            "status": "something_new",
            "required_action": {"type": "other_action"}
        });
        let run: Run = serde_json::from_value(data).unwrap();
        assert_eq!(run.status, RunStatus::Unknown);
        assert_eq!(run.required_action, Some(RequiredAction::Other));
        assert!(run.pending_tool_calls().is_none());
    }

    #[test]
    fn test_error_message_extraction() {
        let event = AssistantStreamEvent::new(
            "error",
            json!({"error": {"message": "rate limited"}}).to_string(),
        );
        assert_eq!(event.error_message(), "rate limited");

        let raw = AssistantStreamEvent::new("error", "plain failure");
        assert_eq!(raw.error_message(), "plain failure");
    }

    #[test]
    fn test_message_without_attachments_omits_field() {
        let body = serde_json::to_value(CreateMessage::user("hi")).unwrap();
        assert_eq!(body, json!({"role": "user", "content": "hi"}));

        let body = serde_json::to_value(
            CreateMessage::user("hi").with_attachment("file_1", AttachmentTool::CodeInterpreter),
        )
        .unwrap();
        assert_eq!(
            body["attachments"],
            json!([{"file_id": "file_1", "tools": [{"type": "code_interpreter"}]}])
        );
    }
}
