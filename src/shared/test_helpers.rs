use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use futures::StreamExt;
use serde_json::{json, Value};

use crate::modules::assistant::{
    Assistant, AssistantApi, AssistantApiError, AssistantStreamEvent, CreateAssistant,
    CreateMessage, FileObject, FileUpload, RunEventStream, Thread, ThreadMessage, ToolOutput,
};

pub const TEST_THREAD_ID: &str = "thread_test";

/// Remote call recorded by [`FakeAssistantApi`]
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteCall {
    CreateThread,
    UploadFile {
        file_name: String,
        media_type: String,
        size: usize,
    },
    CreateMessage {
        thread_id: String,
        message: CreateMessage,
    },
    CreateRun {
        thread_id: String,
        assistant_id: String,
    },
    SubmitToolOutputs {
        thread_id: String,
        run_id: String,
        outputs: Vec<ToolOutput>,
    },
    CreateAssistant {
        request: CreateAssistant,
    },
}

/// Stream segment handed out by the next run start or resume call
pub enum ScriptedStream {
    /// Yields the events, then ends
    Events(Vec<AssistantStreamEvent>),
    /// Yields the events, then never produces another item
    EventsThenHang(Vec<AssistantStreamEvent>),
    /// The call itself never returns
    HangOnCall,
    /// The call itself fails
    Fail,
}

/// Scripted stand-in for the hosted assistant service
#[derive(Default)]
pub struct FakeAssistantApi {
    calls: Mutex<Vec<RemoteCall>>,
    streams: Mutex<VecDeque<ScriptedStream>>,
    fail_thread_creation: bool,
    fail_upload: bool,
}

impl FakeAssistantApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stream(self, stream: ScriptedStream) -> Self {
        self.streams.lock().unwrap().push_back(stream);
        self
    }

    pub fn failing_thread_creation(mut self) -> Self {
        self.fail_thread_creation = true;
        self
    }

    pub fn failing_upload(mut self) -> Self {
        self.fail_upload = true;
        self
    }

    pub fn calls(&self) -> Vec<RemoteCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn upload_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, RemoteCall::UploadFile { .. }))
            .count()
    }

    pub fn submissions(&self) -> Vec<Vec<ToolOutput>> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                RemoteCall::SubmitToolOutputs { outputs, .. } => Some(outputs),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: RemoteCall) {
        self.calls.lock().unwrap().push(call);
    }

    async fn next_stream(&self) -> Result<RunEventStream, AssistantApiError> {
        let next = self.streams.lock().unwrap().pop_front();
        match next {
            Some(ScriptedStream::HangOnCall) => futures::future::pending().await,
            Some(ScriptedStream::Events(events)) => {
                Ok(futures::stream::iter(events.into_iter().map(Ok)).boxed())
            }
            Some(ScriptedStream::EventsThenHang(events)) => Ok(futures::stream::iter(
                events.into_iter().map(Ok),
            )
            .chain(futures::stream::pending())
            .boxed()),
            Some(ScriptedStream::Fail) | None => Err(AssistantApiError::Status {
                status: 500,
                body: "scripted failure".to_string(),
            }),
        }
    }
}

#[async_trait]
impl AssistantApi for FakeAssistantApi {
    async fn create_thread(&self) -> Result<Thread, AssistantApiError> {
        self.record(RemoteCall::CreateThread);
        if self.fail_thread_creation {
            return Err(AssistantApiError::Http("connection refused".to_string()));
        }
        Ok(Thread {
            id: TEST_THREAD_ID.to_string(),
            created_at: None,
        })
    }

    async fn upload_file(&self, file: FileUpload) -> Result<FileObject, AssistantApiError> {
        self.record(RemoteCall::UploadFile {
            file_name: file.file_name.clone(),
            media_type: file.media_type.clone(),
            size: file.bytes.len(),
        });
        if self.fail_upload {
            return Err(AssistantApiError::Status {
                status: 413,
                body: "file too large".to_string(),
            });
        }
        Ok(FileObject {
            id: "file_test".to_string(),
            filename: Some(file.file_name),
            bytes: Some(file.bytes.len() as u64),
        })
    }

    async fn create_message(
        &self,
        thread_id: &str,
        message: &CreateMessage,
    ) -> Result<ThreadMessage, AssistantApiError> {
        self.record(RemoteCall::CreateMessage {
            thread_id: thread_id.to_string(),
            message: message.clone(),
        });
        Ok(ThreadMessage {
            id: "msg_test".to_string(),
            thread_id: Some(thread_id.to_string()),
        })
    }

    async fn create_run_stream(
        &self,
        thread_id: &str,
        assistant_id: &str,
    ) -> Result<RunEventStream, AssistantApiError> {
        self.record(RemoteCall::CreateRun {
            thread_id: thread_id.to_string(),
            assistant_id: assistant_id.to_string(),
        });
        self.next_stream().await
    }

    async fn submit_tool_outputs_stream(
        &self,
        thread_id: &str,
        run_id: &str,
        tool_outputs: &[ToolOutput],
    ) -> Result<RunEventStream, AssistantApiError> {
        self.record(RemoteCall::SubmitToolOutputs {
            thread_id: thread_id.to_string(),
            run_id: run_id.to_string(),
            outputs: tool_outputs.to_vec(),
        });
        self.next_stream().await
    }

    async fn create_assistant(
        &self,
        request: &CreateAssistant,
    ) -> Result<Assistant, AssistantApiError> {
        self.record(RemoteCall::CreateAssistant {
            request: request.clone(),
        });
        Ok(Assistant {
            id: "asst_test".to_string(),
            name: Some(request.name.clone()),
            model: request.model.clone(),
            created_at: 1_700_000_000,
        })
    }
}

/// `thread.run.<status>` event carrying a run snapshot
pub fn run_event(status: &str, run_id: &str) -> AssistantStreamEvent {
    AssistantStreamEvent::new(
        format!("thread.run.{}", status),
        json!({"id": run_id, "thread_id": TEST_THREAD_ID, "status": status}).to_string(),
    )
}

/// Text delta of an assistant message
pub fn text_delta(text: &str) -> AssistantStreamEvent {
    AssistantStreamEvent::new(
        "thread.message.delta",
        json!({
            "id": "msg_assistant",
            "delta": {"content": [{"index": 0, "type": "text", "text": {"value": text}}]}
        })
        .to_string(),
    )
}

/// Pause for tool outputs; each call is `(call_id, function_name, arguments)`
pub fn requires_action(run_id: &str, calls: &[(&str, &str, Value)]) -> AssistantStreamEvent {
    let tool_calls: Vec<Value> = calls
        .iter()
        .map(|(id, name, args)| {
            json!({
                "id": id,
                "type": "function",
                "function": {"name": name, "arguments": args.to_string()}
            })
        })
        .collect();

    AssistantStreamEvent::new(
        "thread.run.requires_action",
        json!({
            "id": run_id,
            "thread_id": TEST_THREAD_ID,
            "status": "requires_action",
            "required_action": {
                "type": "submit_tool_outputs",
                "submit_tool_outputs": {"tool_calls": tool_calls}
            }
        })
        .to_string(),
    )
}
