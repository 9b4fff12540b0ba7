//! reqwest-backed client for the OpenAI Assistants v2 API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tracing::debug;

use crate::core::config::AssistantConfig;

use super::client::{AssistantApi, AssistantApiError, RunEventStream};
use super::sse::decode_event_stream;
use super::types::{
    Assistant, CreateAssistant, CreateMessage, FileObject, FileUpload, Thread, ThreadMessage,
    ToolOutput,
};

const ASSISTANTS_BETA_HEADER: &str = "OpenAI-Beta";
const ASSISTANTS_BETA_VALUE: &str = "assistants=v2";
const FILE_PURPOSE: &str = "assistants";

pub struct OpenAiAssistantClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    request_timeout: Duration,
}

impl OpenAiAssistantClient {
    pub fn new(config: &AssistantConfig) -> Result<Self, AssistantApiError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("assistant-relay/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(config.request_timeout)
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| AssistantApiError::Http(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            request_timeout: config.request_timeout,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(val) = HeaderValue::from_str(&format!("Bearer {}", self.api_key)) {
            headers.insert(AUTHORIZATION, val);
        }
        headers.insert(
            ASSISTANTS_BETA_HEADER,
            HeaderValue::from_static(ASSISTANTS_BETA_VALUE),
        );
        headers
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, AssistantApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!("POST {}", path);

        let response = self
            .client
            .post(self.url(path))
            .headers(self.headers())
            .timeout(self.request_timeout)
            .json(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        decode_response(response).await
    }

    /// Open a streaming request. Only the wait for response headers is
    /// bounded here; idle time between events is bounded by the caller.
    async fn open_stream<B>(&self, path: &str, body: &B) -> Result<RunEventStream, AssistantApiError>
    where
        B: Serialize + ?Sized,
    {
        debug!("POST {} (stream)", path);

        let send = self
            .client
            .post(self.url(path))
            .headers(self.headers())
            .json(body)
            .send();

        let response = tokio::time::timeout(self.request_timeout, send)
            .await
            .map_err(|_| AssistantApiError::Timeout)?
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AssistantApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(decode_event_stream(response.bytes_stream()))
    }
}

fn map_reqwest_error(e: reqwest::Error) -> AssistantApiError {
    if e.is_timeout() {
        AssistantApiError::Timeout
    } else {
        AssistantApiError::Http(e.to_string())
    }
}

async fn decode_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, AssistantApiError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AssistantApiError::Status {
            status: status.as_u16(),
            body,
        });
    }

    response
        .json()
        .await
        .map_err(|e| AssistantApiError::Decode(e.to_string()))
}

#[async_trait]
impl AssistantApi for OpenAiAssistantClient {
    async fn create_thread(&self) -> Result<Thread, AssistantApiError> {
        self.post_json("/threads", &json!({})).await
    }

    async fn upload_file(&self, file: FileUpload) -> Result<FileObject, AssistantApiError> {
        debug!(
            "POST /files ({} bytes, {})",
            file.bytes.len(),
            file.media_type
        );

        let part = reqwest::multipart::Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(&file.media_type)
            .map_err(|e| AssistantApiError::InvalidRequest(e.to_string()))?;

        let form = reqwest::multipart::Form::new()
            .text("purpose", FILE_PURPOSE)
            .part("file", part);

        let response = self
            .client
            .post(self.url("/files"))
            .headers(self.headers())
            .timeout(self.request_timeout)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        decode_response(response).await
    }

    async fn create_message(
        &self,
        thread_id: &str,
        message: &CreateMessage,
    ) -> Result<ThreadMessage, AssistantApiError> {
        self.post_json(&format!("/threads/{}/messages", thread_id), message)
            .await
    }

    async fn create_run_stream(
        &self,
        thread_id: &str,
        assistant_id: &str,
    ) -> Result<RunEventStream, AssistantApiError> {
        self.open_stream(
            &format!("/threads/{}/runs", thread_id),
            &json!({ "assistant_id": assistant_id, "stream": true }),
        )
        .await
    }

    async fn submit_tool_outputs_stream(
        &self,
        thread_id: &str,
        run_id: &str,
        tool_outputs: &[ToolOutput],
    ) -> Result<RunEventStream, AssistantApiError> {
        self.open_stream(
            &format!("/threads/{}/runs/{}/submit_tool_outputs", thread_id, run_id),
            &json!({ "tool_outputs": tool_outputs, "stream": true }),
        )
        .await
    }

    async fn create_assistant(
        &self,
        request: &CreateAssistant,
    ) -> Result<Assistant, AssistantApiError> {
        self.post_json("/assistants", request).await
    }
}
