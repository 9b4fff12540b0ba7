use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    response::{sse::KeepAlive, IntoResponse, Response, Sse},
};
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use tracing::debug;

use crate::core::error::Result;
use crate::features::assistant_chat::dtos::{ChatRequestDto, ChatRequestForm};
use crate::features::assistant_chat::services::{AssistantRuntimeService, ChatStream};
use crate::shared::constants::SSE_KEEP_ALIVE_SECS;

/// State for chat handlers
#[derive(Clone)]
pub struct ChatState {
    pub runtime: Arc<AssistantRuntimeService>,
}

/// Send a message and stream the assistant's run back as SSE
///
/// Events: `metadata` (`{"thread_id","message_id"}`) first, then every run
/// event under its original name, then `done` (`{"status",...}`) or
/// `error` (`{"kind","message"}`).
#[utoipa::path(
    post,
    path = "/api/assistant",
    request_body(
        content = ChatRequestDto,
        content_type = "multipart/form-data",
        description = "Message with optional thread id and file"
    ),
    responses(
        (status = 200, description = "SSE stream of run events", content_type = "text/event-stream"),
        (status = 400, description = "Validation error"),
        (status = 502, description = "Assistant service error"),
        (status = 503, description = "Assistant is not configured")
    ),
    tag = "assistant"
)]
pub async fn chat_stream(
    State(state): State<ChatState>,
    form: ChatRequestForm,
) -> Result<Response> {
    let ChatStream {
        turn,
        frames,
        cancel_guard,
    } = state.runtime.chat_stream(form.into()).await?;

    debug!(
        "Streaming run for thread {} (message {})",
        turn.thread_id, turn.message_id
    );

    // The guard lives as long as the response body; a client disconnect
    // drops it and cancels the run
    let stream = ReceiverStream::new(frames).map(move |frame| {
        let _guard = &cancel_guard;
        Ok::<_, Infallible>(frame.into_sse_event())
    });

    let sse = Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(SSE_KEEP_ALIVE_SECS))
            .text("ping"),
    );

    Ok(sse.into_response())
}
