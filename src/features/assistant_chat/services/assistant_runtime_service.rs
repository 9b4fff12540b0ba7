use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{error, Instrument, Span};

use crate::core::error::Result;
use crate::shared::constants::RELAY_CHANNEL_CAPACITY;

use super::conversation_service::{ConversationService, PreparedTurn, TurnRequest};
use super::run_driver::RunDriver;
use super::stream_relay::{RelayFrame, StreamRelay};

/// Frames of one turn plus the guard tying the run to the response.
///
/// Dropping `cancel_guard` (for example when the client disconnects and the
/// SSE body is dropped) cancels the orchestration.
pub struct ChatStream {
    pub turn: PreparedTurn,
    pub frames: mpsc::Receiver<RelayFrame>,
    pub cancel_guard: DropGuard,
}

/// Service tying the conversation setup to the run driver for one turn
pub struct AssistantRuntimeService {
    conversations: ConversationService,
    driver: Arc<RunDriver>,
    stream_idle_timeout: Duration,
}

impl AssistantRuntimeService {
    pub fn new(
        conversations: ConversationService,
        driver: RunDriver,
        stream_idle_timeout: Duration,
    ) -> Self {
        Self {
            conversations,
            driver: Arc::new(driver),
            stream_idle_timeout,
        }
    }

    /// Prepare the turn, then drive the run in the background.
    ///
    /// Errors before the run starts are returned directly. Once streaming,
    /// the receiver yields `Metadata` first and ends with either `Done` or
    /// `Error`.
    pub async fn chat_stream(&self, request: TurnRequest) -> Result<ChatStream> {
        // Fail fast, before the thread is created
        self.driver.assistant_id()?;

        let turn = self.conversations.prepare_turn(request).await?;

        let (relay, frames) = StreamRelay::channel(RELAY_CHANNEL_CAPACITY, self.stream_idle_timeout);
        let cancel = CancellationToken::new();

        let driver = Arc::clone(&self.driver);
        let task_cancel = cancel.clone();
        let thread_id = turn.thread_id.clone();
        let metadata = RelayFrame::Metadata {
            thread_id: turn.thread_id.clone(),
            message_id: turn.message_id.clone(),
        };

        tokio::spawn(
            async move {
                if !relay.send(metadata).await {
                    return;
                }

                let last = match driver.drive(&thread_id, &relay, &task_cancel).await {
                    Ok(outcome) => RelayFrame::Done(outcome),
                    Err(e) => {
                        error!("Run on thread {} failed: {}", thread_id, e);
                        RelayFrame::error(&e)
                    }
                };
                relay.send(last).await;
            }
            .instrument(Span::current()),
        );

        Ok(ChatStream {
            turn,
            frames,
            cancel_guard: cancel.drop_guard(),
        })
    }
}
