use std::time::Duration;

use axum::response::sse::Event;
use futures::StreamExt;
use serde::Serialize;
use serde_json::json;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::core::error::{AppError, Result};
use crate::modules::assistant::{AssistantStreamEvent, Run, RunEventStream};

use super::run_driver::RunOutcome;

/// Frame delivered to the client, in order
#[derive(Debug, Clone, PartialEq)]
pub enum RelayFrame {
    /// First frame of every turn
    Metadata {
        thread_id: String,
        message_id: String,
    },
    /// Remote event passed through untouched
    Event(AssistantStreamEvent),
    Done(RunOutcome),
    Error {
        kind: &'static str,
        message: String,
    },
}

#[derive(Serialize)]
struct MetadataPayload<'a> {
    thread_id: &'a str,
    message_id: &'a str,
}

impl RelayFrame {
    pub fn error(err: &AppError) -> Self {
        let message = match err {
            AppError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };
        RelayFrame::Error {
            kind: err.kind(),
            message,
        }
    }

    pub fn into_sse_event(self) -> Event {
        let (name, data) = match self {
            RelayFrame::Metadata {
                ref thread_id,
                ref message_id,
            } => (
                "metadata".to_string(),
                serde_json::to_string(&MetadataPayload {
                    thread_id,
                    message_id,
                })
                .unwrap_or_default(),
            ),
            RelayFrame::Event(event) => (event.event, event.data),
            RelayFrame::Done(outcome) => (
                "done".to_string(),
                serde_json::to_string(&outcome).unwrap_or_default(),
            ),
            RelayFrame::Error { kind, message } => (
                "error".to_string(),
                json!({ "kind": kind, "message": message }).to_string(),
            ),
        };

        // SSE fields cannot carry carriage returns
        Event::default()
            .event(name.replace(['\r', '\n'], ""))
            .data(data.replace('\r', ""))
    }
}

/// How a forwarded stream segment ended
#[derive(Debug, Clone, PartialEq)]
pub enum Forwarded {
    /// The remote stream ended; holds the last run snapshot seen
    Finished(Option<Run>),
    /// The caller went away or cancelled before the stream ended
    Cancelled(Option<Run>),
}

/// Forwards remote run events to the client as they arrive
pub struct StreamRelay {
    tx: mpsc::Sender<RelayFrame>,
    idle_timeout: Duration,
}

impl StreamRelay {
    pub fn channel(capacity: usize, idle_timeout: Duration) -> (Self, mpsc::Receiver<RelayFrame>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx, idle_timeout }, rx)
    }

    /// Returns `false` once the client side is gone
    pub async fn send(&self, frame: RelayFrame) -> bool {
        self.tx.send(frame).await.is_ok()
    }

    /// Relay every event of `stream` until it ends, tracking the latest
    /// run snapshot so the driver can pick its next state.
    pub async fn forward(
        &self,
        mut stream: RunEventStream,
        cancel: &CancellationToken,
    ) -> Result<Forwarded> {
        let mut last_run: Option<Run> = None;

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("Relay cancelled mid-stream");
                    return Ok(Forwarded::Cancelled(last_run));
                }
                next = tokio::time::timeout(self.idle_timeout, stream.next()) => next,
            };

            let event = match next {
                Err(_) => {
                    return Err(AppError::RemoteService(format!(
                        "No run event received within {}s",
                        self.idle_timeout.as_secs()
                    )))
                }
                Ok(None) => return Ok(Forwarded::Finished(last_run)),
                Ok(Some(Err(e))) => return Err(e.into()),
                Ok(Some(Ok(event))) => event,
            };

            if event.is_done() {
                return Ok(Forwarded::Finished(last_run));
            }

            if event.is_error() {
                let message = event.error_message();
                warn!("Run stream reported an error: {}", message);
                return Err(AppError::RemoteService(message));
            }

            if let Some(snapshot) = event.run_snapshot() {
                let run = snapshot.map_err(|e| {
                    AppError::RemoteService(format!(
                        "Malformed run snapshot in {}: {}",
                        event.event, e
                    ))
                })?;
                last_run = Some(run);
            }

            if !self.send(RelayFrame::Event(event)).await {
                debug!("Client disconnected, stopping relay");
                return Ok(Forwarded::Cancelled(last_run));
            }
        }
    }
}
