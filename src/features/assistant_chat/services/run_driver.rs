//! Client-side orchestration of one assistant run
//!
//! The driver is a small state machine:
//!
//! ```text
//! Start ──▶ Streaming ──▶ Terminal
//!              ▲   │
//!              │   ▼
//!          RequiresAction
//! ```
//!
//! `Start` opens the run stream, `Streaming` relays it until it ends,
//! `RequiresAction` answers every pending tool call and resumes the run as
//! a new stream, and `Terminal` reports the outcome. Cancellation moves any
//! state straight to `Terminal` without further tool calls or resumption.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::core::error::{AppError, Result};
use crate::features::assistant_chat::tools::ToolRegistry;
use crate::modules::assistant::{AssistantApi, Run, RunEventStream, RunStatus, ToolOutput};

use super::stream_relay::{Forwarded, StreamRelay};

/// Final state of a driven run, sent to the client in the `done` frame
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    Completed {
        run_id: String,
    },
    Failed {
        run_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    Cancelled {
        run_id: Option<String>,
    },
    Expired {
        run_id: String,
    },
    Incomplete {
        run_id: String,
    },
    /// The stream closed without reporting a terminal status
    Ended {
        run_id: Option<String>,
        last_status: Option<RunStatus>,
    },
}

impl RunOutcome {
    fn from_run(run: Run) -> Self {
        match run.status {
            RunStatus::Completed => RunOutcome::Completed { run_id: run.id },
            RunStatus::Failed => RunOutcome::Failed {
                run_id: run.id,
                error: run.last_error.map(|e| e.message),
            },
            RunStatus::Cancelled | RunStatus::Cancelling => RunOutcome::Cancelled {
                run_id: Some(run.id),
            },
            RunStatus::Expired => RunOutcome::Expired { run_id: run.id },
            RunStatus::Incomplete => RunOutcome::Incomplete { run_id: run.id },
            status => RunOutcome::Ended {
                run_id: Some(run.id),
                last_status: Some(status),
            },
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            RunOutcome::Completed { .. } => "completed",
            RunOutcome::Failed { .. } => "failed",
            RunOutcome::Cancelled { .. } => "cancelled",
            RunOutcome::Expired { .. } => "expired",
            RunOutcome::Incomplete { .. } => "incomplete",
            RunOutcome::Ended { .. } => "ended",
        }
    }
}

enum DriverState {
    Start,
    Streaming(RunEventStream),
    RequiresAction(Run),
    Terminal(RunOutcome),
}

/// Next state once a stream segment has been relayed
fn after_stream(forwarded: Forwarded) -> DriverState {
    match forwarded {
        Forwarded::Cancelled(run) => DriverState::Terminal(RunOutcome::Cancelled {
            run_id: run.map(|r| r.id),
        }),
        Forwarded::Finished(Some(run)) if run.pending_tool_calls().is_some() => {
            DriverState::RequiresAction(run)
        }
        Forwarded::Finished(Some(run)) => DriverState::Terminal(RunOutcome::from_run(run)),
        Forwarded::Finished(None) => DriverState::Terminal(RunOutcome::Ended {
            run_id: None,
            last_status: None,
        }),
    }
}

/// Resolves to `None` if `cancel` fires first
async fn until_cancelled<F: Future>(cancel: &CancellationToken, fut: F) -> Option<F::Output> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        output = fut => Some(output),
    }
}

/// Drives runs against the remote service, answering tool calls locally
pub struct RunDriver {
    api: Arc<dyn AssistantApi>,
    tools: ToolRegistry,
    assistant_id: Option<String>,
}

impl RunDriver {
    pub fn new(api: Arc<dyn AssistantApi>, tools: ToolRegistry, assistant_id: Option<String>) -> Self {
        Self {
            api,
            tools,
            assistant_id,
        }
    }

    /// Configured assistant identity
    pub fn assistant_id(&self) -> Result<&str> {
        self.assistant_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| AppError::Configuration("ASSISTANT_ID is not set".to_string()))
    }

    /// Run the assistant on `thread_id` until the run reaches a terminal state
    pub async fn drive(
        &self,
        thread_id: &str,
        relay: &StreamRelay,
        cancel: &CancellationToken,
    ) -> Result<RunOutcome> {
        let mut answered: HashSet<String> = HashSet::new();
        let mut state = DriverState::Start;

        loop {
            state = match state {
                DriverState::Start => {
                    let assistant_id = self.assistant_id()?;
                    info!("Starting run on thread {}", thread_id);

                    match until_cancelled(cancel, self.api.create_run_stream(thread_id, assistant_id))
                        .await
                    {
                        Some(stream) => DriverState::Streaming(stream?),
                        None => DriverState::Terminal(RunOutcome::Cancelled { run_id: None }),
                    }
                }

                DriverState::Streaming(stream) => after_stream(relay.forward(stream, cancel).await?),

                DriverState::RequiresAction(run) => {
                    self.answer_tool_calls(thread_id, run, &mut answered, cancel)
                        .await?
                }

                DriverState::Terminal(outcome) => {
                    info!(
                        "Run on thread {} finished with status {}",
                        thread_id,
                        outcome.status()
                    );
                    return Ok(outcome);
                }
            };
        }
    }

    async fn answer_tool_calls(
        &self,
        thread_id: &str,
        run: Run,
        answered: &mut HashSet<String>,
        cancel: &CancellationToken,
    ) -> Result<DriverState> {
        let calls = run.pending_tool_calls().unwrap_or_default();
        if calls.is_empty() {
            return Err(AppError::RemoteService(format!(
                "Run {} requires action but lists no tool calls",
                run.id
            )));
        }
        if let Some(call) = calls.iter().find(|c| answered.contains(&c.id)) {
            return Err(AppError::RemoteService(format!(
                "Run {} asked again for tool call {}",
                run.id, call.id
            )));
        }

        // Unknown names abort here, before any handler touches tool state
        let resolved = self.tools.resolve_all(calls)?;
        info!(
            "Run {} requires {} tool call(s): {}",
            run.id,
            resolved.len(),
            resolved
                .iter()
                .map(|c| c.name())
                .collect::<Vec<_>>()
                .join(", ")
        );

        let mut outputs: Vec<ToolOutput> = Vec::with_capacity(resolved.len());
        for call in &resolved {
            if cancel.is_cancelled() {
                debug!("Cancelled before tool call {}", call.call_id());
                return Ok(DriverState::Terminal(RunOutcome::Cancelled {
                    run_id: Some(run.id.clone()),
                }));
            }
            outputs.push(call.invoke().await);
        }

        let in_order = outputs
            .iter()
            .zip(calls)
            .all(|(output, call)| output.tool_call_id == call.id);
        if outputs.len() != calls.len() || !in_order {
            return Err(AppError::Internal(format!(
                "Tool outputs for run {} do not match its tool calls",
                run.id
            )));
        }
        answered.extend(calls.iter().map(|c| c.id.clone()));

        debug!("Submitting {} tool output(s) for run {}", outputs.len(), run.id);
        match until_cancelled(
            cancel,
            self.api.submit_tool_outputs_stream(thread_id, &run.id, &outputs),
        )
        .await
        {
            Some(Ok(stream)) => Ok(DriverState::Streaming(stream)),
            Some(Err(e)) => {
                warn!("Failed to resume run {}: {}", run.id, e);
                Err(e.into())
            }
            None => Ok(DriverState::Terminal(RunOutcome::Cancelled {
                run_id: Some(run.id.clone()),
            })),
        }
    }
}
