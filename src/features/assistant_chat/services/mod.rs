mod assistant_runtime_service;
mod assistant_service;
mod conversation_service;
mod run_driver;
mod stream_relay;

pub use assistant_runtime_service::{AssistantRuntimeService, ChatStream};
pub use assistant_service::{AssistantService, ProvisionRequest};
pub use conversation_service::{ConversationService, TurnRequest};
pub use run_driver::RunDriver;
