pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;
pub mod tools;

pub use services::{AssistantRuntimeService, AssistantService, ConversationService, RunDriver};
pub use tools::{create_tool_registry, RoomTemperatureStore, UnknownRoomPolicy};
