pub mod definitions;
pub mod handlers;
pub mod registry;
pub mod state;

pub use registry::{create_tool_registry, ToolRegistry};
pub use state::{RoomTemperatureStore, UnknownRoomPolicy};
