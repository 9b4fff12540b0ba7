use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::error::AppError;
use crate::modules::assistant::{ToolCall, ToolOutput};

use super::definitions::{get_room_temperature_tool, set_room_temperature_tool};
use super::handlers::{GetRoomTemperature, SetRoomTemperature};
use super::state::RoomTemperatureStore;

/// Failure of a single tool invocation, reported back to the run as its output
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown location: {0}")]
    UnknownLocation(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Tool state is unavailable")]
    Unavailable,
}

/// Function tool as advertised to the remote assistant
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON schema of the argument object
    pub parameters: Value,
}

impl ToolDefinition {
    /// Entry for the `tools` list of an assistant
    pub fn to_function_tool(&self) -> Value {
        json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.parameters,
            }
        })
    }
}

/// Locally executed tool with a typed argument shape
#[async_trait]
pub trait Tool: Send + Sync + 'static {
    type Args: DeserializeOwned + Send;

    fn definition(&self) -> ToolDefinition;

    async fn call(&self, args: Self::Args) -> Result<String, ToolError>;
}

#[async_trait]
trait DynTool: Send + Sync {
    async fn call_json(&self, arguments: &str) -> Result<String, ToolError>;
}

#[async_trait]
impl<T: Tool> DynTool for T {
    async fn call_json(&self, arguments: &str) -> Result<String, ToolError> {
        // The service sends an empty string for tools without parameters
        let raw = if arguments.trim().is_empty() {
            "{}"
        } else {
            arguments
        };
        let args: T::Args =
            serde_json::from_str(raw).map_err(|e| ToolError::InvalidArguments(e.to_string()))?;
        self.call(args).await
    }
}

#[derive(Clone)]
struct RegisteredTool {
    definition: ToolDefinition,
    handler: Arc<dyn DynTool>,
}

/// Tool call paired with the handler that will answer it
pub struct ResolvedCall {
    call: ToolCall,
    handler: Arc<dyn DynTool>,
}

impl ResolvedCall {
    pub fn call_id(&self) -> &str {
        &self.call.id
    }

    pub fn name(&self) -> &str {
        &self.call.function.name
    }

    /// Run the handler. Tool failures become an `{"error": ...}` output
    /// so the remote run always receives an answer for this call.
    pub async fn invoke(&self) -> ToolOutput {
        debug!(
            "Invoking tool {} for call {} with {}",
            self.name(),
            self.call_id(),
            self.call.function.arguments
        );

        let output = match self.handler.call_json(&self.call.function.arguments).await {
            Ok(output) => output,
            Err(e) => {
                warn!("Tool {} failed: {}", self.name(), e);
                json!({ "error": e.to_string() }).to_string()
            }
        };

        ToolOutput {
            tool_call_id: self.call.id.clone(),
            output,
        }
    }
}

/// Name-keyed set of local tools
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, RegisteredTool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool, replacing any tool registered under the same name
    pub fn register<T: Tool>(&mut self, tool: T) {
        let definition = tool.definition();
        self.tools.insert(
            definition.name.clone(),
            RegisteredTool {
                definition,
                handler: Arc::new(tool),
            },
        );
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Definitions sorted by name
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut definitions: Vec<_> = self
            .tools
            .values()
            .map(|t| t.definition.clone())
            .collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }

    /// Look up the handler of every call, in call order.
    ///
    /// Fails on the first unrecognised name so that no handler runs for a
    /// pause that cannot be answered in full.
    pub fn resolve_all(&self, calls: &[ToolCall]) -> Result<Vec<ResolvedCall>, AppError> {
        calls
            .iter()
            .map(|call| {
                self.tools
                    .get(&call.function.name)
                    .map(|tool| ResolvedCall {
                        call: call.clone(),
                        handler: Arc::clone(&tool.handler),
                    })
                    .ok_or_else(|| AppError::UnknownTool(call.function.name.clone()))
            })
            .collect()
    }
}

/// Registry with the room temperature tools over a shared store
pub fn create_tool_registry(store: RoomTemperatureStore) -> ToolRegistry {
    let mut registry = ToolRegistry::new();

    registry.register(GetRoomTemperature::new(store.clone()));
    registry.register(SetRoomTemperature::new(store));

    registry
}
