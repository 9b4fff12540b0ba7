use serde_json::json;

use super::registry::ToolDefinition;

pub const GET_ROOM_TEMPERATURE: &str = "getRoomTemperature";
pub const SET_ROOM_TEMPERATURE: &str = "setRoomTemperature";

/// Create the `getRoomTemperature` tool definition
pub fn get_room_temperature_tool() -> ToolDefinition {
    ToolDefinition {
        name: GET_ROOM_TEMPERATURE.to_string(),
        description: "Get the current temperature of a room in the home, in degrees Celsius."
            .to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "room": {
                    "type": "string",
                    "description": "Name of the room, e.g. \"kitchen\" or \"living room\""
                }
            },
            "required": ["room"]
        }),
    }
}

/// Create the `setRoomTemperature` tool definition
pub fn set_room_temperature_tool() -> ToolDefinition {
    ToolDefinition {
        name: SET_ROOM_TEMPERATURE.to_string(),
        description: "Set the target temperature of a room in the home. \
                      Call this only when the user explicitly asks to change a temperature."
            .to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "room": {
                    "type": "string",
                    "description": "Name of the room, e.g. \"kitchen\" or \"living room\""
                },
                "temperature": {
                    "type": "number",
                    "description": "New temperature in degrees Celsius"
                }
            },
            "required": ["room", "temperature"]
        }),
    }
}
