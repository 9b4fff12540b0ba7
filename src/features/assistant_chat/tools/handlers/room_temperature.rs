use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use crate::features::assistant_chat::tools::definitions::{
    get_room_temperature_tool, set_room_temperature_tool,
};
use crate::features::assistant_chat::tools::registry::{Tool, ToolDefinition, ToolError};
use crate::features::assistant_chat::tools::state::{RoomTemperatureStore, SetOutcome};

const SET_SUCCESS_OUTPUT: &str = "temperature set successfully";

#[derive(Debug, Deserialize)]
pub struct GetRoomTemperatureArgs {
    pub room: String,
}

#[derive(Debug, Deserialize)]
pub struct SetRoomTemperatureArgs {
    pub room: String,
    pub temperature: f64,
}

/// Handle the `getRoomTemperature` tool call
pub struct GetRoomTemperature {
    store: RoomTemperatureStore,
}

impl GetRoomTemperature {
    pub fn new(store: RoomTemperatureStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for GetRoomTemperature {
    type Args = GetRoomTemperatureArgs;

    fn definition(&self) -> ToolDefinition {
        get_room_temperature_tool()
    }

    async fn call(&self, args: GetRoomTemperatureArgs) -> Result<String, ToolError> {
        let temperature = self.store.get(&args.room).await?;
        // 25.0 renders as "25", 21.5 as "21.5"
        Ok(temperature.to_string())
    }
}

/// Handle the `setRoomTemperature` tool call
pub struct SetRoomTemperature {
    store: RoomTemperatureStore,
}

impl SetRoomTemperature {
    pub fn new(store: RoomTemperatureStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for SetRoomTemperature {
    type Args = SetRoomTemperatureArgs;

    fn definition(&self) -> ToolDefinition {
        set_room_temperature_tool()
    }

    async fn call(&self, args: SetRoomTemperatureArgs) -> Result<String, ToolError> {
        if !args.temperature.is_finite() {
            return Err(ToolError::InvalidArguments(
                "temperature must be a finite number".to_string(),
            ));
        }

        match self.store.set(&args.room, args.temperature).await? {
            SetOutcome::Updated { previous } => info!(
                "Room '{}' temperature changed from {} to {}",
                args.room, previous, args.temperature
            ),
            SetOutcome::Created => info!(
                "Room '{}' created with temperature {}",
                args.room, args.temperature
            ),
        }

        Ok(SET_SUCCESS_OUTPUT.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::assistant_chat::tools::state::UnknownRoomPolicy;

    fn tools() -> (GetRoomTemperature, SetRoomTemperature) {
        let store = RoomTemperatureStore::with_defaults(UnknownRoomPolicy::Create);
        (
            GetRoomTemperature::new(store.clone()),
            SetRoomTemperature::new(store),
        )
    }

    #[tokio::test]
    async fn test_set_then_get_returns_new_value() {
        let (get, set) = tools();

        let set_output = set
            .call(SetRoomTemperatureArgs {
                room: "kitchen".to_string(),
                temperature: 25.0,
            })
            .await
            .unwrap();
        let get_output = get
            .call(GetRoomTemperatureArgs {
                room: "kitchen".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(set_output, "temperature set successfully");
        assert_eq!(get_output, "25");
    }

    #[tokio::test]
    async fn test_fractional_temperature_is_kept() {
        let (get, set) = tools();

        set.call(SetRoomTemperatureArgs {
            room: "bathroom".to_string(),
            temperature: 21.5,
        })
        .await
        .unwrap();

        let output = get
            .call(GetRoomTemperatureArgs {
                room: "bathroom".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(output, "21.5");
    }

    #[tokio::test]
    async fn test_get_unmodeled_room_is_unknown_location() {
        let (get, _) = tools();

        let err = get
            .call(GetRoomTemperatureArgs {
                room: "garage".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ToolError::UnknownLocation(ref room) if room == "garage"));
    }

    #[tokio::test]
    async fn test_set_rejects_non_finite_temperature() {
        let (_, set) = tools();

        let err = set
            .call(SetRoomTemperatureArgs {
                room: "kitchen".to_string(),
                temperature: f64::NAN,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }
}
