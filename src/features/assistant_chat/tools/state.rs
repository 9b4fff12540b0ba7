//! Room temperature state owned by a single actor task
//!
//! Every read and write goes through one channel, so concurrent runs
//! invoking the temperature tools are serialized without any lock being
//! held across remote calls.

use std::collections::HashMap;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use super::registry::ToolError;

const COMMAND_CHANNEL_CAPACITY: usize = 32;

/// Rooms known at startup, in degrees Celsius
pub const DEFAULT_ROOM_TEMPERATURES: &[(&str, f64)] = &[
    ("bedroom", 20.0),
    ("home office", 21.0),
    ("living room", 21.0),
    ("kitchen", 22.0),
    ("bathroom", 23.0),
];

/// What `set` does with a room that is not in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownRoomPolicy {
    Create,
    Reject,
}

/// Result of a successful `set`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SetOutcome {
    Updated { previous: f64 },
    Created,
}

enum Command {
    Get {
        room: String,
        reply: oneshot::Sender<Option<f64>>,
    },
    Set {
        room: String,
        temperature: f64,
        reply: oneshot::Sender<Option<SetOutcome>>,
    },
}

struct RoomTemperatureActor {
    rooms: HashMap<String, f64>,
    policy: UnknownRoomPolicy,
    rx: mpsc::Receiver<Command>,
}

impl RoomTemperatureActor {
    async fn run(mut self) {
        while let Some(command) = self.rx.recv().await {
            match command {
                Command::Get { room, reply } => {
                    let _ = reply.send(self.rooms.get(&room).copied());
                }
                Command::Set {
                    room,
                    temperature,
                    reply,
                } => {
                    let _ = reply.send(self.set(room, temperature));
                }
            }
        }
        debug!("Room temperature store shut down");
    }

    fn set(&mut self, room: String, temperature: f64) -> Option<SetOutcome> {
        match self.rooms.get_mut(&room) {
            Some(current) => {
                let previous = *current;
                *current = temperature;
                Some(SetOutcome::Updated { previous })
            }
            None if self.policy == UnknownRoomPolicy::Create => {
                info!("Registering new room '{}' at {}", room, temperature);
                self.rooms.insert(room, temperature);
                Some(SetOutcome::Created)
            }
            None => None,
        }
    }
}

/// Cloneable handle to the room temperature actor
#[derive(Clone)]
pub struct RoomTemperatureStore {
    tx: mpsc::Sender<Command>,
}

impl RoomTemperatureStore {
    /// Spawn the actor on the current tokio runtime
    pub fn spawn<I, K>(initial: I, policy: UnknownRoomPolicy) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        let rooms = initial
            .into_iter()
            .map(|(room, temperature)| (normalize_room(room.as_ref()), temperature))
            .collect();
        let (tx, rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);

        tokio::spawn(RoomTemperatureActor { rooms, policy, rx }.run());

        Self { tx }
    }

    pub fn with_defaults(policy: UnknownRoomPolicy) -> Self {
        Self::spawn(DEFAULT_ROOM_TEMPERATURES.iter().copied(), policy)
    }

    /// Current temperature of `room`, failing for rooms the store does not know
    pub async fn get(&self, room: &str) -> Result<f64, ToolError> {
        let room = normalize_room(room);
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::Get {
                room: room.clone(),
                reply,
            })
            .await
            .map_err(|_| ToolError::Unavailable)?;

        rx.await
            .map_err(|_| ToolError::Unavailable)?
            .ok_or(ToolError::UnknownLocation(room))
    }

    /// Overwrite the temperature of `room`
    pub async fn set(&self, room: &str, temperature: f64) -> Result<SetOutcome, ToolError> {
        let room = normalize_room(room);
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::Set {
                room: room.clone(),
                temperature,
                reply,
            })
            .await
            .map_err(|_| ToolError::Unavailable)?;

        rx.await
            .map_err(|_| ToolError::Unavailable)?
            .ok_or(ToolError::UnknownLocation(room))
    }
}

/// Rooms are matched case-insensitively, ignoring surrounding whitespace
fn normalize_room(room: &str) -> String {
    room.trim().to_lowercase()
}
