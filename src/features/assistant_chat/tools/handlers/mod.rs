mod room_temperature;

pub use room_temperature::{GetRoomTemperature, SetRoomTemperature};
