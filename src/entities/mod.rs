//! SeaORM entity models for the room service.

pub mod audit_log;
pub mod match_result;
pub mod participant;
pub mod room;
pub mod room_status;

pub use room_status::RoomStatus;
