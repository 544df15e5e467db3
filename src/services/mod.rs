//! Domain services behind the HTTP surface.
//!
//! Each mutating operation here is a single externally-triggered transaction
//! against the store: no background timers, no internal retries. Concurrency
//! comes only from clients racing each other on the same room.

pub mod audit;
pub mod match_results;
pub mod membership;
pub mod ready_check;
pub mod room_registry;
