use serde::{Deserialize, Serialize};
use std::fmt;

/// Room lifecycle status.
///
/// Transitions only move forward: `waiting → ready → playing → finished`.
/// Soft-deletion is tracked separately via the room's `deleted_at` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    /// Room is open, players can join and ready up
    #[default]
    Waiting,
    /// All players passed the ready-check
    Ready,
    /// Game is in progress
    Playing,
    /// Game has ended; status is terminal
    Finished,
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl RoomStatus {
    /// Convert from database string representation
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "waiting" => Some(Self::Waiting),
            "ready" => Some(Self::Ready),
            "playing" => Some(Self::Playing),
            "finished" => Some(Self::Finished),
            _ => None,
        }
    }

    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Ready => "ready",
            Self::Playing => "playing",
            Self::Finished => "finished",
        }
    }

    /// Check if players can join
    #[must_use]
    pub const fn can_join(self) -> bool {
        matches!(self, Self::Waiting)
    }

    /// Check if the host can start the game.
    ///
    /// `waiting` is deliberately accepted alongside `ready`: the host may
    /// start without a completed ready-check.
    #[must_use]
    pub const fn can_start(self) -> bool {
        matches!(self, Self::Waiting | Self::Ready)
    }

    /// Check if the host can end the game
    #[must_use]
    pub const fn can_end(self) -> bool {
        matches!(self, Self::Playing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(RoomStatus::parse("waiting"), Some(RoomStatus::Waiting));
        assert_eq!(RoomStatus::parse("READY"), Some(RoomStatus::Ready));
        assert_eq!(RoomStatus::parse("playing"), Some(RoomStatus::Playing));
        assert_eq!(RoomStatus::parse("finished"), Some(RoomStatus::Finished));
        assert_eq!(RoomStatus::parse("lobby"), None);
    }

    #[test]
    fn test_as_str_round_trip() {
        for status in [
            RoomStatus::Waiting,
            RoomStatus::Ready,
            RoomStatus::Playing,
            RoomStatus::Finished,
        ] {
            assert_eq!(RoomStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_can_join() {
        assert!(RoomStatus::Waiting.can_join());
        assert!(!RoomStatus::Ready.can_join());
        assert!(!RoomStatus::Playing.can_join());
        assert!(!RoomStatus::Finished.can_join());
    }

    #[test]
    fn test_can_start() {
        assert!(RoomStatus::Waiting.can_start());
        assert!(RoomStatus::Ready.can_start());
        assert!(!RoomStatus::Playing.can_start());
        assert!(!RoomStatus::Finished.can_start());
    }

    #[test]
    fn test_can_end() {
        assert!(!RoomStatus::Waiting.can_end());
        assert!(!RoomStatus::Ready.can_end());
        assert!(RoomStatus::Playing.can_end());
        assert!(!RoomStatus::Finished.can_end());
    }
}
