/***************************************/
/*        3rd party libraries          */
/***************************************/
use serde::Deserialize;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/***************************************/
/*       Public data structures        */
/***************************************/
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Column used for this direction in per-floor call tables.
    pub fn slot(direction: Option<Direction>) -> usize {
        match direction {
            Some(Direction::Up) => 0,
            Some(Direction::Down) => 1,
            None => 2,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    #[serde(rename = "idle")]
    Idle,
    #[serde(rename = "moving")]
    Moving,
    #[serde(rename = "doorsOpen")]
    DoorsOpen,
    #[serde(rename = "doorsClosing")]
    DoorsClosing,
}

/// A floor call as seen by the de-duplication table.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallKey {
    pub floor: u8,
    pub direction: Option<Direction>,
}

impl CallKey {
    pub fn new(floor: u8, direction: Option<Direction>) -> CallKey {
        CallKey { floor, direction }
    }
}

impl fmt::Display for CallKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            Some(direction) => write!(f, "floor {} ({})", self.floor, direction),
            None => write!(f, "floor {}", self.floor),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceRequest {
    pub key: CallKey,
    // Sequence number handed out when the call was accepted
    pub arrival_order: u64,
}

impl ServiceRequest {
    pub fn floor(&self) -> u8 {
        self.key.floor
    }
}

/// A button press raised by the input source.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallRequest {
    pub floor: u8,
    pub direction: Option<Direction>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AcceptanceResult {
    Accepted,
    Deduplicated,
    Reopened,
}

/**
 * Notifications pushed to the view.
 *
 * # Variants
 * - `CarMoved`:            A car left `from` and will reach `to` after `duration`.
 * - `DoorsOpened`:         Doors are open at `floor` (also sent on a reopen).
 * - `DoorsClosing`:        Doors started closing at `floor`.
 * - `DoorsClosed`:         Doors finished closing, the car is idle again.
 * - `CallAcknowledged`:    The call for `floor` is fully served and its button can be cleared.
 */
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum ElevatorEvent {
    CarMoved {
        car: usize,
        from: u8,
        to: u8,
        #[serde(rename = "durationMs", with = "millis")]
        duration: Duration,
    },
    DoorsOpened {
        car: usize,
        floor: u8,
    },
    DoorsClosing {
        car: usize,
        floor: u8,
    },
    DoorsClosed {
        car: usize,
        floor: u8,
    },
    CallAcknowledged {
        floor: u8,
        direction: Option<Direction>,
    },
}

/// An event stamped with the simulation time it happened at.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ViewUpdate {
    #[serde(rename = "atMs", with = "millis")]
    pub at: Duration,
    #[serde(flatten)]
    pub event: ElevatorEvent,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CarState {
    pub id: usize,
    pub floor: u8,
    pub phase: Phase,
    pub target: Option<u8>,
}

/***************************************/
/*          Serde helpers              */
/***************************************/
mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
