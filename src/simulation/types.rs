//! Core types for the transit simulation
//!
//! These are plain data types shared by the route builder, the announcement
//! queue and the vehicle state machine.

use serde::Deserialize;
use std::fmt;

/// Direction of travel along a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    /// Stops in the order the line defines them
    #[default]
    Outbound,
    /// Stops in reverse order, timed from the far terminus
    Inbound,
}

impl Direction {
    pub fn reversed(self) -> Self {
        match self {
            Direction::Outbound => Direction::Inbound,
            Direction::Inbound => Direction::Outbound,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Direction::Outbound => "OUTBOUND",
            Direction::Inbound => "INBOUND",
        }
    }

    /// Parse a direction argument. Accepts the legacy `tam`/`zpet` names.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "outbound" | "out" | "tam" => Some(Direction::Outbound),
            "inbound" | "in" | "zpet" | "zpět" => Some(Direction::Inbound),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Kind of vehicle operating the line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleKind {
    #[default]
    Bus,
    Trolleybus,
    Tram,
}

impl VehicleKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "bus" => Some(VehicleKind::Bus),
            "trolleybus" | "trolley" => Some(VehicleKind::Trolleybus),
            "tram" => Some(VehicleKind::Tram),
            _ => None,
        }
    }

    /// Whether the vehicle draws power from overhead wires
    pub fn uses_overhead_wires(self) -> bool {
        matches!(self, VehicleKind::Trolleybus | VehicleKind::Tram)
    }
}

/// A stop as defined by the line, in outbound order
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Stop {
    pub name: String,
    /// Minutes from the start of the outbound route
    #[serde(alias = "distance", default)]
    pub minutes: f64,
    /// Announcement clip key, may be empty
    #[serde(alias = "audio", default)]
    pub audio_key: String,
}

impl Stop {
    pub fn new(name: impl Into<String>, minutes: f64, audio_key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            minutes,
            audio_key: audio_key.into(),
        }
    }
}

/// Operational state of the vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationalState {
    Driving,
    Braking,
    Stopped,
    DoorsOpen,
    DoorsClosed,
    Broken,
    Layover,
    /// Held at a traffic light (signalled motion only)
    WaitingForLight,
    /// Giving way at a roundabout (signalled motion only)
    Yielding,
}

impl OperationalState {
    pub fn label(self) -> &'static str {
        match self {
            OperationalState::Driving => "DRIVING",
            OperationalState::Braking => "BRAKING",
            OperationalState::Stopped => "STOPPED",
            OperationalState::DoorsOpen => "DOORS_OPEN",
            OperationalState::DoorsClosed => "DOORS_CLOSED",
            OperationalState::Broken => "BROKEN",
            OperationalState::Layover => "LAYOVER",
            OperationalState::WaitingForLight => "WAITING_FOR_LIGHT",
            OperationalState::Yielding => "YIELDING",
        }
    }

    /// Whether the vehicle is between stops
    pub fn is_moving(self) -> bool {
        matches!(self, OperationalState::Driving | OperationalState::Braking)
    }
}

impl fmt::Display for OperationalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Clip keys of the system announcements
pub mod clips {
    pub const GONG: &str = "gong";
    pub const NEXT_STOP: &str = "next_stop";
    pub const TERMINUS: &str = "terminus";
    pub const DOOR_OPEN: &str = "bus_door";
    pub const DOOR_CLOSE: &str = "buzzer";
    pub const LINE_INTRO: &str = "line";
    pub const DELAYED_DUE_TO: &str = "delayed_due_to";
}

/// Caption used when the line could not be loaded
pub const FALLBACK_CAPTION: &str = "Transit Simulator";

/// Display label shown once the vehicle has run past the last stop
pub const TERMINUS_LABEL: &str = "TERMINUS";
