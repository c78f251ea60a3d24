//! Read-only view of the engine for display renderers

use chrono::{DateTime, Local, Timelike};

use super::disruption::DisruptionReason;
use super::types::{Direction, OperationalState};

/// One upcoming stop as listed on the display
#[derive(Debug, Clone, PartialEq)]
pub struct UpcomingStop {
    pub name: String,
    /// Scheduled arrival as `HH:MM`
    pub scheduled: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisplaySnapshot {
    pub line_id: String,
    pub direction: Direction,
    pub caption: String,
    pub destination: String,
    /// Name shown in the footer; the terminus label once past the last stop
    pub current_stop: String,
    pub current_scheduled: String,
    pub upcoming: Vec<UpcomingStop>,
    pub state: OperationalState,
    /// Simulated seconds into the current direction
    pub position_secs: f64,
    /// Wall-clock seconds since the engine started
    pub run_time_secs: f64,
    pub disruption: Option<DisruptionReason>,
    pub pending_announcements: usize,
}

impl DisplaySnapshot {
    pub fn state_label(&self) -> &'static str {
        self.state.label()
    }

    pub fn disruption_active(&self) -> bool {
        self.disruption.is_some()
    }

    /// Header clock, `HH:MM` with the colon blanked in the first half of each second
    pub fn clock_string(now: DateTime<Local>) -> String {
        let colon = if now.nanosecond() % 1_000_000_000 >= 500_000_000 {
            ':'
        } else {
            ' '
        };
        format!("{:02}{}{:02}", now.hour(), colon, now.minute())
    }
}
