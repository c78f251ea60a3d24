//! Mutable state of the simulated vehicle

use super::disruption::DisruptionReason;
use super::types::{Direction, OperationalState};

#[derive(Debug, Clone, PartialEq)]
pub struct VehicleState {
    pub direction: Direction,
    /// Index of the stop the vehicle is heading to or standing at
    pub stop_index: usize,
    /// Simulated seconds since the start of the current direction
    pub position_secs: f64,
    pub state: OperationalState,
    /// Time spent in the current state (wall-clock seconds)
    pub timer: f64,
    /// When `timer` passes this, the current state ends
    pub time_limit: f64,
    pub next_stop_announced: bool,
    pub current_stop_announced: bool,
    pub leg_start_secs: f64,
    pub disruption_active: bool,
    pub active_disruption: Option<DisruptionReason>,
    /// Stop the display treats as current; follows announcements
    pub display_stop_index: usize,
}

impl VehicleState {
    /// Idling at the origin, doors closed, before the first departure
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            stop_index: 0,
            position_secs: 0.0,
            state: OperationalState::Stopped,
            timer: 0.0,
            time_limit: 0.0,
            next_stop_announced: false,
            current_stop_announced: false,
            leg_start_secs: 0.0,
            disruption_active: false,
            active_disruption: None,
            display_stop_index: 0,
        }
    }

    pub fn reset_leg_flags(&mut self) {
        self.next_stop_announced = false;
        self.current_stop_announced = false;
    }

    /// Enter `state` with a fresh timer
    pub fn enter(&mut self, state: OperationalState, time_limit: f64) {
        self.state = state;
        self.timer = 0.0;
        self.time_limit = time_limit;
    }

    /// Flip direction and return to the origin of the new route
    pub fn reverse(&mut self) {
        self.direction = self.direction.reversed();
        self.stop_index = 0;
        self.display_stop_index = 0;
        self.position_secs = 0.0;
        self.leg_start_secs = 0.0;
        self.disruption_active = false;
        self.active_disruption = None;
        self.reset_leg_flags();
    }
}
