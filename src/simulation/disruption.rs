//! Randomised service disruptions
//!
//! Each directional traversal gets a fresh batch of zero, one or two
//! breakdowns. Triggers fall in the middle or late part of the route, never
//! at the very start or end.

use log::debug;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::Rng;
use rand::SeedableRng;
use std::fmt;

use super::types::VehicleKind;

/// Earlier placement window, as fractions of the route duration
pub const EARLY_WINDOW: (f64, f64) = (0.25, 0.50);

/// Later placement window, as fractions of the route duration
pub const LATE_WINDOW: (f64, f64) = (0.75, 0.95);

/// Most disruptions a single traversal can get
pub const MAX_DISRUPTIONS: usize = 2;

/// Cause of a disruption
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisruptionReason {
    TechnicalFault,
    TrafficAccident,
    TrafficCongestion,
    RoadObstruction,
    /// Only possible for vehicles on overhead wires
    PowerOutage,
}

impl DisruptionReason {
    pub const ALL: [DisruptionReason; 5] = [
        DisruptionReason::TechnicalFault,
        DisruptionReason::TrafficAccident,
        DisruptionReason::TrafficCongestion,
        DisruptionReason::RoadObstruction,
        DisruptionReason::PowerOutage,
    ];

    pub fn applies_to(self, vehicle: VehicleKind) -> bool {
        match self {
            DisruptionReason::PowerOutage => vehicle.uses_overhead_wires(),
            _ => true,
        }
    }

    /// Causes a given vehicle kind can draw
    pub fn applicable(vehicle: VehicleKind) -> Vec<DisruptionReason> {
        Self::ALL
            .iter()
            .copied()
            .filter(|reason| reason.applies_to(vehicle))
            .collect()
    }

    pub fn audio_key(self) -> &'static str {
        match self {
            DisruptionReason::TechnicalFault => "reason_technical_fault",
            DisruptionReason::TrafficAccident => "reason_accident",
            DisruptionReason::TrafficCongestion => "reason_congestion",
            DisruptionReason::RoadObstruction => "reason_obstruction",
            DisruptionReason::PowerOutage => "reason_power_outage",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DisruptionReason::TechnicalFault => "Technical fault",
            DisruptionReason::TrafficAccident => "Traffic accident",
            DisruptionReason::TrafficCongestion => "Traffic congestion",
            DisruptionReason::RoadObstruction => "Road obstruction",
            DisruptionReason::PowerOutage => "Overhead power outage",
        }
    }
}

impl fmt::Display for DisruptionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A scheduled breakdown
#[derive(Debug, Clone, PartialEq)]
pub struct DisruptionEvent {
    /// Simulated position (seconds into the route) where it fires
    pub trigger_position_secs: f64,
    pub repair_duration_secs: f64,
    pub reason: DisruptionReason,
    pub triggered: bool,
}

impl DisruptionEvent {
    pub fn new(trigger_position_secs: f64, repair_duration_secs: f64, reason: DisruptionReason) -> Self {
        Self {
            trigger_position_secs,
            repair_duration_secs,
            reason,
            triggered: false,
        }
    }

    pub fn is_due(&self, position_secs: f64) -> bool {
        !self.triggered && position_secs >= self.trigger_position_secs
    }
}

/// Draws disruption batches
#[derive(Debug, Clone)]
pub struct DisruptionScheduler {
    repair_range: (f64, f64),
    min_route_duration: f64,
    vehicle: VehicleKind,
    /// Optional seeded RNG for reproducible runs
    rng: Option<StdRng>,
}

impl DisruptionScheduler {
    pub fn new(repair_range: (f64, f64), min_route_duration: f64, vehicle: VehicleKind) -> Self {
        Self {
            repair_range,
            min_route_duration,
            vehicle,
            rng: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Some(StdRng::seed_from_u64(seed));
        self
    }

    fn random_range(&mut self, low: f64, high: f64) -> f64 {
        if high <= low {
            return low;
        }
        match &mut self.rng {
            Some(rng) => rng.random_range(low..=high),
            None => rand::rng().random_range(low..=high),
        }
    }

    fn random_count(&mut self) -> usize {
        match &mut self.rng {
            Some(rng) => rng.random_range(0..=MAX_DISRUPTIONS),
            None => rand::rng().random_range(0..=MAX_DISRUPTIONS),
        }
    }

    fn coin_flip(&mut self) -> bool {
        match &mut self.rng {
            Some(rng) => rng.random_bool(0.5),
            None => rand::rng().random_bool(0.5),
        }
    }

    fn choose_reason(&mut self) -> DisruptionReason {
        let reasons = DisruptionReason::applicable(self.vehicle);
        let chosen = match &mut self.rng {
            Some(rng) => reasons.choose(rng),
            None => reasons.choose(&mut rand::rng()),
        };
        chosen.copied().unwrap_or(DisruptionReason::TechnicalFault)
    }

    fn event_in_window(&mut self, total: f64, window: (f64, f64)) -> DisruptionEvent {
        let fraction = self.random_range(window.0, window.1.min(1.0));
        let repair = self.random_range(self.repair_range.0, self.repair_range.1);
        let reason = self.choose_reason();
        DisruptionEvent::new(total * fraction, repair, reason)
    }

    /// Generate the batch for a route lasting `total_duration` seconds
    pub fn generate(&mut self, total_duration: f64) -> Vec<DisruptionEvent> {
        if total_duration <= self.min_route_duration {
            return Vec::new();
        }

        let events = match self.random_count() {
            0 => Vec::new(),
            1 => {
                let window = if self.coin_flip() { EARLY_WINDOW } else { LATE_WINDOW };
                vec![self.event_in_window(total_duration, window)]
            }
            _ => vec![
                self.event_in_window(total_duration, EARLY_WINDOW),
                self.event_in_window(total_duration, LATE_WINDOW),
            ],
        };

        for event in &events {
            debug!(
                "Scheduled {} at {:.0}s/{:.0}s, repair {:.0}s",
                event.reason, event.trigger_position_secs, total_duration, event.repair_duration_secs
            );
        }
        events
    }
}
