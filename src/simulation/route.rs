//! Directional route tables
//!
//! Turns a line's outbound stop list into the ordered sequence of stops for
//! one direction, with arrival times in seconds from the start of that
//! direction. Both directions always take the same total time.

use chrono::{DateTime, Local};
use log::warn;

use super::types::{Direction, Stop};

/// A stop on a directional route
#[derive(Debug, Clone, PartialEq)]
pub struct RouteStop {
    pub name: String,
    /// Seconds from the start of this direction
    pub arrival_secs: f64,
    pub audio_key: String,
    /// Filled in by the schedule calculator
    pub scheduled: Option<DateTime<Local>>,
}

impl RouteStop {
    /// Scheduled arrival as `HH:MM`, blank before a schedule is stamped
    pub fn scheduled_string(&self) -> String {
        self.scheduled
            .map(|time| time.format("%H:%M").to_string())
            .unwrap_or_default()
    }
}

/// An ordered stop sequence for one direction
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteTable {
    pub direction: Direction,
    pub stops: Vec<RouteStop>,
}

impl RouteTable {
    /// Build the route for `direction` from stops given in outbound order.
    ///
    /// Offsets are taken as minutes from the outbound start. Negative offsets
    /// clamp to zero and an offset smaller than its predecessor is raised to
    /// it, so arrival times never decrease.
    pub fn build(stops: &[Stop], direction: Direction) -> Self {
        let offsets = normalized_offsets(stops);

        let stops = match direction {
            Direction::Outbound => stops
                .iter()
                .zip(&offsets)
                .map(|(stop, &offset)| RouteStop {
                    name: stop.name.clone(),
                    arrival_secs: offset,
                    audio_key: stop.audio_key.clone(),
                    scheduled: None,
                })
                .collect(),
            Direction::Inbound => {
                // Anchored at the outbound origin so both directions end at `total`
                let origin = offsets.first().copied().unwrap_or(0.0);
                let total = offsets.last().copied().unwrap_or(0.0);
                stops
                    .iter()
                    .zip(&offsets)
                    .rev()
                    .map(|(stop, &offset)| RouteStop {
                        name: stop.name.clone(),
                        arrival_secs: origin + (total - offset),
                        audio_key: stop.audio_key.clone(),
                        scheduled: None,
                    })
                    .collect()
            }
        };

        Self { direction, stops }
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&RouteStop> {
        self.stops.get(index)
    }

    /// Arrival time of the last stop, zero for an empty route
    pub fn total_duration(&self) -> f64 {
        self.stops.last().map(|s| s.arrival_secs).unwrap_or(0.0)
    }

    pub fn is_last(&self, index: usize) -> bool {
        !self.stops.is_empty() && index == self.stops.len() - 1
    }

    /// Upper-cased name of the last stop, blank for an empty route
    pub fn destination_name(&self) -> String {
        self.stops
            .last()
            .map(|s| s.name.to_uppercase())
            .unwrap_or_default()
    }
}

/// Outbound offsets in seconds, clamped non-negative and non-decreasing
fn normalized_offsets(stops: &[Stop]) -> Vec<f64> {
    let mut previous = 0.0_f64;
    stops
        .iter()
        .map(|stop| {
            let mut secs = stop.minutes * 60.0;
            if !secs.is_finite() || secs < 0.0 {
                warn!("Stop {:?} has invalid offset {}; clamping to 0", stop.name, stop.minutes);
                secs = 0.0;
            }
            if secs < previous {
                warn!(
                    "Stop {:?} offset {} min is earlier than the previous stop; raising it",
                    stop.name, stop.minutes
                );
                secs = previous;
            }
            previous = secs;
            secs
        })
        .collect()
}
