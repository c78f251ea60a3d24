//! Engine configuration
//!
//! All tunable timings live here and are handed to the engine once at
//! construction. Every field has a default, so a JSON config file only needs
//! to name the values it changes.

use anyhow::{Context, Result};
use log::warn;
use serde::Deserialize;
use std::path::Path;

use super::types::VehicleKind;

/// Default simulated seconds per wall-clock second
pub const DEFAULT_TIME_SCALE: f64 = 8.0;

/// Pause between two announcement cues
pub const DEFAULT_AUDIO_GAP: f64 = 0.2;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Simulated seconds that pass per wall-clock second while driving
    pub time_scale: f64,
    /// Fraction of a leg after which the next stop is announced
    pub next_stop_announce_fraction: f64,
    /// Remaining simulated seconds at which the current stop is announced
    pub current_stop_announce_threshold_secs: f64,
    /// Remaining simulated seconds at which the vehicle starts braking
    pub braking_window_secs: f64,
    pub stopped_settle_secs: f64,
    /// Added to door clip length to get the door wait
    pub door_extra_secs: f64,
    pub min_dwell_secs: f64,
    /// Minimum dwell at the very first stop of the run
    pub first_boarding_dwell_secs: f64,
    pub doors_closed_settle_secs: f64,
    pub audio_gap_secs: f64,
    pub repair_min_secs: f64,
    pub repair_max_secs: f64,
    /// Routes at or below this length never get disruptions
    pub min_disruptable_duration_secs: f64,
    /// How many upcoming stops the display lists
    pub upcoming_stops: usize,
    pub vehicle_kind: VehicleKind,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            time_scale: DEFAULT_TIME_SCALE,
            next_stop_announce_fraction: 0.25,
            current_stop_announce_threshold_secs: 10.0,
            braking_window_secs: 3.0,
            stopped_settle_secs: 1.0,
            door_extra_secs: 2.0,
            min_dwell_secs: 8.0,
            first_boarding_dwell_secs: 15.0,
            doors_closed_settle_secs: 2.0,
            audio_gap_secs: DEFAULT_AUDIO_GAP,
            repair_min_secs: 20.0,
            repair_max_secs: 60.0,
            min_disruptable_duration_secs: 10.0,
            upcoming_stops: 4,
            vehicle_kind: VehicleKind::Bus,
        }
    }
}

impl SimConfig {
    /// Load a config from a JSON file. Missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: SimConfig = serde_json::from_str(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config.validate())
    }

    /// Replace values the engine cannot work with by their defaults
    pub fn validate(mut self) -> Self {
        let defaults = SimConfig::default();

        if !(self.time_scale > 0.0) {
            warn!(
                "time_scale {} is not positive; using {}",
                self.time_scale, defaults.time_scale
            );
            self.time_scale = defaults.time_scale;
        }

        if !(self.next_stop_announce_fraction > 0.0 && self.next_stop_announce_fraction < 1.0) {
            warn!(
                "next_stop_announce_fraction {} outside (0, 1); using {}",
                self.next_stop_announce_fraction, defaults.next_stop_announce_fraction
            );
            self.next_stop_announce_fraction = defaults.next_stop_announce_fraction;
        }

        if self.repair_min_secs < 0.0 || self.repair_min_secs > self.repair_max_secs {
            warn!(
                "repair range [{}, {}] is invalid; using [{}, {}]",
                self.repair_min_secs,
                self.repair_max_secs,
                defaults.repair_min_secs,
                defaults.repair_max_secs
            );
            self.repair_min_secs = defaults.repair_min_secs;
            self.repair_max_secs = defaults.repair_max_secs;
        }

        for (name, value, default) in [
            (
                "current_stop_announce_threshold_secs",
                &mut self.current_stop_announce_threshold_secs,
                defaults.current_stop_announce_threshold_secs,
            ),
            ("braking_window_secs", &mut self.braking_window_secs, defaults.braking_window_secs),
            ("stopped_settle_secs", &mut self.stopped_settle_secs, defaults.stopped_settle_secs),
            ("door_extra_secs", &mut self.door_extra_secs, defaults.door_extra_secs),
            ("min_dwell_secs", &mut self.min_dwell_secs, defaults.min_dwell_secs),
            (
                "first_boarding_dwell_secs",
                &mut self.first_boarding_dwell_secs,
                defaults.first_boarding_dwell_secs,
            ),
            (
                "doors_closed_settle_secs",
                &mut self.doors_closed_settle_secs,
                defaults.doors_closed_settle_secs,
            ),
            ("audio_gap_secs", &mut self.audio_gap_secs, defaults.audio_gap_secs),
        ] {
            if !(*value >= 0.0) {
                warn!("{} {} is invalid; using {}", name, value, default);
                *value = default;
            }
        }

        self
    }
}
