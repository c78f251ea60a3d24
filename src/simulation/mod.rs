//! Route and time simulation for a transit vehicle
//!
//! This module drives a vehicle along a timetabled line, opening and closing
//! doors, sequencing announcements, injecting breakdowns and turning around
//! at each terminus. It draws nothing; renderers read `DisplaySnapshot`.

mod announcement;
mod audio;
mod config;
mod disruption;
mod engine;
mod error;
mod line_source;
mod motion;
mod route;
mod schedule;
mod snapshot;
mod types;
mod vehicle;

pub use announcement::{current_stop_phrase, delay_phrase, next_stop_phrase, AnnouncementQueue};
pub use audio::{
    play_or_silence, AnnouncementCue, AudioCategory, AudioPlayer, CatalogPlayer, ScriptedPlayer,
    SilentPlayer,
};
pub use config::{SimConfig, DEFAULT_AUDIO_GAP, DEFAULT_TIME_SCALE};
pub use disruption::{
    DisruptionEvent, DisruptionReason, DisruptionScheduler, EARLY_WINDOW, LATE_WINDOW,
    MAX_DISRUPTIONS,
};
pub use engine::TransitEngine;
pub use error::RouteError;
pub use line_source::{JsonLineDirectory, LineDefinition, LineSource, LineSummary, StaticLineSource};
pub use motion::{HoldReason, MotionModel, MotionStep, Signal, SignalledMotion, TimetableMotion};
pub use route::{RouteStop, RouteTable};
pub use schedule::{departure_timestamp, stamp_schedule, Clock, FixedClock, SystemClock};
pub use snapshot::{DisplaySnapshot, UpcomingStop};
pub use types::{
    clips, Direction, OperationalState, Stop, VehicleKind, FALLBACK_CAPTION, TERMINUS_LABEL,
};
pub use vehicle::VehicleState;
