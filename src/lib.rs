//! Transit Simulation Library
//!
//! Drives a simulated bus, trolleybus or tram along a timetabled line and
//! exposes what a passenger-information display needs to show.

pub mod simulation;
