//! Wall-clock schedule stamping

use anyhow::Result;
use chrono::{DateTime, Local, TimeDelta, Utc};
use log::warn;
use std::time::{SystemTime, UNIX_EPOCH};

use super::route::RouteTable;

/// Source of the current wall-clock time
pub trait Clock {
    fn now(&self) -> Result<DateTime<Local>>;
}

/// Reads the system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Result<DateTime<Local>> {
        let since_epoch = SystemTime::now().duration_since(UNIX_EPOCH)?;
        let utc = DateTime::<Utc>::from_timestamp(
            since_epoch.as_secs() as i64,
            since_epoch.subsec_nanos(),
        )
        .ok_or_else(|| anyhow::anyhow!("System time {:?} is out of range", since_epoch))?;
        Ok(utc.with_timezone(&Local))
    }
}

/// Always returns the same instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Local>);

impl Clock for FixedClock {
    fn now(&self) -> Result<DateTime<Local>> {
        Ok(self.0)
    }
}

/// Departure time for a freshly built route. Falls back to the Unix epoch
/// when the clock cannot be read.
pub fn departure_timestamp(clock: &dyn Clock) -> DateTime<Local> {
    match clock.now() {
        Ok(now) => now,
        Err(e) => {
            warn!("Clock unavailable ({}); scheduling from the Unix epoch", e);
            DateTime::<Utc>::default().with_timezone(&Local)
        }
    }
}

/// Stamp every stop with `departure + arrival_secs`. A time that does not
/// fit in the calendar is left unscheduled.
pub fn stamp_schedule(route: &mut RouteTable, departure: DateTime<Local>) {
    for stop in &mut route.stops {
        let scheduled = TimeDelta::try_milliseconds((stop.arrival_secs * 1000.0).round() as i64)
            .and_then(|offset| departure.checked_add_signed(offset));
        if scheduled.is_none() {
            warn!(
                "Arrival {}s at {:?} is out of range; leaving it unscheduled",
                stop.arrival_secs, stop.name
            );
        }
        stop.scheduled = scheduled;
    }
}
