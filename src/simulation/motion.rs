//! How the vehicle moves between stops
//!
//! Position is measured in simulated seconds along the route. The default
//! model simply follows the timetable; `SignalledMotion` wraps another model
//! and holds the vehicle at traffic lights and roundabouts.

use log::debug;

/// Why the vehicle is not moving
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldReason {
    TrafficLight,
    Roundabout,
}

/// Outcome of one motion update
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionStep {
    Advanced(f64),
    Hold(HoldReason),
}

pub trait MotionModel {
    /// Move from `position` towards `target`.
    ///
    /// `sim_delta` is the simulated time that passed and `real_delta` the
    /// wall-clock time behind it. The returned position may overshoot
    /// `target`; the caller clamps.
    fn advance(&mut self, position: f64, target: f64, sim_delta: f64, real_delta: f64) -> MotionStep;

    /// Called when the route is rebuilt for a new direction
    fn reset(&mut self) {}
}

/// Moves exactly with the timetable
#[derive(Debug, Clone, Copy, Default)]
pub struct TimetableMotion;

impl MotionModel for TimetableMotion {
    fn advance(&mut self, position: f64, _target: f64, sim_delta: f64, _real_delta: f64) -> MotionStep {
        MotionStep::Advanced(position + sim_delta)
    }
}

/// A point on the route where the vehicle may have to wait
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Signal {
    pub position_secs: f64,
    pub kind: HoldReason,
    /// Wall-clock seconds the vehicle waits here
    pub hold_secs: f64,
}

#[derive(Debug, Clone)]
struct SignalSlot {
    signal: Signal,
    passed: bool,
}

/// Holds the vehicle at each signal once per direction
#[derive(Debug, Clone)]
pub struct SignalledMotion<M> {
    inner: M,
    signals: Vec<SignalSlot>,
    /// Index of the signal being waited at and the remaining wait
    holding: Option<(usize, f64)>,
}

impl<M: MotionModel> SignalledMotion<M> {
    pub fn new(inner: M, signals: Vec<Signal>) -> Self {
        let mut signals: Vec<SignalSlot> = signals
            .into_iter()
            .map(|signal| SignalSlot { signal, passed: false })
            .collect();
        signals.sort_by(|a, b| a.signal.position_secs.total_cmp(&b.signal.position_secs));
        Self {
            inner,
            signals,
            holding: None,
        }
    }
}

impl<M: MotionModel> MotionModel for SignalledMotion<M> {
    fn advance(&mut self, position: f64, target: f64, sim_delta: f64, real_delta: f64) -> MotionStep {
        if let Some((index, remaining)) = self.holding {
            let remaining = remaining - real_delta;
            let slot = &mut self.signals[index];
            if remaining > 0.0 {
                self.holding = Some((index, remaining));
                return MotionStep::Hold(slot.signal.kind);
            }
            debug!("Released from {:?} at {:.0}s", slot.signal.kind, slot.signal.position_secs);
            slot.passed = true;
            self.holding = None;
        }

        let next = match self.inner.advance(position, target, sim_delta, real_delta) {
            MotionStep::Advanced(next) => next,
            hold => return hold,
        };

        // Stop at the first unpassed signal crossed by this step
        let crossed = self.signals.iter().position(|slot| {
            !slot.passed && slot.signal.position_secs > position && slot.signal.position_secs <= next
        });
        match crossed {
            Some(index) => {
                let signal = self.signals[index].signal;
                if signal.hold_secs <= 0.0 {
                    self.signals[index].passed = true;
                    return MotionStep::Advanced(next);
                }
                self.holding = Some((index, signal.hold_secs));
                MotionStep::Hold(signal.kind)
            }
            None => MotionStep::Advanced(next),
        }
    }

    fn reset(&mut self) {
        self.inner.reset();
        self.holding = None;
        for slot in &mut self.signals {
            slot.passed = false;
        }
    }
}
