//! The vehicle state machine
//!
//! `TransitEngine` ties the route, schedule, disruptions and announcements
//! together. It is driven by calling `tick` once per frame with the
//! wall-clock time since the previous frame, and never blocks.

use chrono::{DateTime, Local, Utc};
use log::{debug, info, warn};

use super::announcement::{current_stop_phrase, delay_phrase, next_stop_phrase, AnnouncementQueue};
use super::audio::{play_or_silence, AnnouncementCue, AudioPlayer, SilentPlayer};
use super::config::SimConfig;
use super::disruption::{DisruptionEvent, DisruptionScheduler};
use super::line_source::{LineDefinition, LineSource};
use super::motion::{HoldReason, MotionModel, MotionStep, TimetableMotion};
use super::route::RouteTable;
use super::schedule::{departure_timestamp, stamp_schedule, Clock, SystemClock};
use super::snapshot::{DisplaySnapshot, UpcomingStop};
use super::types::{clips, Direction, OperationalState, FALLBACK_CAPTION, TERMINUS_LABEL};
use super::vehicle::VehicleState;

pub struct TransitEngine {
    config: SimConfig,

    /// Line being served; empty when the line could not be loaded
    line: LineDefinition,
    line_loaded: bool,

    /// Route for the current direction, rebuilt on every reversal
    route: RouteTable,
    departure: DateTime<Local>,

    /// Disruptions for the current direction
    disruptions: Vec<DisruptionEvent>,
    scheduler: DisruptionScheduler,

    queue: AnnouncementQueue,
    player: Box<dyn AudioPlayer>,
    motion: Box<dyn MotionModel>,
    clock: Box<dyn Clock>,

    vehicle: VehicleState,

    destination: String,
    caption: String,

    /// Wall-clock seconds since the engine started
    run_time: f64,

    /// Whether the extended first-boarding dwell has been used
    first_boarding_done: bool,

    route_builds: usize,
    reversals: usize,
    disruptions_triggered: usize,
}

impl TransitEngine {
    /// Create an engine for an already loaded line
    pub fn new(config: SimConfig, line: LineDefinition, direction: Direction) -> Self {
        Self::new_internal(config, line, true, direction)
    }

    /// Load `line_id` from `source`. A line that cannot be loaded leaves the
    /// engine running on an empty route with a generic caption.
    pub fn from_source(
        config: SimConfig,
        source: &dyn LineSource,
        line_id: &str,
        direction: Direction,
    ) -> Self {
        match source.load(line_id) {
            Ok(line) => Self::new_internal(config, line, true, direction),
            Err(e) => {
                warn!("{}; continuing with an empty route", e);
                let line = LineDefinition::new(line_id, "", Vec::new());
                Self::new_internal(config, line, false, direction)
            }
        }
    }

    fn new_internal(
        config: SimConfig,
        line: LineDefinition,
        line_loaded: bool,
        direction: Direction,
    ) -> Self {
        let config = config.validate();
        let scheduler = DisruptionScheduler::new(
            (config.repair_min_secs, config.repair_max_secs),
            config.min_disruptable_duration_secs,
            config.vehicle_kind,
        );
        let queue = AnnouncementQueue::new(config.audio_gap_secs);

        let mut engine = Self {
            config,
            line,
            line_loaded,
            route: RouteTable::default(),
            departure: DateTime::<Utc>::default().with_timezone(&Local),
            disruptions: Vec::new(),
            scheduler,
            queue,
            player: Box::new(SilentPlayer),
            motion: Box::new(TimetableMotion),
            clock: Box::new(SystemClock),
            vehicle: VehicleState::new(direction),
            destination: String::new(),
            caption: String::new(),
            run_time: 0.0,
            first_boarding_done: false,
            route_builds: 0,
            reversals: 0,
            disruptions_triggered: 0,
        };
        engine.build_route();
        info!(
            "Line {} {} towards {:?}: {} stops, {:.0}s",
            engine.line.id,
            direction,
            engine.destination,
            engine.route.len(),
            engine.route.total_duration()
        );
        engine
    }

    pub fn with_player(mut self, player: Box<dyn AudioPlayer>) -> Self {
        self.player = player;
        self
    }

    pub fn with_motion(mut self, motion: Box<dyn MotionModel>) -> Self {
        self.motion = motion;
        self
    }

    /// Use `clock` for schedule stamping and restamp the current route
    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self.departure = departure_timestamp(self.clock.as_ref());
        stamp_schedule(&mut self.route, self.departure);
        self
    }

    /// Seed the disruption draws and redraw the current batch
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.scheduler = self.scheduler.clone().with_seed(seed);
        self.disruptions = self.scheduler.generate(self.route.total_duration());
        self
    }

    /// Replace the disruption batch of the current direction
    pub fn set_disruptions(&mut self, disruptions: Vec<DisruptionEvent>) {
        self.disruptions = disruptions;
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn line(&self) -> &LineDefinition {
        &self.line
    }

    pub fn route(&self) -> &RouteTable {
        &self.route
    }

    pub fn vehicle(&self) -> &VehicleState {
        &self.vehicle
    }

    pub fn state(&self) -> OperationalState {
        self.vehicle.state
    }

    pub fn disruptions(&self) -> &[DisruptionEvent] {
        &self.disruptions
    }

    pub fn queue(&self) -> &AnnouncementQueue {
        &self.queue
    }

    pub fn departure(&self) -> DateTime<Local> {
        self.departure
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn run_time(&self) -> f64 {
        self.run_time
    }

    pub fn route_builds(&self) -> usize {
        self.route_builds
    }

    pub fn reversals(&self) -> usize {
        self.reversals
    }

    pub fn disruptions_triggered(&self) -> usize {
        self.disruptions_triggered
    }

    /// Rebuild route, schedule, disruptions and display text for the
    /// vehicle's current direction
    fn build_route(&mut self) {
        let direction = self.vehicle.direction;
        self.route = RouteTable::build(&self.line.stops, direction);
        self.departure = departure_timestamp(self.clock.as_ref());
        stamp_schedule(&mut self.route, self.departure);
        self.disruptions = self.scheduler.generate(self.route.total_duration());
        self.route_builds += 1;

        self.destination = self.route.destination_name();
        self.caption = if !self.line_loaded {
            FALLBACK_CAPTION.to_string()
        } else if self.line.description.is_empty() {
            format!("Line {} ({})", self.line.id, direction)
        } else {
            format!("{} | {} ({})", self.line.id, self.line.description, direction)
        };
    }

    /// Queue the current-stop phrase once the stop is close enough.
    /// Does nothing if it was already queued on this leg.
    /// Returns whether a phrase was queued.
    pub fn check_current_stop_announcement(&mut self, time_to_go: f64) -> bool {
        if self.vehicle.current_stop_announced
            || time_to_go > self.config.current_stop_announce_threshold_secs
        {
            return false;
        }
        let index = self.vehicle.stop_index;
        let Some(stop) = self.route.get(index) else {
            return false;
        };

        self.vehicle.current_stop_announced = true;
        self.vehicle.display_stop_index = index;
        info!("Announcing current stop {:?} ({:.1}s to go)", stop.name, time_to_go);
        let phrase = current_stop_phrase(&stop.audio_key, self.route.is_last(index));
        self.queue.enqueue_phrase(phrase);
        true
    }

    fn announce_next_stop(&mut self) {
        let index = self.vehicle.stop_index;
        let Some(stop) = self.route.get(index) else {
            return;
        };
        self.vehicle.next_stop_announced = true;
        self.vehicle.display_stop_index = index;
        info!("Announcing next stop {:?}", stop.name);
        let phrase = next_stop_phrase(&stop.audio_key);
        self.queue.enqueue_phrase(phrase);
    }

    fn play_door_cue(&mut self, key: &str) -> f64 {
        play_or_silence(self.player.as_mut(), &AnnouncementCue::system(key))
    }

    /// Main simulation tick
    pub fn tick(&mut self, delta_secs: f64) {
        let delta_secs = if delta_secs.is_finite() {
            delta_secs.max(0.0)
        } else {
            0.0
        };
        self.run_time += delta_secs;

        self.queue.tick(delta_secs, self.player.as_mut());

        let Some(target) = self.route.get(self.vehicle.stop_index).map(|s| s.arrival_secs) else {
            if self.vehicle.state != OperationalState::Layover {
                info!("No stop to serve; entering layover");
                self.vehicle.enter(OperationalState::Layover, 0.0);
            }
            return;
        };

        match self.vehicle.state {
            OperationalState::Driving => self.update_driving(delta_secs, target),
            OperationalState::Braking => self.update_braking(delta_secs, target),
            OperationalState::WaitingForLight | OperationalState::Yielding => {
                self.update_held(delta_secs, target)
            }
            OperationalState::Broken => self.update_broken(delta_secs),
            OperationalState::Stopped => self.update_stopped(delta_secs),
            OperationalState::DoorsOpen => self.update_doors_open(delta_secs),
            OperationalState::DoorsClosed => self.update_doors_closed(delta_secs),
            OperationalState::Layover => {}
        }
    }

    fn update_driving(&mut self, delta_secs: f64, target: f64) {
        let leg_total = target - self.vehicle.leg_start_secs;
        let traveled = self.vehicle.position_secs - self.vehicle.leg_start_secs;
        if !self.vehicle.next_stop_announced
            && leg_total > 0.0
            && traveled >= leg_total * self.config.next_stop_announce_fraction
        {
            self.announce_next_stop();
        }

        self.check_current_stop_announcement(target - self.vehicle.position_secs);

        if self.check_due_disruption() {
            return;
        }

        let position = self.vehicle.position_secs;
        let sim_delta = delta_secs * self.config.time_scale;
        match self.motion.advance(position, target, sim_delta, delta_secs) {
            MotionStep::Advanced(next) => self.move_to(next, target),
            MotionStep::Hold(reason) => self.hold(reason, delta_secs),
        }
    }

    fn update_braking(&mut self, delta_secs: f64, target: f64) {
        self.check_current_stop_announcement(target - self.vehicle.position_secs);
        if self.check_due_disruption() {
            return;
        }
        let next = self.vehicle.position_secs + delta_secs * self.config.time_scale;
        self.move_to(next, target);
    }

    fn update_held(&mut self, delta_secs: f64, target: f64) {
        let position = self.vehicle.position_secs;
        let sim_delta = delta_secs * self.config.time_scale;
        match self.motion.advance(position, target, sim_delta, delta_secs) {
            MotionStep::Advanced(next) => {
                debug!("Released at {:.1}s", position);
                self.vehicle.enter(OperationalState::Driving, 0.0);
                self.move_to(next, target);
            }
            MotionStep::Hold(reason) => self.hold(reason, delta_secs),
        }
    }

    fn hold(&mut self, reason: HoldReason, delta_secs: f64) {
        let state = match reason {
            HoldReason::TrafficLight => OperationalState::WaitingForLight,
            HoldReason::Roundabout => OperationalState::Yielding,
        };
        if self.vehicle.state != state {
            debug!("Holding at {:.1}s: {}", self.vehicle.position_secs, state);
            self.vehicle.enter(state, 0.0);
        } else {
            self.vehicle.timer += delta_secs;
        }
    }

    /// Move towards `target`, clamping on arrival
    fn move_to(&mut self, next: f64, target: f64) {
        if next >= target {
            self.arrive(target);
            return;
        }
        self.vehicle.position_secs = next;
        if self.vehicle.state == OperationalState::Driving
            && target - next <= self.config.braking_window_secs
        {
            self.vehicle.enter(OperationalState::Braking, 0.0);
        }
    }

    fn arrive(&mut self, target: f64) {
        self.vehicle.position_secs = target;
        // A large step can jump over the announcement threshold
        self.check_current_stop_announcement(0.0);
        if let Some(stop) = self.route.get(self.vehicle.stop_index) {
            debug!("Arrived at {:?} ({:.0}s)", stop.name, target);
        }
        self.vehicle
            .enter(OperationalState::Stopped, self.config.stopped_settle_secs);
    }

    /// Fire the first due disruption, if any. Returns whether one fired.
    fn check_due_disruption(&mut self) -> bool {
        let position = self.vehicle.position_secs;
        match self.disruptions.iter().position(|e| e.is_due(position)) {
            Some(index) => {
                self.begin_disruption(index);
                true
            }
            None => false,
        }
    }

    fn begin_disruption(&mut self, index: usize) {
        let event = &mut self.disruptions[index];
        event.triggered = true;
        let reason = event.reason;
        let repair = event.repair_duration_secs;

        info!(
            "Breakdown at {:.0}s: {} (repair {:.0}s)",
            self.vehicle.position_secs, reason, repair
        );
        self.vehicle.disruption_active = true;
        self.vehicle.active_disruption = Some(reason);
        self.vehicle.enter(OperationalState::Broken, repair);
        self.disruptions_triggered += 1;
        self.queue.enqueue_phrase(delay_phrase(&self.line.id, reason));
    }

    fn update_broken(&mut self, delta_secs: f64) {
        self.vehicle.timer += delta_secs;
        if self.vehicle.timer >= self.vehicle.time_limit {
            info!("Repaired after {:.1}s; resuming", self.vehicle.timer);
            self.vehicle.disruption_active = false;
            self.vehicle.active_disruption = None;
            self.vehicle.reset_leg_flags();
            self.vehicle.enter(OperationalState::Driving, 0.0);
        }
    }

    fn update_stopped(&mut self, delta_secs: f64) {
        self.vehicle.timer += delta_secs;
        if self.vehicle.timer > self.vehicle.time_limit {
            let clip = self.play_door_cue(clips::DOOR_OPEN);
            let dwell = if self.first_boarding_done {
                self.config.min_dwell_secs
            } else {
                self.first_boarding_done = true;
                self.config.first_boarding_dwell_secs
            };
            let limit = (clip + self.config.door_extra_secs).max(dwell);
            debug!("Doors open for {:.1}s", limit);
            self.vehicle.enter(OperationalState::DoorsOpen, limit);
        }
    }

    fn update_doors_open(&mut self, delta_secs: f64) {
        self.vehicle.timer += delta_secs;
        if self.vehicle.timer > self.vehicle.time_limit {
            let clip = self.play_door_cue(clips::DOOR_CLOSE);
            self.vehicle.enter(
                OperationalState::DoorsClosed,
                clip + self.config.doors_closed_settle_secs,
            );
        }
    }

    fn update_doors_closed(&mut self, delta_secs: f64) {
        self.vehicle.timer += delta_secs;
        if self.vehicle.timer <= self.vehicle.time_limit {
            return;
        }

        if self.route.is_last(self.vehicle.stop_index) {
            self.reverse_direction();
        } else {
            self.vehicle.stop_index += 1;
            self.vehicle.reset_leg_flags();
            self.vehicle.leg_start_secs = self.vehicle.position_secs;
            self.vehicle.enter(OperationalState::Driving, 0.0);
        }
    }

    /// Turn around at the terminus and open doors for boarding
    fn reverse_direction(&mut self) {
        self.vehicle.reverse();
        self.motion.reset();
        self.build_route();
        self.reversals += 1;
        info!(
            "Reversed at terminus; now {} towards {:?}",
            self.vehicle.direction, self.destination
        );

        let clip = self.play_door_cue(clips::DOOR_OPEN);
        let limit = (clip + self.config.door_extra_secs).max(self.config.min_dwell_secs);
        self.vehicle.enter(OperationalState::DoorsOpen, limit);
    }

    /// Everything a renderer needs for one frame
    pub fn snapshot(&self) -> DisplaySnapshot {
        let index = self.vehicle.display_stop_index;
        let (current_stop, current_scheduled) = match self.route.get(index) {
            Some(stop) => (stop.name.clone(), stop.scheduled_string()),
            None => (TERMINUS_LABEL.to_string(), String::new()),
        };

        let upcoming = self
            .route
            .stops
            .iter()
            .skip(index + 1)
            .take(self.config.upcoming_stops)
            .map(|stop| UpcomingStop {
                name: stop.name.clone(),
                scheduled: stop.scheduled_string(),
            })
            .collect();

        DisplaySnapshot {
            line_id: self.line.id.clone(),
            direction: self.vehicle.direction,
            caption: self.caption.clone(),
            destination: self.destination.clone(),
            current_stop,
            current_scheduled,
            upcoming,
            state: self.vehicle.state,
            position_secs: self.vehicle.position_secs,
            run_time_secs: self.run_time,
            disruption: self.vehicle.active_disruption,
            pending_announcements: self.queue.pending_len(),
        }
    }

    /// Print a summary of the engine state
    pub fn print_summary(&self) {
        let snapshot = self.snapshot();
        println!("=== {} ===", snapshot.caption);
        println!("Run time: {:.1}s", snapshot.run_time_secs);
        println!("{} -> {}", snapshot.line_id, snapshot.destination);
        println!(
            "State: {} | t={:.0}s / {:.0}s",
            snapshot.state_label(),
            snapshot.position_secs,
            self.route.total_duration()
        );
        println!(
            "Stop: {} {}",
            snapshot.current_stop, snapshot.current_scheduled
        );
        for stop in &snapshot.upcoming {
            println!("  {:>5}  {}", stop.scheduled, stop.name);
        }
        if let Some(reason) = snapshot.disruption {
            println!("!! Disruption: {}", reason);
        }
        println!(
            "Announcements pending: {} | dispatched: {}",
            snapshot.pending_announcements,
            self.queue.dispatched()
        );
        println!(
            "Reversals: {} | Disruptions: {}",
            self.reversals, self.disruptions_triggered
        );
    }
}
