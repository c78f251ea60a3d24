//! Announcement queue
//!
//! Cues play strictly one after another. After each dispatch the queue waits
//! for the clip's reported length plus a fixed gap before touching the next
//! cue, so a missing clip still lets the queue advance after the gap alone.

use log::debug;
use std::collections::VecDeque;

use super::audio::{play_or_silence, AnnouncementCue, AudioPlayer};
use super::config::DEFAULT_AUDIO_GAP;
use super::disruption::DisruptionReason;
use super::types::clips;

#[derive(Debug, Clone)]
pub struct AnnouncementQueue {
    pending: VecDeque<AnnouncementCue>,
    /// Seconds until the next cue may be dispatched
    cooldown: f64,
    gap: f64,
    in_flight: Option<AnnouncementCue>,
    dispatched: usize,
}

impl Default for AnnouncementQueue {
    fn default() -> Self {
        Self::new(DEFAULT_AUDIO_GAP)
    }
}

impl AnnouncementQueue {
    pub fn new(gap: f64) -> Self {
        Self {
            pending: VecDeque::new(),
            cooldown: 0.0,
            gap,
            in_flight: None,
            dispatched: 0,
        }
    }

    /// Append a whole phrase. Phrases are never interleaved with each other.
    pub fn enqueue_phrase<I>(&mut self, phrase: I)
    where
        I: IntoIterator<Item = AnnouncementCue>,
    {
        self.pending.extend(phrase);
    }

    /// Advance the cooldown and dispatch at most one cue.
    /// Returns the cue that was dispatched on this tick, if any.
    pub fn tick(&mut self, delta_secs: f64, player: &mut dyn AudioPlayer) -> Option<AnnouncementCue> {
        if self.cooldown > 0.0 {
            self.cooldown -= delta_secs;
        }
        if self.cooldown > 0.0 {
            return None;
        }
        self.in_flight = None;

        let cue = self.pending.pop_front()?;
        let duration = play_or_silence(player, &cue);
        debug!("Dispatched {} ({:.2}s)", cue, duration);

        self.cooldown = duration + self.gap;
        self.dispatched += 1;
        self.in_flight = Some(cue.clone());
        Some(cue)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty() && self.in_flight.is_none()
    }

    pub fn cooldown(&self) -> f64 {
        self.cooldown.max(0.0)
    }

    /// Cue whose clip (plus gap) is still playing
    pub fn in_flight(&self) -> Option<&AnnouncementCue> {
        self.in_flight.as_ref()
    }

    pub fn dispatched(&self) -> usize {
        self.dispatched
    }

    pub fn pending(&self) -> impl Iterator<Item = &AnnouncementCue> {
        self.pending.iter()
    }
}

/// Gong, "next stop", stop name
pub fn next_stop_phrase(stop_audio_key: &str) -> Vec<AnnouncementCue> {
    vec![
        AnnouncementCue::system(clips::GONG),
        AnnouncementCue::system(clips::NEXT_STOP),
        AnnouncementCue::stop(stop_audio_key),
    ]
}

/// Gong, stop name, and the terminus notice at the last stop
pub fn current_stop_phrase(stop_audio_key: &str, is_terminus: bool) -> Vec<AnnouncementCue> {
    let mut phrase = vec![
        AnnouncementCue::system(clips::GONG),
        AnnouncementCue::stop(stop_audio_key),
    ];
    if is_terminus {
        phrase.push(AnnouncementCue::system(clips::TERMINUS));
    }
    phrase
}

/// "Line", the line number, "is delayed due to", the cause
pub fn delay_phrase(line_id: &str, reason: DisruptionReason) -> Vec<AnnouncementCue> {
    vec![
        AnnouncementCue::system(clips::LINE_INTRO),
        AnnouncementCue::system(format!("num_{line_id}")),
        AnnouncementCue::system(clips::DELAYED_DUE_TO),
        AnnouncementCue::system(reason.audio_key()),
    ]
}
