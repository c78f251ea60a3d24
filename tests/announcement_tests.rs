//! Announcement queue tests

use transit_sim::simulation::{
    current_stop_phrase, delay_phrase, next_stop_phrase, AnnouncementCue, AnnouncementQueue,
    AudioCategory, AudioPlayer, DisruptionReason, ScriptedPlayer,
};

struct FailingPlayer;

impl AudioPlayer for FailingPlayer {
    fn play(&mut self, _cue: &AnnouncementCue) -> anyhow::Result<f64> {
        anyhow::bail!("audio device missing")
    }
}

#[test]
fn test_cues_play_in_enqueue_order() {
    let mut queue = AnnouncementQueue::new(0.2);
    let mut player = ScriptedPlayer::new(0.0);

    queue.enqueue_phrase(next_stop_phrase("museum"));
    queue.enqueue_phrase(current_stop_phrase("museum", false));

    for _ in 0..100 {
        queue.tick(0.05, &mut player);
    }

    assert_eq!(
        player.played_keys(),
        vec!["gong", "next_stop", "museum", "gong", "museum"]
    );
    assert_eq!(queue.dispatched(), 5);
    assert_eq!(queue.pending_len(), 0);
}

#[test]
fn test_next_cue_waits_for_duration_plus_gap() {
    let mut queue = AnnouncementQueue::new(0.2);
    let mut player = ScriptedPlayer::new(1.0);
    queue.enqueue_phrase(vec![
        AnnouncementCue::system("first"),
        AnnouncementCue::system("second"),
    ]);

    let dt = 0.1;
    let mut dispatch_times = Vec::new();
    let mut now = 0.0;
    for _ in 0..40 {
        if queue.tick(dt, &mut player).is_some() {
            dispatch_times.push(now);
        }
        now += dt;
    }

    assert_eq!(dispatch_times.len(), 2);
    let spacing = dispatch_times[1] - dispatch_times[0];
    assert!(spacing >= 1.2 - 1e-9, "second cue came after {spacing}s");
    assert!(spacing < 1.2 + dt + 1e-9);
}

#[test]
fn test_only_one_cue_in_flight() {
    let mut queue = AnnouncementQueue::new(0.2);
    let mut player = ScriptedPlayer::new(0.5).with_duration("gong", 2.0);
    queue.enqueue_phrase(delay_phrase("7", DisruptionReason::TrafficAccident));
    queue.enqueue_phrase(current_stop_phrase("depot", true));

    let dt = 0.016;
    let mut last_dispatch: Option<(f64, f64)> = None;
    let mut now = 0.0;
    for _ in 0..2000 {
        if let Some(cue) = queue.tick(dt, &mut player) {
            if let Some((at, required)) = last_dispatch {
                assert!(now - at >= required - 1e-9, "{cue} dispatched too early");
            }
            let duration = if cue.key == "gong" { 2.0 } else { 0.5 };
            last_dispatch = Some((now, duration + 0.2));
            assert!(queue.in_flight().is_some());
        }
        now += dt;
    }
    assert_eq!(queue.dispatched(), 7);
}

#[test]
fn test_failed_playback_does_not_stall_queue() {
    let mut queue = AnnouncementQueue::new(0.2);
    let mut player = FailingPlayer;
    queue.enqueue_phrase(next_stop_phrase("harbour"));

    let mut ticks = 0;
    while queue.pending_len() > 0 && ticks < 100 {
        queue.tick(0.1, &mut player);
        ticks += 1;
    }

    assert_eq!(queue.pending_len(), 0);
    assert_eq!(queue.dispatched(), 3);
    // One dispatch every gap: about two ticks of 0.1s per cue
    assert!(ticks <= 7, "took {ticks} ticks");
}

#[test]
fn test_queue_goes_idle_after_last_cue() {
    let mut queue = AnnouncementQueue::default();
    let mut player = ScriptedPlayer::new(0.3);
    assert!(queue.is_idle());

    queue.enqueue_phrase(vec![AnnouncementCue::stop("pier")]);
    queue.tick(0.1, &mut player);
    assert!(!queue.is_idle());
    assert!(queue.cooldown() > 0.0);

    for _ in 0..10 {
        queue.tick(0.1, &mut player);
    }
    assert!(queue.is_idle());
}

#[test]
fn test_phrase_shapes() {
    let next = next_stop_phrase("castle");
    assert_eq!(next.len(), 3);
    assert_eq!(next[2].category, AudioCategory::Stop);

    assert_eq!(current_stop_phrase("castle", false).len(), 2);
    let last = current_stop_phrase("castle", true);
    assert_eq!(last.len(), 3);
    assert_eq!(last[2], AnnouncementCue::system("terminus"));

    let delay = delay_phrase("12", DisruptionReason::PowerOutage);
    let keys: Vec<&str> = delay.iter().map(|c| c.key.as_str()).collect();
    assert_eq!(
        keys,
        vec!["line", "num_12", "delayed_due_to", "reason_power_outage"]
    );
}
