//! Playback state and the gesture → action mapping.
//!
//! [`PlaybackState`] is the pure model: track cursor, play/pause, volume,
//! mute and per-track likes, with time injected for the "restart instead of
//! previous" rule.  [`Transport`] couples it to the MIDI [`Player`] and is
//! the tracker's gesture sink.

use std::time::{Duration, Instant};

use gesture_core::{GestureKind, GestureSink};
use tracing::{debug, info};

use crate::config::PlayerConfig;
use crate::player::{Player, PlayerCommand, PlayerEvent, Track};

// ════════════════════════════════════════════════════════════════════════════
// Action
// ════════════════════════════════════════════════════════════════════════════

/// A player operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    TogglePlay,
    Play,
    Pause,
    Previous,
    Next,
    VolumeUp,
    VolumeDown,
    ToggleLike,
    ToggleMute,
    /// Set liked; idempotent.
    Like,
}

impl Action {
    pub fn for_gesture(kind: GestureKind) -> Action {
        match kind {
            GestureKind::Tap        => Action::TogglePlay,
            GestureKind::Pointing   => Action::Play,
            GestureKind::OpenPalm   => Action::Pause,
            GestureKind::SwipeLeft  => Action::Previous,
            GestureKind::SwipeRight => Action::Next,
            GestureKind::SwipeUp    => Action::VolumeUp,
            GestureKind::SwipeDown  => Action::VolumeDown,
            GestureKind::DoubleTap  => Action::ToggleLike,
            GestureKind::Pinch      => Action::ToggleMute,
            GestureKind::ThumbsUp   => Action::Like,
        }
    }
}

/// What the audio side must do after an action.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Effect {
    None,
    /// Cue this track from the start (also used to restart the current one).
    Load(usize),
    Playback(bool),
    /// New effective output level.
    Volume(f32),
}

// ════════════════════════════════════════════════════════════════════════════
// PlaybackState
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct PlaybackState {
    track:       usize,
    track_count: usize,
    playing:     bool,
    volume:      f32,
    muted:       bool,
    liked:       Vec<bool>,

    // playhead
    elapsed:     Duration,
    resumed_at:  Option<Instant>,

    volume_step: f32,
    restart_after: Duration,
}

impl PlaybackState {
    pub fn new(track_count: usize, cfg: &PlayerConfig) -> Self {
        let track_count = track_count.max(1);
        PlaybackState {
            track:       0,
            track_count,
            playing:     false,
            volume:      cfg.initial_volume.clamp(0.0, 1.0),
            muted:       cfg.initial_volume <= 0.0,
            liked:       vec![false; track_count],
            elapsed:     Duration::ZERO,
            resumed_at:  None,
            volume_step: cfg.volume_step,
            restart_after: Duration::from_millis(cfg.restart_threshold_ms),
        }
    }

    pub fn apply(&mut self, action: Action, now: Instant) -> Effect {
        match action {
            Action::TogglePlay => {
                if self.playing { self.pause(now) } else { self.play(now) }
            }
            Action::Play       => self.play(now),
            Action::Pause      => self.pause(now),
            Action::Next       => self.next(now),
            Action::Previous   => self.previous(now),
            Action::VolumeUp   => self.set_volume(self.volume + self.volume_step),
            Action::VolumeDown => self.set_volume(self.volume - self.volume_step),
            Action::ToggleMute => {
                self.muted = !self.muted;
                Effect::Volume(self.output_level())
            }
            Action::ToggleLike => {
                self.liked[self.track] = !self.liked[self.track];
                Effect::None
            }
            Action::Like => {
                self.liked[self.track] = true;
                Effect::None
            }
        }
    }

    fn play(&mut self, now: Instant) -> Effect {
        if !self.playing {
            self.playing    = true;
            self.resumed_at = Some(now);
        }
        Effect::Playback(true)
    }

    fn pause(&mut self, now: Instant) -> Effect {
        if self.playing {
            self.elapsed    = self.position(now);
            self.playing    = false;
            self.resumed_at = None;
        }
        Effect::Playback(false)
    }

    /// Advance with wrap-around.  Play state carries over.
    pub fn next(&mut self, now: Instant) -> Effect {
        self.cue((self.track + 1) % self.track_count, now)
    }

    /// Restart the current track once it has played past the threshold,
    /// otherwise step back with wrap-around.
    pub fn previous(&mut self, now: Instant) -> Effect {
        if self.position(now) > self.restart_after {
            return self.cue(self.track, now);
        }
        let prev = if self.track == 0 { self.track_count - 1 } else { self.track - 1 };
        self.cue(prev, now)
    }

    fn cue(&mut self, track: usize, now: Instant) -> Effect {
        self.track      = track;
        self.elapsed    = Duration::ZERO;
        self.resumed_at = if self.playing { Some(now) } else { None };
        Effect::Load(track)
    }

    /// Clamp to `[0, 1]`; muted exactly when the result is zero.
    pub fn set_volume(&mut self, volume: f32) -> Effect {
        self.volume = volume.clamp(0.0, 1.0);
        self.muted  = self.volume == 0.0;
        Effect::Volume(self.output_level())
    }

    /// Level actually sent to the output: the stored volume unless muted.
    pub fn output_level(&self) -> f32 { if self.muted { 0.0 } else { self.volume } }

    /// Time into the current track.
    pub fn position(&self, now: Instant) -> Duration {
        match self.resumed_at {
            Some(t) => self.elapsed + now.saturating_duration_since(t),
            None    => self.elapsed,
        }
    }

    pub fn track(&self)      -> usize { self.track }
    pub fn is_playing(&self) -> bool  { self.playing }
    pub fn volume(&self)     -> f32   { self.volume }
    pub fn is_muted(&self)   -> bool  { self.muted }
    pub fn is_liked(&self)   -> bool  { self.liked[self.track] }

    pub fn liked_tracks(&self) -> impl Iterator<Item = usize> + '_ {
        self.liked.iter().enumerate().filter(|(_, l)| **l).map(|(i, _)| i)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Transport
// ════════════════════════════════════════════════════════════════════════════

/// Playback state plus the thread that renders it.
pub struct Transport {
    state:     PlaybackState,
    player:    Player,
    last_note: Option<(usize, u8)>,
}

impl Transport {
    pub fn new(player: Player, cfg: &PlayerConfig) -> Self {
        let state = PlaybackState::new(player.playlist().len(), cfg);
        player.send(PlayerCommand::Load(state.track()));
        player.send(PlayerCommand::SetVolume(state.output_level()));
        Transport { state, player, last_note: None }
    }

    /// Run `action` against the model and forward its effect to the player.
    pub fn perform(&mut self, action: Action, now: Instant) {
        let effect = self.state.apply(action, now);
        debug!(?action, ?effect, "transport action");
        match effect {
            Effect::None            => {}
            Effect::Load(t)         => {
                self.last_note = None;
                self.player.send(PlayerCommand::Load(t));
                info!(track = self.current().title, "now playing");
            }
            Effect::Playback(true)  => self.player.send(PlayerCommand::Play),
            Effect::Playback(false) => self.player.send(PlayerCommand::Pause),
            Effect::Volume(v)       => self.player.send(PlayerCommand::SetVolume(v)),
        }
    }

    /// Follow the player: remember the sounding note, advance on track end.
    pub fn tick(&mut self, now: Instant) {
        for ev in self.player.drain_events() {
            match ev {
                PlayerEvent::Note { track, index, .. } if track == self.state.track() => {
                    self.last_note = Some((index, self.current().notes[index].0));
                }
                PlayerEvent::TrackEnded(t) if t == self.state.track() => {
                    self.perform(Action::Next, now);
                }
                _ => {}
            }
        }
    }

    pub fn state(&self)   -> &PlaybackState { &self.state }
    pub fn current(&self) -> &'static Track { &self.player.playlist()[self.state.track()] }

    /// Index and pitch of the note last reported for the current track.
    pub fn last_note(&self) -> Option<(usize, u8)> { self.last_note }
}

impl GestureSink for Transport {
    fn on_gesture(&mut self, kind: GestureKind, at: Instant) {
        self.perform(Action::for_gesture(kind), at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(t0: Instant, ms: u64) -> Instant { t0 + Duration::from_millis(ms) }

    fn state() -> PlaybackState { PlaybackState::new(4, &PlayerConfig::default()) }

    #[test]
    fn every_gesture_has_its_action() {
        assert_eq!(Action::for_gesture(GestureKind::Tap),        Action::TogglePlay);
        assert_eq!(Action::for_gesture(GestureKind::Pointing),   Action::Play);
        assert_eq!(Action::for_gesture(GestureKind::OpenPalm),   Action::Pause);
        assert_eq!(Action::for_gesture(GestureKind::SwipeLeft),  Action::Previous);
        assert_eq!(Action::for_gesture(GestureKind::SwipeRight), Action::Next);
        assert_eq!(Action::for_gesture(GestureKind::SwipeUp),    Action::VolumeUp);
        assert_eq!(Action::for_gesture(GestureKind::SwipeDown),  Action::VolumeDown);
        assert_eq!(Action::for_gesture(GestureKind::DoubleTap),  Action::ToggleLike);
        assert_eq!(Action::for_gesture(GestureKind::Pinch),      Action::ToggleMute);
        assert_eq!(Action::for_gesture(GestureKind::ThumbsUp),   Action::Like);
    }

    #[test]
    fn toggle_play_flips_state() {
        let t0 = Instant::now();
        let mut s = state();
        assert_eq!(s.apply(Action::TogglePlay, t0), Effect::Playback(true));
        assert!(s.is_playing());
        assert_eq!(s.apply(Action::TogglePlay, t0), Effect::Playback(false));
        assert!(!s.is_playing());
    }

    #[test]
    fn next_and_previous_wrap() {
        let t0 = Instant::now();
        let mut s = state();
        assert_eq!(s.apply(Action::Previous, t0), Effect::Load(3));
        assert_eq!(s.apply(Action::Next, t0), Effect::Load(0));
        for _ in 0..3 { s.apply(Action::Next, t0); }
        assert_eq!(s.track(), 3);
        assert_eq!(s.apply(Action::Next, t0), Effect::Load(0));
    }

    #[test]
    fn previous_restarts_after_three_seconds() {
        let t0 = Instant::now();
        let mut s = state();
        s.apply(Action::Next, t0);
        s.apply(Action::Play, t0);
        assert_eq!(s.apply(Action::Previous, at(t0, 3500)), Effect::Load(1));
        assert_eq!(s.position(at(t0, 3500)), Duration::ZERO);
        // right after the restart it steps back
        assert_eq!(s.apply(Action::Previous, at(t0, 4000)), Effect::Load(0));
    }

    #[test]
    fn paused_time_does_not_count() {
        let t0 = Instant::now();
        let mut s = state();
        s.apply(Action::Play, t0);
        s.apply(Action::Pause, at(t0, 2000));
        assert_eq!(s.position(at(t0, 9000)), Duration::from_millis(2000));
        assert_eq!(s.apply(Action::Previous, at(t0, 9000)), Effect::Load(3));
    }

    #[test]
    fn volume_steps_clamp_and_mute_at_zero() {
        let t0 = Instant::now();
        let mut s = state(); // 0.8
        s.apply(Action::VolumeUp, t0);
        assert_eq!(s.apply(Action::VolumeUp, t0), Effect::Volume(1.0));
        for _ in 0..10 { s.apply(Action::VolumeDown, t0); }
        assert_eq!(s.volume(), 0.0);
        assert!(s.is_muted());
        assert_eq!(s.apply(Action::VolumeUp, t0), Effect::Volume(0.15));
        assert!(!s.is_muted());
    }

    #[test]
    fn mute_keeps_stored_volume() {
        let t0 = Instant::now();
        let mut s = state();
        assert_eq!(s.apply(Action::ToggleMute, t0), Effect::Volume(0.0));
        assert_eq!(s.volume(), 0.8);
        assert_eq!(s.apply(Action::ToggleMute, t0), Effect::Volume(0.8));
    }

    #[test]
    fn likes_are_per_track() {
        let t0 = Instant::now();
        let mut s = state();
        s.apply(Action::ToggleLike, t0);
        assert!(s.is_liked());
        s.apply(Action::Next, t0);
        assert!(!s.is_liked());
        s.apply(Action::Like, t0);
        s.apply(Action::Like, t0);
        assert!(s.is_liked());
        s.apply(Action::Previous, t0);
        assert!(s.is_liked());
        s.apply(Action::ToggleLike, t0);
        assert!(!s.is_liked());
        assert_eq!(s.liked_tracks().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn transport_is_a_gesture_sink() {
        let t0 = Instant::now();
        let mut t = Transport::new(Player::silent(), &PlayerConfig::default());
        t.on_gesture(GestureKind::Pointing, t0);
        assert!(t.state().is_playing());
        t.on_gesture(GestureKind::SwipeRight, t0);
        assert_eq!(t.state().track(), 1);
        assert!(t.state().is_playing());
        t.on_gesture(GestureKind::OpenPalm, at(t0, 100));
        assert!(!t.state().is_playing());
        assert_eq!(t.current().title, "Twinkle Twinkle");
    }

    #[test]
    fn gesture_time_drives_previous_restart() {
        let t0 = Instant::now();
        let mut t = Transport::new(Player::silent(), &PlayerConfig::default());
        t.on_gesture(GestureKind::SwipeRight, t0);
        t.on_gesture(GestureKind::Pointing, t0);
        // stamped 3.5 s into the track, though delivered immediately
        t.on_gesture(GestureKind::SwipeLeft, at(t0, 3500));
        assert_eq!(t.state().track(), 1);
        assert_eq!(t.state().position(at(t0, 3500)), Duration::ZERO);
    }
}
