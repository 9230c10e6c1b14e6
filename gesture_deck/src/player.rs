//! Real-time MIDI playback thread.
//!
//! The playlist is a set of short public-domain melodies rendered note by
//! note to a MIDI output port.  The thread is driven by [`PlayerCommand`]s
//! and reports back through [`PlayerEvent`]s.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

// ════════════════════════════════════════════════════════════════════════════
// Playlist
// ════════════════════════════════════════════════════════════════════════════

/// Ticks per quarter note.
pub const TPQ: u32 = 480;

const Q:  u32 = TPQ;
const E8: u32 = TPQ / 2;
const DQ: u32 = TPQ * 3 / 2;
const H:  u32 = TPQ * 2;

/// One melody.  Notes are `(midi pitch, ticks)`; pitch 0 is a rest.
#[derive(Debug)]
pub struct Track {
    pub title:     &'static str,
    pub composer:  &'static str,
    pub tempo_bpm: u32,
    pub notes:     &'static [(u8, u32)],
}

impl Track {
    /// Total running time at the track's tempo.
    pub fn length(&self) -> Duration {
        let ms: u64 = self.notes.iter().map(|&(_, t)| ticks_to_ms(t, TPQ, self.tempo_bpm)).sum();
        Duration::from_millis(ms)
    }
}

pub static PLAYLIST: [Track; 4] = [
    Track {
        title: "Ode to Joy", composer: "Beethoven", tempo_bpm: 120,
        notes: &[
            (64, Q), (64, Q), (65, Q), (67, Q), (67, Q), (65, Q), (64, Q), (62, Q),
            (60, Q), (60, Q), (62, Q), (64, Q), (64, DQ), (62, E8), (62, H),
            (64, Q), (64, Q), (65, Q), (67, Q), (67, Q), (65, Q), (64, Q), (62, Q),
            (60, Q), (60, Q), (62, Q), (64, Q), (62, DQ), (60, E8), (60, H),
        ],
    },
    Track {
        title: "Twinkle Twinkle", composer: "Traditional", tempo_bpm: 110,
        notes: &[
            (60, Q), (60, Q), (67, Q), (67, Q), (69, Q), (69, Q), (67, H),
            (65, Q), (65, Q), (64, Q), (64, Q), (62, Q), (62, Q), (60, H),
            (67, Q), (67, Q), (65, Q), (65, Q), (64, Q), (64, Q), (62, H),
            (67, Q), (67, Q), (65, Q), (65, Q), (64, Q), (64, Q), (62, H),
        ],
    },
    Track {
        title: "Frere Jacques", composer: "Traditional", tempo_bpm: 126,
        notes: &[
            (60, Q), (62, Q), (64, Q), (60, Q), (60, Q), (62, Q), (64, Q), (60, Q),
            (64, Q), (65, Q), (67, H), (64, Q), (65, Q), (67, H),
            (67, E8), (69, E8), (67, E8), (65, E8), (64, Q), (60, Q),
            (67, E8), (69, E8), (67, E8), (65, E8), (64, Q), (60, Q),
            (60, Q), (55, Q), (60, H), (60, Q), (55, Q), (60, H),
        ],
    },
    Track {
        title: "Mary Had a Little Lamb", composer: "Traditional", tempo_bpm: 116,
        notes: &[
            (64, Q), (62, Q), (60, Q), (62, Q), (64, Q), (64, Q), (64, H),
            (62, Q), (62, Q), (62, H), (64, Q), (67, Q), (67, H),
            (64, Q), (62, Q), (60, Q), (62, Q), (64, Q), (64, Q), (64, Q), (64, Q),
            (62, Q), (62, Q), (64, Q), (62, Q), (60, H), (0, H),
        ],
    },
];

// ════════════════════════════════════════════════════════════════════════════
// PlayerCommand / PlayerEvent
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PlayerCommand {
    /// Cue a track from its beginning.  Does not change play/pause.
    Load(usize),
    Play,
    Pause,
    /// Output level 0.0–1.0 (0 when muted).
    SetVolume(f32),
    /// Terminate the thread.
    Quit,
}

/// Emitted by the player so the app can follow along.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerEvent {
    /// A note started sounding.
    Note { track: usize, index: usize, pitch: u8 },
    /// The last note of `track` finished.
    TrackEnded(usize),
}

// ════════════════════════════════════════════════════════════════════════════
// MidiOut — abstraction over midir / null (for testing)
// ════════════════════════════════════════════════════════════════════════════

trait MidiOut: Send {
    fn program_change(&mut self, channel: u8, program: u8);
    fn control_change(&mut self, channel: u8, controller: u8, value: u8);
    fn note_on(&mut self,  channel: u8, note: u8, velocity: u8);
    fn note_off(&mut self, channel: u8, note: u8);
}

// ── midir backend ─────────────────────────────────────────────────────────

struct MidirOut {
    conn: midir::MidiOutputConnection,
}

impl MidiOut for MidirOut {
    fn program_change(&mut self, channel: u8, program: u8) {
        let _ = self.conn.send(&[0xC0 | (channel & 0x0F), program & 0x7F]);
    }
    fn control_change(&mut self, channel: u8, controller: u8, value: u8) {
        let _ = self.conn.send(&[0xB0 | (channel & 0x0F), controller & 0x7F, value & 0x7F]);
    }
    fn note_on(&mut self, channel: u8, note: u8, velocity: u8) {
        let _ = self.conn.send(&[0x90 | (channel & 0x0F), note, velocity]);
    }
    fn note_off(&mut self, channel: u8, note: u8) {
        let _ = self.conn.send(&[0x80 | (channel & 0x0F), note, 0]);
    }
}

// ── null backend (used when no MIDI port is available) ────────────────────

struct NullOut;
impl MidiOut for NullOut {
    fn program_change(&mut self, _ch: u8, _p: u8)          {}
    fn control_change(&mut self, _ch: u8, _c: u8, _v: u8)  {}
    fn note_on(&mut self, _ch: u8, _n: u8, _v: u8)         {}
    fn note_off(&mut self, _ch: u8, _n: u8)                {}
}

// ════════════════════════════════════════════════════════════════════════════
// open_midi_output — enumerate ports and pick one
// ════════════════════════════════════════════════════════════════════════════

/// Open the port whose name contains `hint`, else a visible softsynth, else
/// the first port.  Falls back to `NullOut` with a warning if none found.
fn open_midi_output(hint: Option<&str>) -> Box<dyn MidiOut> {
    let midi_out = match midir::MidiOutput::new("gesture_deck_player") {
        Ok(m)  => m,
        Err(e) => {
            warn!(error = %e, "MIDI init failed; using null output");
            return Box::new(NullOut);
        }
    };

    let ports = midi_out.ports();
    if ports.is_empty() {
        warn!("no MIDI output ports found; using null output \
               (try `timidity -iA` or `fluidsynth` on Linux)");
        return Box::new(NullOut);
    }

    let names: Vec<String> = ports.iter()
        .map(|p| midi_out.port_name(p).unwrap_or_default().to_lowercase())
        .collect();

    let by_hint = hint
        .map(|h| h.to_lowercase())
        .and_then(|h| names.iter().position(|n| n.contains(&h)));
    let by_synth = names.iter().position(|n| {
        n.contains("fluid") || n.contains("timidity") ||
        n.contains("microsoft") || n.contains("gm") ||
        n.contains("synth")
    });
    let port_idx = by_hint.or(by_synth).unwrap_or(0);

    let port = &ports[port_idx];
    let name = midi_out.port_name(port).unwrap_or_else(|_| "Unknown".to_string());
    info!(port = %name, "opening MIDI port");

    match midi_out.connect(port, "gesture-deck-play") {
        Ok(conn) => Box::new(MidirOut { conn }),
        Err(e) => {
            warn!(error = %e, "MIDI connect failed; using null output");
            Box::new(NullOut)
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Player — the playback thread
// ════════════════════════════════════════════════════════════════════════════

/// Playback settings fixed for the lifetime of the thread.
#[derive(Clone, Debug)]
pub struct PlayerSettings {
    pub instrument: u8,
    pub channel:    u8,
    pub velocity:   u8,
    pub port_hint:  Option<String>,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        PlayerSettings { instrument: 0, channel: 0, velocity: 100, port_hint: None }
    }
}

/// Handle to the MIDI playback thread.
pub struct Player {
    cmd_tx:   Sender<PlayerCommand>,
    event_rx: Receiver<PlayerEvent>,
    handle:   Option<thread::JoinHandle<()>>,
}

impl Player {
    /// Spawn the playback thread on a real MIDI port (or the null fallback).
    pub fn spawn(settings: PlayerSettings) -> Self {
        Self::spawn_with(settings, true)
    }

    /// Spawn the playback thread without touching MIDI devices.
    pub fn silent() -> Self {
        Self::spawn_with(PlayerSettings::default(), false)
    }

    fn spawn_with(settings: PlayerSettings, use_midi: bool) -> Self {
        let (cmd_tx, cmd_rx)     = mpsc::channel::<PlayerCommand>();
        let (event_tx, event_rx) = mpsc::channel::<PlayerEvent>();

        let handle = thread::spawn(move || {
            let midi: Box<dyn MidiOut> = if use_midi {
                open_midi_output(settings.port_hint.as_deref())
            } else {
                Box::new(NullOut)
            };
            player_thread(midi, &PLAYLIST, settings, cmd_rx, event_tx);
        });

        Player { cmd_tx, event_rx, handle: Some(handle) }
    }

    pub fn send(&self, cmd: PlayerCommand) { let _ = self.cmd_tx.send(cmd); }

    pub fn playlist(&self) -> &'static [Track] { &PLAYLIST }

    /// Drain any pending player events (non-blocking).
    pub fn drain_events(&self) -> Vec<PlayerEvent> {
        let mut out = Vec::new();
        while let Ok(ev) = self.event_rx.try_recv() { out.push(ev); }
        out
    }

    #[cfg(test)]
    fn next_event(&self, timeout: Duration) -> Option<PlayerEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(PlayerCommand::Quit);
        if let Some(h) = self.handle.take() {
            let _ = h.join();
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// player_thread — the actual loop
// ════════════════════════════════════════════════════════════════════════════

/// Mutable state of the playback loop.
struct Cursor {
    track:   usize,
    index:   usize,
    playing: bool,
    volume:  f32,
}

impl Cursor {
    /// Apply one command.  Returns false on `Quit`.
    fn apply(&mut self, cmd: PlayerCommand, playlist: &[Track]) -> bool {
        match cmd {
            PlayerCommand::Load(t) => {
                self.track = t.min(playlist.len().saturating_sub(1));
                self.index = 0;
            }
            PlayerCommand::Play        => self.playing = true,
            PlayerCommand::Pause       => self.playing = false,
            PlayerCommand::SetVolume(v) => self.volume = v.clamp(0.0, 1.0),
            PlayerCommand::Quit        => return false,
        }
        true
    }
}

fn player_thread(
    mut midi:  Box<dyn MidiOut>,
    playlist:  &[Track],
    settings:  PlayerSettings,
    cmd_rx:    Receiver<PlayerCommand>,
    event_tx:  Sender<PlayerEvent>,
) {
    let ch = settings.channel;
    let mut cur = Cursor { track: 0, index: 0, playing: false, volume: 1.0 };
    let mut sent_volume = None;

    midi.program_change(ch, settings.instrument);

    loop {
        // ── drain commands ────────────────────────────────────────────────
        loop {
            match cmd_rx.try_recv() {
                Ok(cmd) => if !cur.apply(cmd, playlist) { return; },
                Err(TryRecvError::Empty)        => break,
                Err(TryRecvError::Disconnected) => return,
            }
        }

        if sent_volume != Some(cur.volume) {
            midi.control_change(ch, 7, volume_to_cc(cur.volume));
            sent_volume = Some(cur.volume);
        }

        let track = match playlist.get(cur.track) {
            Some(t) => t,
            None    => return,
        };
        if !cur.playing || cur.index >= track.notes.len() {
            // Waiting for Play, or for the next Load after the track ended.
            match cmd_rx.recv_timeout(Duration::from_millis(10)) {
                Ok(cmd) => if !cur.apply(cmd, playlist) { return; },
                Err(RecvTimeoutError::Timeout)      => {}
                Err(RecvTimeoutError::Disconnected) => return,
            }
            continue;
        }

        // ── sound the next note ───────────────────────────────────────────
        let (pitch, ticks) = track.notes[cur.index];
        let millis = ticks_to_ms(ticks, TPQ, track.tempo_bpm);
        let (track_idx, note_idx) = (cur.track, cur.index);

        if pitch > 0 {
            midi.note_on(ch, pitch, settings.velocity);
            let _ = event_tx.send(PlayerEvent::Note { track: track_idx, index: note_idx, pitch });
        }

        // Hold the note, but react to commands immediately.
        let deadline = Instant::now() + Duration::from_millis(millis);
        let mut interrupted = false;
        loop {
            let now = Instant::now();
            if now >= deadline { break; }
            match cmd_rx.recv_timeout(deadline - now) {
                Ok(cmd) => {
                    if !cur.apply(cmd, playlist) {
                        if pitch > 0 { midi.note_off(ch, pitch); }
                        return;
                    }
                    if cur.volume != sent_volume.unwrap_or(-1.0) {
                        midi.control_change(ch, 7, volume_to_cc(cur.volume));
                        sent_volume = Some(cur.volume);
                    }
                    if !cur.playing || cur.track != track_idx || cur.index != note_idx {
                        interrupted = true;
                        break;
                    }
                }
                Err(RecvTimeoutError::Timeout)      => break,
                Err(RecvTimeoutError::Disconnected) => return,
            }
        }

        if pitch > 0 { midi.note_off(ch, pitch); }

        if interrupted {
            // Resume a paused note from its start; a Load already reset the cursor.
            continue;
        }
        cur.index += 1;
        if cur.index >= track.notes.len() {
            debug!(track = track.title, "track finished");
            let _ = event_tx.send(PlayerEvent::TrackEnded(track_idx));
        }
    }
}

/// Map a 0.0–1.0 level to MIDI CC7.
fn volume_to_cc(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 127.0).round() as u8
}

/// Convert ticks to milliseconds given TPQ and BPM.
fn ticks_to_ms(ticks: u32, tpq: u32, bpm: u32) -> u64 {
    // ms = ticks * (60_000 / bpm) / tpq
    let ms_per_beat = 60_000u64 / bpm.max(1) as u64;
    (ticks as u64 * ms_per_beat / tpq.max(1) as u64).max(50)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_to_ms_quarter_at_120bpm() {
        // At 120 BPM, 480 ticks (quarter note) = 500 ms
        assert_eq!(ticks_to_ms(480, 480, 120), 500);
    }

    #[test]
    fn ticks_to_ms_min_floor() {
        assert_eq!(ticks_to_ms(1, 480, 120), 50);
    }

    #[test]
    fn volume_maps_to_cc7_range() {
        assert_eq!(volume_to_cc(0.0), 0);
        assert_eq!(volume_to_cc(1.0), 127);
        assert_eq!(volume_to_cc(0.5), 64);
        assert_eq!(volume_to_cc(3.0), 127);
    }

    #[test]
    fn playlist_tracks_are_playable() {
        for t in PLAYLIST.iter() {
            assert!(!t.notes.is_empty());
            assert!(t.notes.iter().all(|&(p, _)| p < 128));
            assert!(t.length() > Duration::from_secs(3));
        }
    }

    #[test]
    fn cursor_load_rewinds_and_clamps() {
        let mut cur = Cursor { track: 0, index: 7, playing: true, volume: 1.0 };
        assert!(cur.apply(PlayerCommand::Load(2), &PLAYLIST));
        assert_eq!((cur.track, cur.index, cur.playing), (2, 0, true));
        cur.apply(PlayerCommand::Load(99), &PLAYLIST);
        assert_eq!(cur.track, PLAYLIST.len() - 1);
        assert!(!cur.apply(PlayerCommand::Quit, &PLAYLIST));
    }

    #[test]
    fn silent_player_reports_notes_once_playing() {
        let player = Player::silent();
        player.send(PlayerCommand::Load(1));
        player.send(PlayerCommand::Play);
        match player.next_event(Duration::from_secs(2)) {
            Some(PlayerEvent::Note { track, index, pitch }) => {
                assert_eq!((track, index), (1, 0));
                assert_eq!(pitch, PLAYLIST[1].notes[0].0);
            }
            other => panic!("unexpected {:?}", other),
        }
        player.send(PlayerCommand::Pause);
    }
}
