//! Top-level application state machine.
//!
//! `AppState` owns the [`GestureTracker`], whose sink is the [`Transport`]
//! (playback model + MIDI player).  It starts and stops tracking sessions,
//! pumps the detector feed once per UI frame and hands the visualizer a
//! [`Scene`] to draw.

use std::sync::mpsc::{self, Sender};
use std::time::{Duration, Instant};

use gesture_core::{GestureKind, GestureTracker, TrackingState};
use tracing::{info, warn};

use crate::config::{DeckConfig, DetectorKind};
use crate::error::{DeckError, Result};
use crate::player::{Player, PlayerSettings};
use crate::sources::{open_detector, SimInput};
use crate::transport::Transport;
use crate::visualizer::{Scene, UiRequest, Visualizer};

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    cfg:           DeckConfig,
    tracker:       GestureTracker<Transport>,
    loading_since: Option<Instant>,

    // ── status message ────────────────────────────────────────────────────
    pub status:    String,
}

impl AppState {
    pub fn new(cfg: DeckConfig, player: Player) -> Self {
        let transport = Transport::new(player, &cfg.player);
        let tracker   = GestureTracker::new(cfg.gestures.clone(), transport);
        AppState {
            cfg,
            tracker,
            loading_since: None,
            status: "Ready - press T to start tracking".to_string(),
        }
    }

    // ── Session control ───────────────────────────────────────────────────

    /// Start a tracking session.  Returns the simulator input channel for
    /// this session; `None` if the detector could not even be built.
    pub fn start_tracking(&mut self, now: Instant) -> Option<Sender<SimInput>> {
        if self.tracker.is_tracking() || self.tracker.is_loading() {
            return None;
        }
        let (tx, rx) = mpsc::channel();
        match open_detector(&self.cfg.detector, rx) {
            Ok(detector) => {
                self.status = format!("Starting {} detector...", detector.name());
                self.tracker.start(detector);
                self.loading_since = Some(now);
                Some(tx)
            }
            Err(e) => {
                warn!(error = %e, "cannot build detector");
                self.status = e.to_string();
                None
            }
        }
    }

    pub fn stop_tracking(&mut self) {
        self.tracker.stop();
        self.loading_since = None;
        if self.tracker.error().is_none() {
            self.status = "Tracking stopped".to_string();
        }
    }

    /// Flip between tracking and stopped.  See [`start_tracking`](Self::start_tracking).
    pub fn toggle_tracking(&mut self, now: Instant) -> Option<Sender<SimInput>> {
        if self.tracker.is_tracking() || self.tracker.is_loading() {
            self.stop_tracking();
            None
        } else {
            self.start_tracking(now)
        }
    }

    // ── Per-frame tick ────────────────────────────────────────────────────

    pub fn tick(&mut self, now: Instant) {
        let fired = match self.tracker.pump(now) {
            Ok(g)  => g,
            Err(e) => {
                self.loading_since = None;
                self.status = format!("Tracking failed: {}", e);
                None
            }
        };

        if self.tracker.is_tracking() && self.loading_since.take().is_some() {
            self.status = "Tracking - show your hand".to_string();
        }
        if let Some(since) = self.loading_since {
            let limit = Duration::from_millis(self.cfg.detector.ready_timeout_ms);
            if now.saturating_duration_since(since) > limit {
                warn!(timeout_ms = self.cfg.detector.ready_timeout_ms, "detector never became ready");
                self.stop_tracking();
                self.status = format!(
                    "Detector not ready after {} s", self.cfg.detector.ready_timeout_ms / 1000
                );
            }
        }

        if let Some(g) = fired {
            self.status = gesture_status(g, self.transport());
        }
        self.tracker.sink_mut().tick(now);
    }

    // ── Accessors for the render loop ─────────────────────────────────────

    pub fn tracker(&self)   -> &GestureTracker<Transport> { &self.tracker }
    pub fn transport(&self) -> &Transport                 { self.tracker.sink() }
    pub fn state(&self)     -> &TrackingState             { self.tracker.state() }

    pub fn scene(&self, now: Instant) -> Scene<'_> {
        let transport = self.transport();
        Scene {
            tracking:  self.tracker.state(),
            detector:  detector_label(self.cfg.detector.kind),
            pose:      self.tracker.pose(),
            readout:   self.tracker.readout(),
            feedback:  self.tracker.feedback(now),
            playback:  transport.state(),
            track:     transport.current(),
            last_note: transport.last_note(),
            status:    &self.status,
        }
    }
}

fn gesture_status(g: GestureKind, transport: &Transport) -> String {
    let pb = transport.state();
    format!(
        "{} -> {}  |  vol {}{}",
        g,
        g.label(),
        (pb.volume() * 100.0).round() as u32,
        if pb.is_muted() { " muted" } else { "" },
    )
}

fn detector_label(kind: DetectorKind) -> &'static str {
    match kind {
        DetectorKind::Sim     => "sim",
        DetectorKind::Process => "process",
        DetectorKind::Leap    => "leap",
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the full application.
///
/// This is the entry point called from `main.rs`.  It opens the MIDI player
/// and the visualizer, starts tracking with the configured detector and
/// drives the pump/render loop at ~60 fps.
pub fn run(cfg: DeckConfig) -> Result<()> {
    let player = Player::spawn(PlayerSettings {
        instrument: cfg.player.instrument,
        channel:    cfg.player.channel,
        port_hint:  cfg.player.port_hint.clone(),
        ..PlayerSettings::default()
    });

    let mut vis = Visualizer::new().map_err(DeckError::Window)?;
    let mut app = AppState::new(cfg, player);

    if let Some(tx) = app.start_tracking(Instant::now()) {
        vis.connect_sim(tx);
    }

    // ── Main loop ─────────────────────────────────────────────────────────
    while vis.is_open() {
        match vis.poll_input() {
            Some(UiRequest::Quit) => break,
            Some(UiRequest::ToggleTracking) => {
                if let Some(tx) = app.toggle_tracking(Instant::now()) {
                    vis.connect_sim(tx);
                }
            }
            None => {}
        }

        let now = Instant::now();
        app.tick(now);
        vis.render(&app.scene(now));
    }

    app.stop_tracking();
    info!("window closed");
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
