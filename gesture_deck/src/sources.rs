//! Landmark sources for the tracker.
//!
//! All three implement [`HandDetector`], so the rest of the deck does not
//! care whether hands come from the keyboard simulator, an external
//! landmark program or LeapMotion hardware.

use std::io::{BufRead, BufReader};
use std::process::{Child, ChildStdout, Command, Stdio};
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use gesture_core::{
    Error, HandDetector, HandPose, HandShape, Interrupter, Landmark, Point, SyntheticHand,
};
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::{DetectorConfig, DetectorKind};

// ════════════════════════════════════════════════════════════════════════════
// SimDetector — keyboard/mouse simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Raw input event from the simulation window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimInput {
    /// Place the index fingertip at this raw (un-mirrored) image position.
    MoveTo(Point),
    /// Select the resting hand shape.
    Shape(HandShape),
    /// Close the hand into a fist while held.
    Squeeze(bool),
    /// Show or hide the hand.
    Visible(bool),
}

/// Synthetic hand driven by [`SimInput`] events from the visualizer's window.
pub struct SimDetector {
    rx:       Receiver<SimInput>,
    interval: Duration,
    tip:      Point,
    shape:    HandShape,
    squeeze:  bool,
    visible:  bool,
}

impl SimDetector {
    pub fn new(rx: Receiver<SimInput>, interval: Duration) -> Self {
        SimDetector {
            rx,
            interval,
            tip:      Point::new(0.5, 0.5),
            shape:    HandShape::Peace,
            squeeze:  false,
            visible:  true,
        }
    }

    fn apply(&mut self, input: SimInput) {
        match input {
            SimInput::MoveTo(p)  => self.tip = p,
            SimInput::Shape(s)   => self.shape = s,
            SimInput::Squeeze(b) => self.squeeze = b,
            SimInput::Visible(b) => self.visible = b,
        }
    }

    /// Current pose with the index tip pinned to the pointer.
    fn pose(&self) -> Option<HandPose> {
        if !self.visible {
            return None;
        }
        let shape  = if self.squeeze { HandShape::Fist } else { self.shape };
        let offset = SyntheticHand::at(0.0, 0.0).pose(shape).index_tip();
        let wrist  = self.tip - offset;
        Some(SyntheticHand::at(wrist.x, wrist.y).pose(shape))
    }
}

impl HandDetector for SimDetector {
    fn name(&self) -> &str { "sim" }

    fn open(&mut self) -> gesture_core::Result<()> { Ok(()) }

    fn detect(&mut self) -> gesture_core::Result<Option<HandPose>> {
        thread::sleep(self.interval);
        while let Ok(input) = self.rx.try_recv() {
            self.apply(input);
        }
        Ok(self.pose())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ProcessDetector — external landmark program speaking JSON lines
// ════════════════════════════════════════════════════════════════════════════

/// JSON structures for parsing detector output
#[derive(Deserialize, Debug)]
struct LandmarkJson {
    x: f32,
    y: f32,
    #[serde(default)]
    z: f32,
}

#[derive(Deserialize, Debug)]
struct HandJson {
    #[serde(default = "full_score")]
    score:     f32,
    landmarks: Vec<LandmarkJson>,
}

fn full_score() -> f32 { 1.0 }

#[derive(Deserialize, Debug)]
struct FrameJson {
    #[serde(default)]
    hands: Vec<HandJson>,
    #[serde(default)]
    error: Option<String>,
}

/// Hand detector running as a child process.
///
/// The program owns the camera.  It prints `READY` once the camera and model
/// are up (or a `{"error": "..."}` line if they are not), then one JSON
/// object per analysed frame:
///
/// ```text
/// {"hands":[{"score":0.93,"landmarks":[{"x":0.51,"y":0.62,"z":-0.01}, ...21]}]}
/// ```
///
/// The child is shared with the [`Interrupter`] so a stop can kill it while
/// the detector thread is blocked reading its output.
pub struct ProcessDetector {
    command:   Vec<String>,
    min_score: f32,
    child:     Arc<Mutex<Option<Child>>>,
    stdout:    Option<BufReader<ChildStdout>>,
}

impl ProcessDetector {
    pub fn new(command: Vec<String>, min_score: f32) -> Self {
        ProcessDetector { command, min_score, child: Arc::new(Mutex::new(None)), stdout: None }
    }

    fn read_line(&mut self) -> gesture_core::Result<String> {
        let reader = self.stdout.as_mut()
            .ok_or_else(|| Error::Camera("detector process not running".to_string()))?;
        let mut line = String::new();
        let n = reader.read_line(&mut line)
            .map_err(|e| Error::Camera(format!("detector pipe: {}", e)))?;
        if n == 0 {
            return Err(Error::Camera("detector process exited".to_string()));
        }
        Ok(line)
    }
}

impl HandDetector for ProcessDetector {
    fn name(&self) -> &str { "process" }

    fn open(&mut self) -> gesture_core::Result<()> {
        let (program, args) = self.command.split_first()
            .ok_or_else(|| Error::Config("empty detector command".to_string()))?;

        info!(program = %program, "starting landmark detector subprocess");
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| Error::ModelLoad(format!("failed to start `{}`: {}", program, e)))?;

        let stdout = child.stdout.take()
            .ok_or_else(|| Error::ModelLoad("detector stdout unavailable".to_string()))?;
        self.stdout = Some(BufReader::new(stdout));
        if let Ok(mut slot) = self.child.lock() {
            *slot = Some(child);
        }

        let first = match self.read_line() {
            Ok(line) => line,
            Err(e) => {
                self.close();
                return Err(Error::ModelLoad(e.to_string()));
            }
        };
        if let Err(e) = parse_ready(&first) {
            self.close();
            return Err(e);
        }
        info!("landmark detector ready");
        Ok(())
    }

    fn detect(&mut self) -> gesture_core::Result<Option<HandPose>> {
        let line = self.read_line()?;
        parse_frame(&line, self.min_score)
    }

    fn close(&mut self) {
        self.stdout = None;
        let child = self.child.lock().ok().and_then(|mut slot| slot.take());
        if let Some(mut child) = child {
            let _ = child.kill();
            let _ = child.wait();
            debug!("landmark detector process reaped");
        }
    }

    fn interrupter(&self) -> Option<Interrupter> {
        let child = Arc::clone(&self.child);
        Some(Arc::new(move || {
            if let Ok(mut slot) = child.lock() {
                if let Some(c) = slot.as_mut() {
                    let _ = c.kill();
                }
            }
        }))
    }
}

impl Drop for ProcessDetector {
    fn drop(&mut self) { self.close(); }
}

/// Interpret the handshake line.
fn parse_ready(line: &str) -> gesture_core::Result<()> {
    let line = line.trim();
    if line == "READY" {
        return Ok(());
    }
    let msg = serde_json::from_str::<FrameJson>(line)
        .ok()
        .and_then(|f| f.error)
        .unwrap_or_else(|| format!("detector did not signal ready, got: {}", line));
    Err(classify_startup_error(msg))
}

/// Map a startup error message onto the acquisition categories.
fn classify_startup_error(msg: String) -> Error {
    let lower = msg.to_lowercase();
    if lower.contains("permission") || lower.contains("denied") {
        Error::Permission(msg)
    } else if lower.contains("camera") || lower.contains("device") {
        Error::Camera(msg)
    } else {
        Error::ModelLoad(msg)
    }
}

/// Parse one frame line into at most one pose: the first hand scoring at
/// least `min_score`.
fn parse_frame(line: &str, min_score: f32) -> gesture_core::Result<Option<HandPose>> {
    let frame: FrameJson = serde_json::from_str(line.trim())
        .map_err(|e| Error::Detection(format!("bad frame json: {}", e)))?;
    if let Some(err) = frame.error {
        return Err(Error::Detection(err));
    }
    let hand = match frame.hands.into_iter().find(|h| h.score >= min_score) {
        Some(h) => h,
        None    => return Ok(None),
    };
    let points: Vec<Landmark> = hand.landmarks.iter()
        .map(|l| Landmark::new(l.x, l.y, l.z))
        .collect();
    HandPose::from_slice(&points).map(Some)
}

// ════════════════════════════════════════════════════════════════════════════
// LeapDetector — real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Hand detector backed by a LeapMotion controller.
///
/// Requires the `leap` feature flag and the LeapC shared library installed.
/// Joint positions (millimetres above the device) are projected onto a
/// virtual camera image: the interaction box spans ±200 mm horizontally and
/// 100–500 mm vertically.  The image is raw camera space, so the user's
/// right is image left.
#[cfg(feature = "leap")]
pub struct LeapDetector {
    connection: Option<leaprs::Connection>,
}

#[cfg(feature = "leap")]
impl LeapDetector {
    pub fn new() -> Self { LeapDetector { connection: None } }
}

#[cfg(feature = "leap")]
const LEAP_HALF_WIDTH: f32 = 200.0;
#[cfg(feature = "leap")]
const LEAP_FLOOR:      f32 = 100.0;
#[cfg(feature = "leap")]
const LEAP_SPAN:       f32 = 400.0;

#[cfg(feature = "leap")]
fn leap_to_image(x: f32, y: f32, z: f32) -> Landmark {
    Landmark::new(
        0.5 - x / (2.0 * LEAP_HALF_WIDTH),
        1.0 - (y - LEAP_FLOOR) / LEAP_SPAN,
        z / LEAP_SPAN,
    )
}

#[cfg(feature = "leap")]
impl HandDetector for LeapDetector {
    fn name(&self) -> &str { "leap" }

    fn open(&mut self) -> gesture_core::Result<()> {
        use leaprs::*;
        let mut connection = Connection::create(ConnectionConfig::default())
            .map_err(|e| Error::ModelLoad(format!("LeapC connection: {:?}", e)))?;
        connection.open()
            .map_err(|e| Error::Camera(format!("LeapMotion device: {:?}", e)))?;
        self.connection = Some(connection);
        Ok(())
    }

    fn detect(&mut self) -> gesture_core::Result<Option<HandPose>> {
        use leaprs::*;
        const MAX_POLLS: usize = 10;

        let connection = self.connection.as_mut()
            .ok_or_else(|| Error::Camera("LeapMotion not open".to_string()))?;

        for _ in 0..MAX_POLLS {
            let msg = match connection.poll(100) {
                Ok(m)  => m,
                Err(_) => continue,
            };
            if let Event::Tracking(frame) = msg.event() {
                let hand = match frame.hands().next() {
                    Some(h) => h,
                    None    => return Ok(None),
                };
                let digits: Vec<_> = hand.digits().collect();
                if digits.len() < 5 {
                    return Ok(None);
                }

                let mut lm = [Landmark::default(); gesture_core::LANDMARK_COUNT];
                // Wrist: mean of the long fingers' carpal ends.
                let (mut wx, mut wy, mut wz) = (0.0, 0.0, 0.0);
                for d in &digits[1..] {
                    let j = d.metacarpal().prev_joint();
                    wx += j.x / 4.0; wy += j.y / 4.0; wz += j.z / 4.0;
                }
                lm[0] = leap_to_image(wx, wy, wz);

                for (f, d) in digits.iter().take(5).enumerate() {
                    let joints = [
                        d.proximal().prev_joint(),
                        d.intermediate().prev_joint(),
                        d.distal().prev_joint(),
                        d.distal().next_joint(),
                    ];
                    for (k, j) in joints.iter().enumerate() {
                        lm[1 + f * 4 + k] = leap_to_image(j.x, j.y, j.z);
                    }
                }
                return Ok(Some(HandPose::new(lm)));
            }
        }
        Err(Error::Detection("no tracking frame".to_string()))
    }

    fn close(&mut self) {
        self.connection = None;
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Factory
// ════════════════════════════════════════════════════════════════════════════

/// Build the configured detector.  `sim_rx` feeds the simulator and is
/// ignored by the other kinds.
pub fn open_detector(
    cfg:    &DetectorConfig,
    sim_rx: Receiver<SimInput>,
) -> gesture_core::Result<Box<dyn HandDetector>> {
    match cfg.kind {
        DetectorKind::Sim => Ok(Box::new(SimDetector::new(
            sim_rx,
            Duration::from_millis(cfg.frame_interval_ms),
        ))),
        DetectorKind::Process => Ok(Box::new(ProcessDetector::new(
            cfg.command.clone(),
            cfg.min_score,
        ))),
        #[cfg(feature = "leap")]
        DetectorKind::Leap => Ok(Box::new(LeapDetector::new())),
        #[cfg(not(feature = "leap"))]
        DetectorKind::Leap => Err(Error::Config(
            "built without LeapMotion support (rebuild with --features leap)".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    fn frame_json(n: usize, score: f32) -> String {
        let pts: Vec<String> = (0..n)
            .map(|i| format!(r#"{{"x":{},"y":0.5,"z":0.0}}"#, i as f32 / 40.0))
            .collect();
        format!(r#"{{"hands":[{{"score":{},"landmarks":[{}]}}]}}"#, score, pts.join(","))
    }

    #[test]
    fn parses_a_full_hand() {
        let pose = parse_frame(&frame_json(21, 0.9), 0.5).unwrap().unwrap();
        assert_eq!(pose.landmarks[20].x, 0.5);
    }

    #[test]
    fn low_score_or_no_hands_is_no_hand() {
        assert!(parse_frame(&frame_json(21, 0.3), 0.5).unwrap().is_none());
        assert!(parse_frame(r#"{"hands":[]}"#, 0.5).unwrap().is_none());
    }

    #[test]
    fn frame_errors_are_transient() {
        let e = parse_frame(r#"{"hands":[],"error":"inference timeout"}"#, 0.5).unwrap_err();
        assert!(!e.is_acquisition());
        let e = parse_frame("not json", 0.5).unwrap_err();
        assert!(matches!(e, Error::Detection(_)));
        let e = parse_frame(&frame_json(5, 1.0), 0.5).unwrap_err();
        assert!(matches!(e, Error::LandmarkCount { got: 5, .. }));
    }

    #[test]
    fn handshake_classifies_startup_failures() {
        assert!(parse_ready("READY\n").is_ok());
        assert!(matches!(
            parse_ready(r#"{"error":"Camera permission denied"}"#),
            Err(Error::Permission(_))
        ));
        assert!(matches!(
            parse_ready(r#"{"error":"no camera device at index 0"}"#),
            Err(Error::Camera(_))
        ));
        assert!(matches!(parse_ready("Traceback (most recent call last):"), Err(Error::ModelLoad(_))));
    }

    #[test]
    fn missing_program_is_a_load_failure() {
        let mut det = ProcessDetector::new(vec!["/nonexistent/hand_stream".to_string()], 0.5);
        let err = det.open().unwrap_err();
        assert!(err.is_acquisition());
    }

    #[cfg(unix)]
    #[test]
    fn stop_kills_a_silent_detector() {
        // Never prints READY; the handshake read would block for a minute.
        let det = ProcessDetector::new(vec!["sleep".to_string(), "60".to_string()], 0.5);
        let mut feed = gesture_core::spawn_detection(Box::new(det));
        thread::sleep(Duration::from_millis(100));

        let t = std::time::Instant::now();
        feed.stop();
        assert!(t.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn sim_pins_index_tip_to_pointer() {
        let (tx, rx) = mpsc::channel();
        let mut sim = SimDetector::new(rx, Duration::from_millis(1));
        tx.send(SimInput::MoveTo(Point::new(0.3, 0.4))).unwrap();
        tx.send(SimInput::Shape(HandShape::Pointing)).unwrap();
        let pose = sim.detect().unwrap().unwrap();
        assert!(pose.index_tip().distance(Point::new(0.3, 0.4)) < 1e-5);

        tx.send(SimInput::Squeeze(true)).unwrap();
        let fist = sim.detect().unwrap().unwrap();
        assert_eq!(fist, SyntheticHand::at(fist.wrist().x, fist.wrist().y).pose(HandShape::Fist));

        tx.send(SimInput::Visible(false)).unwrap();
        assert!(sim.detect().unwrap().is_none());
    }

    #[test]
    fn factory_follows_config() {
        let (_tx, rx) = mpsc::channel();
        let det = open_detector(&DetectorConfig::default(), rx).unwrap();
        assert_eq!(det.name(), "sim");

        let (_tx, rx) = mpsc::channel();
        let cfg = DetectorConfig {
            kind: DetectorKind::Process,
            command: vec!["hand_stream".to_string()],
            ..DetectorConfig::default()
        };
        assert_eq!(open_detector(&cfg, rx).unwrap().name(), "process");
    }
}
