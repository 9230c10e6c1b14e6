//! Software-rendered visualizer using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────┬──────────────────┐
//! │  [feedback banner]                        │  NOW PLAYING     │
//! │  ┌──────── top ────────┐                  │  title           │
//! │  left   [center]   right  (zones)         │  composer        │
//! │  └────── bottom ──────┘                   │  > / ||  vol     │
//! │        hand skeleton + cursor             │  mute  like      │
//! │  (mirrored camera view)                   │  note strip      │
//! ├──────────────────────────────────────────┤  confidence bar  │
//! │  status bar                               │  tracking state  │
//! └──────────────────────────────────────────┴──────────────────┘
//! ```

use std::sync::mpsc::Sender;
use std::time::Duration;

use gesture_core::{
    FrameReadout, GestureKind, HandPose, HandShape, Point, TrackingState, Zone,
    FINGERTIPS, HAND_SKELETON,
};
use gesture_core::zones::ZONES;
use minifb::{Key, KeyRepeat, MouseMode, Window, WindowOptions};

use crate::player::Track;
use crate::sources::SimInput;
use crate::transport::PlaybackState;

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W:        usize = 1000;
pub const WIN_H:        usize = 560;
const CAM_X:            usize = 10;
const CAM_Y:            usize = 30;
const CAM_W:            usize = 640;
const CAM_H:            usize = 480;
const SIDE_X:           usize = CAM_X + CAM_W + 10;
const SIDE_W:           usize = WIN_W - SIDE_X;
const STATUS_Y:         usize = WIN_H - 36;
const BG_COLOR:         u32   = 0xFF1A1A2E;
const CAM_BG:           u32   = 0xFF101820;
const SIDE_BG:          u32   = 0xFF16213E;
const TEXT_BG:          u32   = 0xFF0F3460;
const ZONE_COLOR:       u32   = 0xFF3A4A6A;
const ZONE_ACTIVE:      u32   = 0xFF4FC3F7;
const BONE_COLOR:       u32   = 0xFF66BB6A;
const JOINT_COLOR:      u32   = 0xFFE0E0E0;
const TIP_COLOR:        u32   = 0xFFFFD700;
const CURSOR_COLOR:     u32   = 0xFFFF5252;
const BANNER_COLOR:     u32   = 0xFFFFD700;
const VELOCITY_SCALE:   f32   = 6.0;

/// Everything one frame shows, borrowed from the app state.
pub struct Scene<'a> {
    pub tracking:  &'a TrackingState,
    pub detector:  &'a str,
    pub pose:      Option<&'a HandPose>,
    pub readout:   &'a FrameReadout,
    pub feedback:  Option<GestureKind>,
    pub playback:  &'a PlaybackState,
    pub track:     &'a Track,
    pub last_note: Option<(usize, u8)>,
    pub status:    &'a str,
}

/// Requests from the window that the app must act on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiRequest {
    Quit,
    ToggleTracking,
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window:   Window,
    buf:      Vec<u32>,
    sim_tx:   Option<Sender<SimInput>>,

    // last values forwarded to the simulator
    pointer:  Option<Point>,
    shape:    HandShape,
    squeeze:  bool,
    visible:  bool,
}

impl Visualizer {
    pub fn new() -> Result<Self, String> {
        let mut window = Window::new(
            "Gesture Deck",
            WIN_W, WIN_H,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        ).map_err(|e| e.to_string())?;

        window.limit_update_rate(Some(Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            buf: vec![BG_COLOR; WIN_W * WIN_H],
            sim_tx:  None,
            pointer: None,
            shape:   HandShape::Peace,
            squeeze: false,
            visible: true,
        })
    }

    /// Route simulator input to a new session and bring it up to date.
    pub fn connect_sim(&mut self, tx: Sender<SimInput>) {
        self.sim_tx = Some(tx);
        self.send(SimInput::Shape(self.shape));
        self.send(SimInput::Visible(self.visible));
        self.send(SimInput::Squeeze(self.squeeze));
        if let Some(p) = self.pointer {
            self.send(SimInput::MoveTo(p));
        }
    }

    fn send(&self, input: SimInput) {
        if let Some(tx) = &self.sim_tx {
            let _ = tx.send(input);
        }
    }

    /// Returns false when the window should close.
    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Poll keyboard and mouse, forward simulator input, and report requests
    /// for the app.
    pub fn poll_input(&mut self) -> Option<UiRequest> {
        if !self.window.is_open() { return Some(UiRequest::Quit); }

        let one_shot = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);

        if one_shot(Key::Q) || one_shot(Key::Escape) {
            return Some(UiRequest::Quit);
        }
        let toggle_tracking = one_shot(Key::T);
        let toggle_hand     = one_shot(Key::H);

        const SHAPE_KEYS: [Key; 6] = [Key::Key1, Key::Key2, Key::Key3, Key::Key4, Key::Key5, Key::Key6];
        let picked = SHAPE_KEYS.iter()
            .zip(HandShape::ALL.iter())
            .find(|(k, _)| self.window.is_key_pressed(**k, KeyRepeat::No))
            .map(|(_, s)| *s);
        if let Some(shape) = picked {
            self.shape = shape;
            self.send(SimInput::Shape(shape));
        }

        if toggle_hand {
            self.visible = !self.visible;
            self.send(SimInput::Visible(self.visible));
        }

        // Space closes the hand for as long as it is held.
        let squeeze = self.window.is_key_down(Key::Space);
        if squeeze != self.squeeze {
            self.squeeze = squeeze;
            self.send(SimInput::Squeeze(squeeze));
        }

        if let Some((mx, my)) = self.window.get_mouse_pos(MouseMode::Discard) {
            if let Some(raw) = panel_to_raw(mx, my) {
                if self.pointer != Some(raw) {
                    self.pointer = Some(raw);
                    self.send(SimInput::MoveTo(raw));
                }
            }
        }

        if toggle_tracking { Some(UiRequest::ToggleTracking) } else { None }
    }

    /// Render one frame.
    pub fn render(&mut self, scene: &Scene) {
        // Clear
        self.buf.fill(BG_COLOR);

        self.draw_camera_panel(scene);
        self.draw_side_panel(scene);

        // ── Feedback banner ───────────────────────────────────────────────
        if let Some(g) = scene.feedback {
            let label = g.label();
            let w = label.len() * 8 + 24;
            let x = CAM_X + (CAM_W.saturating_sub(w)) / 2;
            self.fill_rect(x, CAM_Y + 12, w, 26, blend(CAM_BG, BANNER_COLOR, 0.25));
            self.draw_border(x, CAM_Y + 12, w, 26, BANNER_COLOR);
            self.draw_label_scaled(label, x + 12, CAM_Y + 20, BANNER_COLOR, 2);
        }

        // ── Status bar ────────────────────────────────────────────────────
        self.fill_rect(0, STATUS_Y, SIDE_X, WIN_H - STATUS_Y, TEXT_BG);
        self.draw_label(scene.status, 10, STATUS_Y + 8, 0xFFEEEEEE);

        // ── Key legend ────────────────────────────────────────────────────
        self.draw_label(
            "mouse=move  1-6=shape  space=fist  h=hide hand  t=start/stop  q=quit",
            10, WIN_H - 14, 0xFF888888,
        );

        self.window.update_with_buffer(&self.buf, WIN_W, WIN_H).ok();
    }

    // ── Camera panel ──────────────────────────────────────────────────────

    fn draw_camera_panel(&mut self, scene: &Scene) {
        self.fill_rect(CAM_X, CAM_Y, CAM_W, CAM_H, CAM_BG);
        self.draw_label("CAMERA (MIRRORED)", CAM_X, CAM_Y - 12, 0xFFAADDFF);

        for &(zone, ..) in ZONES.iter() {
            let active = scene.readout.zone == Some(zone);
            self.draw_zone(zone, active);
        }

        if let Some(pose) = scene.pose {
            self.draw_skeleton(pose);
        }

        if let Some(pos) = scene.readout.position {
            let (cx, cy) = raw_to_panel(pos);
            let v = scene.readout.velocity;
            let tip = Point::new(pos.x + v.x * VELOCITY_SCALE, pos.y + v.y * VELOCITY_SCALE);
            let (vx, vy) = raw_to_panel(tip);
            self.draw_line(cx, cy, vx, vy, CURSOR_COLOR);
            if in_panel(cx, cy) {
                self.draw_diamond(cx as usize, cy as usize, 6, CURSOR_COLOR);
            }
        }

        self.draw_border(CAM_X, CAM_Y, CAM_W, CAM_H, 0xFF000000);
    }

    fn draw_zone(&mut self, zone: Zone, active: bool) {
        let (x, y, w, h) = zone.rect();
        let px = CAM_X + (x * CAM_W as f32) as usize;
        let py = CAM_Y + (y * CAM_H as f32) as usize;
        let pw = ((w * CAM_W as f32) as usize).max(2);
        let ph = ((h * CAM_H as f32) as usize).max(2);
        if active {
            self.fill_rect(px, py, pw, ph, blend(CAM_BG, ZONE_ACTIVE, 0.18));
            self.draw_border(px, py, pw, ph, ZONE_ACTIVE);
            self.draw_label(zone.as_str(), px + 4, py + 4, ZONE_ACTIVE);
        } else {
            self.draw_border(px, py, pw, ph, ZONE_COLOR);
            self.draw_label(zone.as_str(), px + 4, py + 4, ZONE_COLOR);
        }
    }

    fn draw_skeleton(&mut self, pose: &HandPose) {
        for &(a, b) in HAND_SKELETON.iter() {
            let (ax, ay) = raw_to_panel(pose.point(a));
            let (bx, by) = raw_to_panel(pose.point(b));
            self.draw_line(ax, ay, bx, by, BONE_COLOR);
        }
        for i in 0..pose.landmarks.len() {
            let (x, y) = raw_to_panel(pose.point(i));
            let color = if FINGERTIPS.contains(&i) { TIP_COLOR } else { JOINT_COLOR };
            if x >= 1 && y >= 1 {
                self.fill_rect(x as usize - 1, y as usize - 1, 3, 3, color);
            }
        }
    }

    // ── Side panel ────────────────────────────────────────────────────────

    fn draw_side_panel(&mut self, scene: &Scene) {
        self.fill_rect(SIDE_X, 0, SIDE_W, WIN_H, SIDE_BG);
        let x = SIDE_X + 12;
        let pb = scene.playback;

        self.draw_label("NOW PLAYING", x, 14, 0xFFFFD700);
        self.draw_label_scaled(scene.track.title, x, 30, 0xFFEEEEEE, 2);
        self.draw_label(scene.track.composer, x, 46, 0xFF999999);

        let play = if pb.is_playing() { "> PLAYING" } else { "|| PAUSED" };
        self.draw_label_scaled(play, x, 68, if pb.is_playing() { 0xFF66BB6A } else { 0xFFBBBBBB }, 2);

        // ── Volume ────────────────────────────────────────────────────────
        self.draw_label("VOLUME", x, 96, 0xFFAADDFF);
        let bar_w = SIDE_W - 24;
        self.fill_rect(x, 106, bar_w, 10, TEXT_BG);
        let fill = (pb.volume() * bar_w as f32) as usize;
        let vol_color = if pb.is_muted() { 0xFF777777 } else { 0xFF4FC3F7 };
        self.fill_rect(x, 106, fill, 10, vol_color);
        self.draw_border(x, 106, bar_w, 10, 0xFF000000);
        let vol = format!("{}", (pb.volume() * 100.0).round() as u32);
        self.draw_label(&vol, x + bar_w - 16, 96, 0xFFEEEEEE);
        if pb.is_muted() {
            self.draw_label("MUTED", x + 60, 96, 0xFFFF5252);
        }

        let like = if pb.is_liked() { "LIKED" } else { "not liked" };
        self.draw_label(like, x, 126, if pb.is_liked() { 0xFFFF80AB } else { 0xFF777777 });
        let track_no = format!("track {}/{}", pb.track() + 1, crate::player::PLAYLIST.len());
        self.draw_label(&track_no, x + 100, 126, 0xFF999999);

        self.draw_note_strip(scene, x, 146, bar_w);

        // ── Hand readout ──────────────────────────────────────────────────
        self.draw_label("HAND CONFIDENCE", x, 220, 0xFFAADDFF);
        self.fill_rect(x, 230, bar_w, 10, TEXT_BG);
        let conf = scene.readout.confidence as usize * bar_w / 100;
        self.fill_rect(x, 230, conf, 10, 0xFF66BB6A);
        self.draw_border(x, 230, bar_w, 10, 0xFF000000);

        let zone = scene.readout.zone.map_or("-", |z| z.as_str());
        self.draw_label(&format!("zone: {}", zone), x, 248, 0xFFEEEEEE);
        if let Some(p) = scene.readout.position {
            let m = p.mirrored();
            self.draw_label(&format!("x {:.2}  y {:.2}", m.x, m.y), x, 260, 0xFF999999);
        }

        // ── Tracking state ────────────────────────────────────────────────
        self.draw_label("TRACKING", x, 290, 0xFFAADDFF);
        let (text, color) = match scene.tracking {
            TrackingState::Stopped   => ("stopped - press t".to_string(), 0xFFBBBBBB),
            TrackingState::Loading   => (format!("loading {}...", scene.detector), 0xFFFFD700),
            TrackingState::Tracking  => (format!("tracking ({})", scene.detector), 0xFF66BB6A),
            TrackingState::Failed(m) => (m.clone(), 0xFFFF5252),
        };
        self.draw_wrapped(&text, x, 302, SIDE_W - 24, color);

        // ── Gesture legend ────────────────────────────────────────────────
        let mut y = 350;
        self.draw_label("GESTURES", x, y, 0xFFAADDFF);
        for g in GestureKind::ALL.iter() {
            y += 12;
            self.draw_label(g.as_str(), x, y, 0xFF999999);
            self.draw_label(g.label(), x + 100, y, 0xFFCCCCCC);
        }
    }

    fn draw_note_strip(&mut self, scene: &Scene, x: usize, y: usize, w: usize) {
        let notes = scene.track.notes;
        if notes.is_empty() { return; }
        let cell = (w / notes.len()).max(1);
        for (i, &(pitch, _)) in notes.iter().enumerate() {
            let h = (pitch.saturating_sub(48) as usize).min(40) + 8;
            let cx = x + i * cell;
            if cx + cell > x + w { break; }
            let lit = scene.last_note.map_or(false, |(idx, _)| idx == i);
            let color = if lit { 0xFFFFD700 } else { blend(SIDE_BG, 0xFF4FC3F7, 0.5) };
            self.fill_rect(cx, y + 56 - h, cell.saturating_sub(1).max(1), h, color);
        }
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y+h).min(WIN_H) {
            for col in x..(x+w).min(WIN_W) {
                self.buf[row * WIN_W + col] = color;
            }
        }
    }

    fn draw_border(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        if w == 0 || h == 0 { return; }
        for col in x..(x+w).min(WIN_W) {
            if y < WIN_H           { self.buf[y           * WIN_W + col] = color; }
            if y+h-1 < WIN_H       { self.buf[(y+h-1)     * WIN_W + col] = color; }
        }
        for row in y..(y+h).min(WIN_H) {
            if x < WIN_W           { self.buf[row * WIN_W + x    ] = color; }
            if x+w-1 < WIN_W       { self.buf[row * WIN_W + x+w-1] = color; }
        }
    }

    fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < WIN_W && y < WIN_H {
            self.buf[y * WIN_W + x] = color;
        }
    }

    /// Bresenham line, clipped to the camera panel.
    fn draw_line(&mut self, x0: isize, y0: isize, x1: isize, y1: isize, color: u32) {
        let (dx, dy) = ((x1 - x0).abs(), -(y1 - y0).abs());
        let (sx, sy) = (if x0 < x1 { 1 } else { -1 }, if y0 < y1 { 1 } else { -1 });
        let (mut x, mut y, mut err) = (x0, y0, dx + dy);
        loop {
            if in_panel(x, y) {
                self.set_pixel(x as usize, y as usize, color);
            }
            if x == x1 && y == y1 { break; }
            let e2 = 2 * err;
            if e2 >= dy { err += dy; x += sx; }
            if e2 <= dx { err += dx; y += sy; }
        }
    }

    fn draw_diamond(&mut self, cx: usize, cy: usize, r: usize, color: u32) {
        for dy in 0..=r as isize {
            let dx = r as isize - dy;
            for &(sx, sy) in &[
                (cx as isize + dx, cy as isize + dy),
                (cx as isize - dx, cy as isize + dy),
                (cx as isize + dx, cy as isize - dy),
                (cx as isize - dx, cy as isize - dy),
            ] {
                if sx >= 0 && sy >= 0 {
                    self.set_pixel(sx as usize, sy as usize, color);
                }
            }
        }
    }

    /// Minimal bitmap font — 3×5 characters for label rendering.
    /// Each character is encoded as 5 rows × 3 bits.
    fn draw_label(&mut self, text: &str, x: usize, y: usize, color: u32) {
        self.draw_label_scaled(text, x, y, color, 1);
    }

    fn draw_label_scaled(&mut self, text: &str, x: usize, y: usize, color: u32, scale: usize) {
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        self.fill_rect(cx + col * scale, y + row * scale, scale, scale, color);
                    }
                }
            }
            cx += 4 * scale; // 3 wide + 1 gap
            if cx + 4 * scale > WIN_W { break; }
        }
    }

    /// Break `text` on spaces to fit `width` pixels.
    fn draw_wrapped(&mut self, text: &str, x: usize, y: usize, width: usize, color: u32) {
        let per_line = (width / 4).max(1);
        let mut line = String::new();
        let mut ly = y;
        for word in text.split_whitespace() {
            if !line.is_empty() && line.len() + 1 + word.len() > per_line {
                self.draw_label(&line, x, ly, color);
                line.clear();
                ly += 8;
            }
            if !line.is_empty() { line.push(' '); }
            line.push_str(word);
        }
        if !line.is_empty() {
            self.draw_label(&line, x, ly, color);
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Coordinate mapping
// ────────────────────────────────────────────────────────────────────────────

/// Raw camera-space point → pixel in the mirrored camera panel.
fn raw_to_panel(raw: Point) -> (isize, isize) {
    let d = raw.mirrored();
    (
        CAM_X as isize + (d.x * CAM_W as f32).round() as isize,
        CAM_Y as isize + (d.y * CAM_H as f32).round() as isize,
    )
}

/// Mouse position → raw camera-space point, if inside the camera panel.
fn panel_to_raw(mx: f32, my: f32) -> Option<Point> {
    let dx = (mx - CAM_X as f32) / CAM_W as f32;
    let dy = (my - CAM_Y as f32) / CAM_H as f32;
    if !(0.0..=1.0).contains(&dx) || !(0.0..=1.0).contains(&dy) {
        return None;
    }
    Some(Point::new(dx, dy).mirrored())
}

fn in_panel(x: isize, y: isize) -> bool {
    x >= CAM_X as isize && x < (CAM_X + CAM_W) as isize
        && y >= CAM_Y as isize && y < (CAM_Y + CAM_H) as isize
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '>' => [0b100, 0b010, 0b001, 0b010, 0b100],
        '|' => [0b010, 0b010, 0b010, 0b010, 0b010],
        '(' => [0b001, 0b010, 0b010, 0b010, 0b001],
        ')' => [0b100, 0b010, 0b010, 0b010, 0b100],
        '\'' => [0b010, 0b010, 0b000, 0b000, 0b000],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

/// Alpha-blend two ARGB colors. `t` = 0.0 → all `a`, `t` = 1.0 → all `b`.
fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |ca: u32, cb: u32| (ca as f32 * (1.0-t) + cb as f32 * t) as u32;
    let ar = (a >> 16) & 0xFF; let br = (b >> 16) & 0xFF;
    let ag = (a >>  8) & 0xFF; let bg = (b >>  8) & 0xFF;
    let ab =  a        & 0xFF; let bb =  b        & 0xFF;
    0xFF000000 | (lerp(ar,br) << 16) | (lerp(ag,bg) << 8) | lerp(ab,bb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panel_is_mirrored() {
        // user's right (raw left) appears on the right of the panel
        let (x, _) = raw_to_panel(Point::new(0.1, 0.5));
        assert!(x > (CAM_X + CAM_W / 2) as isize);
    }

    #[test]
    fn mouse_maps_back_to_raw() {
        let raw = Point::new(0.3, 0.7);
        let (px, py) = raw_to_panel(raw);
        let back = panel_to_raw(px as f32, py as f32).unwrap();
        assert!(back.distance(raw) < 0.01);
        assert_eq!(panel_to_raw(0.0, 0.0), None);
        assert_eq!(panel_to_raw((WIN_W - 1) as f32, 100.0), None);
    }

    #[test]
    fn blend_endpoints() {
        assert_eq!(blend(0xFF000000, 0xFFFFFFFF, 0.0), 0xFF000000);
        assert_eq!(blend(0xFF000000, 0xFFFFFFFF, 1.0), 0xFFFFFFFF);
        assert_eq!(blend(0xFF000000, 0xFF0000FF, 2.0), 0xFF0000FF);
    }

    #[test]
    fn every_label_char_has_a_glyph() {
        let fallback = char_glyph('~');
        for g in GestureKind::ALL.iter() {
            for ch in g.label().chars().chain(g.as_str().chars()).filter(|c| *c != ' ' && *c != '.') {
                assert_ne!(char_glyph(ch), fallback, "missing glyph {:?}", ch);
            }
        }
    }
}
