//! Landmark detection as an external producer.
//!
//! A [`HandDetector`] runs on its own thread.  Acquisition (camera, model) is
//! attempted there first and reported as [`FeedEvent::Ready`] or
//! [`FeedEvent::Failed`]; afterwards every analysed frame is offered to the
//! consumer through a single-slot channel.  A frame that finds the slot still
//! occupied is dropped, never queued.
//!
//! Stopping never waits on a detector that is stuck inside `open` or
//! `detect`: its [`Interrupter`] is fired first, and a thread that still has
//! not finished after a short grace period is detached.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TryRecvError, TrySendError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, info, trace, warn};

use crate::landmarks::HandPose;
use crate::Error;

// ════════════════════════════════════════════════════════════════════════════
// HandDetector trait
// ════════════════════════════════════════════════════════════════════════════

/// Unblocks a detector's `open`/`detect` from another thread.
pub type Interrupter = Arc<dyn Fn() + Send + Sync>;

/// How long `stop` waits for the detector thread before detaching it.
const STOP_GRACE: Duration = Duration::from_millis(500);

/// Anything that can turn frames into at most one hand pose each.
pub trait HandDetector: Send + 'static {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Acquire the capture device and model.  Errors here are acquisition
    /// failures and end the session.
    fn open(&mut self) -> crate::Result<()>;

    /// Block until the next frame has been analysed.  `Ok(None)` means no
    /// hand.  A transient `Err` is treated as no hand; an acquisition error
    /// (the capture device went away) ends the session.
    fn detect(&mut self) -> crate::Result<Option<HandPose>>;

    /// Release capture resources.
    fn close(&mut self) {}

    /// A handle that makes a blocked `open` or `detect` return promptly.
    /// Called from the consumer thread when the session stops.
    fn interrupter(&self) -> Option<Interrupter> { None }
}

/// One analysed frame.
#[derive(Clone, Debug)]
pub struct Detection {
    pub pose:        Option<HandPose>,
    pub captured_at: Instant,
}

/// Messages from the detector thread.
#[derive(Debug)]
pub enum FeedEvent {
    /// Acquisition succeeded; frames follow.
    Ready,
    Frame(Detection),
    /// Acquisition failed; the thread has exited.
    Failed(Error),
    /// The detector thread ended without being asked to.
    Closed,
}

// ════════════════════════════════════════════════════════════════════════════
// DetectionFeed
// ════════════════════════════════════════════════════════════════════════════

/// Consumer end of a running detector.  Dropping it stops the thread.
pub struct DetectionFeed {
    rx:        Receiver<FeedEvent>,
    running:   Arc<AtomicBool>,
    dropped:   Arc<AtomicU64>,
    interrupt: Option<Interrupter>,
    handle:    Option<JoinHandle<()>>,
}

/// Start `detector` on its own thread.
pub fn spawn_detection(mut detector: Box<dyn HandDetector>) -> DetectionFeed {
    let (tx, rx)  = mpsc::sync_channel(1);
    let running   = Arc::new(AtomicBool::new(true));
    let dropped   = Arc::new(AtomicU64::new(0));
    let (run, drops) = (Arc::clone(&running), Arc::clone(&dropped));
    let interrupt = detector.interrupter();

    let handle = thread::spawn(move || {
        let name = detector.name().to_string();
        if let Err(e) = detector.open() {
            let _ = tx.send(FeedEvent::Failed(e));
            return;
        }
        info!(detector = %name, "detector opened");
        if tx.send(FeedEvent::Ready).is_err() {
            detector.close();
            return;
        }
        pump_frames(detector.as_mut(), &tx, &run, &drops);
        detector.close();
        info!(detector = %name, "detector closed");
    });

    DetectionFeed { rx, running, dropped, interrupt, handle: Some(handle) }
}

fn pump_frames(
    detector: &mut dyn HandDetector,
    tx:       &SyncSender<FeedEvent>,
    running:  &AtomicBool,
    dropped:  &AtomicU64,
) {
    while running.load(Ordering::Relaxed) {
        let pose = match detector.detect() {
            Ok(p)  => p,
            Err(e) if e.is_acquisition() => {
                warn!(error = %e, "capture lost");
                let _ = tx.send(FeedEvent::Failed(e));
                break;
            }
            Err(e) => {
                debug!(error = %e, "frame detection failed; treating as no hand");
                None
            }
        };
        let frame = FeedEvent::Frame(Detection { pose, captured_at: Instant::now() });
        match tx.try_send(frame) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                let n = dropped.fetch_add(1, Ordering::Relaxed) + 1;
                trace!(dropped = n, "previous frame still pending, dropping");
            }
            Err(TrySendError::Disconnected(_)) => break,
        }
    }
}

impl DetectionFeed {
    /// Next pending event, without blocking.
    pub fn next_event(&self) -> Option<FeedEvent> {
        match self.rx.try_recv() {
            Ok(ev)                         => Some(ev),
            Err(TryRecvError::Empty)        => None,
            Err(TryRecvError::Disconnected) => Some(FeedEvent::Closed),
        }
    }

    /// Wait up to `timeout` for the next event.
    pub fn next_event_timeout(&self, timeout: Duration) -> Option<FeedEvent> {
        match self.rx.recv_timeout(timeout) {
            Ok(ev)                             => Some(ev),
            Err(RecvTimeoutError::Timeout)      => None,
            Err(RecvTimeoutError::Disconnected) => Some(FeedEvent::Closed),
        }
    }

    /// Frames discarded because the consumer had not taken the previous one.
    pub fn dropped(&self) -> u64 { self.dropped.load(Ordering::Relaxed) }

    /// Stop the thread and wait (briefly) for it to release the detector.
    /// Returns within [`STOP_GRACE`] even if the detector ignores the
    /// interrupt; such a thread is left to finish on its own.
    pub fn stop(&mut self) {
        let handle = match self.handle.take() {
            Some(h) => h,
            None    => return,
        };
        self.running.store(false, Ordering::Relaxed);
        if let Some(interrupt) = &self.interrupt {
            interrupt();
        }

        let deadline = Instant::now() + STOP_GRACE;
        while !handle.is_finished() {
            // Free the slot so a blocked send can complete.
            while self.rx.try_recv().is_ok() {}
            if Instant::now() >= deadline {
                warn!("detector thread still busy, detaching it");
                return;
            }
            thread::sleep(Duration::from_millis(2));
        }
        let _ = handle.join();
    }
}

impl Drop for DetectionFeed {
    fn drop(&mut self) { self.stop(); }
}
