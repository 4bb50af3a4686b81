//! Preview stop/resume on the UI-affinity queue.
//!
//! Camera preview must be driven from one thread (the host's UI thread). The
//! session expresses that through [`PreviewPort`], which carries exactly two
//! messages: stop now, and start after a delay.
//!
//! [`UiQueue`] is the in-tree port: a single thread that runs messages in
//! deadline order, breaking ties by post order. A stop posted before a
//! delayed start for the same capture therefore always runs first.
//!
//! The start message can carry a [`CaptureGuard`]. The guard is released only
//! after the preview has been resumed, which is what keeps the next capture
//! out until the device is usable again.

use super::device::CameraDevice;
use std::cmp::Ordering as CmpOrdering;
use std::collections::BinaryHeap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Holds the session's capture-in-flight flag; clears it on drop.
#[derive(Debug)]
pub struct CaptureGuard {
    flag: Arc<AtomicBool>,
}

impl CaptureGuard {
    /// Set the flag if it is clear. `None` if a capture is already in flight.
    pub fn try_acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self {
                flag: Arc::clone(flag),
            })
    }
}

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Port to whatever thread owns the camera preview.
pub trait PreviewPort: Send + Sync {
    /// Stop the preview as soon as possible.
    fn stop_preview(&self, device: Arc<dyn CameraDevice>);

    /// Resume the preview after `delay`, then release `guard`.
    fn start_preview_after(
        &self,
        device: Arc<dyn CameraDevice>,
        delay: Duration,
        guard: Option<CaptureGuard>,
    );
}

enum PreviewMessage {
    Stop(Arc<dyn CameraDevice>),
    Start(Arc<dyn CameraDevice>, Option<CaptureGuard>),
}

struct Scheduled {
    due: Instant,
    seq: u64,
    message: PreviewMessage,
}

// BinaryHeap is a max-heap; earliest (due, seq) must come out first.
impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for Scheduled {}

/// Single-thread message queue standing in for the host UI thread.
///
/// Dropping the queue stops intake but still delivers every message already
/// posted, delayed ones included, before the thread exits.
pub struct UiQueue {
    sender: Option<mpsc::Sender<Scheduled>>,
    seq: AtomicU64,
    handle: Option<JoinHandle<()>>,
}

impl UiQueue {
    pub fn spawn() -> std::io::Result<Self> {
        let (tx, rx) = mpsc::channel();
        let handle = std::thread::Builder::new()
            .name("preview-ui".into())
            .spawn(move || run_queue(rx))?;
        Ok(Self {
            sender: Some(tx),
            seq: AtomicU64::new(0),
            handle: Some(handle),
        })
    }

    fn post(&self, message: PreviewMessage, delay: Duration) {
        let scheduled = Scheduled {
            due: Instant::now() + delay,
            seq: self.seq.fetch_add(1, Ordering::Relaxed),
            message,
        };
        let Some(sender) = &self.sender else {
            return;
        };
        if sender.send(scheduled).is_err() {
            // Only when the queue thread died; any guard is released with the message.
            warn!("Preview queue is gone, dropping preview message");
        }
    }
}

impl PreviewPort for UiQueue {
    fn stop_preview(&self, device: Arc<dyn CameraDevice>) {
        self.post(PreviewMessage::Stop(device), Duration::ZERO);
    }

    fn start_preview_after(
        &self,
        device: Arc<dyn CameraDevice>,
        delay: Duration,
        guard: Option<CaptureGuard>,
    ) {
        self.post(PreviewMessage::Start(device, guard), delay);
    }
}

impl Drop for UiQueue {
    fn drop(&mut self) {
        self.sender.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Preview queue thread panicked");
            }
        }
    }
}

fn run_queue(rx: mpsc::Receiver<Scheduled>) {
    let mut pending: BinaryHeap<Scheduled> = BinaryHeap::new();
    let mut open = true;

    loop {
        while pending.peek().is_some_and(|s| s.due <= Instant::now()) {
            if let Some(scheduled) = pending.pop() {
                deliver(scheduled.message);
            }
        }

        if !open && pending.is_empty() {
            break;
        }

        let next_due = pending.peek().map(|s| s.due);
        let received = match (next_due, open) {
            (Some(due), true) => rx.recv_timeout(due.saturating_duration_since(Instant::now())),
            (None, true) => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
            (Some(due), false) => {
                std::thread::sleep(due.saturating_duration_since(Instant::now()));
                continue;
            }
            (None, false) => break,
        };

        match received {
            Ok(scheduled) => pending.push(scheduled),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => open = false,
        }
    }
    debug!("Preview queue drained");
}

fn deliver(message: PreviewMessage) {
    match message {
        PreviewMessage::Stop(device) => {
            if let Err(e) = device.stop_preview() {
                warn!(error = %e, "Failed to stop preview");
            }
        }
        PreviewMessage::Start(device, guard) => {
            match catch_unwind(AssertUnwindSafe(|| device.start_preview())) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(error = %e, "Failed to resume preview"),
                Err(_) => warn!("Preview resume panicked"),
            }
            drop(guard);
        }
    }
}
