//! Camera session: one capture call from options to promise.
//!
//! ```text
//! capture(options)
//!   ├─ in-flight guard (else Busy)
//!   ├─ provider.acquire(type)        (else NoCamera)
//!   ├─ device.set_capture_quality
//!   └─ device.take_picture ──► callback thread
//!                                └─ spawn "capture-worker"
//!                                     ├─ preview: stop
//!                                     ├─ router.route(bytes)
//!                                     ├─ preview: start after settle delay (+ guard)
//!                                     └─ settle promise
//! ```
//!
//! The resume is posted on every path through the worker, including a
//! panicking route. The in-flight guard travels with the resume message, so
//! the session accepts the next capture only once the preview is back.

use super::device::{CameraDevice, CameraProvider, DeviceError, PictureCallback};
use super::preview::{CaptureGuard, PreviewPort};
use super::router::{CaptureError, Router};
use crate::imaging::ImageBackend;
use crate::types::{CaptureOptions, CaptureResult};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Default pause between routing and preview resume.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(300);

type Outcome = Result<CaptureResult, CaptureError>;

/// Pending result of one capture.
pub struct CapturePromise {
    rx: mpsc::Receiver<Outcome>,
}

impl CapturePromise {
    /// A promise that is already rejected.
    pub fn rejected(err: CaptureError) -> Self {
        let (tx, rx) = mpsc::channel();
        let _ = tx.send(Err(err));
        Self { rx }
    }

    /// Block until the capture settles.
    ///
    /// A capture whose worker vanished without answering settles as
    /// [`CaptureError::Interrupted`].
    pub fn wait(self) -> Outcome {
        self.rx
            .recv()
            .unwrap_or_else(|_| Err(CaptureError::Interrupted))
    }

    /// Wait at most `timeout`. `None` means still pending; the capture keeps
    /// running either way.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Outcome> {
        match self.rx.recv_timeout(timeout) {
            Ok(outcome) => Some(outcome),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(Err(CaptureError::Interrupted)),
        }
    }
}

/// Explicit session handle: owns the router, the preview port and the
/// capture-in-flight flag.
pub struct CameraSession<B> {
    provider: Arc<dyn CameraProvider>,
    router: Arc<Router<B>>,
    preview: Arc<dyn PreviewPort>,
    settle_delay: Duration,
    in_flight: Arc<AtomicBool>,
}

impl<B: ImageBackend + Send + 'static> CameraSession<B> {
    pub fn new(
        provider: Arc<dyn CameraProvider>,
        router: Router<B>,
        preview: Arc<dyn PreviewPort>,
    ) -> Self {
        Self {
            provider,
            router: Arc::new(router),
            preview,
            settle_delay: DEFAULT_SETTLE_DELAY,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }

    pub fn router(&self) -> &Router<B> {
        &self.router
    }

    /// Whether a capture is between trigger and preview resume.
    pub fn is_capturing(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Start a capture. Never blocks on the device or on routing.
    pub fn capture(&self, options: CaptureOptions) -> CapturePromise {
        let Some(guard) = CaptureGuard::try_acquire(&self.in_flight) else {
            warn!("Capture requested while another is in flight");
            return CapturePromise::rejected(CaptureError::Busy);
        };

        let Some(device) = self.provider.acquire(options.camera_type) else {
            error!(camera = ?options.camera_type, "No camera for requested type");
            return CapturePromise::rejected(CaptureError::NoCamera);
        };
        device.set_capture_quality(options.quality);

        let (tx, rx) = mpsc::channel();
        let job = CaptureJob {
            device: Arc::clone(&device),
            router: Arc::clone(&self.router),
            preview: Arc::clone(&self.preview),
            settle_delay: self.settle_delay,
            options,
            guard,
            reply: tx.clone(),
        };
        let on_taken: PictureCallback = Box::new(move |bytes: Vec<u8>| job.spawn(bytes));

        // On error the callback (and the guard inside it) has been dropped.
        if let Err(e) = device.take_picture(on_taken) {
            error!(error = %e, "Camera refused to take picture");
            let _ = tx.send(Err(CaptureError::Device(e)));
        }
        CapturePromise { rx }
    }
}

/// Everything the worker needs, moved into the device callback.
struct CaptureJob<B> {
    device: Arc<dyn CameraDevice>,
    router: Arc<Router<B>>,
    preview: Arc<dyn PreviewPort>,
    settle_delay: Duration,
    options: CaptureOptions,
    guard: CaptureGuard,
    reply: mpsc::Sender<Outcome>,
}

impl<B: ImageBackend + Send + 'static> CaptureJob<B> {
    fn spawn(self, bytes: Vec<u8>) {
        let reply = self.reply.clone();
        let spawned = std::thread::Builder::new()
            .name("capture-worker".into())
            .spawn(move || self.run(bytes));
        if let Err(e) = spawned {
            error!(error = %e, "Failed to spawn capture worker");
            let _ = reply.send(Err(CaptureError::Device(DeviceError::Failed(format!(
                "failed to spawn capture worker: {e}"
            )))));
        }
    }

    fn run(self, bytes: Vec<u8>) {
        let CaptureJob {
            device,
            router,
            preview,
            settle_delay,
            options,
            guard,
            reply,
        } = self;

        preview.stop_preview(Arc::clone(&device));

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            let native_size = device.picture_size();
            router.route(&bytes, &options, native_size)
        }))
        .unwrap_or_else(|_| {
            error!("Capture routing panicked");
            Err(CaptureError::Interrupted)
        });
        drop(bytes);

        match &outcome {
            Ok(result) => info!(
                width = result.width,
                height = result.height,
                uri = result.uri.as_deref().unwrap_or("-"),
                "Capture complete"
            ),
            Err(e) => error!(error = %e, "Capture rejected"),
        }

        preview.start_preview_after(device, settle_delay, Some(guard));
        if reply.send(outcome).is_err() {
            debug!("Capture promise dropped before settling");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::device::{ReplayCamera, StaticProvider};
    use crate::capture::media_library::{MediaLibrary, MediaStoreError};
    use crate::imaging::backend::tests::MockBackend;
    use crate::imaging::{BackendError, Dimensions, EncodedImage, ResizeBounds, TransformParams};
    use crate::test_helpers::{PreviewEvent, RecordingPreview};
    use crate::types::{CameraType, CaptureQuality, CaptureTarget, PictureSize};
    use image::DynamicImage;
    use std::path::Path;
    use std::sync::Mutex;

    const WAIT: Duration = Duration::from_secs(10);

    struct NullLibrary;

    impl MediaLibrary for NullLibrary {
        fn insert_image(
            &self,
            _image: &DynamicImage,
            _title: Option<&str>,
            _description: Option<&str>,
        ) -> Result<String, MediaStoreError> {
            Ok("content://media/null".into())
        }
    }

    fn router<B: ImageBackend>(backend: B, root: &Path) -> Router<B> {
        Router::new(
            backend,
            Box::new(NullLibrary),
            root.join("album"),
            root.join("cache"),
            ResizeBounds::new(800, 800),
        )
    }

    fn replay(size: (u32, u32)) -> Arc<ReplayCamera> {
        Arc::new(ReplayCamera::new(
            vec![0xFF, 0xD8, 0xFF, 0xD9],
            PictureSize::new(size.0, size.1),
        ))
    }

    fn provider(camera: &Arc<ReplayCamera>) -> Arc<dyn CameraProvider> {
        Arc::new(StaticProvider::new().with_device(CameraType::Back, camera.clone()))
    }

    #[test]
    fn memory_capture_stops_then_resumes_preview() {
        let tmp = tempfile::TempDir::new().unwrap();
        let camera = replay((4, 3));
        let preview = RecordingPreview::new();
        let session = CameraSession::new(
            provider(&camera),
            router(MockBackend::new(), tmp.path()),
            preview.clone(),
        );

        let mut options = CaptureOptions::new(CaptureTarget::Memory);
        options.quality = CaptureQuality::Medium;
        let result = session.capture(options).wait().unwrap();

        assert_eq!(result.data.as_deref(), Some("/9j/2Q=="));
        assert_eq!(result.size(), PictureSize::new(4, 3));
        assert_eq!(
            preview.events(),
            [
                PreviewEvent::Stop,
                PreviewEvent::Start {
                    delay: DEFAULT_SETTLE_DELAY
                }
            ]
        );
        assert_eq!(camera.capture_quality(), Some(CaptureQuality::Medium));
        assert_eq!((camera.preview_stops(), camera.preview_starts()), (1, 1));
        assert!(!session.is_capturing());
    }

    #[test]
    fn failed_route_still_resumes_preview_once() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(tmp.path().join("album"), b"blocker").unwrap();
        let camera = replay((4, 3));
        let preview = RecordingPreview::new();
        let session = CameraSession::new(
            provider(&camera),
            router(MockBackend::new(), tmp.path()),
            preview.clone(),
        )
        .with_settle_delay(Duration::from_millis(5));

        let err = session
            .capture(CaptureOptions::new(CaptureTarget::Disk))
            .wait()
            .unwrap_err();

        assert_eq!(err.to_string(), "Error creating media file.");
        assert_eq!(preview.start_count(), 1);
        assert_eq!(
            preview.events().last(),
            Some(&PreviewEvent::Start {
                delay: Duration::from_millis(5)
            })
        );
    }

    #[test]
    fn missing_camera_rejects_without_touching_preview() {
        let tmp = tempfile::TempDir::new().unwrap();
        let camera = replay((4, 3));
        let preview = RecordingPreview::new();
        let session = CameraSession::new(
            provider(&camera),
            router(MockBackend::new(), tmp.path()),
            preview.clone(),
        );

        let mut options = CaptureOptions::new(CaptureTarget::Memory);
        options.camera_type = CameraType::Front;
        let err = session.capture(options).wait().unwrap_err();

        assert!(matches!(err, CaptureError::NoCamera));
        assert_eq!(err.to_string(), "No camera found.");
        assert!(preview.events().is_empty());
        assert!(!session.is_capturing());
    }

    /// Holds the shutter callback until released.
    struct HeldCamera {
        pending: Mutex<Option<PictureCallback>>,
    }

    impl HeldCamera {
        fn release(&self) {
            let callback = self.pending.lock().unwrap().take().unwrap();
            callback(vec![0xFF, 0xD8, 0xFF, 0xD9]);
        }
    }

    impl CameraDevice for HeldCamera {
        fn picture_size(&self) -> PictureSize {
            PictureSize::new(2, 2)
        }
        fn set_capture_quality(&self, _quality: CaptureQuality) {}
        fn take_picture(&self, on_taken: PictureCallback) -> Result<(), DeviceError> {
            *self.pending.lock().unwrap() = Some(on_taken);
            Ok(())
        }
        fn stop_preview(&self) -> Result<(), DeviceError> {
            Ok(())
        }
        fn start_preview(&self) -> Result<(), DeviceError> {
            Ok(())
        }
    }

    #[test]
    fn second_capture_while_in_flight_is_busy() {
        let tmp = tempfile::TempDir::new().unwrap();
        let camera = Arc::new(HeldCamera {
            pending: Mutex::new(None),
        });
        let provider: Arc<dyn CameraProvider> =
            Arc::new(StaticProvider::new().with_device(CameraType::Back, camera.clone()));
        let session = CameraSession::new(
            provider,
            router(MockBackend::new(), tmp.path()),
            RecordingPreview::new(),
        );

        let first = session.capture(CaptureOptions::new(CaptureTarget::Memory));
        assert!(session.is_capturing());

        let second = session.capture(CaptureOptions::new(CaptureTarget::Memory));
        let err = second.wait().unwrap_err();
        assert!(matches!(err, CaptureError::Busy));
        assert_eq!(err.to_string(), "Capture already in progress.");

        assert!(first.wait_timeout(Duration::from_millis(20)).is_none());
        camera.release();
        assert!(first.wait_timeout(WAIT).unwrap().is_ok());
        assert!(!session.is_capturing());
    }

    struct RefusingCamera;

    impl CameraDevice for RefusingCamera {
        fn picture_size(&self) -> PictureSize {
            PictureSize::new(1, 1)
        }
        fn set_capture_quality(&self, _quality: CaptureQuality) {}
        fn take_picture(&self, _on_taken: PictureCallback) -> Result<(), DeviceError> {
            Err(DeviceError::Busy("shutter in use".into()))
        }
        fn stop_preview(&self) -> Result<(), DeviceError> {
            Ok(())
        }
        fn start_preview(&self) -> Result<(), DeviceError> {
            Ok(())
        }
    }

    #[test]
    fn device_refusal_rejects_and_frees_session() {
        let tmp = tempfile::TempDir::new().unwrap();
        let provider: Arc<dyn CameraProvider> =
            Arc::new(StaticProvider::new().with_device(CameraType::Back, Arc::new(RefusingCamera)));
        let preview = RecordingPreview::new();
        let session = CameraSession::new(
            provider,
            router(MockBackend::new(), tmp.path()),
            preview.clone(),
        );

        let err = session
            .capture(CaptureOptions::new(CaptureTarget::Memory))
            .wait()
            .unwrap_err();

        assert!(matches!(err, CaptureError::Device(DeviceError::Busy(_))));
        assert!(!session.is_capturing());
        assert!(preview.events().is_empty());
    }

    /// Backend whose decode panics, to exercise the worker's unwind path.
    struct PanickingBackend;

    impl ImageBackend for PanickingBackend {
        fn identify(&self, _path: &Path) -> Result<Dimensions, BackendError> {
            unreachable!()
        }
        fn decode(&self, _bytes: &[u8]) -> Result<DynamicImage, BackendError> {
            panic!("decoder blew up")
        }
        fn read_orientation(&self, _path: &Path) -> Option<u16> {
            None
        }
        fn transform(&self, _params: &TransformParams) -> Result<EncodedImage, BackendError> {
            unreachable!()
        }
    }

    #[test]
    fn panicking_route_is_interrupted_and_resumes_preview() {
        let tmp = tempfile::TempDir::new().unwrap();
        let camera = replay((4, 3));
        let preview = RecordingPreview::new();
        let session = CameraSession::new(
            provider(&camera),
            router(PanickingBackend, tmp.path()),
            preview.clone(),
        );

        let err = session
            .capture(CaptureOptions::new(CaptureTarget::CameraRoll))
            .wait()
            .unwrap_err();

        assert!(matches!(err, CaptureError::Interrupted));
        assert_eq!(preview.start_count(), 1);
        assert_eq!(camera.preview_starts(), 1);
        assert!(!session.is_capturing());
    }

    #[test]
    fn rejected_promise_settles_immediately() {
        let promise = CapturePromise::rejected(CaptureError::NoCamera);
        assert!(matches!(
            promise.wait_timeout(Duration::ZERO),
            Some(Err(CaptureError::NoCamera))
        ));
    }

    #[test]
    fn router_is_reachable_from_session() {
        let tmp = tempfile::TempDir::new().unwrap();
        let camera = replay((1, 1));
        let session = CameraSession::new(
            provider(&camera),
            router(MockBackend::new(), tmp.path()),
            RecordingPreview::new(),
        );
        assert_eq!(session.router().temp_dir(), tmp.path().join("cache"));
    }
}
