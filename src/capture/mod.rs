//! Capture pipeline: device seam, preview timing, routing and the session.
//!
//! - **Device**: [`CameraDevice`] / [`CameraProvider`] traits + [`ReplayCamera`]
//! - **Preview**: [`PreviewPort`] trait + [`UiQueue`], and the in-flight [`CaptureGuard`]
//! - **Media library**: [`MediaLibrary`] trait + [`DirectoryMediaLibrary`]
//! - **Router**: per-target destinations and the capture error types
//! - **Session**: [`CameraSession::capture`] tying it all together

pub mod device;
pub mod media_library;
pub mod preview;
pub mod router;
pub mod session;

pub use device::{
    CameraDevice, CameraProvider, DeviceError, PictureCallback, ReplayCamera, StaticProvider,
};
pub use media_library::{DirectoryMediaLibrary, MediaLibrary, MediaStoreError};
pub use preview::{CaptureGuard, PreviewPort, UiQueue};
pub use router::{CaptureError, FileError, Router};
pub use session::{CameraSession, CapturePromise, DEFAULT_SETTLE_DELAY};
