//! # Capture Bridge
//!
//! Camera capture routing behind a host bridge adapter. A host runtime asks
//! for a still with a JSON option map; the bridge triggers the device, routes
//! the encoded JPEG to its destination, and answers with a promise that
//! resolves to `{width, height, data | uri}` or rejects with a message.
//!
//! # Architecture
//!
//! ```text
//! host JSON ─► bridge ─► CameraSession ─► CameraDevice.take_picture
//!                              │                    │ callback thread
//!                              │                    ▼
//!                              │            capture-worker thread
//!                              │              ├─ PreviewPort: stop
//!                              │              ├─ Router: memory | disk | camera roll | temp
//!                              │              │                               └─ imaging::resize_image
//!                              │              └─ PreviewPort: start after 300 ms
//!                              ▼
//!                        CapturePromise ─► host
//! ```
//!
//! Nothing in the pipeline is global: a [`capture::CameraSession`] is an
//! explicit handle that owns its router, preview port and in-flight flag.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`bridge`] | Host-facing adapter: constants table, raw option decoding, promise settling |
//! | [`capture`] | Device seam, preview timing, router, and the capture session |
//! | [`imaging`] | Pure-Rust imaging: EXIF orientation, scale + rotate, JPEG encode |
//! | [`config`] | `capture-bridge.toml` loading, merging onto stock defaults, validation |
//! | [`naming`] | `IMG_yyyyMMdd_HHmmss` file naming and atomic temp allocation |
//! | [`types`] | Shared value types: options, results, picture sizes |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Preview Resume Is Unconditional
//!
//! Every capture that reaches the worker posts exactly one delayed preview
//! resume, whether routing succeeded, failed, or panicked.
//!
//! ## One Capture at a Time
//!
//! The session refuses a second capture until the first one's preview resume
//! has actually run. The guard rides on the resume message itself, so there is
//! no window where the device is triggered while its preview is still stopped.
//!
//! ## Degenerate and Oversized Scales Are Rejected
//!
//! A resize bound that would collapse an axis below `min_output_edge` pixels
//! fails with a `DegenerateScale` error instead of producing an empty or
//! single-pixel file. One that would grow an axis past `max_output_edge`
//! fails with `OversizedScale` before anything is resampled.
//!
//! ## Pure-Rust Imaging
//!
//! Decode, resample and encode use the `image` crate; EXIF orientation is
//! read by a small in-tree parser. No system libraries are needed.

pub mod bridge;
pub mod capture;
pub mod config;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
