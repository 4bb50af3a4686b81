//! Host-facing bridge surface.
//!
//! The host runtime talks JSON: it reads a constants table once, then calls
//! `capture` with a raw option map and gets back a promise that resolves to a
//! serialized [`CaptureResult`] or rejects with a message string.
//!
//! ```text
//! { "type": 2, "quality": "high", "target": 3, "title": "…" }
//!        │  RawCaptureOptions (serde)
//!        ▼
//!  CaptureOptions ──► CameraSession::capture ──► CapturePromise
//!                                                      │ settle()
//!                                                      ▼
//!                             Ok({"width","height","uri"|"data"}) / Err("No camera found.")
//! ```
//!
//! Option maps may carry keys this bridge does not use (`mode`, `orientation`,
//! …); they are ignored.

use crate::capture::{CameraSession, CaptureError, CapturePromise};
use crate::imaging::ImageBackend;
use crate::types::{CameraType, CaptureOptions, CaptureQuality, CaptureResult, CaptureTarget};
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

/// Name the module registers under with the host.
pub const MODULE_NAME: &str = "CaptureBridgeModule";

/// Host constant table.
pub fn constants() -> Value {
    json!({
        "Aspect": { "fill": 0, "fit": 1, "stretch": 2 },
        "Type": {
            "front": CameraType::Front.code(),
            "back": CameraType::Back.code()
        },
        "CaptureQuality": {
            "low": CaptureQuality::Low.as_str(),
            "medium": CaptureQuality::Medium.as_str(),
            "high": CaptureQuality::High.as_str()
        },
        "CaptureMode": { "still": 0, "video": 1 },
        "CaptureTarget": {
            "memory": CaptureTarget::Memory.code(),
            "disk": CaptureTarget::Disk.code(),
            "cameraRoll": CaptureTarget::CameraRoll.code(),
            "temp": CaptureTarget::Temp.code()
        },
        "Orientation": {
            "auto": 0,
            "landscapeLeft": 1,
            "landscapeRight": 2,
            "portrait": 3,
            "portraitUpsideDown": 4
        },
        "FlashMode": { "off": 0, "on": 1, "auto": 2 },
        "TorchMode": { "off": 0, "on": 1, "auto": 2 }
    })
}

/// Option map as the host sends it.
#[derive(Debug, Deserialize)]
pub struct RawCaptureOptions {
    #[serde(rename = "type")]
    pub camera_type: i64,
    pub quality: String,
    pub target: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl TryFrom<RawCaptureOptions> for CaptureOptions {
    type Error = CaptureError;

    fn try_from(raw: RawCaptureOptions) -> Result<Self, Self::Error> {
        let camera_type = CameraType::from_code(raw.camera_type).ok_or_else(|| {
            CaptureError::InvalidOptions(format!("unknown camera type {}", raw.camera_type))
        })?;
        let quality = CaptureQuality::parse(&raw.quality).ok_or_else(|| {
            CaptureError::InvalidOptions(format!("unknown capture quality '{}'", raw.quality))
        })?;
        let target = CaptureTarget::from_code(raw.target).ok_or_else(|| {
            CaptureError::InvalidOptions(format!("unknown capture target {}", raw.target))
        })?;
        Ok(CaptureOptions {
            camera_type,
            quality,
            target,
            title: raw.title,
            description: raw.description,
        })
    }
}

/// Decode a host option map.
pub fn parse_options(options: &Value) -> Result<CaptureOptions, CaptureError> {
    let raw = RawCaptureOptions::deserialize(options)
        .map_err(|e| CaptureError::InvalidOptions(e.to_string()))?;
    CaptureOptions::try_from(raw)
}

/// Promise handed back to the host.
pub struct BridgePromise {
    inner: CapturePromise,
}

impl BridgePromise {
    /// Block until settled: the serialized result, or the rejection message.
    pub fn settle(self) -> Result<Value, String> {
        to_host(self.inner.wait())
    }

    /// Like [`settle`](Self::settle) with an upper bound; `None` while pending.
    pub fn settle_timeout(&self, timeout: Duration) -> Option<Result<Value, String>> {
        self.inner.wait_timeout(timeout).map(to_host)
    }
}

fn to_host(outcome: Result<CaptureResult, CaptureError>) -> Result<Value, String> {
    let result = outcome.map_err(|e| e.to_string())?;
    serde_json::to_value(&result).map_err(|e| e.to_string())
}

/// The bridge module instance a host registers.
pub struct CameraModule<B> {
    session: CameraSession<B>,
}

impl<B: ImageBackend + Send + 'static> CameraModule<B> {
    pub fn new(session: CameraSession<B>) -> Self {
        Self { session }
    }

    pub fn name(&self) -> &'static str {
        MODULE_NAME
    }

    pub fn constants(&self) -> Value {
        constants()
    }

    pub fn session(&self) -> &CameraSession<B> {
        &self.session
    }

    pub fn capture(&self, options: &Value) -> BridgePromise {
        let inner = match parse_options(options) {
            Ok(options) => self.session.capture(options),
            Err(e) => {
                debug!(error = %e, "Rejecting malformed capture options");
                CapturePromise::rejected(e)
            }
        };
        BridgePromise { inner }
    }

    /// Video recording is not supported; accepted and ignored.
    pub fn stop_capture(&self, _options: &Value) {}
}
