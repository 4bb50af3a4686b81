//! Shared value types passed between the bridge, the session and the router.
//!
//! None of these carry host-framework types. The bridge converts raw option
//! maps into [`CaptureOptions`] and serializes [`CaptureResult`] back out;
//! everything in between works on these.

use serde::{Deserialize, Serialize};

/// Which physical camera to acquire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CameraType {
    Front,
    Back,
}

impl CameraType {
    /// Host constant for this camera (`Type.front` / `Type.back`).
    pub fn code(self) -> i64 {
        match self {
            CameraType::Front => 1,
            CameraType::Back => 2,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(CameraType::Front),
            2 => Some(CameraType::Back),
            _ => None,
        }
    }
}

/// Requested capture quality. The device maps this onto its own picture size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CaptureQuality {
    Low,
    Medium,
    High,
}

impl CaptureQuality {
    pub fn as_str(self) -> &'static str {
        match self {
            CaptureQuality::Low => "low",
            CaptureQuality::Medium => "medium",
            CaptureQuality::High => "high",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(CaptureQuality::Low),
            "medium" => Some(CaptureQuality::Medium),
            "high" => Some(CaptureQuality::High),
            _ => None,
        }
    }
}

/// Where a captured still ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CaptureTarget {
    /// Base64 in the response, nothing written.
    Memory,
    /// Timestamped JPEG under the public pictures directory.
    Disk,
    /// Inserted into the shared media library.
    CameraRoll,
    /// Temp file, then resized to the configured bounds.
    Temp,
}

impl CaptureTarget {
    pub fn code(self) -> i64 {
        match self {
            CaptureTarget::Memory => 0,
            CaptureTarget::Disk => 1,
            CaptureTarget::CameraRoll => 2,
            CaptureTarget::Temp => 3,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(CaptureTarget::Memory),
            1 => Some(CaptureTarget::Disk),
            2 => Some(CaptureTarget::CameraRoll),
            3 => Some(CaptureTarget::Temp),
            _ => None,
        }
    }
}

/// Input to a single capture call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureOptions {
    pub camera_type: CameraType,
    pub quality: CaptureQuality,
    pub target: CaptureTarget,
    /// Media library title (camera roll target only).
    pub title: Option<String>,
    /// Media library description (camera roll target only).
    pub description: Option<String>,
}

impl CaptureOptions {
    /// Back camera, high quality, no title or description.
    pub fn new(target: CaptureTarget) -> Self {
        Self {
            camera_type: CameraType::Back,
            quality: CaptureQuality::High,
            target,
            title: None,
            description: None,
        }
    }
}

/// Pixel dimensions of an encoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PictureSize {
    pub width: u32,
    pub height: u32,
}

impl PictureSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Response record for one successful capture.
///
/// Exactly one of `data` and `uri` is set. `width`/`height` describe the image
/// that was actually persisted (post-resize on the temp path).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureResult {
    pub width: u32,
    pub height: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

impl CaptureResult {
    pub fn with_data(size: PictureSize, data: String) -> Self {
        Self {
            width: size.width,
            height: size.height,
            data: Some(data),
            uri: None,
        }
    }

    pub fn with_uri(size: PictureSize, uri: String) -> Self {
        Self {
            width: size.width,
            height: size.height,
            data: None,
            uri: Some(uri),
        }
    }

    pub fn size(&self) -> PictureSize {
        PictureSize::new(self.width, self.height)
    }
}
