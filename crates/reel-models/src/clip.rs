//! Stock clip descriptors and trim plans.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Quality tier of a candidate clip, as reported by the footage provider.
///
/// Ordering is the fixed selection preference: high beats full-HD beats
/// medium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClipQuality {
    Medium,
    #[serde(rename = "fullHD", alias = "hd")]
    FullHd,
    High,
}

impl std::fmt::Display for ClipQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::FullHd => write!(f, "fullHD"),
            Self::Medium => write!(f, "medium"),
        }
    }
}

/// Metadata for one candidate stock-footage clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipDescriptor {
    /// The search keyword that produced this candidate.
    pub keyword: String,
    /// Direct download URL for the clip file.
    pub url: String,
    /// Duration of the source clip in seconds, per the provider.
    pub native_duration: f64,
    pub quality: ClipQuality,
}

impl ClipDescriptor {
    pub fn new(
        keyword: impl Into<String>,
        url: impl Into<String>,
        native_duration: f64,
        quality: ClipQuality,
    ) -> ModelResult<Self> {
        if native_duration <= 0.0 {
            return Err(ModelError::NonPositiveDuration(native_duration));
        }
        Ok(Self {
            keyword: keyword.into(),
            url: url.into(),
            native_duration,
            quality,
        })
    }

    /// Provider-independent clip identifier, used for cross-provider dedup.
    pub fn clip_id(&self) -> String {
        clip_id_from_url(&self.url)
    }
}

/// The trim window computed for one clip within a part's duration budget.
///
/// `trim_start` is always 0; there is no mid-clip offset logic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipPlan {
    pub descriptor: ClipDescriptor,
    pub trim_start: f64,
    pub trim_end: f64,
}

impl ClipPlan {
    pub fn new(descriptor: ClipDescriptor, trim_end: f64) -> ModelResult<Self> {
        if trim_end > descriptor.native_duration {
            return Err(ModelError::TrimBeyondSource {
                trim_end,
                native_duration: descriptor.native_duration,
            });
        }
        Ok(Self {
            descriptor,
            trim_start: 0.0,
            trim_end,
        })
    }

    /// Planned footage length in seconds.
    pub fn planned_duration(&self) -> f64 {
        self.trim_end - self.trim_start
    }
}

/// Derive a clip identifier from the trailing path segment of a clip URL,
/// stripping any container extension suffix.
///
/// `https://cdn.example.com/videos/12345.mp4?dl=1` -> `12345`.
pub fn clip_id_from_url(url: &str) -> String {
    let tail = url
        .split(['?', '#'])
        .next()
        .unwrap_or(url)
        .rsplit('/')
        .next()
        .unwrap_or(url);
    match tail.rsplit_once('.') {
        Some((stem, ext)) if matches!(ext, "mp4" | "mov" | "webm" | "mkv" | "avi") => {
            stem.to_string()
        }
        _ => tail.to_string(),
    }
}
