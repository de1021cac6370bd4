//! Encoding configuration for FFmpeg output.

use serde::{Deserialize, Serialize};

/// Video/audio encoding parameters applied to every intermediate and final
/// render.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodingConfig {
    /// Video codec (e.g. "libx264")
    pub codec: String,
    /// Encoder preset (e.g. "medium", "fast")
    pub preset: String,
    /// Constant rate factor (lower = higher quality)
    pub crf: u8,
    /// Audio codec (e.g. "aac")
    pub audio_codec: String,
    /// Audio bitrate (e.g. "128k")
    pub audio_bitrate: String,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            codec: "libx264".to_string(),
            preset: "medium".to_string(),
            crf: 23,
            audio_codec: "aac".to_string(),
            audio_bitrate: "128k".to_string(),
        }
    }
}
