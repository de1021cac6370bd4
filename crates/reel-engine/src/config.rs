//! Engine configuration.
//!
//! All components receive explicit configuration at construction; there is
//! no process-global state. Provider keys, directories and tuning knobs all
//! live here so parallel runs cannot interfere with each other.

use std::path::PathBuf;

use reel_models::EncodingConfig;

/// How part time windows are assigned after sentence packing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowPolicy {
    /// Walk the transcript cursor word-by-word; windows come from actual
    /// token timing, with each part's end extended by the last token's gap.
    /// Robust to speaking-rate drift.
    #[default]
    TranscriptAnchored,
    /// Project each part's duration as `word_count / rate` and chain
    /// windows from zero. Purely arithmetic; can drift from the transcript
    /// tail.
    RateProjected,
}

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Directory for the scoped working area (per-run tempdirs live under it)
    pub work_dir: PathBuf,
    /// Directory for the final video
    pub output_dir: PathBuf,
    /// Pexels API key
    pub pexels_api_key: Option<String>,
    /// Pixabay API key
    pub pixabay_api_key: Option<String>,
    /// OpenAI API key for keyword generation
    pub openai_api_key: Option<String>,
    /// Target seconds of narration per script part
    pub seconds_per_part: f64,
    /// Maximum words per caption block (None = gap-only segmentation)
    pub max_words_per_caption: Option<usize>,
    /// Gap in seconds that forces a caption block boundary
    pub max_caption_gap: f64,
    /// Time-window assignment policy for script parts
    pub window_policy: WindowPolicy,
    /// Abort assembly on any clip failure instead of skipping the clip
    pub strict_acquisition: bool,
    /// Abort the run on keyword-generation or footage-search failures
    /// instead of absorbing them per part/keyword
    pub strict_external: bool,
    /// Maximum concurrent clip downloads/transcodes
    pub max_clip_parallel: usize,
    /// Per-FFmpeg-invocation timeout in seconds
    pub ffmpeg_timeout_secs: u64,
    /// Filler clip color used when video runs shorter than audio
    pub filler_color: String,
    /// Encoding settings for all renders
    pub encoding: EncodingConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("/tmp/reelforge"),
            output_dir: PathBuf::from("final_video"),
            pexels_api_key: None,
            pixabay_api_key: None,
            openai_api_key: None,
            seconds_per_part: 10.0,
            max_words_per_caption: Some(4),
            max_caption_gap: 0.5,
            window_policy: WindowPolicy::TranscriptAnchored,
            strict_acquisition: true,
            strict_external: false,
            max_clip_parallel: 4,
            ffmpeg_timeout_secs: 600,
            filler_color: "black".to_string(),
            encoding: EncodingConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Create config from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            work_dir: std::env::var("REEL_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.work_dir),
            output_dir: std::env::var("REEL_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            pexels_api_key: std::env::var("PEXELS_API_KEY").ok(),
            pixabay_api_key: std::env::var("PIXABAY_API_KEY").ok(),
            openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
            seconds_per_part: std::env::var("REEL_SECONDS_PER_PART")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.seconds_per_part),
            max_words_per_caption: match std::env::var("REEL_MAX_WORDS_PER_CAPTION") {
                Ok(s) if s.eq_ignore_ascii_case("none") => None,
                Ok(s) => s.parse().ok().or(defaults.max_words_per_caption),
                Err(_) => defaults.max_words_per_caption,
            },
            max_caption_gap: std::env::var("REEL_MAX_CAPTION_GAP")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_caption_gap),
            window_policy: match std::env::var("REEL_WINDOW_POLICY").as_deref() {
                Ok("rate-projected") => WindowPolicy::RateProjected,
                _ => WindowPolicy::TranscriptAnchored,
            },
            strict_acquisition: std::env::var("REEL_STRICT_ACQUISITION")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.strict_acquisition),
            strict_external: std::env::var("REEL_STRICT_EXTERNAL")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.strict_external),
            max_clip_parallel: std::env::var("REEL_MAX_CLIP_PARALLEL")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_clip_parallel),
            ffmpeg_timeout_secs: std::env::var("REEL_FFMPEG_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.ffmpeg_timeout_secs),
            filler_color: std::env::var("REEL_FILLER_COLOR").unwrap_or(defaults.filler_color),
            encoding: defaults.encoding,
        }
    }
}
