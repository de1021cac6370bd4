//! Shared data models for the Reelforge assembly engine.
//!
//! This crate provides Serde-serializable types for:
//! - Timed word tokens and transcripts
//! - Caption blocks and SRT timecodes
//! - Script parts with keyword tags and time windows
//! - Stock clip descriptors and trim plans
//! - Encoding configuration

pub mod caption;
pub mod clip;
pub mod encoding;
pub mod error;
pub mod script;
pub mod timecode;
pub mod transcript;

// Re-export common types
pub use caption::CaptionBlock;
pub use clip::{clip_id_from_url, ClipDescriptor, ClipPlan, ClipQuality};
pub use encoding::EncodingConfig;
pub use error::{ModelError, ModelResult};
pub use script::ScriptPart;
pub use timecode::format_timecode;
pub use transcript::{Transcript, WordToken};
