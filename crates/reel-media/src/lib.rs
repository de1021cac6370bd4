//! FFmpeg CLI wrapper and clip acquisition for Reelforge.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building with cancellation and timeouts
//! - FFprobe-based media inspection
//! - Streaming HTTP download of stock clips
//! - The concrete video operations the assembler needs: trim, concat with
//!   resize-to-first, solid-color filler, audio muxing, WAV conversion

pub mod command;
pub mod download;
pub mod error;
pub mod ops;
pub mod probe;

pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use download::{download_file, sanitize_filename};
pub use error::{MediaError, MediaResult};
pub use ops::{color_clip, concat_clips, convert_to_wav, mux_audio, trim_clip};
pub use probe::{media_duration, probe_video, VideoInfo};
