//! Time-synchronized segmentation and assembly engine.
//!
//! Turns a narration script plus its recorded voice-over into a finished
//! video: captions are timed against spoken words, the script is
//! partitioned into keyword-tagged segments using a measured speaking rate,
//! stock footage is fetched per segment, and clips are trimmed and
//! concatenated so the picture track exactly tracks the audio track.

pub mod allocate;
pub mod assemble;
pub mod captions;
pub mod config;
pub mod error;
pub mod keywords;
pub mod partition;
pub mod pipeline;
pub mod search;
pub mod transcribe;

pub use allocate::allocate;
pub use assemble::Assembler;
pub use captions::{render_srt, segment_captions, write_srt};
pub use config::{EngineConfig, WindowPolicy};
pub use error::{EngineError, EngineResult};
pub use keywords::OpenAiKeywordGenerator;
pub use partition::{partition, split_sentences, KeywordGenerator};
pub use pipeline::{Pipeline, PipelineOutput};
pub use search::{search_keywords, FootageSearcher, PexelsSearcher, PixabaySearcher};
pub use transcribe::{JsonFileTranscriber, Transcriber};
