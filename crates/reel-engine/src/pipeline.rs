//! End-to-end pipeline: script + voice-over in, finished video out.

use std::path::{Path, PathBuf};

use tokio::sync::watch;
use tracing::{info, warn};

use reel_media::{convert_to_wav, FfmpegRunner};

use crate::allocate::allocate;
use crate::assemble::Assembler;
use crate::captions::{segment_captions, write_srt};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::keywords::OpenAiKeywordGenerator;
use crate::partition::{partition, KeywordGenerator};
use crate::search::{search_keywords, FootageSearcher, PexelsSearcher, PixabaySearcher};
use crate::transcribe::Transcriber;

/// Everything a finished run produces.
#[derive(Debug)]
pub struct PipelineOutput {
    pub video_path: PathBuf,
    pub subtitle_path: PathBuf,
    pub part_count: usize,
}

/// The narration-to-video pipeline.
///
/// External collaborators (speech-to-text, keyword generation, footage
/// search) are injected as capability traits so tests can substitute
/// deterministic fakes.
pub struct Pipeline {
    config: EngineConfig,
    transcriber: Box<dyn Transcriber>,
    keyword_generator: Box<dyn KeywordGenerator>,
    searchers: Vec<Box<dyn FootageSearcher>>,
    cancel_rx: Option<watch::Receiver<bool>>,
}

impl Pipeline {
    pub fn new(
        config: EngineConfig,
        transcriber: Box<dyn Transcriber>,
        keyword_generator: Box<dyn KeywordGenerator>,
        searchers: Vec<Box<dyn FootageSearcher>>,
    ) -> Self {
        Self {
            config,
            transcriber,
            keyword_generator,
            searchers,
            cancel_rx: None,
        }
    }

    /// Attach a cancellation signal. Raising it stops in-flight downloads
    /// and transcodes; the working area is still cleaned up.
    pub fn with_cancel(mut self, cancel_rx: watch::Receiver<bool>) -> Self {
        self.cancel_rx = Some(cancel_rx);
        self
    }

    fn cancelled(&self) -> bool {
        self.cancel_rx.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Wire up the production collaborators from config keys.
    pub fn from_config(config: EngineConfig, transcriber: Box<dyn Transcriber>) -> EngineResult<Self> {
        let keyword_generator: Box<dyn KeywordGenerator> = match &config.openai_api_key {
            Some(key) => Box::new(OpenAiKeywordGenerator::new(key)),
            None => {
                return Err(EngineError::external(
                    "openai",
                    "OPENAI_API_KEY not configured",
                ))
            }
        };

        let mut searchers: Vec<Box<dyn FootageSearcher>> = Vec::new();
        if let Some(key) = &config.pexels_api_key {
            searchers.push(Box::new(PexelsSearcher::new(key)));
        }
        if let Some(key) = &config.pixabay_api_key {
            searchers.push(Box::new(PixabaySearcher::new(key)));
        }
        if searchers.is_empty() {
            return Err(EngineError::external(
                "footage-search",
                "no provider API key configured",
            ));
        }

        Ok(Self::new(config, transcriber, keyword_generator, searchers))
    }

    /// Run the full pipeline for one (script, audio) pair.
    pub async fn run(&self, script_path: &Path, audio_path: &Path) -> EngineResult<PipelineOutput> {
        if self.cancelled() {
            return Err(EngineError::Media(reel_media::MediaError::Cancelled));
        }
        let script_text = tokio::fs::read_to_string(script_path).await?;

        // The speech-to-text collaborator requires WAV input.
        tokio::fs::create_dir_all(&self.config.output_dir).await?;
        let wav_path = self.config.output_dir.join("narration.wav");
        convert_to_wav(&FfmpegRunner::new(), audio_path, &wav_path).await?;

        info!("Starting audio transcription, please wait...");
        let transcript = self.transcriber.transcribe(&wav_path).await?;
        info!("Audio transcription completed ({} words)", transcript.len());

        let blocks = segment_captions(
            &transcript,
            self.config.max_words_per_caption,
            self.config.max_caption_gap,
        );
        let subtitle_path = self.config.output_dir.join("captions.srt");
        write_srt(&blocks, &subtitle_path).await?;

        let parts = partition(
            &script_text,
            &transcript,
            self.config.seconds_per_part,
            self.config.window_policy,
            self.keyword_generator.as_ref(),
            self.config.strict_external,
        )
        .await?;
        info!("Partitioned script into {} parts", parts.len());

        let mut plans_by_part = Vec::with_capacity(parts.len());
        for (i, part) in parts.iter().enumerate() {
            let descriptors =
                search_keywords(&self.searchers, &part.keywords, self.config.strict_external)
                    .await?;
            if descriptors.is_empty() {
                warn!(part = i, "No footage candidates found");
            }
            plans_by_part.push(allocate(part.duration(), &descriptors, None)?);
        }

        let mut assembler = Assembler::new(self.config.clone());
        if let Some(rx) = &self.cancel_rx {
            assembler = assembler.with_cancel(rx.clone());
        }
        let video_path = assembler.assemble(&parts, &plans_by_part, audio_path).await?;

        Ok(PipelineOutput {
            video_path,
            subtitle_path,
            part_count: parts.len(),
        })
    }
}
