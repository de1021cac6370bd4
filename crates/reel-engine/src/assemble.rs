//! Video assembly.
//!
//! Downloads and trims every planned clip, concatenates clips per part and
//! parts into one stream, reconciles total video duration against the
//! narration audio, and muxes the audio track. All intermediates live in a
//! per-run temp directory that is removed on success and failure alike.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::{watch, Semaphore};
use tracing::{info, warn};
use uuid::Uuid;

use reel_media::{
    color_clip, concat_clips, download_file, media_duration, mux_audio, probe_video, trim_clip,
    FfmpegRunner,
};
use reel_models::{ClipPlan, ScriptPart};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};

/// Tolerance when comparing assembled video duration to audio duration;
/// differences under one frame at 30fps are not worth a filler clip.
const RECONCILE_TOLERANCE_SECS: f64 = 1.0 / 30.0;

/// Seconds of filler required to bring the video up to the audio length, or
/// `None` when the video already covers it (within tolerance). Excess video
/// never produces a trim; footage is not cut to fit a shorter narration.
fn filler_needed(video_duration: f64, audio_duration: f64) -> Option<f64> {
    let shortfall = audio_duration - video_duration;
    (shortfall > RECONCILE_TOLERANCE_SECS).then_some(shortfall)
}

/// Assembles the final video from per-part clip plans and the audio track.
pub struct Assembler {
    config: EngineConfig,
    client: reqwest::Client,
    cancel_rx: Option<watch::Receiver<bool>>,
}

impl Assembler {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            cancel_rx: None,
        }
    }

    /// Attach a cancellation signal; raising it stops in-flight downloads and
    /// transcodes. The working area is still cleaned up.
    pub fn with_cancel(mut self, cancel_rx: watch::Receiver<bool>) -> Self {
        self.cancel_rx = Some(cancel_rx);
        self
    }

    fn runner(&self) -> FfmpegRunner {
        let mut runner = FfmpegRunner::new().with_timeout(self.config.ffmpeg_timeout_secs);
        if let Some(rx) = &self.cancel_rx {
            runner = runner.with_cancel(rx.clone());
        }
        runner
    }

    fn cancelled(&self) -> bool {
        self.cancel_rx.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Assemble the final video.
    ///
    /// `plans_by_part[i]` holds the clip plans for `parts[i]`; a part with an
    /// empty plan list is skipped and contributes zero duration. In strict
    /// acquisition mode any clip failure aborts the run; otherwise failed
    /// clips are dropped from their part.
    pub async fn assemble(
        &self,
        parts: &[ScriptPart],
        plans_by_part: &[Vec<ClipPlan>],
        audio_path: &Path,
    ) -> EngineResult<PathBuf> {
        if parts.len() != plans_by_part.len() {
            return Err(EngineError::assembly(format!(
                "{} parts but {} plan lists",
                parts.len(),
                plans_by_part.len()
            )));
        }

        tokio::fs::create_dir_all(&self.config.work_dir).await?;
        // TempDir removal on drop covers both success and failure paths.
        let workdir = tempfile::Builder::new()
            .prefix("reelforge-")
            .tempdir_in(&self.config.work_dir)?;

        let result = self
            .assemble_in(workdir.path(), parts, plans_by_part, audio_path)
            .await;

        match workdir.close() {
            Ok(()) => info!("Working area removed"),
            Err(e) => warn!(error = %e, "Failed to remove working area"),
        }
        result
    }

    async fn assemble_in(
        &self,
        workdir: &Path,
        parts: &[ScriptPart],
        plans_by_part: &[Vec<ClipPlan>],
        audio_path: &Path,
    ) -> EngineResult<PathBuf> {
        let trimmed_by_part = self.acquire_and_trim(workdir, plans_by_part).await?;

        // Concatenate each part's clips, keeping part order.
        let mut part_outputs = Vec::new();
        for (i, trimmed) in trimmed_by_part.iter().enumerate() {
            let clips: Vec<&PathBuf> = trimmed.iter().flatten().collect();
            if clips.is_empty() {
                warn!(part = i, "No usable clips for part, skipping");
                continue;
            }
            let part_output = workdir.join(format!("part_{:03}_{}.mp4", i, Uuid::new_v4()));
            concat_clips(&self.runner(), &clips, &part_output, &self.config.encoding).await?;
            part_outputs.push(part_output);
        }

        if part_outputs.is_empty() {
            return Err(EngineError::assembly(format!(
                "no clips available for any of the {} parts",
                parts.len()
            )));
        }

        let video_path = workdir.join("assembled.mp4");
        concat_clips(&self.runner(), &part_outputs, &video_path, &self.config.encoding).await?;

        let reconciled = self.reconcile(workdir, &video_path, audio_path).await?;

        tokio::fs::create_dir_all(&self.config.output_dir).await?;
        let final_path = self
            .config
            .output_dir
            .join(format!("{}_final.mp4", Uuid::new_v4()));
        mux_audio(&self.runner(), &reconciled, audio_path, &final_path, &self.config.encoding)
            .await
            .map_err(|e| EngineError::assembly(format!("final mux failed: {}", e)))?;

        info!("Final video written to {}", final_path.display());
        Ok(final_path)
    }

    /// Download and trim all planned clips with bounded concurrency.
    ///
    /// Completion order is irrelevant: each task reports its (part, clip)
    /// indices and results are buffered back into plan order. In lenient
    /// mode a failed clip leaves a `None` hole in its part.
    async fn acquire_and_trim(
        &self,
        workdir: &Path,
        plans_by_part: &[Vec<ClipPlan>],
    ) -> EngineResult<Vec<Vec<Option<PathBuf>>>> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_clip_parallel));

        let mut tasks = Vec::new();
        for (part_idx, plans) in plans_by_part.iter().enumerate() {
            for (clip_idx, plan) in plans.iter().enumerate() {
                let semaphore = Arc::clone(&semaphore);
                let plan = plan.clone();
                let workdir = workdir.to_path_buf();
                tasks.push(async move {
                    let permit = semaphore.acquire().await;
                    let result = match permit {
                        Ok(_permit) => self.prepare_clip(&workdir, &plan).await,
                        Err(_) => Err(EngineError::assembly("clip semaphore closed")),
                    };
                    (part_idx, clip_idx, result)
                });
            }
        }
        let outcomes = join_all(tasks).await;

        let mut trimmed_by_part: Vec<Vec<Option<PathBuf>>> = plans_by_part
            .iter()
            .map(|plans| vec![None; plans.len()])
            .collect();

        for (part_idx, clip_idx, result) in outcomes {
            match result {
                Ok(path) => trimmed_by_part[part_idx][clip_idx] = Some(path),
                Err(e) if self.config.strict_acquisition => return Err(e),
                Err(e) => {
                    warn!(
                        part = part_idx,
                        clip = clip_idx,
                        error = %e,
                        "Dropping failed clip from part"
                    );
                }
            }
        }
        Ok(trimmed_by_part)
    }

    /// Download one clip, verify it decodes, and trim it to its plan window.
    async fn prepare_clip(&self, workdir: &Path, plan: &ClipPlan) -> EngineResult<PathBuf> {
        if self.cancelled() {
            return Err(EngineError::Media(reel_media::MediaError::Cancelled));
        }

        let url = &plan.descriptor.url;
        let raw_path = workdir.join(format!("{}.mp4", Uuid::new_v4()));
        download_file(&self.client, url, &raw_path)
            .await
            .map_err(|e| EngineError::acquisition(url, e.to_string()))?;

        let info = probe_video(&raw_path)
            .await
            .map_err(|e| EngineError::acquisition(url, format!("not a valid video: {}", e)))?;

        // The provider's reported duration can overstate the file; never trim
        // past what the download actually contains.
        let trim_end = plan.trim_end.min(info.duration.max(0.0));
        if trim_end <= plan.trim_start {
            return Err(EngineError::acquisition(
                url,
                format!("downloaded clip too short ({:.3}s)", info.duration),
            ));
        }

        let trimmed_path = workdir.join(format!("{}_trimmed.mp4", Uuid::new_v4()));
        trim_clip(
            &self.runner(),
            &raw_path,
            &trimmed_path,
            plan.trim_start,
            trim_end,
            &self.config.encoding,
        )
        .await?;
        Ok(trimmed_path)
    }

    /// Compare assembled video duration against the audio track and pad the
    /// video with a solid-color filler when it runs short.
    ///
    /// Excess video is deliberately left alone: footage is never cut to fit
    /// a shorter narration.
    async fn reconcile(
        &self,
        workdir: &Path,
        video_path: &Path,
        audio_path: &Path,
    ) -> EngineResult<PathBuf> {
        let video_info = probe_video(video_path).await?;
        let audio_duration = media_duration(audio_path).await?;

        let Some(shortfall) = filler_needed(video_info.duration, audio_duration) else {
            return Ok(video_path.to_path_buf());
        };

        info!(
            "Appending {:.3}s of {} filler to match audio duration",
            shortfall, self.config.filler_color
        );

        let filler_path = workdir.join("filler.mp4");
        color_clip(
            &self.runner(),
            &self.config.filler_color,
            video_info.width,
            video_info.height,
            shortfall,
            &filler_path,
            &self.config.encoding,
        )
        .await?;

        let padded_path = workdir.join("padded.mp4");
        concat_clips(
            &self.runner(),
            &[video_path, filler_path.as_path()],
            &padded_path,
            &self.config.encoding,
        )
        .await?;
        Ok(padded_path)
    }
}
