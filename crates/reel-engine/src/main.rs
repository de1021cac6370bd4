//! Reelforge binary: assemble a video from a script and its voice-over.
//!
//! Usage: `reelforge <script.txt> <narration.{wav,mp3,m4a}>`
//!
//! Word timings are read from `<narration>.words.json` next to the audio
//! file; provider and OpenAI keys come from the environment (see
//! `EngineConfig::from_env`).

use std::path::PathBuf;

use anyhow::{bail, Context};
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use reel_engine::{EngineConfig, JsonFileTranscriber, Pipeline};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("reel=info".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    let mut args = std::env::args().skip(1);
    let (Some(script_path), Some(audio_path)) = (args.next(), args.next()) else {
        bail!("usage: reelforge <script.txt> <narration-audio>");
    };
    let script_path = PathBuf::from(script_path);
    let audio_path = PathBuf::from(audio_path);

    reel_media::check_ffmpeg().context("ffmpeg is required")?;
    reel_media::check_ffprobe().context("ffprobe is required")?;

    let config = EngineConfig::from_env();
    info!("Engine config: {:?}", config);

    // Ctrl-C stops in-flight downloads and transcodes; cleanup still runs.
    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling run");
            let _ = cancel_tx.send(true);
        }
    });

    // Word timings sit next to the input audio, not next to the converted WAV.
    let transcriber = JsonFileTranscriber::from_path(audio_path.with_extension("words.json"));
    let pipeline = Pipeline::from_config(config, Box::new(transcriber))
        .context("failed to wire pipeline collaborators")?
        .with_cancel(cancel_rx);

    let output = pipeline
        .run(&script_path, &audio_path)
        .await
        .context("pipeline run failed")?;

    info!(
        parts = output.part_count,
        subtitles = %output.subtitle_path.display(),
        "Run complete"
    );
    println!("{}", output.video_path.display());
    Ok(())
}
