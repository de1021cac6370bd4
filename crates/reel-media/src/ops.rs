//! Concrete video operations used by the assembler.

use std::path::Path;
use tracing::{debug, info};

use reel_models::EncodingConfig;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::probe::probe_video;

/// Trim a clip to `[trim_start, trim_end]`, re-encoding with the given
/// settings. The audio stream is dropped; narration audio is muxed once at
/// the end of assembly.
pub async fn trim_clip(
    runner: &FfmpegRunner,
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    trim_start: f64,
    trim_end: f64,
    encoding: &EncodingConfig,
) -> MediaResult<()> {
    let input = input.as_ref();
    let output = output.as_ref();
    let duration = trim_end - trim_start;

    debug!(
        "Trimming {} -> {} ({:.3}s..{:.3}s)",
        input.display(),
        output.display(),
        trim_start,
        trim_end
    );

    let cmd = FfmpegCommand::new(input, output)
        .seek(trim_start)
        .duration(duration)
        .video_codec(&encoding.codec)
        .preset(&encoding.preset)
        .crf(encoding.crf)
        .no_audio();

    runner.run(&cmd).await
}

/// Concatenate clips into one stream, in the given order.
///
/// Clips that differ in frame size are scaled to the **first** clip's size
/// with lanczos resampling and padded to preserve aspect ratio; the first
/// clip's resolution is the canonical one. A single input is re-encoded
/// as-is so the output always carries uniform encoding settings.
pub async fn concat_clips(
    runner: &FfmpegRunner,
    inputs: &[impl AsRef<Path>],
    output: impl AsRef<Path>,
    encoding: &EncodingConfig,
) -> MediaResult<()> {
    let output = output.as_ref();
    match inputs {
        [] => Err(MediaError::InvalidVideo(
            "Cannot concatenate zero clips".to_string(),
        )),
        [single] => {
            let cmd = FfmpegCommand::new(single.as_ref(), output)
                .video_codec(&encoding.codec)
                .preset(&encoding.preset)
                .crf(encoding.crf)
                .no_audio();
            runner.run(&cmd).await
        }
        _ => {
            let first = probe_video(inputs[0].as_ref()).await?;
            let (w, h) = (first.width, first.height);

            let mut filter = String::new();
            for i in 0..inputs.len() {
                filter.push_str(&format!(
                    "[{i}:v]scale={w}:{h}:force_original_aspect_ratio=decrease:flags=lanczos,\
                     pad={w}:{h}:(ow-iw)/2:(oh-ih)/2,setsar=1[v{i}];"
                ));
            }
            for i in 0..inputs.len() {
                filter.push_str(&format!("[v{i}]"));
            }
            filter.push_str(&format!("concat=n={}:v=1:a=0[out]", inputs.len()));

            let mut cmd = FfmpegCommand::new(inputs[0].as_ref(), output);
            for input in &inputs[1..] {
                cmd = cmd.add_input(input.as_ref());
            }
            let cmd = cmd
                .filter_complex(filter)
                .output_args(["-map", "[out]"])
                .video_codec(&encoding.codec)
                .preset(&encoding.preset)
                .crf(encoding.crf);

            info!(
                "Concatenating {} clips -> {} ({}x{})",
                inputs.len(),
                output.display(),
                w,
                h
            );
            runner.run(&cmd).await
        }
    }
}

/// Generate a solid-color filler clip of the given frame size and duration.
pub async fn color_clip(
    runner: &FfmpegRunner,
    color: &str,
    width: u32,
    height: u32,
    duration: f64,
    output: impl AsRef<Path>,
    encoding: &EncodingConfig,
) -> MediaResult<()> {
    let expr = format!(
        "color=c={}:s={}x{}:d={:.3}:r=30",
        color, width, height, duration
    );
    let cmd = FfmpegCommand::from_lavfi(expr, output.as_ref())
        .video_codec(&encoding.codec)
        .preset(&encoding.preset)
        .crf(encoding.crf);
    runner.run(&cmd).await
}

/// Mux an audio track onto a video, replacing any existing audio.
///
/// Neither stream is truncated: if the video runs longer than the audio the
/// tail simply plays silent.
pub async fn mux_audio(
    runner: &FfmpegRunner,
    video: impl AsRef<Path>,
    audio: impl AsRef<Path>,
    output: impl AsRef<Path>,
    encoding: &EncodingConfig,
) -> MediaResult<()> {
    let cmd = FfmpegCommand::new(video.as_ref(), output.as_ref())
        .add_input(audio.as_ref())
        .output_args(["-map", "0:v:0", "-map", "1:a:0"])
        .video_codec("copy")
        .audio_codec(&encoding.audio_codec)
        .audio_bitrate(&encoding.audio_bitrate);
    runner.run(&cmd).await
}

/// Convert an audio file to WAV (PCM s16le), as required by the
/// speech-to-text collaborator. Returns early if the input already has a
/// `.wav` extension.
pub async fn convert_to_wav(
    runner: &FfmpegRunner,
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
) -> MediaResult<()> {
    let input = input.as_ref();
    if input
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("wav"))
    {
        if input != output.as_ref() {
            tokio::fs::copy(input, output.as_ref()).await?;
        }
        return Ok(());
    }

    let cmd = FfmpegCommand::new(input, output.as_ref())
        .output_args(["-vn", "-acodec", "pcm_s16le"]);
    runner.run(&cmd).await
}
