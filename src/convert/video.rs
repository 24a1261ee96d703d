use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::color::ColorTransformSpec;
use crate::config::ToolConfig;
use crate::convert::{parent_dir, require_file, sibling_with_suffix, stem_of};
use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, ensure_parent_dir, run_tool};
use crate::encode::sink::FrameSink;
use crate::foundation::core::Fps;
use crate::foundation::error::{ReelError, ReelResult};
use crate::frame::SampleFormat;
use crate::pipeline::{PipelineOpts, PixelPipeline, encode_sequence};
use crate::sequence::{self, Sequence};

/// Options for [`sequence_to_video`].
#[derive(Clone, Debug, Default)]
pub struct SequenceVideoOpts {
    /// Frame rate; defaults to the configured framerate.
    pub fps: Option<Fps>,
    /// Output path; defaults to `<dir>/<base name>.mp4`.
    pub output: Option<PathBuf>,
}

/// Options for [`exr_sequence_to_video`].
#[derive(Clone, Debug, Default)]
pub struct ExrVideoOpts {
    pub fps: Option<Fps>,
    /// Color conversion; defaults to the configured source and target colorspaces.
    pub color: Option<ColorTransformSpec>,
    /// Output path; defaults to `<dir>/<base name>_sRGB.mp4`.
    pub output: Option<PathBuf>,
}

/// Still-image format for [`video_to_frames`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameFormat {
    Png,
    /// JPEG with quality 1-100.
    Jpg { quality: u8 },
}

impl FrameFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpg { .. } => "jpg",
        }
    }
}

fn default_fps(cfg: &ToolConfig, fps: Option<Fps>) -> ReelResult<Fps> {
    match fps {
        Some(fps) => Ok(fps),
        None => Fps::whole(cfg.framerate),
    }
}

fn warn_on_gaps(seq: &Sequence) {
    let missing = seq.missing_frames();
    if !missing.is_empty() {
        tracing::warn!(
            pattern = %seq.pattern(),
            missing = missing.len(),
            first_missing = missing[0],
            "sequence has gaps"
        );
    }
}

fn str_args<'a>(args: &'a [&'a str]) -> impl Iterator<Item = OsString> + 'a {
    args.iter().map(OsString::from)
}

/// Arguments for encoding an on-disk sequence through ffmpeg's image2 demuxer.
pub fn sequence_args(cfg: &ToolConfig, seq: &Sequence, fps: Fps, out: &Path) -> Vec<OsString> {
    let enc = &cfg.encode;
    let mut args: Vec<OsString> = str_args(&["-y", "-loglevel", "error", "-framerate"]).collect();
    args.push(fps.to_ffmpeg_arg().into());
    args.push("-start_number".into());
    args.push(seq.start_frame().to_string().into());
    args.push("-i".into());
    args.push(seq.pattern_path().into_os_string());
    args.extend(str_args(&["-vf", "pad=ceil(iw/2)*2:ceil(ih/2)*2", "-c:v"]));
    args.push(enc.codec.as_str().into());
    args.push("-pix_fmt".into());
    args.push(enc.pix_fmt.as_str().into());
    args.push("-crf".into());
    args.push(enc.crf.to_string().into());
    args.push("-preset".into());
    args.push(enc.preset.as_str().into());
    args.push(out.as_os_str().to_owned());
    args
}

/// Encode the image sequence containing `seed` into an MP4.
///
/// Contiguous sequences are decoded by ffmpeg from the frame pattern. ffmpeg's pattern reader
/// stops at the first missing number, so sequences with gaps go through the pixel pipeline.
pub fn sequence_to_video(
    cfg: &ToolConfig,
    seed: &Path,
    opts: &SequenceVideoOpts,
) -> ReelResult<PathBuf> {
    let seq = sequence::resolve(seed)?;
    warn_on_gaps(&seq);
    let fps = default_fps(cfg, opts.fps)?;
    let out = opts
        .output
        .clone()
        .unwrap_or_else(|| seq.directory().join(format!("{}.mp4", seq.base_name())));
    ensure_parent_dir(&out)?;

    if !seq.missing_frames().is_empty() {
        let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(cfg, &out));
        let frames = encode_present_frames(&seq, &mut sink, fps)?;
        tracing::info!(frames, out = %out.display(), "encoded gapped sequence");
        return Ok(out);
    }

    tracing::info!(
        pattern = %seq.pattern_path().display(),
        frames = seq.len(),
        start = seq.start_frame(),
        out = %out.display(),
        "encoding image sequence"
    );
    run_tool(
        "ffmpeg",
        Command::new(&cfg.ffmpeg).args(sequence_args(cfg, &seq, fps, &out)),
    )?;
    Ok(out)
}

/// Push every frame that exists on disk into `sink`, in frame order, as 16-bit RGB.
pub fn encode_present_frames(
    seq: &Sequence,
    sink: &mut dyn FrameSink,
    fps: Fps,
) -> ReelResult<u64> {
    let mut pipeline = PixelPipeline::new(seq, PipelineOpts::default())?;
    encode_sequence(&mut pipeline, sink, fps)
}

/// Encode an EXR sequence through the in-process pixel pipeline with a color transform.
///
/// Frames are decoded one at a time, converted to 16-bit RGB and piped into ffmpeg.
pub fn exr_sequence_to_video(
    cfg: &ToolConfig,
    seed: &Path,
    opts: &ExrVideoOpts,
) -> ReelResult<PathBuf> {
    let seq = sequence::resolve(seed)?;
    warn_on_gaps(&seq);
    let fps = default_fps(cfg, opts.fps)?;
    let color = opts
        .color
        .clone()
        .unwrap_or_else(|| ColorTransformSpec::new(&cfg.color.source, &cfg.color.target));
    let out = opts
        .output
        .clone()
        .unwrap_or_else(|| seq.directory().join(format!("{}_sRGB.mp4", seq.base_name())));

    let mut pipeline = PixelPipeline::new(
        &seq,
        PipelineOpts {
            color: Some(color),
            channels: 3,
            format: SampleFormat::U16,
        },
    )?;
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(cfg, &out));
    let frames = encode_sequence(&mut pipeline, &mut sink, fps)?;
    tracing::info!(frames, out = %out.display(), "converted EXR sequence");
    Ok(out)
}

/// ffmpeg `-q:v` value for a JPEG quality of 1-100 (100 is best).
pub fn jpeg_qscale(quality: u8) -> u8 {
    let q = u32::from(quality.clamp(1, 100));
    let scale = 2 + (100 - q) * 29 / 99;
    scale.clamp(2, 31) as u8
}

/// Arguments for extracting every frame of `video` into `pattern`.
pub fn frames_args(video: &Path, format: FrameFormat, pattern: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = str_args(&["-y", "-loglevel", "error", "-i"]).collect();
    args.push(video.as_os_str().to_owned());
    if let FrameFormat::Jpg { quality } = format {
        args.push("-q:v".into());
        args.push(jpeg_qscale(quality).to_string().into());
    }
    args.push(pattern.as_os_str().to_owned());
    args
}

/// Folder that receives the frames of `video` in `format`: `<dir>/<stem>_<ext>_sequence`.
pub fn frames_dir(video: &Path, format: FrameFormat) -> ReelResult<PathBuf> {
    let stem = stem_of(video)?;
    Ok(parent_dir(video).join(format!("{stem}_{}_sequence", format.extension())))
}

/// Extract every frame of `video` into `<dir>/<stem>_<ext>_sequence/<stem>_%04d.<ext>`.
/// Returns the directory.
pub fn video_to_frames(cfg: &ToolConfig, video: &Path, format: FrameFormat) -> ReelResult<PathBuf> {
    require_file(video)?;
    if let FrameFormat::Jpg { quality } = format
        && !(1..=100).contains(&quality)
    {
        return Err(ReelError::validation(format!(
            "JPEG quality must be within 1..=100, got {quality}"
        )));
    }
    let stem = stem_of(video)?;
    let out_dir = frames_dir(video, format)?;
    std::fs::create_dir_all(&out_dir).map_err(|e| ReelError::io(&out_dir, e))?;
    let pattern = out_dir.join(format!("{stem}_%04d.{}", format.extension()));

    tracing::info!(
        video = %video.display(),
        pattern = %pattern.display(),
        "extracting frames"
    );
    run_tool(
        "ffmpeg",
        Command::new(&cfg.ffmpeg).args(frames_args(video, format, &pattern)),
    )?;
    Ok(out_dir)
}

/// Arguments for an aspect-preserving width change with audio passed through.
pub fn resize_video_args(cfg: &ToolConfig, video: &Path, width: u32, out: &Path) -> Vec<OsString> {
    let enc = &cfg.encode;
    let mut args: Vec<OsString> = str_args(&["-y", "-loglevel", "error", "-i"]).collect();
    args.push(video.as_os_str().to_owned());
    args.push("-vf".into());
    args.push(format!("scale={width}:-2").into());
    args.extend(str_args(&["-c:a", "copy", "-c:v"]));
    args.push(enc.codec.as_str().into());
    args.push("-pix_fmt".into());
    args.push(enc.pix_fmt.as_str().into());
    args.push("-crf".into());
    args.push(enc.crf.to_string().into());
    args.push("-preset".into());
    args.push(enc.preset.as_str().into());
    args.push(out.as_os_str().to_owned());
    args
}

/// Resize `video` to `width`, writing `<stem>_resized_<W>px<ext>` next to it.
pub fn resize_video(cfg: &ToolConfig, video: &Path, width: u32) -> ReelResult<PathBuf> {
    require_file(video)?;
    if width == 0 {
        return Err(ReelError::validation("target width must be non-zero"));
    }
    let out = sibling_with_suffix(video, &format!("_resized_{width}px"))?;
    tracing::info!(video = %video.display(), width, out = %out.display(), "resizing video");
    run_tool(
        "ffmpeg",
        Command::new(&cfg.ffmpeg).args(resize_video_args(cfg, video, width, &out)),
    )?;
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/convert/video.rs"]
mod tests;
