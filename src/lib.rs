//! Reelbox is a media conversion toolbox for image sequences, multi-layer EXR files and video.
//!
//! External tools (`ffmpeg`, `ffprobe`, an upscaler) do the heavy codec work; this crate owns
//! everything around them:
//!
//! - Resolve numbered frame sequences from any one of their frames ([`sequence`])
//! - Decode, color-convert and resample frames into a [`FrameSink`] ([`pipeline`])
//! - Split multi-layer EXR files into one file per render pass ([`aov`])
//! - Whole-file conversions with per-input failure isolation ([`convert`])
#![forbid(unsafe_code)]

mod foundation;

/// Render-pass separation for EXR files.
pub mod aov;
pub mod batch;
/// Colorspace conversion engines.
pub mod color;
pub mod config;
/// User-facing conversions.
pub mod convert;
/// Encoding sinks.
pub mod encode;
pub mod frame;
pub mod pipeline;
pub mod probe;
pub mod resample;
pub mod sequence;

pub use crate::foundation::core::{Fps, Size};
pub use crate::foundation::error::{ErrorKind, ReelError, ReelResult};

pub use crate::batch::BatchReport;
pub use crate::color::{BuiltinColorEngine, ColorEngine, ColorProcessor, ColorTransformSpec};
pub use crate::config::ToolConfig;
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::frame::{FrameBuffer, PixelData, SampleFormat};
pub use crate::pipeline::{PipelineOpts, PixelPipeline, encode_sequence};
pub use crate::probe::{ProbeInfo, probe_media};
pub use crate::sequence::Sequence;
