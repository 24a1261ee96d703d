//! Frame-by-frame conversion of an image sequence into a raw frame stream.
//!
//! Per frame, in sequence order:
//! 1. decode at native geometry and depth
//! 2. reshape to the requested channel count
//! 3. apply the optional color transform on f32 samples
//! 4. conform to the geometry fixed by the first frame (area resample)
//! 5. convert to the output sample format, clamping floats
//! 6. verify the serialized byte length
//!
//! Only one frame is alive at a time.

use crate::color::{BuiltinColorEngine, ColorEngine, ColorProcessor, ColorTransformSpec};
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, Size};
use crate::foundation::error::{ReelError, ReelResult};
use crate::frame::{FrameBuffer, SampleFormat, decode_image, sample_count};
use crate::resample::resample_frame;
use crate::sequence::Sequence;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineOpts {
    pub color: Option<ColorTransformSpec>,
    /// Channels per output pixel.
    pub channels: usize,
    pub format: SampleFormat,
}

impl Default for PipelineOpts {
    fn default() -> Self {
        Self {
            color: None,
            channels: 3,
            format: SampleFormat::U16,
        }
    }
}

pub struct PixelPipeline<'a> {
    sequence: &'a Sequence,
    opts: PipelineOpts,
    processor: Option<Box<dyn ColorProcessor>>,
    target: Option<Size>,
}

impl<'a> PixelPipeline<'a> {
    /// Pipeline using the built-in color engine.
    pub fn new(sequence: &'a Sequence, opts: PipelineOpts) -> ReelResult<Self> {
        Self::with_engine(sequence, opts, &BuiltinColorEngine)
    }

    pub fn with_engine(
        sequence: &'a Sequence,
        opts: PipelineOpts,
        engine: &dyn ColorEngine,
    ) -> ReelResult<Self> {
        if !(1..=4).contains(&opts.channels) {
            return Err(ReelError::validation(format!(
                "pipeline channel count must be within 1..=4, got {}",
                opts.channels
            )));
        }
        let processor = match &opts.color {
            Some(spec) => Some(engine.processor(&spec.source, &spec.target)?),
            None => None,
        };
        Ok(Self {
            sequence,
            opts,
            processor,
            target: None,
        })
    }

    /// Lazy, single-pass iterator over converted frames. Stops after the first error.
    pub fn frames(&mut self) -> Frames<'_, 'a> {
        Frames {
            pipeline: self,
            next: 0,
            failed: false,
        }
    }

    /// Run one file through every stage.
    pub fn process(&mut self, path: &std::path::Path) -> ReelResult<FrameBuffer> {
        let mut frame = decode_image(path)?.select_channels(self.opts.channels)?;

        if let Some(processor) = &self.processor {
            let mut samples = frame.to_f32();
            processor
                .apply(&mut samples, frame.channels)
                .map_err(|e| match e {
                    ReelError::Transform(msg) => {
                        ReelError::transform(format!("'{}': {msg}", path.display()))
                    }
                    other => other,
                })?;
            frame = FrameBuffer::from_f32(
                frame.width,
                frame.height,
                frame.channels,
                samples,
                SampleFormat::F32,
            )?;
        }

        let target = *self.target.get_or_insert(frame.size());
        if frame.size() != target {
            tracing::debug!(
                path = %path.display(),
                from = %frame.size(),
                to = %target,
                "frame geometry differs from first frame"
            );
            frame = resample_frame(frame, target)?;
        }

        let frame = frame.convert(self.opts.format)?;

        let expected = sample_count(target.width, target.height, self.opts.channels)
            * self.opts.format.bytes_per_sample();
        let actual = frame.byte_len();
        if actual != expected {
            return Err(ReelError::GeometryMismatch { expected, actual });
        }
        Ok(frame)
    }
}

pub struct Frames<'p, 'a> {
    pipeline: &'p mut PixelPipeline<'a>,
    next: usize,
    failed: bool,
}

impl Iterator for Frames<'_, '_> {
    type Item = ReelResult<FrameBuffer>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let sequence = self.pipeline.sequence;
        let entry = sequence.frames().get(self.next)?;
        self.next += 1;
        let result = self.pipeline.process(&entry.path);
        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.pipeline.sequence.len().saturating_sub(self.next);
        if self.failed { (0, Some(0)) } else { (0, Some(left)) }
    }
}

/// Stream every frame of the pipeline into `sink`.
///
/// The sink is started with the first frame's geometry. On any failure after `begin` the sink is
/// aborted, which discards partial output. Returns the number of frames written.
pub fn encode_sequence(
    pipeline: &mut PixelPipeline<'_>,
    sink: &mut dyn FrameSink,
    fps: Fps,
) -> ReelResult<u64> {
    let mut started = false;
    let result = drive(pipeline, sink, fps, &mut started);
    if result.is_err() && started {
        sink.abort();
    }
    result
}

fn drive(
    pipeline: &mut PixelPipeline<'_>,
    sink: &mut dyn FrameSink,
    fps: Fps,
    started: &mut bool,
) -> ReelResult<u64> {
    let sequence = pipeline.sequence;
    let (channels, format) = (pipeline.opts.channels, pipeline.opts.format);
    tracing::info!(
        pattern = %sequence.pattern_path().display(),
        frames = sequence.len(),
        fps = %fps.to_ffmpeg_arg(),
        "encoding sequence"
    );

    let mut written = 0u64;
    for (entry, frame) in sequence.frames().iter().zip(pipeline.frames()) {
        let frame = frame?;
        if !*started {
            sink.begin(SinkConfig {
                width: frame.width,
                height: frame.height,
                channels,
                format,
                fps,
            })?;
            *started = true;
        }
        sink.push_frame(entry.number, &frame)?;
        written += 1;
    }

    if !*started {
        return Err(ReelError::validation("sequence produced no frames"));
    }
    sink.end()?;
    Ok(written)
}
