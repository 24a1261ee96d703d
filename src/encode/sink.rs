use crate::foundation::core::{Fps, Size};
use crate::foundation::error::{ReelError, ReelResult};
use crate::frame::{FrameBuffer, SampleFormat, sample_count};

/// Geometry and timing fixed for a whole run, handed to [`FrameSink::begin`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SinkConfig {
    pub width: u32,
    pub height: u32,
    /// Samples per pixel.
    pub channels: usize,
    pub format: SampleFormat,
    pub fps: Fps,
}

impl SinkConfig {
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Exact serialized length of one frame.
    pub fn frame_bytes(&self) -> usize {
        sample_count(self.width, self.height, self.channels) * self.format.bytes_per_sample()
    }

    /// Check that `frame` serializes to exactly one frame of this geometry.
    pub fn check_frame(&self, frame: &FrameBuffer) -> ReelResult<()> {
        if frame.channels != self.channels || frame.format() != self.format {
            return Err(ReelError::validation(format!(
                "frame layout {}ch {:?} does not match sink layout {}ch {:?}",
                frame.channels,
                frame.format(),
                self.channels,
                self.format
            )));
        }
        let expected = self.frame_bytes();
        let actual = frame.byte_len();
        if actual != expected {
            return Err(ReelError::GeometryMismatch { expected, actual });
        }
        Ok(())
    }
}

/// Consumer of frames in sequence order.
///
/// Ordering contract: `push_frame` is called with strictly increasing frame numbers. A run ends
/// with exactly one of `end` (success) or `abort` (failure).
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()>;
    /// Push one frame.
    fn push_frame(&mut self, number: u64, frame: &FrameBuffer) -> ReelResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> ReelResult<()>;
    /// Tear down after a failed run, discarding partial output.
    fn abort(&mut self) {}
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(u64, FrameBuffer)>,
    ended: bool,
    aborted: bool,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    pub fn frames(&self) -> &[(u64, FrameBuffer)] {
        &self.frames
    }

    pub fn ended(&self) -> bool {
        self.ended
    }

    pub fn aborted(&self) -> bool {
        self.aborted
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.ended = false;
        self.aborted = false;
        Ok(())
    }

    fn push_frame(&mut self, number: u64, frame: &FrameBuffer) -> ReelResult<()> {
        let cfg = self
            .cfg
            .ok_or_else(|| ReelError::validation("in-memory sink not started"))?;
        if let Some((last, _)) = self.frames.last()
            && number <= *last
        {
            return Err(ReelError::validation(
                "in-memory sink received out-of-order frame number",
            ));
        }
        cfg.check_frame(frame)?;
        self.frames.push((number, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> ReelResult<()> {
        self.ended = true;
        Ok(())
    }

    fn abort(&mut self) {
        self.aborted = true;
    }
}
