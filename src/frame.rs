use std::path::Path;

use crate::foundation::core::Size;
use crate::foundation::error::{ReelError, ReelResult};

/// Storage type of a single channel sample.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SampleFormat {
    U8,
    #[default]
    U16,
    F32,
}

impl SampleFormat {
    pub fn bytes_per_sample(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 => 2,
            Self::F32 => 4,
        }
    }
}

/// Interleaved samples, row-major, top row first.
#[derive(Clone, Debug, PartialEq)]
pub enum PixelData {
    U8(Vec<u8>),
    U16(Vec<u16>),
    F32(Vec<f32>),
}

impl PixelData {
    pub fn len(&self) -> usize {
        match self {
            Self::U8(v) => v.len(),
            Self::U16(v) => v.len(),
            Self::F32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn format(&self) -> SampleFormat {
        match self {
            Self::U8(_) => SampleFormat::U8,
            Self::U16(_) => SampleFormat::U16,
            Self::F32(_) => SampleFormat::F32,
        }
    }
}

/// One decoded frame.
///
/// `data.len() == width * height * channels` holds for every buffer built through
/// [`FrameBuffer::new`].
#[derive(Clone, Debug, PartialEq)]
pub struct FrameBuffer {
    pub width: u32,
    pub height: u32,
    pub channels: usize,
    pub data: PixelData,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32, channels: usize, data: PixelData) -> ReelResult<Self> {
        if width == 0 || height == 0 {
            return Err(ReelError::validation(format!(
                "frame dimensions must be non-zero, got {width}x{height}"
            )));
        }
        if !(1..=4).contains(&channels) {
            return Err(ReelError::validation(format!(
                "frame channel count must be within 1..=4, got {channels}"
            )));
        }
        let expected = sample_count(width, height, channels);
        if data.len() != expected {
            return Err(ReelError::GeometryMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn format(&self) -> SampleFormat {
        self.data.format()
    }

    /// Serialized length of this frame in bytes.
    pub fn byte_len(&self) -> usize {
        self.data.len() * self.format().bytes_per_sample()
    }

    /// Samples normalized to `[0, 1]` for integer formats; float samples are copied unchanged.
    pub fn to_f32(&self) -> Vec<f32> {
        match &self.data {
            PixelData::U8(v) => v.iter().map(|&s| f32::from(s) / 255.0).collect(),
            PixelData::U16(v) => v.iter().map(|&s| f32::from(s) / 65535.0).collect(),
            PixelData::F32(v) => v.clone(),
        }
    }

    /// Build a buffer of `format` from normalized float samples.
    ///
    /// Conversion to an integer format clamps to `[0, 1]` before scaling, so overshoot saturates
    /// instead of wrapping.
    pub fn from_f32(
        width: u32,
        height: u32,
        channels: usize,
        samples: Vec<f32>,
        format: SampleFormat,
    ) -> ReelResult<Self> {
        let data = match format {
            SampleFormat::U8 => PixelData::U8(
                samples
                    .iter()
                    .map(|&s| (clamp_unit(s) * 255.0).round() as u8)
                    .collect(),
            ),
            SampleFormat::U16 => PixelData::U16(
                samples
                    .iter()
                    .map(|&s| (clamp_unit(s) * 65535.0).round() as u16)
                    .collect(),
            ),
            SampleFormat::F32 => PixelData::F32(samples),
        };
        Self::new(width, height, channels, data)
    }

    /// Convert to another sample format. A no-op when the format already matches.
    pub fn convert(self, format: SampleFormat) -> ReelResult<Self> {
        if self.format() == format {
            return Ok(self);
        }
        let samples = self.to_f32();
        Self::from_f32(self.width, self.height, self.channels, samples, format)
    }

    /// Reshape to `channels` per pixel.
    ///
    /// Extra channels are dropped (alpha is never composited). Luma is replicated into RGB and a
    /// missing alpha slot is filled opaque.
    pub fn select_channels(self, channels: usize) -> ReelResult<Self> {
        if !(1..=4).contains(&channels) {
            return Err(ReelError::validation(format!(
                "channel count must be within 1..=4, got {channels}"
            )));
        }
        if channels == self.channels {
            return Ok(self);
        }
        let from = self.channels;
        let data = match &self.data {
            PixelData::U8(v) => PixelData::U8(remap_channels(v, from, channels, u8::MAX)),
            PixelData::U16(v) => PixelData::U16(remap_channels(v, from, channels, u16::MAX)),
            PixelData::F32(v) => PixelData::F32(remap_channels(v, from, channels, 1.0)),
        };
        Self::new(self.width, self.height, channels, data)
    }

    /// Little-endian byte image of the samples, as a rawvideo consumer reads it.
    pub fn to_bytes(&self) -> Vec<u8> {
        match &self.data {
            PixelData::U8(v) => v.clone(),
            PixelData::U16(v) => v.iter().flat_map(|s| s.to_le_bytes()).collect(),
            PixelData::F32(v) => v.iter().flat_map(|s| s.to_le_bytes()).collect(),
        }
    }
}

pub(crate) fn sample_count(width: u32, height: u32, channels: usize) -> usize {
    width as usize * height as usize * channels
}

fn clamp_unit(s: f32) -> f32 {
    if s.is_nan() { 0.0 } else { s.clamp(0.0, 1.0) }
}

fn source_channel(c: usize, from: usize, to: usize) -> Option<usize> {
    if from >= to {
        return Some(c);
    }
    let alpha_slot = (to == 4 && c == 3) || (to == 2 && c == 1);
    if alpha_slot {
        return (from == 2 || from == 4).then_some(from - 1);
    }
    if from <= 2 { Some(0) } else { Some(c) }
}

fn remap_channels<T: Copy>(src: &[T], from: usize, to: usize, opaque: T) -> Vec<T> {
    let map: Vec<Option<usize>> = (0..to).map(|c| source_channel(c, from, to)).collect();
    let mut out = Vec::with_capacity(src.len() / from * to);
    for px in src.chunks_exact(from) {
        out.extend(map.iter().map(|m| m.map_or(opaque, |i| px[i])));
    }
    out
}

/// Decode an image file at its native geometry, channel count and sample depth.
///
/// 8-bit and 16-bit integer images keep their depth; float images (EXR, HDR) decode to `F32`.
pub fn decode_image(path: &Path) -> ReelResult<FrameBuffer> {
    let img = image::open(path)
        .map_err(|e| ReelError::decode(format!("decode '{}': {e}", path.display())))?;
    let (width, height) = (img.width(), img.height());

    let (channels, data) = match img {
        image::DynamicImage::ImageLuma8(b) => (1, PixelData::U8(b.into_raw())),
        image::DynamicImage::ImageLumaA8(b) => (2, PixelData::U8(b.into_raw())),
        image::DynamicImage::ImageRgb8(b) => (3, PixelData::U8(b.into_raw())),
        image::DynamicImage::ImageRgba8(b) => (4, PixelData::U8(b.into_raw())),
        image::DynamicImage::ImageLuma16(b) => (1, PixelData::U16(b.into_raw())),
        image::DynamicImage::ImageLumaA16(b) => (2, PixelData::U16(b.into_raw())),
        image::DynamicImage::ImageRgb16(b) => (3, PixelData::U16(b.into_raw())),
        image::DynamicImage::ImageRgba16(b) => (4, PixelData::U16(b.into_raw())),
        image::DynamicImage::ImageRgb32F(b) => (3, PixelData::F32(b.into_raw())),
        image::DynamicImage::ImageRgba32F(b) => (4, PixelData::F32(b.into_raw())),
        other => (4, PixelData::F32(other.to_rgba32f().into_raw())),
    };

    tracing::debug!(
        path = %path.display(),
        width,
        height,
        channels,
        format = ?data.format(),
        "decoded frame"
    );
    FrameBuffer::new(width, height, channels, data)
}

#[cfg(test)]
#[path = "../tests/unit/frame.rs"]
mod tests;
