//! Area (box) resampling.
//!
//! Each destination pixel averages the source pixels it covers, weighted by the covered fraction.
//! The filter is separable and runs horizontally, then vertically, over normalized f32 samples
//! with any channel count.

use crate::foundation::core::Size;
use crate::foundation::error::ReelResult;
use crate::frame::FrameBuffer;

type Taps = Vec<(usize, f32)>;

fn area_taps(src: u32, dst: u32) -> Vec<Taps> {
    let scale = f64::from(src) / f64::from(dst);
    (0..dst)
        .map(|i| {
            let start = f64::from(i) * scale;
            let end = (f64::from(i) + 1.0) * scale;
            let first = start.floor() as usize;
            let last = (end.ceil() as usize).min(src as usize);
            let mut taps = Vec::with_capacity(last - first);
            for j in first..last {
                let overlap = end.min(j as f64 + 1.0) - start.max(j as f64);
                if overlap > 0.0 {
                    taps.push((j, (overlap / scale) as f32));
                }
            }
            taps
        })
        .collect()
}

/// Resample interleaved samples from `src` to `dst`.
pub fn resample_area(samples: &[f32], src: Size, channels: usize, dst: Size) -> Vec<f32> {
    if src == dst {
        return samples.to_vec();
    }
    let (sw, sh) = (src.width as usize, src.height as usize);
    let (dw, dh) = (dst.width as usize, dst.height as usize);

    let x_taps = area_taps(src.width, dst.width);
    let mut horizontal = vec![0.0f32; dw * sh * channels];
    for y in 0..sh {
        let row = &samples[y * sw * channels..(y + 1) * sw * channels];
        let out = &mut horizontal[y * dw * channels..(y + 1) * dw * channels];
        for (x, taps) in x_taps.iter().enumerate() {
            for &(sx, w) in taps {
                for c in 0..channels {
                    out[x * channels + c] += row[sx * channels + c] * w;
                }
            }
        }
    }

    let y_taps = area_taps(src.height, dst.height);
    let mut out = vec![0.0f32; dw * dh * channels];
    let stride = dw * channels;
    for (y, taps) in y_taps.iter().enumerate() {
        let dst_row = &mut out[y * stride..(y + 1) * stride];
        for &(sy, w) in taps {
            let src_row = &horizontal[sy * stride..(sy + 1) * stride];
            for (d, s) in dst_row.iter_mut().zip(src_row) {
                *d += s * w;
            }
        }
    }
    out
}

/// Resample a frame to `dst`, keeping its channel count and sample format.
pub fn resample_frame(frame: FrameBuffer, dst: Size) -> ReelResult<FrameBuffer> {
    if frame.size() == dst {
        return Ok(frame);
    }
    tracing::debug!(from = %frame.size(), to = %dst, "resampling frame");
    let samples = resample_area(&frame.to_f32(), frame.size(), frame.channels, dst);
    FrameBuffer::from_f32(dst.width, dst.height, frame.channels, samples, frame.format())
}

#[cfg(test)]
#[path = "../tests/unit/resample.rs"]
mod tests;
