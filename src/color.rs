//! Color transforms between named colorspaces.
//!
//! [`ColorEngine`] is the seam the pixel pipeline talks to. The built-in engine covers linear
//! RGB spaces defined by primaries and white point plus the sRGB transfer curve. It answers to
//! the common config names (`ACEScg`, `ACES - ACEScg`, `Output - sRGB`, ...) so defaults written
//! for a full color-management config resolve here too. Display transforms are a plain gamut
//! conversion followed by the sRGB encode; no tone scale is applied.

use nalgebra::{Matrix3, Vector3};

use crate::foundation::error::{ReelError, ReelResult};

/// Named source and target colorspace for one conversion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorTransformSpec {
    pub source: String,
    pub target: String,
}

impl ColorTransformSpec {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// A resolved transform, applied in place to interleaved f32 samples.
pub trait ColorProcessor: Send {
    /// Transform the first three channels of every pixel; further channels pass through.
    fn apply(&self, samples: &mut [f32], channels: usize) -> ReelResult<()>;
}

/// Factory for [`ColorProcessor`]s.
pub trait ColorEngine {
    fn processor(&self, source: &str, target: &str) -> ReelResult<Box<dyn ColorProcessor>>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Primaries {
    Rec709D65,
    Rec2020D65,
    Ap1D60,
    Ap0D60,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Transfer {
    Linear,
    Srgb,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Colorspace {
    primaries: Primaries,
    transfer: Transfer,
}

fn lookup(name: &str) -> Option<Colorspace> {
    let key = name.trim().to_ascii_lowercase();
    let (primaries, transfer) = match key.as_str() {
        "acescg" | "aces - acescg" | "lin_ap1" | "acescg linear" => {
            (Primaries::Ap1D60, Transfer::Linear)
        }
        "aces2065-1" | "aces - aces2065-1" | "lin_ap0" | "aces" => {
            (Primaries::Ap0D60, Transfer::Linear)
        }
        "linear rec.709" | "lin_rec709" | "utility - linear - rec.709" | "linear" => {
            (Primaries::Rec709D65, Transfer::Linear)
        }
        "linear rec.2020" | "lin_rec2020" | "utility - linear - rec.2020" => {
            (Primaries::Rec2020D65, Transfer::Linear)
        }
        "srgb" | "output - srgb" | "srgb - texture" | "utility - srgb - texture" | "srgb_tx" => {
            (Primaries::Rec709D65, Transfer::Srgb)
        }
        _ => return None,
    };
    Some(Colorspace {
        primaries,
        transfer,
    })
}

/// Chromaticities as `[rx, ry, gx, gy, bx, by, wx, wy]`.
fn chromaticities(p: Primaries) -> [f64; 8] {
    match p {
        Primaries::Rec709D65 => [0.640, 0.330, 0.300, 0.600, 0.150, 0.060, 0.3127, 0.3290],
        Primaries::Rec2020D65 => [0.708, 0.292, 0.170, 0.797, 0.131, 0.046, 0.3127, 0.3290],
        Primaries::Ap1D60 => [0.713, 0.293, 0.165, 0.830, 0.128, 0.044, 0.32168, 0.33767],
        Primaries::Ap0D60 => [
            0.7347, 0.2653, 0.0, 1.0, 0.0001, -0.0770, 0.32168, 0.33767,
        ],
    }
}

fn xy_to_xyz(x: f64, y: f64) -> Vector3<f64> {
    Vector3::new(x / y, 1.0, (1.0 - x - y) / y)
}

fn white_point(p: Primaries) -> Vector3<f64> {
    let c = chromaticities(p);
    xy_to_xyz(c[6], c[7])
}

fn rgb_to_xyz(p: Primaries) -> ReelResult<Matrix3<f64>> {
    let c = chromaticities(p);
    let m = Matrix3::from_columns(&[
        xy_to_xyz(c[0], c[1]),
        xy_to_xyz(c[2], c[3]),
        xy_to_xyz(c[4], c[5]),
    ]);
    let inv = m
        .try_inverse()
        .ok_or_else(|| ReelError::transform(format!("degenerate primaries {p:?}")))?;
    let scale = inv * white_point(p);
    Ok(m * Matrix3::from_diagonal(&scale))
}

fn bradford(src_white: Vector3<f64>, dst_white: Vector3<f64>) -> Matrix3<f64> {
    let m = Matrix3::new(
        0.8951, 0.2664, -0.1614, -0.7502, 1.7135, 0.0367, 0.0389, -0.0685, 1.0296,
    );
    let m_inv = Matrix3::new(
        0.9869929, -0.1470543, 0.1599627, 0.4323053, 0.5183603, 0.0492912, -0.0085287, 0.0400428,
        0.9684867,
    );
    let src = m * src_white;
    let dst = m * dst_white;
    let d = Matrix3::from_diagonal(&Vector3::new(dst.x / src.x, dst.y / src.y, dst.z / src.z));
    m_inv * d * m
}

fn gamut_matrix(src: Primaries, dst: Primaries) -> ReelResult<Matrix3<f64>> {
    if src == dst {
        return Ok(Matrix3::identity());
    }
    let adapt = if white_point(src) == white_point(dst) {
        Matrix3::identity()
    } else {
        bradford(white_point(src), white_point(dst))
    };
    let to_dst = rgb_to_xyz(dst)?
        .try_inverse()
        .ok_or_else(|| ReelError::transform(format!("degenerate primaries {dst:?}")))?;
    Ok(to_dst * adapt * rgb_to_xyz(src)?)
}

fn srgb_encode(v: f32) -> f32 {
    if v <= 0.003_130_8 {
        12.92 * v
    } else {
        1.055 * v.powf(1.0 / 2.4) - 0.055
    }
}

fn srgb_decode(v: f32) -> f32 {
    if v <= 0.040_45 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

fn decode(v: f32, t: Transfer) -> f32 {
    match t {
        Transfer::Linear => v,
        Transfer::Srgb => srgb_decode(v),
    }
}

fn encode(v: f32, t: Transfer) -> f32 {
    match t {
        Transfer::Linear => v,
        Transfer::Srgb => srgb_encode(v),
    }
}

/// Matrix plus transfer curves; the default engine's processor.
#[derive(Clone, Debug)]
pub struct MatrixProcessor {
    matrix: Matrix3<f32>,
    decode: Transfer,
    encode: Transfer,
}

impl ColorProcessor for MatrixProcessor {
    fn apply(&self, samples: &mut [f32], channels: usize) -> ReelResult<()> {
        if channels < 3 {
            return Err(ReelError::transform(format!(
                "color transform needs at least 3 channels, got {channels}"
            )));
        }
        for px in samples.chunks_exact_mut(channels) {
            let rgb = Vector3::new(
                decode(px[0], self.decode),
                decode(px[1], self.decode),
                decode(px[2], self.decode),
            );
            let out = self.matrix * rgb;
            px[0] = encode(out.x, self.encode);
            px[1] = encode(out.y, self.encode);
            px[2] = encode(out.z, self.encode);
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct BuiltinColorEngine;

impl BuiltinColorEngine {
    /// Whether `name` resolves to a known colorspace.
    pub fn knows(name: &str) -> bool {
        lookup(name).is_some()
    }

    pub fn matrix_processor(&self, source: &str, target: &str) -> ReelResult<MatrixProcessor> {
        let src = lookup(source)
            .ok_or_else(|| ReelError::transform(format!("unknown colorspace '{source}'")))?;
        let dst = lookup(target)
            .ok_or_else(|| ReelError::transform(format!("unknown colorspace '{target}'")))?;
        let matrix = gamut_matrix(src.primaries, dst.primaries)?.cast::<f32>();
        Ok(MatrixProcessor {
            matrix,
            decode: src.transfer,
            encode: dst.transfer,
        })
    }
}

impl ColorEngine for BuiltinColorEngine {
    fn processor(&self, source: &str, target: &str) -> ReelResult<Box<dyn ColorProcessor>> {
        tracing::debug!(source, target, "building color processor");
        Ok(Box::new(self.matrix_processor(source, target)?))
    }
}

#[cfg(test)]
#[path = "../tests/unit/color.rs"]
mod tests;
