use crate::foundation::error::{ReelError, ReelResult};

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> ReelResult<Self> {
        if den == 0 {
            return Err(ReelError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(ReelError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Whole-number frame rate.
    pub fn whole(fps: u32) -> ReelResult<Self> {
        Self::new(fps, 1)
    }

    /// `num/den` as ffmpeg expects it on the command line.
    pub fn to_ffmpeg_arg(self) -> String {
        if self.den == 1 {
            self.num.to_string()
        } else {
            format!("{}/{}", self.num, self.den)
        }
    }
}

impl std::str::FromStr for Fps {
    type Err = ReelError;

    /// Parse `24` or `30000/1001`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || ReelError::validation(format!("invalid frame rate '{s}'"));
        let (num, den) = match s.trim().split_once('/') {
            Some((n, d)) => (n.trim(), d.trim()),
            None => (s.trim(), "1"),
        };
        let num = num.parse().map_err(|_| bad())?;
        let den = den.parse().map_err(|_| bad())?;
        Self::new(num, den)
    }
}

impl Default for Fps {
    fn default() -> Self {
        Self { num: 25, den: 1 }
    }
}

/// Pixel dimensions of an image or video frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Scale to `width`, preserving aspect ratio. Neither side collapses to zero.
    pub fn fit_width(self, width: u32) -> Self {
        let width = width.max(1);
        if self.width == 0 || self.height == 0 {
            return Self::new(width, 1);
        }
        let aspect = f64::from(self.width) / f64::from(self.height);
        let height = (f64::from(width) / aspect) as u32;
        Self::new(width, height.max(1))
    }

    /// Scale to `height`, preserving aspect ratio. Neither side collapses to zero.
    pub fn fit_height(self, height: u32) -> Self {
        let height = height.max(1);
        if self.width == 0 || self.height == 0 {
            return Self::new(1, height);
        }
        let aspect = f64::from(self.width) / f64::from(self.height);
        let width = (f64::from(height) * aspect) as u32;
        Self::new(width.max(1), height)
    }

    /// Half size on both axes, clamped to at least one pixel.
    pub fn halved(self) -> Self {
        Self::new((self.width / 2).max(1), (self.height / 2).max(1))
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
