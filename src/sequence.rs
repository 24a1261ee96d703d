//! Image sequence detection.
//!
//! A seed such as `/renders/shot.0013.exr` is split around its frame token into a literal
//! prefix (`shot.`), a fixed-width digit run (`0013`) and a literal suffix (`.exr`). The
//! directory is then scanned for siblings with the same prefix, the same suffix and exactly the
//! same number of digits, so `shot_0100.exr` never absorbs `shot_10000.exr`.
//!
//! Gaps in the numbering are allowed and reported by [`Sequence::missing_frames`], never
//! rejected.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::foundation::error::{ReelError, ReelResult};

fn escape_percent(text: &str) -> String {
    text.replace('%', "%%")
}

// Last digit run followed by a literal dot, with no digit anywhere after that dot.
static FRAME_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\.[^\d]*$").expect("frame token regex is valid"));

/// Name split around its frame number.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameToken<'a> {
    pub prefix: &'a str,
    pub digits: &'a str,
    pub suffix: &'a str,
}

impl FrameToken<'_> {
    pub fn padding(&self) -> usize {
        self.digits.len()
    }
}

/// Locate the frame number in a file name, e.g. `shot_v02.0013.exr` -> (`shot_v02.`, `0013`,
/// `.exr`).
pub fn split_frame_token(file_name: &str) -> Option<FrameToken<'_>> {
    let caps = FRAME_TOKEN.captures(file_name)?;
    let digits = caps.get(1)?;
    Some(FrameToken {
        prefix: &file_name[..digits.start()],
        digits: digits.as_str(),
        suffix: &file_name[digits.end()..],
    })
}

/// One member of a [`Sequence`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SequenceFrame {
    pub number: u64,
    pub path: PathBuf,
}

/// Numbered files sharing a prefix, suffix and digit width, sorted by frame number.
#[derive(Clone, Debug)]
pub struct Sequence {
    directory: PathBuf,
    prefix: String,
    suffix: String,
    padding: usize,
    frames: Vec<SequenceFrame>,
}

impl Sequence {
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn padding(&self) -> usize {
        self.padding
    }

    pub fn frames(&self) -> &[SequenceFrame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Lowest frame number in the sequence.
    pub fn start_frame(&self) -> u64 {
        self.frames.first().map(|f| f.number).unwrap_or(0)
    }

    /// Highest frame number in the sequence.
    pub fn end_frame(&self) -> u64 {
        self.frames.last().map(|f| f.number).unwrap_or(0)
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.frames.iter().map(|f| f.path.as_path())
    }

    /// printf-style file name pattern, e.g. `shot.%04d.exr`. Literal `%` is written as `%%`.
    pub fn pattern(&self) -> String {
        format!(
            "{}%0{}d{}",
            escape_percent(&self.prefix),
            self.padding,
            escape_percent(&self.suffix)
        )
    }

    /// [`Sequence::pattern`] joined onto the sequence directory, for an encoder's image2 input.
    pub fn pattern_path(&self) -> PathBuf {
        let directory = match self.directory.to_str() {
            Some(dir) if dir.contains('%') => PathBuf::from(escape_percent(dir)),
            _ => self.directory.clone(),
        };
        directory.join(self.pattern())
    }

    /// Path a frame number would have in this sequence, present or not.
    pub fn frame_path(&self, number: u64) -> PathBuf {
        self.directory.join(format!(
            "{}{:0width$}{}",
            self.prefix,
            number,
            self.suffix,
            width = self.padding
        ))
    }

    /// Prefix without trailing separators, used to name derived outputs.
    pub fn base_name(&self) -> String {
        let base = self.prefix.trim_end_matches(['.', '_', '-']);
        if base.is_empty() {
            "output".to_string()
        } else {
            base.to_string()
        }
    }

    /// Frame numbers absent between the first and last frame.
    pub fn missing_frames(&self) -> Vec<u64> {
        let mut missing = Vec::new();
        for pair in self.frames.windows(2) {
            missing.extend(pair[0].number + 1..pair[1].number);
        }
        missing
    }
}

/// Resolve the sequence that `seed` belongs to.
pub fn resolve(seed: impl AsRef<Path>) -> ReelResult<Sequence> {
    let seed = seed.as_ref();
    if !seed.exists() {
        return Err(ReelError::not_found(format!(
            "'{}' does not exist",
            seed.display()
        )));
    }

    let file_name = seed
        .file_name()
        .and_then(|s| s.to_str())
        .ok_or_else(|| ReelError::not_found(format!("'{}' has no file name", seed.display())))?;
    let token = split_frame_token(file_name).ok_or_else(|| {
        ReelError::not_found(format!("no frame number found in '{file_name}'"))
    })?;

    let directory = match seed.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let frames = scan_siblings(&directory, token.prefix, token.suffix, token.padding())?;
    if frames.is_empty() {
        return Err(ReelError::not_found(format!(
            "no files matching '{}{}{}' in '{}'",
            token.prefix,
            "#".repeat(token.padding()),
            token.suffix,
            directory.display()
        )));
    }

    let seq = Sequence {
        directory,
        prefix: token.prefix.to_string(),
        suffix: token.suffix.to_string(),
        padding: token.padding(),
        frames,
    };
    tracing::debug!(
        pattern = %seq.pattern_path().display(),
        frames = seq.len(),
        start = seq.start_frame(),
        "resolved sequence"
    );
    Ok(seq)
}

fn scan_siblings(
    directory: &Path,
    prefix: &str,
    suffix: &str,
    padding: usize,
) -> ReelResult<Vec<SequenceFrame>> {
    let dir = directory
        .to_str()
        .ok_or_else(|| ReelError::not_found("sequence directory is not valid UTF-8"))?;
    let pattern = format!(
        "{}{}{}{}{}",
        glob::Pattern::escape(dir),
        std::path::MAIN_SEPARATOR,
        glob::Pattern::escape(prefix),
        "[0-9]".repeat(padding),
        glob::Pattern::escape(suffix)
    );
    let opts = glob::MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };

    let entries = glob::glob_with(&pattern, opts)
        .map_err(|e| ReelError::not_found(format!("invalid sequence pattern '{pattern}': {e}")))?;

    let mut frames = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| {
            ReelError::not_found(format!("cannot list '{}': {e}", directory.display()))
        })?;
        if !path.is_file() {
            continue;
        }
        let Some(number) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_prefix(prefix))
            .and_then(|n| n.strip_suffix(suffix))
            .filter(|digits| digits.len() == padding)
            .and_then(|digits| digits.parse::<u64>().ok())
        else {
            continue;
        };
        frames.push(SequenceFrame { number, path });
    }

    frames.sort_by_key(|f| f.number);
    Ok(frames)
}

#[cfg(test)]
#[path = "../tests/unit/sequence.rs"]
mod tests;
