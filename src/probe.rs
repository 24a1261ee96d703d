//! Video stream probing through `ffprobe`.

use std::path::Path;
use std::process::Command;

use crate::config::ToolConfig;
use crate::encode::ffmpeg::run_tool;
use crate::foundation::core::{Fps, Size};
use crate::foundation::error::{ReelError, ReelResult};

/// First video stream of a media file.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProbeInfo {
    pub width: u32,
    pub height: u32,
    pub duration_sec: f64,
    pub fps: Option<Fps>,
}

impl ProbeInfo {
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Arguments for a `key=value` dump of the first video stream.
pub fn probe_args(path: &Path) -> Vec<std::ffi::OsString> {
    let mut args: Vec<std::ffi::OsString> = [
        "-v",
        "error",
        "-select_streams",
        "v:0",
        "-show_entries",
        "stream=width,height,duration,r_frame_rate:format=duration",
        "-of",
        "default=noprint_wrappers=1",
    ]
    .into_iter()
    .map(Into::into)
    .collect();
    args.push(path.as_os_str().to_owned());
    args
}

/// Probe `path` with the configured `ffprobe`.
pub fn probe_media(cfg: &ToolConfig, path: &Path) -> ReelResult<ProbeInfo> {
    if !path.is_file() {
        return Err(ReelError::not_found(format!(
            "'{}' does not exist",
            path.display()
        )));
    }
    let output = run_tool("ffprobe", Command::new(&cfg.ffprobe).args(probe_args(path)))?;
    let text = String::from_utf8_lossy(&output.stdout);
    let info = parse_probe_output(&text)
        .map_err(|e| ReelError::decode(format!("probe '{}': {e}", path.display())))?;
    tracing::debug!(
        path = %path.display(),
        size = %info.size(),
        duration = info.duration_sec,
        "probed media"
    );
    Ok(info)
}

/// Parse `ffprobe -of default=noprint_wrappers=1` output.
///
/// Width, height and duration must all be present and positive. The stream duration wins over
/// the container duration when both are printed.
pub fn parse_probe_output(text: &str) -> ReelResult<ProbeInfo> {
    let mut width = None;
    let mut height = None;
    let mut duration = None;
    let mut fps = None;

    for line in text.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim();
        match key.trim() {
            "width" => width = width.or_else(|| value.parse::<u32>().ok().filter(|&w| w > 0)),
            "height" => height = height.or_else(|| value.parse::<u32>().ok().filter(|&h| h > 0)),
            "duration" => {
                duration = duration.or_else(|| {
                    value
                        .parse::<f64>()
                        .ok()
                        .filter(|d| d.is_finite() && *d > 0.0)
                })
            }
            "r_frame_rate" => fps = fps.or_else(|| parse_rate(value)),
            _ => {}
        }
    }

    let missing = |what: &str| ReelError::decode(format!("missing or zero {what}"));
    Ok(ProbeInfo {
        width: width.ok_or_else(|| missing("width"))?,
        height: height.ok_or_else(|| missing("height"))?,
        duration_sec: duration.ok_or_else(|| missing("duration"))?,
        fps,
    })
}

fn parse_rate(value: &str) -> Option<Fps> {
    let (num, den) = value.split_once('/').unwrap_or((value, "1"));
    Fps::new(num.parse().ok()?, den.parse().ok()?).ok()
}

#[cfg(test)]
#[path = "../tests/unit/probe.rs"]
mod tests;
