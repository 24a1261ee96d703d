//! Video contact sheet: the opening seconds of several videos tiled into one MP4.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Command;

use crate::config::ToolConfig;
use crate::convert::parent_dir;
use crate::encode::ffmpeg::{ensure_parent_dir, run_tool};
use crate::foundation::error::{ReelError, ReelResult};
use crate::probe::{ProbeInfo, probe_media};

pub const VIDEO_GRID_NAME: &str = "video_contact_sheet.mp4";

#[derive(Clone, Debug, PartialEq)]
pub struct GridOpts {
    pub columns: u32,
    /// Height of every cell in pixels.
    pub cell_height: u32,
    /// Requested snippet length; capped by the shortest input.
    pub snippet_secs: f64,
    /// Output path; defaults to `video_contact_sheet.mp4` next to the first input.
    pub output: Option<PathBuf>,
}

impl Default for GridOpts {
    fn default() -> Self {
        Self {
            columns: 2,
            cell_height: 360,
            snippet_secs: 5.0,
            output: None,
        }
    }
}

/// Uniform cell geometry and timing derived from the probed inputs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridPlan {
    pub cell_width: u32,
    pub cell_height: u32,
    pub snippet_secs: f64,
    pub columns: u32,
    pub rows: u32,
}

/// Cell width is the widest input scaled to `cell_height`, rounded up to even.
pub fn plan_grid(infos: &[ProbeInfo], opts: &GridOpts) -> ReelResult<GridPlan> {
    if infos.is_empty() {
        return Err(ReelError::validation("video grid needs at least one valid video"));
    }
    let shortest = infos
        .iter()
        .map(|i| i.duration_sec)
        .fold(f64::INFINITY, f64::min);
    let snippet_secs = opts.snippet_secs.min(shortest);
    if snippet_secs.is_nan() || snippet_secs <= 0.0 {
        return Err(ReelError::validation(format!(
            "snippet duration must be positive, got {snippet_secs}"
        )));
    }

    let cell_height = opts.cell_height.max(2);
    let widest = infos
        .iter()
        .map(|i| {
            (f64::from(i.width) * f64::from(cell_height) / f64::from(i.height)) as u32
        })
        .max()
        .unwrap_or(2);
    let cell_width = (widest + widest % 2).max(2);

    let columns = opts.columns.max(1);
    let rows = (infos.len() as u32).div_ceil(columns);
    Ok(GridPlan {
        cell_width,
        cell_height,
        snippet_secs,
        columns,
        rows,
    })
}

/// `-filter_complex` graph for `count` inputs laid out per `plan`. The output pad is `[out]`.
pub fn grid_filter(count: usize, plan: &GridPlan) -> String {
    let (w, h, d) = (plan.cell_width, plan.cell_height, plan.snippet_secs);
    let mut parts = Vec::new();

    for i in 0..count {
        parts.push(format!(
            "[{i}:v]trim=start=0:duration={d},setpts=PTS-STARTPTS,\
             scale={w}:{h}:force_original_aspect_ratio=decrease,setsar=1,\
             pad={w}:{h}:(ow-iw)/2:(oh-ih)/2[v{i}]"
        ));
    }

    let mut next = 0usize;
    let mut row_labels = Vec::new();
    for r in 0..plan.rows {
        let mut cells = Vec::new();
        for c in 0..plan.columns {
            if next < count {
                cells.push(format!("[v{next}]"));
                next += 1;
            } else {
                parts.push(format!("color=black:s={w}x{h}:d={d}[fill{r}_{c}]"));
                cells.push(format!("[fill{r}_{c}]"));
            }
        }
        if cells.len() == 1 {
            parts.push(format!("{}split=1[h{r}]", cells[0]));
        } else {
            parts.push(format!(
                "{}hstack=inputs={}:shortest=1[h{r}]",
                cells.concat(),
                cells.len()
            ));
        }
        row_labels.push(format!("[h{r}]"));
    }

    if row_labels.len() == 1 {
        parts.push(format!("{}split=1[out]", row_labels[0]));
    } else {
        parts.push(format!(
            "{}vstack=inputs={}[out]",
            row_labels.concat(),
            row_labels.len()
        ));
    }
    parts.join(";")
}

/// Tile the first seconds of every video into one grid video.
///
/// Inputs that cannot be probed, or report zero size or duration, are skipped with a warning.
pub fn video_grid(cfg: &ToolConfig, paths: &[PathBuf], opts: &GridOpts) -> ReelResult<PathBuf> {
    let first = paths
        .first()
        .ok_or_else(|| ReelError::validation("video grid needs at least one video"))?;

    let mut valid: Vec<(&PathBuf, ProbeInfo)> = Vec::new();
    for path in paths {
        match probe_media(cfg, path) {
            Ok(info) => valid.push((path, info)),
            Err(err) => tracing::warn!(path = %path.display(), error = %err, "skipping video"),
        }
    }
    let infos: Vec<ProbeInfo> = valid.iter().map(|(_, i)| *i).collect();
    let plan = plan_grid(&infos, opts)?;
    let filter = grid_filter(valid.len(), &plan);

    let out = opts
        .output
        .clone()
        .unwrap_or_else(|| parent_dir(first).join(VIDEO_GRID_NAME));
    ensure_parent_dir(&out)?;

    let enc = &cfg.encode;
    let mut args: Vec<OsString> = vec!["-y".into(), "-loglevel".into(), "error".into()];
    for (path, _) in &valid {
        args.push("-i".into());
        args.push(path.as_os_str().to_owned());
    }
    args.push("-filter_complex".into());
    args.push(filter.into());
    for a in ["-map", "[out]", "-an", "-c:v"] {
        args.push(a.into());
    }
    args.push(enc.codec.as_str().into());
    args.push("-pix_fmt".into());
    args.push(enc.pix_fmt.as_str().into());
    args.push("-crf".into());
    args.push(enc.crf.to_string().into());
    args.push("-preset".into());
    args.push(enc.preset.as_str().into());
    args.push(out.as_os_str().to_owned());

    tracing::info!(
        videos = valid.len(),
        skipped = paths.len() - valid.len(),
        cell = %format!("{}x{}", plan.cell_width, plan.cell_height),
        snippet_secs = plan.snippet_secs,
        "building video grid"
    );
    run_tool("ffmpeg", Command::new(&cfg.ffmpeg).args(&args))?;
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/convert/grid.rs"]
mod tests;
