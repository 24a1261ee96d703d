//! AI upscaling through an external `realesrgan-ncnn-vulkan`-style executable.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::batch::{BatchReport, run_batch};
use crate::config::ToolConfig;
use crate::convert::{parent_dir, require_file, stem_of};
use crate::encode::ffmpeg::run_tool;
use crate::foundation::error::{ReelError, ReelResult};

pub const DEFAULT_MODEL: &str = "realesrgan-x4plus";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpscaleOpts {
    /// Model name as listed by [`list_upscale_models`].
    pub model: String,
    pub scale: u32,
}

impl Default for UpscaleOpts {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            scale: 4,
        }
    }
}

/// Names of the `*.bin` model files in `dir`, sorted.
pub fn list_upscale_models(dir: &Path) -> ReelResult<Vec<String>> {
    let entries = std::fs::read_dir(dir).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ReelError::not_found(format!(
            "models directory '{}' does not exist",
            dir.display()
        )),
        _ => ReelError::io(dir, e),
    })?;

    let mut models = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| ReelError::io(dir, e))?.path();
        if path.is_file()
            && path.extension().is_some_and(|e| e == "bin")
            && let Some(stem) = path.file_stem()
        {
            models.push(stem.to_string_lossy().into_owned());
        }
    }
    models.sort();
    Ok(models)
}

/// `<stem>_<model>_x<scale><ext>`. Extensions the upscaler cannot write fall back to `.png`.
pub fn upscaled_name(input: &Path, opts: &UpscaleOpts) -> ReelResult<String> {
    let stem = stem_of(input)?;
    let ext = input
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .filter(|e| matches!(e.as_str(), "png" | "jpg" | "jpeg" | "webp"))
        .unwrap_or_else(|| "png".to_string());
    Ok(format!("{stem}_{}_x{}.{ext}", opts.model, opts.scale))
}

pub fn upscale_args(
    input: &Path,
    output: &Path,
    opts: &UpscaleOpts,
    models_dir: Option<&Path>,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "-i".into(),
        input.as_os_str().to_owned(),
        "-o".into(),
        output.as_os_str().to_owned(),
        "-n".into(),
        opts.model.as_str().into(),
        "-s".into(),
        opts.scale.to_string().into(),
    ];
    if let Some(dir) = models_dir {
        args.push("-m".into());
        args.push(dir.as_os_str().to_owned());
    }
    args
}

fn check_opts(cfg: &ToolConfig, opts: &UpscaleOpts) -> ReelResult<()> {
    if opts.scale < 2 {
        return Err(ReelError::validation(format!(
            "upscale factor must be at least 2, got {}",
            opts.scale
        )));
    }
    if opts.model.trim().is_empty() {
        return Err(ReelError::validation("upscale model name must not be empty"));
    }
    if let Some(dir) = cfg.upscaler_models.as_deref().filter(|d| d.is_dir())
        && !dir.join(format!("{}.bin", opts.model)).is_file()
    {
        return Err(ReelError::not_found(format!(
            "model '{}' not found in '{}'",
            opts.model,
            dir.display()
        )));
    }
    Ok(())
}

fn upscale_one(cfg: &ToolConfig, input: &Path, opts: &UpscaleOpts) -> ReelResult<PathBuf> {
    require_file(input)?;
    let name = upscaled_name(input, opts)?;
    let dir = parent_dir(input);
    let out = dir.join(&name);

    // Scratch output must share the target's filesystem for the rename.
    let scratch = tempfile::Builder::new()
        .prefix(".reelbox-upscale-")
        .tempdir_in(&dir)
        .map_err(|e| ReelError::io(&dir, e))?;
    let tmp_out = scratch.path().join(&name);
    let models_dir = cfg.upscaler_models.as_deref().filter(|d| d.is_dir());

    tracing::info!(
        input = %input.display(),
        model = %opts.model,
        scale = opts.scale,
        "upscaling image"
    );
    run_tool(
        "upscaler",
        Command::new(&cfg.upscaler).args(upscale_args(input, &tmp_out, opts, models_dir)),
    )?;
    if !tmp_out.is_file() {
        return Err(ReelError::external(
            "upscaler",
            "0",
            format!("no output written for '{}'", input.display()),
        ));
    }
    std::fs::rename(&tmp_out, &out).map_err(|e| ReelError::io(&out, e))?;
    Ok(out)
}

/// Upscale every image, one upscaler process each. Failures are reported per input.
pub fn upscale_images(cfg: &ToolConfig, paths: &[PathBuf], opts: &UpscaleOpts) -> BatchReport {
    run_batch("upscale", paths, |input| {
        check_opts(cfg, opts)?;
        upscale_one(cfg, input, opts).map(|out| vec![out])
    })
}

#[cfg(test)]
#[path = "../../tests/unit/convert/upscale.rs"]
mod tests;
