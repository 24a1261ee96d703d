//! External tool locations and conversion defaults.
//!
//! A [`ToolConfig`] is resolved once at process start and handed to every operation that shells
//! out. Resolution order for each executable:
//!
//! 1. environment override (`REELBOX_FFMPEG`, `REELBOX_FFPROBE`, `REELBOX_UPSCALER`)
//! 2. explicit path from the JSON config file (`--config` or `REELBOX_CONFIG`)
//! 3. the first existing known install location
//! 4. the bare program name, left for `PATH` lookup at spawn time

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};

use crate::foundation::error::{ReelError, ReelResult};

pub const CONFIG_ENV: &str = "REELBOX_CONFIG";
pub const FFMPEG_ENV: &str = "REELBOX_FFMPEG";
pub const FFPROBE_ENV: &str = "REELBOX_FFPROBE";
pub const UPSCALER_ENV: &str = "REELBOX_UPSCALER";
pub const UPSCALER_MODELS_ENV: &str = "REELBOX_UPSCALER_MODELS";

const FFMPEG_NAME: &str = "ffmpeg";
const FFPROBE_NAME: &str = "ffprobe";
const UPSCALER_NAME: &str = "realesrgan-ncnn-vulkan";

/// Named colorspaces used when a conversion needs a color transform.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorDefaults {
    pub source: String,
    pub target: String,
}

impl Default for ColorDefaults {
    fn default() -> Self {
        Self {
            source: "ACEScg".to_string(),
            target: "Output - sRGB".to_string(),
        }
    }
}

/// x264 settings shared by every video-producing operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeDefaults {
    pub codec: String,
    pub pix_fmt: String,
    pub crf: u8,
    pub preset: String,
}

impl Default for EncodeDefaults {
    fn default() -> Self {
        Self {
            codec: "libx264".to_string(),
            pix_fmt: "yuv420p".to_string(),
            crf: 18,
            preset: "medium".to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
    pub upscaler: PathBuf,
    /// Directory holding upscaler `*.bin`/`*.param` model pairs.
    pub upscaler_models: Option<PathBuf>,
    pub color: ColorDefaults,
    pub encode: EncodeDefaults,
    /// Frame rate for image sequences that carry no timing of their own.
    pub framerate: u32,
    pub jpeg_quality: u8,
    /// Case-insensitive marker identifying matte/ID channels during AOV splitting.
    pub matte_token: String,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from(FFMPEG_NAME),
            ffprobe: PathBuf::from(FFPROBE_NAME),
            upscaler: PathBuf::from(UPSCALER_NAME),
            upscaler_models: None,
            color: ColorDefaults::default(),
            encode: EncodeDefaults::default(),
            framerate: 25,
            jpeg_quality: 90,
            matte_token: "crypto".to_string(),
        }
    }
}

impl ToolConfig {
    /// Resolve configuration from the process environment.
    pub fn resolve(config_file: Option<&Path>) -> ReelResult<Self> {
        Self::resolve_with(config_file, |key| std::env::var_os(key))
    }

    /// Resolve configuration with an explicit environment lookup.
    pub fn resolve_with(
        config_file: Option<&Path>,
        env: impl Fn(&str) -> Option<OsString>,
    ) -> ReelResult<Self> {
        let file = config_file
            .map(Path::to_path_buf)
            .or_else(|| env(CONFIG_ENV).map(PathBuf::from));

        let mut cfg = match file {
            Some(path) => Self::from_json_file(&path)?,
            None => Self::default(),
        };

        cfg.ffmpeg = resolve_tool(&cfg.ffmpeg, FFMPEG_NAME, env(FFMPEG_ENV), &env);
        cfg.ffprobe = resolve_tool(&cfg.ffprobe, FFPROBE_NAME, env(FFPROBE_ENV), &env);
        cfg.upscaler = resolve_tool(&cfg.upscaler, UPSCALER_NAME, env(UPSCALER_ENV), &env);

        if let Some(models) = env(UPSCALER_MODELS_ENV) {
            cfg.upscaler_models = Some(PathBuf::from(models));
        }
        if cfg.upscaler_models.is_none() {
            cfg.upscaler_models = cfg
                .upscaler
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(|p| p.join("models"));
        }

        cfg.validate()?;
        tracing::debug!(
            ffmpeg = %cfg.ffmpeg.display(),
            ffprobe = %cfg.ffprobe.display(),
            upscaler = %cfg.upscaler.display(),
            "resolved tool configuration"
        );
        Ok(cfg)
    }

    pub fn from_json_file(path: &Path) -> ReelResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| ReelError::io(path, e))?;
        serde_json::from_str(&text).map_err(|e| {
            ReelError::validation(format!("invalid config file '{}': {e}", path.display()))
        })
    }

    pub fn validate(&self) -> ReelResult<()> {
        if self.framerate == 0 {
            return Err(ReelError::validation("framerate must be non-zero"));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ReelError::validation("jpeg_quality must be within 1..=100"));
        }
        if self.encode.crf > 51 {
            return Err(ReelError::validation("crf must be within 0..=51"));
        }
        if self.matte_token.trim().is_empty() {
            return Err(ReelError::validation("matte_token must not be empty"));
        }
        Ok(())
    }
}

fn resolve_tool(
    configured: &Path,
    default_name: &str,
    env_override: Option<OsString>,
    env: &impl Fn(&str) -> Option<OsString>,
) -> PathBuf {
    if let Some(p) = env_override {
        return PathBuf::from(p);
    }
    if configured != Path::new(default_name) {
        return configured.to_path_buf();
    }
    known_locations(default_name, env)
        .into_iter()
        .find(|p| p.is_file())
        .unwrap_or_else(|| PathBuf::from(default_name))
}

/// Install locations searched before falling back to `PATH`.
pub fn known_locations(
    program: &str,
    env: &impl Fn(&str) -> Option<OsString>,
) -> Vec<PathBuf> {
    let exe = format!("{program}{}", std::env::consts::EXE_SUFFIX);
    let mut out = Vec::new();

    if let Some(local) = env("LOCALAPPDATA") {
        let root = PathBuf::from(local).join("Programs").join("reelbox");
        match program {
            FFMPEG_NAME | FFPROBE_NAME => out.push(root.join("ffmpeg").join("bin").join(&exe)),
            UPSCALER_NAME => out.push(root.join("realesrgan").join(&exe)),
            _ => {}
        }
    }
    if let Some(home) = env("HOME") {
        out.push(PathBuf::from(home).join(".local").join("bin").join(&exe));
    }
    for dir in ["/opt/homebrew/bin", "/usr/local/bin", "/usr/bin"] {
        out.push(Path::new(dir).join(&exe));
    }
    out
}

/// Return `true` when `program -version` runs successfully.
pub fn tool_runs(program: &Path) -> bool {
    Command::new(program)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
