//! User-facing conversions.
//!
//! Each operation takes the resolved [`ToolConfig`](crate::config::ToolConfig) explicitly, works
//! on whole files and returns the path(s) it produced.

pub mod contact_sheet;
pub mod grid;
pub mod image;
pub mod upscale;
pub mod video;

use std::path::{Path, PathBuf};

use crate::foundation::error::{ReelError, ReelResult};

pub use contact_sheet::{ContactSheetOpts, contact_sheet};
pub use grid::{GridOpts, video_grid};
pub use self::image::{half_size_image, resize_image};
pub use upscale::{UpscaleOpts, list_upscale_models, upscale_images};
pub use video::{
    ExrVideoOpts, FrameFormat, SequenceVideoOpts, exr_sequence_to_video, resize_video,
    sequence_to_video, video_to_frames,
};

/// File stem as UTF-8, lossy.
pub(crate) fn stem_of(path: &Path) -> ReelResult<String> {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ReelError::validation(format!("'{}' has no file name", path.display())))
}

/// Directory containing `path`, `.` for bare file names.
pub(crate) fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// `<dir>/<stem><suffix>.<ext>` next to `path`, keeping its extension.
pub(crate) fn sibling_with_suffix(path: &Path, suffix: &str) -> ReelResult<PathBuf> {
    let stem = stem_of(path)?;
    let name = match path.extension() {
        Some(ext) => format!("{stem}{suffix}.{}", ext.to_string_lossy()),
        None => format!("{stem}{suffix}"),
    };
    Ok(parent_dir(path).join(name))
}

pub(crate) fn require_file(path: &Path) -> ReelResult<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ReelError::not_found(format!(
            "'{}' does not exist",
            path.display()
        )))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/convert/helpers.rs"]
mod tests;
