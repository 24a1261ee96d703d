use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};

use crate::config::ToolConfig;
use crate::convert::{require_file, sibling_with_suffix};
use crate::foundation::core::Size;
use crate::foundation::error::{ReelError, ReelResult};

pub(crate) fn open_image(path: &Path) -> ReelResult<DynamicImage> {
    image::open(path).map_err(|e| ReelError::decode(format!("decode '{}': {e}", path.display())))
}

/// Save `img`, picking the encoder from the extension. JPEG output is flattened to 8-bit RGB
/// and written at `jpeg_quality`.
pub(crate) fn save_image(img: &DynamicImage, path: &Path, jpeg_quality: u8) -> ReelResult<()> {
    let format = ImageFormat::from_path(path)
        .map_err(|e| ReelError::validation(format!("'{}': {e}", path.display())))?;
    let encode_err = |e: image::ImageError| match e {
        image::ImageError::IoError(io) => ReelError::io(path, io),
        other => ReelError::decode(format!("encode '{}': {other}", path.display())),
    };

    if format == ImageFormat::Jpeg {
        let file = File::create(path).map_err(|e| ReelError::io(path, e))?;
        let encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(BufWriter::new(file), jpeg_quality);
        return DynamicImage::ImageRgb8(img.to_rgb8())
            .write_with_encoder(encoder)
            .map_err(encode_err);
    }
    img.save_with_format(path, format).map_err(encode_err)
}

fn resize_to(img: &DynamicImage, size: Size) -> DynamicImage {
    img.resize_exact(size.width, size.height, FilterType::Lanczos3)
}

/// Resize to `width` keeping the aspect ratio; writes `<stem>_resized_<W>px<ext>`.
///
/// An image already `width` pixels wide is left alone and its own path is returned.
pub fn resize_image(cfg: &ToolConfig, path: &Path, width: u32) -> ReelResult<PathBuf> {
    require_file(path)?;
    if width == 0 {
        return Err(ReelError::validation("target width must be non-zero"));
    }
    let img = open_image(path)?;
    let size = Size::new(img.width(), img.height());
    if size.width == width {
        tracing::info!(path = %path.display(), width, "image already at target width");
        return Ok(path.to_path_buf());
    }

    let target = size.fit_width(width);
    let out = sibling_with_suffix(path, &format!("_resized_{width}px"))?;
    save_image(&resize_to(&img, target), &out, cfg.jpeg_quality)?;
    tracing::info!(from = %size, to = %target, out = %out.display(), "resized image");
    Ok(out)
}

/// Halve both dimensions (each at least one pixel); writes `<stem>_half<ext>`.
pub fn half_size_image(cfg: &ToolConfig, path: &Path) -> ReelResult<PathBuf> {
    require_file(path)?;
    let img = open_image(path)?;
    let size = Size::new(img.width(), img.height());
    let target = size.halved();
    let out = sibling_with_suffix(path, "_half")?;
    save_image(&resize_to(&img, target), &out, cfg.jpeg_quality)?;
    tracing::info!(from = %size, to = %target, out = %out.display(), "halved image");
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/convert/image.rs"]
mod tests;
