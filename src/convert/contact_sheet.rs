use std::path::PathBuf;

use image::imageops::FilterType;
use image::{DynamicImage, Rgb, RgbImage};

use crate::config::ToolConfig;
use crate::convert::image::{open_image, save_image};
use crate::convert::parent_dir;
use crate::foundation::core::Size;
use crate::foundation::error::{ReelError, ReelResult};

pub const CONTACT_SHEET_NAME: &str = "contact_sheet.jpg";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContactSheetOpts {
    pub columns: u32,
    /// Gap between cells and around the border, in pixels.
    pub padding: u32,
    pub background: [u8; 3],
    /// Output path; defaults to `contact_sheet.jpg` next to the first input.
    pub output: Option<PathBuf>,
}

impl Default for ContactSheetOpts {
    fn default() -> Self {
        Self {
            columns: 2,
            padding: 10,
            background: [0, 0, 0],
            output: None,
        }
    }
}

/// Placement of every image on the sheet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SheetLayout {
    pub canvas: Size,
    /// Cell height shared by every image.
    pub row_height: u32,
    pub column_width: u32,
    /// `(x, y, scaled size)` per image, in input order.
    pub cells: Vec<(u32, u32, Size)>,
}

/// Scale every image to the tallest height and lay them out row-major.
pub fn sheet_layout(sizes: &[Size], columns: u32, padding: u32) -> SheetLayout {
    let columns = columns.max(1);
    let row_height = sizes.iter().map(|s| s.height).max().unwrap_or(1).max(1);
    let scaled: Vec<Size> = sizes.iter().map(|s| s.fit_height(row_height)).collect();
    let column_width = scaled.iter().map(|s| s.width).max().unwrap_or(1);

    let count = scaled.len() as u32;
    let rows = count.div_ceil(columns);
    let canvas = Size::new(
        column_width * columns + padding * (columns + 1),
        row_height * rows + padding * (rows + 1),
    );

    let cells = scaled
        .into_iter()
        .enumerate()
        .map(|(i, size)| {
            let (col, row) = (i as u32 % columns, i as u32 / columns);
            let x = padding + col * (column_width + padding);
            let y = padding + row * (row_height + padding) + (row_height - size.height) / 2;
            (x, y, size)
        })
        .collect();

    SheetLayout {
        canvas,
        row_height,
        column_width,
        cells,
    }
}

/// Tile images into one JPEG. Unreadable inputs are skipped with a warning.
pub fn contact_sheet(
    cfg: &ToolConfig,
    paths: &[PathBuf],
    opts: &ContactSheetOpts,
) -> ReelResult<PathBuf> {
    let first = paths
        .first()
        .ok_or_else(|| ReelError::validation("contact sheet needs at least one image"))?;

    let mut images: Vec<DynamicImage> = Vec::with_capacity(paths.len());
    for path in paths {
        match open_image(path) {
            Ok(img) => images.push(img),
            Err(err) => tracing::warn!(path = %path.display(), error = %err, "skipping image"),
        }
    }
    if images.is_empty() {
        return Err(ReelError::not_found("no readable images for contact sheet"));
    }

    let sizes: Vec<Size> = images
        .iter()
        .map(|i| Size::new(i.width(), i.height()))
        .collect();
    let layout = sheet_layout(&sizes, opts.columns, opts.padding);
    tracing::info!(
        images = images.len(),
        canvas = %layout.canvas,
        "building contact sheet"
    );

    let mut canvas = RgbImage::from_pixel(
        layout.canvas.width,
        layout.canvas.height,
        Rgb(opts.background),
    );
    for (img, &(x, y, size)) in images.iter().zip(&layout.cells) {
        let tile = img
            .resize_exact(size.width, size.height, FilterType::Lanczos3)
            .to_rgb8();
        image::imageops::overlay(&mut canvas, &tile, i64::from(x), i64::from(y));
    }

    let out = opts
        .output
        .clone()
        .unwrap_or_else(|| parent_dir(first).join(CONTACT_SHEET_NAME));
    save_image(&DynamicImage::ImageRgb8(canvas), &out, cfg.jpeg_quality)?;
    tracing::info!(out = %out.display(), "wrote contact sheet");
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/convert/contact_sheet.rs"]
mod tests;
