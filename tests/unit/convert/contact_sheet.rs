use super::*;

#[test]
fn layout_matches_grid_formula() {
    let sizes = [Size::new(100, 50), Size::new(40, 100), Size::new(200, 100)];
    let layout = sheet_layout(&sizes, 2, 10);

    assert_eq!(layout.row_height, 100);
    // 100x50 scales to 200x100, the widest cell.
    assert_eq!(layout.column_width, 200);
    assert_eq!(layout.canvas, Size::new(200 * 2 + 10 * 3, 100 * 2 + 10 * 3));

    assert_eq!(layout.cells[0], (10, 10, Size::new(200, 100)));
    assert_eq!(layout.cells[1], (220, 10, Size::new(40, 100)));
    assert_eq!(layout.cells[2], (10, 120, Size::new(200, 100)));
}

#[test]
fn single_column_stacks_vertically() {
    let layout = sheet_layout(&[Size::new(10, 10), Size::new(10, 10)], 1, 0);
    assert_eq!(layout.canvas, Size::new(10, 20));
    assert_eq!(layout.cells[1].1, 10);
}

#[test]
fn unreadable_images_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("a.png");
    image::RgbImage::from_pixel(8, 4, Rgb([255, 0, 0]))
        .save(&good)
        .unwrap();
    let missing = dir.path().join("missing.png");

    let out = contact_sheet(
        &ToolConfig::default(),
        &[good, missing],
        &ContactSheetOpts::default(),
    )
    .unwrap();
    assert_eq!(out, dir.path().join(CONTACT_SHEET_NAME));
    assert_eq!(image::image_dimensions(&out).unwrap(), (8 * 2 + 30, 4 + 20));
}

#[test]
fn nothing_readable_is_an_error() {
    let err = contact_sheet(
        &ToolConfig::default(),
        &[PathBuf::from("/nonexistent/a.png")],
        &ContactSheetOpts::default(),
    )
    .unwrap_err();
    assert_eq!(err.kind(), crate::foundation::error::ErrorKind::NotFound);
    assert!(contact_sheet(&ToolConfig::default(), &[], &ContactSheetOpts::default()).is_err());
}
