use super::*;

fn write_png(dir: &Path, name: &str, w: u32, h: u32) -> PathBuf {
    let path = dir.join(name);
    let img = image::RgbImage::from_pixel(w, h, image::Rgb([200, 100, 50]));
    img.save(&path).unwrap();
    path
}

fn dims(path: &Path) -> (u32, u32) {
    image::image_dimensions(path).unwrap()
}

#[test]
fn resize_preserves_aspect_and_names_output() {
    let dir = tempfile::tempdir().unwrap();
    let src = write_png(dir.path(), "plate.png", 400, 200);
    let out = resize_image(&ToolConfig::default(), &src, 100).unwrap();
    assert_eq!(out, dir.path().join("plate_resized_100px.png"));
    assert_eq!(dims(&out), (100, 50));
}

#[test]
fn second_resize_to_same_width_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let src = write_png(dir.path(), "plate.png", 400, 200);
    let cfg = ToolConfig::default();
    let first = resize_image(&cfg, &src, 100).unwrap();
    let second = resize_image(&cfg, &first, 100).unwrap();
    assert_eq!(first, second);
    assert!(!dir.path().join("plate_resized_100px_resized_100px.png").exists());
}

#[test]
fn extreme_aspect_never_reaches_zero() {
    let dir = tempfile::tempdir().unwrap();
    let src = write_png(dir.path(), "strip.png", 300, 2);
    let out = resize_image(&ToolConfig::default(), &src, 1).unwrap();
    assert_eq!(dims(&out), (1, 1));

    let tiny = write_png(dir.path(), "dot.png", 1, 1);
    let out = half_size_image(&ToolConfig::default(), &tiny).unwrap();
    assert_eq!(dims(&out), (1, 1));
}

#[test]
fn half_size_writes_suffix() {
    let dir = tempfile::tempdir().unwrap();
    let src = write_png(dir.path(), "shot.png", 31, 17);
    let out = half_size_image(&ToolConfig::default(), &src).unwrap();
    assert_eq!(out, dir.path().join("shot_half.png"));
    assert_eq!(dims(&out), (15, 8));
}

#[test]
fn jpeg_output_accepts_alpha_sources() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.jpg");
    let img = DynamicImage::ImageRgba8(image::RgbaImage::new(4, 4));
    save_image(&img, &path, 90).unwrap();
    assert_eq!(dims(&path), (4, 4));
}
