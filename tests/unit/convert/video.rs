use super::*;

fn strings(args: &[OsString]) -> Vec<String> {
    args.iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect()
}

fn value_after(args: &[String], flag: &str) -> String {
    let i = args.iter().position(|a| a == flag).unwrap();
    args[i + 1].clone()
}

#[test]
fn jpeg_quality_maps_onto_qscale_range() {
    assert_eq!(jpeg_qscale(100), 2);
    assert_eq!(jpeg_qscale(1), 31);
    assert_eq!(jpeg_qscale(90), 4);
    assert_eq!(jpeg_qscale(50), 16);
    assert_eq!(jpeg_qscale(0), 31);
}

#[test]
fn sequence_args_start_at_first_frame() {
    let dir = tempfile::tempdir().unwrap();
    for n in 10..=15 {
        std::fs::write(dir.path().join(format!("shot.{n:04}.png")), b"").unwrap();
    }
    let seq = sequence::resolve(dir.path().join("shot.0013.png")).unwrap();
    let out = dir.path().join("shot.mp4");
    let args = strings(&sequence_args(
        &ToolConfig::default(),
        &seq,
        Fps::whole(24).unwrap(),
        &out,
    ));

    assert_eq!(value_after(&args, "-framerate"), "24");
    assert_eq!(value_after(&args, "-start_number"), "10");
    assert!(value_after(&args, "-i").ends_with("shot.%04d.png"));
    assert_eq!(value_after(&args, "-c:v"), "libx264");
    assert_eq!(value_after(&args, "-pix_fmt"), "yuv420p");
    assert_eq!(value_after(&args, "-crf"), "18");
    assert_eq!(args.last().unwrap(), &out.to_string_lossy().into_owned());
}

#[test]
fn frames_args_only_set_quality_for_jpeg() {
    let png = strings(&frames_args(
        Path::new("clip.mp4"),
        FrameFormat::Png,
        Path::new("clip/clip_%04d.png"),
    ));
    assert!(!png.iter().any(|a| a == "-q:v"));

    let jpg = strings(&frames_args(
        Path::new("clip.mp4"),
        FrameFormat::Jpg { quality: 100 },
        Path::new("clip/clip_%04d.jpg"),
    ));
    assert_eq!(value_after(&jpg, "-q:v"), "2");
}

#[test]
fn resize_args_keep_even_height_and_audio() {
    let args = strings(&resize_video_args(
        &ToolConfig::default(),
        Path::new("in.mov"),
        640,
        Path::new("in_resized_640px.mov"),
    ));
    assert_eq!(value_after(&args, "-vf"), "scale=640:-2");
    assert_eq!(value_after(&args, "-c:a"), "copy");
}

#[test]
fn missing_inputs_are_not_found() {
    let cfg = ToolConfig::default();
    let err = video_to_frames(&cfg, Path::new("/nonexistent/a.mp4"), FrameFormat::Png).unwrap_err();
    assert_eq!(err.kind(), crate::foundation::error::ErrorKind::NotFound);
    let err = resize_video(&cfg, Path::new("/nonexistent/a.mp4"), 320).unwrap_err();
    assert_eq!(err.kind(), crate::foundation::error::ErrorKind::NotFound);
}

#[test]
fn gapped_sequence_encodes_every_present_frame() {
    let dir = tempfile::tempdir().unwrap();
    for n in [1, 2, 5] {
        image::RgbImage::from_pixel(6, 4, image::Rgb([n as u8 * 40, 0, 0]))
            .save(dir.path().join(format!("shot.{n:04}.png")))
            .unwrap();
    }
    let seq = sequence::resolve(dir.path().join("shot.0001.png")).unwrap();
    assert_eq!(seq.missing_frames(), [3, 4]);

    let mut sink = crate::encode::sink::InMemorySink::new();
    let written = encode_present_frames(&seq, &mut sink, Fps::whole(24).unwrap()).unwrap();

    assert_eq!(written, 3);
    let numbers: Vec<u64> = sink.frames().iter().map(|(n, _)| *n).collect();
    assert_eq!(numbers, [1, 2, 5]);
    assert!(sink.ended());
}

#[test]
fn frame_folders_are_kept_apart_per_format() {
    let video = Path::new("renders/clip.mp4");
    assert_eq!(
        frames_dir(video, FrameFormat::Png).unwrap(),
        Path::new("renders/clip_png_sequence")
    );
    assert_eq!(
        frames_dir(video, FrameFormat::Jpg { quality: 90 }).unwrap(),
        Path::new("renders/clip_jpg_sequence")
    );
}
