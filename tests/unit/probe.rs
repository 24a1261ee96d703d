use super::*;

#[test]
fn parses_stream_entries() {
    let text = "width=1920\nheight=1080\nr_frame_rate=30000/1001\nduration=12.512000\n";
    let info = parse_probe_output(text).unwrap();
    assert_eq!(info.size(), Size::new(1920, 1080));
    assert!((info.duration_sec - 12.512).abs() < 1e-9);
    assert_eq!(info.fps, Some(Fps::new(30000, 1001).unwrap()));
}

#[test]
fn container_duration_fills_missing_stream_duration() {
    let text = "width=640\nheight=360\nr_frame_rate=25/1\nduration=N/A\nduration=4.000000\n";
    let info = parse_probe_output(text).unwrap();
    assert_eq!(info.duration_sec, 4.0);
}

#[test]
fn zero_or_missing_fields_fail() {
    assert!(parse_probe_output("width=0\nheight=10\nduration=1.0\n").is_err());
    assert!(parse_probe_output("width=10\nduration=1.0\n").is_err());
    assert!(parse_probe_output("width=10\nheight=10\nduration=0.0\n").is_err());
    assert!(parse_probe_output("").is_err());
}

#[test]
fn degenerate_rate_is_absent() {
    let text = "width=10\nheight=10\nr_frame_rate=0/0\nduration=1.0\n";
    assert_eq!(parse_probe_output(text).unwrap().fps, None);
}

#[test]
fn args_end_with_path() {
    let args = probe_args(Path::new("/v/clip.mp4"));
    assert_eq!(args.last().unwrap(), "/v/clip.mp4");
    assert!(args.iter().any(|a| a == "default=noprint_wrappers=1"));
}
