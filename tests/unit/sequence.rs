use super::*;

#[test]
fn token_is_last_digit_run_before_a_dot() {
    let t = split_frame_token("shot.0013.exr").unwrap();
    assert_eq!((t.prefix, t.digits, t.suffix), ("shot.", "0013", ".exr"));
    assert_eq!(t.padding(), 4);

    let t = split_frame_token("shot_v02_0100.exr").unwrap();
    assert_eq!((t.prefix, t.digits, t.suffix), ("shot_v02_", "0100", ".exr"));
}

#[test]
fn token_ignores_digits_before_a_trailing_digit() {
    let t = split_frame_token("plate.0042.h264.mov").unwrap();
    assert_eq!((t.prefix, t.digits, t.suffix), ("plate.0042.h", "264", ".mov"));

    let t = split_frame_token("render.1001.tar.gz").unwrap();
    assert_eq!(t.digits, "1001");
    assert_eq!(t.suffix, ".tar.gz");
}

#[test]
fn names_without_frame_token_are_rejected() {
    assert!(split_frame_token("poster.png").is_none());
    assert!(split_frame_token("0001").is_none());
}

fn sequence_of(prefix: &str, suffix: &str, padding: usize, numbers: &[u64]) -> Sequence {
    let directory = PathBuf::from("/renders");
    let frames = numbers
        .iter()
        .map(|&number| SequenceFrame {
            number,
            path: directory.join(format!("{prefix}{number:0padding$}{suffix}")),
        })
        .collect();
    Sequence {
        directory,
        prefix: prefix.to_string(),
        suffix: suffix.to_string(),
        padding,
        frames,
    }
}

#[test]
fn pattern_and_frame_path_use_padding() {
    let seq = sequence_of("shot.", ".exr", 4, &[10, 11, 12]);
    assert_eq!(seq.pattern(), "shot.%04d.exr");
    assert_eq!(seq.pattern_path(), PathBuf::from("/renders/shot.%04d.exr"));
    assert_eq!(seq.frame_path(7), PathBuf::from("/renders/shot.0007.exr"));
    assert_eq!(seq.start_frame(), 10);
    assert_eq!(seq.end_frame(), 12);
}

#[test]
fn base_name_strips_separators() {
    assert_eq!(sequence_of("shot_v01._", ".png", 3, &[1]).base_name(), "shot_v01");
    assert_eq!(sequence_of("", ".png", 4, &[1]).base_name(), "output");
    assert_eq!(sequence_of("-.", ".png", 4, &[1]).base_name(), "output");
}

#[test]
fn missing_frames_lists_gaps() {
    let seq = sequence_of("a.", ".png", 2, &[1, 2, 5, 7]);
    assert_eq!(seq.missing_frames(), vec![3, 4, 6]);
    assert!(sequence_of("a.", ".png", 2, &[1, 2, 3]).missing_frames().is_empty());
}

#[test]
fn literal_percent_is_escaped_in_patterns_only() {
    let mut seq = sequence_of("100%_shot.", ".png", 4, &[1, 2]);
    assert_eq!(seq.pattern(), "100%%_shot.%04d.png");
    assert_eq!(
        seq.frame_path(7),
        PathBuf::from("/renders/100%_shot.0007.png")
    );

    seq.directory = PathBuf::from("/jobs/50%/plates");
    assert_eq!(
        seq.pattern_path(),
        PathBuf::from("/jobs/50%%/plates/100%%_shot.%04d.png")
    );
}
