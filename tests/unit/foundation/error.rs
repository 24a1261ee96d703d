use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ReelError::not_found("x")
            .to_string()
            .contains("not found:")
    );
    assert!(ReelError::decode("x").to_string().contains("decode error:"));
    assert!(
        ReelError::transform("x")
            .to_string()
            .contains("transform error:")
    );
    assert!(
        ReelError::validation("x")
            .to_string()
            .contains("validation error:")
    );
}

#[test]
fn external_process_keeps_diagnostics_verbatim() {
    let err = ReelError::external("ffmpeg", "exit status: 1", "  Unknown encoder 'x'\n");
    assert_eq!(err.kind(), ErrorKind::ExternalProcess);
    assert_eq!(
        err.to_string(),
        "ffmpeg exited with status exit status: 1: Unknown encoder 'x'"
    );
}

#[test]
fn geometry_mismatch_reports_both_lengths() {
    let err = ReelError::GeometryMismatch {
        expected: 30000,
        actual: 29994,
    };
    assert_eq!(err.kind(), ErrorKind::GeometryMismatch);
    assert!(err.to_string().contains("30000"));
    assert!(err.to_string().contains("29994"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ReelError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
    assert_eq!(err.kind(), ErrorKind::Other);
}
