use super::*;

#[test]
fn failures_do_not_stop_siblings() {
    let inputs: Vec<PathBuf> = ["a", "bad", "c"].iter().map(PathBuf::from).collect();
    let report = run_batch("test", &inputs, |p| {
        if p == Path::new("bad") {
            Err(ReelError::decode("broken"))
        } else {
            Ok(vec![p.with_extension("out")])
        }
    });
    assert_eq!(
        report.succeeded,
        vec![PathBuf::from("a.out"), PathBuf::from("c.out")]
    );
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, PathBuf::from("bad"));
    assert!(!report.is_success());
}

#[test]
fn empty_batch_is_success() {
    let report = run_batch("test", &[], |_| Ok(Vec::new()));
    assert!(report.is_success());
    assert!(report.succeeded.is_empty());
}
