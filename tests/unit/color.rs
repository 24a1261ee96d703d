use super::*;

fn run(src: &str, dst: &str, rgb: [f32; 3]) -> [f32; 3] {
    let p = BuiltinColorEngine.processor(src, dst).unwrap();
    let mut px = rgb.to_vec();
    p.apply(&mut px, 3).unwrap();
    [px[0], px[1], px[2]]
}

fn close(a: [f32; 3], b: [f32; 3], eps: f32) -> bool {
    a.iter().zip(b).all(|(x, y)| (x - y).abs() < eps)
}

#[test]
fn aliases_resolve_to_same_space() {
    assert!(BuiltinColorEngine::knows("ACEScg"));
    assert!(BuiltinColorEngine::knows("ACES - ACEScg"));
    assert!(BuiltinColorEngine::knows("Output - sRGB"));
    assert!(!BuiltinColorEngine::knows("Rec.1886"));
}

#[test]
fn unknown_space_is_transform_error() {
    let err = BuiltinColorEngine.processor("ACEScg", "nope").err().unwrap();
    assert_eq!(err.kind(), crate::foundation::error::ErrorKind::Transform);
}

#[test]
fn neutral_stays_neutral_across_white_points() {
    let out = run("ACEScg", "Linear Rec.709", [0.18, 0.18, 0.18]);
    assert!(close(out, [0.18, 0.18, 0.18], 1e-3), "{out:?}");
}

#[test]
fn srgb_encode_hits_reference_points() {
    let out = run("Linear Rec.709", "sRGB", [0.0, 0.18, 1.0]);
    assert!(close(out, [0.0, 0.4614, 1.0], 1e-3), "{out:?}");
}

#[test]
fn round_trip_is_identity() {
    let there = run("ACEScg", "Output - sRGB", [0.1, 0.4, 0.7]);
    let back = run("sRGB", "ACEScg", there);
    assert!(close(back, [0.1, 0.4, 0.7], 1e-3), "{back:?}");
}

#[test]
fn alpha_passes_through() {
    let p = BuiltinColorEngine.processor("ACEScg", "sRGB").unwrap();
    let mut px = vec![0.5, 0.5, 0.5, 0.25];
    p.apply(&mut px, 4).unwrap();
    assert_eq!(px[3], 0.25);
    assert!(p.apply(&mut [0.5, 0.5], 2).is_err());
}
