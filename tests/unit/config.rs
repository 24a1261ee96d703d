use std::collections::HashMap;

use super::*;

fn env_of(pairs: &[(&str, &Path)]) -> impl Fn(&str) -> Option<OsString> + use<> {
    let map: HashMap<String, OsString> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.as_os_str().to_owned()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn defaults_fall_back_to_bare_names() {
    let cfg = ToolConfig::resolve_with(None, |_| None).unwrap();
    assert_eq!(cfg.color.source, "ACEScg");
    assert_eq!(cfg.color.target, "Output - sRGB");
    assert_eq!(cfg.framerate, 25);
    assert!(cfg.ffmpeg.ends_with(format!("ffmpeg{}", std::env::consts::EXE_SUFFIX)));
}

#[test]
fn env_override_wins_over_search() {
    let dir = tempfile::tempdir().unwrap();
    let fake = dir.path().join("my-ffmpeg");
    std::fs::write(&fake, b"").unwrap();

    let cfg = ToolConfig::resolve_with(None, env_of(&[(FFMPEG_ENV, fake.as_path())])).unwrap();
    assert_eq!(cfg.ffmpeg, fake);
}

#[test]
fn env_override_wins_over_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reelbox.json");
    std::fs::write(&path, r#"{ "ffmpeg": "/opt/file/ffmpeg", "ffprobe": "/opt/file/ffprobe" }"#)
        .unwrap();
    let env_ffmpeg = dir.path().join("env-ffmpeg");

    let cfg = ToolConfig::resolve_with(
        Some(&path),
        env_of(&[(FFMPEG_ENV, env_ffmpeg.as_path())]),
    )
    .unwrap();
    assert_eq!(cfg.ffmpeg, env_ffmpeg);
    assert_eq!(cfg.ffprobe, PathBuf::from("/opt/file/ffprobe"));
}

#[test]
fn config_file_sets_values_and_models_dir() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reelbox.json");
    std::fs::write(
        &path,
        r#"{
            "upscaler": "/tools/esrgan/realesrgan-ncnn-vulkan",
            "framerate": 24,
            "color": { "target": "sRGB" }
        }"#,
    )
    .unwrap();

    let cfg = ToolConfig::resolve_with(Some(&path), |_| None).unwrap();
    assert_eq!(cfg.framerate, 24);
    assert_eq!(cfg.color.source, "ACEScg");
    assert_eq!(cfg.color.target, "sRGB");
    assert_eq!(
        cfg.upscaler_models,
        Some(PathBuf::from("/tools/esrgan/models"))
    );
}

#[test]
fn invalid_values_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, r#"{ "jpeg_quality": 0 }"#).unwrap();
    assert!(ToolConfig::resolve_with(Some(&path), |_| None).is_err());

    std::fs::write(&path, "{ not json").unwrap();
    assert!(ToolConfig::resolve_with(Some(&path), |_| None).is_err());
}

#[test]
fn known_locations_include_local_app_data_layout() {
    let local = Path::new("/fake/local");
    let env = env_of(&[("LOCALAPPDATA", local)]);
    let locs = known_locations(UPSCALER_NAME, &env);
    assert!(locs[0].starts_with("/fake/local/Programs/reelbox/realesrgan"));
}
