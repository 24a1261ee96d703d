use super::*;
use crate::foundation::core::Fps;
use crate::foundation::error::ErrorKind;
use crate::frame::PixelData;

fn cfg(width: u32, height: u32, channels: usize, format: SampleFormat) -> SinkConfig {
    SinkConfig {
        width,
        height,
        channels,
        format,
        fps: Fps::whole(24).unwrap(),
    }
}

fn opts(ffmpeg: &str, out: &Path) -> FfmpegSinkOpts {
    FfmpegSinkOpts {
        ffmpeg: PathBuf::from(ffmpeg),
        out_path: out.to_path_buf(),
        overwrite: true,
        encode: EncodeDefaults::default(),
    }
}

#[test]
fn pix_fmt_covers_integer_layouts() {
    assert_eq!(raw_pix_fmt(3, SampleFormat::U16).unwrap(), "rgb48le");
    assert_eq!(raw_pix_fmt(3, SampleFormat::U8).unwrap(), "rgb24");
    assert_eq!(raw_pix_fmt(4, SampleFormat::U16).unwrap(), "rgba64le");
    assert_eq!(raw_pix_fmt(1, SampleFormat::U16).unwrap(), "gray16le");
    assert!(raw_pix_fmt(3, SampleFormat::F32).is_err());
}

#[test]
fn args_describe_raw_stdin_input() {
    let out = Path::new("/tmp/out.mp4");
    let args = raw_input_args(&cfg(100, 50, 3, SampleFormat::U16), &opts("ffmpeg", out)).unwrap();
    let args: Vec<String> = args
        .iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect();

    let pos = |flag: &str| args.iter().position(|a| a == flag).unwrap();
    assert_eq!(args[pos("-f") + 1], "rawvideo");
    assert_eq!(args[pos("-pixel_format") + 1], "rgb48le");
    assert_eq!(args[pos("-video_size") + 1], "100x50");
    assert_eq!(args[pos("-framerate") + 1], "24");
    assert_eq!(args[pos("-i") + 1], "pipe:0");
    assert_eq!(args[pos("-c:v") + 1], "libx264");
    assert_eq!(args[pos("-pix_fmt") + 1], "yuv420p");
    assert!(pos("-framerate") < pos("-i"));
    assert_eq!(args.last().unwrap(), "/tmp/out.mp4");
}

#[test]
fn push_before_begin_is_rejected() {
    let mut sink = FfmpegSink::new(opts("ffmpeg", Path::new("/tmp/never.mp4")));
    let frame = FrameBuffer::new(2, 2, 3, PixelData::U16(vec![0; 12])).unwrap();
    assert!(sink.push_frame(1, &frame).is_err());
}

#[test]
fn missing_executable_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.mp4");
    let mut sink = FfmpegSink::new(opts("/nonexistent/bin/ffmpeg-missing", &out));
    let err = sink
        .begin(cfg(2, 2, 3, SampleFormat::U16))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[cfg(unix)]
#[test]
fn failing_encoder_reports_external_process() {
    if !tool_runs_plain("false") {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.mp4");
    let mut sink = FfmpegSink::new(opts("false", &out));
    sink.begin(cfg(2, 2, 3, SampleFormat::U16)).unwrap();

    let frame = FrameBuffer::new(2, 2, 3, PixelData::U16(vec![0; 12])).unwrap();
    let err = match sink.push_frame(1, &frame) {
        Err(e) => e,
        Ok(()) => sink.end().unwrap_err(),
    };
    assert_eq!(err.kind(), ErrorKind::ExternalProcess);
}

#[cfg(unix)]
fn tool_runs_plain(program: &str) -> bool {
    Command::new(program)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok()
}

#[test]
fn abort_before_begin_keeps_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("existing.mp4");
    std::fs::write(&out, b"keep").unwrap();
    let mut sink = FfmpegSink::new(opts("ffmpeg", &out));
    sink.abort();
    assert!(out.exists());
}

#[cfg(unix)]
#[test]
fn abort_after_begin_removes_partial_output() {
    if !tool_runs_plain("cat") {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("partial.mp4");
    let mut sink = FfmpegSink::new(opts("cat", &out));
    // `cat` rejects the ffmpeg flags, but the sink is started either way.
    sink.begin(cfg(2, 2, 3, SampleFormat::U16)).unwrap();
    std::fs::write(&out, b"partial").unwrap();
    sink.abort();
    assert!(!out.exists());
}

#[test]
fn run_tool_surfaces_missing_program() {
    let err = run_tool("probe", &mut Command::new("/nonexistent/ffprobe")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}
