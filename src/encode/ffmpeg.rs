use std::ffi::OsString;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Output, Stdio};

use crate::config::{EncodeDefaults, ToolConfig};
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::error::{ReelError, ReelResult};
use crate::frame::{FrameBuffer, SampleFormat};

/// Options for [`FfmpegSink`] output.
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Encoder executable.
    pub ffmpeg: PathBuf,
    pub out_path: PathBuf,
    /// Overwrite the output file if it already exists.
    pub overwrite: bool,
    pub encode: EncodeDefaults,
}

impl FfmpegSinkOpts {
    pub fn new(cfg: &ToolConfig, out_path: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: cfg.ffmpeg.clone(),
            out_path: out_path.into(),
            overwrite: true,
            encode: cfg.encode.clone(),
        }
    }
}

/// ffmpeg `rawvideo` pixel format for an interleaved layout.
pub fn raw_pix_fmt(channels: usize, format: SampleFormat) -> ReelResult<&'static str> {
    let fmt = match (channels, format) {
        (1, SampleFormat::U8) => "gray",
        (1, SampleFormat::U16) => "gray16le",
        (2, SampleFormat::U8) => "ya8",
        (2, SampleFormat::U16) => "ya16le",
        (3, SampleFormat::U8) => "rgb24",
        (3, SampleFormat::U16) => "rgb48le",
        (4, SampleFormat::U8) => "rgba",
        (4, SampleFormat::U16) => "rgba64le",
        _ => {
            return Err(ReelError::validation(format!(
                "no rawvideo pixel format for {channels} channel(s) of {format:?}"
            )));
        }
    };
    Ok(fmt)
}

/// Full argument list for a raw-stdin encode of `cfg` into `opts.out_path`.
pub fn raw_input_args(cfg: &SinkConfig, opts: &FfmpegSinkOpts) -> ReelResult<Vec<OsString>> {
    let pix_fmt = raw_pix_fmt(cfg.channels, cfg.format)?;
    let enc = &opts.encode;
    let mut args: Vec<OsString> = vec![if opts.overwrite { "-y" } else { "-n" }.into()];
    args.extend(
        [
            "-loglevel".to_string(),
            "error".to_string(),
            "-f".to_string(),
            "rawvideo".to_string(),
            "-pixel_format".to_string(),
            pix_fmt.to_string(),
            "-video_size".to_string(),
            cfg.size().to_string(),
            "-framerate".to_string(),
            cfg.fps.to_ffmpeg_arg(),
            "-i".to_string(),
            "pipe:0".to_string(),
            "-an".to_string(),
            // yuv420p needs even dimensions; pad odd sizes by one row/column.
            "-vf".to_string(),
            "pad=ceil(iw/2)*2:ceil(ih/2)*2".to_string(),
            "-c:v".to_string(),
            enc.codec.clone(),
            "-pix_fmt".to_string(),
            enc.pix_fmt.clone(),
            "-preset".to_string(),
            enc.preset.clone(),
            "-crf".to_string(),
            enc.crf.to_string(),
            "-movflags".to_string(),
            "+faststart".to_string(),
        ]
        .into_iter()
        .map(OsString::from),
    );
    args.push(opts.out_path.clone().into_os_string());
    Ok(args)
}

/// Sink that spawns `ffmpeg` and streams raw frames into its stdin.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    cfg: Option<SinkConfig>,
    last_number: Option<u64>,
    frames_written: u64,
}

impl FfmpegSink {
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            cfg: None,
            last_number: None,
            frames_written: 0,
        }
    }

    pub fn out_path(&self) -> &Path {
        &self.opts.out_path
    }

    fn join_stderr(&mut self) -> String {
        let bytes = match self.stderr_drain.take() {
            Some(handle) => match handle.join() {
                Ok(Ok(bytes)) => bytes,
                Ok(Err(e)) => format!("<stderr read failed: {e}>").into_bytes(),
                Err(_) => b"<stderr drain thread panicked>".to_vec(),
            },
            None => Vec::new(),
        };
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Close stdin, wait for exit and collect stderr.
    fn finish_process(&mut self) -> ReelResult<(std::process::ExitStatus, String)> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| ReelError::validation("ffmpeg sink not started"))?;
        let status = child
            .wait()
            .map_err(|e| ReelError::io(&self.opts.ffmpeg, e))?;
        let stderr = self.join_stderr();
        Ok((status, stderr))
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()> {
        if cfg.width == 0 || cfg.height == 0 {
            return Err(ReelError::validation(
                "ffmpeg sink width/height must be non-zero",
            ));
        }
        if self.child.is_some() {
            return Err(ReelError::validation("ffmpeg sink already started"));
        }

        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(ReelError::validation(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }

        let args = raw_input_args(&cfg, &self.opts)?;
        tracing::debug!(
            ffmpeg = %self.opts.ffmpeg.display(),
            args = ?args,
            "spawning raw video encoder"
        );

        let mut cmd = Command::new(&self.opts.ffmpeg);
        cmd.args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        let mut child = cmd.spawn().map_err(|e| spawn_error(&self.opts.ffmpeg, e))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ReelError::validation("failed to open ffmpeg stdin"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| ReelError::validation("failed to open ffmpeg stderr"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_number = None;
        self.frames_written = 0;
        Ok(())
    }

    fn push_frame(&mut self, number: u64, frame: &FrameBuffer) -> ReelResult<()> {
        let cfg = self
            .cfg
            .ok_or_else(|| ReelError::validation("ffmpeg sink not started"))?;
        if let Some(last) = self.last_number
            && number <= last
        {
            return Err(ReelError::validation(
                "ffmpeg sink received out-of-order frame number",
            ));
        }
        self.last_number = Some(number);
        cfg.check_frame(frame)?;

        let bytes = frame.to_bytes();
        let Some(stdin) = self.stdin.as_mut() else {
            return Err(ReelError::validation("ffmpeg sink is already finalized"));
        };
        if let Err(write_err) = stdin.write_all(&bytes) {
            // The encoder usually died; its exit status explains why better than EPIPE does.
            let (status, stderr) = self.finish_process()?;
            if !status.success() {
                return Err(ReelError::external("ffmpeg", status, stderr));
            }
            return Err(ReelError::io(&self.opts.out_path, write_err));
        }
        self.frames_written += 1;
        Ok(())
    }

    fn end(&mut self) -> ReelResult<()> {
        let (status, stderr) = self.finish_process()?;
        if !status.success() {
            return Err(ReelError::external("ffmpeg", status, stderr));
        }
        self.cfg = None;
        tracing::info!(
            out = %self.opts.out_path.display(),
            frames = self.frames_written,
            "encoded video"
        );
        Ok(())
    }

    fn abort(&mut self) {
        let started = self.cfg.take().is_some() || self.child.is_some();
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        let stderr = self.join_stderr();
        if !stderr.trim().is_empty() {
            tracing::warn!(stderr = %stderr.trim(), "ffmpeg output before abort");
        }
        if started && self.opts.out_path.exists() {
            match std::fs::remove_file(&self.opts.out_path) {
                Ok(()) => tracing::debug!(
                    out = %self.opts.out_path.display(),
                    "removed partial output"
                ),
                Err(e) => tracing::warn!(
                    out = %self.opts.out_path.display(),
                    error = %e,
                    "failed to remove partial output"
                ),
            }
        }
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        if self.child.is_some() || self.cfg.is_some() {
            self.abort();
        }
    }
}

/// Map a spawn failure, distinguishing a missing executable.
pub fn spawn_error(program: &Path, e: std::io::Error) -> ReelError {
    if e.kind() == std::io::ErrorKind::NotFound {
        ReelError::not_found(format!(
            "'{}' could not be started (is it installed and on PATH?)",
            program.display()
        ))
    } else {
        ReelError::io(program, e)
    }
}

/// Run a command to completion, failing with its stderr on a non-zero exit.
pub fn run_tool(tool: &str, cmd: &mut Command) -> ReelResult<Output> {
    let program = PathBuf::from(cmd.get_program());
    tracing::debug!(
        tool,
        program = %program.display(),
        args = ?cmd.get_args().collect::<Vec<_>>(),
        "running external tool"
    );
    let output = cmd
        .stdin(Stdio::null())
        .output()
        .map_err(|e| spawn_error(&program, e))?;
    if !output.status.success() {
        return Err(ReelError::external(
            tool,
            output.status,
            String::from_utf8_lossy(&output.stderr),
        ));
    }
    Ok(output)
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> ReelResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| ReelError::io(parent, e))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
