use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use reelbox::aov::{SplitOpts, split_aovs_batch};
use reelbox::batch::run_batch;
use reelbox::convert::{
    self, ContactSheetOpts, ExrVideoOpts, FrameFormat, GridOpts, SequenceVideoOpts, UpscaleOpts,
};
use reelbox::{BatchReport, ColorTransformSpec, Fps, ToolConfig};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "reelbox", version, about = "Media conversion toolbox")]
struct Cli {
    /// JSON configuration file (overrides `REELBOX_CONFIG`).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level unless `RUST_LOG` says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encode the image sequence around each seed frame into an MP4.
    SeqToMp4 {
        #[arg(required = true)]
        seeds: Vec<PathBuf>,
        /// Frame rate, e.g. `24` or `30000/1001`.
        #[arg(long)]
        fps: Option<Fps>,
    },
    /// Color-convert an EXR sequence and encode it into an MP4.
    ExrToMp4 {
        #[arg(required = true)]
        seeds: Vec<PathBuf>,
        #[arg(long)]
        fps: Option<Fps>,
        /// Source colorspace (default from config).
        #[arg(long)]
        source: Option<String>,
        /// Target colorspace (default from config).
        #[arg(long)]
        target: Option<String>,
    },
    /// Extract every frame of each video as PNG.
    Mp4ToPng {
        #[arg(required = true)]
        videos: Vec<PathBuf>,
    },
    /// Extract every frame of each video as JPEG.
    Mp4ToJpg {
        #[arg(required = true)]
        videos: Vec<PathBuf>,
        /// JPEG quality 1-100 (default from config).
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
        quality: Option<u8>,
    },
    /// Resize images to a width, keeping the aspect ratio.
    ImgResize {
        #[arg(long)]
        width: u32,
        #[arg(required = true)]
        images: Vec<PathBuf>,
    },
    /// Halve the size of images.
    ImgHalf {
        #[arg(required = true)]
        images: Vec<PathBuf>,
    },
    /// Resize videos to a width, keeping the aspect ratio.
    VidResize {
        #[arg(long)]
        width: u32,
        #[arg(required = true)]
        videos: Vec<PathBuf>,
    },
    /// Tile images into a single JPEG.
    ContactSheet {
        #[arg(required = true)]
        images: Vec<PathBuf>,
        #[arg(long, default_value_t = 2)]
        columns: u32,
        #[arg(long, default_value_t = 10)]
        padding: u32,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Tile the opening seconds of videos into a single MP4.
    VideoGrid {
        #[arg(required = true)]
        videos: Vec<PathBuf>,
        #[arg(long, default_value_t = 2)]
        columns: u32,
        /// Cell height in pixels.
        #[arg(long, default_value_t = 360)]
        height: u32,
        /// Snippet length in seconds.
        #[arg(long, default_value_t = 5.0)]
        seconds: f64,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Upscale images with the configured upscaler.
    Upscale {
        #[arg(required = true)]
        images: Vec<PathBuf>,
        #[arg(long, default_value = convert::upscale::DEFAULT_MODEL)]
        model: String,
        #[arg(long, default_value_t = 4)]
        scale: u32,
    },
    /// List upscaler models.
    ListModels {
        /// Models directory (default from config).
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Split multi-layer EXR files into one file per render pass.
    SplitAovs {
        #[arg(required = true)]
        sources: Vec<PathBuf>,
        /// Fail instead of replacing existing outputs.
        #[arg(long)]
        no_overwrite: bool,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cfg = ToolConfig::resolve(cli.config.as_deref()).context("resolve configuration")?;
    let report = run(&cfg, cli.cmd)?;
    finish(report)
}

fn run(cfg: &ToolConfig, cmd: Command) -> anyhow::Result<BatchReport> {
    let report = match cmd {
        Command::SeqToMp4 { seeds, fps } => {
            let opts = SequenceVideoOpts { fps, output: None };
            run_batch("seq-to-mp4", &seeds, |seed| {
                convert::sequence_to_video(cfg, seed, &opts).map(|p| vec![p])
            })
        }
        Command::ExrToMp4 {
            seeds,
            fps,
            source,
            target,
        } => {
            let color = ColorTransformSpec::new(
                source.unwrap_or_else(|| cfg.color.source.clone()),
                target.unwrap_or_else(|| cfg.color.target.clone()),
            );
            let opts = ExrVideoOpts {
                fps,
                color: Some(color),
                output: None,
            };
            run_batch("exr-to-mp4", &seeds, |seed| {
                convert::exr_sequence_to_video(cfg, seed, &opts).map(|p| vec![p])
            })
        }
        Command::Mp4ToPng { videos } => frames_batch(cfg, &videos, FrameFormat::Png),
        Command::Mp4ToJpg { videos, quality } => {
            let quality = quality.unwrap_or(cfg.jpeg_quality);
            frames_batch(cfg, &videos, FrameFormat::Jpg { quality })
        }
        Command::ImgResize { width, images } => run_batch("img-resize", &images, |p| {
            convert::resize_image(cfg, p, width).map(|p| vec![p])
        }),
        Command::ImgHalf { images } => run_batch("img-half", &images, |p| {
            convert::half_size_image(cfg, p).map(|p| vec![p])
        }),
        Command::VidResize { width, videos } => run_batch("vid-resize", &videos, |p| {
            convert::resize_video(cfg, p, width).map(|p| vec![p])
        }),
        Command::ContactSheet {
            images,
            columns,
            padding,
            out,
        } => {
            let opts = ContactSheetOpts {
                columns,
                padding,
                output: out,
                ..ContactSheetOpts::default()
            };
            single(convert::contact_sheet(cfg, &images, &opts))?
        }
        Command::VideoGrid {
            videos,
            columns,
            height,
            seconds,
            out,
        } => {
            let opts = GridOpts {
                columns,
                cell_height: height,
                snippet_secs: seconds,
                output: out,
            };
            single(convert::video_grid(cfg, &videos, &opts))?
        }
        Command::Upscale {
            images,
            model,
            scale,
        } => convert::upscale_images(cfg, &images, &UpscaleOpts { model, scale }),
        Command::ListModels { dir } => {
            let dir = dir
                .or_else(|| cfg.upscaler_models.clone())
                .context("no models directory configured; pass --dir")?;
            for model in convert::list_upscale_models(&dir)? {
                println!("{model}");
            }
            BatchReport::default()
        }
        Command::SplitAovs {
            sources,
            no_overwrite,
        } => {
            let opts = SplitOpts {
                overwrite: !no_overwrite,
                ..SplitOpts::from_config(cfg)
            };
            split_aovs_batch(&sources, &opts)
        }
    };
    Ok(report)
}

fn frames_batch(cfg: &ToolConfig, videos: &[PathBuf], format: FrameFormat) -> BatchReport {
    run_batch("extract-frames", videos, |v| {
        convert::video_to_frames(cfg, v, format).map(|p| vec![p])
    })
}

fn single(result: reelbox::ReelResult<PathBuf>) -> anyhow::Result<BatchReport> {
    let out = result?;
    Ok(BatchReport {
        succeeded: vec![out],
        failed: Vec::new(),
    })
}

fn finish(report: BatchReport) -> anyhow::Result<()> {
    for out in &report.succeeded {
        println!("{}", out.display());
    }
    if report.is_success() {
        return Ok(());
    }
    for (input, err) in &report.failed {
        eprintln!("failed: {}: {err}", input.display());
    }
    anyhow::bail!("{} input(s) failed", report.failed.len())
}
