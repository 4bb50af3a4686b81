use capture_bridge::bridge::CameraModule;
use capture_bridge::capture::{
    CameraSession, DirectoryMediaLibrary, ReplayCamera, Router, StaticProvider, UiQueue,
};
use capture_bridge::imaging::{ResizeBounds, RustBackend, get_dimensions, resize_image};
use capture_bridge::types::{CameraType, CaptureQuality, CaptureResult, CaptureTarget};
use capture_bridge::{config, output};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "capture-bridge")]
#[command(about = "Camera capture routing and EXIF-aware resizing")]
#[command(long_about = "\
Camera capture routing and EXIF-aware resizing

Runs the capture pipeline against a replayed still: the JPEG given with
--input stands in for the camera sensor, and is routed exactly as a live
capture would be.

Targets:
  memory       base64 payload printed, nothing written
  disk         <pictures>/<album>/IMG_yyyyMMdd_HHmmss.jpg
  camera-roll  decoded and stored in the album as a media library item
  temp         unique file in the cache dir, resized to [resize] bounds

Set RUST_LOG=debug to trace routing and preview timing.

Run 'capture-bridge gen-config' to generate a documented config file.")]
#[command(version)]
struct Cli {
    /// Config file (optional; stock defaults apply when missing)
    #[arg(long, default_value = "capture-bridge.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum TargetArg {
    Memory,
    Disk,
    CameraRoll,
    Temp,
}

impl From<TargetArg> for CaptureTarget {
    fn from(arg: TargetArg) -> Self {
        match arg {
            TargetArg::Memory => CaptureTarget::Memory,
            TargetArg::Disk => CaptureTarget::Disk,
            TargetArg::CameraRoll => CaptureTarget::CameraRoll,
            TargetArg::Temp => CaptureTarget::Temp,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum CameraArg {
    Front,
    Back,
}

impl From<CameraArg> for CameraType {
    fn from(arg: CameraArg) -> Self {
        match arg {
            CameraArg::Front => CameraType::Front,
            CameraArg::Back => CameraType::Back,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum QualityArg {
    Low,
    Medium,
    High,
}

impl From<QualityArg> for CaptureQuality {
    fn from(arg: QualityArg) -> Self {
        match arg {
            QualityArg::Low => CaptureQuality::Low,
            QualityArg::Medium => CaptureQuality::Medium,
            QualityArg::High => CaptureQuality::High,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Capture a replayed still and route it to a target
    Capture {
        /// JPEG to replay as the camera's still
        #[arg(long)]
        input: PathBuf,
        #[arg(long, value_enum)]
        target: TargetArg,
        #[arg(long, value_enum, default_value = "back")]
        camera: CameraArg,
        #[arg(long, value_enum, default_value = "high")]
        quality: QualityArg,
        /// Media library title (camera-roll only)
        #[arg(long)]
        title: Option<String>,
        /// Media library description (camera-roll only)
        #[arg(long)]
        description: Option<String>,
    },
    /// Resize an image the way temp captures are resized
    Resize {
        #[arg(long)]
        input: PathBuf,
        /// Overrides [resize] max_width (0 = unconstrained)
        #[arg(long)]
        max_width: Option<u32>,
        /// Overrides [resize] max_height (0 = unconstrained)
        #[arg(long)]
        max_height: Option<u32>,
    },
    /// Print the host constants table as JSON
    Constants,
    /// Print a stock config file with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Capture {
            input,
            target,
            camera,
            quality,
            title,
            description,
        } => {
            let config = config::load_config(&cli.config)?;
            let camera_type = CameraType::from(camera);
            let target = CaptureTarget::from(target);

            let device = Arc::new(ReplayCamera::from_file(&input)?);
            let provider = Arc::new(StaticProvider::new().with_device(camera_type, device));
            let library = DirectoryMediaLibrary::new(
                config.storage.album_dir(),
                config.camera_roll.quality(),
            );
            let router = Router::from_config(RustBackend::new(), Box::new(library), &config);
            let preview = Arc::new(UiQueue::spawn()?);
            let session = CameraSession::new(provider, router, preview)
                .with_settle_delay(config.preview.settle_delay());
            let module = CameraModule::new(session);

            let options = serde_json::json!({
                "type": camera_type.code(),
                "quality": CaptureQuality::from(quality).as_str(),
                "target": target.code(),
                "title": title,
                "description": description
            });
            let settled = module.capture(&options).settle();
            // Dropping the module joins the preview queue, so the resume has run.
            drop(module);

            let value = settled?;
            let result: CaptureResult = serde_json::from_value(value)?;
            output::print_capture_output(target, &result);
        }
        Command::Resize {
            input,
            max_width,
            max_height,
        } => {
            let config = config::load_config(&cli.config)?;
            let mut bounds: ResizeBounds = config.resize.bounds();
            if let Some(w) = max_width {
                bounds.max_width = w;
            }
            if let Some(h) = max_height {
                bounds.max_height = h;
            }

            let backend = RustBackend::new();
            let source_size = get_dimensions(&backend, &input)?;
            let (file, size) = resize_image(
                &backend,
                &input,
                source_size,
                bounds,
                &config.storage.temp_dir(),
            )?;
            output::print_resize_output(&input, source_size, &file.path, size);
        }
        Command::Constants => {
            output::print_constants(&capture_bridge::bridge::constants());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
