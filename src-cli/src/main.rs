//! picam command-line interface
//!
//! A headless front end for the rpicam capture tools: list cameras, probe
//! readiness, capture stills and video, stream live video to stdout and hold
//! a device reservation.

mod colors;
mod commands;
mod exit_codes;
mod paths;

use clap::{Args, Parser, Subcommand};
use exit_codes::ExitCode;
use picam_common::logging;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// picam - Raspberry Pi camera capture CLI
#[derive(Parser, Debug)]
#[command(name = "picam")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output in JSON format for scripting
    #[arg(long, global = true)]
    json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// List attached cameras
    List,
    /// Check whether a camera accepts commands
    Probe {
        /// Camera index
        #[arg(short, long, default_value_t = 0)]
        camera: u32,
    },
    /// Capture a still image
    Still(StillArgs),
    /// Record a video clip
    Video(VideoArgs),
    /// Stream video to stdout until interrupted
    Live(LiveArgs),
    /// Hold the camera reservation until interrupted
    Reserve {
        /// Camera index
        #[arg(short, long, default_value_t = 0)]
        camera: u32,
    },
    /// Show version information
    Version,
}

/// Image tunables shared by every capture command.
#[derive(Args, Debug, Clone, Default)]
pub struct TuningArgs {
    /// JSON file with capture options; flags given here override it
    #[arg(long, value_name = "FILE")]
    pub options: Option<PathBuf>,

    /// Brightness (0 to 1)
    #[arg(long)]
    pub brightness: Option<f64>,

    /// Contrast (1.0 is normal)
    #[arg(long)]
    pub contrast: Option<f64>,

    /// Saturation (1.0 is normal)
    #[arg(long)]
    pub saturation: Option<f64>,

    /// Sharpness (1.0 is normal)
    #[arg(long)]
    pub sharpness: Option<f64>,

    /// Exposure compensation in EV
    #[arg(long, allow_negative_numbers = true)]
    pub ev: Option<f64>,

    /// Analogue gain as ISO
    #[arg(long)]
    pub iso: Option<i64>,

    /// Digital zoom: 1x to 10x
    #[arg(long)]
    pub zoom: Option<String>,

    /// Rotation: 0, 90, 180, 270
    #[arg(long)]
    pub rotation: Option<String>,

    /// White balance: auto, sun, cloud, tungsten, ...
    #[arg(long)]
    pub awb: Option<String>,

    /// Image effect
    #[arg(long)]
    pub effect: Option<String>,

    /// Exposure profile: auto, night, sports, ...
    #[arg(long)]
    pub exposure: Option<String>,

    /// Denoise: on or off
    #[arg(long)]
    pub denoise: Option<String>,

    /// Flip horizontally
    #[arg(long)]
    pub hflip: bool,

    /// Flip vertically
    #[arg(long)]
    pub vflip: bool,
}

#[derive(Args, Debug, Clone)]
pub struct StillArgs {
    /// Camera index
    #[arg(short, long, default_value_t = 0)]
    pub camera: u32,

    /// Output path, `-` for stdout (default: timestamped file in Pictures)
    #[arg(short, long, allow_hyphen_values = true)]
    pub output: Option<String>,

    /// Image width
    #[arg(long, default_value_t = 1920)]
    pub width: u32,

    /// Image height
    #[arg(long, default_value_t = 1080)]
    pub height: u32,

    /// JPEG quality (0-100)
    #[arg(long)]
    pub quality: Option<i64>,

    /// Delay before capture in milliseconds
    #[arg(short, long)]
    pub timeout: Option<i64>,

    /// Output encoding: jpg, png, bmp, rgb, yuv420
    #[arg(short, long)]
    pub encoding: Option<String>,

    #[command(flatten)]
    pub tuning: TuningArgs,

    /// Print the tool command line instead of running it
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct VideoArgs {
    /// Camera index
    #[arg(short, long, default_value_t = 0)]
    pub camera: u32,

    /// Output path, `-` for stdout (default: timestamped file in Videos)
    #[arg(short, long, allow_hyphen_values = true)]
    pub output: Option<String>,

    /// Recording length in milliseconds (0 records until Ctrl+C)
    #[arg(short, long, default_value_t = 5000)]
    pub timeout: i64,

    /// Frame width
    #[arg(long, default_value_t = 1920)]
    pub width: u32,

    /// Frame height
    #[arg(long, default_value_t = 1080)]
    pub height: u32,

    /// Frames per second
    #[arg(long)]
    pub fps: Option<f64>,

    /// Codec: h264, mjpeg, yuv420, h265
    #[arg(long)]
    pub codec: Option<String>,

    /// Target bitrate, e.g. 4mbps
    #[arg(long)]
    pub bitrate: Option<String>,

    /// H.264 profile: baseline, main, high
    #[arg(long)]
    pub profile: Option<String>,

    #[command(flatten)]
    pub tuning: TuningArgs,

    /// Print the tool command line instead of running it
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct LiveArgs {
    /// Camera index
    #[arg(short, long, default_value_t = 0)]
    pub camera: u32,

    /// Frame width
    #[arg(long, default_value_t = 640)]
    pub width: u32,

    /// Frame height
    #[arg(long, default_value_t = 480)]
    pub height: u32,

    /// Frames per second
    #[arg(long)]
    pub fps: Option<f64>,

    /// Codec: h264, mjpeg, yuv420, h265
    #[arg(long)]
    pub codec: Option<String>,

    #[command(flatten)]
    pub tuning: TuningArgs,
}

/// Initialize logging to stderr and to a daily log file.
///
/// The returned guard flushes the file writer when dropped.
fn init_logging(verbose: bool, quiet: bool) -> Option<WorkerGuard> {
    let default_level = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(colors::is_stderr_interactive());

    let (file_layer, guard) = match logging::ensure_log_dir() {
        Ok(dir) => {
            let appender = tracing_appender::rolling::daily(dir, logging::LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        Err(e) => {
            if !quiet {
                eprintln!(
                    "{}",
                    colors::warning(&format!("File logging disabled: {}", e))
                );
            }
            (None, None)
        }
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    guard
}

fn main() {
    let cli = Cli::parse();
    let guard = init_logging(cli.verbose, cli.quiet);

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("{}", colors::error(&format!("Failed to create Tokio runtime: {}", e)));
            std::process::exit(ExitCode::GeneralError.as_i32());
        }
    };

    let exit_code = runtime.block_on(run(cli));
    tracing::debug!("Exiting with {} ({})", exit_code, exit_code.as_i32());

    // process::exit skips destructors; flush logs first.
    drop(runtime);
    drop(guard);
    std::process::exit(exit_code.as_i32());
}

async fn run(cli: Cli) -> ExitCode {
    let config = match &cli.config {
        Some(path) => picam::load_config_from(path),
        None => picam::load_config(),
    };

    match cli.command {
        Commands::List => commands::list(&config, cli.json, cli.quiet, cli.verbose).await,
        Commands::Probe { camera } => commands::probe(&config, camera, cli.json, cli.quiet).await,
        Commands::Still(args) => commands::still(config, args, cli.json, cli.quiet).await,
        Commands::Video(args) => commands::video(config, args, cli.json, cli.quiet).await,
        Commands::Live(args) => commands::live(config, args, cli.quiet).await,
        Commands::Reserve { camera } => {
            commands::reserve(config, camera, cli.json, cli.quiet).await
        }
        Commands::Version => {
            commands::version(cli.json);
            ExitCode::Success
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    /// Verify the CLI definition is valid
    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    /// Test parsing 'list' command
    #[test]
    fn parse_list() {
        let cli = Cli::try_parse_from(["picam", "list"]).unwrap();
        assert!(!cli.json);
        assert!(!cli.quiet);
        assert!(!cli.verbose);
        assert!(cli.config.is_none());
        assert!(matches!(cli.command, Commands::List));
    }

    /// Test global flags after the subcommand
    #[test]
    fn parse_global_flags() {
        let cli =
            Cli::try_parse_from(["picam", "probe", "--json", "-q", "--config", "/tmp/c.json"])
                .unwrap();
        assert!(cli.json);
        assert!(cli.quiet);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.json")));
        assert!(matches!(cli.command, Commands::Probe { camera: 0 }));
    }

    /// Test parsing 'still' with geometry and tunables
    #[test]
    fn parse_still() {
        let cli = Cli::try_parse_from([
            "picam", "still", "-c", "1", "-o", "/tmp/a.jpg", "--width", "640", "--height",
            "480", "--zoom", "3x", "--hflip",
        ])
        .unwrap();
        match cli.command {
            Commands::Still(args) => {
                assert_eq!(args.camera, 1);
                assert_eq!(args.output, Some("/tmp/a.jpg".to_string()));
                assert_eq!(args.width, 640);
                assert_eq!(args.height, 480);
                assert_eq!(args.tuning.zoom, Some("3x".to_string()));
                assert!(args.tuning.hflip);
                assert!(!args.dry_run);
            }
            _ => panic!("Expected Still command"),
        }
    }

    /// Test 'still -o -' writes to stdout
    #[test]
    fn parse_still_stdout() {
        let cli = Cli::try_parse_from(["picam", "still", "-o", "-"]).unwrap();
        match cli.command {
            Commands::Still(args) => assert_eq!(args.output, Some("-".to_string())),
            _ => panic!("Expected Still command"),
        }
    }

    /// Test 'video' defaults
    #[test]
    fn parse_video_defaults() {
        let cli = Cli::try_parse_from(["picam", "video", "--dry-run"]).unwrap();
        match cli.command {
            Commands::Video(args) => {
                assert_eq!(args.camera, 0);
                assert_eq!(args.timeout, 5000);
                assert_eq!(args.width, 1920);
                assert!(args.output.is_none());
                assert!(args.dry_run);
            }
            _ => panic!("Expected Video command"),
        }
    }

    /// Test 'live' defaults
    #[test]
    fn parse_live() {
        let cli = Cli::try_parse_from(["picam", "live", "--codec", "mjpeg"]).unwrap();
        match cli.command {
            Commands::Live(args) => {
                assert_eq!(args.width, 640);
                assert_eq!(args.height, 480);
                assert_eq!(args.codec, Some("mjpeg".to_string()));
            }
            _ => panic!("Expected Live command"),
        }
    }

    /// Test 'reserve' with camera index
    #[test]
    fn parse_reserve() {
        let cli = Cli::try_parse_from(["picam", "reserve", "--camera", "2"]).unwrap();
        assert!(matches!(cli.command, Commands::Reserve { camera: 2 }));
    }

    /// Test parsing 'version' command
    #[test]
    fn parse_version() {
        let cli = Cli::try_parse_from(["picam", "version"]).unwrap();
        assert!(matches!(cli.command, Commands::Version));
    }

    /// Test invalid command fails
    #[test]
    fn parse_invalid_command() {
        assert!(Cli::try_parse_from(["picam", "invalid"]).is_err());
    }

    /// Test negative camera index is rejected
    #[test]
    fn parse_negative_camera_rejected() {
        assert!(Cli::try_parse_from(["picam", "probe", "--camera", "-1"]).is_err());
    }
}
