//! CLI command implementations.

use crate::colors;
use crate::exit_codes::ExitCode;
use crate::paths::{self, MediaKind};
use crate::{LiveArgs, StillArgs, TuningArgs, VideoArgs};
use picam::{Camera, CameraConfig, CameraError, LiveEvent, ToolCommand};
use picam_common::{
    Awb, Codec, CodecProfile, CommonOptions, Effect, Exposure, OperationResult, Rotation,
    StillOptions, VideoOptions, Zoom,
};
use serde::de::DeserializeOwned;
use std::fmt::Display;
use std::future::Future;
use std::io::Write;
use std::path::Path;
use std::pin::Pin;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

const STILL_TASK_ID: &str = "still";
const VIDEO_TASK_ID: &str = "video";
const LIVE_TASK_ID: &str = "live";

const CANCEL_RETRY: Duration = Duration::from_millis(50);

// --- Option assembly ---------------------------------------------------------

/// Parse a closed option value, listing the accepted values on failure.
fn parse_choice<T: Copy + Display>(
    name: &str,
    value: &Option<String>,
    parse: fn(&str) -> Option<T>,
    all: &[T],
) -> Result<Option<T>, String> {
    let Some(raw) = value else {
        return Ok(None);
    };
    parse(raw).map(Some).ok_or_else(|| {
        let valid: Vec<String> = all.iter().map(|v| v.to_string()).collect();
        format!("Invalid {} '{}'. Valid values: {}", name, raw, valid.join(", "))
    })
}

fn parse_on_off(value: &Option<String>) -> Result<Option<bool>, String> {
    match value.as_deref().map(str::to_lowercase).as_deref() {
        None => Ok(None),
        Some("on") => Ok(Some(true)),
        Some("off") => Ok(Some(false)),
        Some(other) => Err(format!("Invalid denoise '{}'. Valid values: on, off", other)),
    }
}

/// Read an options JSON file, or defaults when no file was given.
pub fn load_options<T: DeserializeOwned + Default>(path: Option<&Path>) -> Result<T, String> {
    let Some(path) = path else {
        return Ok(T::default());
    };
    let contents = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read options file {:?}: {}", path, e))?;
    serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse options file {:?}: {}", path, e))
}

impl TuningArgs {
    /// Overlay the flags that were given onto `common`.
    pub fn apply(&self, common: &mut CommonOptions) -> Result<(), String> {
        if let Some(v) = self.brightness {
            common.brightness = Some(v);
        }
        if let Some(v) = self.contrast {
            common.contrast = Some(v);
        }
        if let Some(v) = self.saturation {
            common.saturation = Some(v);
        }
        if let Some(v) = self.sharpness {
            common.sharpness = Some(v);
        }
        if let Some(v) = self.ev {
            common.exposure_compensation = Some(v);
        }
        if let Some(v) = self.iso {
            common.iso = Some(v);
        }
        if let Some(v) = parse_choice("zoom", &self.zoom, Zoom::parse, Zoom::ALL)? {
            common.zoom = Some(v);
        }
        if let Some(v) = parse_choice("rotation", &self.rotation, Rotation::parse, Rotation::ALL)? {
            common.rotation = Some(v);
        }
        if let Some(v) = parse_choice("awb", &self.awb, Awb::parse, Awb::ALL)? {
            common.awb = Some(v);
        }
        if let Some(v) = parse_choice("effect", &self.effect, Effect::parse, Effect::ALL)? {
            common.effect = Some(v);
        }
        if let Some(v) = parse_choice("exposure", &self.exposure, Exposure::parse, Exposure::ALL)? {
            common.exposure = Some(v);
        }
        if let Some(v) = parse_on_off(&self.denoise)? {
            common.denoise = Some(v);
        }
        common.flip_horizontal |= self.hflip;
        common.flip_vertical |= self.vflip;
        // Nothing to preview on a headless run.
        common.no_preview = true;
        Ok(())
    }
}

/// Assemble still options: file first, then flags.
pub fn still_options(args: &StillArgs) -> Result<StillOptions, String> {
    let mut options: StillOptions = load_options(args.tuning.options.as_deref())?;
    args.tuning.apply(&mut options.common)?;
    if let Some(v) = args.quality {
        options.quality = Some(v);
    }
    if let Some(v) = args.timeout {
        options.timeout = Some(v);
    }
    if let Some(v) = &args.encoding {
        options.common.encoding = Some(v.clone());
    }
    Ok(options)
}

/// Assemble video options: file first, then flags.
pub fn video_options(
    tuning: &TuningArgs,
    fps: Option<f64>,
    codec: &Option<String>,
    bitrate: &Option<String>,
    profile: &Option<String>,
) -> Result<VideoOptions, String> {
    let mut options: VideoOptions = load_options(tuning.options.as_deref())?;
    tuning.apply(&mut options.common)?;
    if let Some(v) = fps {
        options.fps = Some(v);
    }
    if let Some(v) = parse_choice("codec", codec, Codec::parse, Codec::ALL)? {
        options.codec = Some(v);
    }
    if let Some(v) = bitrate {
        options.bitrate = Some(v.clone());
    }
    if let Some(v) = parse_choice("profile", profile, CodecProfile::parse, CodecProfile::ALL)? {
        options.profile = Some(v);
    }
    Ok(options)
}

fn video_extension(codec: Option<Codec>) -> &'static str {
    match codec {
        None | Some(Codec::H264) => "h264",
        Some(Codec::Mjpeg) => "mjpeg",
        Some(Codec::Yuv420) => "yuv",
        Some(Codec::H265) => "h265",
    }
}

/// Resolve `--output`, generating a timestamped path when absent.
fn resolve_output(output: &Option<String>, kind: MediaKind, extension: &str) -> Result<String, String> {
    match output {
        Some(path) => Ok(path.clone()),
        None => paths::generate_output_path(kind, extension).map(|p| p.to_string_lossy().into_owned()),
    }
}

/// Render a command line for display, quoting arguments with whitespace.
pub fn format_command(tool: &ToolCommand, argv: &[String]) -> String {
    std::iter::once(&tool.program)
        .chain(tool.args.iter())
        .chain(argv.iter())
        .map(|arg| {
            if arg.is_empty() || arg.chars().any(char::is_whitespace) {
                format!("'{}'", arg.replace('\'', r"'\''"))
            } else {
                arg.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// --- Output helpers ----------------------------------------------------------

fn report_usage_error(msg: &str, quiet: bool) -> ExitCode {
    if !quiet {
        eprintln!("{}", colors::error(msg));
    }
    ExitCode::InvalidArguments
}

fn report_camera_error(err: &CameraError, json: bool, quiet: bool) -> ExitCode {
    if json {
        print_json(&OperationResult::failure(err.into()));
    } else if !quiet {
        eprintln!("{}", colors::error(&err.to_string()));
    }
    ExitCode::from(err)
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("{}", colors::error(&format!("Failed to serialize output: {}", e))),
    }
}

/// Fail early with a readable message when `tool` is not installed.
fn ensure_tool(tool: &ToolCommand, quiet: bool) -> Result<(), ExitCode> {
    match which::which(&tool.program) {
        Ok(path) => {
            debug!("Using {} at {:?}", tool.display_name(), path);
            Ok(())
        }
        Err(_) => {
            if !quiet {
                eprintln!(
                    "{}",
                    colors::error(&format!("'{}' not found in PATH.", tool.program))
                );
                eprintln!("Install rpicam-apps or set the tool path in config.json.");
            }
            Err(ExitCode::ToolNotFound)
        }
    }
}

fn print_dry_run(tool: &ToolCommand, argv: &[String], json: bool) -> ExitCode {
    if json {
        let args: Vec<&String> = tool.args.iter().chain(argv.iter()).collect();
        print_json(&serde_json::json!({ "program": tool.program, "args": args }));
    } else {
        println!("{}", format_command(tool, argv));
    }
    ExitCode::Success
}

/// Print a finished capture: raw bytes for stdout output, a path otherwise.
fn report_capture(output: &str, bytes: Vec<u8>, json: bool, quiet: bool) -> ExitCode {
    if output == "-" {
        if json {
            print_json(&OperationResult::with_output(bytes));
        } else {
            let mut stdout = std::io::stdout().lock();
            if let Err(e) = stdout.write_all(&bytes).and_then(|_| stdout.flush()) {
                warn!("Failed to write capture to stdout: {}", e);
                return ExitCode::GeneralError;
            }
        }
    } else if json {
        print_json(&OperationResult::ok());
    } else if !quiet {
        println!("{} {}", colors::success("Saved:"), colors::path(output));
    }
    ExitCode::Success
}

/// Wait for SIGINT or SIGTERM (Ctrl+C elsewhere).
async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match (signal(SignalKind::interrupt()), signal(SignalKind::terminate())) {
            (Ok(mut sigint), Ok(mut sigterm)) => {
                tokio::select! {
                    _ = sigint.recv() => {}
                    _ = sigterm.recv() => {}
                }
                return;
            }
            (Err(e), _) | (_, Err(e)) => warn!("Failed to set up signal handlers: {}", e),
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to set up Ctrl+C handler: {}", e);
    }
}

/// Stop the tracked task `id` and wait for `capture`, its owning future.
///
/// The task is only registered once the reservation holder is gone, so the
/// cancel is retried until the id shows up. A second shutdown signal
/// escalates to SIGKILL.
async fn stop_capture<F: Future>(camera: &Camera, id: &str, mut capture: Pin<&mut F>) -> F::Output {
    let second_signal = wait_for_shutdown();
    tokio::pin!(second_signal);
    let mut force = false;
    let mut signalled = false;

    loop {
        if !signalled {
            match camera.cancel_task(id, force) {
                Ok(()) => signalled = true,
                Err(CameraError::UnknownTaskId(_)) => debug!("Task '{}' not started yet", id),
                Err(e) => {
                    warn!("Failed to stop '{}': {}", id, e);
                    signalled = true;
                }
            }
        }

        tokio::select! {
            result = &mut capture => return result,
            _ = &mut second_signal, if !force => {
                warn!("Forcing '{}' to stop", id);
                force = true;
                signalled = false;
            }
            _ = tokio::time::sleep(CANCEL_RETRY), if !signalled => {}
        }
    }
}

// --- Commands ----------------------------------------------------------------

/// List attached cameras.
pub async fn list(config: &CameraConfig, json: bool, quiet: bool, verbose: bool) -> ExitCode {
    if let Err(code) = ensure_tool(&config.tools.hello, quiet) {
        return code;
    }

    let cameras = match picam::list_cameras(&config.tools).await {
        Ok(cameras) => cameras,
        Err(e) => return report_camera_error(&e, json, quiet),
    };

    if json {
        print_json(&cameras);
    } else if cameras.is_empty() {
        if !quiet {
            println!("{}", colors::dim("No cameras available."));
        }
    } else {
        let name_width = cameras
            .iter()
            .map(|c| c.name.len())
            .max()
            .unwrap_or(4)
            .max(4);

        println!(
            "{}  {}  {}  {}",
            colors::pad_left("INDEX", 5, colors::header),
            colors::pad_left("NAME", name_width, colors::header),
            colors::pad_left("RESOLUTION", 11, colors::header),
            colors::header("PATH")
        );
        println!(
            "{}  {}  {}  {}",
            "-".repeat(5),
            "-".repeat(name_width),
            "-".repeat(11),
            "-".repeat(4)
        );

        for camera in cameras {
            let resolution = format!("{}x{}", camera.resolution.width, camera.resolution.height);
            println!(
                "{}  {:<name_width$}  {:<11}  {}",
                colors::pad_left(&camera.index.to_string(), 5, colors::number),
                camera.name,
                resolution,
                colors::path(&camera.path)
            );
            if verbose {
                for mode in &camera.modes {
                    println!(
                        "       {} {}x{} @ {:.2} fps, crop ({}, {})/{}x{}",
                        colors::dim(&mode.format),
                        mode.width,
                        mode.height,
                        mode.fps,
                        mode.crop_offset.x,
                        mode.crop_offset.y,
                        mode.crop.width,
                        mode.crop.height
                    );
                }
            }
        }
    }
    ExitCode::Success
}

/// Check whether a camera accepts commands.
pub async fn probe(config: &CameraConfig, camera: u32, json: bool, quiet: bool) -> ExitCode {
    if let Err(code) = ensure_tool(&config.tools.still, quiet) {
        return code;
    }

    let ready = picam::probe_ready(&config.tools, camera).await;
    if json {
        print_json(&serde_json::json!({ "camera": camera, "ready": ready }));
    } else if !quiet {
        println!(
            "{} {} {}",
            colors::bold("Camera"),
            colors::number(&camera.to_string()),
            colors::readiness(ready)
        );
    }

    if ready {
        ExitCode::Success
    } else {
        ExitCode::CameraBusy
    }
}

/// Capture one still image.
pub async fn still(config: CameraConfig, args: StillArgs, json: bool, quiet: bool) -> ExitCode {
    let options = match still_options(&args) {
        Ok(options) => options,
        Err(msg) => return report_usage_error(&msg, quiet),
    };
    let extension = options.common.encoding.clone().unwrap_or_else(|| "jpg".to_string());
    let output = match resolve_output(&args.output, MediaKind::Still, &extension) {
        Ok(output) => output,
        Err(msg) => return report_usage_error(&msg, quiet),
    };

    let request = picam::StillRequest::new(output.clone(), args.width, args.height).with_options(options);
    if args.dry_run {
        let argv = picam::build_still_args(args.camera, &request.output, request.width, request.height, &request.options);
        return print_dry_run(&config.tools.still, &argv, json);
    }
    if let Err(code) = ensure_tool(&config.tools.still, quiet) {
        return code;
    }

    let camera = Camera::open(args.camera, config).await;
    match camera.capture_still(STILL_TASK_ID, &request).await {
        Ok(bytes) => report_capture(&output, bytes, json, quiet),
        Err(e) => report_camera_error(&e, json, quiet),
    }
}

/// Record one video clip.
pub async fn video(config: CameraConfig, args: VideoArgs, json: bool, quiet: bool) -> ExitCode {
    let options = match video_options(&args.tuning, args.fps, &args.codec, &args.bitrate, &args.profile) {
        Ok(options) => options,
        Err(msg) => return report_usage_error(&msg, quiet),
    };
    let output = match resolve_output(&args.output, MediaKind::Video, video_extension(options.codec)) {
        Ok(output) => output,
        Err(msg) => return report_usage_error(&msg, quiet),
    };

    let request = picam::VideoRequest::new(output.clone(), args.timeout, args.width, args.height)
        .with_options(options);
    if args.dry_run {
        let argv = picam::build_video_args(
            args.camera,
            &request.output,
            request.timeout,
            request.width,
            request.height,
            &request.options,
        );
        return print_dry_run(&config.tools.video, &argv, json);
    }
    if let Err(code) = ensure_tool(&config.tools.video, quiet) {
        return code;
    }

    let camera = Camera::open(args.camera, config).await;
    if !quiet && !json && request.timeout == 0 {
        eprintln!("{}", colors::info("Recording until interrupted (Ctrl+C to stop)..."));
    }

    let capture = camera.capture_video(VIDEO_TASK_ID, &request);
    tokio::pin!(capture);
    let result = tokio::select! {
        result = &mut capture => result,
        _ = wait_for_shutdown() => stop_capture(&camera, VIDEO_TASK_ID, capture.as_mut()).await,
    };

    match result {
        Ok(bytes) => report_capture(&output, bytes, json, quiet),
        // Stopped on request; whatever was written so far is kept.
        Err(CameraError::Cancelled(_)) if output != "-" => report_capture(&output, Vec::new(), json, quiet),
        Err(e) => report_camera_error(&e, json, quiet),
    }
}

/// Stream video to stdout until interrupted.
pub async fn live(config: CameraConfig, args: LiveArgs, quiet: bool) -> ExitCode {
    let options = match video_options(&args.tuning, args.fps, &args.codec, &None, &None) {
        Ok(options) => options,
        Err(msg) => return report_usage_error(&msg, quiet),
    };
    if let Err(code) = ensure_tool(&config.tools.video, quiet) {
        return code;
    }

    let camera = Camera::open(args.camera, config).await;
    let mut stream = match camera
        .start_live_stream(LIVE_TASK_ID, args.width, args.height, &options)
        .await
    {
        Ok(stream) => stream,
        Err(e) => return report_camera_error(&e, false, quiet),
    };

    let shutdown = wait_for_shutdown();
    tokio::pin!(shutdown);
    let mut stdout = tokio::io::stdout();
    let mut stopping = false;
    let mut code = None;

    loop {
        tokio::select! {
            _ = &mut shutdown, if !stopping => {
                stopping = true;
                if let Err(e) = camera.cancel_task(LIVE_TASK_ID, false) {
                    warn!("Failed to stop live stream: {}", e);
                }
            }
            event = stream.recv() => match event {
                Some(LiveEvent::Started { pid, .. }) => {
                    if !quiet {
                        eprintln!("{}", colors::info(&format!("Streaming (pid {}), Ctrl+C to stop...", pid)));
                    }
                }
                Some(LiveEvent::Frame(bytes)) => {
                    if let Err(e) = stdout.write_all(&bytes).await {
                        // Reader went away, e.g. a closed pipe.
                        debug!("Stopping live stream, stdout closed: {}", e);
                        if !stopping {
                            stopping = true;
                            let _ = camera.cancel_task(LIVE_TASK_ID, false);
                        }
                    }
                }
                Some(LiveEvent::Closed { code: exit, .. }) => {
                    code = exit;
                    break;
                }
                None => break,
            }
        }
    }
    let _ = stdout.flush().await;

    if stopping || code == Some(0) {
        ExitCode::Success
    } else {
        if !quiet {
            eprintln!(
                "{}",
                colors::error(&format!("Live stream ended unexpectedly (code {:?})", code))
            );
        }
        ExitCode::CaptureFailed
    }
}

/// Hold the camera reservation until interrupted.
pub async fn reserve(config: CameraConfig, camera: u32, json: bool, quiet: bool) -> ExitCode {
    if let Err(code) = ensure_tool(&config.tools.video, quiet) {
        return code;
    }

    let camera = Camera::open(camera, CameraConfig { auto_reserve: false, ..config }).await;
    if let Err(e) = camera.reserve().await {
        return report_camera_error(&e, json, quiet);
    }

    if json {
        print_json(&serde_json::json!({ "camera": camera.index(), "reserved": true }));
    } else if !quiet {
        println!(
            "{} {}",
            colors::success(&format!("Camera {} reserved.", camera.index())),
            colors::dim("Press Ctrl+C to release.")
        );
    }

    let mut events = tokio::time::interval(std::time::Duration::from_secs(1));
    let shutdown = wait_for_shutdown();
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = events.tick() => {
                if !camera.is_reserved() {
                    if !quiet {
                        eprintln!("{}", colors::warning("Reservation holder exited on its own."));
                    }
                    return ExitCode::CameraBusy;
                }
            }
        }
    }

    match camera.unlock_reserve() {
        Ok(()) => {
            if !quiet && !json {
                println!("{}", colors::info("Camera released."));
            }
            ExitCode::Success
        }
        Err(e) => report_camera_error(&e, json, quiet),
    }
}

/// Show version information.
pub fn version(json: bool) {
    let version = env!("CARGO_PKG_VERSION");
    if json {
        println!(r#"{{"version": "{}"}}"#, version);
    } else {
        println!("{} {}", colors::bold("picam"), version);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Cli;
    use crate::Commands;
    use clap::Parser;

    fn still_args(argv: &[&str]) -> StillArgs {
        let mut full = vec!["picam", "still"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Commands::Still(args) => args,
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_still_options_from_flags() {
        let args = still_args(&["--zoom", "3x", "--hflip", "--quality", "90", "--denoise", "off"]);
        let options = still_options(&args).unwrap();
        assert_eq!(options.common.zoom, Some(Zoom::X3));
        assert!(options.common.flip_horizontal);
        assert!(options.common.no_preview);
        assert_eq!(options.common.denoise, Some(false));
        assert_eq!(options.quality, Some(90));
    }

    #[test]
    fn test_invalid_choice_lists_valid_values() {
        let args = still_args(&["--zoom", "12x"]);
        let err = still_options(&args).unwrap_err();
        assert!(err.contains("Invalid zoom '12x'"));
        assert!(err.contains("10x"));

        let args = still_args(&["--denoise", "maybe"]);
        assert!(still_options(&args).is_err());
    }

    #[test]
    fn test_flags_override_options_file() {
        let path = std::env::temp_dir().join(format!("picam-options-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"zoom": "2x", "quality": 50, "awb": "cloud"}"#).unwrap();

        let path_str = path.to_string_lossy().into_owned();
        let args = still_args(&["--options", &path_str, "--quality", "95"]);
        let options = still_options(&args).unwrap();
        assert_eq!(options.common.zoom, Some(Zoom::X2));
        assert_eq!(options.common.awb, Some(Awb::Cloud));
        assert_eq!(options.quality, Some(95));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_options_file_is_error() {
        let missing = Path::new("/nonexistent/picam-options.json");
        assert!(load_options::<StillOptions>(Some(missing)).is_err());
        assert_eq!(load_options::<StillOptions>(None).unwrap(), StillOptions::default());
    }

    #[test]
    fn test_video_options_codec_and_profile() {
        let options = video_options(
            &TuningArgs::default(),
            Some(30.0),
            &Some("mjpeg".to_string()),
            &None,
            &Some("high".to_string()),
        )
        .unwrap();
        assert_eq!(options.codec, Some(Codec::Mjpeg));
        assert_eq!(options.profile, Some(CodecProfile::High));
        assert_eq!(options.fps, Some(30.0));
        assert_eq!(video_extension(options.codec), "mjpeg");
        assert_eq!(video_extension(None), "h264");
    }

    #[test]
    fn test_format_command_quotes_whitespace() {
        let tool = ToolCommand::new("rpicam-still");
        let argv = vec!["--output".to_string(), "/tmp/my shot.jpg".to_string()];
        assert_eq!(
            format_command(&tool, &argv),
            "rpicam-still --output '/tmp/my shot.jpg'"
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stop_capture_before_task_is_registered() {
        let holder_or_recording = |body: &str| ToolCommand {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), body.to_string(), "sh".to_string()],
        };
        let config = CameraConfig {
            auto_reserve: true,
            tools: picam::ToolConfig {
                still: holder_or_recording("exit 0"),
                video: holder_or_recording("exec sleep 30"),
                hello: holder_or_recording("exit 0"),
            },
            ..CameraConfig::default()
        };
        let camera = Camera::open(0, config).await;
        assert!(camera.is_reserved());

        let request = picam::VideoRequest::new("-", 0, 64, 48);
        let capture = camera.capture_video(VIDEO_TASK_ID, &request);
        tokio::pin!(capture);

        // The recording has not started, so a plain cancel misses it.
        assert_eq!(
            camera.cancel_task(VIDEO_TASK_ID, false),
            Err(CameraError::UnknownTaskId(VIDEO_TASK_ID.to_string()))
        );

        let result = tokio::time::timeout(
            Duration::from_secs(10),
            stop_capture(&camera, VIDEO_TASK_ID, capture.as_mut()),
        )
        .await
        .expect("recording kept running after stop");
        assert_eq!(result, Err(CameraError::Cancelled(VIDEO_TASK_ID.to_string())));
        assert!(camera.tasks().iter().all(|t| t.id != VIDEO_TASK_ID));

        let _ = camera.unlock_reserve();
    }

    #[test]
    fn test_explicit_output_is_kept() {
        let output = resolve_output(&Some("-".to_string()), MediaKind::Still, "jpg").unwrap();
        assert_eq!(output, "-");
    }
}
