//! Invocation of the external capture tools.

use crate::config::{ToolCommand, ToolConfig};
use crate::error::{CameraError, Result};
use picam_common::{build_probe_args, parse_camera_list, CameraDescriptor};
use std::io;
use std::process::{Output, Stdio};
use tracing::{debug, warn};

/// Synchronous command for `tool` with `argv` after its prefix args.
pub(crate) fn std_command(tool: &ToolCommand, argv: &[String]) -> std::process::Command {
    let mut cmd = std::process::Command::new(&tool.program);
    cmd.args(&tool.args).args(argv);
    cmd
}

/// Asynchronous counterpart of [`std_command`].
pub(crate) fn async_command(tool: &ToolCommand, argv: &[String]) -> tokio::process::Command {
    let mut cmd = tokio::process::Command::new(&tool.program);
    cmd.args(&tool.args).args(argv);
    cmd
}

pub(crate) fn spawn_error(tool: &ToolCommand, err: io::Error) -> CameraError {
    CameraError::Spawn {
        tool: tool.display_name().to_string(),
        message: err.to_string(),
    }
}

/// Map a finished process to its stdout, or to the error its status implies.
///
/// Death by signal is reported as `Cancelled` under `id`, or under the tool
/// name for untracked runs.
pub(crate) fn check_output(tool: &ToolCommand, id: Option<&str>, output: Output) -> Result<Vec<u8>> {
    if output.status.success() {
        return Ok(output.stdout);
    }
    match output.status.code() {
        Some(code) => Err(CameraError::CaptureToolFailure {
            tool: tool.display_name().to_string(),
            code,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }),
        None => Err(CameraError::Cancelled(
            id.unwrap_or_else(|| tool.display_name()).to_string(),
        )),
    }
}

/// Run to completion and buffer stdout.
pub(crate) fn run_blocking(tool: &ToolCommand, argv: &[String]) -> Result<Vec<u8>> {
    debug!("Running {} {:?}", tool.display_name(), argv);
    let output = std_command(tool, argv)
        .output()
        .map_err(|e| spawn_error(tool, e))?;
    check_output(tool, None, output)
}

/// Returns true when a minimal still capture on `index` succeeds.
pub fn probe_ready_blocking(tools: &ToolConfig, index: u32) -> bool {
    let status = std_command(&tools.still, &build_probe_args(index))
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();
    match status {
        Ok(status) => status.success(),
        Err(e) => {
            warn!("Readiness probe could not start {}: {}", tools.still.display_name(), e);
            false
        }
    }
}

/// Async variant of [`probe_ready_blocking`].
pub async fn probe_ready(tools: &ToolConfig, index: u32) -> bool {
    let status = async_command(&tools.still, &build_probe_args(index))
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;
    match status {
        Ok(status) => status.success(),
        Err(e) => {
            warn!("Readiness probe could not start {}: {}", tools.still.display_name(), e);
            false
        }
    }
}

fn listing_from(tools: &ToolConfig, output: Output) -> Result<Vec<CameraDescriptor>> {
    // The report may land on either stream depending on the tool version.
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));

    let cameras = parse_camera_list(&text);
    if cameras.is_empty() && !output.status.success() {
        return check_output(&tools.hello, None, output).map(|_| Vec::new());
    }
    debug!("Found {} camera(s)", cameras.len());
    Ok(cameras)
}

fn listing_args() -> Vec<String> {
    vec!["--list-cameras".to_string()]
}

/// Enumerate attached cameras.
pub fn list_cameras_blocking(tools: &ToolConfig) -> Result<Vec<CameraDescriptor>> {
    let output = std_command(&tools.hello, &listing_args())
        .stdin(Stdio::null())
        .output()
        .map_err(|e| spawn_error(&tools.hello, e))?;
    listing_from(tools, output)
}

/// Async variant of [`list_cameras_blocking`].
pub async fn list_cameras(tools: &ToolConfig) -> Result<Vec<CameraDescriptor>> {
    let output = async_command(&tools.hello, &listing_args())
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| spawn_error(&tools.hello, e))?;
    listing_from(tools, output)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::testing::script;

    fn hello_tools(body: &str) -> ToolConfig {
        ToolConfig {
            hello: script(body),
            ..ToolConfig::default()
        }
    }

    #[test]
    fn test_run_blocking_returns_stdout() {
        let out = run_blocking(&script("printf frame"), &[]).unwrap();
        assert_eq!(out, b"frame");
    }

    #[test]
    fn test_argv_is_passed_after_prefix() {
        let argv = vec!["--camera".to_string(), "1".to_string(), "a b".to_string()];
        let out = run_blocking(&script(r#"printf '%s|' "$@""#), &argv).unwrap();
        assert_eq!(out, b"--camera|1|a b|");
    }

    #[test]
    fn test_nonzero_exit_is_tool_failure() {
        let err = run_blocking(&script("echo boom >&2; exit 3"), &[]).unwrap_err();
        match err {
            CameraError::CaptureToolFailure { tool, code, stderr } => {
                assert_eq!(tool, "sh");
                assert_eq!(code, 3);
                assert_eq!(stderr, "boom\n");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_signal_death_is_cancelled() {
        let err = run_blocking(&script("kill -9 $$"), &[]).unwrap_err();
        assert_eq!(err, CameraError::Cancelled("sh".into()));
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let tool = ToolCommand::new("/nonexistent/rpicam-still");
        let err = run_blocking(&tool, &[]).unwrap_err();
        assert_eq!(err.kind(), "SPAWN_FAILED");
    }

    #[test]
    fn test_probe() {
        let ready = ToolConfig {
            still: script("exit 0"),
            ..ToolConfig::default()
        };
        let busy = ToolConfig {
            still: script("exit 1"),
            ..ToolConfig::default()
        };
        assert!(probe_ready_blocking(&ready, 0));
        assert!(!probe_ready_blocking(&busy, 0));
    }

    #[tokio::test]
    async fn test_probe_async() {
        let busy = ToolConfig {
            still: script("exit 1"),
            ..ToolConfig::default()
        };
        assert!(!probe_ready(&busy, 0).await);
    }

    #[test]
    fn test_list_cameras_blocking() {
        let tools = hello_tools(
            "printf 'Available cameras\\n-----------------\\n0 : imx219 [3280x2464] (/base/i2c@10)\\n'",
        );
        let cameras = list_cameras_blocking(&tools).unwrap();
        assert_eq!(cameras.len(), 1);
        assert_eq!(cameras[0].name, "imx219");
    }

    #[tokio::test]
    async fn test_list_cameras_none_available_on_stderr() {
        let tools = hello_tools("echo 'No cameras available!' >&2");
        assert!(list_cameras(&tools).await.unwrap().is_empty());
    }

    #[test]
    fn test_list_cameras_tool_failure() {
        let tools = hello_tools("exit 2");
        let err = list_cameras_blocking(&tools).unwrap_err();
        assert_eq!(err.kind(), "CAMERA_CAPTURE_INTERNAL_ERROR");
    }
}
