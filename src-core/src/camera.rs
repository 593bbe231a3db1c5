//! Capture orchestration for one camera index.
//!
//! Every operation that drives the sensor first releases a held reservation
//! and waits for the holder to exit, then runs the tool, then reserves again
//! when `auto_reserve` is configured. Tracked operations register the tool
//! process under a caller-supplied id for the lifetime of the process.

use crate::config::{CameraConfig, ToolCommand};
use crate::error::{CameraError, Result};
use crate::live::{LiveEvent, LiveStream, CHUNK_SIZE};
use crate::reservation::Reservation;
use crate::tasks::{Task, TaskRegistry};
use crate::tool;
use picam_common::{build_still_args, build_video_args, StillOptions, VideoOptions};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

/// A still capture.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StillRequest {
    /// Output path; `-` for stdout, empty to leave it to the tool.
    pub output: String,
    pub width: u32,
    pub height: u32,
    pub options: StillOptions,
}

impl StillRequest {
    pub fn new(output: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            output: output.into(),
            width,
            height,
            options: StillOptions::default(),
        }
    }

    pub fn with_options(mut self, options: StillOptions) -> Self {
        self.options = options;
        self
    }

    fn argv(&self, index: u32) -> Vec<String> {
        build_still_args(index, &self.output, self.width, self.height, &self.options)
    }
}

/// A video recording.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoRequest {
    pub output: String,
    /// Recording length in milliseconds; 0 records until signalled.
    pub timeout: i64,
    pub width: u32,
    pub height: u32,
    pub options: VideoOptions,
}

impl VideoRequest {
    pub fn new(output: impl Into<String>, timeout: i64, width: u32, height: u32) -> Self {
        Self {
            output: output.into(),
            timeout,
            width,
            height,
            options: VideoOptions::default(),
        }
    }

    pub fn with_options(mut self, options: VideoOptions) -> Self {
        self.options = options;
        self
    }

    fn argv(&self, index: u32) -> Vec<String> {
        build_video_args(
            index,
            &self.output,
            self.timeout,
            self.width,
            self.height,
            &self.options,
        )
    }
}

const LIVE_EVENT_CAPACITY: usize = 256;

struct CameraInner {
    index: u32,
    config: CameraConfig,
    registry: Arc<TaskRegistry>,
    reservation: Reservation,
    live_tx: broadcast::Sender<LiveEvent>,
}

impl Drop for CameraInner {
    fn drop(&mut self) {
        if self.reservation.release().is_some() {
            debug!("Camera {} dropped while reserved", self.index);
        }
    }
}

/// Handle to one camera. Clones share the task registry and reservation.
#[derive(Clone)]
pub struct Camera {
    inner: Arc<CameraInner>,
}

/// Removes a tracked task when its owning future settles or is dropped.
struct TaskGuard {
    registry: Arc<TaskRegistry>,
    pid: u32,
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.registry.remove_pid(self.pid);
    }
}

impl Camera {
    fn build(index: u32, config: CameraConfig) -> Self {
        let registry = Arc::new(TaskRegistry::new());
        let reservation = Reservation::new(index, config.tools.clone(), Arc::clone(&registry));
        let (live_tx, _) = broadcast::channel(LIVE_EVENT_CAPACITY);
        Self {
            inner: Arc::new(CameraInner {
                index,
                config,
                registry,
                reservation,
                live_tx,
            }),
        }
    }

    /// Create a handle, reserving the device when `auto_reserve` is set and
    /// the device is ready. Blocks on the readiness probe in that case.
    pub fn new(index: u32, config: CameraConfig) -> Self {
        let camera = Self::build(index, config);
        if camera.inner.config.auto_reserve {
            if let Err(e) = camera.inner.reservation.reserve_blocking() {
                warn!("Camera {} not reserved at startup: {}", index, e);
            }
        }
        camera
    }

    /// Async variant of [`Camera::new`].
    pub async fn open(index: u32, config: CameraConfig) -> Self {
        let camera = Self::build(index, config);
        if camera.inner.config.auto_reserve {
            if let Err(e) = camera.inner.reservation.reserve().await {
                warn!("Camera {} not reserved at startup: {}", index, e);
            }
        }
        camera
    }

    pub fn index(&self) -> u32 {
        self.inner.index
    }

    pub fn config(&self) -> &CameraConfig {
        &self.inner.config
    }

    fn registry(&self) -> &Arc<TaskRegistry> {
        &self.inner.registry
    }

    fn tools(&self) -> &crate::config::ToolConfig {
        &self.inner.config.tools
    }

    fn release_timeout(&self) -> Duration {
        Duration::from_millis(self.inner.config.release_timeout_ms)
    }

    // --- Reservation -------------------------------------------------------

    pub fn is_reserved(&self) -> bool {
        self.inner.reservation.is_held()
    }

    /// Reserve the device. Fails with `DeviceBusy` if the probe fails.
    pub async fn reserve(&self) -> Result<()> {
        self.inner.reservation.reserve().await
    }

    pub fn reserve_blocking(&self) -> Result<()> {
        self.inner.reservation.reserve_blocking()
    }

    /// Give up the reservation. Fails with `NotReserved` when none is held.
    pub fn unlock_reserve(&self) -> Result<()> {
        self.inner.reservation.unlock()
    }

    async fn release_for_operation(&self) {
        if let Some(released) = self.inner.reservation.release() {
            released.wait(self.release_timeout()).await;
        }
    }

    fn release_for_operation_blocking(&self) {
        if let Some(released) = self.inner.reservation.release() {
            released.wait_blocking(self.release_timeout());
        }
    }

    async fn reacquire(&self) {
        if !self.inner.config.auto_reserve {
            return;
        }
        if let Err(e) = self.inner.reservation.reserve().await {
            warn!("Failed to reserve camera {} again: {}", self.index(), e);
        }
    }

    fn reacquire_blocking(&self) {
        if !self.inner.config.auto_reserve {
            return;
        }
        if let Err(e) = self.inner.reservation.reserve_blocking() {
            warn!("Failed to reserve camera {} again: {}", self.index(), e);
        }
    }

    // --- Tasks -------------------------------------------------------------

    /// Signal the task `id`: SIGKILL when `force`, SIGTERM otherwise.
    pub fn cancel_task(&self, id: &str, force: bool) -> Result<()> {
        info!("Cancelling task '{}' on camera {}", id, self.index());
        self.registry().cancel(id, force)
    }

    /// Signal every tracked task, the reservation holder included.
    pub fn cancel_all_tasks(&self, force: bool) -> Result<()> {
        info!("Cancelling all tasks on camera {}", self.index());
        self.registry().cancel_all(force)
    }

    /// Currently tracked tasks.
    pub fn tasks(&self) -> Vec<Task> {
        self.registry().snapshot()
    }

    // --- Probing -----------------------------------------------------------

    /// Whether the device is ready or held by us.
    ///
    /// While this handle holds the reservation no probe is run and the
    /// answer is `true`: the holder would make the trivial capture fail, and
    /// every capture releases the holder before starting. Use
    /// [`crate::probe_ready`] for a raw probe.
    pub async fn probe_ready(&self) -> bool {
        if self.is_reserved() {
            return true;
        }
        tool::probe_ready(self.tools(), self.index()).await
    }

    /// Blocking variant of [`Camera::probe_ready`]; also `true` while held.
    pub fn probe_ready_blocking(&self) -> bool {
        if self.is_reserved() {
            return true;
        }
        tool::probe_ready_blocking(self.tools(), self.index())
    }

    // --- Synchronous operations --------------------------------------------

    /// Capture a still and return the tool's stdout. Not tracked.
    pub fn capture_still_blocking(&self, request: &StillRequest) -> Result<Vec<u8>> {
        let argv = request.argv(self.index());
        self.run_blocking(&self.tools().still, &argv)
    }

    /// Record a video and return the tool's stdout. Not tracked.
    pub fn capture_video_blocking(&self, request: &VideoRequest) -> Result<Vec<u8>> {
        let argv = request.argv(self.index());
        self.run_blocking(&self.tools().video, &argv)
    }

    fn run_blocking(&self, tool: &ToolCommand, argv: &[String]) -> Result<Vec<u8>> {
        self.release_for_operation_blocking();
        let result = tool::run_blocking(tool, argv);
        self.reacquire_blocking();
        result
    }

    /// Start a still capture and hand its process to the caller.
    ///
    /// Stdout is piped. The process is not tracked and the reservation is
    /// not taken back afterwards, since the device stays in use.
    pub fn spawn_still(&self, request: &StillRequest) -> Result<std::process::Child> {
        let argv = request.argv(self.index());
        self.spawn_untracked(&self.tools().still, &argv)
    }

    /// Start a video recording and hand its process to the caller.
    pub fn spawn_video(&self, request: &VideoRequest) -> Result<std::process::Child> {
        let argv = request.argv(self.index());
        self.spawn_untracked(&self.tools().video, &argv)
    }

    fn spawn_untracked(&self, tool: &ToolCommand, argv: &[String]) -> Result<std::process::Child> {
        self.release_for_operation_blocking();
        debug!("Spawning {} {:?}", tool.display_name(), argv);
        tool::std_command(tool, argv)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| tool::spawn_error(tool, e))
    }

    // --- Tracked asynchronous operations -----------------------------------

    /// Capture a still tracked as `id`, returning the tool's stdout.
    pub async fn capture_still(&self, id: &str, request: &StillRequest) -> Result<Vec<u8>> {
        let argv = request.argv(self.index());
        self.run_tracked(id, &self.tools().still, &argv).await
    }

    /// Record a video tracked as `id`, returning the tool's stdout.
    pub async fn capture_video(&self, id: &str, request: &VideoRequest) -> Result<Vec<u8>> {
        let argv = request.argv(self.index());
        self.run_tracked(id, &self.tools().video, &argv).await
    }

    async fn run_tracked(&self, id: &str, tool: &ToolCommand, argv: &[String]) -> Result<Vec<u8>> {
        if self.registry().contains(id) {
            return Err(CameraError::DuplicateTaskId(id.to_string()));
        }
        self.release_for_operation().await;
        let result = self.execute_tracked(id, tool, argv).await;
        self.reacquire().await;
        result
    }

    async fn execute_tracked(&self, id: &str, tool: &ToolCommand, argv: &[String]) -> Result<Vec<u8>> {
        debug!("Starting task '{}': {} {:?}", id, tool.display_name(), argv);
        let mut child = tool::async_command(tool, argv)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| tool::spawn_error(tool, e))?;

        let pid = child.id().ok_or_else(|| CameraError::Spawn {
            tool: tool.display_name().to_string(),
            message: "process exited before it could be tracked".to_string(),
        })?;
        if let Err(e) = self.registry().register(id, pid) {
            let _ = child.start_kill();
            let _ = child.wait().await;
            return Err(e);
        }
        let _guard = TaskGuard {
            registry: Arc::clone(self.registry()),
            pid,
        };

        let output = child.wait_with_output().await.map_err(|e| CameraError::Spawn {
            tool: tool.display_name().to_string(),
            message: e.to_string(),
        })?;
        let result = tool::check_output(tool, Some(id), output);
        match &result {
            Ok(bytes) => debug!("Task '{}' finished with {} bytes", id, bytes.len()),
            Err(e) => warn!("Task '{}' failed: {}", id, e),
        }
        result
    }

    // --- Live streaming ----------------------------------------------------

    /// Subscribe to the events of every live stream on this camera.
    pub fn subscribe_live(&self) -> broadcast::Receiver<LiveEvent> {
        self.inner.live_tx.subscribe()
    }

    /// Start an endless video capture on stdout, tracked as `id`.
    ///
    /// Stdout chunks arrive as [`LiveEvent::Frame`]s on the returned stream
    /// and on [`Camera::subscribe_live`]. The task ends when the tool exits or
    /// is cancelled; the reservation is then taken back if configured.
    pub async fn start_live_stream(
        &self,
        id: &str,
        width: u32,
        height: u32,
        options: &VideoOptions,
    ) -> Result<LiveStream> {
        if self.registry().contains(id) {
            return Err(CameraError::DuplicateTaskId(id.to_string()));
        }
        self.release_for_operation().await;

        match self.spawn_live(id, width, height, options) {
            Ok(stream) => Ok(stream),
            Err(e) => {
                self.reacquire().await;
                Err(e)
            }
        }
    }

    fn spawn_live(&self, id: &str, width: u32, height: u32, options: &VideoOptions) -> Result<LiveStream> {
        let tool = &self.tools().video;
        let argv = build_video_args(self.index(), "-", 0, width, height, options);
        debug!("Starting live stream '{}': {} {:?}", id, tool.display_name(), argv);

        let mut child = tool::async_command(tool, &argv)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| tool::spawn_error(tool, e))?;

        let (pid, stdout) = match (child.id(), child.stdout.take()) {
            (Some(pid), Some(stdout)) => (pid, stdout),
            _ => {
                let _ = child.start_kill();
                return Err(CameraError::Spawn {
                    tool: tool.display_name().to_string(),
                    message: "stdout not available".to_string(),
                });
            }
        };
        if let Err(e) = self.registry().register(id, pid) {
            let _ = child.start_kill();
            return Err(e);
        }

        let (tx, rx) = mpsc::channel(LIVE_EVENT_CAPACITY);
        let sink = LiveSink {
            local: tx,
            shared: self.inner.live_tx.clone(),
        };
        let camera = self.clone();
        let id = id.to_string();
        let stream = LiveStream::new(id.clone(), pid, rx);

        tokio::spawn(async move {
            let _guard = TaskGuard {
                registry: Arc::clone(camera.registry()),
                pid,
            };
            sink.emit(LiveEvent::Started { id: id.clone(), pid }).await;

            let mut stdout = stdout;
            let mut buf = vec![0u8; CHUNK_SIZE];
            loop {
                match stdout.read(&mut buf).await {
                    Ok(0) => break,
                    Ok(n) => sink.emit(LiveEvent::Frame(buf[..n].to_vec())).await,
                    Err(e) => {
                        warn!("Reading live stream '{}' failed: {}", id, e);
                        break;
                    }
                }
            }

            let code = match child.wait().await {
                Ok(status) => status.code(),
                Err(e) => {
                    warn!("Waiting for live stream '{}' failed: {}", id, e);
                    None
                }
            };
            drop(_guard);
            info!("Live stream '{}' closed (code {:?})", id, code);
            sink.emit(LiveEvent::Closed { id, code }).await;
            camera.reacquire().await;
        });

        Ok(stream)
    }
}

/// Fans live events out to the stream's own receiver and to subscribers.
struct LiveSink {
    local: mpsc::Sender<LiveEvent>,
    shared: broadcast::Sender<LiveEvent>,
}

impl LiveSink {
    async fn emit(&self, event: LiveEvent) {
        // No subscribers is fine.
        let _ = self.shared.send(event.clone());
        // The stream handle may have been dropped; keep draining stdout.
        let _ = self.local.send(event).await;
    }
}
