//! Advisory device reservation.
//!
//! A camera is `Held` while a background video capture with the reserved
//! task id [`RESERVE_TASK_ID`] keeps the sensor open. The holder discards its
//! output. Nothing stops a process outside this library from grabbing the
//! device once the holder is gone, so the lock is advisory only.

use crate::config::ToolConfig;
use crate::error::{CameraError, Result};
use crate::tasks::{send_signal, TaskRegistry};
use crate::tool;
use picam_common::{build_video_args, VideoOptions};
use std::process::Stdio;
use std::sync::mpsc;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Task id of the reservation holder.
pub const RESERVE_TASK_ID: &str = "Reserve";

const HOLDER_SIZE: u32 = 50;
const HOLDER_FPS: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationState {
    Free,
    Held,
}

struct Holder {
    pid: u32,
    /// Fires once the watcher has reaped the holder process.
    exited: mpsc::Receiver<()>,
}

#[derive(Default)]
struct Slot {
    /// Bumped on every hold and release so a stale watcher cannot clear a
    /// newer holder.
    generation: u64,
    holder: Option<Holder>,
}

/// Handle to a holder that has been told to exit.
pub(crate) struct Released {
    pid: u32,
    exited: mpsc::Receiver<()>,
}

impl Released {
    /// Block until the holder is reaped or `timeout` elapses.
    pub(crate) fn wait_blocking(self, timeout: Duration) -> bool {
        let exited = self.exited.recv_timeout(timeout).is_ok();
        if !exited {
            warn!("Reservation holder (pid {}) still running after {:?}", self.pid, timeout);
        }
        exited
    }

    /// Async variant of [`Released::wait_blocking`].
    pub(crate) async fn wait(self, timeout: Duration) -> bool {
        let pid = self.pid;
        match tokio::task::spawn_blocking(move || self.wait_blocking(timeout)).await {
            Ok(exited) => exited,
            Err(e) => {
                warn!("Waiting for reservation holder (pid {}) failed: {}", pid, e);
                false
            }
        }
    }
}

/// Reservation state machine for one camera index.
pub struct Reservation {
    index: u32,
    tools: ToolConfig,
    registry: Arc<TaskRegistry>,
    slot: Arc<Mutex<Slot>>,
}

fn lock(slot: &Mutex<Slot>) -> MutexGuard<'_, Slot> {
    slot.lock().unwrap_or_else(|e| e.into_inner())
}

fn holder_options() -> VideoOptions {
    let mut options = VideoOptions {
        fps: Some(HOLDER_FPS),
        ..VideoOptions::default()
    };
    options.common.no_preview = true;
    options
}

impl Reservation {
    pub fn new(index: u32, tools: ToolConfig, registry: Arc<TaskRegistry>) -> Self {
        Self {
            index,
            tools,
            registry,
            slot: Arc::new(Mutex::new(Slot::default())),
        }
    }

    pub fn state(&self) -> ReservationState {
        if lock(&self.slot).holder.is_some() {
            ReservationState::Held
        } else {
            ReservationState::Free
        }
    }

    pub fn is_held(&self) -> bool {
        self.state() == ReservationState::Held
    }

    /// Reserve the device, probing it first. A no-op when already held.
    pub fn reserve_blocking(&self) -> Result<()> {
        if self.is_held() {
            return Ok(());
        }
        if !tool::probe_ready_blocking(&self.tools, self.index) {
            return Err(CameraError::DeviceBusy);
        }
        self.hold()
    }

    /// Async variant of [`Reservation::reserve_blocking`].
    pub async fn reserve(&self) -> Result<()> {
        if self.is_held() {
            return Ok(());
        }
        if !tool::probe_ready(&self.tools, self.index).await {
            return Err(CameraError::DeviceBusy);
        }
        self.hold()
    }

    /// Start the holder process and track it. Returns once it is spawned.
    fn hold(&self) -> Result<()> {
        let mut slot = lock(&self.slot);
        if slot.holder.is_some() {
            return Ok(());
        }

        let argv = build_video_args(self.index, "-", 0, HOLDER_SIZE, HOLDER_SIZE, &holder_options());
        let mut child = tool::std_command(&self.tools.video, &argv)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| tool::spawn_error(&self.tools.video, e))?;
        let pid = child.id();

        if let Err(e) = self.registry.register(RESERVE_TASK_ID, pid) {
            let _ = child.kill();
            let _ = child.wait();
            return Err(e);
        }

        slot.generation += 1;
        let generation = slot.generation;
        let (tx, rx) = mpsc::channel();
        slot.holder = Some(Holder { pid, exited: rx });
        drop(slot);

        let registry = Arc::clone(&self.registry);
        let watched = Arc::clone(&self.slot);
        let spawned = std::thread::Builder::new()
            .name(format!("picam-reserve-{}", self.index))
            .spawn(move || {
                let status = child.wait();
                registry.remove_pid(pid);
                {
                    let mut slot = lock(&watched);
                    if slot.generation == generation {
                        slot.holder = None;
                        warn!("Reservation holder (pid {}) exited on its own: {:?}", pid, status);
                    }
                }
                let _ = tx.send(());
            });

        if let Err(e) = spawned {
            // Without a watcher nobody would reap the holder.
            let _ = send_signal(pid, true);
            self.registry.remove_pid(pid);
            lock(&self.slot).holder = None;
            return Err(CameraError::Spawn {
                tool: "reservation watcher".to_string(),
                message: e.to_string(),
            });
        }

        info!("Camera {} reserved (holder pid {})", self.index, pid);
        Ok(())
    }

    /// Kill the holder and return to `Free` without waiting for it to exit.
    pub(crate) fn release(&self) -> Option<Released> {
        let holder = {
            let mut slot = lock(&self.slot);
            let holder = slot.holder.take()?;
            slot.generation += 1;
            holder
        };

        // The holder is the one task removed by its canceller rather than its
        // completion path: the id is freed here so the next hold can register
        // before the watcher reaps. The watcher's own remove_pid is then a no-op.
        self.registry.remove_pid(holder.pid);
        if let Err(e) = send_signal(holder.pid, true) {
            debug!("Signalling reservation holder (pid {}) failed: {}", holder.pid, e);
        }
        info!("Camera {} released (holder pid {})", self.index, holder.pid);

        Some(Released {
            pid: holder.pid,
            exited: holder.exited,
        })
    }

    /// Public unlock: `NotReserved` when nothing is held.
    pub fn unlock(&self) -> Result<()> {
        self.release().map(|_| ()).ok_or(CameraError::NotReserved)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::testing::script;

    fn reservation(still: &str, video: &str) -> (Reservation, Arc<TaskRegistry>) {
        let tools = ToolConfig {
            still: script(still),
            video: script(video),
            ..ToolConfig::default()
        };
        let registry = Arc::new(TaskRegistry::new());
        (Reservation::new(0, tools, Arc::clone(&registry)), registry)
    }

    #[test]
    fn test_busy_device_cannot_be_reserved() {
        let (reservation, registry) = reservation("exit 1", "exec sleep 30");
        assert_eq!(reservation.reserve_blocking(), Err(CameraError::DeviceBusy));
        assert_eq!(reservation.state(), ReservationState::Free);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unlock_when_free() {
        let (reservation, _) = reservation("exit 0", "exec sleep 30");
        assert_eq!(reservation.unlock(), Err(CameraError::NotReserved));
    }

    #[test]
    fn test_reserve_is_idempotent_and_unlock_frees() {
        let (reservation, registry) = reservation("exit 0", "exec sleep 30");

        reservation.reserve_blocking().unwrap();
        let pid = registry.pid_of(RESERVE_TASK_ID).unwrap();
        reservation.reserve_blocking().unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.pid_of(RESERVE_TASK_ID), Some(pid));

        let released = reservation.release().unwrap();
        assert!(!registry.contains(RESERVE_TASK_ID));
        assert!(released.wait_blocking(Duration::from_secs(5)));
        assert_eq!(reservation.state(), ReservationState::Free);
        assert_eq!(reservation.unlock(), Err(CameraError::NotReserved));
    }

    #[test]
    fn test_hold_again_before_old_holder_is_reaped() {
        let (reservation, registry) = reservation("exit 0", "exec sleep 30");
        reservation.reserve_blocking().unwrap();
        let old = registry.pid_of(RESERVE_TASK_ID).unwrap();

        let released = reservation.release().unwrap();
        reservation.reserve_blocking().unwrap();
        let new = registry.pid_of(RESERVE_TASK_ID).unwrap();
        assert_ne!(new, old);

        // the old watcher finishes without touching the new holder
        assert!(released.wait_blocking(Duration::from_secs(5)));
        assert!(reservation.is_held());
        assert_eq!(registry.pid_of(RESERVE_TASK_ID), Some(new));
        reservation.unlock().unwrap();
    }

    #[test]
    fn test_holder_exit_returns_to_free() {
        let (reservation, registry) = reservation("exit 0", "sleep 0.1");
        reservation.reserve_blocking().unwrap();

        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while reservation.is_held() && std::time::Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(20));
        }
        assert_eq!(reservation.state(), ReservationState::Free);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_holder_spawn_failure() {
        let tools = ToolConfig {
            still: script("exit 0"),
            video: crate::config::ToolCommand::new("/nonexistent/rpicam-vid"),
            ..ToolConfig::default()
        };
        let registry = Arc::new(TaskRegistry::new());
        let reservation = Reservation::new(0, tools, Arc::clone(&registry));
        let err = reservation.reserve_blocking().unwrap_err();
        assert_eq!(err.kind(), "SPAWN_FAILED");
        assert!(!reservation.is_held());
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_reserve_async() {
        let (reservation, registry) = reservation("exit 0", "exec sleep 30");
        reservation.reserve().await.unwrap();
        assert!(registry.contains(RESERVE_TASK_ID));
        let released = reservation.release().unwrap();
        assert!(released.wait(Duration::from_secs(5)).await);
    }
}
