//! Registry of live capture-tool processes for one camera.
//!
//! Each entry pairs a caller-chosen id with the pid of the process doing the
//! work. Entries are added right after a process is spawned and removed by
//! whoever owns the completion of that process. Cancellation only delivers a
//! signal; the owner notices the exit and removes the entry.

use crate::error::{CameraError, Result};
use serde::Serialize;
use std::io;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

/// A tracked external process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    pub id: String,
    pub pid: u32,
}

#[derive(Debug, Default)]
pub struct TaskRegistry {
    tasks: Mutex<Vec<Task>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Task>> {
        // Entries stay consistent even if a holder panicked mid-section.
        self.tasks.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Track `pid` under `id`. Fails if `id` is already live.
    pub fn register(&self, id: &str, pid: u32) -> Result<()> {
        let mut tasks = self.lock();
        if tasks.iter().any(|t| t.id == id) {
            return Err(CameraError::DuplicateTaskId(id.to_string()));
        }
        tasks.push(Task {
            id: id.to_string(),
            pid,
        });
        debug!("Registered task '{}' (pid {})", id, pid);
        Ok(())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.lock().iter().any(|t| t.id == id)
    }

    pub fn pid_of(&self, id: &str) -> Option<u32> {
        self.lock().iter().find(|t| t.id == id).map(|t| t.pid)
    }

    /// Drop the entry for `id`, returning it if present.
    pub fn remove(&self, id: &str) -> Option<Task> {
        let mut tasks = self.lock();
        let pos = tasks.iter().position(|t| t.id == id)?;
        Some(tasks.remove(pos))
    }

    /// Drop the entry owning `pid`. Used by completion paths, which know the
    /// process they reaped even if its id has since been reused.
    pub fn remove_pid(&self, pid: u32) -> Option<Task> {
        let mut tasks = self.lock();
        let pos = tasks.iter().position(|t| t.pid == pid)?;
        let task = tasks.remove(pos);
        debug!("Removed task '{}' (pid {})", task.id, pid);
        Some(task)
    }

    /// Signal the process tracked under `id`: SIGKILL when `force`, otherwise
    /// SIGTERM. The entry is left in place for the completion path.
    pub fn cancel(&self, id: &str, force: bool) -> Result<()> {
        let pid = self
            .pid_of(id)
            .ok_or_else(|| CameraError::UnknownTaskId(id.to_string()))?;
        send_signal(pid, force).map_err(|e| CameraError::SignalFailed {
            id: id.to_string(),
            message: e.to_string(),
        })?;
        debug!("Sent {} to task '{}' (pid {})", signal_name(force), id, pid);
        Ok(())
    }

    /// Signal every tracked process. Keeps going past failures and reports
    /// them together once every task has been attempted.
    pub fn cancel_all(&self, force: bool) -> Result<()> {
        let failures: Vec<String> = self
            .snapshot()
            .into_iter()
            .filter_map(|task| match send_signal(task.pid, force) {
                Ok(()) => None,
                Err(e) => {
                    warn!("Failed to signal task '{}' (pid {}): {}", task.id, task.pid, e);
                    Some(format!("{} ({})", task.id, e))
                }
            })
            .collect();

        if failures.is_empty() {
            Ok(())
        } else {
            Err(CameraError::CancelAllPartialFailure(failures.join(", ")))
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Copy of the current entries in registration order.
    pub fn snapshot(&self) -> Vec<Task> {
        self.lock().clone()
    }
}

fn signal_name(force: bool) -> &'static str {
    if force {
        "SIGKILL"
    } else {
        "SIGTERM"
    }
}

/// Deliver SIGKILL (`force`) or SIGTERM to `pid`.
#[cfg(unix)]
pub(crate) fn send_signal(pid: u32, force: bool) -> io::Result<()> {
    let signal = if force { libc::SIGKILL } else { libc::SIGTERM };
    let pid = libc::pid_t::try_from(pid)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "pid out of range"))?;
    // SAFETY: kill(2) has no memory-safety preconditions.
    let rc = unsafe { libc::kill(pid, signal) };
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
pub(crate) fn send_signal(_pid: u32, _force: bool) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "signals are only supported on unix",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_rejects_duplicate() {
        let registry = TaskRegistry::new();
        registry.register("a", 100).unwrap();
        assert_eq!(
            registry.register("a", 101),
            Err(CameraError::DuplicateTaskId("a".into()))
        );
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.pid_of("a"), Some(100));
    }

    #[test]
    fn test_id_reusable_after_remove() {
        let registry = TaskRegistry::new();
        registry.register("a", 100).unwrap();
        assert_eq!(registry.remove("a").map(|t| t.pid), Some(100));
        assert!(registry.remove("a").is_none());
        registry.register("a", 200).unwrap();
        assert!(registry.contains("a"));
    }

    #[test]
    fn test_remove_pid_only_touches_owner() {
        let registry = TaskRegistry::new();
        registry.register("a", 100).unwrap();
        registry.register("b", 200).unwrap();
        assert!(registry.remove_pid(300).is_none());
        assert_eq!(registry.remove_pid(200).map(|t| t.id), Some("b".to_string()));
        assert_eq!(
            registry.snapshot(),
            vec![Task {
                id: "a".into(),
                pid: 100
            }]
        );
    }

    #[test]
    fn test_cancel_unknown_id() {
        let registry = TaskRegistry::new();
        assert_eq!(
            registry.cancel("missing", true),
            Err(CameraError::UnknownTaskId("missing".into()))
        );
    }

    #[test]
    fn test_cancel_all_empty_is_ok() {
        assert!(TaskRegistry::new().cancel_all(true).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_cancel_kills_process_and_keeps_entry() {
        let mut child = std::process::Command::new("sleep").arg("30").spawn().unwrap();
        let registry = TaskRegistry::new();
        registry.register("sleeper", child.id()).unwrap();

        registry.cancel("sleeper", true).unwrap();
        let status = child.wait().unwrap();
        assert!(status.code().is_none());
        // removal belongs to the completion path
        assert!(registry.contains("sleeper"));
    }

    #[cfg(unix)]
    #[test]
    fn test_force_selects_kill_over_term() {
        use std::os::unix::process::ExitStatusExt;

        let registry = TaskRegistry::new();
        let mut gentle = std::process::Command::new("sleep").arg("30").spawn().unwrap();
        registry.register("gentle", gentle.id()).unwrap();
        registry.cancel("gentle", false).unwrap();
        assert_eq!(gentle.wait().unwrap().signal(), Some(libc::SIGTERM));

        let mut forced = std::process::Command::new("sleep").arg("30").spawn().unwrap();
        registry.register("forced", forced.id()).unwrap();
        registry.cancel("forced", true).unwrap();
        assert_eq!(forced.wait().unwrap().signal(), Some(libc::SIGKILL));
    }

    #[cfg(unix)]
    #[test]
    fn test_cancel_all_reports_failures_and_continues() {
        let mut child = std::process::Command::new("sleep").arg("30").spawn().unwrap();
        let registry = TaskRegistry::new();
        // pid far beyond pid_max, so kill(2) fails with ESRCH
        registry.register("ghost", i32::MAX as u32).unwrap();
        registry.register("sleeper", child.id()).unwrap();

        let err = registry.cancel_all(false).unwrap_err();
        assert_eq!(err.kind(), "KILLING_ALL_ID_ERROR");
        assert!(err.to_string().contains("ghost"));

        // the live process was still signalled
        let status = child.wait().unwrap();
        assert!(status.code().is_none());
        assert_eq!(registry.len(), 2);
    }
}
