//! Platform-specific logging directory resolution.

use std::path::PathBuf;

/// Returns the platform-appropriate directory for log files.
///
/// | Platform | Directory |
/// |----------|-----------|
/// | Linux | `$XDG_STATE_HOME/picam/logs` or `~/.local/state/picam/logs` |
/// | other | `<data_local_dir>/picam/logs` |
///
/// Falls back to `./logs` when no home directory can be determined, which is
/// the case for some service accounts on embedded images.
pub fn log_dir() -> PathBuf {
    let Some(base) = directories::ProjectDirs::from("", "", "picam") else {
        return PathBuf::from("logs");
    };

    #[cfg(target_os = "linux")]
    {
        base.state_dir()
            .unwrap_or_else(|| base.data_local_dir())
            .join("logs")
    }

    #[cfg(not(target_os = "linux"))]
    {
        base.data_local_dir().join("logs")
    }
}

/// Ensures the log directory exists, creating it if necessary.
pub fn ensure_log_dir() -> Result<PathBuf, std::io::Error> {
    let dir = log_dir();
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// File name prefix for the rolling log files (`picam.log.2026-03-01`).
pub const LOG_FILE_PREFIX: &str = "picam.log";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_dir_ends_with_logs() {
        assert!(log_dir().ends_with("logs"));
    }

    #[test]
    fn test_log_file_prefix_is_a_plain_name() {
        let joined = log_dir().join(LOG_FILE_PREFIX);
        assert_eq!(joined.parent(), Some(log_dir().as_path()));
    }
}
