//! Default output locations for captures.

use chrono::{DateTime, Local};
use directories::UserDirs;
use std::path::PathBuf;

/// What is being captured, which decides the default folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Still,
    Video,
}

impl MediaKind {
    fn prefix(&self) -> &'static str {
        match self {
            MediaKind::Still => "still",
            MediaKind::Video => "video",
        }
    }
}

/// Get the default output directory (Pictures or Videos, else home).
pub fn default_output_dir(kind: MediaKind) -> Result<PathBuf, String> {
    let user_dirs = UserDirs::new().ok_or("Could not determine user directories")?;

    let dir = match kind {
        MediaKind::Still => user_dirs.picture_dir(),
        MediaKind::Video => user_dirs.video_dir(),
    };
    Ok(dir
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| user_dirs.home_dir().to_path_buf()))
}

/// File name for a capture taken at `now`.
pub fn output_file_name(kind: MediaKind, extension: &str, now: DateTime<Local>) -> String {
    format!(
        "{}_{}.{}",
        kind.prefix(),
        now.format("%Y-%m-%d_%H%M%S"),
        extension
    )
}

/// Timestamped output path in the default directory, created if missing.
pub fn generate_output_path(kind: MediaKind, extension: &str) -> Result<PathBuf, String> {
    let output_dir = default_output_dir(kind)?;

    if !output_dir.exists() {
        std::fs::create_dir_all(&output_dir)
            .map_err(|e| format!("Failed to create output directory: {}", e))?;
    }

    Ok(output_dir.join(output_file_name(kind, extension, Local::now())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_output_file_name() {
        let now = Local.with_ymd_and_hms(2026, 3, 1, 14, 5, 9).unwrap();
        assert_eq!(
            output_file_name(MediaKind::Still, "jpg", now),
            "still_2026-03-01_140509.jpg"
        );
        assert_eq!(
            output_file_name(MediaKind::Video, "h264", now),
            "video_2026-03-01_140509.h264"
        );
    }
}
