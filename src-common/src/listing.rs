//! Parsing of the `--list-cameras` report printed by the hello tool.
//!
//! Typical output:
//!
//! ```text
//! Available cameras
//! -----------------
//! 0 : imx708 [4608x2592 10-bit RGGB] (/base/soc/i2c0mux/i2c@1/imx708@1a)
//!     Modes: 'SRGGB10_CSI2P' : 1536x864 [120.13 fps - (768, 432)/3072x1728 crop]
//!                              2304x1296 [56.03 fps - (0, 0)/4608x2592 crop]
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Marker printed when no sensor is attached.
pub const NO_CAMERAS_MARKER: &str = "No cameras available!";

/// Line separating the report header from the camera entries.
const SECTION_DELIMITER: &str = "-----------------";

/// `index : name [WxH bit-depth filter] (path)`
static CAMERA_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(\d+)\s*:\s*(\S+)\s*\[(\d+)x(\d+)(?:\s+([^\]\s]+))?(?:\s+([^\]\s]+))?\]\s*\(([^)]*)\)",
    )
    .unwrap()
});

static MODE_ENTRY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:'([^']+)'\s*:\s*)?(\d+)x(\d+)\s*\[([\d.]+)\s*fps\s*-\s*\((\d+),\s*(\d+)\)/(\d+)x(\d+)\s*crop\]",
    )
    .unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offset {
    pub x: u32,
    pub y: u32,
}

/// One sensor mode listed under `Modes:`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorMode {
    /// Pixel format, e.g. `SRGGB10_CSI2P`
    pub format: String,
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub crop_offset: Offset,
    pub crop: Resolution,
}

/// One attached camera as reported by the hello tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraDescriptor {
    pub index: u32,
    /// Sensor name, e.g. `imx708`
    pub name: String,
    pub resolution: Resolution,
    /// Device tree path of the sensor
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bit_depth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_filter: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modes: Vec<SensorMode>,
}

/// Parse the full `--list-cameras` output.
///
/// Returns an empty list when the tool reports no cameras. Lines that are
/// neither a camera entry nor a mode entry are ignored.
pub fn parse_camera_list(raw: &str) -> Vec<CameraDescriptor> {
    if raw.contains(NO_CAMERAS_MARKER) {
        return Vec::new();
    }

    let body = match raw.find(SECTION_DELIMITER) {
        Some(pos) => &raw[pos + SECTION_DELIMITER.len()..],
        None => raw,
    };

    let mut cameras: Vec<CameraDescriptor> = Vec::new();
    let mut format = String::new();

    for line in body.lines() {
        if let Some(caps) = CAMERA_LINE.captures(line) {
            let mut descriptor = CameraDescriptor {
                index: caps[1].parse().unwrap_or(0),
                name: caps[2].to_string(),
                resolution: Resolution {
                    width: caps[3].parse().unwrap_or(0),
                    height: caps[4].parse().unwrap_or(0),
                },
                path: caps[7].trim().to_string(),
                bit_depth: None,
                color_filter: None,
                modes: Vec::new(),
            };
            for extra in [caps.get(5), caps.get(6)].into_iter().flatten() {
                let extra = extra.as_str();
                if extra.ends_with("-bit") {
                    descriptor.bit_depth = Some(extra.to_string());
                } else {
                    descriptor.color_filter = Some(extra.to_string());
                }
            }
            format.clear();
            cameras.push(descriptor);
            continue;
        }

        let Some(current) = cameras.last_mut() else {
            continue;
        };
        for caps in MODE_ENTRY.captures_iter(line) {
            if let Some(fmt) = caps.get(1) {
                format = fmt.as_str().to_string();
            }
            current.modes.push(SensorMode {
                format: format.clone(),
                width: caps[2].parse().unwrap_or(0),
                height: caps[3].parse().unwrap_or(0),
                fps: caps[4].parse().unwrap_or(0.0),
                crop_offset: Offset {
                    x: caps[5].parse().unwrap_or(0),
                    y: caps[6].parse().unwrap_or(0),
                },
                crop: Resolution {
                    width: caps[7].parse().unwrap_or(0),
                    height: caps[8].parse().unwrap_or(0),
                },
            });
        }
    }

    cameras
}
