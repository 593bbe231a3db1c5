//! Capture options model shared by the still and video tools.
//!
//! Every tunable is optional. An unset field is `None`; numeric fields are
//! additionally treated as unset when negative, so `-1` can be used as an
//! explicit "leave at tool default" sentinel.

use serde::{Deserialize, Serialize};

/// Declares a closed string enumeration with `as_str`/`parse` helpers.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            /// All values in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Value as passed on the tool command line.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }

            /// Parse from string (case-insensitive).
            pub fn parse(s: &str) -> Option<Self> {
                let lower = s.to_lowercase();
                Self::ALL.iter().copied().find(|v| v.as_str() == lower)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum! {
    /// Digital zoom level, realized as a centered region of interest.
    pub enum Zoom {
        X1 => "1x",
        X2 => "2x",
        X3 => "3x",
        X4 => "4x",
        X5 => "5x",
        X6 => "6x",
        X7 => "7x",
        X8 => "8x",
        X9 => "9x",
        X10 => "10x",
    }
}

/// Normalized region of interest `(x, y, w, h)` within the sensor frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Roi {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Zoom {
    /// Fixed ROI for this zoom level.
    pub fn roi(&self) -> Roi {
        let (x, y, w, h) = match self {
            Zoom::X1 => (0.0, 0.0, 1.0, 1.0),
            Zoom::X2 => (0.25, 0.25, 0.5, 0.5),
            Zoom::X3 => (0.385, 0.385, 0.33, 0.33),
            Zoom::X4 => (0.375, 0.375, 0.25, 0.25),
            Zoom::X5 => (0.4, 0.4, 0.2, 0.2),
            Zoom::X6 => (0.42, 0.42, 0.16, 0.16),
            Zoom::X7 => (0.43, 0.43, 0.14, 0.14),
            Zoom::X8 => (0.437, 0.437, 0.125, 0.125),
            Zoom::X9 => (0.445, 0.445, 0.11, 0.11),
            Zoom::X10 => (0.45, 0.45, 0.1, 0.1),
        };
        Roi { x, y, w, h }
    }
}

impl Default for Zoom {
    fn default() -> Self {
        Zoom::X1
    }
}

string_enum! {
    /// Image effect applied by the ISP.
    pub enum Effect {
        None => "none",
        Negative => "negative",
        Solarise => "solarise",
        Posterise => "posterise",
        Whiteboard => "whiteboard",
        Blackboard => "blackboard",
        Sketch => "sketch",
        Denoise => "denoise",
        Emboss => "emboss",
        Oilpaint => "oilpaint",
        Hatch => "hatch",
        Gpen => "gpen",
        Pastel => "pastel",
        Watercolor => "watercolor",
        Film => "film",
        Blur => "blur",
        Saturation => "saturation",
        Colourswap => "colourswap",
        Washedout => "washedout",
        Colourpoint => "colourpoint",
        Colourbalance => "colourbalance",
        Cartoon => "cartoon",
    }
}

string_enum! {
    /// Auto white balance mode.
    pub enum Awb {
        Auto => "auto",
        Off => "off",
        Sun => "sun",
        Cloud => "cloud",
        Shade => "shade",
        Tungsten => "tungsten",
        Fluorescent => "fluorescent",
        Incandescent => "incandescent",
        Flash => "flash",
    }
}

string_enum! {
    /// Exposure profile.
    pub enum Exposure {
        Night => "night",
        Auto => "auto",
        Backlight => "backlight",
        Snow => "snow",
        Sports => "sports",
        NightPreview => "nightpreview",
        VeryLong => "verylong",
        FixedFps => "fixedfps",
        Antishake => "antishake",
        Spotlight => "spotlight",
        Beach => "beach",
    }
}

string_enum! {
    /// Autofocus search range.
    pub enum AutofocusRange {
        Normal => "normal",
        Macro => "macro",
    }
}

string_enum! {
    /// Image rotation in degrees.
    pub enum Rotation {
        Deg0 => "0",
        Deg90 => "90",
        Deg180 => "180",
        Deg270 => "270",
    }
}

string_enum! {
    /// Video codec used by the video tool.
    pub enum Codec {
        H264 => "h264",
        Mjpeg => "mjpeg",
        Yuv420 => "yuv420",
        H265 => "h265",
    }
}

string_enum! {
    /// H.264 encoder profile.
    pub enum CodecProfile {
        Baseline => "baseline",
        Main => "main",
        High => "high",
    }
}

/// Tunables understood by both the still and the video tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommonOptions {
    /// Disable the preview window
    pub no_preview: bool,
    pub contrast: Option<f64>,
    pub sharpness: Option<f64>,
    pub brightness: Option<f64>,
    pub saturation: Option<f64>,
    /// Exposure compensation (EV)
    pub exposure_compensation: Option<f64>,
    pub rotation: Option<Rotation>,
    pub flip_horizontal: bool,
    pub flip_vertical: bool,
    /// `None` leaves denoise at the tool default; `Some(false)` turns it off.
    pub denoise: Option<bool>,
    pub effect: Option<Effect>,
    pub zoom: Option<Zoom>,
    pub autofocus_on_capture: bool,
    pub autofocus_range: Option<AutofocusRange>,
    pub initial_command: Option<String>,
    pub final_command: Option<String>,
    /// Sensor mode, e.g. `4608:2592:10:P`
    pub mode: Option<String>,
    pub awb: Option<Awb>,
    /// Fixed red/blue gains, e.g. `1.5,1.2`
    pub awbgains: Option<String>,
    pub iso: Option<i64>,
    /// Wait for SIGUSR1 between captures
    pub signal: bool,
    /// Wait for ENTER between captures
    pub keypress: bool,
    pub exposure: Option<Exposure>,
    pub datetime: bool,
    /// File the tool writes frame metadata to (`-` for stdout)
    pub metadata: Option<String>,
    /// Output encoding, e.g. `jpg`, `png`, `yuv420`
    pub encoding: Option<String>,
}

/// Options for the still-capture tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StillOptions {
    #[serde(flatten)]
    pub common: CommonOptions,
    /// Delay before capture in milliseconds
    pub timeout: Option<i64>,
    /// JPEG quality (0-100)
    pub quality: Option<i64>,
    pub burst: bool,
    /// Interval between timelapse captures in milliseconds
    pub timelapse: Option<i64>,
}

/// Options for the video-capture tool. The recording duration is passed
/// separately since every video invocation needs one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoOptions {
    #[serde(flatten)]
    pub common: CommonOptions,
    pub fps: Option<f64>,
    /// Target bitrate, e.g. `4mbps`
    pub bitrate: Option<String>,
    pub codec: Option<Codec>,
    /// Split output into segments of this many milliseconds
    pub segment: Option<i64>,
    /// Keep writing into a circular buffer
    pub circular: bool,
    pub max_length: Option<String>,
    /// File the tool writes frame timestamps to
    pub save_pts: Option<String>,
    pub profile: Option<CodecProfile>,
    pub level: Option<String>,
    /// Intra-frame period
    pub intra: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_parse() {
        assert_eq!(Zoom::parse("3x"), Some(Zoom::X3));
        assert_eq!(Zoom::parse("10X"), Some(Zoom::X10));
        assert_eq!(Zoom::parse("11x"), None);
        assert_eq!(Zoom::default(), Zoom::X1);
    }

    #[test]
    fn test_zoom_table_is_centered() {
        for zoom in Zoom::ALL {
            let roi = zoom.roi();
            assert!(roi.x >= 0.0 && roi.y >= 0.0);
            assert!(roi.x + roi.w <= 1.0 + f64::EPSILON, "{} overflows", zoom);
            assert_eq!(roi.x, roi.y);
            assert_eq!(roi.w, roi.h);
        }
    }

    #[test]
    fn test_options_deserialize_flattened() {
        let json = r#"{"zoom": "2x", "flip_horizontal": true, "quality": 90, "denoise": false}"#;
        let options: StillOptions = serde_json::from_str(json).unwrap();
        assert_eq!(options.common.zoom, Some(Zoom::X2));
        assert!(options.common.flip_horizontal);
        assert_eq!(options.common.denoise, Some(false));
        assert_eq!(options.quality, Some(90));
        assert!(options.timeout.is_none());
    }

    #[test]
    fn test_video_options_deserialize_codec() {
        let json = r#"{"codec": "mjpeg", "fps": 30, "awb": "cloud"}"#;
        let options: VideoOptions = serde_json::from_str(json).unwrap();
        assert_eq!(options.codec, Some(Codec::Mjpeg));
        assert_eq!(options.fps, Some(30.0));
        assert_eq!(options.common.awb, Some(Awb::Cloud));
    }

    #[test]
    fn test_enum_parse_case_insensitive() {
        assert_eq!(Awb::parse("Tungsten"), Some(Awb::Tungsten));
        assert_eq!(Rotation::parse("180"), Some(Rotation::Deg180));
        assert_eq!(CodecProfile::parse("HIGH"), Some(CodecProfile::High));
        assert_eq!(Effect::parse("sepia"), None);
    }
}
