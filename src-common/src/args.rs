//! Rendering of capture options into tool argument vectors.
//!
//! Options map to flags through declarative tables of [`FlagRule`]s. A rule
//! emits its flag only when its predicate holds; the value formatter returns
//! `None` for bare flags. The common table is shared by the still and the
//! video tool so both render identical flags for identical tunables.
//!
//! Values are passed as single argv elements and are never quoted or split.

use crate::options::{CommonOptions, StillOptions, VideoOptions};

/// One option-to-flag mapping.
pub struct FlagRule<T> {
    pub flag: &'static str,
    pub when: fn(&T) -> bool,
    pub value: fn(&T) -> Option<String>,
}

/// A numeric tunable counts as set only when present and non-negative.
fn is_set<N: Into<f64> + Copy>(value: Option<N>) -> bool {
    value.map(|v| v.into() >= 0.0).unwrap_or(false)
}

fn is_filled(value: &Option<String>) -> bool {
    value.as_deref().map(|s| !s.is_empty()).unwrap_or(false)
}

fn show<V: ToString>(value: &Option<V>) -> Option<String> {
    value.as_ref().map(ToString::to_string)
}

fn bare<T>(_: &T) -> Option<String> {
    None
}

fn i64_set(value: Option<i64>) -> bool {
    // i64 has no lossless Into<f64>
    value.map(|v| v >= 0).unwrap_or(false)
}

/// Flags shared by both tools.
fn common_rules() -> Vec<FlagRule<CommonOptions>> {
    vec![
        FlagRule {
            flag: "--roi",
            when: |o: &CommonOptions| o.zoom.is_some(),
            value: |o: &CommonOptions| {
                let roi = o.zoom.unwrap_or_default().roi();
                Some(format!("{},{},{},{}", roi.x, roi.y, roi.w, roi.h))
            },
        },
        FlagRule {
            flag: "--encoding",
            when: |o: &CommonOptions| is_filled(&o.encoding),
            value: |o: &CommonOptions| o.encoding.clone(),
        },
        FlagRule {
            flag: "--iso",
            when: |o: &CommonOptions| i64_set(o.iso),
            value: |o: &CommonOptions| show(&o.iso),
        },
        FlagRule {
            flag: "--effect",
            when: |o: &CommonOptions| o.effect.is_some(),
            value: |o: &CommonOptions| show(&o.effect),
        },
        FlagRule {
            flag: "--exposure",
            when: |o: &CommonOptions| o.exposure.is_some(),
            value: |o: &CommonOptions| show(&o.exposure),
        },
        FlagRule {
            flag: "--ev",
            when: |o: &CommonOptions| is_set(o.exposure_compensation),
            value: |o: &CommonOptions| show(&o.exposure_compensation),
        },
        FlagRule {
            flag: "--nopreview",
            when: |o: &CommonOptions| o.no_preview,
            value: bare,
        },
        FlagRule {
            flag: "--contrast",
            when: |o: &CommonOptions| is_set(o.contrast),
            value: |o: &CommonOptions| show(&o.contrast),
        },
        FlagRule {
            flag: "--sharpness",
            when: |o: &CommonOptions| is_set(o.sharpness),
            value: |o: &CommonOptions| show(&o.sharpness),
        },
        FlagRule {
            flag: "--brightness",
            when: |o: &CommonOptions| is_set(o.brightness),
            value: |o: &CommonOptions| show(&o.brightness),
        },
        FlagRule {
            flag: "--hflip",
            when: |o: &CommonOptions| o.flip_horizontal,
            value: bare,
        },
        FlagRule {
            flag: "--vflip",
            when: |o: &CommonOptions| o.flip_vertical,
            value: bare,
        },
        FlagRule {
            flag: "--denoise",
            when: |o: &CommonOptions| o.denoise.is_some(),
            value: |o: &CommonOptions| o.denoise.map(|on| (if on { "on" } else { "off" }).to_string()),
        },
        FlagRule {
            flag: "--saturation",
            when: |o: &CommonOptions| is_set(o.saturation),
            value: |o: &CommonOptions| show(&o.saturation),
        },
        FlagRule {
            flag: "--awb",
            when: |o: &CommonOptions| o.awb.is_some(),
            value: |o: &CommonOptions| show(&o.awb),
        },
        FlagRule {
            flag: "--autofocus-on-capture",
            when: |o: &CommonOptions| o.autofocus_on_capture,
            value: bare,
        },
        FlagRule {
            flag: "--autofocus-range",
            when: |o: &CommonOptions| o.autofocus_range.is_some(),
            value: |o: &CommonOptions| show(&o.autofocus_range),
        },
        FlagRule {
            flag: "--mode",
            when: |o: &CommonOptions| is_filled(&o.mode),
            value: |o: &CommonOptions| o.mode.clone(),
        },
        FlagRule {
            flag: "--rotation",
            when: |o: &CommonOptions| o.rotation.is_some(),
            value: |o: &CommonOptions| show(&o.rotation),
        },
        FlagRule {
            flag: "--datetime",
            when: |o: &CommonOptions| o.datetime,
            value: bare,
        },
        FlagRule {
            flag: "--awbgains",
            when: |o: &CommonOptions| is_filled(&o.awbgains),
            value: |o: &CommonOptions| o.awbgains.clone(),
        },
        FlagRule {
            flag: "--metadata",
            when: |o: &CommonOptions| is_filled(&o.metadata),
            value: |o: &CommonOptions| o.metadata.clone(),
        },
        FlagRule {
            flag: "--final",
            when: |o: &CommonOptions| is_filled(&o.final_command),
            value: |o: &CommonOptions| o.final_command.clone(),
        },
        FlagRule {
            flag: "--initial",
            when: |o: &CommonOptions| is_filled(&o.initial_command),
            value: |o: &CommonOptions| o.initial_command.clone(),
        },
        FlagRule {
            flag: "--signal",
            when: |o: &CommonOptions| o.signal,
            value: bare,
        },
        FlagRule {
            flag: "--keypress",
            when: |o: &CommonOptions| o.keypress,
            value: bare,
        },
    ]
}

fn still_rules() -> Vec<FlagRule<StillOptions>> {
    vec![
        FlagRule {
            flag: "--timeout",
            when: |o: &StillOptions| i64_set(o.timeout),
            value: |o: &StillOptions| show(&o.timeout),
        },
        FlagRule {
            flag: "--quality",
            when: |o: &StillOptions| i64_set(o.quality),
            value: |o: &StillOptions| show(&o.quality),
        },
        FlagRule {
            flag: "--burst",
            when: |o: &StillOptions| o.burst,
            value: bare,
        },
        FlagRule {
            flag: "--timelapse",
            when: |o: &StillOptions| i64_set(o.timelapse),
            value: |o: &StillOptions| show(&o.timelapse),
        },
    ]
}

fn video_rules() -> Vec<FlagRule<VideoOptions>> {
    vec![
        FlagRule {
            flag: "--framerate",
            when: |o: &VideoOptions| is_set(o.fps),
            value: |o: &VideoOptions| show(&o.fps),
        },
        FlagRule {
            flag: "--intra",
            when: |o: &VideoOptions| i64_set(o.intra),
            value: |o: &VideoOptions| show(&o.intra),
        },
        FlagRule {
            flag: "--codec",
            when: |o: &VideoOptions| o.codec.is_some(),
            value: |o: &VideoOptions| show(&o.codec),
        },
        FlagRule {
            flag: "--segment",
            when: |o: &VideoOptions| i64_set(o.segment),
            value: |o: &VideoOptions| show(&o.segment),
        },
        FlagRule {
            flag: "--level",
            when: |o: &VideoOptions| is_filled(&o.level),
            value: |o: &VideoOptions| o.level.clone(),
        },
        FlagRule {
            flag: "--profile",
            when: |o: &VideoOptions| o.profile.is_some(),
            value: |o: &VideoOptions| show(&o.profile),
        },
        FlagRule {
            flag: "--bitrate",
            when: |o: &VideoOptions| is_filled(&o.bitrate),
            value: |o: &VideoOptions| o.bitrate.clone(),
        },
        FlagRule {
            flag: "--save-pts",
            when: |o: &VideoOptions| is_filled(&o.save_pts),
            value: |o: &VideoOptions| o.save_pts.clone(),
        },
        FlagRule {
            flag: "--max-length",
            when: |o: &VideoOptions| is_filled(&o.max_length),
            value: |o: &VideoOptions| o.max_length.clone(),
        },
        FlagRule {
            flag: "--circular",
            when: |o: &VideoOptions| o.circular,
            value: bare,
        },
    ]
}

/// Evaluate a rule table against one options value.
fn apply<T>(rules: &[FlagRule<T>], options: &T, argv: &mut Vec<String>) {
    for rule in rules {
        if !(rule.when)(options) {
            continue;
        }
        argv.push(rule.flag.to_string());
        if let Some(value) = (rule.value)(options) {
            argv.push(value);
        }
    }
}

/// Output, geometry and device flags appended to every invocation.
fn push_target(argv: &mut Vec<String>, index: u32, output: &str, width: u32, height: u32) {
    if !output.is_empty() {
        argv.push("--output".to_string());
        argv.push(output.to_string());
    }
    argv.push("--width".to_string());
    argv.push(width.to_string());
    argv.push("--height".to_string());
    argv.push(height.to_string());
    argv.push("--camera".to_string());
    argv.push(index.to_string());
}

/// Render the argument vector for the still-capture tool.
///
/// An empty `output` omits `--output`; `-` writes the image to stdout.
pub fn build_still_args(
    index: u32,
    output: &str,
    width: u32,
    height: u32,
    options: &StillOptions,
) -> Vec<String> {
    let mut argv = Vec::new();
    apply(&common_rules(), &options.common, &mut argv);
    apply(&still_rules(), options, &mut argv);
    push_target(&mut argv, index, output, width, height);
    argv
}

/// Render the argument vector for the video-capture tool.
///
/// `timeout` is the recording duration in milliseconds; `0` records until the
/// process is signalled. A negative timeout omits the flag.
pub fn build_video_args(
    index: u32,
    output: &str,
    timeout: i64,
    width: u32,
    height: u32,
    options: &VideoOptions,
) -> Vec<String> {
    let mut argv = Vec::new();
    apply(&common_rules(), &options.common, &mut argv);
    if timeout >= 0 {
        argv.push("--timeout".to_string());
        argv.push(timeout.to_string());
    }
    apply(&video_rules(), options, &mut argv);
    push_target(&mut argv, index, output, width, height);
    argv
}

/// Arguments for the readiness probe: a minimal capture discarded to stdout.
pub fn build_probe_args(index: u32) -> Vec<String> {
    vec![
        "--camera".to_string(),
        index.to_string(),
        "--timeout".to_string(),
        "10".to_string(),
        "--output".to_string(),
        "-".to_string(),
    ]
}
