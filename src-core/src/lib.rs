//! picam: task and reservation coordinator for the rpicam capture tools.
//!
//! A [`Camera`] drives one sensor through the external `rpicam-still`,
//! `rpicam-vid` and `rpicam-hello` binaries. It tracks running tool
//! processes by id, keeps an advisory reservation on the device, and turns
//! structured [`StillOptions`]/[`VideoOptions`] into tool arguments.

pub mod camera;
pub mod config;
pub mod error;
pub mod live;
pub mod reservation;
pub mod tasks;
pub mod tool;

pub use camera::{Camera, StillRequest, VideoRequest};
pub use config::{load_config, load_config_from, save_config, CameraConfig, ToolCommand, ToolConfig};
pub use error::{CameraError, Result};
pub use live::{LiveEvent, LiveStream};
pub use reservation::{ReservationState, RESERVE_TASK_ID};
pub use tasks::{Task, TaskRegistry};
pub use tool::{list_cameras, list_cameras_blocking, probe_ready, probe_ready_blocking};

pub use picam_common::{
    build_still_args, build_video_args, CameraDescriptor, ErrorInfo, OperationResult, SensorMode,
    StillOptions, VideoOptions,
};
