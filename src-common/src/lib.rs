//! picam common library
//!
//! Capture option model, argument rendering for the rpicam tools, camera
//! listing parser and the structured result shape shared by the core library
//! and the command-line front end. Nothing in here spawns processes.

pub mod args;
pub mod listing;
pub mod logging;
pub mod options;
pub mod result;

pub use args::{build_probe_args, build_still_args, build_video_args};
pub use listing::{parse_camera_list, CameraDescriptor, SensorMode};
pub use options::*;
pub use result::{ErrorInfo, OperationResult};
