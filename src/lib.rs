//! VIO Calibration Library
//!
//! Camera-calibration ingestion and normalization for visual(-inertial)
//! perception pipelines. The library reads two heterogeneous calibration
//! file formats and converts them into one canonical camera-parameter model:
//! - EuRoC-style structured YAML documents (OpenCV FileStorage convention)
//! - KITTI-style line-oriented calibration text dumps
//!
//! The resulting [`camera::CameraParams`] carries intrinsics, distortion,
//! resolution, frame interval, the body-from-camera pose, the derived
//! intrinsic matrix and the packed [`camera::Cal3DS2`] calibration consumed
//! by downstream geometric and estimation code, plus tolerance-based
//! structural equality and human-readable reporting.

pub mod camera;
pub mod geometry;
pub mod io;

// Re-export commonly used types
pub use camera::{Cal3DS2, CalibrationError, CameraParams, DistortionKind, Intrinsics, Resolution};
pub use io::{parse_euroc_yaml, parse_kitti_calib};
