//! Calibration source parsers.
//!
//! Two file formats converge on the same [`crate::camera::CameraParams`]
//! model: EuRoC-style structured YAML ([`parse_euroc_yaml`]) and KITTI-style
//! line-oriented text dumps ([`parse_kitti_calib`]). Both are pure functions;
//! they either return a fully populated model or a
//! [`crate::camera::CalibrationError`].

pub mod euroc;
pub mod kitti;

pub use euroc::parse_euroc_yaml;
pub use kitti::parse_kitti_calib;
