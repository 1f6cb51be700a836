//! Canonical camera-parameter types shared by every calibration source.
//!
//! The central entity is [`CameraParams`], populated by the parsers in
//! [`crate::io`] and consumed by downstream geometry (undistortion,
//! rectification, projection, pose estimation). This module holds the small
//! plain-data types ([`Intrinsics`], [`Resolution`], [`DistortionKind`]) and
//! the crate-wide [`CalibrationError`].

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod cal3ds2;
pub mod params;

pub use cal3ds2::Cal3DS2;
pub use params::CameraParams;

/// Pinhole intrinsic parameters in pixel units: focal lengths and principal
/// point, matching the `[fx, fy, cx, cy]` ordering of calibration files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intrinsics {
    pub fx: f64,
    pub fy: f64,
    pub cx: f64,
    pub cy: f64,
}

/// Image resolution in pixels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

/// Distortion model tag carried by a [`CameraParams`].
///
/// Only the 4-parameter radial-tangential model is supported today; the
/// packed-calibration builder dispatches on this tag so that further models
/// extend the enum instead of re-assuming a coefficient layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistortionKind {
    /// Radial-tangential distortion using `[k1, k2, p1, p2]`.
    RadialTangential4,
}

impl fmt::Display for DistortionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistortionKind::RadialTangential4 => write!(f, "radial-tangential"),
        }
    }
}

/// Errors produced while loading a calibration source.
///
/// A parser either returns a fully populated [`CameraParams`] or one of these;
/// no partial model is ever handed back.
#[derive(thiserror::Error, Debug)]
pub enum CalibrationError {
    #[error("Cannot open calibration source {path}: {source}")]
    SourceUnavailable {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed calibration field `{field}`: {message}")]
    FormatError { field: String, message: String },
    #[error("Transform data has {len} values but declares {rows}x{cols}")]
    DimensionMismatch {
        rows: usize,
        cols: usize,
        len: usize,
    },
}

impl CalibrationError {
    /// Shorthand for a [`CalibrationError::FormatError`] with owned context.
    pub fn format(field: impl Into<String>, message: impl Into<String>) -> Self {
        CalibrationError::FormatError {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<yaml_rust::ScanError> for CalibrationError {
    fn from(err: yaml_rust::ScanError) -> Self {
        CalibrationError::format("document", err.to_string())
    }
}
