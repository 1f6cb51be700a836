//! Parser for KITTI-style line-oriented calibration dumps.
//!
//! A single `calib_cam_to_cam.txt`-style file carries the calibration of
//! every camera on the rig; each line starts with a label such as `K_00:`
//! naming the field and the camera it belongs to. The caller selects one
//! camera by identifier and supplies the body-from-camera-hardware transform,
//! which is not stored in the file.

use crate::camera::{CalibrationError, CameraParams, DistortionKind, Intrinsics, Resolution};
use crate::geometry;
use log::debug;
use nalgebra::{Matrix3, Vector3};
use std::{fs, path::Path};

/// Seconds per frame for KITTI sequences; the rig records at roughly 10 Hz
/// (documented in the dataset README, not stored in the calibration file).
const KITTI_FRAME_INTERVAL: f64 = 1.0 / 10.0;

/// Reads one camera's calibration from a KITTI-style text dump.
///
/// Recognized lines for camera `<id>` are `S_<id>:` (width, height),
/// `K_<id>:` (row-major 3x3 intrinsic matrix), `D_<id>:` (5 distortion
/// coefficients), `R_<id>:` (row-major 3x3 rotation) and `T_<id>:`
/// (translation). Lines for other cameras and metadata lines are skipped;
/// when a label repeats, the last occurrence wins. All five labels must
/// appear for the selected camera.
///
/// After the scan the local rotation/translation are composed with the
/// supplied body-from-camera-hardware transform as
/// `r_body_cam * r_local` and `t_body_cam + t_local` to form
/// `body_pose_camera`.
///
/// The fifth distortion coefficient is kept in `distortions[4]` but does not
/// enter the packed calibration, which is built from the first four values
/// only.
///
/// # Errors
///
/// * [`CalibrationError::SourceUnavailable`]: the file cannot be opened/read.
/// * [`CalibrationError::FormatError`]: a recognized label line is short or
///   carries a non-numeric token (reported with the label and 1-based line
///   number), or a required label never appeared for the selected camera.
pub fn parse_kitti_calib(
    path: impl AsRef<Path>,
    r_body_cam: &Matrix3<f64>,
    t_body_cam: &Vector3<f64>,
    cam_id: &str,
) -> Result<CameraParams, CalibrationError> {
    let path = path.as_ref();
    let contents =
        fs::read_to_string(path).map_err(|source| CalibrationError::SourceUnavailable {
            path: path.display().to_string(),
            source,
        })?;

    let size_label = format!("S_{cam_id}:");
    let intrinsic_label = format!("K_{cam_id}:");
    let distortion_label = format!("D_{cam_id}:");
    let rotation_label = format!("R_{cam_id}:");
    let translation_label = format!("T_{cam_id}:");

    let mut resolution: Option<Resolution> = None;
    let mut intrinsics: Option<Intrinsics> = None;
    let mut distortions: Option<[f64; 5]> = None;
    let mut local_rotation: Option<Matrix3<f64>> = None;
    let mut local_translation: Option<Vector3<f64>> = None;

    for (index, line) in contents.lines().enumerate() {
        let line_number = index + 1;
        let mut fields = line.split_whitespace();
        let Some(label) = fields.next() else {
            continue;
        };

        if label == size_label {
            let values = numeric_fields(label, line_number, fields, 2)?;
            resolution = Some(Resolution {
                width: values[0] as u32,
                height: values[1] as u32,
            });
        } else if label == intrinsic_label {
            let values = numeric_fields(label, line_number, fields, 9)?;
            intrinsics = Some(Intrinsics {
                fx: values[0],
                fy: values[4],
                cx: values[2],
                cy: values[5],
            });
        } else if label == distortion_label {
            let values = numeric_fields(label, line_number, fields, 5)?;
            distortions = Some([values[0], values[1], values[2], values[3], values[4]]);
        } else if label == rotation_label {
            let values = numeric_fields(label, line_number, fields, 9)?;
            local_rotation = Some(Matrix3::from_fn(|r, c| values[r * 3 + c]));
        } else if label == translation_label {
            let values = numeric_fields(label, line_number, fields, 3)?;
            local_translation = Some(Vector3::new(values[0], values[1], values[2]));
        } else {
            // Metadata or another camera's entry.
            continue;
        }
        debug!("Matched calibration line {line_number}: {label}");
    }

    let missing = |label: &str| {
        CalibrationError::format(
            label,
            format!("label not found for camera `{cam_id}` in {}", path.display()),
        )
    };
    let resolution = resolution.ok_or_else(|| missing(&size_label))?;
    let intrinsics = intrinsics.ok_or_else(|| missing(&intrinsic_label))?;
    let distortions = distortions.ok_or_else(|| missing(&distortion_label))?;
    let local_rotation = local_rotation.ok_or_else(|| missing(&rotation_label))?;
    let local_translation = local_translation.ok_or_else(|| missing(&translation_label))?;

    // Camera pose wrt the body frame. The translation is offset, not rotated,
    // matching the rig convention the external transform is given in.
    let rotation = r_body_cam * local_rotation;
    let translation = t_body_cam + local_translation;
    let body_pose_camera = geometry::matrices_to_pose(&rotation, &translation);

    Ok(CameraParams::new(
        intrinsics,
        DistortionKind::RadialTangential4,
        distortions,
        resolution,
        KITTI_FRAME_INTERVAL,
        body_pose_camera,
    ))
}

/// Parses the numeric fields following a recognized label, requiring at
/// least `expected` of them.
fn numeric_fields<'a>(
    label: &str,
    line_number: usize,
    fields: impl Iterator<Item = &'a str>,
    expected: usize,
) -> Result<Vec<f64>, CalibrationError> {
    let values = fields
        .map(|token| {
            token.parse::<f64>().map_err(|_| {
                CalibrationError::format(
                    label,
                    format!("line {line_number}: non-numeric token `{token}`"),
                )
            })
        })
        .collect::<Result<Vec<f64>, CalibrationError>>()?;
    if values.len() < expected {
        return Err(CalibrationError::format(
            label,
            format!(
                "line {line_number}: expected {expected} values, found {}",
                values.len()
            ),
        ));
    }
    Ok(values)
}
