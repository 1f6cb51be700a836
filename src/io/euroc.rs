//! Parser for EuRoC-style structured camera calibration YAML.
//!
//! These documents follow the OpenCV FileStorage convention: a `%YAML:1.0`
//! first line, then top-level keys `intrinsics`, `distortion_coefficients`,
//! `resolution`, `rate_hz` and a `T_BS` block carrying the body-from-camera
//! transform as a flattened row-major matrix.

use crate::camera::{CalibrationError, CameraParams, DistortionKind, Intrinsics, Resolution};
use crate::geometry;
use log::debug;
use std::{fs, path::Path};
use yaml_rust::{Yaml, YamlLoader};

/// Reads an EuRoC-style calibration YAML into a [`CameraParams`].
///
/// Every required field is validated (presence, element count, numeric type)
/// before it is indexed, so a malformed document surfaces as a
/// [`CalibrationError`] instead of producing a partial model. The document's
/// `distortion_model` tag is not validated here; the radial-tangential layout
/// is assumed.
///
/// # Errors
///
/// * [`CalibrationError::SourceUnavailable`]: the file cannot be opened/read.
/// * [`CalibrationError::FormatError`]: missing `%YAML` header, unscannable
///   document, missing field, short sequence, non-numeric entry, or a
///   non-positive `rate_hz`.
/// * [`CalibrationError::DimensionMismatch`]: `T_BS.data` length differs from
///   the declared `rows * cols`.
pub fn parse_euroc_yaml(path: impl AsRef<Path>) -> Result<CameraParams, CalibrationError> {
    let path = path.as_ref();
    let contents =
        fs::read_to_string(path).map_err(|source| CalibrationError::SourceUnavailable {
            path: path.display().to_string(),
            source,
        })?;

    // OpenCV FileStorage documents must start with %YAML:1.0.
    let header = contents
        .lines()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("");
    if !header.trim_start().starts_with("%YAML") {
        return Err(CalibrationError::format(
            "header",
            format!("first line must start with %YAML, found `{header}`"),
        ));
    }

    // The %YAML:1.0 directive itself is not scannable YAML; strip directive
    // lines before handing the document to the scanner.
    let body = contents
        .lines()
        .filter(|line| !line.trim_start().starts_with('%'))
        .collect::<Vec<_>>()
        .join("\n");
    let docs = YamlLoader::load_from_str(&body)?;
    let doc = docs
        .first()
        .ok_or_else(|| CalibrationError::format("document", "empty YAML document"))?;
    debug!("Loaded calibration YAML from {}", path.display());

    let intrinsics_values = numeric_sequence(doc, "intrinsics", 4)?;
    let intrinsics = Intrinsics {
        fx: intrinsics_values[0],
        fy: intrinsics_values[1],
        cx: intrinsics_values[2],
        cy: intrinsics_values[3],
    };

    // 4 coefficients in the file; the model keeps 5 slots with k3 = 0.
    let distortion_values = numeric_sequence(doc, "distortion_coefficients", 4)?;
    let mut distortions = [0.0; 5];
    distortions[..4].copy_from_slice(&distortion_values[..4]);

    let resolution_values = numeric_sequence(doc, "resolution", 2)?;
    let resolution = Resolution {
        width: resolution_values[0] as u32,
        height: resolution_values[1] as u32,
    };

    let rate_hz = doc["rate_hz"]
        .as_i64()
        .ok_or_else(|| CalibrationError::format("rate_hz", "missing or non-integer value"))?;
    if rate_hz < 1 {
        return Err(CalibrationError::format(
            "rate_hz",
            format!("capture rate must be positive, found {rate_hz}"),
        ));
    }
    let frame_interval = 1.0 / rate_hz as f64;

    let t_bs = &doc["T_BS"];
    let rows = t_bs["rows"]
        .as_i64()
        .ok_or_else(|| CalibrationError::format("T_BS.rows", "missing or non-integer value"))?
        as usize;
    let cols = t_bs["cols"]
        .as_i64()
        .ok_or_else(|| CalibrationError::format("T_BS.cols", "missing or non-integer value"))?
        as usize;
    let data = numeric_sequence(t_bs, "data", 0)?;
    let body_pose_camera = geometry::vector_to_pose(&data, rows, cols)?;

    Ok(CameraParams::new(
        intrinsics,
        DistortionKind::RadialTangential4,
        distortions,
        resolution,
        frame_interval,
        body_pose_camera,
    ))
}

/// Extracts a numeric sequence field, requiring at least `min_len` entries.
fn numeric_sequence(node: &Yaml, field: &str, min_len: usize) -> Result<Vec<f64>, CalibrationError> {
    let sequence = node[field]
        .as_vec()
        .ok_or_else(|| CalibrationError::format(field, "missing or not a sequence"))?;
    if sequence.len() < min_len {
        return Err(CalibrationError::format(
            field,
            format!("expected at least {min_len} values, found {}", sequence.len()),
        ));
    }
    sequence
        .iter()
        .enumerate()
        .map(|(i, value)| {
            yaml_number(value).ok_or_else(|| {
                CalibrationError::format(field, format!("non-numeric value at index {i}"))
            })
        })
        .collect()
}

/// YAML scalars may scan as integers or reals; accept both.
fn yaml_number(value: &Yaml) -> Option<f64> {
    value.as_f64().or_else(|| value.as_i64().map(|n| n as f64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::fs;

    /// Writes a throwaway YAML document under output/ and returns its path.
    fn write_doc(name: &str, lines: &[&str]) -> String {
        fs::create_dir_all("output").expect("Failed to create output directory for test.");
        let path = format!("output/{name}");
        fs::write(&path, lines.join("\n")).unwrap();
        path
    }

    #[test]
    fn test_parse_euroc_sample() {
        let params = parse_euroc_yaml("samples/euroc_cam0.yaml").unwrap();

        assert_eq!(params.intrinsics.fx, 458.654);
        assert_eq!(params.intrinsics.fy, 457.296);
        assert_eq!(params.intrinsics.cx, 367.215);
        assert_eq!(params.intrinsics.cy, 248.375);
        assert_eq!(params.resolution.width, 752);
        assert_eq!(params.resolution.height, 480);
        assert_eq!(params.frame_interval, 1.0 / 20.0);

        assert_eq!(params.distortions[0], -0.28340811); // k1
        assert_eq!(params.distortions[1], 0.07395907); // k2
        assert_eq!(params.distortions[2], 0.00019359); // p1
        assert_eq!(params.distortions[3], 1.76187114e-05); // p2
        assert_eq!(params.distortions[4], 0.0); // k3 defaults to zero

        // Derived members are consistent with the parsed fields.
        assert_eq!(params.camera_matrix[(0, 0)], 458.654);
        assert_eq!(params.camera_matrix[(1, 1)], 457.296);
        assert_eq!(params.camera_matrix[(0, 2)], 367.215);
        assert_eq!(params.camera_matrix[(1, 2)], 248.375);
        assert_eq!(params.camera_matrix[(2, 2)], 1.0);
        assert_eq!(params.camera_matrix[(1, 0)], 0.0);
        assert_eq!(params.calibration.s, 0.0);
        assert_eq!(params.calibration.k1, -0.28340811);

        assert_relative_eq!(
            params.body_pose_camera.translation.vector.x,
            -0.0216401454975,
            epsilon = 1e-9
        );
        assert_relative_eq!(
            params.body_pose_camera.translation.vector.y,
            -0.0646769904906,
            epsilon = 1e-9
        );
        assert_relative_eq!(
            params.body_pose_camera.translation.vector.z,
            0.00981073058949,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_identity_transform_translation() {
        let path = write_doc(
            "euroc_identity.yaml",
            &[
                "%YAML:1.0",
                "intrinsics: [400.0, 400.0, 320.0, 240.0]",
                "distortion_coefficients: [0.0, 0.0, 0.0, 0.0]",
                "resolution: [640, 480]",
                "rate_hz: 10",
                "T_BS:",
                "  rows: 4",
                "  cols: 4",
                "  data: [1.0, 0.0, 0.0, 1.0,",
                "         0.0, 1.0, 0.0, 2.0,",
                "         0.0, 0.0, 1.0, 3.0,",
                "         0.0, 0.0, 0.0, 1.0]",
            ],
        );

        let params = parse_euroc_yaml(&path).unwrap();
        assert_eq!(params.frame_interval, 1.0 / 10.0);
        assert_relative_eq!(
            params.body_pose_camera.translation.vector.x,
            1.0,
            epsilon = 1e-9
        );
        assert_relative_eq!(
            params.body_pose_camera.translation.vector.y,
            2.0,
            epsilon = 1e-9
        );
        assert_relative_eq!(
            params.body_pose_camera.translation.vector.z,
            3.0,
            epsilon = 1e-9
        );

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_missing_resolution_is_format_error() {
        let path = write_doc(
            "euroc_missing_resolution.yaml",
            &[
                "%YAML:1.0",
                "intrinsics: [400.0, 400.0, 320.0, 240.0]",
                "distortion_coefficients: [0.0, 0.0, 0.0, 0.0]",
                "rate_hz: 10",
                "T_BS:",
                "  rows: 4",
                "  cols: 4",
                "  data: [1.0, 0.0, 0.0, 0.0,",
                "         0.0, 1.0, 0.0, 0.0,",
                "         0.0, 0.0, 1.0, 0.0,",
                "         0.0, 0.0, 0.0, 1.0]",
            ],
        );

        match parse_euroc_yaml(&path) {
            Err(CalibrationError::FormatError { field, .. }) => assert_eq!(field, "resolution"),
            other => panic!("expected FormatError, got {:?}", other),
        }

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_short_intrinsics_is_format_error() {
        let path = write_doc(
            "euroc_short_intrinsics.yaml",
            &[
                "%YAML:1.0",
                "intrinsics: [400.0, 400.0]",
                "distortion_coefficients: [0.0, 0.0, 0.0, 0.0]",
                "resolution: [640, 480]",
                "rate_hz: 10",
            ],
        );

        match parse_euroc_yaml(&path) {
            Err(CalibrationError::FormatError { field, message }) => {
                assert_eq!(field, "intrinsics");
                assert!(message.contains("found 2"));
            }
            other => panic!("expected FormatError, got {:?}", other),
        }

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_t_bs_dimension_mismatch() {
        let path = write_doc(
            "euroc_short_t_bs.yaml",
            &[
                "%YAML:1.0",
                "intrinsics: [400.0, 400.0, 320.0, 240.0]",
                "distortion_coefficients: [0.0, 0.0, 0.0, 0.0]",
                "resolution: [640, 480]",
                "rate_hz: 10",
                "T_BS:",
                "  rows: 4",
                "  cols: 4",
                "  data: [1.0, 0.0, 0.0, 0.0,",
                "         0.0, 1.0, 0.0, 0.0,",
                "         0.0, 0.0, 1.0, 0.0]",
            ],
        );

        match parse_euroc_yaml(&path) {
            Err(CalibrationError::DimensionMismatch { rows, cols, len }) => {
                assert_eq!((rows, cols, len), (4, 4, 12));
            }
            other => panic!("expected DimensionMismatch, got {:?}", other),
        }

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_missing_yaml_header_is_format_error() {
        let path = write_doc(
            "euroc_no_header.yaml",
            &["intrinsics: [400.0, 400.0, 320.0, 240.0]"],
        );

        match parse_euroc_yaml(&path) {
            Err(CalibrationError::FormatError { field, .. }) => assert_eq!(field, "header"),
            other => panic!("expected FormatError, got {:?}", other),
        }

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_zero_rate_is_format_error() {
        let path = write_doc(
            "euroc_zero_rate.yaml",
            &[
                "%YAML:1.0",
                "intrinsics: [400.0, 400.0, 320.0, 240.0]",
                "distortion_coefficients: [0.0, 0.0, 0.0, 0.0]",
                "resolution: [640, 480]",
                "rate_hz: 0",
            ],
        );

        match parse_euroc_yaml(&path) {
            Err(CalibrationError::FormatError { field, .. }) => assert_eq!(field, "rate_hz"),
            other => panic!("expected FormatError, got {:?}", other),
        }

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_unreadable_path_is_source_unavailable() {
        assert!(matches!(
            parse_euroc_yaml("samples/does_not_exist.yaml"),
            Err(CalibrationError::SourceUnavailable { .. })
        ));
    }
}
