//! The canonical camera-parameter model.
//!
//! [`CameraParams`] is the single entity both calibration parsers converge on.
//! It bundles intrinsics, distortion, resolution, capture interval and the
//! body-from-camera pose together with two derived members: the 3x3 intrinsic
//! matrix and the packed [`Cal3DS2`] calibration handed to the estimation
//! backend. The rectification members stay empty here; the stereo
//! rectification stage fills them in later.

use crate::camera::{Cal3DS2, CalibrationError, DistortionKind, Intrinsics, Resolution};
use crate::geometry;
use log::info;
use nalgebra::{DMatrix, Isometry3, Matrix3, Matrix3x4};
use std::{fmt, fs, io::Write, path::Path};

/// Camera parameters for one monocular camera.
///
/// Construct through [`CameraParams::new`] (or one of the parsers in
/// [`crate::io`]) so that `camera_matrix` and `calibration` are always
/// consistent with `intrinsics` and `distortions`; there is no other
/// derivation path.
///
/// # Examples
///
/// ```rust
/// use nalgebra::Isometry3;
/// use vio_calib::camera::{CameraParams, DistortionKind, Intrinsics, Resolution};
///
/// let params = CameraParams::new(
///     Intrinsics { fx: 458.654, fy: 457.296, cx: 367.215, cy: 248.375 },
///     DistortionKind::RadialTangential4,
///     [-0.28, 0.07, 0.0002, 0.00002, 0.0],
///     Resolution { width: 752, height: 480 },
///     1.0 / 20.0,
///     Isometry3::identity(),
/// );
///
/// assert_eq!(params.camera_matrix[(0, 0)], 458.654);
/// assert_eq!(params.calibration.k1, -0.28);
/// assert!(params.rectification_rotation.is_none());
/// ```
#[derive(Debug, Clone)]
pub struct CameraParams {
    /// Pinhole intrinsics `(fx, fy, cx, cy)` in pixels.
    pub intrinsics: Intrinsics,
    /// Distortion model tag; dispatches the packed-calibration layout.
    pub distortion_kind: DistortionKind,
    /// The 5 distortion coefficients `[k1, k2, p1, p2, k3]`. Slot 4 is zero
    /// for the EuRoC format and read from the file for the KITTI format.
    pub distortions: [f64; 5],
    /// Image resolution in pixels.
    pub resolution: Resolution,
    /// Seconds per frame, `1 / rate_hz`.
    pub frame_interval: f64,
    /// Pose of the camera frame expressed in the vehicle/body frame.
    pub body_pose_camera: Isometry3<f64>,
    /// Derived 3x3 intrinsic matrix: identity with fx, fy on the diagonal and
    /// cx, cy in the last column.
    pub camera_matrix: Matrix3<f64>,
    /// Derived packed calibration for the estimation backend.
    pub calibration: Cal3DS2,
    /// Rectifying rotation; filled by stereo rectification.
    pub rectification_rotation: Option<Matrix3<f64>>,
    /// Undistortion/rectification pixel map, x component.
    pub undistort_rect_map_x: Option<DMatrix<f32>>,
    /// Undistortion/rectification pixel map, y component.
    pub undistort_rect_map_y: Option<DMatrix<f32>>,
    /// Rectified projection matrix; filled by stereo rectification.
    pub rectified_projection: Option<Matrix3x4<f64>>,
}

/// Derives the intrinsic matrix from pinhole intrinsics.
fn camera_matrix_from(intrinsics: &Intrinsics) -> Matrix3<f64> {
    let mut camera_matrix = Matrix3::identity();
    camera_matrix[(0, 0)] = intrinsics.fx;
    camera_matrix[(1, 1)] = intrinsics.fy;
    camera_matrix[(0, 2)] = intrinsics.cx;
    camera_matrix[(1, 2)] = intrinsics.cy;
    camera_matrix
}

impl CameraParams {
    /// Assembles a model, deriving `camera_matrix` and `calibration` from the
    /// given intrinsics and distortion. Rectification members start empty.
    pub fn new(
        intrinsics: Intrinsics,
        distortion_kind: DistortionKind,
        distortions: [f64; 5],
        resolution: Resolution,
        frame_interval: f64,
        body_pose_camera: Isometry3<f64>,
    ) -> Self {
        let camera_matrix = camera_matrix_from(&intrinsics);
        let calibration = Cal3DS2::from_distortion(&intrinsics, distortion_kind, &distortions);
        CameraParams {
            intrinsics,
            distortion_kind,
            distortions,
            resolution,
            frame_interval,
            body_pose_camera,
            camera_matrix,
            calibration,
            rectification_rotation: None,
            undistort_rect_map_x: None,
            undistort_rect_map_y: None,
            rectified_projection: None,
        }
    }

    /// Capture rate in Hz, the inverse of `frame_interval`.
    pub fn rate_hz(&self) -> f64 {
        1.0 / self.frame_interval
    }

    /// Logs the full field dump at `info` level.
    pub fn print(&self) {
        info!("------------ CameraParams::print -------------\n{self}");
    }

    /// Field-wise comparison up to a tolerance.
    ///
    /// Floating members (`intrinsics`, `frame_interval`, `body_pose_camera`,
    /// `calibration`) compare with absolute difference `<= tol`; `resolution`
    /// compares exactly; matrix-valued members (`camera_matrix`,
    /// `distortions`, the rectification fields) compare element-wise exactly,
    /// so callers wanting fuzzy matrix equality must pre-round.
    ///
    /// Reflexive for any `tol >= 0` and symmetric at a fixed tolerance; not
    /// transitive across different tolerances.
    pub fn equals(&self, other: &CameraParams, tol: f64) -> bool {
        let intrinsics_equal = (self.intrinsics.fx - other.intrinsics.fx).abs() <= tol
            && (self.intrinsics.fy - other.intrinsics.fy).abs() <= tol
            && (self.intrinsics.cx - other.intrinsics.cx).abs() <= tol
            && (self.intrinsics.cy - other.intrinsics.cy).abs() <= tol;
        intrinsics_equal
            && geometry::pose_equals(&self.body_pose_camera, &other.body_pose_camera, tol)
            && (self.frame_interval - other.frame_interval).abs() <= tol
            && self.resolution == other.resolution
            && self.calibration.equals(&other.calibration, tol)
            && self.distortion_kind == other.distortion_kind
            && self.camera_matrix == other.camera_matrix
            && self.distortions == other.distortions
            && self.undistort_rect_map_x == other.undistort_rect_map_x
            && self.undistort_rect_map_y == other.undistort_rect_map_y
            && self.rectification_rotation == other.rectification_rotation
            && self.rectified_projection == other.rectified_projection
    }

    /// Writes the model back as an EuRoC-style YAML document that
    /// [`crate::io::parse_euroc_yaml`] can re-read.
    ///
    /// Only the first four distortion coefficients are written; `rate_hz` is
    /// rounded to the nearest integer. Rectification members are runtime
    /// artifacts and are not persisted.
    pub fn save_to_yaml(&self, path: impl AsRef<Path>) -> Result<(), CalibrationError> {
        let yaml_err = |e: serde_yaml::Error| CalibrationError::format("document", e.to_string());

        let t_bs = self.body_pose_camera.to_homogeneous();
        let t_bs_data: Vec<f64> = (0..4).flat_map(|r| (0..4).map(move |c| t_bs[(r, c)])).collect();

        let mapping = serde_yaml::Mapping::from_iter([
            (
                serde_yaml::Value::String("camera_model".to_string()),
                serde_yaml::Value::String("pinhole".to_string()),
            ),
            (
                serde_yaml::Value::String("intrinsics".to_string()),
                serde_yaml::to_value(vec![
                    self.intrinsics.fx,
                    self.intrinsics.fy,
                    self.intrinsics.cx,
                    self.intrinsics.cy,
                ])
                .map_err(yaml_err)?,
            ),
            (
                serde_yaml::Value::String("distortion_model".to_string()),
                serde_yaml::Value::String(self.distortion_kind.to_string()),
            ),
            (
                serde_yaml::Value::String("distortion_coefficients".to_string()),
                serde_yaml::to_value(&self.distortions[..4]).map_err(yaml_err)?,
            ),
            (
                serde_yaml::Value::String("resolution".to_string()),
                serde_yaml::to_value(vec![self.resolution.width, self.resolution.height])
                    .map_err(yaml_err)?,
            ),
            (
                serde_yaml::Value::String("rate_hz".to_string()),
                serde_yaml::to_value(self.rate_hz().round() as i64).map_err(yaml_err)?,
            ),
            (
                serde_yaml::Value::String("T_BS".to_string()),
                serde_yaml::to_value(serde_yaml::Mapping::from_iter([
                    (
                        serde_yaml::Value::String("rows".to_string()),
                        serde_yaml::to_value(4).map_err(yaml_err)?,
                    ),
                    (
                        serde_yaml::Value::String("cols".to_string()),
                        serde_yaml::to_value(4).map_err(yaml_err)?,
                    ),
                    (
                        serde_yaml::Value::String("data".to_string()),
                        serde_yaml::to_value(t_bs_data).map_err(yaml_err)?,
                    ),
                ]))
                .map_err(yaml_err)?,
            ),
        ]);

        let yaml_string = serde_yaml::to_string(&mapping).map_err(yaml_err)?;

        let path = path.as_ref();
        let open_err = |source: std::io::Error| CalibrationError::SourceUnavailable {
            path: path.display().to_string(),
            source,
        };
        let mut file = fs::File::create(path).map_err(open_err)?;
        // OpenCV FileStorage header; parse_euroc_yaml requires it.
        file.write_all(b"%YAML:1.0\n").map_err(open_err)?;
        file.write_all(yaml_string.as_bytes()).map_err(open_err)?;
        Ok(())
    }
}

impl fmt::Display for CameraParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "intrinsics: {} {} {} {}",
            self.intrinsics.fx, self.intrinsics.fy, self.intrinsics.cx, self.intrinsics.cy
        )?;
        writeln!(
            f,
            "body_pose_camera:{}",
            self.body_pose_camera.to_homogeneous()
        )?;
        writeln!(f, "calibration: {}", self.calibration)?;
        writeln!(f, "frame_interval: {}", self.frame_interval)?;
        writeln!(
            f,
            "resolution: width= {} height= {}",
            self.resolution.width, self.resolution.height
        )?;
        writeln!(f, "camera_matrix:{}", self.camera_matrix)?;
        writeln!(f, "distortion_model: {}", self.distortion_kind)?;
        writeln!(f, "distortions: {:?}", self.distortions)?;
        match &self.rectification_rotation {
            Some(rotation) => writeln!(f, "rectification_rotation:{rotation}")?,
            None => writeln!(f, "rectification_rotation: not yet populated")?,
        }
        match &self.undistort_rect_map_x {
            Some(map) => writeln!(
                f,
                "undistort_rect_map_x: {}x{} (too large to display)",
                map.nrows(),
                map.ncols()
            )?,
            None => writeln!(f, "undistort_rect_map_x: not yet populated")?,
        }
        match &self.undistort_rect_map_y {
            Some(map) => writeln!(
                f,
                "undistort_rect_map_y: {}x{} (too large to display)",
                map.nrows(),
                map.ncols()
            )?,
            None => writeln!(f, "undistort_rect_map_y: not yet populated")?,
        }
        match &self.rectified_projection {
            Some(projection) => writeln!(f, "rectified_projection:{projection}")?,
            None => writeln!(f, "rectified_projection: not yet populated")?,
        }
        Ok(())
    }
}
