//! Pose composition helpers bridging flat calibration-file layouts and the
//! rigid 6-DoF transform type ([`nalgebra::Isometry3`]) used by the rest of
//! the pipeline.

use crate::camera::CalibrationError;
use nalgebra::{Isometry3, Matrix3, Rotation3, Translation3, UnitQuaternion, Vector3};

/// Reshapes a row-major flattened homogeneous transform into a rigid pose.
///
/// `values` must hold exactly `rows * cols` numbers
/// ([`CalibrationError::DimensionMismatch`] otherwise) and the declared shape
/// must cover at least the top-left 3x3 rotation block and a fourth
/// translation column (`rows >= 3 && cols >= 4`, else
/// [`CalibrationError::FormatError`]). Any trailing homogeneous row is
/// accepted and ignored.
pub fn vector_to_pose(
    values: &[f64],
    rows: usize,
    cols: usize,
) -> Result<Isometry3<f64>, CalibrationError> {
    if rows * cols != values.len() {
        return Err(CalibrationError::DimensionMismatch {
            rows,
            cols,
            len: values.len(),
        });
    }
    if rows < 3 || cols < 4 {
        return Err(CalibrationError::format(
            "T_BS",
            format!("expected at least a 3x4 transform, declared {rows}x{cols}"),
        ));
    }

    let rotation = Matrix3::from_fn(|r, c| values[r * cols + c]);
    let translation = Vector3::new(values[3], values[cols + 3], values[2 * cols + 3]);
    Ok(matrices_to_pose(&rotation, &translation))
}

/// Composes a rotation matrix and translation vector into a rigid pose.
///
/// The rotation is taken as-is; calibration files are trusted to carry a
/// proper rotation matrix.
pub fn matrices_to_pose(rotation: &Matrix3<f64>, translation: &Vector3<f64>) -> Isometry3<f64> {
    Isometry3::from_parts(
        Translation3::from(*translation),
        UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(*rotation)),
    )
}

/// Element-wise tolerance comparison of two poses over their 4x4 homogeneous
/// matrices: true when every absolute difference is `<= tol`.
pub fn pose_equals(a: &Isometry3<f64>, b: &Isometry3<f64>, tol: f64) -> bool {
    let ha = a.to_homogeneous();
    let hb = b.to_homogeneous();
    ha.iter().zip(hb.iter()).all(|(x, y)| (x - y).abs() <= tol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_vector_to_pose_identity_with_translation() {
        #[rustfmt::skip]
        let data = [
            1.0, 0.0, 0.0, 1.0,
            0.0, 1.0, 0.0, 2.0,
            0.0, 0.0, 1.0, 3.0,
            0.0, 0.0, 0.0, 1.0,
        ];
        let pose = vector_to_pose(&data, 4, 4).unwrap();

        assert_relative_eq!(pose.translation.vector.x, 1.0, epsilon = 1e-9);
        assert_relative_eq!(pose.translation.vector.y, 2.0, epsilon = 1e-9);
        assert_relative_eq!(pose.translation.vector.z, 3.0, epsilon = 1e-9);
        assert!(pose_equals(
            &pose,
            &Isometry3::translation(1.0, 2.0, 3.0),
            1e-9
        ));
    }

    #[test]
    fn test_vector_to_pose_dimension_mismatch() {
        let data = vec![0.0; 12];
        match vector_to_pose(&data, 4, 4) {
            Err(CalibrationError::DimensionMismatch { rows, cols, len }) => {
                assert_eq!((rows, cols, len), (4, 4, 12));
            }
            other => panic!("expected DimensionMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_vector_to_pose_too_small_shape() {
        let data = vec![0.0; 6];
        assert!(matches!(
            vector_to_pose(&data, 2, 3),
            Err(CalibrationError::FormatError { .. })
        ));
    }

    #[test]
    fn test_matrices_to_pose_keeps_rotation_and_translation() {
        // 90 degree yaw.
        #[rustfmt::skip]
        let rotation = Matrix3::new(
            0.0, -1.0, 0.0,
            1.0,  0.0, 0.0,
            0.0,  0.0, 1.0,
        );
        let translation = Vector3::new(-0.5, 0.25, 4.0);
        let pose = matrices_to_pose(&rotation, &translation);

        let h = pose.to_homogeneous();
        for r in 0..3 {
            for c in 0..3 {
                assert_relative_eq!(h[(r, c)], rotation[(r, c)], epsilon = 1e-12);
            }
            assert_relative_eq!(h[(r, 3)], translation[r], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_pose_equals_is_tolerance_bounded() {
        let a = Isometry3::translation(0.0, 0.0, 0.0);
        let b = Isometry3::translation(1e-6, 0.0, 0.0);

        assert!(pose_equals(&a, &a, 0.0));
        assert!(pose_equals(&a, &b, 1e-5));
        assert!(!pose_equals(&a, &b, 1e-7));
    }
}
