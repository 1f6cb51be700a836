//! Packed 9-parameter calibration consumed by the estimation backend.
//!
//! This mirrors the backend's own calibration type: a flat bundle of
//! intrinsics plus the first four radial-tangential distortion coefficients,
//! with skew always zero when built from a [`CameraParams`]
//! ([`crate::camera::CameraParams`]). How the backend consumes it is out of
//! scope here; this module is data plus equality and printing only.

use crate::camera::{DistortionKind, Intrinsics};
use std::fmt;

/// Packed calibration `(fx, fy, s, u0, v0, k1, k2, p1, p2)`.
///
/// # Examples
///
/// ```rust
/// use vio_calib::camera::{Cal3DS2, DistortionKind, Intrinsics};
///
/// let intrinsics = Intrinsics { fx: 458.0, fy: 457.0, cx: 367.0, cy: 248.0 };
/// let distortions = [-0.28, 0.07, 0.0002, 0.00002, 0.0];
/// let cal = Cal3DS2::from_distortion(
///     &intrinsics,
///     DistortionKind::RadialTangential4,
///     &distortions,
/// );
///
/// assert_eq!(cal.s, 0.0); // skew is always zero
/// assert_eq!(cal.vector()[5], -0.28); // k1
/// ```
#[derive(Debug, Clone)]
pub struct Cal3DS2 {
    pub fx: f64,
    pub fy: f64,
    /// Skew; always 0 when built from a [`CameraParams`].
    pub s: f64,
    pub u0: f64,
    pub v0: f64,
    pub k1: f64,
    pub k2: f64,
    pub p1: f64,
    pub p2: f64,
}

impl Cal3DS2 {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        fx: f64,
        fy: f64,
        s: f64,
        u0: f64,
        v0: f64,
        k1: f64,
        k2: f64,
        p1: f64,
        p2: f64,
    ) -> Self {
        Cal3DS2 {
            fx,
            fy,
            s,
            u0,
            v0,
            k1,
            k2,
            p1,
            p2,
        }
    }

    /// Builds the packed calibration from intrinsics and a 5-slot distortion
    /// array, dispatching on the distortion model tag.
    ///
    /// For [`DistortionKind::RadialTangential4`] only slots `0..4`
    /// (`k1, k2, p1, p2`) enter the packed model; slot 4 is ignored.
    pub fn from_distortion(
        intrinsics: &Intrinsics,
        kind: DistortionKind,
        distortions: &[f64; 5],
    ) -> Self {
        match kind {
            DistortionKind::RadialTangential4 => Cal3DS2::new(
                intrinsics.fx,
                intrinsics.fy,
                0.0,
                intrinsics.cx,
                intrinsics.cy,
                distortions[0], // k1
                distortions[1], // k2
                distortions[2], // p1
                distortions[3], // p2
            ),
        }
    }

    /// Returns the nine parameters in their canonical order.
    pub fn vector(&self) -> [f64; 9] {
        [
            self.fx, self.fy, self.s, self.u0, self.v0, self.k1, self.k2, self.p1, self.p2,
        ]
    }

    /// Absolute-difference comparison of all nine parameters against `tol`.
    pub fn equals(&self, other: &Cal3DS2, tol: f64) -> bool {
        self.vector()
            .iter()
            .zip(other.vector().iter())
            .all(|(a, b)| (a - b).abs() <= tol)
    }
}

impl fmt::Display for Cal3DS2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "fx: {} fy: {} s: {} u0: {} v0: {} k1: {} k2: {} p1: {} p2: {}",
            self.fx, self.fy, self.s, self.u0, self.v0, self.k1, self.k2, self.p1, self.p2
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_intrinsics() -> Intrinsics {
        Intrinsics {
            fx: 458.654,
            fy: 457.296,
            cx: 367.215,
            cy: 248.375,
        }
    }

    #[test]
    fn test_from_distortion_layout() {
        let distortions = [-0.28340811, 0.07395907, 0.00019359, 1.76187114e-05, 0.5];
        let cal = Cal3DS2::from_distortion(
            &sample_intrinsics(),
            DistortionKind::RadialTangential4,
            &distortions,
        );

        assert_eq!(
            cal.vector(),
            [
                458.654,
                457.296,
                0.0,
                367.215,
                248.375,
                -0.28340811,
                0.07395907,
                0.00019359,
                1.76187114e-05,
            ]
        );
        // The fifth distortion slot never reaches the packed model.
        assert!(!cal.vector().contains(&0.5));
    }

    #[test]
    fn test_equals_tolerance_bounded() {
        let distortions = [-0.28, 0.07, 0.0002, 0.00002, 0.0];
        let a = Cal3DS2::from_distortion(
            &sample_intrinsics(),
            DistortionKind::RadialTangential4,
            &distortions,
        );
        let mut b = a.clone();
        b.k1 += 1e-6;

        assert!(a.equals(&a, 0.0));
        assert!(a.equals(&b, 1e-5));
        assert!(!a.equals(&b, 1e-7));
        assert_eq!(a.equals(&b, 1e-5), b.equals(&a, 1e-5));
    }
}
