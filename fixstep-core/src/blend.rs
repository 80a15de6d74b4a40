/// Orientation blending between two consecutive simulation states.
///
/// The linear blend mixes raw matrix entries. It is what the demos have always
/// drawn with and stays the default, but it is only correct for small angular
/// deltas: halfway between two rotations that differ by a large angle it
/// produces a shear/shrink rather than a rotation. [`RotationBlend::Slerp`]
/// goes through unit quaternions instead and always yields a proper rotation.
use nalgebra::{Matrix3, Matrix4, Rotation3, UnitQuaternion};

use crate::transform::Transform;

/// How [`Body::interpolated_pose`](crate::Body::interpolated_pose) blends orientations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RotationBlend {
    /// Element-wise lerp of the two rotation matrices.
    #[default]
    Linear,
    /// Spherical linear interpolation of the equivalent unit quaternions.
    Slerp,
}

impl RotationBlend {
    /// Blend from `previous` (alpha = 0) to `current` (alpha = 1).
    pub fn blend(self, previous: &Matrix4<f32>, current: &Matrix4<f32>, alpha: f32) -> Matrix4<f32> {
        match self {
            RotationBlend::Linear => Transform::mix(previous, current, alpha),
            RotationBlend::Slerp => slerp_rotation(previous, current, alpha),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RotationBlend::Linear => "linear",
            RotationBlend::Slerp => "slerp",
        }
    }
}

fn to_quaternion(m: &Matrix4<f32>) -> UnitQuaternion<f32> {
    let linear: Matrix3<f32> = m.fixed_view::<3, 3>(0, 0).into_owned();
    let q = UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(linear));
    // Renormalize so a uniformly scaled rotation still converts.
    UnitQuaternion::new_normalize(q.into_inner())
}

fn slerp_rotation(previous: &Matrix4<f32>, current: &Matrix4<f32>, alpha: f32) -> Matrix4<f32> {
    slerp(&to_quaternion(previous), &to_quaternion(current), alpha).to_homogeneous()
}

fn slerp(q0: &UnitQuaternion<f32>, q1: &UnitQuaternion<f32>, alpha: f32) -> UnitQuaternion<f32> {
    q0.try_slerp(q1, alpha, 1.0e-6)
        .unwrap_or_else(|| {
            // Take the short way round, as slerp does.
            let q1 = if q0.dot(q1) < 0.0 {
                UnitQuaternion::new_unchecked(-q1.into_inner())
            } else {
                *q1
            };
            q0.nlerp(&q1, alpha)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;
    use std::f32::consts::PI;

    fn about_y(angle: f32) -> Matrix4<f32> {
        Transform::rotation_about(angle, &Vector3::y_axis())
    }

    #[test]
    fn test_both_modes_hit_endpoints() {
        let a = about_y(0.2);
        let b = about_y(1.1);
        for mode in [RotationBlend::Linear, RotationBlend::Slerp] {
            assert_relative_eq!(mode.blend(&a, &b, 0.0), a, epsilon = 1e-5);
            assert_relative_eq!(mode.blend(&a, &b, 1.0), b, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_linear_blend_shrinks_under_large_rotation() {
        // Halfway through a half turn the naive blend collapses the x axis.
        let mid = RotationBlend::Linear.blend(&about_y(0.0), &about_y(PI), 0.5);
        let x_axis = mid.fixed_view::<3, 1>(0, 0).norm();
        assert!(x_axis < 1e-5, "expected degenerate column, got length {x_axis}");
    }

    #[test]
    fn test_slerp_stays_orthonormal() {
        let mid = RotationBlend::Slerp.blend(&about_y(0.0), &about_y(PI * 0.9), 0.5);
        let linear = mid.fixed_view::<3, 3>(0, 0).into_owned();
        assert_relative_eq!(linear.transpose() * linear, Matrix3::identity(), epsilon = 1e-5);
        assert_relative_eq!(mid, about_y(PI * 0.45), epsilon = 1e-5);
    }

    #[test]
    fn test_slerp_between_opposite_signs_of_one_rotation() {
        let q = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), 0.3);
        let flipped = UnitQuaternion::new_unchecked(-q.into_inner());
        for alpha in [0.0, 0.5, 1.0] {
            let mid = slerp(&q, &flipped, alpha);
            assert_relative_eq!(mid.to_homogeneous(), about_y(0.3), epsilon = 1e-5);
        }
    }

    #[test]
    fn test_default_is_linear() {
        assert_eq!(RotationBlend::default(), RotationBlend::Linear);
        assert_eq!(RotationBlend::Slerp.name(), "slerp");
    }
}
