/// 4x4 transform builders shared by bodies, colliders and renderers
use nalgebra::{Matrix4, Point3, Unit, Vector3, Vector4};

/// Transform builder for 3D transformations
pub struct Transform;

impl Transform {
    /// Rotation by `angle` radians about a unit `axis`
    pub fn rotation_about(angle: f32, axis: &Unit<Vector3<f32>>) -> Matrix4<f32> {
        Matrix4::from_axis_angle(axis, angle)
    }

    /// Create a translation matrix
    pub fn translation(offset: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new_translation(offset)
    }

    /// Create a scale matrix
    pub fn scale(factors: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new_nonuniform_scaling(factors)
    }

    /// Where the local origin lands under `m`
    pub fn origin_of(m: &Matrix4<f32>) -> Vector3<f32> {
        (m * Vector4::new(0.0, 0.0, 0.0, 1.0)).xyz()
    }

    /// Apply `m` to a point, treating it as affine (w = 1, no divide)
    pub fn apply_affine(m: &Matrix4<f32>, p: &Point3<f32>) -> Point3<f32> {
        Point3::from((m * p.to_homogeneous()).xyz())
    }

    /// Element-wise linear mix of two matrices
    pub fn mix(a: &Matrix4<f32>, b: &Matrix4<f32>, alpha: f32) -> Matrix4<f32> {
        a.zip_map(b, |x, y| x + (y - x) * alpha)
    }

    /// Create a model-view-projection matrix
    pub fn mvp_matrix(
        model: &Matrix4<f32>,
        view: &Matrix4<f32>,
        projection: &Matrix4<f32>,
    ) -> Matrix4<f32> {
        projection * view * model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_origin_of_translation() {
        let m = Transform::translation(&Vector3::new(1.0, -2.0, 3.0));
        assert_relative_eq!(Transform::origin_of(&m), Vector3::new(1.0, -2.0, 3.0));
    }

    #[test]
    fn test_rotation_about_z() {
        let m = Transform::rotation_about(std::f32::consts::FRAC_PI_2, &Vector3::z_axis());
        let p = Transform::apply_affine(&m, &Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p, Point3::new(0.0, 1.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_mix_endpoints() {
        let a = Matrix4::identity();
        let b = Transform::scale(&Vector3::new(2.0, 3.0, 4.0));
        assert_relative_eq!(Transform::mix(&a, &b, 0.0), a);
        assert_relative_eq!(Transform::mix(&a, &b, 1.0), b);
        assert_relative_eq!(Transform::mix(&a, &b, 0.5)[(1, 1)], 2.0);
    }
}
