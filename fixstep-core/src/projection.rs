/// Camera and projection utilities
use nalgebra::{Matrix4, Point3, Vector3, Vector4};

use crate::transform::Transform;

/// Camera that the demo scenes are viewed through
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    /// Fifty units back on +z looking at the origin, 45 degree field of view.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            position: Point3::new(0.0, 0.0, 50.0),
            target: Point3::origin(),
            up: Vector3::y(),
            fov: std::f32::consts::FRAC_PI_4,
            aspect: width.max(1) as f32 / height.max(1) as f32,
            near: 1.0,
            far: 500.0,
        }
    }

    /// Correct the aspect ratio for cells that are `cell_aspect` times as wide as tall.
    pub fn with_cell_aspect(mut self, cell_aspect: f32) -> Self {
        self.aspect *= cell_aspect;
        self
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        Matrix4::new_perspective(self.aspect, self.fov, self.near, self.far)
    }

    /// Project a model-space point to `(x, y, depth)` in pixels, or `None`
    /// when it falls behind the camera or outside the view volume.
    pub fn project_to_screen(
        &self,
        point: &Point3<f32>,
        model_matrix: &Matrix4<f32>,
        width: u32,
        height: u32,
    ) -> Option<(f32, f32, f32)> {
        let mvp = Transform::mvp_matrix(model_matrix, &self.view_matrix(), &self.projection_matrix());
        let clip: Vector4<f32> = mvp * point.to_homogeneous();

        // Behind (or on) the eye plane.
        if clip.w < 1e-6 {
            return None;
        }
        let ndc = clip.xyz() / clip.w;
        if ndc.iter().any(|c| !(-1.0..=1.0).contains(c)) {
            return None;
        }

        let screen_x = (ndc.x + 1.0) * 0.5 * width as f32;
        let screen_y = (1.0 - ndc.y) * 0.5 * height as f32;
        Some((screen_x, screen_y, ndc.z))
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_camera_creation() {
        let camera = Camera::new(800, 600);
        assert!((camera.aspect - 800.0 / 600.0).abs() < 1e-6);
        let terminal = Camera::new(100, 50).with_cell_aspect(0.5);
        assert_relative_eq!(terminal.aspect, 1.0);
    }

    #[test]
    fn test_origin_projects_to_center() {
        let camera = Camera::new(800, 600);
        let (x, y, depth) = camera
            .project_to_screen(&Point3::origin(), &Matrix4::identity(), 800, 600)
            .unwrap();
        assert_relative_eq!(x, 400.0, epsilon = 1e-3);
        assert_relative_eq!(y, 300.0, epsilon = 1e-3);
        assert!(depth > -1.0 && depth < 1.0);
    }

    #[test]
    fn test_nearer_points_have_smaller_depth() {
        let camera = Camera::default();
        let model = Matrix4::identity();
        let (_, _, near) = camera.project_to_screen(&Point3::new(0.0, 0.0, 10.0), &model, 800, 600).unwrap();
        let (_, _, far) = camera.project_to_screen(&Point3::new(0.0, 0.0, -10.0), &model, 800, 600).unwrap();
        assert!(near < far);
    }

    #[test]
    fn test_points_behind_or_outside_are_culled() {
        let camera = Camera::default();
        let model = Matrix4::identity();
        assert!(camera.project_to_screen(&Point3::new(0.0, 0.0, 60.0), &model, 800, 600).is_none());
        assert!(camera.project_to_screen(&Point3::new(500.0, 0.0, 0.0), &model, 800, 600).is_none());
    }
}
