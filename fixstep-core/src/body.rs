/// Kinematic bodies.
///
/// A [`Body`] keeps the two most recent simulated poses. [`Body::step`] moves
/// it forward one fixed step with forward Euler, and
/// [`Body::interpolated_pose`] blends the two poses so a renderer can draw the
/// body at any instant between them.
use nalgebra::{Matrix4, Unit, Vector3};
use rand::Rng;

use crate::blend::RotationBlend;
use crate::error::SimError;
use crate::transform::Transform;

/// Identity handed out by a [`BodySet`](crate::BodySet) when a body is inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub u64);

/// Position and orientation of a body at one simulated instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub center: Vector3<f32>,
    /// Pure orientation; the translation column is always (0, 0, 0, 1).
    pub rotation: Matrix4<f32>,
}

impl Pose {
    /// Split a location matrix into a center and the remaining orientation.
    pub fn from_location(location: &Matrix4<f32>) -> Self {
        let center = Transform::origin_of(location);
        let rotation = Transform::translation(&-center) * location;
        Self { center, rotation }
    }

    pub fn to_matrix(&self) -> Matrix4<f32> {
        Transform::translation(&self.center) * self.rotation
    }
}

/// A body moving under constant-per-step linear and angular velocity.
#[derive(Debug, Clone)]
pub struct Body {
    pub(crate) id: Option<BodyId>,
    previous: Pose,
    current: Pose,
    pub linear_velocity: Vector3<f32>,
    /// Radians per second about `spin_axis`.
    pub angular_velocity: f32,
    pub spin_axis: Unit<Vector3<f32>>,
    /// Render-only scale, never touched by the integrator.
    pub scale: Vector3<f32>,
    /// `None` until set explicitly or by the [`BodySet`](crate::BodySet) it joins.
    pub(crate) blend: Option<RotationBlend>,
    drawn: Matrix4<f32>,
    steps: u64,
}

impl Body {
    /// Place a body at `location` with both poses equal.
    ///
    /// A missing `spin_axis` is replaced by a random unit vector. Non-finite
    /// inputs and zero-length axes are rejected instead of poisoning every
    /// later transform with NaN.
    pub fn emplace(
        location: Matrix4<f32>,
        linear_velocity: Vector3<f32>,
        angular_velocity: f32,
        spin_axis: Option<Vector3<f32>>,
    ) -> Result<Self, SimError> {
        if location.iter().any(|x| !x.is_finite()) {
            return Err(SimError::NonFinite { what: "location" });
        }
        if linear_velocity.iter().any(|x| !x.is_finite()) {
            return Err(SimError::NonFinite {
                what: "linear velocity",
            });
        }
        if !angular_velocity.is_finite() {
            return Err(SimError::NonFinite {
                what: "angular velocity",
            });
        }
        let spin_axis = match spin_axis {
            Some(axis) if axis.iter().any(|x| !x.is_finite()) => {
                return Err(SimError::NonFinite { what: "spin axis" })
            }
            Some(axis) => Unit::try_new(axis, 1.0e-6).ok_or(SimError::DegenerateSpinAxis)?,
            None => random_axis(&mut rand::thread_rng()),
        };

        let pose = Pose::from_location(&location);
        let scale = Vector3::repeat(1.0);
        Ok(Self {
            id: None,
            previous: pose,
            current: pose,
            linear_velocity,
            angular_velocity,
            spin_axis,
            scale,
            blend: None,
            drawn: pose.to_matrix(),
            steps: 0,
        })
    }

    pub fn with_scale(mut self, scale: Vector3<f32>) -> Self {
        self.scale = scale;
        self.drawn = self.current_transform();
        self
    }

    /// Blend with `blend` regardless of the set this body is inserted into.
    pub fn with_blend(mut self, blend: RotationBlend) -> Self {
        self.blend = Some(blend);
        self
    }

    pub fn blend(&self) -> RotationBlend {
        self.blend.unwrap_or_default()
    }

    /// Set once the body is inserted into a [`BodySet`](crate::BodySet).
    pub fn id(&self) -> Option<BodyId> {
        self.id
    }

    pub fn previous(&self) -> &Pose {
        &self.previous
    }

    pub fn current(&self) -> &Pose {
        &self.current
    }

    /// Shorthand for `current().center`.
    pub fn center(&self) -> Vector3<f32> {
        self.current.center
    }

    /// Fixed steps this body has taken since it was emplaced.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Advance one forward-Euler step of `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        debug_assert!(dt > 0.0, "step size must be positive");
        self.previous = self.current;
        self.current.center += self.linear_velocity * dt;
        // World-space spin, so it pre-multiplies the existing orientation.
        self.current.rotation =
            Transform::rotation_about(self.angular_velocity * dt, &self.spin_axis) * self.current.rotation;
        self.steps += 1;
    }

    /// Orientation between the last two states. `alpha` outside [0, 1] extrapolates.
    pub fn blend_rotation(&self, alpha: f32) -> Matrix4<f32> {
        self.blend()
            .blend(&self.previous.rotation, &self.current.rotation, alpha)
    }

    /// Render transform `alpha` of the way from the previous to the current state.
    pub fn interpolated_pose(&self, alpha: f32) -> Matrix4<f32> {
        let center = self.previous.center.lerp(&self.current.center, alpha);
        Transform::translation(&center) * self.blend_rotation(alpha) * Transform::scale(&self.scale)
    }

    /// Store the interpolated pose as the transform to draw with.
    pub fn blend_state(&mut self, alpha: f32) {
        self.drawn = self.interpolated_pose(alpha);
    }

    /// Transform last stored by [`Body::blend_state`].
    pub fn drawn(&self) -> &Matrix4<f32> {
        &self.drawn
    }

    /// Un-interpolated transform of the current state, including scale.
    pub fn current_transform(&self) -> Matrix4<f32> {
        self.current.to_matrix() * Transform::scale(&self.scale)
    }
}

/// Uniformly jittered direction, normalized.
pub fn random_axis<R: Rng + ?Sized>(rng: &mut R) -> Unit<Vector3<f32>> {
    loop {
        let v = Vector3::new(
            rng.gen_range(-1.0f32..1.0),
            rng.gen_range(-1.0f32..1.0),
            rng.gen_range(-1.0f32..1.0),
        );
        if let Some(axis) = Unit::try_new(v, 1.0e-3) {
            return axis;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::f32::consts::FRAC_PI_2;

    fn spinning(angular_velocity: f32) -> Body {
        Body::emplace(
            Transform::translation(&Vector3::new(1.0, 2.0, 3.0)),
            Vector3::new(2.0, 0.0, -1.0),
            angular_velocity,
            Some(Vector3::new(0.0, 0.0, 1.0)),
        )
        .unwrap()
    }

    #[test]
    fn test_emplace_sets_both_poses() {
        let location = Transform::translation(&Vector3::new(4.0, 5.0, 6.0))
            * Transform::rotation_about(0.7, &Vector3::x_axis());
        let body = Body::emplace(location, Vector3::zeros(), 0.0, Some(Vector3::y())).unwrap();
        assert_eq!(body.previous(), body.current());
        assert_relative_eq!(body.center(), Vector3::new(4.0, 5.0, 6.0));
        assert_relative_eq!(body.current().to_matrix(), location, epsilon = 1e-6);
        assert_relative_eq!(body.current().rotation.column(3).into_owned(), nalgebra::Vector4::w());
        assert_eq!(body.id(), None);
    }

    #[test]
    fn test_step_applies_velocities() {
        let mut body = spinning(FRAC_PI_2);
        body.step(0.5);
        assert_relative_eq!(body.center(), Vector3::new(2.0, 2.0, 2.5));
        assert_relative_eq!(body.previous().center, Vector3::new(1.0, 2.0, 3.0));
        let expected = Transform::rotation_about(FRAC_PI_2 * 0.5, &Vector3::z_axis());
        assert_relative_eq!(body.current().rotation, expected, epsilon = 1e-6);
        assert_eq!(body.steps(), 1);
    }

    #[test]
    fn test_previous_is_exactly_one_step_behind() {
        let mut body = spinning(1.0);
        for _ in 0..5 {
            body.step(0.05);
        }
        let mut replay = *body.previous();
        replay.center += body.linear_velocity * 0.05;
        assert_relative_eq!(replay.center, body.center(), epsilon = 1e-6);
    }

    #[test]
    fn test_spin_is_world_space() {
        let tilted = Transform::rotation_about(FRAC_PI_2, &Vector3::x_axis());
        let mut body = Body::emplace(tilted, Vector3::zeros(), 1.0, Some(Vector3::z())).unwrap();
        body.step(0.3);
        let expected = Transform::rotation_about(0.3, &Vector3::z_axis()) * tilted;
        assert_relative_eq!(body.current().rotation, expected, epsilon = 1e-6);
    }

    #[test]
    fn test_interpolation_boundaries() {
        let mut body = spinning(2.0).with_scale(Vector3::new(1.0, 3.0, 0.5));
        body.step(0.05);
        body.step(0.05);
        let scale = Transform::scale(&body.scale);
        let previous = body.previous().to_matrix() * scale;
        let current = body.current().to_matrix() * scale;
        assert_relative_eq!(body.interpolated_pose(0.0), previous, epsilon = 1e-6);
        assert_relative_eq!(body.interpolated_pose(1.0), current, epsilon = 1e-6);
        assert_relative_eq!(body.interpolated_pose(1.0), body.current_transform(), epsilon = 1e-6);
    }

    #[test]
    fn test_interpolation_midpoint_and_extrapolation() {
        let mut body = spinning(0.0);
        body.step(1.0);
        let mid = Transform::origin_of(&body.interpolated_pose(0.5));
        assert_relative_eq!(mid, Vector3::new(2.0, 2.0, 2.5));
        let ahead = Transform::origin_of(&body.interpolated_pose(2.0));
        assert_relative_eq!(ahead, Vector3::new(5.0, 2.0, 1.0));
    }

    #[test]
    fn test_blend_state_stores_drawn() {
        let mut body = spinning(1.0);
        body.step(0.1);
        body.blend_state(0.25);
        assert_eq!(*body.drawn(), body.interpolated_pose(0.25));
    }

    #[test]
    fn test_emplace_rejects_degenerate_input() {
        let origin = Matrix4::identity();
        assert_eq!(
            Body::emplace(origin, Vector3::zeros(), 1.0, Some(Vector3::zeros())).unwrap_err(),
            SimError::DegenerateSpinAxis
        );
        assert!(matches!(
            Body::emplace(origin, Vector3::new(f32::NAN, 0.0, 0.0), 1.0, None),
            Err(SimError::NonFinite { what: "linear velocity" })
        ));
        assert!(matches!(
            Body::emplace(origin, Vector3::zeros(), f32::INFINITY, None),
            Err(SimError::NonFinite { .. })
        ));
    }

    #[test]
    fn test_random_axis_is_unit() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..32 {
            assert_relative_eq!(random_axis(&mut rng).norm(), 1.0, epsilon = 1e-6);
        }
        let body = Body::emplace(Matrix4::identity(), Vector3::zeros(), 1.0, None).unwrap();
        assert_relative_eq!(body.spin_axis.norm(), 1.0, epsilon = 1e-6);
    }
}
