/// Point-sampled collision probe.
///
/// Body `b`'s sample points are carried into body `a`'s local frame, where `a`
/// occupies a canonical unit volume, and tested one by one. This is
/// approximate and deliberately one-sided: only `b`'s samples are tested, so
/// `probe(a, b)` and `probe(b, a)` can disagree.
use nalgebra::Point3;

use crate::body::Body;
use crate::geometry::Mesh;
use crate::transform::Transform;

/// Membership test against a canonical volume in local coordinates.
pub trait IntersectionTest {
    fn intersects(&self, point: &Point3<f32>, margin: f32) -> bool;
}

/// Canonical collision volumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Volume {
    /// Unit sphere at the origin; an ellipsoid once the body's scale applies.
    Sphere,
    /// The [-1, 1] cube.
    Cube,
}

impl IntersectionTest for Volume {
    fn intersects(&self, point: &Point3<f32>, margin: f32) -> bool {
        match self {
            Volume::Sphere => point.coords.norm_squared() < 1.0 + margin,
            Volume::Cube => point.iter().all(|&x| x >= -1.0 - margin && x <= 1.0 + margin),
        }
    }
}

/// A volume test plus the points sampled from the other body's shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Collider {
    pub volume: Volume,
    pub points: Vec<Point3<f32>>,
    pub leeway: f32,
}

impl Collider {
    pub fn new(volume: Volume, points: Vec<Point3<f32>>, leeway: f32) -> Self {
        Self {
            volume,
            points,
            leeway,
        }
    }

    pub fn from_mesh(volume: Volume, mesh: &Mesh, leeway: f32) -> Self {
        Self::new(volume, mesh.sample_points(), leeway)
    }

    /// Coarse sphere, finer sphere, then cube corners.
    pub fn presets() -> Vec<Collider> {
        vec![
            Self::from_mesh(Volume::Sphere, &Mesh::subdivision_sphere(1), 0.5),
            Self::from_mesh(Volume::Sphere, &Mesh::subdivision_sphere(2), 0.3),
            Self::from_mesh(Volume::Cube, &Mesh::cube(2.0), 0.1),
        ]
    }

    pub fn describe(&self) -> String {
        let kind = match self.volume {
            Volume::Sphere => "sphere",
            Volume::Cube => "cube",
        };
        format!("{kind}, {} points, leeway {}", self.points.len(), self.leeway)
    }
}

/// Does any of `b`'s sample points fall inside `a`?
pub fn probe(a: &Body, b: &Body, collider: &Collider) -> bool {
    probe_with(a, b, &collider.volume, &collider.points, collider.leeway)
}

/// [`probe`] with the volume test and sample points supplied separately.
pub fn probe_with<T: IntersectionTest + ?Sized>(
    a: &Body,
    b: &Body,
    test: &T,
    points: &[Point3<f32>],
    leeway: f32,
) -> bool {
    if is_same_body(a, b) {
        return false;
    }
    let Some(a_inverse) = a.current_transform().try_inverse() else {
        log::debug!("probe skipped: body {:?} has a singular transform", a.id());
        return false;
    };
    let relative = a_inverse * b.current_transform();
    points
        .iter()
        .any(|p| test.intersects(&Transform::apply_affine(&relative, p), leeway))
}

fn is_same_body(a: &Body, b: &Body) -> bool {
    std::ptr::eq(a, b) || (a.id().is_some() && a.id() == b.id())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::BodySet;
    use nalgebra::Vector3;

    fn placed(at: Vector3<f32>, scale: Vector3<f32>) -> Body {
        Body::emplace(Transform::translation(&at), Vector3::zeros(), 0.0, Some(Vector3::y()))
            .unwrap()
            .with_scale(scale)
    }

    #[test]
    fn test_volume_tests() {
        let inside = Point3::new(0.5, 0.5, 0.5);
        let corner = Point3::new(1.05, -1.05, 1.0);
        assert!(Volume::Sphere.intersects(&inside, 0.0));
        assert!(!Volume::Sphere.intersects(&corner, 0.1));
        assert!(!Volume::Cube.intersects(&corner, 0.0));
        assert!(Volume::Cube.intersects(&corner, 0.1));
    }

    #[test]
    fn test_presets_match_demo_colliders() {
        let presets = Collider::presets();
        assert_eq!(presets.len(), 3);
        assert_eq!(presets[0].points.len(), 10);
        assert_eq!(presets[1].leeway, 0.3);
        assert_eq!(presets[2].volume, Volume::Cube);
        assert_eq!(presets[2].points.len(), 8);
        assert_eq!(presets[2].describe(), "cube, 8 points, leeway 0.1");
    }

    #[test]
    fn test_overlapping_and_distant_bodies() {
        let collider = &Collider::presets()[0];
        let a = placed(Vector3::zeros(), Vector3::repeat(1.0));
        let near = placed(Vector3::new(1.5, 0.0, 0.0), Vector3::repeat(1.0));
        let far = placed(Vector3::new(10.0, 0.0, 0.0), Vector3::repeat(1.0));
        assert!(probe(&a, &near, collider));
        assert!(!probe(&a, &far, collider));
    }

    #[test]
    fn test_body_never_collides_with_itself() {
        let collider = &Collider::presets()[0];
        let a = placed(Vector3::zeros(), Vector3::repeat(1.0));
        assert!(!probe(&a, &a, collider));

        let mut set = BodySet::new();
        set.insert(a.clone());
        let stored = &set.as_slice()[0];
        let copy = stored.clone();
        assert!(!probe(stored, &copy, collider));
    }

    #[test]
    fn test_probe_is_not_symmetric() {
        // A tall ellipsoid swallows a small body near its top, but none of the
        // ellipsoid's coarse samples land inside the small body.
        let collider = &Collider::presets()[0];
        let tall = placed(Vector3::zeros(), Vector3::new(1.0, 5.0, 1.0));
        let small = placed(Vector3::new(0.0, 3.0, 0.0), Vector3::repeat(0.2));
        assert!(probe(&tall, &small, collider));
        assert!(!probe(&small, &tall, collider));
    }

    #[test]
    fn test_singular_transform_never_collides() {
        let collider = &Collider::presets()[2];
        let flat = placed(Vector3::zeros(), Vector3::new(1.0, 0.0, 1.0));
        let other = placed(Vector3::zeros(), Vector3::repeat(1.0));
        assert!(!probe(&flat, &other, collider));
    }

    #[test]
    fn test_probe_with_custom_test() {
        struct Everything;
        impl IntersectionTest for Everything {
            fn intersects(&self, _: &Point3<f32>, _: f32) -> bool {
                true
            }
        }
        let a = placed(Vector3::zeros(), Vector3::repeat(1.0));
        let b = placed(Vector3::new(100.0, 0.0, 0.0), Vector3::repeat(1.0));
        assert!(probe_with(&a, &b, &Everything, &[Point3::origin()], 0.0));
        assert!(!probe_with(&a, &b, &Everything, &[], 0.0));
    }
}
