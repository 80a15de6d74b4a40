/// Shapes drawn by the demo hosts and sampled by colliders
use nalgebra::{Point3, Vector3};

/// A 3D vertex with position and normal
#[derive(Debug, Clone, Copy)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
}

impl Vertex {
    pub fn new(position: Point3<f32>, normal: Vector3<f32>) -> Self {
        Self { position, normal }
    }
}

/// A triangle face defined by three vertices
#[derive(Debug, Clone)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
}

impl Triangle {
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Face normal from the winding of the vertices
    pub fn calculate_normal(&self) -> Vector3<f32> {
        let [a, b, c] = self.vertices.map(|v| v.position);
        (b - a).cross(&(c - a)).normalize()
    }
}

/// A 3D mesh composed of triangles
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

/// Seed of the subdivision sphere: a regular tetrahedron on the unit sphere.
const TETRAHEDRON: [[f32; 3]; 4] = [
    [0.0, 0.0, -1.0],
    [0.0, 0.9428, 0.3333],
    [-0.8165, -0.4714, 0.3333],
    [0.8165, -0.4714, 0.3333],
];

impl Mesh {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            triangles: Vec::with_capacity(capacity),
        }
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    /// Axis-aligned cube centered on the origin, flat shaded
    pub fn cube(size: f32) -> Self {
        let half = size / 2.0;
        let mut mesh = Self::with_capacity(12);
        for axis in 0..3 {
            for sign in [1.0f32, -1.0] {
                let mut normal = Vector3::zeros();
                normal[axis] = sign;
                // Two in-face directions forming a right-handed frame with the normal.
                let mut u = Vector3::zeros();
                u[(axis + 1) % 3] = 1.0;
                let v = normal.cross(&u);
                let center = Point3::from(normal * half);
                let corner = |du: f32, dv: f32| Vertex::new(center + (u * du + v * dv) * half, normal);
                let quad = [corner(-1.0, -1.0), corner(1.0, -1.0), corner(1.0, 1.0), corner(-1.0, 1.0)];
                mesh.add_triangle(Triangle::new(quad[0], quad[1], quad[2]));
                mesh.add_triangle(Triangle::new(quad[0], quad[2], quad[3]));
            }
        }
        mesh
    }

    /// Unit sphere built by recursively splitting a tetrahedron's faces and
    /// pushing the new midpoints out to radius one.
    pub fn subdivision_sphere(subdivisions: u32) -> Self {
        let seed = TETRAHEDRON.map(|[x, y, z]| Vector3::new(x, y, z).normalize());
        let faces = [[0, 1, 2], [3, 2, 1], [1, 0, 3], [0, 2, 3]];
        let mut mesh = Self::with_capacity(4 * 4usize.pow(subdivisions));
        for [a, b, c] in faces {
            subdivide(&mut mesh, seed[a], seed[b], seed[c], subdivisions);
        }
        mesh
    }

    /// Distinct vertex positions, in first-seen order
    pub fn sample_points(&self) -> Vec<Point3<f32>> {
        let mut points: Vec<Point3<f32>> = Vec::new();
        for triangle in &self.triangles {
            for vertex in &triangle.vertices {
                let p = vertex.position;
                if !points.iter().any(|q| (q - p).norm_squared() < 1.0e-10) {
                    points.push(p);
                }
            }
        }
        points
    }
}

fn subdivide(mesh: &mut Mesh, a: Vector3<f32>, b: Vector3<f32>, c: Vector3<f32>, depth: u32) {
    if depth == 0 {
        // On a unit sphere the position doubles as the smooth normal.
        let vertex = |p: Vector3<f32>| Vertex::new(Point3::from(p), p);
        mesh.add_triangle(Triangle::new(vertex(a), vertex(b), vertex(c)));
        return;
    }
    let ab = a.lerp(&b, 0.5).normalize();
    let ac = a.lerp(&c, 0.5).normalize();
    let bc = b.lerp(&c, 0.5).normalize();
    subdivide(mesh, a, ab, ac, depth - 1);
    subdivide(mesh, ab, b, bc, depth - 1);
    subdivide(mesh, ac, bc, c, depth - 1);
    subdivide(mesh, ab, bc, ac, depth - 1);
}

/// Shapes the demo scenes pick bodies from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Cube,
    Ball,
    Gem,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 3] = [ShapeKind::Cube, ShapeKind::Ball, ShapeKind::Gem];

    /// Build the mesh; all shapes fill roughly the [-1, 1] cube.
    pub fn mesh(self) -> Mesh {
        match self {
            ShapeKind::Cube => Mesh::cube(2.0),
            ShapeKind::Ball => Mesh::subdivision_sphere(3),
            ShapeKind::Gem => Mesh::subdivision_sphere(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cube_faces_point_outward() {
        let cube = Mesh::cube(2.0);
        assert_eq!(cube.triangles.len(), 12);
        for triangle in &cube.triangles {
            let normal = triangle.calculate_normal();
            assert_relative_eq!(normal, triangle.vertices[0].normal, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_cube_samples_are_corners() {
        let points = Mesh::cube(2.0).sample_points();
        assert_eq!(points.len(), 8);
        for p in points {
            assert_relative_eq!(p.coords.abs(), Vector3::repeat(1.0), epsilon = 1e-6);
        }
    }

    #[test]
    fn test_subdivision_sphere_counts() {
        assert_eq!(Mesh::subdivision_sphere(0).triangles.len(), 4);
        assert_eq!(Mesh::subdivision_sphere(2).triangles.len(), 64);
        assert_eq!(Mesh::subdivision_sphere(0).sample_points().len(), 4);
        assert_eq!(Mesh::subdivision_sphere(1).sample_points().len(), 10);
        assert_eq!(Mesh::subdivision_sphere(2).sample_points().len(), 34);
    }

    #[test]
    fn test_subdivision_sphere_is_unit() {
        for p in Mesh::subdivision_sphere(2).sample_points() {
            assert_relative_eq!(p.coords.norm(), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_shape_meshes_are_non_empty() {
        for shape in ShapeKind::ALL {
            assert!(!shape.mesh().triangles.is_empty());
        }
    }
}
