/// fixstep core: a fixed-timestep body stepper with state interpolation.
///
/// Hosts feed real frame time into a [`Scheduler`], which advances every
/// [`Body`] in whole fixed steps and leaves each one blended between its last
/// two poses for drawing. Scenes hook into each fixed step through
/// [`FixedUpdate`]; [`collision::probe`] answers overlap queries between bodies.
pub mod blend;
pub mod body;
pub mod collision;
pub mod config;
pub mod error;
pub mod geometry;
pub mod projection;
pub mod scene;
pub mod scheduler;
pub mod transform;

// Re-export commonly used types
pub use blend::RotationBlend;
pub use body::{Body, BodyId, Pose};
pub use collision::{probe, Collider, IntersectionTest, Volume};
pub use config::{ReversePolicy, StepConfig};
pub use error::SimError;
pub use geometry::{Mesh, ShapeKind, Triangle, Vertex};
pub use projection::Camera;
pub use scene::{Appearance, CollisionScene, DemoScene, InertiaScene, SceneKind};
pub use scheduler::{BodySet, FixedUpdate, Frame, Scheduler};
pub use transform::Transform;
