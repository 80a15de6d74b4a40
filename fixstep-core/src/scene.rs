/// The two demo scenes: free fall with bouncing, and collision detection.
///
/// Each scene is a [`FixedUpdate`] hook. It keeps the body population topped
/// up, applies its forces and despawns what it no longer wants, all from
/// inside the fixed step. Render-side attributes (shape, highlight) live in
/// the scene, keyed by [`BodyId`].
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use nalgebra::{Matrix4, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::body::{random_axis, Body, BodyId};
use crate::collision::{probe, Collider};
use crate::geometry::ShapeKind;
use crate::scheduler::{BodySet, FixedUpdate};
use crate::transform::Transform;

/// How a body should be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Appearance {
    pub shape: ShapeKind,
    /// Set by the collision scene while the body is touching another.
    pub highlighted: bool,
}

/// `base` plus an independent offset in `[-s/2, s/2)` on every component.
fn jitter<R: Rng + ?Sized>(rng: &mut R, base: Vector3<f32>, s: f32) -> Vector3<f32> {
    base.map(|x| x + s * (rng.gen::<f32>() - 0.5))
}

fn random_shape<R: Rng + ?Sized>(rng: &mut R) -> ShapeKind {
    ShapeKind::ALL[rng.gen_range(0..ShapeKind::ALL.len())]
}

/// Bodies launched from above the floor, falling under gravity and bouncing.
pub struct InertiaScene {
    rng: StdRng,
    looks: HashMap<BodyId, Appearance>,
    population: usize,
}

impl InertiaScene {
    pub const POPULATION: usize = 150;
    pub const GRAVITY: f32 = -9.8;
    pub const FLOOR: f32 = -8.0;
    pub const RESTITUTION: f32 = 0.8;

    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            looks: HashMap::new(),
            population: Self::POPULATION,
        }
    }

    pub fn with_population(mut self, population: usize) -> Self {
        self.population = population;
        self
    }

    fn spawn(&mut self, bodies: &mut BodySet) -> bool {
        let rng = &mut self.rng;
        let start = jitter(rng, Vector3::new(0.0, 15.0, 0.0), 10.0);
        let velocity = jitter(rng, Vector3::new(0.0, -1.0, 0.0), 2.0).normalize() * 3.0;
        let angular = rng.gen::<f32>();
        let axis = random_axis(rng).into_inner();
        let scale = Vector3::new(1.0, 1.0 + rng.gen::<f32>(), 1.0);
        let shape = random_shape(rng);
        match Body::emplace(Transform::translation(&start), velocity, angular, Some(axis)) {
            Ok(body) => {
                let id = bodies.insert(body.with_scale(scale));
                self.looks.insert(id, Appearance { shape, highlighted: false });
                true
            }
            Err(err) => {
                log::warn!("inertia scene could not spawn a body: {err}");
                false
            }
        }
    }

    pub fn appearance(&self, id: BodyId) -> Option<Appearance> {
        self.looks.get(&id).copied()
    }
}

impl FixedUpdate for InertiaScene {
    fn fixed_update(&mut self, bodies: &mut BodySet, dt: f64) {
        let dt = dt as f32;
        while bodies.len() < self.population {
            if !self.spawn(bodies) {
                break;
            }
        }

        for body in bodies.iter_mut() {
            body.linear_velocity.y += dt * Self::GRAVITY;
            if body.center().y < Self::FLOOR && body.linear_velocity.y < 0.0 {
                body.linear_velocity.y *= -Self::RESTITUTION;
            }
        }

        let before = bodies.len();
        bodies.retain(|b| b.center().norm() < 50.0 && b.linear_velocity.norm() > 2.0);
        if bodies.len() != before {
            log::trace!("inertia scene despawned {} bodies", before - bodies.len());
            self.looks.retain(|id, _| bodies.contains(*id));
        }
    }
}

/// Bodies pulled toward the origin that freeze and light up when they touch.
pub struct CollisionScene {
    rng: StdRng,
    looks: HashMap<BodyId, Appearance>,
    population: usize,
    colliders: Vec<Collider>,
    selection: usize,
}

impl CollisionScene {
    pub const POPULATION: usize = 40;
    /// Chance per step that a slow body is recycled.
    pub const RECYCLE_CHANCE: f64 = 0.01;

    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            looks: HashMap::new(),
            population: Self::POPULATION,
            colliders: Collider::presets(),
            selection: 0,
        }
    }

    pub fn with_population(mut self, population: usize) -> Self {
        self.population = population;
        self
    }

    pub fn collider(&self) -> &Collider {
        &self.colliders[self.selection]
    }

    pub fn selection(&self) -> usize {
        self.selection
    }

    pub fn next_collider(&mut self) {
        self.selection = (self.selection + 1).min(self.colliders.len() - 1);
    }

    pub fn previous_collider(&mut self) {
        self.selection = self.selection.saturating_sub(1);
    }

    pub fn appearance(&self, id: BodyId) -> Option<Appearance> {
        self.looks.get(&id).copied()
    }

    fn spawn(&mut self, bodies: &mut BodySet) -> bool {
        let rng = &mut self.rng;
        let start = jitter(rng, Vector3::zeros(), 30.0);
        let tilt = Transform::rotation_about(std::f32::consts::PI, &random_axis(rng));
        let location: Matrix4<f32> = Transform::translation(&start) * tilt;
        let velocity = jitter(rng, Vector3::zeros(), 20.0);
        let angular = rng.gen::<f32>();
        let axis = random_axis(rng).into_inner();
        let shape = random_shape(rng);
        match Body::emplace(location, velocity, angular, Some(axis)) {
            Ok(body) => {
                let id = bodies.insert(body.with_scale(Vector3::new(1.0, 5.0, 1.0)));
                self.looks.insert(id, Appearance { shape, highlighted: false });
                true
            }
            Err(err) => {
                log::warn!("collision scene could not spawn a body: {err}");
                false
            }
        }
    }
}

impl FixedUpdate for CollisionScene {
    fn fixed_update(&mut self, bodies: &mut BodySet, dt: f64) {
        let dt = dt as f32;
        bodies.truncate(self.population);
        while bodies.len() < self.population {
            if !self.spawn(bodies) {
                break;
            }
        }

        let rng = &mut self.rng;
        bodies.retain(|b| rng.gen_bool(1.0 - Self::RECYCLE_CHANCE) || b.linear_velocity.norm() > 1.0);
        self.looks.retain(|id, _| bodies.contains(*id));

        let collider = &self.colliders[self.selection];
        let count = bodies.len();
        for i in 0..count {
            let slice = bodies.as_mut_slice();
            let center = slice[i].center();
            slice[i].linear_velocity -= center * dt;
            let id = slice[i].id();
            if let Some(look) = id.and_then(|id| self.looks.get_mut(&id)) {
                look.highlighted = false;
            }
            if slice[i].linear_velocity.norm() == 0.0 {
                continue;
            }

            let a = &slice[i];
            let hit = slice.iter().any(|b| probe(a, b, collider));
            if hit {
                let a = &mut slice[i];
                a.linear_velocity = Vector3::zeros();
                a.angular_velocity = 0.0;
                if let Some(look) = id.and_then(|id| self.looks.get_mut(&id)) {
                    look.highlighted = true;
                }
            }
        }
    }
}

/// Which demo to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneKind {
    Inertia,
    Collision,
}

impl SceneKind {
    pub fn name(self) -> &'static str {
        match self {
            SceneKind::Inertia => "inertia",
            SceneKind::Collision => "collision",
        }
    }

    pub fn other(self) -> Self {
        match self {
            SceneKind::Inertia => SceneKind::Collision,
            SceneKind::Collision => SceneKind::Inertia,
        }
    }
}

impl fmt::Display for SceneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SceneKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inertia" => Ok(SceneKind::Inertia),
            "collision" => Ok(SceneKind::Collision),
            other => Err(format!("unknown scene `{other}` (expected inertia or collision)")),
        }
    }
}

/// Either demo, chosen at construction.
pub enum DemoScene {
    Inertia(InertiaScene),
    Collision(CollisionScene),
}

impl DemoScene {
    pub fn new(kind: SceneKind, seed: u64) -> Self {
        log::info!("starting {kind} scene (seed {seed})");
        match kind {
            SceneKind::Inertia => DemoScene::Inertia(InertiaScene::new(seed)),
            SceneKind::Collision => DemoScene::Collision(CollisionScene::new(seed)),
        }
    }

    pub fn kind(&self) -> SceneKind {
        match self {
            DemoScene::Inertia(_) => SceneKind::Inertia,
            DemoScene::Collision(_) => SceneKind::Collision,
        }
    }

    pub fn appearance(&self, id: BodyId) -> Option<Appearance> {
        match self {
            DemoScene::Inertia(scene) => scene.appearance(id),
            DemoScene::Collision(scene) => scene.appearance(id),
        }
    }

    /// The active collider, for scenes that have one.
    pub fn collider(&self) -> Option<&Collider> {
        match self {
            DemoScene::Inertia(_) => None,
            DemoScene::Collision(scene) => Some(scene.collider()),
        }
    }

    pub fn next_collider(&mut self) {
        if let DemoScene::Collision(scene) = self {
            scene.next_collider();
        }
    }

    pub fn previous_collider(&mut self) {
        if let DemoScene::Collision(scene) = self {
            scene.previous_collider();
        }
    }
}

impl FixedUpdate for DemoScene {
    fn fixed_update(&mut self, bodies: &mut BodySet, dt: f64) {
        match self {
            DemoScene::Inertia(scene) => scene.fixed_update(bodies, dt),
            DemoScene::Collision(scene) => scene.fixed_update(bodies, dt),
        }
    }
}
