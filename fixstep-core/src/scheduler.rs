/// Fixed-step scheduling.
///
/// The host calls [`Scheduler::advance`] once per rendered frame with however
/// much wall-clock time passed. That time is scaled, capped and accumulated;
/// whole fixed steps are drained from the accumulator in lock-step over every
/// body, and the leftover fraction becomes the blend factor each body is drawn
/// with.
use crate::blend::RotationBlend;
use crate::body::{Body, BodyId};
use crate::config::{ReversePolicy, StepConfig};
use crate::error::SimError;

/// The bodies a scheduler steps. Ids are assigned here, at insertion.
#[derive(Debug, Clone, Default)]
pub struct BodySet {
    bodies: Vec<Body>,
    next_id: u64,
    blend: RotationBlend,
}

impl BodySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bodies inserted without a blend of their own are drawn with `blend`.
    pub fn with_blend(blend: RotationBlend) -> Self {
        Self {
            blend,
            ..Self::default()
        }
    }

    pub fn insert(&mut self, mut body: Body) -> BodyId {
        let id = BodyId(self.next_id);
        self.next_id += 1;
        body.id = Some(id);
        body.blend.get_or_insert(self.blend);
        self.bodies.push(body);
        id
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn contains(&self, id: BodyId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: BodyId) -> Option<&Body> {
        self.bodies.iter().find(|b| b.id == Some(id))
    }

    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.iter_mut().find(|b| b.id == Some(id))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Body> {
        self.bodies.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Body> {
        self.bodies.iter_mut()
    }

    pub fn as_slice(&self) -> &[Body] {
        &self.bodies
    }

    pub fn as_mut_slice(&mut self) -> &mut [Body] {
        &mut self.bodies
    }

    /// Drop every body the predicate rejects, keeping insertion order.
    pub fn retain<F: FnMut(&Body) -> bool>(&mut self, keep: F) {
        self.bodies.retain(keep);
    }

    /// Keep only the `len` oldest bodies.
    pub fn truncate(&mut self, len: usize) {
        self.bodies.truncate(len);
    }

    pub fn clear(&mut self) {
        self.bodies.clear();
    }

    fn step_all(&mut self, dt: f32) {
        for body in &mut self.bodies {
            body.step(dt);
        }
    }

    fn blend_all(&mut self, alpha: f32) {
        for body in &mut self.bodies {
            body.blend_state(alpha);
        }
    }
}

impl<'a> IntoIterator for &'a BodySet {
    type Item = &'a Body;
    type IntoIter = std::slice::Iter<'a, Body>;

    fn into_iter(self) -> Self::IntoIter {
        self.bodies.iter()
    }
}

/// Per-step hook run before the bodies are advanced.
///
/// This is where scenes apply forces, spawn and despawn bodies, and run
/// collision checks. Any `FnMut(&mut BodySet, f64)` closure qualifies.
pub trait FixedUpdate {
    fn fixed_update(&mut self, bodies: &mut BodySet, dt: f64);
}

impl<F: FnMut(&mut BodySet, f64)> FixedUpdate for F {
    fn fixed_update(&mut self, bodies: &mut BodySet, dt: f64) {
        self(bodies, dt)
    }
}

/// What one call to [`Scheduler::advance`] did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    /// Fixed steps taken during the call.
    pub steps: u32,
    /// `accumulated_time / fixed_step` after draining; what bodies were blended with.
    pub blend: f64,
}

/// Drives a [`BodySet`] at a fixed rate from variable frame deltas.
#[derive(Debug, Clone)]
pub struct Scheduler {
    config: StepConfig,
    accumulated_time: f64,
    time_scale: f64,
    simulated_time: f64,
    step_count: u64,
    bodies: BodySet,
}

impl Scheduler {
    pub fn new(config: StepConfig) -> Result<Self, SimError> {
        config.validate()?;
        log::debug!(
            "scheduler: fixed step {}s, spiral cap {}s (at most {} steps per frame), reverse {}",
            config.fixed_step,
            config.spiral_cap,
            config.max_steps_per_frame(),
            config.reverse.name()
        );
        Ok(Self {
            config,
            accumulated_time: 0.0,
            time_scale: config.time_scale,
            simulated_time: 0.0,
            step_count: 0,
            bodies: BodySet::with_blend(config.rotation_blend),
        })
    }

    /// Feed one frame's worth of wall-clock seconds into the simulation.
    ///
    /// `on_fixed_step` runs once per fixed step, before every body takes that
    /// step, so step `i` reaches all bodies before step `i + 1` reaches any.
    /// Afterwards every body is blended for drawing.
    pub fn advance<U>(&mut self, raw_delta: f64, on_fixed_step: &mut U) -> Result<Frame, SimError>
    where
        U: FixedUpdate + ?Sized,
    {
        let scaled = raw_delta * self.time_scale;
        self.accumulated_time += self.admit(scaled)?;

        let fixed = self.config.fixed_step;
        let mut steps = 0u32;
        while self.accumulated_time.abs() >= fixed {
            // Matches the sign of the admitted delta whenever the loop runs.
            let direction = self.accumulated_time.signum();
            on_fixed_step.fixed_update(&mut self.bodies, fixed);
            self.bodies.step_all(fixed as f32);
            self.simulated_time += direction * fixed;
            self.accumulated_time -= direction * fixed;
            self.step_count += 1;
            steps += 1;
        }

        let blend = self.accumulated_time / fixed;
        self.bodies.blend_all(blend as f32);
        Ok(Frame { steps, blend })
    }

    /// Apply the spiral cap and reverse-time policy to a scaled delta.
    fn admit(&self, scaled: f64) -> Result<f64, SimError> {
        if scaled.is_nan() {
            return Err(SimError::NonFinite { what: "frame delta" });
        }
        let cap = self.config.spiral_cap;
        let admitted = if scaled >= 0.0 {
            scaled.min(cap)
        } else {
            match self.config.reverse {
                ReversePolicy::Uncapped => scaled,
                ReversePolicy::Symmetric => scaled.max(-cap),
                ReversePolicy::Reject => {
                    log::warn!("rejected reverse frame delta {scaled}s");
                    return Err(SimError::ReverseTime { delta: scaled });
                }
            }
        };
        if !admitted.is_finite() {
            return Err(SimError::NonFinite { what: "frame delta" });
        }
        if admitted != scaled {
            log::trace!("spiral cap engaged: {scaled}s admitted as {admitted}s");
        }
        Ok(admitted)
    }

    pub fn config(&self) -> &StepConfig {
        &self.config
    }

    pub fn fixed_step(&self) -> f64 {
        self.config.fixed_step
    }

    pub fn accumulated_time(&self) -> f64 {
        self.accumulated_time
    }

    pub fn simulated_time(&self) -> f64 {
        self.simulated_time
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    /// No bounds: zero freezes the clock, negative runs it backward.
    pub fn set_time_scale(&mut self, factor: f64) {
        self.time_scale = factor;
    }

    pub fn speed_up(&mut self) {
        self.time_scale *= 5.0;
    }

    pub fn slow_down(&mut self) {
        self.time_scale /= 5.0;
    }

    pub fn bodies(&self) -> &BodySet {
        &self.bodies
    }

    pub fn bodies_mut(&mut self) -> &mut BodySet {
        &mut self.bodies
    }
}
