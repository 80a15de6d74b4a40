/// fixstep Web - wasm-bindgen host for the demo scenes
///
/// The page owns drawing. Each `requestAnimationFrame` it passes the frame's
/// elapsed milliseconds to [`WebSimulation::advance_millis`] and then reads the
/// blended transforms back as one flat buffer.
use fixstep_core::{DemoScene, SceneKind, Scheduler, ShapeKind, SimError, StepConfig};
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).map_err(|err| JsValue::from_str(&err.to_string()))?;
    Ok(())
}

fn to_js(err: SimError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[wasm_bindgen]
pub struct WebSimulation {
    scheduler: Scheduler,
    scene: DemoScene,
    last_tick: Option<f64>,
}

#[wasm_bindgen]
impl WebSimulation {
    /// `scene` is `"inertia"` or `"collision"`; `config_text` uses the
    /// `key = value` format and may be empty.
    #[wasm_bindgen(constructor)]
    pub fn new(scene: &str, config_text: &str, seed: u32) -> Result<WebSimulation, JsValue> {
        let kind: SceneKind = scene.parse().map_err(|err: String| JsValue::from_str(&err))?;
        let config = StepConfig::parse(config_text).map_err(to_js)?;
        log::info!("fixstep web: {kind} scene, {config}");
        Ok(WebSimulation {
            scheduler: Scheduler::new(config).map_err(to_js)?,
            scene: DemoScene::new(kind, u64::from(seed)),
            last_tick: None,
        })
    }

    /// Advance by one frame of `millis` wall-clock milliseconds; returns the
    /// number of fixed steps taken.
    pub fn advance_millis(&mut self, millis: f64) -> Result<u32, JsValue> {
        let frame = self
            .scheduler
            .advance(millis / 1000.0, &mut self.scene)
            .map_err(to_js)?;
        Ok(frame.steps)
    }

    /// Advance by the time since the previous `tick`, read from `performance.now()`.
    pub fn tick(&mut self) -> Result<u32, JsValue> {
        let now = web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .ok_or_else(|| JsValue::from_str("performance.now() is unavailable"))?;
        let elapsed = self.last_tick.map_or(0.0, |last| now - last);
        self.last_tick = Some(now);
        self.advance_millis(elapsed)
    }

    pub fn speed_up(&mut self) {
        self.scheduler.speed_up();
    }

    pub fn slow_down(&mut self) {
        self.scheduler.slow_down();
    }

    pub fn set_time_scale(&mut self, factor: f64) {
        self.scheduler.set_time_scale(factor);
    }

    pub fn time_scale(&self) -> f64 {
        self.scheduler.time_scale()
    }

    pub fn fixed_step(&self) -> f64 {
        self.scheduler.fixed_step()
    }

    pub fn step_count(&self) -> f64 {
        // JS numbers; exact up to 2^53 steps.
        self.scheduler.step_count() as f64
    }

    pub fn body_count(&self) -> usize {
        self.scheduler.bodies().len()
    }

    pub fn next_collider(&mut self) {
        self.scene.next_collider();
    }

    pub fn previous_collider(&mut self) {
        self.scene.previous_collider();
    }

    /// Description of the active collider, empty for scenes without one.
    pub fn collider(&self) -> String {
        self.scene.collider().map(|c| c.describe()).unwrap_or_default()
    }

    /// Blended transforms, 16 column-major floats per body.
    pub fn transforms(&self) -> Vec<f32> {
        let bodies = self.scheduler.bodies();
        let mut out = Vec::with_capacity(bodies.len() * 16);
        for body in bodies {
            out.extend_from_slice(body.drawn().as_slice());
        }
        out
    }

    /// One entry per body, in the order of [`WebSimulation::transforms`]:
    /// 1 if highlighted, else 0.
    pub fn highlighted(&self) -> Vec<u8> {
        self.scheduler
            .bodies()
            .iter()
            .map(|body| {
                let lit = body
                    .id()
                    .and_then(|id| self.scene.appearance(id))
                    .map_or(false, |look| look.highlighted);
                u8::from(lit)
            })
            .collect()
    }

    /// Shape index per body: 0 cube, 1 ball, 2 gem.
    pub fn shapes(&self) -> Vec<u8> {
        self.scheduler
            .bodies()
            .iter()
            .map(|body| {
                let shape = body.id().and_then(|id| self.scene.appearance(id)).map(|look| look.shape);
                shape
                    .and_then(|s| ShapeKind::ALL.iter().position(|&k| k == s))
                    .unwrap_or(0) as u8
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_millis_are_converted_to_seconds() {
        let mut sim = WebSimulation::new("inertia", "", 7).unwrap();
        assert_eq!(sim.advance_millis(100.0).unwrap(), 2);
        assert_eq!(sim.step_count(), 2.0);
        assert_eq!(sim.transforms().len(), sim.body_count() * 16);
        assert_eq!(sim.highlighted().len(), sim.body_count());
        assert_eq!(sim.shapes().len(), sim.body_count());
    }

    #[test]
    fn test_config_text_is_applied() {
        let mut sim = WebSimulation::new("collision", "fixed_step = 0.01\nspiral_cap = 1.0", 7).unwrap();
        assert_eq!(sim.fixed_step(), 0.01);
        sim.speed_up();
        assert_eq!(sim.time_scale(), 5.0);
        assert!(!sim.collider().is_empty());
    }
}
