/// Terminal host for the fixstep demo scenes
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use fixstep_core::{Camera, DemoScene, Mesh, SceneKind, Scheduler, ShapeKind, SimError, StepConfig};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};

pub mod renderer;

pub use renderer::AsciiRenderer;

/// Terminal cells are roughly twice as tall as they are wide.
const CELL_ASPECT: f32 = 0.5;

/// Main application struct: a scheduler, the scene driving it, and a canvas
pub struct TerminalApp {
    scheduler: Scheduler,
    scene: DemoScene,
    seed: u64,
    meshes: Vec<(ShapeKind, Mesh)>,
    camera: Camera,
    renderer: AsciiRenderer,
    running: bool,
    paused: bool,
    last_tick: Instant,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(config: StepConfig, kind: SceneKind, seed: u64) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        let scheduler = Scheduler::new(config).map_err(invalid_input)?;

        Ok(Self {
            scheduler,
            scene: DemoScene::new(kind, seed),
            seed,
            meshes: ShapeKind::ALL.iter().map(|&shape| (shape, shape.mesh())).collect(),
            camera: Camera::new(width as u32, height as u32).with_cell_aspect(CELL_ASPECT),
            renderer: AsciiRenderer::new(width as usize, height as usize),
            running: true,
            paused: false,
            last_tick: Instant::now(),
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        // Rendering is paced; the simulation rate comes from the scheduler.
        let target_frame_time = Duration::from_millis(1000 / 30);
        self.last_tick = Instant::now();

        while self.running {
            let frame_start = Instant::now();

            while event::poll(Duration::from_millis(0))? {
                self.handle_event(event::read()?)?;
            }

            self.update();
            self.render()?;

            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) -> io::Result<()> {
        match event {
            Event::Key(KeyEvent {
                code,
                kind: KeyEventKind::Press,
                ..
            }) => self.handle_key(code),
            Event::Resize(width, height) => {
                self.camera = Camera::new(width as u32, height as u32).with_cell_aspect(CELL_ASPECT);
                self.renderer = AsciiRenderer::new(width as usize, height as usize);
                queue!(stdout(), terminal::Clear(ClearType::All))?;
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            // Shift+T arrives as an upper-case character.
            KeyCode::Char('T') => self.scheduler.speed_up(),
            KeyCode::Char('t') => self.scheduler.slow_down(),
            KeyCode::Char(' ') => self.paused = !self.paused,
            KeyCode::Char('n') => self.scene.next_collider(),
            KeyCode::Char('b') => self.scene.previous_collider(),
            KeyCode::Tab => self.switch_scene(),
            _ => {}
        }
    }

    fn switch_scene(&mut self) {
        let kind = self.scene.kind().other();
        self.seed = self.seed.wrapping_add(1);
        self.scheduler.bodies_mut().clear();
        self.scene = DemoScene::new(kind, self.seed);
    }

    fn update(&mut self) {
        let now = Instant::now();
        let delta = if self.paused {
            0.0
        } else {
            (now - self.last_tick).as_secs_f64()
        };
        self.last_tick = now;

        if let Err(err) = self.scheduler.advance(delta, &mut self.scene) {
            log::warn!("frame dropped: {err}");
        }
    }

    fn render(&mut self) -> io::Result<()> {
        self.renderer.clear();
        for body in self.scheduler.bodies() {
            let look = body.id().and_then(|id| self.scene.appearance(id));
            let shape = look.map_or(ShapeKind::Cube, |l| l.shape);
            let highlighted = look.map_or(false, |l| l.highlighted);
            if let Some((_, mesh)) = self.meshes.iter().find(|(kind, _)| *kind == shape) {
                self.renderer.render_mesh(mesh, body.drawn(), &self.camera, highlighted);
            }
        }

        let mut stdout = stdout();
        self.renderer.draw(&mut stdout)?;

        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(self.status_line()),
            cursor::MoveTo(0, 1),
            Print(self.controls_line()),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }

    fn status_line(&self) -> String {
        let scheduler = &self.scheduler;
        format!(
            "fixstep {} | time scale {:.3} | fixed step {:.3}s ({} blend) | steps {} | bodies {} | FPS {:.1}{}",
            self.scene.kind(),
            scheduler.time_scale(),
            scheduler.fixed_step(),
            scheduler.config().rotation_blend.name(),
            scheduler.step_count(),
            scheduler.bodies().len(),
            self.fps,
            if self.paused { " | paused" } else { "" }
        )
    }

    fn controls_line(&self) -> String {
        let keys = "T/t=time scale Space=pause Tab=scene Q=quit";
        match self.scene.collider() {
            Some(collider) => format!("collider: {} (n/b) | {keys}", collider.describe()),
            None => keys.to_string(),
        }
    }
}

fn invalid_input(err: SimError) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, err)
}
