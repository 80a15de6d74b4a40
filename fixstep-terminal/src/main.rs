/// fixstep terminal demo
///
/// Usage: fixstep-terminal [--config PATH] [--seed N] [inertia|collision]
///
/// Controls:
///   - T / t: Multiply / divide the time scale by 5
///   - Space: Pause
///   - n / b: Next / previous collider (collision scene)
///   - Tab: Switch scene
///   - Q/ESC: Quit
///
/// Logs go to stderr; redirect it (`2>fixstep.log`) when raising `RUST_LOG`.
use std::io;
use std::time::{SystemTime, UNIX_EPOCH};

use fixstep_core::{SceneKind, StepConfig};
use fixstep_terminal::TerminalApp;

struct Options {
    config: StepConfig,
    scene: SceneKind,
    seed: u64,
}

fn parse_args() -> io::Result<Options> {
    let mut options = Options {
        config: StepConfig::default(),
        scene: SceneKind::Inertia,
        seed: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default(),
    };

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args.next().ok_or_else(|| usage("--config needs a path"))?;
                let text = std::fs::read_to_string(&path)?;
                options.config = StepConfig::parse(&text)
                    .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, format!("{path}: {err}")))?;
                log::info!("loaded {path}: {}", options.config);
            }
            "--seed" => {
                let seed = args.next().ok_or_else(|| usage("--seed needs a number"))?;
                options.seed = seed.parse().map_err(|_| usage("--seed needs a number"))?;
            }
            scene => options.scene = scene.parse().map_err(|err: String| usage(&err))?,
        }
    }
    Ok(options)
}

fn usage(message: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("{message}\nusage: fixstep-terminal [--config PATH] [--seed N] [inertia|collision]"),
    )
}

fn main() -> io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let options = parse_args()?;

    let mut app = TerminalApp::new(options.config, options.scene, options.seed)?;
    app.run()
}
