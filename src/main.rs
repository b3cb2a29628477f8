//! Bounce Sim entry point
//!
//! Builds the scene, then drives the simulation at the configured cadence and
//! prints the display as text.
//!
//! Usage: `bounce-sim [settings.json] [seconds] [infer_axis|skip]`
//!
//! The default run is two seconds; the restitution above 1 makes bounces
//! grow until the ball outruns the floor a little after that.

use bounce_sim::render::TextCanvas;
use bounce_sim::sim::Scene;
use bounce_sim::{Driver, Frame, FrameSink, MissingNormalPolicy, Settings, Simulation};

/// Prints the canvas every `every` frames with an FPS line on top
struct ConsoleSink {
    canvas: TextCanvas,
    every: u64,
}

impl FrameSink for ConsoleSink {
    fn present(&mut self, scene: &Scene, frame: &Frame) {
        self.canvas.present(scene, frame);
        if frame.tick % self.every == 0 {
            let pos = frame.snapshot.position;
            println!(
                "FPS: {:2}  tick {}  ball ({:.0}, {:.0})",
                frame.fps, frame.tick, pos.x, pos.y
            );
            print!("{}", self.canvas.render());
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Bounce Sim starting...");

    let mut args = std::env::args().skip(1);

    let mut settings = match args.next() {
        Some(path) => Settings::load(&path).unwrap_or_else(|e| {
            log::error!("{}; using default settings", e);
            Settings::default()
        }),
        None => {
            log::info!("Using default settings");
            Settings::default()
        }
    };

    let seconds = args
        .next()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(2);

    if let Some(arg) = args.next() {
        match MissingNormalPolicy::from_str(&arg) {
            Some(policy) => settings.missing_normal = policy,
            None => log::warn!("Unknown missing-normal policy `{}`, ignoring", arg),
        }
    }
    log::info!("Missing-normal policy: {}", settings.missing_normal.as_str());

    // Print twice a second
    let every = u64::from((500 / settings.tick_ms.max(1)).max(1));
    let sim = Simulation::from_settings(settings);
    let sink = ConsoleSink {
        canvas: TextCanvas::default(),
        every,
    };

    let mut driver = Driver::new(sim, sink);
    let ticks = driver.run_realtime(std::time::Duration::from_secs(seconds));

    let ball = driver.simulation().ball();
    log::info!(
        "Done after {} ticks: ball at {:?}, velocity {:?}",
        ticks,
        ball.pos,
        ball.vel
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No display driver on wasm; the library is the entry point
}
