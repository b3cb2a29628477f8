//! Bounce Sim - a ball under gravity bouncing off static 2D obstacles
//!
//! Core modules:
//! - `sim`: Deterministic simulation (shapes, collisions, physics step)
//! - `driver`: Fixed-cadence loop that feeds elapsed time and hands frames out
//! - `render`: Text rasterizer for the display
//! - `settings`: Data-driven tuning and scene description

pub mod driver;
pub mod render;
pub mod settings;
pub mod sim;

pub use driver::{Driver, Frame, FrameSink};
pub use settings::{MissingNormalPolicy, Obstacle, Settings, SettingsError};
pub use sim::{BallSnapshot, Scene, SceneError, Simulation};

/// Simulation configuration constants
pub mod consts {
    /// Display dimensions (pixels)
    pub const DISPLAY_WIDTH: u32 = 320;
    pub const DISPLAY_HEIGHT: u32 = 240;

    /// Driver cadence (50 Hz)
    pub const TICK_MS: u32 = 20;

    /// Downward acceleration (pixels/s²)
    pub const GRAVITY: f32 = 200.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 5.0;
    pub const BALL_START: (f32, f32) = (100.0, 10.0);
    pub const BALL_START_VELOCITY: (f32, f32) = (80.0, 0.0);

    /// Speed multiplier along the contact normal on bounce (>1 amplifies)
    pub const RESTITUTION: f32 = 1.1;

    /// Per-kind shape capacity
    pub const SHAPE_CAPACITY: usize = 20;
    /// Maximum points in a polygon loop
    pub const MAX_POLYGON_POINTS: usize = 8;

    /// Tolerance when deciding whether a projected point lies on a segment
    pub const SEGMENT_BUFFER: f32 = 0.1;

    /// Upper bound on sweep subdivisions per step
    pub const MAX_SWEEP_STEPS: u32 = 4096;
}
