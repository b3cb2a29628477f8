//! Deterministic simulation module
//!
//! All physics lives here. This module must be pure and deterministic:
//! - Elapsed time comes from the caller only
//! - Stable iteration order (shape kind, then registration order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod scene;
pub mod shapes;
pub mod state;
pub mod tick;

pub use collision::{
    Contact, box_contact, circle_collision, polygon_contact, rect_collision, reflect_velocity,
    segment_collision,
};
pub use scene::{Scene, SceneError, ShapeId, ShapeKind};
pub use shapes::{Circle, Polygon, Rect};
pub use state::{Ball, BallSnapshot, Simulation};
pub use tick::StepReport;
