//! Simulation state and core types
//!
//! The ball and the scene live in one explicit context object; nothing is
//! process-global, so independent simulations can run side by side.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::scene::Scene;
use super::tick::{self, StepReport};
use crate::settings::Settings;

/// The ball entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
}

impl Ball {
    pub fn new(pos: Vec2, vel: Vec2, radius: f32) -> Self {
        Self { pos, vel, radius }
    }

    /// Position/velocity pair as one value
    #[inline]
    pub fn snapshot(&self) -> BallSnapshot {
        BallSnapshot {
            position: self.pos,
            velocity: self.vel,
        }
    }
}

/// Position and velocity published together after a step
///
/// Readers copy the whole pair, so they never observe a position from one
/// step and a velocity from another.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BallSnapshot {
    pub position: Vec2,
    pub velocity: Vec2,
}

/// One ball in one static scene
#[derive(Debug, Clone)]
pub struct Simulation {
    pub(crate) ball: Ball,
    pub(crate) scene: Scene,
    pub(crate) settings: Settings,
}

impl Simulation {
    /// Create a simulation over an already populated scene
    ///
    /// The ball starts at `settings.ball_start` with `settings.ball_velocity`.
    pub fn new(scene: Scene, settings: Settings) -> Self {
        let ball = Ball::new(
            settings.ball_start,
            settings.ball_velocity,
            settings.ball_radius,
        );
        Self {
            ball,
            scene,
            settings,
        }
    }

    /// Create a simulation whose scene is built from `settings.obstacles`
    pub fn from_settings(settings: Settings) -> Self {
        let scene = Scene::from_obstacles(&settings.obstacles, settings.shape_capacity);
        Self::new(scene, settings)
    }

    /// Replace the ball's position and velocity (setup and tests)
    pub fn with_ball(mut self, pos: Vec2, vel: Vec2) -> Self {
        self.ball.pos = pos;
        self.ball.vel = vel;
        self
    }

    /// Advance by `elapsed_ms` and return the new ball position
    pub fn step(&mut self, elapsed_ms: u32) -> Vec2 {
        tick::step(self, elapsed_ms).position
    }

    /// Advance by `elapsed_ms` and report what happened
    pub fn step_report(&mut self, elapsed_ms: u32) -> StepReport {
        tick::step(self, elapsed_ms)
    }

    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[inline]
    pub fn snapshot(&self) -> BallSnapshot {
        self.ball.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_settings_for_ball() {
        let settings = Settings {
            ball_radius: 7.0,
            ..Default::default()
        };
        let sim = Simulation::new(Scene::default(), settings);
        assert_eq!(sim.ball().pos, Vec2::new(100.0, 10.0));
        assert_eq!(sim.ball().vel, Vec2::new(80.0, 0.0));
        assert_eq!(sim.ball().radius, 7.0);
    }

    #[test]
    fn test_from_settings_builds_default_scene() {
        let sim = Simulation::from_settings(Settings::default());
        assert_eq!(sim.scene().rects().len(), 2);
        assert_eq!(sim.scene().capacity(), crate::consts::SHAPE_CAPACITY);
    }

    #[test]
    fn test_snapshot_matches_ball() {
        let sim = Simulation::new(Scene::default(), Settings::default())
            .with_ball(Vec2::new(3.0, 4.0), Vec2::new(-1.0, 2.0));
        let snap = sim.snapshot();
        assert_eq!(snap.position, Vec2::new(3.0, 4.0));
        assert_eq!(snap.velocity, Vec2::new(-1.0, 2.0));
    }
}
