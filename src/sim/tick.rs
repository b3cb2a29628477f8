//! Physics step
//!
//! Advances the ball by one elapsed-time interval: gravity, displacement,
//! sweep against the scene, and velocity reflection on contact.

use glam::Vec2;

use super::collision::{Contact, reflect_velocity};
use super::scene::Scene;
use super::state::Simulation;
use crate::consts::MAX_SWEEP_STEPS;
use crate::settings::MissingNormalPolicy;

/// Outcome of a single step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Contact that stopped the ball this step, if any
    pub contact: Option<Contact>,
    /// Whether velocity was reflected off the contact
    pub reflected: bool,
}

/// Where a blocked move ends up
struct Sweep {
    /// Last collision-free offset from the starting position
    offset: Vec2,
    /// Contact found at the first blocked sub-step
    contact: Option<Contact>,
    /// The starting position itself is in contact
    blocked_at_start: bool,
}

/// Advance the simulation by `elapsed_ms`
pub fn step(sim: &mut Simulation, elapsed_ms: u32) -> StepReport {
    let Simulation {
        ball,
        scene,
        settings,
    } = sim;

    if elapsed_ms == 0 {
        return StepReport {
            position: ball.pos,
            velocity: ball.vel,
            contact: None,
            reflected: false,
        };
    }

    let dt = elapsed_ms as f32 / 1000.0;

    // Gravity pulls toward +y (down the screen)
    ball.vel.y += settings.gravity * dt;

    let desired = quantize(ball.vel * dt, settings.pixel_snap);

    let Some(endpoint) = scene.check_collision(ball.pos + desired, ball.radius) else {
        ball.pos += desired;
        return StepReport {
            position: ball.pos,
            velocity: ball.vel,
            contact: None,
            reflected: false,
        };
    };

    let swept = sweep(scene, ball.pos, ball.radius, desired, settings.pixel_snap);
    let contact = swept.contact.unwrap_or(endpoint);
    ball.pos += swept.offset;

    // Started the step overlapping: move back onto the boundary
    if swept.blocked_at_start && contact.penetration > 0.0 {
        let push = contact.resolution_normal() * contact.penetration;
        ball.pos += if settings.pixel_snap {
            round_away(push)
        } else {
            push
        };
    }

    let normal = match (contact.normal, settings.missing_normal) {
        (Some(normal), _) => Some(normal),
        (None, MissingNormalPolicy::InferAxis) => Some(contact.inferred_normal),
        (None, MissingNormalPolicy::Skip) => None,
    };

    // Normals face the ball; only bounce while moving into the surface
    let mut reflected = false;
    if let Some(normal) = normal.filter(|n| ball.vel.dot(*n) < 0.0) {
        ball.vel = reflect_velocity(ball.vel, normal, settings.restitution);
        reflected = true;
    }

    log::trace!(
        "contact {:?} at {:?}, vel {:?}, reflected={}",
        contact.shape,
        ball.pos,
        ball.vel,
        reflected
    );

    StepReport {
        position: ball.pos,
        velocity: ball.vel,
        contact: Some(contact),
        reflected,
    }
}

/// Walk the displacement in roughly one-pixel increments and stop before
/// the first blocked sub-step
fn sweep(scene: &Scene, start: Vec2, radius: f32, desired: Vec2, snap: bool) -> Sweep {
    let span = desired.x.abs().max(desired.y.abs()).ceil();
    if span == 0.0 {
        // Not moving at all: the endpoint is the start
        return Sweep {
            offset: Vec2::ZERO,
            contact: None,
            blocked_at_start: true,
        };
    }

    let steps = (span as u32).clamp(1, MAX_SWEEP_STEPS);
    let mut free = Vec2::ZERO;
    for s in 0..=steps {
        let sub = quantize(desired * s as f32 / steps as f32, snap);
        if let Some(contact) = scene.check_collision(start + sub, radius) {
            return Sweep {
                offset: free,
                contact: Some(contact),
                blocked_at_start: s == 0,
            };
        }
        free = sub;
    }

    Sweep {
        offset: free,
        contact: None,
        blocked_at_start: false,
    }
}

/// Truncate toward zero onto the pixel grid when snapping
#[inline]
fn quantize(delta: Vec2, snap: bool) -> Vec2 {
    if snap { delta.trunc() } else { delta }
}

/// Round each component away from zero
#[inline]
fn round_away(v: Vec2) -> Vec2 {
    let away = |c: f32| if c >= 0.0 { c.ceil() } else { c.floor() };
    Vec2::new(away(v.x), away(v.y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::TICK_MS;
    use crate::sim::ShapeId;
    use crate::settings::Settings;

    fn floor_scene() -> Scene {
        let mut scene = Scene::default();
        scene.register_rectangle(0.0, 236.0, 320.0, 4.0).unwrap();
        scene
    }

    #[test]
    fn test_step_zero_is_noop() {
        let mut sim = Simulation::new(floor_scene(), Settings::default());
        let before = sim.snapshot();
        sim.step(0);
        assert_eq!(sim.snapshot(), before);

        // Also when resting in contact with the floor
        let mut sim = Simulation::new(floor_scene(), Settings::default())
            .with_ball(Vec2::new(100.0, 233.0), Vec2::new(0.0, 50.0));
        let before = sim.snapshot();
        sim.step(0);
        assert_eq!(sim.snapshot(), before);
    }

    #[test]
    fn test_free_fall_applies_gravity_and_truncates() {
        let mut sim = Simulation::new(Scene::default(), Settings::default())
            .with_ball(Vec2::new(100.0, 10.0), Vec2::new(80.0, 0.0));
        let pos = sim.step(TICK_MS);
        // vel.y = 200 * 0.02 = 4; delta = (1.6, 0.08) truncated to (1, 0)
        assert_eq!(pos, Vec2::new(101.0, 10.0));
        assert!((sim.ball().vel.y - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_continuous_motion_without_snap() {
        let settings = Settings {
            pixel_snap: false,
            ..Default::default()
        };
        let mut sim = Simulation::new(Scene::default(), settings)
            .with_ball(Vec2::new(100.0, 10.0), Vec2::new(80.0, 0.0));
        let pos = sim.step(TICK_MS);
        assert!((pos.x - 101.6).abs() < 1e-4);
        assert!((pos.y - 10.08).abs() < 1e-4);
    }

    #[test]
    fn test_bounces_off_floor() {
        // Scenario: floor spanning the display, 2 s of 20 ms ticks
        let mut sim = Simulation::new(floor_scene(), Settings::default())
            .with_ball(Vec2::new(100.0, 10.0), Vec2::new(80.0, 0.0));
        let radius = sim.ball().radius;

        let mut first_contact = None;
        let mut bounced_at = None;
        for i in 0..100 {
            let report = sim.step_report(TICK_MS);
            assert!(
                report.position.y <= 236.0 - radius,
                "tick {}: ball sank to y={}",
                i,
                report.position.y
            );
            if report.contact.is_some() && first_contact.is_none() {
                first_contact = Some(i);
            }
            if first_contact.is_some() && bounced_at.is_none() && report.velocity.y < 0.0 {
                bounced_at = Some(i);
            }
        }

        let first_contact = first_contact.expect("ball should reach the floor");
        let bounced_at = bounced_at.expect("ball should bounce");
        assert!(bounced_at - first_contact <= 2);
    }

    #[test]
    fn test_bounce_scales_normal_component() {
        let settings = Settings {
            gravity: 0.0,
            ..Default::default()
        };
        let mut sim = Simulation::new(floor_scene(), settings)
            .with_ball(Vec2::new(100.0, 228.0), Vec2::new(0.0, 250.0));
        let report = sim.step_report(TICK_MS);

        assert!(report.reflected);
        // Blocked after two pixels, touching the floor's inflated edge
        assert_eq!(report.position, Vec2::new(100.0, 230.0));
        // v' = v - 2k(v·n)n with k = 1.1
        assert!((report.velocity.y - (-300.0)).abs() < 1e-3);
    }

    #[test]
    fn test_no_obstacles_falls_forever() {
        // Continuous motion so every tick moves
        let settings = Settings {
            pixel_snap: false,
            ..Default::default()
        };
        let mut sim = Simulation::new(Scene::default(), settings)
            .with_ball(Vec2::new(100.0, 10.0), Vec2::new(80.0, 0.0));

        let mut last_y = sim.ball().pos.y;
        for _ in 0..100 {
            let report = sim.step_report(TICK_MS);
            assert!(report.contact.is_none());
            assert!(sim.scene().check_collision(report.position, 5.0).is_none());
            assert!(report.position.y > last_y);
            last_y = report.position.y;
        }
    }

    #[test]
    fn test_no_obstacles_snapped_never_rises() {
        let mut sim = Simulation::new(Scene::default(), Settings::default());
        let start = sim.ball().pos.y;
        let mut last_y = start;
        for _ in 0..100 {
            let pos = sim.step(TICK_MS);
            assert!(pos.y >= last_y);
            last_y = pos.y;
        }
        assert!(last_y > start);
    }

    #[test]
    fn test_start_overlapping_resolves_to_boundary() {
        let mut scene = Scene::default();
        scene.register_rectangle(100.0, 100.0, 40.0, 40.0).unwrap();
        let mut sim = Simulation::new(scene, Settings::default())
            .with_ball(Vec2::new(120.0, 120.0), Vec2::ZERO);

        for _ in 0..200 {
            sim.step(TICK_MS);
        }

        let pos = sim.ball().pos;
        assert!(pos.x.is_finite() && pos.y.is_finite());
        // Resting on the top of the inflated box (y = 100 - radius)
        assert!((pos.y - 95.0).abs() <= 1.0, "y = {}", pos.y);
        assert!(sim.ball().vel.is_finite());
        assert!(sim.ball().vel.length() < 50.0);
    }

    #[test]
    fn test_shallow_overlap_with_zero_velocity() {
        let mut sim = Simulation::new(floor_scene(), Settings::default())
            .with_ball(Vec2::new(100.0, 233.0), Vec2::ZERO);
        let report = sim.step_report(TICK_MS);
        assert_eq!(report.position, Vec2::new(100.0, 231.0));
        assert!(report.contact.is_some());
        // No sub-steps to sweep, yet the endpoint contact still bounces:
        // vel.y = 4 after gravity, reflected about -y with k = 1.1
        assert!(report.reflected);
        assert!((report.velocity.y - (-4.8)).abs() < 1e-4);
        assert_eq!(report.velocity.x, 0.0);
    }

    #[test]
    fn test_circle_hit_reflects_about_inferred_axis() {
        let settings = Settings {
            gravity: 0.0,
            ..Default::default()
        };
        let mut scene = Scene::default();
        scene.register_circle(100.0, 100.0, 10.0).unwrap();
        let mut sim = Simulation::new(scene, settings)
            .with_ball(Vec2::new(100.0, 80.0), Vec2::new(0.0, 250.0));

        // 5 px per tick: y = 85 is still outside the circle's box
        let first = sim.step_report(TICK_MS);
        assert!(first.contact.is_none());
        assert_eq!(first.position, Vec2::new(100.0, 85.0));

        let report = sim.step_report(TICK_MS);
        let contact = report.contact.expect("ball should reach the circle");
        assert_eq!(contact.normal, None);
        assert_eq!(contact.inferred_normal, Vec2::NEG_Y);
        assert!(report.reflected);
        // Stopped one pixel short of the box top at y = 90
        assert_eq!(report.position, Vec2::new(100.0, 89.0));
        assert!((report.velocity.y - (-300.0)).abs() < 1e-3);
    }

    #[test]
    fn test_skip_policy_keeps_velocity_on_rect_hit() {
        let settings = Settings {
            gravity: 0.0,
            missing_normal: MissingNormalPolicy::Skip,
            ..Default::default()
        };
        let mut sim = Simulation::new(floor_scene(), settings)
            .with_ball(Vec2::new(100.0, 228.0), Vec2::new(0.0, 250.0));
        let report = sim.step_report(TICK_MS);
        assert!(report.contact.is_some());
        assert!(!report.reflected);
        assert_eq!(report.velocity, Vec2::new(0.0, 250.0));
        assert_eq!(report.position, Vec2::new(100.0, 230.0));
    }

    #[test]
    fn test_skip_policy_still_reflects_off_edges() {
        let settings = Settings {
            gravity: 0.0,
            restitution: 1.0,
            missing_normal: MissingNormalPolicy::Skip,
            ..Default::default()
        };
        let mut scene = Scene::default();
        scene.register_rectangle_outline(0.0, 236.0, 320.0, 4.0).unwrap();
        let mut sim = Simulation::new(scene, settings)
            .with_ball(Vec2::new(100.0, 228.0), Vec2::new(0.0, 250.0));
        let report = sim.step_report(TICK_MS);
        assert!(report.reflected);
        assert!((report.velocity.y + 250.0).abs() < 1e-3);
    }

    #[test]
    fn test_faithful_demo_bounces_off_outlines() {
        let mut sim = Simulation::from_settings(Settings::faithful());
        assert!(sim.scene().rects().is_empty());
        assert_eq!(sim.scene().polygons().len(), 2);

        let mut first_bounce = None;
        for i in 0..100 {
            let report = sim.step_report(TICK_MS);
            assert!(report.position.y <= 231.0, "tick {}: y = {}", i, report.position.y);
            if report.reflected && first_bounce.is_none() {
                first_bounce = Some(report);
            }
        }

        let bounce = first_bounce.expect("ball should bounce off the floor outline");
        assert_eq!(bounce.contact.map(|c| c.shape), Some(ShapeId::Polygon(0)));
        assert!(bounce.velocity.y < 0.0);
        assert_eq!(bounce.position.y, 230.0);
    }

    #[test]
    fn test_default_demo_stays_above_floor() {
        // Two seconds at 50 Hz, the binary's default run
        let mut sim = Simulation::from_settings(Settings::default());
        let mut bounced = false;
        for i in 0..100 {
            let report = sim.step_report(TICK_MS);
            assert!(report.position.y <= 231.0, "tick {}: y = {}", i, report.position.y);
            bounced |= report.reflected;
        }
        assert!(bounced);
    }

    #[test]
    fn test_diagonal_wall_deflects_sideways() {
        let settings = Settings {
            gravity: 0.0,
            restitution: 1.0,
            pixel_snap: false,
            ..Default::default()
        };
        let mut scene = Scene::default();
        // 45° ramp rising to the right
        scene
            .register_segment(Vec2::new(50.0, 150.0), Vec2::new(150.0, 50.0))
            .unwrap();
        let mut sim = Simulation::new(scene, settings)
            .with_ball(Vec2::new(90.0, 90.0), Vec2::new(0.0, 200.0));

        let mut reflected = None;
        for _ in 0..10 {
            let report = sim.step_report(TICK_MS);
            if report.reflected {
                reflected = Some(report.velocity);
                break;
            }
        }

        let velocity = reflected.expect("ball should hit the ramp");
        // Falling straight down onto a 45° ramp sends the ball off horizontally
        assert!(velocity.x < -199.0);
        assert!(velocity.y.abs() < 1e-2);
    }

    fn thin_line_sim(speed: f32) -> Simulation {
        let settings = Settings {
            gravity: 0.0,
            ..Default::default()
        };
        let mut scene = Scene::default();
        scene
            .register_segment(Vec2::new(0.0, 100.0), Vec2::new(320.0, 100.0))
            .unwrap();
        Simulation::new(scene, settings).with_ball(Vec2::new(160.0, 50.0), Vec2::new(0.0, speed))
    }

    #[test]
    fn test_fast_ball_stops_before_segment() {
        // 48 px this tick, ending 2 px above the line
        let mut sim = thin_line_sim(2400.0);
        let report = sim.step_report(TICK_MS);
        assert!(report.contact.is_some());
        // First blocked sub-step is y = 95 (5 px from the line)
        assert_eq!(report.position, Vec2::new(160.0, 94.0));
        assert!(report.velocity.y < 0.0);
    }

    #[test]
    fn test_sweep_only_runs_when_endpoint_blocked() {
        // 100 px this tick lands well past the line: nothing is swept
        let mut sim = thin_line_sim(5000.0);
        let report = sim.step_report(TICK_MS);
        assert!(report.contact.is_none());
        assert!(report.position.y > 100.0);
    }

    #[test]
    fn test_determinism() {
        let mut a = Simulation::from_settings(Settings::default());
        let mut b = Simulation::from_settings(Settings::default());
        for _ in 0..250 {
            a.step(TICK_MS);
            b.step(TICK_MS);
            assert_eq!(a.snapshot(), b.snapshot());
        }
    }

    #[test]
    fn test_quantize_and_round_away() {
        assert_eq!(quantize(Vec2::new(1.9, -1.9), true), Vec2::new(1.0, -1.0));
        assert_eq!(quantize(Vec2::new(1.9, -1.9), false), Vec2::new(1.9, -1.9));
        assert_eq!(round_away(Vec2::new(0.2, -0.2)), Vec2::new(1.0, -1.0));
        assert_eq!(round_away(Vec2::new(2.0, 0.0)), Vec2::new(2.0, 0.0));
    }
}
