//! Narrow-phase collision tests and velocity reflection
//!
//! Each test checks the ball (centre + radius) against one obstacle. The
//! rectangle and circle tests are box approximations kept on purpose: the
//! rectangle is inflated by the ball radius on both axes (corners
//! over-approximate) and the circle test is a Chebyshev box around the centre
//! that ignores the ball radius. Only edge tests produce a true surface normal.

use glam::Vec2;

use super::scene::ShapeId;
use super::shapes::{Circle, Polygon, Rect};
use crate::consts::SEGMENT_BUFFER;

/// Result of a broad-phase query that hit something
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Shape that was hit
    pub shape: ShapeId,
    /// Unit edge normal facing the ball (polygon and segment hits only)
    pub normal: Option<Vec2>,
    /// Axis-aligned normal facing the ball, derived from the shallowest
    /// penetrated side. Equals `normal` for edge hits.
    pub inferred_normal: Vec2,
    /// Distance the ball must move along the resolution normal to leave the
    /// shape's boundary
    pub penetration: f32,
}

impl Contact {
    /// Normal used to push the ball out of an overlap
    #[inline]
    pub fn resolution_normal(&self) -> Vec2 {
        self.normal.unwrap_or(self.inferred_normal)
    }
}

/// Inflated-AABB test between the ball and a rectangle
#[inline]
pub fn rect_collision(pos: Vec2, radius: f32, rect: &Rect) -> bool {
    let x_collides = pos.x + radius >= rect.x && pos.x - radius <= rect.x + rect.width;
    let y_collides = pos.y + radius >= rect.y && pos.y - radius <= rect.y + rect.height;
    x_collides && y_collides
}

/// Chebyshev box test between the ball centre and a circle
#[inline]
pub fn circle_collision(pos: Vec2, _radius: f32, circle: &Circle) -> bool {
    (circle.x - pos.x).abs() <= circle.radius && (circle.y - pos.y).abs() <= circle.radius
}

/// Check the ball against a line segment
///
/// The ball centre is projected onto the infinite line through `a` and `b`.
/// The projection counts as lying on the segment when its distances to both
/// ends add up to the segment length within `SEGMENT_BUFFER`, and the ball
/// hits when that point is no further than `radius` from its centre.
///
/// Returns the unit normal of the edge, facing the side the ball centre is
/// on. A centre exactly on the line keeps the winding orientation
/// (`(dy, -dx)`, i.e. outward for clockwise loops in screen space).
pub fn segment_collision(pos: Vec2, radius: f32, a: Vec2, b: Vec2) -> Option<Vec2> {
    segment_hit(pos, radius, a, b).map(|(normal, _)| normal)
}

/// Segment test that also reports penetration depth
fn segment_hit(pos: Vec2, radius: f32, a: Vec2, b: Vec2) -> Option<(Vec2, f32)> {
    let line = b - a;
    let line_len = line.length();
    if line_len <= f32::EPSILON {
        return None; // Degenerate segment
    }

    let t = (pos - a).dot(line) / (line_len * line_len);
    let closest = a + line * t;

    let d1 = closest.distance(a);
    let d2 = closest.distance(b);
    let on_segment = d1 + d2 >= line_len - SEGMENT_BUFFER && d1 + d2 <= line_len + SEGMENT_BUFFER;
    if !on_segment {
        return None;
    }

    let dist = pos.distance(closest);
    if dist > radius {
        return None;
    }

    // Side test on the unnormalized cross product so a centre on the line
    // stays exactly zero
    let mut normal = Vec2::new(line.y, -line.x) / line_len;
    if line.perp_dot(pos - a) > 0.0 {
        normal = -normal;
    }
    Some((normal, radius - dist))
}

/// Check the ball against every edge of a polygon, first edge wins
///
/// Returns the edge normal and penetration depth.
pub fn polygon_contact(pos: Vec2, radius: f32, poly: &Polygon) -> Option<(Vec2, f32)> {
    poly.edges().find_map(|(a, b)| segment_hit(pos, radius, a, b))
}

/// Infer an axis-aligned contact normal for a point inside a box
///
/// Picks the side with the smallest penetration (ties resolve top, bottom,
/// left, right) and returns the normal pointing out through that side along
/// with the penetration depth. Points outside the box report a negative depth.
pub fn box_contact(pos: Vec2, min: Vec2, max: Vec2) -> (Vec2, f32) {
    let sides = [
        (Vec2::NEG_Y, pos.y - min.y),
        (Vec2::Y, max.y - pos.y),
        (Vec2::NEG_X, pos.x - min.x),
        (Vec2::X, max.x - pos.x),
    ];

    let mut best = sides[0];
    for side in &sides[1..] {
        if side.1 < best.1 {
            best = *side;
        }
    }
    best
}

/// Inflated box a rectangle presents to a ball of `radius`
#[inline]
pub(crate) fn rect_bounds(rect: &Rect, radius: f32) -> (Vec2, Vec2) {
    (rect.min() - Vec2::splat(radius), rect.max() + Vec2::splat(radius))
}

/// Box a circle presents to the ball centre
#[inline]
pub(crate) fn circle_bounds(circle: &Circle) -> (Vec2, Vec2) {
    let half = Vec2::splat(circle.radius);
    (circle.center() - half, circle.center() + half)
}

/// Reflect velocity off a surface, scaling the normal component
///
/// v' = v - 2k(v·n)n
///
/// With `restitution == 1.0` this is a mirror reflection; larger values make
/// the bounce livelier than the approach.
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2, restitution: f32) -> Vec2 {
    velocity - 2.0 * restitution * velocity.dot(normal) * normal
}
