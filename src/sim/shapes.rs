//! Static obstacle geometry
//!
//! Screen coordinates: origin at the top-left, y grows downward.
//! - `Rect`: axis-aligned box anchored at its top-left corner
//! - `Circle`: centre + radius
//! - `Polygon`: point loop; two points form an open segment

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::MAX_POLYGON_POINTS;

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Top-left corner
    #[inline]
    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Bottom-right corner
    #[inline]
    pub fn max(&self) -> Vec2 {
        Vec2::new(self.x + self.width, self.y + self.height)
    }

    /// Corners in clockwise order (screen space)
    pub fn corners(&self) -> [Vec2; 4] {
        [
            Vec2::new(self.x, self.y),
            Vec2::new(self.x + self.width, self.y),
            Vec2::new(self.x + self.width, self.y + self.height),
            Vec2::new(self.x, self.y + self.height),
        ]
    }

    pub(crate) fn validate(&self) -> Result<(), &'static str> {
        if !(self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite())
        {
            return Err("rectangle coordinates must be finite");
        }
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err("rectangle width and height must be positive");
        }
        Ok(())
    }
}

/// Circle obstacle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

impl Circle {
    pub fn new(x: f32, y: f32, radius: f32) -> Self {
        Self { x, y, radius }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub(crate) fn validate(&self) -> Result<(), &'static str> {
        if !(self.x.is_finite() && self.y.is_finite() && self.radius.is_finite()) {
            return Err("circle coordinates must be finite");
        }
        if self.radius <= 0.0 {
            return Err("circle radius must be positive");
        }
        Ok(())
    }
}

/// A point loop (closed for 3+ points, a single open segment for 2)
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    points: Vec<Vec2>,
}

impl Polygon {
    /// Build a polygon from its points; rejects invalid loops
    pub fn new(points: &[Vec2]) -> Result<Self, &'static str> {
        let polygon = Self {
            points: points.to_vec(),
        };
        polygon.validate()?;
        Ok(polygon)
    }

    /// Open segment between two points
    pub fn segment(a: Vec2, b: Vec2) -> Result<Self, &'static str> {
        Self::new(&[a, b])
    }

    /// Rectangle outline as a clockwise 4-point loop
    pub fn outline(rect: &Rect) -> Result<Self, &'static str> {
        rect.validate()?;
        Self::new(&rect.corners())
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    /// True for the degenerate 2-point form
    #[inline]
    pub fn is_segment(&self) -> bool {
        self.points.len() == 2
    }

    /// Edges in winding order; includes the closing edge for 3+ points
    pub fn edges(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        let n = self.points.len();
        let edge_count = if n == 2 { 1 } else { n };
        (0..edge_count).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }

    fn validate(&self) -> Result<(), &'static str> {
        if self.points.len() < 2 {
            return Err("polygon needs at least two points");
        }
        if self.points.len() > MAX_POLYGON_POINTS {
            return Err("polygon has too many points");
        }
        if !self.points.iter().all(|p| p.is_finite()) {
            return Err("polygon coordinates must be finite");
        }
        if self.edges().any(|(a, b)| a.distance_squared(b) <= f32::EPSILON) {
            return Err("polygon edges must have non-zero length");
        }
        Ok(())
    }
}
