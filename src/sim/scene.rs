//! Obstacle registry and broad-phase query
//!
//! Shapes are registered once during setup and never change afterwards.
//! Each kind lives in its own bounded list; queries walk rectangles, then
//! circles, then polygons, each in registration order, and report the first
//! hit.

use std::fmt;

use glam::Vec2;
use thiserror::Error;

use super::collision::{
    Contact, box_contact, circle_bounds, circle_collision, polygon_contact, rect_bounds,
    rect_collision,
};
use super::shapes::{Circle, Polygon, Rect};
use crate::consts::SHAPE_CAPACITY;
use crate::settings::Obstacle;

/// Obstacle collections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Rectangle,
    Circle,
    Polygon,
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Circle => "circle",
            ShapeKind::Polygon => "polygon",
        };
        f.write_str(name)
    }
}

/// Handle to a registered shape (kind + index in registration order)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeId {
    Rectangle(usize),
    Circle(usize),
    Polygon(usize),
}

impl ShapeId {
    pub fn kind(&self) -> ShapeKind {
        match self {
            ShapeId::Rectangle(_) => ShapeKind::Rectangle,
            ShapeId::Circle(_) => ShapeKind::Circle,
            ShapeId::Polygon(_) => ShapeKind::Polygon,
        }
    }
}

/// Errors raised while building a scene
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    #[error("{kind} capacity of {capacity} exceeded")]
    CapacityExceeded { kind: ShapeKind, capacity: usize },

    #[error("invalid {kind}: {reason}")]
    InvalidShape {
        kind: ShapeKind,
        reason: &'static str,
    },
}

/// Static obstacles the ball collides with
#[derive(Debug, Clone)]
pub struct Scene {
    capacity: usize,
    rects: Vec<Rect>,
    circles: Vec<Circle>,
    polygons: Vec<Polygon>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(SHAPE_CAPACITY)
    }
}

impl Scene {
    /// Empty scene holding up to `capacity` shapes of each kind
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            rects: Vec::with_capacity(capacity),
            circles: Vec::with_capacity(capacity),
            polygons: Vec::with_capacity(capacity),
        }
    }

    /// Build a scene from an obstacle list
    ///
    /// Obstacles that fail to register are logged and left out; the rest of
    /// the scene is still usable.
    pub fn from_obstacles(obstacles: &[Obstacle], capacity: usize) -> Self {
        let mut scene = Self::new(capacity);
        for obstacle in obstacles {
            if let Err(e) = scene.register(obstacle) {
                log::warn!("Skipping obstacle {:?}: {}", obstacle, e);
            }
        }
        log::info!(
            "Scene ready: {} rectangles, {} circles, {} polygons",
            scene.rects.len(),
            scene.circles.len(),
            scene.polygons.len()
        );
        scene
    }

    /// Register one obstacle description
    pub fn register(&mut self, obstacle: &Obstacle) -> Result<ShapeId, SceneError> {
        match obstacle {
            Obstacle::Rectangle {
                x,
                y,
                width,
                height,
            } => self.register_rectangle(*x, *y, *width, *height),
            Obstacle::RectangleOutline {
                x,
                y,
                width,
                height,
            } => self.register_rectangle_outline(*x, *y, *width, *height),
            Obstacle::Circle { x, y, radius } => self.register_circle(*x, *y, *radius),
            Obstacle::Segment { from, to } => {
                self.register_segment(Vec2::from(*from), Vec2::from(*to))
            }
            Obstacle::Polygon { points } => {
                let points: Vec<Vec2> = points.iter().copied().map(Vec2::from).collect();
                self.register_polygon(&points)
            }
        }
    }

    pub fn register_rectangle(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) -> Result<ShapeId, SceneError> {
        let rect = Rect::new(x, y, width, height);
        rect.validate().map_err(|reason| SceneError::InvalidShape {
            kind: ShapeKind::Rectangle,
            reason,
        })?;
        self.ensure_room(ShapeKind::Rectangle, self.rects.len())?;

        self.rects.push(rect);
        log::debug!("Registered rectangle {:?}", rect);
        Ok(ShapeId::Rectangle(self.rects.len() - 1))
    }

    pub fn register_circle(&mut self, x: f32, y: f32, radius: f32) -> Result<ShapeId, SceneError> {
        let circle = Circle::new(x, y, radius);
        circle.validate().map_err(|reason| SceneError::InvalidShape {
            kind: ShapeKind::Circle,
            reason,
        })?;
        self.ensure_room(ShapeKind::Circle, self.circles.len())?;

        self.circles.push(circle);
        log::debug!("Registered circle {:?}", circle);
        Ok(ShapeId::Circle(self.circles.len() - 1))
    }

    /// Register an open line segment (a 2-point polygon)
    pub fn register_segment(&mut self, p1: Vec2, p2: Vec2) -> Result<ShapeId, SceneError> {
        self.push_polygon(Polygon::segment(p1, p2))
    }

    /// Register a closed point loop (or a segment when given two points)
    pub fn register_polygon(&mut self, points: &[Vec2]) -> Result<ShapeId, SceneError> {
        self.push_polygon(Polygon::new(points))
    }

    /// Register a rectangle as a 4-edge polygon so hits carry edge normals
    pub fn register_rectangle_outline(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) -> Result<ShapeId, SceneError> {
        self.push_polygon(Polygon::outline(&Rect::new(x, y, width, height)))
    }

    fn push_polygon(
        &mut self,
        polygon: Result<Polygon, &'static str>,
    ) -> Result<ShapeId, SceneError> {
        let polygon = polygon.map_err(|reason| SceneError::InvalidShape {
            kind: ShapeKind::Polygon,
            reason,
        })?;
        self.ensure_room(ShapeKind::Polygon, self.polygons.len())?;

        log::debug!("Registered polygon with {} points", polygon.points().len());
        self.polygons.push(polygon);
        Ok(ShapeId::Polygon(self.polygons.len() - 1))
    }

    fn ensure_room(&self, kind: ShapeKind, len: usize) -> Result<(), SceneError> {
        if len >= self.capacity {
            return Err(SceneError::CapacityExceeded {
                kind,
                capacity: self.capacity,
            });
        }
        Ok(())
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    pub fn circles(&self) -> &[Circle] {
        &self.circles
    }

    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    /// Total number of registered shapes
    pub fn len(&self) -> usize {
        self.rects.len() + self.circles.len() + self.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Does a ball of `radius` at `pos` hit anything?
    ///
    /// Returns the first hit in kind-then-registration order. Rectangle and
    /// circle hits carry no edge normal, only the inferred axis normal.
    pub fn check_collision(&self, pos: Vec2, radius: f32) -> Option<Contact> {
        for (i, rect) in self.rects.iter().enumerate() {
            if rect_collision(pos, radius, rect) {
                let (min, max) = rect_bounds(rect, radius);
                let (inferred_normal, penetration) = box_contact(pos, min, max);
                return Some(Contact {
                    shape: ShapeId::Rectangle(i),
                    normal: None,
                    inferred_normal,
                    penetration,
                });
            }
        }

        for (i, circle) in self.circles.iter().enumerate() {
            if circle_collision(pos, radius, circle) {
                let (min, max) = circle_bounds(circle);
                let (inferred_normal, penetration) = box_contact(pos, min, max);
                return Some(Contact {
                    shape: ShapeId::Circle(i),
                    normal: None,
                    inferred_normal,
                    penetration,
                });
            }
        }

        for (i, polygon) in self.polygons.iter().enumerate() {
            if let Some((normal, penetration)) = polygon_contact(pos, radius, polygon) {
                return Some(Contact {
                    shape: ShapeId::Polygon(i),
                    normal: Some(normal),
                    inferred_normal: normal,
                    penetration,
                });
            }
        }

        None
    }
}
