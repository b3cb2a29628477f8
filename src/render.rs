//! Text renderer
//!
//! Rasterizes the display into a character grid: obstacles as `#`, the ball
//! as `O`, empty space as `.`. Each cell covers a block of display pixels.

use glam::Vec2;

use crate::consts::{DISPLAY_HEIGHT, DISPLAY_WIDTH};
use crate::driver::{Frame, FrameSink};
use crate::sim::Scene;

const EMPTY: char = '.';
const SOLID: char = '#';
const BALL: char = 'O';

/// Character grid covering the display
#[derive(Debug, Clone)]
pub struct TextCanvas {
    cols: usize,
    rows: usize,
    /// Display pixels per cell
    cell: Vec2,
    cells: Vec<char>,
    /// Latest frame presented
    last_frame: Option<Frame>,
}

impl TextCanvas {
    /// Grid of `cols` x `rows` cells over the full display
    pub fn new(cols: usize, rows: usize) -> Self {
        let cols = cols.max(1);
        let rows = rows.max(1);
        Self {
            cols,
            rows,
            cell: Vec2::new(
                DISPLAY_WIDTH as f32 / cols as f32,
                DISPLAY_HEIGHT as f32 / rows as f32,
            ),
            cells: vec![EMPTY; cols * rows],
            last_frame: None,
        }
    }

    pub fn last_frame(&self) -> Option<&Frame> {
        self.last_frame.as_ref()
    }

    /// Character at a grid cell
    pub fn at(&self, col: usize, row: usize) -> Option<char> {
        (col < self.cols && row < self.rows).then(|| self.cells[row * self.cols + col])
    }

    /// Grid cell containing a display point
    pub fn cell_of(&self, p: Vec2) -> Option<(usize, usize)> {
        if p.x < 0.0 || p.y < 0.0 {
            return None;
        }
        let col = (p.x / self.cell.x) as usize;
        let row = (p.y / self.cell.y) as usize;
        (col < self.cols && row < self.rows).then_some((col, row))
    }

    /// Redraw the scene with the ball at `pos`
    pub fn draw(&mut self, scene: &Scene, pos: Vec2, radius: f32) {
        self.cells.fill(EMPTY);

        for rect in scene.rects() {
            self.fill_box(rect.min(), rect.max());
        }

        for circle in scene.circles() {
            self.fill_disc(circle.center(), circle.radius);
        }

        for polygon in scene.polygons() {
            for (a, b) in polygon.edges() {
                self.stroke(a, b);
            }
        }

        self.fill_disc_with(pos, radius, BALL);
    }

    /// Grid as newline-separated rows
    pub fn render(&self) -> String {
        let mut out = String::with_capacity((self.cols + 1) * self.rows);
        for row in self.cells.chunks(self.cols) {
            out.extend(row.iter());
            out.push('\n');
        }
        out
    }

    fn put(&mut self, col: usize, row: usize, ch: char) {
        if col < self.cols && row < self.rows {
            self.cells[row * self.cols + col] = ch;
        }
    }

    /// Mark every cell the box touches
    fn fill_box(&mut self, min: Vec2, max: Vec2) {
        let lo = (min / self.cell).floor().max(Vec2::ZERO);
        let hi = (max / self.cell).ceil();
        let (c0, r0) = (lo.x as usize, lo.y as usize);
        let c1 = (hi.x.max(0.0) as usize).min(self.cols);
        let r1 = (hi.y.max(0.0) as usize).min(self.rows);
        for row in r0..r1 {
            for col in c0..c1 {
                self.put(col, row, SOLID);
            }
        }
    }

    fn fill_disc(&mut self, center: Vec2, radius: f32) {
        self.fill_disc_with(center, radius, SOLID);
    }

    /// Cells whose centre is inside the disc, plus the cell holding its centre
    fn fill_disc_with(&mut self, center: Vec2, radius: f32, ch: char) {
        for row in 0..self.rows {
            for col in 0..self.cols {
                let cell_center = (Vec2::new(col as f32, row as f32) + 0.5) * self.cell;
                if cell_center.distance(center) <= radius {
                    self.put(col, row, ch);
                }
            }
        }
        if let Some((col, row)) = self.cell_of(center) {
            self.put(col, row, ch);
        }
    }

    /// Sample the segment once per pixel
    fn stroke(&mut self, a: Vec2, b: Vec2) {
        let samples = a.distance(b).ceil().max(1.0) as usize;
        for i in 0..=samples {
            let p = a.lerp(b, i as f32 / samples as f32);
            if let Some((col, row)) = self.cell_of(p) {
                self.put(col, row, SOLID);
            }
        }
    }
}

impl Default for TextCanvas {
    fn default() -> Self {
        Self::new(64, 24)
    }
}

impl FrameSink for TextCanvas {
    fn present(&mut self, scene: &Scene, frame: &Frame) {
        self.draw(scene, frame.snapshot.position, frame.radius);
        self.last_frame = Some(*frame);
    }
}
