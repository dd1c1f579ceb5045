//! Static baseball diamond layout in field units.
//!
//! The field spans `x in [0, 1]` and `y in [0, FIELD_HEIGHT]` with y pointing up toward the
//! outfield. Everything here is fixed geometry; the caller decides how to paint it.

use crate::player::Position;
use crate::radar::Point;

pub const FIELD_WIDTH: f64 = 1.0;
pub const FIELD_HEIGHT: f64 = 1.2;

const DIAMOND_SIZE: f64 = 0.65;
const DIAMOND_OFFSET_BOTTOM: f64 = 0.22;
const INFIELD_GRASS_SCALE: f64 = 0.7;
const MOUND_SCALE: f64 = 0.09;
const STRIPE_WIDTH: f64 = 0.08;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldLayout {
    pub center: Point,
    /// Distance from the diamond centre to each base.
    pub half: f64,
}

impl Default for FieldLayout {
    fn default() -> Self {
        let half = DIAMOND_SIZE / 2.0;
        Self {
            center: Point::new(FIELD_WIDTH / 2.0, DIAMOND_OFFSET_BOTTOM + half),
            half,
        }
    }
}

impl FieldLayout {
    /// Outer dirt square, rotated 45 degrees: bottom, right, top, left corners.
    pub fn infield_dirt(&self) -> [Point; 4] {
        self.diamond(self.half * std::f64::consts::SQRT_2)
    }

    pub fn infield_grass(&self) -> [Point; 4] {
        self.diamond(self.half * std::f64::consts::SQRT_2 * INFIELD_GRASS_SCALE)
    }

    pub fn home_plate(&self) -> Point {
        Point::new(self.center.x, self.center.y - self.half)
    }

    pub fn first_base(&self) -> Point {
        Point::new(self.center.x + self.half, self.center.y)
    }

    pub fn second_base(&self) -> Point {
        Point::new(self.center.x, self.center.y + self.half)
    }

    pub fn third_base(&self) -> Point {
        Point::new(self.center.x - self.half, self.center.y)
    }

    pub fn bases(&self) -> [Point; 4] {
        [
            self.home_plate(),
            self.first_base(),
            self.second_base(),
            self.third_base(),
        ]
    }

    pub fn mound(&self) -> (Point, f64) {
        (self.center, DIAMOND_SIZE * MOUND_SCALE)
    }

    /// Left and right batter's boxes flanking home plate.
    pub fn batters_boxes(&self) -> [Rect; 2] {
        let home = self.home_plate();
        let width = 0.04;
        let height = 0.07;
        let gap = 0.03;
        let y = home.y - height / 2.0;
        [
            Rect {
                x: home.x - gap - width,
                y,
                width,
                height,
            },
            Rect {
                x: home.x + gap,
                y,
                width,
                height,
            },
        ]
    }

    /// Left edges of the darker mower stripes (every other stripe).
    pub fn mower_stripes(&self) -> Vec<Rect> {
        let count = (FIELD_WIDTH / STRIPE_WIDTH).ceil() as usize;
        (0..count)
            .filter(|i| i % 2 == 0)
            .map(|i| Rect {
                x: i as f64 * STRIPE_WIDTH,
                y: 0.0,
                width: STRIPE_WIDTH,
                height: FIELD_HEIGHT,
            })
            .collect()
    }

    /// Where the icon for a position is drawn.
    pub fn icon_position(&self, position: Position) -> Point {
        let h = self.half;
        let (dx, dy) = match position {
            Position::Pitcher => (0.0, 0.0),
            Position::Catcher => (0.0, -h - 0.08),
            Position::First => (0.85 * h, 0.25 * h),
            Position::Second => (0.45 * h, 0.85 * h),
            Position::Shortstop => (-0.45 * h, 0.85 * h),
            Position::Third => (-0.85 * h, 0.25 * h),
            Position::Left => (-1.15 * h, 1.45 * h),
            Position::Center => (0.0, 1.75 * h),
            Position::Right => (1.15 * h, 1.45 * h),
        };
        Point::new(self.center.x + dx, self.center.y + dy)
    }

    /// Position whose icon is closest to `p`, if within `max_dist`.
    pub fn hit_test(&self, p: Point, max_dist: f64) -> Option<Position> {
        Position::ALL
            .iter()
            .map(|pos| (*pos, self.icon_position(*pos).distance(&p)))
            .filter(|(_, d)| *d <= max_dist)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(pos, _)| pos)
    }

    fn diamond(&self, r: f64) -> [Point; 4] {
        let c = self.center;
        [
            Point::new(c.x, c.y - r),
            Point::new(c.x + r, c.y),
            Point::new(c.x, c.y + r),
            Point::new(c.x - r, c.y),
        ]
    }
}
