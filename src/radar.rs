//! Pentagon (radar) chart geometry for the five team abilities.
//!
//! Points are expressed relative to the chart centre in a y-up frame, which is what the
//! ratatui canvas expects. `to_screen` converts into a y-down frame with the origin in the
//! top-left corner of a `size x size` box.

use serde::Serialize;

use crate::team_stats::TeamAbilities;

/// Vertex angles in degrees, in ability order.
pub const AXIS_ANGLES_DEG: [f64; 5] = [90.0, 18.0, -54.0, -126.0, -198.0];
pub const GRID_SCALES: [f64; 4] = [0.25, 0.5, 0.75, 1.0];

pub const DEFAULT_SIZE: f64 = 200.0;
const EDGE_MARGIN: f64 = 30.0;
const LABEL_OFFSET: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadarChart {
    pub size: f64,
    pub radius: f64,
}

impl Default for RadarChart {
    fn default() -> Self {
        Self::with_size(DEFAULT_SIZE)
    }
}

impl RadarChart {
    pub fn with_size(size: f64) -> Self {
        let size = size.max(0.0);
        Self {
            size,
            radius: (size / 2.0 - EDGE_MARGIN).max(0.0),
        }
    }

    /// Ability polygon, one vertex per axis. Close it by joining the last vertex to the first.
    pub fn vertices(&self, abilities: &TeamAbilities) -> [Point; 5] {
        let values = abilities.as_array();
        let mut out = [Point::new(0.0, 0.0); 5];
        for (i, angle) in AXIS_ANGLES_DEG.iter().enumerate() {
            let scale = values[i].min(100) as f64 / 100.0;
            out[i] = polar(*angle, scale * self.radius);
        }
        out
    }

    /// Reference ring at `scale` of the full radius.
    pub fn grid_ring(&self, scale: f64) -> [Point; 5] {
        let mut out = [Point::new(0.0, 0.0); 5];
        for (i, angle) in AXIS_ANGLES_DEG.iter().enumerate() {
            out[i] = polar(*angle, scale * self.radius);
        }
        out
    }

    pub fn grid_rings(&self) -> Vec<[Point; 5]> {
        GRID_SCALES.iter().map(|s| self.grid_ring(*s)).collect()
    }

    /// Spoke end points; spokes start at the centre.
    pub fn axis_ends(&self) -> [Point; 5] {
        self.grid_ring(1.0)
    }

    pub fn label_anchors(&self) -> [Point; 5] {
        let mut out = [Point::new(0.0, 0.0); 5];
        for (i, angle) in AXIS_ANGLES_DEG.iter().enumerate() {
            out[i] = polar(*angle, self.radius + LABEL_OFFSET);
        }
        out
    }

    pub fn to_screen(&self, p: Point) -> Point {
        let center = self.size / 2.0;
        Point::new(center + p.x, center - p.y)
    }
}

/// Closed-polygon edges: (v0,v1), (v1,v2), ..., (vn,v0).
pub fn polygon_edges(points: &[Point]) -> Vec<(Point, Point)> {
    if points.len() < 2 {
        return Vec::new();
    }
    points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| (*a, *b))
        .collect()
}

/// SVG-style path string in screen coordinates, e.g. `M x y L x y ... Z`.
pub fn path_data(chart: &RadarChart, points: &[Point]) -> String {
    if points.is_empty() {
        return String::new();
    }
    let mut parts = Vec::with_capacity(points.len() + 1);
    for (i, p) in points.iter().enumerate() {
        let s = chart.to_screen(*p);
        let cmd = if i == 0 { 'M' } else { 'L' };
        parts.push(format!("{cmd} {:.2} {:.2}", s.x, s.y));
    }
    parts.push("Z".to_string());
    parts.join(" ")
}

fn polar(angle_deg: f64, distance: f64) -> Point {
    let rad = angle_deg.to_radians();
    Point::new(distance * rad.cos(), distance * rad.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn full() -> TeamAbilities {
        TeamAbilities {
            power: 100,
            accuracy: 100,
            running: 100,
            defense: 100,
            pitching: 100,
        }
    }

    #[test]
    fn default_radius() {
        let chart = RadarChart::default();
        assert_eq!(chart.radius, 70.0);
    }

    #[test]
    fn top_vertex_is_power() {
        let chart = RadarChart::default();
        let v = chart.vertices(&full());
        assert!(v[0].x.abs() < EPS);
        assert!((v[0].y - chart.radius).abs() < EPS);
    }

    #[test]
    fn vertices_scale_with_ability() {
        let chart = RadarChart::default();
        let a = TeamAbilities {
            power: 50,
            accuracy: 25,
            running: 0,
            defense: 100,
            pitching: 75,
        };
        let origin = Point::new(0.0, 0.0);
        let v = chart.vertices(&a);
        let expected = [0.5, 0.25, 0.0, 1.0, 0.75];
        for (p, e) in v.iter().zip(expected) {
            assert!((p.distance(&origin) - e * chart.radius).abs() < EPS);
        }
    }

    #[test]
    fn half_ring_is_regular() {
        let chart = RadarChart::default();
        let origin = Point::new(0.0, 0.0);
        for p in chart.grid_ring(0.5) {
            assert!((p.distance(&origin) - chart.radius / 2.0).abs() < EPS);
        }
        assert_eq!(chart.grid_rings().len(), 4);
    }

    #[test]
    fn last_angle_wraps_to_same_side_as_second() {
        // -198 deg sits on the upper-left, mirroring 18 deg on the upper-right.
        let chart = RadarChart::default();
        let v = chart.axis_ends();
        assert!((v[4].y - v[1].y).abs() < EPS);
        assert!((v[4].x + v[1].x).abs() < EPS);
    }

    #[test]
    fn polygon_closes() {
        let chart = RadarChart::default();
        let v = chart.vertices(&full());
        let edges = polygon_edges(&v);
        assert_eq!(edges.len(), 5);
        assert_eq!(edges[4].1, v[0]);
    }

    #[test]
    fn path_data_in_screen_space() {
        let chart = RadarChart::default();
        let path = path_data(&chart, &chart.vertices(&full()));
        assert!(path.starts_with("M 100.00 30.00 L "));
        assert!(path.ends_with(" Z"));
    }

    #[test]
    fn labels_sit_outside_ring() {
        let chart = RadarChart::default();
        let origin = Point::new(0.0, 0.0);
        for p in chart.label_anchors() {
            assert!((p.distance(&origin) - 90.0).abs() < EPS);
        }
    }
}
