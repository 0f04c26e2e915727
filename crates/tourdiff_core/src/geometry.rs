use std::fmt;

use crate::tour::Edge;

/// Planar node coordinate as read from a TSPLIB `NODE_COORD_SECTION`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn dist(self, rhs: Self) -> f64 {
        let dx = self.x - rhs.x;
        let dy = self.y - rhs.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub(crate) fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// Cost of traversing `edge`: Euclidean distance between its endpoints.
#[inline]
pub fn edge_cost(points: &[Point], edge: Edge) -> f64 {
    points[edge.a()].dist(points[edge.b()])
}

/// Closed tour length, including the edge from the last node back to the first.
pub fn tour_length(points: &[Point], tour: &[usize]) -> f64 {
    let n = tour.len();
    if n < 2 {
        return 0.0;
    }
    (0..n)
        .map(|i| points[tour[i]].dist(points[tour[(i + 1) % n]]))
        .sum()
}
