//! The wall index: a fast, orientation-insensitive "does edge E exist?" lookup.

use std::collections::HashSet;
use std::fmt;

/// An integer lattice point — a corner of the maze grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({} {})", self.x, self.y)
    }
}

/// An unordered unit segment between two adjacent lattice points. Stored in a
/// canonical orientation so `Edge::new(a, b) == Edge::new(b, a)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Edge(pub Point, pub Point);

impl Edge {
    pub fn new(a: Point, b: Point) -> Self {
        if a <= b {
            Edge(a, b)
        } else {
            Edge(b, a)
        }
    }
}

/// The maze's wall set. Both edge orientations are treated as equivalent on
/// every operation — membership, insertion and removal all canonicalise first.
#[derive(Clone, Debug, Default)]
pub struct WallSet(HashSet<Edge>);

impl WallSet {
    pub fn new() -> Self {
        WallSet(HashSet::new())
    }

    pub fn insert(&mut self, a: Point, b: Point) {
        self.0.insert(Edge::new(a, b));
    }

    /// Idempotent: removing an edge that isn't present is a no-op, not an error.
    pub fn remove(&mut self, a: Point, b: Point) -> bool {
        self.0.remove(&Edge::new(a, b))
    }

    pub fn contains(&self, a: Point, b: Point) -> bool {
        self.0.contains(&Edge::new(a, b))
    }

    pub fn contains_any(&self, candidates: &[(Point, Point)]) -> bool {
        candidates.iter().any(|(a, b)| self.contains(*a, *b))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Edge> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_is_orientation_insensitive() {
        let mut walls = WallSet::new();
        walls.insert(Point::new(0, 0), Point::new(1, 0));
        assert!(walls.contains(Point::new(0, 0), Point::new(1, 0)));
        assert!(walls.contains(Point::new(1, 0), Point::new(0, 0)));
    }

    #[test]
    fn removal_is_idempotent() {
        let mut walls = WallSet::new();
        walls.insert(Point::new(0, 0), Point::new(0, 1));
        assert!(walls.remove(Point::new(0, 1), Point::new(0, 0)));
        assert!(!walls.remove(Point::new(0, 1), Point::new(0, 0)));
        assert!(walls.is_empty());
    }
}
