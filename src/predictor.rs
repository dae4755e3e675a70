//! The event predictor: time-to-event for a wall rebound or a disk-disk
//! collision, and the "what happens next" scan over the whole system.

use crate::geometry::{cell_of, Vec2};
use crate::walls::WallSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X = 0,
    Y = 1,
}

impl Axis {
    pub fn index(self) -> usize {
        self as usize
    }
}

/// A logical event, decoded from the flat index the predictor hands back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    Wall { disk: usize, axis: Axis },
    Pair { a: usize, b: usize },
}

/// The earliest future event: a `(time, index)` pair, where `index < 2n`
/// encodes a wall event and `index >= 2n` encodes a pair event, per
/// spec.md S:3's event-list encoding.
#[derive(Clone, Copy, Debug)]
pub struct NextEvent {
    pub time: f64,
    pub index: usize,
}

impl NextEvent {
    pub fn kind(&self, n: usize) -> EventKind {
        decode_index(self.index, n)
    }
}

fn decode_index(index: usize, n: usize) -> EventKind {
    if index < 2 * n {
        let disk = index / 2;
        let axis = if index % 2 == 0 { Axis::X } else { Axis::Y };
        EventKind::Wall { disk, axis }
    } else {
        let (a, b) = nth_pair(index - 2 * n, n);
        EventKind::Pair { a, b }
    }
}

/// The `k`-th pair `(a, b)`, `a < b`, in lexicographic enumeration order.
fn nth_pair(mut k: usize, n: usize) -> (usize, usize) {
    for a in 0..n {
        let count = n - a - 1;
        if k < count {
            return (a, a + 1 + k);
        }
        k -= count;
    }
    unreachable!("pair index out of range")
}

/// Time before disk `k` hits a wall along `axis`, or `+inf` if the candidate
/// wall is an opening.
pub fn wall_time(
    positions: &[Vec2],
    velocities: &[Vec2],
    r: f64,
    k: usize,
    axis: Axis,
    walls: &WallSet,
) -> f64 {
    let l = axis.index();
    let x = positions[k][l];
    let vel = velocities[k][l];
    let (i, j) = cell_of(positions[k]);

    if vel == 0.0 {
        return f64::INFINITY;
    }

    let candidate = match (l, vel > 0.0) {
        (0, true) => wall_edge_right(i, j),
        (0, false) => wall_edge_left(i, j),
        (1, true) => wall_edge_top(i, j),
        (1, false) => wall_edge_bottom(i, j),
        _ => unreachable!(),
    };

    if !walls.contains_any(&candidate) {
        return f64::INFINITY;
    }

    let bound = if l == 0 { i } else { j } as f64;
    if vel > 0.0 {
        ((bound + 1.0) - x - r).abs() / vel
    } else {
        (x - bound - r).abs() / (-vel)
    }
}

use crate::walls::Point;

fn wall_edge_right(i: i32, j: i32) -> [(Point, Point); 1] {
    [(Point::new(i + 1, j), Point::new(i + 1, j + 1))]
}
fn wall_edge_left(i: i32, j: i32) -> [(Point, Point); 1] {
    [(Point::new(i, j), Point::new(i, j + 1))]
}
fn wall_edge_top(i: i32, j: i32) -> [(Point, Point); 1] {
    [(Point::new(i, j + 1), Point::new(i + 1, j + 1))]
}
fn wall_edge_bottom(i: i32, j: i32) -> [(Point, Point); 1] {
    [(Point::new(i, j), Point::new(i + 1, j))]
}

/// Time before disks `a`/`b` collide, or `+inf` if they are diverging or
/// would miss each other entirely.
pub fn pair_time(pa: Vec2, va: Vec2, pb: Vec2, vb: Vec2, r: f64) -> f64 {
    let dx = pb - pa;
    let dv = vb - va;
    let beta = dv.dot(dx);
    let dv_sq = dv.norm_sq();
    if dv_sq == 0.0 {
        return f64::INFINITY;
    }
    let dx_sq = dx.norm_sq();
    let upsilon = beta * beta - dv_sq * (dx_sq - 4.0 * r * r);
    if beta < 0.0 && upsilon > 0.0 {
        -(beta + upsilon.sqrt()) / dv_sq
    } else {
        f64::INFINITY
    }
}

/// Scans all `2n` wall times and all `n(n-1)/2` pair times and returns the
/// earliest, ties broken by enumeration order (walls before pairs,
/// lexicographic within each), matching spec.md S:4.2.
pub fn next_event(positions: &[Vec2], velocities: &[Vec2], r: f64, walls: &WallSet) -> NextEvent {
    let n = positions.len();
    let mut best_time = f64::INFINITY;
    let mut best_index = 0usize;

    for k in 0..n {
        for (l, axis) in [(0, Axis::X), (1, Axis::Y)] {
            let t = wall_time(positions, velocities, r, k, axis, walls);
            let index = 2 * k + l;
            if t < best_time {
                best_time = t;
                best_index = index;
            }
        }
    }

    let mut pair_index = 2 * n;
    for a in 0..n {
        for b in (a + 1)..n {
            let t = pair_time(positions[a], velocities[a], positions[b], velocities[b], r);
            if t < best_time {
                best_time = t;
                best_index = pair_index;
            }
            pair_index += 1;
        }
    }

    NextEvent {
        time: best_time,
        index: best_index,
    }
}
