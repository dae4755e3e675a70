//! The maze generator: a randomised spanning-tree-like path builder over an
//! `m`-row x `n`-column grid, plus the wall derivation, entry chamber and
//! exit aperture carving described in spec.md S:4.1.
//!
//! Row `0` is the bottom of the grid and row `rows - 1` is the top, so that
//! "above the top row" and "below row 0" read the same way they do in the
//! specification. The entry chamber sits above column 0; the exit aperture
//! sits below column `cols - 1`.

use std::collections::{HashMap, HashSet, VecDeque};

use log::debug;
use rand::Rng;

use crate::error::MazeError;
use crate::walls::{Point, WallSet};

/// A cap on full-generation restarts, so that a pathological RNG seed can
/// never make `Maze::generate` loop forever. Each individual path-construction
/// attempt also has its own 10,000-iteration safety cap per spec.md S:4.1.
const MAX_GENERATION_RESTARTS: usize = 1_000;
const PATH_ITERATION_SAFETY_CAP: usize = 10_000;
/// Probability of continuing to carve a new passage from the same cell before
/// backtracking. spec.md's prose says 0.99; `original_source/maze.py` (the
/// code the prose was distilled from) uses 0.9 — see DESIGN.md.
const CONTINUE_PROBABILITY: f64 = 0.9;

#[derive(Clone, Debug)]
pub struct Maze {
    pub rows: usize,
    pub cols: usize,
    walls: WallSet,
}

impl Maze {
    /// Generates a guaranteed-solvable maze, restarting internally if the
    /// randomised path construction exceeds its safety cap. Only fails if
    /// every restart in the cap is exhausted (spec.md S:7's "impossible
    /// maze" case) — practically unreachable for any sane `(rows, cols)`.
    pub fn generate(rows: usize, cols: usize, rng: &mut impl Rng) -> Result<Self, MazeError> {
        assert!(rows > 0 && cols > 0, "maze dimensions must be positive");
        for attempt in 0..MAX_GENERATION_RESTARTS {
            if let Some(conns) = build_path(rows, cols, rng) {
                let walls = derive_walls(rows, cols, &conns);
                return Ok(Maze { rows, cols, walls });
            }
            debug!("maze path construction hit its safety cap, restarting (attempt {attempt})");
        }
        Err(MazeError::MazeGenerationExceededSafetyCap {
            restarts: MAX_GENERATION_RESTARTS,
        })
    }

    pub fn walls(&self) -> &WallSet {
        &self.walls
    }

    pub fn from_walls(rows: usize, cols: usize, walls: WallSet) -> Self {
        Maze { rows, cols, walls }
    }

    /// The x-coordinate of the rightmost wall edge, used by the driver to
    /// locate the exit column (spec.md S:4.5's `max_x`).
    pub fn max_x(&self) -> f64 {
        self.walls
            .iter()
            .flat_map(|e| [e.0.x, e.1.x])
            .max()
            .unwrap_or(self.cols as i32) as f64
    }

    /// Invariant 1 (spec.md S:8): every interior cell is reachable from cell
    /// `(0, 0)` by walking through openings (edges absent from the wall set).
    pub fn is_fully_connected(&self) -> bool {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::new();
        seen.insert((0usize, 0usize));
        queue.push_back((0usize, 0usize));
        while let Some((row, col)) = queue.pop_front() {
            for (nrow, ncol) in self.open_neighbours(row, col) {
                if seen.insert((nrow, ncol)) {
                    queue.push_back((nrow, ncol));
                }
            }
        }
        seen.len() == self.rows * self.cols
    }

    fn open_neighbours(&self, row: usize, col: usize) -> Vec<(usize, usize)> {
        let mut out = Vec::with_capacity(4);
        let here = (row, col);
        if row + 1 < self.rows && !self.wall_between(here, (row + 1, col)) {
            out.push((row + 1, col));
        }
        if row > 0 && !self.wall_between(here, (row - 1, col)) {
            out.push((row - 1, col));
        }
        if col + 1 < self.cols && !self.wall_between(here, (row, col + 1)) {
            out.push((row, col + 1));
        }
        if col > 0 && !self.wall_between(here, (row, col - 1)) {
            out.push((row, col - 1));
        }
        out
    }

    fn wall_between(&self, a: (usize, usize), b: (usize, usize)) -> bool {
        let (a_pt_lo, a_pt_hi) = cell_shared_edge(a, b);
        self.walls.contains(a_pt_lo, a_pt_hi)
    }

    /// Invariant 2 (spec.md S:8): exactly one opening on the top border (the
    /// entry passage, at column 0) and one on the bottom border (the exit,
    /// at column `cols - 1`).
    pub fn has_single_entry_and_exit(&self) -> bool {
        let top_open = !self.walls.contains(
            Point::new(0, self.rows as i32),
            Point::new(1, self.rows as i32),
        );
        let exit_col = (self.cols - 1) as i32;
        let bottom_open = !self
            .walls
            .contains(Point::new(exit_col, 0), Point::new(exit_col + 1, 0));
        if !top_open || !bottom_open {
            return false;
        }
        // every other top/bottom border edge must still be a wall.
        let top_rest = (1..self.cols).all(|col| {
            self.walls.contains(
                Point::new(col as i32, self.rows as i32),
                Point::new(col as i32 + 1, self.rows as i32),
            )
        });
        let bottom_rest = (0..self.cols - 1).all(|col| {
            self.walls
                .contains(Point::new(col as i32, 0), Point::new(col as i32 + 1, 0))
        });
        top_rest && bottom_rest
    }

    pub fn save(&self, path: impl AsRef<std::path::Path>) -> std::io::Result<()> {
        crate::io::save_maze(path, &self.walls)
    }

    pub fn load(path: impl AsRef<std::path::Path>, rows: usize, cols: usize) -> Result<Self, MazeError> {
        let walls = crate::io::load_maze(path)?;
        Ok(Maze::from_walls(rows, cols, walls))
    }
}

/// The two lattice points shared between adjacent cells `a` and `b` (a unit
/// edge), in `(row, col)` grid coordinates where row 0 is the bottom.
fn cell_shared_edge(a: (usize, usize), b: (usize, usize)) -> (Point, Point) {
    let (row, col) = a;
    if b.0 > a.0 {
        // b is north of a: shared edge is a's top edge.
        (
            Point::new(col as i32, row as i32 + 1),
            Point::new(col as i32 + 1, row as i32 + 1),
        )
    } else if b.0 < a.0 {
        // b is south of a: shared edge is a's bottom edge.
        (
            Point::new(col as i32, row as i32),
            Point::new(col as i32 + 1, row as i32),
        )
    } else if b.1 > a.1 {
        // b is east of a: shared edge is a's right edge.
        (
            Point::new(col as i32 + 1, row as i32),
            Point::new(col as i32 + 1, row as i32 + 1),
        )
    } else {
        // b is west of a: shared edge is a's left edge.
        (
            Point::new(col as i32, row as i32),
            Point::new(col as i32, row as i32 + 1),
        )
    }
}

/// Builds the connectivity graph: a randomised depth-first path with
/// backtracking bias, followed by stray-cell repair. Returns `None` if the
/// main path construction exceeded its iteration safety cap (the caller
/// restarts from scratch).
fn build_path(
    rows: usize,
    cols: usize,
    rng: &mut impl Rng,
) -> Option<HashMap<(usize, usize), Vec<(usize, usize)>>> {
    let total = rows * cols;
    let mut in_path = HashSet::new();
    let mut conns: HashMap<(usize, usize), Vec<(usize, usize)>> = HashMap::new();
    for row in 0..rows {
        for col in 0..cols {
            conns.insert((row, col), Vec::new());
        }
    }

    let start = (0usize, 0usize);
    in_path.insert(start);
    let mut stack = vec![start];
    let mut iterations = 0usize;

    while let Some(cur) = stack.pop() {
        iterations += 1;
        if iterations > PATH_ITERATION_SAFETY_CAP {
            return None;
        }
        let mut candidates = grid_neighbours(cur, rows, cols);
        loop {
            if candidates.is_empty() || rng.gen::<f64>() >= CONTINUE_PROBABILITY {
                break;
            }
            let idx = rng.gen_range(0..candidates.len());
            let next = candidates.remove(idx);
            if !in_path.contains(&next) {
                conns.get_mut(&cur).unwrap().push(next);
                conns.get_mut(&next).unwrap().push(cur);
                in_path.insert(next);
                in_path.insert(cur);
                stack.push(next);
            }
        }
    }

    // stray repair: attach every cell the main pass never reached.
    while in_path.len() < total {
        let strays: Vec<(usize, usize)> = (0..rows)
            .flat_map(|row| (0..cols).map(move |col| (row, col)))
            .filter(|c| !in_path.contains(c))
            .collect();
        for cur in strays {
            if in_path.contains(&cur) {
                continue;
            }
            let candidates = grid_neighbours(cur, rows, cols);
            let pick = candidates[rng.gen_range(0..candidates.len())];
            conns.get_mut(&cur).unwrap().push(pick);
            conns.get_mut(&pick).unwrap().push(cur);
            in_path.insert(cur);
        }
    }

    Some(conns)
}

fn grid_neighbours(cur: (usize, usize), rows: usize, cols: usize) -> Vec<(usize, usize)> {
    let (row, col) = cur;
    let mut out = Vec::with_capacity(4);
    if row + 1 < rows {
        out.push((row + 1, col));
    }
    if row > 0 {
        out.push((row - 1, col));
    }
    if col + 1 < cols {
        out.push((row, col + 1));
    }
    if col > 0 {
        out.push((row, col - 1));
    }
    out
}

/// Wall derivation (spec.md S:4.1): border edges, then per-cell interior
/// walls wherever the neighbour isn't reachable per the connectivity map,
/// then the entry chamber box and exit aperture carving.
fn derive_walls(
    rows: usize,
    cols: usize,
    conns: &HashMap<(usize, usize), Vec<(usize, usize)>>,
) -> WallSet {
    let mut walls = WallSet::new();

    for col in 0..cols {
        walls.insert(Point::new(col as i32, 0), Point::new(col as i32 + 1, 0));
        walls.insert(
            Point::new(col as i32, rows as i32),
            Point::new(col as i32 + 1, rows as i32),
        );
    }
    for row in 0..rows {
        walls.insert(Point::new(0, row as i32), Point::new(0, row as i32 + 1));
        walls.insert(
            Point::new(cols as i32, row as i32),
            Point::new(cols as i32, row as i32 + 1),
        );
    }

    for row in 0..rows {
        for col in 0..cols {
            let here = (row, col);
            let connected = &conns[&here];
            for neighbour in grid_neighbours(here, rows, cols) {
                if !connected.contains(&neighbour) {
                    let (a, b) = cell_shared_edge(here, neighbour);
                    walls.insert(a, b);
                }
            }
        }
    }

    // entry chamber: a unit box anchored at column 0, sitting above the grid.
    let top = rows as i32;
    walls.insert(Point::new(0, top), Point::new(1, top));
    walls.insert(Point::new(0, top + 1), Point::new(1, top + 1));
    walls.insert(Point::new(0, top), Point::new(0, top + 1));
    walls.insert(Point::new(1, top), Point::new(1, top + 1));
    // open the passage from the entry chamber into the top row.
    walls.remove(Point::new(0, top), Point::new(1, top));

    // exit aperture: open the bottom edge under the rightmost column.
    let exit_col = (cols - 1) as i32;
    walls.remove(Point::new(exit_col, 0), Point::new(exit_col + 1, 0));

    walls
}
