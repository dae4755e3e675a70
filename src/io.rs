//! The plain-text external interfaces (spec.md S:6): the append-only
//! simulation log, and the maze/position/velocity import-export formats.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::MazeError;
use crate::geometry::Vec2;
use crate::walls::{Point, WallSet};

/// One parsed record from the simulation log.
#[derive(Clone, Debug)]
pub struct LogFrame {
    pub time: f64,
    pub index: usize,
    pub positions: Vec<Vec2>,
    pub velocities: Vec<Vec2>,
}

/// An append-only writer for the simulation log. The simulator owns this
/// exclusively for the duration of a run (spec.md S:5).
pub struct LogWriter {
    file: BufWriter<File>,
}

impl LogWriter {
    pub fn create(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        Ok(LogWriter {
            file: BufWriter::new(file),
        })
    }

    pub fn append(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(LogWriter {
            file: BufWriter::new(file),
        })
    }

    pub fn write_record(
        &mut self,
        t: f64,
        i: usize,
        positions: &[Vec2],
        velocities: &[Vec2],
    ) -> std::io::Result<()> {
        writeln!(self.file, "time: {t} i: {i}")?;
        for p in positions {
            writeln!(self.file, "pos {} {}", p.x, p.y)?;
        }
        for v in velocities {
            writeln!(self.file, "vel {} {}", v.x, v.y)?;
        }
        self.file.flush()
    }
}

/// Reads every record out of a simulation log, recognising record
/// boundaries by the `time:` prefix.
pub fn read_log(path: impl AsRef<Path>) -> Result<Vec<LogFrame>, MazeError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut frames = Vec::new();
    let mut current: Option<LogFrame> = None;

    for line in reader.lines() {
        let line = line?;
        if let Some(rest) = line.strip_prefix("time:") {
            if let Some(frame) = current.take() {
                frames.push(frame);
            }
            let parts: Vec<&str> = rest.split_whitespace().collect();
            let (t, i) = parse_time_header(&parts, &line)?;
            current = Some(LogFrame {
                time: t,
                index: i,
                positions: Vec::new(),
                velocities: Vec::new(),
            });
        } else if let Some(rest) = line.strip_prefix("pos ") {
            let p = parse_vec2(rest, &line)?;
            current
                .as_mut()
                .ok_or_else(|| parse_error(&line, "pos line before any time: header"))?
                .positions
                .push(p);
        } else if let Some(rest) = line.strip_prefix("vel ") {
            let v = parse_vec2(rest, &line)?;
            current
                .as_mut()
                .ok_or_else(|| parse_error(&line, "vel line before any time: header"))?
                .velocities
                .push(v);
        }
    }
    if let Some(frame) = current.take() {
        frames.push(frame);
    }
    Ok(frames)
}

fn parse_time_header(parts: &[&str], line: &str) -> Result<(f64, usize), MazeError> {
    // parts look like ["", "<t>", "i:", "<i>"] once split on "time:" then whitespace.
    let t_str = parts
        .first()
        .ok_or_else(|| parse_error(line, "missing time value"))?;
    let i_str = parts
        .get(2)
        .ok_or_else(|| parse_error(line, "missing i value"))?;
    let t = t_str
        .parse::<f64>()
        .map_err(|_| parse_error(line, "time is not a float"))?;
    let i = i_str
        .parse::<usize>()
        .map_err(|_| parse_error(line, "i is not an integer"))?;
    Ok((t, i))
}

fn parse_vec2(rest: &str, line: &str) -> Result<Vec2, MazeError> {
    let parts: Vec<&str> = rest.split_whitespace().collect();
    if parts.len() != 2 {
        return Err(parse_error(line, "expected exactly two components"));
    }
    let x = parts[0]
        .parse::<f64>()
        .map_err(|_| parse_error(line, "x is not a float"))?;
    let y = parts[1]
        .parse::<f64>()
        .map_err(|_| parse_error(line, "y is not a float"))?;
    Ok(Vec2::new(x, y))
}

fn parse_error(line: &str, reason: &str) -> MazeError {
    MazeError::ParseError {
        line: line.to_string(),
        reason: reason.to_string(),
    }
}

/// Saves the maze wall coordinates in the `(x0 y0) -> (x1 y1)` format.
pub fn save_maze(path: impl AsRef<Path>, walls: &WallSet) -> std::io::Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    writeln!(file, "Maze wall coordinates")?;
    for edge in walls.iter() {
        writeln!(
            file,
            "({} {}) -> ({} {})",
            edge.0.x, edge.0.y, edge.1.x, edge.1.y
        )?;
    }
    file.flush()
}

pub fn load_maze(path: impl AsRef<Path>) -> Result<WallSet, MazeError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut walls = WallSet::new();
    for line in reader.lines().skip(1) {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let (from_str, to_str) = line
            .split_once("->")
            .ok_or_else(|| parse_error(&line, "missing '->' separator"))?;
        let from = parse_point(from_str.trim(), &line)?;
        let to = parse_point(to_str.trim(), &line)?;
        walls.insert(from, to);
    }
    Ok(walls)
}

fn parse_point(text: &str, line: &str) -> Result<Point, MazeError> {
    let trimmed = text.trim_start_matches('(').trim_end_matches(')');
    let parts: Vec<&str> = trimmed.split_whitespace().collect();
    if parts.len() != 2 {
        return Err(parse_error(line, "malformed point"));
    }
    let x = parts[0]
        .parse::<i32>()
        .map_err(|_| parse_error(line, "point x is not an integer"))?;
    let y = parts[1]
        .parse::<i32>()
        .map_err(|_| parse_error(line, "point y is not an integer"))?;
    Ok(Point::new(x, y))
}

/// Saves a `<x> <y>` tuple file (positions or velocities), with `header` as
/// the first line, per spec.md S:6.
pub fn save_tuples(
    path: impl AsRef<Path>,
    header: &str,
    values: &[Vec2],
) -> std::io::Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    writeln!(file, "{header}")?;
    for v in values {
        writeln!(file, "{} {}", v.x, v.y)?;
    }
    file.flush()
}

pub fn load_tuples(path: impl AsRef<Path>) -> Result<Vec<Vec2>, MazeError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut values = Vec::new();
    for line in reader.lines().skip(1) {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        values.push(parse_vec2(&line, &line)?);
    }
    Ok(values)
}

/// An external collaborator seam: the driver calls this once per log frame
/// so that snapshot rendering can be dispatched to a worker pool (spec.md
/// S:5) without the simulator itself depending on a renderer.
pub trait SnapshotSink {
    fn on_frame(&mut self, frame_index: usize, positions: &[Vec2], velocities: &[Vec2]);
}

/// A no-op sink, useful as a test double and as the default when no
/// renderer is configured (spec.md S:7's "missing optional dependency").
#[derive(Default)]
pub struct NullSnapshotSink;

impl SnapshotSink for NullSnapshotSink {
    fn on_frame(&mut self, _frame_index: usize, _positions: &[Vec2], _velocities: &[Vec2]) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn log_round_trips_through_write_and_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sim.log");
        let mut writer = LogWriter::create(&path).unwrap();
        writer
            .write_record(0.0, 0, &[Vec2::new(0.1, 0.2)], &[Vec2::new(1.0, -1.0)])
            .unwrap();
        writer
            .write_record(0.5, 1, &[Vec2::new(0.3, 0.4)], &[Vec2::new(-1.0, 1.0)])
            .unwrap();

        let frames = read_log(&path).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1].index, 1);
        assert!((frames[1].positions[0].x - 0.3).abs() < 1e-12);
        assert!((frames[0].velocities[0].y - (-1.0)).abs() < 1e-12);
    }

    #[test]
    fn maze_round_trips_through_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("maze.txt");
        let mut walls = WallSet::new();
        walls.insert(Point::new(0, 0), Point::new(1, 0));
        walls.insert(Point::new(1, 0), Point::new(1, 1));
        save_maze(&path, &walls).unwrap();
        let loaded = load_maze(&path).unwrap();
        assert_eq!(loaded.len(), walls.len());
        assert!(loaded.contains(Point::new(0, 0), Point::new(1, 0)));
    }

    #[test]
    fn position_tuples_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pos.txt");
        let values = vec![Vec2::new(0.1, 0.2), Vec2::new(0.3, 0.4)];
        save_tuples(&path, "Particle positions", &values).unwrap();
        let loaded = load_tuples(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert!((loaded[1].y - 0.4).abs() < 1e-12);
    }
}
