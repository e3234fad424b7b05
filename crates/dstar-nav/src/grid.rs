use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};

/// Integer cell coordinate. Also the vertex identity used by the planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The four adjacent positions.
    ///
    /// Fixed order for determinism: up `(0, +1)`, down `(0, -1)`, left `(-1, 0)`, right `(+1, 0)`.
    /// Path extraction breaks ties in this order.
    pub fn neighbors(self) -> [Position; 4] {
        [
            Position::new(self.x, self.y + 1),
            Position::new(self.x, self.y - 1),
            Position::new(self.x - 1, self.y),
            Position::new(self.x + 1, self.y),
        ]
    }

    pub fn manhattan(self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    pub fn is_adjacent(self, other: Position) -> bool {
        self.manhattan(other) == 1
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl FromStr for Position {
    type Err = GridError;

    /// Parses `"x,y"` (whitespace around either component is allowed).
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || GridError::InvalidPosition(s.to_string());
        let (x, y) = s.split_once(',').ok_or_else(invalid)?;
        let x = x.trim().parse().map_err(|_| invalid())?;
        let y = y.trim().parse().map_err(|_| invalid())?;
        Ok(Self { x, y })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CellState {
    #[default]
    Walkable,
    Blocked,
}

impl CellState {
    pub fn is_walkable(self) -> bool {
        matches!(self, CellState::Walkable)
    }

    pub fn toggled(self) -> Self {
        match self {
            CellState::Walkable => CellState::Blocked,
            CellState::Blocked => CellState::Walkable,
        }
    }
}

/// Notification produced by a grid mutation.
///
/// Hosts forward `position` to [`DStarPlanner::update_edge`](crate::DStarPlanner::update_edge)
/// before issuing the next mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CellChange {
    pub position: Position,
    pub state: CellState,
}

/// Read-only grid access needed by the planner.
pub trait GridView {
    /// Whether a cell exists at `pos` (walkable or not).
    fn contains(&self, pos: Position) -> bool;

    /// Whether `pos` exists and can be entered. Off-grid positions are never walkable.
    fn is_walkable(&self, pos: Position) -> bool;

    /// Every existing cell, used to reset the cost maps on a full plan.
    fn cells(&self) -> Vec<Position>;
}

/// Dense rectangular arena of cell states, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Grid {
    width: i32,
    height: i32,
    cells: Vec<CellState>,
}

impl Grid {
    /// Creates a fully walkable grid.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 || width > i32::MAX as u32 || height > i32::MAX as u32 {
            return Err(GridError::Empty { width, height });
        }
        let len = (width as usize)
            .checked_mul(height as usize)
            .ok_or(GridError::Empty { width, height })?;
        Ok(Self {
            width: width as i32,
            height: height as i32,
            cells: vec![CellState::Walkable; len],
        })
    }

    pub fn width(&self) -> u32 {
        self.width as u32
    }

    pub fn height(&self) -> u32 {
        self.height as u32
    }

    fn idx(&self, pos: Position) -> Option<usize> {
        if !self.in_bounds(pos) {
            return None;
        }
        Some((pos.y as usize) * (self.width as usize) + pos.x as usize)
    }

    fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    fn pos_from_idx(&self, idx: usize) -> Position {
        let width = self.width as usize;
        Position::new((idx % width) as i32, (idx / width) as i32)
    }

    pub fn state(&self, pos: Position) -> Option<CellState> {
        self.idx(pos).map(|idx| self.cells[idx])
    }

    /// Sets a cell's state. Returns the change notification, or `None` if `pos` is off-grid or
    /// the cell already had that state.
    pub fn set_state(&mut self, pos: Position, state: CellState) -> Option<CellChange> {
        let idx = self.idx(pos)?;
        if self.cells[idx] == state {
            return None;
        }
        self.cells[idx] = state;
        Some(CellChange {
            position: pos,
            state,
        })
    }

    pub fn set_blocked(&mut self, pos: Position, blocked: bool) -> Option<CellChange> {
        let state = if blocked {
            CellState::Blocked
        } else {
            CellState::Walkable
        };
        self.set_state(pos, state)
    }

    /// Flips a cell between walkable and blocked. `None` if `pos` is off-grid.
    pub fn toggle(&mut self, pos: Position) -> Option<CellChange> {
        let state = self.state(pos)?.toggled();
        self.set_state(pos, state)
    }

    pub fn walkable_cells(&self) -> Vec<Position> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, state)| state.is_walkable())
            .map(|(idx, _)| self.pos_from_idx(idx))
            .collect()
    }

    pub fn walkable_count(&self) -> usize {
        self.cells.iter().filter(|state| state.is_walkable()).count()
    }
}

impl GridView for Grid {
    fn contains(&self, pos: Position) -> bool {
        self.in_bounds(pos)
    }

    fn is_walkable(&self, pos: Position) -> bool {
        self.state(pos).is_some_and(CellState::is_walkable)
    }

    fn cells(&self) -> Vec<Position> {
        (0..self.cells.len()).map(|idx| self.pos_from_idx(idx)).collect()
    }
}

impl FromStr for Grid {
    type Err = GridError;

    /// Parses a text map: one line per row (`y` = line index), `O`/`.` walkable, `W`/`#` blocked.
    fn from_str(s: &str) -> Result<Self> {
        let rows: Vec<&str> = s.trim_end().lines().map(|l| l.trim_end_matches('\r')).collect();
        let Some(first) = rows.first() else {
            return Err(GridError::NoRows);
        };

        let width = first.chars().count();
        let mut grid = Grid::new(width as u32, rows.len() as u32)?;

        for (y, row) in rows.iter().enumerate() {
            let found = row.chars().count();
            if found != width {
                return Err(GridError::RaggedRow {
                    line: y + 1,
                    expected: width,
                    found,
                });
            }
            for (x, glyph) in row.chars().enumerate() {
                let state = match glyph {
                    'O' | '.' => CellState::Walkable,
                    'W' | '#' => CellState::Blocked,
                    _ => {
                        return Err(GridError::UnknownGlyph {
                            glyph,
                            line: y + 1,
                            column: x + 1,
                        })
                    }
                };
                grid.set_state(Position::new(x as i32, y as i32), state);
            }
        }

        Ok(grid)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, state) in self.cells.iter().enumerate() {
            if idx > 0 && idx % self.width as usize == 0 {
                writeln!(f)?;
            }
            let glyph = if state.is_walkable() { '.' } else { '#' };
            write!(f, "{glyph}")?;
        }
        Ok(())
    }
}
