/// Grid: the rectangular character grid of one level.
///
/// ## Normalization
///
/// Level text is repaired on load, never rejected:
///   - lines are split on `\n` (a trailing `\r` is dropped)
///   - trailing all-blank lines are discarded
///   - short lines are space-padded to the longest line
///   - an empty document becomes a single-space 1x1 grid
///
/// `changed()` reports whether any of that altered the content, so an
/// editor can offer to re-save. Line-ending style alone is not a change.
///
/// ## Edge sentinel
///
/// `get` never fails: any out-of-range coordinate reads as a wall, so
/// entities at the border always see themselves enclosed.

use crate::domain::entity::{Direction, Neighborhood, Pos};
use crate::domain::tile::{self, WALL};

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Grid {
    cells: Vec<Vec<char>>,
    changed: bool,
}

// ── Construction / serialization ──

impl Grid {
    pub fn from_text(text: &str) -> Self {
        let mut lines: Vec<&str> = text.lines().collect();

        let mut changed = false;
        while lines.last().is_some_and(|l| l.chars().all(tile::is_blank)) {
            lines.pop();
            changed = true;
        }

        if lines.is_empty() {
            // " " is already the normalized form of itself
            let changed = text != " " && text != " \n" && text != " \r\n";
            return Grid { cells: vec![vec![tile::EMPTY]], changed };
        }

        let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(1);
        let cells = lines
            .iter()
            .map(|l| {
                let mut row: Vec<char> = l.chars().collect();
                if row.len() < width {
                    changed = true;
                    row.resize(width, tile::EMPTY);
                }
                row
            })
            .collect();

        Grid { cells, changed }
    }

    /// Whether normalization altered the source text.
    pub fn changed(&self) -> bool {
        self.changed
    }

    /// Serialize back to level text: one line per row, each `\n`-terminated.
    /// Re-loading the result yields an identical, unchanged grid.
    pub fn to_text(&self) -> String {
        let mut out = String::with_capacity(self.rows() * (self.cols() + 1));
        for row in &self.cells {
            out.extend(row.iter());
            out.push('\n');
        }
        out
    }
}

// ── Cell query / mutation API ──

impl Grid {
    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    pub fn cols(&self) -> usize {
        self.cells[0].len()
    }

    #[inline]
    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.row >= 0
            && pos.col >= 0
            && (pos.row as usize) < self.rows()
            && (pos.col as usize) < self.cols()
    }

    /// Cell at `pos`. Out of bounds = wall.
    #[inline]
    pub fn get(&self, pos: Pos) -> char {
        if self.in_bounds(pos) {
            self.cells[pos.row as usize][pos.col as usize]
        } else {
            WALL
        }
    }

    /// Write a cell. Callers pass validated positions; anything outside
    /// the grid is dropped.
    #[inline]
    pub fn set(&mut self, pos: Pos, symbol: char) {
        debug_assert!(self.in_bounds(pos), "set outside grid at {pos:?}");
        if self.in_bounds(pos) {
            self.cells[pos.row as usize][pos.col as usize] = symbol;
        }
    }

    /// The 3x3 block around `pos`, each cell resolved through the sentinel.
    pub fn neighborhood(&self, pos: Pos) -> Neighborhood {
        let mut cells = [WALL; 9];
        for d in Direction::ALL {
            cells[d.keypad() as usize - 1] = self.get(pos.offset(d));
        }
        Neighborhood::from_keypad(cells)
    }

    /// One row as a string (for rendering).
    pub fn row_text(&self, row: usize) -> String {
        self.cells.get(row).map(|r| r.iter().collect()).unwrap_or_default()
    }
}

// ── Symbol search ──

impl Grid {
    /// First occurrence of `symbol` in row-major order.
    pub fn first_position_of(&self, symbol: char) -> Option<Pos> {
        self.scan_from(symbol, 0)
    }

    /// Next occurrence strictly after `after` in row-major order.
    pub fn next_position_of(&self, symbol: char, after: Pos) -> Option<Pos> {
        if after.row < 0 {
            return self.first_position_of(symbol);
        }
        let start = (after.row as usize)
            .saturating_mul(self.cols())
            .saturating_add((after.col + 1).max(0) as usize);
        self.scan_from(symbol, start)
    }

    /// Every occurrence of `symbol`, lazily, in row-major order.
    pub fn positions_of(&self, symbol: char) -> impl Iterator<Item = Pos> + '_ {
        let mut cursor = self.first_position_of(symbol);
        std::iter::from_fn(move || {
            let here = cursor?;
            cursor = self.next_position_of(symbol, here);
            Some(here)
        })
    }

    fn scan_from(&self, symbol: char, start: usize) -> Option<Pos> {
        let cols = self.cols();
        (start..self.rows() * cols)
            .find(|&i| self.cells[i / cols][i % cols] == symbol)
            .map(|i| Pos::new((i / cols) as i32, (i % cols) as i32))
    }
}
