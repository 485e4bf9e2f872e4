use std::fmt;

use rand::{seq::SliceRandom, thread_rng};

pub const SIDE: usize = 4;
pub const CELLS: usize = SIDE * SIDE;
pub const BLANK: u8 = 16;

/// A tile identified by its permanent value and a board slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub value: u8,
    pub index: usize,
}

/// 4x4 board in row-major slot order. Holds each value in 1..=16 exactly
/// once; 16 marks the blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [u8; CELLS],
}

impl Board {
    pub fn solved() -> Self {
        let mut cells = [0u8; CELLS];
        for (i, cell) in cells.iter_mut().enumerate() {
            *cell = (i + 1) as u8;
        }
        Self { cells }
    }

    pub fn from_cells(cells: [u8; CELLS]) -> Self {
        debug_assert!(
            Self::is_permutation(&cells),
            "board must hold each of 1..=16 exactly once"
        );
        Self { cells }
    }

    fn is_permutation(cells: &[u8; CELLS]) -> bool {
        let mut seen = [false; CELLS];
        for &value in cells {
            if !(1..=CELLS as u8).contains(&value) || seen[value as usize - 1] {
                return false;
            }
            seen[value as usize - 1] = true;
        }
        true
    }

    /// Random configuration with the requested solvability. Re-rolls until
    /// the classifier agrees, so unsolvable boards can be produced on
    /// purpose.
    pub fn shuffled(force_unsolvable: bool) -> Self {
        let mut rng = thread_rng();
        let mut board = Self::solved();
        loop {
            board.cells.shuffle(&mut rng);
            if board.is_solvable() != force_unsolvable {
                return board;
            }
        }
    }

    pub fn cells(&self) -> &[u8; CELLS] {
        &self.cells
    }

    pub fn value_at(&self, index: usize) -> u8 {
        self.cells[index]
    }

    pub fn index_of(&self, value: u8) -> usize {
        // the permutation invariant guarantees every value is present
        self.cells.iter().position(|&v| v == value).unwrap()
    }

    pub fn blank_index(&self) -> usize {
        self.index_of(BLANK)
    }

    pub fn is_solved(&self) -> bool {
        self.cells
            .iter()
            .enumerate()
            .all(|(i, &value)| value == (i + 1) as u8)
    }

    /// Copy of this board with two slots exchanged.
    pub fn swapped(mut self, a: usize, b: usize) -> Self {
        self.cells.swap(a, b);
        self
    }

    /// Slide the tile at `index` into the blank. Returns false and leaves
    /// the board untouched unless the two slots are grid-adjacent.
    pub fn slide(&mut self, index: usize) -> bool {
        if index >= CELLS {
            return false;
        }
        let blank = self.blank_index();
        if !adjacent(blank, index) {
            return false;
        }
        self.cells.swap(blank, index);
        true
    }

    /// Closed-form reachability check: each legal slide flips the inversion
    /// parity and the blank-row parity together, so their combination is
    /// invariant from the solved state.
    pub fn is_solvable(&self) -> bool {
        let inversions = self.inversions();
        if SIDE % 2 == 0 {
            if self.blank_row_from_bottom() % 2 == 0 {
                inversions % 2 == 1
            } else {
                inversions % 2 == 0
            }
        } else {
            // odd-sided grids ignore the blank row entirely
            inversions % 2 == 0
        }
    }

    /// Out-of-order pairs of non-blank values in slot order.
    pub fn inversions(&self) -> usize {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &value)| value != BLANK)
            .map(|(i, &value)| {
                self.cells[i + 1..]
                    .iter()
                    .filter(|&&next| next != BLANK && next < value)
                    .count()
            })
            .sum()
    }

    /// Row of the blank, 1-indexed from the bottom of the grid.
    pub fn blank_row_from_bottom(&self) -> usize {
        SIDE - self.blank_index() / SIDE
    }
}

/// True when the two slots differ by exactly one row or one column.
pub fn adjacent(a: usize, b: usize) -> bool {
    let rows = (a / SIDE).abs_diff(b / SIDE);
    let cols = (a % SIDE).abs_diff(b % SIDE);
    rows + cols == 1
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(SIDE) {
            for &value in row {
                if value == BLANK {
                    write!(f, " · ")?;
                } else {
                    write!(f, "{:2} ", value)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
