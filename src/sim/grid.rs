//! Uniform spatial grid over the anti-gravity zone
//!
//! Broad-phase only: each cell keeps the ids of the in-zone ships whose
//! rect overlaps it. Cells are rebuilt wholesale when the cell size grows;
//! ships re-register lazily the next time they move.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::rect::Rect;
use super::state::ShipId;

/// Grid coordinate of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellCoord {
    pub row: usize,
    pub col: usize,
}

/// One grid cell
#[derive(Debug, Clone)]
pub struct GridCell {
    pub coord: CellCoord,
    pub rect: Rect,
    /// Ids of ships currently overlapping this cell (ordered for determinism)
    pub ships: BTreeSet<ShipId>,
}

#[derive(Debug, Clone)]
pub struct SpatialGrid {
    /// Region tiled by the grid: `[0, width] x [0, height]`
    width: f32,
    height: f32,
    /// Requested cell size (before stretching to tile the region)
    cell_size: f32,
    rows: usize,
    cols: usize,
    cell_width: f32,
    cell_height: f32,
    /// Row-major
    cells: Vec<GridCell>,
}

impl SpatialGrid {
    /// Grid tiling a `width` x `height` region with cells of roughly `cell_size`
    pub fn new(width: f32, height: f32, cell_size: f32) -> Self {
        let mut grid = Self {
            width,
            height,
            cell_size,
            rows: 0,
            cols: 0,
            cell_width: 0.0,
            cell_height: 0.0,
            cells: Vec::new(),
        };
        grid.rebuild(cell_size);
        grid
    }

    /// Discard every cell and membership and re-tile the region
    pub fn rebuild(&mut self, cell_size: f32) {
        let size = cell_size.max(1.0);
        self.cell_size = size;
        self.cols = (self.width / size) as usize + 1;
        self.rows = (self.height / size) as usize + 1;
        self.cell_width = self.width / self.cols as f32;
        self.cell_height = self.height / self.rows as f32;

        self.cells = Vec::with_capacity(self.rows * self.cols);
        for row in 0..self.rows {
            for col in 0..self.cols {
                let left = col as f32 * self.cell_width;
                let top = row as f32 * self.cell_height;
                self.cells.push(GridCell {
                    coord: CellCoord { row, col },
                    rect: Rect::new(left, top, left + self.cell_width, top + self.cell_height),
                    ships: BTreeSet::new(),
                });
            }
        }
    }

    /// Edge length of every cell
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Number of cell rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of cell columns
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Cell at `coord`, None if out of range
    pub fn cell(&self, coord: CellCoord) -> Option<&GridCell> {
        if coord.row >= self.rows || coord.col >= self.cols {
            return None;
        }
        self.cells.get(coord.row * self.cols + coord.col)
    }

    fn cell_mut(&mut self, coord: CellCoord) -> Option<&mut GridCell> {
        if coord.row >= self.rows || coord.col >= self.cols {
            return None;
        }
        self.cells.get_mut(coord.row * self.cols + coord.col)
    }

    /// Every cell the rect touches, with indices clamped into the grid
    ///
    /// A rect that is partly (or wholly) off-grid still maps to the
    /// nearest edge cells. Returned in row-major order without duplicates.
    pub fn cells_overlapping(&self, rect: &Rect) -> Vec<CellCoord> {
        let col_of = |x: f32| clamp_index(x / self.cell_width, self.cols);
        let row_of = |y: f32| clamp_index(y / self.cell_height, self.rows);

        let (min_col, max_col) = (col_of(rect.left), col_of(rect.right));
        let (min_row, max_row) = (row_of(rect.top), row_of(rect.bottom));

        let mut coords = Vec::with_capacity((max_row - min_row + 1) * (max_col - min_col + 1));
        for row in min_row..=max_row {
            for col in min_col..=max_col {
                coords.push(CellCoord { row, col });
            }
        }
        coords
    }

    /// Register `id` in the cell at `coord`
    pub fn insert(&mut self, id: ShipId, coord: CellCoord) {
        if let Some(cell) = self.cell_mut(coord) {
            cell.ships.insert(id);
        }
    }

    /// Remove a ship from a cell; stale coords from before a rebuild are ignored
    pub fn remove(&mut self, id: ShipId, coord: CellCoord) {
        if let Some(cell) = self.cell_mut(coord) {
            cell.ships.remove(&id);
        }
    }

    /// Deduplicated ids registered in any of `coords`
    pub fn ships_in(&self, coords: &[CellCoord]) -> BTreeSet<ShipId> {
        coords
            .iter()
            .filter_map(|&c| self.cell(c))
            .flat_map(|cell| cell.ships.iter().copied())
            .collect()
    }
}

#[inline]
fn clamp_index(v: f32, len: usize) -> usize {
    let max = len.saturating_sub(1) as i64;
    (v.floor() as i64).clamp(0, max) as usize
}
