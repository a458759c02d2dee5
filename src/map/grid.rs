//! Grid store holding the three parallel per-cell layers
//!
//! Ground flags, base tiles and cell descriptors live in separate 2D arrays
//! indexed `[y, x]` so each layer can be scanned on its own during
//! compression. The store keeps void cells (ground flag unset) at default
//! values in the other two layers.
//!
//! Door groups are tracked as cells are stored so every cell of a group
//! carries the same open bit.

use std::collections::BTreeMap;

use ndarray::Array2;

use crate::io::error::{MapError, Result, precondition};
use crate::map::cell::{BaseTile, CellDescriptor};

/// Square block of cells addressed by its top-left corner and side length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    /// Left column
    pub x: usize,
    /// Top row
    pub y: usize,
    /// Side length in cells
    pub size: usize,
}

impl Block {
    /// Create a block
    pub const fn new(x: usize, y: usize, size: usize) -> Self {
        Self { x, y, size }
    }

    /// Children in traversal order: top-left, top-right, bottom-left, bottom-right
    pub const fn quadrants(self) -> [Self; 4] {
        let half = self.size / 2;
        [
            Self::new(self.x, self.y, half),
            Self::new(self.x + half, self.y, half),
            Self::new(self.x, self.y + half, half),
            Self::new(self.x + half, self.y + half, half),
        ]
    }
}

/// Open and closed cell counts of one door group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct DoorTally {
    open: usize,
    closed: usize,
}

/// Three parallel grid layers of identical dimensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridStore {
    ground: Array2<bool>,
    base_tiles: Array2<BaseTile>,
    cells: Array2<CellDescriptor>,
    doors: BTreeMap<u16, DoorTally>,
}

impl GridStore {
    /// Create a grid with every cell void
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            ground: Array2::from_elem((height, width), false),
            base_tiles: Array2::from_elem((height, width), BaseTile::default()),
            cells: Array2::from_elem((height, width), CellDescriptor::default()),
            doors: BTreeMap::new(),
        }
    }

    /// Width in cells
    pub fn width(&self) -> usize {
        self.ground.ncols()
    }

    /// Height in cells
    pub fn height(&self) -> usize {
        self.ground.nrows()
    }

    /// Whether (x, y) addresses a cell
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x < self.width() && y < self.height()
    }

    fn check(&self, x: usize, y: usize) -> Result<()> {
        if self.contains(x, y) {
            Ok(())
        } else {
            Err(MapError::OutOfBounds {
                x,
                y,
                width: self.width(),
                height: self.height(),
            })
        }
    }

    /// Ground flag of a cell
    ///
    /// # Errors
    ///
    /// Returns a range error if (x, y) is outside the grid
    pub fn ground(&self, x: usize, y: usize) -> Result<bool> {
        self.check(x, y)?;
        Ok(self.ground.get([y, x]).copied().unwrap_or_default())
    }

    /// Base tile of a cell, `None` for void cells
    ///
    /// # Errors
    ///
    /// Returns a range error if (x, y) is outside the grid
    pub fn base_tile(&self, x: usize, y: usize) -> Result<Option<BaseTile>> {
        Ok(self
            .ground(x, y)?
            .then(|| self.base_tiles.get([y, x]).copied().unwrap_or_default()))
    }

    /// Cell descriptor of a cell
    ///
    /// # Errors
    ///
    /// Returns a range error if (x, y) is outside the grid
    pub fn cell(&self, x: usize, y: usize) -> Result<CellDescriptor> {
        self.check(x, y)?;
        Ok(self.cells.get([y, x]).copied().unwrap_or_default())
    }

    /// Set or clear the ground flag; clearing resets the cell's other layers
    ///
    /// # Errors
    ///
    /// Returns a range error if (x, y) is outside the grid
    pub fn set_ground(&mut self, x: usize, y: usize, present: bool) -> Result<()> {
        self.check(x, y)?;
        if let Some(flag) = self.ground.get_mut([y, x]) {
            *flag = present;
        }
        if !present {
            let previous = self.cell_at(x, y);
            self.untrack_door(&previous);
            if let Some(tile) = self.base_tiles.get_mut([y, x]) {
                *tile = BaseTile::default();
            }
            if let Some(cell) = self.cells.get_mut([y, x]) {
                *cell = CellDescriptor::default();
            }
        }
        Ok(())
    }

    /// Place a base tile, marking the cell present; `None` voids the cell
    ///
    /// # Errors
    ///
    /// Returns a range error if (x, y) is outside the grid
    pub fn set_base_tile(&mut self, x: usize, y: usize, tile: Option<BaseTile>) -> Result<()> {
        match tile {
            Some(tile) => {
                self.set_ground(x, y, true)?;
                if let Some(slot) = self.base_tiles.get_mut([y, x]) {
                    *slot = tile;
                }
                Ok(())
            }
            None => self.set_ground(x, y, false),
        }
    }

    /// Store a cell descriptor in normalized form
    ///
    /// # Errors
    ///
    /// Returns a range error if (x, y) is outside the grid, or a
    /// precondition error when a non-default descriptor targets a void cell
    /// or a door cell disagrees with the open state of its group
    pub fn set_cell(&mut self, x: usize, y: usize, cell: CellDescriptor) -> Result<()> {
        let cell = cell.normalized();
        if !cell.is_default() && !self.ground(x, y)? {
            return Err(precondition(
                "set cell descriptor",
                &format!("cell ({x}, {y}) is void"),
            ));
        }
        self.check(x, y)?;

        let previous = self.cell_at(x, y);
        self.untrack_door(&previous);
        if let Some((group, offset)) = cell.door()
            && let Some(open) = self.door_state(group)
            && open != offset.is_open()
        {
            self.track_door(&previous);
            return Err(precondition(
                "set cell descriptor",
                &format!(
                    "door group {group} is {} but cell ({x}, {y}) is {}",
                    door_word(open),
                    door_word(offset.is_open())
                ),
            ));
        }
        self.track_door(&cell);
        if let Some(slot) = self.cells.get_mut([y, x]) {
            *slot = cell;
        }
        Ok(())
    }

    /// Open state shared by the cells of a door group, `None` if no cell
    /// belongs to it
    pub fn door_state(&self, group: u16) -> Option<bool> {
        self.doors.get(&group).map(|tally| tally.open > 0)
    }

    /// Set the open bit of a door cell, returning whether it changed
    pub(crate) fn set_door_open(&mut self, x: usize, y: usize, open: bool) -> bool {
        let cell = self.cell_at(x, y);
        let Some((_, offset)) = cell.door() else {
            return false;
        };
        if offset.is_open() == open {
            return false;
        }
        let mut updated = cell;
        updated.door_offset = offset.with_open(open);
        self.untrack_door(&cell);
        self.track_door(&updated);
        if let Some(slot) = self.cells.get_mut([y, x]) {
            *slot = updated;
        }
        true
    }

    fn track_door(&mut self, cell: &CellDescriptor) {
        if let Some((group, offset)) = cell.door() {
            let tally = self.doors.entry(group).or_default();
            if offset.is_open() {
                tally.open += 1;
            } else {
                tally.closed += 1;
            }
        }
    }

    fn untrack_door(&mut self, cell: &CellDescriptor) {
        let Some((group, offset)) = cell.door() else {
            return;
        };
        if let Some(tally) = self.doors.get_mut(&group) {
            if offset.is_open() {
                tally.open = tally.open.saturating_sub(1);
            } else {
                tally.closed = tally.closed.saturating_sub(1);
            }
            if tally.open == 0 && tally.closed == 0 {
                self.doors.remove(&group);
            }
        }
    }

    /// Whether no ground flag is set inside the block (clipped to the grid)
    pub fn ground_block_empty(&self, block: Block) -> bool {
        self.block_cells(block).all(|(x, y)| !self.ground_at(x, y))
    }

    /// Whether no present cell inside the block carries a descriptor
    pub fn cell_block_empty(&self, block: Block) -> bool {
        self.block_cells(block)
            .all(|(x, y)| !self.ground_at(x, y) || self.cell_at(x, y).is_default())
    }

    /// In-bounds cells of a block in row-major order
    pub fn block_cells(&self, block: Block) -> impl Iterator<Item = (usize, usize)> + use<> {
        let x_end = (block.x + block.size).min(self.width());
        let y_end = (block.y + block.size).min(self.height());
        let x_start = block.x;
        (block.y..y_end).flat_map(move |y| (x_start..x_end).map(move |x| (x, y)))
    }

    /// Whether any cell of the block lies inside the grid
    pub fn overlaps(&self, block: Block) -> bool {
        block.x < self.width() && block.y < self.height() && block.size > 0
    }

    // Unchecked reads for scans that already clip to the grid
    pub(crate) fn ground_at(&self, x: usize, y: usize) -> bool {
        self.ground.get([y, x]).copied().unwrap_or_default()
    }

    pub(crate) fn tile_at(&self, x: usize, y: usize) -> BaseTile {
        self.base_tiles.get([y, x]).copied().unwrap_or_default()
    }

    pub(crate) fn cell_at(&self, x: usize, y: usize) -> CellDescriptor {
        self.cells.get([y, x]).copied().unwrap_or_default()
    }

    /// Raw layer arrays for whole-grid transforms
    pub(crate) const fn layers(&self) -> (&Array2<bool>, &Array2<BaseTile>, &Array2<CellDescriptor>) {
        (&self.ground, &self.base_tiles, &self.cells)
    }

    /// Assemble a store from layers of equal shape
    pub(crate) fn from_layers(
        ground: Array2<bool>,
        base_tiles: Array2<BaseTile>,
        cells: Array2<CellDescriptor>,
    ) -> Self {
        debug_assert_eq!(ground.dim(), base_tiles.dim());
        debug_assert_eq!(ground.dim(), cells.dim());
        let mut grid = Self {
            ground,
            base_tiles,
            cells,
            doors: BTreeMap::new(),
        };
        let present: Vec<_> = grid.present_cells().map(|(_, _, cell)| cell).collect();
        for cell in &present {
            grid.track_door(cell);
        }
        grid
    }

    /// Number of present cells
    pub fn ground_count(&self) -> usize {
        self.ground.iter().filter(|&&present| present).count()
    }

    /// Iterate over present cells and their descriptors in row-major order
    pub fn present_cells(&self) -> impl Iterator<Item = (usize, usize, CellDescriptor)> + '_ {
        self.ground
            .indexed_iter()
            .filter(|&(_, &present)| present)
            .map(|((y, x), _)| (x, y, self.cell_at(x, y)))
    }
}

const fn door_word(open: bool) -> &'static str {
    if open { "open" } else { "closed" }
}
