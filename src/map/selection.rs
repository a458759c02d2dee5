//! Transient per-cell selection markers used while editing
//!
//! Each cell carries four independent markers, one per quadrant role.
//! Selections are never persisted and are dropped whenever the map is
//! resized.

use ndarray::Array2;

/// Quadrant role of a selection marker within a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quadrant {
    /// Upper left quarter
    TopLeft = 0,
    /// Upper right quarter
    TopRight = 1,
    /// Lower left quarter
    BottomLeft = 2,
    /// Lower right quarter
    BottomRight = 3,
}

impl Quadrant {
    /// All roles in storage order
    pub const ALL: [Self; 4] = [
        Self::TopLeft,
        Self::TopRight,
        Self::BottomLeft,
        Self::BottomRight,
    ];
}

/// Four selection markers per cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionGrid {
    marks: Array2<[bool; 4]>,
}

impl SelectionGrid {
    /// Create a grid with nothing selected
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            marks: Array2::from_elem((height, width), [false; 4]),
        }
    }

    /// Dimensions as (width, height)
    pub fn dimensions(&self) -> (usize, usize) {
        (self.marks.ncols(), self.marks.nrows())
    }

    /// Whether a marker is set; out-of-grid cells are never selected
    pub fn is_selected(&self, x: usize, y: usize, quadrant: Quadrant) -> bool {
        self.marks
            .get([y, x])
            .and_then(|marks| marks.get(quadrant as usize))
            .copied()
            .unwrap_or(false)
    }

    /// Set a marker, returning whether the cell exists
    pub fn set(&mut self, x: usize, y: usize, quadrant: Quadrant, selected: bool) -> bool {
        match self
            .marks
            .get_mut([y, x])
            .and_then(|marks| marks.get_mut(quadrant as usize))
        {
            Some(mark) => {
                *mark = selected;
                true
            }
            None => false,
        }
    }

    /// Set all four markers of every cell inside a rectangle (clipped)
    pub fn select_rect(&mut self, x: usize, y: usize, width: usize, height: usize, selected: bool) {
        let (grid_width, grid_height) = self.dimensions();
        for row in y..(y + height).min(grid_height) {
            for col in x..(x + width).min(grid_width) {
                if let Some(marks) = self.marks.get_mut([row, col]) {
                    *marks = [selected; 4];
                }
            }
        }
    }

    /// Clear every marker
    pub fn clear(&mut self) {
        self.marks.fill([false; 4]);
    }

    /// Cells with at least one marker set, row-major
    pub fn selected_cells(&self) -> Vec<(usize, usize)> {
        self.marks
            .indexed_iter()
            .filter(|(_, marks)| marks.iter().any(|&mark| mark))
            .map(|((y, x), _)| (x, y))
            .collect()
    }
}
