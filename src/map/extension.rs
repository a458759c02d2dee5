//! Grid resizing: expansion around an anchor and rectangular crops
//!
//! Both operations build complete new layer arrays before anything is
//! replaced, so a rejected resize never leaves one layer at a different size
//! than the others.

use ndarray::{Array2, s};

use crate::io::error::{MapError, Result, precondition};
use crate::map::cell::{BaseTile, CellDescriptor};
use crate::map::grid::GridStore;

/// Corner (or center) where existing contents stay when the grid grows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Anchor {
    /// Existing cells keep their coordinates
    #[default]
    TopLeft,
    /// Existing cells stick to the right edge
    TopRight,
    /// Existing cells stick to the bottom edge
    BottomLeft,
    /// Existing cells stick to the bottom-right corner
    BottomRight,
    /// New cells are split evenly around existing cells
    Center,
}

/// Padding added on each side when expanding a grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtensionInfo {
    /// Columns added on the left side
    pub pad_left: usize,
    /// Columns added on the right side
    pub pad_right: usize,
    /// Rows added on the top
    pub pad_top: usize,
    /// Rows added on the bottom
    pub pad_bottom: usize,
}

impl ExtensionInfo {
    /// Whether any padding is added
    pub const fn needs_extension(&self) -> bool {
        self.pad_left + self.pad_right + self.pad_top + self.pad_bottom > 0
    }

    /// Where the old (0, 0) lands in the expanded grid
    pub const fn new_origin(&self) -> (usize, usize) {
        (self.pad_left, self.pad_top)
    }
}

/// Calculate padding to grow `current` to `target` around an anchor
///
/// # Errors
///
/// Returns a precondition error if the target is smaller than the current
/// grid on either axis
pub fn calculate_extension(
    current: (usize, usize),
    target: (usize, usize),
    anchor: Anchor,
) -> Result<ExtensionInfo> {
    if target.0 < current.0 || target.1 < current.1 {
        return Err(precondition(
            "expand map",
            &format!(
                "target {}x{} is smaller than current {}x{}, crop instead",
                target.0, target.1, current.0, current.1
            ),
        ));
    }

    let grow_x = target.0 - current.0;
    let grow_y = target.1 - current.1;

    let (pad_left, pad_top) = match anchor {
        Anchor::TopLeft => (0, 0),
        Anchor::TopRight => (grow_x, 0),
        Anchor::BottomLeft => (0, grow_y),
        Anchor::BottomRight => (grow_x, grow_y),
        Anchor::Center => (grow_x / 2, grow_y / 2),
    };

    Ok(ExtensionInfo {
        pad_left,
        pad_right: grow_x - pad_left,
        pad_top,
        pad_bottom: grow_y - pad_top,
    })
}

/// Extend a 2D array with padding
///
/// Copies existing data to its anchored position in the new array while
/// filling new cells with the padding value.
pub fn extend_array_2d<T: Clone>(
    array: &Array2<T>,
    info: &ExtensionInfo,
    padding_value: T,
) -> Array2<T> {
    if !info.needs_extension() {
        return array.clone();
    }

    let (old_rows, old_cols) = array.dim();
    let new_shape = (
        old_rows + info.pad_top + info.pad_bottom,
        old_cols + info.pad_left + info.pad_right,
    );

    let mut new_array = Array2::from_elem(new_shape, padding_value);
    new_array
        .slice_mut(s![
            info.pad_top..info.pad_top + old_rows,
            info.pad_left..info.pad_left + old_cols
        ])
        .assign(array);

    new_array
}

/// Copy a sub-rectangle of a 2D array
///
/// The caller guarantees the rectangle lies inside the array.
pub fn crop_array_2d<T: Clone>(
    array: &Array2<T>,
    x: usize,
    y: usize,
    width: usize,
    height: usize,
) -> Array2<T> {
    array.slice(s![y..y + height, x..x + width]).to_owned()
}

/// Grow every layer of a grid, new cells void
pub fn expand_grid(grid: &GridStore, info: &ExtensionInfo) -> GridStore {
    let (ground, base_tiles, cells) = grid.layers();
    GridStore::from_layers(
        extend_array_2d(ground, info, false),
        extend_array_2d(base_tiles, info, BaseTile::default()),
        extend_array_2d(cells, info, CellDescriptor::default()),
    )
}

/// Extract a sub-rectangle of every layer into a new grid
///
/// # Errors
///
/// Returns a range error if the rectangle is empty or extends past the grid
pub fn crop_grid(
    grid: &GridStore,
    x: usize,
    y: usize,
    width: usize,
    height: usize,
) -> Result<GridStore> {
    let fits = width > 0
        && height > 0
        && x.checked_add(width).is_some_and(|end| end <= grid.width())
        && y.checked_add(height).is_some_and(|end| end <= grid.height());
    if !fits {
        return Err(MapError::InvalidRegion {
            x,
            y,
            width,
            height,
            grid_dimensions: (grid.width(), grid.height()),
        });
    }

    let (ground, base_tiles, cells) = grid.layers();
    Ok(GridStore::from_layers(
        crop_array_2d(ground, x, y, width, height),
        crop_array_2d(base_tiles, x, y, width, height),
        crop_array_2d(cells, x, y, width, height),
    ))
}
