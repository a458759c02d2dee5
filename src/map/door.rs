//! Door state edits inside cell descriptors
//!
//! A door is every cell flagged `DOOR` with the same group id, and all of
//! them share one open bit. The positional variants only act when a cell of
//! the group lies within [`DOOR_SEARCH_RADIUS`] of the cell that was
//! interacted with. Every variant flips all matching cells in one pass.

use std::collections::BTreeSet;

use crate::io::configuration::DOOR_SEARCH_RADIUS;
use crate::io::error::Result;
use crate::map::cell::DoorOffset;
use crate::map::grid::{Block, GridStore};

/// Door state of a single cell, `None` when the cell is not part of a door
///
/// # Errors
///
/// Returns a range error if (x, y) is outside the grid
pub fn door_at(grid: &GridStore, x: usize, y: usize) -> Result<Option<(u16, DoorOffset)>> {
    Ok(grid.cell(x, y)?.door())
}

/// Offset added to the door image index, 0 for closed doors and non-doors
///
/// # Errors
///
/// Returns a range error if (x, y) is outside the grid
pub fn door_image_offset(grid: &GridStore, x: usize, y: usize) -> Result<u8> {
    Ok(door_at(grid, x, y)?
        .filter(|(_, offset)| offset.is_open())
        .map_or(0, |(_, offset)| offset.image_offset()))
}

/// Open or close the door `group` found around (x, y), returning the cells
/// changed
///
/// Nothing changes unless a cell of the group lies within the search
/// radius; a found door flips in every cell of its group.
///
/// # Errors
///
/// Returns a range error if (x, y) is outside the grid
pub fn set_door_near(
    grid: &mut GridStore,
    x: usize,
    y: usize,
    group: u16,
    open: bool,
) -> Result<usize> {
    grid.cell(x, y)?;
    let origin_x = x.saturating_sub(DOOR_SEARCH_RADIUS);
    let origin_y = y.saturating_sub(DOOR_SEARCH_RADIUS);
    // Radius on both sides plus the centre cell, clipped by block_cells
    let span = (x - origin_x).max(y - origin_y) + DOOR_SEARCH_RADIUS + 1;
    let block = Block::new(origin_x, origin_y, span);
    let found = grid
        .block_cells(block)
        .filter(|&(cx, cy)| cx.abs_diff(x) <= DOOR_SEARCH_RADIUS && cy.abs_diff(y) <= DOOR_SEARCH_RADIUS)
        .any(|(cx, cy)| {
            grid.cell_at(cx, cy)
                .door()
                .is_some_and(|(door_group, _)| door_group == group)
        });
    if !found {
        return Ok(0);
    }
    Ok(set_door_group(grid, group, open))
}

/// Open or close every cell of `group` across the whole map
pub fn set_door_group(grid: &mut GridStore, group: u16, open: bool) -> usize {
    let cells = all_cells(grid);
    apply(grid, cells, |door_group| door_group == group, open)
}

/// Open or close every door on the map
pub fn set_all_doors(grid: &mut GridStore, open: bool) -> usize {
    let cells = all_cells(grid);
    apply(grid, cells, |_| true, open)
}

/// Distinct door group ids present on the map
pub fn door_groups(grid: &GridStore) -> BTreeSet<u16> {
    grid.present_cells()
        .filter_map(|(_, _, cell)| cell.door().map(|(group, _)| group))
        .collect()
}

fn all_cells(grid: &GridStore) -> Vec<(usize, usize)> {
    let (width, height) = (grid.width(), grid.height());
    (0..height)
        .flat_map(|y| (0..width).map(move |x| (x, y)))
        .collect()
}

fn apply(
    grid: &mut GridStore,
    cells: Vec<(usize, usize)>,
    matches: impl Fn(u16) -> bool,
    open: bool,
) -> usize {
    let mut changed = 0;
    for (x, y) in cells {
        let Some((group, _)) = grid.cell_at(x, y).door() else {
            continue;
        };
        if matches(group) && grid.set_door_open(x, y, open) {
            changed += 1;
        }
    }
    changed
}
