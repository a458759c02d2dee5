//! Quad-tree decoder replaying the encoder's traversal
//!
//! Layers decode in a fixed order (ground, base tiles, cells) into a fresh
//! grid, so the base-tile and cell layers can be checked against the ground
//! flags already in place. Any disagreement between presence bits, payload
//! and earlier layers is a format error; the partially filled grid is
//! dropped and never reaches the caller.

use log::debug;

use crate::io::error::{Result, WithContext, format_error};
use crate::map::grid::{Block, GridStore};
use crate::quadtree::bitstream::{PayloadReader, PresenceReader};
use crate::quadtree::compress::{CompressedMap, LayerStream, root_block};
use crate::quadtree::layer::{BaseTileLayer, CellLayer, GroundLayer, QuadLayer};

/// Decode one layer into `grid`
///
/// # Errors
///
/// Returns a format error if the presence bits or payload tokens run out,
/// are left over, or contradict the layers already in `grid`
pub fn decompress_layer<L: QuadLayer>(
    grid: &mut GridStore,
    stream: &LayerStream<L::Token>,
) -> Result<()> {
    let mut bits = PresenceReader::new(&stream.presence);
    let mut tokens = PayloadReader::new(&stream.payload);
    let root = root_block(grid.width(), grid.height());

    decode_block::<L>(grid, root, &mut bits, &mut tokens).with_operation(L::NAME)?;
    bits.finish().with_operation(L::NAME)?;
    tokens.finish().with_operation(L::NAME)?;

    debug!(
        "{}: replayed {} presence bits, {} payload tokens",
        L::NAME,
        stream.presence.len(),
        stream.payload.len()
    );
    Ok(())
}

/// Rebuild a grid of the given size from all three layer streams
///
/// # Errors
///
/// Returns a format error if any layer fails to replay exactly
pub fn decompress_grid(width: usize, height: usize, map: &CompressedMap) -> Result<GridStore> {
    let mut grid = GridStore::new(width, height);
    decompress_layer::<GroundLayer>(&mut grid, &map.ground)?;
    decompress_layer::<BaseTileLayer>(&mut grid, &map.base_tiles)?;
    decompress_layer::<CellLayer>(&mut grid, &map.cells)?;
    Ok(grid)
}

// Returns whether the block produced at least one payload token
fn decode_block<L: QuadLayer>(
    grid: &mut GridStore,
    block: Block,
    bits: &mut PresenceReader<'_>,
    tokens: &mut PayloadReader<'_, L::Token>,
) -> Result<bool> {
    let present = bits.next_bit()?;

    if !present {
        if grid.overlaps(block) && !L::block_empty(grid, block) {
            return Err(format_error(
                L::NAME,
                &format!(
                    "block {}x{} at ({}, {}) marked empty but holds present cells",
                    block.size, block.size, block.x, block.y
                ),
            ));
        }
        return Ok(false);
    }

    if !grid.overlaps(block) {
        return Err(format_error(
            L::NAME,
            &format!(
                "presence set for block at ({}, {}) outside the grid",
                block.x, block.y
            ),
        ));
    }

    if block.size == 1 {
        let token = tokens.next_token()?;
        L::store(grid, block.x, block.y, token)?;
        return Ok(true);
    }

    let mut any = false;
    for quadrant in block.quadrants() {
        any |= decode_block::<L>(grid, quadrant, bits, tokens)?;
    }
    if !any {
        return Err(format_error(
            L::NAME,
            &format!(
                "block {}x{} at ({}, {}) marked present but carries no payload",
                block.size, block.size, block.x, block.y
            ),
        ));
    }
    Ok(true)
}
