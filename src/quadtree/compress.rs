//! Quad-tree encoder shared by all three layers
//!
//! The grid is covered by one square whose side is the smallest power of
//! two holding both dimensions. Blocks are visited in pre-order; an empty
//! block costs a single `false` bit, a non-empty block costs a `true` bit
//! followed by its four quadrants, and a leaf costs one bit plus its payload
//! token when non-default. Blocks partly outside the grid are clipped for
//! the emptiness scan but still traversed in full so the decoder stays in
//! lock-step.

use log::debug;

use crate::map::cell::CellDescriptor;
use crate::map::grid::{Block, GridStore};
use crate::quadtree::bitstream::PresenceBits;
use crate::quadtree::layer::{BaseTileLayer, CellLayer, GroundLayer, QuadLayer};

/// Presence bits plus payload tokens of one layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerStream<T> {
    /// One bit per visited block in pre-order
    pub presence: PresenceBits,
    /// One token per non-default leaf, in traversal order
    pub payload: Vec<T>,
}

impl<T> Default for LayerStream<T> {
    fn default() -> Self {
        Self {
            presence: PresenceBits::new(),
            payload: Vec::new(),
        }
    }
}

/// Compressed streams of all three layers
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompressedMap {
    /// Ground flags
    pub ground: LayerStream<u8>,
    /// Base tile tokens
    pub base_tiles: LayerStream<u32>,
    /// Cell descriptors
    pub cells: LayerStream<CellDescriptor>,
}

/// Root block covering a grid of the given size
pub const fn root_block(width: usize, height: usize) -> Block {
    let side = if width > height { width } else { height };
    Block::new(0, 0, side.next_power_of_two())
}

/// Compress one layer of a grid
pub fn compress_layer<L: QuadLayer>(grid: &GridStore) -> LayerStream<L::Token> {
    let mut stream = LayerStream::default();
    encode_block::<L>(grid, root_block(grid.width(), grid.height()), &mut stream);
    debug!(
        "{}: {} presence bits, {} payload tokens",
        L::NAME,
        stream.presence.len(),
        stream.payload.len()
    );
    stream
}

/// Compress all three layers of a grid
pub fn compress_grid(grid: &GridStore) -> CompressedMap {
    CompressedMap {
        ground: compress_layer::<GroundLayer>(grid),
        base_tiles: compress_layer::<BaseTileLayer>(grid),
        cells: compress_layer::<CellLayer>(grid),
    }
}

fn encode_block<L: QuadLayer>(grid: &GridStore, block: Block, stream: &mut LayerStream<L::Token>) {
    if block.size == 1 {
        let token = if grid.contains(block.x, block.y) {
            L::leaf(grid, block.x, block.y)
        } else {
            None
        };
        stream.presence.push(token.is_some());
        stream.payload.extend(token);
        return;
    }

    if !grid.overlaps(block) || L::block_empty(grid, block) {
        stream.presence.push(false);
        return;
    }

    stream.presence.push(true);
    for quadrant in block.quadrants() {
        encode_block::<L>(grid, quadrant, stream);
    }
}
