//! Layer-specific predicates and payload codecs for the shared traversal
//!
//! Base-tile and cell layers only ever encode cells whose ground flag is
//! set, so their emptiness tests agree with the ground layer and a void cell
//! never produces payload in any layer.

use std::fmt::Debug;

use crate::io::error::{Result, format_error};
use crate::map::cell::{BaseTile, CellDescriptor};
use crate::map::grid::{Block, GridStore};

/// One grid layer as seen by the quad-tree encoder and decoder
pub trait QuadLayer {
    /// Payload token emitted per non-default leaf
    type Token: Copy + PartialEq + Debug;

    /// Layer name used in error messages and logs
    const NAME: &'static str;

    /// Encoded token size in bytes
    const TOKEN_SIZE: usize;

    /// Payload of an in-bounds cell, `None` when the cell is default
    fn leaf(grid: &GridStore, x: usize, y: usize) -> Option<Self::Token>;

    /// Whether no in-bounds cell of the block produces payload
    fn block_empty(grid: &GridStore, block: Block) -> bool;

    /// Assign a decoded token to a cell
    ///
    /// # Errors
    ///
    /// Returns a format error if the token is invalid for this layer or
    /// contradicts layers decoded earlier
    fn store(grid: &mut GridStore, x: usize, y: usize, token: Self::Token) -> Result<()>;

    /// Append the token's fixed-width encoding
    fn write_token(token: &Self::Token, out: &mut Vec<u8>);

    /// Decode a token from exactly [`Self::TOKEN_SIZE`] bytes
    ///
    /// # Errors
    ///
    /// Returns a format error if the bytes are too short
    fn read_token(bytes: &[u8]) -> Result<Self::Token>;
}

/// Ground flags; the payload byte is always 1
#[derive(Debug, Clone, Copy)]
pub struct GroundLayer;

/// Base tiles of present cells as packed 32-bit tokens
#[derive(Debug, Clone, Copy)]
pub struct BaseTileLayer;

/// Non-default cell descriptors of present cells
#[derive(Debug, Clone, Copy)]
pub struct CellLayer;

const GROUND_TOKEN: u8 = 1;

impl QuadLayer for GroundLayer {
    type Token = u8;

    const NAME: &'static str = "ground layer";
    const TOKEN_SIZE: usize = 1;

    fn leaf(grid: &GridStore, x: usize, y: usize) -> Option<u8> {
        grid.ground_at(x, y).then_some(GROUND_TOKEN)
    }

    fn block_empty(grid: &GridStore, block: Block) -> bool {
        grid.ground_block_empty(block)
    }

    fn store(grid: &mut GridStore, x: usize, y: usize, token: u8) -> Result<()> {
        if token != GROUND_TOKEN {
            return Err(format_error(
                Self::NAME,
                &format!("ground token {token} at ({x}, {y}) is not {GROUND_TOKEN}"),
            ));
        }
        grid.set_ground(x, y, true)
    }

    fn write_token(token: &u8, out: &mut Vec<u8>) {
        out.push(*token);
    }

    fn read_token(bytes: &[u8]) -> Result<u8> {
        bytes
            .first()
            .copied()
            .ok_or_else(|| format_error(Self::NAME, &"missing ground token"))
    }
}

impl QuadLayer for BaseTileLayer {
    type Token = u32;

    const NAME: &'static str = "base tile layer";
    const TOKEN_SIZE: usize = 4;

    fn leaf(grid: &GridStore, x: usize, y: usize) -> Option<u32> {
        grid.ground_at(x, y)
            .then(|| grid.tile_at(x, y).to_token())
    }

    fn block_empty(grid: &GridStore, block: Block) -> bool {
        grid.ground_block_empty(block)
    }

    fn store(grid: &mut GridStore, x: usize, y: usize, token: u32) -> Result<()> {
        if !grid.ground_at(x, y) {
            return Err(format_error(
                Self::NAME,
                &format!("tile payload for void cell ({x}, {y})"),
            ));
        }
        grid.set_base_tile(x, y, Some(BaseTile::from_token(token)?))
    }

    fn write_token(token: &u32, out: &mut Vec<u8>) {
        out.extend_from_slice(&token.to_le_bytes());
    }

    fn read_token(bytes: &[u8]) -> Result<u32> {
        bytes
            .get(..Self::TOKEN_SIZE)
            .and_then(|slice| slice.try_into().ok())
            .map(u32::from_le_bytes)
            .ok_or_else(|| format_error(Self::NAME, &"truncated tile token"))
    }
}

impl QuadLayer for CellLayer {
    type Token = CellDescriptor;

    const NAME: &'static str = "cell layer";
    const TOKEN_SIZE: usize = CellDescriptor::ENCODED_LEN;

    fn leaf(grid: &GridStore, x: usize, y: usize) -> Option<CellDescriptor> {
        if !grid.ground_at(x, y) {
            return None;
        }
        let cell = grid.cell_at(x, y);
        (!cell.is_default()).then_some(cell)
    }

    fn block_empty(grid: &GridStore, block: Block) -> bool {
        grid.cell_block_empty(block)
    }

    fn store(grid: &mut GridStore, x: usize, y: usize, token: CellDescriptor) -> Result<()> {
        if token.flags.has_unknown() {
            return Err(format_error(
                Self::NAME,
                &format!(
                    "unknown flag bits {:#04x} at ({x}, {y})",
                    token.flags.bits()
                ),
            ));
        }
        // Fields not covered by a flag bit are never trusted
        let cell = token.normalized();
        if cell.is_default() {
            return Err(format_error(
                Self::NAME,
                &format!("empty descriptor emitted for ({x}, {y})"),
            ));
        }
        if !grid.ground_at(x, y) {
            return Err(format_error(
                Self::NAME,
                &format!("descriptor payload for void cell ({x}, {y})"),
            ));
        }
        if let Some((group, offset)) = cell.door()
            && grid
                .door_state(group)
                .is_some_and(|open| open != offset.is_open())
        {
            return Err(format_error(
                Self::NAME,
                &format!("door group {group} both open and closed at ({x}, {y})"),
            ));
        }
        grid.set_cell(x, y, cell)
    }

    fn write_token(token: &CellDescriptor, out: &mut Vec<u8>) {
        token.write_to(out);
    }

    fn read_token(bytes: &[u8]) -> Result<CellDescriptor> {
        CellDescriptor::read_from(bytes)
    }
}
