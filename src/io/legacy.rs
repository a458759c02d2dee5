//! Reader and writer for the legacy fixed-layout map file
//!
//! ```text
//! header  52 bytes: description [u8; 20], attributes u16, width i16,
//!         height i16, event_file u8, fog_color u8, 24 reserved bytes
//! tiles   width * height records, row major: file u8, tile u16
//! cells   width * height records, row major, 14-byte cell descriptors
//! ```
//!
//! A tile record whose tile index is `0xFFFF` marks a void cell.

use log::warn;

use crate::io::configuration::{DESCRIPTION_LEN, LEGACY_HEADER_LEN, LEGACY_VOID_TILE};
use crate::io::error::Result;
use crate::map::cell::{BaseTile, CellDescriptor, CellFlags, MapHeader};
use crate::map::grid::GridStore;
use crate::quadtree::stream::{ByteReader, check_dimensions};

const TILE_RECORD_LEN: usize = 3;
const RESERVED_LEN: usize = LEGACY_HEADER_LEN - DESCRIPTION_LEN - 8;

/// Parse a legacy map file into its header and populated grid
///
/// Unknown flag bits are masked and descriptors normalized. Descriptors on
/// void cells are dropped, and door cells take the open state of the first
/// cell read in their group.
///
/// # Errors
///
/// Returns a format error if the header is malformed, the dimensions are
/// invalid, or the record sections are truncated or followed by extra bytes
pub fn parse_legacy(bytes: &[u8]) -> Result<(MapHeader, GridStore)> {
    let mut reader = ByteReader::new(bytes, "legacy map");

    let description = reader.array::<DESCRIPTION_LEN>()?;
    let attributes = reader.u16()?;
    let raw_width = reader.i16()?;
    let raw_height = reader.i16()?;
    let width = usize::try_from(raw_width).unwrap_or(0);
    let height = usize::try_from(raw_height).unwrap_or(0);
    check_dimensions("legacy map", width, height)?;
    let header = MapHeader {
        description,
        attributes,
        width,
        height,
        event_file_index: reader.u8()?,
        fog_color: reader.u8()?,
    };
    reader.take(RESERVED_LEN)?;

    let mut grid = GridStore::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let file_index = reader.u8()?;
            let tile_index = reader.u16()?;
            if tile_index != LEGACY_VOID_TILE {
                grid.set_base_tile(x, y, Some(BaseTile::new(file_index, tile_index)))?;
            }
        }
    }

    let mut dropped = 0_usize;
    let mut realigned = 0_usize;
    for y in 0..height {
        for x in 0..width {
            let mut cell = CellDescriptor::read_from(reader.take(CellDescriptor::ENCODED_LEN)?)?;
            cell.flags = CellFlags::from_bits_truncate(cell.flags.bits());
            let mut cell = cell.normalized();
            if cell.is_default() {
                continue;
            }
            if grid.ground(x, y)? {
                // The first cell read decides the open state of its door group
                if let Some((group, offset)) = cell.door()
                    && let Some(open) = grid.door_state(group)
                    && open != offset.is_open()
                {
                    cell.door_offset = offset.with_open(open);
                    realigned += 1;
                }
                grid.set_cell(x, y, cell)?;
            } else {
                dropped += 1;
            }
        }
    }
    reader.finish()?;

    if dropped > 0 {
        warn!("dropped {dropped} cell descriptors placed on void cells");
    }
    if realigned > 0 {
        warn!("aligned {realigned} door cells with the open state of their group");
    }
    Ok((header, grid))
}

/// Serialize a header and grid in the legacy layout
///
/// Present cells whose tile index is `0xFFFF` cannot be represented and
/// read back as void.
pub fn write_legacy(header: &MapHeader, grid: &GridStore) -> Vec<u8> {
    let cell_count = grid.width() * grid.height();
    let mut out = Vec::with_capacity(
        LEGACY_HEADER_LEN + cell_count * (TILE_RECORD_LEN + CellDescriptor::ENCODED_LEN),
    );

    out.extend_from_slice(&header.description);
    out.extend_from_slice(&header.attributes.to_le_bytes());
    out.extend_from_slice(&(grid.width() as i16).to_le_bytes());
    out.extend_from_slice(&(grid.height() as i16).to_le_bytes());
    out.push(header.event_file_index);
    out.push(header.fog_color);
    out.resize(LEGACY_HEADER_LEN, 0);

    for y in 0..grid.height() {
        for x in 0..grid.width() {
            let tile = if grid.ground_at(x, y) {
                grid.tile_at(x, y)
            } else {
                BaseTile::new(0, LEGACY_VOID_TILE)
            };
            out.push(tile.file_index);
            out.extend_from_slice(&tile.tile_index.to_le_bytes());
        }
    }
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            grid.cell_at(x, y).write_to(&mut out);
        }
    }
    out
}
