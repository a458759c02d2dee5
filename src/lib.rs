//! Tile map storage engine with quad-tree layer compression
//!
//! A map is a rectangular grid with three parallel layers: ground flags,
//! base tiles and cell descriptors (objects, doors, light and events). The
//! engine loads, edits and serializes maps, compressing each layer with a
//! shared quad-tree encoder that prunes empty regions, and exposes a
//! read-only extraction API for renderers.

#![deny(unsafe_code)]

/// Input/output: error types, configuration, file formats and the CLI
pub mod io;
/// Grid store, cell records and map mutation
pub mod map;
/// Quad-tree compression, decompression and the archive format
pub mod quadtree;
/// Image lookup and the extraction façade used by renderers
pub mod render;

pub use io::error::{MapError, Result};
pub use map::tilemap::TileMap;
