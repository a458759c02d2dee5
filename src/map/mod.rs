//! Map storage and mutation
//!
//! This module contains the grid-facing functionality:
//! - Cell records and the map header
//! - The three-layer grid store
//! - Resizing, door edits and animation timing
//! - The map aggregate tying them together

/// Deterministic animation frame selection
pub mod animation;
/// Per-cell records and the map header
pub mod cell;
/// Door state edits
pub mod door;
/// Grid expansion and cropping
pub mod extension;
/// Three-layer grid store
pub mod grid;
/// Transient editing selection
pub mod selection;
/// Map aggregate owning every layer
pub mod tilemap;

pub use grid::GridStore;
pub use tilemap::TileMap;
