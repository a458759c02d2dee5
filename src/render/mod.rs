//! Rendering-facing lookups
//!
//! The map never decodes or composites images itself; it hands renderers
//! tile indices and placements through the extraction façade.

/// Tile image lookup and an in-memory atlas
pub mod atlas;
/// Visitor-driven extraction of drawable tiles
pub mod extract;
