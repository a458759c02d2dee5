//! Tile image lookup keyed by (file index, tile index)
//!
//! The map never decodes images; renderers hand it a [`TileImageSource`]
//! that is shared read-only across every map drawn with it.

use std::collections::HashMap;
use std::path::Path;

use image::RgbaImage;
use log::{debug, warn};

use crate::io::error::{MapError, Result, file_system};

/// Read-only image lookup used for extraction and optimization
pub trait TileImageSource {
    /// Image of a tile, `None` when the package has no such tile
    fn lookup(&self, file_index: u32, tile_index: u32) -> Option<&RgbaImage>;
}

/// In-memory image table
#[derive(Debug, Clone, Default)]
pub struct TileAtlas {
    images: HashMap<(u32, u32), RgbaImage>,
}

impl TileAtlas {
    /// Create an empty atlas
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a tile image
    pub fn insert(&mut self, file_index: u32, tile_index: u32, image: RgbaImage) {
        self.images.insert((file_index, tile_index), image);
    }

    /// Number of images held
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Whether the atlas holds no image
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Load every `<file>_<tile>.png` in a directory
    ///
    /// Files whose names do not follow the pattern are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read or a matching file
    /// fails to decode
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let mut atlas = Self::new();
        let entries = std::fs::read_dir(dir).map_err(|e| file_system(dir, "read directory", e))?;
        for entry in entries {
            let path = entry.map_err(|e| file_system(dir, "read directory entry", e))?.path();
            let Some((file_index, tile_index)) = parse_tile_name(&path) else {
                debug!("skipping non-tile file {}", path.display());
                continue;
            };
            let image = image::open(&path)
                .map_err(|source| MapError::ImageLoad {
                    path: path.clone(),
                    source,
                })?
                .into_rgba8();
            atlas.insert(file_index, tile_index, image);
        }
        if atlas.is_empty() {
            warn!("no tile images found in {}", dir.display());
        }
        Ok(atlas)
    }
}

impl TileImageSource for TileAtlas {
    fn lookup(&self, file_index: u32, tile_index: u32) -> Option<&RgbaImage> {
        self.images.get(&(file_index, tile_index))
    }
}

/// Parse `<file>_<tile>.png` into its indices
pub fn parse_tile_name(path: &Path) -> Option<(u32, u32)> {
    if path.extension().and_then(|ext| ext.to_str()) != Some("png") {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    let (file, tile) = stem.split_once('_')?;
    Some((file.parse().ok()?, tile.parse().ok()?))
}
