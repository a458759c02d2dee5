//! Read-only extraction of drawable tile references
//!
//! Cells are visited in row-major order (y outer, x inner); within a cell
//! object 1 comes before object 2. Visitors only see the map through shared
//! borrows, so a callback can never mutate the map it is reading.

use image::RgbaImage;

use crate::io::configuration::{CELL_HEIGHT, CELL_WIDTH};
use crate::io::error::Result;
use crate::map::tilemap::TileMap;
use crate::render::atlas::TileImageSource;

/// Screen placement of one tile image
#[derive(Debug, Clone, Copy)]
pub struct TilePlacement<'a> {
    /// Source image
    pub image: &'a RgbaImage,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Left edge on screen in pixels
    pub screen_x: i32,
    /// Top edge on screen in pixels
    pub screen_y: i32,
    /// Left edge of the drawn area inside the source image
    pub src_x: u32,
    /// Top edge of the drawn area inside the source image
    pub src_y: u32,
    /// Image package of the tile
    pub file_index: u32,
    /// Resolved tile index, animation frame and door offset included
    pub tile_index: u32,
}

/// Receives tile placements during extraction
pub trait TileVisitor {
    /// Whether the tile should be visited at all
    fn should_visit(&mut self, file_index: u32, tile_index: u32) -> bool;

    /// Handle one placed tile
    fn visit(&mut self, placement: &TilePlacement<'_>);
}

/// Visitor assembled from a predicate closure and a visit closure
pub struct FnVisitor<P, V> {
    predicate: P,
    visit: V,
}

impl<P, V> FnVisitor<P, V>
where
    P: FnMut(u32, u32) -> bool,
    V: FnMut(&TilePlacement<'_>),
{
    /// Combine a predicate and a visit callback
    pub const fn new(predicate: P, visit: V) -> Self {
        Self { predicate, visit }
    }
}

impl<P, V> TileVisitor for FnVisitor<P, V>
where
    P: FnMut(u32, u32) -> bool,
    V: FnMut(&TilePlacement<'_>),
{
    fn should_visit(&mut self, file_index: u32, tile_index: u32) -> bool {
        (self.predicate)(file_index, tile_index)
    }

    fn visit(&mut self, placement: &TilePlacement<'_>) {
        (self.visit)(placement);
    }
}

/// Rectangle of cells to draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// Left column
    pub x: usize,
    /// Top row
    pub y: usize,
    /// Width in cells
    pub width: usize,
    /// Height in cells
    pub height: usize,
}

impl Viewport {
    /// Viewport covering a whole map
    pub fn full(map: &TileMap) -> Self {
        Self {
            x: 0,
            y: 0,
            width: map.width(),
            height: map.height(),
        }
    }

    fn cells(self, map: &TileMap) -> impl Iterator<Item = (usize, usize)> + use<> {
        let x_end = self.x.saturating_add(self.width).min(map.width());
        let y_end = self.y.saturating_add(self.height).min(map.height());
        let x_start = self.x;
        (self.y..y_end).flat_map(move |y| (x_start..x_end).map(move |x| (x, y)))
    }
}

/// Extraction façade over a map and a shared image source
pub struct TileExtractor<'a> {
    map: &'a TileMap,
    images: &'a dyn TileImageSource,
}

impl<'a> TileExtractor<'a> {
    /// Borrow a map and image source for extraction
    pub const fn new(map: &'a TileMap, images: &'a dyn TileImageSource) -> Self {
        Self { map, images }
    }

    /// Visit the base tile of every cell
    pub fn extract_base_tiles(&self, visitor: &mut dyn TileVisitor) -> usize {
        self.draw_base_tiles(Viewport::full(self.map), visitor)
    }

    /// Visit every object tile
    pub fn extract_object_tiles(&self, visitor: &mut dyn TileVisitor) -> usize {
        self.draw_object_tiles(Viewport::full(self.map), visitor)
    }

    /// Visit base tiles inside a viewport, returning how many were visited
    pub fn draw_base_tiles(&self, viewport: Viewport, visitor: &mut dyn TileVisitor) -> usize {
        viewport
            .cells(self.map)
            .filter(|&(x, y)| self.base_tile_at(x, y, visitor))
            .count()
    }

    /// Visit object tiles inside a viewport, returning how many were visited
    pub fn draw_object_tiles(&self, viewport: Viewport, visitor: &mut dyn TileVisitor) -> usize {
        viewport
            .cells(self.map)
            .map(|(x, y)| self.object_tiles_at(x, y, visitor))
            .sum()
    }

    /// Visit the base tile of one cell, returning whether it was visited
    ///
    /// # Errors
    ///
    /// Returns a range error if (x, y) is outside the grid
    pub fn extract_one_base_tile(
        &self,
        x: usize,
        y: usize,
        visitor: &mut dyn TileVisitor,
    ) -> Result<bool> {
        self.map.cell(x, y)?;
        Ok(self.base_tile_at(x, y, visitor))
    }

    /// Visit the object tiles of one cell, returning how many were visited
    ///
    /// # Errors
    ///
    /// Returns a range error if (x, y) is outside the grid
    pub fn extract_one_object_tile(
        &self,
        x: usize,
        y: usize,
        visitor: &mut dyn TileVisitor,
    ) -> Result<usize> {
        self.map.cell(x, y)?;
        Ok(self.object_tiles_at(x, y, visitor))
    }

    /// Report the ground flag of every cell as (present, x, y)
    pub fn extract_ground_info(&self, mut callback: impl FnMut(bool, usize, usize)) {
        for (x, y) in Viewport::full(self.map).cells(self.map) {
            callback(self.map.grid().ground_at(x, y), x, y);
        }
    }

    fn base_tile_at(&self, x: usize, y: usize, visitor: &mut dyn TileVisitor) -> bool {
        let Ok(Some(tile)) = self.map.base_tile(x, y) else {
            return false;
        };
        let (file_index, tile_index) = (u32::from(tile.file_index), u32::from(tile.tile_index));
        if !visitor.should_visit(file_index, tile_index) {
            return false;
        }
        let Some(image) = self.images.lookup(file_index, tile_index) else {
            return false;
        };
        visitor.visit(&TilePlacement {
            image,
            width: image.width(),
            height: image.height(),
            screen_x: (x * CELL_WIDTH) as i32,
            screen_y: (y * CELL_HEIGHT) as i32,
            src_x: 0,
            src_y: 0,
            file_index,
            tile_index,
        });
        true
    }

    fn object_tiles_at(&self, x: usize, y: usize, visitor: &mut dyn TileVisitor) -> usize {
        let Ok(cell) = self.map.cell(x, y) else {
            return 0;
        };
        let door_offset = self.map.door_image_offset(x, y).unwrap_or(0);
        let mut visited = 0;
        for slot in 0..2 {
            let Some((file, object, anim)) = cell.object(slot) else {
                continue;
            };
            let mut tile_index = u32::from(object) + u32::from(self.map.clock().frame(anim));
            if slot == 0 {
                tile_index += u32::from(door_offset);
            }
            let file_index = u32::from(file);
            if !visitor.should_visit(file_index, tile_index) {
                continue;
            }
            let Some(image) = self.images.lookup(file_index, tile_index) else {
                continue;
            };
            // Objects stand on the bottom edge of their cell
            let bottom = ((y + 1) * CELL_HEIGHT) as i32;
            visitor.visit(&TilePlacement {
                image,
                width: image.width(),
                height: image.height(),
                screen_x: (x * CELL_WIDTH) as i32,
                screen_y: bottom - image.height() as i32,
                src_x: 0,
                src_y: 0,
                file_index,
                tile_index,
            });
            visited += 1;
        }
        visited
    }
}
