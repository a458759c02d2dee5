//! Map aggregate owning the header, grid layers and editing state
//!
//! Every public operation goes through [`TileMap`]. Loads replace the whole
//! map only after the input decoded completely, and a failed load leaves the
//! map empty and invalid. Resizes and door edits either apply in full or
//! leave the map untouched.

use std::fmt;

use log::info;

use crate::io::configuration::MAX_GRID_DIMENSION;
use crate::io::error::{Result, precondition};
use crate::io::legacy::{parse_legacy, write_legacy};
use crate::map::animation::AnimationClock;
use crate::map::cell::{BaseTile, CellDescriptor, DoorOffset, MapHeader};
use crate::map::door::{
    door_at, door_groups, door_image_offset, set_all_doors, set_door_group, set_door_near,
};
use crate::map::extension::{Anchor, calculate_extension, crop_grid, expand_grid};
use crate::map::grid::GridStore;
use crate::map::selection::SelectionGrid;
use crate::quadtree::compress::{CompressedMap, compress_grid};
use crate::quadtree::decompress::decompress_grid;
use crate::quadtree::stream::{decode_archive, encode_archive, is_archive};
use crate::render::atlas::TileImageSource;

/// Aggregate counts describing map contents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MapStats {
    /// Present cells
    pub ground_cells: usize,
    /// Decoration tiles across both object slots
    pub object_tiles: usize,
    /// Cells belonging to a door
    pub door_cells: usize,
    /// Distinct door groups
    pub door_groups: usize,
    /// Cells emitting light
    pub lights: usize,
    /// Cells triggering an event
    pub events: usize,
}

impl fmt::Display for MapStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ground cells: {}", self.ground_cells)?;
        writeln!(f, "object tiles: {}", self.object_tiles)?;
        writeln!(
            f,
            "doors:        {} cells in {} groups",
            self.door_cells, self.door_groups
        )?;
        writeln!(f, "lights:       {}", self.lights)?;
        writeln!(f, "events:       {}", self.events)
    }
}

/// Tile map with ground, base-tile and cell layers
#[derive(Debug, Clone)]
pub struct TileMap {
    header: MapHeader,
    grid: GridStore,
    valid: bool,
    clock: AnimationClock,
    selection: SelectionGrid,
}

impl Default for TileMap {
    fn default() -> Self {
        Self::invalid()
    }
}

impl TileMap {
    /// Create a valid map with every cell void
    ///
    /// # Errors
    ///
    /// Returns a precondition error if a dimension is zero or above
    /// [`MAX_GRID_DIMENSION`]
    pub fn new(width: usize, height: usize) -> Result<Self> {
        check_size("create map", width, height)?;
        Ok(Self::from_parts(MapHeader::new(width, height), GridStore::new(width, height)))
    }

    /// Empty map reporting `valid() == false`
    pub fn invalid() -> Self {
        Self {
            header: MapHeader::default(),
            grid: GridStore::new(0, 0),
            valid: false,
            clock: AnimationClock::default(),
            selection: SelectionGrid::new(0, 0),
        }
    }

    fn from_parts(mut header: MapHeader, grid: GridStore) -> Self {
        header.width = grid.width();
        header.height = grid.height();
        let selection = SelectionGrid::new(grid.width(), grid.height());
        Self {
            header,
            grid,
            valid: true,
            clock: AnimationClock::default(),
            selection,
        }
    }

    /// Build a map from a decoded archive
    ///
    /// # Errors
    ///
    /// Returns a format error if the archive is malformed
    pub fn from_archive(bytes: &[u8]) -> Result<Self> {
        let (header, compressed) = decode_archive(bytes)?;
        let grid = decompress_grid(header.width, header.height, &compressed)?;
        Ok(Self::from_parts(header, grid))
    }

    /// Build a map from a legacy fixed-layout file
    ///
    /// # Errors
    ///
    /// Returns a format error if the file is malformed
    pub fn from_legacy(bytes: &[u8]) -> Result<Self> {
        let (header, grid) = parse_legacy(bytes)?;
        Ok(Self::from_parts(header, grid))
    }

    /// Replace this map with a decoded archive or legacy file
    ///
    /// The format is chosen by the archive magic. On failure the map is
    /// reset to the invalid state.
    ///
    /// # Errors
    ///
    /// Returns a format error if the input is malformed
    pub fn load(&mut self, bytes: &[u8]) -> Result<()> {
        let loaded = if is_archive(bytes) {
            Self::from_archive(bytes)
        } else {
            Self::from_legacy(bytes)
        };
        // The caller's clock survives so shared animations stay in phase
        let clock = self.clock;
        let result = match loaded {
            Ok(map) => {
                info!(
                    "loaded {}x{} map '{}'",
                    map.width(),
                    map.height(),
                    map.header.description_text()
                );
                *self = map;
                Ok(())
            }
            Err(error) => {
                *self = Self::invalid();
                Err(error)
            }
        };
        self.clock = clock;
        result
    }

    /// Whether the map holds loaded contents
    pub const fn valid(&self) -> bool {
        self.valid
    }

    /// Width in cells
    pub fn width(&self) -> usize {
        self.grid.width()
    }

    /// Height in cells
    pub fn height(&self) -> usize {
        self.grid.height()
    }

    /// Header metadata; its dimensions always match the grid
    pub const fn header(&self) -> &MapHeader {
        &self.header
    }

    /// Replace descriptive metadata, keeping the dimensions
    pub fn set_metadata(&mut self, metadata: &MapHeader) {
        self.header = MapHeader {
            width: self.header.width,
            height: self.header.height,
            ..metadata.clone()
        };
    }

    /// Read-only view of the grid layers
    pub const fn grid(&self) -> &GridStore {
        &self.grid
    }

    fn ensure_valid(&self, operation: &'static str) -> Result<()> {
        if self.valid {
            Ok(())
        } else {
            Err(precondition(operation, &"map is not loaded"))
        }
    }

    /// Ground flag of a cell
    ///
    /// # Errors
    ///
    /// Returns a range error if (x, y) is outside the grid
    pub fn ground(&self, x: usize, y: usize) -> Result<bool> {
        self.grid.ground(x, y)
    }

    /// Base tile of a cell, `None` for void cells
    ///
    /// # Errors
    ///
    /// Returns a range error if (x, y) is outside the grid
    pub fn base_tile(&self, x: usize, y: usize) -> Result<Option<BaseTile>> {
        self.grid.base_tile(x, y)
    }

    /// Cell descriptor of a cell
    ///
    /// # Errors
    ///
    /// Returns a range error if (x, y) is outside the grid
    pub fn cell(&self, x: usize, y: usize) -> Result<CellDescriptor> {
        self.grid.cell(x, y)
    }

    /// Place or remove a base tile; removal voids the cell
    ///
    /// # Errors
    ///
    /// Returns a precondition error on an invalid map or a range error if
    /// (x, y) is outside the grid
    pub fn set_base_tile(&mut self, x: usize, y: usize, tile: Option<BaseTile>) -> Result<()> {
        self.ensure_valid("set base tile")?;
        self.grid.set_base_tile(x, y, tile)
    }

    /// Store a cell descriptor on a present cell
    ///
    /// # Errors
    ///
    /// Returns a precondition error on an invalid map, a void cell or a door
    /// cell whose open bit differs from its group, or a range error if
    /// (x, y) is outside the grid
    pub fn set_cell(&mut self, x: usize, y: usize, cell: CellDescriptor) -> Result<()> {
        self.ensure_valid("set cell descriptor")?;
        self.grid.set_cell(x, y, cell)
    }

    /// Compress all three layers
    ///
    /// # Errors
    ///
    /// Returns a precondition error if the map is not loaded
    pub fn compress(&self) -> Result<CompressedMap> {
        self.ensure_valid("compress map")?;
        Ok(compress_grid(&self.grid))
    }

    /// Replace the grid with decompressed layers of the current size
    ///
    /// # Errors
    ///
    /// Returns a precondition error on an invalid map or a format error if
    /// the streams do not replay exactly; the map is unchanged on error
    pub fn decompress(&mut self, compressed: &CompressedMap) -> Result<()> {
        self.ensure_valid("decompress map")?;
        self.grid = decompress_grid(self.width(), self.height(), compressed)?;
        Ok(())
    }

    /// Serialize to archive bytes
    ///
    /// # Errors
    ///
    /// Returns a precondition error if the map is not loaded
    pub fn to_archive(&self) -> Result<Vec<u8>> {
        let compressed = self.compress()?;
        let bytes = encode_archive(&self.header, &compressed);
        info!(
            "encoded {}x{} map into {} bytes",
            self.width(),
            self.height(),
            bytes.len()
        );
        Ok(bytes)
    }

    /// Serialize to the legacy fixed-layout format
    ///
    /// # Errors
    ///
    /// Returns a precondition error if the map is not loaded
    pub fn to_legacy(&self) -> Result<Vec<u8>> {
        self.ensure_valid("write legacy map")?;
        Ok(write_legacy(&self.header, &self.grid))
    }

    /// Grow the map, keeping contents at `anchor` and voiding new cells
    ///
    /// # Errors
    ///
    /// Returns a precondition error on an invalid map, when shrinking on
    /// either axis, or when a dimension exceeds [`MAX_GRID_DIMENSION`]
    pub fn expand(&mut self, width: usize, height: usize, anchor: Anchor) -> Result<()> {
        self.ensure_valid("expand map")?;
        check_size("expand map", width, height)?;
        let info = calculate_extension((self.width(), self.height()), (width, height), anchor)?;
        let grid = expand_grid(&self.grid, &info);
        self.replace_grid(grid);
        Ok(())
    }

    /// Keep only the rectangle at (x, y) of size width x height
    ///
    /// # Errors
    ///
    /// Returns a precondition error on an invalid map or a range error if
    /// the rectangle is empty or does not fit the grid
    pub fn crop(&mut self, x: usize, y: usize, width: usize, height: usize) -> Result<()> {
        self.ensure_valid("crop map")?;
        let grid = crop_grid(&self.grid, x, y, width, height)?;
        self.replace_grid(grid);
        Ok(())
    }

    fn replace_grid(&mut self, grid: GridStore) {
        self.header.width = grid.width();
        self.header.height = grid.height();
        self.selection = SelectionGrid::new(grid.width(), grid.height());
        self.grid = grid;
    }

    /// Door group and state of a cell
    ///
    /// # Errors
    ///
    /// Returns a range error if (x, y) is outside the grid
    pub fn door(&self, x: usize, y: usize) -> Result<Option<(u16, DoorOffset)>> {
        door_at(&self.grid, x, y)
    }

    /// Image offset for the door object at a cell, 0 unless an open door
    ///
    /// # Errors
    ///
    /// Returns a range error if (x, y) is outside the grid
    pub fn door_image_offset(&self, x: usize, y: usize) -> Result<u8> {
        door_image_offset(&self.grid, x, y)
    }

    /// Open the door `group` near (x, y), returning the cells changed
    ///
    /// # Errors
    ///
    /// Returns a precondition error on an invalid map or a range error if
    /// (x, y) is outside the grid
    pub fn open_door(&mut self, x: usize, y: usize, group: u16) -> Result<usize> {
        self.ensure_valid("open door")?;
        set_door_near(&mut self.grid, x, y, group, true)
    }

    /// Close the door `group` near (x, y), returning the cells changed
    ///
    /// # Errors
    ///
    /// Returns a precondition error on an invalid map or a range error if
    /// (x, y) is outside the grid
    pub fn close_door(&mut self, x: usize, y: usize, group: u16) -> Result<usize> {
        self.ensure_valid("close door")?;
        set_door_near(&mut self.grid, x, y, group, false)
    }

    /// Open every cell of a door group across the map
    pub fn open_door_group(&mut self, group: u16) -> usize {
        set_door_group(&mut self.grid, group, true)
    }

    /// Close every cell of a door group across the map
    pub fn close_door_group(&mut self, group: u16) -> usize {
        set_door_group(&mut self.grid, group, false)
    }

    /// Open every door
    pub fn open_all_doors(&mut self) -> usize {
        set_all_doors(&mut self.grid, true)
    }

    /// Close every door
    pub fn close_all_doors(&mut self) -> usize {
        set_all_doors(&mut self.grid, false)
    }

    /// Animation clock driving object frames
    pub const fn clock(&self) -> AnimationClock {
        self.clock
    }

    /// Share a clock value with other maps
    pub const fn set_clock(&mut self, clock: AnimationClock) {
        self.clock = clock;
    }

    /// Advance animations by one update tick
    pub const fn advance_animation(&mut self, delta_ms: u64) {
        self.clock.advance(delta_ms);
    }

    /// Active frame of the object in `slot` at (x, y), 0 if not animated
    ///
    /// # Errors
    ///
    /// Returns a range error if (x, y) is outside the grid
    pub fn object_frame(&self, x: usize, y: usize, slot: usize) -> Result<u16> {
        Ok(self
            .grid
            .cell(x, y)?
            .object(slot)
            .map_or(0, |(_, _, anim)| self.clock.frame(anim)))
    }

    /// Editing selection markers
    pub const fn selection(&self) -> &SelectionGrid {
        &self.selection
    }

    /// Mutable editing selection markers
    pub const fn selection_mut(&mut self) -> &mut SelectionGrid {
        &mut self.selection
    }

    /// Drop tile references whose image the source cannot provide
    ///
    /// Present cells with a missing base tile image become void. Returns
    /// the number of references removed.
    ///
    /// # Errors
    ///
    /// Returns a precondition error if the map is not loaded
    pub fn optimize(&mut self, images: &dyn TileImageSource) -> Result<usize> {
        self.ensure_valid("optimize map")?;
        let mut grid = self.grid.clone();
        let mut removed = 0;
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                removed += optimize_cell(&mut grid, x, y, images)?;
            }
        }
        self.grid = grid;
        info!("optimize removed {removed} tile references");
        Ok(removed)
    }

    /// Aggregate counts of map contents
    pub fn stats(&self) -> MapStats {
        let mut stats = MapStats {
            ground_cells: self.grid.ground_count(),
            door_groups: door_groups(&self.grid).len(),
            ..MapStats::default()
        };
        for (_, _, cell) in self.grid.present_cells() {
            stats.object_tiles += (0..2).filter(|&slot| cell.object(slot).is_some()).count();
            stats.door_cells += usize::from(cell.door().is_some());
            stats.lights += usize::from(cell.light().is_some());
            stats.events += usize::from(cell.event().is_some());
        }
        stats
    }

    /// Printable multi-line summary
    pub fn map_info(&self) -> String {
        if !self.valid {
            return "invalid map\n".to_string();
        }
        format!(
            "description:  {}\n\
             size:         {}x{}\n\
             attributes:   {:#06x}\n\
             event file:   {}\n\
             fog color:    {}\n\
             {}",
            self.header.description_text(),
            self.width(),
            self.height(),
            self.header.attributes,
            self.header.event_file_index,
            self.header.fog_color,
            self.stats()
        )
    }
}

fn check_size(operation: &'static str, width: usize, height: usize) -> Result<()> {
    if width == 0 || height == 0 || width > MAX_GRID_DIMENSION || height > MAX_GRID_DIMENSION {
        return Err(precondition(
            operation,
            &format!("dimensions {width}x{height} outside 1..={MAX_GRID_DIMENSION}"),
        ));
    }
    Ok(())
}

fn optimize_cell(
    grid: &mut GridStore,
    x: usize,
    y: usize,
    images: &dyn TileImageSource,
) -> Result<usize> {
    let Some(tile) = grid.base_tile(x, y)? else {
        return Ok(0);
    };
    let mut removed = 0;
    if images
        .lookup(u32::from(tile.file_index), u32::from(tile.tile_index))
        .is_none()
    {
        let cell = grid.cell(x, y)?;
        grid.set_ground(x, y, false)?;
        return Ok(1 + (0..2).filter(|&slot| cell.object(slot).is_some()).count());
    }

    let mut cell = grid.cell(x, y)?;
    for slot in 0..2 {
        if let Some((file_index, tile_index, _)) = cell.object(slot)
            && images
                .lookup(u32::from(file_index), u32::from(tile_index))
                .is_none()
        {
            cell.clear_object(slot);
            removed += 1;
        }
    }
    grid.set_cell(x, y, cell)?;
    Ok(removed)
}
