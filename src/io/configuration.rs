//! Format constants and runtime configuration defaults

// Screen geometry of one grid cell
/// Width of a cell in pixels
pub const CELL_WIDTH: usize = 48;
/// Height of a cell in pixels
pub const CELL_HEIGHT: usize = 32;

// Animation timing shared by every map driven from the same clock
/// Frame period of animation speed class 0 in milliseconds
pub const ANIMATION_BASE_PERIOD_MS: u64 = 100;
/// Extra frame period added per animation speed class in milliseconds
pub const ANIMATION_PERIOD_STEP_MS: u64 = 50;
/// Number of animation speed classes encoded in an animation byte
pub const ANIMATION_SPEED_CLASSES: u8 = 8;
/// Maximum number of frames an animated tile may cycle through
pub const MAX_ANIMATION_FRAMES: u8 = 16;

/// Half-width of the square searched when toggling a door around a cell
pub const DOOR_SEARCH_RADIUS: usize = 8;

// Quad-tree archive layout
/// Leading bytes of a quad-tree map archive
pub const ARCHIVE_MAGIC: [u8; 4] = *b"QMAP";
/// Archive format version written by this crate
pub const ARCHIVE_VERSION: u16 = 1;
/// Size of the description field in headers
pub const DESCRIPTION_LEN: usize = 20;

// Legacy fixed-layout map files
/// Size of the legacy file header including reserved bytes
pub const LEGACY_HEADER_LEN: usize = 52;
/// Tile index marking a void cell in legacy tile records
pub const LEGACY_VOID_TILE: u16 = 0xFFFF;

// Safety limit to prevent excessive memory allocation
/// Maximum allowed grid dimension
pub const MAX_GRID_DIMENSION: usize = 4096;

/// Largest preview canvas in pixels, 512 MiB of RGBA
pub const MAX_PREVIEW_PIXELS: usize = 1 << 27;

// Progress bar display settings
/// Threshold for switching to batch progress mode
pub const MAX_INDIVIDUAL_PROGRESS_BARS: usize = 5;

// Output settings
/// Extension of legacy map files picked up by batch commands
pub const LEGACY_EXTENSION: &str = "map";
/// Extension of quad-tree archives
pub const ARCHIVE_EXTENSION: &str = "qmap";
