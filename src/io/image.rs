//! PNG preview export composed through the extraction façade

use image::{RgbaImage, imageops};

use crate::io::configuration::{CELL_HEIGHT, CELL_WIDTH, MAX_PREVIEW_PIXELS};
use crate::io::error::{MapError, Result, file_system, precondition};
use crate::map::tilemap::TileMap;
use crate::render::atlas::TileImageSource;
use crate::render::extract::{FnVisitor, TileExtractor, TilePlacement};

/// Compose base tiles, then object tiles, onto a transparent canvas
///
/// # Errors
///
/// Returns a precondition error if the map is not loaded or the canvas
/// would exceed [`MAX_PREVIEW_PIXELS`]
pub fn render_preview(map: &TileMap, images: &dyn TileImageSource) -> Result<RgbaImage> {
    if !map.valid() {
        return Err(precondition("render preview", &"map is not loaded"));
    }

    let width = map.width() * CELL_WIDTH;
    let height = map.height() * CELL_HEIGHT;
    let too_large = || {
        precondition(
            "render preview",
            &format!("{width}x{height} canvas exceeds {MAX_PREVIEW_PIXELS} pixels"),
        )
    };
    if width.saturating_mul(height) > MAX_PREVIEW_PIXELS {
        return Err(too_large());
    }
    let mut canvas = RgbaImage::new(
        u32::try_from(width).map_err(|_| too_large())?,
        u32::try_from(height).map_err(|_| too_large())?,
    );
    let extractor = TileExtractor::new(map, images);

    let mut blit = FnVisitor::new(
        |_, _| true,
        |placement: &TilePlacement<'_>| {
            imageops::overlay(
                &mut canvas,
                placement.image,
                i64::from(placement.screen_x),
                i64::from(placement.screen_y),
            );
        },
    );
    extractor.extract_base_tiles(&mut blit);
    extractor.extract_object_tiles(&mut blit);

    Ok(canvas)
}

/// Render a preview and save it as PNG, creating parent directories
///
/// # Errors
///
/// Returns an error if:
/// - The map is not loaded
/// - The parent directory cannot be created
/// - The image cannot be saved to the specified path
pub fn export_preview_png(
    map: &TileMap,
    images: &dyn TileImageSource,
    output_path: &std::path::Path,
) -> Result<()> {
    let canvas = render_preview(map, images)?;

    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| file_system(parent, "create directory", e))?;
    }

    canvas
        .save(output_path)
        .map_err(|source| MapError::ImageExport {
            path: output_path.to_path_buf(),
            source,
        })
}
