//! Tests for tile image lookup and directory loading

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};
    use quadmap::render::atlas::{TileAtlas, TileImageSource, parse_tile_name};
    use std::fs;
    use std::path::Path;

    // Tests tile names parse into file and tile indices
    // Verified by swapping the two indices
    #[test]
    fn test_parse_tile_name() {
        assert_eq!(parse_tile_name(Path::new("tiles/3_120.png")), Some((3, 120)));
        assert_eq!(parse_tile_name(Path::new("3_120.jpg")), None);
        assert_eq!(parse_tile_name(Path::new("grass.png")), None);
        assert_eq!(parse_tile_name(Path::new("a_1.png")), None);
    }

    // Tests insertion and lookup by index pair
    // Verified by keying on the tile index only
    #[test]
    fn test_insert_and_lookup() {
        let mut atlas = TileAtlas::new();
        assert!(atlas.is_empty());

        atlas.insert(1, 4, RgbaImage::new(48, 32));
        atlas.insert(2, 4, RgbaImage::new(48, 64));

        assert_eq!(atlas.len(), 2);
        assert_eq!(atlas.lookup(2, 4).map(RgbaImage::height), Some(64));
        assert!(atlas.lookup(4, 1).is_none());
    }

    // Tests directory loading picks up matching PNGs only
    // Verified by loading every file in the directory
    #[test]
    fn test_load_dir() {
        let dir = tempfile::tempdir().unwrap();
        RgbaImage::from_pixel(48, 32, Rgba([1, 2, 3, 255]))
            .save(dir.path().join("0_7.png"))
            .unwrap();
        RgbaImage::new(48, 32)
            .save(dir.path().join("preview.png"))
            .unwrap();
        fs::write(dir.path().join("notes.txt"), b"not a tile").unwrap();

        let atlas = TileAtlas::load_dir(dir.path()).unwrap();

        assert_eq!(atlas.len(), 1);
        assert_eq!(atlas.lookup(0, 7).unwrap().get_pixel(0, 0), &Rgba([1, 2, 3, 255]));
    }

    // Tests undecodable tile files surface as image load errors
    // Verified by skipping files that fail to decode
    #[test]
    fn test_load_dir_bad_image() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("1_1.png"), b"garbage").unwrap();

        let error = TileAtlas::load_dir(dir.path()).unwrap_err();

        assert!(error.to_string().contains("1_1.png"));
    }

    // Tests a missing directory is a file system error
    // Verified by returning an empty atlas
    #[test]
    fn test_load_dir_missing() {
        let dir = tempfile::tempdir().unwrap();

        assert!(TileAtlas::load_dir(&dir.path().join("missing")).is_err());
    }
}
