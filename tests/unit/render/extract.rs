//! Tests for visitor-driven tile extraction

#[cfg(test)]
mod tests {
    use image::RgbaImage;
    use quadmap::TileMap;
    use quadmap::map::cell::{Animation, BaseTile, CellDescriptor, DoorOffset};
    use quadmap::render::atlas::TileAtlas;
    use quadmap::render::extract::{
        FnVisitor, TileExtractor, TilePlacement, TileVisitor, Viewport,
    };

    #[derive(Default)]
    struct Recorder {
        placements: Vec<(u32, u32, i32, i32)>,
        rejected: u32,
    }

    impl TileVisitor for Recorder {
        fn should_visit(&mut self, _file_index: u32, tile_index: u32) -> bool {
            tile_index != self.rejected
        }

        fn visit(&mut self, placement: &TilePlacement<'_>) {
            self.placements.push((
                placement.file_index,
                placement.tile_index,
                placement.screen_x,
                placement.screen_y,
            ));
        }
    }

    fn sample() -> (TileMap, TileAtlas) {
        let mut map = TileMap::new(3, 2).unwrap();
        map.set_base_tile(2, 0, Some(BaseTile::new(0, 2))).unwrap();
        map.set_base_tile(0, 1, Some(BaseTile::new(0, 1))).unwrap();
        map.set_base_tile(1, 1, Some(BaseTile::new(0, 3))).unwrap();

        let mut door = CellDescriptor::default();
        door.set_object(0, 1, 10, Animation::default());
        door.set_object(1, 1, 50, Animation::new(0, 3));
        door.set_door(2, DoorOffset(4));
        map.set_cell(0, 1, door).unwrap();

        let mut atlas = TileAtlas::new();
        for tile in 1..=3 {
            atlas.insert(0, tile, RgbaImage::new(48, 32));
        }
        for tile in [10, 14, 50, 51, 52] {
            atlas.insert(1, tile, RgbaImage::new(48, 80));
        }
        (map, atlas)
    }

    // Tests base tiles are visited row-major at cell positions
    // Verified by iterating columns first
    #[test]
    fn test_base_tiles_row_major() {
        let (map, atlas) = sample();
        let mut recorder = Recorder::default();

        let count = TileExtractor::new(&map, &atlas).extract_base_tiles(&mut recorder);

        assert_eq!(count, 3);
        assert_eq!(
            recorder.placements,
            vec![(0, 2, 96, 0), (0, 1, 0, 32), (0, 3, 48, 32)]
        );
    }

    // Tests objects are bottom aligned, object 1 before object 2
    // Verified by aligning objects to the cell top
    #[test]
    fn test_object_tiles() {
        let (map, atlas) = sample();
        let mut recorder = Recorder::default();

        let count = TileExtractor::new(&map, &atlas).extract_object_tiles(&mut recorder);

        assert_eq!(count, 2);
        assert_eq!(recorder.placements, vec![(1, 10, 0, -16), (1, 50, 0, -16)]);
    }

    // Tests animation frame and open-door offset shift tile indices
    // Verified by adding the door offset to object 2
    #[test]
    fn test_object_tile_offsets() {
        let (mut map, atlas) = sample();
        map.open_door_group(2);
        map.advance_animation(200);
        let mut recorder = Recorder::default();

        TileExtractor::new(&map, &atlas).extract_object_tiles(&mut recorder);

        assert_eq!(recorder.placements, vec![(1, 14, 0, -16), (1, 52, 0, -16)]);
    }

    // Tests the predicate filters tiles before lookup
    // Verified by calling visit for rejected tiles
    #[test]
    fn test_should_visit_filters() {
        let (map, atlas) = sample();
        let mut recorder = Recorder {
            rejected: 1,
            ..Recorder::default()
        };

        let count = TileExtractor::new(&map, &atlas).extract_base_tiles(&mut recorder);

        assert_eq!(count, 2);
        assert!(recorder.placements.iter().all(|&(_, tile, _, _)| tile != 1));
    }

    // Tests tiles without images are skipped
    // Verified by visiting placeholders for missing images
    #[test]
    fn test_missing_images_skipped() {
        let (map, _) = sample();
        let empty = TileAtlas::new();
        let mut visited = 0;
        let mut visitor = FnVisitor::new(|_, _| true, |_: &TilePlacement<'_>| visited += 1);

        let extractor = TileExtractor::new(&map, &empty);
        let count = extractor.extract_base_tiles(&mut visitor)
            + extractor.extract_object_tiles(&mut visitor);

        assert_eq!(count, 0);
        assert_eq!(visited, 0);
    }

    // Tests viewports clip to the map
    // Verified by ignoring the viewport origin
    #[test]
    fn test_viewport() {
        let (map, atlas) = sample();
        let mut recorder = Recorder::default();
        let viewport = Viewport {
            x: 1,
            y: 1,
            width: 10,
            height: 10,
        };

        let count = TileExtractor::new(&map, &atlas).draw_base_tiles(viewport, &mut recorder);

        assert_eq!(count, 1);
        assert_eq!(recorder.placements, vec![(0, 3, 48, 32)]);
        assert_eq!(Viewport::full(&map).width, 3);
    }

    // Tests single-cell extraction and its bounds check
    // Verified by clamping out-of-grid coordinates
    #[test]
    fn test_extract_one() {
        let (map, atlas) = sample();
        let extractor = TileExtractor::new(&map, &atlas);
        let mut recorder = Recorder::default();

        assert!(extractor.extract_one_base_tile(1, 1, &mut recorder).unwrap());
        assert!(!extractor.extract_one_base_tile(0, 0, &mut recorder).unwrap());
        assert_eq!(extractor.extract_one_object_tile(0, 1, &mut recorder).unwrap(), 2);
        assert!(
            extractor
                .extract_one_base_tile(3, 0, &mut recorder)
                .unwrap_err()
                .is_range()
        );
        assert!(
            extractor
                .extract_one_object_tile(0, 2, &mut recorder)
                .unwrap_err()
                .is_range()
        );
    }

    // Tests ground info covers every cell
    // Verified by reporting present cells only
    #[test]
    fn test_extract_ground_info() {
        let (map, atlas) = sample();
        let mut cells = Vec::new();

        TileExtractor::new(&map, &atlas)
            .extract_ground_info(|present, x, y| cells.push((present, x, y)));

        assert_eq!(cells.len(), 6);
        assert_eq!(cells.iter().filter(|&&(present, _, _)| present).count(), 3);
        assert_eq!(cells[2], (true, 2, 0));
    }
}
