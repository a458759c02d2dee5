//! Tests for the quad-tree decoder and its stream integrity checks

#[cfg(test)]
mod tests {
    use quadmap::map::cell::{Animation, BaseTile, CellDescriptor, DoorOffset};
    use quadmap::map::grid::GridStore;
    use quadmap::quadtree::bitstream::PresenceBits;
    use quadmap::quadtree::compress::{CompressedMap, LayerStream, compress_grid};
    use quadmap::quadtree::decompress::{decompress_grid, decompress_layer};
    use quadmap::quadtree::layer::{BaseTileLayer, CellLayer, GroundLayer};

    fn stream<T>(pattern: &[u8], payload: Vec<T>) -> LayerStream<T> {
        LayerStream {
            presence: pattern.iter().map(|&bit| bit == 1).collect::<PresenceBits>(),
            payload,
        }
    }

    fn ground_at(points: &[(usize, usize)], width: usize, height: usize) -> GridStore {
        let mut grid = GridStore::new(width, height);
        for &(x, y) in points {
            grid.set_ground(x, y, true).unwrap();
        }
        grid
    }

    fn sample() -> GridStore {
        let mut grid = GridStore::new(5, 3);
        grid.set_base_tile(0, 0, Some(BaseTile::new(1, 2))).unwrap();
        grid.set_base_tile(4, 2, Some(BaseTile::new(0, 0))).unwrap();
        grid.set_base_tile(2, 1, Some(BaseTile::new(3, 65_000))).unwrap();
        let mut cell = CellDescriptor::default();
        cell.set_object(1, 2, 44, Animation::new(3, 8));
        cell.set_door(6, DoorOffset(1));
        grid.set_cell(4, 2, cell).unwrap();
        grid
    }

    // Tests decoding reproduces the encoded grid
    // Verified by dropping the cell layer
    #[test]
    fn test_round_trip() {
        let grid = sample();

        let decoded = decompress_grid(5, 3, &compress_grid(&grid)).unwrap();

        assert_eq!(decoded, grid);
    }

    // Tests the 2x2 single-cell stream decodes to one present cell
    // Verified by reading quadrants in column order
    #[test]
    fn test_single_cell_2x2() {
        let mut grid = GridStore::new(2, 2);

        decompress_layer::<GroundLayer>(&mut grid, &stream(&[1, 0, 0, 0, 1], vec![1])).unwrap();

        assert_eq!(grid, ground_at(&[(1, 1)], 2, 2));
    }

    // Tests leftover presence bits are rejected
    // Verified by skipping the final bit check
    #[test]
    fn test_trailing_bits() {
        let mut grid = GridStore::new(2, 2);
        let error =
            decompress_layer::<GroundLayer>(&mut grid, &stream(&[0, 0], vec![])).unwrap_err();

        assert!(error.is_format());
        assert!(error.to_string().contains("ground layer"));
    }

    // Tests running out of presence bits is rejected
    // Verified by treating missing bits as false
    #[test]
    fn test_missing_bits() {
        let mut grid = GridStore::new(2, 2);

        assert!(
            decompress_layer::<GroundLayer>(&mut grid, &stream(&[1, 0, 0], vec![]))
                .unwrap_err()
                .is_format()
        );
    }

    // Tests leftover and missing payload tokens are rejected
    // Verified by skipping the final token check
    #[test]
    fn test_token_count_mismatch() {
        let mut grid = GridStore::new(2, 2);
        assert!(
            decompress_layer::<GroundLayer>(&mut grid, &stream(&[1, 0, 0, 0, 1], vec![1, 1]))
                .unwrap_err()
                .is_format()
        );

        let mut grid = GridStore::new(2, 2);
        assert!(
            decompress_layer::<GroundLayer>(&mut grid, &stream(&[1, 0, 0, 0, 1], vec![]))
                .unwrap_err()
                .is_format()
        );
    }

    // Tests a present internal block must carry payload below it
    // Verified by accepting all-false children
    #[test]
    fn test_present_block_without_payload() {
        let mut grid = GridStore::new(2, 2);

        assert!(
            decompress_layer::<GroundLayer>(&mut grid, &stream(&[1, 0, 0, 0, 0], vec![]))
                .unwrap_err()
                .is_format()
        );
    }

    // Tests presence outside the grid is rejected
    // Verified by skipping the overlap check on true bits
    #[test]
    fn test_presence_outside_grid() {
        let mut grid = GridStore::new(3, 3);
        let bad = stream(&[1, 0, 0, 0, 1, 1, 1, 0, 0], vec![1, 1]);

        assert!(
            decompress_layer::<GroundLayer>(&mut grid, &bad)
                .unwrap_err()
                .is_format()
        );
    }

    // Tests base tiles must agree with ground flags
    // Verified by trusting the base tile presence bits
    #[test]
    fn test_base_tiles_disagree_with_ground() {
        let mut grid = ground_at(&[(0, 0)], 2, 2);
        assert!(
            decompress_layer::<BaseTileLayer>(&mut grid, &stream(&[0], vec![]))
                .unwrap_err()
                .is_format()
        );

        let mut grid = GridStore::new(2, 2);
        assert!(
            decompress_layer::<BaseTileLayer>(&mut grid, &stream(&[1, 0, 0, 0, 1], vec![5]))
                .unwrap_err()
                .is_format()
        );
    }

    // Tests invalid tokens are rejected per layer
    // Verified by accepting any ground token
    #[test]
    fn test_invalid_tokens() {
        let mut grid = GridStore::new(1, 1);
        assert!(
            decompress_layer::<GroundLayer>(&mut grid, &stream(&[1], vec![2]))
                .unwrap_err()
                .is_format()
        );

        let mut grid = ground_at(&[(0, 0)], 1, 1);
        assert!(
            decompress_layer::<BaseTileLayer>(&mut grid, &stream(&[1], vec![0xFF00_0000]))
                .unwrap_err()
                .is_format()
        );

        let unknown = CellDescriptor::read_from(&[0x20; 14]).unwrap();
        let mut grid = ground_at(&[(0, 0)], 1, 1);
        assert!(
            decompress_layer::<CellLayer>(&mut grid, &stream(&[1], vec![unknown]))
                .unwrap_err()
                .is_format()
        );

        let mut grid = ground_at(&[(0, 0)], 1, 1);
        assert!(
            decompress_layer::<CellLayer>(&mut grid, &stream(&[1], vec![CellDescriptor::default()]))
                .unwrap_err()
                .is_format()
        );
    }

    // Tests descriptors on void cells are rejected
    // Verified by storing descriptors without checking ground
    #[test]
    fn test_cell_on_void_cell() {
        let mut cell = CellDescriptor::default();
        cell.set_light(1);
        let mut grid = GridStore::new(1, 1);

        assert!(
            decompress_layer::<CellLayer>(&mut grid, &stream(&[1], vec![cell]))
                .unwrap_err()
                .is_format()
        );
    }

    // Tests a door group decoded as both open and closed is rejected
    // Verified by storing cell tokens without checking the group
    #[test]
    fn test_mixed_door_group() {
        let mut grid = sample();
        let mut cell = CellDescriptor::default();
        cell.set_door(6, DoorOffset(1));
        grid.set_cell(0, 0, cell).unwrap();
        let mut compressed = compress_grid(&grid);
        assert_eq!(compressed.cells.payload.len(), 2);

        compressed.cells.payload[0].door_offset = DoorOffset(0x81);

        assert!(decompress_grid(5, 3, &compressed).unwrap_err().is_format());
    }

    // Tests a corrupted layer fails the whole grid decode
    // Verified by returning the partial grid
    #[test]
    fn test_decompress_grid_rejects_mismatch() {
        let grid = sample();
        let mut compressed: CompressedMap = compress_grid(&grid);
        compressed.base_tiles.payload.push(0);

        assert!(decompress_grid(5, 3, &compressed).unwrap_err().is_format());
        assert!(decompress_grid(4, 3, &compress_grid(&grid)).is_err());
    }
}
