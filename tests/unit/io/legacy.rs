//! Tests for the legacy fixed-layout reader and writer

#[cfg(test)]
mod tests {
    use quadmap::io::legacy::{parse_legacy, write_legacy};
    use quadmap::map::cell::{Animation, BaseTile, CellDescriptor, DoorOffset, MapHeader};
    use quadmap::map::grid::GridStore;

    const HEADER_LEN: usize = 52;
    const TILE_LEN: usize = 3;
    const CELL_LEN: usize = 14;

    fn sample() -> (MapHeader, GridStore) {
        let mut grid = GridStore::new(3, 2);
        grid.set_base_tile(0, 0, Some(BaseTile::new(1, 10))).unwrap();
        grid.set_base_tile(2, 1, Some(BaseTile::new(0, 0))).unwrap();
        let mut cell = CellDescriptor::default();
        cell.set_door(4, DoorOffset(3));
        cell.set_light(9);
        grid.set_cell(2, 1, cell).unwrap();

        let mut header = MapHeader::new(3, 2);
        header.set_description("harbor");
        header.attributes = 0x0102;
        header.event_file_index = 7;
        header.fog_color = 2;
        (header, grid)
    }

    fn cell_offset(width: usize, height: usize, x: usize, y: usize) -> usize {
        HEADER_LEN + width * height * TILE_LEN + (y * width + x) * CELL_LEN
    }

    // Tests a written file parses back to the same header and grid
    // Verified by writing height before width
    #[test]
    fn test_write_then_parse() {
        let (header, grid) = sample();
        let bytes = write_legacy(&header, &grid);

        assert_eq!(bytes.len(), HEADER_LEN + 6 * (TILE_LEN + CELL_LEN));

        let (parsed_header, parsed_grid) = parse_legacy(&bytes).unwrap();
        assert_eq!(parsed_header, header);
        assert_eq!(parsed_grid, grid);
    }

    // Tests void cells are written with the 0xFFFF tile marker
    // Verified by writing void cells as tile 0
    #[test]
    fn test_void_tile_marker() {
        let (header, grid) = sample();
        let bytes = write_legacy(&header, &grid);

        // Cell (1, 0) is void
        let record = &bytes[HEADER_LEN + TILE_LEN..HEADER_LEN + 2 * TILE_LEN];
        assert_eq!(record, &[0, 0xFF, 0xFF]);
        // Cell (0, 0) holds file 1 tile 10
        assert_eq!(&bytes[HEADER_LEN..HEADER_LEN + TILE_LEN], &[1, 10, 0]);
    }

    // Tests unknown flag bits and stray fields are dropped on read
    // Verified by keeping raw descriptor bytes
    #[test]
    fn test_parse_masks_unknown_flags() {
        let (header, grid) = sample();
        let mut bytes = write_legacy(&header, &grid);
        let offset = cell_offset(3, 2, 0, 0);
        bytes[offset] = 0x81;
        bytes[offset + 7] = 0x44;

        let (_, parsed) = parse_legacy(&bytes).unwrap();
        let cell = parsed.cell(0, 0).unwrap();

        assert_eq!(cell.flags.bits(), 0x01);
        assert_eq!(cell.object(0), Some((0, 0, Animation::default())));
        assert_eq!(cell.object2, 0);
    }

    // Tests descriptors on void cells are discarded
    // Verified by storing descriptors regardless of ground
    #[test]
    fn test_parse_drops_descriptor_on_void_cell() {
        let (header, grid) = sample();
        let mut bytes = write_legacy(&header, &grid);
        let offset = cell_offset(3, 2, 1, 0);
        bytes[offset] = 0x08;
        bytes[offset + 12] = 200;

        let (_, parsed) = parse_legacy(&bytes).unwrap();

        assert!(!parsed.ground(1, 0).unwrap());
        assert!(parsed.cell(1, 0).unwrap().is_default());
    }

    // Tests the description field is carried as raw bytes
    // Verified by decoding the description as UTF-8
    #[test]
    fn test_parse_keeps_raw_description() {
        let (header, grid) = sample();
        let mut bytes = write_legacy(&header, &grid);
        bytes[..6].copy_from_slice(&[0xB8, 0xB6, 0xC0, 0xBB, 0xB1, 0xE2]);

        let (parsed_header, parsed_grid) = parse_legacy(&bytes).unwrap();

        assert_eq!(&parsed_header.description[..6], &[0xB8, 0xB6, 0xC0, 0xBB, 0xB1, 0xE2]);
        assert_eq!(write_legacy(&parsed_header, &parsed_grid), bytes);
    }

    // Tests door cells follow the open state of the first cell of their group
    // Verified by storing each door cell as read
    #[test]
    fn test_parse_aligns_door_groups() {
        let (header, grid) = sample();
        let mut bytes = write_legacy(&header, &grid);
        // Cell (0, 0) joins door group 4 as an open door, read before (2, 1)
        let offset = cell_offset(3, 2, 0, 0);
        bytes[offset] |= 0x04;
        bytes[offset + 9..offset + 11].copy_from_slice(&4_u16.to_le_bytes());
        bytes[offset + 11] = 0x81;

        let (_, parsed) = parse_legacy(&bytes).unwrap();

        assert_eq!(parsed.door_state(4), Some(true));
        assert_eq!(parsed.cell(0, 0).unwrap().door(), Some((4, DoorOffset(0x81))));
        assert_eq!(parsed.cell(2, 1).unwrap().door(), Some((4, DoorOffset(0x83))));
    }

    // Tests truncated and oversized inputs are rejected
    // Verified by removing the trailing byte check
    #[test]
    fn test_parse_rejects_bad_lengths() {
        let (header, grid) = sample();
        let bytes = write_legacy(&header, &grid);

        assert!(parse_legacy(&bytes[..bytes.len() - 1]).unwrap_err().is_format());
        assert!(parse_legacy(&bytes[..40]).unwrap_err().is_format());

        let mut extended = bytes;
        extended.push(0);
        assert!(parse_legacy(&extended).unwrap_err().is_format());
    }

    // Tests negative and zero dimensions are rejected
    // Verified by reading dimensions as unsigned
    #[test]
    fn test_parse_rejects_bad_dimensions() {
        let (header, grid) = sample();
        let mut bytes = write_legacy(&header, &grid);
        bytes[22..24].copy_from_slice(&(-3_i16).to_le_bytes());
        assert!(parse_legacy(&bytes).unwrap_err().is_format());

        bytes[22..24].copy_from_slice(&0_i16.to_le_bytes());
        assert!(parse_legacy(&bytes).unwrap_err().is_format());
    }
}
