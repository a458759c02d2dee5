//! Byte-level archive format for compressed maps
//!
//! All integers are little endian. An archive is a fixed header followed by
//! the ground, base-tile and cell layers in that order; each layer is
//! prefixed by its presence bit count and payload token count so a reader
//! can size buffers before replaying the traversal.
//!
//! ```text
//! magic "QMAP" | version u16 | width u16 | height u16
//! description [u8; 20] | attributes u16 | event_file u8 | fog_color u8
//! per layer: bit_count u32 | token_count u32 | presence bytes | payload
//! ```

use crate::io::configuration::{
    ARCHIVE_MAGIC, ARCHIVE_VERSION, DESCRIPTION_LEN, MAX_GRID_DIMENSION,
};
use crate::io::error::{Result, WithContext, format_error};
use crate::map::cell::MapHeader;
use crate::quadtree::bitstream::{pack_presence, unpack_presence};
use crate::quadtree::compress::{CompressedMap, LayerStream};
use crate::quadtree::layer::{BaseTileLayer, CellLayer, GroundLayer, QuadLayer};

/// Bounds-checked little-endian cursor over a byte buffer
#[derive(Debug)]
pub struct ByteReader<'a> {
    bytes: &'a [u8],
    position: usize,
    context: &'static str,
}

impl<'a> ByteReader<'a> {
    /// Start reading; `context` labels format errors
    pub const fn new(bytes: &'a [u8], context: &'static str) -> Self {
        Self {
            bytes,
            position: 0,
            context,
        }
    }

    /// Take the next `len` bytes
    ///
    /// # Errors
    ///
    /// Returns a format error if fewer than `len` bytes remain
    pub fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self.position.checked_add(len);
        let slice = end
            .and_then(|end| self.bytes.get(self.position..end))
            .ok_or_else(|| {
                format_error(
                    self.context,
                    &format!(
                        "needed {len} bytes at offset {}, {} available",
                        self.position,
                        self.remaining()
                    ),
                )
            })?;
        self.position += len;
        Ok(slice)
    }

    /// Take a fixed-size array
    ///
    /// # Errors
    ///
    /// Returns a format error if fewer than `N` bytes remain
    pub fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let slice = self.take(N)?;
        let mut array = [0; N];
        array.copy_from_slice(slice);
        Ok(array)
    }

    /// Read a byte
    ///
    /// # Errors
    ///
    /// Returns a format error at end of input
    pub fn u8(&mut self) -> Result<u8> {
        let [byte] = self.array()?;
        Ok(byte)
    }

    /// Read a little-endian u16
    ///
    /// # Errors
    ///
    /// Returns a format error at end of input
    pub fn u16(&mut self) -> Result<u16> {
        self.array().map(u16::from_le_bytes)
    }

    /// Read a little-endian i16
    ///
    /// # Errors
    ///
    /// Returns a format error at end of input
    pub fn i16(&mut self) -> Result<i16> {
        self.array().map(i16::from_le_bytes)
    }

    /// Read a little-endian u32
    ///
    /// # Errors
    ///
    /// Returns a format error at end of input
    pub fn u32(&mut self) -> Result<u32> {
        self.array().map(u32::from_le_bytes)
    }

    /// Bytes not read yet
    pub const fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.position)
    }

    /// Check that the whole buffer was consumed
    ///
    /// # Errors
    ///
    /// Returns a format error if bytes remain
    pub fn finish(&self) -> Result<()> {
        match self.remaining() {
            0 => Ok(()),
            left => Err(format_error(
                self.context,
                &format!("{left} trailing bytes"),
            )),
        }
    }
}

/// Append one layer's counts, presence bytes and payload
pub fn encode_layer<L: QuadLayer>(stream: &LayerStream<L::Token>, out: &mut Vec<u8>) {
    out.extend_from_slice(&(stream.presence.len() as u32).to_le_bytes());
    out.extend_from_slice(&(stream.payload.len() as u32).to_le_bytes());
    out.extend_from_slice(&pack_presence(&stream.presence));
    for token in &stream.payload {
        L::write_token(token, out);
    }
}

/// Read one layer's counts, presence bytes and payload
///
/// # Errors
///
/// Returns a format error if the input is truncated or the padding of the
/// presence bytes is not zero
pub fn decode_layer<L: QuadLayer>(reader: &mut ByteReader<'_>) -> Result<LayerStream<L::Token>> {
    let bit_count = reader.u32()? as usize;
    let token_count = reader.u32()? as usize;

    let presence = unpack_presence(reader.take(bit_count.div_ceil(8))?, bit_count)?;

    let payload_len = token_count
        .checked_mul(L::TOKEN_SIZE)
        .ok_or_else(|| format_error(L::NAME, &format!("token count {token_count} overflows")))?;
    let payload = reader
        .take(payload_len)?
        .chunks_exact(L::TOKEN_SIZE)
        .map(L::read_token)
        .collect::<Result<Vec<_>>>()?;

    Ok(LayerStream { presence, payload })
}

/// Whether a buffer starts with the archive magic
pub fn is_archive(bytes: &[u8]) -> bool {
    bytes.starts_with(&ARCHIVE_MAGIC)
}

/// Serialize a header and its compressed layers
pub fn encode_archive(header: &MapHeader, map: &CompressedMap) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&ARCHIVE_MAGIC);
    out.extend_from_slice(&ARCHIVE_VERSION.to_le_bytes());
    out.extend_from_slice(&(header.width as u16).to_le_bytes());
    out.extend_from_slice(&(header.height as u16).to_le_bytes());
    out.extend_from_slice(&header.description);
    out.extend_from_slice(&header.attributes.to_le_bytes());
    out.push(header.event_file_index);
    out.push(header.fog_color);

    encode_layer::<GroundLayer>(&map.ground, &mut out);
    encode_layer::<BaseTileLayer>(&map.base_tiles, &mut out);
    encode_layer::<CellLayer>(&map.cells, &mut out);
    out
}

/// Parse an archive into its header and layer streams
///
/// The layers are not replayed here; pass them to
/// [`decompress_grid`](crate::quadtree::decompress::decompress_grid).
///
/// # Errors
///
/// Returns a format error on bad magic, unsupported version, invalid
/// dimensions, truncated input or trailing bytes
pub fn decode_archive(bytes: &[u8]) -> Result<(MapHeader, CompressedMap)> {
    let mut reader = ByteReader::new(bytes, "archive");

    if reader.array::<4>()? != ARCHIVE_MAGIC {
        return Err(format_error("archive", &"missing QMAP magic"));
    }
    let version = reader.u16()?;
    if version != ARCHIVE_VERSION {
        return Err(format_error(
            "archive",
            &format!("unsupported version {version}"),
        ));
    }

    let width = reader.u16()? as usize;
    let height = reader.u16()? as usize;
    check_dimensions("archive", width, height)?;

    let description = reader.array::<DESCRIPTION_LEN>()?;
    let header = MapHeader {
        description,
        attributes: reader.u16()?,
        width,
        height,
        event_file_index: reader.u8()?,
        fog_color: reader.u8()?,
    };

    let map = CompressedMap {
        ground: decode_layer::<GroundLayer>(&mut reader).with_operation(GroundLayer::NAME)?,
        base_tiles: decode_layer::<BaseTileLayer>(&mut reader)
            .with_operation(BaseTileLayer::NAME)?,
        cells: decode_layer::<CellLayer>(&mut reader).with_operation(CellLayer::NAME)?,
    };
    reader.finish()?;

    Ok((header, map))
}

/// Reject empty or oversized grids
///
/// # Errors
///
/// Returns a format error if either dimension is zero or above
/// [`MAX_GRID_DIMENSION`]
pub fn check_dimensions(context: &'static str, width: usize, height: usize) -> Result<()> {
    if width == 0 || height == 0 || width > MAX_GRID_DIMENSION || height > MAX_GRID_DIMENSION {
        return Err(format_error(
            context,
            &format!("invalid dimensions {width}x{height}"),
        ));
    }
    Ok(())
}
