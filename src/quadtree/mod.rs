/// Presence bit packing and stream readers
pub mod bitstream;
/// Pre-order quad-tree encoder
pub mod compress;
/// Quad-tree decoder with integrity checks
pub mod decompress;
/// Per-layer predicates and token codecs
pub mod layer;
/// Byte-level archive format
pub mod stream;

pub use compress::{CompressedMap, LayerStream, compress_grid};
pub use decompress::decompress_grid;
