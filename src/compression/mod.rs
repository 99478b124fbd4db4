//! The compression module manages both directions of the huff compressor.
//!
//! Compression happens in the following steps:
//! - Frequency count: Tally every byte value and add the end-of-stream sentinel once.
//! - Tree building: Merge glyphs into a Huffman tree inside a fixed size table (see huffman_coding).
//! - Code assignment: Record the root-to-leaf path of every glyph.
//! - Packing: Write the code of every input byte, then the sentinel's code, low bit first.
//! - Container: Write the original file name, the flat node table and the payload.
//!
//! Decompression is the inverse. The node table is read back as is (the tree is never rebuilt), and the
//! payload is walked one bit at a time from the root until the sentinel leaf is reached.
//!

pub mod compress;
pub mod container;
pub mod decompress;
