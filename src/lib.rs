//! Byte-oriented Huffman compression.
//!
//! Version 0.1.0
//!
//! Compresses a file into a .huf container: the original file name, the Huffman tree flattened into a
//! table of at most 513 nodes, and the packed codes of every byte. The end of the data is marked by a
//! reserved glyph (256) instead of a stored length.
//!
//! Basic usage to compress a file is as follows:
//!
//! `$> huff test.txt`
//!
//! This will compress the file and create the file test.huf. Running `huff test.huf` restores
//! test.txt next to it.
//!
//! The codec works on whole buffers:
//!
//! ```
//! use huff::compression::{compress::compress_bytes, decompress::decompress_bytes};
//!
//! let packed = compress_bytes("greeting.txt", b"hello, hello").unwrap();
//! let (name, data) = decompress_bytes(&packed).unwrap();
//! assert_eq!(name, "greeting.txt");
//! assert_eq!(data, b"hello, hello");
//! ```
//!
pub mod bitstream;
pub mod compression;
pub mod error;
pub mod huffman_coding;
pub mod tools;

pub use error::{HuffError, Result};
