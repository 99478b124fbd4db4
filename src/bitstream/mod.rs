//! The bitstream module forms the bit level I/O of the huff compressor.
//!
//! Codes are packed low-bit-first: the first bit of a code goes into the lowest free bit of the current
//! byte, and a new byte starts every eight bits. The final byte is padded with zeros in its high bits.
//! Nothing in the stream records how many bits are valid; the decoder stops at the end-of-stream glyph.
//!
//! Everything works on buffers that are already in memory.
//!
pub mod bitpacker;
pub mod bitreader;
