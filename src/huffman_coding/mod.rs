//! The huffman_coding module builds the prefix code for the huff compressor.
//!
//! Building a code happens in three steps:
//! - candidate_table: One record per glyph (the 256 byte values plus the end-of-stream sentinel), sorted by
//!   frequency with unused glyphs pushed to the end so the front of the table is already a valid min-heap.
//! - heap_tree: Repeatedly merge the two lightest nodes in place, inside one fixed size array, until a single
//!   root remains at index 0. Children are referenced by array index.
//! - code_table: Walk the finished tree and record the root-to-leaf path of every glyph.
//!
//! The merge order, including how ties are broken while sifting, fixes the shape of the tree and therefore
//! the exact bytes of every container. It must not be "improved" into a textbook heap.
//!
pub mod candidate_table;
pub mod code_table;
pub mod heap_tree;
