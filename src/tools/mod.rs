//! The tools module provides the helper functions around the huff codec core.
//!
//! The tools are:
//! - cli: Command line interface for huff.
//! - freq_count: Glyph frequency count, including the end-of-stream sentinel.
//! - timer: Labelled timing of each stage of a run.
//!
pub mod cli;
pub mod freq_count;
pub mod timer;
