//! Errors reported by the huff compressor.
//!
//! Every error is terminal for the current run. Degenerate inputs (empty files, files with a single
//! distinct byte) are not errors and never show up here.

use std::io;

/// Errors produced while compressing or decompressing.
#[derive(Debug, thiserror::Error)]
pub enum HuffError {
    /// The source could not be read, or the destination could not be written.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// The container does not match the fixed layout.
    #[error("invalid container: {0}")]
    Format(String),
    /// The output file exists and overwriting was not requested.
    #[error("output file {0} already exists (use --force to overwrite)")]
    OutputExists(String),
}

impl HuffError {
    /// Shorthand for building a format violation.
    pub fn format<S: Into<String>>(msg: S) -> Self {
        HuffError::Format(msg.into())
    }
}

/// Lets the binary keep returning `std::io::Error` from main.
impl From<HuffError> for io::Error {
    fn from(e: HuffError) -> Self {
        match e {
            HuffError::Io(e) => e,
            HuffError::Format(_) => io::Error::new(io::ErrorKind::InvalidData, e.to_string()),
            HuffError::OutputExists(_) => {
                io::Error::new(io::ErrorKind::AlreadyExists, e.to_string())
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, HuffError>;
