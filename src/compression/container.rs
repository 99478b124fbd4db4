//! The .huf container.
//!
//! Layout, all integers 32 bit little endian:
//!
//! | field          | size           |                                                        |
//! |----------------|----------------|--------------------------------------------------------|
//! | filename len   | 4              |                                                        |
//! | filename       | filename len   | original file name as raw bytes, no terminator         |
//! | node count     | 4              | 2 * glyphs - 1, at most 513                            |
//! | node table     | node count * 12| glyph, left, right as i32; -1 = none, 256 = end of data |
//! | payload        | rest of file   | packed codes, low bit first                            |
//!
//! The payload length is not stored. It is whatever follows the node table.

use std::io::{Cursor, Read};

use log::{debug, trace};

use crate::error::{HuffError, Result};
use crate::huffman_coding::candidate_table::{Node, MAX_HUFFMAN_TABLE};
use crate::tools::freq_count::END_OF_FILE;

/// Wire value for "no glyph" and "no child".
pub const NO_INDEX: i32 = -1;
/// Bytes per node record.
pub const NODE_RECORD_LEN: usize = 12;

/// A node as stored in the container: the weight is not needed to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableNode {
    pub glyph: Option<u16>,
    pub left: Option<usize>,
    pub right: Option<usize>,
}

impl From<&Node> for TableNode {
    fn from(node: &Node) -> Self {
        TableNode {
            glyph: node.glyph,
            left: node.left,
            right: node.right,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    /// Raw bytes of the original name, not necessarily UTF-8.
    pub filename: Vec<u8>,
    pub nodes: Vec<TableNode>,
    pub payload: Vec<u8>,
}

impl Container {
    /// Serialize header, node table and payload, in that order.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(self.header_len() + self.payload.len());

        put_u32(&mut bytes, self.filename.len(), "file name length")?;
        bytes.extend_from_slice(&self.filename);

        put_u32(&mut bytes, self.nodes.len(), "node count")?;
        for node in &self.nodes {
            bytes.extend_from_slice(&node.glyph.map_or(NO_INDEX, i32::from).to_le_bytes());
            put_index(&mut bytes, node.left)?;
            put_index(&mut bytes, node.right)?;
        }

        bytes.extend_from_slice(&self.payload);
        Ok(bytes)
    }

    /// Parse a container, checking the node table before anything walks it.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(data);

        // File name. Check the length against what is left before allocating for it.
        let name_len = read_u32(&mut cursor, "file name length")? as usize;
        if name_len > remaining(&cursor) {
            return Err(HuffError::format(format!(
                "file name length {} runs past the end of the container",
                name_len
            )));
        }
        let mut filename = vec![0_u8; name_len];
        read_exact(&mut cursor, &mut filename, "file name")?;
        trace!("\rFound file name {:?}", String::from_utf8_lossy(&filename));

        // Node table
        let count = read_u32(&mut cursor, "node count")? as usize;
        if count == 0 || count > MAX_HUFFMAN_TABLE {
            return Err(HuffError::format(format!(
                "node count {} is outside 1..={}",
                count, MAX_HUFFMAN_TABLE
            )));
        }
        let mut nodes = Vec::with_capacity(count);
        for idx in 0..count {
            let glyph = read_i32(&mut cursor, "node table")?;
            let left = read_i32(&mut cursor, "node table")?;
            let right = read_i32(&mut cursor, "node table")?;
            nodes.push(TableNode {
                glyph: wire_glyph(glyph, idx)?,
                left: wire_index(left, count, idx)?,
                right: wire_index(right, count, idx)?,
            });
        }
        check_nodes(&nodes)?;

        // Whatever is left is payload
        let start = cursor.position() as usize;
        let payload = data[start..].to_vec();

        debug!(
            "Read container for {:?}: {} nodes, {} payload bytes.",
            String::from_utf8_lossy(&filename),
            nodes.len(),
            payload.len()
        );
        Ok(Container {
            filename,
            nodes,
            payload,
        })
    }

    /// Bytes taken by everything before the payload.
    pub fn header_len(&self) -> usize {
        4 + self.filename.len() + 4 + self.nodes.len() * NODE_RECORD_LEN
    }
}

fn put_u32(bytes: &mut Vec<u8>, value: usize, what: &str) -> Result<()> {
    let value = u32::try_from(value)
        .map_err(|_| HuffError::format(format!("{} {} does not fit in 32 bits", what, value)))?;
    bytes.extend_from_slice(&value.to_le_bytes());
    Ok(())
}

fn put_index(bytes: &mut Vec<u8>, index: Option<usize>) -> Result<()> {
    let value = match index {
        Some(idx) => i32::try_from(idx)
            .map_err(|_| HuffError::format(format!("node index {} does not fit", idx)))?,
        None => NO_INDEX,
    };
    bytes.extend_from_slice(&value.to_le_bytes());
    Ok(())
}

fn remaining(cursor: &Cursor<&[u8]>) -> usize {
    cursor.get_ref().len().saturating_sub(cursor.position() as usize)
}

/// read_exact, with running out of data reported as a truncated container.
fn read_exact(cursor: &mut Cursor<&[u8]>, buf: &mut [u8], what: &str) -> Result<()> {
    cursor
        .read_exact(buf)
        .map_err(|_| HuffError::format(format!("container truncated in the {}", what)))
}

fn read_u32(cursor: &mut Cursor<&[u8]>, what: &str) -> Result<u32> {
    let mut bytes = [0_u8; 4];
    read_exact(cursor, &mut bytes, what)?;
    Ok(u32::from_le_bytes(bytes))
}

fn read_i32(cursor: &mut Cursor<&[u8]>, what: &str) -> Result<i32> {
    let mut bytes = [0_u8; 4];
    read_exact(cursor, &mut bytes, what)?;
    Ok(i32::from_le_bytes(bytes))
}

fn wire_glyph(value: i32, idx: usize) -> Result<Option<u16>> {
    match value {
        NO_INDEX => Ok(None),
        0..=256 => Ok(Some(value as u16)),
        _ => Err(HuffError::format(format!(
            "node {} has invalid glyph {}",
            idx, value
        ))),
    }
}

fn wire_index(value: i32, count: usize, idx: usize) -> Result<Option<usize>> {
    match value {
        NO_INDEX => Ok(None),
        v if v >= 0 && (v as usize) < count => Ok(Some(v as usize)),
        _ => Err(HuffError::format(format!(
            "node {} points at slot {} of {}",
            idx, value, count
        ))),
    }
}

/// Merge nodes need both children, and only the sentinel may stand alone at the root.
fn check_nodes(nodes: &[TableNode]) -> Result<()> {
    for (idx, node) in nodes.iter().enumerate() {
        if node.glyph.is_none() && (node.left.is_none() || node.right.is_none()) {
            return Err(HuffError::format(format!(
                "merge node {} is missing a child",
                idx
            )));
        }
    }
    match nodes[0].glyph {
        Some(glyph) if glyph != END_OF_FILE => Err(HuffError::format(format!(
            "root is a leaf for glyph {}",
            glyph
        ))),
        _ => Ok(()),
    }
}
