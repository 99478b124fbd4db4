use std::fmt::{Display, Formatter};

use log::{debug, trace};
use rustc_hash::FxHashSet;

use super::heap_tree::HuffmanTree;
use crate::tools::freq_count::GLYPH_COUNT;

/// A root-to-leaf path. Bit i of `bits` is the i-th step from the root (0 = left, 1 = right), so the
/// code can be packed low-bit-first as is. Tree depth is bounded by the u64 weights (well under 128).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Code {
    pub bits: u128,
    pub len: u8,
}

impl Code {
    /// This code extended by one more step.
    pub fn push(self, bit: bool) -> Code {
        Code {
            bits: self.bits | ((bit as u128) << self.len),
            len: self.len + 1,
        }
    }

    /// The i-th step from the root.
    pub fn bit(&self, i: u8) -> bool {
        (self.bits >> i) & 1 == 1
    }

    /// The first `len` steps of this code.
    fn prefix(&self, len: u8) -> Code {
        let mask = if len >= 128 { u128::MAX } else { (1_u128 << len) - 1 };
        Code {
            bits: self.bits & mask,
            len,
        }
    }
}

impl Display for Code {
    /// Written root first, e.g. "0110".
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for i in 0..self.len {
            write!(f, "{}", if self.bit(i) { '1' } else { '0' })?;
        }
        Ok(())
    }
}

/// Code per glyph, plus the number of bits the whole input (sentinel included) packs into.
#[derive(Debug, Clone)]
pub struct CodeTable {
    codes: [Option<Code>; GLYPH_COUNT],
    total_bits: u64,
}

impl CodeTable {
    /// Walk the tree depth first, appending 0 going left and 1 going right.
    pub fn from_tree(tree: &HuffmanTree) -> Self {
        let mut table = CodeTable {
            codes: [None; GLYPH_COUNT],
            total_bits: 0,
        };

        if tree.root().is_leaf() {
            // Only the sentinel: the loop in the builder never ran. Give it a one bit code.
            table.record(tree, 0, Code::default().push(false));
        } else {
            table.assign(tree, 0, Code::default());
        }

        debug!(
            "Assigned codes to {} glyphs; payload is {} bits.",
            table.codes.iter().flatten().count(),
            table.total_bits
        );
        debug_assert!(table.is_prefix_free());
        table
    }

    fn assign(&mut self, tree: &HuffmanTree, idx: usize, code: Code) {
        let node = &tree.nodes()[idx];
        match (node.left, node.right) {
            (Some(left), Some(right)) if !node.is_leaf() => {
                self.assign(tree, left, code.push(false));
                self.assign(tree, right, code.push(true));
            }
            _ => self.record(tree, idx, code),
        }
    }

    fn record(&mut self, tree: &HuffmanTree, idx: usize, code: Code) {
        let node = &tree.nodes()[idx];
        if let Some(glyph) = node.glyph {
            trace!("\r{:>3}: {} x {}", glyph, code, node.frequency);
            self.codes[glyph as usize] = Some(code);
            self.total_bits += code.len as u64 * node.frequency;
        }
    }

    /// The code of `glyph`, if it occurs in the input.
    pub fn code(&self, glyph: u16) -> Option<Code> {
        self.codes.get(glyph as usize).copied().flatten()
    }

    /// Sum of code length times frequency over all glyphs.
    pub fn total_bits(&self) -> u64 {
        self.total_bits
    }

    /// Bytes needed for the packed payload.
    pub fn payload_len(&self) -> usize {
        ((self.total_bits + 7) / 8) as usize
    }

    /// (glyph, code) for every glyph that has a code.
    pub fn iter(&self) -> impl Iterator<Item = (u16, Code)> + '_ {
        self.codes
            .iter()
            .enumerate()
            .filter_map(|(glyph, &code)| code.map(|c| (glyph as u16, c)))
    }

    /// True when no code is a prefix of another.
    pub fn is_prefix_free(&self) -> bool {
        let mut prefixes = FxHashSet::default();
        for (_, code) in self.iter() {
            for len in 0..code.len {
                prefixes.insert(code.prefix(len));
            }
        }
        let mut seen = FxHashSet::default();
        self.iter()
            .all(|(_, code)| !prefixes.contains(&code) && seen.insert(code))
    }
}
