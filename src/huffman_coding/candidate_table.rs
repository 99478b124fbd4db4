use std::cmp::Ordering;

use log::trace;

use crate::tools::freq_count::GLYPH_COUNT;

/// Slots needed for the largest possible tree: 257 leaves and 256 merge nodes.
pub const MAX_HUFFMAN_TABLE: usize = 2 * GLYPH_COUNT - 1;

/// One slot of the tree table. Leaves carry a glyph, merge nodes carry two children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Node {
    pub glyph: Option<u16>,
    pub frequency: u64,
    pub left: Option<usize>,
    pub right: Option<usize>,
}

impl Node {
    /// Create a new leaf
    pub fn leaf(glyph: u16, frequency: u64) -> Node {
        Node {
            glyph: Some(glyph),
            frequency,
            left: None,
            right: None,
        }
    }

    /// Create a merge node. Children are filled in once it has found its place in the heap.
    pub fn merge(frequency: u64) -> Node {
        Node {
            glyph: None,
            frequency,
            left: None,
            right: None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.glyph.is_some()
    }
}

/// All glyph records, sorted so that the used glyphs form a min-heap at the front of the table.
#[derive(Debug, Clone)]
pub struct CandidateTable {
    nodes: [Node; MAX_HUFFMAN_TABLE],
    glyphs: usize,
}

impl CandidateTable {
    /// Build the table from a glyph frequency count (see freq_count::freqs).
    pub fn from_freqs(freqs: &[u64; GLYPH_COUNT]) -> Self {
        let mut nodes = [Node::default(); MAX_HUFFMAN_TABLE];
        for (glyph, &frequency) in freqs.iter().enumerate() {
            nodes[glyph] = Node::leaf(glyph as u16, frequency);
        }

        // Stable, so equal frequencies keep glyph order.
        nodes[..GLYPH_COUNT].sort_by(candidate_order);

        // Everything before the first unused glyph takes part in the tree.
        let glyphs = nodes[..GLYPH_COUNT]
            .iter()
            .position(|node| node.frequency == 0)
            .unwrap_or(GLYPH_COUNT);

        let table = Self { nodes, glyphs };
        trace!(
            "\nCandidates: {:?}",
            table
                .active()
                .iter()
                .map(|n| (n.glyph.unwrap_or_default(), n.frequency))
                .collect::<Vec<_>>()
        );
        table
    }

    /// Number of glyphs with a nonzero frequency, sentinel included.
    pub fn glyph_count(&self) -> usize {
        self.glyphs
    }

    /// The active heap region.
    pub fn active(&self) -> &[Node] {
        &self.nodes[..self.glyphs]
    }

    /// Hand the raw table over to the tree builder.
    pub(crate) fn into_parts(self) -> ([Node; MAX_HUFFMAN_TABLE], usize) {
        (self.nodes, self.glyphs)
    }
}

/// Ascending by frequency, except that a zero frequency sorts after every used glyph.
fn candidate_order(a: &Node, b: &Node) -> Ordering {
    match (a.frequency, b.frequency) {
        (0, 0) => Ordering::Equal,
        (0, _) => Ordering::Greater,
        (_, 0) => Ordering::Less,
        (x, y) => x.cmp(&y),
    }
}
