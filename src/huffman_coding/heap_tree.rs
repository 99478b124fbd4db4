//! Builds the Huffman tree inside a single fixed size table.
//!
//! The sorted candidate table is already a min-heap (children of slot i live at 2i+1 and 2i+2). Each pass
//! takes the lighter child of the root and the root itself out of the heap, parks them just past the heap
//! (the root in the slot freed at the end of the heap, the child in the next free slot after the leaves),
//! and puts a merge node of their combined weight back at the top. After glyphs - 1 passes the table holds
//! exactly 2 * glyphs - 1 live nodes with the root at index 0.
//!
//! Sifting prefers the right child only when it is strictly lighter than both the left child and the
//! current node; otherwise the left child is taken if it is strictly lighter. Equal weights never swap.
//! Changing this rule still gives a valid Huffman code, but not the same tree.

use log::{debug, trace};

use super::candidate_table::{CandidateTable, Node, MAX_HUFFMAN_TABLE};

#[derive(Debug, Clone)]
pub struct HuffmanTree {
    nodes: [Node; MAX_HUFFMAN_TABLE],
    len: usize,
}

impl HuffmanTree {
    /// Count the glyphs in `data` and build its tree.
    #[cfg(test)]
    pub fn from_bytes(data: &[u8]) -> Self {
        Self::build(CandidateTable::from_freqs(&crate::tools::freq_count::freqs(data)))
    }

    /// Merge the candidates into one tree. No allocation happens here; the table is worked in place.
    pub fn build(table: CandidateTable) -> Self {
        let (mut nodes, glyphs) = table.into_parts();

        // The sentinel is always counted, so there is at least one glyph. A lone glyph is the root.
        let mut end_of_heap = glyphs.saturating_sub(1);
        let mut next_free = glyphs;

        for _ in 1..glyphs {
            // Pick the lighter child of the root. Ties go left.
            let marked = if end_of_heap <= 1 || nodes[1].frequency <= nodes[2].frequency {
                1
            } else {
                2
            };

            // Park it past the leaves, then fill its hole with the last heap element.
            nodes[next_free] = nodes[marked];
            nodes[marked] = nodes[end_of_heap];
            sift_down(&mut nodes, marked, end_of_heap);

            // Park the root where the last heap element was and put the merge node on top.
            nodes[end_of_heap] = nodes[0];
            nodes[0] = Node::merge(nodes[end_of_heap].frequency + nodes[next_free].frequency);
            let settled = sift_down(&mut nodes, 0, end_of_heap);
            nodes[settled].left = Some(end_of_heap);
            nodes[settled].right = Some(next_free);

            trace!(
                "\rMerged slots {} and {} into slot {} (weight {})",
                end_of_heap,
                next_free,
                settled,
                nodes[settled].frequency
            );

            next_free += 1;
            end_of_heap -= 1;
        }

        debug!(
            "Built a tree of {} nodes from {} glyphs, total weight {}.",
            next_free, glyphs, nodes[0].frequency
        );

        HuffmanTree {
            nodes,
            len: next_free,
        }
    }

    /// The live nodes, root first.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes[..self.len]
    }

    pub fn root(&self) -> &Node {
        &self.nodes[0]
    }

    /// Number of live nodes (2 * glyphs - 1).
    pub fn node_count(&self) -> usize {
        self.len
    }

    /// Number of leaves, sentinel included.
    pub fn glyph_count(&self) -> usize {
        self.nodes().iter().filter(|n| n.is_leaf()).count()
    }
}

/// Move the node at `i` down the heap `[0, limit)` until neither child is lighter. Returns its final slot.
fn sift_down(nodes: &mut [Node], mut i: usize, limit: usize) -> usize {
    loop {
        let l = 2 * i + 1;
        let r = l + 1;
        let child = if r < limit
            && nodes[r].frequency < nodes[l].frequency
            && nodes[r].frequency < nodes[i].frequency
        {
            r
        } else if l < limit && nodes[l].frequency < nodes[i].frequency {
            l
        } else {
            return i;
        };
        nodes.swap(i, child);
        i = child;
    }
}
