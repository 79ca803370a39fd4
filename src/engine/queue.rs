use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::engine::huffman::Node;

/// Heap slot ordered by `(frequency, sequence)`, reversed so that
/// `BinaryHeap` (a max-heap) pops the minimum first.
#[derive(Debug)]
struct Queued(Node);

impl Queued {
    fn key(&self) -> (u64, u32) {
        (self.0.freq(), self.0.seq())
    }
}

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Queued {}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Queued {
    fn cmp(&self, other: &Self) -> Ordering {
        other.key().cmp(&self.key()) // Reverse for min-heap
    }
}

/// Min-priority queue of partially built tree nodes.
///
/// Sequence numbers are unique within one build, so the order is total and
/// two builds from the same table always pop nodes in the same order.
#[derive(Debug, Default)]
pub struct NodeQueue {
    heap: BinaryHeap<Queued>,
}

impl NodeQueue {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(capacity),
        }
    }

    pub fn insert(&mut self, node: Node) {
        self.heap.push(Queued(node));
    }

    /// Removes the node with the lowest `(frequency, sequence)`.
    pub fn extract_min(&mut self) -> Option<Node> {
        self.heap.pop().map(|q| q.0)
    }

    pub fn size(&self) -> usize {
        self.heap.len()
    }
}
