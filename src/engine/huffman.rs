use crate::engine::frequency::FrequencyTable;
use crate::engine::queue::NodeQueue;
use crate::error::{CodecError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Leaf {
        symbol: u8,
        freq: u64,
        seq: u32,
    },
    Internal {
        freq: u64,
        seq: u32,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    pub fn freq(&self) -> u64 {
        match self {
            Node::Leaf { freq, .. } | Node::Internal { freq, .. } => *freq,
        }
    }

    pub fn seq(&self) -> u32 {
        match self {
            Node::Leaf { seq, .. } | Node::Internal { seq, .. } => *seq,
        }
    }

    pub fn symbol(&self) -> Option<u8> {
        match self {
            Node::Leaf { symbol, .. } => Some(*symbol),
            Node::Internal { .. } => None,
        }
    }

    /// Child reached by `bit` (`false` = left, `true` = right). Leaves have none.
    pub fn child(&self, bit: bool) -> Option<&Node> {
        match self {
            Node::Leaf { .. } => None,
            Node::Internal { left, right, .. } => Some(if bit { &**right } else { &**left }),
        }
    }
}

/// Greedy merge of the two cheapest nodes until one remains.
///
/// The sequence counter lives in the builder, so every build starts from 0.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    next_seq: u32,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self { next_seq: 0 }
    }

    fn take_seq(&mut self) -> u32 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    /// Returns `None` for an empty table.
    pub fn build(mut self, table: &FrequencyTable) -> Option<Node> {
        let mut queue = NodeQueue::with_capacity(table.len());
        for entry in table.entries() {
            let seq = self.take_seq();
            queue.insert(Node::Leaf {
                symbol: entry.symbol,
                freq: entry.count as u64,
                seq,
            });
        }

        while queue.size() > 1 {
            let (Some(left), Some(right)) = (queue.extract_min(), queue.extract_min()) else {
                break;
            };
            let seq = self.take_seq();
            queue.insert(Node::Internal {
                freq: left.freq() + right.freq(),
                seq,
                left: Box::new(left),
                right: Box::new(right),
            });
        }

        queue.extract_min()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    root: Node,
}

impl HuffmanTree {
    pub fn build(table: &FrequencyTable) -> Result<Self> {
        let root = TreeBuilder::new()
            .build(table)
            .ok_or(CodecError::EmptyInput)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// A lone leaf root: one distinct symbol, coded as a single `0` bit.
    pub fn is_single_leaf(&self) -> bool {
        matches!(self.root, Node::Leaf { .. })
    }

    /// Assigns root-to-leaf paths as codes, walking with an explicit stack.
    pub fn code_table(&self) -> CodeTable {
        let mut table = CodeTable::empty();

        if let Node::Leaf { symbol, .. } = self.root {
            table.codes[symbol as usize] = Some(vec![false]);
            return table;
        }

        let mut stack: Vec<(&Node, Vec<bool>)> = vec![(&self.root, Vec::new())];
        while let Some((node, path)) = stack.pop() {
            match node {
                Node::Leaf { symbol, .. } => {
                    table.codes[*symbol as usize] = Some(path);
                }
                Node::Internal { left, right, .. } => {
                    let mut right_path = path.clone();
                    right_path.push(true);
                    let mut left_path = path;
                    left_path.push(false);
                    stack.push((&**right, right_path));
                    stack.push((&**left, left_path));
                }
            }
        }

        table
    }
}

/// Per-byte prefix codes, indexed by symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTable {
    codes: Vec<Option<Vec<bool>>>,
}

impl CodeTable {
    fn empty() -> Self {
        Self {
            codes: vec![None; 256],
        }
    }

    pub fn get(&self, symbol: u8) -> Option<&[bool]> {
        self.codes[symbol as usize].as_deref()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.codes.iter().filter(|c| c.is_some()).count()
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = (u8, &[bool])> {
        self.codes
            .iter()
            .enumerate()
            .filter_map(|(symbol, code)| code.as_deref().map(|c| (symbol as u8, c)))
    }

    /// Total encoded length in bits for a table's worth of symbols.
    pub fn encoded_bits(&self, table: &FrequencyTable) -> u64 {
        table
            .entries()
            .iter()
            .map(|e| e.count as u64 * self.get(e.symbol).map_or(0, |c| c.len() as u64))
            .sum()
    }

    /// `"0101"`-style rendering, used by `inspect` and tests.
    pub fn code_string(&self, symbol: u8) -> Option<String> {
        self.get(symbol)
            .map(|code| code.iter().map(|&b| if b { '1' } else { '0' }).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn codes_for(data: &[u8]) -> CodeTable {
        let table = FrequencyTable::from_bytes(data).unwrap();
        HuffmanTree::build(&table).unwrap().code_table()
    }

    fn depth_of(node: &Node, symbol: u8, depth: usize) -> Option<usize> {
        match node {
            Node::Leaf { symbol: s, .. } => (*s == symbol).then_some(depth),
            Node::Internal { left, right, .. } => depth_of(left, symbol, depth + 1)
                .or_else(|| depth_of(right, symbol, depth + 1)),
        }
    }

    #[test]
    fn empty_table_builds_no_tree() {
        let table = FrequencyTable::default();
        assert!(TreeBuilder::new().build(&table).is_none());
        assert!(matches!(HuffmanTree::build(&table), Err(CodecError::EmptyInput)));
    }

    #[test]
    fn single_symbol_gets_zero_code() {
        let table = FrequencyTable::from_bytes(b"aaaa").unwrap();
        assert_eq!(table.get(b'a'), Some(4));
        let tree = HuffmanTree::build(&table).unwrap();
        assert!(tree.is_single_leaf());
        let codes = tree.code_table();
        assert_eq!(codes.len(), 1);
        assert_eq!(codes.code_string(b'a').as_deref(), Some("0"));
    }

    #[test]
    fn three_equal_symbols() {
        let codes = codes_for(b"abcabcabc");
        assert_eq!(codes.len(), 3);
        // a and b merge first (lowest sequence numbers), c pairs with that node.
        assert_eq!(codes.code_string(b'c').as_deref(), Some("0"));
        assert_eq!(codes.code_string(b'a').as_deref(), Some("10"));
        assert_eq!(codes.code_string(b'b').as_deref(), Some("11"));
    }

    #[test]
    fn internal_nodes_sum_children() {
        let table = FrequencyTable::from_bytes(b"mississippi river").unwrap();
        let tree = HuffmanTree::build(&table).unwrap();
        assert_eq!(tree.root().freq(), table.total());

        let mut stack = vec![tree.root()];
        while let Some(node) = stack.pop() {
            if let Node::Internal { freq, left, right, .. } = node {
                assert_eq!(*freq, left.freq() + right.freq());
                stack.push(left);
                stack.push(right);
            }
        }
    }

    #[test]
    fn code_length_matches_leaf_depth() {
        let data = b"the quick brown fox jumps over the lazy dog";
        let table = FrequencyTable::from_bytes(data).unwrap();
        let tree = HuffmanTree::build(&table).unwrap();
        let codes = tree.code_table();
        for (symbol, code) in codes.iter() {
            assert_eq!(depth_of(tree.root(), symbol, 0), Some(code.len()));
        }
    }

    #[test]
    fn codes_are_prefix_free() {
        let data: Vec<u8> = (0..4000u32)
            .map(|i| ((i * i + 3 * i) % 97) as u8)
            .chain(0..=255u8)
            .collect();
        let codes = codes_for(&data);
        assert_eq!(codes.len(), 256);

        assert_prefix_free(&codes);
    }

    #[test]
    fn rebuilding_is_deterministic() {
        let data = b"aabbccddeeffgghh";
        assert_eq!(codes_for(data), codes_for(data));

        let table = FrequencyTable::from_bytes(data).unwrap();
        assert_eq!(
            HuffmanTree::build(&table).unwrap(),
            HuffmanTree::build(&table).unwrap()
        );
    }

    #[test]
    fn skewed_frequencies_give_deep_chain() {
        // Fibonacci-like counts force a maximally unbalanced tree.
        let mut data = Vec::new();
        let (mut a, mut b) = (1usize, 1usize);
        for symbol in 0..20u8 {
            data.extend(std::iter::repeat(symbol).take(a));
            (a, b) = (b, a + b);
        }
        let codes = codes_for(&data);
        let longest = codes.iter().map(|(_, c)| c.len()).max().unwrap();
        assert_eq!(longest, 19);
    }

    #[test]
    fn encoded_bits_sums_code_lengths() {
        let table = FrequencyTable::from_bytes(b"abcabcabc").unwrap();
        let codes = HuffmanTree::build(&table).unwrap().code_table();
        // c: 3 x 1 bit, a and b: 3 x 2 bits each
        assert_eq!(codes.encoded_bits(&table), 15);
    }

    fn assert_prefix_free(codes: &CodeTable) {
        let all: Vec<&[bool]> = codes.iter().map(|(_, c)| c).collect();
        for (i, a) in all.iter().enumerate() {
            for (j, b) in all.iter().enumerate() {
                if i != j {
                    assert!(!b.starts_with(a), "code {:?} prefixes {:?}", a, b);
                }
            }
        }
    }

    proptest! {
        #[test]
        fn generated_codes_are_prefix_free(data in prop::collection::vec(any::<u8>(), 1..2048)) {
            let table = FrequencyTable::from_bytes(&data).unwrap();
            let codes = codes_for(&data);
            prop_assert_eq!(codes.len(), table.len());
            prop_assert!(codes.iter().all(|(_, c)| !c.is_empty()));
            assert_prefix_free(&codes);
        }

        #[test]
        fn generated_trees_are_deterministic(data in prop::collection::vec(any::<u8>(), 1..2048)) {
            let table = FrequencyTable::from_bytes(&data).unwrap();
            let first = HuffmanTree::build(&table).unwrap();
            let second = HuffmanTree::build(&table).unwrap();
            prop_assert_eq!(first.code_table(), second.code_table());
            prop_assert_eq!(first, second);
        }
    }
}
