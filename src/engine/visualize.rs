use std::fmt::Write as _;

use serde::Serialize;

use crate::engine::{
    container::ContainerHeader,
    frequency::FrequencyTable,
    huffman::{HuffmanTree, Node},
};
use crate::error::Result;

/// Display-only tree node; not part of the container contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeView {
    pub label: String,
    /// `"0"` for a left child, `"1"` for a right child, `""` for the root.
    pub edge_label: String,
    pub children: Vec<TreeView>,
}

/// Where the frequencies for a tree view come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TreeMode {
    /// Pick by file extension.
    Auto,
    /// Count the raw input bytes.
    Source,
    /// Read the frequency table from a container header.
    Container,
}

pub fn symbol_label(symbol: u8) -> String {
    if symbol.is_ascii_graphic() {
        (symbol as char).to_string()
    } else {
        format!("0x{:02x}", symbol)
    }
}

/// Builds the view for `bytes`; `mode` must already be resolved from `Auto`.
pub fn build_visualization_tree(bytes: &[u8], mode: TreeMode) -> Result<TreeView> {
    let frequencies = match mode {
        TreeMode::Container => ContainerHeader::decode(bytes)?.0.frequencies,
        TreeMode::Source | TreeMode::Auto => FrequencyTable::from_bytes(bytes)?,
    };
    let tree = HuffmanTree::build(&frequencies)?;
    Ok(view_of(&tree))
}

/// Builds the view bottom-up with an explicit stack; skewed trees reach
/// depth 255.
pub fn view_of(tree: &HuffmanTree) -> TreeView {
    // (node, edge, children already built)
    let mut work: Vec<(&Node, &'static str, bool)> = vec![(tree.root(), "", false)];
    let mut built: Vec<TreeView> = Vec::new();

    while let Some((node, edge, expanded)) = work.pop() {
        match node {
            Node::Leaf { symbol, freq, .. } => built.push(TreeView {
                label: format!("{} ({})", symbol_label(*symbol), freq),
                edge_label: edge.to_string(),
                children: Vec::new(),
            }),
            Node::Internal { left, right, .. } if !expanded => {
                work.push((node, edge, true));
                work.push((&**right, "1", false));
                work.push((&**left, "0", false));
            }
            Node::Internal { freq, .. } => {
                let right = built.pop();
                let left = built.pop();
                built.push(TreeView {
                    label: format!("* ({})", freq),
                    edge_label: edge.to_string(),
                    children: left.into_iter().chain(right).collect(),
                });
            }
        }
    }

    built.pop().unwrap_or_else(|| TreeView {
        label: String::new(),
        edge_label: String::new(),
        children: Vec::new(),
    })
}

/// Indented plain-text rendering, one node per line.
pub fn render_text(view: &TreeView) -> String {
    let mut out = String::new();
    let mut stack = vec![(view, 0usize)];
    while let Some((node, depth)) = stack.pop() {
        let edge = if node.edge_label.is_empty() {
            String::new()
        } else {
            format!("[{}] ", node.edge_label)
        };
        let _ = writeln!(out, "{}{}{}", "  ".repeat(depth), edge, node.label);
        for child in node.children.iter().rev() {
            stack.push((child, depth + 1));
        }
    }
    out
}
