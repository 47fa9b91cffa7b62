//! Indented-text rendering of a tree, for tests and the CLI dump mode.

use std::fmt::{Display, Write};

use crate::tree::{NodeId, Tree};

/// Render the subtree at `node`, one line per node, two spaces per level.
///
/// ```
/// use marksmith_syntax::{printer::render, Tree};
///
/// let mut tree = Tree::new("doc");
/// let root = tree.root();
/// let para = tree.append_new(root, "para");
/// tree.append_new(para, "text");
///
/// assert_eq!(render(&tree, root), "doc\n  para\n    text\n");
/// ```
pub fn render<K: Display>(tree: &Tree<K>, node: NodeId) -> String {
    let mut out = String::new();
    let mut stack = vec![(node, 0usize)];
    while let Some((id, depth)) = stack.pop() {
        let _ = writeln!(out, "{:indent$}{}", "", tree.kind(id), indent = depth * 2);
        stack.extend(tree.children(id).iter().rev().map(|&c| (c, depth + 1)));
    }
    out
}

/// Render each node on its own line without indentation, in pre-order.
pub fn render_flat<K: Display>(tree: &Tree<K>, node: NodeId) -> Vec<(usize, String)> {
    let base = tree.depth(node);
    tree.descendants(node)
        .map(|id| (tree.depth(id) - base, tree.kind(id).to_string()))
        .collect()
}
