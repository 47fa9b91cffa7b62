//! Viewer state, independent of the terminal.
//!
//! An [`App`] owns one parse result and a flattened pre-order view of its
//! tree. The node details are computed for the selected row only, since the
//! structural hash walks the whole subtree.

use std::fmt::{Display, Write};
use std::hash::Hash;

use marksmith_engine::formula;
use marksmith_engine::markdown::MdNode;
use marksmith_syntax::printer::{render, render_flat};
use marksmith_syntax::{NodeId, Parse, ParseError, Tag};
use ratatui::widgets::ListState;

/// Extra detail lines for a node kind, shown under the generic ones.
pub type DetailFn<N> = fn(&N) -> Vec<String>;

pub struct App<'src, T, N> {
    parse: Parse<'src, T, N>,
    nodes: Vec<NodeId>,
    rows: Vec<String>,
    extra: DetailFn<N>,
    pub list_state: ListState,
}

impl<'src, T, N: Tag + Display + Hash> App<'src, T, N> {
    pub fn new(parse: Parse<'src, T, N>, extra: DetailFn<N>) -> Self {
        let tree = &parse.tree;
        let nodes: Vec<NodeId> = tree.descendants(tree.root()).collect();
        let rows = render_flat(tree, tree.root())
            .into_iter()
            .map(|(depth, label)| format!("{}{label}", "  ".repeat(depth)))
            .collect();

        let mut list_state = ListState::default();
        list_state.select(Some(0));

        Self {
            parse,
            nodes,
            rows,
            extra,
            list_state,
        }
    }

    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.list_state
            .selected()
            .and_then(|i| self.nodes.get(i).copied())
    }

    pub fn next(&mut self) {
        let i = match self.list_state.selected() {
            Some(i) => (i + 1) % self.nodes.len(),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let i = match self.list_state.selected() {
            Some(0) | None => self.nodes.len() - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
    }

    /// Kind, depth, subtree size and structural hash of the selected node.
    pub fn details(&self) -> Vec<String> {
        let Some(id) = self.selected() else {
            return Vec::new();
        };
        let tree = &self.parse.tree;
        let kind = tree.kind(id);
        let mut lines = vec![
            format!("kind:    {}", kind.tag()),
            format!("node:    {kind}"),
            format!("depth:   {}", tree.depth(id)),
            format!("subtree: {} node(s)", tree.subtree_size(id)),
            format!("hash:    {:016x}", tree.structural_hash(id)),
        ];
        lines.extend((self.extra)(kind));
        lines
    }

    pub fn errors(&self) -> Vec<String> {
        self.parse.errors().map(describe_error).collect()
    }
}

pub fn describe_error(error: &ParseError) -> String {
    match error.span {
        Some(span) => format!("{span}: {}", error.message),
        None => error.message.clone(),
    }
}

pub fn no_details<N>(_: &N) -> Vec<String> {
    Vec::new()
}

/// The formula grammar's reading of a Markdown formula literal.
pub fn formula_details(kind: &MdNode) -> Vec<String> {
    let literal = match kind {
        MdNode::Formula { literal, .. } | MdNode::FormulaBlock { literal } => literal,
        _ => return Vec::new(),
    };
    let parsed = formula::parse(literal);
    let mut lines = vec![String::new(), "formula:".to_string()];
    lines.extend(
        render(&parsed.tree, parsed.tree.root())
            .lines()
            .map(|line| format!("  {line}")),
    );
    lines.extend(
        parsed
            .errors()
            .map(|e| format!("  error {}", describe_error(e))),
    );
    lines
}

/// Tree, tokens and errors as plain text, for `--dump`.
pub fn dump<T: Tag, N: Display>(parse: &Parse<'_, T, N>) -> String {
    let mut out = String::from("tree:\n");
    for line in render(&parse.tree, parse.tree.root()).lines() {
        let _ = writeln!(out, "  {line}");
    }
    out.push_str("tokens:\n");
    for token in &parse.tokens {
        let _ = writeln!(out, "  {token}");
    }
    out.push_str("errors:\n");
    for error in parse.errors() {
        let _ = writeln!(out, "  {}", describe_error(error));
    }
    out
}
