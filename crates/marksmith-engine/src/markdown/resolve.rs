//! Reference resolution, run once after construction.
//!
//! Reference links and images whose label matches a definition are rewritten
//! in place as plain links and images carrying the definition's destination. An
//! explicit label that matches nothing falls back to the link text. Labels
//! match case-insensitively with internal whitespace collapsed; the first
//! definition of a label wins. Unmatched references are left as they are.
//!
//! Footnote references with a definition are numbered from 1 in the order
//! they are first referenced.
//!
//! Running the pass again on its own output changes nothing.

use std::collections::{HashMap, HashSet};

use marksmith_syntax::{NodeId, Tree};

use super::MdNode;

/// Normalized form of a link label used for matching.
pub fn normalize_label(label: &str) -> String {
    label.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Text content of a subtree, as used for collapsed and shortcut labels.
fn text_content(tree: &Tree<MdNode>, node: NodeId) -> String {
    let mut out = String::new();
    for id in tree.descendants(node) {
        match tree.kind(id) {
            MdNode::Text { text } => out.push_str(text),
            MdNode::InlineCode { literal } => out.push_str(literal),
            MdNode::SoftBreak | MdNode::LineBreak => out.push(' '),
            _ => {}
        }
    }
    out
}

enum Action {
    Replace(MdNode),
    Number(usize),
}

pub fn resolve_references(tree: &mut Tree<MdNode>) {
    let root = tree.root();

    let mut definitions: HashMap<String, (String, Option<String>)> = HashMap::new();
    let mut footnotes: HashSet<String> = HashSet::new();
    for id in tree.descendants(root) {
        match tree.kind(id) {
            MdNode::ReferenceDefinition { label, url, title } => {
                definitions
                    .entry(normalize_label(label))
                    .or_insert_with(|| (url.clone(), title.clone()));
            }
            MdNode::FootnoteDefinition { label } => {
                footnotes.insert(normalize_label(label));
            }
            _ => {}
        }
    }

    let mut numbers: HashMap<String, usize> = HashMap::new();
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        let action = match tree.kind(id) {
            MdNode::ReferenceLink { label } | MdNode::ReferenceImage { label } => {
                let image = matches!(tree.kind(id), MdNode::ReferenceImage { .. });
                let explicit = label.as_deref().map(normalize_label);
                let found = explicit
                    .as_ref()
                    .and_then(|key| definitions.get(key))
                    .or_else(|| definitions.get(&normalize_label(&text_content(tree, id))));
                match found {
                    Some((url, title)) => {
                        let (url, title) = (url.clone(), title.clone());
                        Some(Action::Replace(if image {
                            MdNode::Image { url, title }
                        } else {
                            MdNode::Link { url, title }
                        }))
                    }
                    None => {
                        log::debug!("no definition for reference at {id:?}");
                        None
                    }
                }
            }
            MdNode::FootnoteReference { label, .. } => {
                let key = normalize_label(label);
                if footnotes.contains(&key) {
                    let next = numbers.len() + 1;
                    Some(Action::Number(*numbers.entry(key).or_insert(next)))
                } else {
                    log::debug!("no definition for footnote [^{key}]");
                    None
                }
            }
            _ => None,
        };

        match action {
            Some(Action::Replace(kind)) => *tree.kind_mut(id) = kind,
            Some(Action::Number(n)) => {
                if let MdNode::FootnoteReference { index, .. } = tree.kind_mut(id) {
                    *index = Some(n);
                }
            }
            None => {}
        }
        stack.extend(tree.children(id).iter().rev().copied());
    }
}
