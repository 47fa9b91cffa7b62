//! # Lists
//!
//! List nesting is driven by indentation. [`BlockState`] keeps a stack of
//! open lists with the column their markers sit at; the insertion point is
//! left on the most recent item so that deeper content nests inside it.
//!
//! ```text
//! - a          stack: [list@0]           current: item a
//!   - b        stack: [list@0, list@2]   current: item b
//! - c          stack: [list@0]           current: item c
//! ```
//!
//! A marker at the same column as an open list of the same type adds an
//! item to it; a different type at that column replaces it with a new list.
//! Any other block closes the lists indented at or past its own column, and
//! a blank line closes them all.

use marksmith_syntax::{NodeBuilder, NodeId};

use super::block::{BlockState, Cx, Line, paragraph_end};
use super::inline::parse_inline;
use super::{MdNode, MdTok, MdToken};
use crate::options::MarkdownOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct OpenList {
    pub node: NodeId,
    pub indent: usize,
    pub ordered: bool,
}

/// A recognized list marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Marker {
    pub ordered: bool,
    pub start: Option<u64>,
    /// Index of the first content token after the marker.
    pub content: usize,
}

/// `-`, `*`, `+`, `N.` or `N)` followed by whitespace or the end of the line.
pub(crate) fn list_marker(tokens: &[MdTok<'_>], line: &Line) -> Option<Marker> {
    if line.is_blank() {
        return None;
    }
    let first = &tokens[line.first];
    let (ordered, start, after) = match first.kind {
        MdToken::Dash | MdToken::Star | MdToken::Plus => (false, None, line.first + 1),
        MdToken::Number if first.text.len() <= 9 => {
            let delim = line.first + 1;
            if delim >= line.end || !matches!(tokens[delim].kind, MdToken::Dot | MdToken::RParen) {
                return None;
            }
            (true, first.text.parse().ok(), delim + 1)
        }
        _ => return None,
    };

    let content = if after >= line.end {
        after
    } else if tokens[after].kind == MdToken::Whitespace {
        after + 1
    } else {
        return None;
    };
    Some(Marker {
        ordered,
        start,
        content,
    })
}

/// `[ ]`, `[x]` or `[X]` at `at`, returning the checked flag and the
/// index of the content after it.
fn task_box(tokens: &[MdTok<'_>], at: usize, end: usize) -> Option<(bool, usize)> {
    if at + 3 > end {
        return None;
    }
    let [open, mark, close] = &tokens[at..at + 3] else {
        return None;
    };
    if open.kind != MdToken::LBracket || close.kind != MdToken::RBracket {
        return None;
    }
    let checked = match (mark.kind, mark.text) {
        (MdToken::Whitespace, " ") => false,
        (MdToken::Text, "x" | "X") => true,
        _ => return None,
    };

    let after = at + 3;
    if after == end {
        Some((checked, after))
    } else if tokens[after].kind == MdToken::Whitespace {
        Some((checked, after + 1))
    } else {
        None
    }
}

/// Keep the outermost `keep` open lists and close the rest.
///
/// The insertion point moves to the last item of the innermost kept list,
/// or to the parent of the outermost list when none are kept.
pub(crate) fn truncate_lists(cx: &mut Cx<'_, '_>, keep: usize) {
    let lists = &cx.state.lists;
    if keep >= lists.len() {
        return;
    }
    let target = if keep == 0 {
        cx.tree().parent(lists[0].node).unwrap_or(cx.run_root())
    } else {
        let list = lists[keep - 1].node;
        cx.tree().last_child(list).unwrap_or(list)
    };
    log::debug!("closing {} list(s), {keep} left open", lists.len() - keep);
    cx.state.lists.truncate(keep);
    cx.set_current(target);
}

/// Close the lists a block at column `indent` has left.
pub(crate) fn close_lists_for(cx: &mut Cx<'_, '_>, indent: usize) {
    let keep = cx
        .state
        .lists
        .iter()
        .take_while(|l| l.indent < indent)
        .count();
    truncate_lists(cx, keep);
}

fn open_list(cx: &mut Cx<'_, '_>, indent: usize, marker: &Marker) -> NodeId {
    let node = cx.push_node(MdNode::List {
        ordered: marker.ordered,
        start: marker.start,
    });
    cx.state.lists.push(OpenList {
        node,
        indent,
        ordered: marker.ordered,
    });
    log::debug!("opened list at column {indent}, depth {}", cx.state.lists.len());
    node
}

/// One list item line, plus its paragraph continuation lines.
pub struct ListBuilder {
    pub opts: MarkdownOptions,
}

impl NodeBuilder<MdToken, MdNode, BlockState> for ListBuilder {
    fn name(&self) -> &'static str {
        "list_item"
    }

    fn build(&self, cx: &mut Cx<'_, '_>) -> bool {
        let tokens = cx.tokens();
        let line = Line::at(tokens, cx.pos());
        let Some(marker) = list_marker(tokens, &line) else {
            return false;
        };

        let keep = cx
            .state
            .lists
            .iter()
            .take_while(|l| l.indent <= line.indent)
            .count();
        truncate_lists(cx, keep);

        let list = match cx.state.lists.last().copied() {
            Some(top) if top.indent == line.indent && top.ordered == marker.ordered => top.node,
            Some(top) if top.indent == line.indent => {
                let keep = cx.state.lists.len() - 1;
                truncate_lists(cx, keep);
                open_list(cx, line.indent, &marker)
            }
            _ => open_list(cx, line.indent, &marker),
        };

        let task = if self.opts.task_lists {
            task_box(tokens, marker.content, line.end)
        } else {
            None
        };
        let (kind, mut content) = match task {
            Some((checked, after)) => (MdNode::TaskItem { checked }, after),
            None => (MdNode::ListItem, marker.content),
        };
        let item = cx.tree_mut().append_new(list, kind);

        if content >= line.end {
            content = line.next;
        }
        let last = paragraph_end(tokens, line, &self.opts);
        if content < last.end {
            let para = cx.tree_mut().append_new(item, MdNode::Paragraph);
            parse_inline(cx.tree_mut(), para, &tokens[content..last.end], &self.opts);
        }

        cx.set_current(item);
        cx.seek(last.next);
        true
    }
}
