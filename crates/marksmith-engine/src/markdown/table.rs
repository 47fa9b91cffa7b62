//! # Pipe Tables
//!
//! ```text
//! | a | b |      header row(s)
//! |:--|--:|      delimiter row: sets column alignment, emits no node
//! | 1 | 2 |      body rows
//! ```
//!
//! A table is a run of consecutive lines that contain an unescaped pipe.
//! Rows before the delimiter row are header rows. A run with no delimiter
//! row is still a table when its first line starts with a pipe; all of its
//! rows are then body rows with unaligned columns.

use marksmith_syntax::NodeBuilder;

use super::block::{BlockState, Cx, Line};
use super::inline::{concat, is_escaped, parse_inline};
use super::list::close_lists_for;
use super::{Alignment, MdNode, MdTok, MdToken};
use crate::options::MarkdownOptions;

fn has_pipe(tokens: &[MdTok<'_>], line: &Line) -> bool {
    (line.first..line.end).any(|i| tokens[i].kind == MdToken::Pipe && !is_escaped(tokens, i))
}

/// True when `line` opens a table.
pub(crate) fn starts_table(tokens: &[MdTok<'_>], line: &Line) -> bool {
    if line.is_blank() || line.indent > 3 || !has_pipe(tokens, line) {
        return false;
    }
    line.first_kind(tokens) == Some(MdToken::Pipe)
        || line
            .following(tokens)
            .is_some_and(|next| delimiter_row(tokens, &next).is_some())
}

/// Cell token ranges of a row, outer pipes and surrounding whitespace removed.
fn split_cells<'t, 'src>(tokens: &'t [MdTok<'src>], line: &Line) -> Vec<&'t [MdTok<'src>]> {
    let mut cells = Vec::new();
    let mut start = line.first;
    for i in line.first..line.end {
        if tokens[i].kind == MdToken::Pipe && !is_escaped(tokens, i) {
            cells.push(trim(&tokens[start..i]));
            start = i + 1;
        }
    }
    cells.push(trim(&tokens[start..line.end]));

    if tokens[line.first].kind == MdToken::Pipe {
        cells.remove(0);
    }
    if cells.last().is_some_and(|c| c.is_empty()) {
        cells.pop();
    }
    cells
}

fn trim<'t, 'src>(cell: &'t [MdTok<'src>]) -> &'t [MdTok<'src>] {
    let start = cell
        .iter()
        .position(|t| t.kind != MdToken::Whitespace)
        .unwrap_or(cell.len());
    let end = cell
        .iter()
        .rposition(|t| t.kind != MdToken::Whitespace)
        .map_or(start, |i| i + 1);
    &cell[start..end]
}

fn alignment(cell: &str) -> Option<Alignment> {
    let left = cell.starts_with(':');
    let right = cell.len() > 1 && cell.ends_with(':');
    let dashes = cell.trim_start_matches(':').trim_end_matches(':');
    if dashes.is_empty() || !dashes.chars().all(|c| c == '-') {
        return None;
    }
    Some(match (left, right) {
        (true, true) => Alignment::Center,
        (true, false) => Alignment::Left,
        (false, true) => Alignment::Right,
        (false, false) => Alignment::None,
    })
}

/// Column alignments when `line` is a delimiter row.
fn delimiter_row(tokens: &[MdTok<'_>], line: &Line) -> Option<Vec<Alignment>> {
    if line.is_blank() || !has_pipe(tokens, line) {
        return None;
    }
    let cells = split_cells(tokens, line);
    if cells.is_empty() {
        return None;
    }
    cells.iter().map(|cell| alignment(&concat(cell))).collect()
}

pub struct TableBuilder {
    pub opts: MarkdownOptions,
}

impl NodeBuilder<MdToken, MdNode, BlockState> for TableBuilder {
    fn name(&self) -> &'static str {
        "table"
    }

    fn build(&self, cx: &mut Cx<'_, '_>) -> bool {
        let tokens = cx.tokens();
        let first = Line::at(tokens, cx.pos());
        if !starts_table(tokens, &first) {
            return false;
        }

        let mut rows = vec![first];
        let mut cursor = first.following(tokens);
        while let Some(line) = cursor {
            if line.is_blank() || !has_pipe(tokens, &line) {
                break;
            }
            rows.push(line);
            cursor = line.following(tokens);
        }

        let delimiter = rows
            .iter()
            .enumerate()
            .skip(1)
            .find_map(|(i, row)| delimiter_row(tokens, row).map(|aligns| (i, aligns)));
        if delimiter.is_none() && first.first_kind(tokens) != Some(MdToken::Pipe) {
            return false;
        }

        let cells: Vec<Vec<&[MdTok<'_>]>> =
            rows.iter().map(|row| split_cells(tokens, row)).collect();
        let (headers, alignments) = match delimiter {
            Some((i, aligns)) => (i, aligns),
            None => {
                let width = cells.iter().map(Vec::len).max().unwrap_or(0);
                (0, vec![Alignment::None; width])
            }
        };

        close_lists_for(cx, first.indent);
        let table = cx.push_node(MdNode::Table {
            alignments: alignments.clone(),
        });
        for (i, row) in cells.iter().enumerate() {
            if headers > 0 && i == headers {
                continue;
            }
            let tr = cx.tree_mut().append_new(table, MdNode::TableRow { header: i < headers });
            for (col, cell) in row.iter().enumerate() {
                let alignment = alignments.get(col).copied().unwrap_or_default();
                let td = cx.tree_mut().append_new(tr, MdNode::TableCell { alignment });
                parse_inline(cx.tree_mut(), td, cell, &self.opts);
            }
        }

        let last = rows[rows.len() - 1];
        log::trace!("table with {} rows and {} columns", rows.len(), alignments.len());
        cx.seek(last.next);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::parse;
    use marksmith_syntax::printer::render;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn dump(source: &str) -> String {
        let result = parse(source, &MarkdownOptions::default());
        render(&result.tree, result.tree.root())
    }

    #[rstest]
    #[case("---", Some(Alignment::None))]
    #[case(":--", Some(Alignment::Left))]
    #[case("--:", Some(Alignment::Right))]
    #[case(":-:", Some(Alignment::Center))]
    #[case(":", None)]
    #[case("-x-", None)]
    fn alignment_cells(#[case] cell: &str, #[case] expected: Option<Alignment>) {
        assert_eq!(alignment(cell), expected);
    }

    #[test]
    fn table_without_outer_pipes() {
        assert_eq!(
            dump("a | b\n--- | ---\n1 | 2\n"),
            "document\n  table [none, none]\n    table_row header=true\n      table_cell align=none\n        text \"a\"\n      table_cell align=none\n        text \"b\"\n    table_row header=false\n      table_cell align=none\n        text \"1\"\n      table_cell align=none\n        text \"2\"\n"
        );
    }

    #[test]
    fn pipe_line_without_delimiter_is_not_a_table() {
        assert_eq!(
            dump("a | b\nc\n"),
            "document\n  paragraph\n    text \"a | b\"\n    soft_break\n    text \"c\"\n"
        );
    }

    #[test]
    fn escaped_pipe_stays_in_cell() {
        let result = parse("| a \\| b |\n", &MarkdownOptions::default());
        let tree = &result.tree;
        let row = tree.child(tree.child(tree.root(), 0), 0);
        assert_eq!(tree.children(row).len(), 1);
        let cell = tree.child(row, 0);
        assert_eq!(
            tree.kind(tree.child(cell, 0)),
            &MdNode::Text { text: "a | b".into() }
        );
    }

    #[test]
    fn table_ends_at_line_without_pipe() {
        let result = parse("| a |\n|---|\n| 1 |\ntext\n", &MarkdownOptions::default());
        let tree = &result.tree;
        let kinds: Vec<_> = tree
            .children(tree.root())
            .iter()
            .map(|&c| tree.kind(c).to_string())
            .collect();
        assert_eq!(kinds, vec!["table [none]", "paragraph"]);
    }

    #[test]
    fn tables_can_be_disabled() {
        let opts = MarkdownOptions {
            tables: false,
            ..MarkdownOptions::default()
        };
        let result = parse("| a |\n|---|\n", &opts);
        let tree = &result.tree;
        assert_eq!(tree.kind(tree.child(tree.root(), 0)), &MdNode::Paragraph);
    }
}
