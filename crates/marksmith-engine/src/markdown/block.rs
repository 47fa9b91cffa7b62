//! # Block Builders
//!
//! Line-oriented builders for the Markdown block structure. Each builder
//! looks at the line starting at the cursor (a [`Line`] view over the token
//! stream), decides whether it owns it, and consumes whole lines.
//!
//! ## Priority
//!
//! The grammar offers each line to the builders in this order, first match
//! wins:
//!
//! ```text
//! heading → code block → formula block → thematic break → blockquote
//!   → container → definition → table → list item → paragraph
//!   → blank line → end of input
//! ```
//!
//! ## Nesting
//!
//! Blockquotes, admonitions and containers strip their markers and hand the
//! inner tokens to [`BuildContext::parse_nested`]. Lists nest by moving the
//! insertion point (see [`super::list`]); every other block first closes the
//! lists its indentation has left.

use std::sync::OnceLock;

use marksmith_syntax::{BuildContext, NodeBuilder, Span, Token};
use regex::Regex;

use super::inline::{concat, display_literal, parse_inline, tokens_covering};
use super::lexer::{Fence, container_name};
use super::list::{OpenList, close_lists_for, list_marker, truncate_lists};
use super::table::starts_table;
use super::{MdNode, MdTok, MdToken};
use crate::options::MarkdownOptions;

/// Per-run construction state of the Markdown grammar.
#[derive(Debug, Default)]
pub struct BlockState {
    /// Open lists, outermost first.
    pub(crate) lists: Vec<OpenList>,
}

pub(crate) type Cx<'a, 'src> = BuildContext<'a, 'src, MdToken, MdNode, BlockState>;

/// One source line as seen from the token stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Line {
    /// Index of the line's first token.
    pub start: usize,
    /// Width of the leading whitespace, tabs counting four.
    pub indent: usize,
    /// Index of the first token after the leading whitespace.
    pub first: usize,
    /// Index of the terminating newline or end-of-input token, or the slice length.
    pub end: usize,
    /// Index where the following line starts.
    pub next: usize,
}

impl Line {
    pub fn at(tokens: &[MdTok<'_>], start: usize) -> Line {
        let mut first = start;
        let mut indent = 0;
        while let Some(t) = tokens.get(first).filter(|t| t.kind == MdToken::Whitespace) {
            indent += indent_width(t.text);
            first += 1;
        }
        let end = tokens[first..]
            .iter()
            .position(|t| matches!(t.kind, MdToken::Newline | MdToken::EndOfInput))
            .map_or(tokens.len(), |i| first + i);
        let next = match tokens.get(end) {
            Some(t) if t.kind == MdToken::Newline => end + 1,
            _ => end,
        };
        Line {
            start,
            indent,
            first,
            end,
            next,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.first >= self.end
    }

    pub fn first_kind(&self, tokens: &[MdTok<'_>]) -> Option<MdToken> {
        (!self.is_blank()).then(|| tokens[self.first].kind)
    }

    /// The line after this one, if there is a token left to start it.
    pub fn following(&self, tokens: &[MdTok<'_>]) -> Option<Line> {
        (self.next > self.end && self.next < tokens.len()).then(|| Line::at(tokens, self.next))
    }

    /// Everything between `from` and the end of the line is whitespace.
    pub fn blank_from(&self, tokens: &[MdTok<'_>], from: usize) -> bool {
        from >= self.end || tokens[from..self.end].iter().all(|t| t.kind == MdToken::Whitespace)
    }
}

fn indent_width(text: &str) -> usize {
    text.chars().map(|c| if c == '\t' { 4 } else { 1 }).sum()
}

/// Drop whitespace tokens from the end of `start..end`.
fn trim_end(tokens: &[MdTok<'_>], start: usize, mut end: usize) -> usize {
    while end > start && tokens[end - 1].kind == MdToken::Whitespace {
        end -= 1;
    }
    end
}

/// True when `line` would open a block other than a paragraph continuation.
pub(crate) fn starts_block(tokens: &[MdTok<'_>], line: &Line, opts: &MarkdownOptions) -> bool {
    use MdToken::*;
    match line.first_kind(tokens) {
        None => true,
        Some(FencedCode | DisplayFormula | ContainerFence) => {
            line.blank_from(tokens, line.first + 1)
        }
        Some(Gt) => line.indent <= 3,
        Some(Hash) => atx_heading(tokens, line).is_some(),
        Some(_) => {
            is_thematic_break(tokens, line)
                || list_marker(tokens, line).is_some()
                || (opts.tables && starts_table(tokens, line))
        }
    }
}

/// The last line of the paragraph whose first line is `first`.
pub(crate) fn paragraph_end(tokens: &[MdTok<'_>], first: Line, opts: &MarkdownOptions) -> Line {
    let mut last = first;
    while let Some(next) = last.following(tokens) {
        if next.is_blank() || starts_block(tokens, &next, opts) {
            break;
        }
        last = next;
    }
    last
}

/// Level and content range of an ATX heading line.
fn atx_heading(tokens: &[MdTok<'_>], line: &Line) -> Option<(u8, usize, usize)> {
    if line.indent > 3 || line.is_blank() {
        return None;
    }
    let hashes = tokens[line.first..line.end]
        .iter()
        .take_while(|t| t.kind == MdToken::Hash)
        .count();
    if !(1..=6).contains(&hashes) {
        return None;
    }

    let mut start = line.first + hashes;
    if start < line.end {
        if tokens[start].kind != MdToken::Whitespace {
            return None;
        }
        start += 1;
    }

    let mut end = trim_end(tokens, start, line.end);
    let closing = tokens[start..end]
        .iter()
        .rev()
        .take_while(|t| t.kind == MdToken::Hash)
        .count();
    if closing > 0 {
        let before = end - closing;
        if before == start || tokens[before - 1].kind == MdToken::Whitespace {
            end = trim_end(tokens, start, before);
        }
    }
    Some((hashes as u8, start, end))
}

fn is_thematic_break(tokens: &[MdTok<'_>], line: &Line) -> bool {
    if line.indent > 3 || line.is_blank() {
        return false;
    }
    let mut marks = tokens[line.first..line.end]
        .iter()
        .filter(|t| t.kind != MdToken::Whitespace);
    let Some(first) = marks.next() else {
        return false;
    };
    if !matches!(first.kind, MdToken::Dash | MdToken::Star | MdToken::Underscore) {
        return false;
    }
    let mut count = 1;
    for t in marks {
        if t.kind != first.kind {
            return false;
        }
        count += 1;
    }
    count >= 3
}

pub struct AtxHeading {
    pub opts: MarkdownOptions,
}

impl NodeBuilder<MdToken, MdNode, BlockState> for AtxHeading {
    fn name(&self) -> &'static str {
        "atx_heading"
    }

    fn build(&self, cx: &mut Cx<'_, '_>) -> bool {
        let tokens = cx.tokens();
        let line = Line::at(tokens, cx.pos());
        let Some((level, start, end)) = atx_heading(tokens, &line) else {
            return false;
        };
        close_lists_for(cx, line.indent);
        let heading = cx.push_node(MdNode::Heading { level });
        parse_inline(cx.tree_mut(), heading, &tokens[start..end], &self.opts);
        cx.seek(line.next);
        true
    }
}

/// Fenced and indented code blocks, from the lexer's whole-block tokens.
pub struct CodeBlock;

impl NodeBuilder<MdToken, MdNode, BlockState> for CodeBlock {
    fn name(&self) -> &'static str {
        "code_block"
    }

    fn build(&self, cx: &mut Cx<'_, '_>) -> bool {
        let tokens = cx.tokens();
        let line = Line::at(tokens, cx.pos());
        let kind = match line.first_kind(tokens) {
            Some(kind @ (MdToken::FencedCode | MdToken::IndentedCode)) => kind,
            _ => return false,
        };
        if !line.blank_from(tokens, line.first + 1) {
            return false;
        }

        let text = tokens[line.first].text;
        let node = if kind == MdToken::FencedCode {
            let (info, literal) = fenced_parts(text);
            MdNode::CodeBlock {
                info,
                literal,
                fenced: true,
            }
        } else {
            MdNode::CodeBlock {
                info: None,
                literal: indented_literal(text),
                fenced: false,
            }
        };
        close_lists_for(cx, line.indent);
        cx.push_node(node);
        cx.seek(line.next);
        true
    }
}

/// Split a fenced code token into its language and body.
///
/// The body excludes the opening line and, when present, the closing fence.
fn fenced_parts(text: &str) -> (Option<String>, String) {
    let (opening, body) = match text.split_once('\n') {
        Some((opening, body)) => (opening.trim_end_matches('\r'), Some(body)),
        None => (text.trim_end_matches('\r'), None),
    };
    let fence = Fence::open(opening);
    let info = opening[fence.map_or(0, |f| f.len)..]
        .split_whitespace()
        .next()
        .map(str::to_string);

    let literal = match body {
        None => String::new(),
        Some(body) => {
            let last_start = body.rfind('\n').map_or(0, |i| i + 1);
            let last = body[last_start..].trim_end_matches('\r');
            if fence.is_some_and(|f| f.closed_by(last)) {
                body[..last_start].to_string()
            } else {
                body.to_string()
            }
        }
    };
    (info, literal)
}

fn indented_literal(text: &str) -> String {
    text.split_inclusive('\n')
        .map(|line| {
            if let Some(rest) = line.strip_prefix('\t') {
                return rest;
            }
            let spaces = line.bytes().take(4).take_while(|&b| b == b' ').count();
            &line[spaces..]
        })
        .collect()
}

/// A `$$...$$` token standing alone on its line.
pub struct FormulaBlock;

impl NodeBuilder<MdToken, MdNode, BlockState> for FormulaBlock {
    fn name(&self) -> &'static str {
        "formula_block"
    }

    fn build(&self, cx: &mut Cx<'_, '_>) -> bool {
        let tokens = cx.tokens();
        let line = Line::at(tokens, cx.pos());
        if line.first_kind(tokens) != Some(MdToken::DisplayFormula)
            || !line.blank_from(tokens, line.first + 1)
        {
            return false;
        }
        close_lists_for(cx, line.indent);
        cx.push_node(MdNode::FormulaBlock {
            literal: display_literal(tokens[line.first].text),
        });
        cx.seek(line.next);
        true
    }
}

pub struct ThematicBreak;

impl NodeBuilder<MdToken, MdNode, BlockState> for ThematicBreak {
    fn name(&self) -> &'static str {
        "thematic_break"
    }

    fn build(&self, cx: &mut Cx<'_, '_>) -> bool {
        let tokens = cx.tokens();
        let line = Line::at(tokens, cx.pos());
        if !is_thematic_break(tokens, &line) {
            return false;
        }
        close_lists_for(cx, line.indent);
        cx.push_node(MdNode::ThematicBreak);
        cx.seek(line.next);
        true
    }
}

fn admonition_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\[!([A-Za-z]+)\][ \t]*").expect("valid admonition regex"))
}

/// `>` quoted lines plus lazy continuation lines.
///
/// A first inner line of the form `[!KEYWORD]` turns the quote into an
/// admonition; the marker line itself is not part of the content.
pub struct BlockQuote {
    pub opts: MarkdownOptions,
}

impl NodeBuilder<MdToken, MdNode, BlockState> for BlockQuote {
    fn name(&self) -> &'static str {
        "block_quote"
    }

    fn build(&self, cx: &mut Cx<'_, '_>) -> bool {
        let tokens = cx.tokens();
        let line = Line::at(tokens, cx.pos());
        if line.indent > 3 || line.first_kind(tokens) != Some(MdToken::Gt) {
            return false;
        }
        close_lists_for(cx, line.indent);

        let mut inner: Vec<MdTok<'_>> = Vec::new();
        let mut resume = line.next;
        let mut inner_blank = true;
        let mut cursor = Some(line);
        while let Some(l) = cursor {
            if l.indent <= 3 && l.first_kind(tokens) == Some(MdToken::Gt) {
                let mut i = l.first + 1;
                if i < l.end && tokens[i].kind == MdToken::Whitespace {
                    inner.extend(strip_column(&tokens[i]));
                    i += 1;
                }
                inner_blank = l.blank_from(tokens, i);
                inner.extend_from_slice(&tokens[i..l.next]);
            } else if !inner_blank && !l.is_blank() && !starts_block(tokens, &l, &self.opts) {
                inner.extend_from_slice(&tokens[l.start..l.next]);
            } else {
                break;
            }
            resume = l.next;
            cursor = l.following(tokens);
        }

        let first_end = inner
            .iter()
            .position(|t| t.kind == MdToken::Newline)
            .unwrap_or(inner.len());
        let first_text = concat(&inner[..first_end]);
        let (kind, skip) = match admonition_re().captures(&first_text) {
            Some(caps) => {
                let marker = caps.get(0).map_or(0, |m| m.end());
                let mut skip = tokens_covering(&inner, marker);
                if inner.get(skip).is_some_and(|t| t.kind == MdToken::Newline) {
                    skip += 1;
                }
                let kind = caps.get(1).map_or("", |m| m.as_str()).to_ascii_uppercase();
                (MdNode::Admonition { kind }, skip)
            }
            None => (MdNode::BlockQuote, 0),
        };

        let node = cx.push_node(kind);
        cx.parse_nested(node, &inner[skip..]);
        cx.seek(resume);
        true
    }
}

/// The part of a whitespace token left after removing one column.
fn strip_column<'src>(token: &MdTok<'src>) -> Option<MdTok<'src>> {
    if token.text.len() > 1 && token.text.starts_with(' ') {
        let span = Span::new(token.span.start + 1, token.span.end);
        Some(Token::new(MdToken::Whitespace, &token.text[1..], span))
    } else {
        None
    }
}

/// `:::name` ... `:::` containers. Inner fences with a name nest.
pub struct Container;

impl NodeBuilder<MdToken, MdNode, BlockState> for Container {
    fn name(&self) -> &'static str {
        "container"
    }

    fn build(&self, cx: &mut Cx<'_, '_>) -> bool {
        let tokens = cx.tokens();
        let line = Line::at(tokens, cx.pos());
        if line.first_kind(tokens) != Some(MdToken::ContainerFence) {
            return false;
        }
        let Some(name) = container_name(tokens[line.first].text) else {
            return false;
        };
        let name = name.to_string();
        close_lists_for(cx, line.indent);

        let mut depth = 0usize;
        let mut close = None;
        let mut cursor = line.following(tokens);
        while let Some(l) = cursor {
            if l.first_kind(tokens) == Some(MdToken::ContainerFence) {
                match container_name(tokens[l.first].text) {
                    Some(_) => depth += 1,
                    None if depth == 0 => {
                        close = Some(l);
                        break;
                    }
                    None => depth -= 1,
                }
            }
            cursor = l.following(tokens);
        }

        let body_start = line.next;
        let (body_end, resume) = match close {
            Some(l) => (l.start, l.next),
            None => {
                let end = match tokens.last() {
                    Some(t) if t.kind == MdToken::EndOfInput => tokens.len() - 1,
                    _ => tokens.len(),
                };
                log::debug!("container `{name}` never closed, running to end of input");
                (end.max(body_start), end.max(body_start))
            }
        };

        let node = cx.push_node(MdNode::Container { name });
        cx.parse_nested(node, &tokens[body_start..body_end]);
        cx.seek(resume);
        true
    }
}

fn footnote_definition_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\[\^([^\]\s]+)\]:[ \t]*").expect("valid footnote definition regex")
    })
}

fn reference_definition_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"^\[([^\]\^][^\]]*)\]:[ \t]*(?:<([^<>]*)>|(\S+))(?:[ \t]+(?:"([^"]*)"|'([^']*)'|\(([^)]*)\)))?[ \t]*$"#,
        )
        .expect("valid reference definition regex")
    })
}

/// `[label]: url "title"` and `[^label]: text` definition lines.
pub struct Definition {
    pub opts: MarkdownOptions,
}

impl Definition {
    fn footnote(&self, cx: &mut Cx<'_, '_>, line: Line, text: &str) -> bool {
        let Some(caps) = footnote_definition_re().captures(text) else {
            return false;
        };
        let tokens = cx.tokens();
        let label = caps.get(1).map_or("", |m| m.as_str()).to_string();
        let marker = caps.get(0).map_or(0, |m| m.end());

        let mut content = line.first + tokens_covering(&tokens[line.first..line.end], marker);
        if content >= line.end {
            content = line.next;
        }
        let last = paragraph_end(tokens, line, &self.opts);

        close_lists_for(cx, line.indent);
        let definition = cx.push_node(MdNode::FootnoteDefinition { label });
        if content < last.end {
            let para = cx.tree_mut().append_new(definition, MdNode::Paragraph);
            parse_inline(cx.tree_mut(), para, &tokens[content..last.end], &self.opts);
        }
        cx.seek(last.next);
        true
    }
}

impl NodeBuilder<MdToken, MdNode, BlockState> for Definition {
    fn name(&self) -> &'static str {
        "definition"
    }

    fn build(&self, cx: &mut Cx<'_, '_>) -> bool {
        let tokens = cx.tokens();
        let line = Line::at(tokens, cx.pos());
        if line.indent > 3 || line.first_kind(tokens) != Some(MdToken::LBracket) {
            return false;
        }
        let text = concat(&tokens[line.first..line.end]);
        if self.opts.footnotes && self.footnote(cx, line, &text) {
            return true;
        }

        let Some(caps) = reference_definition_re().captures(&text) else {
            return false;
        };
        let group = |i: usize| caps.get(i).map(|m| m.as_str().to_string());
        let label = group(1).unwrap_or_default();
        let url = group(2).or_else(|| group(3)).unwrap_or_default();
        let title = group(4).or_else(|| group(5)).or_else(|| group(6));

        close_lists_for(cx, line.indent);
        cx.push_node(MdNode::ReferenceDefinition { label, url, title });
        cx.seek(line.next);
        true
    }
}

/// Consecutive non-blank lines that no other block claims.
pub struct Paragraph {
    pub opts: MarkdownOptions,
}

impl NodeBuilder<MdToken, MdNode, BlockState> for Paragraph {
    fn name(&self) -> &'static str {
        "paragraph"
    }

    fn build(&self, cx: &mut Cx<'_, '_>) -> bool {
        let tokens = cx.tokens();
        let line = Line::at(tokens, cx.pos());
        if line.is_blank() {
            return false;
        }
        close_lists_for(cx, line.indent);
        let last = paragraph_end(tokens, line, &self.opts);
        let para = cx.push_node(MdNode::Paragraph);
        parse_inline(cx.tree_mut(), para, &tokens[line.first..last.end], &self.opts);
        cx.seek(last.next);
        true
    }
}

/// A line holding only whitespace. Closes open lists, or steps the
/// insertion point back out towards the run's root.
pub struct BlankLine;

impl NodeBuilder<MdToken, MdNode, BlockState> for BlankLine {
    fn name(&self) -> &'static str {
        "blank_line"
    }

    fn build(&self, cx: &mut Cx<'_, '_>) -> bool {
        let tokens = cx.tokens();
        let line = Line::at(tokens, cx.pos());
        if !line.is_blank() || line.next <= cx.pos() {
            return false;
        }
        if !cx.state.lists.is_empty() {
            truncate_lists(cx, 0);
        } else if cx.current() != cx.run_root() {
            let up = cx.tree().parent(cx.current()).unwrap_or(cx.run_root());
            cx.set_current(up);
        }
        cx.seek(line.next);
        true
    }
}

pub struct EndOfInput;

impl NodeBuilder<MdToken, MdNode, BlockState> for EndOfInput {
    fn name(&self) -> &'static str {
        "end_of_input"
    }

    fn build(&self, cx: &mut Cx<'_, '_>) -> bool {
        if cx.current_token().is_some_and(|t| t.kind == MdToken::EndOfInput) {
            cx.bump(1);
            true
        } else {
            false
        }
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
        assert!(result.parse_errors.is_empty(), "{:?}", result.parse_errors);
        render(&result.tree, result.tree.root())
    }

    fn first_block(source: &str) -> MdNode {
        let result = parse(source, &MarkdownOptions::default());
        let tree = &result.tree;
        tree.kind(tree.child(tree.root(), 0)).clone()
    }

    #[rstest]
    #[case("# One\n", 1)]
    #[case("### Three ###\n", 3)]
    #[case("###### Six\n", 6)]
    #[case("   ## Indented\n", 2)]
    fn headings_take_their_level(#[case] source: &str, #[case] level: u8) {
        assert_eq!(first_block(source), MdNode::Heading { level });
    }

    #[rstest]
    #[case::seven_hashes("####### no\n")]
    #[case::no_space("#tag\n")]
    #[case::too_indented("    # code\n")]
    fn not_headings(#[case] source: &str) {
        assert!(!matches!(first_block(source), MdNode::Heading { .. }));
    }

    #[test]
    fn closing_hashes_are_stripped() {
        assert_eq!(
            dump("## Title ##\n"),
            "document\n  heading level=2\n    text \"Title\"\n"
        );
    }

    #[test]
    fn fenced_code_keeps_language_and_body() {
        assert_eq!(
            first_block("```rust title\nfn main() {}\n```\n"),
            MdNode::CodeBlock {
                info: Some("rust".into()),
                literal: "fn main() {}\n".into(),
                fenced: true,
            }
        );
    }

    #[test]
    fn unterminated_fence_keeps_everything() {
        assert_eq!(
            first_block("~~~\na\nb"),
            MdNode::CodeBlock {
                info: None,
                literal: "a\nb".into(),
                fenced: true,
            }
        );
    }

    #[test]
    fn indented_code_strips_four_columns() {
        assert_eq!(
            first_block("    let x = 1;\n      nested\n"),
            MdNode::CodeBlock {
                info: None,
                literal: "let x = 1;\n  nested".into(),
                fenced: false,
            }
        );
    }

    #[rstest]
    #[case("---\n")]
    #[case("* * *\n")]
    #[case("___\n")]
    fn thematic_breaks(#[case] source: &str) {
        assert_eq!(first_block(source), MdNode::ThematicBreak);
    }

    #[test]
    fn paragraph_ends_at_thematic_break() {
        assert_eq!(
            dump("text\n---\n"),
            "document\n  paragraph\n    text \"text\"\n  thematic_break\n"
        );
    }

    #[test]
    fn blockquote_lazy_continuation() {
        assert_eq!(
            dump("> quoted\nlazy\n\nafter\n"),
            "document\n  block_quote\n    paragraph\n      text \"quoted\"\n      soft_break\n      text \"lazy\"\n  paragraph\n    text \"after\"\n"
        );
    }

    #[test]
    fn nested_blockquotes() {
        assert_eq!(
            dump("> > deep\n"),
            "document\n  block_quote\n    block_quote\n      paragraph\n        text \"deep\"\n"
        );
    }

    #[test]
    fn admonition_kind_is_uppercased() {
        assert_eq!(
            first_block("> [!tip] Try this\n"),
            MdNode::Admonition { kind: "TIP".into() }
        );
    }

    #[test]
    fn nested_containers_match_their_fences() {
        assert_eq!(
            dump(":::outer\n:::inner\nx\n:::\ny\n:::\nz\n"),
            "document\n  container name=outer\n    container name=inner\n      paragraph\n        text \"x\"\n    paragraph\n      text \"y\"\n  paragraph\n    text \"z\"\n"
        );
    }

    #[test]
    fn unclosed_container_runs_to_end() {
        assert_eq!(
            dump(":::box\na\n\nb\n"),
            "document\n  container name=box\n    paragraph\n      text \"a\"\n    paragraph\n      text \"b\"\n"
        );
    }

    #[rstest]
    #[case("[a]: /url\n", "a", "/url", None)]
    #[case("[Foo Bar]: <https://x.y> 'T'\n", "Foo Bar", "https://x.y", Some("T"))]
    #[case("[a]: /u (paren)\n", "a", "/u", Some("paren"))]
    fn reference_definitions(
        #[case] source: &str,
        #[case] label: &str,
        #[case] url: &str,
        #[case] title: Option<&str>,
    ) {
        assert_eq!(
            first_block(source),
            MdNode::ReferenceDefinition {
                label: label.into(),
                url: url.into(),
                title: title.map(str::to_string),
            }
        );
    }

    #[test]
    fn footnote_definition_continues_like_a_paragraph() {
        assert_eq!(
            dump("[^1]: first\nsecond\n"),
            "document\n  footnote_definition [^1]\n    paragraph\n      text \"first\"\n      soft_break\n      text \"second\"\n"
        );
    }

    #[test]
    fn display_formula_block() {
        assert_eq!(
            first_block("$$ x^2 $$\n"),
            MdNode::FormulaBlock {
                literal: "x^2".into()
            }
        );
    }

    #[test]
    fn blank_lines_separate_paragraphs() {
        assert_eq!(
            dump("a\n\n\nb"),
            "document\n  paragraph\n    text \"a\"\n  paragraph\n    text \"b\"\n"
        );
    }

    #[test]
    fn line_view_skips_indent() {
        let result = parse("  \tx\n", &MarkdownOptions::default());
        let line = Line::at(&result.tokens, 0);
        assert_eq!(line.indent, 6);
        assert_eq!(result.tokens[line.first].text, "x");
        assert_eq!(result.tokens[line.end].kind, MdToken::Newline);
    }
}
