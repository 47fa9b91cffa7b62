//! # Inline Content
//!
//! Every block that holds text (paragraphs, headings, table cells, item and
//! footnote paragraphs) hands its token range to [`parse_inline`]. The
//! scanner walks the range once, merging adjacent literal tokens into a
//! single `text` node and recursing into the interiors of emphasis, links
//! and strikethrough.
//!
//! ## Delimiters
//!
//! ```text
//! *em*   _em_   **strong**   __strong__   ***both***   ~~struck~~
//! ```
//!
//! An opener must be followed by non-whitespace, a closer preceded by it.
//! Underscores do not open or close inside words. Runs longer than the
//! matching closer keep their extra delimiters as text. An opener with no
//! closer is plain text. Closer searches are memoized per scan, so a line
//! full of unclosed openers stays polynomial.
//!
//! ## Brackets
//!
//! `[text](url "title")` and `![alt](url)` are links and images;
//! `[text][label]`, `[text][]` and `[text]` become reference nodes for the
//! resolver. `[^label]` is a footnote reference.

use std::cell::RefCell;
use std::collections::HashMap;
use std::ops::Range;
use std::sync::OnceLock;

use marksmith_syntax::{NodeId, Tree};
use regex::Regex;

use super::{MdNode, MdTok, MdToken};
use crate::options::MarkdownOptions;

/// Parse `tokens` as the inline content of a block, attaching the result
/// under `parent`. Whitespace trailing the block's last line is dropped.
pub(crate) fn parse_inline(
    tree: &mut Tree<MdNode>,
    parent: NodeId,
    tokens: &[MdTok<'_>],
    opts: &MarkdownOptions,
) {
    scan(tree, parent, tokens, opts, true);
}

fn scan(
    tree: &mut Tree<MdNode>,
    parent: NodeId,
    tokens: &[MdTok<'_>],
    opts: &MarkdownOptions,
    block_end: bool,
) {
    let mut parser = InlineParser {
        tree,
        parent,
        tokens,
        opts,
        block_end,
        text: String::new(),
        closers: RefCell::new(HashMap::new()),
    };
    let mut i = 0;
    while i < tokens.len() {
        i = parser.step(i);
    }
    parser.flush();
}

/// Concatenated source text of `tokens`.
pub(crate) fn concat(tokens: &[MdTok<'_>]) -> String {
    tokens.iter().map(|t| t.text).collect()
}

/// True when the token at `i` follows an odd run of backslashes.
pub(crate) fn is_escaped(tokens: &[MdTok<'_>], i: usize) -> bool {
    tokens[..i]
        .iter()
        .rev()
        .take_while(|t| t.kind == MdToken::Backslash)
        .count()
        % 2
        == 1
}

/// Number of leading tokens whose combined text fits in `bytes`.
pub(crate) fn tokens_covering(tokens: &[MdTok<'_>], bytes: usize) -> usize {
    let mut total = 0;
    tokens
        .iter()
        .take_while(|t| {
            total += t.text.len();
            total <= bytes
        })
        .count()
}

/// Content of a `$$...$$` token.
pub(crate) fn display_literal(text: &str) -> String {
    text.get(2..text.len().saturating_sub(2))
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// Content of a code span: delimiters removed, one padding space stripped
/// from each side.
fn code_literal(text: &str) -> String {
    let n = text.bytes().take_while(|&b| b == b'`').count();
    let inner = text.get(n..text.len().saturating_sub(n)).unwrap_or_default();
    let padded = inner.len() >= 2 && inner.starts_with(' ') && inner.ends_with(' ');
    if padded && !inner.trim().is_empty() {
        inner[1..inner.len() - 1].to_string()
    } else {
        inner.to_string()
    }
}

fn destination_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"^\s*(?:<([^<>]*)>|([^\s<>]*))(?:\s+(?:"([^"]*)"|'([^']*)'|\(([^)]*)\)))?\s*$"#,
        )
        .expect("valid link destination regex")
    })
}

struct InlineParser<'t, 'src> {
    tree: &'t mut Tree<MdNode>,
    parent: NodeId,
    tokens: &'t [MdTok<'src>],
    opts: &'t MarkdownOptions,
    /// The slice ends where its block ends.
    block_end: bool,
    /// Literal text not yet attached.
    text: String,
    /// `find_closer` results by `(kind, from, need)`.
    closers: RefCell<HashMap<(MdToken, usize, usize), Option<usize>>>,
}

impl InlineParser<'_, '_> {
    fn kind_at(&self, i: usize) -> Option<MdToken> {
        self.tokens.get(i).map(|t| t.kind)
    }

    fn literal(&mut self, range: Range<usize>) {
        for t in &self.tokens[range] {
            self.text.push_str(t.text);
        }
    }

    fn flush(&mut self) {
        if !self.text.is_empty() {
            let text = std::mem::take(&mut self.text);
            self.tree.append_new(self.parent, MdNode::Text { text });
        }
    }

    fn push(&mut self, kind: MdNode) -> NodeId {
        self.flush();
        self.tree.append_new(self.parent, kind)
    }

    /// Attach `kind` and parse `inner` into it.
    fn push_with(&mut self, kind: MdNode, inner: Range<usize>) -> NodeId {
        let node = self.push(kind);
        scan(self.tree, node, &self.tokens[inner], self.opts, false);
        node
    }

    fn skip_whitespace(&self, mut i: usize) -> usize {
        while self.kind_at(i) == Some(MdToken::Whitespace) {
            i += 1;
        }
        i
    }

    fn run_len(&self, i: usize) -> usize {
        let kind = self.tokens[i].kind;
        self.tokens[i..].iter().take_while(|t| t.kind == kind).count()
    }

    /// Handle the token at `i`, returning the index of the next one.
    fn step(&mut self, i: usize) -> usize {
        use MdToken::*;
        let t = self.tokens[i];
        match t.kind {
            Backslash => self.escape(i),
            Star | Underscore => self.emphasis(i),
            Tilde => self.strikethrough(i),
            Exclaim if self.kind_at(i + 1) == Some(LBracket) => match self.bracket(i + 1, true) {
                Some(next) => next,
                None => {
                    self.literal(i..i + 1);
                    i + 1
                }
            },
            LBracket => match self.bracket(i, false) {
                Some(next) => next,
                None => {
                    self.literal(i..i + 1);
                    i + 1
                }
            },
            CodeSpan => {
                self.push(MdNode::InlineCode {
                    literal: code_literal(t.text),
                });
                i + 1
            }
            AutoLink => {
                let url = t.text.trim_start_matches('<').trim_end_matches('>');
                self.push(MdNode::AutoLink {
                    url: url.to_string(),
                    email: !url.contains(':'),
                });
                i + 1
            }
            Url | Email => {
                self.push(MdNode::AutoLink {
                    url: t.text.to_string(),
                    email: t.kind == Email,
                });
                i + 1
            }
            InlineHtml => {
                self.push(MdNode::InlineHtml {
                    raw: t.text.to_string(),
                });
                i + 1
            }
            InlineFormula => {
                let literal = t.text.trim_start_matches('$').trim_end_matches('$');
                self.push(MdNode::Formula {
                    literal: literal.to_string(),
                    display: false,
                });
                i + 1
            }
            DisplayFormula => {
                self.push(MdNode::Formula {
                    literal: display_literal(t.text),
                    display: true,
                });
                i + 1
            }
            Whitespace => self.whitespace(i),
            Newline => {
                self.push(MdNode::SoftBreak);
                self.skip_whitespace(i + 1)
            }
            EndOfInput => i + 1,
            _ => {
                self.literal(i..i + 1);
                i + 1
            }
        }
    }

    fn escape(&mut self, i: usize) -> usize {
        match self.kind_at(i + 1) {
            Some(MdToken::Newline) => {
                self.push(MdNode::LineBreak);
                self.skip_whitespace(i + 2)
            }
            Some(kind) if kind.is_punctuation() => {
                self.literal(i + 1..i + 2);
                i + 2
            }
            _ => {
                self.literal(i..i + 1);
                i + 1
            }
        }
    }

    /// Two or more spaces before a newline are a hard break; other
    /// whitespace before a line end is dropped. Whitespace closing a nested
    /// slice such as link text is kept.
    fn whitespace(&mut self, i: usize) -> usize {
        match self.kind_at(i + 1) {
            Some(MdToken::Newline) if self.tokens[i].text.len() >= 2 => {
                self.push(MdNode::LineBreak);
                self.skip_whitespace(i + 2)
            }
            Some(MdToken::Newline) | Some(MdToken::EndOfInput) => i + 1,
            None if self.block_end => i + 1,
            _ => {
                self.literal(i..i + 1);
                i + 1
            }
        }
    }

    fn can_open(&self, i: usize, len: usize) -> bool {
        let followed = !matches!(
            self.kind_at(i + len),
            None | Some(MdToken::Whitespace | MdToken::Newline | MdToken::EndOfInput)
        );
        let intraword = self.tokens[i].kind == MdToken::Underscore
            && i > 0
            && matches!(self.tokens[i - 1].kind, MdToken::Text | MdToken::Number);
        followed && !intraword && !is_escaped(self.tokens, i)
    }

    fn can_close(&self, j: usize, len: usize, from: usize) -> bool {
        if j <= from || matches!(self.tokens[j - 1].kind, MdToken::Whitespace | MdToken::Newline) {
            return false;
        }
        let intraword = self.tokens[j].kind == MdToken::Underscore
            && matches!(self.kind_at(j + len), Some(MdToken::Text | MdToken::Number));
        !intraword
    }

    /// Find a closing run of `kind` at least `need` long, starting at `from`.
    ///
    /// Runs that can only open are matched against their own closers first
    /// and skipped, so nested emphasis does not steal the outer closer.
    fn find_closer(&self, kind: MdToken, from: usize, need: usize) -> Option<usize> {
        if let Some(&found) = self.closers.borrow().get(&(kind, from, need)) {
            return found;
        }
        let found = self.search_closer(kind, from, need);
        self.closers.borrow_mut().insert((kind, from, need), found);
        found
    }

    fn search_closer(&self, kind: MdToken, from: usize, need: usize) -> Option<usize> {
        let mut j = from;
        while j < self.tokens.len() {
            if self.tokens[j].kind != kind || is_escaped(self.tokens, j) {
                j += 1;
                continue;
            }
            let len = self.run_len(j);
            if self.can_close(j, len, from) {
                if len >= need {
                    return Some(j);
                }
            } else if self.can_open(j, len) {
                let inner = len.min(3);
                if let Some(close) = self.find_closer(kind, j + len, inner) {
                    j = close + inner;
                    continue;
                }
            }
            j += len;
        }
        None
    }

    fn emphasis(&mut self, i: usize) -> usize {
        let kind = self.tokens[i].kind;
        let n = self.run_len(i);
        let open_end = i + n;
        if self.can_open(i, n) {
            for k in (1..=n.min(3)).rev() {
                let Some(close) = self.find_closer(kind, open_end, k) else {
                    continue;
                };
                self.literal(i..open_end - k);
                let outer = self.push(if k == 2 {
                    MdNode::Strong
                } else {
                    MdNode::Emphasis
                });
                let target = if k == 3 {
                    self.tree.append_new(outer, MdNode::Strong)
                } else {
                    outer
                };
                scan(self.tree, target, &self.tokens[open_end..close], self.opts, false);
                return close + k;
            }
        }
        self.literal(i..open_end);
        open_end
    }

    fn strikethrough(&mut self, i: usize) -> usize {
        let n = self.run_len(i);
        if self.opts.strikethrough && n == 2 && self.can_open(i, n) {
            let mut j = i + 2;
            while j < self.tokens.len() {
                if self.tokens[j].kind != MdToken::Tilde || is_escaped(self.tokens, j) {
                    j += 1;
                    continue;
                }
                let len = self.run_len(j);
                if len == 2 && self.can_close(j, len, i + 2) {
                    self.push_with(MdNode::Strikethrough, i + 2..j);
                    return j + 2;
                }
                j += len;
            }
        }
        self.literal(i..i + n);
        i + n
    }

    /// Index of the token closing the bracket or paren opened at `i`.
    fn matching(&self, i: usize, open: MdToken, close: MdToken) -> Option<usize> {
        let mut depth = 0usize;
        for j in i..self.tokens.len() {
            let kind = self.tokens[j].kind;
            if (kind != open && kind != close) || is_escaped(self.tokens, j) {
                continue;
            }
            if kind == open {
                depth += 1;
            } else {
                depth -= 1;
                if depth == 0 {
                    return Some(j);
                }
            }
        }
        None
    }

    /// `[^label]` at `i`: the label and the index after the closing bracket.
    fn footnote_reference(&self, i: usize) -> Option<(String, usize)> {
        let first = self.tokens.get(i + 1)?;
        if first.kind != MdToken::Text || !first.text.starts_with('^') {
            return None;
        }
        let close = (i + 1..self.tokens.len()).find(|&j| self.tokens[j].kind == MdToken::RBracket)?;
        let inner = &self.tokens[i + 1..close];
        if inner
            .iter()
            .any(|t| matches!(t.kind, MdToken::Whitespace | MdToken::Newline | MdToken::LBracket))
        {
            return None;
        }
        let label = concat(inner);
        let label = label.strip_prefix('^').unwrap_or(&label);
        (!label.is_empty()).then(|| (label.to_string(), close + 1))
    }

    /// `(url "title")` starting at `open`.
    fn destination(&self, open: usize) -> Option<(String, Option<String>, usize)> {
        let close = self.matching(open, MdToken::LParen, MdToken::RParen)?;
        let raw = concat(&self.tokens[open + 1..close]);
        let caps = destination_re().captures(&raw)?;
        let url = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map_or("", |m| m.as_str())
            .to_string();
        let title = caps
            .get(3)
            .or_else(|| caps.get(4))
            .or_else(|| caps.get(5))
            .map(|m| m.as_str().to_string());
        Some((url, title, close + 1))
    }

    /// Links, images, reference links and footnote references opening at
    /// the `[` at `i`. `None` leaves the bracket as text.
    fn bracket(&mut self, i: usize, image: bool) -> Option<usize> {
        if !image && self.opts.footnotes {
            if let Some((label, next)) = self.footnote_reference(i) {
                self.push(MdNode::FootnoteReference { label, index: None });
                return Some(next);
            }
        }

        let close = self.matching(i, MdToken::LBracket, MdToken::RBracket)?;
        let start = if image { i - 1 } else { i };
        let text = i + 1..close;

        match self.kind_at(close + 1) {
            Some(MdToken::LParen) => {
                if let Some((url, title, next)) = self.destination(close + 1) {
                    let kind = if image {
                        MdNode::Image { url, title }
                    } else {
                        MdNode::Link { url, title }
                    };
                    self.push_with(kind, text);
                    return Some(next);
                }
            }
            Some(MdToken::LBracket) => {
                if let Some(label_close) =
                    self.matching(close + 1, MdToken::LBracket, MdToken::RBracket)
                {
                    let label = concat(&self.tokens[close + 2..label_close]);
                    let label = (!label.trim().is_empty()).then_some(label);
                    let kind = if image {
                        MdNode::ReferenceImage { label }
                    } else {
                        MdNode::ReferenceLink { label }
                    };
                    self.push_with(kind, text);
                    return Some(label_close + 1);
                }
            }
            _ => {}
        }

        if text.is_empty() {
            return None;
        }
        log::trace!("shortcut reference at token {start}");
        let kind = if image {
            MdNode::ReferenceImage { label: None }
        } else {
            MdNode::ReferenceLink { label: None }
        };
        self.push_with(kind, text);
        Some(close + 1)
    }
}
