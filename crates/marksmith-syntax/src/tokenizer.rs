//! # Tokenizer - Recognizer-Driven Lexing
//!
//! A grammar describes its lexical layer as an **ordered list of
//! recognizers**. The [`Tokenizer`] walks the source, offering the current
//! position to each recognizer in turn; the first one that accepts may emit
//! tokens and advance the cursor, and no later recognizer is consulted for
//! that position.
//!
//! ```text
//! source ──► [r0, r1, r2, ...] ──► tokens + errors
//!              first match wins
//! ```
//!
//! ## Forward Progress
//!
//! The loop can never stall:
//!
//! - No recognizer accepts: an "unrecognized character" error covering
//!   exactly that character is recorded and the cursor skips it.
//! - A recognizer accepts but leaves the cursor where it was: the cursor is
//!   forced forward one character. This is tolerated silently (only
//!   logged), unlike the construction engine which records an error for the
//!   same situation.
//!
//! ## Per-Run State
//!
//! Each run owns a fresh state value built by the grammar's factory. The
//! tokenizer never looks inside it; recognizers use it to remember context
//! across calls, such as whether the current line already holds content.

use crate::span::Span;
use crate::token::{ParseError, Token};

/// One lexical strategy of a grammar.
pub trait TokenRecognizer<K, S> {
    /// Short identifier used in trace logs.
    fn name(&self) -> &'static str;

    /// Try to recognize input at `cx.pos()`.
    ///
    /// Return `false` without touching the context to decline. Return `true`
    /// after emitting tokens and/or advancing the cursor to accept.
    fn recognize(&self, cx: &mut TokenizeContext<'_, K, S>) -> bool;
}

/// Mutable view of a single tokenization run.
pub struct TokenizeContext<'src, K, S> {
    source: &'src str,
    pos: usize,
    tokens: Vec<Token<'src, K>>,
    errors: Vec<ParseError>,
    /// Grammar-defined per-run state.
    pub state: S,
}

impl<'src, K, S> TokenizeContext<'src, K, S> {
    fn new(source: &'src str, state: S) -> Self {
        Self {
            source,
            pos: 0,
            tokens: Vec::new(),
            errors: Vec::new(),
            state,
        }
    }

    pub fn source(&self) -> &'src str {
        self.source
    }

    /// Current byte offset.
    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    /// Unconsumed input.
    pub fn rest(&self) -> &'src str {
        &self.source[self.pos..]
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// The `n`th character after the cursor (0 = current).
    pub fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    /// The character right before the cursor.
    pub fn prev_char(&self) -> Option<char> {
        self.source[..self.pos].chars().next_back()
    }

    pub fn starts_with(&self, pat: &str) -> bool {
        self.rest().starts_with(pat)
    }

    /// True at offset 0 or right after a line feed.
    pub fn at_line_start(&self) -> bool {
        self.pos == 0 || self.source.as_bytes()[self.pos - 1] == b'\n'
    }

    /// Text between the start of the current line and the cursor.
    pub fn line_prefix(&self) -> &'src str {
        let start = self.source[..self.pos].rfind('\n').map_or(0, |i| i + 1);
        &self.source[start..self.pos]
    }

    /// The remainder of the current line, excluding its line ending.
    pub fn line_rest(&self) -> &'src str {
        let rest = self.rest();
        let end = rest.find('\n').unwrap_or(rest.len());
        rest[..end].strip_suffix('\r').unwrap_or(&rest[..end])
    }

    /// Move the cursor forward `len` bytes without emitting anything.
    pub fn advance(&mut self, len: usize) {
        let next = self.pos + len;
        debug_assert!(
            self.source.is_char_boundary(next),
            "advance to {next} splits a character"
        );
        self.pos = next.min(self.source.len());
    }

    /// Emit a token covering the next `len` bytes and advance past them.
    pub fn emit(&mut self, kind: K, len: usize) {
        let start = self.pos;
        self.advance(len);
        let span = Span::new(start, self.pos);
        self.tokens
            .push(Token::new(kind, &self.source[span.range()], span));
    }

    pub fn error(&mut self, message: impl Into<String>, span: Option<Span>) {
        self.errors.push(ParseError::new(message, span));
    }

    /// Tokens emitted so far in this run.
    pub fn tokens(&self) -> &[Token<'src, K>] {
        &self.tokens
    }

    pub fn last_token(&self) -> Option<&Token<'src, K>> {
        self.tokens.last()
    }
}

/// The tokenization engine for one grammar.
///
/// Immutable once built; every call to [`Tokenizer::tokenize`] gets its own
/// context, so one tokenizer can serve any number of runs.
pub struct Tokenizer<K, S> {
    recognizers: Vec<Box<dyn TokenRecognizer<K, S>>>,
    state: fn() -> S,
    end_of_input: Option<fn(Span) -> K>,
}

impl<K, S> Tokenizer<K, S> {
    pub fn new(recognizers: Vec<Box<dyn TokenRecognizer<K, S>>>, state: fn() -> S) -> Self {
        Self {
            recognizers,
            state,
            end_of_input: None,
        }
    }

    /// Append a final token built from the empty span at end of source.
    pub fn with_end_of_input(mut self, factory: fn(Span) -> K) -> Self {
        self.end_of_input = Some(factory);
        self
    }

    pub fn recognizer_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.recognizers.iter().map(|r| r.name())
    }

    /// Tokenize `source`, returning tokens and lexical errors in order.
    pub fn tokenize<'src>(&self, source: &'src str) -> (Vec<Token<'src, K>>, Vec<ParseError>) {
        let mut cx = TokenizeContext::new(source, (self.state)());

        while !cx.at_end() {
            let start = cx.pos;
            let accepted = self.recognizers.iter().find(|r| r.recognize(&mut cx));

            match accepted {
                Some(r) if cx.pos == start => {
                    log::debug!("recognizer `{}` accepted at {start} without advancing", r.name());
                    skip_char(&mut cx);
                }
                Some(r) => log::trace!("recognizer `{}` matched {start}..{}", r.name(), cx.pos),
                None => {
                    let len = cx.peek().map_or(1, char::len_utf8);
                    let span = Span::new(start, start + len);
                    cx.error(
                        format!("unrecognized character {:?}", &source[span.range()]),
                        Some(span),
                    );
                    skip_char(&mut cx);
                }
            }
        }

        if let Some(factory) = self.end_of_input {
            let span = Span::empty(source.len());
            cx.tokens.push(Token::new(factory(span), "", span));
        }

        log::debug!(
            "tokenized {} bytes into {} tokens ({} errors)",
            source.len(),
            cx.tokens.len(),
            cx.errors.len()
        );
        (cx.tokens, cx.errors)
    }
}

fn skip_char<K, S>(cx: &mut TokenizeContext<'_, K, S>) {
    let len = cx.peek().map_or(1, char::len_utf8);
    cx.advance(len);
}
