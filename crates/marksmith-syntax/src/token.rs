//! The lexical model shared by every grammar: tags, tokens and diagnostics.

use std::fmt;

use crate::span::Span;

/// A closed, per-grammar set of kinds with stable string identifiers.
///
/// Implemented by both token kind enums and node kind enums. The tag is what
/// diagnostics, printers and viewers show; it must not change between
/// releases because downstream tools match on it.
pub trait Tag {
    fn tag(&self) -> &'static str;
}

/// A lexed token: its kind, the exact source text it covers, and where.
///
/// Tokens borrow from the source they were produced from and are never
/// mutated after the tokenizer emits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'src, K> {
    pub kind: K,
    pub text: &'src str,
    pub span: Span,
}

impl<'src, K> Token<'src, K> {
    pub fn new(kind: K, text: &'src str, span: Span) -> Self {
        Self { kind, text, span }
    }
}

impl<K: Tag> fmt::Display for Token<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{} {:?}", self.kind.tag(), self.span, self.text)
    }
}

/// A recorded, recoverable diagnostic.
///
/// Engines accumulate these in detection order instead of aborting; a run
/// only ever stops because its input is exhausted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
    pub span: Option<Span>,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Option<Span>) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }

    pub fn at(message: impl Into<String>, span: Span) -> Self {
        Self::new(message, Some(span))
    }
}
