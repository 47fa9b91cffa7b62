//! # Constructor - Builder-Driven Tree Construction
//!
//! The construction engine mirrors the [tokenizer](crate::tokenizer): a
//! grammar supplies an **ordered list of node builders**, and the engine
//! offers the current token to each in turn. The first builder that accepts
//! may consume tokens, attach or replace nodes, and move the insertion point.
//!
//! ## The Insertion Point
//!
//! The context tracks a `current` node, initially the root. Builders attach
//! new nodes under it and repoint it to open or close scopes: a list builder
//! points it at the item it just created so deeper content nests inside, and
//! a blank-line builder points it back at a parent. There is no scope stack
//! in the engine; nesting emerges entirely from how builders move `current`.
//!
//! ## Forward Progress
//!
//! - No builder accepts: an "unrecognized token" error is recorded and the
//!   token is skipped.
//! - A builder accepts without consuming: a "made no progress" error is
//!   recorded and the token is skipped.
//!
//! Either way every token is accounted for exactly once, either by a builder
//! that consumed it or by one error.
//!
//! ## Nested Runs
//!
//! [`BuildContext::parse_nested`] drives the same builder list over a
//! separate token slice with a fresh state, attaching results under a chosen
//! node. Grammars use it for containers whose content is itself a sequence
//! of blocks once a prefix has been stripped.

use crate::span::Span;
use crate::token::{ParseError, Tag, Token};
use crate::tree::{NodeId, Tree};

/// One structural strategy of a grammar.
pub trait NodeBuilder<T, N, S> {
    /// Short identifier used in logs and diagnostics.
    fn name(&self) -> &'static str;

    /// Try to build at `cx.pos()`.
    ///
    /// Return `false` without touching the context to decline.
    fn build(&self, cx: &mut BuildContext<'_, '_, T, N, S>) -> bool;
}

type Builders<T, N, S> = [Box<dyn NodeBuilder<T, N, S>>];

/// Mutable view of a single construction run.
pub struct BuildContext<'a, 'src, T, N, S> {
    tree: &'a mut Tree<N>,
    tokens: &'a [Token<'src, T>],
    builders: &'a Builders<T, N, S>,
    make_state: fn() -> S,
    anchor: NodeId,
    current: NodeId,
    pos: usize,
    errors: Vec<ParseError>,
    /// Grammar-defined per-run state.
    pub state: S,
}

impl<'a, 'src, T: Copy + Tag, N, S> BuildContext<'a, 'src, T, N, S> {
    pub fn tree(&self) -> &Tree<N> {
        self.tree
    }

    pub fn tree_mut(&mut self) -> &mut Tree<N> {
        self.tree
    }

    /// The node this run started attaching under.
    pub fn run_root(&self) -> NodeId {
        self.anchor
    }

    /// The node new content attaches under.
    pub fn current(&self) -> NodeId {
        self.current
    }

    pub fn set_current(&mut self, node: NodeId) {
        self.current = node;
    }

    /// Index of the next unconsumed token.
    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// The whole token slice of this run.
    pub fn tokens(&self) -> &'a [Token<'src, T>] {
        self.tokens
    }

    /// Tokens from the cursor onward.
    pub fn remaining(&self) -> &'a [Token<'src, T>] {
        &self.tokens[self.pos.min(self.tokens.len())..]
    }

    /// The token `n` places after the cursor.
    pub fn nth(&self, n: usize) -> Option<&'a Token<'src, T>> {
        self.tokens.get(self.pos + n)
    }

    pub fn current_token(&self) -> Option<&'a Token<'src, T>> {
        self.nth(0)
    }

    /// True when the cursor sits at the first token of a line.
    pub fn at_line_start(&self, is_newline: impl Fn(T) -> bool) -> bool {
        self.pos == 0 || self.tokens.get(self.pos - 1).is_some_and(|t| is_newline(t.kind))
    }

    /// Consume `n` tokens.
    pub fn bump(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.tokens.len());
    }

    /// Move the cursor to an absolute token index at or after the cursor.
    pub fn seek(&mut self, pos: usize) {
        debug_assert!(pos >= self.pos, "builders may not rewind the cursor");
        self.pos = pos.min(self.tokens.len());
    }

    /// Attach a new node under the insertion point.
    pub fn push_node(&mut self, kind: N) -> NodeId {
        self.tree.append_new(self.current, kind)
    }

    pub fn error(&mut self, message: impl Into<String>, span: Option<Span>) {
        self.errors.push(ParseError::new(message, span));
    }

    /// Run the full builder list over `tokens`, attaching under `parent`.
    ///
    /// The nested run starts with a fresh state and its own insertion point;
    /// its errors are appended to this run's errors. The outer cursor and
    /// insertion point are left untouched.
    pub fn parse_nested(&mut self, parent: NodeId, tokens: &[Token<'src, T>]) {
        let mut inner = BuildContext {
            tree: &mut *self.tree,
            tokens,
            builders: self.builders,
            make_state: self.make_state,
            anchor: parent,
            current: parent,
            pos: 0,
            errors: Vec::new(),
            state: (self.make_state)(),
        };
        drive(&mut inner);
        let errors = inner.errors;
        self.errors.extend(errors);
    }
}

/// The construction engine for one grammar.
pub struct Constructor<T, N, S> {
    builders: Vec<Box<dyn NodeBuilder<T, N, S>>>,
    state: fn() -> S,
}

impl<T: Copy + Tag, N, S> Constructor<T, N, S> {
    pub fn new(builders: Vec<Box<dyn NodeBuilder<T, N, S>>>, state: fn() -> S) -> Self {
        Self { builders, state }
    }

    pub fn builder_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.builders.iter().map(|b| b.name())
    }

    /// Build a tree with a `root` node from `tokens`.
    pub fn parse(&self, tokens: &[Token<'_, T>], root: N) -> (Tree<N>, Vec<ParseError>) {
        let mut tree = Tree::new(root);
        let at = tree.root();
        let errors = self.parse_into(&mut tree, at, tokens);
        (tree, errors)
    }

    /// Build from `tokens` into an existing tree, under `at`.
    pub fn parse_into(
        &self,
        tree: &mut Tree<N>,
        at: NodeId,
        tokens: &[Token<'_, T>],
    ) -> Vec<ParseError> {
        let mut cx = BuildContext {
            tree,
            tokens,
            builders: &self.builders,
            make_state: self.state,
            anchor: at,
            current: at,
            pos: 0,
            errors: Vec::new(),
            state: (self.state)(),
        };
        drive(&mut cx);
        log::debug!(
            "constructed {} nodes from {} tokens ({} errors)",
            cx.tree.subtree_size(at),
            tokens.len(),
            cx.errors.len()
        );
        cx.errors
    }
}

fn drive<T: Copy + Tag, N, S>(cx: &mut BuildContext<'_, '_, T, N, S>) {
    let builders = cx.builders;

    while !cx.at_end() {
        let start = cx.pos;
        let token = cx.tokens[start];
        let accepted = builders.iter().find(|b| b.build(cx));

        match accepted {
            Some(b) if cx.pos == start => {
                cx.error(
                    format!("builder `{}` made no progress at {}", b.name(), token.kind.tag()),
                    Some(token.span),
                );
                cx.bump(1);
            }
            Some(b) => log::trace!("builder `{}` consumed tokens {start}..{}", b.name(), cx.pos),
            None => {
                cx.error(
                    format!("unrecognized token {} {:?}", token.kind.tag(), token.text),
                    Some(token.span),
                );
                cx.bump(1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Tok {
        Word,
        Open,
        Close,
        Bang,
    }

    impl Tag for Tok {
        fn tag(&self) -> &'static str {
            match self {
                Tok::Word => "word",
                Tok::Open => "open",
                Tok::Close => "close",
                Tok::Bang => "bang",
            }
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    enum Node {
        Root,
        Group,
        Word(String),
    }

    type Cx<'a, 'src> = BuildContext<'a, 'src, Tok, Node, usize>;

    struct Word;
    impl NodeBuilder<Tok, Node, usize> for Word {
        fn name(&self) -> &'static str {
            "word"
        }
        fn build(&self, cx: &mut Cx<'_, '_>) -> bool {
            let Some(t) = cx.current_token().filter(|t| t.kind == Tok::Word) else {
                return false;
            };
            cx.push_node(Node::Word(t.text.to_string()));
            cx.bump(1);
            true
        }
    }

    /// `(` opens a group and descends into it.
    struct Open;
    impl NodeBuilder<Tok, Node, usize> for Open {
        fn name(&self) -> &'static str {
            "open"
        }
        fn build(&self, cx: &mut Cx<'_, '_>) -> bool {
            if cx.current_token().map(|t| t.kind) != Some(Tok::Open) {
                return false;
            }
            let group = cx.push_node(Node::Group);
            cx.set_current(group);
            cx.state += 1;
            cx.bump(1);
            true
        }
    }

    /// `)` climbs back out, only when a group is open.
    struct Close;
    impl NodeBuilder<Tok, Node, usize> for Close {
        fn name(&self) -> &'static str {
            "close"
        }
        fn build(&self, cx: &mut Cx<'_, '_>) -> bool {
            if cx.current_token().map(|t| t.kind) != Some(Tok::Close) || cx.state == 0 {
                return false;
            }
            let parent = cx.tree().parent(cx.current()).unwrap_or(cx.current());
            cx.set_current(parent);
            cx.state -= 1;
            cx.bump(1);
            true
        }
    }

    /// Accepts `!` without consuming it.
    struct Lazy;
    impl NodeBuilder<Tok, Node, usize> for Lazy {
        fn name(&self) -> &'static str {
            "lazy"
        }
        fn build(&self, cx: &mut Cx<'_, '_>) -> bool {
            cx.current_token().map(|t| t.kind) == Some(Tok::Bang)
        }
    }

    fn constructor() -> Constructor<Tok, Node, usize> {
        Constructor::new(
            vec![Box::new(Word), Box::new(Open), Box::new(Close), Box::new(Lazy)],
            || 0,
        )
    }

    fn toks(spec: &[(Tok, &'static str)]) -> Vec<Token<'static, Tok>> {
        let mut offset = 0;
        spec.iter()
            .map(|&(kind, text)| {
                let span = Span::new(offset, offset + text.len());
                offset = span.end;
                Token::new(kind, text, span)
            })
            .collect()
    }

    #[test]
    fn builders_move_insertion_point() {
        let tokens = toks(&[
            (Tok::Word, "a"),
            (Tok::Open, "("),
            (Tok::Word, "b"),
            (Tok::Close, ")"),
            (Tok::Word, "c"),
        ]);
        let (tree, errors) = constructor().parse(&tokens, Node::Root);
        assert!(errors.is_empty());

        let root = tree.root();
        let kinds: Vec<_> = tree.children(root).iter().map(|&c| tree.kind(c).clone()).collect();
        assert_eq!(
            kinds,
            vec![Node::Word("a".into()), Node::Group, Node::Word("c".into())]
        );
        let group = tree.child(root, 1);
        assert_eq!(tree.kind(tree.child(group, 0)), &Node::Word("b".into()));
    }

    #[test]
    fn unrecognized_token_is_reported_and_skipped() {
        // A close without an open group is declined by every builder.
        let tokens = toks(&[(Tok::Close, ")"), (Tok::Word, "a")]);
        let (tree, errors) = constructor().parse(&tokens, Node::Root);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.starts_with("unrecognized token close"));
        assert_eq!(errors[0].span, Some(Span::new(0, 1)));
        assert_eq!(tree.children(tree.root()).len(), 1);
    }

    #[test]
    fn no_progress_is_reported_and_skipped() {
        let tokens = toks(&[(Tok::Bang, "!"), (Tok::Word, "a")]);
        let (tree, errors) = constructor().parse(&tokens, Node::Root);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("`lazy` made no progress"));
        assert_eq!(tree.children(tree.root()).len(), 1);
    }

    #[test]
    fn errors_plus_consumed_equals_token_count() {
        let tokens = toks(&[
            (Tok::Bang, "!"),
            (Tok::Close, ")"),
            (Tok::Word, "a"),
            (Tok::Open, "("),
            (Tok::Bang, "!"),
        ]);
        let (_, errors) = constructor().parse(&tokens, Node::Root);
        // Word and Open consume one token each.
        assert_eq!(errors.len() + 2, tokens.len());
    }

    /// `(` parses its body with a nested run up to the matching `)`.
    struct NestedGroup;
    impl NodeBuilder<Tok, Node, usize> for NestedGroup {
        fn name(&self) -> &'static str {
            "nested-group"
        }
        fn build(&self, cx: &mut Cx<'_, '_>) -> bool {
            if cx.current_token().map(|t| t.kind) != Some(Tok::Open) {
                return false;
            }
            let rest = cx.remaining();
            let Some(close) = rest.iter().position(|t| t.kind == Tok::Close) else {
                return false;
            };
            let group = cx.push_node(Node::Group);
            let body: Vec<_> = rest[1..close].to_vec();
            cx.parse_nested(group, &body);
            cx.bump(close + 1);
            true
        }
    }

    #[test]
    fn nested_run_attaches_under_given_node() {
        let c = Constructor::new(vec![Box::new(NestedGroup), Box::new(Word)], || 0);
        let tokens = toks(&[
            (Tok::Open, "("),
            (Tok::Word, "x"),
            (Tok::Bang, "!"),
            (Tok::Close, ")"),
            (Tok::Word, "y"),
        ]);
        let (tree, errors) = c.parse(&tokens, Node::Root);

        let root = tree.root();
        assert_eq!(tree.children(root).len(), 2);
        let group = tree.child(root, 0);
        assert_eq!(tree.children(group).len(), 1);
        // The bang inside the group is unrecognized by the nested run.
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].span, Some(Span::new(2, 3)));
    }
}
