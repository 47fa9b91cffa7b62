//! Grammar bundles and the parse entry point.
//!
//! A [`Grammar`] is the only thing a language has to provide: a configured
//! [`Tokenizer`], a configured [`Constructor`], the root node kind, and an
//! optional pass that rewrites the finished tree. [`parse`] runs the
//! pipeline:
//!
//! ```text
//! source ─► Tokenizer ─► tokens ─► Constructor ─► tree ─► post pass ─► Parse
//!              │                        │
//!              └─ lex errors            └─ parse errors
//! ```

use crate::constructor::Constructor;
use crate::token::{ParseError, Tag, Token};
use crate::tokenizer::Tokenizer;
use crate::tree::Tree;

/// Everything needed to parse one language.
///
/// Bundles are immutable after construction and can serve any number of
/// parse calls.
pub struct Grammar<T, N, TS, NS> {
    pub tokenizer: Tokenizer<T, TS>,
    pub constructor: Constructor<T, N, NS>,
    root: fn() -> N,
    post_process: Option<fn(&mut Tree<N>)>,
}

impl<T: Copy + Tag, N, TS, NS> Grammar<T, N, TS, NS> {
    pub fn new(
        tokenizer: Tokenizer<T, TS>,
        constructor: Constructor<T, N, NS>,
        root: fn() -> N,
    ) -> Self {
        Self {
            tokenizer,
            constructor,
            root,
            post_process: None,
        }
    }

    /// Run `pass` over every finished tree.
    pub fn with_post_process(mut self, pass: fn(&mut Tree<N>)) -> Self {
        self.post_process = Some(pass);
        self
    }

    pub fn has_post_process(&self) -> bool {
        self.post_process.is_some()
    }

    pub fn parse<'src>(&self, source: &'src str) -> Parse<'src, T, N> {
        parse(source, self)
    }
}

/// The result of parsing one source text.
#[derive(Debug)]
pub struct Parse<'src, T, N> {
    pub tree: Tree<N>,
    pub tokens: Vec<Token<'src, T>>,
    pub lex_errors: Vec<ParseError>,
    pub parse_errors: Vec<ParseError>,
}

impl<T, N> Parse<'_, T, N> {
    /// Lexical errors followed by structural errors.
    pub fn errors(&self) -> impl Iterator<Item = &ParseError> {
        self.lex_errors.iter().chain(&self.parse_errors)
    }

    pub fn has_errors(&self) -> bool {
        !self.lex_errors.is_empty() || !self.parse_errors.is_empty()
    }
}

/// Tokenize `source`, build a tree from the tokens, then post-process it.
pub fn parse<'src, T: Copy + Tag, N, TS, NS>(
    source: &'src str,
    grammar: &Grammar<T, N, TS, NS>,
) -> Parse<'src, T, N> {
    let (tokens, lex_errors) = grammar.tokenizer.tokenize(source);
    let (mut tree, parse_errors) = grammar.constructor.parse(&tokens, (grammar.root)());
    if let Some(pass) = grammar.post_process {
        pass(&mut tree);
    }
    Parse {
        tree,
        tokens,
        lex_errors,
        parse_errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constructor::{BuildContext, NodeBuilder};
    use crate::tokenizer::{TokenRecognizer, TokenizeContext};
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Tok {
        Digit,
        End,
    }

    impl Tag for Tok {
        fn tag(&self) -> &'static str {
            match self {
                Tok::Digit => "digit",
                Tok::End => "end",
            }
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Node {
        Sum,
        Digit(u32),
        Total(u32),
    }

    struct Digit;
    impl TokenRecognizer<Tok, ()> for Digit {
        fn name(&self) -> &'static str {
            "digit"
        }
        fn recognize(&self, cx: &mut TokenizeContext<'_, Tok, ()>) -> bool {
            if !cx.peek().is_some_and(|c| c.is_ascii_digit()) {
                return false;
            }
            cx.emit(Tok::Digit, 1);
            true
        }
    }

    struct DigitNode;
    impl NodeBuilder<Tok, Node, ()> for DigitNode {
        fn name(&self) -> &'static str {
            "digit"
        }
        fn build(&self, cx: &mut BuildContext<'_, '_, Tok, Node, ()>) -> bool {
            let Some(t) = cx.current_token().filter(|t| t.kind == Tok::Digit) else {
                return false;
            };
            let value = t.text.parse().unwrap_or_default();
            cx.push_node(Node::Digit(value));
            cx.bump(1);
            true
        }
    }

    struct End;
    impl NodeBuilder<Tok, Node, ()> for End {
        fn name(&self) -> &'static str {
            "end"
        }
        fn build(&self, cx: &mut BuildContext<'_, '_, Tok, Node, ()>) -> bool {
            if cx.current_token().map(|t| t.kind) != Some(Tok::End) {
                return false;
            }
            cx.bump(1);
            true
        }
    }

    fn total(tree: &mut Tree<Node>) {
        let root = tree.root();
        let sum = tree
            .children(root)
            .iter()
            .map(|&c| match tree.kind(c) {
                Node::Digit(d) => *d,
                _ => 0,
            })
            .sum();
        tree.append_new(root, Node::Total(sum));
    }

    fn grammar() -> Grammar<Tok, Node, (), ()> {
        Grammar::new(
            Tokenizer::new(vec![Box::new(Digit)], || ()).with_end_of_input(|_| Tok::End),
            Constructor::new(vec![Box::new(DigitNode), Box::new(End)], || ()),
            || Node::Sum,
        )
    }

    #[test]
    fn pipeline_produces_tree_and_tokens() {
        let result = grammar().parse("12");
        assert_eq!(result.tokens.len(), 3);
        assert!(!result.has_errors());
        let root = result.tree.root();
        assert_eq!(result.tree.kind(root), &Node::Sum);
        assert_eq!(result.tree.children(root).len(), 2);
    }

    #[test]
    fn post_process_runs_last() {
        let result = grammar().with_post_process(total).parse("345");
        let root = result.tree.root();
        let last = result.tree.last_child(root).unwrap();
        assert_eq!(result.tree.kind(last), &Node::Total(12));
    }

    #[test]
    fn errors_are_chained_lexical_first() {
        let result = parse("1x2", &grammar());
        assert_eq!(result.lex_errors.len(), 1);
        assert!(result.parse_errors.is_empty());
        let messages: Vec<_> = result.errors().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["unrecognized character \"x\""]);
    }
}
