//! Property-based tests for both grammars.
//!
//! Inputs are drawn from alphabets rich in syntax characters so that the
//! generated documents actually exercise fences, lists, tables, emphasis and
//! brackets rather than plain prose.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use marksmith_engine::formula::{FormulaNode, FormulaParse, FormulaToken, expr};
use marksmith_engine::markdown::{self, resolve::resolve_references};
use marksmith_engine::{MarkdownOptions, formula};
use marksmith_syntax::{BuildContext, Constructor, Grammar, NodeBuilder};
use proptest::prelude::*;

type FormulaBuilder = Box<dyn NodeBuilder<FormulaToken, FormulaNode, ()>>;

/// Wraps a builder, adding the tokens it consumes on acceptance to a shared
/// counter.
struct Counting {
    inner: FormulaBuilder,
    consumed: Rc<Cell<usize>>,
}

impl NodeBuilder<FormulaToken, FormulaNode, ()> for Counting {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn build(&self, cx: &mut BuildContext<'_, '_, FormulaToken, FormulaNode, ()>) -> bool {
        let start = cx.pos();
        let accepted = self.inner.build(cx);
        if accepted && cx.pos() > start {
            self.consumed.set(self.consumed.get() + cx.pos() - start);
        }
        accepted
    }
}

/// Parse `source` with the formula builders wrapped in [`Counting`],
/// returning the result and the number of tokens builders consumed.
fn counted_formula_parse(source: &str) -> (FormulaParse<'_>, usize) {
    let consumed = Rc::new(Cell::new(0));
    let inner: Vec<FormulaBuilder> = vec![
        Box::new(expr::Delimiter),
        Box::new(expr::Expression),
        Box::new(expr::EndOfInput),
    ];
    let builders: Vec<FormulaBuilder> = inner
        .into_iter()
        .map(|inner| {
            Box::new(Counting {
                inner,
                consumed: Rc::clone(&consumed),
            }) as FormulaBuilder
        })
        .collect();
    let grammar = Grammar::new(
        formula::lexer::tokenizer(),
        Constructor::new(builders, || ()),
        || FormulaNode::Formula,
    );
    let result = grammar.parse(source);
    (result, consumed.get())
}

const TIME_LIMIT: Duration = Duration::from_secs(5);

fn markdown_source() -> impl Strategy<Value = String> {
    prop_oneof![
        r"[a-z0-9 #*_~`>\-+.:!$|\[\]()<>\\\n\t]{0,200}",
        prop::collection::vec(
            prop_oneof![
                Just("# heading\n"),
                Just("- item\n"),
                Just("  - nested\n"),
                Just("1. first\n"),
                Just("> quote\n"),
                Just("> [!NOTE]\n"),
                Just("```rust\n"),
                Just("```\n"),
                Just("    code\n"),
                Just("| a | b |\n"),
                Just("|---|:-:|\n"),
                Just(":::box\n"),
                Just(":::\n"),
                Just("$$x^2$$\n"),
                Just("[ref]: /url \"t\"\n"),
                Just("[^1]: note\n"),
                Just("*em* **strong** ~~gone~~ [link](u) [ref] [^1]\n"),
                Just("text with `code` and $x$\n"),
                Just("\n"),
            ],
            0..30,
        )
        .prop_map(|lines| lines.concat()),
    ]
}

fn formula_source() -> impl Strategy<Value = String> {
    r"[a-c0-9 .+\-*/^_=<>|(){}\\\[\]]{0,60}"
}

proptest! {
    #[test]
    fn markdown_tokens_rebuild_the_source(source in markdown_source()) {
        let result = markdown::parse(&source, &MarkdownOptions::default());
        let rebuilt: String = result.tokens.iter().map(|t| t.text).collect();
        prop_assert_eq!(&rebuilt, &source);
        prop_assert!(result.lex_errors.is_empty());
    }

    #[test]
    fn markdown_spans_match_their_text(source in markdown_source()) {
        let result = markdown::parse(&source, &MarkdownOptions::core());
        let mut offset = 0;
        for token in &result.tokens {
            prop_assert_eq!(token.span.start, offset);
            prop_assert_eq!(&source[token.span.range()], token.text);
            offset = token.span.end;
        }
    }

    #[test]
    fn markdown_builders_account_for_every_token(source in markdown_source()) {
        let result = markdown::parse(&source, &MarkdownOptions::default());
        prop_assert!(result.parse_errors.is_empty(), "{:?}", result.parse_errors);
    }

    #[test]
    fn resolution_is_idempotent(source in markdown_source()) {
        let mut result = markdown::parse(&source, &MarkdownOptions::default());
        let root = result.tree.root();
        let once = result.tree.structural_hash(root);
        resolve_references(&mut result.tree);
        prop_assert_eq!(result.tree.structural_hash(root), once);
    }

    #[test]
    fn formula_tokens_skip_only_whitespace_and_errors(source in formula_source()) {
        let result = formula::parse(&source);
        let mut covered = vec![false; source.len()];
        let lexed = result.tokens.iter().map(|t| t.span);
        let skipped = result.lex_errors.iter().filter_map(|e| e.span);
        for span in lexed.chain(skipped) {
            for slot in &mut covered[span.range()] {
                prop_assert!(!*slot);
                *slot = true;
            }
        }
        for (i, c) in source.char_indices() {
            prop_assert!(covered[i] || c.is_whitespace());
        }
    }

    #[test]
    fn formula_errors_never_exceed_tokens(source in formula_source()) {
        let result = formula::parse(&source);
        prop_assert!(result.parse_errors.len() < result.tokens.len());
    }

    #[test]
    fn formula_builders_and_errors_account_for_every_token(source in formula_source()) {
        let (result, consumed) = counted_formula_parse(&source);
        prop_assert_eq!(consumed + result.parse_errors.len(), result.tokens.len());
    }
}

#[test]
fn adversarial_markdown_parses_in_bounded_time() {
    let inputs = [
        "*a ".repeat(200),
        "_a ".repeat(200),
        "**a ".repeat(200),
        "~~a ".repeat(200),
        "[".repeat(200),
        "![".repeat(200),
        format!("{}a{}", "[".repeat(100), "]".repeat(100)),
        format!("{}a{}", "[".repeat(100), "](u)".repeat(100)),
        "> ".repeat(50) + "x",
        "- ".repeat(50) + "x",
        "`".repeat(200),
        "$".repeat(200),
    ];
    for source in &inputs {
        let started = Instant::now();
        let result = markdown::parse(source, &MarkdownOptions::default());
        assert!(
            started.elapsed() < TIME_LIMIT,
            "slow parse of {:?}",
            &source[..source.len().min(20)]
        );
        let rebuilt: String = result.tokens.iter().map(|t| t.text).collect();
        assert_eq!(&rebuilt, source);
    }
}

#[test]
fn adversarial_formulas_parse_in_bounded_time() {
    let inputs = [
        "(".repeat(100) + "a",
        "{".repeat(100),
        "}".repeat(100),
        format!("{}a{}", "{".repeat(100), "}".repeat(100)),
        r"rac{".repeat(100),
        "a^".repeat(100),
        "|".repeat(100),
        "-".repeat(200) + "a",
    ];
    for source in &inputs {
        let started = Instant::now();
        let (result, consumed) = counted_formula_parse(source);
        assert!(
            started.elapsed() < TIME_LIMIT,
            "slow parse of {:?}",
            &source[..source.len().min(20)]
        );
        assert_eq!(consumed + result.parse_errors.len(), result.tokens.len());
    }
}
