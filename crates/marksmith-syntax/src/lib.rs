//! # marksmith-syntax
//!
//! A small framework for building tokenizers and tree constructors out of
//! **ordered recognizer strategies**, plus the arena tree they produce.
//!
//! Grammars live elsewhere (see `marksmith-engine` for Markdown and formula
//! grammars). This crate only knows how to drive them.
//!
//! ## Architecture Overview
//!
//! ```text
//! Source Text → Tokenizer → Tokens → Constructor → Tree → Post Pass
//!               (recognizers)         (builders)          (optional)
//! ```
//!
//! ### 1. Tokenizer ([`tokenizer`] module)
//!
//! Walks the source offering each position to an ordered list of
//! [`TokenRecognizer`]s. The first that accepts emits tokens and moves the
//! cursor. Characters nobody claims become "unrecognized character" errors,
//! so the loop always advances.
//!
//! ```text
//! "# Hi\n" → [hash "#", whitespace " ", text "Hi", newline "\n", end-of-input ""]
//! ```
//!
//! ### 2. Constructor ([`constructor`] module)
//!
//! The same dispatch pattern over tokens. [`NodeBuilder`]s attach nodes under
//! an insertion point and move it to open or close scopes. Builders that
//! accept without consuming, and tokens that no builder accepts, are
//! recorded as errors and skipped.
//!
//! ### 3. Tree ([`tree`] module)
//!
//! An arena of nodes addressed by [`NodeId`], with parent links kept
//! consistent by every mutation, pre-order and level-order traversal, and
//! an allocation-independent structural hash.
//!
//! ## Error Tolerance
//!
//! Nothing in the pipeline fails. Lexical and structural problems are
//! collected as [`ParseError`] values in two ordered streams; the tree
//! always comes back, with malformed regions degraded to literal content.
//!
//! ## Module Structure
//!
//! ```text
//! marksmith-syntax/
//! ├── lib.rs          # This file - public API
//! ├── span.rs         # Byte ranges into the source
//! ├── token.rs        # Tag trait, Token, ParseError
//! ├── tree.rs         # Arena tree, traversal, structural hash
//! ├── tokenizer.rs    # Recognizer-driven tokenization engine
//! ├── constructor.rs  # Builder-driven construction engine, nested runs
//! ├── grammar.rs      # Grammar bundle and the parse() entry point
//! └── printer.rs      # Indented text rendering
//! ```

pub mod constructor;
pub mod grammar;
pub mod printer;
pub mod span;
pub mod token;
pub mod tokenizer;
pub mod tree;

pub use constructor::{BuildContext, Constructor, NodeBuilder};
pub use grammar::{Grammar, Parse, parse};
pub use span::Span;
pub use token::{ParseError, Tag, Token};
pub use tokenizer::{TokenRecognizer, TokenizeContext, Tokenizer};
pub use tree::{NodeId, Tree};
