//! # marksmith-engine
//!
//! Concrete grammars for the `marksmith-syntax` engines.
//!
//! ## Grammars
//!
//! - [`markdown`]: an extended Markdown dialect. Block structure (headings,
//!   code, quotes, admonitions, containers, lists, tables, definitions) and
//!   inline structure (emphasis, links, code spans, autolinks, formulas),
//!   followed by reference and footnote resolution.
//! - [`formula`]: a LaTeX-like expression language with operator
//!   precedence, groups and commands with brace arguments.
//!
//! ```
//! use marksmith_engine::{markdown, MarkdownOptions};
//! use marksmith_syntax::printer::render;
//!
//! let result = markdown::parse("# Title\n", &MarkdownOptions::default());
//! assert_eq!(
//!     render(&result.tree, result.tree.root()),
//!     "document\n  heading level=1\n    text \"Title\"\n"
//! );
//! ```
//!
//! ## Module Structure
//!
//! ```text
//! marksmith-engine/
//! ├── lib.rs            # This file - public API
//! ├── options.rs        # MarkdownOptions extension switches
//! ├── markdown/
//! │   ├── mod.rs        # Token and node kinds, grammar bundle
//! │   ├── lexer.rs      # Token recognizers
//! │   ├── block.rs      # Block builders and line helpers
//! │   ├── list.rs       # Indentation-stacked lists
//! │   ├── table.rs      # Pipe tables
//! │   ├── inline.rs     # Delimiter scanner for inline content
//! │   └── resolve.rs    # Reference and footnote resolution
//! └── formula/
//!     ├── mod.rs        # Token and node kinds, grammar bundle
//!     ├── lexer.rs      # Token recognizers
//!     └── expr.rs       # Recursive-descent expression parser
//! ```

pub mod formula;
pub mod markdown;
pub mod options;

pub use options::MarkdownOptions;
