//! # Markdown Grammar
//!
//! An extended Markdown dialect expressed as a [`Grammar`] bundle for the
//! generic engines in `marksmith-syntax`.
//!
//! ## Layers
//!
//! ```text
//! source ─► lexer (recognizers) ─► MdToken stream
//!        ─► block builders ─► Document / Paragraph / List / Table ...
//!             └─► inline scanner ─► Text / Emphasis / Link ...
//!        ─► resolver ─► reference links become links
//! ```
//!
//! - [`lexer`]: context-light token recognizers. Multi-line constructs
//!   (fenced code, indented code, display formulas) become single tokens;
//!   everything else is small punctuation, text, number and whitespace
//!   tokens that together cover every byte of the source.
//! - [`block`]: line-oriented builders tried in a fixed priority order,
//!   with [`list`] and [`table`] in their own modules.
//! - [`inline`]: the delimiter scanner shared by every block that holds
//!   inline content.
//! - [`resolve`]: the post-construction pass for references and footnotes.
//!
//! ## Extensions
//!
//! Tables, formulas, containers, footnotes, task lists, strikethrough and
//! bare autolinks are switched by [`MarkdownOptions`].

pub mod block;
pub mod inline;
pub mod lexer;
pub mod list;
pub mod resolve;
pub mod table;

use std::fmt;

use marksmith_syntax::{Constructor, Grammar, NodeBuilder, Parse, Tag, Token};

use crate::options::MarkdownOptions;

pub use block::BlockState;
pub use lexer::LexState;

/// Token kinds of the Markdown lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MdToken {
    Text,
    Whitespace,
    Newline,
    Number,
    Hash,
    Star,
    Underscore,
    Tilde,
    Backslash,
    Backtick,
    Gt,
    Lt,
    Dash,
    Plus,
    Dot,
    Colon,
    Exclaim,
    Dollar,
    Pipe,
    LBracket,
    RBracket,
    LParen,
    RParen,
    /// A whole fenced code block, opening fence through closing fence.
    FencedCode,
    /// A whole run of indented code lines.
    IndentedCode,
    CodeSpan,
    /// `<scheme:...>` or `<user@host>`.
    AutoLink,
    Url,
    Email,
    InlineFormula,
    DisplayFormula,
    /// A `:::name` or `:::` line.
    ContainerFence,
    InlineHtml,
    EndOfInput,
}

impl MdToken {
    /// Single-character punctuation tokens, the ones a backslash can escape.
    pub fn is_punctuation(self) -> bool {
        use MdToken::*;
        matches!(
            self,
            Hash | Star
                | Underscore
                | Tilde
                | Backslash
                | Backtick
                | Gt
                | Lt
                | Dash
                | Plus
                | Dot
                | Colon
                | Exclaim
                | Dollar
                | Pipe
                | LBracket
                | RBracket
                | LParen
                | RParen
        )
    }
}

impl Tag for MdToken {
    fn tag(&self) -> &'static str {
        use MdToken::*;
        match self {
            Text => "text",
            Whitespace => "whitespace",
            Newline => "newline",
            Number => "number",
            Hash => "hash",
            Star => "star",
            Underscore => "underscore",
            Tilde => "tilde",
            Backslash => "backslash",
            Backtick => "backtick",
            Gt => "gt",
            Lt => "lt",
            Dash => "dash",
            Plus => "plus",
            Dot => "dot",
            Colon => "colon",
            Exclaim => "exclaim",
            Dollar => "dollar",
            Pipe => "pipe",
            LBracket => "l_bracket",
            RBracket => "r_bracket",
            LParen => "l_paren",
            RParen => "r_paren",
            FencedCode => "fenced_code",
            IndentedCode => "indented_code",
            CodeSpan => "code_span",
            AutoLink => "autolink",
            Url => "url",
            Email => "email",
            InlineFormula => "inline_formula",
            DisplayFormula => "display_formula",
            ContainerFence => "container_fence",
            InlineHtml => "inline_html",
            EndOfInput => "end_of_input",
        }
    }
}

/// Column alignment from a table delimiter row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Alignment {
    #[default]
    None,
    Left,
    Center,
    Right,
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Alignment::None => "none",
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
        })
    }
}

/// Node kinds of the Markdown tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MdNode {
    Document,
    Heading {
        level: u8,
    },
    Paragraph,
    BlockQuote,
    /// A blockquote opened by `[!KEYWORD]`.
    Admonition {
        kind: String,
    },
    CodeBlock {
        info: Option<String>,
        literal: String,
        fenced: bool,
    },
    FormulaBlock {
        literal: String,
    },
    ThematicBreak,
    List {
        ordered: bool,
        start: Option<u64>,
    },
    ListItem,
    TaskItem {
        checked: bool,
    },
    Table {
        alignments: Vec<Alignment>,
    },
    TableRow {
        header: bool,
    },
    TableCell {
        alignment: Alignment,
    },
    Container {
        name: String,
    },
    ReferenceDefinition {
        label: String,
        url: String,
        title: Option<String>,
    },
    FootnoteDefinition {
        label: String,
    },
    Text {
        text: String,
    },
    Emphasis,
    Strong,
    Strikethrough,
    InlineCode {
        literal: String,
    },
    Link {
        url: String,
        title: Option<String>,
    },
    Image {
        url: String,
        title: Option<String>,
    },
    /// `[text][label]`, `[text][]` or `[text]`, before resolution.
    ReferenceLink {
        label: Option<String>,
    },
    ReferenceImage {
        label: Option<String>,
    },
    AutoLink {
        url: String,
        email: bool,
    },
    InlineHtml {
        raw: String,
    },
    LineBreak,
    SoftBreak,
    FootnoteReference {
        label: String,
        /// 1-based number, assigned by the resolver when a definition exists.
        index: Option<usize>,
    },
    Formula {
        literal: String,
        display: bool,
    },
}

impl MdNode {
    pub fn is_block(&self) -> bool {
        use MdNode::*;
        matches!(
            self,
            Document
                | Heading { .. }
                | Paragraph
                | BlockQuote
                | Admonition { .. }
                | CodeBlock { .. }
                | FormulaBlock { .. }
                | ThematicBreak
                | List { .. }
                | ListItem
                | TaskItem { .. }
                | Table { .. }
                | TableRow { .. }
                | TableCell { .. }
                | Container { .. }
                | ReferenceDefinition { .. }
                | FootnoteDefinition { .. }
        )
    }
}

impl Tag for MdNode {
    fn tag(&self) -> &'static str {
        use MdNode::*;
        match self {
            Document => "document",
            Heading { .. } => "heading",
            Paragraph => "paragraph",
            BlockQuote => "block_quote",
            Admonition { .. } => "admonition",
            CodeBlock { .. } => "code_block",
            FormulaBlock { .. } => "formula_block",
            ThematicBreak => "thematic_break",
            List { .. } => "list",
            ListItem => "list_item",
            TaskItem { .. } => "task_item",
            Table { .. } => "table",
            TableRow { .. } => "table_row",
            TableCell { .. } => "table_cell",
            Container { .. } => "container",
            ReferenceDefinition { .. } => "reference_definition",
            FootnoteDefinition { .. } => "footnote_definition",
            Text { .. } => "text",
            Emphasis => "emphasis",
            Strong => "strong",
            Strikethrough => "strikethrough",
            InlineCode { .. } => "inline_code",
            Link { .. } => "link",
            Image { .. } => "image",
            ReferenceLink { .. } => "reference_link",
            ReferenceImage { .. } => "reference_image",
            AutoLink { .. } => "autolink",
            InlineHtml { .. } => "inline_html",
            LineBreak => "line_break",
            SoftBreak => "soft_break",
            FootnoteReference { .. } => "footnote_reference",
            Formula { .. } => "formula",
        }
    }
}

impl fmt::Display for MdNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use MdNode::*;
        f.write_str(self.tag())?;
        match self {
            Heading { level } => write!(f, " level={level}"),
            Admonition { kind } => write!(f, " kind={kind}"),
            CodeBlock {
                info,
                literal,
                fenced,
            } => {
                if let Some(info) = info {
                    write!(f, " info={info}")?;
                }
                write!(f, " fenced={fenced} {literal:?}")
            }
            FormulaBlock { literal } | InlineCode { literal } => write!(f, " {literal:?}"),
            List { ordered, start } => {
                write!(f, " ordered={ordered}")?;
                match start {
                    Some(n) => write!(f, " start={n}"),
                    None => Ok(()),
                }
            }
            TaskItem { checked } => write!(f, " checked={checked}"),
            Table { alignments } => {
                let cols: Vec<String> = alignments.iter().map(|a| a.to_string()).collect();
                write!(f, " [{}]", cols.join(", "))
            }
            TableRow { header } => write!(f, " header={header}"),
            TableCell { alignment } => write!(f, " align={alignment}"),
            Container { name } => write!(f, " name={name}"),
            ReferenceDefinition { label, url, title } => {
                write!(f, " [{label}] {url:?}")?;
                write_title(f, title)
            }
            FootnoteDefinition { label } => write!(f, " [^{label}]"),
            Text { text } => write!(f, " {text:?}"),
            Link { url, title } | Image { url, title } => {
                write!(f, " {url:?}")?;
                write_title(f, title)
            }
            ReferenceLink { label } | ReferenceImage { label } => match label {
                Some(label) => write!(f, " [{label}]"),
                None => Ok(()),
            },
            AutoLink { url, email } => write!(f, " {url:?} email={email}"),
            InlineHtml { raw } => write!(f, " {raw:?}"),
            FootnoteReference { label, index } => {
                write!(f, " [^{label}]")?;
                match index {
                    Some(i) => write!(f, " #{i}"),
                    None => Ok(()),
                }
            }
            Formula { literal, display } => write!(f, " display={display} {literal:?}"),
            Document | Paragraph | BlockQuote | ThematicBreak | ListItem | Emphasis | Strong
            | Strikethrough | LineBreak | SoftBreak => Ok(()),
        }
    }
}

fn write_title(f: &mut fmt::Formatter<'_>, title: &Option<String>) -> fmt::Result {
    match title {
        Some(t) => write!(f, " title={t:?}"),
        None => Ok(()),
    }
}

pub type MdTok<'src> = Token<'src, MdToken>;
pub type MarkdownGrammar = Grammar<MdToken, MdNode, LexState, BlockState>;
pub type MarkdownParse<'src> = Parse<'src, MdToken, MdNode>;

/// Build the Markdown grammar bundle for `options`.
pub fn grammar(options: &MarkdownOptions) -> MarkdownGrammar {
    let opts = *options;

    let mut builders: Vec<Box<dyn NodeBuilder<MdToken, MdNode, BlockState>>> = vec![
        Box::new(block::AtxHeading { opts }),
        Box::new(block::CodeBlock),
    ];
    if opts.formulas {
        builders.push(Box::new(block::FormulaBlock));
    }
    builders.push(Box::new(block::ThematicBreak));
    builders.push(Box::new(block::BlockQuote { opts }));
    if opts.containers {
        builders.push(Box::new(block::Container));
    }
    builders.push(Box::new(block::Definition { opts }));
    if opts.tables {
        builders.push(Box::new(table::TableBuilder { opts }));
    }
    builders.push(Box::new(list::ListBuilder { opts }));
    builders.push(Box::new(block::Paragraph { opts }));
    builders.push(Box::new(block::BlankLine));
    builders.push(Box::new(block::EndOfInput));

    let grammar = Grammar::new(
        lexer::tokenizer(&opts),
        Constructor::new(builders, BlockState::default),
        || MdNode::Document,
    );
    if opts.resolve_references {
        grammar.with_post_process(resolve::resolve_references)
    } else {
        grammar
    }
}

/// Parse `source` with a one-off grammar built from `options`.
pub fn parse<'src>(source: &'src str, options: &MarkdownOptions) -> MarkdownParse<'src> {
    grammar(options).parse(source)
}
