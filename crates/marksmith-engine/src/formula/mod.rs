//! # Formula Grammar
//!
//! A LaTeX-like expression language, parsed with the same engines as the
//! Markdown grammar. Markdown keeps formula bodies as literal strings; this
//! grammar turns such a literal into an expression tree.
//!
//! ```text
//! \frac{1}{2} + x^2
//!
//! formula
//!   binary +
//!     command \frac
//!       number 1
//!       number 2
//!     binary ^
//!       identifier x
//!       number 2
//! ```
//!
//! The lexer ([`lexer`]) drops whitespace. The constructor has three
//! builders: one that swallows `\(`, `\)`, `\[` and `\]` delimiters, one
//! that runs the recursive-descent parser in [`expr`] over as many tokens as
//! form an expression, and one for end of input. Anything the expression
//! parser leaves behind (a dangling operator, a stray `}` or `|`) is reported
//! by the engine as an unrecognized token.

pub mod expr;
pub mod lexer;

use std::fmt;

use marksmith_syntax::{Constructor, Grammar, NodeBuilder, Parse, Tag, Token};

/// Token kinds of the formula lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormulaToken {
    Number,
    Identifier,
    /// `\` followed by letters.
    Command,
    OpenInline,
    CloseInline,
    OpenDisplay,
    CloseDisplay,
    /// A backslash that starts neither a command nor a delimiter.
    Backslash,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    Underscore,
    Equals,
    Less,
    Greater,
    Pipe,
    EndOfInput,
}

impl FormulaToken {
    pub fn is_delimiter(self) -> bool {
        use FormulaToken::*;
        matches!(self, OpenInline | CloseInline | OpenDisplay | CloseDisplay)
    }
}

impl Tag for FormulaToken {
    fn tag(&self) -> &'static str {
        use FormulaToken::*;
        match self {
            Number => "number",
            Identifier => "identifier",
            Command => "command",
            OpenInline => "open_inline",
            CloseInline => "close_inline",
            OpenDisplay => "open_display",
            CloseDisplay => "close_display",
            Backslash => "backslash",
            LParen => "l_paren",
            RParen => "r_paren",
            LBrace => "l_brace",
            RBrace => "r_brace",
            Plus => "plus",
            Minus => "minus",
            Star => "star",
            Slash => "slash",
            Caret => "caret",
            Underscore => "underscore",
            Equals => "equals",
            Less => "less",
            Greater => "greater",
            Pipe => "pipe",
            EndOfInput => "end_of_input",
        }
    }
}

/// Binary and unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
    Subscript,
    Equals,
    Less,
    Greater,
}

impl Operator {
    pub fn from_token(kind: FormulaToken) -> Option<Operator> {
        Some(match kind {
            FormulaToken::Plus => Operator::Add,
            FormulaToken::Minus => Operator::Subtract,
            FormulaToken::Star => Operator::Multiply,
            FormulaToken::Slash => Operator::Divide,
            FormulaToken::Caret => Operator::Power,
            FormulaToken::Underscore => Operator::Subscript,
            FormulaToken::Equals => Operator::Equals,
            FormulaToken::Less => Operator::Less,
            FormulaToken::Greater => Operator::Greater,
            _ => return None,
        })
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::Power => "^",
            Operator::Subscript => "_",
            Operator::Equals => "=",
            Operator::Less => "<",
            Operator::Greater => ">",
        }
    }
}

/// Node kinds of the formula tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FormulaNode {
    Formula,
    Number { value: String },
    Identifier { name: String },
    /// A command such as `\frac`; its brace arguments are its children.
    Command { name: String },
    /// `( ... )` or `{ ... }`.
    Group { braced: bool },
    Binary { op: Operator },
    Unary { op: Operator },
}

impl Tag for FormulaNode {
    fn tag(&self) -> &'static str {
        match self {
            FormulaNode::Formula => "formula",
            FormulaNode::Number { .. } => "number",
            FormulaNode::Identifier { .. } => "identifier",
            FormulaNode::Command { .. } => "command",
            FormulaNode::Group { .. } => "group",
            FormulaNode::Binary { .. } => "binary",
            FormulaNode::Unary { .. } => "unary",
        }
    }
}

impl fmt::Display for FormulaNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())?;
        match self {
            FormulaNode::Formula => Ok(()),
            FormulaNode::Number { value } => write!(f, " {value}"),
            FormulaNode::Identifier { name } | FormulaNode::Command { name } => {
                write!(f, " {name}")
            }
            FormulaNode::Group { braced: true } => f.write_str(" {}"),
            FormulaNode::Group { braced: false } => f.write_str(" ()"),
            FormulaNode::Binary { op } | FormulaNode::Unary { op } => write!(f, " {}", op.symbol()),
        }
    }
}

pub type FormulaTok<'src> = Token<'src, FormulaToken>;
pub type FormulaGrammar = Grammar<FormulaToken, FormulaNode, (), ()>;
pub type FormulaParse<'src> = Parse<'src, FormulaToken, FormulaNode>;

/// Build the formula grammar bundle.
pub fn grammar() -> FormulaGrammar {
    let builders: Vec<Box<dyn NodeBuilder<FormulaToken, FormulaNode, ()>>> = vec![
        Box::new(expr::Delimiter),
        Box::new(expr::Expression),
        Box::new(expr::EndOfInput),
    ];
    Grammar::new(
        lexer::tokenizer(),
        Constructor::new(builders, || ()),
        || FormulaNode::Formula,
    )
}

/// Parse `source` with a one-off formula grammar.
pub fn parse(source: &str) -> FormulaParse<'_> {
    grammar().parse(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use marksmith_syntax::printer::render;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn dump(source: &str) -> String {
        let result = parse(source);
        render(&result.tree, result.tree.root())
    }

    #[test]
    fn fraction_has_two_number_arguments() {
        let result = parse(r"\frac{1}{2}");
        assert!(!result.has_errors());
        let tree = &result.tree;
        let frac = tree.child(tree.root(), 0);
        assert_eq!(
            tree.kind(frac),
            &FormulaNode::Command {
                name: r"\frac".into()
            }
        );
        let args: Vec<_> = tree.children(frac).iter().map(|&c| tree.kind(c).clone()).collect();
        assert_eq!(
            args,
            vec![
                FormulaNode::Number { value: "1".into() },
                FormulaNode::Number { value: "2".into() },
            ]
        );
    }

    #[test]
    fn snapshot_precedence() {
        assert_snapshot!(dump(r"\(a + b * c^2 = -x\)"), @r"
        formula
          binary =
            binary +
              identifier a
              binary *
                identifier b
                binary ^
                  identifier c
                  number 2
            unary -
              identifier x
        ");
    }

    #[rstest]
    #[case("1 - 2 - 3", "binary -\n  binary -\n    number 1\n    number 2\n  number 3\n")]
    #[case("x_i^2", "binary ^\n  binary _\n    identifier x\n    identifier i\n  number 2\n")]
    #[case("(a)", "group ()\n  identifier a\n")]
    #[case("{a}", "group {}\n  identifier a\n")]
    #[case(r"\pi", "command \\pi\n")]
    #[case("a < b", "binary <\n  identifier a\n  identifier b\n")]
    #[case("3.25", "number 3.25\n")]
    fn single_expressions(#[case] source: &str, #[case] expected: &str) {
        let result = parse(source);
        assert!(!result.has_errors(), "{:?}", result.parse_errors);
        let tree = &result.tree;
        assert_eq!(tree.children(tree.root()).len(), 1);
        assert_eq!(render(tree, tree.child(tree.root(), 0)), expected);
    }

    #[test]
    fn dangling_operator_is_left_for_the_engine() {
        let result = parse("1 +");
        assert!(result.lex_errors.is_empty());
        assert_eq!(result.parse_errors.len(), 1);
        assert_eq!(result.parse_errors[0].message, "unrecognized token plus \"+\"");
        assert_eq!(dump("1 +"), "formula\n  number 1\n");
    }

    #[test]
    fn unbalanced_group_reports_its_opener() {
        let result = parse("(a");
        let messages: Vec<&str> = result.parse_errors.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["unrecognized token l_paren \"(\""]);
        assert_eq!(dump("(a"), "formula\n  identifier a\n");
    }

    #[test]
    fn pipe_is_not_an_expression() {
        let result = parse("|x|");
        assert_eq!(result.parse_errors.len(), 2);
        assert_eq!(result.tree.children(result.tree.root()).len(), 1);
    }

    #[test]
    fn juxtaposed_expressions_are_siblings() {
        assert_eq!(dump("a b"), "formula\n  identifier a\n  identifier b\n");
    }

    #[test]
    fn display_delimiters_produce_no_nodes() {
        assert_eq!(dump(r"\[ x \]"), "formula\n  identifier x\n");
    }
}
