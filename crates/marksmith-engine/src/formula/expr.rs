//! Recursive-descent expression parser and the formula node builders.
//!
//! ```text
//! expression := term (('+' | '-' | '=' | '<' | '>') term)*
//! term       := factor (('*' | '/') factor)*
//! factor     := ('+' | '-') factor | atom (('^' | '_') atom)*
//! atom       := number | identifier
//!             | command ('{' expression '}')*
//!             | '(' expression ')' | '{' expression '}'
//! ```
//!
//! Each level returns `None` when it cannot find an operand, restoring the
//! cursor to where it started. A binary operator with no right operand is
//! therefore left unconsumed rather than reported here.

use marksmith_syntax::{BuildContext, NodeBuilder, NodeId, Tree};

use super::{FormulaNode, FormulaTok, FormulaToken, Operator};

type Cx<'a, 'src> = BuildContext<'a, 'src, FormulaToken, FormulaNode, ()>;

/// A parsed expression, before it is attached to the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Number(String),
    Identifier(String),
    Command { name: String, args: Vec<Expr> },
    Group { braced: bool, body: Box<Expr> },
    Binary { op: Operator, lhs: Box<Expr>, rhs: Box<Expr> },
    Unary { op: Operator, operand: Box<Expr> },
}

pub struct ExprParser<'t, 'src> {
    tokens: &'t [FormulaTok<'src>],
    pos: usize,
}

impl<'t, 'src> ExprParser<'t, 'src> {
    pub fn new(tokens: &'t [FormulaTok<'src>], pos: usize) -> Self {
        Self { tokens, pos }
    }

    /// Index of the first token not consumed.
    pub fn pos(&self) -> usize {
        self.pos
    }

    fn peek(&self) -> Option<FormulaToken> {
        self.tokens.get(self.pos).map(|t| t.kind)
    }

    fn eat(&mut self, kind: FormulaToken) -> bool {
        if self.peek() == Some(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// The operator at the cursor, if it is one of `kinds`.
    fn operator(&self, kinds: &[FormulaToken]) -> Option<Operator> {
        self.peek()
            .filter(|k| kinds.contains(k))
            .and_then(Operator::from_token)
    }

    /// Parse `operand (op operand)*`, left-associative.
    fn binary_chain(
        &mut self,
        ops: &[FormulaToken],
        operand: fn(&mut Self) -> Option<Expr>,
    ) -> Option<Expr> {
        let mut lhs = operand(self)?;
        while let Some(op) = self.operator(ops) {
            let save = self.pos;
            self.pos += 1;
            match operand(self) {
                Some(rhs) => {
                    lhs = Expr::Binary {
                        op,
                        lhs: Box::new(lhs),
                        rhs: Box::new(rhs),
                    }
                }
                None => {
                    self.pos = save;
                    break;
                }
            }
        }
        Some(lhs)
    }

    pub fn expression(&mut self) -> Option<Expr> {
        use FormulaToken::*;
        self.binary_chain(&[Plus, Minus, Equals, Less, Greater], Self::term)
    }

    fn term(&mut self) -> Option<Expr> {
        use FormulaToken::*;
        self.binary_chain(&[Star, Slash], Self::factor)
    }

    fn factor(&mut self) -> Option<Expr> {
        use FormulaToken::*;
        if let Some(op) = self.operator(&[Plus, Minus]) {
            let save = self.pos;
            self.pos += 1;
            return match self.factor() {
                Some(operand) => Some(Expr::Unary {
                    op,
                    operand: Box::new(operand),
                }),
                None => {
                    self.pos = save;
                    None
                }
            };
        }
        self.binary_chain(&[Caret, Underscore], Self::atom)
    }

    fn atom(&mut self) -> Option<Expr> {
        let token = self.tokens.get(self.pos)?;
        match token.kind {
            FormulaToken::Number => {
                self.pos += 1;
                Some(Expr::Number(token.text.to_string()))
            }
            FormulaToken::Identifier => {
                self.pos += 1;
                Some(Expr::Identifier(token.text.to_string()))
            }
            FormulaToken::Command => {
                self.pos += 1;
                let mut args = Vec::new();
                while self.peek() == Some(FormulaToken::LBrace) {
                    match self.enclosed(FormulaToken::RBrace) {
                        Some(arg) => args.push(arg),
                        None => break,
                    }
                }
                Some(Expr::Command {
                    name: token.text.to_string(),
                    args,
                })
            }
            FormulaToken::LParen => self.group(FormulaToken::RParen, false),
            FormulaToken::LBrace => self.group(FormulaToken::RBrace, true),
            _ => None,
        }
    }

    fn group(&mut self, close: FormulaToken, braced: bool) -> Option<Expr> {
        let body = self.enclosed(close)?;
        Some(Expr::Group {
            braced,
            body: Box::new(body),
        })
    }

    /// An opening token, an expression, and `close`; all or nothing.
    fn enclosed(&mut self, close: FormulaToken) -> Option<Expr> {
        let save = self.pos;
        self.pos += 1;
        match self.expression() {
            Some(body) if self.eat(close) => Some(body),
            _ => {
                self.pos = save;
                None
            }
        }
    }
}

/// Attach `expr` under `parent`, returning the new node.
pub fn attach(tree: &mut Tree<FormulaNode>, parent: NodeId, expr: Expr) -> NodeId {
    match expr {
        Expr::Number(value) => tree.append_new(parent, FormulaNode::Number { value }),
        Expr::Identifier(name) => tree.append_new(parent, FormulaNode::Identifier { name }),
        Expr::Command { name, args } => {
            let node = tree.append_new(parent, FormulaNode::Command { name });
            for arg in args {
                attach(tree, node, arg);
            }
            node
        }
        Expr::Group { braced, body } => {
            let node = tree.append_new(parent, FormulaNode::Group { braced });
            attach(tree, node, *body);
            node
        }
        Expr::Binary { op, lhs, rhs } => {
            let node = tree.append_new(parent, FormulaNode::Binary { op });
            attach(tree, node, *lhs);
            attach(tree, node, *rhs);
            node
        }
        Expr::Unary { op, operand } => {
            let node = tree.append_new(parent, FormulaNode::Unary { op });
            attach(tree, node, *operand);
            node
        }
    }
}

/// `\(`, `\)`, `\[` and `\]`: consumed, no node.
pub struct Delimiter;

impl NodeBuilder<FormulaToken, FormulaNode, ()> for Delimiter {
    fn name(&self) -> &'static str {
        "delimiter"
    }

    fn build(&self, cx: &mut Cx<'_, '_>) -> bool {
        if cx.current_token().is_some_and(|t| t.kind.is_delimiter()) {
            cx.bump(1);
            true
        } else {
            false
        }
    }
}

/// The longest expression starting at the cursor.
pub struct Expression;

impl NodeBuilder<FormulaToken, FormulaNode, ()> for Expression {
    fn name(&self) -> &'static str {
        "expression"
    }

    fn build(&self, cx: &mut Cx<'_, '_>) -> bool {
        let mut parser = ExprParser::new(cx.tokens(), cx.pos());
        let Some(expr) = parser.expression() else {
            return false;
        };
        let parent = cx.current();
        attach(cx.tree_mut(), parent, expr);
        cx.seek(parser.pos());
        true
    }
}

pub struct EndOfInput;

impl NodeBuilder<FormulaToken, FormulaNode, ()> for EndOfInput {
    fn name(&self) -> &'static str {
        "end_of_input"
    }

    fn build(&self, cx: &mut Cx<'_, '_>) -> bool {
        if cx.current_token().is_some_and(|t| t.kind == FormulaToken::EndOfInput) {
            cx.bump(1);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::lexer::tokenizer;
    use pretty_assertions::assert_eq;

    fn expr(source: &str) -> (Option<Expr>, usize) {
        let (tokens, _) = tokenizer().tokenize(source);
        let mut parser = ExprParser::new(&tokens, 0);
        let expr = parser.expression();
        (expr, parser.pos())
    }

    fn num(n: &str) -> Box<Expr> {
        Box::new(Expr::Number(n.into()))
    }

    #[test]
    fn multiplication_binds_tighter() {
        let (e, _) = expr("1 + 2 * 3");
        assert_eq!(
            e,
            Some(Expr::Binary {
                op: Operator::Add,
                lhs: num("1"),
                rhs: Box::new(Expr::Binary {
                    op: Operator::Multiply,
                    lhs: num("2"),
                    rhs: num("3"),
                }),
            })
        );
    }

    #[test]
    fn dangling_operator_stops_before_itself() {
        let (e, pos) = expr("1 * ");
        assert_eq!(e, Some(Expr::Number("1".into())));
        assert_eq!(pos, 1);
    }

    #[test]
    fn nothing_to_parse() {
        assert_eq!(expr(")"), (None, 0));
        assert_eq!(expr("-"), (None, 0));
    }

    #[test]
    fn command_stops_at_unclosed_argument() {
        let (e, pos) = expr(r"\sqrt{2}{3");
        assert_eq!(
            e,
            Some(Expr::Command {
                name: r"\sqrt".into(),
                args: vec![Expr::Number("2".into())],
            })
        );
        assert_eq!(pos, 4);
    }

    #[test]
    fn nested_unary() {
        let (e, _) = expr("--a");
        assert_eq!(
            e,
            Some(Expr::Unary {
                op: Operator::Subtract,
                operand: Box::new(Expr::Unary {
                    op: Operator::Subtract,
                    operand: Box::new(Expr::Identifier("a".into())),
                }),
            })
        );
    }
}
