//! Formula token recognizers.
//!
//! Numbers are recognized by hand so that a trailing `.` without a digit
//! after it is never swallowed; everything else is a small Logos enum.
//! Whitespace advances the cursor without producing a token.

use logos::Logos;
use marksmith_syntax::{TokenRecognizer, TokenizeContext, Tokenizer};

use super::FormulaToken;

type Cx<'src> = TokenizeContext<'src, FormulaToken, ()>;

pub fn tokenizer() -> Tokenizer<FormulaToken, ()> {
    let recognizers: Vec<Box<dyn TokenRecognizer<FormulaToken, ()>>> =
        vec![Box::new(Whitespace), Box::new(Number), Box::new(Lexeme)];
    Tokenizer::new(recognizers, || ()).with_end_of_input(|_| FormulaToken::EndOfInput)
}

/// Spaces, tabs and line breaks, consumed silently.
pub struct Whitespace;

impl TokenRecognizer<FormulaToken, ()> for Whitespace {
    fn name(&self) -> &'static str {
        "whitespace"
    }

    fn recognize(&self, cx: &mut Cx<'_>) -> bool {
        let rest = cx.rest();
        let len = rest.len() - rest.trim_start().len();
        if len == 0 {
            return false;
        }
        cx.advance(len);
        true
    }
}

/// Length of the number at the start of `rest`: digits, optionally a point
/// and more digits when at least one digit follows the point.
pub fn number_len(rest: &str) -> Option<usize> {
    let bytes = rest.as_bytes();
    let int = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
    if int == 0 {
        return None;
    }
    if bytes.get(int) == Some(&b'.') {
        let frac = bytes[int + 1..].iter().take_while(|b| b.is_ascii_digit()).count();
        if frac > 0 {
            return Some(int + 1 + frac);
        }
    }
    Some(int)
}

pub struct Number;

impl TokenRecognizer<FormulaToken, ()> for Number {
    fn name(&self) -> &'static str {
        "number"
    }

    fn recognize(&self, cx: &mut Cx<'_>) -> bool {
        match number_len(cx.rest()) {
            Some(len) => {
                cx.emit(FormulaToken::Number, len);
                true
            }
            None => false,
        }
    }
}

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum Lex {
    #[regex(r"[A-Za-z]+")]
    Identifier,
    #[regex(r"\\[A-Za-z]+")]
    Command,
    #[token(r"\(")]
    OpenInline,
    #[token(r"\)")]
    CloseInline,
    #[token(r"\[")]
    OpenDisplay,
    #[token(r"\]")]
    CloseDisplay,
    #[token(r"\")]
    Backslash,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("^")]
    Caret,
    #[token("_")]
    Underscore,
    #[token("=")]
    Equals,
    #[token("<")]
    Less,
    #[token(">")]
    Greater,
    #[token("|")]
    Pipe,
}

impl From<Lex> for FormulaToken {
    fn from(lex: Lex) -> Self {
        match lex {
            Lex::Identifier => FormulaToken::Identifier,
            Lex::Command => FormulaToken::Command,
            Lex::OpenInline => FormulaToken::OpenInline,
            Lex::CloseInline => FormulaToken::CloseInline,
            Lex::OpenDisplay => FormulaToken::OpenDisplay,
            Lex::CloseDisplay => FormulaToken::CloseDisplay,
            Lex::Backslash => FormulaToken::Backslash,
            Lex::LParen => FormulaToken::LParen,
            Lex::RParen => FormulaToken::RParen,
            Lex::LBrace => FormulaToken::LBrace,
            Lex::RBrace => FormulaToken::RBrace,
            Lex::Plus => FormulaToken::Plus,
            Lex::Minus => FormulaToken::Minus,
            Lex::Star => FormulaToken::Star,
            Lex::Slash => FormulaToken::Slash,
            Lex::Caret => FormulaToken::Caret,
            Lex::Underscore => FormulaToken::Underscore,
            Lex::Equals => FormulaToken::Equals,
            Lex::Less => FormulaToken::Less,
            Lex::Greater => FormulaToken::Greater,
            Lex::Pipe => FormulaToken::Pipe,
        }
    }
}

/// Identifiers, commands, delimiters and operators.
pub struct Lexeme;

impl TokenRecognizer<FormulaToken, ()> for Lexeme {
    fn name(&self) -> &'static str {
        "lexeme"
    }

    fn recognize(&self, cx: &mut Cx<'_>) -> bool {
        let mut lex = Lex::lexer(cx.rest());
        match lex.next() {
            Some(Ok(kind)) => {
                let len = lex.span().len();
                cx.emit(kind.into(), len);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn kinds(source: &str) -> Vec<FormulaToken> {
        let (tokens, errors) = tokenizer().tokenize(source);
        assert!(errors.is_empty(), "{errors:?}");
        tokens.iter().map(|t| t.kind).collect()
    }

    #[rstest]
    #[case("12", Some(2))]
    #[case("1.5", Some(3))]
    #[case("1.", Some(1))]
    #[case("1.x", Some(1))]
    #[case(".5", None)]
    fn numbers(#[case] rest: &str, #[case] expected: Option<usize>) {
        assert_eq!(number_len(rest), expected);
    }

    #[test]
    fn commands_and_delimiters() {
        use FormulaToken::*;
        assert_eq!(
            kinds(r"\( \alpha \) \[x\]"),
            vec![
                OpenInline,
                Command,
                CloseInline,
                OpenDisplay,
                Identifier,
                CloseDisplay,
                EndOfInput
            ]
        );
    }

    #[test]
    fn lone_backslash_falls_back() {
        use FormulaToken::*;
        assert_eq!(kinds(r"\ 1"), vec![Backslash, Number, EndOfInput]);
    }

    #[test]
    fn whitespace_produces_no_tokens() {
        let (tokens, _) = tokenizer().tokenize("  a \n\t+ b  ");
        let texts: Vec<&str> = tokens.iter().map(|t| t.text).collect();
        assert_eq!(texts, vec!["a", "+", "b", ""]);
    }

    #[test]
    fn unknown_characters_are_lex_errors() {
        let (tokens, errors) = tokenizer().tokenize("a # b");
        assert_eq!(errors.len(), 1);
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn trailing_point_is_an_error_not_part_of_the_number() {
        let (tokens, errors) = tokenizer().tokenize("2.");
        assert_eq!(tokens[0].text, "2");
        assert_eq!(errors.len(), 1);
    }
}
