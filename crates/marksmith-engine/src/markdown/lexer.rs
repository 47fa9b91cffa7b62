//! # Lexer - Markdown Token Recognizers
//!
//! The lexer is a list of [`TokenRecognizer`]s run by the generic
//! [`Tokenizer`]. Order matters: multi-line constructs are tried before the
//! newline and whitespace recognizers, and the catch-all [`TextRun`] comes
//! last.
//!
//! ## The Lossless Guarantee
//!
//! Every byte of the input lands in exactly one token; nothing is skipped.
//! Concatenating token texts reproduces the source.
//!
//! ```
//! use marksmith_engine::{markdown, MarkdownOptions};
//!
//! let input = "# Hello, *world*!\n";
//! let result = markdown::parse(input, &MarkdownOptions::default());
//! let rebuilt: String = result.tokens.iter().map(|t| t.text).collect();
//! assert_eq!(rebuilt, input);
//! ```
//!
//! ## Token Design
//!
//! Single-character punctuation with syntactic meaning gets its own token
//! kind, lexed by a small Logos enum. Runs of anything else become `text`.
//! Whole-construct tokens are used where a construct's extent is decided by
//! raw characters rather than by structure: fenced and indented code,
//! code spans, formulas, autolinks, raw HTML and container fence lines.
//!
//! Digit runs are `number` tokens only when they are not glued to letters.
//! [`standalone_number`] decides this for both the number and the text
//! recognizer, so the two can never disagree about who owns a digit.

use std::sync::OnceLock;

use logos::Logos;
use marksmith_syntax::{TokenRecognizer, TokenizeContext, Tokenizer};
use regex::Regex;

use super::MdToken;
use crate::options::MarkdownOptions;

/// Per-run lexer state.
#[derive(Debug, Clone)]
pub struct LexState {
    /// The line before the cursor's line was blank (or there was none).
    pub prev_blank: bool,
}

impl Default for LexState {
    fn default() -> Self {
        Self { prev_blank: true }
    }
}

type Cx<'src> = TokenizeContext<'src, MdToken, LexState>;

/// Build the Markdown tokenizer for `opts`.
pub fn tokenizer(opts: &MarkdownOptions) -> Tokenizer<MdToken, LexState> {
    let mut recognizers: Vec<Box<dyn TokenRecognizer<MdToken, LexState>>> =
        vec![Box::new(FencedCode), Box::new(IndentedCode)];
    if opts.formulas {
        recognizers.push(Box::new(DisplayFormula));
    }
    if opts.containers {
        recognizers.push(Box::new(ContainerFence));
    }
    recognizers.push(Box::new(Newline));
    recognizers.push(Box::new(Whitespace));
    recognizers.push(Box::new(CodeSpan));
    recognizers.push(Box::new(AutoLink));
    recognizers.push(Box::new(InlineHtml));
    if opts.autolinks {
        recognizers.push(Box::new(BareUrl));
        recognizers.push(Box::new(BareEmail));
    }
    if opts.formulas {
        recognizers.push(Box::new(InlineFormula));
    }
    recognizers.push(Box::new(Number));
    recognizers.push(Box::new(Punctuation));
    recognizers.push(Box::new(TextRun));

    Tokenizer::new(recognizers, LexState::default).with_end_of_input(|_| MdToken::EndOfInput)
}

/// Characters that end a text run.
const SPECIAL: &str = "#*_~\\`><-+.:!$|[]() \t\r\n";

fn is_special(c: char) -> bool {
    SPECIAL.contains(c)
}

/// Length of the digit run at the start of `rest` when it stands alone.
///
/// A run is a number only if neither the character before it (`prev`) nor
/// the character right after it is a letter.
pub fn standalone_number(prev: Option<char>, rest: &str) -> Option<usize> {
    let len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if len == 0 {
        return None;
    }
    let glued_before = prev.is_some_and(char::is_alphabetic);
    let glued_after = rest[len..].chars().next().is_some_and(char::is_alphabetic);
    (!glued_before && !glued_after).then_some(len)
}

fn only_indent_before(cx: &Cx<'_>) -> bool {
    cx.line_prefix().chars().all(|c| c == ' ' || c == '\t')
}

/// At most three columns of indent before the cursor; a tab counts as four.
fn short_indent_before(cx: &Cx<'_>) -> bool {
    only_indent_before(cx)
        && cx
            .line_prefix()
            .chars()
            .map(|c| if c == '\t' { 4 } else { 1 })
            .sum::<usize>()
            <= 3
}

fn word_boundary(cx: &Cx<'_>) -> bool {
    !cx.prev_char().is_some_and(char::is_alphanumeric)
}

/// A code fence marker: which character and how many.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fence {
    pub ch: char,
    pub len: usize,
}

impl Fence {
    /// Parse an opening fence at the start of `line`.
    pub fn open(line: &str) -> Option<Fence> {
        let ch = line.chars().next().filter(|c| *c == '`' || *c == '~')?;
        let len = line.chars().take_while(|&c| c == ch).count();
        if len < 3 {
            return None;
        }
        // Backtick info strings may not contain backticks.
        if ch == '`' && line[len..].contains('`') {
            return None;
        }
        Some(Fence { ch, len })
    }

    /// True when `line` closes this fence.
    pub fn closed_by(&self, line: &str) -> bool {
        let trimmed = line.trim_start_matches([' ', '\t']);
        let n = trimmed.chars().take_while(|&c| c == self.ch).count();
        n >= self.len && trimmed[n..].trim().is_empty()
    }
}

/// A whole fenced code block, unterminated fences running to end of input.
pub struct FencedCode;

impl TokenRecognizer<MdToken, LexState> for FencedCode {
    fn name(&self) -> &'static str {
        "fenced_code"
    }

    fn recognize(&self, cx: &mut Cx<'_>) -> bool {
        if !short_indent_before(cx) {
            return false;
        }
        let Some(fence) = Fence::open(cx.line_rest()) else {
            return false;
        };

        let rest = cx.rest();
        let mut end = rest.len();
        let mut offset = rest.find('\n').unwrap_or(rest.len());
        while offset < rest.len() {
            let start = offset + 1;
            let line_len = rest[start..].find('\n').unwrap_or(rest.len() - start);
            let line = rest[start..start + line_len].trim_end_matches('\r');
            if fence.closed_by(line) {
                end = start + line.len();
                break;
            }
            offset = start + line_len;
        }

        cx.emit(MdToken::FencedCode, end);
        true
    }
}

fn is_indented(line: &str) -> bool {
    line.starts_with("    ") || line.starts_with('\t')
}

/// Indented code lines following a blank line.
pub struct IndentedCode;

impl TokenRecognizer<MdToken, LexState> for IndentedCode {
    fn name(&self) -> &'static str {
        "indented_code"
    }

    fn recognize(&self, cx: &mut Cx<'_>) -> bool {
        if !cx.at_line_start() || !cx.state.prev_blank {
            return false;
        }
        let first = cx.line_rest();
        if !is_indented(first) || first.trim().is_empty() {
            return false;
        }

        let mut end = 0;
        let mut offset = 0;
        for line in cx.rest().split_inclusive('\n') {
            let body = line.trim_end_matches(['\n', '\r']);
            if !body.trim().is_empty() {
                if !is_indented(body) {
                    break;
                }
                end = offset + body.len();
            }
            offset += line.len();
        }

        cx.emit(MdToken::IndentedCode, end);
        true
    }
}

/// `$$ ... $$`, possibly spanning lines.
pub struct DisplayFormula;

impl TokenRecognizer<MdToken, LexState> for DisplayFormula {
    fn name(&self) -> &'static str {
        "display_formula"
    }

    fn recognize(&self, cx: &mut Cx<'_>) -> bool {
        if !cx.starts_with("$$") || cx.prev_char() == Some('\\') {
            return false;
        }
        match cx.rest()[2..].find("$$") {
            Some(close) if !cx.rest()[2..2 + close].trim().is_empty() => {
                cx.emit(MdToken::DisplayFormula, close + 4);
                true
            }
            _ => false,
        }
    }
}

fn container_fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^:{3,}[ \t]*([A-Za-z][\w-]*)?[ \t]*$").expect("valid container fence regex")
    })
}

/// Name of a container fence line, `None` for a bare closing fence.
pub fn container_name(line: &str) -> Option<&str> {
    container_fence_re()
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// A `:::name` or `:::` line.
pub struct ContainerFence;

impl TokenRecognizer<MdToken, LexState> for ContainerFence {
    fn name(&self) -> &'static str {
        "container_fence"
    }

    fn recognize(&self, cx: &mut Cx<'_>) -> bool {
        if !only_indent_before(cx) || !container_fence_re().is_match(cx.line_rest()) {
            return false;
        }
        let len = cx.line_rest().len();
        cx.emit(MdToken::ContainerFence, len);
        true
    }
}

/// `\n` or `\r\n`; also records whether the finished line was blank.
pub struct Newline;

impl TokenRecognizer<MdToken, LexState> for Newline {
    fn name(&self) -> &'static str {
        "newline"
    }

    fn recognize(&self, cx: &mut Cx<'_>) -> bool {
        let len = if cx.starts_with("\r\n") {
            2
        } else if cx.starts_with("\n") {
            1
        } else {
            return false;
        };
        cx.state.prev_blank = cx.line_prefix().trim().is_empty();
        cx.emit(MdToken::Newline, len);
        true
    }
}

/// Spaces, tabs and stray carriage returns.
pub struct Whitespace;

impl TokenRecognizer<MdToken, LexState> for Whitespace {
    fn name(&self) -> &'static str {
        "whitespace"
    }

    fn recognize(&self, cx: &mut Cx<'_>) -> bool {
        let rest = cx.rest();
        let mut len = 0;
        for (i, c) in rest.char_indices() {
            let lone_cr = c == '\r' && !rest[i..].starts_with("\r\n");
            if c != ' ' && c != '\t' && !lone_cr {
                break;
            }
            len = i + 1;
        }
        if len == 0 {
            return false;
        }
        cx.emit(MdToken::Whitespace, len);
        true
    }
}

/// A backtick run closed by a run of the same length on the same line.
pub struct CodeSpan;

impl TokenRecognizer<MdToken, LexState> for CodeSpan {
    fn name(&self) -> &'static str {
        "code_span"
    }

    fn recognize(&self, cx: &mut Cx<'_>) -> bool {
        if cx.peek() != Some('`') || matches!(cx.prev_char(), Some('`' | '\\')) {
            return false;
        }
        let line = cx.line_rest();
        let n = line.bytes().take_while(|&b| b == b'`').count();
        let mut i = n;
        while let Some(off) = line[i..].find('`') {
            let start = i + off;
            let m = line[start..].bytes().take_while(|&b| b == b'`').count();
            if m == n {
                cx.emit(MdToken::CodeSpan, start + m);
                return true;
            }
            i = start + m;
        }
        false
    }
}

fn autolink_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^<(?:[A-Za-z][A-Za-z0-9+.\-]{1,31}:[^\s<>]*|[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(?:\.[A-Za-z0-9\-]+)+)>",
        )
        .expect("valid autolink regex")
    })
}

/// `<https://...>` and `<user@host>`.
pub struct AutoLink;

impl TokenRecognizer<MdToken, LexState> for AutoLink {
    fn name(&self) -> &'static str {
        "autolink"
    }

    fn recognize(&self, cx: &mut Cx<'_>) -> bool {
        if cx.peek() != Some('<') {
            return false;
        }
        let Some(m) = autolink_re().find(cx.rest()) else {
            return false;
        };
        cx.emit(MdToken::AutoLink, m.end());
        true
    }
}

fn inline_html_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"^(?:<[A-Za-z][A-Za-z0-9\-]*(?:\s+[A-Za-z_:][A-Za-z0-9_.:\-]*(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s"'=<>`]+))?)*\s*/?>|</[A-Za-z][A-Za-z0-9\-]*\s*>|<!--(?s:.*?)-->)"#,
        )
        .expect("valid inline html regex")
    })
}

/// Open tags, closing tags and comments.
pub struct InlineHtml;

impl TokenRecognizer<MdToken, LexState> for InlineHtml {
    fn name(&self) -> &'static str {
        "inline_html"
    }

    fn recognize(&self, cx: &mut Cx<'_>) -> bool {
        if cx.peek() != Some('<') {
            return false;
        }
        let Some(m) = inline_html_re().find(cx.rest()) else {
            return false;
        };
        cx.emit(MdToken::InlineHtml, m.end());
        true
    }
}

fn bare_url_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:https?://|www\.)[^\s<>]+").expect("valid url regex"))
}

/// Trim punctuation that ends a sentence rather than the URL.
fn trim_url(url: &str) -> &str {
    let mut url = url;
    loop {
        let trimmed =
            url.trim_end_matches(['.', ',', ';', ':', '!', '?', '\'', '"', '*', '_', '~']);
        let trimmed = match trimmed.strip_suffix(')') {
            Some(inner) if trimmed.matches('(').count() < trimmed.matches(')').count() => inner,
            _ => trimmed,
        };
        if trimmed.len() == url.len() {
            return url;
        }
        url = trimmed;
    }
}

/// `https://...`, `http://...` and `www....` in running text.
pub struct BareUrl;

impl TokenRecognizer<MdToken, LexState> for BareUrl {
    fn name(&self) -> &'static str {
        "url"
    }

    fn recognize(&self, cx: &mut Cx<'_>) -> bool {
        if !matches!(cx.peek(), Some('h' | 'w')) || !word_boundary(cx) {
            return false;
        }
        let Some(m) = bare_url_re().find(cx.rest()) else {
            return false;
        };
        let url = trim_url(m.as_str());
        let prefix = if url.starts_with("www.") { 4 } else { url.find("//").map_or(0, |i| i + 2) };
        if url.len() <= prefix {
            return false;
        }
        cx.emit(MdToken::Url, url.len());
        true
    }
}

fn bare_email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(?:\.[A-Za-z0-9\-]+)+")
            .expect("valid email regex")
    })
}

/// `user@example.com` in running text.
pub struct BareEmail;

impl TokenRecognizer<MdToken, LexState> for BareEmail {
    fn name(&self) -> &'static str {
        "email"
    }

    fn recognize(&self, cx: &mut Cx<'_>) -> bool {
        if !cx.peek().is_some_and(|c| c.is_ascii_alphanumeric()) || !word_boundary(cx) {
            return false;
        }
        let Some(m) = bare_email_re().find(cx.rest()) else {
            return false;
        };
        cx.emit(MdToken::Email, m.end());
        true
    }
}

/// `$...$` on one line. The opener may not be followed by whitespace, and
/// the closer may not follow whitespace or precede a digit.
pub struct InlineFormula;

impl TokenRecognizer<MdToken, LexState> for InlineFormula {
    fn name(&self) -> &'static str {
        "inline_formula"
    }

    fn recognize(&self, cx: &mut Cx<'_>) -> bool {
        if cx.peek() != Some('$') || cx.prev_char() == Some('\\') {
            return false;
        }
        if cx.peek_nth(1).is_none_or(|c| c.is_whitespace() || c == '$') {
            return false;
        }
        let line = cx.line_rest();
        for (i, c) in line.char_indices().skip(1) {
            if c != '$' {
                continue;
            }
            let before = &line[..i];
            let after = line[i + 1..].chars().next();
            if before.ends_with(char::is_whitespace)
                || before.ends_with('\\')
                || after.is_some_and(|c| c.is_ascii_digit())
            {
                continue;
            }
            cx.emit(MdToken::InlineFormula, i + 1);
            return true;
        }
        false
    }
}

/// A digit run standing on its own.
pub struct Number;

impl TokenRecognizer<MdToken, LexState> for Number {
    fn name(&self) -> &'static str {
        "number"
    }

    fn recognize(&self, cx: &mut Cx<'_>) -> bool {
        match standalone_number(cx.prev_char(), cx.rest()) {
            Some(len) => {
                cx.emit(MdToken::Number, len);
                true
            }
            None => false,
        }
    }
}

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum Punct {
    #[token("#")]
    Hash,
    #[token("*")]
    Star,
    #[token("_")]
    Underscore,
    #[token("~")]
    Tilde,
    #[token("\\")]
    Backslash,
    #[token("`")]
    Backtick,
    #[token(">")]
    Gt,
    #[token("<")]
    Lt,
    #[token("-")]
    Dash,
    #[token("+")]
    Plus,
    #[token(".")]
    Dot,
    #[token(":")]
    Colon,
    #[token("!")]
    Exclaim,
    #[token("$")]
    Dollar,
    #[token("|")]
    Pipe,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
}

impl From<Punct> for MdToken {
    fn from(p: Punct) -> Self {
        match p {
            Punct::Hash => MdToken::Hash,
            Punct::Star => MdToken::Star,
            Punct::Underscore => MdToken::Underscore,
            Punct::Tilde => MdToken::Tilde,
            Punct::Backslash => MdToken::Backslash,
            Punct::Backtick => MdToken::Backtick,
            Punct::Gt => MdToken::Gt,
            Punct::Lt => MdToken::Lt,
            Punct::Dash => MdToken::Dash,
            Punct::Plus => MdToken::Plus,
            Punct::Dot => MdToken::Dot,
            Punct::Colon => MdToken::Colon,
            Punct::Exclaim => MdToken::Exclaim,
            Punct::Dollar => MdToken::Dollar,
            Punct::Pipe => MdToken::Pipe,
            Punct::LBracket => MdToken::LBracket,
            Punct::RBracket => MdToken::RBracket,
            Punct::LParen => MdToken::LParen,
            Punct::RParen => MdToken::RParen,
        }
    }
}

/// One punctuation character.
pub struct Punctuation;

impl TokenRecognizer<MdToken, LexState> for Punctuation {
    fn name(&self) -> &'static str {
        "punctuation"
    }

    fn recognize(&self, cx: &mut Cx<'_>) -> bool {
        let mut lex = Punct::lexer(cx.rest());
        match lex.next() {
            Some(Ok(p)) => {
                let len = lex.span().len();
                cx.emit(p.into(), len);
                true
            }
            _ => false,
        }
    }
}

/// Everything else, up to the next special character or standalone number.
pub struct TextRun;

impl TokenRecognizer<MdToken, LexState> for TextRun {
    fn name(&self) -> &'static str {
        "text"
    }

    fn recognize(&self, cx: &mut Cx<'_>) -> bool {
        let rest = cx.rest();
        let mut prev = cx.prev_char();
        let mut len = 0;
        while let Some(c) = rest[len..].chars().next() {
            if is_special(c) {
                break;
            }
            if c.is_ascii_digit() {
                if standalone_number(prev, &rest[len..]).is_some() {
                    break;
                }
                len += rest[len..].bytes().take_while(u8::is_ascii_digit).count();
                prev = Some('0');
                continue;
            }
            len += c.len_utf8();
            prev = Some(c);
        }
        if len == 0 {
            return false;
        }
        cx.emit(MdToken::Text, len);
        true
    }
}
