//! Lexer (C3)
//!
//! Tokenises Meson DSL source into a flat token stream, each token carrying
//! its source location. Errors (unterminated string, invalid escape, invalid
//! number) are reported once with a location; the lexer keeps scanning to
//! EOF so that later errors can also be collected, mirroring the recovery
//! policy described in `spec.md` §4.3.

mod token;
pub use token::{Keyword, Token, TokenKind};

use std::rc::Rc;

use crate::error::Error;

/// A source location: file path, 1-based line, 1-based column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub file: Rc<str>,
    pub line: u32,
    pub column: u32,
}

impl Location {
    pub fn new(file: Rc<str>, line: u32, column: u32) -> Self {
        Self { file, line, column }
    }
}

/// Whether the lexer/parser should recognise extended-mode-only syntax
/// (function definitions, `return`, REPL expression mode).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LangMode {
    Meson,
    Extended,
}

pub struct Lexer<'a> {
    src: &'a [u8],
    file: Rc<str>,
    pos: usize,
    line: u32,
    col: u32,
    mode: LangMode,
    errors: Vec<Error>,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str, file: &str, mode: LangMode) -> Self {
        Self {
            src: src.as_bytes(),
            file: Rc::from(file),
            pos: 0,
            line: 1,
            col: 1,
            mode,
            errors: Vec::new(),
        }
    }

    /// Tokenise the whole input. Returns the token stream (always ending in
    /// `Eof`) and any lexer errors encountered along the way.
    pub fn tokenize(mut self) -> (Vec<Token>, Vec<Error>) {
        let mut tokens = Vec::new();
        loop {
            self.skip_ignored();
            let loc = self.loc();
            if self.is_eof() {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    loc,
                });
                break;
            }
            match self.next_token() {
                Some(tok) => tokens.push(tok),
                None => {
                    // error already recorded; keep scanning.
                }
            }
        }
        (tokens, self.errors)
    }

    fn loc(&self) -> Location {
        Location::new(self.file.clone(), self.line, self.col)
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn peek(&self) -> u8 {
        *self.src.get(self.pos).unwrap_or(&0)
    }

    fn peek_at(&self, off: usize) -> u8 {
        *self.src.get(self.pos + off).unwrap_or(&0)
    }

    fn advance(&mut self) -> u8 {
        let c = self.peek();
        self.pos += 1;
        if c == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        c
    }

    fn skip_ignored(&mut self) {
        loop {
            match self.peek() {
                b' ' | b'\t' | b'\r' => {
                    self.advance();
                }
                b'\\' if self.peek_at(1) == b'\n' => {
                    // line continuation
                    self.advance();
                    self.advance();
                }
                b'#' => {
                    while !self.is_eof() && self.peek() != b'\n' {
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn next_token(&mut self) -> Option<Token> {
        let loc = self.loc();
        let c = self.peek();
        match c {
            b'\n' => {
                self.advance();
                Some(Token {
                    kind: TokenKind::Newline,
                    loc,
                })
            }
            b'0'..=b'9' => self.lex_number(loc),
            b'\'' => self.lex_string(loc, false),
            b'"' => self.lex_string(loc, false),
            b'f' if self.peek_at(1) == b'\'' || self.peek_at(1) == b'"' => {
                self.advance();
                self.lex_string(loc, true)
            }
            c if c.is_ascii_alphabetic() || c == b'_' => Some(self.lex_ident_or_keyword(loc)),
            _ => self.lex_punct(loc),
        }
    }

    fn lex_number(&mut self, loc: Location) -> Option<Token> {
        let start = self.pos;
        if self.peek() == b'0' && (self.peek_at(1) == b'x' || self.peek_at(1) == b'X') {
            self.advance();
            self.advance();
            while self.peek().is_ascii_hexdigit() {
                self.advance();
            }
            let text = std::str::from_utf8(&self.src[start + 2..self.pos]).unwrap_or("");
            return match i64::from_str_radix(text, 16) {
                Ok(v) => Some(Token {
                    kind: TokenKind::Int(v),
                    loc,
                }),
                Err(_) => {
                    let raw = String::from_utf8_lossy(&self.src[start..self.pos]).to_string();
                    self.errors.push(Error::InvalidNumber(raw, loc));
                    None
                }
            };
        }
        while self.peek().is_ascii_digit() {
            self.advance();
        }
        let text = std::str::from_utf8(&self.src[start..self.pos]).unwrap_or("");
        match text.parse::<i64>() {
            Ok(v) => Some(Token {
                kind: TokenKind::Int(v),
                loc,
            }),
            Err(_) => {
                self.errors.push(Error::InvalidNumber(text.to_string(), loc));
                None
            }
        }
    }

    fn lex_string(&mut self, loc: Location, is_fstring: bool) -> Option<Token> {
        let quote = self.peek();
        // triple-quoted?
        let triple = self.peek_at(1) == quote && self.peek_at(2) == quote;
        self.advance();
        if triple {
            self.advance();
            self.advance();
        }
        let mut value = String::new();
        loop {
            if self.is_eof() {
                self.errors.push(Error::UnterminatedString(loc));
                return None;
            }
            let c = self.peek();
            if !triple && c == b'\n' {
                self.errors.push(Error::UnterminatedString(loc));
                return None;
            }
            if triple {
                if c == quote && self.peek_at(1) == quote && self.peek_at(2) == quote {
                    self.advance();
                    self.advance();
                    self.advance();
                    break;
                }
            } else if c == quote {
                self.advance();
                break;
            }
            if c == b'\\' {
                let esc_loc = self.loc();
                self.advance();
                let e = self.peek();
                match e {
                    b'n' => {
                        value.push('\n');
                        self.advance();
                    }
                    b't' => {
                        value.push('\t');
                        self.advance();
                    }
                    b'r' => {
                        value.push('\r');
                        self.advance();
                    }
                    b'\\' => {
                        value.push('\\');
                        self.advance();
                    }
                    b'\'' => {
                        value.push('\'');
                        self.advance();
                    }
                    b'"' => {
                        value.push('"');
                        self.advance();
                    }
                    b'a' => {
                        value.push('@');
                        self.advance();
                    }
                    b'0' => {
                        value.push('\0');
                        self.advance();
                    }
                    _ => {
                        self.errors.push(Error::InvalidEscape(
                            format!("\\{}", e as char),
                            esc_loc,
                        ));
                        self.advance();
                    }
                }
                continue;
            }
            value.push(self.advance() as char);
        }
        Some(Token {
            kind: TokenKind::Str { value, is_fstring },
            loc,
        })
    }

    fn lex_ident_or_keyword(&mut self, loc: Location) -> Token {
        let start = self.pos;
        while self.peek().is_ascii_alphanumeric() || self.peek() == b'_' {
            self.advance();
        }
        let text = std::str::from_utf8(&self.src[start..self.pos])
            .unwrap_or("")
            .to_string();
        if let Some(kw) = Keyword::from_str(&text, self.mode) {
            Token {
                kind: TokenKind::Keyword(kw),
                loc,
            }
        } else {
            Token {
                kind: TokenKind::Ident(text),
                loc,
            }
        }
    }

    fn lex_punct(&mut self, loc: Location) -> Option<Token> {
        macro_rules! two {
            ($second:expr, $two_kind:expr, $one_kind:expr) => {{
                self.advance();
                if self.peek() == $second {
                    self.advance();
                    Some(Token {
                        kind: $two_kind,
                        loc,
                    })
                } else {
                    Some(Token {
                        kind: $one_kind,
                        loc,
                    })
                }
            }};
        }
        use TokenKind::*;
        match self.peek() {
            b'(' => {
                self.advance();
                Some(Token { kind: LParen, loc })
            }
            b')' => {
                self.advance();
                Some(Token { kind: RParen, loc })
            }
            b'[' => {
                self.advance();
                Some(Token { kind: LBracket, loc })
            }
            b']' => {
                self.advance();
                Some(Token { kind: RBracket, loc })
            }
            b'{' => {
                self.advance();
                Some(Token { kind: LBrace, loc })
            }
            b'}' => {
                self.advance();
                Some(Token { kind: RBrace, loc })
            }
            b',' => {
                self.advance();
                Some(Token { kind: Comma, loc })
            }
            b':' => {
                self.advance();
                Some(Token { kind: Colon, loc })
            }
            b'.' => {
                self.advance();
                Some(Token { kind: Dot, loc })
            }
            b'+' => two!(b'=', PlusEq, Plus),
            b'-' => {
                self.advance();
                Some(Token { kind: Minus, loc })
            }
            b'*' => {
                self.advance();
                Some(Token { kind: Star, loc })
            }
            b'/' => {
                self.advance();
                Some(Token { kind: Slash, loc })
            }
            b'%' => {
                self.advance();
                Some(Token { kind: Percent, loc })
            }
            b'=' => two!(b'=', EqEq, Eq),
            b'!' => two!(b'=', NotEq, Bang),
            b'<' => two!(b'=', Lte, Lt),
            b'>' => two!(b'=', Gte, Gt),
            c => {
                self.errors.push(Error::UnexpectedToken(
                    format!("{}", c as char),
                    loc.clone(),
                ));
                self.advance();
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        let (toks, errs) = Lexer::new(src, "<test>", LangMode::Meson).tokenize();
        assert!(errs.is_empty(), "unexpected lex errors: {errs:?}");
        toks.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lexes_simple_call() {
        let k = kinds("project('p', 'c')");
        assert!(matches!(k[0], TokenKind::Ident(ref s) if s == "project"));
        assert!(matches!(k[1], TokenKind::LParen));
        assert!(matches!(k[2], TokenKind::Str{ref value, is_fstring: false} if value == "p"));
    }

    #[test]
    fn lexes_fstring_marker() {
        let k = kinds("f'hello @v@'");
        match &k[0] {
            TokenKind::Str { value, is_fstring } => {
                assert!(is_fstring);
                assert_eq!(value, "hello @v@");
            }
            other => panic!("expected fstring, got {other:?}"),
        }
    }

    #[test]
    fn unterminated_string_reports_error() {
        let (_, errs) = Lexer::new("x = 'abc", "<test>", LangMode::Meson).tokenize();
        assert_eq!(errs.len(), 1);
        assert!(matches!(errs[0], Error::UnterminatedString(_)));
    }

    #[test]
    fn keywords_recognised() {
        let k = kinds("if true\nendif");
        assert!(matches!(k[0], TokenKind::Keyword(Keyword::If)));
        assert!(matches!(k[1], TokenKind::Keyword(Keyword::True)));
    }
}
