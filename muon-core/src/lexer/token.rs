use super::{LangMode, Location};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keyword {
    If,
    Elif,
    Else,
    Endif,
    Foreach,
    Endforeach,
    And,
    Or,
    Not,
    In,
    True,
    False,
    Continue,
    Break,
    // extended-mode only
    Func,
    Return,
}

impl Keyword {
    pub fn from_str(s: &str, mode: LangMode) -> Option<Self> {
        use Keyword::*;
        Some(match s {
            "if" => If,
            "elif" => Elif,
            "else" => Else,
            "endif" => Endif,
            "foreach" => Foreach,
            "endforeach" => Endforeach,
            "and" => And,
            "or" => Or,
            "not" => Not,
            "in" => In,
            "true" => True,
            "false" => False,
            "continue" => Continue,
            "break" => Break,
            "func" if mode == LangMode::Extended => Func,
            "return" if mode == LangMode::Extended => Return,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Ident(String),
    Keyword(Keyword),
    Int(i64),
    Str { value: String, is_fstring: bool },

    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Dot,
    Plus,
    PlusEq,
    Minus,
    Star,
    Slash,
    Percent,
    Eq,
    EqEq,
    Bang,
    NotEq,
    Lt,
    Lte,
    Gt,
    Gte,

    Newline,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub loc: Location,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TokenKind::Ident(s) => return write!(f, "identifier `{s}`"),
            TokenKind::Keyword(k) => return write!(f, "keyword `{k:?}`"),
            TokenKind::Int(i) => return write!(f, "integer `{i}`"),
            TokenKind::Str { .. } => "string literal",
            TokenKind::LParen => "`(`",
            TokenKind::RParen => "`)`",
            TokenKind::LBracket => "`[`",
            TokenKind::RBracket => "`]`",
            TokenKind::LBrace => "`{`",
            TokenKind::RBrace => "`}`",
            TokenKind::Comma => "`,`",
            TokenKind::Colon => "`:`",
            TokenKind::Dot => "`.`",
            TokenKind::Plus => "`+`",
            TokenKind::PlusEq => "`+=`",
            TokenKind::Minus => "`-`",
            TokenKind::Star => "`*`",
            TokenKind::Slash => "`/`",
            TokenKind::Percent => "`%`",
            TokenKind::Eq => "`=`",
            TokenKind::EqEq => "`==`",
            TokenKind::Bang => "`!`",
            TokenKind::NotEq => "`!=`",
            TokenKind::Lt => "`<`",
            TokenKind::Lte => "`<=`",
            TokenKind::Gt => "`>`",
            TokenKind::Gte => "`>=`",
            TokenKind::Newline => "newline",
            TokenKind::Eof => "end of file",
        };
        write!(f, "{s}")
    }
}
