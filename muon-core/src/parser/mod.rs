//! Parser (C4)
//!
//! Recursive-descent parser with explicit precedence:
//! `or` < `and` < comparisons/`in` < `+`/`-` < `*`/`/`/`%` < unary `not`/`-`
//! < postfix (`.method`, `[index]`, `(args)`), following `spec.md` §4.4.
//!
//! On a syntactic error, parsing of the current file aborts immediately;
//! there is no speculative error recovery (`spec.md` §4.4 "Error recovery").

mod ast;
pub use ast::*;

use crate::error::Error;
use crate::lexer::{Keyword, Location, Token, TokenKind};

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Parse a whole file. The caller is responsible for enforcing the
    /// "first statement must be `project()`" rule for the top-level file
    /// (see `Workspace::eval_project_file`), since that rule does not apply
    /// to `subdir()`-included files.
    pub fn parse_program(mut self) -> Result<Program, Error> {
        let mut stmts = Vec::new();
        self.skip_newlines();
        while !self.at_eof() {
            stmts.push(self.parse_stmt()?);
            self.skip_newlines();
        }
        Ok(Program { stmts })
    }

    fn cur(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn cur_loc(&self) -> Location {
        self.cur().loc.clone()
    }

    fn at_eof(&self) -> bool {
        matches!(self.cur().kind, TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        let t = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        t
    }

    fn skip_newlines(&mut self) {
        while matches!(self.cur().kind, TokenKind::Newline) {
            self.advance();
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<Token, Error> {
        if std::mem::discriminant(&self.cur().kind) == std::mem::discriminant(kind) {
            Ok(self.advance())
        } else {
            Err(Error::ExpectedToken(
                kind.to_string(),
                self.cur().kind.to_string(),
                self.cur_loc(),
            ))
        }
    }

    fn expect_kw(&mut self, kw: Keyword) -> Result<(), Error> {
        match &self.cur().kind {
            TokenKind::Keyword(k) if *k == kw => {
                self.advance();
                Ok(())
            }
            _ => Err(Error::ExpectedToken(
                format!("`{kw:?}`"),
                self.cur().kind.to_string(),
                self.cur_loc(),
            )),
        }
    }

    fn at_kw(&self, kw: Keyword) -> bool {
        matches!(&self.cur().kind, TokenKind::Keyword(k) if *k == kw)
    }

    fn end_of_stmt(&mut self) -> Result<(), Error> {
        if self.at_eof() {
            return Ok(());
        }
        self.expect(&TokenKind::Newline)?;
        self.skip_newlines();
        Ok(())
    }

    // ---- statements ----

    fn parse_stmt(&mut self) -> Result<Stmt, Error> {
        let loc = self.cur_loc();
        if self.at_kw(Keyword::If) {
            return self.parse_if();
        }
        if self.at_kw(Keyword::Foreach) {
            return self.parse_foreach();
        }
        if self.at_kw(Keyword::Continue) {
            self.advance();
            self.end_of_stmt()?;
            return Ok(Stmt {
                kind: StmtKind::Continue,
                loc,
            });
        }
        if self.at_kw(Keyword::Break) {
            self.advance();
            self.end_of_stmt()?;
            return Ok(Stmt {
                kind: StmtKind::Break,
                loc,
            });
        }

        // assignment: IDENT ('=' | '+=') expr
        if let TokenKind::Ident(name) = self.cur().kind.clone() {
            let save = self.pos;
            self.advance();
            match &self.cur().kind {
                TokenKind::Eq => {
                    self.advance();
                    let value = self.parse_expr()?;
                    self.end_of_stmt()?;
                    return Ok(Stmt {
                        kind: StmtKind::Assign(name, value),
                        loc,
                    });
                }
                TokenKind::PlusEq => {
                    self.advance();
                    let value = self.parse_expr()?;
                    self.end_of_stmt()?;
                    return Ok(Stmt {
                        kind: StmtKind::PlusAssign(name, value),
                        loc,
                    });
                }
                _ => {
                    self.pos = save;
                }
            }
        }

        let expr = self.parse_expr()?;
        self.end_of_stmt()?;
        Ok(Stmt {
            kind: StmtKind::Expr(expr),
            loc,
        })
    }

    fn parse_block_until(&mut self, terminators: &[Keyword]) -> Result<Vec<Stmt>, Error> {
        let mut stmts = Vec::new();
        self.skip_newlines();
        while !self.at_eof() && !terminators.iter().any(|k| self.at_kw(k.clone())) {
            stmts.push(self.parse_stmt()?);
            self.skip_newlines();
        }
        Ok(stmts)
    }

    fn parse_if(&mut self) -> Result<Stmt, Error> {
        let loc = self.cur_loc();
        self.expect_kw(Keyword::If)?;
        let mut branches = Vec::new();
        let cond = self.parse_expr()?;
        self.end_of_stmt()?;
        let body = self.parse_block_until(&[Keyword::Elif, Keyword::Else, Keyword::Endif])?;
        branches.push((cond, body));
        while self.at_kw(Keyword::Elif) {
            self.advance();
            let cond = self.parse_expr()?;
            self.end_of_stmt()?;
            let body = self.parse_block_until(&[Keyword::Elif, Keyword::Else, Keyword::Endif])?;
            branches.push((cond, body));
        }
        let else_body = if self.at_kw(Keyword::Else) {
            self.advance();
            self.end_of_stmt()?;
            Some(self.parse_block_until(&[Keyword::Endif])?)
        } else {
            None
        };
        self.expect_kw(Keyword::Endif)?;
        self.end_of_stmt()?;
        Ok(Stmt {
            kind: StmtKind::If(branches, else_body),
            loc,
        })
    }

    fn parse_foreach(&mut self) -> Result<Stmt, Error> {
        let loc = self.cur_loc();
        self.expect_kw(Keyword::Foreach)?;
        let mut vars = Vec::new();
        match self.advance().kind {
            TokenKind::Ident(n) => vars.push(n),
            other => {
                return Err(Error::ExpectedToken(
                    "identifier".to_string(),
                    other.to_string(),
                    loc,
                ))
            }
        }
        if matches!(self.cur().kind, TokenKind::Comma) {
            self.advance();
            match self.advance().kind {
                TokenKind::Ident(n) => vars.push(n),
                other => {
                    return Err(Error::ExpectedToken(
                        "identifier".to_string(),
                        other.to_string(),
                        loc,
                    ))
                }
            }
        }
        self.expect(&TokenKind::Colon)?;
        let iter = self.parse_expr()?;
        self.end_of_stmt()?;
        let body = self.parse_block_until(&[Keyword::Endforeach])?;
        self.expect_kw(Keyword::Endforeach)?;
        self.end_of_stmt()?;
        Ok(Stmt {
            kind: StmtKind::Foreach(vars, iter, body),
            loc,
        })
    }

    // ---- expressions ----

    pub fn parse_expr(&mut self) -> Result<Expr, Error> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr, Error> {
        let mut lhs = self.parse_and()?;
        while self.at_kw(Keyword::Or) {
            let loc = self.cur_loc();
            self.advance();
            let rhs = self.parse_and()?;
            lhs = Expr {
                kind: ExprKind::Binary(BinOp::Or, Box::new(lhs), Box::new(rhs)),
                loc,
            };
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Expr, Error> {
        let mut lhs = self.parse_cmp()?;
        while self.at_kw(Keyword::And) {
            let loc = self.cur_loc();
            self.advance();
            let rhs = self.parse_cmp()?;
            lhs = Expr {
                kind: ExprKind::Binary(BinOp::And, Box::new(lhs), Box::new(rhs)),
                loc,
            };
        }
        Ok(lhs)
    }

    fn parse_cmp(&mut self) -> Result<Expr, Error> {
        let mut lhs = self.parse_add()?;
        loop {
            let loc = self.cur_loc();
            let op = match &self.cur().kind {
                TokenKind::EqEq => BinOp::Eq,
                TokenKind::NotEq => BinOp::Ne,
                TokenKind::Lt => BinOp::Lt,
                TokenKind::Lte => BinOp::Le,
                TokenKind::Gt => BinOp::Gt,
                TokenKind::Gte => BinOp::Ge,
                TokenKind::Keyword(Keyword::In) => BinOp::In,
                TokenKind::Keyword(Keyword::Not) => {
                    // `not in`
                    let save = self.pos;
                    self.advance();
                    if self.at_kw(Keyword::In) {
                        self.advance();
                        let rhs = self.parse_add()?;
                        lhs = Expr {
                            kind: ExprKind::Binary(BinOp::NotIn, Box::new(lhs), Box::new(rhs)),
                            loc,
                        };
                        continue;
                    } else {
                        self.pos = save;
                        break;
                    }
                }
                _ => break,
            };
            self.advance();
            let rhs = self.parse_add()?;
            lhs = Expr {
                kind: ExprKind::Binary(op, Box::new(lhs), Box::new(rhs)),
                loc,
            };
        }
        Ok(lhs)
    }

    fn parse_add(&mut self) -> Result<Expr, Error> {
        let mut lhs = self.parse_mul()?;
        loop {
            let loc = self.cur_loc();
            let op = match &self.cur().kind {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_mul()?;
            lhs = Expr {
                kind: ExprKind::Binary(op, Box::new(lhs), Box::new(rhs)),
                loc,
            };
        }
        Ok(lhs)
    }

    fn parse_mul(&mut self) -> Result<Expr, Error> {
        let mut lhs = self.parse_unary()?;
        loop {
            let loc = self.cur_loc();
            let op = match &self.cur().kind {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::Percent => BinOp::Mod,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_unary()?;
            lhs = Expr {
                kind: ExprKind::Binary(op, Box::new(lhs), Box::new(rhs)),
                loc,
            };
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, Error> {
        let loc = self.cur_loc();
        if self.at_kw(Keyword::Not) {
            self.advance();
            let e = self.parse_unary()?;
            return Ok(Expr {
                kind: ExprKind::Unary(UnOp::Not, Box::new(e)),
                loc,
            });
        }
        if matches!(self.cur().kind, TokenKind::Minus) {
            self.advance();
            let e = self.parse_unary()?;
            return Ok(Expr {
                kind: ExprKind::Unary(UnOp::Neg, Box::new(e)),
                loc,
            });
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expr, Error> {
        let mut expr = self.parse_primary()?;
        loop {
            let loc = self.cur_loc();
            match &self.cur().kind {
                TokenKind::Dot => {
                    self.advance();
                    let name = match self.advance().kind {
                        TokenKind::Ident(n) => n,
                        other => {
                            return Err(Error::ExpectedToken(
                                "method name".to_string(),
                                other.to_string(),
                                loc,
                            ))
                        }
                    };
                    let args = self.parse_args()?;
                    expr = Expr {
                        kind: ExprKind::Method(Box::new(expr), name, args),
                        loc,
                    };
                }
                TokenKind::LBracket => {
                    self.advance();
                    let idx = self.parse_expr()?;
                    self.expect(&TokenKind::RBracket)?;
                    expr = Expr {
                        kind: ExprKind::Index(Box::new(expr), Box::new(idx)),
                        loc,
                    };
                }
                TokenKind::LParen => {
                    // only valid directly after a bare identifier (call syntax)
                    let name = match &expr.kind {
                        ExprKind::Id(n) => n.clone(),
                        _ => {
                            return Err(Error::UnexpectedToken(
                                "`(`".to_string(),
                                loc,
                            ))
                        }
                    };
                    let args = self.parse_args()?;
                    expr = Expr {
                        kind: ExprKind::Call(name, args),
                        loc,
                    };
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_args(&mut self) -> Result<Vec<Arg>, Error> {
        self.expect(&TokenKind::LParen)?;
        let mut args = Vec::new();
        let mut seen_kw = false;
        self.skip_newlines();
        while !matches!(self.cur().kind, TokenKind::RParen) {
            let loc = self.cur_loc();
            // keyword arg: IDENT ':' expr
            if let TokenKind::Ident(name) = self.cur().kind.clone() {
                let save = self.pos;
                self.advance();
                if matches!(self.cur().kind, TokenKind::Colon) {
                    self.advance();
                    let value = self.parse_expr()?;
                    seen_kw = true;
                    args.push(Arg {
                        name: Some(name),
                        value,
                        loc,
                    });
                    self.after_arg()?;
                    continue;
                }
                self.pos = save;
            }
            if seen_kw {
                return Err(Error::KeywordBeforePositional(loc));
            }
            let value = self.parse_expr()?;
            args.push(Arg {
                name: None,
                value,
                loc,
            });
            self.after_arg()?;
        }
        self.expect(&TokenKind::RParen)?;
        Ok(args)
    }

    fn after_arg(&mut self) -> Result<(), Error> {
        self.skip_newlines();
        if matches!(self.cur().kind, TokenKind::Comma) {
            self.advance();
            self.skip_newlines();
        }
        Ok(())
    }

    fn parse_primary(&mut self) -> Result<Expr, Error> {
        let loc = self.cur_loc();
        match self.cur().kind.clone() {
            TokenKind::Int(v) => {
                self.advance();
                Ok(Expr {
                    kind: ExprKind::Int(v),
                    loc,
                })
            }
            TokenKind::Str { value, is_fstring } => {
                self.advance();
                Ok(Expr {
                    kind: ExprKind::Str { value, is_fstring },
                    loc,
                })
            }
            TokenKind::Keyword(Keyword::True) => {
                self.advance();
                Ok(Expr {
                    kind: ExprKind::Bool(true),
                    loc,
                })
            }
            TokenKind::Keyword(Keyword::False) => {
                self.advance();
                Ok(Expr {
                    kind: ExprKind::Bool(false),
                    loc,
                })
            }
            TokenKind::Ident(name) => {
                self.advance();
                Ok(Expr {
                    kind: ExprKind::Id(name),
                    loc,
                })
            }
            TokenKind::LParen => {
                self.advance();
                let e = self.parse_expr()?;
                self.expect(&TokenKind::RParen)?;
                Ok(e)
            }
            TokenKind::LBracket => {
                self.advance();
                let mut items = Vec::new();
                self.skip_newlines();
                while !matches!(self.cur().kind, TokenKind::RBracket) {
                    items.push(self.parse_expr()?);
                    self.skip_newlines();
                    if matches!(self.cur().kind, TokenKind::Comma) {
                        self.advance();
                        self.skip_newlines();
                    }
                }
                self.expect(&TokenKind::RBracket)?;
                Ok(Expr {
                    kind: ExprKind::Array(items),
                    loc,
                })
            }
            TokenKind::LBrace => {
                self.advance();
                let mut items = Vec::new();
                self.skip_newlines();
                while !matches!(self.cur().kind, TokenKind::RBrace) {
                    let key = self.parse_expr()?;
                    self.expect(&TokenKind::Colon)?;
                    let value = self.parse_expr()?;
                    items.push((key, value));
                    self.skip_newlines();
                    if matches!(self.cur().kind, TokenKind::Comma) {
                        self.advance();
                        self.skip_newlines();
                    }
                }
                self.expect(&TokenKind::RBrace)?;
                Ok(Expr {
                    kind: ExprKind::Dict(items),
                    loc,
                })
            }
            other => Err(Error::UnexpectedToken(other.to_string(), loc)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{LangMode, Lexer};

    fn parse(src: &str) -> Program {
        let (toks, errs) = Lexer::new(src, "<test>", LangMode::Meson).tokenize();
        assert!(errs.is_empty(), "{errs:?}");
        Parser::new(toks).parse_program().expect("parse failed")
    }

    #[test]
    fn parses_minimal_project() {
        let prog = parse("project('p', 'c')\nexecutable('hello', 'hello.c')\n");
        assert_eq!(prog.stmts.len(), 2);
        match &prog.stmts[0].kind {
            StmtKind::Expr(Expr {
                kind: ExprKind::Call(name, args),
                ..
            }) => {
                assert_eq!(name, "project");
                assert_eq!(args.len(), 2);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn parses_precedence() {
        let prog = parse("x = 1 + 2 * 3\n");
        match &prog.stmts[0].kind {
            StmtKind::Assign(_, Expr { kind: ExprKind::Binary(BinOp::Add, lhs, rhs), .. }) => {
                assert!(matches!(lhs.kind, ExprKind::Int(1)));
                assert!(matches!(rhs.kind, ExprKind::Binary(BinOp::Mul, _, _)));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn keyword_arg_must_follow_positional() {
        let (toks, _) = Lexer::new("f(a: 1, 2)", "<test>", LangMode::Meson).tokenize();
        let err = Parser::new(toks).parse_program();
        assert!(matches!(err, Err(Error::KeywordBeforePositional(_))));
    }

    #[test]
    fn foreach_with_two_vars() {
        let prog = parse("foreach k, v : d\n  x = k\nendforeach\n");
        match &prog.stmts[0].kind {
            StmtKind::Foreach(vars, _, body) => {
                assert_eq!(vars, &vec!["k".to_string(), "v".to_string()]);
                assert_eq!(body.len(), 1);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn first_statement_rule_is_caller_responsibility() {
        // parser does not itself enforce project()-first; Workspace does.
        let prog = parse("x = 1\nproject('p','c')\n");
        assert_eq!(prog.stmts.len(), 2);
    }
}
