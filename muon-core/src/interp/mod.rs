//! Tree-walking interpreter (C6)
//!
//! Evaluates a parsed [`crate::parser::Program`] against an [`Arena`],
//! delegating every builtin function call (`project()`, `executable()`,
//! ...) and method call (`'x'.strip()`, `dep.found()`, ...) to a
//! [`Dispatcher`] supplied by the caller. This mirrors `eval.c`'s
//! `obj_vcall` split between the generic expression evaluator and the
//! per-object-kind method tables in `functions/*.c`.

pub mod scope;
pub use scope::Scope;

use crate::arena::{Arena, Handle, Obj};
use crate::error::Error;
use crate::lexer::Location;
use crate::parser::{Arg, BinOp, Expr, ExprKind, Program, Stmt, StmtKind, UnOp};

/// Hook the interpreter calls into for every named function or method. The
/// workspace-aware builtin tables (`crate::builtins`) implement this.
pub trait Dispatcher {
    fn call_function(
        &mut self,
        arena: &mut Arena,
        name: &str,
        args: Vec<(Option<String>, Handle)>,
        loc: &Location,
    ) -> Result<Handle, Error>;

    fn call_method(
        &mut self,
        arena: &mut Arena,
        receiver: Handle,
        name: &str,
        args: Vec<(Option<String>, Handle)>,
        loc: &Location,
    ) -> Result<Handle, Error>;
}

/// Non-local control flow produced while executing a statement block.
enum Flow {
    Normal,
    Continue,
    Break,
}

pub struct Interp<'a> {
    pub arena: &'a mut Arena,
    pub scope: Scope,
}

impl<'a> Interp<'a> {
    pub fn new(arena: &'a mut Arena) -> Self {
        Self {
            arena,
            scope: Scope::new(),
        }
    }

    pub fn eval_program(&mut self, prog: &Program, d: &mut dyn Dispatcher) -> Result<(), Error> {
        self.eval_block(&prog.stmts, d)?;
        Ok(())
    }

    fn eval_block(&mut self, stmts: &[Stmt], d: &mut dyn Dispatcher) -> Result<Flow, Error> {
        for stmt in stmts {
            match self.eval_stmt(stmt, d)? {
                Flow::Normal => {}
                flow => return Ok(flow),
            }
        }
        Ok(Flow::Normal)
    }

    fn eval_stmt(&mut self, stmt: &Stmt, d: &mut dyn Dispatcher) -> Result<Flow, Error> {
        match &stmt.kind {
            StmtKind::Expr(e) => {
                self.eval_expr(e, d)?;
                Ok(Flow::Normal)
            }
            StmtKind::Assign(name, e) => {
                let v = self.eval_expr(e, d)?;
                self.scope.set(name, v);
                Ok(Flow::Normal)
            }
            StmtKind::PlusAssign(name, e) => {
                let rhs = self.eval_expr(e, d)?;
                let cur = self
                    .scope
                    .get(name)
                    .ok_or_else(|| Error::UnknownName(name.clone(), stmt.loc.clone()))?;
                let sum = self.binary_add(cur, rhs, &stmt.loc)?;
                self.scope.set(name, sum);
                Ok(Flow::Normal)
            }
            StmtKind::If(branches, else_body) => {
                for (cond, body) in branches {
                    let c = self.eval_expr(cond, d)?;
                    if self.expect_bool(c, &cond.loc)? {
                        return self.eval_block(body, d);
                    }
                }
                if let Some(body) = else_body {
                    return self.eval_block(body, d);
                }
                Ok(Flow::Normal)
            }
            StmtKind::Foreach(vars, iter_expr, body) => self.eval_foreach(vars, iter_expr, body, d, &stmt.loc),
            StmtKind::Continue => Ok(Flow::Continue),
            StmtKind::Break => Ok(Flow::Break),
        }
    }

    fn eval_foreach(
        &mut self,
        vars: &[String],
        iter_expr: &Expr,
        body: &[Stmt],
        d: &mut dyn Dispatcher,
        loc: &Location,
    ) -> Result<Flow, Error> {
        let iterable = self.eval_expr(iter_expr, d)?;
        self.scope.push();
        let result = match (vars.len(), self.arena.get(iterable).clone()) {
            (1, Obj::Array(_)) => {
                let items = self.arena.array_items(iterable);
                self.run_loop(items.into_iter().map(|h| vec![h]), vars, body, d)
            }
            (2, Obj::Dict(_)) => {
                let pairs: Vec<(String, Handle)> = self
                    .arena
                    .dict_keys(iterable)
                    .into_iter()
                    .map(|k| {
                        let v = self.arena.dict_get(iterable, &k).expect("key just listed");
                        (k, v)
                    })
                    .collect();
                let rows: Vec<Vec<Handle>> = pairs
                    .into_iter()
                    .map(|(k, v)| vec![self.arena.make_string(&k), v])
                    .collect();
                self.run_loop(rows.into_iter(), vars, body, d)
            }
            _ => Err(Error::TypeMismatch {
                expected: if vars.len() == 2 { "dict" } else { "array" }.to_string(),
                got: self.arena.kind_name(iterable).to_string(),
                loc: loc.clone(),
            }),
        };
        self.scope.pop();
        result
    }

    fn run_loop(
        &mut self,
        rows: impl Iterator<Item = Vec<Handle>>,
        vars: &[String],
        body: &[Stmt],
        d: &mut dyn Dispatcher,
    ) -> Result<Flow, Error> {
        for row in rows {
            for (name, val) in vars.iter().zip(row.into_iter()) {
                self.scope.bind_local(name, val);
            }
            match self.eval_block(body, d)? {
                Flow::Continue | Flow::Normal => continue,
                Flow::Break => break,
            }
        }
        Ok(Flow::Normal)
    }

    pub fn eval_expr(&mut self, expr: &Expr, d: &mut dyn Dispatcher) -> Result<Handle, Error> {
        match &expr.kind {
            ExprKind::Null => Ok(Arena::null()),
            ExprKind::Bool(b) => Ok(self.arena.make_bool(*b)),
            ExprKind::Int(n) => Ok(self.arena.make_int(*n)),
            ExprKind::Str { value, is_fstring } => {
                if *is_fstring {
                    let rendered = self.render_fstring(value, &expr.loc)?;
                    Ok(self.arena.make_string(&rendered))
                } else {
                    Ok(self.arena.make_string(value))
                }
            }
            ExprKind::Id(name) => self
                .scope
                .get(name)
                .ok_or_else(|| Error::UnknownName(name.clone(), expr.loc.clone())),
            ExprKind::Array(items) => {
                let mut handles = Vec::with_capacity(items.len());
                for it in items {
                    handles.push(self.eval_expr(it, d)?);
                }
                Ok(self.arena.make_array(handles))
            }
            ExprKind::Dict(pairs) => {
                let dict = self.arena.make_dict();
                for (k, v) in pairs {
                    let kh = self.eval_expr(k, d)?;
                    let key = match self.arena.get(kh) {
                        Obj::Str(_) => self.arena.display(kh),
                        _ => {
                            return Err(Error::TypeMismatch {
                                expected: "str".to_string(),
                                got: self.arena.kind_name(kh).to_string(),
                                loc: k.loc.clone(),
                            })
                        }
                    };
                    let vh = self.eval_expr(v, d)?;
                    self.arena.dict_set(dict, key, vh);
                }
                Ok(dict)
            }
            ExprKind::Unary(op, inner) => {
                let v = self.eval_expr(inner, d)?;
                self.eval_unary(op, v, &expr.loc)
            }
            ExprKind::Binary(BinOp::And, lhs, rhs) => {
                let l = self.eval_expr(lhs, d)?;
                if !self.expect_bool(l, &lhs.loc)? {
                    return Ok(self.arena.make_bool(false));
                }
                let r = self.eval_expr(rhs, d)?;
                Ok(self.arena.make_bool(self.expect_bool(r, &rhs.loc)?))
            }
            ExprKind::Binary(BinOp::Or, lhs, rhs) => {
                let l = self.eval_expr(lhs, d)?;
                if self.expect_bool(l, &lhs.loc)? {
                    return Ok(self.arena.make_bool(true));
                }
                let r = self.eval_expr(rhs, d)?;
                Ok(self.arena.make_bool(self.expect_bool(r, &rhs.loc)?))
            }
            ExprKind::Binary(op, lhs, rhs) => {
                let l = self.eval_expr(lhs, d)?;
                let r = self.eval_expr(rhs, d)?;
                self.eval_binary(op, l, r, &expr.loc)
            }
            ExprKind::Index(base, idx) => {
                let b = self.eval_expr(base, d)?;
                let i = self.eval_expr(idx, d)?;
                self.eval_index(b, i, &expr.loc)
            }
            ExprKind::Call(name, args) => {
                let evaluated = self.eval_args(args, d)?;
                d.call_function(self.arena, name, evaluated, &expr.loc)
            }
            ExprKind::Method(recv, name, args) => {
                let r = self.eval_expr(recv, d)?;
                let evaluated = self.eval_args(args, d)?;
                d.call_method(self.arena, r, name, evaluated, &expr.loc)
            }
        }
    }

    fn eval_args(
        &mut self,
        args: &[Arg],
        d: &mut dyn Dispatcher,
    ) -> Result<Vec<(Option<String>, Handle)>, Error> {
        let mut out = Vec::with_capacity(args.len());
        for a in args {
            let v = self.eval_expr(&a.value, d)?;
            out.push((a.name.clone(), v));
        }
        Ok(out)
    }

    fn eval_unary(&mut self, op: &UnOp, v: Handle, loc: &Location) -> Result<Handle, Error> {
        match op {
            UnOp::Not => {
                let b = self.expect_bool(v, loc)?;
                Ok(self.arena.make_bool(!b))
            }
            UnOp::Neg => match self.arena.get(v) {
                Obj::Number(n) => Ok(self.arena.make_int(-n)),
                _ => Err(Error::TypeMismatch {
                    expected: "int".to_string(),
                    got: self.arena.kind_name(v).to_string(),
                    loc: loc.clone(),
                }),
            },
        }
    }

    fn eval_binary(&mut self, op: &BinOp, l: Handle, r: Handle, loc: &Location) -> Result<Handle, Error> {
        use BinOp::*;
        match op {
            Add => self.binary_add(l, r, loc),
            Sub => {
                let (a, b) = self.expect_two_ints(l, r, loc)?;
                Ok(self.arena.make_int(a - b))
            }
            Mul => {
                let (a, b) = self.expect_two_ints(l, r, loc)?;
                Ok(self.arena.make_int(a * b))
            }
            Div => {
                let (a, b) = self.expect_two_ints(l, r, loc)?;
                if b == 0 {
                    return Err(Error::DivideByZero(loc.clone()));
                }
                Ok(self.arena.make_int(a / b))
            }
            Mod => {
                let (a, b) = self.expect_two_ints(l, r, loc)?;
                if b == 0 {
                    return Err(Error::DivideByZero(loc.clone()));
                }
                let r = a % b;
                Ok(self.arena.make_int(if (r != 0) && ((r < 0) != (b < 0)) { r + b } else { r }))
            }
            Eq => Ok(self.arena.make_bool(self.arena.structural_eq(l, r))),
            Ne => Ok(self.arena.make_bool(!self.arena.structural_eq(l, r))),
            Lt | Le | Gt | Ge => self.eval_ordering(op, l, r, loc),
            In => self.eval_membership(l, r, loc).map(|b| self.arena.make_bool(b)),
            NotIn => self
                .eval_membership(l, r, loc)
                .map(|b| self.arena.make_bool(!b)),
            And | Or => unreachable!("short-circuit ops handled in eval_expr"),
        }
    }

    fn binary_add(&mut self, l: Handle, r: Handle, loc: &Location) -> Result<Handle, Error> {
        match (self.arena.get(l).clone(), self.arena.get(r).clone()) {
            (Obj::Number(a), Obj::Number(b)) => Ok(self.arena.make_int(a + b)),
            (Obj::Str(_), Obj::Str(_)) => {
                let combined = format!(
                    "{}{}",
                    self.arena.display(l),
                    self.arena.display(r)
                );
                Ok(self.arena.make_string(&combined))
            }
            (Obj::Array(_), _) => {
                let out = self.arena.make_array(self.arena.array_items(l));
                self.arena.array_extend(out, r);
                Ok(out)
            }
            (Obj::Dict(_), Obj::Dict(_)) => {
                let out = self.arena.make_dict();
                self.arena.dict_merge(out, l);
                self.arena.dict_merge(out, r);
                Ok(out)
            }
            _ => Err(Error::TypeMismatch {
                expected: "matching addable types".to_string(),
                got: format!(
                    "{} + {}",
                    self.arena.kind_name(l),
                    self.arena.kind_name(r)
                ),
                loc: loc.clone(),
            }),
        }
    }

    fn eval_ordering(&mut self, op: &BinOp, l: Handle, r: Handle, loc: &Location) -> Result<Handle, Error> {
        let ord = match (self.arena.get(l).clone(), self.arena.get(r).clone()) {
            (Obj::Number(a), Obj::Number(b)) => a.cmp(&b),
            (Obj::Str(_), Obj::Str(_)) => self.arena.display(l).cmp(&self.arena.display(r)),
            _ => {
                return Err(Error::TypeMismatch {
                    expected: "two ints or two strings".to_string(),
                    got: format!("{} , {}", self.arena.kind_name(l), self.arena.kind_name(r)),
                    loc: loc.clone(),
                })
            }
        };
        use std::cmp::Ordering::*;
        let b = match op {
            BinOp::Lt => ord == Less,
            BinOp::Le => ord != Greater,
            BinOp::Gt => ord == Greater,
            BinOp::Ge => ord != Less,
            _ => unreachable!(),
        };
        Ok(self.arena.make_bool(b))
    }

    fn eval_membership(&mut self, needle: Handle, haystack: Handle, loc: &Location) -> Result<bool, Error> {
        match self.arena.get(haystack).clone() {
            Obj::Array(_) => Ok(self.arena.array_index_of(haystack, needle).is_some()),
            Obj::Dict(_) => {
                let key = self.expect_string_value(needle, loc)?;
                Ok(self.arena.dict_has(haystack, &key))
            }
            Obj::Str(_) => {
                let n = self.expect_string_value(needle, loc)?;
                Ok(self.arena.display(haystack).contains(&n))
            }
            _ => Err(Error::TypeMismatch {
                expected: "array, dict, or str".to_string(),
                got: self.arena.kind_name(haystack).to_string(),
                loc: loc.clone(),
            }),
        }
    }

    fn eval_index(&mut self, base: Handle, idx: Handle, loc: &Location) -> Result<Handle, Error> {
        match self.arena.get(base).clone() {
            Obj::Array(items) => {
                let n = self.expect_int_value(idx, loc)?;
                let len = items.len() as i64;
                let real = if n < 0 { n + len } else { n };
                if real < 0 || real >= len {
                    return Err(Error::IndexOutOfBounds(n, items.len(), loc.clone()));
                }
                Ok(items[real as usize])
            }
            Obj::Dict(_) => {
                let key = self.expect_string_value(idx, loc)?;
                self.arena
                    .dict_get(base, &key)
                    .ok_or_else(|| Error::KeyNotFound(key, loc.clone()))
            }
            _ => Err(Error::TypeMismatch {
                expected: "array or dict".to_string(),
                got: self.arena.kind_name(base).to_string(),
                loc: loc.clone(),
            }),
        }
    }

    /// Expand `@name@` placeholders against the current scope
    /// (`spec.md` §4.3 "f-strings").
    fn render_fstring(&mut self, template: &str, loc: &Location) -> Result<String, Error> {
        let mut out = String::with_capacity(template.len());
        let mut chars = template.chars().peekable();
        while let Some(c) = chars.next() {
            if c != '@' {
                out.push(c);
                continue;
            }
            let mut name = String::new();
            let mut closed = false;
            while let Some(&n) = chars.peek() {
                if n == '@' {
                    chars.next();
                    closed = true;
                    break;
                }
                name.push(n);
                chars.next();
            }
            if !closed {
                out.push('@');
                out.push_str(&name);
                continue;
            }
            let h = self
                .scope
                .get(&name)
                .ok_or_else(|| Error::UnknownName(name.clone(), loc.clone()))?;
            out.push_str(&self.arena.display(h));
        }
        Ok(out)
    }

    fn expect_bool(&self, h: Handle, loc: &Location) -> Result<bool, Error> {
        crate::args::expect_bool(self.arena, h, loc)
    }

    fn expect_two_ints(&self, l: Handle, r: Handle, loc: &Location) -> Result<(i64, i64), Error> {
        Ok((
            crate::args::expect_int(self.arena, l, loc)?,
            crate::args::expect_int(self.arena, r, loc)?,
        ))
    }

    fn expect_int_value(&self, h: Handle, loc: &Location) -> Result<i64, Error> {
        crate::args::expect_int(self.arena, h, loc)
    }

    fn expect_string_value(&self, h: Handle, loc: &Location) -> Result<String, Error> {
        crate::args::expect_string(self.arena, h, loc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{LangMode, Lexer};
    use crate::parser::Parser;

    struct NoopDispatcher;
    impl Dispatcher for NoopDispatcher {
        fn call_function(
            &mut self,
            _arena: &mut Arena,
            name: &str,
            _args: Vec<(Option<String>, Handle)>,
            loc: &Location,
        ) -> Result<Handle, Error> {
            Err(Error::UnknownFunction(name.to_string(), loc.clone()))
        }
        fn call_method(
            &mut self,
            _arena: &mut Arena,
            _receiver: Handle,
            name: &str,
            _args: Vec<(Option<String>, Handle)>,
            loc: &Location,
        ) -> Result<Handle, Error> {
            Err(Error::UnknownMethod(name.to_string(), "?".to_string(), loc.clone()))
        }
    }

    fn run(src: &str) -> (Arena, Scope) {
        let (toks, errs) = Lexer::new(src, "<test>", LangMode::Meson).tokenize();
        assert!(errs.is_empty());
        let prog = Parser::new(toks).parse_program().unwrap();
        let mut arena = Arena::new();
        let mut d = NoopDispatcher;
        let scope = {
            let mut interp = Interp::new(&mut arena);
            interp.eval_program(&prog, &mut d).unwrap();
            interp.scope
        };
        (arena, scope)
    }

    #[test]
    fn arithmetic_precedence_matches_parser() {
        let (arena, scope) = run("x = 1 + 2 * 3\n");
        let h = scope.get("x").unwrap();
        assert!(matches!(arena.get(h), Obj::Number(7)));
    }

    #[test]
    fn string_concat_via_plus() {
        let (arena, scope) = run("x = 'a' + 'b'\n");
        let h = scope.get("x").unwrap();
        assert_eq!(arena.display(h), "ab");
    }

    #[test]
    fn and_short_circuits() {
        let (arena, scope) = run("x = false and true\n");
        let h = scope.get("x").unwrap();
        assert!(matches!(arena.get(h), Obj::Bool(false)));
    }

    #[test]
    fn foreach_over_array_binds_each_element() {
        let (arena, scope) = run("total = 0\nforeach v : [1, 2, 3]\n  total = total + v\nendforeach\n");
        let h = scope.get("total").unwrap();
        assert!(matches!(arena.get(h), Obj::Number(6)));
    }

    #[test]
    fn plus_assign_extends_array() {
        let (arena, scope) = run("xs = [1]\nxs += [2, 3]\n");
        let h = scope.get("xs").unwrap();
        assert_eq!(arena.array_len(h), 3);
    }

    #[test]
    fn fstring_interpolates_variable() {
        let (arena, scope) = run("name = 'world'\ngreeting = f'hello @name@'\n");
        let h = scope.get("greeting").unwrap();
        assert_eq!(arena.display(h), "hello world");
    }

    #[test]
    fn negative_array_index_wraps_from_end() {
        let (arena, scope) = run("xs = [1, 2, 3]\nlast = xs[-1]\n");
        let h = scope.get("last").unwrap();
        assert!(matches!(arena.get(h), Obj::Number(3)));
    }
}
