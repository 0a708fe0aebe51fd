//! Argument matcher (C5)
//!
//! Builtin functions and methods declare their shape once as a
//! [`Signature`]; [`match_args`] turns the evaluated `(name, value)` pairs
//! produced by the interpreter into a [`Matched`] bundle indexed by
//! name, the way `func_lookup`'s argument tables work in
//! `examples/original_source/src/lang/func_lookup.c`.

use std::collections::HashMap;

use crate::arena::{Arena, Handle, Obj};
use crate::error::Error;
use crate::lexer::Location;

#[derive(Debug, Clone, Copy)]
pub struct PosSpec {
    pub name: &'static str,
    pub optional: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct KwSpec {
    pub name: &'static str,
    pub required: bool,
}

/// A function/method call shape: some fixed positional arguments, an
/// optional trailing glob that swallows the rest, and a set of named
/// keyword arguments.
#[derive(Debug, Clone, Default)]
pub struct Signature {
    pub positional: Vec<PosSpec>,
    pub glob: bool,
    pub keywords: Vec<KwSpec>,
}

impl Signature {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pos(mut self, name: &'static str) -> Self {
        self.positional.push(PosSpec {
            name,
            optional: false,
        });
        self
    }

    pub fn opt_pos(mut self, name: &'static str) -> Self {
        self.positional.push(PosSpec {
            name,
            optional: true,
        });
        self
    }

    pub fn glob(mut self) -> Self {
        self.glob = true;
        self
    }

    pub fn kw(mut self, name: &'static str) -> Self {
        self.keywords.push(KwSpec {
            name,
            required: false,
        });
        self
    }

    pub fn required_kw(mut self, name: &'static str) -> Self {
        self.keywords.push(KwSpec {
            name,
            required: true,
        });
        self
    }
}

/// The result of matching a call's arguments against a [`Signature`].
pub struct Matched {
    positional: HashMap<&'static str, Handle>,
    pub glob: Vec<Handle>,
    keywords: HashMap<String, Handle>,
}

impl Matched {
    pub fn pos(&self, name: &'static str) -> Option<Handle> {
        self.positional.get(name).copied()
    }

    pub fn kw(&self, name: &str) -> Option<Handle> {
        self.keywords.get(name).copied()
    }
}

/// `args` is the already-evaluated call: `None` name for positional,
/// `Some(name)` for keyword, in source order (the parser already rejects
/// a positional arg following a keyword one).
pub fn match_args(
    sig: &Signature,
    args: &[(Option<String>, Handle)],
    loc: &Location,
) -> Result<Matched, Error> {
    let positional: Vec<Handle> = args
        .iter()
        .filter(|(n, _)| n.is_none())
        .map(|(_, h)| *h)
        .collect();
    let keyword_pairs: Vec<(&str, Handle)> = args
        .iter()
        .filter_map(|(n, h)| n.as_deref().map(|n| (n, *h)))
        .collect();

    if !sig.glob && positional.len() > sig.positional.len() {
        return Err(Error::TooManyArguments(loc.clone()));
    }

    let mut matched_pos = HashMap::new();
    let mut glob = Vec::new();
    for (i, spec) in sig.positional.iter().enumerate() {
        match positional.get(i) {
            Some(h) => {
                matched_pos.insert(spec.name, *h);
            }
            None if spec.optional => {}
            None => return Err(Error::MissingArgument(spec.name.to_string(), loc.clone())),
        }
    }
    if sig.glob && positional.len() > sig.positional.len() {
        glob.extend(positional[sig.positional.len()..].iter().copied());
    }

    let mut keywords = HashMap::new();
    for (name, h) in keyword_pairs {
        if !sig.keywords.iter().any(|k| k.name == name) {
            return Err(Error::UnknownKeyword(name.to_string(), loc.clone()));
        }
        keywords.insert(name.to_string(), h);
    }
    for spec in &sig.keywords {
        if spec.required && !keywords.contains_key(spec.name) {
            return Err(Error::MissingArgument(spec.name.to_string(), loc.clone()));
        }
    }

    Ok(Matched {
        positional: matched_pos,
        glob,
        keywords,
    })
}

/// Promote a bare scalar to a one-element array, and flatten nested
/// arrays one level, the way Meson coerces `sources: 'a.c'` into
/// `['a.c']` (`spec.md` §4.2 "array" coercion note).
pub fn coerce_to_array(arena: &Arena, h: Handle) -> Vec<Handle> {
    match arena.get(h) {
        Obj::Array(_) => arena.flatten(h),
        _ => vec![h],
    }
}

/// Coerce a `string`-or-`file` object to its textual form, erroring on
/// anything else.
pub fn expect_string(arena: &Arena, h: Handle, loc: &Location) -> Result<String, Error> {
    match arena.get(h) {
        Obj::Str(_) | Obj::File(_) => Ok(arena.display(h)),
        _ => Err(Error::TypeMismatch {
            expected: "str".to_string(),
            got: arena.kind_name(h).to_string(),
            loc: loc.clone(),
        }),
    }
}

pub fn expect_bool(arena: &Arena, h: Handle, loc: &Location) -> Result<bool, Error> {
    match arena.get(h) {
        Obj::Bool(b) => Ok(*b),
        _ => Err(Error::TypeMismatch {
            expected: "bool".to_string(),
            got: arena.kind_name(h).to_string(),
            loc: loc.clone(),
        }),
    }
}

pub fn expect_int(arena: &Arena, h: Handle, loc: &Location) -> Result<i64, Error> {
    match arena.get(h) {
        Obj::Number(n) => Ok(*n),
        _ => Err(Error::TypeMismatch {
            expected: "int".to_string(),
            got: arena.kind_name(h).to_string(),
            loc: loc.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc() -> Location {
        Location::new(std::rc::Rc::from("<test>"), 1, 1)
    }

    #[test]
    fn missing_required_positional_errors() {
        let sig = Signature::new().pos("name");
        let err = match_args(&sig, &[], &loc());
        assert!(matches!(err, Err(Error::MissingArgument(_, _))));
    }

    #[test]
    fn optional_positional_is_absent_without_error() {
        let sig = Signature::new().pos("name").opt_pos("version");
        let m = match_args(&sig, &[(None, 7)], &loc()).unwrap();
        assert_eq!(m.pos("name"), Some(7));
        assert_eq!(m.pos("version"), None);
    }

    #[test]
    fn unknown_keyword_errors() {
        let sig = Signature::new().kw("install");
        let err = match_args(&sig, &[(Some("bogus".to_string()), 1)], &loc());
        assert!(matches!(err, Err(Error::UnknownKeyword(_, _))));
    }

    #[test]
    fn glob_collects_trailing_positional() {
        let sig = Signature::new().pos("name").glob();
        let m = match_args(&sig, &[(None, 1), (None, 2), (None, 3)], &loc()).unwrap();
        assert_eq!(m.pos("name"), Some(1));
        assert_eq!(m.glob, vec![2, 3]);
    }

    #[test]
    fn too_many_positional_without_glob_errors() {
        let sig = Signature::new().pos("name");
        let err = match_args(&sig, &[(None, 1), (None, 2)], &loc());
        assert!(matches!(err, Err(Error::TooManyArguments(_))));
    }
}
