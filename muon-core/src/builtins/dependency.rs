//! `dependency()`/`declare_dependency()` and the `dependency` method table,
//! grounded on `examples/original_source/src/functions/dependency.c`.

use std::cmp::Ordering;

use indexmap::IndexMap;

use crate::arena::{Arena, DepsFlavour, Dependency, Handle, Obj};
use crate::args::{expect_bool, expect_string};
use crate::error::Error;
use crate::lexer::Location;

use super::BuiltinCtx;

pub fn dependency(
    ctx: &mut BuiltinCtx,
    arena: &mut Arena,
    args: Vec<(Option<String>, Handle)>,
    loc: &Location,
) -> Result<Handle, Error> {
    let name = args
        .iter()
        .find(|(n, _)| n.is_none())
        .map(|(_, h)| *h)
        .ok_or_else(|| Error::MissingArgument("name".to_string(), loc.clone()))?;
    let name = expect_string(arena, name, loc)?;

    let required = kw_bool(arena, &args, "required", true, loc)?;
    let version_req = kw_string(arena, &args, "version", loc)?;

    // Dependencies that were `declare_dependency()`d earlier in this
    // project are preferred over a fresh (unresolvable-without-a-system)
    // lookup, matching `dependency.get_variable`'s `variables`-dict-first
    // precedence in the reference implementation.
    if let Some(h) = ctx.current_project().declared_dependencies.get(&name).copied() {
        return Ok(h);
    }

    if !required {
        let dep = Dependency {
            name,
            flavour: DepsFlavour::NotFound,
            version: String::new(),
            compile_args: Vec::new(),
            link_args: Vec::new(),
            variables: IndexMap::new(),
        };
        return Ok(arena.make(Obj::Dependency(dep)));
    }

    // Out of scope: shelling out to pkg-config (`spec.md` §1 "Explicitly
    // out of scope"). A required dependency this core cannot probe is a
    // user-visible error rather than a silent fabrication.
    let _ = version_req;
    Err(Error::MissingTool(format!("pkg-config probe for `{name}`")))
}

pub fn declare_dependency(
    ctx: &mut BuiltinCtx,
    arena: &mut Arena,
    args: Vec<(Option<String>, Handle)>,
    loc: &Location,
) -> Result<Handle, Error> {
    let version = kw_string(arena, &args, "version", loc)?.unwrap_or_else(|| "undefined".to_string());
    let compile_args = kw_string_list(arena, &args, "compile_args")?;
    let link_args = kw_string_list(arena, &args, "link_args")?;
    let variables = kw_dict_as_map(arena, &args, "variables", loc)?;
    let dep = Dependency {
        name: ctx.current_project().name.clone(),
        flavour: DepsFlavour::Found,
        version,
        compile_args,
        link_args,
        variables,
    };
    Ok(arena.make(Obj::Dependency(dep)))
}

pub fn call_method(
    arena: &mut Arena,
    recv: Handle,
    name: &str,
    args: Vec<(Option<String>, Handle)>,
    loc: &Location,
) -> Result<Handle, Error> {
    let dep = match arena.get(recv) {
        Obj::Dependency(d) => d.clone(),
        _ => unreachable!("dispatched only for Dependency objects"),
    };
    match name {
        "found" => Ok(arena.make_bool(dep.flavour == DepsFlavour::Found)),
        "version" => Ok(arena.make_string(if dep.version.is_empty() {
            "unknown"
        } else {
            &dep.version
        })),
        "get_variable" => {
            let positional = args.iter().find(|(n, _)| n.is_none()).map(|(_, h)| *h);
            if let Some(h) = positional {
                let key = expect_string(arena, h, loc)?;
                dep.variables
                    .get(&key)
                    .map(|v| arena.make_string(v))
                    .ok_or_else(|| Error::KeyNotFound(key, loc.clone()))
            } else if let Some(h) = kw(&args, "pkgconfig") {
                let key = expect_string(arena, h, loc)?;
                Err(Error::MissingTool(format!("pkg-config variable `{key}`")))
            } else {
                Err(Error::MissingArgument("name".to_string(), loc.clone()))
            }
        }
        "get_pkgconfig_variable" => Err(Error::MissingTool("pkg-config".to_string())),
        _ => Err(Error::UnknownMethod(name.to_string(), "dep".to_string(), loc.clone())),
    }
}

fn kw(args: &[(Option<String>, Handle)], name: &str) -> Option<Handle> {
    args.iter()
        .find(|(n, _)| n.as_deref() == Some(name))
        .map(|(_, h)| *h)
}

fn kw_string(
    arena: &Arena,
    args: &[(Option<String>, Handle)],
    name: &str,
    loc: &Location,
) -> Result<Option<String>, Error> {
    kw(args, name).map(|h| expect_string(arena, h, loc)).transpose()
}

fn kw_bool(
    arena: &Arena,
    args: &[(Option<String>, Handle)],
    name: &str,
    default: bool,
    loc: &Location,
) -> Result<bool, Error> {
    match kw(args, name) {
        Some(h) => expect_bool(arena, h, loc),
        None => Ok(default),
    }
}

fn kw_string_list(arena: &Arena, args: &[(Option<String>, Handle)], name: &str) -> Result<Vec<String>, Error> {
    match kw(args, name) {
        Some(h) => crate::args::coerce_to_array(arena, h)
            .into_iter()
            .map(|i| expect_string(arena, i, &Location::new(std::rc::Rc::from("<args>"), 0, 0)))
            .collect(),
        None => Ok(Vec::new()),
    }
}

/// `variables: {key: val, ...}` keyword, read into a plain string map.
fn kw_dict_as_map(
    arena: &Arena,
    args: &[(Option<String>, Handle)],
    name: &str,
    loc: &Location,
) -> Result<IndexMap<String, String>, Error> {
    let Some(h) = kw(args, name) else {
        return Ok(IndexMap::new());
    };
    let mut out = IndexMap::new();
    for key in arena.dict_keys(h) {
        let val_h = arena.dict_get(h, &key).expect("key just listed by dict_keys");
        out.insert(key, expect_string(arena, val_h, loc)?);
    }
    Ok(out)
}

/// Split a leading comparator (`<`, `<=`, `>`, `>=`, `==`, `!=`) off a
/// version requirement string; defaults to `==` when none is present.
pub fn split_version_op(spec: &str) -> (&str, &str) {
    for op in ["<=", ">=", "==", "!=", "<", ">"] {
        if let Some(rest) = spec.strip_prefix(op) {
            return (op, rest.trim());
        }
    }
    ("==", spec.trim())
}

/// Component-wise version comparison (`spec.md` §3.4 supplement):
/// dot/dash-separated components compared numerically when both sides
/// parse as integers, lexically otherwise.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let split = |s: &str| -> Vec<String> {
        s.split(|c| c == '.' || c == '-')
            .map(|p| p.to_string())
            .collect()
    };
    let (pa, pb) = (split(a), split(b));
    for i in 0..pa.len().max(pb.len()) {
        let ca = pa.get(i).map(String::as_str).unwrap_or("0");
        let cb = pb.get(i).map(String::as_str).unwrap_or("0");
        let ord = match (ca.parse::<i64>(), cb.parse::<i64>()) {
            (Ok(x), Ok(y)) => x.cmp(&y),
            _ => ca.cmp(cb),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

pub fn satisfies(ord: Ordering, op: &str) -> bool {
    match op {
        "<" => ord == Ordering::Less,
        "<=" => ord != Ordering::Greater,
        ">" => ord == Ordering::Greater,
        ">=" => ord != Ordering::Less,
        "!=" => ord != Ordering::Equal,
        _ => ord == Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_compare_numeric_components() {
        assert_eq!(compare_versions("1.10.0", "1.9.0"), Ordering::Greater);
        assert_eq!(compare_versions("1.0.0", "1.0.0"), Ordering::Equal);
    }

    #[test]
    fn split_version_op_defaults_to_eq() {
        assert_eq!(split_version_op("1.2.0"), ("==", "1.2.0"));
        assert_eq!(split_version_op(">=1.2.0"), (">=", "1.2.0"));
    }
}
