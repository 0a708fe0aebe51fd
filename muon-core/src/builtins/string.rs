//! `string` method table (`spec.md` §4.7).

use crate::arena::{Arena, Handle, Obj};
use crate::args::{expect_int, expect_string};
use crate::error::Error;
use crate::lexer::Location;

pub fn call(
    arena: &mut Arena,
    recv: Handle,
    name: &str,
    args: Vec<(Option<String>, Handle)>,
    loc: &Location,
) -> Result<Handle, Error> {
    let s = arena.display(recv);
    match name {
        "strip" => Ok(arena.make_string(s.trim())),
        "to_upper" => Ok(arena.make_string(&s.to_uppercase())),
        "to_lower" => Ok(arena.make_string(&s.to_lowercase())),
        "underscorify" => {
            let out: String = s
                .chars()
                .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
                .collect();
            Ok(arena.make_string(&out))
        }
        "to_int" => s
            .trim()
            .parse::<i64>()
            .map(|n| arena.make_int(n))
            .map_err(|_| Error::InvalidVersion(s.clone(), loc.clone())),
        "contains" => {
            let needle = first_string(arena, &args, loc)?;
            Ok(arena.make_bool(s.contains(&needle)))
        }
        "startswith" => {
            let needle = first_string(arena, &args, loc)?;
            Ok(arena.make_bool(s.starts_with(&needle)))
        }
        "endswith" => {
            let needle = first_string(arena, &args, loc)?;
            Ok(arena.make_bool(s.ends_with(&needle)))
        }
        "split" => {
            let sep = match args.first() {
                Some((_, h)) => expect_string(arena, *h, loc)?,
                None => " ".to_string(),
            };
            let parts: Vec<Handle> = if sep.is_empty() {
                vec![arena.make_string(&s)]
            } else {
                s.split(sep.as_str())
                    .map(|p| arena.make_string(p))
                    .collect()
            };
            Ok(arena.make_array(parts))
        }
        "join" => {
            // `sep.join(list)` — recv is the separator.
            let list_h = args
                .first()
                .map(|(_, h)| *h)
                .ok_or_else(|| Error::MissingArgument("items".to_string(), loc.clone()))?;
            let items = arena.array_items(list_h);
            let parts: Vec<String> = items
                .into_iter()
                .map(|h| expect_string(arena, h, loc))
                .collect::<Result<_, _>>()?;
            Ok(arena.make_string(&parts.join(&s)))
        }
        "format" => {
            // `'@0@ of @1@'.format(a, b)`: replace `@N@` with the Nth arg.
            let values: Vec<Handle> = args.into_iter().map(|(_, h)| h).collect();
            let mut out = String::with_capacity(s.len());
            let mut chars = s.chars().peekable();
            while let Some(c) = chars.next() {
                if c != '@' {
                    out.push(c);
                    continue;
                }
                let mut digits = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() {
                        digits.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if chars.peek() == Some(&'@') && !digits.is_empty() {
                    chars.next();
                    let idx: usize = digits.parse().unwrap_or(usize::MAX);
                    match values.get(idx) {
                        Some(h) => out.push_str(&arena.display(*h)),
                        None => {
                            return Err(Error::IndexOutOfBounds(
                                idx as i64,
                                values.len(),
                                loc.clone(),
                            ))
                        }
                    }
                } else {
                    out.push('@');
                    out.push_str(&digits);
                }
            }
            Ok(arena.make_string(&out))
        }
        "substring" => {
            let start = args.first().map(|(_, h)| expect_int(arena, *h, loc)).transpose()?.unwrap_or(0);
            let chars: Vec<char> = s.chars().collect();
            let len = chars.len() as i64;
            let real_start = start.clamp(0, len) as usize;
            let end = args
                .get(1)
                .map(|(_, h)| expect_int(arena, *h, loc))
                .transpose()?
                .map(|e| e.clamp(0, len) as usize)
                .unwrap_or(chars.len());
            let slice: String = chars[real_start.min(end)..end].iter().collect();
            Ok(arena.make_string(&slice))
        }
        "version_compare" => {
            let other = first_string(arena, &args, loc)?;
            let (op, rest) = crate::builtins::dependency::split_version_op(&other);
            let ord = crate::builtins::dependency::compare_versions(&s, rest);
            Ok(arena.make_bool(crate::builtins::dependency::satisfies(ord, op)))
        }
        _ => Err(Error::UnknownMethod(name.to_string(), "str".to_string(), loc.clone())),
    }
}

fn first_string(arena: &Arena, args: &[(Option<String>, Handle)], loc: &Location) -> Result<String, Error> {
    let h = args
        .first()
        .map(|(_, h)| *h)
        .ok_or_else(|| Error::MissingArgument("arg0".to_string(), loc.clone()))?;
    expect_string(arena, h, loc)
}

#[allow(dead_code)]
fn is_str(arena: &Arena, h: Handle) -> bool {
    matches!(arena.get(h), Obj::Str(_))
}
