//! `dict` method table (`spec.md` §4.7).

use crate::arena::{Arena, Handle};
use crate::args::expect_string;
use crate::error::Error;
use crate::lexer::Location;

pub fn call(
    arena: &mut Arena,
    recv: Handle,
    name: &str,
    args: Vec<(Option<String>, Handle)>,
    loc: &Location,
) -> Result<Handle, Error> {
    match name {
        "has_key" => {
            let key = first_string(arena, &args, loc)?;
            Ok(arena.make_bool(arena.dict_has(recv, &key)))
        }
        "get" => {
            let key = first_string(arena, &args, loc)?;
            match arena.dict_get(recv, &key) {
                Some(h) => Ok(h),
                None => match args.get(1) {
                    Some((_, fallback)) => Ok(*fallback),
                    None => Err(Error::KeyNotFound(key, loc.clone())),
                },
            }
        }
        "keys" => {
            let keys: Vec<Handle> = arena
                .dict_keys(recv)
                .into_iter()
                .map(|k| arena.make_string(&k))
                .collect();
            Ok(arena.make_array(keys))
        }
        _ => Err(Error::UnknownMethod(name.to_string(), "dict".to_string(), loc.clone())),
    }
}

fn first_string(arena: &Arena, args: &[(Option<String>, Handle)], loc: &Location) -> Result<String, Error> {
    let h = args
        .first()
        .map(|(_, h)| *h)
        .ok_or_else(|| Error::MissingArgument("key".to_string(), loc.clone()))?;
    expect_string(arena, h, loc)
}
