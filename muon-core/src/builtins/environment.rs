//! `environment()` and the `environment` method table (`spec.md` §4.7).

use crate::arena::{Arena, Environment, Handle, Obj};
use crate::args::expect_string;
use crate::error::Error;
use crate::lexer::Location;

pub fn make_environment(
    arena: &mut Arena,
    args: Vec<(Option<String>, Handle)>,
    loc: &Location,
) -> Result<Handle, Error> {
    let mut env = Environment::default();
    if let Some((_, h)) = args.into_iter().find(|(n, _)| n.is_none()) {
        if let Obj::Dict(_) = arena.get(h).clone() {
            for key in arena.dict_keys(h) {
                let v = arena.dict_get(h, &key).expect("key just listed");
                let value = expect_string(arena, v, loc)?;
                env.vars.insert(key, vec![value]);
            }
        }
    }
    Ok(arena.make(Obj::Environment(env)))
}

pub fn call_method(
    arena: &mut Arena,
    recv: Handle,
    name: &str,
    args: Vec<(Option<String>, Handle)>,
    loc: &Location,
) -> Result<Handle, Error> {
    let (key, value) = two_strings(arena, &args, loc)?;
    let env = match arena.get_mut(recv) {
        Obj::Environment(e) => e,
        _ => unreachable!("dispatched only for Environment objects"),
    };
    match name {
        "set" => {
            env.vars.insert(key, vec![value]);
        }
        "append" => env.vars.entry(key).or_default().push(value),
        "prepend" => env.vars.entry(key).or_default().insert(0, value),
        _ => return Err(Error::UnknownMethod(name.to_string(), "environment".to_string(), loc.clone())),
    }
    Ok(Arena::null())
}

fn two_strings(arena: &Arena, args: &[(Option<String>, Handle)], loc: &Location) -> Result<(String, String), Error> {
    let key_h = args
        .first()
        .map(|(_, h)| *h)
        .ok_or_else(|| Error::MissingArgument("key".to_string(), loc.clone()))?;
    let val_h = args
        .get(1)
        .map(|(_, h)| *h)
        .ok_or_else(|| Error::MissingArgument("value".to_string(), loc.clone()))?;
    Ok((expect_string(arena, key_h, loc)?, expect_string(arena, val_h, loc)?))
}
