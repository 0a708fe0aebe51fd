//! `array` method table (`spec.md` §4.7).

use crate::arena::{Arena, Handle};
use crate::args::expect_int;
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
        "length" => Ok(arena.make_int(arena.array_len(recv) as i64)),
        "contains" => {
            let needle = args
                .first()
                .map(|(_, h)| *h)
                .ok_or_else(|| Error::MissingArgument("item".to_string(), loc.clone()))?;
            Ok(arena.make_bool(arena.array_index_of(recv, needle).is_some()))
        }
        "get" => {
            let idx = args
                .first()
                .map(|(_, h)| expect_int(arena, *h, loc))
                .transpose()?
                .ok_or_else(|| Error::MissingArgument("index".to_string(), loc.clone()))?;
            let items = arena.array_items(recv);
            let len = items.len() as i64;
            let real = if idx < 0 { idx + len } else { idx };
            if real >= 0 && real < len {
                Ok(items[real as usize])
            } else if let Some((_, fallback)) = args.get(1) {
                Ok(*fallback)
            } else {
                Err(Error::IndexOutOfBounds(idx, items.len(), loc.clone()))
            }
        }
        _ => Err(Error::UnknownMethod(name.to_string(), "array".to_string(), loc.clone())),
    }
}
