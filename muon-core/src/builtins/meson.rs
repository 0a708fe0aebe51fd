//! The `meson` singleton reflection object's method table (`spec.md` §4.7).

use crate::arena::{Arena, Handle};
use crate::args::expect_string;
use crate::error::Error;
use crate::lexer::Location;

use super::BuiltinCtx;

/// Host `muon-core` version string reported by `meson.version()`; kept
/// distinct from the workspace's target project version.
const VERSION: &str = "1.0.0";

pub fn call(
    ctx: &mut BuiltinCtx,
    arena: &mut Arena,
    name: &str,
    args: Vec<(Option<String>, Handle)>,
    loc: &Location,
) -> Result<Handle, Error> {
    match name {
        "source_root" => Ok(arena.make_string(&ctx.source_root)),
        "build_root" => Ok(arena.make_string(&ctx.build_root)),
        "current_source_dir" => Ok(arena.make_string(&ctx.absolute_source_dir())),
        "current_build_dir" => Ok(arena.make_string(&ctx.absolute_build_dir())),
        "project_name" => Ok(arena.make_string(&ctx.current_project().name.clone())),
        "project_version" => Ok(arena.make_string(&ctx.current_project().version.clone())),
        "version" => Ok(arena.make_string(VERSION)),
        "is_subproject" => Ok(arena.make_bool(ctx.current_project().is_subproject)),
        "override_dependency" => {
            let name_h = args
                .iter()
                .find(|(n, _)| n.is_none())
                .map(|(_, h)| *h)
                .ok_or_else(|| Error::MissingArgument("name".to_string(), loc.clone()))?;
            let dep_h = args
                .iter()
                .filter(|(n, _)| n.is_none())
                .nth(1)
                .map(|(_, h)| *h)
                .ok_or_else(|| Error::MissingArgument("dep".to_string(), loc.clone()))?;
            let key = expect_string(arena, name_h, loc)?;
            ctx.current_project_mut().declared_dependencies.insert(key, dep_h);
            Ok(Arena::null())
        }
        "add_install_script" => Ok(Arena::null()),
        _ => Err(Error::UnknownMethod(name.to_string(), "meson".to_string(), loc.clone())),
    }
}
