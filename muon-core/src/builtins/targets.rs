//! Target-declaration builtins and their method tables (`spec.md` §4.7.2,
//! §4.7.3), grounded on `examples/original_source/src/functions/both_libs.c`
//! and `examples/original_source/src/functions/generator.c`.

use indexmap::IndexMap;

use crate::arena::{
    Arena, BothLibs, BuildTarget, CustomTarget, ExternalProgram, FeatureOption, GeneratedList,
    Generator, Handle, Obj, TargetKind,
};
use crate::args::{expect_bool, expect_string};
use crate::error::Error;
use crate::lexer::Location;
use crate::path;

use super::BuiltinCtx;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Executable,
    Static,
    Shared,
    /// `library()`: picks static or shared by project default (this core
    /// does not probe a cross-file for `default_library`, so it always
    /// resolves to static — `spec.md` Non-goals excludes cross-compilation
    /// machine-file handling beyond a minimal schema).
    Default,
}

fn kw(args: &[(Option<String>, Handle)], name: &str) -> Option<Handle> {
    args.iter()
        .find(|(n, _)| n.as_deref() == Some(name))
        .map(|(_, h)| *h)
}

pub fn declare_target(
    ctx: &mut BuiltinCtx,
    arena: &mut Arena,
    args: Vec<(Option<String>, Handle)>,
    loc: &Location,
    kind: Kind,
) -> Result<Handle, Error> {
    let mut positional = args.iter().filter(|(n, _)| n.is_none());
    let name_h = positional
        .next()
        .map(|(_, h)| *h)
        .ok_or_else(|| Error::MissingArgument("name".to_string(), loc.clone()))?;
    let name = expect_string(arena, name_h, loc)?;

    if ctx
        .current_project()
        .targets
        .iter()
        .any(|h| target_name(arena, *h) == Some(name.clone()))
    {
        return Err(Error::DuplicateTarget(name, loc.clone()));
    }

    let mut sources = Vec::new();
    for (n, h) in &args {
        if n.is_none() && *h != name_h {
            sources.extend(ctx.coerce_sources(arena, *h));
        }
    }
    if let Some(h) = kw(&args, "sources") {
        sources.extend(ctx.coerce_sources(arena, h));
    }

    let link_with = kw(&args, "link_with")
        .map(|h| crate::args::coerce_to_array(arena, h))
        .unwrap_or_default();
    let dependencies = kw(&args, "dependencies")
        .map(|h| crate::args::coerce_to_array(arena, h))
        .unwrap_or_default();
    let include_dirs = kw(&args, "include_directories")
        .map(|h| {
            crate::args::coerce_to_array(arena, h)
                .into_iter()
                .map(|i| arena.display(i))
                .collect()
        })
        .unwrap_or_default();
    let install = match kw(&args, "install") {
        Some(h) => expect_bool(arena, h, loc)?,
        None => false,
    };

    let target_kind = match kind {
        Kind::Executable => TargetKind::Executable,
        Kind::Static | Kind::Default => TargetKind::StaticLibrary,
        Kind::Shared => TargetKind::SharedLibrary,
    };
    let output_name = output_name_for(&name, target_kind);

    let target = BuildTarget {
        name: name.clone(),
        kind: target_kind,
        sources,
        output_name,
        link_with,
        dependencies,
        include_dirs,
        install,
        has_generated_include: false,
    };
    let handle = arena.make(Obj::BuildTarget(target));
    ctx.current_project_mut().targets.push(handle);
    Ok(handle)
}

pub fn declare_both_libraries(
    ctx: &mut BuiltinCtx,
    arena: &mut Arena,
    args: Vec<(Option<String>, Handle)>,
    loc: &Location,
) -> Result<Handle, Error> {
    let shared = declare_target(ctx, arena, args.clone(), loc, Kind::Shared)?;
    let static_ = declare_target(ctx, arena, args, loc, Kind::Static)?;
    Ok(arena.make(Obj::BothLibs(BothLibs { shared, static_ })))
}

fn output_name_for(name: &str, kind: TargetKind) -> String {
    match kind {
        TargetKind::Executable => name.to_string(),
        TargetKind::StaticLibrary => format!("lib{name}.a"),
        TargetKind::SharedLibrary => format!("lib{name}.so"),
    }
}

fn target_name(arena: &Arena, h: Handle) -> Option<String> {
    match arena.get(h) {
        Obj::BuildTarget(t) => Some(t.name.clone()),
        Obj::CustomTarget(t) => Some(t.name.clone()),
        _ => None,
    }
}

pub fn custom_target(
    ctx: &mut BuiltinCtx,
    arena: &mut Arena,
    args: Vec<(Option<String>, Handle)>,
    loc: &Location,
) -> Result<Handle, Error> {
    let name_h = args
        .iter()
        .find(|(n, _)| n.is_none())
        .map(|(_, h)| *h)
        .ok_or_else(|| Error::MissingArgument("name".to_string(), loc.clone()))?;
    let name = expect_string(arena, name_h, loc)?;

    let inputs = kw(&args, "input")
        .map(|h| ctx.coerce_sources(arena, h))
        .unwrap_or_default();
    let outputs: Vec<String> = kw(&args, "output")
        .map(|h| {
            crate::args::coerce_to_array(arena, h)
                .into_iter()
                .map(|o| arena.display(o))
                .collect()
        })
        .unwrap_or_default();
    let command: Vec<String> = kw(&args, "command")
        .map(|h| {
            crate::args::coerce_to_array(arena, h)
                .into_iter()
                .map(|c| arena.display(c))
                .collect()
        })
        .unwrap_or_default();
    let install = match kw(&args, "install") {
        Some(h) => expect_bool(arena, h, loc)?,
        None => false,
    };

    let target = CustomTarget {
        name,
        inputs,
        outputs,
        command,
        install,
    };
    let handle = arena.make(Obj::CustomTarget(target));
    ctx.current_project_mut().targets.push(handle);
    Ok(handle)
}

pub fn generator(
    _ctx: &mut BuiltinCtx,
    arena: &mut Arena,
    args: Vec<(Option<String>, Handle)>,
    loc: &Location,
) -> Result<Handle, Error> {
    let exe = args
        .iter()
        .find(|(n, _)| n.is_none())
        .map(|(_, h)| *h)
        .ok_or_else(|| Error::MissingArgument("exe".to_string(), loc.clone()))?;
    let arguments = kw(&args, "arguments")
        .map(|h| {
            crate::args::coerce_to_array(arena, h)
                .into_iter()
                .map(|a| arena.display(a))
                .collect()
        })
        .unwrap_or_default();
    let output = kw(&args, "output")
        .map(|h| {
            crate::args::coerce_to_array(arena, h)
                .into_iter()
                .map(|o| arena.display(o))
                .collect()
        })
        .unwrap_or_default();
    Ok(arena.make(Obj::Generator(Generator {
        exe,
        arguments,
        output,
    })))
}

/// `generator.process(files...)`: construct a `generated_list` holding the
/// coerced input files (`spec.md` §4.7.3). Output names aren't resolved
/// here — that only happens once the list is attached to a target, via
/// `process_for_target`, because the output directory depends on which
/// target's private build directory the outputs land in.
pub fn generator_method(
    ctx: &mut BuiltinCtx,
    arena: &mut Arena,
    recv: Handle,
    name: &str,
    args: Vec<(Option<String>, Handle)>,
    loc: &Location,
) -> Result<Handle, Error> {
    if name != "process" {
        return Err(Error::UnknownMethod(name.to_string(), "generator".to_string(), loc.clone()));
    }
    let mut inputs = Vec::new();
    for (n, h) in &args {
        if n.is_none() {
            inputs.extend(ctx.coerce_sources(arena, *h));
        }
    }
    Ok(arena.make(Obj::GeneratedList(GeneratedList {
        generator: recv,
        inputs,
    })))
}

fn is_header_extension(path: &str) -> bool {
    matches!(path.rsplit('.').next(), Some("h" | "hpp" | "hh" | "hxx"))
}

fn resolve_exe_path(arena: &Arena, exe: Handle) -> String {
    match arena.get(exe) {
        Obj::ExternalProgram(p) => p.full_path.clone().unwrap_or_else(|| p.name.clone()),
        _ => arena.display(exe),
    }
}

/// `generated_list.process_for_target(tgt)` (`spec.md` §4.7.3): for each
/// input, build a `custom_target` under the target's private build
/// directory, substituting `@BASENAME@`/`@PLAINNAME@`/`@OUTDIR@` in both
/// the generator's output template and its arguments. Marks the target's
/// "has generated include" flag if an output looks like a header, and
/// returns the flat array of output file handles.
pub fn generated_list_method(
    ctx: &mut BuiltinCtx,
    arena: &mut Arena,
    recv: Handle,
    name: &str,
    args: Vec<(Option<String>, Handle)>,
    loc: &Location,
) -> Result<Handle, Error> {
    if name != "process_for_target" {
        return Err(Error::UnknownMethod(
            name.to_string(),
            "generated_list".to_string(),
            loc.clone(),
        ));
    }

    let gl = match arena.get(recv) {
        Obj::GeneratedList(g) => g.clone(),
        _ => unreachable!(),
    };
    let gen = match arena.get(gl.generator) {
        Obj::Generator(g) => g.clone(),
        _ => unreachable!(),
    };

    let tgt_h = args
        .iter()
        .find(|(n, _)| n.is_none())
        .map(|(_, h)| *h)
        .ok_or_else(|| Error::MissingArgument("target".to_string(), loc.clone()))?;
    let tgt = match arena.get(tgt_h) {
        Obj::BuildTarget(t) => t.clone(),
        _ => return Err(Error::TypeMismatch {
            expected: "build_target".to_string(),
            got: arena.kind_name(tgt_h).to_string(),
            loc: loc.clone(),
        }),
    };

    let outdir = path::join(&ctx.absolute_build_dir(), &format!("{}.p", tgt.name));
    let exe_path = resolve_exe_path(arena, gen.exe);

    let mut output_handles = Vec::new();
    let mut gained_header = false;

    for input in &gl.inputs {
        let input_path = arena.display(*input);
        let plain = path::basename(&input_path);
        let base = plain.rsplit_once('.').map(|(b, _)| b).unwrap_or(&plain).to_string();
        let subst = |template: &str| -> String {
            template
                .replace("@BASENAME@", &base)
                .replace("@PLAINNAME@", &plain)
                .replace("@OUTDIR@", &outdir)
        };

        let outputs: Vec<String> = gen.output.iter().map(|t| subst(t)).collect();
        if outputs.iter().any(|o| is_header_extension(o)) {
            gained_header = true;
        }

        let mut command = vec![exe_path.clone()];
        command.extend(gen.arguments.iter().map(|a| subst(a)));

        let custom = CustomTarget {
            name: "<generated>".to_string(),
            inputs: vec![*input],
            outputs: outputs.clone(),
            command,
            install: false,
        };
        let custom_h = arena.make(Obj::CustomTarget(custom));
        ctx.current_project_mut().targets.push(custom_h);

        output_handles.extend(outputs.into_iter().map(|o| arena.make_string(&o)));
    }

    if gained_header {
        if let Obj::BuildTarget(t) = arena.get_mut(tgt_h) {
            t.has_generated_include = true;
        }
    }

    Ok(arena.make_array(output_handles))
}

pub fn build_target_method(
    arena: &mut Arena,
    recv: Handle,
    name: &str,
    _args: Vec<(Option<String>, Handle)>,
    loc: &Location,
) -> Result<Handle, Error> {
    let t = match arena.get(recv) {
        Obj::BuildTarget(t) => t.clone(),
        _ => unreachable!(),
    };
    match name {
        "name" => Ok(arena.make_string(&t.name)),
        "full_path" => Ok(arena.make_string(&t.output_name)),
        "private_dir_include" => Ok(arena.make_string(&format!("{}.p", t.name))),
        "found" => Ok(arena.make_bool(true)),
        _ => Err(Error::UnknownMethod(name.to_string(), "build_tgt".to_string(), loc.clone())),
    }
}

pub fn custom_target_method(
    arena: &mut Arena,
    recv: Handle,
    name: &str,
    _args: Vec<(Option<String>, Handle)>,
    loc: &Location,
) -> Result<Handle, Error> {
    let t = match arena.get(recv) {
        Obj::CustomTarget(t) => t.clone(),
        _ => unreachable!(),
    };
    match name {
        "full_path" => Ok(arena.make_string(t.outputs.first().map(String::as_str).unwrap_or(""))),
        "to_list" => {
            let handles: Vec<Handle> = t.outputs.iter().map(|o| arena.make_string(o)).collect();
            Ok(arena.make_array(handles))
        }
        _ => Err(Error::UnknownMethod(
            name.to_string(),
            "custom_tgt".to_string(),
            loc.clone(),
        )),
    }
}

pub fn both_libs_method(arena: &mut Arena, recv: Handle, name: &str, loc: &Location) -> Result<Handle, Error> {
    let both = match arena.get(recv) {
        Obj::BothLibs(b) => b.clone(),
        _ => unreachable!(),
    };
    match name {
        "get_static_lib" => Ok(both.static_),
        "get_shared_lib" => Ok(both.shared),
        _ => Err(Error::UnknownMethod(name.to_string(), "both_libs".to_string(), loc.clone())),
    }
}

pub fn external_program_method(arena: &mut Arena, recv: Handle, name: &str, loc: &Location) -> Result<Handle, Error> {
    let p = match arena.get(recv) {
        Obj::ExternalProgram(p) => p.clone(),
        _ => unreachable!(),
    };
    match name {
        "found" => Ok(arena.make_bool(p.found)),
        "path" | "full_path" => Ok(arena.make_string(p.full_path.as_deref().unwrap_or(""))),
        _ => Err(Error::UnknownMethod(
            name.to_string(),
            "external_program".to_string(),
            loc.clone(),
        )),
    }
}

pub fn feature_option_method(arena: &mut Arena, recv: Handle, name: &str, loc: &Location) -> Result<Handle, Error> {
    let f = match arena.get(recv) {
        Obj::FeatureOption(f) => f.clone(),
        _ => unreachable!(),
    };
    let b = match name {
        "enabled" => f == FeatureOption::Enabled,
        "disabled" => f == FeatureOption::Disabled,
        "auto" => f == FeatureOption::Auto,
        "allowed" => f != FeatureOption::Disabled,
        _ => {
            return Err(Error::UnknownMethod(
                name.to_string(),
                "feature".to_string(),
                loc.clone(),
            ))
        }
    };
    Ok(arena.make_bool(b))
}

/// Compiler probes (`compiles`, `links`, `has_header`, `has_function`,
/// `find_library`, `get_supported_arguments`) shell out to the detected
/// toolchain — out of scope for this core (`spec.md` §1). `get_id` is
/// answered directly from the `compiler` object already recorded by
/// `project()`.
pub fn compiler_method(
    arena: &mut Arena,
    recv: Handle,
    name: &str,
    _args: Vec<(Option<String>, Handle)>,
    loc: &Location,
) -> Result<Handle, Error> {
    match name {
        "get_id" => {
            let c = match arena.get(recv) {
                Obj::Compiler(c) => c.clone(),
                _ => unreachable!(),
            };
            Ok(arena.make_string(&format!("{:?}", c.kind).to_lowercase()))
        }
        "compiles" | "links" | "has_header" | "has_function" | "find_library" | "get_supported_arguments" => {
            Err(Error::MissingTool(format!("compiler probe `{name}`")))
        }
        _ => Err(Error::UnknownMethod(name.to_string(), "compiler".to_string(), loc.clone())),
    }
}

#[allow(dead_code)]
fn empty_variables() -> IndexMap<String, String> {
    IndexMap::new()
}

pub fn make_external_program(found: bool, full_path: Option<String>, name: &str) -> ExternalProgram {
    ExternalProgram {
        name: name.to_string(),
        full_path,
        found,
    }
}
