//! Top-level global builtins (`spec.md` §4.7, §4.7.1): `project()`, file and
//! directory helpers, install registration, external tool discovery, and
//! the user-visible diagnostics (`message`, `warning`, `error`, `assert`).

use std::collections::HashMap;

use crate::arena::{Arena, Compiler, CompilerKind, CompilerVendor, Handle, Obj, RunResult};
use crate::args::{coerce_to_array, expect_bool, expect_string};
use crate::error::Error;
use crate::lexer::Location;
use crate::process::run_cmd;

use super::targets::make_external_program;
use super::BuiltinCtx;

fn kw(args: &[(Option<String>, Handle)], name: &str) -> Option<Handle> {
    args.iter()
        .find(|(n, _)| n.as_deref() == Some(name))
        .map(|(_, h)| *h)
}

fn compiler_kind_for(lang: &str) -> CompilerKind {
    match lang {
        "c" => CompilerKind::C,
        "cpp" => CompilerKind::Cpp,
        "rust" => CompilerKind::Rust,
        other => CompilerKind::Unknown(other.to_string()),
    }
}

fn default_exe_for(kind: &CompilerKind) -> &'static str {
    match kind {
        CompilerKind::C => "cc",
        CompilerKind::Cpp => "c++",
        CompilerKind::Rust => "rustc",
        CompilerKind::Unknown(_) => "cc",
    }
}

/// Probe the environment for a compiler matching `lang`. Never fails: if
/// the toolchain can't be found, the compiler object is still created
/// with `found = false` style information recorded in `version`, mirroring
/// how `project()` defers hard failures to the point of actual use.
/// Guess the compiler vendor from its `--version` banner, the way `meson`
/// itself sniffs `cc -v`/`cl`: MSVC never prints to `--version` the same
/// way, so a `cc`/`c++`/`rustc` exe that produced no recognisable banner
/// is assumed to be a MSVC-style front-end only if the exe name says so.
fn vendor_for(exe: &str, version_banner: &str) -> CompilerVendor {
    let banner = version_banner.to_ascii_lowercase();
    if banner.contains("clang") {
        CompilerVendor::Clang
    } else if banner.contains("free software foundation") || banner.contains("gcc") {
        CompilerVendor::Gcc
    } else if exe.eq_ignore_ascii_case("cl") || exe.eq_ignore_ascii_case("cl.exe") {
        CompilerVendor::Msvc
    } else {
        CompilerVendor::Unknown
    }
}

fn probe_compiler(lang: &str) -> Compiler {
    let kind = compiler_kind_for(lang);
    let exe = default_exe_for(&kind).to_string();
    let version = match which::which(&exe) {
        Ok(path) => {
            let argv = vec![path.to_string_lossy().into_owned(), "--version".to_string()];
            run_cmd(&argv, &HashMap::new(), None)
                .ok()
                .and_then(|out| out.stdout.lines().next().map(str::to_string))
                .unwrap_or_else(|| "unknown".to_string())
        }
        Err(_) => "not found".to_string(),
    };
    let vendor = vendor_for(&exe, &version);
    Compiler {
        kind,
        exe,
        version,
        linker_id: "ld".to_string(),
        vendor,
    }
}

/// `project(name, languages..., version: ..., license: ..., default_options: ...)`.
pub fn project(
    ctx: &mut BuiltinCtx,
    arena: &mut Arena,
    args: Vec<(Option<String>, Handle)>,
    loc: &Location,
) -> Result<Handle, Error> {
    let mut positional = args.iter().filter(|(n, _)| n.is_none());
    let name_h = positional
        .next()
        .map(|(_, h)| *h)
        .ok_or_else(|| Error::MissingArgument("name".to_string(), loc.clone()))?;
    let name = expect_string(arena, name_h, loc)?;
    let languages: Vec<String> = positional
        .map(|(_, h)| expect_string(arena, *h, loc))
        .collect::<Result<_, _>>()?;

    let version = match kw(&args, "version") {
        Some(h) => expect_string(arena, h, loc)?,
        None => "undefined".to_string(),
    };
    let licenses = match kw(&args, "license") {
        Some(h) => coerce_to_array(arena, h)
            .into_iter()
            .map(|h| expect_string(arena, h, loc))
            .collect::<Result<_, _>>()?,
        None => Vec::new(),
    };
    let default_options = match kw(&args, "default_options") {
        Some(h) => coerce_to_array(arena, h)
            .into_iter()
            .map(|h| expect_string(arena, h, loc))
            .collect::<Result<_, _>>()?,
        None => Vec::new(),
    };

    if languages.is_empty() {
        return Err(Error::MissingArgument("language".to_string(), loc.clone()));
    }

    let proj = ctx.current_project_mut();
    proj.name = name;
    proj.version = version;
    proj.licenses = licenses;
    proj.default_options = default_options;
    for lang in &languages {
        let compiler = probe_compiler(lang);
        let handle = arena.make(Obj::Compiler(compiler));
        ctx.current_project_mut().compilers.insert(lang.clone(), handle);
    }
    Ok(Arena::null())
}

/// `files(a, b, ...)`: resolve each string argument against the current
/// source directory into a `file` object (`spec.md` §4.7.2).
pub fn files(
    ctx: &mut BuiltinCtx,
    arena: &mut Arena,
    args: Vec<(Option<String>, Handle)>,
    _loc: &Location,
) -> Result<Handle, Error> {
    let mut out = Vec::new();
    for (n, h) in &args {
        if n.is_none() {
            out.extend(ctx.coerce_sources(arena, *h));
        }
    }
    Ok(arena.make_array(out))
}

/// `include_directories(a, b, ...)`: record each path string verbatim; the
/// Ninja emitter resolves these relative to the project's source dir.
pub fn include_directories(
    arena: &mut Arena,
    args: Vec<(Option<String>, Handle)>,
    loc: &Location,
) -> Result<Handle, Error> {
    let mut out = Vec::new();
    for (n, h) in &args {
        if n.is_none() {
            for item in coerce_to_array(arena, *h) {
                out.push(arena.make_string(&expect_string(arena, item, loc)?));
            }
        }
    }
    Ok(arena.make_array(out))
}

/// `install_data(...)` / `install_headers(...)`: both just return the
/// coerced file list; installation bookkeeping happens at emit time via
/// each target's `install` flag, so this core only validates and passes
/// sources through (`spec.md` §4.7.2).
pub fn install_files(
    ctx: &mut BuiltinCtx,
    arena: &mut Arena,
    args: Vec<(Option<String>, Handle)>,
    _loc: &Location,
) -> Result<Handle, Error> {
    let mut out = Vec::new();
    for (n, h) in &args {
        if n.is_none() {
            out.extend(ctx.coerce_sources(arena, *h));
        }
    }
    Ok(arena.make_array(out))
}

/// `configure_file(input: ..., output: ..., configuration: ...)`: render
/// `@VAR@` substitutions from the configuration dict into the input file's
/// contents and write the result under the current build directory.
pub fn configure_file(
    ctx: &mut BuiltinCtx,
    arena: &mut Arena,
    args: Vec<(Option<String>, Handle)>,
    loc: &Location,
) -> Result<Handle, Error> {
    let input_h = kw(&args, "input").ok_or_else(|| Error::MissingArgument("input".to_string(), loc.clone()))?;
    let output_h = kw(&args, "output").ok_or_else(|| Error::MissingArgument("output".to_string(), loc.clone()))?;
    let input_name = expect_string(arena, input_h, loc)?;
    let output_name = expect_string(arena, output_h, loc)?;

    let input_path = crate::path::join(&ctx.absolute_source_dir(), &input_name);
    let mut contents = std::fs::read_to_string(&input_path)
        .map_err(|e| Error::ReadFile(input_path.clone(), e.to_string()))?;

    if let Some(cfg) = kw(&args, "configuration") {
        if let Obj::Dict(_) = arena.get(cfg).clone() {
            for key in arena.dict_keys(cfg) {
                let v = arena.dict_get(cfg, &key).expect("key just listed");
                let rendered = arena.display(v);
                contents = contents.replace(&format!("@{key}@"), &rendered);
            }
        }
    }

    let output_path = crate::path::join(&ctx.absolute_build_dir(), &output_name);
    let _ = std::fs::create_dir_all(crate::path::dirname(&output_path));
    std::fs::write(&output_path, contents)
        .map_err(|e| Error::WriteFile(output_path.clone(), e.to_string()))?;

    Ok(arena.make_file(&output_path))
}

/// `find_program(name, required: true)`: resolve via `PATH` using `which`.
pub fn find_program(
    arena: &mut Arena,
    args: Vec<(Option<String>, Handle)>,
    loc: &Location,
) -> Result<Handle, Error> {
    let name_h = args
        .iter()
        .find(|(n, _)| n.is_none())
        .map(|(_, h)| *h)
        .ok_or_else(|| Error::MissingArgument("program_name".to_string(), loc.clone()))?;
    let name = expect_string(arena, name_h, loc)?;
    let required = match kw(&args, "required") {
        Some(h) => expect_bool(arena, h, loc)?,
        None => true,
    };

    let found_path = which::which(&name).ok().map(|p| p.to_string_lossy().into_owned());
    if found_path.is_none() && required {
        return Err(Error::MissingTool(name));
    }
    let program = make_external_program(found_path.is_some(), found_path, &name);
    Ok(arena.make(Obj::ExternalProgram(program)))
}

/// `run_command(cmd, args..., check: true)`: synchronous child-process
/// execution (`spec.md` §5 "External process execution").
pub fn run_command(
    arena: &mut Arena,
    args: Vec<(Option<String>, Handle)>,
    loc: &Location,
) -> Result<Handle, Error> {
    let mut positional = args.iter().filter(|(n, _)| n.is_none());
    let prog_h = positional
        .next()
        .map(|(_, h)| *h)
        .ok_or_else(|| Error::MissingArgument("command".to_string(), loc.clone()))?;
    let prog = expect_string(arena, prog_h, loc)?;
    let argv: Vec<String> = positional
        .map(|(_, h)| expect_string(arena, *h, loc))
        .collect::<Result<_, _>>()?;
    let check = match kw(&args, "check") {
        Some(h) => expect_bool(arena, h, loc)?,
        None => false,
    };

    let mut full_argv = vec![prog.clone()];
    full_argv.extend(argv);
    let output = run_cmd(&full_argv, &HashMap::new(), None)?;
    if check && output.status != 0 {
        return Err(Error::ExternalToolFailed(prog, output.status, output.stderr));
    }
    Ok(arena.make(Obj::RunResult(RunResult {
        returncode: output.status,
        stdout: output.stdout,
        stderr: output.stderr,
    })))
}

/// `add_project_arguments(args..., language: ...)` /
/// `add_project_link_arguments(...)`: appends to the current project's
/// recorded default options so the Ninja emitter can fold them into
/// every compile/link edge.
pub fn add_project_arguments(
    ctx: &mut BuiltinCtx,
    arena: &mut Arena,
    args: Vec<(Option<String>, Handle)>,
    loc: &Location,
) -> Result<Handle, Error> {
    let mut flags = Vec::new();
    for (n, h) in &args {
        if n.is_none() {
            for item in coerce_to_array(arena, *h) {
                flags.push(expect_string(arena, item, loc)?);
            }
        }
    }
    ctx.current_project_mut().default_options.extend(flags);
    Ok(Arena::null())
}

pub fn message(arena: &mut Arena, args: Vec<(Option<String>, Handle)>, loc: &Location) -> Handle {
    let parts: Vec<String> = args.iter().map(|(_, h)| arena.display(*h)).collect();
    println!("{}{}", crate::diagnostics::prefix(loc), parts.join(" "));
    Arena::null()
}

pub fn warning(arena: &mut Arena, args: Vec<(Option<String>, Handle)>, loc: &Location) -> Handle {
    let parts: Vec<String> = args.iter().map(|(_, h)| arena.display(*h)).collect();
    eprintln!("{}WARNING: {}", crate::diagnostics::prefix(loc), parts.join(" "));
    Arena::null()
}

pub fn user_error(arena: &mut Arena, args: Vec<(Option<String>, Handle)>, loc: &Location) -> Error {
    let msg = args
        .iter()
        .map(|(_, h)| arena.display(*h))
        .collect::<Vec<_>>()
        .join(" ");
    Error::UserError(msg, loc.clone())
}

/// `assert(condition, message)`.
pub fn assert_fn(
    arena: &mut Arena,
    args: Vec<(Option<String>, Handle)>,
    loc: &Location,
) -> Result<Handle, Error> {
    let cond_h = args
        .first()
        .map(|(_, h)| *h)
        .ok_or_else(|| Error::MissingArgument("condition".to_string(), loc.clone()))?;
    let cond = expect_bool(arena, cond_h, loc)?;
    if cond {
        return Ok(Arena::null());
    }
    let msg = match args.get(1) {
        Some((_, h)) => arena.display(*h),
        None => "assertion failed".to_string(),
    };
    Err(Error::AssertionFailed(msg, loc.clone()))
}

/// `get_option(name)`: reads CLI-supplied `-D` overrides recorded on the
/// workspace; unknown options default to the empty string rather than
/// erroring, since this core does not parse `meson_options.txt` schemas.
pub fn get_option(
    ctx: &mut BuiltinCtx,
    arena: &mut Arena,
    args: Vec<(Option<String>, Handle)>,
    loc: &Location,
) -> Result<Handle, Error> {
    let name_h = args
        .first()
        .map(|(_, h)| *h)
        .ok_or_else(|| Error::MissingArgument("name".to_string(), loc.clone()))?;
    let name = expect_string(arena, name_h, loc)?;
    let value = ctx.cli_options.get(&name).cloned().unwrap_or_default();
    Ok(arena.make_string(&value))
}
