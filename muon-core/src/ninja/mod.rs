//! Ninja emitter (C9)
//!
//! Renders a populated [`crate::Workspace`] into a `build.ninja` string,
//! following the structure of `ninja_write_rules` and `join_args` in
//! `examples/original_source/src/backend/ninja/rules.c` and
//! `examples/original_source/src/args.c`.

use std::fmt::Write as _;

use crate::arena::{Compiler, CompilerKind, Obj, TargetKind};
use crate::path;
use crate::workspace::Workspace;

/// Escape a single argument for Ninja's `$`-metasyntax: `$` before space,
/// colon, and `$` itself.
pub fn ninja_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c == ' ' || c == ':' || c == '$' {
            out.push('$');
        }
        out.push(c);
    }
    out
}

/// Escape a single argument for embedding in a shell command line:
/// backslash before `"'$ \<>&#`.
pub fn shell_escape(s: &str) -> String {
    const NEED_ESCAPING: &[char] = &['"', '\'', '$', ' ', '\\', '<', '>', '&', '#'];
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if NEED_ESCAPING.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn join_escaped(items: &[String], escape: impl Fn(&str) -> String) -> String {
    items.iter().map(|s| escape(s)).collect::<Vec<_>>().join(" ")
}

fn compiler_rule_name(kind: &CompilerKind) -> String {
    match kind {
        CompilerKind::C => "c".to_string(),
        CompilerKind::Cpp => "cpp".to_string(),
        CompilerKind::Rust => "rust".to_string(),
        CompilerKind::Unknown(s) => s.clone(),
    }
}

fn lang_for_extension(path: &str) -> Option<&'static str> {
    let ext = path.rsplit('.').next()?;
    match ext {
        "c" => Some("c"),
        "cc" | "cpp" | "cxx" => Some("cpp"),
        "rs" => Some("rust"),
        _ => None,
    }
}

/// Write a `<LANG>_COMPILER` rule, parameterised by `$DEPFILE` and
/// `deps = gcc|msvc` when the compiler's vendor supports dependency
/// tracking (`examples/original_source/src/backend/ninja/rules.c`'s
/// `write_compiler_rule_iter`).
fn write_compiler_rule(out: &mut String, rule: &str, lang: &str, compiler: &Compiler) {
    match compiler.vendor.deps_flavour() {
        Some("msvc") => {
            let _ = writeln!(
                out,
                "rule {rule}_COMPILER\n\
                 \u{20}command = {} $ARGS /showIncludes -c -Fo$out $in\n\
                 \u{20}deps = msvc\n\
                 \u{20}description = compiling {lang} $out\n",
                shell_escape(&compiler.exe),
            );
        }
        Some(flavour) => {
            let _ = writeln!(
                out,
                "rule {rule}_COMPILER\n\
                 \u{20}command = {} $ARGS -MD -MQ $out -MF $DEPFILE -c -o $out $in\n\
                 \u{20}deps = {flavour}\n\
                 \u{20}depfile = $DEPFILE_UNQUOTED\n\
                 \u{20}description = compiling {lang} $out\n",
                shell_escape(&compiler.exe),
            );
        }
        None => {
            let _ = writeln!(
                out,
                "rule {rule}_COMPILER\n\
                 \u{20}command = {} $ARGS -c -o $out $in\n\
                 \u{20}description = compiling {lang} $out\n",
                shell_escape(&compiler.exe),
            );
        }
    }
}

fn output_extension(kind: &TargetKind) -> &'static str {
    match kind {
        TargetKind::Executable => "",
        TargetKind::StaticLibrary => ".o.a",
        TargetKind::SharedLibrary => ".o.so",
    }
}

/// Render the full `build.ninja` text for the workspace's main project.
/// Subprojects contribute their own targets but share the main project's
/// compiler rule set, matching the reference's "TODO: setup compiler
/// rules for subprojects" note — this core emits one rule set derived
/// from the root project only.
pub fn render(ws: &Workspace) -> String {
    let mut out = String::new();
    let main = &ws.projects[0];

    let _ = writeln!(
        out,
        "# This is the build file for project \"{}\"\n\
         # It is autogenerated by the muon build system.\n\
         ninja_required_version = 1.7.1\n",
        main.name
    );

    for (lang, handle) in &main.compilers {
        let compiler = match ws.arena.get(*handle) {
            Obj::Compiler(c) => c,
            _ => continue,
        };
        let rule = compiler_rule_name(&compiler.kind);
        write_compiler_rule(&mut out, &rule, lang, compiler);
        let _ = writeln!(
            out,
            "rule {rule}_LINKER\n\
             \u{20}command = {} $ARGS -o $out $in $LINK_ARGS\n\
             \u{20}description = linking $out\n",
            shell_escape(&compiler.exe),
        );
    }

    let _ = writeln!(
        out,
        "rule STATIC_LINKER\n\
         \u{20}command = rm -f $out && ar $LINK_ARGS $out $in\n\
         \u{20}description = linking static $out\n\
         \n\
         rule CUSTOM_COMMAND\n\
         \u{20}command = $COMMAND\n\
         \u{20}description = $DESCRIPTION\n\
         \u{20}restat = 1\n"
    );

    let regen_sources: Vec<String> = ws.regenerate_sources.iter().map(|s| ninja_escape(s)).collect();
    let _ = writeln!(
        out,
        "rule REGENERATE_BUILD\n\
         \u{20}command = muon auto -r -c build.ninja\n\
         \u{20}description = Regenerating build files.\n\
         \u{20}generator = 1\n\
         \n\
         build build.ninja: REGENERATE_BUILD {}\n\
         \u{20}pool = console\n\
         \n\
         # targets\n",
        regen_sources.join(" "),
    );

    for project in &ws.projects {
        write_project_targets(&mut out, ws, project);
    }

    out
}

fn write_project_targets(out: &mut String, ws: &Workspace, project: &crate::workspace::Project) {
    for handle in &project.targets {
        match ws.arena.get(*handle) {
            Obj::BuildTarget(t) => write_build_target(out, ws, t),
            Obj::CustomTarget(t) => write_custom_target(out, ws, t),
            _ => {}
        }
    }
}

fn write_build_target(out: &mut String, ws: &Workspace, t: &crate::arena::BuildTarget) {
    let mut objects = Vec::new();
    for src in &t.sources {
        let src_path = ws.arena.display(*src);
        let lang = lang_for_extension(&src_path).unwrap_or("c");
        let rule = lang.to_string();
        let obj = format!("{}.p/{}.o", t.name, path::basename(&src_path));
        let _ = writeln!(
            out,
            "build {}: {rule}_COMPILER {}",
            ninja_escape(&obj),
            ninja_escape(&src_path),
        );
        objects.push(obj);
    }

    let lang = t
        .sources
        .first()
        .and_then(|h| lang_for_extension(&ws.arena.display(*h)))
        .unwrap_or("c");
    let rule = match t.kind {
        TargetKind::StaticLibrary => "STATIC_LINKER".to_string(),
        _ => format!("{lang}_LINKER"),
    };

    let link_inputs: Vec<String> = objects
        .iter()
        .cloned()
        .chain(t.link_with.iter().map(|h| target_output(ws, *h)))
        .collect();

    let _ = writeln!(
        out,
        "build {}{}: {rule} {}\n",
        ninja_escape(&t.output_name),
        output_extension(&t.kind),
        join_escaped(&link_inputs, ninja_escape),
    );
}

fn target_output(ws: &Workspace, h: crate::arena::Handle) -> String {
    match ws.arena.get(h) {
        Obj::BuildTarget(t) => t.output_name.clone(),
        Obj::CustomTarget(t) => t.outputs.first().cloned().unwrap_or_default(),
        _ => String::new(),
    }
}

fn write_custom_target(out: &mut String, ws: &Workspace, t: &crate::arena::CustomTarget) {
    let inputs: Vec<String> = t.inputs.iter().map(|h| ws.arena.display(*h)).collect();
    let outputs = join_escaped(&t.outputs, ninja_escape);
    let command = join_escaped(&t.command, shell_escape);
    let _ = writeln!(
        out,
        "build {outputs}: CUSTOM_COMMAND {}\n\
         \u{20}COMMAND = {command}\n\
         \u{20}DESCRIPTION = Generating {} with a custom command\n",
        join_escaped(&inputs, ninja_escape),
        t.name,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ninja_escape_prefixes_space_colon_dollar() {
        assert_eq!(ninja_escape("a b"), "a$ b");
        assert_eq!(ninja_escape("a:b"), "a$:b");
        assert_eq!(ninja_escape("a$b"), "a$$b");
    }

    #[test]
    fn shell_escape_prefixes_special_characters() {
        assert_eq!(shell_escape("a b"), "a\\ b");
        assert_eq!(shell_escape("it's"), "it\\'s");
    }

    #[test]
    fn render_includes_required_version_header() {
        let mut ws = Workspace::new("/src", "/build");
        ws.projects.push(crate::workspace::Project::new("demo", "", false));
        let text = render(&ws);
        assert!(text.contains("ninja_required_version = 1.7.1"));
        assert!(text.contains("rule STATIC_LINKER"));
        assert!(text.contains("rule REGENERATE_BUILD"));
    }
}
