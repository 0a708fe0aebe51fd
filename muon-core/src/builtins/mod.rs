//! Builtin/method tables (C7)
//!
//! [`BuiltinCtx`] is the [`Dispatcher`](crate::interp::Dispatcher) the
//! workspace hands to the interpreter: global function calls are matched
//! by name here and delegated to a per-concern submodule; method calls
//! are matched by the receiver's arena kind and delegated the same way,
//! mirroring the `impl_tbl_*` tables in
//! `examples/original_source/src/functions/*.c`.

mod array;
mod dict;
mod environment;
mod global;
mod meson;
mod string;
mod targets;

pub mod dependency;

use indexmap::IndexMap;

use crate::arena::{Arena, Handle, Obj};
use crate::error::Error;
use crate::interp::{Dispatcher, Interp};
use crate::lexer::{LangMode, Location};
use crate::parser::Program;
use crate::path;
use crate::workspace::Project;

pub struct BuiltinCtx<'a> {
    pub projects: &'a mut Vec<Project>,
    pub current: &'a mut usize,
    pub source_root: String,
    pub build_root: String,
    pub lang_mode: LangMode,
    pub regenerate_sources: &'a mut Vec<String>,
    pub cli_options: &'a IndexMap<String, String>,
}

impl BuiltinCtx<'_> {
    pub fn current_project(&self) -> &Project {
        &self.projects[*self.current]
    }

    pub fn current_project_mut(&mut self) -> &mut Project {
        let idx = *self.current;
        &mut self.projects[idx]
    }

    pub fn absolute_source_dir(&self) -> String {
        path::join(&self.source_root, &self.current_project().cwd)
    }

    pub fn absolute_build_dir(&self) -> String {
        path::join(&self.build_root, &self.current_project().cwd)
    }

    /// Resolve a bare filename argument against the current source
    /// directory into a `file` object (`spec.md` §4.7.2).
    pub fn make_source_file(&self, arena: &mut Arena, name: &str) -> Handle {
        let abs = path::join(&self.absolute_source_dir(), name);
        arena.make_file(&abs)
    }

    /// Coerce a raw sources argument (string, file, nested array) into a
    /// flat array of `file` handles.
    pub fn coerce_sources(&self, arena: &mut Arena, raw: Handle) -> Vec<Handle> {
        let items = crate::args::coerce_to_array(arena, raw);
        items
            .into_iter()
            .map(|h| match arena.get(h).clone() {
                Obj::Str(_) => {
                    let name = arena.display(h);
                    self.make_source_file(arena, &name)
                }
                _ => h,
            })
            .collect()
    }

    fn load_and_parse(&mut self, filename: &str) -> Result<Program, Error> {
        let source = std::fs::read_to_string(filename)
            .map_err(|e| Error::ReadFile(filename.to_string(), e.to_string()))?;
        self.regenerate_sources.push(filename.to_string());
        let (tokens, lex_errors) =
            crate::lexer::Lexer::new(&source, filename, self.lang_mode).tokenize();
        if let Some(first) = lex_errors.into_iter().next() {
            return Err(first);
        }
        crate::parser::Parser::new(tokens).parse_program()
    }

    /// `subdir(name)`: evaluate `<cwd>/<name>/meson.build` in the current
    /// project's scope (`spec.md` §4.7.4).
    fn do_subdir(&mut self, arena: &mut Arena, name: &str) -> Result<(), Error> {
        let prior_cwd = self.current_project().cwd.clone();
        let new_cwd = path::join(&prior_cwd, name);
        let file = path::join(&path::join(&self.source_root, &new_cwd), "meson.build");
        self.current_project_mut().cwd = new_cwd;
        let outcome = self.load_and_parse(&file).and_then(|prog| {
            let mut interp = Interp::new(arena);
            interp.eval_program(&prog, self)
        });
        self.current_project_mut().cwd = prior_cwd;
        outcome
    }

    /// `subproject(name)`: evaluate `subprojects/<name>/meson.build` as a
    /// fresh project and return a `subproject` handle.
    fn do_subproject(&mut self, arena: &mut Arena, name: &str) -> Result<Handle, Error> {
        let cwd = path::join("subprojects", name);
        let file = path::join(&path::join(&self.source_root, &cwd), "meson.build");
        let idx = self.projects.len();
        self.projects.push(Project::new(name, &cwd, true));
        let prior = *self.current;
        *self.current = idx;
        let outcome = self.load_and_parse(&file).and_then(|prog| {
            let mut interp = Interp::new(arena);
            interp.eval_program(&prog, self)
        });
        *self.current = prior;
        outcome?;
        Ok(arena.make(Obj::Subproject(idx)))
    }
}

impl Dispatcher for BuiltinCtx<'_> {
    fn call_function(
        &mut self,
        arena: &mut Arena,
        name: &str,
        args: Vec<(Option<String>, Handle)>,
        loc: &Location,
    ) -> Result<Handle, Error> {
        match name {
            "project" => global::project(self, arena, args, loc),
            "executable" => targets::declare_target(self, arena, args, loc, targets::Kind::Executable),
            "static_library" => {
                targets::declare_target(self, arena, args, loc, targets::Kind::Static)
            }
            "shared_library" => {
                targets::declare_target(self, arena, args, loc, targets::Kind::Shared)
            }
            "library" => targets::declare_target(self, arena, args, loc, targets::Kind::Default),
            "both_libraries" => targets::declare_both_libraries(self, arena, args, loc),
            "custom_target" => targets::custom_target(self, arena, args, loc),
            "generator" => targets::generator(self, arena, args, loc),
            "files" => global::files(self, arena, args, loc),
            "include_directories" => global::include_directories(arena, args, loc),
            "declare_dependency" => dependency::declare_dependency(self, arena, args, loc),
            "dependency" => dependency::dependency(self, arena, args, loc),
            "subdir" => {
                let n = first_string_arg(arena, &args, loc)?;
                self.do_subdir(arena, &n)?;
                Ok(Arena::null())
            }
            "subproject" => {
                let n = first_string_arg(arena, &args, loc)?;
                self.do_subproject(arena, &n)
            }
            "install_data" | "install_headers" => global::install_files(self, arena, args, loc),
            "configure_file" => global::configure_file(self, arena, args, loc),
            "find_program" => global::find_program(arena, args, loc),
            "run_command" => global::run_command(arena, args, loc),
            "add_project_arguments" | "add_project_link_arguments" => {
                global::add_project_arguments(self, arena, args, loc)
            }
            "environment" => environment::make_environment(arena, args, loc),
            "message" => Ok(global::message(arena, args, loc)),
            "warning" => Ok(global::warning(arena, args, loc)),
            "error" => Err(global::user_error(arena, args, loc)),
            "assert" => global::assert_fn(arena, args, loc),
            "get_option" => global::get_option(self, arena, args, loc),
            _ => Err(Error::UnknownFunction(name.to_string(), loc.clone())),
        }
    }

    fn call_method(
        &mut self,
        arena: &mut Arena,
        receiver: Handle,
        name: &str,
        args: Vec<(Option<String>, Handle)>,
        loc: &Location,
    ) -> Result<Handle, Error> {
        match arena.get(receiver).clone() {
            Obj::Str(_) => string::call(arena, receiver, name, args, loc),
            Obj::Array(_) => array::call(arena, receiver, name, args, loc),
            Obj::Dict(_) => dict::call(arena, receiver, name, args, loc),
            Obj::Dependency(_) => dependency::call_method(arena, receiver, name, args, loc),
            Obj::BuildTarget(_) => targets::build_target_method(arena, receiver, name, args, loc),
            Obj::BothLibs(_) => targets::both_libs_method(arena, receiver, name, loc),
            Obj::CustomTarget(_) => targets::custom_target_method(arena, receiver, name, args, loc),
            Obj::ExternalProgram(_) => targets::external_program_method(arena, receiver, name, loc),
            Obj::Environment(_) => environment::call_method(arena, receiver, name, args, loc),
            Obj::FeatureOption(_) => targets::feature_option_method(arena, receiver, name, loc),
            Obj::Compiler(_) => targets::compiler_method(arena, receiver, name, args, loc),
            Obj::Generator(_) => targets::generator_method(self, arena, receiver, name, args, loc),
            Obj::GeneratedList(_) => {
                targets::generated_list_method(self, arena, receiver, name, args, loc)
            }
            Obj::Meson => meson::call(self, arena, name, args, loc),
            _ => Err(Error::UnknownMethod(
                name.to_string(),
                arena.kind_name(receiver).to_string(),
                loc.clone(),
            )),
        }
    }
}

fn first_string_arg(arena: &Arena, args: &[(Option<String>, Handle)], loc: &Location) -> Result<String, Error> {
    let h = args
        .iter()
        .find(|(n, _)| n.is_none())
        .map(|(_, h)| *h)
        .ok_or_else(|| Error::MissingArgument("name".to_string(), loc.clone()))?;
    crate::args::expect_string(arena, h, loc)
}
