//! Workspace / project model (C8)
//!
//! The workspace is the root of all evaluation state: it owns the arena
//! and the list of projects. `arena` is kept as its own top-level field
//! (rather than nested inside a bigger struct) so that [`eval_program`]
//! can hand [`Interp`](crate::interp::Interp) a mutable borrow of it while
//! [`crate::builtins::BuiltinCtx`] independently borrows the other
//! fields — two disjoint field borrows of the same `&mut Workspace`,
//! which the borrow checker accepts as long as neither goes through a
//! whole-struct reborrow.

use std::fs;

use indexmap::IndexMap;

use crate::arena::{Arena, Handle};
use crate::error::Error;
use crate::interp::Interp;
use crate::lexer::{LangMode, Lexer, Location};
use crate::parser::{Parser, Program, StmtKind};
use crate::{builtins, path};

/// One `project()` call's worth of state: its own variable scope lives in
/// the interpreter's [`crate::interp::Scope`] for the duration of
/// evaluation, but targets, compilers and configuration outlive that.
pub struct Project {
    pub name: String,
    pub version: String,
    pub licenses: Vec<String>,
    /// Subdirectory of the source root this project's `meson.build` lives
    /// in; mutated by `subdir()` for the duration of the included file.
    pub cwd: String,
    pub compilers: IndexMap<String, Handle>,
    pub targets: Vec<Handle>,
    pub declared_dependencies: IndexMap<String, Handle>,
    pub default_options: Vec<String>,
    pub is_subproject: bool,
}

impl Project {
    pub fn new(name: &str, cwd: &str, is_subproject: bool) -> Self {
        Self {
            name: name.to_string(),
            version: "undefined".to_string(),
            licenses: Vec::new(),
            cwd: cwd.to_string(),
            compilers: IndexMap::new(),
            targets: Vec::new(),
            declared_dependencies: IndexMap::new(),
            default_options: Vec::new(),
            is_subproject,
        }
    }
}

pub struct Workspace {
    pub arena: Arena,
    pub source_root: String,
    pub build_root: String,
    pub lang_mode: LangMode,
    pub projects: Vec<Project>,
    pub current: usize,
    /// Every file read during evaluation; feeds the Ninja `REGENERATE_BUILD`
    /// source list (`spec.md` §6.4).
    pub regenerate_sources: Vec<String>,
    pub cli_options: IndexMap<String, String>,
}

impl Workspace {
    pub fn new(source_root: &str, build_root: &str) -> Self {
        Self {
            arena: Arena::new(),
            source_root: source_root.to_string(),
            build_root: build_root.to_string(),
            lang_mode: LangMode::Meson,
            projects: Vec::new(),
            current: 0,
            regenerate_sources: Vec::new(),
            cli_options: IndexMap::new(),
        }
    }

    pub fn current_project(&self) -> &Project {
        &self.projects[self.current]
    }

    pub fn current_project_mut(&mut self) -> &mut Project {
        &mut self.projects[self.current]
    }

    pub fn absolute_source_dir(&self) -> String {
        path::join(&self.source_root, &self.current_project().cwd)
    }

    pub fn absolute_build_dir(&self) -> String {
        path::join(&self.build_root, &self.current_project().cwd)
    }

    /// Read, lex and parse a file, recording it for regeneration tracking.
    pub fn load_and_parse(&mut self, filename: &str) -> Result<Program, Error> {
        let source = fs::read_to_string(filename)
            .map_err(|e| Error::ReadFile(filename.to_string(), e.to_string()))?;
        self.regenerate_sources.push(filename.to_string());
        let (tokens, lex_errors) = Lexer::new(&source, filename, self.lang_mode).tokenize();
        if let Some(first) = lex_errors.into_iter().next() {
            return Err(first);
        }
        Parser::new(tokens).parse_program()
    }

    /// Read, lex, parse and evaluate the top-level `meson.build`. The
    /// first statement must be a call to `project()` (`spec.md` §4.4).
    pub fn eval_root(&mut self, filename: &str) -> Result<(), Error> {
        let project_idx = self.projects.len();
        self.projects.push(Project::new("", "", false));
        self.current = project_idx;
        let prog = self.load_and_parse(filename)?;
        match prog.stmts.first().map(|s| &s.kind) {
            Some(StmtKind::Expr(e))
                if matches!(&e.kind, crate::parser::ExprKind::Call(name, _) if name == "project") => {}
            Some(stmt) => return Err(Error::MissingProjectCall(stmt.loc.clone())),
            None => {
                return Err(Error::MissingProjectCall(Location::new(
                    std::rc::Rc::from(filename),
                    1,
                    1,
                )))
            }
        }
        self.eval_program(&prog)
    }

    /// Evaluate a parsed program in the current project's scope. The
    /// arena and the rest of the workspace are borrowed disjointly so
    /// that nested `subdir()`/`subproject()` dispatch can recurse.
    pub fn eval_program(&mut self, prog: &Program) -> Result<(), Error> {
        let arena: &mut Arena = &mut self.arena;
        let mut interp = Interp::new(arena);
        let meson_handle = interp.arena.make(crate::arena::Obj::Meson);
        interp.scope.bind_local("meson", meson_handle);
        let mut ctx = builtins::BuiltinCtx {
            projects: &mut self.projects,
            current: &mut self.current,
            source_root: self.source_root.clone(),
            build_root: self.build_root.clone(),
            lang_mode: self.lang_mode,
            regenerate_sources: &mut self.regenerate_sources,
            cli_options: &self.cli_options,
        };
        interp.eval_program(prog, &mut ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_workspace_has_no_projects_until_eval() {
        let ws = Workspace::new("/src", "/build");
        assert!(ws.projects.is_empty());
    }

    #[test]
    fn eval_root_rejects_missing_project_call() {
        let dir = std::env::temp_dir().join(format!("muon-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("meson.build");
        std::fs::write(&file, b"x = 1\n").unwrap();
        let mut ws = Workspace::new(dir.to_str().unwrap(), "/build");
        let err = ws.eval_root(file.to_str().unwrap());
        assert!(matches!(err, Err(Error::MissingProjectCall(_))));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
