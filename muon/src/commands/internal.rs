//! `internal`: developer-facing entry points into the interpreter that
//! skip the full project/workspace machinery (`spec.md` §6.1, "internal
//! eval/repl/exe"). These run the extended DSL lexer mode, which accepts
//! a bare script body without a leading `project()` call.

use std::collections::HashMap;
use std::io::{self, BufRead, Read, Write};

use muon_core::arena::Arena;
use muon_core::lexer::{LangMode, Lexer};
use muon_core::parser::Parser;
use muon_core::workspace::{Project, Workspace};
use muon_core::{builtins, interp::Interp};

use crate::system::{self, Error};

fn source_for(file: Option<&str>, embedded: Option<&str>) -> Result<(String, String), Error> {
    if let Some(src) = embedded {
        return Ok((src.to_string(), "<embedded>".to_string()));
    }
    if let Some(path) = file {
        return Ok((system::read_file(path)?, path.to_string()));
    }
    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .map_err(|e| Error::ReadFile("<stdin>".to_string(), e))?;
    Ok((buf, "<stdin>".to_string()))
}

pub fn eval(file: Option<&str>, embedded: Option<&str>) -> Result<(), Error> {
    let (source, name) = source_for(file, embedded)?;

    let cwd = std::env::current_dir()
        .map_err(|e| Error::InvalidPath(".".to_string(), e))?
        .to_string_lossy()
        .into_owned();
    let mut ws = Workspace::new(&cwd, &cwd);
    ws.lang_mode = LangMode::Extended;
    ws.projects.push(Project::new("eval", "", false));

    let (tokens, lex_errors) = Lexer::new(&source, &name, LangMode::Extended).tokenize();
    if let Some(first) = lex_errors.into_iter().next() {
        eprint!("{}", first.render(&source));
        return Err(first.into());
    }
    let program = Parser::new(tokens).parse_program().map_err(|e| {
        eprint!("{}", e.render(&source));
        e
    })?;

    ws.eval_program(&program)?;
    Ok(())
}

/// A line-at-a-time read-eval-print loop. Each line runs in its own
/// top-level scope: the workspace doesn't expose a persistent scope
/// across calls, so assignments from one line aren't visible to the
/// next. Good enough for trying out a single expression or builtin call.
pub fn repl() -> Result<(), Error> {
    let cwd = std::env::current_dir()
        .map_err(|e| Error::InvalidPath(".".to_string(), e))?
        .to_string_lossy()
        .into_owned();

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("> ");
        stdout.flush().ok();

        let mut line = String::new();
        let n = stdin
            .lock()
            .read_line(&mut line)
            .map_err(|e| Error::ReadFile("<stdin>".to_string(), e))?;
        if n == 0 {
            break;
        }
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }

        let mut ws = Workspace::new(&cwd, &cwd);
        ws.lang_mode = LangMode::Extended;
        ws.projects.push(Project::new("repl", "", false));

        let (tokens, lex_errors) = Lexer::new(line, "<repl>", LangMode::Extended).tokenize();
        if let Some(first) = lex_errors.into_iter().next() {
            eprint!("{}", first.render(line));
            continue;
        }

        let mut parser = Parser::new(tokens);
        match parser.parse_expr() {
            Ok(expr) => {
                let arena: &mut Arena = &mut ws.arena;
                let mut interp = Interp::new(arena);
                let mut ctx = builtins::BuiltinCtx {
                    projects: &mut ws.projects,
                    current: &mut ws.current,
                    source_root: ws.source_root.clone(),
                    build_root: ws.build_root.clone(),
                    lang_mode: ws.lang_mode,
                    regenerate_sources: &mut ws.regenerate_sources,
                    cli_options: &ws.cli_options,
                };
                match interp.eval_expr(&expr, &mut ctx) {
                    Ok(handle) => println!("{}", interp.arena.display(handle)),
                    Err(e) => eprint!("{}", e.render(line)),
                }
            }
            Err(_) => {
                let (tokens, _) = Lexer::new(line, "<repl>", LangMode::Extended).tokenize();
                match Parser::new(tokens).parse_program() {
                    Ok(program) => {
                        if let Err(e) = ws.eval_program(&program) {
                            eprint!("{}", e.render(line));
                        }
                    }
                    Err(e) => eprint!("{}", e.render(line)),
                }
            }
        }
    }
    Ok(())
}

pub fn exe(cmd: &[String], outfile: Option<&str>) -> Result<(), Error> {
    if cmd.is_empty() {
        return Err(Error::NotFound("<empty command>".to_string()));
    }
    let output = muon_core::process::run_cmd(cmd, &HashMap::new(), None)?;
    if let Some(path) = outfile {
        system::write_file(path, &output.stdout)?;
    } else {
        print!("{}", output.stdout);
    }
    eprint!("{}", output.stderr);
    if output.status != 0 {
        std::process::exit(output.status);
    }
    Ok(())
}
