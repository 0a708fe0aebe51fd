//! `check`: parse a file and report errors without evaluating it
//! (`spec.md` §6.1).

use muon_core::lexer::{LangMode, Lexer};
use muon_core::parser::Parser;

use crate::system::{self, Error};
use crate::infoln;

pub fn run(file: &str, print_ast: bool) -> Result<(), Error> {
    let source = system::read_file(file)?;
    let (tokens, lex_errors) = Lexer::new(&source, file, LangMode::Meson).tokenize();
    if let Some(first) = lex_errors.into_iter().next() {
        eprint!("{}", first.render(&source));
        return Err(Error::Evaluation(first));
    }

    let program = Parser::new(tokens)
        .parse_program()
        .map_err(|e| {
            eprint!("{}", e.render(&source));
            e
        })?;

    if print_ast {
        println!("{program:#?}");
    }
    infoln!("OK", "{file}");
    Ok(())
}
