//! Error types for the DSL evaluation pipeline

use std::fmt;

use crate::lexer::Location;

/// A single evaluation failure, located where possible.
///
/// Every evaluator in `muon-core` returns `Result<T, Error>`; the interpreter
/// reports a failure once at the deepest frame that can identify a useful
/// location, and outer frames simply propagate it with `?`.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    // lex
    #[error("unterminated string literal")]
    UnterminatedString(Location),
    #[error("invalid escape sequence `{0}`")]
    InvalidEscape(String, Location),
    #[error("invalid number literal `{0}`")]
    InvalidNumber(String, Location),

    // parse
    #[error("unexpected token: {0}")]
    UnexpectedToken(String, Location),
    #[error("expected {0}, found {1}")]
    ExpectedToken(String, String, Location),
    #[error("first statement must be a call to `project()`")]
    MissingProjectCall(Location),
    #[error("keyword arguments must follow positional arguments")]
    KeywordBeforePositional(Location),

    // type
    #[error("expected {expected}, got {got}")]
    TypeMismatch {
        expected: String,
        got: String,
        loc: Location,
    },
    #[error("missing required argument `{0}`")]
    MissingArgument(String, Location),
    #[error("too many positional arguments")]
    TooManyArguments(Location),
    #[error("unknown keyword argument `{0}`")]
    UnknownKeyword(String, Location),

    // name
    #[error("unknown identifier `{0}`")]
    UnknownName(String, Location),
    #[error("unknown method `{0}` for type `{1}`")]
    UnknownMethod(String, String, Location),
    #[error("unknown function `{0}`")]
    UnknownFunction(String, Location),

    // value
    #[error("cannot parse `{0}` as a version")]
    InvalidVersion(String, Location),
    #[error("integer out of range")]
    IntegerOutOfRange(Location),
    #[error("division by zero")]
    DivideByZero(Location),
    #[error("index {0} out of bounds (length {1})")]
    IndexOutOfBounds(i64, usize, Location),
    #[error("key `{0}` not found")]
    KeyNotFound(String, Location),
    #[error("target `{0}` is already declared in this project")]
    DuplicateTarget(String, Location),

    // io
    #[error("cannot read `{0}`: {1}")]
    ReadFile(String, String),
    #[error("cannot write `{0}`: {1}")]
    WriteFile(String, String),
    #[error("permission denied: `{0}`")]
    PermissionDenied(String),

    // external tool
    #[error("`{0}` exited with status {1}: {2}")]
    ExternalToolFailed(String, i32, String),
    #[error("cannot find required tool `{0}`")]
    MissingTool(String),

    // user-visible
    #[error("{0}")]
    UserError(String, Location),
    #[error("assertion failed: {0}")]
    AssertionFailed(String, Location),

    // internal
    #[error("internal invariant violation: {0}")]
    Internal(String),
}

impl Error {
    /// Location associated with this error, if any.
    pub fn location(&self) -> Option<&Location> {
        use Error::*;
        match self {
            UnterminatedString(l)
            | InvalidEscape(_, l)
            | InvalidNumber(_, l)
            | UnexpectedToken(_, l)
            | ExpectedToken(_, _, l)
            | MissingProjectCall(l)
            | KeywordBeforePositional(l)
            | MissingArgument(_, l)
            | TooManyArguments(l)
            | UnknownKeyword(_, l)
            | UnknownName(_, l)
            | UnknownMethod(_, _, l)
            | UnknownFunction(_, l)
            | InvalidVersion(_, l)
            | IntegerOutOfRange(l)
            | DivideByZero(l)
            | IndexOutOfBounds(_, _, l)
            | KeyNotFound(_, l)
            | DuplicateTarget(_, l)
            | UserError(_, l)
            | AssertionFailed(_, l) => Some(l),
            TypeMismatch { loc, .. } => Some(loc),
            _ => None,
        }
    }

    /// Render this error the way `error_message` in the reference
    /// implementation does: `file:line:col: error: msg`, the offending
    /// source line, and a caret under the column.
    pub fn render(&self, source: &str) -> String {
        let mut out = String::new();
        match self.location() {
            Some(loc) => {
                out.push_str(&format!(
                    "{}:{}:{}: error: {}\n",
                    loc.file, loc.line, loc.column, self
                ));
                if let Some(line) = source.lines().nth(loc.line.saturating_sub(1) as usize) {
                    out.push_str(&format!("{:>4} | {}\n", loc.line, line));
                    out.push_str("     | ");
                    for _ in 1..loc.column {
                        out.push(' ');
                    }
                    out.push('^');
                    out.push('\n');
                }
            }
            None => out.push_str(&format!("error: {}\n", self)),
        }
        out
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}
