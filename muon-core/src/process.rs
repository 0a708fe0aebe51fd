//! External process execution (A4)
//!
//! A single synchronous interface for shelling out, used by compiler
//! probing, `find_program`, and the `run_command()` builtin. Grounded in
//! `examples/Pistonight-megaton/megaton-hammer/src/system/process.rs`'s
//! `ChildBuilder`, simplified to a one-shot call/wait since the DSL never
//! needs to stream a child's output incrementally (`spec.md` §5).

use std::collections::HashMap;
use std::process::Command;

use crate::error::Error;

/// The outcome of a completed child process.
#[derive(Debug, Clone)]
pub struct CmdOutput {
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Run `argv[0]` with the remaining elements as arguments, optionally
/// overlaying environment variables and changing the working directory,
/// and wait for completion. This is the only place in `muon-core` that
/// spawns a process.
pub fn run_cmd(
    argv: &[String],
    env: &HashMap<String, String>,
    chdir: Option<&str>,
) -> Result<CmdOutput, Error> {
    let (prog, rest) = argv
        .split_first()
        .ok_or_else(|| Error::Internal("run_cmd called with empty argv".to_string()))?;

    let mut cmd = Command::new(prog);
    cmd.args(rest);
    for (k, v) in env {
        cmd.env(k, v);
    }
    if let Some(dir) = chdir {
        cmd.current_dir(dir);
    }

    let output = cmd
        .output()
        .map_err(|e| Error::ExternalToolFailed(prog.clone(), -1, e.to_string()))?;

    Ok(CmdOutput {
        status: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_cmd_rejects_empty_argv() {
        let err = run_cmd(&[], &HashMap::new(), None);
        assert!(matches!(err, Err(Error::Internal(_))));
    }

    #[test]
    fn run_cmd_captures_stdout() {
        let argv = vec!["echo".to_string(), "hello".to_string()];
        let out = run_cmd(&argv, &HashMap::new(), None).unwrap();
        assert_eq!(out.status, 0);
        assert_eq!(out.stdout.trim(), "hello");
    }
}
