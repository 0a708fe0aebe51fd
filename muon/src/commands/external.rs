//! Subcommands whose real work needs a collaborator this project doesn't
//! implement: a Ninja-compatible executor, a test harness, an installer,
//! or network/archive access for subprojects (`spec.md` §1 Non-goals,
//! `SPEC_FULL.md` §6). Each still validates its own arguments locally
//! before reporting that it can't go further.

use crate::manifest::SetupManifest;
use crate::system::Error;

pub fn samu(passthrough: &[String]) -> Result<(), Error> {
    let _ = passthrough;
    Err(Error::NotImplemented("samu".to_string()))
}

pub fn test(build_dir: &str, suites: &[String]) -> Result<(), Error> {
    SetupManifest::load(build_dir)?;
    let _ = suites;
    Err(Error::NotImplemented("test".to_string()))
}

pub fn install(build_dir: &str, dry_run: bool) -> Result<(), Error> {
    SetupManifest::load(build_dir)?;
    let _ = dry_run;
    Err(Error::NotImplemented("install".to_string()))
}

pub fn check_wrap(wrap_file: &str) -> Result<(), Error> {
    let _ = crate::system::read_file(wrap_file)?;
    Err(Error::NotImplemented("subprojects check-wrap".to_string()))
}

pub fn download(names: &[String]) -> Result<(), Error> {
    let _ = names;
    Err(Error::NotImplemented("subprojects download".to_string()))
}
