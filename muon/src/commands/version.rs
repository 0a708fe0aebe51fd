//! `version`: report the binary version and which optional surfaces are
//! compiled in (`spec.md` §6.1).

use crate::infoln;

pub fn run() {
    infoln!("muon", "{}", env!("CARGO_PKG_VERSION"));
    println!("features:");
    println!("  setup, check, internal eval/repl/exe: yes");
    println!("  samu, test, install, subprojects: no (external collaborator out of scope)");
}
