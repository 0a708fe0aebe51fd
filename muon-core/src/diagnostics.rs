//! Ambient logging toggle for `message()`/`warning()` (`SPEC_FULL.md` §6.5).
//!
//! `muon-core` has no terminal-coloring dependency of its own — that lives
//! in the `muon` binary's `system::print` — so this is just a flag the CLI
//! sets from its `-l` option before evaluating anything.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::lexer::Location;

static SHOW_LOCATIONS: AtomicBool = AtomicBool::new(false);

pub fn set_show_locations(enabled: bool) {
    SHOW_LOCATIONS.store(enabled, Ordering::Relaxed);
}

pub fn show_locations() -> bool {
    SHOW_LOCATIONS.load(Ordering::Relaxed)
}

pub fn prefix(loc: &Location) -> String {
    if show_locations() {
        format!("{}:{}:{}: ", loc.file, loc.line, loc.column)
    } else {
        String::new()
    }
}
