//! `auto`: replay a previous `setup` from its persisted manifest
//! (`spec.md` §6.3/§6.4). This is what the Ninja `REGENERATE_BUILD` rule
//! shells out to when a source file listed in `regenerate_sources`
//! changes, and what a user runs by hand to force a clean reconfigure.

use crate::manifest::SetupManifest;
use crate::system::Error;
use crate::{hintln, infoln};

pub fn run(cfg: Option<&str>, regen_only: bool, force: bool) -> Result<(), Error> {
    let build_dir = cfg.unwrap_or("build");
    let manifest = SetupManifest::load(build_dir)?;

    if force {
        hintln!("Note", "forcing a full reconfigure of `{build_dir}`");
    }

    let defines: Vec<String> = manifest
        .cli_options
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect();

    crate::commands::setup::run(&manifest.build_root, &defines, None)?;

    if regen_only {
        infoln!("Regenerated", "{build_dir}");
    }
    Ok(())
}
