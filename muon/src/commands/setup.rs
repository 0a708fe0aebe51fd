//! `setup`: configure a build directory (`spec.md` §6.1).

use std::collections::BTreeMap;

use muon_core::workspace::Workspace;

use crate::manifest::SetupManifest;
use crate::system::{self, Error};
use crate::{hintln, infoln};

fn parse_define(raw: &str) -> Result<(String, String), Error> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| Error::BadDefine(raw.to_string()))
}

pub fn run(build_dir: &str, defines: &[String], machine_file: Option<&str>) -> Result<(), Error> {
    if let Some(mf) = machine_file {
        hintln!("Note", "machine file `{mf}` overrides are not probed by this build");
    }

    let cli_options: BTreeMap<String, String> = defines
        .iter()
        .map(|d| parse_define(d))
        .collect::<Result<_, _>>()?;

    let source_root = std::env::current_dir()
        .map_err(|e| Error::InvalidPath(".".to_string(), e))?
        .to_string_lossy()
        .into_owned();

    system::ensure_directory(build_dir)?;

    let mut ws = Workspace::new(&source_root, build_dir);
    for (k, v) in &cli_options {
        ws.cli_options.insert(k.clone(), v.clone());
    }

    let entry = format!("{source_root}/meson.build");
    ws.eval_root(&entry)?;

    let ninja_text = muon_core::ninja::render(&ws);
    let ninja_path = format!("{build_dir}/build.ninja");
    system::write_file(&ninja_path, ninja_text)?;

    let manifest = SetupManifest {
        source_root,
        build_root: build_dir.to_string(),
        cli_options,
        sources: ws.regenerate_sources.clone(),
    };
    manifest.save()?;

    infoln!("Configured", "{build_dir}");
    Ok(())
}
