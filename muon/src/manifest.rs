//! The setup manifest: enough state to replay `setup` for regeneration
//! (`spec.md` §6.3 "Persisted state"), serialized as JSON into the build
//! directory's private directory.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::system::{self, Error};

pub const PRIVATE_DIR: &str = "muon-private";
pub const MANIFEST_NAME: &str = "setup.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SetupManifest {
    pub source_root: String,
    pub build_root: String,
    pub cli_options: BTreeMap<String, String>,
    pub sources: Vec<String>,
}

impl SetupManifest {
    pub fn path_in(build_root: &str) -> String {
        format!("{build_root}/{PRIVATE_DIR}/{MANIFEST_NAME}")
    }

    pub fn load(build_root: &str) -> Result<Self, Error> {
        let path = Self::path_in(build_root);
        if !Path::new(&path).exists() {
            return Err(Error::NotConfigured(build_root.to_string()));
        }
        let text = system::read_file(&path)?;
        serde_json::from_str(&text).map_err(Error::ParseManifest)
    }

    pub fn save(&self) -> Result<(), Error> {
        system::ensure_directory(format!("{}/{PRIVATE_DIR}", self.build_root))?;
        let path = Self::path_in(&self.build_root);
        let text = serde_json::to_string_pretty(self).expect("manifest always serializable");
        system::write_file(&path, text)
    }
}
