//! Error types

use crate::errorln;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Cannot find `{0}`")]
    NotFound(String),
    #[error("Invalid path `{0}`: {1}")]
    InvalidPath(String, std::io::Error),
    #[error("Cannot read file `{0}`: {1}")]
    ReadFile(String, std::io::Error),
    #[error("Cannot write file `{0}`: {1}")]
    WriteFile(String, std::io::Error),
    #[error("Cannot create directory `{0}`: {1}")]
    CreateDirectory(String, std::io::Error),
    #[error("Cannot remove directory `{0}`: {1}")]
    RemoveDirectory(String, std::io::Error),

    #[error("Cannot parse `-D{0}`: expected `key=value`")]
    BadDefine(String),
    #[error("Cannot parse setup manifest: {0}")]
    ParseManifest(serde_json::Error),
    #[error("No configured build directory at `{0}`; run `setup` first")]
    NotConfigured(String),

    #[error("{0}")]
    Evaluation(#[from] muon_core::Error),

    #[error("`{0}` is not implemented in this build: it requires an external collaborator (network fetch, archive extraction, or test harness) out of this project's scope")]
    NotImplemented(String),
}

impl Error {
    pub fn print(&self) {
        errorln!("Fatal", "{}", self);
    }
}
