//! Object payloads for every DSL value kind (`spec.md` §3.1).

use indexmap::IndexMap;

use super::{Handle, StrId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompilerKind {
    C,
    Cpp,
    Rust,
    Unknown(String),
}

/// Detected compiler vendor, used to pick the Ninja `deps =` flavour for
/// a `<LANG>_COMPILER` rule (`gcc`-style `-MD -MF` or MSVC-style `/showIncludes`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompilerVendor {
    Gcc,
    Clang,
    Msvc,
    Unknown,
}

impl CompilerVendor {
    /// Ninja's `deps =` value for this vendor, or `None` if this vendor
    /// has no dependency-tracking flavour muon knows how to drive.
    pub fn deps_flavour(&self) -> Option<&'static str> {
        match self {
            CompilerVendor::Gcc | CompilerVendor::Clang => Some("gcc"),
            CompilerVendor::Msvc => Some("msvc"),
            CompilerVendor::Unknown => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Compiler {
    pub kind: CompilerKind,
    pub exe: String,
    pub version: String,
    pub linker_id: String,
    pub vendor: CompilerVendor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DepsFlavour {
    /// Found via `pkg-config`-style lookup (or faked by a declared dependency).
    Found,
    /// `dependency(..., required: false)` that was not found.
    NotFound,
}

#[derive(Debug, Clone)]
pub struct Dependency {
    pub name: String,
    pub flavour: DepsFlavour,
    pub version: String,
    pub compile_args: Vec<String>,
    pub link_args: Vec<String>,
    pub variables: IndexMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct ExternalProgram {
    pub name: String,
    pub full_path: Option<String>,
    pub found: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetKind {
    Executable,
    StaticLibrary,
    SharedLibrary,
}

#[derive(Debug, Clone)]
pub struct BuildTarget {
    pub name: String,
    pub kind: TargetKind,
    pub sources: Vec<Handle>,
    pub output_name: String,
    pub link_with: Vec<Handle>,
    pub dependencies: Vec<Handle>,
    pub include_dirs: Vec<String>,
    pub install: bool,
    /// Set by `generated_list.process_for_target` when one of the
    /// target's generated outputs looks like a header, forcing a
    /// build-order dependency from the target's compile steps onto the
    /// generating custom target.
    pub has_generated_include: bool,
}

#[derive(Debug, Clone)]
pub struct BothLibs {
    pub shared: Handle,
    pub static_: Handle,
}

#[derive(Debug, Clone)]
pub struct CustomTarget {
    pub name: String,
    pub inputs: Vec<Handle>,
    pub outputs: Vec<String>,
    pub command: Vec<String>,
    pub install: bool,
}

#[derive(Debug, Clone)]
pub struct Generator {
    pub exe: Handle,
    pub arguments: Vec<String>,
    pub output: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct GeneratedList {
    pub generator: Handle,
    pub inputs: Vec<Handle>,
}

#[derive(Debug, Clone, Default)]
pub struct Environment {
    pub vars: IndexMap<String, Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct RunResult {
    pub returncode: i32,
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureOption {
    Enabled,
    Disabled,
    Auto,
}

/// A single arena-resident value. `Handle(0)` is always `Null`.
#[derive(Debug, Clone)]
pub enum Obj {
    Null,
    Bool(bool),
    Number(i64),
    Str(StrId),
    File(StrId),
    Array(Vec<Handle>),
    Dict(IndexMap<String, Handle>),
    Compiler(Compiler),
    Dependency(Dependency),
    ExternalProgram(ExternalProgram),
    BuildTarget(BuildTarget),
    CustomTarget(CustomTarget),
    BothLibs(BothLibs),
    Generator(Generator),
    GeneratedList(GeneratedList),
    Environment(Environment),
    RunResult(RunResult),
    FeatureOption(FeatureOption),
    /// The singleton `meson` module object.
    Meson,
    /// A resolved subproject handle: index into `Workspace::projects`.
    Subproject(usize),
}
