use clap::{Parser, Subcommand};

pub mod commands;
pub mod manifest;
pub mod system;

use crate::system::Error;

/// CLI entry point
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Muon {
    /// chdir before running
    #[clap(short('C'), long, default_value = ".")]
    pub dir: String,

    /// Print verbose (debug) logs
    #[clap(short, long)]
    pub verbose: bool,

    /// Include source locations in logs
    #[clap(short('l'), long)]
    pub locations: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure a build directory
    Setup {
        build_dir: String,
        /// Override an option as `key=value`
        #[clap(short = 'D', long = "define", value_name = "key=value")]
        defines: Vec<String>,
        /// Machine file with cross/native compiler overrides
        #[clap(short = 'm', long)]
        machine_file: Option<String>,
    },
    /// Invoke the embedded Ninja executor
    Samu {
        #[clap(trailing_var_arg = true)]
        passthrough: Vec<String>,
    },
    /// Run the test list of a configured build
    Test {
        build_dir: String,
        #[clap(short = 's', long = "suite")]
        suites: Vec<String>,
    },
    /// Stage installs
    Install {
        build_dir: String,
        #[clap(short = 'n', long)]
        dry_run: bool,
    },
    /// Subproject wrap management
    Subprojects {
        #[clap(subcommand)]
        command: SubprojectsCommand,
    },
    /// Parse a file only
    Check {
        file: String,
        /// Print the parsed AST
        #[clap(short = 'p', long)]
        print_ast: bool,
    },
    /// Internal developer commands
    Internal {
        #[clap(subcommand)]
        command: InternalCommand,
    },
    /// Run a `.muon`-style configuration script
    Auto {
        #[clap(short = 'c', long)]
        cfg: Option<String>,
        #[clap(short = 'r', long)]
        regen_only: bool,
        #[clap(short = 'f', long)]
        force: bool,
    },
    /// Print version and enabled features
    Version,
}

#[derive(Debug, Subcommand)]
pub enum SubprojectsCommand {
    /// Validate a wrap file
    CheckWrap { wrap_file: String },
    /// Fetch listed subprojects
    Download { names: Vec<String> },
}

#[derive(Debug, Subcommand)]
pub enum InternalCommand {
    /// Run a script in the extended DSL
    Eval {
        file: Option<String>,
        #[clap(short = 'e', long)]
        embedded: Option<String>,
    },
    /// Interactive evaluation
    Repl,
    /// Execute a captured command
    Exe {
        #[clap(trailing_var_arg = true)]
        cmd: Vec<String>,
        #[clap(short = 'c', long)]
        outfile: Option<String>,
    },
}

impl Muon {
    pub fn run(&self) -> Result<(), Error> {
        if self.dir != "." {
            std::env::set_current_dir(&self.dir)
                .map_err(|e| Error::InvalidPath(self.dir.clone(), e))?;
        }
        match &self.command {
            Command::Setup {
                build_dir,
                defines,
                machine_file,
            } => commands::setup::run(build_dir, defines, machine_file.as_deref()),
            Command::Samu { passthrough } => commands::external::samu(passthrough),
            Command::Test { build_dir, suites } => commands::external::test(build_dir, suites),
            Command::Install { build_dir, dry_run } => commands::external::install(build_dir, *dry_run),
            Command::Subprojects { command } => match command {
                SubprojectsCommand::CheckWrap { wrap_file } => commands::external::check_wrap(wrap_file),
                SubprojectsCommand::Download { names } => commands::external::download(names),
            },
            Command::Check { file, print_ast } => commands::check::run(file, *print_ast),
            Command::Internal { command } => match command {
                InternalCommand::Eval { file, embedded } => {
                    commands::internal::eval(file.as_deref(), embedded.as_deref())
                }
                InternalCommand::Repl => commands::internal::repl(),
                InternalCommand::Exe { cmd, outfile } => commands::internal::exe(cmd, outfile.as_deref()),
            },
            Command::Auto { cfg, regen_only, force } => commands::auto::run(cfg.as_deref(), *regen_only, *force),
            Command::Version => {
                commands::version::run();
                Ok(())
            }
        }
    }
}
