//! exc - run, install and manage self-contained application bundles.
//!
//! A bundle is a zip archive with the `.exc` extension carrying an
//! `info.json` manifest and a `start.sh` entry script. Bundles can be run
//! straight from the archive (extracted into a staging area that is removed
//! afterwards) or installed into a registry directory and run by name.

pub mod cli;
pub mod context;
pub mod error;
pub mod lifecycle;
pub mod output;
pub mod prompt;
pub mod registry;
pub mod runner;
pub mod scaffold;

pub use cli::Cli;
pub use context::{Context, WorkingDir};
pub use error::ExcError;
pub use lifecycle::{InstallOutcome, Lifecycle, RemoveOutcome, RunInstalled, RunRequest};
pub use registry::{InstalledPackage, ManifestStatus, Registry};
pub use runner::{CommandOptions, CommandRunner, Executor, SystemRunner};

/// Reserved bundle extension, including the dot.
pub const BUNDLE_EXTENSION: &str = ".exc";

/// Conventional entry script at the root of a bundle.
pub const ENTRY_SCRIPT: &str = "start.sh";

/// Environment variable carrying the argument string to the run command.
pub const ARGS_ENV: &str = "ARGS";
