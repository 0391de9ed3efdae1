//! Command-line interface and dispatch.
//!
//! Every operation reports its own success or failure line and the process
//! exits normally either way.

use crate::error::ExcError;
use crate::lifecycle::{CleanOutcome, InstallOutcome, Lifecycle, RemoveOutcome, RunRequest};
use crate::output::Output;
use crate::registry::{InstalledPackage, ManifestStatus};
use crate::BUNDLE_EXTENSION;
use clap::{ArgGroup, Parser};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "exc", version)]
#[command(about = "Run, install and manage .exc application bundles", long_about = None)]
#[command(
    group(
        ArgGroup::new("action")
            .args(["target", "install", "remove", "list", "new", "clean"])
    )
)]
pub struct Cli {
    /// Installed package or bundle to run. Quote to pass arguments: "hello --name world"
    #[arg(value_name = "NAME")]
    pub target: Option<String>,

    /// Install a bundle
    #[arg(short, long, value_name = "BUNDLE")]
    pub install: Option<PathBuf>,

    /// Remove an installed package
    #[arg(short, long, value_name = "NAME")]
    pub remove: Option<String>,

    /// List installed packages
    #[arg(short, long)]
    pub list: bool,

    /// Create a new package skeleton
    #[arg(long, value_name = "NAME")]
    pub new: Option<String>,

    /// Delete all ephemeral staging directories
    #[arg(long)]
    pub clean: bool,

    /// Answer yes to confirmation prompts
    #[arg(short, long)]
    pub yes: bool,

    /// Enable verbose diagnostic output
    #[arg(long)]
    pub debug: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Run(RunRequest),
    Install(PathBuf),
    Remove(String),
    List,
    New(String),
    Clean,
    Help,
}

impl Cli {
    pub fn action(&self) -> Action {
        if let Some(bundle) = &self.install {
            Action::Install(bundle.clone())
        } else if let Some(name) = &self.remove {
            Action::Remove(name.clone())
        } else if self.list {
            Action::List
        } else if self.clean {
            Action::Clean
        } else if let Some(name) = &self.new {
            Action::New(name.clone())
        } else if let Some(target) = &self.target {
            Action::Run(RunRequest::parse(target))
        } else {
            Action::Help
        }
    }
}

/// Run one action and print its outcome. `Help` is handled by the caller.
pub fn dispatch(lifecycle: &Lifecycle, action: Action) {
    match action {
        Action::Run(request) => report_run(lifecycle, &request),
        Action::Install(bundle) => report_install(lifecycle, &bundle),
        Action::Remove(name) => report_remove(lifecycle, &name),
        Action::List => report_list(lifecycle),
        Action::New(name) => report_new(lifecycle, &name),
        Action::Clean => report_clean(lifecycle),
        Action::Help => {}
    }
}

fn report_run(lifecycle: &Lifecycle, request: &RunRequest) {
    match lifecycle.run(request) {
        Ok(status) => {
            tracing::debug!(package = %request.target, %status, "run finished");
        }
        Err(ExcError::Unresolved { name }) => {
            Output::error(format!("Package not found: {name}"));
            Output::hint("Use 'exc -l' to list installed packages");
        }
        Err(err) => Output::error(format!("Run failed: {err}")),
    }
}

fn report_install(lifecycle: &Lifecycle, bundle: &Path) {
    match lifecycle.install(bundle) {
        Ok(InstallOutcome::Installed { name, .. }) => Output::success(format!("Installed {name}")),
        Ok(InstallOutcome::Declined) => Output::info("Cancelled."),
        Err(err) => Output::error(format!("Install failed: {err}")),
    }
}

fn report_remove(lifecycle: &Lifecycle, name: &str) {
    match lifecycle.inspect(name) {
        Ok(status) => print_removal_summary(name, &status),
        Err(err @ ExcError::NotInstalled { .. }) => {
            Output::error(format!("{err}"));
            return;
        }
        Err(err) => {
            Output::error(format!("Remove failed: {err}"));
            return;
        }
    }

    match lifecycle.remove(name) {
        Ok(RemoveOutcome::Removed { name }) => Output::success(format!("Removed {name}")),
        Ok(RemoveOutcome::Declined) => Output::info("Cancelled."),
        Err(err @ ExcError::NotInstalled { .. }) => Output::error(format!("{err}")),
        Err(err) => Output::error(format!("Remove failed: {err}")),
    }
}

fn print_removal_summary(name: &str, status: &ManifestStatus) {
    Output::kv("Package", name);
    match status {
        ManifestStatus::Loaded(manifest) => {
            if let Some(description) = &manifest.description {
                Output::kv("Description", description);
            }
        }
        ManifestStatus::Missing => Output::warning("No info.json in package"),
        ManifestStatus::Corrupt(reason) => {
            Output::warning(format!("info.json is unreadable: {reason}"))
        }
    }
}

fn report_list(lifecycle: &Lifecycle) {
    let packages = match lifecycle.list() {
        Ok(packages) => packages,
        Err(err) => {
            Output::error(format!("List failed: {err}"));
            return;
        }
    };

    if packages.is_empty() {
        Output::info("No packages installed");
        return;
    }

    Output::header("Installed packages:");
    Output::separator();
    for package in &packages {
        print_package(package);
    }
}

fn print_package(package: &InstalledPackage) {
    match &package.manifest {
        ManifestStatus::Loaded(manifest) => {
            println!(
                "  {} {}",
                package.name.bold(),
                format!("(v{})", manifest.version_or_unknown()).dimmed()
            );
            println!("    {}", manifest.description_or_default());
        }
        ManifestStatus::Missing => {
            Output::warning(format!("{} (manifest missing)", package.name));
        }
        ManifestStatus::Corrupt(_) => {
            Output::warning(format!("{} (manifest corrupt)", package.name));
        }
    }
}

fn report_new(lifecycle: &Lifecycle, name: &str) {
    let cwd = Path::new(".");
    match lifecycle.new_package(cwd, name) {
        Ok(_) => {
            Output::success(format!("Created project {name}"));
            Output::hint(format!(
                "Zip its contents into {name}{BUNDLE_EXTENSION}, then run: exc \"{name} <args>\""
            ));
        }
        Err(err) => Output::error(format!("Create failed: {err}")),
    }
}

fn report_clean(lifecycle: &Lifecycle) {
    match lifecycle.clean() {
        Ok(CleanOutcome::Cleaned { path }) => {
            Output::success(format!("Removed {}", path.display()));
        }
        Ok(CleanOutcome::NothingToClean) => Output::info("Nothing to clean"),
        Err(err) => Output::error(format!("Clean failed: {err}")),
    }
}
