//! Package lifecycle: install, remove, list and run.
//!
//! [`Lifecycle`] ties the registry, bundle extraction and the executor
//! together and owns the invariants that span them:
//!
//! - at most one installed package per name, replaced only after confirmation
//! - a failed install never leaves a half-extracted package behind
//! - an ephemeral run's staging directory is removed on every exit path
//! - the process working directory is restored after every run
//!
//! Every operation returns a typed outcome or an [`ExcError`]; turning those
//! into console output is the caller's job. Only progress shown while an
//! operation is underway, the extraction spinner and `--debug` run details,
//! is printed here.

use crate::context::Context;
use crate::error::{ExcError, Result};
use crate::output::Output;
use crate::prompt::Confirm;
use crate::registry::{InstalledPackage, ManifestStatus, Registry};
use crate::runner::Executor;
use crate::{scaffold, BUNDLE_EXTENSION, ENTRY_SCRIPT};
use exc_common::archive::{extract_zip_file, set_executable, validate_zip};
use exc_common::manifest::{Manifest, MANIFEST_FILE};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

/// What to run and with which argument string.
///
/// `"hello a b"` targets `hello` with `ARGS=a b`; `"hello"` has no arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub target: String,
    pub args: Option<String>,
}

impl RunRequest {
    pub fn parse(input: &str) -> Self {
        match input.split_once(' ') {
            Some((target, args)) => Self {
                target: target.to_string(),
                args: Some(args.to_string()),
            },
            None => Self {
                target: input.to_string(),
                args: None,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed { name: String, path: PathBuf },
    Declined,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed { name: String },
    Declined,
}

/// Result of trying a name against the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunInstalled {
    /// Nothing installed under that name; other resolutions may be tried.
    NotInstalled,
    /// The package ran. The status is the command's own and may be non-zero.
    Ran(ExitStatus),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanOutcome {
    Cleaned { path: PathBuf },
    NothingToClean,
}

pub struct Lifecycle {
    ctx: Context,
    registry: Registry,
    executor: Executor,
    confirm: Box<dyn Confirm>,
}

impl Lifecycle {
    pub fn new(ctx: Context, executor: Executor, confirm: Box<dyn Confirm>) -> Self {
        let registry = Registry::new(ctx.install_root.clone());
        Self {
            ctx,
            registry,
            executor,
            confirm,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Install a bundle into the registry under its derived name.
    ///
    /// An existing package of the same name is only replaced after
    /// confirmation, and is then removed completely before extraction.
    pub fn install(&self, bundle: &Path) -> Result<InstallOutcome> {
        if !bundle.is_file() {
            return Err(ExcError::NotFound {
                path: bundle.to_path_buf(),
            });
        }
        validate_zip(bundle).map_err(|err| ExcError::invalid_bundle(bundle, err))?;

        let name = package_name(bundle)?;
        if self.registry.has(&name) {
            let prompt = format!("Package '{name}' already exists. Overwrite?");
            if !self.confirm.confirm(&prompt)? {
                tracing::debug!(%name, "overwrite declined");
                return Ok(InstallOutcome::Declined);
            }
        }

        let path = self.registry.path(&name);
        if path.exists() {
            fs::remove_dir_all(&path)?;
        }
        fs::create_dir_all(&path)?;
        tracing::debug!(%name, path = %path.display(), "installing");

        let spinner = Output::spinner(format!("Extracting {name}..."));
        let extracted = extract_zip_file(bundle, &path);
        spinner.finish_clear();

        if let Err(err) = extracted {
            if let Err(cleanup) = fs::remove_dir_all(&path) {
                tracing::warn!(path = %path.display(), "failed to remove partial install: {cleanup}");
            }
            return Err(err.into());
        }

        let entry = path.join(ENTRY_SCRIPT);
        if entry.is_file() {
            set_executable(&entry)?;
        }

        Ok(InstallOutcome::Installed { name, path })
    }

    /// Manifest state of an installed package, for showing before removal.
    pub fn inspect(&self, name: &str) -> Result<ManifestStatus> {
        validate_name(name)?;
        if !self.registry.has(name) {
            return Err(ExcError::NotInstalled {
                name: name.to_string(),
            });
        }
        Ok(self.registry.manifest(name))
    }

    /// Remove an installed package after confirmation.
    pub fn remove(&self, name: &str) -> Result<RemoveOutcome> {
        self.inspect(name)?;
        if !self.confirm.confirm(&format!("Remove '{name}'?"))? {
            return Ok(RemoveOutcome::Declined);
        }

        self.registry.remove(name)?;
        Ok(RemoveOutcome::Removed {
            name: name.to_string(),
        })
    }

    pub fn list(&self) -> Result<Vec<InstalledPackage>> {
        self.registry.list()
    }

    /// Run an installed package.
    ///
    /// A name that is not installed is not an error: it yields
    /// [`RunInstalled::NotInstalled`] so other resolutions can be tried. Any
    /// error means the package exists but could not be run.
    pub fn run_installed(&self, request: &RunRequest) -> Result<RunInstalled> {
        let name = request.target.as_str();
        if validate_name(name).is_err() || !self.registry.has(name) {
            return Ok(RunInstalled::NotInstalled);
        }

        let dir = self.registry.path(name);
        let manifest_path = dir.join(MANIFEST_FILE);
        if !manifest_path.is_file() {
            return Err(ExcError::MissingManifest { path: dir });
        }
        let manifest = Manifest::load(&manifest_path)
            .map_err(|err| ExcError::invalid_manifest(&manifest_path, err))?;

        tracing::debug!(name, args = ?request.args, "running installed package");
        let status = self.execute_in(&dir, &manifest, request.args.as_deref())?;
        Ok(RunInstalled::Ran(status))
    }

    /// Extract a bundle into a fresh staging directory, run it, and remove
    /// the staging directory again whatever happens.
    pub fn run_ephemeral(&self, bundle: &Path, args: Option<&str>) -> Result<ExitStatus> {
        if !bundle.is_file() {
            return Err(ExcError::NotFound {
                path: bundle.to_path_buf(),
            });
        }
        if !has_bundle_extension(bundle) {
            return Err(ExcError::InvalidBundle {
                path: bundle.to_path_buf(),
                reason: format!("expected a {BUNDLE_EXTENSION} file"),
            });
        }
        validate_zip(bundle).map_err(|err| ExcError::invalid_bundle(bundle, err))?;

        let name = package_name(bundle)?;
        let staging = Staging::create(&self.ctx.staging_root, &name)?;
        extract_zip_file(bundle, staging.path())?;

        let manifest_path = staging.path().join(MANIFEST_FILE);
        if !manifest_path.is_file() {
            return Err(ExcError::MissingManifest {
                path: bundle.to_path_buf(),
            });
        }
        let entry = staging.path().join(ENTRY_SCRIPT);
        if !entry.is_file() {
            return Err(ExcError::MissingEntrypoint {
                path: bundle.to_path_buf(),
            });
        }

        let manifest = Manifest::load(&manifest_path)
            .map_err(|err| ExcError::invalid_manifest(&manifest_path, err))?;
        set_executable(&entry)?;

        self.execute_in(staging.path(), &manifest, args)
    }

    /// Resolve `request.target` and run it.
    ///
    /// Resolution order: installed package, then the target as a bundle
    /// path, then the target with the bundle extension appended.
    pub fn run(&self, request: &RunRequest) -> Result<ExitStatus> {
        let args = request.args.as_deref();

        if let RunInstalled::Ran(status) = self.run_installed(request)? {
            return Ok(status);
        }

        let literal = Path::new(&request.target);
        if literal.is_file() && request.target.ends_with(BUNDLE_EXTENSION) {
            return self.run_ephemeral(literal, args);
        }

        let implied = PathBuf::from(format!("{}{BUNDLE_EXTENSION}", request.target));
        if implied.is_file() {
            return self.run_ephemeral(&implied, args);
        }

        Err(ExcError::Unresolved {
            name: request.target.clone(),
        })
    }

    /// Scaffold a new package directory under `parent`.
    pub fn new_package(&self, parent: &Path, name: &str) -> Result<PathBuf> {
        validate_name(name)?;
        scaffold::create(parent, name)
    }

    /// Delete the whole staging root.
    pub fn clean(&self) -> Result<CleanOutcome> {
        let root = &self.ctx.staging_root;
        if !root.exists() {
            return Ok(CleanOutcome::NothingToClean);
        }
        fs::remove_dir_all(root)?;
        tracing::debug!(path = %root.display(), "removed staging root");
        Ok(CleanOutcome::Cleaned { path: root.clone() })
    }

    fn execute_in(&self, dir: &Path, manifest: &Manifest, args: Option<&str>) -> Result<ExitStatus> {
        let dir = dir.canonicalize()?;
        if self.ctx.debug {
            Output::kv("Working dir", dir.display().to_string());
            Output::kv("Arguments", args.unwrap_or("(none)"));
        }
        let _cwd = self.ctx.enter_dir(&dir)?;
        self.executor.run(manifest, &dir, args)
    }
}

/// `hello.exc` -> `hello`; names without the extension are used as-is.
pub fn package_name(bundle: &Path) -> Result<String> {
    let file_name = bundle
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| ExcError::InvalidName {
            name: bundle.display().to_string(),
        })?;
    let name = file_name
        .strip_suffix(BUNDLE_EXTENSION)
        .unwrap_or(file_name)
        .to_string();
    validate_name(&name)?;
    Ok(name)
}

fn validate_name(name: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\']);
    if invalid {
        return Err(ExcError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(())
}

fn has_bundle_extension(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(BUNDLE_EXTENSION))
}

/// Staging directory for one ephemeral run, removed on drop.
struct Staging {
    dir: PathBuf,
}

impl Staging {
    fn create(root: &Path, name: &str) -> Result<Self> {
        let dir = root.join(name);
        if dir.exists() {
            fs::remove_dir_all(&dir)?;
        }
        fs::create_dir_all(&dir)?;
        tracing::debug!(dir = %dir.display(), "created staging directory");
        Ok(Self { dir })
    }

    fn path(&self) -> &Path {
        &self.dir
    }
}

impl Drop for Staging {
    fn drop(&mut self) {
        match fs::remove_dir_all(&self.dir) {
            Ok(()) => tracing::debug!(dir = %self.dir.display(), "removed staging directory"),
            Err(err) => tracing::warn!(
                dir = %self.dir.display(),
                "failed to remove staging directory: {err}"
            ),
        }
    }
}
