//! Running a package's declared command.
//!
//! The [`CommandRunner`] trait is the seam between exc and the operating
//! system. [`SystemRunner`] delegates to [`std::process::Command`]; tests
//! substitute a recording runner that never spawns anything.
//!
//! [`Executor`] turns a manifest's `run` field into a `sh -c` invocation.
//! Only a failure to launch is an error; the command's exit status is handed
//! back untouched.

use crate::error::{ExcError, Result};
use crate::ARGS_ENV;
use exc_common::manifest::{Manifest, MANIFEST_FILE};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use std::sync::Arc;

/// Shell used to interpret `run` commands.
pub const SHELL: &str = "sh";

pub trait CommandRunner: Send + Sync {
    /// Run a command with inherited stdio and wait for it to exit.
    ///
    /// `Err` means the process could not be started at all.
    fn run_status(
        &self,
        program: &str,
        args: &[&str],
        options: &CommandOptions,
    ) -> std::io::Result<ExitStatus>;
}

#[derive(Debug, Default, Clone)]
pub struct CommandOptions {
    /// Working directory for the command.
    pub cwd: Option<PathBuf>,
    /// Environment variables to set.
    pub env: Vec<(String, String)>,
    /// Environment variables to remove from the inherited environment.
    pub env_remove: Vec<String>,
}

impl CommandOptions {
    pub fn with_cwd(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: Some(cwd.into()),
            ..Default::default()
        }
    }
}

/// Production implementation that delegates to [`std::process::Command`].
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run_status(
        &self,
        program: &str,
        args: &[&str],
        options: &CommandOptions,
    ) -> std::io::Result<ExitStatus> {
        let mut cmd = Command::new(program);
        cmd.args(args);
        if let Some(cwd) = &options.cwd {
            cmd.current_dir(cwd);
        }
        for key in &options.env_remove {
            cmd.env_remove(key);
        }
        for (k, v) in &options.env {
            cmd.env(k, v);
        }
        cmd.status()
    }
}

#[derive(Clone)]
pub struct Executor {
    runner: Arc<dyn CommandRunner>,
}

impl Executor {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    pub fn system() -> Self {
        Self::new(Arc::new(SystemRunner))
    }

    /// Run `manifest`'s command from `working_dir`.
    ///
    /// `args` is exposed as `ARGS`; with `None` the variable is removed from
    /// the child's environment rather than set to an empty string.
    pub fn run(
        &self,
        manifest: &Manifest,
        working_dir: &Path,
        args: Option<&str>,
    ) -> Result<ExitStatus> {
        let command = manifest
            .run_command()
            .ok_or_else(|| ExcError::InvalidManifest {
                path: working_dir.join(MANIFEST_FILE),
                reason: "missing 'run' command".to_string(),
            })?;

        let mut options = CommandOptions::with_cwd(working_dir);
        match args {
            Some(args) => options.env.push((ARGS_ENV.to_string(), args.to_string())),
            None => options.env_remove.push(ARGS_ENV.to_string()),
        }

        tracing::debug!(
            command,
            cwd = %working_dir.display(),
            args = args.unwrap_or("<none>"),
            "running package command"
        );

        let status = self
            .runner
            .run_status(SHELL, &["-c", command], &options)
            .map_err(|source| ExcError::Execution {
                command: command.to_string(),
                source,
            })?;

        tracing::debug!(%status, "package command exited");
        Ok(status)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    pub(crate) fn exit_status(code: i32) -> ExitStatus {
        use std::os::unix::process::ExitStatusExt;
        ExitStatus::from_raw(code << 8)
    }

    #[derive(Debug, Clone)]
    pub(crate) struct RecordedCall {
        pub program: String,
        pub args: Vec<String>,
        pub options: CommandOptions,
        /// Process working directory at the time of the call.
        pub process_cwd: PathBuf,
    }

    /// Records every call; fails to launch when `fail_launch` is set.
    ///
    /// With `remove_cwd` set, the command's working directory is deleted
    /// during the call, the way a package that cleans up after itself would.
    #[derive(Default)]
    pub(crate) struct RecordingRunner {
        pub calls: Mutex<Vec<RecordedCall>>,
        pub fail_launch: bool,
        pub remove_cwd: bool,
    }

    impl RecordingRunner {
        pub fn failing() -> Self {
            Self {
                fail_launch: true,
                ..Default::default()
            }
        }

        pub fn removing_cwd() -> Self {
            Self {
                remove_cwd: true,
                ..Default::default()
            }
        }

        pub fn calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl CommandRunner for RecordingRunner {
        fn run_status(
            &self,
            program: &str,
            args: &[&str],
            options: &CommandOptions,
        ) -> std::io::Result<ExitStatus> {
            self.calls.lock().unwrap().push(RecordedCall {
                program: program.to_string(),
                args: args.iter().map(|a| a.to_string()).collect(),
                options: options.clone(),
                process_cwd: std::env::current_dir()?,
            });
            if self.fail_launch {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "no such shell",
                ));
            }
            if self.remove_cwd {
                if let Some(cwd) = &options.cwd {
                    std::fs::remove_dir_all(cwd)?;
                }
            }
            Ok(exit_status(0))
        }
    }
}
