//! Dispatches subcommands to conda, pip and the `jupyter` CLI.
//!
//! Every operation is a linear sequence of external calls. A failure stops
//! the sequence where it happened; nothing already done is rolled back, so a
//! failed `reset-env` can leave the managed environment removed but not
//! recreated.

use regex::Regex;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::cli::Commands;
use crate::config::Config;
use crate::guard::{self, GuardError};
use crate::host::HostFacts;
use crate::notebook_config::{self, NotebookConfigError, NotebookConfigPaths};
use crate::runner::{CommandError, CommandRunner, Invocation};
use crate::secret::Credentials;

#[derive(Debug, Error)]
pub enum ManagerError {
    #[error(transparent)]
    Guard(#[from] GuardError),
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error(transparent)]
    NotebookConfig(#[from] NotebookConfigError),
    #[error("GITHUB_CLIENT_ID and GITHUB_CLIENT_SECRET must both be set to reset the environment")]
    MissingCredentials,
    #[error("Could not find a Python version in `{output}`")]
    UnparseableVersion { output: String },
}

impl ManagerError {
    /// Process exit code: the failing child's code when there is one, else 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            ManagerError::Command(err) => err.exit_code().filter(|code| *code != 0).unwrap_or(1),
            _ => 1,
        }
    }
}

/// Inputs read from the process environment at startup.
#[derive(Debug, Clone)]
pub struct Context {
    /// Value of `CONDA_DEFAULT_ENV`.
    pub active_environment: Option<String>,
    pub credentials: Option<Credentials>,
    pub host: HostFacts,
    pub jupyter_config_dir: PathBuf,
}

pub struct JupyterManager<R: CommandRunner> {
    pub config: Config,
    pub runner: R,
    pub dry_run: bool,
}

impl<R: CommandRunner> JupyterManager<R> {
    pub fn new(config: Config, runner: R) -> Self {
        Self {
            config,
            runner,
            dry_run: false,
        }
    }

    pub fn with_dry_run(config: Config, runner: R, dry_run: bool) -> Self {
        Self {
            config,
            runner,
            dry_run,
        }
    }

    /// Checks the active environment, then runs `command`.
    pub fn execute(&self, command: &Commands, context: &Context) -> Result<(), ManagerError> {
        guard::check_active_environment(
            context.active_environment.as_deref(),
            &self.config.baseline_environment,
        )?;

        match command {
            Commands::ResetEnv => {
                let credentials = context
                    .credentials
                    .as_ref()
                    .ok_or(ManagerError::MissingCredentials)?;
                self.reset_env(&context.host, credentials, &context.jupyter_config_dir)
            }
            Commands::InstallKernel { kernel } => self.install_kernel(kernel),
            Commands::RemoveKernel { kernel } => self.remove_kernel(kernel),
            Commands::ListKernels => self.list_kernels(),
        }
    }

    pub fn reset_env(
        &self,
        host: &HostFacts,
        credentials: &Credentials,
        jupyter_config_dir: &Path,
    ) -> Result<(), ManagerError> {
        info!("(Re)setting the conda environment");
        let name = self.config.environment_name.as_str();

        let envs = self.runner.output(&self.conda(["info", "--envs"]))?;
        if environment_listed(&envs, name) {
            info!("Removing existing environment '{}'", name);
            self.mutate(&self.conda(["remove", "-n", name, "--all", "-y"]))?;
        }

        let mut create = vec!["create", "-n", name, "-y"];
        create.extend(self.config.conda_packages.iter().map(String::as_str));
        self.mutate(&self.conda(create))?;

        if !self.config.pip_packages.is_empty() {
            let mut pip = vec![
                "run",
                "--no-capture-output",
                "-n",
                name,
                "python",
                "-m",
                "pip",
                "install",
            ];
            pip.extend(self.config.pip_packages.iter().map(String::as_str));
            self.mutate(&self.conda(pip))?;
        }

        let paths = NotebookConfigPaths::in_dir(jupyter_config_dir);
        let python_config = notebook_config::render_python_config(host, credentials);
        let notebook_json = notebook_config::render_notebook_json()?;
        if self.dry_run {
            info!("[DRY RUN] Would append to {}", paths.python_config.display());
            info!("[DRY RUN] Would write {}", paths.notebook_json.display());
        } else {
            notebook_config::append_to(&paths.python_config, &python_config)?;
            notebook_config::overwrite(&paths.notebook_json, &notebook_json)?;
        }

        info!("Environment '{}' is ready", name);
        Ok(())
    }

    pub fn install_kernel(&self, kernel: &str) -> Result<(), ManagerError> {
        info!("Installing a conda kernel to jupyter");
        self.mutate(&self.conda([
            "install",
            "-n",
            kernel,
            "-y",
            self.config.kernel_support_package.as_str(),
        ]))?;

        let version_output = self
            .runner
            .output(&self.conda(["run", "-n", kernel, "python", "--version"]))?;
        let version = parse_python_version(&version_output).ok_or_else(|| {
            ManagerError::UnparseableVersion {
                output: version_output.trim().to_string(),
            }
        })?;

        let display_name = kernel_display_name(kernel, &version);
        self.mutate(&self.conda([
            "run",
            "--no-capture-output",
            "-n",
            kernel,
            "python",
            "-m",
            "ipykernel",
            "install",
            "--user",
            "--name",
            kernel,
            "--display-name",
            display_name.as_str(),
        ]))?;

        info!("Registered kernel '{}' as \"{}\"", kernel, display_name);
        Ok(())
    }

    pub fn remove_kernel(&self, kernel: &str) -> Result<(), ManagerError> {
        info!("Removing a conda kernel from jupyter");
        self.mutate(&self.conda([
            "run",
            "--no-capture-output",
            "-n",
            self.config.environment_name.as_str(),
            "jupyter",
            "kernelspec",
            "uninstall",
            kernel,
            "-y",
        ]))
    }

    pub fn list_kernels(&self) -> Result<(), ManagerError> {
        info!("Listing the available kernels. You can edit the kernels by opening the kernel.json file in the listed directories.");
        self.runner.run(&self.conda([
            "run",
            "--no-capture-output",
            "-n",
            self.config.environment_name.as_str(),
            "jupyter",
            "kernelspec",
            "list",
        ]))?;
        Ok(())
    }

    fn conda<I, S>(&self, args: I) -> Invocation
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Invocation::new(&self.config.conda_executable, args)
    }

    // Runs a command that changes the environment or kernel registry.
    fn mutate(&self, invocation: &Invocation) -> Result<(), ManagerError> {
        if self.dry_run {
            info!("[DRY RUN] Would execute: {}", invocation);
            return Ok(());
        }
        self.runner.run(invocation)?;
        Ok(())
    }
}

/// Whether `conda info --envs` output lists an environment called `name`.
///
/// Only the first column counts, so a prefix path that merely contains the
/// name does not match.
pub fn environment_listed(envs_output: &str, name: &str) -> bool {
    envs_output
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#'))
        .any(|line| line.split_whitespace().next() == Some(name))
}

/// Extracts `X.Y[.Z]` from `python --version` output.
pub fn parse_python_version(output: &str) -> Option<String> {
    let re = Regex::new(r"Python\s+(\d+\.\d+(?:\.\d+)?)").ok()?;
    re.captures(output)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

pub fn kernel_display_name(kernel: &str, version: &str) -> String {
    format!("Python {} ({})", version, kernel)
}
