use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional configuration file path
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Show what would be done without changing the environment or config files
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Commands {
    /// Remove and recreate the managed conda environment, then write notebook config
    ResetEnv,

    /// Register a conda environment as a Jupyter kernel
    InstallKernel {
        /// Name of the conda environment (also used as the kernel name)
        kernel: String,
    },

    /// Unregister a Jupyter kernel
    RemoveKernel {
        /// Name of the kernel to uninstall
        kernel: String,
    },

    /// List the registered Jupyter kernels
    ListKernels,
}

impl Commands {
    pub fn name(&self) -> &'static str {
        match self {
            Commands::ResetEnv => "reset-env",
            Commands::InstallKernel { .. } => "install-kernel",
            Commands::RemoveKernel { .. } => "remove-kernel",
            Commands::ListKernels => "list-kernels",
        }
    }
}

impl Cli {
    pub fn get_config_path(&self) -> PathBuf {
        if let Some(config_path) = &self.config {
            config_path.clone()
        } else {
            // Home directory based configuration file path
            if let Some(home_dir) = dirs::home_dir() {
                let config_path = home_dir.join(".config").join("jupman").join("jupman.yaml");
                if config_path.exists() {
                    return config_path;
                }
            }

            // XDG_CONFIG_HOME based configuration file path
            if let Some(config_dir) = dirs::config_dir() {
                let config_path = config_dir.join("jupman").join("jupman.yaml");
                if config_path.exists() {
                    return config_path;
                }
            }

            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config")
                .join("jupman")
                .join("jupman.yaml")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert()
    }

    #[test]
    fn test_config_path_with_custom_path() {
        let cli = Cli {
            config: Some(PathBuf::from("custom.yaml")),
            verbose: false,
            dry_run: false,
            command: Commands::ListKernels,
        };
        assert_eq!(cli.get_config_path(), PathBuf::from("custom.yaml"));
    }

    #[test]
    fn test_config_path_default_ends_with_file_name() {
        let cli = Cli {
            config: None,
            verbose: false,
            dry_run: false,
            command: Commands::ListKernels,
        };
        assert!(cli.get_config_path().ends_with("jupman/jupman.yaml"));
    }

    #[test]
    fn test_parse_subcommands() {
        let cli = Cli::try_parse_from(["jupman", "install-kernel", "foo"]).unwrap();
        assert_eq!(
            cli.command,
            Commands::InstallKernel {
                kernel: "foo".to_string()
            }
        );

        let cli = Cli::try_parse_from(["jupman", "remove-kernel", "bar"]).unwrap();
        assert_eq!(
            cli.command,
            Commands::RemoveKernel {
                kernel: "bar".to_string()
            }
        );

        let cli = Cli::try_parse_from(["jupman", "reset-env"]).unwrap();
        assert_eq!(cli.command, Commands::ResetEnv);

        let cli = Cli::try_parse_from(["jupman", "list-kernels", "--dry-run"]).unwrap();
        assert_eq!(cli.command, Commands::ListKernels);
        assert!(cli.dry_run);
    }

    #[test]
    fn test_kernel_argument_is_required() {
        assert!(Cli::try_parse_from(["jupman", "install-kernel"]).is_err());
        assert!(Cli::try_parse_from(["jupman", "remove-kernel"]).is_err());
    }

    #[test]
    fn test_no_arguments_for_reset_and_list() {
        assert!(Cli::try_parse_from(["jupman", "reset-env", "extra"]).is_err());
        assert!(Cli::try_parse_from(["jupman", "list-kernels", "extra"]).is_err());
    }

    #[test]
    fn test_command_names() {
        assert_eq!(Commands::ResetEnv.name(), "reset-env");
        assert_eq!(Commands::ListKernels.name(), "list-kernels");
        assert_eq!(
            Commands::InstallKernel {
                kernel: "x".to_string()
            }
            .name(),
            "install-kernel"
        );
    }
}
