use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileReadError(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] serde_yaml::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Settings for the managed environment, fixed for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Name of the conda environment `reset-env` recreates.
    pub environment_name: String,
    /// The active conda environment required before any command runs.
    pub baseline_environment: String,
    pub conda_executable: String,
    /// Installed by `conda create` into the managed environment.
    pub conda_packages: Vec<String>,
    /// Installed by pip inside the managed environment after creation.
    pub pip_packages: Vec<String>,
    /// Installed into an environment before it is registered as a kernel.
    pub kernel_support_package: String,
    /// Overrides `JUPYTER_CONFIG_DIR` and `~/.jupyter`.
    pub jupyter_config_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment_name: "jupyter-env".to_string(),
            baseline_environment: "base".to_string(),
            conda_executable: "conda".to_string(),
            conda_packages: vec!["jupyter".to_string()],
            pip_packages: vec![
                "jupyter-resource-usage".to_string(),
                "jupyterlab-github".to_string(),
            ],
            kernel_support_package: "ipykernel".to_string(),
            jupyter_config_dir: None,
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the file if it exists, otherwise falls back to the defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.environment_name.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "environment_name must not be empty".to_string(),
            ));
        }
        if self.baseline_environment.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "baseline_environment must not be empty".to_string(),
            ));
        }
        if self.conda_executable.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "conda_executable must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.environment_name, "jupyter-env");
        assert_eq!(config.baseline_environment, "base");
        assert_eq!(config.conda_packages, vec!["jupyter".to_string()]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
        environment_name: ds-env
        baseline_environment: root
        conda_executable: mamba
        conda_packages: [jupyterlab, numpy]
        pip_packages: [jupyter-resource-usage]
        kernel_support_package: ipykernel
        jupyter_config_dir: /tmp/jupyter
        "#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.environment_name, "ds-env");
        assert_eq!(config.baseline_environment, "root");
        assert_eq!(config.conda_executable, "mamba");
        assert_eq!(config.conda_packages, vec!["jupyterlab", "numpy"]);
        assert_eq!(config.pip_packages, vec!["jupyter-resource-usage"]);
        assert_eq!(config.jupyter_config_dir, Some(PathBuf::from("/tmp/jupyter")));
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = Config::from_yaml("environment_name: other\n").unwrap();
        assert_eq!(config.environment_name, "other");
        assert_eq!(config.conda_executable, "conda");
        assert_eq!(config.pip_packages, Config::default().pip_packages);
    }

    #[test]
    fn test_empty_environment_name_is_rejected() {
        let result = Config::from_yaml("environment_name: \"  \"\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_malformed_yaml_is_a_parse_error() {
        let result = Config::from_yaml("conda_packages: {not: [a list");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(dir.path().join("missing.yaml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "environment_name: from-file").unwrap();
        let config = Config::load_or_default(file.path()).unwrap();
        assert_eq!(config.environment_name, "from-file");
    }
}
