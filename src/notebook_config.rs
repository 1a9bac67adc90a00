//! Boilerplate written into the notebook server's config directory.

use serde_json::json;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::host::HostFacts;
use crate::secret::Credentials;

pub const PYTHON_CONFIG_FILE: &str = "jupyter_notebook_config.py";
pub const NOTEBOOK_JSON_FILE: &str = "notebook.json";
const NBCONFIG_DIR: &str = "nbconfig";

#[derive(Debug, Error)]
pub enum NotebookConfigError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to serialize notebook config: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Resolves the per-user Jupyter config directory.
///
/// `JUPYTER_CONFIG_DIR` wins over `~/.jupyter`, matching how Jupyter itself
/// looks the directory up.
pub fn default_config_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("JUPYTER_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".jupyter")
}

/// The assignment block appended to `jupyter_notebook_config.py`.
///
/// Credentials are inserted verbatim, without quoting or escaping.
pub fn render_python_config(host: &HostFacts, credentials: &Credentials) -> String {
    format!(
        "\n# Added by jupman\n\
         c.ResourceUseDisplay.mem_limit = {}\n\
         c.ResourceUseDisplay.track_cpu_percent = True\n\
         c.ResourceUseDisplay.cpu_limit = {}\n\
         c.GitHubConfig.client_id = '{}'\n\
         c.GitHubConfig.client_secret = '{}'\n",
        host.total_memory_bytes,
        host.cpu_count,
        credentials.client_id.expose(),
        credentials.client_secret.expose(),
    )
}

/// The full contents of `nbconfig/notebook.json`.
pub fn render_notebook_json() -> Result<String, NotebookConfigError> {
    let value = json!({
        "load_extensions": {
            "jupyter-resource-usage/main": true
        }
    });
    let mut rendered = serde_json::to_string_pretty(&value)?;
    rendered.push('\n');
    Ok(rendered)
}

/// Paths of the two files inside a Jupyter config directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotebookConfigPaths {
    pub python_config: PathBuf,
    pub notebook_json: PathBuf,
}

impl NotebookConfigPaths {
    pub fn in_dir(config_dir: &Path) -> Self {
        Self {
            python_config: config_dir.join(PYTHON_CONFIG_FILE),
            notebook_json: config_dir.join(NBCONFIG_DIR).join(NOTEBOOK_JSON_FILE),
        }
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> NotebookConfigError + '_ {
    move |source| NotebookConfigError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn ensure_parent(path: &Path) -> Result<(), NotebookConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_error(parent))?;
    }
    Ok(())
}

/// Appends `contents` to `path`, creating the file and its parents if needed.
pub fn append_to(path: &Path, contents: &str) -> Result<(), NotebookConfigError> {
    ensure_parent(path)?;
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(io_error(path))?;
    file.write_all(contents.as_bytes()).map_err(io_error(path))?;
    info!("Appended notebook config to {}", path.display());
    Ok(())
}

/// Replaces `path` with `contents`, creating its parents if needed.
pub fn overwrite(path: &Path, contents: &str) -> Result<(), NotebookConfigError> {
    ensure_parent(path)?;
    fs::write(path, contents).map_err(io_error(path))?;
    info!("Wrote notebook config to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host() -> HostFacts {
        HostFacts {
            total_memory_bytes: 17_179_869_184,
            cpu_count: 8,
        }
    }

    #[test]
    fn test_python_config_golden() {
        let rendered = render_python_config(&host(), &Credentials::new("abc123", "s3cr3t"));
        let expected = "\n# Added by jupman\n\
c.ResourceUseDisplay.mem_limit = 17179869184\n\
c.ResourceUseDisplay.track_cpu_percent = True\n\
c.ResourceUseDisplay.cpu_limit = 8\n\
c.GitHubConfig.client_id = 'abc123'\n\
c.GitHubConfig.client_secret = 's3cr3t'\n";
        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_python_config_embeds_credentials_verbatim() {
        let rendered = render_python_config(&host(), &Credentials::new("it's", "a\"b"));
        assert!(rendered.contains("c.GitHubConfig.client_id = 'it's'\n"));
        assert!(rendered.contains("c.GitHubConfig.client_secret = 'a\"b'\n"));
    }

    #[test]
    fn test_notebook_json_golden() {
        let expected = "{\n  \"load_extensions\": {\n    \"jupyter-resource-usage/main\": true\n  }\n}\n";
        assert_eq!(render_notebook_json().unwrap(), expected);
    }

    #[test]
    fn test_paths_in_dir() {
        let paths = NotebookConfigPaths::in_dir(Path::new("/home/u/.jupyter"));
        assert_eq!(
            paths.python_config,
            PathBuf::from("/home/u/.jupyter/jupyter_notebook_config.py")
        );
        assert_eq!(
            paths.notebook_json,
            PathBuf::from("/home/u/.jupyter/nbconfig/notebook.json")
        );
    }

    #[test]
    fn test_append_creates_and_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(PYTHON_CONFIG_FILE);

        append_to(&path, "first\n").unwrap();
        append_to(&path, "second\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn test_overwrite_replaces_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(NBCONFIG_DIR).join(NOTEBOOK_JSON_FILE);

        overwrite(&path, "old contents that are longer").unwrap();
        overwrite(&path, "new").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn test_write_error_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "a file, not a directory").unwrap();

        let err = append_to(&blocker.join("config.py"), "x").unwrap_err();
        assert!(matches!(err, NotebookConfigError::Io { .. }));
        assert!(err.to_string().contains("blocker"));
    }
}
