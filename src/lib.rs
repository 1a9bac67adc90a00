pub mod cli;
pub mod config;
pub mod guard;
pub mod host;
pub mod manager;
pub mod notebook_config;
pub mod runner;
pub mod secret;

pub use config::Config;
pub use manager::{Context, JupyterManager, ManagerError};
pub use runner::{CommandRunner, Invocation, SystemRunner};
