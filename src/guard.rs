use thiserror::Error;

/// Environment variable conda sets to the name of the active environment.
pub const ACTIVE_ENV_VAR: &str = "CONDA_DEFAULT_ENV";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GuardError {
    #[error("No active conda environment (CONDA_DEFAULT_ENV is unset); activate '{required}' first")]
    NoActiveEnvironment { required: String },
    #[error("Active conda environment is '{active}', but '{required}' is required; run `conda activate {required}` first")]
    WrongEnvironment { active: String, required: String },
}

/// Checks that the active conda environment is the required baseline.
pub fn check_active_environment(active: Option<&str>, required: &str) -> Result<(), GuardError> {
    match active {
        None => Err(GuardError::NoActiveEnvironment {
            required: required.to_string(),
        }),
        Some(active) if active == required => Ok(()),
        Some(active) => Err(GuardError::WrongEnvironment {
            active: active.to_string(),
            required: required.to_string(),
        }),
    }
}
