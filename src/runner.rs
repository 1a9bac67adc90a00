use std::fmt;
use std::process::{Command, ExitStatus, Stdio};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Failed to execute `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{command}` failed with {status}")]
    Failed { command: String, status: ExitStatus },
}

impl CommandError {
    /// Exit code of the failed child process, if it exited normally.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            CommandError::Spawn { .. } => None,
            CommandError::Failed { status, .. } => status.code(),
        }
    }
}

/// One external program call: the program and its arguments, never a shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(|s| s.as_ref().to_string()).collect(),
        }
    }

    pub fn has_arg(&self, arg: &str) -> bool {
        self.args.iter().any(|a| a == arg)
    }

    /// Whether `args` appear consecutively somewhere in the argument list.
    pub fn has_args(&self, args: &[&str]) -> bool {
        !args.is_empty()
            && self
                .args
                .windows(args.len())
                .any(|window| window.iter().zip(args).all(|(a, b)| a == b))
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Runs external commands on behalf of the dispatcher.
pub trait CommandRunner {
    /// Runs the command with inherited stdio so its output reaches the console.
    fn run(&self, invocation: &Invocation) -> Result<(), CommandError>;

    /// Runs the command and returns its captured stdout.
    fn output(&self, invocation: &Invocation) -> Result<String, CommandError>;
}

/// Spawns real child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }

    fn command(invocation: &Invocation) -> Command {
        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args);
        command
    }

    fn spawn_error(invocation: &Invocation) -> impl FnOnce(std::io::Error) -> CommandError + '_ {
        move |source| CommandError::Spawn {
            command: invocation.to_string(),
            source,
        }
    }

    fn check_status(invocation: &Invocation, status: ExitStatus) -> Result<(), CommandError> {
        if let Some(code) = status.code() {
            if code == 0 {
                info!("Command completed with exit code: {}", code);
            } else {
                warn!("Command completed with non-zero exit code: {}", code);
            }
        } else {
            warn!("Command terminated by signal");
        }

        if status.success() {
            Ok(())
        } else {
            Err(CommandError::Failed {
                command: invocation.to_string(),
                status,
            })
        }
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<(), CommandError> {
        info!("Running: {}", invocation);
        let status = Self::command(invocation)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(Self::spawn_error(invocation))?;

        Self::check_status(invocation, status)
    }

    fn output(&self, invocation: &Invocation) -> Result<String, CommandError> {
        debug!("Querying: {}", invocation);
        let output = Self::command(invocation)
            .stdin(Stdio::null())
            .stderr(Stdio::inherit())
            .output()
            .map_err(Self::spawn_error(invocation))?;

        Self::check_status(invocation, output.status)?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
