//! External command execution.
//!
//! Every helm call goes through [`CommandRunner`] so the deployer never
//! spawns processes itself.

use smoketest_config::SmoketestError;
use std::io;
use std::process::Command as StdCommand;
use tracing::debug;

/// Outcome of an external command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStatus {
    pub code: i32,
}

impl RunStatus {
    #[must_use]
    pub const fn success() -> Self {
        Self { code: 0 }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.code == 0
    }
}

pub trait CommandRunner {
    /// Run `argv[0]` with the remaining elements as its arguments
    ///
    /// # Errors
    ///
    /// Returns `SmoketestError::CommandNotFound` if the command cannot be started
    fn run(&mut self, argv: &[String]) -> Result<RunStatus, SmoketestError>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for Box<R> {
    fn run(&mut self, argv: &[String]) -> Result<RunStatus, SmoketestError> {
        (**self).run(argv)
    }
}

/// Spawns the command and blocks until it exits. Standard streams are
/// inherited, so the tool's output goes straight to the terminal.
#[derive(Debug, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&mut self, argv: &[String]) -> Result<RunStatus, SmoketestError> {
        let Some((program, args)) = argv.split_first() else {
            return Err(SmoketestError::command_not_found(
                "",
                io::Error::new(io::ErrorKind::InvalidInput, "empty command line"),
            ));
        };

        debug!(?argv, "spawning");
        let status = StdCommand::new(program)
            .args(args)
            .status()
            .map_err(|e| SmoketestError::command_not_found(program, e))?;

        // No code when killed by a signal
        Ok(RunStatus {
            code: status.code().unwrap_or(-1),
        })
    }
}

/// Prints the command line instead of running it
#[derive(Debug, Default)]
pub struct DryRunRunner;

impl DryRunRunner {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl CommandRunner for DryRunRunner {
    fn run(&mut self, argv: &[String]) -> Result<RunStatus, SmoketestError> {
        println!("{}", argv.join(" "));
        Ok(RunStatus::success())
    }
}

/// Records every command line and answers with a fixed exit code.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    calls: Vec<Vec<String>>,
    code: i32,
}

impl RecordingRunner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_exit_code(code: i32) -> Self {
        Self {
            calls: Vec::new(),
            code,
        }
    }

    #[must_use]
    pub fn calls(&self) -> &[Vec<String>] {
        &self.calls
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&mut self, argv: &[String]) -> Result<RunStatus, SmoketestError> {
        self.calls.push(argv.to_vec());
        Ok(RunStatus { code: self.code })
    }
}
