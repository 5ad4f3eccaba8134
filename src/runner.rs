//! External command execution
//!
//! Every check shells out to the Flutter toolchain. The [`CommandRunner`]
//! trait is the seam between the checks and the process table, so checks can
//! be driven by canned output in tests.

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from running an external command
#[derive(Error, Debug)]
pub enum RunError {
    #[error("Empty command")]
    EmptyCommand,

    #[error("{program} not found. Please install it first.")]
    NotFound { program: String },

    #[error("Failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} timed out after {secs}s")]
    TimedOut { command: String, secs: u64 },

    #[error("Command failed: {command}")]
    Failed { command: String, code: Option<i32> },
}

/// Captured output of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Display form of the command line
    pub command: String,
    /// Trimmed standard output
    pub stdout: String,
    /// Trimmed standard error
    pub stderr: String,
    /// Exit code, `None` if killed by a signal
    pub code: Option<i32>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Turn a non-zero exit into [`RunError::Failed`].
    pub fn ensure_success(self) -> Result<Self, RunError> {
        if self.success() {
            Ok(self)
        } else {
            Err(RunError::Failed {
                command: self.command,
                code: self.code,
            })
        }
    }
}

/// Runs commands on behalf of the checks
pub trait CommandRunner {
    fn run(&self, argv: &[String], cwd: &Path) -> Result<CommandOutput, RunError>;
}

/// Runs real processes, optionally with a timeout
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    /// 0 = no timeout
    pub timeout_secs: u64,
}

impl ProcessRunner {
    pub fn new(timeout_secs: u64) -> Self {
        Self { timeout_secs }
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, argv: &[String], cwd: &Path) -> Result<CommandOutput, RunError> {
        let (program, args) = argv.split_first().ok_or(RunError::EmptyCommand)?;
        let command_line = argv.join(" ");

        debug!("Running {} in {}", command_line, cwd.display());

        let child = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    RunError::NotFound {
                        program: program.clone(),
                    }
                } else {
                    RunError::Spawn {
                        command: command_line.clone(),
                        source: e,
                    }
                }
            })?;

        if self.timeout_secs > 0 {
            wait_with_timeout(child, command_line, self.timeout_secs)
        } else {
            let output = child.wait_with_output().map_err(|e| RunError::Spawn {
                command: command_line.clone(),
                source: e,
            })?;
            Ok(CommandOutput {
                command: command_line,
                stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                code: output.status.code(),
            })
        }
    }
}

/// Poll the child until it exits or the deadline passes.
///
/// Pipes are drained on reader threads so a chatty process cannot block on a
/// full pipe while we wait for it.
fn wait_with_timeout(
    mut child: Child,
    command: String,
    timeout_secs: u64,
) -> Result<CommandOutput, RunError> {
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let start = Instant::now();
    let timeout = Duration::from_secs(timeout_secs);

    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                return Ok(CommandOutput {
                    command,
                    stdout: join_reader(stdout),
                    stderr: join_reader(stderr),
                    code: status.code(),
                });
            }
            Ok(None) => {
                if start.elapsed() > timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    warn!("{} timed out after {}s", command, timeout_secs);
                    return Err(RunError::TimedOut {
                        command,
                        secs: timeout_secs,
                    });
                }
                thread::sleep(Duration::from_millis(100));
            }
            Err(e) => {
                return Err(RunError::Spawn { command, source: e });
            }
        }
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<thread::JoinHandle<String>> {
    pipe.map(|mut r| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = r.read_to_end(&mut buf);
            String::from_utf8_lossy(&buf).trim().to_string()
        })
    })
}

fn join_reader(handle: Option<thread::JoinHandle<String>>) -> String {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}

/// Split a configured command such as `fvm flutter` into argv.
pub fn split_command(command: &str) -> Vec<String> {
    command.split_whitespace().map(str::to_string).collect()
}

/// `base` argv followed by `args`
pub fn with_args(base: &[String], args: &[&str]) -> Vec<String> {
    base.iter()
        .cloned()
        .chain(args.iter().map(|a| a.to_string()))
        .collect()
}
