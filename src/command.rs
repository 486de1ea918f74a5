use core::fmt;
use std::{
    borrow::Cow,
    fmt::{Debug, Display},
    path::{Path, PathBuf},
    process::{ExitStatus, Stdio},
    str::Utf8Error,
};

use serde::{Deserialize, Serialize};
use stacked_errors::{bail_locationless, Result, StackableErr};
use tokio::{fs, process};

/// An OS command, a thin wrapper around `tokio::process::Command`.
///
/// The default configuration is to inherit the current process's environment
/// and working directory. The child is always run with a null stdin and piped
/// stdout/stderr, blocking until it exits; there is no timeout or termination
/// facility, a hung child hangs the caller.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Command {
    /// The program to run.
    pub program: String,
    /// All the arguments that will be passed to the program
    pub args: Vec<String>,
    /// If set, the environment variable map is cleared (before the `envs` are
    /// applied)
    pub env_clear: bool,
    /// Environment variable mappings
    pub envs: Vec<(String, String)>,
    /// Working directory for the process, canonicalized when the `Command` is
    /// run
    pub cwd: Option<PathBuf>,
}

impl Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("Command {{ program: {:?},", self.unified()))?;
        if self.env_clear {
            f.write_fmt(format_args!(" env_clear: true,"))?;
        }
        if !self.envs.is_empty() {
            f.write_fmt(format_args!(" envs: {:?},", self.envs))?;
        }
        if let Some(cwd) = &self.cwd {
            f.write_fmt(format_args!(" cwd: {cwd:?},"))?;
        }
        f.write_fmt(format_args!(" }}"))
    }
}

impl Command {
    /// Creates a `Command` that only sets the `program` and `args` and leaves
    /// other things as their default values. `program_with_args` is separated
    /// by whitespace, the first part becomes the program, and the others are
    /// inserted as args.
    ///
    /// In case an argument has spaces, it should be pushed with [Command::arg]
    /// as an unbroken `&str` instead.
    pub fn new(program_with_args: impl AsRef<str>) -> Self {
        let mut program = String::new();
        let mut args: Vec<String> = vec![];
        for (i, part) in program_with_args.as_ref().split_whitespace().enumerate() {
            if i == 0 {
                part.clone_into(&mut program)
            } else {
                args.push(part.into());
            }
        }
        Self {
            program,
            args,
            ..Default::default()
        }
    }

    /// Adds an argument
    pub fn arg(mut self, arg: impl AsRef<str>) -> Self {
        self.args.push(arg.as_ref().into());
        self
    }

    /// Adds arguments to be passed to the program
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.args
            .extend(args.into_iter().map(|s| s.as_ref().into()));
        self
    }

    /// Sets `self.cwd`
    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_owned());
        self
    }

    /// Set if environment variables should be cleared
    pub fn env_clear(mut self, env_clear: bool) -> Self {
        self.env_clear = env_clear;
        self
    }

    /// Adds an environment variable
    pub fn env(mut self, env_key: impl AsRef<str>, env_val: impl AsRef<str>) -> Self {
        self.envs
            .push((env_key.as_ref().into(), env_val.as_ref().into()));
        self
    }

    /// Gets the program and args interspersed with spaces
    pub fn unified(&self) -> String {
        let mut command = self.program.clone();
        for arg in &self.args {
            command += " ";
            command += arg;
        }
        command
    }

    /// Spawns the command and waits for it to exit, capturing stdout and
    /// stderr. Errors only if OS calls failed (spawning, waiting); check the
    /// status on the [CommandResult] to see if the command itself succeeded.
    pub async fn run_to_completion(self) -> Result<CommandResult> {
        let mut cmd = process::Command::new(&self.program);
        if self.env_clear {
            // must happen before the `envs` call
            cmd.env_clear();
        }
        if let Some(ref cwd) = self.cwd {
            let cwd = fs::canonicalize(cwd).await.stack_err_with_locationless(|| {
                format!("{self:?}.run_to_completion() -> failed to acquire working directory")
            })?;
            cmd.current_dir(cwd);
        }
        let output = cmd
            .args(&self.args)
            .envs(self.envs.iter().map(|x| (&x.0, &x.1)))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .stack_err_with_locationless(|| {
                format!("{self:?}.run_to_completion() -> failed to run child process")
            })?;
        Ok(CommandResult {
            command: self,
            status: output.status,
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

/// The result of a [Command](crate::Command)
#[must_use]
#[derive(Clone)]
pub struct CommandResult {
    // the command information is kept around for failures
    pub command: Command,
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl Debug for CommandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!(
            "CommandResult {{\ncommand: {:?},\nstatus: {:?},\n",
            self.command, self.status
        ))?;
        // move the commas out of the way of the stdout and stderr
        let stdout = self.stdout_as_utf8_lossy();
        if !stdout.is_empty() {
            f.write_fmt(format_args!("stdout: {}\n,", stdout))?;
        }
        let stderr = self.stderr_as_utf8_lossy();
        if !stderr.is_empty() {
            f.write_fmt(format_args!("stderr: {}\n,", stderr))?;
        }
        f.write_fmt(format_args!("}}"))
    }
}

impl Display for CommandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("{:#?}", self))
    }
}

impl CommandResult {
    /// Returns if the command exited with a successful return status
    pub fn successful(&self) -> bool {
        self.status.success()
    }

    /// Returns a formatted error with relevant information if the command was
    /// not successful
    pub fn assert_success(&self) -> Result<()> {
        if self.status.success() {
            Ok(())
        } else {
            bail_locationless!("{self:#?}.assert_success() -> unsuccessful")
        }
    }

    /// Returns `str::from_utf8(&self.stdout)`
    pub fn stdout_as_utf8(&self) -> std::result::Result<&str, Utf8Error> {
        std::str::from_utf8(&self.stdout)
    }

    /// Returns `str::from_utf8(&self.stderr)`
    pub fn stderr_as_utf8(&self) -> std::result::Result<&str, Utf8Error> {
        std::str::from_utf8(&self.stderr)
    }

    /// Returns `String::from_utf8_lossy(&self.stdout)`
    pub fn stdout_as_utf8_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stdout)
    }

    /// Returns `String::from_utf8_lossy(&self.stderr)`
    pub fn stderr_as_utf8_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stderr)
    }

    /// The captured stdout followed by the captured stderr, lossily decoded.
    /// The two streams are captured separately, so interleaving relative to
    /// each other is not preserved.
    pub fn combined_output_lossy(&self) -> String {
        let mut combined = self.stdout_as_utf8_lossy().into_owned();
        combined += self.stderr_as_utf8_lossy().as_ref();
        combined
    }
}
