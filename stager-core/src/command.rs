//! External command construction and execution

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;

use crate::{Error, Result};

/// Ordered command-line arguments
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options(Vec<String>);

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a flag followed by its values
    pub fn add<I, S>(&mut self, flag: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0.push(flag.into());
        self.0.extend(values.into_iter().map(Into::into));
    }

    /// Append a single argument
    pub fn push(&mut self, arg: impl Into<String>) {
        self.0.push(arg.into());
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn contains(&self, arg: &str) -> bool {
        self.0.iter().any(|a| a == arg)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for Options {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// An external program invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub path: String,
    pub options: Options,
    pub env: Vec<(String, String)>,
    pub dir: Option<PathBuf>,
}

impl Command {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            options: Options::new(),
            env: Vec::new(),
            dir: None,
        }
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn with_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Value of an environment override set on this command
    pub fn env_value(&self, key: &str) -> Option<&str> {
        self.env
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Run with `runner`, failing on a non-zero exit
    pub async fn run(&self, runner: &dyn ProcessRunner) -> Result<Output> {
        tracing::debug!(command = %self, "Running command");
        let output = runner.run(self).await?;
        if !output.success() {
            tracing::warn!(command = %self, code = ?output.code, "Command failed");
            return Err(Error::Process {
                command: self.to_string(),
                code: output.code,
                stdout: output.stdout,
                stderr: output.stderr,
            });
        }
        Ok(output)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)?;
        for arg in self.options.as_slice() {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Captured result of a finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Output {
    /// Exit code, `None` when killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl Output {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Executes commands; implementations must not interpret the exit code
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, command: &Command) -> Result<Output>;
}

/// Runs commands as child processes of this agent
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

#[async_trait]
impl ProcessRunner for SystemRunner {
    async fn run(&self, command: &Command) -> Result<Output> {
        let mut cmd = tokio::process::Command::new(&command.path);
        cmd.args(command.options.as_slice())
            .envs(command.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(ref dir) = command.dir {
            cmd.current_dir(dir);
        }

        let output = cmd.output().await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::Other(format!("Executable not found at '{}'", command.path))
            } else {
                Error::Io(e)
            }
        })?;

        Ok(Output {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
