// src/exec/operation.rs

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use tokio::process::Command;

/// A single external command invocation request.
///
/// Carries everything the runner needs: program, argument list, working
/// directory, and per-child environment overrides. The argument list is
/// fixed once the value is built; environment overrides apply only to the
/// spawned child, never to this process.
#[derive(Debug, Clone)]
pub struct Operation {
    program: String,
    args: Vec<String>,
    cwd: Option<PathBuf>,
    /// `Some(value)` sets the variable for the child, `None` removes it
    /// from the inherited environment.
    env: BTreeMap<String, Option<String>>,
    use_shell: bool,
}

impl Operation {
    /// An operation that executes `program` directly (no shell involved).
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: BTreeMap::new(),
            use_shell: false,
        }
    }

    /// An operation that hands `command_line` to the platform shell
    /// (`sh -c` on unix, `cmd /C` on windows). The whole line lives in
    /// `command_line`; `arg` is not meant to be combined with this.
    pub fn shell(command_line: impl Into<String>) -> Self {
        Self {
            program: command_line.into(),
            args: Vec::new(),
            cwd: None,
            env: BTreeMap::new(),
            use_shell: true,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Set an environment variable for the child only.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), Some(value.into()));
        self
    }

    /// Remove a variable from the child's inherited environment.
    pub fn env_remove(mut self, key: impl Into<String>) -> Self {
        self.env.insert(key.into(), None);
        self
    }

    pub fn working_dir(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    /// Build the `tokio::process::Command` for this operation.
    pub(crate) fn to_command(&self) -> Command {
        let mut cmd = if self.use_shell {
            if cfg!(windows) {
                let mut c = Command::new("cmd");
                c.arg("/C").arg(&self.program);
                c
            } else {
                let mut c = Command::new("sh");
                c.arg("-c").arg(&self.program);
                c
            }
        } else {
            let mut c = Command::new(&self.program);
            c.args(&self.args);
            c
        };

        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }

        for (key, value) in &self.env {
            match value {
                Some(value) => {
                    cmd.env(key, value);
                }
                None => {
                    cmd.env_remove(key);
                }
            }
        }

        cmd
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}
