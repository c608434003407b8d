//! Command execution seam.

use std::process::Command;
use std::sync::Mutex;

use tracing::debug;

use crate::error::{HostError, HostResult};

/// Captured result of a finished command.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn ok(stdout: &str) -> Self {
        Self {
            success: true,
            code: Some(0),
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }

    pub fn failed(code: i32, stderr: &str) -> Self {
        Self {
            success: false,
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.to_string(),
        }
    }
}

/// Runs external programs.
pub trait CommandRunner {
    /// Run `program` with `args` and capture its output. A non-zero exit is
    /// not an error here; only failing to spawn is.
    fn run(&self, program: &str, args: &[&str]) -> HostResult<CommandOutput>;

    /// Run and require a zero exit, returning stdout.
    fn check(&self, program: &str, args: &[&str]) -> HostResult<String> {
        let output = self.run(program, args)?;
        if output.success {
            Ok(output.stdout)
        } else {
            Err(HostError::Failed {
                command: render(program, args),
                code: output.code,
                stderr: output.stderr.trim().to_string(),
            })
        }
    }
}

pub(crate) fn render(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Runs commands on the local machine.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str]) -> HostResult<CommandOutput> {
        debug!(command = %render(program, args), "running");
        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|source| HostError::Spawn {
                program: program.to_string(),
                source,
            })?;
        Ok(CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Records every invocation and answers from canned responses.
///
/// A response applies to any command line starting with its prefix; the
/// most recently added matching response wins. Unmatched commands succeed
/// with empty output.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    calls: Mutex<Vec<String>>,
    responses: Mutex<Vec<(String, CommandOutput)>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer commands starting with `prefix` with `output`.
    pub fn respond(&self, prefix: &str, output: CommandOutput) -> &Self {
        if let Ok(mut responses) = self.responses.lock() {
            responses.push((prefix.to_string(), output));
        }
        self
    }

    /// Make commands starting with `prefix` exit non-zero.
    pub fn fail(&self, prefix: &str) -> &Self {
        self.respond(prefix, CommandOutput::failed(1, "scripted failure"))
    }

    /// Every command line run so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Number of command lines run that start with `prefix`.
    pub fn count(&self, prefix: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    pub fn clear_calls(&self) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.clear();
        }
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, program: &str, args: &[&str]) -> HostResult<CommandOutput> {
        let line = render(program, args);
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(line.clone());
        }
        let output = self
            .responses
            .lock()
            .ok()
            .and_then(|responses| {
                responses
                    .iter()
                    .rev()
                    .find(|(prefix, _)| line.starts_with(prefix.as_str()))
                    .map(|(_, output)| output.clone())
            })
            .unwrap_or_else(|| CommandOutput::ok(""));
        Ok(output)
    }
}
