//! External tool capabilities
//!
//! The ledger and sync engine never spawn processes directly. They talk to an
//! [`Archiver`] and a [`Mirror`], so tests can swap in fakes that record calls
//! and simulate failing exit codes.

pub mod archiver;
pub mod mirror;

pub use archiver::{Archiver, TarArchiver};
pub use mirror::{Mirror, RsyncMirror};

use std::fmt;
use std::process::{Command, ExitStatus};

use crate::error::{JadeError, JadeResult};

/// Exit status of an external tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolStatus(i32);

impl ToolStatus {
    /// Wrap a raw exit code
    #[cfg(test)]
    pub(crate) fn from_code(code: i32) -> Self {
        Self(code)
    }

    /// Whether the tool exited with code 0
    pub fn success(self) -> bool {
        self.0 == 0
    }

    /// Raw exit code; `-1` when the process was killed by a signal
    pub fn code(self) -> i32 {
        self.0
    }
}

impl From<ExitStatus> for ToolStatus {
    fn from(status: ExitStatus) -> Self {
        Self(status.code().unwrap_or(-1))
    }
}

impl fmt::Display for ToolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "exit code {}", self.0)
    }
}

/// Run a command to completion, blocking without a timeout
fn run_status(mut cmd: Command) -> JadeResult<ToolStatus> {
    let program = cmd.get_program().to_string_lossy().into_owned();
    tracing::debug!(command = %command_string(&cmd), "running external tool");

    let status = cmd
        .status()
        .map_err(|e| JadeError::Io(format!("Failed to run {}: {}", program, e)))?;
    Ok(status.into())
}

/// Render a command line for logs
fn command_string(cmd: &Command) -> String {
    std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(|part| part.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_status() {
        assert!(ToolStatus::from_code(0).success());
        let failed = ToolStatus::from_code(2);
        assert!(!failed.success());
        assert_eq!(failed.code(), 2);
        assert_eq!(failed.to_string(), "exit code 2");
    }

    #[test]
    fn test_command_string() {
        let mut cmd = Command::new("tar");
        cmd.arg("-czPf").arg("/s/1.tar.gz").arg("/home/me");
        assert_eq!(command_string(&cmd), "tar -czPf /s/1.tar.gz /home/me");
    }
}
