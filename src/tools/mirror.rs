//! Mirroring tool
//!
//! One-way directory sync: after a successful run the destination holds
//! exactly what the source holds, extraneous destination entries included.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::error::JadeResult;

use super::{run_status, ToolStatus};

/// One-way directory synchronisation
pub trait Mirror {
    /// Make `destination` an exact copy of `source`
    ///
    /// Both sides are locations the tool understands (local paths or
    /// `host:path`). A source ending in `/` means "the contents of".
    fn mirror(&self, source: &str, destination: &str) -> JadeResult<ToolStatus>;
}

/// [`Mirror`] backed by the `rsync` binary
#[derive(Debug, Clone)]
pub struct RsyncMirror {
    binary: PathBuf,
    args: Vec<String>,
}

impl RsyncMirror {
    pub fn new(binary: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            binary: binary.into(),
            args,
        }
    }
}

impl Default for RsyncMirror {
    fn default() -> Self {
        Self::new("rsync", vec!["-az".into(), "--delete".into()])
    }
}

impl Mirror for RsyncMirror {
    fn mirror(&self, source: &str, destination: &str) -> JadeResult<ToolStatus> {
        let mut cmd = Command::new(&self.binary);
        cmd.stdin(Stdio::null())
            .args(&self.args)
            .arg(source)
            .arg(destination);
        run_status(cmd)
    }
}
