//! Archiving tool
//!
//! Blobs are gzip-compressed tarballs with absolute member names (`-P`), so an
//! archive of `/home/me/notes` extracts back to `/home/me/notes` and a single
//! member can be extracted by naming its absolute path.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{JadeError, JadeResult};

use super::{run_status, ToolStatus};

/// Produces, extracts and lists archive blobs
pub trait Archiver {
    /// Write an archive of `source` to `archive`
    fn create(&self, source: &Path, archive: &Path) -> JadeResult<ToolStatus>;

    /// Extract the member `target` (and everything below it) from `archive`
    fn extract(&self, archive: &Path, target: &Path) -> JadeResult<ToolStatus>;

    /// Member paths of `archive`, in archive order
    fn list(&self, archive: &Path) -> JadeResult<Vec<String>>;
}

/// [`Archiver`] backed by the `tar` binary
#[derive(Debug, Clone)]
pub struct TarArchiver {
    binary: PathBuf,
}

impl TarArchiver {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.stdin(Stdio::null());
        cmd
    }
}

impl Default for TarArchiver {
    fn default() -> Self {
        Self::new("tar")
    }
}

impl Archiver for TarArchiver {
    fn create(&self, source: &Path, archive: &Path) -> JadeResult<ToolStatus> {
        let mut cmd = self.command();
        cmd.arg("-czPf").arg(archive).arg(source);
        run_status(cmd)
    }

    fn extract(&self, archive: &Path, target: &Path) -> JadeResult<ToolStatus> {
        let mut cmd = self.command();
        cmd.arg("-xzPf").arg(archive).arg(target);
        run_status(cmd)
    }

    fn list(&self, archive: &Path) -> JadeResult<Vec<String>> {
        let output = self
            .command()
            .arg("-tzPf")
            .arg(archive)
            .stderr(Stdio::inherit())
            .output()
            .map_err(|e| JadeError::Io(format!("Failed to run {}: {}", self.binary.display(), e)))?;

        let status = ToolStatus::from(output.status);
        if !status.success() {
            return Err(JadeError::Io(format!(
                "Listing {} failed with {}",
                archive.display(),
                status
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn tar_available() -> bool {
        Command::new("tar")
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    #[test]
    fn test_tar_round_trip() {
        if !tar_available() {
            return;
        }

        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("docs");
        fs::create_dir(&source).unwrap();
        fs::write(source.join("a.txt"), b"alpha").unwrap();
        let archive = temp_dir.path().join("1.tar.gz");

        let archiver = TarArchiver::default();
        assert!(archiver.create(&source, &archive).unwrap().success());

        let members = archiver.list(&archive).unwrap();
        assert!(members.iter().any(|m| m.ends_with("docs/a.txt")));

        fs::remove_dir_all(&source).unwrap();
        assert!(archiver.extract(&archive, &source).unwrap().success());
        assert_eq!(fs::read(source.join("a.txt")).unwrap(), b"alpha");
    }

    #[test]
    fn test_tar_missing_source_fails() {
        if !tar_available() {
            return;
        }

        let temp_dir = TempDir::new().unwrap();
        let status = TarArchiver::default()
            .create(
                &temp_dir.path().join("missing"),
                &temp_dir.path().join("1.tar.gz"),
            )
            .unwrap();
        assert!(!status.success());
    }

    #[test]
    fn test_missing_binary_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let archiver = TarArchiver::new("/nonexistent/tar");
        let err = archiver
            .create(temp_dir.path(), &temp_dir.path().join("1.tar.gz"))
            .unwrap_err();
        assert!(matches!(err, JadeError::Io(_)));
    }
}
