//! Fakes and fixtures shared by unit tests

use std::cell::{Cell, RefCell};
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::config::paths::StorePaths;
use crate::error::JadeResult;
use crate::storage::create_store;
use crate::tools::{Archiver, Mirror, ToolStatus};

/// One recorded archiver invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiverCall {
    Create { source: PathBuf, archive: PathBuf },
    Extract { archive: PathBuf, target: PathBuf },
    List { archive: PathBuf },
}

/// Archiver that writes a small deterministic blob instead of a tarball
#[derive(Debug, Default)]
pub struct FakeArchiver {
    pub calls: RefCell<Vec<ArchiverCall>>,
    /// Exit code returned by `create`
    pub create_code: Cell<i32>,
    /// Leave a half-written blob behind when `create` fails
    pub partial_on_failure: Cell<bool>,
    /// Exit code returned by `extract`
    pub extract_code: Cell<i32>,
    /// Members returned by `list`
    pub members: RefCell<Vec<String>>,
}

impl FakeArchiver {
    pub fn blob_for(source: &Path) -> Vec<u8> {
        format!("archive of {}", source.display()).into_bytes()
    }

    pub fn extract_calls(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| matches!(c, ArchiverCall::Extract { .. }))
            .count()
    }

    pub fn list_calls(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| matches!(c, ArchiverCall::List { .. }))
            .count()
    }
}

impl Archiver for FakeArchiver {
    fn create(&self, source: &Path, archive: &Path) -> JadeResult<ToolStatus> {
        self.calls.borrow_mut().push(ArchiverCall::Create {
            source: source.to_path_buf(),
            archive: archive.to_path_buf(),
        });

        let status = ToolStatus::from_code(self.create_code.get());
        if status.success() {
            fs::write(archive, Self::blob_for(source))?;
        } else if self.partial_on_failure.get() {
            fs::write(archive, b"partial")?;
        }
        Ok(status)
    }

    fn extract(&self, archive: &Path, target: &Path) -> JadeResult<ToolStatus> {
        self.calls.borrow_mut().push(ArchiverCall::Extract {
            archive: archive.to_path_buf(),
            target: target.to_path_buf(),
        });
        Ok(ToolStatus::from_code(self.extract_code.get()))
    }

    fn list(&self, archive: &Path) -> JadeResult<Vec<String>> {
        self.calls.borrow_mut().push(ArchiverCall::List {
            archive: archive.to_path_buf(),
        });
        Ok(self.members.borrow().clone())
    }
}

/// Mirror that copies local directory trees
#[derive(Debug, Default)]
pub struct FakeMirror {
    pub calls: RefCell<Vec<(String, String)>>,
    /// Exit code to simulate; on failure a stray file is left in the destination
    pub exit_code: Cell<i32>,
}

impl Mirror for FakeMirror {
    fn mirror(&self, source: &str, destination: &str) -> JadeResult<ToolStatus> {
        self.calls
            .borrow_mut()
            .push((source.to_string(), destination.to_string()));

        let destination = Path::new(destination);
        let status = ToolStatus::from_code(self.exit_code.get());
        if !status.success() {
            fs::create_dir_all(destination)?;
            fs::write(destination.join("partial-transfer"), b"partial")?;
            return Ok(status);
        }

        if destination.exists() {
            fs::remove_dir_all(destination)?;
        }
        copy_tree(Path::new(source.trim_end_matches('/')), destination)?;
        Ok(status)
    }
}

/// Recursively copy a directory
pub fn copy_tree(from: &Path, to: &Path) -> std::io::Result<()> {
    fs::create_dir_all(to)?;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let target = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_tree(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Every file below `dir` with its contents, sorted by path
pub fn snapshot_tree(dir: &Path) -> Vec<(PathBuf, Vec<u8>)> {
    let mut files = Vec::new();
    collect(dir, dir, &mut files);
    files.sort();
    files
}

fn collect(base: &Path, dir: &Path, files: &mut Vec<(PathBuf, Vec<u8>)>) {
    for entry in fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            collect(base, &path, files);
        } else {
            let relative = path.strip_prefix(base).unwrap().to_path_buf();
            files.push((relative, fs::read(&path).unwrap()));
        }
    }
}

/// A freshly created store inside a temp directory, plus a directory of
/// sample files to back up
pub struct Fixture {
    pub temp: TempDir,
    pub paths: StorePaths,
}

impl Fixture {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let paths = StorePaths::with_root(temp.path().join("store"));
        create_store(&paths).unwrap();
        Self { temp, paths }
    }

    /// Create a sample file under the fixture and return its path
    pub fn sample(&self, name: &str) -> PathBuf {
        let dir = self.temp.path().join("data");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, name.as_bytes()).unwrap();
        path
    }
}
