//! On-disk bundle store.
//!
//! Layout: `{output_dir}/{YYYY-MM-DD}/{YYYY-MM-DD}_{file_name}`
//!
//! Writes are all-or-nothing per bundle: every payload is staged as
//! `{file}.part`, existing files are moved aside to `{file}.prev`, then the
//! parts are renamed into place. On any I/O failure the attempt is rolled
//! back: parts and freshly committed files are removed and the previous
//! files are restored. A date directory never holds part of a bundle, and a
//! failed re-download leaves an earlier complete bundle untouched.

use super::key_index::KeyIndex;
use super::locator::ResourceName;
use super::provider::DataError;
use chrono::NaiveDate;
use serde::Serialize;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// One file written to disk.
#[derive(Debug, Clone, Serialize)]
pub struct PersistedFile {
    pub resource: ResourceName,
    pub path: PathBuf,
    pub bytes: u64,
}

/// A complete bundle on disk.
#[derive(Debug, Clone, Serialize)]
pub struct PersistedBundle {
    pub date: NaiveDate,
    pub key: KeyIndex,
    pub dir: PathBuf,
    pub files: Vec<PersistedFile>,
}

impl PersistedBundle {
    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.bytes).sum()
    }
}

/// The bundle store.
#[derive(Debug, Clone)]
pub struct BundleStore {
    root: PathBuf,
}

impl BundleStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory for a date: `{root}/{YYYY-MM-DD}/`
    pub fn date_dir(&self, date: NaiveDate) -> PathBuf {
        self.root.join(date.format("%Y-%m-%d").to_string())
    }

    /// Final path of one role's file for a date.
    pub fn file_path(&self, date: NaiveDate, resource: ResourceName) -> PathBuf {
        self.date_dir(date)
            .join(format!("{}_{}", date.format("%Y-%m-%d"), resource.file_name()))
    }

    /// Persist a validated bundle.
    pub fn write_bundle(
        &self,
        date: NaiveDate,
        key: KeyIndex,
        payloads: &[(ResourceName, &[u8])],
    ) -> Result<PersistedBundle, DataError> {
        let dir = self.date_dir(date);
        let created_dir = !dir.exists();
        fs::create_dir_all(&dir)
            .map_err(|e| DataError::Storage(format!("failed to create {}: {e}", dir.display())))?;

        let targets: Vec<(ResourceName, PathBuf, PathBuf)> = payloads
            .iter()
            .map(|(resource, _)| {
                let path = self.file_path(date, *resource);
                let part = part_path(&path);
                (*resource, path, part)
            })
            .collect();

        let mut journal = Journal::default();
        match stage_and_commit(payloads, &targets, &mut journal) {
            Ok(files) => {
                journal.discard_displaced();
                Ok(PersistedBundle {
                    date,
                    key,
                    dir,
                    files,
                })
            }
            Err(e) => {
                journal.roll_back(&targets);
                if created_dir {
                    let _ = fs::remove_dir(&dir);
                }
                Err(e)
            }
        }
    }

    /// Files currently present for a date (empty if the directory is missing).
    pub fn list(&self, date: NaiveDate) -> Result<Vec<PathBuf>, DataError> {
        let dir = self.date_dir(date);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut paths = Vec::new();
        for entry in
            fs::read_dir(&dir).map_err(|e| DataError::Storage(format!("read dir: {e}")))?
        {
            let entry = entry.map_err(|e| DataError::Storage(format!("dir entry: {e}")))?;
            paths.push(entry.path());
        }
        paths.sort();
        Ok(paths)
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

fn part_path(path: &Path) -> PathBuf {
    with_suffix(path, ".part")
}

/// What one write attempt changed on disk.
#[derive(Default)]
struct Journal {
    /// Final paths this attempt renamed a part onto.
    committed: Vec<PathBuf>,
    /// `(final, aside)` pairs for files that existed before the attempt.
    displaced: Vec<(PathBuf, PathBuf)>,
}

impl Journal {
    fn roll_back(&self, targets: &[(ResourceName, PathBuf, PathBuf)]) {
        for (_, _, part) in targets {
            let _ = fs::remove_file(part);
        }
        for path in &self.committed {
            let _ = fs::remove_file(path);
        }
        for (path, aside) in &self.displaced {
            let _ = fs::rename(aside, path);
        }
    }

    fn discard_displaced(&self) {
        for (_, aside) in &self.displaced {
            let _ = fs::remove_file(aside);
        }
    }
}

/// Write every `.part` file, move existing files aside, then rename all
/// parts into place.
fn stage_and_commit(
    payloads: &[(ResourceName, &[u8])],
    targets: &[(ResourceName, PathBuf, PathBuf)],
    journal: &mut Journal,
) -> Result<Vec<PersistedFile>, DataError> {
    for ((_, bytes), (_, _, part)) in payloads.iter().zip(targets) {
        fs::write(part, bytes)
            .map_err(|e| DataError::Storage(format!("write {}: {e}", part.display())))?;
    }

    for (_, path, _) in targets {
        if path.is_file() {
            let aside = with_suffix(path, ".prev");
            fs::rename(path, &aside).map_err(|e| {
                DataError::Storage(format!("move aside {}: {e}", path.display()))
            })?;
            journal.displaced.push((path.clone(), aside));
        }
    }

    let mut files = Vec::with_capacity(targets.len());
    for ((_, bytes), (resource, path, part)) in payloads.iter().zip(targets) {
        fs::rename(part, path)
            .map_err(|e| DataError::Storage(format!("atomic rename failed: {e}")))?;
        journal.committed.push(path.clone());
        files.push(PersistedFile {
            resource: *resource,
            path: path.clone(),
            bytes: bytes.len() as u64,
        });
    }
    Ok(files)
}
