//! JSON collection files
//!
//! A collection is a single pretty-printed JSON array rewritten wholesale on
//! every save. Writes go to a temporary file in the same directory which then
//! replaces the target, so an interrupted save never leaves a truncated file.

use crate::storage::merge::{merge_new, IdIndex, Unkeyed};
use crate::storage::{Keyed, StorageError, StorageResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::Permissions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Mode of a newly created collection file
#[cfg(unix)]
const NEW_FILE_MODE: u32 = 0o644;

/// Handle on one `{brand}_devices.json` collection file
#[derive(Debug, Clone)]
pub struct JsonCollection {
    path: PathBuf,
}

impl JsonCollection {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Loads every record of the collection
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<T>)` - The records in file order
    /// * `Err(StorageError::Missing)` - The file does not exist
    /// * `Err(StorageError::Json)` - The file exists but is not a valid array of `T`
    pub fn load<T: DeserializeOwned>(&self) -> StorageResult<Vec<T>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::Missing(self.path.clone()))
            }
            Err(source) => {
                return Err(StorageError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        serde_json::from_str(&content).map_err(|source| StorageError::Json {
            path: self.path.clone(),
            source,
        })
    }

    /// Like [`JsonCollection::load`], but a missing file is `Ok(None)`
    pub fn load_if_exists<T: DeserializeOwned>(&self) -> StorageResult<Option<Vec<T>>> {
        match self.load() {
            Ok(records) => Ok(Some(records)),
            Err(StorageError::Missing(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Replaces the collection with `records`
    ///
    /// The parent directory must already exist.
    pub fn save<T: Serialize>(&self, records: &[T]) -> StorageResult<()> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let io_err = |source| StorageError::Io {
            path: self.path.clone(),
            source,
        };

        let tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            write_pretty(&mut writer, records).map_err(|source| StorageError::Json {
                path: self.path.clone(),
                source,
            })?;
            writer.flush().map_err(io_err)?;
        }
        if let Some(permissions) = self.target_permissions() {
            tmp.as_file().set_permissions(permissions).map_err(io_err)?;
        }
        tmp.as_file().sync_all().map_err(io_err)?;

        tmp.persist(&self.path)
            .map_err(|source| StorageError::Persist {
                path: self.path.clone(),
                source,
            })?;

        tracing::debug!(
            "Wrote {} records to {}",
            records.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Permissions the saved file should carry
    ///
    /// A rewrite keeps the mode of the file it replaces. Temporary files are
    /// owner-only, so a new collection gets mode 0644 instead.
    fn target_permissions(&self) -> Option<Permissions> {
        if let Ok(metadata) = std::fs::metadata(&self.path) {
            return Some(metadata.permissions());
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            Some(Permissions::from_mode(NEW_FILE_MODE))
        }
        #[cfg(not(unix))]
        {
            None
        }
    }

    /// Merges `batch` into the records already on disk and rewrites the file
    ///
    /// Records whose id is already stored are dropped (first-seen wins);
    /// records without an id are always appended. An unreadable existing file
    /// is replaced rather than merged into.
    ///
    /// # Returns
    ///
    /// The number of records in the collection after the write.
    pub fn append_unique<T>(&self, batch: Vec<T>) -> StorageResult<usize>
    where
        T: Keyed + Serialize + DeserializeOwned,
    {
        let mut records: Vec<T> = match self.load_if_exists() {
            Ok(existing) => existing.unwrap_or_default(),
            Err(e) if e.is_corrupt() => {
                tracing::warn!("{}; creating a new collection", e);
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        let mut index = IdIndex::from_records(&records);
        let added = merge_new(&mut records, &mut index, batch, Unkeyed::Keep);
        self.save(&records)?;

        tracing::info!(
            "Appended {} records to {}. Total: {}",
            added,
            self.path.display(),
            records.len()
        );
        Ok(records.len())
    }

    /// Deletes the collection file, returning whether one existed
    pub fn remove(&self) -> StorageResult<bool> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(StorageError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

/// Serializes records as a JSON array indented with four spaces
///
/// Non-ASCII text is written as UTF-8, not escaped.
fn write_pretty<W: Write, T: Serialize>(writer: W, records: &[T]) -> serde_json::Result<()> {
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(writer, formatter);
    records.serialize(&mut serializer)
}
