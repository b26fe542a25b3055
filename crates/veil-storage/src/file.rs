//! Crash-safe JSON file access
//!
//! Writes go to a hidden sibling temp file which is synced and then renamed
//! over the target, so a reader only ever sees the old or the new contents.

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use crate::error::StorageError;
use crate::Result;

pub struct JsonFile<T> {
    path: PathBuf,
    /// Held shared by loads and exclusively by saves
    lock: RwLock<()>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonFile<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: RwLock::new(()),
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load and deserialize the file.
    ///
    /// Returns `Ok(None)` when the file is absent, and `StorageError::Corrupt`
    /// when it exists but does not parse (an empty or truncated file included).
    pub fn load(&self) -> Result<Option<T>> {
        let _guard = self.lock.read();

        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| StorageError::Corrupt {
                path: self.path.clone(),
                source,
            })
    }

    /// Serialize `value` and atomically replace the file with it.
    pub fn save(&self, value: &T) -> Result<()> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        value
            .serialize(&mut serializer)
            .map_err(StorageError::Serialize)?;

        let _guard = self.lock.write();

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp_path = self.temp_path();
        if let Err(e) = write_synced(&tmp_path, &buf) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        fs::rename(&tmp_path, &self.path)?;

        tracing::debug!(path = %self.path.display(), bytes = buf.len(), "Saved store file");

        Ok(())
    }

    /// Move an unreadable file out of the way so the next save cannot
    /// overwrite it. Returns where it was moved to.
    pub fn quarantine(&self) -> Result<PathBuf> {
        let _guard = self.lock.write();

        let mut target = self.path.clone().into_os_string();
        target.push(".corrupt");
        let target = PathBuf::from(target);

        fs::rename(&self.path, &target)?;
        Ok(target)
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "store".to_string());
        self.path.with_file_name(format!(".{}.tmp", name))
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}
