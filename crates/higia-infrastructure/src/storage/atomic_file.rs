//! Atomic file operations for small TOML/JSON documents.
//!
//! Provides a thin layer for safe concurrent access to the config file and
//! the token store.

use higia_core::{HigiaError, Result};
use serde::{Serialize, de::DeserializeOwned};
use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// On-disk encoding of an [`AtomicFile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Toml,
    Json,
}

impl FileFormat {
    fn decode<T: DeserializeOwned>(self, content: &str) -> Result<T> {
        Ok(match self {
            FileFormat::Toml => toml::from_str(content)?,
            FileFormat::Json => serde_json::from_str(content)?,
        })
    }

    fn encode<T: Serialize>(self, data: &T) -> Result<String> {
        Ok(match self {
            FileFormat::Toml => toml::to_string_pretty(data)?,
            FileFormat::Json => serde_json::to_string_pretty(data)?,
        })
    }
}

/// A handle to a file that is replaced atomically on every write.
///
/// Provides:
/// - **Atomicity**: Updates are all-or-nothing via tmp file + atomic rename
/// - **Isolation**: `update` holds an exclusive lock across read-modify-write
/// - **Durability**: Explicit fsync before rename
#[derive(Debug)]
pub struct AtomicFile<T> {
    path: PathBuf,
    format: FileFormat,
    private: bool,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> Clone for AtomicFile<T> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            format: self.format,
            private: self.private,
            _phantom: PhantomData,
        }
    }
}

impl<T> AtomicFile<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: PathBuf, format: FileFormat) -> Self {
        Self {
            path,
            format,
            private: false,
            _phantom: PhantomData,
        }
    }

    /// Restricts the file to the owner (0600) on unix after every write.
    pub fn private(mut self) -> Self {
        self.private = true;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads and deserializes the file.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(T))`: Successfully loaded and deserialized
    /// - `Ok(None)`: File doesn't exist or is empty
    /// - `Err`: Failed to read or parse the file
    pub fn load(&self) -> Result<Option<T>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;

        if content.trim().is_empty() {
            return Ok(None);
        }

        self.format.decode(&content).map(Some)
    }

    /// Saves data atomically via a temporary file in the same directory.
    pub fn save(&self, data: &T) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let encoded = self.format.encode(data)?;

        let tmp_path = self.temp_path()?;
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(encoded.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        #[cfg(unix)]
        {
            if self.private {
                use std::os::unix::fs::PermissionsExt;
                fs::set_permissions(&tmp_path, fs::Permissions::from_mode(0o600))?;
            }
        }

        fs::rename(&tmp_path, &self.path)?;

        Ok(())
    }

    /// Performs a read-modify-write under an exclusive file lock.
    ///
    /// `f` receives the current data (or `default_value` if the file is
    /// missing); whatever it leaves behind is written back atomically.
    pub fn update<F, R>(&self, default_value: T, f: F) -> Result<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        let _lock = FileLock::acquire(&self.path)?;

        let mut data = self.load()?.unwrap_or(default_value);
        let result = f(&mut data);
        self.save(&data)?;

        Ok(result)
    }

    /// Like [`update`](Self::update), but content that no longer parses is
    /// logged and replaced by `default_value` instead of failing the write.
    pub fn update_or_reset<F, R>(&self, default_value: T, f: F) -> Result<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        let _lock = FileLock::acquire(&self.path)?;

        let mut data = match self.load() {
            Ok(data) => data.unwrap_or(default_value),
            Err(err @ HigiaError::Serialization { .. }) => {
                tracing::warn!(path = %self.path.display(), error = %err, "Discarding unreadable file");
                default_value
            }
            Err(err) => return Err(err),
        };
        let result = f(&mut data);
        self.save(&data)?;

        Ok(result)
    }

    /// Overwrites the file with `data` under the exclusive lock, without
    /// reading what was there.
    pub fn replace(&self, data: &T) -> Result<()> {
        let _lock = FileLock::acquire(&self.path)?;
        self.save(data)
    }

    fn temp_path(&self) -> Result<PathBuf> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| HigiaError::io("Path has no parent directory"))?;
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| HigiaError::io("Path has no file name"))?;

        Ok(parent.join(format!(".{}.tmp", file_name.to_string_lossy())))
    }
}

/// A file lock guard that releases the lock when dropped.
struct FileLock {
    #[allow(dead_code)]
    file: File,
    lock_path: PathBuf,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self> {
        let lock_path = path.with_extension("lock");

        if let Some(parent) = lock_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        #[cfg(unix)]
        {
            use fs2::FileExt;
            file.lock_exclusive()
                .map_err(|e| HigiaError::storage(format!("Failed to acquire lock: {}", e)))?;
        }

        Ok(FileLock { file, lock_path })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // Unlock is automatic when the file handle is dropped
        let _ = fs::remove_file(&self.lock_path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Settings {
        base_url: String,
        timeout_ms: u64,
    }

    #[test]
    fn test_toml_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicFile::<Settings>::new(temp_dir.path().join("config.toml"), FileFormat::Toml);

        let settings = Settings {
            base_url: "http://localhost:3000".into(),
            timeout_ms: 10_000,
        };
        file.save(&settings).unwrap();

        assert_eq!(file.load().unwrap(), Some(settings));
    }

    #[test]
    fn test_load_nonexistent_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicFile::<Settings>::new(temp_dir.path().join("missing.json"), FileFormat::Json);

        assert!(file.load().unwrap().is_none());
    }

    #[test]
    fn test_load_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.json");
        fs::write(&path, "{ invalid json").unwrap();

        let file = AtomicFile::<Settings>::new(path, FileFormat::Json);
        assert!(matches!(
            file.load(),
            Err(HigiaError::Serialization { ref format, .. }) if format == "JSON"
        ));
    }

    #[test]
    fn test_update_creates_and_modifies() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicFile::<BTreeMap<String, String>>::new(
            temp_dir.path().join("nested").join("kv.json"),
            FileFormat::Json,
        );

        file.update(BTreeMap::new(), |map| {
            map.insert("a".into(), "1".into());
        })
        .unwrap();
        let previous = file
            .update(BTreeMap::new(), |map| map.insert("a".into(), "2".into()))
            .unwrap();

        assert_eq!(previous.as_deref(), Some("1"));
        assert_eq!(file.load().unwrap().unwrap()["a"], "2");
    }

    #[test]
    fn test_update_or_reset_discards_unparsable_content() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("kv.json");
        fs::write(&path, r#"{"a": "tru"#).unwrap();
        let file = AtomicFile::<BTreeMap<String, String>>::new(path, FileFormat::Json);

        assert!(file.update(BTreeMap::new(), |_| ()).is_err());

        file.update_or_reset(BTreeMap::new(), |map| {
            map.insert("b".into(), "2".into());
        })
        .unwrap();

        let loaded = file.load().unwrap().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded["b"], "2");
    }

    #[test]
    fn test_replace_ignores_previous_content() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("kv.json");
        fs::write(&path, "not json at all").unwrap();
        let file = AtomicFile::<BTreeMap<String, String>>::new(path, FileFormat::Json);

        file.replace(&BTreeMap::new()).unwrap();

        assert_eq!(file.load().unwrap(), Some(BTreeMap::new()));
    }

    #[test]
    fn test_no_temp_or_lock_file_left_behind() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("kv.json");
        let file = AtomicFile::<BTreeMap<String, String>>::new(path.clone(), FileFormat::Json);

        file.update(BTreeMap::new(), |map| {
            map.insert("k".into(), "v".into());
        })
        .unwrap();

        assert!(path.exists());
        assert!(!temp_dir.path().join(".kv.json.tmp").exists());
        assert!(!temp_dir.path().join("kv.lock").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_private_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");
        let file = AtomicFile::<BTreeMap<String, String>>::new(path.clone(), FileFormat::Json).private();

        file.save(&BTreeMap::new()).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
