//! Purpose: Persist the local overlay of optimistically created records.
//! Exports: `OverlayStore`, `OverlayLock`, `JsonFileOverlay`, `MemoryOverlay`.
//! Role: Injected storage seam behind the list synchronizer (file or in-memory).
//! Invariants: `load` distinguishes "never written" (`Ok(None)`) from unreadable (`Corrupt`).
//! Invariants: File saves replace the whole document atomically (temp file + rename).
//! Invariants: No schema versioning; the document is a bare JSON array of records.
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use fs2::FileExt;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::core::error::{Error, ErrorKind};

pub trait OverlayStore<T>: Send + Sync {
    fn load(&self) -> Result<Option<Vec<T>>, Error>;

    fn save(&self, items: &[T]) -> Result<(), Error>;

    fn clear(&self) -> Result<(), Error>;

    /// Exclusive writer lock held across a read-modify-write.
    fn lock(&self) -> Result<OverlayLock, Error> {
        Ok(OverlayLock { file: None })
    }
}

/// Released on drop.
pub struct OverlayLock {
    file: Option<File>,
}

impl Drop for OverlayLock {
    fn drop(&mut self) {
        if let Some(file) = &self.file {
            let _ = file.unlock();
        }
    }
}

/// Overlay kept as one JSON file; `key` names the file inside the state directory.
#[derive(Clone, Debug)]
pub struct JsonFileOverlay<T> {
    path: PathBuf,
    _records: PhantomData<fn() -> T>,
}

impl<T> JsonFileOverlay<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _records: PhantomData,
        }
    }

    pub fn in_dir(state_dir: &Path, key: &str) -> Self {
        Self::new(state_dir.join(format!("{key}.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(suffix);
        self.path.with_file_name(name)
    }

    fn ensure_parent(&self) -> Result<(), Error> {
        let Some(parent) = self.path.parent() else {
            return Ok(());
        };
        if parent.as_os_str().is_empty() {
            return Ok(());
        }
        fs::create_dir_all(parent).map_err(|err| {
            Error::new(map_io_error_kind(&err))
                .with_message("failed to create state directory")
                .with_path(parent)
                .with_source(err)
        })
    }
}

impl<T> OverlayStore<T> for JsonFileOverlay<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    fn load(&self) -> Result<Option<Vec<T>>, Error> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(Error::new(map_io_error_kind(&err))
                    .with_message("failed to read overlay")
                    .with_path(&self.path)
                    .with_source(err));
            }
        };
        serde_json::from_slice(&bytes).map(Some).map_err(|err| {
            Error::new(ErrorKind::Corrupt)
                .with_message("overlay is not a JSON array of records")
                .with_path(&self.path)
                .with_source(err)
        })
    }

    fn save(&self, items: &[T]) -> Result<(), Error> {
        self.ensure_parent()?;
        let payload = serde_json::to_vec(items).map_err(|err| {
            Error::new(ErrorKind::Internal)
                .with_message("failed to encode overlay")
                .with_source(err)
        })?;
        let tmp = self.sibling(".tmp");
        let write = || -> io::Result<()> {
            let mut file = File::create(&tmp)?;
            file.write_all(&payload)?;
            file.sync_all()?;
            fs::rename(&tmp, &self.path)
        };
        write().map_err(|err| {
            let _ = fs::remove_file(&tmp);
            Error::new(map_io_error_kind(&err))
                .with_message("failed to write overlay")
                .with_path(&self.path)
                .with_source(err)
        })
    }

    fn clear(&self) -> Result<(), Error> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(Error::new(map_io_error_kind(&err))
                .with_message("failed to remove overlay")
                .with_path(&self.path)
                .with_source(err)),
        }
    }

    fn lock(&self) -> Result<OverlayLock, Error> {
        self.ensure_parent()?;
        let lock_path = self.sibling(".lock");
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&lock_path)
            .map_err(|err| {
                Error::new(map_io_error_kind(&err))
                    .with_message("failed to open overlay lock")
                    .with_path(&lock_path)
                    .with_source(err)
            })?;
        file.lock_exclusive().map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to lock overlay")
                .with_path(&lock_path)
                .with_source(err)
        })?;
        Ok(OverlayLock { file: Some(file) })
    }
}

/// In-process overlay for tests and embedding.
#[derive(Debug)]
pub struct MemoryOverlay<T> {
    items: Mutex<Option<Vec<T>>>,
}

impl<T: Clone> MemoryOverlay<T> {
    pub fn new() -> Self {
        Self {
            items: Mutex::new(None),
        }
    }

    pub fn with_items(items: Vec<T>) -> Self {
        Self {
            items: Mutex::new(Some(items)),
        }
    }

    pub fn snapshot(&self) -> Option<Vec<T>> {
        self.items
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .clone()
    }
}

impl<T: Clone> Default for MemoryOverlay<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + Sync> OverlayStore<T> for MemoryOverlay<T> {
    fn load(&self) -> Result<Option<Vec<T>>, Error> {
        Ok(self.snapshot())
    }

    fn save(&self, items: &[T]) -> Result<(), Error> {
        *self.items.lock().unwrap_or_else(|poison| poison.into_inner()) = Some(items.to_vec());
        Ok(())
    }

    fn clear(&self) -> Result<(), Error> {
        *self.items.lock().unwrap_or_else(|poison| poison.into_inner()) = None;
        Ok(())
    }
}

fn map_io_error_kind(err: &io::Error) -> ErrorKind {
    match err.kind() {
        io::ErrorKind::InvalidInput => ErrorKind::Usage,
        _ => ErrorKind::Io,
    }
}
