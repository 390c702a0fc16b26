use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::reminder::Reminder;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("reminder file {} does not exist", .path.display())]
    NotFound { path: PathBuf },

    #[error("reminder file {} is malformed: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not access reminder file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Reads the whole reminder file. A missing file and a malformed one are
/// distinct errors so startup can choose to begin with an empty set instead
/// of failing.
pub fn load(path: &Path) -> Result<Vec<Reminder>, StorageError> {
    let bytes = fs::read(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => StorageError::NotFound {
            path: path.to_path_buf(),
        },
        _ => StorageError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    serde_json::from_slice(&bytes).map_err(|source| StorageError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Rewrites the whole reminder file from the given set. The file stays
/// pretty-printed so it can be inspected and hand-edited.
pub fn save(path: &Path, reminders: &[Reminder]) -> Result<(), StorageError> {
    let bytes = serde_json::to_vec_pretty(reminders).expect("Reminders always serialize.");

    fs::write(path, bytes).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })
}
