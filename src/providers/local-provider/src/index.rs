use crate::scan::LocalTrack;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("failed to read media index {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse media index {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to write media index {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Load a previously saved media index. `Ok(None)` when none exists yet.
pub fn load_index(path: &Path) -> Result<Option<Vec<LocalTrack>>, IndexError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|source| IndexError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let tracks = serde_json::from_str(&raw).map_err(|source| IndexError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(tracks))
}

pub fn save_index(path: &Path, tracks: &[LocalTrack]) -> Result<(), IndexError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| IndexError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }
    let raw = serde_json::to_string_pretty(tracks).map_err(|source| IndexError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, raw).map_err(|source| IndexError::Write {
        path: path.to_path_buf(),
        source,
    })
}
