use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlaylistError {
    #[error("playlist io failed at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("playlist '{name}' already exists")]
    AlreadyExists { name: String },
    #[error("playlist '{name}' not found")]
    NotFound { name: String },
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> PlaylistError + '_ {
    move |source| PlaylistError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Playlists are plain text files under one directory, one absolute track
/// path per line. Blank lines and `#` comments are ignored.
#[derive(Debug, Clone)]
pub struct PlaylistStore {
    dir: PathBuf,
}

impl PlaylistStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.txt"))
    }

    /// Playlist names, sorted. An absent directory means no playlists.
    pub fn names(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .filter_map(|e| {
                let path = e.path();
                if path.extension().and_then(|s| s.to_str()) == Some("txt") {
                    path.file_stem()
                        .and_then(|s| s.to_str())
                        .map(str::to_string)
                } else {
                    None
                }
            })
            .collect();
        names.sort();
        names
    }

    pub fn load(&self, name: &str) -> Result<Vec<PathBuf>, PlaylistError> {
        let path = self.file_path(name);
        let raw = fs::read_to_string(&path).map_err(io_err(&path))?;
        Ok(raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(PathBuf::from)
            .collect())
    }

    /// Create an empty playlist file. Fails when the name is taken.
    pub fn create(&self, name: &str) -> Result<(), PlaylistError> {
        fs::create_dir_all(&self.dir).map_err(io_err(&self.dir))?;
        let path = self.file_path(name);
        if path.exists() {
            return Err(PlaylistError::AlreadyExists {
                name: name.to_string(),
            });
        }
        fs::write(&path, "").map_err(io_err(&path))
    }

    pub fn remove(&self, name: &str) -> Result<(), PlaylistError> {
        let path = self.file_path(name);
        if !path.exists() {
            return Err(PlaylistError::NotFound {
                name: name.to_string(),
            });
        }
        fs::remove_file(&path).map_err(io_err(&path))
    }

    pub fn append(&self, name: &str, track: &Path) -> Result<(), PlaylistError> {
        fs::create_dir_all(&self.dir).map_err(io_err(&self.dir))?;
        let path = self.file_path(name);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(io_err(&path))?;
        writeln!(file, "{}", track.display()).map_err(io_err(&path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_creates_and_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = PlaylistStore::new(dir.path().join("playlists"));
        store.append("favorites", Path::new("/music/a.mp3")).unwrap();
        store.append("favorites", Path::new("/music/b.mp3")).unwrap();

        assert_eq!(store.names(), vec!["favorites".to_string()]);
        assert_eq!(
            store.load("favorites").unwrap(),
            vec![PathBuf::from("/music/a.mp3"), PathBuf::from("/music/b.mp3")]
        );
    }

    #[test]
    fn comments_and_blanks_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let store = PlaylistStore::new(dir.path().to_path_buf());
        fs::write(
            dir.path().join("mix.txt"),
            "# my mix\n\n/music/a.mp3\n   \n/music/b.mp3\n",
        )
        .unwrap();
        assert_eq!(store.load("mix").unwrap().len(), 2);
    }

    #[test]
    fn missing_directory_means_no_playlists() {
        let store = PlaylistStore::new(PathBuf::from("/nonexistent/playlists"));
        assert!(store.names().is_empty());
    }

    #[test]
    fn create_then_remove_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let store = PlaylistStore::new(dir.path().join("playlists"));

        store.create("road trip").unwrap();
        assert_eq!(store.names(), vec!["road trip".to_string()]);
        assert!(store.load("road trip").unwrap().is_empty());

        store.remove("road trip").unwrap();
        assert!(store.names().is_empty());
    }

    #[test]
    fn create_rejects_existing_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = PlaylistStore::new(dir.path().to_path_buf());
        store.create("mix").unwrap();
        assert!(matches!(
            store.create("mix"),
            Err(PlaylistError::AlreadyExists { .. })
        ));
    }

    #[test]
    fn remove_unknown_name_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = PlaylistStore::new(dir.path().to_path_buf());
        assert!(matches!(
            store.remove("ghost"),
            Err(PlaylistError::NotFound { .. })
        ));
    }
}
