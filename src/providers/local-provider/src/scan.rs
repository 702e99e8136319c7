use cadenza_core::SortOrder;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// One entry in the local media index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalTrack {
    pub path: PathBuf,
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("failed to walk {root}: {source}")]
    Walk {
        root: PathBuf,
        source: walkdir::Error,
    },
}

fn is_supported_extension(ext: &str) -> bool {
    matches!(
        ext.to_ascii_lowercase().as_str(),
        "mp3" | "m4a" | "flac" | "wav" | "ogg"
    )
}

/// Walk the library root and build track entries. Artist/album are inferred
/// from the `Artist/Album/Track` directory convention; files directly under
/// the root get "Unknown Artist".
pub fn scan_library(root: &Path) -> Result<Vec<LocalTrack>, ScanError> {
    let mut tracks = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(|source| ScanError::Walk {
            root: root.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        if !is_supported_extension(ext) {
            continue;
        }
        tracks.push(track_from_path(path, root));
    }
    Ok(tracks)
}

pub fn sort_tracks(tracks: &mut [LocalTrack], order: SortOrder) {
    match order {
        SortOrder::Title => tracks.sort_by(|a, b| {
            a.title
                .cmp(&b.title)
                .then_with(|| a.path.cmp(&b.path))
        }),
        SortOrder::Artist => tracks.sort_by(|a, b| {
            a.artist
                .cmp(&b.artist)
                .then_with(|| a.title.cmp(&b.title))
                .then_with(|| a.path.cmp(&b.path))
        }),
        SortOrder::Path => tracks.sort_by(|a, b| a.path.cmp(&b.path)),
    }
}

fn track_from_path(path: &Path, root: &Path) -> LocalTrack {
    let title = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Unknown")
        .to_string();

    let mut components: Vec<String> = path
        .strip_prefix(root)
        .unwrap_or(path)
        .components()
        .filter_map(|c| c.as_os_str().to_str().map(str::to_string))
        .collect();
    let _ = components.pop(); // drop file name

    let (artist, album) = match components.len() {
        0 => ("Unknown Artist".to_string(), None),
        1 => (components.remove(0), None),
        _ => {
            let album = components.pop();
            let artist = components.pop().unwrap_or_else(|| "Unknown Artist".into());
            (artist, album)
        }
    };

    LocalTrack {
        path: path.to_path_buf(),
        title,
        artist,
        album,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};

    #[test]
    fn scan_finds_supported_files_and_infers_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let album_dir = dir.path().join("Band").join("First Album");
        fs::create_dir_all(&album_dir).unwrap();
        File::create(album_dir.join("song.mp3")).unwrap();
        File::create(album_dir.join("notes.txt")).unwrap();
        File::create(dir.path().join("loose.ogg")).unwrap();

        let tracks = scan_library(dir.path()).unwrap();
        assert_eq!(tracks.len(), 2);

        let song = tracks.iter().find(|t| t.title == "song").unwrap();
        assert_eq!(song.artist, "Band");
        assert_eq!(song.album.as_deref(), Some("First Album"));

        let loose = tracks.iter().find(|t| t.title == "loose").unwrap();
        assert_eq!(loose.artist, "Unknown Artist");
        assert!(loose.album.is_none());
    }

    #[test]
    fn sort_orders_are_stable() {
        let mut tracks = vec![
            LocalTrack {
                path: "/m/b.mp3".into(),
                title: "Beta".into(),
                artist: "Z".into(),
                album: None,
            },
            LocalTrack {
                path: "/m/a.mp3".into(),
                title: "Alpha".into(),
                artist: "A".into(),
                album: None,
            },
        ];
        sort_tracks(&mut tracks, SortOrder::Title);
        assert_eq!(tracks[0].title, "Alpha");
        sort_tracks(&mut tracks, SortOrder::Artist);
        assert_eq!(tracks[0].artist, "A");
        sort_tracks(&mut tracks, SortOrder::Path);
        assert_eq!(tracks[0].path, PathBuf::from("/m/a.mp3"));
    }
}
