use std::path::{Path, PathBuf};

use log::{debug, trace};

use crate::{
    errors::Error,
    tagger::{Supported, TaggedFile},
};

/// the files of an album and how to reach their tags
pub trait Library {
    /// lists the audio files currently in `dir`, sorted by path
    fn list(&self, dir: &Path) -> Result<Vec<PathBuf>, Error>;
    fn open(&self, path: &Path) -> Result<TaggedFile, Error>;
    fn exists(&self, path: &Path) -> bool;
    fn rename(&self, from: &Path, to: &Path) -> Result<(), Error>;
}

/// the real filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSystem;

impl Library for FileSystem {
    fn list(&self, dir: &Path) -> Result<Vec<PathBuf>, Error> {
        let listing_error = |err| Error::Listing(dir.to_path_buf(), err);
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(listing_error)? {
            let path = entry.map_err(listing_error)?.path();
            if !path.is_file() {
                trace!("skipping {path:?}, not a file");
            } else if Supported::is_supported(&path) {
                files.push(path);
            } else {
                debug!("skipping {path:?}, not a supported audio file");
            }
        }
        files.sort();
        Ok(files)
    }

    fn open(&self, path: &Path) -> Result<TaggedFile, Error> {
        TaggedFile::from_path(path.to_path_buf()).map_err(Error::tag(path))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<(), Error> {
        std::fs::rename(from, to).map_err(|source| Error::Rename {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source,
        })
    }
}

/// finds the directory to work on, `dir` or the current working directory
pub fn resolve_directory(dir: Option<&Path>) -> Result<PathBuf, Error> {
    let dir = match dir {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir().map_err(Error::WorkingDirectory)?,
    };
    if dir.is_dir() {
        Ok(dir)
    } else {
        Err(Error::DirectoryNotFound(dir))
    }
}

const ILLEGAL_CHARS: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// replaces characters, that aren't allowed in file names on common filesystems
/// # Example
/// ```
/// use edit_tag::library::sanitize_file_name;
///
/// assert_eq!("AC_DC - Back in Black", sanitize_file_name("AC/DC - Back in Black", '_'));
/// assert_eq!("Why_", sanitize_file_name("Why? ", '_'), "trailing spaces are trimmed");
/// assert_eq!("Song", sanitize_file_name("Song...", '_'), "trailing dots are trimmed");
/// ```
#[must_use]
pub fn sanitize_file_name(name: &str, replacement: char) -> String {
    let name = name
        .chars()
        .map(|c| {
            if c.is_control() || ILLEGAL_CHARS.contains(&c) {
                replacement
            } else {
                c
            }
        })
        .collect::<String>();
    name.trim_end_matches(|c| c == '.' || c == ' ').to_owned()
}

/// builds `"<track> - <title>.<ext>"` next to `path`
pub fn target_path(
    path: &Path,
    track: Option<u32>,
    title: Option<&str>,
    track_number_width: usize,
    replacement: char,
) -> PathBuf {
    let stem = sanitize_file_name(
        &format!(
            "{:0>width$} - {}",
            track.unwrap_or(0),
            title.unwrap_or_default(),
            width = track_number_width
        ),
        replacement,
    );
    let name = match path.extension().and_then(std::ffi::OsStr::to_str) {
        Some(ext) => format!("{stem}.{ext}"),
        None => stem,
    };
    path.with_file_name(name)
}
