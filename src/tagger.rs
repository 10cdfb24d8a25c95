use std::path::{Path, PathBuf};

use itertools::Itertools;
use thiserror::Error;

pub mod field_kind {
    /// a change of one field, `None` or an empty list removes the field
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Set<'a> {
        Title(Option<&'a str>),
        Artists(&'a [String]),
        AlbumArtists(&'a [String]),
        Album(Option<&'a str>),
        Genres(&'a [String]),
        Publisher(Option<&'a str>),
        Year(Option<u32>),
        Track(Option<u32>),
        TotalTracks(Option<u32>),
        Disc(Option<u32>),
        TotalDiscs(Option<u32>),
    }
}
use field_kind::Set;

/// id3v2.4 separates multiple values of one text frame with a null byte
const SEPARATOR: char = '\0';

pub trait Tag {
    fn title(&self) -> Option<String>;
    fn artists(&self) -> Vec<String>;
    fn album_artists(&self) -> Vec<String>;
    fn album(&self) -> Option<String>;
    fn genres(&self) -> Vec<String>;
    fn publisher(&self) -> Option<String>;
    fn year(&self) -> Option<u32>;
    fn track(&self) -> Option<u32>;
    fn total_tracks(&self) -> Option<u32>;
    fn disc(&self) -> Option<u32>;
    fn total_discs(&self) -> Option<u32>;

    fn set(&mut self, value: Set);

    fn write_to_path(&self, path: &Path) -> Result<(), Error>;
}

mod mp3 {
    use id3::TagLike;

    use super::{Error, Path, Set, Tag, SEPARATOR};

    fn text<'a>(tag: &'a id3::Tag, id: &str) -> Option<&'a str> {
        tag.get(id).and_then(|frame| frame.content().text())
    }
    fn values(tag: &id3::Tag, id: &str) -> Vec<String> {
        text(tag, id)
            .map(|it| {
                it.split(SEPARATOR)
                    .filter(|it| !it.is_empty())
                    .map(ToOwned::to_owned)
                    .collect()
            })
            .unwrap_or_default()
    }
    fn set_text(tag: &mut id3::Tag, id: &str, value: Option<String>) {
        match value {
            Some(value) => {
                tag.add_frame(id3::Frame::text(id, value));
            }
            None => {
                tag.remove(id);
            }
        }
    }
    fn set_values(tag: &mut id3::Tag, id: &str, values: &[String]) {
        set_text(
            tag,
            id,
            (!values.is_empty()).then(|| values.join(&SEPARATOR.to_string())),
        );
    }

    impl Tag for id3::Tag {
        fn title(&self) -> Option<String> {
            TagLike::title(self).map(ToOwned::to_owned)
        }
        fn artists(&self) -> Vec<String> {
            values(self, "TPE1")
        }
        fn album_artists(&self) -> Vec<String> {
            values(self, "TPE2")
        }
        fn album(&self) -> Option<String> {
            TagLike::album(self).map(ToOwned::to_owned)
        }
        fn genres(&self) -> Vec<String> {
            values(self, "TCON")
        }
        fn publisher(&self) -> Option<String> {
            text(self, "TPUB").map(ToOwned::to_owned)
        }
        fn year(&self) -> Option<u32> {
            TagLike::year(self).and_then(|it| u32::try_from(it).ok())
        }
        fn track(&self) -> Option<u32> {
            TagLike::track(self)
        }
        fn total_tracks(&self) -> Option<u32> {
            TagLike::total_tracks(self)
        }
        fn disc(&self) -> Option<u32> {
            TagLike::disc(self)
        }
        fn total_discs(&self) -> Option<u32> {
            TagLike::total_discs(self)
        }

        fn set(&mut self, value: Set) {
            match value {
                Set::Title(value) => set_text(self, "TIT2", value.map(ToOwned::to_owned)),
                Set::Artists(values) => set_values(self, "TPE1", values),
                Set::AlbumArtists(values) => set_values(self, "TPE2", values),
                Set::Album(value) => set_text(self, "TALB", value.map(ToOwned::to_owned)),
                Set::Genres(values) => set_values(self, "TCON", values),
                Set::Publisher(value) => set_text(self, "TPUB", value.map(ToOwned::to_owned)),
                Set::Year(Some(value)) => match i32::try_from(value) {
                    Ok(value) => TagLike::set_year(self, value),
                    Err(_) => log::warn!("year {value} doesn't fit into id3, keeping the old one"),
                },
                Set::Year(None) => TagLike::remove_year(self),
                Set::Track(Some(value)) => TagLike::set_track(self, value),
                Set::Track(None) => TagLike::remove_track(self),
                Set::TotalTracks(Some(value)) => TagLike::set_total_tracks(self, value),
                Set::TotalTracks(None) => TagLike::remove_total_tracks(self),
                Set::Disc(Some(value)) => TagLike::set_disc(self, value),
                Set::Disc(None) => TagLike::remove_disc(self),
                Set::TotalDiscs(Some(value)) => TagLike::set_total_discs(self, value),
                Set::TotalDiscs(None) => TagLike::remove_total_discs(self),
            }
        }

        fn write_to_path(&self, path: &Path) -> Result<(), Error> {
            Ok(Self::write_to_path(self, path, self.version())?)
        }
    }

    /// reads the tag of `path`, a file without tag starts with an empty one
    pub(super) fn read(path: &Path) -> Result<id3::Tag, Error> {
        match id3::Tag::read_from_path(path).map_err(Error::from) {
            Err(Error::NoTag) => {
                log::debug!("file {path:?} didn't have id3 tags, using empty");
                Ok(id3::Tag::with_version(id3::Version::Id3v24))
            }
            tag => tag,
        }
    }
}

mod lofty_tag {
    use std::borrow::Cow;

    use lofty::{
        config::WriteOptions,
        prelude::{Accessor, TagExt, TaggedFileExt},
        tag::{ItemKey, ItemValue, TagItem, TagType},
    };

    use super::{Error, Path, Set, Tag, SEPARATOR};

    fn values(tag: &lofty::tag::Tag, key: &ItemKey) -> Vec<String> {
        tag.get_strings(key)
            .flat_map(|it| it.split(SEPARATOR))
            .filter(|it| !it.is_empty())
            .map(ToOwned::to_owned)
            .collect()
    }
    fn set_text(tag: &mut lofty::tag::Tag, key: ItemKey, value: Option<&str>) {
        match value {
            Some(value) => {
                tag.insert_text(key, value.to_owned());
            }
            None => {
                tag.remove_key(&key);
            }
        }
    }
    fn set_values(tag: &mut lofty::tag::Tag, key: &ItemKey, values: &[String]) {
        tag.remove_key(key);
        if values.is_empty() {
            return;
        }
        // id3v2 keeps one frame per key, its values share that frame
        if tag.tag_type() == TagType::Id3v2 {
            tag.insert_text(key.clone(), values.join(&SEPARATOR.to_string()));
            return;
        }
        for value in values {
            tag.push(TagItem::new(key.clone(), ItemValue::Text(value.clone())));
        }
    }

    impl Tag for lofty::tag::Tag {
        fn title(&self) -> Option<String> {
            Accessor::title(self).map(Cow::into_owned)
        }
        fn artists(&self) -> Vec<String> {
            values(self, &ItemKey::TrackArtist)
        }
        fn album_artists(&self) -> Vec<String> {
            values(self, &ItemKey::AlbumArtist)
        }
        fn album(&self) -> Option<String> {
            Accessor::album(self).map(Cow::into_owned)
        }
        fn genres(&self) -> Vec<String> {
            values(self, &ItemKey::Genre)
        }
        fn publisher(&self) -> Option<String> {
            self.get_string(&ItemKey::Publisher).map(ToOwned::to_owned)
        }
        fn year(&self) -> Option<u32> {
            Accessor::year(self)
        }
        fn track(&self) -> Option<u32> {
            Accessor::track(self)
        }
        fn total_tracks(&self) -> Option<u32> {
            Accessor::track_total(self)
        }
        fn disc(&self) -> Option<u32> {
            Accessor::disk(self)
        }
        fn total_discs(&self) -> Option<u32> {
            Accessor::disk_total(self)
        }

        fn set(&mut self, value: Set) {
            match value {
                Set::Title(value) => set_text(self, ItemKey::TrackTitle, value),
                Set::Artists(values) => set_values(self, &ItemKey::TrackArtist, values),
                Set::AlbumArtists(values) => set_values(self, &ItemKey::AlbumArtist, values),
                Set::Album(value) => set_text(self, ItemKey::AlbumTitle, value),
                Set::Genres(values) => set_values(self, &ItemKey::Genre, values),
                Set::Publisher(value) => set_text(self, ItemKey::Publisher, value),
                Set::Year(Some(value)) => Accessor::set_year(self, value),
                Set::Year(None) => Accessor::remove_year(self),
                Set::Track(Some(value)) => Accessor::set_track(self, value),
                Set::Track(None) => Accessor::remove_track(self),
                Set::TotalTracks(Some(value)) => Accessor::set_track_total(self, value),
                Set::TotalTracks(None) => Accessor::remove_track_total(self),
                Set::Disc(Some(value)) => Accessor::set_disk(self, value),
                Set::Disc(None) => Accessor::remove_disk(self),
                Set::TotalDiscs(Some(value)) => Accessor::set_disk_total(self, value),
                Set::TotalDiscs(None) => Accessor::remove_disk_total(self),
            }
        }

        fn write_to_path(&self, path: &Path) -> Result<(), Error> {
            Ok(self.save_to_path(path, WriteOptions::default())?)
        }
    }

    /// reads the primary tag of `path`, a file without one starts with an empty tag of the containers primary type
    pub(super) fn read(path: &Path) -> Result<lofty::tag::Tag, Error> {
        let mut file = lofty::read_from_path(path)?;
        let tag_type = file.primary_tag_type();
        Ok(file.remove(tag_type).unwrap_or_else(|| {
            log::debug!("file {path:?} didn't have {tag_type:?} tags, using empty");
            lofty::tag::Tag::new(tag_type)
        }))
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("extention {0:?} not supported")]
    UnSupported(Option<String>),
    #[error("file has no tag info")]
    NoTag,
    #[error(transparent)]
    Other(Box<dyn std::error::Error>),
}
impl From<Option<&str>> for Error {
    fn from(value: Option<&str>) -> Self {
        Self::UnSupported(value.map(ToOwned::to_owned))
    }
}
impl From<id3::Error> for Error {
    fn from(value: id3::Error) -> Self {
        match value.kind {
            id3::ErrorKind::NoTag => Self::NoTag,
            _ => Self::Other(Box::new(value)),
        }
    }
}
impl From<lofty::error::LoftyError> for Error {
    fn from(value: lofty::error::LoftyError) -> Self {
        Self::Other(Box::new(value))
    }
}

/// the tag formats that can be edited, detected by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Supported {
    Mp3,
    Lofty(lofty::file::FileType),
}
impl TryFrom<&Path> for Supported {
    type Error = Error;
    fn try_from(value: &Path) -> Result<Self, Self::Error> {
        let ext = value.extension().and_then(std::ffi::OsStr::to_str);
        match ext.map(str::to_lowercase).as_deref() {
            Some("mp3") => Ok(Self::Mp3),
            Some(lower) => lofty::file::FileType::from_ext(lower)
                .map(Self::Lofty)
                .ok_or_else(|| ext.into()),
            None => Err(ext.into()),
        }
    }
}
impl Supported {
    #[must_use]
    pub fn is_supported(path: &Path) -> bool {
        Self::try_from(path).is_ok()
    }
    fn read_boxed(self, path: &Path) -> Result<Box<dyn Tag>, Error> {
        Ok(match self {
            Self::Mp3 => Box::new(mp3::read(path)?),
            Self::Lofty(_) => Box::new(lofty_tag::read(path)?),
        })
    }
}

#[must_use]
pub struct TaggedFile {
    inner: Box<dyn Tag>,
    path: PathBuf,
    was_changed: bool,
}
impl TaggedFile {
    /// reads the tags from `path` or starts with an empty tag, when the file doesn't have tags
    pub fn from_path(path: PathBuf) -> Result<Self, Error> {
        let format: Supported = path.as_path().try_into()?;
        let inner = format.read_boxed(&path)?;
        Ok(Self::from_tag(path, inner))
    }
    /// wraps an already loaded tag, that will be written to `path`
    pub fn from_tag(path: PathBuf, inner: Box<dyn Tag>) -> Self {
        Self {
            inner,
            path,
            was_changed: false,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.path.as_path()
    }
    #[must_use]
    pub const fn was_changed(&self) -> bool {
        self.was_changed
    }
    /// saves changes to file if something changed or `force_save`
    ///
    /// returns if changes where written
    pub fn save_changes(&mut self, force_save: bool) -> Result<bool, Error> {
        if !(force_save || self.was_changed) {
            return Ok(false);
        }
        self.inner.write_to_path(&self.path)?;
        self.was_changed = false;
        log::debug!("saved tags of {:?}", self.path);
        Ok(true)
    }
    pub fn title(&self) -> Option<String> {
        self.inner.title()
    }
    pub fn artists(&self) -> Vec<String> {
        self.inner.artists()
    }
    pub fn album_artists(&self) -> Vec<String> {
        self.inner.album_artists()
    }
    pub fn album(&self) -> Option<String> {
        self.inner.album()
    }
    pub fn genres(&self) -> Vec<String> {
        self.inner.genres()
    }
    pub fn publisher(&self) -> Option<String> {
        self.inner.publisher()
    }
    pub fn year(&self) -> Option<u32> {
        self.inner.year()
    }
    pub fn track(&self) -> Option<u32> {
        self.inner.track()
    }
    pub fn total_tracks(&self) -> Option<u32> {
        self.inner.total_tracks()
    }
    pub fn disc(&self) -> Option<u32> {
        self.inner.disc()
    }
    pub fn total_discs(&self) -> Option<u32> {
        self.inner.total_discs()
    }

    fn is_current(&self, value: Set) -> bool {
        match value {
            Set::Title(value) => self.title().as_deref() == value,
            Set::Artists(values) => self.artists() == values,
            Set::AlbumArtists(values) => self.album_artists() == values,
            Set::Album(value) => self.album().as_deref() == value,
            Set::Genres(values) => self.genres() == values,
            Set::Publisher(value) => self.publisher().as_deref() == value,
            Set::Year(value) => self.year() == value,
            Set::Track(value) => self.track() == value,
            Set::TotalTracks(value) => self.total_tracks() == value,
            Set::Disc(value) => self.disc() == value,
            Set::TotalDiscs(value) => self.total_discs() == value,
        }
    }
    /// updates one field, does nothing if it already has that value
    pub fn set(&mut self, value: Set) {
        if self.is_current(value) {
            return;
        }
        log::trace!("setting {value:?} for {:?}", self.path);
        self.inner.set(value);
        self.was_changed = true;
    }
}

impl std::fmt::Debug for TaggedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaggedFile")
            .field("path", &self.path)
            .field("track", &self.track())
            .field("title", &self.title())
            .field("artists", &self.artists().iter().join(", "))
            .field("was_changed", &self.was_changed)
            .finish()
    }
}

impl Drop for TaggedFile {
    fn drop(&mut self) {
        if self.was_changed {
            log::warn!("discarding unsaved tag changes of {:?}", self.path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// an id3 tagged file in a fresh temporary directory, removed when dropped
    struct TestFile {
        _dir: tempfile::TempDir,
        path: PathBuf,
    }
    impl TestFile {
        fn new(name: &str) -> Self {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join(name);
            // stands in for audio data, anything that isn't a tag header works
            std::fs::write(&path, [0_u8; 256]).unwrap();
            Self { _dir: dir, path }
        }
        /// a short silent 16 bit mono pcm wave file
        fn wav(name: &str) -> Self {
            const DATA_LEN: u32 = 800;
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join(name);
            let mut bytes = Vec::new();
            bytes.extend_from_slice(b"RIFF");
            bytes.extend_from_slice(&(36 + DATA_LEN).to_le_bytes());
            bytes.extend_from_slice(b"WAVEfmt ");
            bytes.extend_from_slice(&16_u32.to_le_bytes());
            bytes.extend_from_slice(&1_u16.to_le_bytes()); // pcm
            bytes.extend_from_slice(&1_u16.to_le_bytes()); // channels
            bytes.extend_from_slice(&8000_u32.to_le_bytes()); // sample rate
            bytes.extend_from_slice(&16000_u32.to_le_bytes()); // byte rate
            bytes.extend_from_slice(&2_u16.to_le_bytes()); // block align
            bytes.extend_from_slice(&16_u16.to_le_bytes()); // bits per sample
            bytes.extend_from_slice(b"data");
            bytes.extend_from_slice(&DATA_LEN.to_le_bytes());
            bytes.resize(bytes.len() + DATA_LEN as usize, 0);
            std::fs::write(&path, bytes).unwrap();
            Self { _dir: dir, path }
        }
        fn with_tag(name: &str, fill: impl FnOnce(&mut id3::Tag)) -> Self {
            let file = Self::new(name);
            let mut tag = id3::Tag::new();
            fill(&mut tag);
            tag.write_to_path(&file.path, id3::Version::Id3v24).unwrap();
            file
        }
    }

    #[test]
    fn supported_by_extension() {
        assert_eq!(
            Supported::Mp3,
            Supported::try_from(Path::new("a/song.mp3")).unwrap()
        );
        assert_eq!(
            Supported::Mp3,
            Supported::try_from(Path::new("a/SONG.MP3")).unwrap(),
            "extension case"
        );
        assert_eq!(
            Supported::Lofty(lofty::file::FileType::Flac),
            Supported::try_from(Path::new("a/song.flac")).unwrap()
        );
        assert!(
            matches!(
                Supported::try_from(Path::new("a/cover.jpg")),
                Err(Error::UnSupported(Some(ext))) if ext == "jpg"
            ),
            "images aren't audio"
        );
        assert!(
            matches!(
                Supported::try_from(Path::new("a/README")),
                Err(Error::UnSupported(None))
            ),
            "no extension"
        );
    }

    #[test]
    fn untagged_mp3_starts_empty() {
        let file = TestFile::new("untagged.mp3");
        let tag = TaggedFile::from_path(file.path.clone()).unwrap();
        assert_eq!(None, tag.title());
        assert!(tag.artists().is_empty(), "no artists");
        assert_eq!(None, tag.track());
        assert!(!tag.was_changed(), "fresh file is unchanged");
    }

    #[test]
    fn save_when_needed() {
        let file = TestFile::with_tag("song.mp3", |tag| {
            id3::TagLike::set_title(tag, "title");
        });
        let mut tag = TaggedFile::from_path(file.path.clone()).unwrap();

        assert!(
            tag.save_changes(true).unwrap(),
            "force save without changes"
        );
        assert!(!tag.save_changes(false).unwrap(), "save without changes");
        tag.set(Set::Title(Some("test 1")));
        assert!(tag.save_changes(false).unwrap(), "save with changes");
        tag.set(Set::Title(Some("test 1")));
        assert!(
            !tag.save_changes(false).unwrap(),
            "save without true changes"
        );
    }

    #[test]
    fn read_saved() {
        let file = TestFile::with_tag("song.mp3", |tag| {
            id3::TagLike::set_title(tag, "old");
            id3::TagLike::set_track(tag, 3);
            id3::TagLike::set_total_tracks(tag, 9);
        });
        let mut tag = TaggedFile::from_path(file.path.clone()).unwrap();
        let artists = vec!["Alice".to_owned(), "Bob".to_owned()];
        let album_artists = vec!["The Band".to_owned()];
        let genres = vec!["Rock".to_owned()];
        tag.set(Set::Title(Some("Song")));
        tag.set(Set::Artists(&artists));
        tag.set(Set::AlbumArtists(&album_artists));
        tag.set(Set::Album(Some("Album")));
        tag.set(Set::Genres(&genres));
        tag.set(Set::Publisher(Some("Label")));
        tag.set(Set::Year(Some(1999)));
        tag.set(Set::TotalTracks(Some(4)));
        assert!(tag.save_changes(false).unwrap(), "changes were made");

        let tag = TaggedFile::from_path(file.path.clone()).unwrap();
        assert_eq!(Some("Song".to_owned()), tag.title());
        assert_eq!(artists, tag.artists());
        assert_eq!(album_artists, tag.album_artists());
        assert_eq!(Some("Album".to_owned()), tag.album());
        assert_eq!(genres, tag.genres());
        assert_eq!(Some("Label".to_owned()), tag.publisher());
        assert_eq!(Some(1999), tag.year());
        assert_eq!(Some(3), tag.track(), "track number is kept");
        assert_eq!(Some(4), tag.total_tracks());
    }

    #[test]
    fn empty_list_removes_field() {
        let file = TestFile::with_tag("song.mp3", |tag| {
            id3::TagLike::set_artist(tag, "Someone");
        });
        let mut tag = TaggedFile::from_path(file.path.clone()).unwrap();
        assert_eq!(vec!["Someone".to_owned()], tag.artists());
        tag.set(Set::Artists(&[]));
        tag.save_changes(false).unwrap();

        let tag = TaggedFile::from_path(file.path.clone()).unwrap();
        assert!(tag.artists().is_empty(), "artists got removed");
    }

    #[test]
    fn dropping_discards_changes() {
        let file = TestFile::with_tag("song.mp3", |tag| {
            id3::TagLike::set_title(tag, "kept");
        });
        let mut tag = TaggedFile::from_path(file.path.clone()).unwrap();
        tag.set(Set::Title(Some("discarded")));
        assert!(tag.was_changed(), "title changed");
        drop(tag);

        let tag = TaggedFile::from_path(file.path.clone()).unwrap();
        assert_eq!(Some("kept".to_owned()), tag.title());
    }

    #[test]
    fn untagged_wav_starts_empty() {
        let file = TestFile::wav("untagged.wav");
        let tag = TaggedFile::from_path(file.path.clone()).unwrap();
        assert_eq!(None, tag.title());
        assert!(tag.artists().is_empty(), "no artists");
        assert_eq!(None, tag.year());
        assert!(!tag.was_changed(), "fresh file is unchanged");
    }

    #[test]
    fn wav_read_saved() {
        let file = TestFile::wav("song.wav");
        let mut tag = TaggedFile::from_path(file.path.clone()).unwrap();
        let artists = vec!["Alice".to_owned(), "Bob".to_owned()];
        let album_artists = vec!["The Band".to_owned(), "Guests".to_owned()];
        let genres = vec!["Rock".to_owned()];
        tag.set(Set::Title(Some("Song")));
        tag.set(Set::Artists(&artists));
        tag.set(Set::AlbumArtists(&album_artists));
        tag.set(Set::Album(Some("Album")));
        tag.set(Set::Genres(&genres));
        tag.set(Set::Year(Some(1999)));
        tag.set(Set::Track(Some(3)));
        tag.set(Set::TotalTracks(Some(9)));
        assert!(tag.save_changes(false).unwrap(), "changes were made");

        let mut tag = TaggedFile::from_path(file.path.clone()).unwrap();
        assert_eq!(Some("Song".to_owned()), tag.title());
        assert_eq!(artists, tag.artists(), "every artist in entry order");
        assert_eq!(album_artists, tag.album_artists());
        assert_eq!(Some("Album".to_owned()), tag.album());
        assert_eq!(genres, tag.genres());
        assert_eq!(Some(1999), tag.year());
        assert_eq!(Some(3), tag.track());
        assert_eq!(Some(9), tag.total_tracks());

        tag.set(Set::Artists(&artists));
        tag.set(Set::AlbumArtists(&album_artists));
        assert!(
            !tag.save_changes(false).unwrap(),
            "saved values are current after reading them again"
        );
    }

    #[test]
    fn wav_empty_list_removes_field() {
        let file = TestFile::wav("song.wav");
        let mut tag = TaggedFile::from_path(file.path.clone()).unwrap();
        tag.set(Set::Artists(&["Someone".to_owned()]));
        tag.save_changes(false).unwrap();

        let mut tag = TaggedFile::from_path(file.path.clone()).unwrap();
        assert_eq!(vec!["Someone".to_owned()], tag.artists());
        tag.set(Set::Artists(&[]));
        tag.save_changes(false).unwrap();

        let tag = TaggedFile::from_path(file.path.clone()).unwrap();
        assert!(tag.artists().is_empty(), "artists got removed");
    }
}
