use std::path::{Path, PathBuf};

use itertools::Itertools;
use log::{debug, info, warn};

use crate::{
    args::{AlbumProperty, Arguments, Config, TrackProperty},
    errors::Error,
    io::Console,
    library::{target_path, Library},
    tagger::{field_kind::Set, TaggedFile},
};

/// the album level values of one session, applied to every file of the directory
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AlbumEdits {
    pub artist: Option<String>,
    pub title: Option<String>,
    pub genre: Option<String>,
    pub publisher: Option<String>,
    pub year: Option<u32>,
    pub disk_count: Option<u32>,
    pub track_count: Option<u32>,
}
impl AlbumEdits {
    pub fn apply_to(&self, file: &mut TaggedFile) {
        if let Some(artist) = &self.artist {
            file.set(Set::AlbumArtists(std::slice::from_ref(artist)));
        }
        if let Some(title) = &self.title {
            file.set(Set::Album(Some(title.as_str())));
        }
        if let Some(genre) = &self.genre {
            file.set(Set::Genres(std::slice::from_ref(genre)));
        }
        if let Some(publisher) = &self.publisher {
            file.set(Set::Publisher(Some(publisher.as_str())));
        }
        if let Some(year) = self.year {
            file.set(Set::Year(Some(year)));
        }
        if let Some(disk_count) = self.disk_count {
            file.set(Set::TotalDiscs(Some(disk_count)));
        }
        if let Some(track_count) = self.track_count {
            file.set(Set::TotalTracks(Some(track_count)));
        }
    }
}

/// edits the tags of all audio files in one directory, asking the user through `console`
pub struct Session<'a, C, L> {
    console: &'a mut C,
    library: &'a L,
    dir: PathBuf,
    album_properties: Vec<AlbumProperty>,
    track_properties: Vec<TrackProperty>,
    config: Config,
}

impl<'a, C: Console, L: Library> Session<'a, C, L> {
    pub const fn new(
        console: &'a mut C,
        library: &'a L,
        dir: PathBuf,
        album_properties: Vec<AlbumProperty>,
        track_properties: Vec<TrackProperty>,
        config: Config,
    ) -> Self {
        Self {
            console,
            library,
            dir,
            album_properties,
            track_properties,
            config,
        }
    }
    pub fn from_args(args: &Arguments, console: &'a mut C, library: &'a L, dir: PathBuf) -> Self {
        Self::new(
            console,
            library,
            dir,
            args.album_properties(),
            args.track_properties(),
            args.config().clone(),
        )
    }

    /// edits album tags, then every track and renames the files afterwards if `rename`
    pub fn run(&mut self, rename: bool) -> Result<(), Error> {
        debug!(
            "editing {:?} with album properties {:?} and track properties {:?}",
            self.dir, self.album_properties, self.track_properties
        );
        self.edit_album_tags()?;
        for path in self.library.list(&self.dir)? {
            self.edit_track_tags(&path)?;
        }
        if rename {
            let renamed = self.rename_files()?;
            info!("renamed {renamed} files");
        }
        Ok(())
    }

    fn has_album(&self, property: AlbumProperty) -> bool {
        self.album_properties.contains(&property)
    }
    fn has_track(&self, property: TrackProperty) -> bool {
        self.track_properties.contains(&property)
    }

    /// asks for the selected album properties, the track count is filled in later
    pub fn collect_album_edits(&mut self) -> Result<AlbumEdits, Error> {
        let mut edits = AlbumEdits::default();
        if self.has_album(AlbumProperty::AlbumArtists)
            && self.console.ask_consent("Set an album artist? (Y/n)")?
        {
            edits.artist = Some(
                self.console
                    .prompt("Enter the album artist, then press enter.")?,
            );
        }
        if self.has_album(AlbumProperty::AlbumTitle) {
            edits.title = Some(self.console.prompt("Set album title:")?);
        }
        if self.has_album(AlbumProperty::Genre) {
            edits.genre = Some(self.console.prompt("Set album genre:")?);
        }
        if self.has_album(AlbumProperty::Publisher) {
            edits.publisher = Some(self.console.prompt("Set album publisher:")?);
        }
        if self.has_album(AlbumProperty::Year) {
            edits.year = Some(self.console.read_number("Set album year:")?);
        }
        if self.has_album(AlbumProperty::DiskCount) {
            edits.disk_count = Some(self.console.read_number("Set album disk count:")?);
        }
        Ok(edits)
    }

    pub fn edit_album_tags(&mut self) -> Result<(), Error> {
        let mut edits = self.collect_album_edits()?;
        let files = self.library.list(&self.dir)?;
        if self.has_album(AlbumProperty::TrackCount) {
            edits.track_count = Some(u32::try_from(files.len()).unwrap_or(u32::MAX));
        }
        debug!("applying {edits:?} to {} files", files.len());

        // nothing is written, unless every file could be read
        let mut files = files
            .iter()
            .map(|path| self.library.open(path))
            .collect::<Result<Vec<_>, _>>()?;
        for file in &mut files {
            edits.apply_to(file);
            file.save_changes(false).map_err(Error::tag(file.path()))?;
        }
        Ok(())
    }

    pub fn edit_track_tags(&mut self, path: &Path) -> Result<(), Error> {
        let mut file = self.library.open(path)?;
        self.console.write_line(&format!(
            "Editing information for track {} ({}).",
            file.track()
                .map_or_else(|| "?".to_owned(), |it| it.to_string()),
            path.file_name().unwrap_or(path.as_os_str()).to_string_lossy()
        ))?;

        if self.has_track(TrackProperty::Artists) {
            self.edit_artists(&mut file)?;
        }
        if self.has_track(TrackProperty::Title) {
            self.edit_title(&mut file)?;
        }
        if self.has_track(TrackProperty::TrackNumber) {
            if let Some(track) = self.edit_number("track number", file.track())? {
                file.set(Set::Track(Some(track)));
            }
        }
        if self.has_track(TrackProperty::DiskNumber) {
            if let Some(disc) = self.edit_number("disk number", file.disc())? {
                file.set(Set::Disc(Some(disc)));
            }
        }

        file.save_changes(false).map_err(Error::tag(path))?;
        Ok(())
    }

    fn edit_artists(&mut self, file: &mut TaggedFile) -> Result<(), Error> {
        let current = file.artists();
        let question = match current.as_slice() {
            [] => "Set track artist(s)? (Y/n)".to_owned(),
            [artist] => format!("Current track artist: {artist}. Replace artists? (Y/n)"),
            artists => format!(
                "Current track artists: {}. Replace artists? (Y/n)",
                artists.iter().join(", ")
            ),
        };
        if !self.console.ask_consent(&question)? {
            return Ok(());
        }
        let artists = self.read_artists()?;
        if artists.is_empty() {
            debug!("no artists entered, keeping {current:?}");
        } else {
            file.set(Set::Artists(&artists));
        }
        Ok(())
    }

    /// reads one artist per line, until an empty line
    fn read_artists(&mut self) -> Result<Vec<String>, Error> {
        let mut artists = Vec::new();
        loop {
            let artist = self.console.prompt(
                "Enter artist name then press enter, or just hit return to stop adding artists.",
            )?;
            if artist.is_empty() {
                return Ok(artists);
            }
            artists.push(artist);
        }
    }

    fn edit_title(&mut self, file: &mut TaggedFile) -> Result<(), Error> {
        let question = format!(
            "Current track title: {}. Set a new title? (Y/n)",
            file.title().unwrap_or_default()
        );
        if self.console.ask_consent(&question)? {
            let title = self
                .console
                .prompt("Enter a new track title, then press enter.")?;
            file.set(Set::Title(Some(title.as_str())));
        }
        Ok(())
    }

    fn edit_number(&mut self, name: &str, current: Option<u32>) -> Result<Option<u32>, Error> {
        let question = match current {
            Some(current) => format!("Current {name}: {current}. Set a new {name}? (Y/n)"),
            None => format!("Set a {name}? (Y/n)"),
        };
        if !self.console.ask_consent(&question)? {
            return Ok(None);
        }
        self.console
            .read_number(&format!("Enter the {name}, then press enter."))
            .map(Some)
    }

    /// renames every file to match its tags, returns the number of renamed files
    pub fn rename_files(&mut self) -> Result<usize, Error> {
        let mut renamed = 0;
        for path in self.library.list(&self.dir)? {
            let target = {
                let file = self.library.open(&path)?;
                target_path(
                    &path,
                    file.track(),
                    file.title().as_deref(),
                    self.config.track_number_width,
                    self.config.replacement,
                )
            };
            if target == path {
                debug!("{path:?} already matches its tags");
                continue;
            }
            if self.library.exists(&target) {
                warn!("not renaming {path:?}, {target:?} already exists");
                continue;
            }
            self.library.rename(&path, &target)?;
            info!("renamed {path:?} to {target:?}");
            renamed += 1;
        }
        Ok(renamed)
    }
}
