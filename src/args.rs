use std::path::{Path, PathBuf};

use clap::{Args, Parser, ValueEnum};
use confy::ConfyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum)]
#[value(rename_all = "lower")]
pub enum AlbumProperty {
    AlbumArtists,
    AlbumTitle,
    /// also asks for every tracks disk number
    DiskCount,
    Genre,
    Publisher,
    TrackCount,
    Year,
}
impl AlbumProperty {
    pub const DEFAULT: [Self; 5] = [
        Self::AlbumArtists,
        Self::AlbumTitle,
        Self::Genre,
        Self::Year,
        Self::TrackCount,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum)]
#[value(rename_all = "lower")]
pub enum TrackProperty {
    Artists,
    DiskNumber,
    Title,
    TrackNumber,
}
impl TrackProperty {
    pub const DEFAULT: [Self; 2] = [Self::Artists, Self::Title];
}

#[derive(Debug, Parser, Clone)]
#[clap(version = env!("CARGO_PKG_VERSION"), about)]
pub struct Parameter {
    #[clap(
        long = "albumdirectory",
        value_name = "DIR",
        help = "the folder to update tags for, treated as a single album, defaults to the current directory"
    )]
    pub album_directory: Option<PathBuf>,

    #[clap(
        long = "albumproperties",
        value_name = "PROPERTIES",
        value_delimiter = ',',
        ignore_case = true,
        help = "comma separated album properties to edit"
    )]
    pub album_properties: Vec<AlbumProperty>,
    #[clap(
        long = "trackproperties",
        value_name = "PROPERTIES",
        value_delimiter = ',',
        ignore_case = true,
        help = "comma separated track properties to edit"
    )]
    pub track_properties: Vec<TrackProperty>,

    #[clap(long, help = "rename the files to \"<track> - <title>\" after editing")]
    pub rename: bool,

    #[command(flatten)]
    pub config: ConfigArgs,
    #[command(flatten)]
    pub output_level: OutputLevel,
}

const SUB_CONFIG: &str = "session";
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    pub version: u8,
    /// replaces characters, that can't be part of a file name
    pub replacement: char,
    /// zero pads track numbers of renamed files to this width
    pub track_number_width: usize,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            version: 1,
            replacement: '_',
            track_number_width: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Arguments {
    config: Config,
    parameter: Parameter,
}
impl Arguments {
    #[must_use]
    pub const fn from(config: Config, parameter: Parameter) -> Self {
        Self { config, parameter }
    }
    /// parses the command line, starts logging and loads the config
    pub fn parse() -> Result<Self, ConfyError> {
        let param = Parameter::parse();
        param.output_level.init_logger();
        let config = param.config.try_load_config::<Config>(SUB_CONFIG)?;
        log::debug!("{config:?}");
        Ok(Self::from(config, param))
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }
    #[must_use]
    pub fn album_directory(&self) -> Option<&Path> {
        self.parameter.album_directory.as_deref()
    }
    #[must_use]
    pub const fn rename(&self) -> bool {
        self.parameter.rename
    }
    /// the selected album properties or [`AlbumProperty::DEFAULT`]
    #[must_use]
    pub fn album_properties(&self) -> Vec<AlbumProperty> {
        Self::or_default(&self.parameter.album_properties, &AlbumProperty::DEFAULT)
    }
    /// the selected track properties or [`TrackProperty::DEFAULT`],
    /// [`AlbumProperty::DiskCount`] adds [`TrackProperty::DiskNumber`]
    #[must_use]
    pub fn track_properties(&self) -> Vec<TrackProperty> {
        let mut properties =
            Self::or_default(&self.parameter.track_properties, &TrackProperty::DEFAULT);
        if self.album_properties().contains(&AlbumProperty::DiskCount)
            && !properties.contains(&TrackProperty::DiskNumber)
        {
            properties.push(TrackProperty::DiskNumber);
        }
        properties
    }
    fn or_default<T: Copy + Ord>(selected: &[T], default: &[T]) -> Vec<T> {
        let mut properties = if selected.is_empty() {
            default.to_vec()
        } else {
            selected.to_vec()
        };
        properties.sort_unstable();
        properties.dedup();
        properties
    }
}

#[derive(Args, Debug, Clone, Copy)]
#[group(required = false, multiple = false)]
#[allow(clippy::struct_excessive_bools)]
pub struct OutputLevel {
    #[clap(short, long, help = "print maximum info")]
    debug: bool,
    #[clap(short, long, help = "print more info")]
    verbose: bool,
    #[clap(short, long, help = "print only warnings and errors")]
    warn: bool,
    #[clap(short, long, help = "print only errors")]
    silent: bool,
}

impl OutputLevel {
    pub fn init_logger(&self) {
        let level = log::Level::from(*self);
        Self::init_logger_with(level);
    }
    pub fn init_logger_with(level: log::Level) {
        let env = env_logger::Env::default();
        let env = env.default_filter_or(level.as_str());

        let mut builder = env_logger::Builder::from_env(env);

        builder.format_timestamp(None);
        builder.format_target(false);
        builder.format_level(level < log::Level::Info);

        builder.init();
    }
}

impl From<OutputLevel> for log::Level {
    fn from(val: OutputLevel) -> Self {
        if val.silent {
            Self::Error
        } else if val.debug {
            Self::Trace
        } else if val.verbose {
            Self::Debug
        } else if val.warn {
            Self::Warn
        } else {
            Self::Info
        }
    }
}

#[derive(Args, Debug, Clone)]
#[allow(clippy::module_name_repetitions)]
pub struct ConfigArgs {
    #[clap(long, short, value_name = "FILE", help = "use this config file")]
    pub config: Option<PathBuf>,
}
impl ConfigArgs {
    pub fn try_load_config<C>(&self, sub_config: &str) -> Result<C, ConfyError>
    where
        C: serde::Serialize + serde::de::DeserializeOwned + Default,
    {
        self.config.as_ref().map_or_else(
            || confy::load(crate::APP_NAME, Some(sub_config)),
            |config_path| confy::load_path(config_path),
        )
    }
}
