use std::path::PathBuf;
use thiserror::Error;

use crate::tagger;

#[derive(Debug, Error)]
pub enum Error {
    #[error("the album directory {0:?} must exist, enter a directory that exists")]
    DirectoryNotFound(PathBuf),
    #[error("couldn't read the current working directory: {0}")]
    WorkingDirectory(#[source] std::io::Error),

    #[error("input ended while waiting for an answer")]
    EndOfInput,
    #[error("couldn't talk to the console: {0}")]
    Console(#[source] std::io::Error),

    #[error("couldn't list {0:?}: {1}")]
    Listing(PathBuf, #[source] std::io::Error),
    #[error("tag error {1} for {0:?}")]
    Tag(PathBuf, #[source] tagger::Error),
    #[error("couldn't rename {from:?} to {to:?}: {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] confy::ConfyError),
}

impl Error {
    pub(crate) fn tag(path: impl Into<PathBuf>) -> impl FnOnce(tagger::Error) -> Self {
        let path = path.into();
        move |err| Self::Tag(path, err)
    }
}
