pub mod args;
mod errors;
pub mod io;
pub mod library;
pub mod session;
pub mod tagger;

pub use errors::Error;

use args::Arguments;
use io::{Console, Terminal};
use library::{FileSystem, Library};
use session::Session;

pub const APP_NAME: &str = "edit-tag";

/// edits the album in the selected directory, talking to the user over stdin and stdout
pub fn run(args: &Arguments) -> Result<(), Error> {
    run_with(args, &mut Terminal::stdio(), &FileSystem)
}

pub fn run_with<C: Console, L: Library>(
    args: &Arguments,
    console: &mut C,
    library: &L,
) -> Result<(), Error> {
    log::debug!("{args:#?}");
    let dir = library::resolve_directory(args.album_directory())?;
    log::info!("editing tags in {dir:?}");
    Session::from_args(args, console, library, dir).run(args.rename())
}
