use edit_tag::{args::Arguments, run, Error};

fn main() {
    Arguments::parse()
        .map_err(Error::from)
        .and_then(|args| run(&args))
        .unwrap_or_else(|e| {
            log::error!("Program error :'{e}'");
            std::process::exit(1);
        });
}
