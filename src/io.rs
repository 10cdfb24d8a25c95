use std::io::{BufRead, StdinLock, Stdout, Write};

use log::trace;
use thiserror::Error;

use crate::errors::Error;

pub const YES_NO_RETRY_MSG: &str = "Enter n for no, or y for yes; or just hit enter for yes.";

/// the capability to talk to the user, one line at a time
pub trait Console {
    fn write_line(&mut self, text: &str) -> Result<(), Error>;
    /// reads one line without its line ending
    ///
    /// fails with [`Error::EndOfInput`] when there is nothing left to read
    fn read_line(&mut self) -> Result<String, Error>;

    fn prompt(&mut self, msg: &str) -> Result<String, Error> {
        self.write_line(msg)?;
        self.read_line()
    }

    /// reads lines until `map` accepts one, printing `retry_msg` after every rejected line
    fn map_read<T>(
        &mut self,
        retry_msg: Option<&str>,
        mut map: impl FnMut(&str) -> Option<T>,
    ) -> Result<T, Error> {
        loop {
            let rin = self.read_line()?;
            if let Some(t) = map(&rin) {
                return Ok(t);
            }
            if let Some(retry_msg) = retry_msg {
                self.write_line(retry_msg)?;
            }
        }
    }

    /// asks a yes/no question, where an empty answer counts as yes
    fn ask_consent(&mut self, msg: &str) -> Result<bool, Error> {
        self.write_line(msg)?;
        self.map_read(Some(YES_NO_RETRY_MSG), parse_yes_no)
    }

    fn read_number(&mut self, msg: &str) -> Result<u32, Error> {
        self.write_line(msg)?;
        loop {
            match parse_number(&self.read_line()?) {
                Ok(number) => return Ok(number),
                Err(err) => self.write_line(&format!("{err}, please try again:"))?,
            }
        }
    }
}

#[must_use]
pub fn parse_yes_no(rin: &str) -> Option<bool> {
    match rin.trim().to_lowercase().as_str() {
        "" | "y" => Some(true),
        "n" => Some(false),
        _ => None,
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("{0:?} isn't a whole number")]
pub struct InvalidNumber(pub String);

/// parses user input like a year or a track number
/// # Example
/// ```
/// use edit_tag::io::{parse_number, InvalidNumber};
///
/// assert_eq!(Ok(1999), parse_number("1999"));
/// assert_eq!(Ok(7), parse_number(" 7 "), "surrounding whitespace is ignored");
/// assert_eq!(Err(InvalidNumber("nineteen".to_owned())), parse_number("nineteen"));
/// assert_eq!(Err(InvalidNumber("-3".to_owned())), parse_number("-3"));
/// ```
pub fn parse_number(rin: &str) -> Result<u32, InvalidNumber> {
    rin.trim()
        .parse()
        .map_err(|_| InvalidNumber(rin.to_owned()))
}

/// a [`Console`] over any line based reader and writer
pub struct Terminal<R, W> {
    input: R,
    output: W,
}
impl<R: BufRead, W: Write> Terminal<R, W> {
    pub const fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
    pub fn into_output(self) -> W {
        self.output
    }
}
impl Terminal<StdinLock<'static>, Stdout> {
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> Console for Terminal<R, W> {
    fn write_line(&mut self, text: &str) -> Result<(), Error> {
        writeln!(self.output, "{text}")
            .and_then(|()| self.output.flush())
            .map_err(Error::Console)
    }

    fn read_line(&mut self) -> Result<String, Error> {
        let mut line = String::new();
        if self
            .input
            .read_line(&mut line)
            .map_err(Error::Console)?
            == 0
        {
            return Err(Error::EndOfInput);
        }
        let len = line.trim_end_matches(|c| c == '\n' || c == '\r').len();
        line.truncate(len);
        trace!("read {line:?}");
        Ok(line)
    }
}
