//! Byte level building blocks shared by the header and the body parser.
//!
//! The central piece is the [`Input`] trait which offers a window into the
//! not-yet-consumed bytes of the underlying reader. Parsers look at the bytes,
//! decide what to do and then `consume` them.

use std::{
    fmt,
    io,
    ops,
};

use failure::Fail;


pub(crate) mod buf;

pub(crate) trait Input: ops::Deref<Target = [u8]> {
    /// Makes sure at least `num_bytes` bytes are available. Returns
    /// `UnexpectedEof` if the reader runs dry before that.
    fn prepare(&mut self, num_bytes: usize) -> Result<(), Error>;

    /// Like `prepare`, but silently stops at the end of the input.
    fn saturating_prepare(&mut self, num_bytes: usize) -> Result<(), Error>;

    fn consume(&mut self, num_bytes: usize);

    /// Number of bytes consumed since the start of the input.
    fn offset(&self) -> usize;

    fn is_eof(&mut self) -> Result<bool, Error> {
        self.saturating_prepare(1)?;
        Ok(self.is_empty())
    }

    fn spanned_data(&self, num_bytes: usize) -> SpannedData<'_> {
        SpannedData {
            data: &self[..num_bytes],
            span: Span::new(self.offset(), self.offset() + num_bytes),
        }
    }

    fn skip_until(&mut self, stopper: impl Stopper) -> Result<(), Error> {
        loop {
            if self.is_eof()? {
                break;
            }

            if stopper.should_stop(self[0]) {
                break;
            }

            self.consume(1);
        }

        Ok(())
    }

    fn with_bytes<F, O>(&mut self, num_bytes: usize, func: F) -> Result<O, Error>
    where
        F: FnOnce(SpannedData) -> Result<O, Error>,
    {
        self.prepare(num_bytes)?;
        let out = func(self.spanned_data(num_bytes))?;
        self.consume(num_bytes);

        Ok(out)
    }

    /// Passes all bytes up to the first `stopper` byte (or the end of the
    /// input) to `func`. The stopper byte itself is not consumed.
    fn take_until<F, O>(&mut self, stopper: impl Stopper, func: F) -> Result<O, Error>
    where
        F: FnOnce(SpannedData) -> Result<O, Error>,
    {
        let mut pos = 0;
        loop {
            if self.len() <= pos {
                self.saturating_prepare(pos + 1)?;
                if self.len() <= pos {
                    break;
                }
            }

            if stopper.should_stop(self[pos]) {
                break;
            }

            pos += 1;
        }

        let out = func(self.spanned_data(pos))?;
        self.consume(pos);

        Ok(out)
    }

    /// Reads one line and returns it without its line terminator (`\n` or
    /// `\r\n`). Returns `None` if the input is exhausted.
    fn next_line(&mut self) -> Result<Option<String>, Error> {
        if self.is_eof()? {
            return Ok(None);
        }

        let line = self.take_until(b'\n', |sd| {
            let data = sd.data.strip_suffix(b"\r").unwrap_or(sd.data);
            Ok(String::from_utf8_lossy(data).into_owned())
        })?;

        // Eat the linebreak, if there is one.
        if !self.is_eof()? {
            self.consume(1);
        }

        Ok(Some(line))
    }

    /// Skips whitespace and passes the following whitespace delimited token to
    /// `func`. Returns `UnexpectedEof` if there is no token left.
    fn take_token<F, O>(&mut self, func: F) -> Result<O, Error>
    where
        F: FnOnce(SpannedData) -> Result<O, Error>,
    {
        self.skip_until(|b: u8| !b.is_ascii_whitespace())?;
        if self.is_eof()? {
            return Err(Error::UnexpectedEof(self.offset()));
        }

        self.take_until(|b: u8| b.is_ascii_whitespace(), func)
    }
}

#[derive(Debug)]
pub(crate) struct SpannedData<'a> {
    pub(crate) data: &'a [u8],
    pub(crate) span: Span,
}

impl<'a> SpannedData<'a> {
    pub(crate) fn error(&self, msg: impl Into<String>) -> Error {
        Error::Custom(msg.into(), self.span)
    }

    pub(crate) fn assert_ascii(&self) -> Result<&'a str, Error> {
        if !self.data.is_ascii() {
            return Err(Error::NotAscii(self.span));
        }

        std::str::from_utf8(self.data).map_err(|_| Error::NotAscii(self.span))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Span {
    lo: usize,
    hi: usize,
}

impl Span {
    pub(crate) fn new(lo: usize, hi: usize) -> Self {
        Self { lo, hi }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}..{}", self.lo, self.hi)
    }
}

#[derive(Debug, Fail)]
pub(crate) enum Error {
    #[fail(display = "IO error: {}", _0)]
    Io(#[cause] io::Error),

    #[fail(display = "unexpected EOF while parsing (at {})", _0)]
    UnexpectedEof(usize),

    #[fail(display = "unexpected non-ASCII data at {}", _0)]
    NotAscii(Span),

    #[fail(display = "parsing lookahead got too big (at {})", _0)]
    LookAheadTooBig(usize),

    #[fail(display = "{} (at {})", _0, _1)]
    Custom(String, Span),
}

impl From<io::Error> for Error {
    fn from(src: io::Error) -> Self {
        Error::Io(src)
    }
}


pub(crate) fn debug_fmt_bytes(data: &[u8]) -> String {
    if let Ok(s) = std::str::from_utf8(data) {
        format!("{:?}", s)
    } else {
        format!("{:?}", data)
    }
}

pub(crate) trait Stopper {
    fn should_stop(&self, byte: u8) -> bool;
}

impl Stopper for u8 {
    fn should_stop(&self, byte: u8) -> bool {
        byte == *self
    }
}

impl<F: Fn(u8) -> bool> Stopper for F {
    fn should_stop(&self, byte: u8) -> bool {
        self(byte)
    }
}
