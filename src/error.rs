use std::io;

use derive_more::Display;
use failure::Fail;


/// The outcome of parsing a PLY file.
///
/// Everything except `Ok` is terminal: once a header has a non-`Ok` status,
/// its schema must not be trusted and the body is never read. `EarlyEof` and
/// `BadValue` are only produced while reading the body.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// The header was fully parsed and the body can be read.
    #[display(fmt = "OK")]
    Ok,

    /// The input could not be opened (or read).
    #[display(fmt = "NO_FILE")]
    NoFile,

    /// The first line is not `ply`.
    #[display(fmt = "NO_PLY")]
    NoPly,

    /// No `format` line before the first declaration.
    #[display(fmt = "NO_FMT")]
    NoFmt,

    /// The `format` line is malformed or names an unknown encoding.
    #[display(fmt = "BAD_FMT")]
    BadFmt,

    /// A `property` line without a preceding `element` line.
    #[display(fmt = "NO_ELEM")]
    NoElem,

    /// A malformed `element` line.
    #[display(fmt = "BAD_ELEM")]
    BadElem,

    /// A malformed `property` line.
    #[display(fmt = "BAD_PROP")]
    BadProp,

    /// A type name that is not one of the eight PLY primitive types.
    #[display(fmt = "BAD_TYPE")]
    BadType,

    /// The input ended before `end_header`.
    #[display(fmt = "NO_ENDH")]
    NoEndh,

    /// The body ended before all declared values were read.
    #[display(fmt = "EARLY_EOF")]
    EarlyEof,

    /// An ASCII body token is not a valid literal of the declared type, or a
    /// list length is negative.
    #[display(fmt = "BAD_VALUE")]
    BadValue,

    /// A header line that matches none of the known line kinds.
    #[display(fmt = "UNKNOWN")]
    Unknown,
}

impl Status {
    pub fn is_ok(&self) -> bool {
        *self == Status::Ok
    }
}

/// Error returned by the fallible operations of this crate.
#[derive(Debug, Fail)]
pub enum Error {
    /// The file is not a well-formed PLY file. `status` is never `Ok`.
    #[fail(display = "{}: {}", status, context)]
    Format {
        status: Status,
        context: String,
    },

    /// Reading the body failed for a reason other than the input ending.
    #[fail(display = "IO error: {}", _0)]
    Io(#[cause] io::Error),
}

impl Error {
    pub(crate) fn format(status: Status, context: impl Into<String>) -> Self {
        Error::Format {
            status,
            context: context.into(),
        }
    }

    /// The status describing this error, if it is a format error.
    pub fn status(&self) -> Option<Status> {
        match self {
            Error::Format { status, .. } => Some(*status),
            Error::Io(_) => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(src: io::Error) -> Self {
        Error::Io(src)
    }
}
