//! Parsing the textual PLY header.
//!
//! The header is parsed line by line by a small state machine: the magic
//! line, then the format line (optionally preceded by comments), then any
//! number of `comment`, `obj_info`, `element` and `property` lines until
//! `end_header`. Parsing stops at the first line that breaks the grammar and
//! records why in [`Header::status`] and [`Header::status_context`].

use std::{
    fmt,
    path::Path,
};

use derive_more::Display;
use log::debug;
use smallvec::SmallVec;

use crate::{
    Error, Status,
    element::{ElementDef, PropertyDef},
    parse::{self, Input},
    primitive::PrimitiveType,
    read::Reader,
};


#[cfg(test)]
mod tests;


/// The encoding of the body of a PLY file.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    #[display(fmt = "ascii")]
    Ascii,
    #[display(fmt = "binary_little_endian")]
    BinaryLittleEndian,
    #[display(fmt = "binary_big_endian")]
    BinaryBigEndian,
}

impl Format {
    /// Parses the keyword used in the format line.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "ascii" => Some(Format::Ascii),
            "binary_little_endian" => Some(Format::BinaryLittleEndian),
            "binary_big_endian" => Some(Format::BinaryBigEndian),
            _ => None,
        }
    }

    /// The binary format matching the endianness of this machine.
    pub fn binary_native() -> Self {
        #[cfg(target_endian = "big")]
        { Format::BinaryBigEndian }

        #[cfg(target_endian = "little")]
        { Format::BinaryLittleEndian }
    }
}

/// The parsed header of a PLY file.
///
/// A `Header` is always created, even for broken input: check
/// [`Header::status`] (or call [`Header::check`]) before trusting anything
/// else in here.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub(crate) status: Status,
    pub(crate) status_context: String,
    pub(crate) format: Option<Format>,
    pub(crate) version: String,
    pub(crate) comments: Vec<String>,
    pub(crate) obj_info: Vec<String>,
    pub(crate) elements: Vec<ElementDef>,
}

impl Header {
    /// Opens the file at `path` and parses its header. The body is not read.
    ///
    /// This never fails: a missing file results in status
    /// [`Status::NoFile`].
    pub fn open(path: impl AsRef<Path>) -> Self {
        Reader::open(path).into_header()
    }

    fn empty() -> Self {
        Self {
            status: Status::Ok,
            status_context: String::new(),
            format: None,
            version: String::new(),
            comments: Vec::new(),
            obj_info: Vec::new(),
            elements: Vec::new(),
        }
    }

    /// Creates a header that failed before the first byte was parsed.
    pub(crate) fn with_status(status: Status, context: impl Into<String>) -> Self {
        let mut out = Self::empty();
        out.status = status;
        out.status_context = context.into();
        out
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// A human readable description of where and why parsing stopped. Empty
    /// if the status is `Ok`.
    pub fn status_context(&self) -> &str {
        &self.status_context
    }

    pub fn is_ok(&self) -> bool {
        self.status.is_ok()
    }

    /// Returns an error describing the status if it is not `Ok`.
    pub fn check(&self) -> Result<(), Error> {
        if self.is_ok() {
            Ok(())
        } else {
            Err(Error::format(self.status, self.status_context.clone()))
        }
    }

    /// The declared body encoding. `None` if parsing stopped before the
    /// format line.
    pub fn format(&self) -> Option<Format> {
        self.format
    }

    pub fn is_ascii(&self) -> bool {
        self.format == Some(Format::Ascii)
    }

    /// Whether the body is little endian binary.
    pub fn is_lendian(&self) -> bool {
        self.format == Some(Format::BinaryLittleEndian)
    }

    /// The version token of the format line (in practice always `1.0`).
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    pub fn obj_info(&self) -> &[String] {
        &self.obj_info
    }

    /// All element definitions in declaration (and body) order.
    pub fn elements(&self) -> &[ElementDef] {
        &self.elements
    }

    pub fn element(&self, name: &str) -> Option<&ElementDef> {
        self.elements.iter().find(|e| e.name == name)
    }
}

impl fmt::Display for Header {
    /// Writes the header as it would appear in a file, `end_header` included.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "ply")?;
        if let Some(format) = self.format {
            writeln!(f, "format {} {}", format, self.version)?;
        }
        for comment in &self.comments {
            writeln!(f, "comment {}", comment)?;
        }
        for info in &self.obj_info {
            writeln!(f, "obj_info {}", info)?;
        }
        for element in &self.elements {
            write!(f, "{}", element)?;
        }
        writeln!(f, "end_header")
    }
}


// ===========================================================================
// ===== The state machine
// ===========================================================================

/// Parses the header from `input`, leaving `input` positioned at the first
/// byte of the body.
pub(crate) fn parse(input: &mut impl Input) -> Header {
    let mut header = Header::empty();

    match header.parse_lines(input) {
        Ok(()) => {
            debug!(
                "parsed PLY header: {} {}, {} element(s)",
                header.format.map(|f| f.to_string()).unwrap_or_default(),
                header.version,
                header.elements.len(),
            );
        }
        Err((status, context)) => {
            debug!("rejected PLY header: {}: {}", status, context);
            header.status = status;
            header.status_context = context;
        }
    }

    header
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Expecting the `ply` line.
    Magic,
    /// Expecting the `format` line (or comments).
    Format,
    /// Expecting declarations until `end_header`.
    Declarations,
}

/// What to do after a line was handled.
enum Step {
    Next(State),
    Done,
}

/// A failed line: the status and a message without the line context.
type LineError = (Status, String);

impl Header {
    fn parse_lines(&mut self, input: &mut impl Input) -> Result<(), LineError> {
        let mut state = State::Magic;
        let mut line_no = 0;

        loop {
            let line = match input.next_line() {
                Ok(Some(line)) => line,
                Ok(None) => return Err(eof_error(state, line_no)),
                Err(parse::Error::Io(e)) => {
                    return Err((Status::NoFile, format!("failed to read header: {}", e)));
                }
                Err(e) => {
                    return Err((Status::Unknown, format!("line {}: {}", line_no + 1, e)));
                }
            };
            line_no += 1;

            let tokens = line.split_ascii_whitespace().collect::<SmallVec<[&str; 6]>>();
            let step = match self.step(state, &line, &tokens) {
                // A header that never ends is reported as such, even if the
                // body follows right after the declarations.
                Err((Status::Unknown, _))
                    if state == State::Declarations && !skip_to_end_header(input) =>
                {
                    return Err((
                        Status::NoEndh,
                        format!(
                            "input has no \"end_header\" line (line {} is not a \
                                declaration: {:?})",
                            line_no,
                            line,
                        ),
                    ));
                }
                other => other.map_err(|(status, msg)| {
                    (status, format!("{} (line {}: {:?})", msg, line_no, line))
                })?,
            };

            match step {
                Step::Next(next) => state = next,
                Step::Done => return Ok(()),
            }
        }
    }

    /// Handles one line in the given state.
    fn step(&mut self, state: State, line: &str, tokens: &[&str]) -> Result<Step, LineError> {
        let keyword = tokens.first().copied().unwrap_or("");

        match state {
            State::Magic => {
                if line.trim_end() == "ply" {
                    Ok(Step::Next(State::Format))
                } else {
                    Err((Status::NoPly, "not a PLY file (first line is not \"ply\")".into()))
                }
            }

            State::Format => match keyword {
                "comment" => {
                    self.comments.push(rest_of_line(line, keyword));
                    Ok(Step::Next(state))
                }
                "obj_info" => {
                    self.obj_info.push(rest_of_line(line, keyword));
                    Ok(Step::Next(state))
                }
                "format" => {
                    self.parse_format(tokens)?;
                    Ok(Step::Next(State::Declarations))
                }
                _ => Err((Status::NoFmt, "expected \"format\" line".into())),
            },

            State::Declarations => match keyword {
                "comment" => {
                    self.comments.push(rest_of_line(line, keyword));
                    Ok(Step::Next(state))
                }
                "obj_info" => {
                    self.obj_info.push(rest_of_line(line, keyword));
                    Ok(Step::Next(state))
                }
                "element" => {
                    self.parse_element(tokens)?;
                    Ok(Step::Next(state))
                }
                "property" => {
                    self.parse_property(tokens)?;
                    Ok(Step::Next(state))
                }
                "end_header" if tokens.len() == 1 => Ok(Step::Done),
                "format" => Err((Status::BadFmt, "duplicate \"format\" line".into())),
                _ => Err((
                    Status::Unknown,
                    "expected line starting with \"comment\", \"obj_info\", \"element\", \
                        \"property\" or \"end_header\"".into(),
                )),
            },
        }
    }

    /// Format line, e.g. `format binary_little_endian 1.0`.
    fn parse_format(&mut self, tokens: &[&str]) -> Result<(), LineError> {
        if tokens.len() != 3 {
            return Err((
                Status::BadFmt,
                "expected \"format <encoding> <version>\"".into(),
            ));
        }

        let format = Format::from_keyword(tokens[1]).ok_or_else(|| {
            let msg = format!(
                "expected \"ascii\", \"binary_little_endian\" or \"binary_big_endian\", \
                    found {}",
                parse::debug_fmt_bytes(tokens[1].as_bytes()),
            );
            (Status::BadFmt, msg)
        })?;

        self.format = Some(format);
        self.version = tokens[2].to_string();
        Ok(())
    }

    /// Element definition, e.g. `element vertex 8`.
    fn parse_element(&mut self, tokens: &[&str]) -> Result<(), LineError> {
        if tokens.len() != 3 {
            return Err((Status::BadElem, "expected \"element <name> <count>\"".into()));
        }

        let name = tokens[1];
        let count = tokens[2].parse::<u32>().map_err(|e| {
            (Status::BadElem, format!("invalid integer as element count ({})", e))
        })?;

        if self.element(name).is_some() {
            return Err((Status::BadElem, format!("duplicate element '{}'", name)));
        }

        self.elements.push(ElementDef::new(name, count));
        Ok(())
    }

    /// Property definition, e.g. `property float x` or
    /// `property list uchar int vertex_indices`.
    fn parse_property(&mut self, tokens: &[&str]) -> Result<(), LineError> {
        // Get last element or error if there wasn't a preceding `element`
        // line.
        let elem = self.elements.last_mut().ok_or_else(|| {
            (
                Status::NoElem,
                String::from("property definition without preceding element definition"),
            )
        })?;

        let def = if tokens.get(1) == Some(&"list") {
            if tokens.len() != 5 {
                return Err((
                    Status::BadProp,
                    "expected \"property list <count_type> <value_type> <name>\"".into(),
                ));
            }

            let len_type = parse_type(tokens[2])?;
            let scalar_type = parse_type(tokens[3])?;

            // A float can't sensibly store a list length.
            if !len_type.is_integer() {
                return Err((
                    Status::BadProp,
                    format!("list length type of '{}' must be an integer type", tokens[4]),
                ));
            }

            PropertyDef::list(tokens[4], len_type, scalar_type)
        } else {
            if tokens.len() != 3 {
                return Err((Status::BadProp, "expected \"property <type> <name>\"".into()));
            }

            PropertyDef::scalar(tokens[2], parse_type(tokens[1])?)
        };

        if elem.property_def(&def.name).is_some() {
            return Err((
                Status::BadProp,
                format!("duplicate property '{}' in element '{}'", def.name, elem.name),
            ));
        }

        elem.property_defs.push(def);
        Ok(())
    }
}

fn parse_type(token: &str) -> Result<PrimitiveType, LineError> {
    token.parse::<PrimitiveType>().map_err(|e| (Status::BadType, e.to_string()))
}

/// Returns everything after the leading `keyword`, without the whitespace
/// separating the two.
fn rest_of_line(line: &str, keyword: &str) -> String {
    line.trim_start()[keyword.len()..].trim_start().to_string()
}

/// Consumes lines until one consisting only of `end_header`. Returns `false`
/// if the input ends (or can't be read) first.
fn skip_to_end_header(input: &mut impl Input) -> bool {
    loop {
        match input.next_line() {
            Ok(Some(line)) => {
                let mut tokens = line.split_ascii_whitespace();
                if tokens.next() == Some("end_header") && tokens.next().is_none() {
                    return true;
                }
            }
            Ok(None) | Err(_) => return false,
        }
    }
}

fn eof_error(state: State, line_no: usize) -> LineError {
    match state {
        State::Magic => (Status::NoPly, "input is empty".into()),
        State::Format => (
            Status::NoFmt,
            format!("input ended after line {} before the \"format\" line", line_no),
        ),
        State::Declarations => (
            Status::NoEndh,
            format!("input ended after line {} without \"end_header\"", line_no),
        ),
    }
}
