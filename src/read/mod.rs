//! Reading PLY files: [`Reader`] parses the header on construction and reads
//! the body on request.

use std::{
    cmp::min,
    fmt,
    fs::File,
    io,
    path::Path,
};

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use log::{trace, warn};

use crate::{
    Error, Status,
    buffer::TypedBuffer,
    element::{Element, ElementDef, Property, PropertyType},
    header::{self, Format, Header},
    parse::{self, Input, Span, buf::Buffer},
    primitive::{PrimitiveType, PrimitiveValue},
};




/// The declared instance count is only trusted up to this number when
/// pre-allocating. Beyond that, buffers grow as values are actually read.
const MAX_PREALLOC: usize = 1 << 16;


// ===========================================================================
// ===== Definition of `Reader`
// ===========================================================================

/// A reader able to read PLY files.
///
/// Creating a reader (with [`Reader::open`] or [`Reader::new`]) parses the
/// header right away. Inspect it with [`Reader::header`], then read the body
/// with [`Reader::read_body`]. The body is only read if the header status is
/// [`Status::Ok`].
pub struct Reader<R: io::Read> {
    header: Header,

    /// `None` if the input could not be opened.
    input: Option<Buffer<R>>,
}

impl Reader<File> {
    /// Tries to open the file specified by the given path and parses its
    /// header. If the file can't be opened, the header has the status
    /// [`Status::NoFile`].
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        // We don't need a `BufReader` here, because we will use our internal
        // parse buffer anyway.
        match File::open(path) {
            Ok(file) => Self::new(file),
            Err(e) => {
                let context = format!("failed to open '{}': {}", path.display(), e);
                Self {
                    header: Header::with_status(Status::NoFile, context),
                    input: None,
                }
            }
        }
    }
}

impl<R: io::Read> Reader<R> {
    /// Creates a new `Reader` from the given `io::Read` instance and parses
    /// the header of the given input.
    ///
    /// If you want to open a file, rather use [`Reader::open`].
    pub fn new(reader: R) -> Self {
        match Buffer::new(reader) {
            Ok(mut buf) => Self {
                header: header::parse(&mut buf),
                input: Some(buf),
            },
            Err(e) => Self {
                header: Header::with_status(Status::NoFile, format!("failed to read input: {}", e)),
                input: None,
            },
        }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Discards the body and returns the header.
    pub fn into_header(self) -> Header {
        self.header
    }

    /// Reads all elements of the body.
    ///
    /// Fails with the header's status if that is not `Ok`. Otherwise fails
    /// with [`Status::EarlyEof`] if the input ends before all declared
    /// values are read, and with [`Status::BadValue`] if an ASCII token is
    /// not a valid literal of its declared type or a list length is
    /// negative.
    pub fn read_body(self) -> Result<Ply, Error> {
        self.header.check()?;

        let mut input = match self.input {
            Some(input) => input,
            None => return Err(Error::format(Status::NoFile, "no input to read from")),
        };

        let defs = &self.header.elements;
        let elements = match self.header.format {
            Some(Format::Ascii) => read_elements::<AsciiEncoding, _>(&mut input, defs)?,
            Some(Format::BinaryLittleEndian) => {
                read_elements::<BleEncoding, _>(&mut input, defs)?
            }
            Some(Format::BinaryBigEndian) => {
                read_elements::<BbeEncoding, _>(&mut input, defs)?
            }
            None => return Err(Error::format(Status::NoFmt, "header declares no format")),
        };

        if has_trailing_data(&mut input, self.header.is_ascii()).unwrap_or(false) {
            warn!("ignoring trailing data after the last element (at byte {})", input.offset());
        }

        Ok(Ply {
            header: self.header,
            elements,
        })
    }
}

impl<R: io::Read> fmt::Debug for Reader<R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Reader")
            .field("header", &self.header)
            .field("has_input", &self.input.is_some())
            .finish()
    }
}

/// A completely read PLY file: the header and all decoded elements.
#[derive(Debug, Clone, PartialEq)]
pub struct Ply {
    pub header: Header,

    /// The decoded elements in the order of `header.elements()`.
    pub elements: Vec<Element>,
}

impl Ply {
    /// Opens, parses and reads the file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        Reader::open(path).read_body()
    }

    /// Parses and reads a PLY file from `reader`.
    pub fn from_reader(reader: impl io::Read) -> Result<Self, Error> {
        Reader::new(reader).read_body()
    }

    pub fn element(&self, name: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.name == name)
    }
}


// ===========================================================================
// ===== Body parsing
// ===========================================================================

/// Reads all instances of all elements in declaration order.
fn read_elements<E: EncodingReader, I: Input>(
    input: &mut I,
    defs: &[ElementDef],
) -> Result<Vec<Element>, Error> {
    let mut elements = Vec::with_capacity(defs.len());

    for def in defs {
        // A faulty count in the header can't make us allocate a lot of
        // memory: beyond `MAX_PREALLOC`, memory usage is bounded by the file
        // size.
        let mut elem = Element::new(def, min(def.count as usize, MAX_PREALLOC));

        for instance in 0..def.count {
            for prop in &mut elem.properties {
                read_property::<E, _>(input, prop)
                    .map_err(|e| body_error(e, def, instance, &prop.def.name))?;
            }
            elem.instances += 1;
        }

        elem.finish();
        trace!("read {} instance(s) of element '{}'", elem.instances, elem.name);
        elements.push(elem);
    }

    Ok(elements)
}

/// Reads the value(s) of one property of one instance into `prop`.
fn read_property<E: EncodingReader, I: Input>(
    input: &mut I,
    prop: &mut Property,
) -> Result<(), parse::Error> {
    match prop.def.ty {
        PropertyType::Scalar(_) => read_values::<E, _>(input, &mut prop.buffer, 1),
        PropertyType::List { len_type, .. } => {
            let len_start = input.offset();
            let len_value = read_value::<E, _>(input, len_type)?;
            let len = len_value.as_len().ok_or_else(|| {
                parse::Error::Custom(
                    format!("invalid list length {}", len_value),
                    Span::new(len_start, input.offset()),
                )
            })?;

            let start = prop.buffer.len();
            read_values::<E, _>(input, &mut prop.buffer, len)?;

            // The length type is at most 32 bits wide and `as_len` rejects
            // negative values, so this can't truncate.
            prop.counts.push(len as u32);
            prop.indices.push(start);
            Ok(())
        }
    }
}

/// Reads a single value of type `ty`.
fn read_value<E: EncodingReader, I: Input>(
    input: &mut I,
    ty: PrimitiveType,
) -> Result<PrimitiveValue, parse::Error> {
    let v = match ty {
        PrimitiveType::Int8 => PrimitiveValue::Int8(E::read_i8(input)?),
        PrimitiveType::Uint8 => PrimitiveValue::Uint8(E::read_u8(input)?),
        PrimitiveType::Int16 => PrimitiveValue::Int16(E::read_i16(input)?),
        PrimitiveType::Uint16 => PrimitiveValue::Uint16(E::read_u16(input)?),
        PrimitiveType::Int32 => PrimitiveValue::Int32(E::read_i32(input)?),
        PrimitiveType::Uint32 => PrimitiveValue::Uint32(E::read_u32(input)?),
        PrimitiveType::Float32 => PrimitiveValue::Float32(E::read_f32(input)?),
        PrimitiveType::Float64 => PrimitiveValue::Float64(E::read_f64(input)?),
    };

    Ok(v)
}

/// Appends `n` values of the buffer's type to `buf`.
fn read_values<E: EncodingReader, I: Input>(
    input: &mut I,
    buf: &mut TypedBuffer,
    n: usize,
) -> Result<(), parse::Error> {
    macro_rules! read_n {
        ($vec:ident, $read_fun:ident) => {{
            for _ in 0..n {
                $vec.push(E::$read_fun(input)?);
            }
        }}
    }

    match buf {
        TypedBuffer::Int8(v) => read_n!(v, read_i8),
        TypedBuffer::Uint8(v) => read_n!(v, read_u8),
        TypedBuffer::Int16(v) => read_n!(v, read_i16),
        TypedBuffer::Uint16(v) => read_n!(v, read_u16),
        TypedBuffer::Int32(v) => read_n!(v, read_i32),
        TypedBuffer::Uint32(v) => read_n!(v, read_u32),
        TypedBuffer::Float32(v) => read_n!(v, read_f32),
        TypedBuffer::Float64(v) => read_n!(v, read_f64),
    }

    Ok(())
}

/// Attaches the position in the schema to a low level parse error.
fn body_error(e: parse::Error, def: &ElementDef, instance: u32, prop_name: &str) -> Error {
    let location = format!(
        "property '{}' of element '{}', instance {} of {}",
        prop_name,
        def.name,
        instance,
        def.count,
    );

    match e {
        parse::Error::UnexpectedEof(offset) => Error::format(
            Status::EarlyEof,
            format!("input ended at byte {} while reading {}", offset, location),
        ),
        parse::Error::Custom(msg, span) => {
            Error::format(Status::BadValue, format!("{} at {} ({})", msg, span, location))
        }
        parse::Error::NotAscii(span) => {
            Error::format(Status::BadValue, format!("non-ASCII data at {} ({})", span, location))
        }
        parse::Error::LookAheadTooBig(offset) => Error::format(
            Status::BadValue,
            format!("token starting at byte {} is too long ({})", offset, location),
        ),
        parse::Error::Io(e) => Error::Io(e),
    }
}

/// Whether there is anything but (for ASCII) whitespace left.
fn has_trailing_data(input: &mut impl Input, ascii: bool) -> Result<bool, parse::Error> {
    if ascii {
        input.skip_until(|b: u8| !b.is_ascii_whitespace())?;
    }

    Ok(!input.is_eof()?)
}


// ===========================================================================
// ===== Encodings
// ===========================================================================

/// Helper trait to abstract the three different encodings.
trait EncodingReader {
    fn read_i8(buf: &mut impl Input) -> Result<i8, parse::Error>;
    fn read_u8(buf: &mut impl Input) -> Result<u8, parse::Error>;
    fn read_i16(buf: &mut impl Input) -> Result<i16, parse::Error>;
    fn read_u16(buf: &mut impl Input) -> Result<u16, parse::Error>;
    fn read_i32(buf: &mut impl Input) -> Result<i32, parse::Error>;
    fn read_u32(buf: &mut impl Input) -> Result<u32, parse::Error>;
    fn read_f32(buf: &mut impl Input) -> Result<f32, parse::Error>;
    fn read_f64(buf: &mut impl Input) -> Result<f64, parse::Error>;
}

// Defines a binary encoding reading multi-byte values in byte order `$order`.
macro_rules! binary_encoding {
    ($(#[$attr:meta])* $name:ident, $order:ident) => {
        $(#[$attr])*
        enum $name {}
        impl EncodingReader for $name {
            fn read_i8(buf: &mut impl Input) -> Result<i8, parse::Error> {
                buf.with_bytes(1, |sd| Ok(sd.data[0] as i8))
            }
            fn read_u8(buf: &mut impl Input) -> Result<u8, parse::Error> {
                buf.with_bytes(1, |sd| Ok(sd.data[0]))
            }
            fn read_i16(buf: &mut impl Input) -> Result<i16, parse::Error> {
                buf.with_bytes(2, |sd| Ok($order::read_i16(sd.data)))
            }
            fn read_u16(buf: &mut impl Input) -> Result<u16, parse::Error> {
                buf.with_bytes(2, |sd| Ok($order::read_u16(sd.data)))
            }
            fn read_i32(buf: &mut impl Input) -> Result<i32, parse::Error> {
                buf.with_bytes(4, |sd| Ok($order::read_i32(sd.data)))
            }
            fn read_u32(buf: &mut impl Input) -> Result<u32, parse::Error> {
                buf.with_bytes(4, |sd| Ok($order::read_u32(sd.data)))
            }
            fn read_f32(buf: &mut impl Input) -> Result<f32, parse::Error> {
                buf.with_bytes(4, |sd| Ok($order::read_f32(sd.data)))
            }
            fn read_f64(buf: &mut impl Input) -> Result<f64, parse::Error> {
                buf.with_bytes(8, |sd| Ok($order::read_f64(sd.data)))
            }
        }
    }
}

binary_encoding!(
    /// Binary little endian encoding.
    BleEncoding, LittleEndian
);
binary_encoding!(
    /// Binary big endian encoding.
    BbeEncoding, BigEndian
);

// Reads the next whitespace delimited token and tries to parse it as `$ty`.
macro_rules! ascii_parser {
    ($buf:ident, $ty:ident) => {
        $buf.take_token(|sd| {
            let s = sd.assert_ascii()?;
            s.parse::<$ty>().map_err(|e| {
                let msg = format!(
                    concat!("invalid '", stringify!($ty), "' literal {:?}: {}"),
                    s,
                    e,
                );
                sd.error(msg)
            })
        })
    }
}

/// ASCII encoding.
enum AsciiEncoding {}
impl EncodingReader for AsciiEncoding {
    fn read_i8(buf: &mut impl Input) -> Result<i8, parse::Error> {
        ascii_parser!(buf, i8)
    }
    fn read_u8(buf: &mut impl Input) -> Result<u8, parse::Error> {
        ascii_parser!(buf, u8)
    }
    fn read_i16(buf: &mut impl Input) -> Result<i16, parse::Error> {
        ascii_parser!(buf, i16)
    }
    fn read_u16(buf: &mut impl Input) -> Result<u16, parse::Error> {
        ascii_parser!(buf, u16)
    }
    fn read_i32(buf: &mut impl Input) -> Result<i32, parse::Error> {
        ascii_parser!(buf, i32)
    }
    fn read_u32(buf: &mut impl Input) -> Result<u32, parse::Error> {
        ascii_parser!(buf, u32)
    }
    fn read_f32(buf: &mut impl Input) -> Result<f32, parse::Error> {
        ascii_parser!(buf, f32)
    }
    fn read_f64(buf: &mut impl Input) -> Result<f64, parse::Error> {
        ascii_parser!(buf, f64)
    }
}
