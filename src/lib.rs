//! Loader for PLY files (Polygon File Format, also known as Stanford Triangle
//! Format).
//!
//! A PLY file consists of a textual header declaring a list of *elements*
//! (e.g. `vertex`, `face`), each with an instance count and a list of
//! *properties*, followed by a body holding the values of all instances,
//! either as ASCII text or binary (little or big endian).
//!
//! ```no_run
//! use plyload::{Reader, Status};
//!
//! let reader = Reader::open("bunny.ply");
//! if reader.header().status() != Status::Ok {
//!     eprintln!("{}", reader.header().status_context());
//!     return;
//! }
//!
//! let ply = reader.read_body().expect("broken body");
//! let vertex = ply.element("vertex").expect("no vertices");
//! let xs = vertex.property("x").and_then(|p| p.buffer.as_f32());
//! ```
//!
//! Parsing happens in two steps. Creating a [`Reader`] parses the header and
//! never fails: problems are reported through [`Header::status`]. Then
//! [`Reader::read_body`] decodes all elements into [`TypedBuffer`]s. The
//! [`geometry`] module maps the common `vertex`/`face` layout onto mesh data.

pub mod buffer;
pub mod element;
mod error;
pub mod geometry;
pub mod header;
mod parse;
pub mod primitive;
pub mod read;

pub use self::{
    buffer::TypedBuffer,
    element::{Element, ElementDef, Property, PropertyDef, PropertyType, PropertyValue},
    error::{Error, Status},
    header::{Format, Header},
    primitive::{Primitive, PrimitiveType, PrimitiveValue},
    read::{Ply, Reader},
};
