//! The eight scalar types PLY knows about.
//!
//! [`PrimitiveType`] is the registry: it maps the textual type names used in
//! PLY headers (canonical names like `float32` as well as the older aliases
//! like `float`) to one closed enumeration. [`PrimitiveValue`] is one
//! dynamically typed value and [`Primitive`] abstracts over the matching Rust
//! types.

use std::{
    fmt,
    str::FromStr,
};

use derive_more::Display;
use num_traits::{NumCast, ToPrimitive};


/// The type of a scalar PLY value.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    #[display(fmt = "int8")]
    Int8,
    #[display(fmt = "uint8")]
    Uint8,
    #[display(fmt = "int16")]
    Int16,
    #[display(fmt = "uint16")]
    Uint16,
    #[display(fmt = "int32")]
    Int32,
    #[display(fmt = "uint32")]
    Uint32,
    #[display(fmt = "float32")]
    Float32,
    #[display(fmt = "float64")]
    Float64,
}

impl PrimitiveType {
    /// All types in the order of their ID.
    pub const ALL: [PrimitiveType; 8] = [
        PrimitiveType::Int8,
        PrimitiveType::Uint8,
        PrimitiveType::Int16,
        PrimitiveType::Uint16,
        PrimitiveType::Int32,
        PrimitiveType::Uint32,
        PrimitiveType::Float32,
        PrimitiveType::Float64,
    ];

    /// Canonical names, indexed by ID.
    pub const NAMES: [&'static str; 8] = [
        "int8", "uint8", "int16", "uint16", "int32", "uint32", "float32", "float64",
    ];

    /// Names used by older PLY writers, indexed by ID.
    pub const ALIASES: [&'static str; 8] = [
        "char", "uchar", "short", "ushort", "int", "uint", "float", "double",
    ];

    /// Looks up a type by its canonical name or its alias. Case sensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::NAMES.iter()
            .position(|&n| n == name)
            .or_else(|| Self::ALIASES.iter().position(|&n| n == name))
            .map(Self::from_id)
    }

    fn from_id(id: usize) -> Self {
        Self::ALL[id]
    }

    /// The position of this type in [`PrimitiveType::ALL`].
    pub fn id(&self) -> usize {
        *self as usize
    }

    /// The canonical name, e.g. `uint8`.
    pub fn name(&self) -> &'static str {
        Self::NAMES[self.id()]
    }

    /// The older alias, e.g. `uchar`.
    pub fn alias(&self) -> &'static str {
        Self::ALIASES[self.id()]
    }

    /// Returns the number of bytes a value of this type occupies in a binary
    /// PLY body.
    pub fn size(&self) -> usize {
        match self {
            PrimitiveType::Int8 | PrimitiveType::Uint8 => 1,
            PrimitiveType::Int16 | PrimitiveType::Uint16 => 2,
            PrimitiveType::Int32 | PrimitiveType::Uint32 | PrimitiveType::Float32 => 4,
            PrimitiveType::Float64 => 8,
        }
    }

    /// Returns `true` if and only if the type is either `float32` or
    /// `float64`.
    pub fn is_floating_point(&self) -> bool {
        *self == PrimitiveType::Float32 || *self == PrimitiveType::Float64
    }

    /// Returns `true` for all integer types, signed or unsigned.
    pub fn is_integer(&self) -> bool {
        !self.is_floating_point()
    }

    pub fn is_unsigned_integer(&self) -> bool {
        match self {
            PrimitiveType::Uint8 | PrimitiveType::Uint16 | PrimitiveType::Uint32 => true,
            _ => false,
        }
    }
}

/// The error emitted when the `FromStr` implementation for `PrimitiveType`
/// cannot parse the given string.
#[derive(Clone, PartialEq, Eq)]
pub struct PrimitiveTypeParseError(String);

impl fmt::Display for PrimitiveTypeParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "\"{}\" is not a valid PLY scalar type", self.0)
    }
}

impl fmt::Debug for PrimitiveTypeParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl FromStr for PrimitiveType {
    type Err = PrimitiveTypeParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| PrimitiveTypeParseError(s.to_string()))
    }
}


/// One dynamically typed scalar value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PrimitiveValue {
    Int8(i8),
    Uint8(u8),
    Int16(i16),
    Uint16(u16),
    Int32(i32),
    Uint32(u32),
    Float32(f32),
    Float64(f64),
}

macro_rules! make_convert_method {
    ($name:ident, $ty:ident, $variant:ident) => {
        make_convert_method!($name, $ty, $variant, stringify!($ty), stringify!($variant));
    };
    ($name:ident, $ty:ident, $variant:ident, $ty_str:expr, $variant_str:expr) => {
        /// Returns this value as `
        #[doc = $ty_str]
        /// ` if `self` is `
        #[doc = $variant_str]
        /// `. Otherwise, `None` is returned. This function does not cast
        /// between different number types!
        pub fn $name(&self) -> Option<$ty> {
            match self {
                PrimitiveValue::$variant(x) => Some(*x),
                _ => None,
            }
        }
    };
}

impl PrimitiveValue {
    make_convert_method!(as_i8, i8, Int8);
    make_convert_method!(as_u8, u8, Uint8);
    make_convert_method!(as_i16, i16, Int16);
    make_convert_method!(as_u16, u16, Uint16);
    make_convert_method!(as_i32, i32, Int32);
    make_convert_method!(as_u32, u32, Uint32);
    make_convert_method!(as_f32, f32, Float32);
    make_convert_method!(as_f64, f64, Float64);

    /// Returns the type of this value.
    pub fn ty(&self) -> PrimitiveType {
        match self {
            PrimitiveValue::Int8(_) => PrimitiveType::Int8,
            PrimitiveValue::Uint8(_) => PrimitiveType::Uint8,
            PrimitiveValue::Int16(_) => PrimitiveType::Int16,
            PrimitiveValue::Uint16(_) => PrimitiveType::Uint16,
            PrimitiveValue::Int32(_) => PrimitiveType::Int32,
            PrimitiveValue::Uint32(_) => PrimitiveType::Uint32,
            PrimitiveValue::Float32(_) => PrimitiveType::Float32,
            PrimitiveValue::Float64(_) => PrimitiveType::Float64,
        }
    }

    /// Converts the value to `T`, returning `None` if it is not representable
    /// (e.g. a negative value as `u32`). Floats are truncated when cast to
    /// integers.
    pub fn cast<T: NumCast>(&self) -> Option<T> {
        match *self {
            PrimitiveValue::Int8(v) => <T as NumCast>::from(v),
            PrimitiveValue::Uint8(v) => <T as NumCast>::from(v),
            PrimitiveValue::Int16(v) => <T as NumCast>::from(v),
            PrimitiveValue::Uint16(v) => <T as NumCast>::from(v),
            PrimitiveValue::Int32(v) => <T as NumCast>::from(v),
            PrimitiveValue::Uint32(v) => <T as NumCast>::from(v),
            PrimitiveValue::Float32(v) => <T as NumCast>::from(v),
            PrimitiveValue::Float64(v) => <T as NumCast>::from(v),
        }
    }

    /// Interprets the value as a list length. Returns `None` for negative
    /// values and floating point values.
    pub fn as_len(&self) -> Option<usize> {
        match *self {
            PrimitiveValue::Float32(_) | PrimitiveValue::Float64(_) => None,
            PrimitiveValue::Int8(v) => v.to_usize(),
            PrimitiveValue::Uint8(v) => v.to_usize(),
            PrimitiveValue::Int16(v) => v.to_usize(),
            PrimitiveValue::Uint16(v) => v.to_usize(),
            PrimitiveValue::Int32(v) => v.to_usize(),
            PrimitiveValue::Uint32(v) => v.to_usize(),
        }
    }
}

impl fmt::Display for PrimitiveValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PrimitiveValue::Int8(v) => v.fmt(f),
            PrimitiveValue::Uint8(v) => v.fmt(f),
            PrimitiveValue::Int16(v) => v.fmt(f),
            PrimitiveValue::Uint16(v) => v.fmt(f),
            PrimitiveValue::Int32(v) => v.fmt(f),
            PrimitiveValue::Uint32(v) => v.fmt(f),
            PrimitiveValue::Float32(v) => v.fmt(f),
            PrimitiveValue::Float64(v) => v.fmt(f),
        }
    }
}


mod internal {
    pub trait DoNotImplement {}
}

/// Abstracts over the Rust types matching the PLY primitive types.
///
/// This is a closed set: it is implemented exactly for `i8`, `u8`, `i16`,
/// `u16`, `i32`, `u32`, `f32` and `f64`. The crate-private supertrait makes
/// sure nobody else can implement it.
pub trait Primitive:
    Copy + fmt::Debug + PartialEq + NumCast + bytemuck::Pod + internal::DoNotImplement
{
    /// The type represented as this [`PrimitiveType`] value.
    const TY: PrimitiveType;

    /// Returns the primitive as a [`PrimitiveValue`] (basically dynamic
    /// typing).
    fn to_primitive_value(&self) -> PrimitiveValue;

    /// Returns the values of `buf` if it stores `Self`, or `None` otherwise.
    fn slice_of(buf: &crate::TypedBuffer) -> Option<&[Self]>;
}

macro_rules! impl_primitive {
    ($ty:ident, $variant:ident) => {
        impl internal::DoNotImplement for $ty {}
        impl Primitive for $ty {
            const TY: PrimitiveType = PrimitiveType::$variant;

            fn to_primitive_value(&self) -> PrimitiveValue {
                PrimitiveValue::$variant(*self)
            }

            fn slice_of(buf: &crate::TypedBuffer) -> Option<&[Self]> {
                match buf {
                    crate::TypedBuffer::$variant(v) => Some(v.as_slice()),
                    _ => None,
                }
            }
        }
    }
}

impl_primitive!(i8,  Int8);
impl_primitive!(u8,  Uint8);
impl_primitive!(i16, Int16);
impl_primitive!(u16, Uint16);
impl_primitive!(i32, Int32);
impl_primitive!(u32, Uint32);
impl_primitive!(f32, Float32);
impl_primitive!(f64, Float64);


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for &ty in &PrimitiveType::ALL {
            assert_eq!(PrimitiveType::from_name(ty.name()), Some(ty));
            assert_eq!(ty.to_string().parse::<PrimitiveType>(), Ok(ty));
        }
    }

    #[test]
    fn aliases_match_canonical() {
        for (alias, name) in PrimitiveType::ALIASES.iter().zip(&PrimitiveType::NAMES) {
            assert_eq!(PrimitiveType::from_name(alias), PrimitiveType::from_name(name));
            assert!(PrimitiveType::from_name(alias).is_some());
        }

        assert_eq!(PrimitiveType::from_name("float"), Some(PrimitiveType::Float32));
        assert_eq!(PrimitiveType::from_name("uchar"), Some(PrimitiveType::Uint8));
        assert_eq!(PrimitiveType::Uint8.alias(), "uchar");
    }

    #[test]
    fn unknown_names() {
        for &name in &["blob", "Float", "FLOAT32", "", "int64", "uint8 "] {
            assert_eq!(PrimitiveType::from_name(name), None, "{:?}", name);
        }

        let err = "blob".parse::<PrimitiveType>().unwrap_err();
        assert_eq!(err.to_string(), "\"blob\" is not a valid PLY scalar type");
    }

    #[test]
    fn sizes() {
        let sizes = PrimitiveType::ALL.iter().map(|t| t.size()).collect::<Vec<_>>();
        assert_eq!(sizes, [1, 1, 2, 2, 4, 4, 4, 8]);
    }

    #[test]
    fn type_classes() {
        let unsigned = PrimitiveType::ALL.iter()
            .filter(|t| t.is_unsigned_integer())
            .map(|t| t.name())
            .collect::<Vec<_>>();
        assert_eq!(unsigned, ["uint8", "uint16", "uint32"]);

        for ty in &PrimitiveType::ALL {
            assert_ne!(ty.is_integer(), ty.is_floating_point(), "{}", ty);
            if ty.is_unsigned_integer() {
                assert!(ty.is_integer(), "{}", ty);
            }
        }
    }

    #[test]
    fn value_conversions() {
        assert_eq!(PrimitiveValue::Int8(-3).as_len(), None);
        assert_eq!(PrimitiveValue::Uint8(3).as_len(), Some(3));
        assert_eq!(PrimitiveValue::Float32(3.0).as_len(), None);
        assert_eq!(PrimitiveValue::Int16(-3).cast::<f32>(), Some(-3.0));
        assert_eq!(PrimitiveValue::Int16(-3).cast::<u32>(), None);
        assert_eq!(PrimitiveValue::Float64(2.5).as_f64(), Some(2.5));
        assert_eq!(PrimitiveValue::Float64(2.5).as_f32(), None);
        assert_eq!(7u16.to_primitive_value().ty(), PrimitiveType::Uint16);
    }
}
