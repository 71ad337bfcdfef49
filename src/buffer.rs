//! Append-only storage for decoded values of one primitive type.

use num_traits::NumCast;

use crate::primitive::{Primitive, PrimitiveType, PrimitiveValue};


/// A growable vector of values of one [`PrimitiveType`].
///
/// The variant is chosen once from the property's value type and never
/// changes. Values are stored in native endianness, so typed slices can be
/// handed out directly (see [`TypedBuffer::as_slice`]) and the raw bytes can
/// be uploaded as they are (see [`TypedBuffer::as_bytes`]).
#[derive(Debug, Clone, PartialEq)]
pub enum TypedBuffer {
    Int8(Vec<i8>),
    Uint8(Vec<u8>),
    Int16(Vec<i16>),
    Uint16(Vec<u16>),
    Int32(Vec<i32>),
    Uint32(Vec<u32>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
}

/// Expands `$body` once per variant with `$v` bound to the inner vector.
macro_rules! each_variant {
    ($buf:expr, |$v:ident| $body:expr) => {
        match $buf {
            TypedBuffer::Int8($v) => $body,
            TypedBuffer::Uint8($v) => $body,
            TypedBuffer::Int16($v) => $body,
            TypedBuffer::Uint16($v) => $body,
            TypedBuffer::Int32($v) => $body,
            TypedBuffer::Uint32($v) => $body,
            TypedBuffer::Float32($v) => $body,
            TypedBuffer::Float64($v) => $body,
        }
    };
}

macro_rules! make_slice_method {
    ($name:ident, $ty:ident) => {
        /// Returns the values as `&[
        #[doc = stringify!($ty)]
        /// ]` or `None` if the buffer stores a different type.
        pub fn $name(&self) -> Option<&[$ty]> {
            self.as_slice::<$ty>()
        }
    };
}

impl TypedBuffer {
    /// Creates an empty buffer for values of type `ty`.
    pub fn new(ty: PrimitiveType) -> Self {
        Self::with_capacity(ty, 0)
    }

    pub fn with_capacity(ty: PrimitiveType, cap: usize) -> Self {
        match ty {
            PrimitiveType::Int8 => TypedBuffer::Int8(Vec::with_capacity(cap)),
            PrimitiveType::Uint8 => TypedBuffer::Uint8(Vec::with_capacity(cap)),
            PrimitiveType::Int16 => TypedBuffer::Int16(Vec::with_capacity(cap)),
            PrimitiveType::Uint16 => TypedBuffer::Uint16(Vec::with_capacity(cap)),
            PrimitiveType::Int32 => TypedBuffer::Int32(Vec::with_capacity(cap)),
            PrimitiveType::Uint32 => TypedBuffer::Uint32(Vec::with_capacity(cap)),
            PrimitiveType::Float32 => TypedBuffer::Float32(Vec::with_capacity(cap)),
            PrimitiveType::Float64 => TypedBuffer::Float64(Vec::with_capacity(cap)),
        }
    }

    /// The type of the stored values.
    pub fn ty(&self) -> PrimitiveType {
        match self {
            TypedBuffer::Int8(_) => PrimitiveType::Int8,
            TypedBuffer::Uint8(_) => PrimitiveType::Uint8,
            TypedBuffer::Int16(_) => PrimitiveType::Int16,
            TypedBuffer::Uint16(_) => PrimitiveType::Uint16,
            TypedBuffer::Int32(_) => PrimitiveType::Int32,
            TypedBuffer::Uint32(_) => PrimitiveType::Uint32,
            TypedBuffer::Float32(_) => PrimitiveType::Float32,
            TypedBuffer::Float64(_) => PrimitiveType::Float64,
        }
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        each_variant!(self, |v| v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends a value. Returns `false` (and stores nothing) if the value's
    /// type does not match the buffer's type.
    pub fn push(&mut self, value: PrimitiveValue) -> bool {
        match (self, value) {
            (TypedBuffer::Int8(v), PrimitiveValue::Int8(x)) => v.push(x),
            (TypedBuffer::Uint8(v), PrimitiveValue::Uint8(x)) => v.push(x),
            (TypedBuffer::Int16(v), PrimitiveValue::Int16(x)) => v.push(x),
            (TypedBuffer::Uint16(v), PrimitiveValue::Uint16(x)) => v.push(x),
            (TypedBuffer::Int32(v), PrimitiveValue::Int32(x)) => v.push(x),
            (TypedBuffer::Uint32(v), PrimitiveValue::Uint32(x)) => v.push(x),
            (TypedBuffer::Float32(v), PrimitiveValue::Float32(x)) => v.push(x),
            (TypedBuffer::Float64(v), PrimitiveValue::Float64(x)) => v.push(x),
            _ => return false,
        }

        true
    }

    /// Returns the value at `idx` or `None` if `idx` is out of bounds.
    pub fn get(&self, idx: usize) -> Option<PrimitiveValue> {
        each_variant!(self, |v| v.get(idx).map(Primitive::to_primitive_value))
    }

    /// Returns the value at `idx` converted to `T`. Returns `None` if `idx`
    /// is out of bounds or the value is not representable as `T`.
    pub fn get_as<T: NumCast>(&self, idx: usize) -> Option<T> {
        self.get(idx).and_then(|v| v.cast())
    }

    /// Returns all values if the buffer stores `T`, `None` otherwise.
    pub fn as_slice<T: Primitive>(&self) -> Option<&[T]> {
        T::slice_of(self)
    }

    make_slice_method!(as_i8, i8);
    make_slice_method!(as_u8, u8);
    make_slice_method!(as_i16, i16);
    make_slice_method!(as_u16, u16);
    make_slice_method!(as_i32, i32);
    make_slice_method!(as_u32, u32);
    make_slice_method!(as_f32, f32);
    make_slice_method!(as_f64, f64);

    /// The values as raw bytes in native endianness.
    pub fn as_bytes(&self) -> &[u8] {
        each_variant!(self, |v| bytemuck::cast_slice(v.as_slice()))
    }

    /// Iterates over all values, dynamically typed.
    pub fn iter(&self) -> impl Iterator<Item = PrimitiveValue> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }

    /// Converts all values in `range` to `T`, or returns `None` if one of
    /// them is not representable (or the range is out of bounds).
    pub fn to_vec_as<T: NumCast>(&self, range: std::ops::Range<usize>) -> Option<Vec<T>> {
        if range.end > self.len() {
            return None;
        }

        range.map(|i| self.get_as(i)).collect()
    }

    pub(crate) fn shrink_to_fit(&mut self) {
        each_variant!(self, |v| v.shrink_to_fit())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_get() {
        let mut buf = TypedBuffer::new(PrimitiveType::Int16);
        assert!(buf.is_empty());
        assert!(buf.push(PrimitiveValue::Int16(-4)));
        assert!(buf.push(PrimitiveValue::Int16(300)));
        assert!(!buf.push(PrimitiveValue::Uint8(1)));

        assert_eq!(buf.len(), 2);
        assert_eq!(buf.ty(), PrimitiveType::Int16);
        assert_eq!(buf.get(1), Some(PrimitiveValue::Int16(300)));
        assert_eq!(buf.get(2), None);
        assert_eq!(buf.as_i16(), Some(&[-4, 300][..]));
        assert_eq!(buf.as_u16(), None);
    }

    #[test]
    fn conversions() {
        let buf = TypedBuffer::Int32(vec![-1, 7, 255]);
        assert_eq!(buf.get_as::<f64>(0), Some(-1.0));
        assert_eq!(buf.get_as::<u8>(0), None);
        assert_eq!(buf.to_vec_as::<u8>(1..3), Some(vec![7, 255]));
        assert_eq!(buf.to_vec_as::<u8>(0..3), None);
        assert_eq!(buf.to_vec_as::<u8>(2..4), None);
        assert_eq!(buf.iter().count(), 3);
    }

    #[test]
    fn bytes_are_native_endian() {
        let buf = TypedBuffer::Uint16(vec![0x0102, 0x0304]);
        let mut expected = Vec::new();
        expected.extend_from_slice(&0x0102u16.to_ne_bytes());
        expected.extend_from_slice(&0x0304u16.to_ne_bytes());
        assert_eq!(buf.as_bytes(), &expected[..]);
    }
}
