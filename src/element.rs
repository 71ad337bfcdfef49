//! Element and property descriptors.
//!
//! These come in two phases. The header parser produces the immutable schema
//! ([`ElementDef`], [`PropertyDef`]). The body reader then fills the read
//! state ([`Element`], [`Property`]): one [`TypedBuffer`] per property plus,
//! for list properties, the length and start index of each instance's list.

use std::{
    fmt,
    ops::Range,
};

use smallvec::SmallVec;

use crate::{
    buffer::TypedBuffer,
    primitive::{PrimitiveType, PrimitiveValue},
};


// ===========================================================================
// ===== Schema
// ===========================================================================

/// The header definition of one element group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementDef {
    pub name: String,

    /// Number of instances of this element in the body.
    pub count: u32,

    /// Definitions for all properties, in declaration order.
    pub property_defs: Vec<PropertyDef>,
}

impl ElementDef {
    pub fn new(name: impl Into<String>, count: u32) -> Self {
        Self {
            name: name.into(),
            count,
            property_defs: Vec::new(),
        }
    }

    /// Returns the index of the property with the given name.
    pub fn prop_pos(&self, prop_name: &str) -> Option<usize> {
        self.property_defs.iter().position(|p| p.name == prop_name)
    }

    pub fn property_def(&self, prop_name: &str) -> Option<&PropertyDef> {
        self.property_defs.iter().find(|p| p.name == prop_name)
    }

    /// Whether any of the properties is a list.
    pub fn has_list(&self) -> bool {
        self.property_defs.iter().any(|p| p.ty.is_list())
    }
}

impl fmt::Display for ElementDef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "element {} {}", self.name, self.count)?;
        for prop in &self.property_defs {
            writeln!(f, "{}", prop)?;
        }

        Ok(())
    }
}

/// The header definition of one property of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDef {
    pub name: String,
    pub ty: PropertyType,
}

impl PropertyDef {
    pub fn scalar(name: impl Into<String>, ty: PrimitiveType) -> Self {
        Self {
            name: name.into(),
            ty: PropertyType::Scalar(ty),
        }
    }

    pub fn list(name: impl Into<String>, len_type: PrimitiveType, scalar_type: PrimitiveType) -> Self {
        Self {
            name: name.into(),
            ty: PropertyType::List { len_type, scalar_type },
        }
    }
}

impl fmt::Display for PropertyDef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.ty {
            PropertyType::Scalar(ty) => write!(f, "property {} {}", ty, self.name),
            PropertyType::List { len_type, scalar_type } => {
                write!(f, "property list {} {} {}", len_type, scalar_type, self.name)
            }
        }
    }
}

/// Type of a property: either a single value or a list of values prefixed by
/// its length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyType {
    Scalar(PrimitiveType),
    List {
        /// Type of the length prefix. Always an integer type.
        len_type: PrimitiveType,
        scalar_type: PrimitiveType,
    },
}

impl PropertyType {
    /// The type of the length prefix, or `None` for scalar properties.
    pub fn len_type(&self) -> Option<PrimitiveType> {
        match self {
            PropertyType::Scalar(_) => None,
            PropertyType::List { len_type, .. } => Some(*len_type),
        }
    }

    /// The type of each value.
    pub fn scalar_type(&self) -> PrimitiveType {
        match *self {
            PropertyType::Scalar(scalar_type) => scalar_type,
            PropertyType::List { scalar_type, .. } => scalar_type,
        }
    }

    pub fn is_list(&self) -> bool {
        self.len_type().is_some()
    }
}


// ===========================================================================
// ===== Read state
// ===========================================================================

/// All decoded instances of one element.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,

    /// Number of instances read.
    pub instances: u32,

    /// Whether any property is a list.
    pub has_list: bool,

    /// Whether the lengths of any list property differ between instances.
    /// If this is `false`, every list property can be viewed as a flat array
    /// with a fixed stride (see [`Property::fixed_len`]).
    pub has_list_multisize: bool,

    pub properties: Vec<Property>,
}

impl Element {
    /// Creates the empty read state for `def`. `capacity_hint` is the number
    /// of instances to reserve space for.
    pub(crate) fn new(def: &ElementDef, capacity_hint: usize) -> Self {
        Self {
            name: def.name.clone(),
            instances: 0,
            has_list: def.has_list(),
            has_list_multisize: false,
            properties: def.property_defs.iter()
                .map(|p| Property::new(p.clone(), capacity_hint))
                .collect(),
        }
    }

    /// Finishes reading: computes `has_list_multisize` and releases unused
    /// capacity.
    pub(crate) fn finish(&mut self) {
        let instances = self.instances;
        self.has_list_multisize = self.properties.iter()
            .any(|p| p.is_list() && p.fixed_len().is_none() && instances > 1);

        for prop in &mut self.properties {
            prop.buffer.shrink_to_fit();
        }
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.def.name == name)
    }

    /// Returns the values of all properties of instance `idx`, in declaration
    /// order, or `None` if `idx` is out of bounds.
    pub fn instance(&self, idx: usize) -> Option<Vec<PropertyValue>> {
        if idx >= self.instances as usize {
            return None;
        }

        self.properties.iter().map(|p| p.value(idx)).collect()
    }
}

/// All decoded values of one property.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub def: PropertyDef,

    /// The values of all instances, contiguous and in instance order. For list
    /// properties, the length prefixes are not stored here.
    pub buffer: TypedBuffer,

    /// List properties only: the length of each instance's list.
    pub counts: Vec<u32>,

    /// List properties only: the index into `buffer` at which each instance's
    /// list starts.
    pub indices: Vec<usize>,
}

impl Property {
    fn new(def: PropertyDef, capacity_hint: usize) -> Self {
        let (counts, indices) = if def.ty.is_list() {
            (Vec::with_capacity(capacity_hint), Vec::with_capacity(capacity_hint))
        } else {
            (Vec::new(), Vec::new())
        };

        Self {
            buffer: TypedBuffer::with_capacity(def.ty.scalar_type(), capacity_hint),
            def,
            counts,
            indices,
        }
    }

    pub fn is_list(&self) -> bool {
        self.def.ty.is_list()
    }

    /// Number of instances stored.
    pub fn instances(&self) -> usize {
        if self.is_list() {
            self.counts.len()
        } else {
            self.buffer.len()
        }
    }

    /// The range in `buffer` holding the value(s) of instance `idx`, or `None`
    /// if `idx` is out of bounds.
    pub fn range(&self, idx: usize) -> Option<Range<usize>> {
        if self.is_list() {
            let start = *self.indices.get(idx)?;
            let len = *self.counts.get(idx)? as usize;
            Some(start..start + len)
        } else if idx < self.buffer.len() {
            Some(idx..idx + 1)
        } else {
            None
        }
    }

    /// The list length of instance `idx`. Scalar properties always have
    /// length 1.
    pub fn len_of(&self, idx: usize) -> Option<usize> {
        self.range(idx).map(|r| r.len())
    }

    /// If this is a list property and all instances have lists of the same
    /// length, returns that length. A list property without instances has no
    /// fixed length.
    pub fn fixed_len(&self) -> Option<u32> {
        if !self.is_list() {
            return None;
        }

        let first = *self.counts.first()?;
        if self.counts.iter().all(|&c| c == first) {
            Some(first)
        } else {
            None
        }
    }

    /// Returns the value of instance `idx`.
    pub fn value(&self, idx: usize) -> Option<PropertyValue> {
        let range = self.range(idx)?;
        if self.is_list() {
            range.map(|i| self.buffer.get(i))
                .collect::<Option<_>>()
                .map(PropertyValue::List)
        } else {
            self.buffer.get(range.start).map(PropertyValue::Scalar)
        }
    }
}

/// The value of one property of one instance.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Scalar(PrimitiveValue),

    /// The most common list, the three `vertex_indices` of a triangle, fits
    /// inline.
    List(SmallVec<[PrimitiveValue; 4]>),
}

impl PropertyValue {
    pub fn as_scalar(&self) -> Option<PrimitiveValue> {
        match self {
            PropertyValue::Scalar(v) => Some(*v),
            PropertyValue::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[PrimitiveValue]> {
        match self {
            PropertyValue::Scalar(_) => None,
            PropertyValue::List(l) => Some(l),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn face_def() -> ElementDef {
        let mut def = ElementDef::new("face", 2);
        def.property_defs.push(PropertyDef::scalar("flags", PrimitiveType::Uint8));
        def.property_defs.push(
            PropertyDef::list("vertex_indices", PrimitiveType::Uint8, PrimitiveType::Int32),
        );
        def
    }

    #[test]
    fn display_uses_canonical_names() {
        assert_eq!(
            face_def().to_string(),
            "element face 2\n\
             property uint8 flags\n\
             property list uint8 int32 vertex_indices\n",
        );
    }

    #[test]
    fn list_ranges() {
        let def = face_def();
        assert!(def.has_list());
        assert_eq!(def.prop_pos("vertex_indices"), Some(1));

        let mut elem = Element::new(&def, 2);
        elem.properties[0].buffer = TypedBuffer::Uint8(vec![1, 0]);
        let list = &mut elem.properties[1];
        list.buffer = TypedBuffer::Int32(vec![0, 1, 2, 2, 3, 0, 4]);
        list.counts = vec![3, 4];
        list.indices = vec![0, 3];
        elem.instances = 2;
        elem.finish();

        assert!(elem.has_list_multisize);
        let list = elem.property("vertex_indices").unwrap();
        assert_eq!(list.range(1), Some(3..7));
        assert_eq!(list.len_of(0), Some(3));
        assert_eq!(list.fixed_len(), None);
        assert_eq!(list.range(2), None);

        let values = elem.instance(0).unwrap();
        assert_eq!(values[0], PropertyValue::Scalar(PrimitiveValue::Uint8(1)));
        assert_eq!(values[1].as_list().map(|l| l.len()), Some(3));
        assert_eq!(elem.instance(2), None);
    }

    #[test]
    fn scalar_has_no_fixed_len() {
        let mut elem = Element::new(&face_def(), 0);
        elem.properties[0].buffer = TypedBuffer::Uint8(vec![5]);
        let scalar = &elem.properties[0];
        assert_eq!(scalar.fixed_len(), None);
        assert_eq!(scalar.range(0), Some(0..1));
        assert_eq!(scalar.value(0), Some(PropertyValue::Scalar(PrimitiveValue::Uint8(5))));
    }
}
