//! Interpreting the conventional `vertex` and `face` elements as a triangle
//! mesh.
//!
//! PLY itself assigns no meaning to element or property names. By convention
//! though, vertex positions are stored in a `vertex` element with `x`, `y`
//! and `z` properties (normals in `nx`, `ny`, `nz`) and polygons in a `face`
//! element with a list property `vertex_indices` (sometimes `vertex_index`).
//! [`Mesh::from_ply`] extracts exactly that and nothing else.

use cgmath::{Point3, Vector3};
use failure::Fail;
use log::warn;

use crate::{Element, Ply};


/// Names of the element storing vertices.
pub const VERTEX_ELEMENT_NAMES: &[&str] = &["vertex"];

/// Names of the element storing faces.
pub const FACE_ELEMENT_NAMES: &[&str] = &["face"];

/// Names of the list property of a face storing its vertex indices.
pub const VERTEX_INDICES_NAMES: &[&str] = &["vertex_indices", "vertex_index"];

#[derive(Debug, Fail)]
pub enum GeometryError {
    #[fail(display = "no '{}' element in PLY file", _0)]
    MissingElement(&'static str),

    #[fail(display = "element '{}' has no property '{}'", element, property)]
    MissingProperty {
        element: String,
        property: String,
    },

    #[fail(display = "property '{}' of element '{}' has to be a {}", property, element, expected)]
    WrongKind {
        element: String,
        property: String,
        expected: &'static str,
    },

    #[fail(
        display = "value of property '{}' of element '{}' (instance {}) is not representable",
        property, element, instance,
    )]
    InvalidValue {
        element: String,
        property: String,
        instance: usize,
    },

    #[fail(
        display = "face {} references vertex {}, but there are only {} vertices",
        face, index, vertex_count,
    )]
    IndexOutOfBounds {
        face: usize,
        index: u64,
        vertex_count: usize,
    },
}

/// A triangle mesh as used by renderers.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub positions: Vec<Point3<f32>>,

    /// Per vertex normals, if the file has `nx`, `ny` and `nz`.
    pub normals: Option<Vec<Vector3<f32>>>,

    /// Faces with more than three vertices are triangulated as a fan around
    /// their first vertex.
    pub triangles: Vec<[u32; 3]>,
}

impl Mesh {
    /// Extracts vertex positions, normals and triangles. The `vertex` element
    /// with `x`, `y` and `z` is required, the `face` element is not.
    pub fn from_ply(ply: &Ply) -> Result<Self, GeometryError> {
        let vertex = find_element(ply, VERTEX_ELEMENT_NAMES)
            .ok_or(GeometryError::MissingElement("vertex"))?;

        let positions = vec3_prop(vertex, ["x", "y", "z"])?
            .ok_or_else(|| GeometryError::MissingProperty {
                element: vertex.name.clone(),
                property: "x".into(),
            })?
            .into_iter()
            .map(Point3::from)
            .collect::<Vec<_>>();

        let normals = vec3_prop(vertex, ["nx", "ny", "nz"])?
            .map(|v| v.into_iter().map(Vector3::from).collect());

        let triangles = match find_element(ply, FACE_ELEMENT_NAMES) {
            Some(face) => triangulate(face, positions.len())?,
            None => Vec::new(),
        };

        Ok(Self { positions, normals, triangles })
    }
}

fn find_element<'a>(ply: &'a Ply, names: &[&str]) -> Option<&'a Element> {
    ply.elements.iter().find(|e| names.contains(&e.name.as_str()))
}

/// Reads three scalar properties as `f32` triples. Returns `None` if none of
/// them exist and an error if only some exist.
fn vec3_prop(elem: &Element, names: [&str; 3]) -> Result<Option<Vec<[f32; 3]>>, GeometryError> {
    let props = names.iter().map(|&n| elem.property(n)).collect::<Vec<_>>();
    if props.iter().all(Option::is_none) {
        return Ok(None);
    }

    let mut columns = Vec::with_capacity(3);
    for (prop, &name) in props.into_iter().zip(&names) {
        let prop = prop.ok_or_else(|| GeometryError::MissingProperty {
            element: elem.name.clone(),
            property: name.into(),
        })?;

        if prop.is_list() {
            return Err(GeometryError::WrongKind {
                element: elem.name.clone(),
                property: name.into(),
                expected: "scalar",
            });
        }

        columns.push(prop);
    }

    (0..elem.instances as usize)
        .map(|i| {
            let mut out = [0.0; 3];
            for (c, prop) in columns.iter().enumerate() {
                out[c] = prop.buffer.get_as::<f32>(i).ok_or_else(|| {
                    GeometryError::InvalidValue {
                        element: elem.name.clone(),
                        property: prop.def.name.clone(),
                        instance: i,
                    }
                })?;
            }
            Ok(out)
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

/// Turns every face with at least three vertices into a triangle fan.
fn triangulate(face: &Element, vertex_count: usize) -> Result<Vec<[u32; 3]>, GeometryError> {
    let prop = VERTEX_INDICES_NAMES.iter()
        .find_map(|&n| face.property(n))
        .ok_or_else(|| GeometryError::MissingProperty {
            element: face.name.clone(),
            property: VERTEX_INDICES_NAMES[0].into(),
        })?;

    if !prop.is_list() {
        return Err(GeometryError::WrongKind {
            element: face.name.clone(),
            property: prop.def.name.clone(),
            expected: "list",
        });
    }

    let mut triangles = Vec::with_capacity(face.instances as usize);
    let mut skipped = 0;
    for f in 0..face.instances as usize {
        let invalid = || GeometryError::InvalidValue {
            element: face.name.clone(),
            property: prop.def.name.clone(),
            instance: f,
        };

        let range = prop.range(f).ok_or_else(invalid)?;
        let indices = prop.buffer.to_vec_as::<u64>(range).ok_or_else(invalid)?;

        if let Some(&index) = indices.iter().find(|&&i| i >= vertex_count as u64) {
            return Err(GeometryError::IndexOutOfBounds { face: f, index, vertex_count });
        }

        if indices.len() < 3 {
            skipped += 1;
            continue;
        }

        // All indices are below `vertex_count`, which fits in `u32` since
        // element counts are `u32`.
        for k in 1..indices.len() - 1 {
            triangles.push([indices[0] as u32, indices[k] as u32, indices[k + 1] as u32]);
        }
    }

    if skipped > 0 {
        warn!("skipped {} face(s) with less than three vertices", skipped);
    }

    Ok(triangles)
}
