use failure::Error;

use crate::{
    element::PropertyType,
    primitive::PrimitiveType,
    read::Reader,
};
use super::*;


fn parse(data: &[u8]) -> Header {
    Reader::new(data).into_header()
}

fn status_of(data: &[u8]) -> Status {
    parse(data).status()
}

const VERTEX_HEADER: &[u8] = b"\
    ply\n\
    format ascii 1.0\n\
    element vertex 1\n\
    property float x\n\
    property float y\n\
    property float z\n\
    end_header\n\
";

#[test]
fn simple_vertex_header() {
    let header = parse(VERTEX_HEADER);

    assert_eq!(header.status(), Status::Ok);
    assert_eq!(header.status_context(), "");
    assert!(header.check().is_ok());
    assert_eq!(header.format(), Some(Format::Ascii));
    assert!(header.is_ascii());
    assert!(!header.is_lendian());
    assert_eq!(header.version(), "1.0");
    assert_eq!(header.elements().len(), 1);

    let vertex = header.element("vertex").unwrap();
    assert_eq!(vertex.count, 1);
    let names = vertex.property_defs.iter().map(|p| p.name.as_str()).collect::<Vec<_>>();
    assert_eq!(names, ["x", "y", "z"]);
    assert!(vertex.property_defs.iter()
        .all(|p| p.ty == PropertyType::Scalar(PrimitiveType::Float32)));
}

#[test]
fn binary_formats() {
    let le = parse(b"ply\nformat binary_little_endian 1.0\nend_header\n");
    assert_eq!(le.format(), Some(Format::BinaryLittleEndian));
    assert!(le.is_lendian());

    let be = parse(b"ply\nformat binary_big_endian 1.0\nend_header\n");
    assert_eq!(be.format(), Some(Format::BinaryBigEndian));
    assert!(!be.is_lendian());
    assert!(!be.is_ascii());
}

#[test]
fn list_property() {
    let header = parse(b"\
        ply\n\
        format ascii 1.0\n\
        element face 2\n\
        property list uchar int vertex_indices\n\
        property uchar red\n\
        end_header\n\
    ");

    assert_eq!(header.status(), Status::Ok);
    let face = header.element("face").unwrap();
    assert!(face.has_list());
    assert_eq!(face.prop_pos("red"), Some(1));
    assert_eq!(
        face.property_def("vertex_indices").unwrap().ty,
        PropertyType::List {
            len_type: PrimitiveType::Uint8,
            scalar_type: PrimitiveType::Int32,
        },
    );
}

#[test]
fn canonical_type_names() {
    let header = parse(b"\
        ply\n\
        format ascii 1.0\n\
        element e 0\n\
        property int8 a\n\
        property uint16 b\n\
        property float64 c\n\
        property list uint32 ushort d\n\
        end_header\n\
    ");

    let e = header.element("e").unwrap();
    let types = e.property_defs.iter().map(|p| p.ty).collect::<Vec<_>>();
    assert_eq!(types, [
        PropertyType::Scalar(PrimitiveType::Int8),
        PropertyType::Scalar(PrimitiveType::Uint16),
        PropertyType::Scalar(PrimitiveType::Float64),
        PropertyType::List {
            len_type: PrimitiveType::Uint32,
            scalar_type: PrimitiveType::Uint16,
        },
    ]);
}

#[test]
fn comments_and_obj_info() {
    let header = parse(b"\
        ply\n\
        comment before format\n\
        format ascii 1.0\n\
        comment made by   hand\n\
        obj_info num_cols 4\n\
        comment\n\
        element vertex 0\n\
        comment between properties\n\
        property float x\n\
        end_header\n\
    ");

    assert_eq!(header.status(), Status::Ok);
    assert_eq!(header.comments(), [
        "before format",
        "made by   hand",
        "",
        "between properties",
    ]);
    assert_eq!(header.obj_info(), ["num_cols 4"]);
    assert_eq!(header.element("vertex").unwrap().property_defs.len(), 1);
}

#[test]
fn crlf_line_endings() {
    let header = parse(b"ply\r\nformat ascii 1.0\r\nelement vertex 3\r\nproperty int x\r\nend_header\r\n");

    assert_eq!(header.status(), Status::Ok);
    assert_eq!(header.version(), "1.0");
    assert_eq!(header.element("vertex").unwrap().property_defs[0].name, "x");
}

#[test]
fn trailing_whitespace_after_magic() {
    assert_eq!(status_of(b"ply  \nformat ascii 1.0\nend_header\n"), Status::Ok);
}

#[test]
fn no_elements_is_fine() {
    let header = parse(b"ply\nformat ascii 1.0\nend_header\n");
    assert_eq!(header.status(), Status::Ok);
    assert!(header.elements().is_empty());
}

#[test]
fn missing_end_header() {
    let header = parse(b"\
        ply\n\
        format ascii 1.0\n\
        element vertex 1\n\
        property float x\n\
        property float y\n\
        property float z\n\
    ");

    assert_eq!(header.status(), Status::NoEndh);
    match header.check() {
        Err(e) => assert_eq!(e.status(), Some(Status::NoEndh)),
        Ok(()) => panic!("check passed for broken header"),
    }
}

#[test]
fn no_ply() {
    assert_eq!(status_of(b""), Status::NoPly);
    assert_eq!(status_of(b"\n"), Status::NoPly);
    assert_eq!(status_of(b"plyx\nformat ascii 1.0\nend_header\n"), Status::NoPly);
    assert_eq!(status_of(b"solid cube\nendsolid\n"), Status::NoPly);
}

#[test]
fn no_fmt() {
    assert_eq!(status_of(b"ply\n"), Status::NoFmt);
    assert_eq!(status_of(b"ply\ncomment only\n"), Status::NoFmt);
    assert_eq!(status_of(b"ply\nelement vertex 1\nend_header\n"), Status::NoFmt);
}

#[test]
fn bad_fmt() {
    assert_eq!(status_of(b"ply\nformat ascii\nend_header\n"), Status::BadFmt);
    assert_eq!(status_of(b"ply\nformat ascii 1.0 x\nend_header\n"), Status::BadFmt);
    assert_eq!(status_of(b"ply\nformat binary 1.0\nend_header\n"), Status::BadFmt);
    assert_eq!(
        status_of(b"ply\nformat ascii 1.0\nformat ascii 1.0\nend_header\n"),
        Status::BadFmt,
    );
}

#[test]
fn no_elem() {
    assert_eq!(
        status_of(b"ply\nformat ascii 1.0\nproperty float x\nend_header\n"),
        Status::NoElem,
    );
}

#[test]
fn bad_elem() {
    let check = |line: &str| {
        let data = format!("ply\nformat ascii 1.0\n{}\nend_header\n", line);
        assert_eq!(status_of(data.as_bytes()), Status::BadElem, "line: {:?}", line);
    };

    check("element vertex");
    check("element vertex 3 4");
    check("element vertex -1");
    check("element vertex three");
    check("element vertex 99999999999");
    check("element vertex 1\nelement vertex 2");
}

#[test]
fn bad_prop() {
    let check = |line: &str| {
        let data = format!("ply\nformat ascii 1.0\nelement vertex 1\n{}\nend_header\n", line);
        assert_eq!(status_of(data.as_bytes()), Status::BadProp, "line: {:?}", line);
    };

    check("property float");
    check("property float x y");
    check("property list uchar int");
    check("property list uchar int a b");
    check("property list float int x");
    check("property float x\nproperty int x");
}

#[test]
fn bad_type() {
    // Unknown scalar type, unknown list types and a type name with the
    // wrong case.
    let check = |line: &str| {
        let data = format!("ply\nformat ascii 1.0\nelement vertex 1\n{}\nend_header\n", line);
        assert_eq!(status_of(data.as_bytes()), Status::BadType, "line: {:?}", line);
    };

    check("property blob x");
    check("property list blob int x");
    check("property list uchar blob x");
    check("property Float x");
    check("property int64 x");
}

#[test]
fn unknown_line() {
    assert_eq!(status_of(b"ply\nformat ascii 1.0\nfoo bar\nend_header\n"), Status::Unknown);
    assert_eq!(
        status_of(b"ply\nformat ascii 1.0\nend_header now\nend_header\n"),
        Status::Unknown,
    );

    let header = parse(b"ply\nformat ascii 1.0\nelement a 1\nfoo bar\nend_header\n1\n");
    assert!(header.status_context().contains("line 4"), "{}", header.status_context());
}

#[test]
fn missing_end_header_before_body() {
    let header = parse(b"\
        ply\n\
        format ascii 1.0\n\
        element vertex 1\n\
        property float x\n\
        property float y\n\
        property float z\n\
        1.0 2.0 3.0\n\
    ");

    assert_eq!(header.status(), Status::NoEndh);
    assert!(header.status_context().contains("line 7"), "{}", header.status_context());
    assert_eq!(header.element("vertex").unwrap().property_defs.len(), 3);

    // Same for a binary body and for a header that only mistypes `end_header`.
    let mut binary = b"ply\nformat binary_little_endian 1.0\nelement v 1\nproperty int x\n".to_vec();
    binary.extend_from_slice(&[0xff, 0x00, 0x10, 0x7f]);
    assert_eq!(status_of(&binary), Status::NoEndh);
    assert_eq!(status_of(b"ply\nformat ascii 1.0\nend_headr\n"), Status::NoEndh);
}

#[test]
fn binary_native_matches_target() {
    let expected = if cfg!(target_endian = "little") {
        Format::BinaryLittleEndian
    } else {
        Format::BinaryBigEndian
    };
    assert_eq!(Format::binary_native(), expected);
    assert_ne!(Format::binary_native(), Format::Ascii);
}

#[test]
fn context_names_line() {
    let header = parse(b"ply\nformat ascii 1.0\nelement vertex 1\nproperty blob x\nend_header\n");

    assert_eq!(header.status(), Status::BadType);
    assert!(header.status_context().contains("line 4"), "{}", header.status_context());
    assert!(header.status_context().contains("blob"), "{}", header.status_context());
}

#[test]
fn parsing_stops_at_first_error() {
    // The `element` line after the broken one is never seen.
    let header = parse(b"ply\nformat ascii 1.0\nelement a 1\nproperty blob x\nelement b 1\n");

    assert_eq!(header.status(), Status::BadType);
    assert_eq!(header.elements().len(), 1);
    assert!(header.element("b").is_none());
}

#[test]
fn display_round_trip() {
    let original = parse(b"\
        ply\n\
        format binary_big_endian 1.0\n\
        comment hello\n\
        obj_info some info\n\
        element vertex 8\n\
        property float x\n\
        property uchar red\n\
        element face 6\n\
        property list uchar int vertex_indices\n\
        end_header\n\
    ");
    assert_eq!(original.status(), Status::Ok);

    let text = original.to_string();
    assert_eq!(text, "\
        ply\n\
        format binary_big_endian 1.0\n\
        comment hello\n\
        obj_info some info\n\
        element vertex 8\n\
        property float32 x\n\
        property uint8 red\n\
        element face 6\n\
        property list uint8 int32 vertex_indices\n\
        end_header\n\
    ");

    assert_eq!(parse(text.as_bytes()), original);
}

#[test]
fn missing_file() -> Result<(), Error> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("does-not-exist.ply");

    let header = Header::open(&path);
    assert_eq!(header.status(), Status::NoFile);
    assert!(header.status_context().contains("does-not-exist.ply"));
    assert!(header.elements().is_empty());

    Ok(())
}

#[test]
fn open_file() -> Result<(), Error> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("vertex.ply");
    std::fs::write(&path, VERTEX_HEADER)?;

    let header = Header::open(&path);
    assert_eq!(header, parse(VERTEX_HEADER));

    Ok(())
}
