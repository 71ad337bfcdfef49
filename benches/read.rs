//! Measures PLY read (parse) speed for all three encodings.

use std::fmt::Write as _;
use byteorder::{BigEndian, ByteOrder, LittleEndian, WriteBytesExt};
use criterion::{
    criterion_group, criterion_main, black_box, BenchmarkId, Criterion, Throughput,
};

use plyload::{Header, Ply};


// ===============================================================================================
// ===== Helper utilities
// ===============================================================================================

/// Side length of the generated vertex grid.
const GRID: u32 = 200;

fn header(format: &str) -> String {
    format!(
        "ply\n\
        format {} 1.0\n\
        comment generated grid\n\
        element vertex {}\n\
        property float x\n\
        property float y\n\
        property float z\n\
        property uchar red\n\
        element face {}\n\
        property list uchar uint vertex_indices\n\
        end_header\n",
        format,
        GRID * GRID,
        (GRID - 1) * (GRID - 1),
    )
}

/// The four corners of the quad with lower left corner `(x, y)`.
fn quad(x: u32, y: u32) -> [u32; 4] {
    let v = y * GRID + x;
    [v, v + 1, v + GRID + 1, v + GRID]
}

fn grid_binary<B: ByteOrder>(format: &str) -> Vec<u8> {
    let mut out = header(format).into_bytes();
    for y in 0..GRID {
        for x in 0..GRID {
            out.write_f32::<B>(x as f32).unwrap();
            out.write_f32::<B>(y as f32).unwrap();
            out.write_f32::<B>(((x * y) % 7) as f32 * 0.25).unwrap();
            out.write_u8((x % 256) as u8).unwrap();
        }
    }
    for y in 0..GRID - 1 {
        for x in 0..GRID - 1 {
            out.write_u8(4).unwrap();
            for &i in &quad(x, y) {
                out.write_u32::<B>(i).unwrap();
            }
        }
    }

    out
}

fn grid_ascii() -> Vec<u8> {
    let mut out = header("ascii");
    for y in 0..GRID {
        for x in 0..GRID {
            writeln!(out, "{} {} {} {}", x, y, ((x * y) % 7) as f32 * 0.25, x % 256).unwrap();
        }
    }
    for y in 0..GRID - 1 {
        for x in 0..GRID - 1 {
            let [a, b, c, d] = quad(x, y);
            writeln!(out, "4 {} {} {} {}", a, b, c, d).unwrap();
        }
    }

    out.into_bytes()
}


// ===============================================================================================
// ===== Benchmarks
// ===============================================================================================

fn grid(c: &mut Criterion) {
    let files = [
        ("ble", grid_binary::<LittleEndian>("binary_little_endian")),
        ("bbe", grid_binary::<BigEndian>("binary_big_endian")),
        ("ascii", grid_ascii()),
    ];

    let mut group = c.benchmark_group("ply_grid");
    for (encoding, data) in &files {
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::new("body", encoding), data, |b, data| {
            b.iter(|| Ply::from_reader(black_box(&data[..])).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("header", encoding), data, |b, data| {
            b.iter(|| plyload::Reader::new(black_box(&data[..])).into_header())
        });
    }
    group.finish();
}

fn header_only(c: &mut Criterion) {
    let data = header("ascii");
    c.bench_function("ply_header_display", |b| {
        let header = plyload::Reader::new(data.as_bytes()).into_header();
        b.iter(|| black_box(&header).to_string())
    });

    c.bench_function("ply_header_parse", |b| {
        b.iter(|| {
            let header: Header = plyload::Reader::new(black_box(data.as_bytes())).into_header();
            header
        })
    });
}


criterion_group!(benches, grid, header_only);
criterion_main!(benches);
