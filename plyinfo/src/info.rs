use failure::{Error, Fail};
use term_painter::{Attr, Color, ToStyle};
use plyload::{
    geometry::Mesh,
    Element, Header, Ply, Property, PropertyType, Reader,
};

use crate::{
    args::Args,
    ui::fmt_with_thousand_sep,
};


/// Prints information about the file. Returns `false` if the file is not a
/// valid PLY file.
pub fn run(args: &Args) -> Result<bool, Error> {
    let reader = Reader::open(&args.file);

    if !reader.header().is_ok() {
        let header = reader.header();
        error!(
            "'{}' is not a valid PLY file: {} ({})",
            args.file.display(),
            header.status(),
            header.status_context(),
        );
        return Ok(false);
    }

    if args.raw_header {
        print!("{}", reader.header());
    } else {
        print_header(reader.header());
    }

    if !args.body {
        return Ok(true);
    }

    println!();
    let ply = match progress!(["reading body"] => reader.read_body()) {
        Ok(ply) => ply,
        Err(e) => match e.status() {
            Some(status) => {
                error!("the body of '{}' is broken: {}", args.file.display(), status);
                error!("{}", e);
                return Ok(false);
            }
            None => {
                let context = format!("failed to read '{}'", args.file.display());
                return Err(e.context(context).into());
            }
        },
    };

    println!();
    print_body(&ply);
    println!();
    print_mesh(&ply);

    Ok(true)
}

fn print_header(header: &Header) {
    let label = Attr::Bold;

    // The format is always known for a valid header.
    if let Some(format) = header.format() {
        println!(
            "{}     {} {}",
            label.paint("format:"),
            Color::Yellow.paint(format),
            header.version(),
        );
    }

    for comment in header.comments() {
        println!("{}    {}", label.paint("comment:"), comment);
    }
    for info in header.obj_info() {
        println!("{}   {}", label.paint("obj_info:"), info);
    }

    println!("{}", label.paint("elements:"));
    if header.elements().is_empty() {
        println!("  {}", Color::BrightBlack.paint("none"));
    }
    for elem in header.elements() {
        println!(
            "  {} ({} instances)",
            Color::Green.bold().paint(&elem.name),
            fmt_with_thousand_sep(elem.count.into()),
        );

        for prop in &elem.property_defs {
            let ty = match prop.ty {
                PropertyType::Scalar(ty) => ty.to_string(),
                PropertyType::List { len_type, scalar_type } => {
                    format!("list<{}> of {}", len_type, scalar_type)
                }
            };
            println!("    - {:<24} {}", prop.name, Color::Yellow.paint(ty));
        }
    }
}

fn print_body(ply: &Ply) {
    for elem in &ply.elements {
        println!(
            "{} {}",
            Attr::Bold.paint("element"),
            Color::Green.bold().paint(&elem.name),
        );

        if elem.instances == 0 {
            println!("    {}", Color::BrightBlack.paint("no instances"));
            continue;
        }

        for prop in &elem.properties {
            println!("    - {:<24} {}", prop.def.name, property_stats(elem, prop));
        }
    }
}

/// Value range of a scalar property, list length statistics of a list
/// property.
fn property_stats(elem: &Element, prop: &Property) -> String {
    let (min, max) = prop.buffer.iter()
        .filter_map(|v| v.cast::<f64>())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let range = if prop.buffer.is_empty() {
        "no values".to_string()
    } else {
        format!("values in [{}, {}]", min, max)
    };

    if !prop.is_list() {
        return range;
    }

    match prop.fixed_len() {
        Some(len) => format!("all lists have length {}, {}", len, range),
        None => {
            let min_len = prop.counts.iter().min().copied().unwrap_or(0);
            let max_len = prop.counts.iter().max().copied().unwrap_or(0);
            format!(
                "list lengths in [{}, {}] ({} values in {} lists), {}",
                min_len,
                max_len,
                fmt_with_thousand_sep(prop.buffer.len() as u64),
                fmt_with_thousand_sep(elem.instances.into()),
                range,
            )
        }
    }
}

fn print_mesh(ply: &Ply) {
    let mesh = match Mesh::from_ply(ply) {
        Ok(mesh) => mesh,
        Err(e) => {
            info!("the file can't be interpreted as a mesh: {}", e);
            return;
        }
    };

    println!("{}", Attr::Bold.paint("mesh:"));
    println!("    vertices:  {}", fmt_with_thousand_sep(mesh.positions.len() as u64));
    println!("    triangles: {}", fmt_with_thousand_sep(mesh.triangles.len() as u64));
    println!("    normals:   {}", if mesh.normals.is_some() { "yes" } else { "no" });

    if let Some(first) = mesh.positions.first() {
        let (lo, hi) = mesh.positions.iter().fold((*first, *first), |(lo, hi), p| {
            (
                [lo.x.min(p.x), lo.y.min(p.y), lo.z.min(p.z)].into(),
                [hi.x.max(p.x), hi.y.max(p.y), hi.z.max(p.z)].into(),
            )
        });
        println!(
            "    bounds:    ({}, {}, {}) to ({}, {}, {})",
            lo.x, lo.y, lo.z, hi.x, hi.y, hi.z,
        );
    }

    if !mesh.positions.is_empty() && mesh.triangles.is_empty() {
        warn!("the mesh has vertices but no faces");
    }
}
