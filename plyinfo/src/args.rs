//! Defines `Args` which is used to parse command line arguments.

use std::path::PathBuf;

use structopt::StructOpt;


/// Prints the header of a PLY file and, optionally, statistics about its
/// body. Exits with status 1 if the file is not a valid PLY file.
#[derive(StructOpt, Debug)]
#[structopt(name = "plyinfo")]
pub struct Args {
    /// Also read the complete body. This checks whether the whole file is
    /// valid and prints per-element statistics and mesh information.
    #[structopt(short, long)]
    pub body: bool,

    /// Print the header exactly as it would be written to a file, instead
    /// of the formatted summary.
    #[structopt(long = "raw-header")]
    pub raw_header: bool,

    /// Path to the PLY file.
    #[structopt(parse(from_os_str))]
    pub file: PathBuf,
}
