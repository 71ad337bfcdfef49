use failure::Error;
use structopt::StructOpt;

#[macro_use]
mod ui;

mod args;
mod info;

use crate::args::Args;


/// We just catch potential errors here and pretty print them. The actual
/// useful code is in `info::run()`.
fn main() {
    // Messages of the library go to stderr, controlled via `RUST_LOG`.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match info::run(&Args::from_args()) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            report(&e);
            std::process::exit(1);
        }
    }
}

fn report(e: &Error) {
    error!("an error occured: {}", e);
    for cause in e.iter_causes() {
        error!("  ... caused by: {}", cause);
    }

    if std::env::var("RUST_BACKTRACE") == Ok("1".to_string()) {
        error!("{}", e.backtrace());
    }
}
