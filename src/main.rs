//! eventgate entry point
//!
//! Delegates all startup work to the CLI module and prints fatal errors to
//! stderr with a non-zero exit.

use eventgate::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
