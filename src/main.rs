//! ibm - build and run orchestration for the Image Binary Matrix application
//!
//! ## Architecture
//!
//! ```text
//! CLI → commands/ → build::plan → exec::CommandRunner → conan / cmake / app
//! ```

mod build;
mod cli;
mod commands;
mod config;
mod error;
mod exec;
mod utils;

use clap::Parser;

use cli::Cli;

fn main() {
    let cli = Cli::parse();
    if let Err(err) = cli.execute() {
        error::report(&err);
        std::process::exit(1);
    }
}
