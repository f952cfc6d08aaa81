//! External process execution

pub mod runner;

pub use runner::{CommandRunner, Shell};
