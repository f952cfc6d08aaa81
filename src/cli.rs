//! CLI argument parsing using clap derive macros

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands::{
    build::BuildCommand, check::CheckCommand, clean::CleanCommand,
    manifest::ManifestCommand, run::RunCommand,
};

/// Build and run orchestration for Image Binary Matrix
///
/// Installs Conan dependencies, configures and builds the application with
/// CMake, and launches the resulting binary.
#[derive(Parser, Debug)]
#[command(name = "ibm")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install dependencies, configure and build the application
    Build(BuildCommand),

    /// Run the built application
    Run(RunCommand),

    /// Remove the build folder and copied headers
    Clean(CleanCommand),

    /// Check that Conan and CMake are available
    Check(CheckCommand),

    /// Write conanfile.py from ibm.toml
    Manifest(ManifestCommand),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        // Set up terminal colors
        if self.no_color {
            console::set_colors_enabled(false);
            console::set_colors_enabled_stderr(false);
        }

        match self.command {
            Commands::Build(cmd) => cmd.execute(self.verbose),
            Commands::Run(cmd) => cmd.execute(self.verbose),
            Commands::Clean(cmd) => cmd.execute(self.verbose),
            Commands::Check(cmd) => cmd.execute(self.verbose),
            Commands::Manifest(cmd) => cmd.execute(self.verbose),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_build_flags() {
        let cli = Cli::try_parse_from(["ibm", "-v", "build", "--dry-run", "--fresh"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Build(cmd) => {
                assert!(cmd.dry_run);
                assert!(cmd.fresh);
                assert!(!cmd.regenerate);
            }
            other => panic!("expected build, got {:?}", other),
        }
    }

    #[test]
    fn test_run_takes_no_arguments() {
        assert!(Cli::try_parse_from(["ibm", "run", "extra"]).is_err());
    }

    #[test]
    fn test_manifest_stdout_conflicts_with_force() {
        assert!(Cli::try_parse_from(["ibm", "manifest", "--stdout", "--force"]).is_err());
    }
}
