//! Check command implementation
//!
//! Reports whether the tools the build shells out to are on PATH and where
//! the build will put the executable on this host.

use anyhow::Result;
use clap::Args;
use console::style;

use crate::build::conanfile::CONANFILE;
use crate::build::BuildContext;
use crate::config::MANIFEST_FILE;
use crate::error::IbmError;
use crate::utils::tools::{check_tool, get_tool_hint, REQUIRED_TOOLS};

/// Check build prerequisites
#[derive(Args, Debug)]
pub struct CheckCommand {}

impl CheckCommand {
    /// Execute the check command
    pub fn execute(self, verbose: bool) -> Result<()> {
        let ctx = BuildContext::discover()?;

        println!("Checking build environment...\n");
        println!("  Platform:   {}", ctx.platform);
        println!("  Project:    {}", ctx.project_root.display());
        println!(
            "  Manifest:   {}",
            if ctx.project_root.join(MANIFEST_FILE).is_file() {
                MANIFEST_FILE
            } else {
                "built-in defaults"
            }
        );
        println!(
            "  Recipe:     {}",
            if ctx.project_root.join(CONANFILE).is_file() {
                "present"
            } else {
                "missing (written on first build)"
            }
        );
        println!(
            "  Executable: {} ({})",
            ctx.relative_executable().display(),
            if ctx.executable_path().is_file() {
                "built"
            } else {
                "not built"
            }
        );
        println!();

        let mut missing = Vec::new();
        for tool in REQUIRED_TOOLS {
            match check_tool(tool) {
                Some(info) => {
                    println!(
                        "  {} {} {}",
                        style("✓").green(),
                        info.name,
                        style(info.version.as_deref().unwrap_or("")).dim()
                    );
                    if verbose {
                        println!("      {}", info.path.display());
                    }
                }
                None => {
                    println!("  {} {} not found", style("✗").red(), tool);
                    missing.push(*tool);
                }
            }
        }

        match missing.first() {
            Some(tool) => Err(IbmError::missing_tool(*tool, "ibm build", get_tool_hint(tool)).into()),
            None => {
                println!("\nAll required tools found.");
                Ok(())
            }
        }
    }
}
