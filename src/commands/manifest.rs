//! Manifest command implementation

use anyhow::Result;
use clap::Args;

use crate::build::conanfile::{render_conanfile, write_conanfile, CONANFILE};
use crate::build::BuildContext;
use crate::utils::terminal::{print_success, print_warning};

/// Render conanfile.py from ibm.toml
#[derive(Args, Debug)]
pub struct ManifestCommand {
    /// Overwrite an existing conanfile.py
    #[arg(short, long)]
    pub force: bool,

    /// Print the recipe instead of writing it
    #[arg(long, conflicts_with = "force")]
    pub stdout: bool,
}

impl ManifestCommand {
    /// Execute the manifest command
    pub fn execute(self, verbose: bool) -> Result<()> {
        let ctx = BuildContext::discover()?;

        if self.stdout {
            print!("{}", render_conanfile(&ctx.manifest));
            return Ok(());
        }

        let path = ctx.project_root.join(CONANFILE);
        if verbose {
            eprintln!("Target: {}", path.display());
            for rule in &ctx.manifest.copies {
                eprintln!(
                    "  {} {}/{} -> {}",
                    rule.lib,
                    rule.from.join("/"),
                    rule.pattern,
                    rule.destination().display()
                );
            }
            eprintln!(
                "  {} -> {}",
                ctx.manifest.resources.source,
                ctx.manifest.resources_destination().display()
            );
        }

        if write_conanfile(&ctx.project_root, &ctx.manifest, self.force)? {
            print_success(&format!("Wrote {}", path.display()));
        } else {
            print_warning(&format!(
                "{} already exists, use --force to overwrite",
                path.display()
            ));
        }
        Ok(())
    }
}
