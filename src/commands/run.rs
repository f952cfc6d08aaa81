//! Run command implementation
//!
//! Launches the already-built application from the project root, so it finds
//! its `input/` folder next to the binary.

use anyhow::Result;
use clap::Args;

use crate::build::BuildContext;
use crate::error::{hints, IbmError};
use crate::exec::{CommandRunner, Shell};
use crate::utils::terminal::print_project_label;

/// Run the built application
#[derive(Args, Debug)]
pub struct RunCommand {}

impl RunCommand {
    /// Execute the run command
    pub fn execute(self, verbose: bool) -> Result<()> {
        let ctx = BuildContext::discover()?;
        print_project_label(&ctx.manifest.project_label("Run"));

        let mut runner = CommandRunner::new(ctx.platform)
            .current_dir(&ctx.project_root)
            .verbose(verbose);
        run_executable(&ctx, &mut runner)
    }
}

/// Run the platform executable through `shell`
fn run_executable(ctx: &BuildContext, shell: &mut dyn Shell) -> Result<()> {
    let executable = ctx.executable_path();
    if !executable.is_file() {
        return Err(IbmError::ExecutableMissing {
            path: executable.display().to_string(),
            hint: hints::executable_missing().to_string(),
        }
        .into());
    }

    shell.run(&ctx.relative_executable().display().to_string(), false)?;
    Ok(())
}
