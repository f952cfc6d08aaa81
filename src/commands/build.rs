//! Build command implementation

use anyhow::Result;
use clap::Args;

use crate::build::conanfile::{write_conanfile, CONANFILE};
use crate::build::plan::{build_plan, BuildPlan};
use crate::build::BuildContext;
use crate::exec::{CommandRunner, Shell};
use crate::utils::terminal::{print_info, print_project_label, print_success};
use crate::utils::tools::{require_tools, REQUIRED_TOOLS};

/// Install dependencies, then configure and build the application
#[derive(Args, Debug)]
pub struct BuildCommand {
    /// Print the command sequence without running anything
    #[arg(long)]
    pub dry_run: bool,

    /// Run the bootstrap cycle even when the executable already exists
    #[arg(long)]
    pub fresh: bool,

    /// Rewrite conanfile.py from the manifest before building
    #[arg(long)]
    pub regenerate: bool,
}

impl BuildCommand {
    /// Execute the build command
    pub fn execute(self, verbose: bool) -> Result<()> {
        let ctx = BuildContext::discover()?;
        print_project_label(&ctx.manifest.project_label("Build"));

        if verbose {
            eprintln!("Project root: {}", ctx.project_root.display());
            eprintln!("Platform: {}", ctx.platform);
        }

        let plan = self.plan(&ctx);

        if self.dry_run {
            if !ctx.project_root.join(CONANFILE).exists() || self.regenerate {
                println!("Would write {}", CONANFILE);
            }
            print_plan(&plan);
            return Ok(());
        }

        require_tools(REQUIRED_TOOLS, "ibm build")?;

        let mut runner = CommandRunner::new(ctx.platform)
            .current_dir(&ctx.project_root)
            .verbose(verbose);
        self.run(&ctx, &plan, &mut runner)?;

        print_success(&format!("Built {}", ctx.relative_executable().display()));
        Ok(())
    }

    fn plan(&self, ctx: &BuildContext) -> BuildPlan {
        let executable_exists = !self.fresh && ctx.executable_path().is_file();
        build_plan(ctx.platform, &ctx.manifest, executable_exists)
    }

    fn run(&self, ctx: &BuildContext, plan: &BuildPlan, shell: &mut dyn Shell) -> Result<()> {
        if write_conanfile(&ctx.project_root, &ctx.manifest, self.regenerate)? {
            print_info(&format!("Wrote {} from manifest", CONANFILE));
        }

        if plan.bootstrap {
            print_info(&format!(
                "{} not found, running bootstrap build first",
                ctx.relative_executable().display()
            ));
        }

        plan.execute(shell)
    }
}

fn print_plan(plan: &BuildPlan) {
    for (i, command) in plan.commands.iter().enumerate() {
        println!("{:>2}. {}", i + 1, command);
    }
}
