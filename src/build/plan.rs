//! Build sequence planning and execution
//!
//! A build is a flat list of shell command lines. Planning is pure so the
//! sequence can be printed (`--dry-run`) or checked in tests without touching
//! Conan or CMake.

use anyhow::Result;

use super::platform::HostPlatform;
use crate::config::Manifest;
use crate::exec::Shell;

/// Ordered command lines for one `ibm build`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPlan {
    /// Whether the first-time bootstrap cycle is part of the plan
    pub bootstrap: bool,
    /// Command lines, run in order from the project root
    pub commands: Vec<String>,
}

/// Plan the build
///
/// The bootstrap cycle (preset configure, preset build, wipe build folder,
/// reinstall) runs only when the executable is not on disk yet. Presence of
/// the file is the whole check; its content is never inspected.
pub fn build_plan(platform: HostPlatform, manifest: &Manifest, executable_exists: bool) -> BuildPlan {
    let install = format!("conan install . {}", manifest.conan_install_args());
    let build_folder = manifest.project.build_folder.as_str();

    let mut commands = vec![install.clone()];

    let bootstrap = !executable_exists;
    if bootstrap {
        commands.push(platform.bootstrap_preset_command());
        commands.push(platform.bootstrap_build_command());
        commands.push(platform.remove_dir_command(build_folder));
        commands.push(install);
    }

    commands.push(platform.configure_command(build_folder));
    commands.push(platform.build_command(build_folder));

    BuildPlan {
        bootstrap,
        commands,
    }
}

impl BuildPlan {
    /// Run every command through `shell`, stopping at the first failure
    pub fn execute(&self, shell: &mut dyn Shell) -> Result<()> {
        for command in &self.commands {
            shell.run(command, false)?;
        }
        Ok(())
    }
}
