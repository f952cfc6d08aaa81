//! Build orchestration
//!
//! ## Architecture
//!
//! ```text
//! ibm.toml → config::Manifest → build::plan → exec::CommandRunner → conan / cmake
//! ```
//!
//! ## Modules
//!
//! - `platform` - Host detection and the Windows/Unix command lines
//! - `plan` - Ordered build sequence including the bootstrap cycle
//! - `conanfile` - Renders the manifest into conanfile.py

pub mod conanfile;
pub mod plan;
pub mod platform;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::Manifest;
use platform::HostPlatform;

/// Project root, manifest and host platform shared by every command
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// Project root directory (where ibm.toml is, or the current directory)
    pub project_root: PathBuf,
    /// Loaded manifest (defaults when there is no ibm.toml)
    pub manifest: Manifest,
    /// Host platform
    pub platform: HostPlatform,
}

impl BuildContext {
    pub fn new(project_root: PathBuf, manifest: Manifest, platform: HostPlatform) -> Self {
        Self {
            project_root,
            manifest,
            platform,
        }
    }

    /// Discover the project from the current directory
    pub fn discover() -> Result<Self> {
        let current_dir = std::env::current_dir().context("Failed to get current directory")?;
        Self::discover_from(&current_dir)
    }

    /// Discover the project starting from `start`
    pub fn discover_from(start: &Path) -> Result<Self> {
        let (project_root, manifest) = Manifest::discover(start)?;
        Ok(Self::new(project_root, manifest, HostPlatform::current()))
    }

    /// Executable path relative to the project root, as passed to the shell
    pub fn relative_executable(&self) -> PathBuf {
        self.platform
            .executable_path(&self.manifest.project.build_folder, &self.manifest.project.name)
    }

    /// Absolute executable path
    pub fn executable_path(&self) -> PathBuf {
        self.project_root.join(self.relative_executable())
    }

    /// Absolute build folder
    pub fn build_dir(&self) -> PathBuf {
        self.project_root.join(&self.manifest.project.build_folder)
    }

    /// Absolute `libs/` folder holding copied headers and bindings
    pub fn libs_dir(&self) -> PathBuf {
        self.project_root.join("libs")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_paths() {
        let ctx = BuildContext::new(
            PathBuf::from("/work/ibm"),
            Manifest::default(),
            HostPlatform::Unix,
        );
        assert_eq!(
            ctx.relative_executable(),
            Path::new("build").join("bin").join("image-binary-matrix")
        );
        assert_eq!(
            ctx.executable_path(),
            Path::new("/work/ibm").join("build").join("bin").join("image-binary-matrix")
        );
        assert_eq!(ctx.build_dir(), Path::new("/work/ibm").join("build"));
        assert_eq!(ctx.libs_dir(), Path::new("/work/ibm").join("libs"));
    }

    #[test]
    fn test_discover_from_uses_manifest_root() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(
            temp.path().join(crate::config::MANIFEST_FILE),
            "[project]\nname = \"viewer\"\n",
        )
        .unwrap();
        let nested = temp.path().join("src");
        std::fs::create_dir_all(&nested).unwrap();

        let ctx = BuildContext::discover_from(&nested).unwrap();
        assert_eq!(ctx.project_root, temp.path());
        assert_eq!(ctx.manifest.project.name, "viewer");
    }
}
