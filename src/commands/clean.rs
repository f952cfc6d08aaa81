//! Clean command implementation

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use walkdir::WalkDir;

use crate::build::BuildContext;
use crate::error::{hints, IbmError};

/// Remove the build folder and copied dependency headers
#[derive(Args, Debug)]
pub struct CleanCommand {
    /// Show what would be deleted
    #[arg(long)]
    pub dry_run: bool,

    /// Keep libs/ and remove only the build folder
    #[arg(long)]
    pub build_only: bool,
}

struct ProjectCleaner {
    dry_run: bool,
    cleaned_dirs: Vec<String>,
    cleaned_size: u64,
}

impl ProjectCleaner {
    fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            cleaned_dirs: Vec::new(),
            cleaned_size: 0,
        }
    }

    fn get_dir_size(path: &Path) -> u64 {
        WalkDir::new(path)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.metadata().ok())
            .filter(|metadata| metadata.is_file())
            .map(|metadata| metadata.len())
            .sum()
    }

    fn format_size(size_bytes: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size_bytes as f64;
        let mut unit_idx = 0;

        while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
            size /= 1024.0;
            unit_idx += 1;
        }

        format!("{:.2} {}", size, UNITS[unit_idx])
    }

    fn remove_directory(&mut self, dir_path: &Path, name: &str) -> Result<()> {
        if !dir_path.is_dir() {
            println!("  {} does not exist", name);
            return Ok(());
        }

        let size = Self::get_dir_size(dir_path);

        if self.dry_run {
            println!("  [DRY RUN] Would remove: {} ({})", name, Self::format_size(size));
            return Ok(());
        }

        fs::remove_dir_all(dir_path)
            .with_context(|| format!("Failed to remove {}", dir_path.display()))?;

        println!("  Removed: {} ({})", name, Self::format_size(size));
        self.cleaned_dirs.push(name.to_string());
        self.cleaned_size += size;
        Ok(())
    }

    fn print_summary(&self) {
        if self.dry_run {
            return;
        }
        println!(
            "\nCleaned {} director{}, freed {}",
            self.cleaned_dirs.len(),
            if self.cleaned_dirs.len() == 1 { "y" } else { "ies" },
            Self::format_size(self.cleaned_size)
        );
    }
}

impl CleanCommand {
    /// Execute the clean command
    pub fn execute(self, verbose: bool) -> Result<()> {
        let ctx = BuildContext::discover()?;
        if verbose {
            eprintln!("Project root: {}", ctx.project_root.display());
        }
        self.clean(&ctx)
    }

    fn targets(&self, ctx: &BuildContext) -> Result<Vec<(PathBuf, String)>> {
        let mut targets = vec![(
            ctx.build_dir(),
            format!("{}/", ctx.manifest.project.build_folder),
        )];
        if !self.build_only {
            targets.push((ctx.libs_dir(), "libs/".to_string()));
        }

        // Path equality ignores `.` components, so `build_folder = "./"` matches too
        if let Some((path, _)) = targets
            .iter()
            .find(|(path, _)| !path.starts_with(&ctx.project_root) || *path == ctx.project_root)
        {
            return Err(IbmError::config_error_with_hint(
                format!("Refusing to remove {}: not below the project root", path.display()),
                hints::invalid_manifest(),
            )
            .into());
        }
        Ok(targets)
    }

    fn clean(&self, ctx: &BuildContext) -> Result<()> {
        let targets = self.targets(ctx)?;
        let mut cleaner = ProjectCleaner::new(self.dry_run);
        for (path, name) in targets {
            cleaner.remove_directory(&path, &name)?;
        }
        cleaner.print_summary();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::platform::HostPlatform;
    use crate::config::Manifest;

    fn populated_project() -> (tempfile::TempDir, BuildContext) {
        let temp = tempfile::tempdir().unwrap();
        let ctx = BuildContext::new(temp.path().to_path_buf(), Manifest::default(), HostPlatform::Unix);
        fs::create_dir_all(ctx.build_dir().join("bin")).unwrap();
        fs::write(ctx.build_dir().join("bin").join("app"), vec![0u8; 2048]).unwrap();
        fs::create_dir_all(ctx.libs_dir().join("glew").join("include")).unwrap();
        fs::write(ctx.libs_dir().join("glew").join("include").join("glew.h"), "//").unwrap();
        (temp, ctx)
    }

    #[test]
    fn test_format_size() {
        assert_eq!(ProjectCleaner::format_size(512), "512.00 B");
        assert_eq!(ProjectCleaner::format_size(2048), "2.00 KB");
        assert_eq!(ProjectCleaner::format_size(3 * 1024 * 1024), "3.00 MB");
    }

    #[test]
    fn test_dir_size() {
        let (_temp, ctx) = populated_project();
        assert_eq!(ProjectCleaner::get_dir_size(&ctx.build_dir()), 2048);
    }

    #[test]
    fn test_clean_removes_build_and_libs() {
        let (_temp, ctx) = populated_project();
        let cmd = CleanCommand {
            dry_run: false,
            build_only: false,
        };
        cmd.clean(&ctx).unwrap();
        assert!(!ctx.build_dir().exists());
        assert!(!ctx.libs_dir().exists());
    }

    #[test]
    fn test_build_only_keeps_libs() {
        let (_temp, ctx) = populated_project();
        let cmd = CleanCommand {
            dry_run: false,
            build_only: true,
        };
        cmd.clean(&ctx).unwrap();
        assert!(!ctx.build_dir().exists());
        assert!(ctx.libs_dir().exists());
    }

    #[test]
    fn test_dry_run_removes_nothing() {
        let (_temp, ctx) = populated_project();
        let cmd = CleanCommand {
            dry_run: true,
            build_only: false,
        };
        cmd.clean(&ctx).unwrap();
        assert!(ctx.build_dir().exists());
        assert!(ctx.libs_dir().exists());
    }

    #[test]
    fn test_refuses_to_remove_project_root() {
        let temp = tempfile::tempdir().unwrap();
        fs::create_dir_all(temp.path().join("src")).unwrap();
        fs::write(temp.path().join("src").join("main.cpp"), "int main() {}").unwrap();

        for folder in [".", "./"] {
            let mut manifest = Manifest::default();
            manifest.project.build_folder = folder.to_string();
            let ctx = BuildContext::new(temp.path().to_path_buf(), manifest, HostPlatform::Unix);
            let cmd = CleanCommand {
                dry_run: false,
                build_only: true,
            };

            let err = cmd.clean(&ctx).unwrap_err();
            assert!(err.to_string().contains("Refusing to remove"), "{}", err);
            assert!(temp.path().join("src").join("main.cpp").exists());
        }
    }

    #[test]
    fn test_missing_directories_are_skipped() {
        let temp = tempfile::tempdir().unwrap();
        let ctx = BuildContext::new(temp.path().to_path_buf(), Manifest::default(), HostPlatform::Unix);
        let cmd = CleanCommand {
            dry_run: false,
            build_only: false,
        };
        assert!(cmd.clean(&ctx).is_ok());
    }
}
