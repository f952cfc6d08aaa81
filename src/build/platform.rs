//! Host platform detection and the per-platform command lines
//!
//! The Windows branch drives the Visual Studio multi-config generator, where
//! the binary lands in `bin/Release/`; every other host uses Unix Makefiles
//! with a single Release configuration.

use std::path::{Path, PathBuf};

/// Toolchain file written by Conan's CMakeToolchain generator
const CMAKE_TOOLCHAIN: &str = "generators/conan_toolchain.cmake";

/// MSVC runtime selection policy required by the Conan toolchain
const CMAKE_POLICY: &str = "-DCMAKE_POLICY_DEFAULT_CMP0091=NEW";

/// Host operating system family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostPlatform {
    Windows,
    Unix,
}

impl std::fmt::Display for HostPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HostPlatform::Windows => write!(f, "windows"),
            HostPlatform::Unix => write!(f, "unix"),
        }
    }
}

impl HostPlatform {
    /// Detect the platform this binary runs on
    pub fn current() -> Self {
        Self::from_os_name(std::env::consts::OS)
    }

    /// Map an OS name (as in `std::env::consts::OS`) to a platform
    pub fn from_os_name(os: &str) -> Self {
        if os.eq_ignore_ascii_case("windows") {
            HostPlatform::Windows
        } else {
            HostPlatform::Unix
        }
    }

    /// Shell program and the flag that makes it run one command line
    pub fn shell(self) -> (&'static str, &'static str) {
        match self {
            HostPlatform::Windows => ("cmd", "/C"),
            HostPlatform::Unix => ("sh", "-c"),
        }
    }

    /// Wrap a command line so the shell merges stderr into stdout
    pub fn merge_stderr(self, command: &str) -> String {
        match self {
            HostPlatform::Windows => format!("({}) 2>&1", command),
            HostPlatform::Unix => format!("exec 2>&1\n{}", command),
        }
    }

    /// Path of the built executable, relative to the project root
    pub fn executable_path(self, build_folder: &str, project_name: &str) -> PathBuf {
        let bin = Path::new(build_folder).join("bin");
        match self {
            HostPlatform::Windows => bin.join("Release").join(format!("{}.exe", project_name)),
            HostPlatform::Unix => bin.join(project_name),
        }
    }

    /// Configure step of the bootstrap build, driven by the Conan presets
    pub fn bootstrap_preset_command(self) -> String {
        match self {
            HostPlatform::Windows => "cmake --preset conan-default".to_string(),
            HostPlatform::Unix => "cmake --preset conan-release".to_string(),
        }
    }

    /// Build step of the bootstrap build
    pub fn bootstrap_build_command(self) -> String {
        "cmake --build --preset conan-release".to_string()
    }

    /// Recursive delete of a directory
    pub fn remove_dir_command(self, dir: &str) -> String {
        match self {
            HostPlatform::Windows => format!("rd /s /q {}", dir),
            HostPlatform::Unix => format!("rm -rf {}", dir),
        }
    }

    /// Configure step of the real build
    pub fn configure_command(self, build_folder: &str) -> String {
        let (generator, toolchain_prefix, extra) = match self {
            HostPlatform::Windows => ("Visual Studio 17 2022", "./", ""),
            HostPlatform::Unix => ("Unix Makefiles", "Release/", "-DCMAKE_BUILD_TYPE=Release"),
        };

        format!(
            "cmake -S . -B {} -G \"{}\" -DCMAKE_TOOLCHAIN_FILE={}{} {} {}",
            build_folder, generator, toolchain_prefix, CMAKE_TOOLCHAIN, CMAKE_POLICY, extra
        )
        .trim_end()
        .to_string()
    }

    /// Build step of the real build
    pub fn build_command(self, build_folder: &str) -> String {
        match self {
            HostPlatform::Windows => format!("cmake --build {} --config Release", build_folder),
            HostPlatform::Unix => format!("cmake --build {}", build_folder),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_os_name() {
        assert_eq!(HostPlatform::from_os_name("windows"), HostPlatform::Windows);
        assert_eq!(HostPlatform::from_os_name("Windows"), HostPlatform::Windows);
        assert_eq!(HostPlatform::from_os_name("linux"), HostPlatform::Unix);
        assert_eq!(HostPlatform::from_os_name("macos"), HostPlatform::Unix);
    }

    #[test]
    fn test_current_matches_cfg() {
        assert_eq!(HostPlatform::current() == HostPlatform::Windows, cfg!(windows));
    }

    #[test]
    fn test_merge_stderr() {
        assert_eq!(
            HostPlatform::Windows.merge_stderr("cmake --build build --config Release"),
            "(cmake --build build --config Release) 2>&1"
        );
        assert_eq!(
            HostPlatform::Unix.merge_stderr("cmake --build build"),
            "exec 2>&1\ncmake --build build"
        );
        assert_eq!(HostPlatform::Windows.shell(), ("cmd", "/C"));
        assert_eq!(HostPlatform::Unix.shell(), ("sh", "-c"));
    }

    #[test]
    fn test_executable_path() {
        assert_eq!(
            HostPlatform::Unix.executable_path("build", "image-binary-matrix"),
            Path::new("build").join("bin").join("image-binary-matrix")
        );
        assert_eq!(
            HostPlatform::Windows.executable_path("build", "image-binary-matrix"),
            Path::new("build")
                .join("bin")
                .join("Release")
                .join("image-binary-matrix.exe")
        );
    }

    #[test]
    fn test_configure_command_unix() {
        assert_eq!(
            HostPlatform::Unix.configure_command("build"),
            "cmake -S . -B build -G \"Unix Makefiles\" \
             -DCMAKE_TOOLCHAIN_FILE=Release/generators/conan_toolchain.cmake \
             -DCMAKE_POLICY_DEFAULT_CMP0091=NEW -DCMAKE_BUILD_TYPE=Release"
        );
    }

    #[test]
    fn test_configure_command_windows() {
        assert_eq!(
            HostPlatform::Windows.configure_command("build"),
            "cmake -S . -B build -G \"Visual Studio 17 2022\" \
             -DCMAKE_TOOLCHAIN_FILE=./generators/conan_toolchain.cmake \
             -DCMAKE_POLICY_DEFAULT_CMP0091=NEW"
        );
    }

    #[test]
    fn test_build_and_remove_commands() {
        assert_eq!(HostPlatform::Unix.build_command("build"), "cmake --build build");
        assert_eq!(
            HostPlatform::Windows.build_command("build"),
            "cmake --build build --config Release"
        );
        assert_eq!(HostPlatform::Unix.remove_dir_command("build"), "rm -rf build");
        assert_eq!(HostPlatform::Windows.remove_dir_command("build"), "rd /s /q build");
    }

    #[test]
    fn test_bootstrap_presets() {
        assert_eq!(
            HostPlatform::Unix.bootstrap_preset_command(),
            "cmake --preset conan-release"
        );
        assert_eq!(
            HostPlatform::Windows.bootstrap_preset_command(),
            "cmake --preset conan-default"
        );
    }
}
