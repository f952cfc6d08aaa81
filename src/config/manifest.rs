//! ibm.toml manifest parsing
//!
//! The manifest holds everything the old Python build scripts hardcoded: project
//! constants, Conan install flags, the dependency list, and the rules that copy
//! headers and bindings out of each dependency's package folder.
//!
//! The file is optional. Every section falls back to the values the Image
//! Binary Matrix project has always been built with, so a checkout without
//! `ibm.toml` builds exactly as before.
//!
//! ## Example
//!
//! ```toml
//! [project]
//! name = "image-binary-matrix"
//! build_folder = "build"
//!
//! [[requires]]
//! name = "libpng"
//! version = "1.6.42"
//! override = true
//!
//! [[requires]]
//! name = "opencv"
//! version = "4.8.1"
//!
//! [[copy]]
//! lib = "opencv"
//! from = ["include", "opencv4"]
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use super::validation::validate_manifest;

/// Manifest file name looked up from the current directory upwards
pub const MANIFEST_FILE: &str = "ibm.toml";

/// Root configuration from ibm.toml
#[derive(Debug, Clone)]
pub struct Manifest {
    /// Project constants
    pub project: ProjectConfig,
    /// Conan install flags
    pub conan: ConanConfig,
    /// Third-party requirements
    pub requires: Vec<Requirement>,
    /// Include/binding copy rules applied at generate time
    pub copies: Vec<CopyRule>,
    /// Runtime input data copied next to the binary
    pub resources: ResourcesConfig,
}

/// Raw file layout; list sections stay optional so defaults can be applied
#[derive(Debug, Deserialize)]
struct RawManifest {
    #[serde(default)]
    project: ProjectConfig,
    #[serde(default)]
    conan: ConanConfig,
    requires: Option<Vec<Requirement>>,
    #[serde(rename = "copy")]
    copies: Option<Vec<CopyRule>>,
    #[serde(default)]
    resources: ResourcesConfig,
}

/// Project constants from [project]
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProjectConfig {
    /// Executable name produced by CMake
    pub name: String,
    /// Human readable label printed before each driver
    pub label: String,
    /// Build folder relative to the project root
    pub build_folder: String,
    /// C++ standard passed to Conan as `compiler.cppstd`
    pub cppstd: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "image-binary-matrix".to_string(),
            label: "Image Binary Matrix".to_string(),
            build_folder: "build".to_string(),
            cppstd: "17".to_string(),
        }
    }
}

/// Conan flags from [conan]
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConanConfig {
    /// `--build` policy
    pub build: String,
    /// `-c` configuration entries
    pub conf: Vec<String>,
}

impl Default for ConanConfig {
    fn default() -> Self {
        Self {
            build: "missing".to_string(),
            conf: vec![
                "tools.system.package_manager:mode=install".to_string(),
                "tools.system.package_manager:sudo=True".to_string(),
            ],
        }
    }
}

/// A single `[[requires]]` entry
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Requirement {
    pub name: String,
    pub version: String,
    /// Force this version over what other requirements pull in
    #[serde(default, rename = "override")]
    pub overrides: bool,
}

impl Requirement {
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            overrides: false,
        }
    }

    /// Conan reference, `name/version`
    pub fn reference(&self) -> String {
        format!("{}/{}", self.name, self.version)
    }
}

/// A single `[[copy]]` entry
///
/// Copies files matching `pattern` from `<package_folder>/<from...>` into
/// `libs/<lib>/<to...>`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CopyRule {
    pub lib: String,
    #[serde(default)]
    pub from: Vec<String>,
    #[serde(default = "default_pattern")]
    pub pattern: String,
    #[serde(default)]
    pub to: Vec<String>,
}

fn default_pattern() -> String {
    "*".to_string()
}

impl CopyRule {
    pub fn new(lib: &str, from: &[&str]) -> Self {
        Self {
            lib: lib.to_string(),
            from: from.iter().map(|s| s.to_string()).collect(),
            pattern: default_pattern(),
            to: Vec::new(),
        }
    }

    pub fn with_pattern(mut self, pattern: &str, to: &[&str]) -> Self {
        self.pattern = pattern.to_string();
        self.to = to.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Destination relative to the project root
    pub fn destination(&self) -> PathBuf {
        let mut path = PathBuf::from("libs").join(&self.lib);
        path.extend(&self.to);
        path
    }
}

/// Runtime input data from [resources]
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ResourcesConfig {
    /// Source folder relative to the project root
    pub source: String,
    /// Destination segments below the build folder
    pub dest: Vec<String>,
}

impl Default for ResourcesConfig {
    fn default() -> Self {
        Self {
            source: "res".to_string(),
            dest: vec!["bin".to_string(), "input".to_string()],
        }
    }
}

fn default_requires() -> Vec<Requirement> {
    // opencv/4.8.1 pulls libpng/1.6.40
    let mut libpng = Requirement::new("libpng", "1.6.42");
    libpng.overrides = true;

    vec![
        libpng,
        Requirement::new("glew", "2.2.0"),
        Requirement::new("glfw", "3.3.8"),
        Requirement::new("imgui", "1.90.1"),
        Requirement::new("opencv", "4.8.1"),
    ]
}

fn default_copy_rules() -> Vec<CopyRule> {
    vec![
        CopyRule::new("glew", &["include"]),
        CopyRule::new("glfw", &["include"]),
        CopyRule::new("imgui", &["include"]),
        CopyRule::new("imgui", &["res", "bindings"]).with_pattern("*opengl3*", &["bindings"]),
        CopyRule::new("imgui", &["res", "bindings"]).with_pattern("*glfw*", &["bindings"]),
        CopyRule::new("opencv", &["include", "opencv4"]),
    ]
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            project: ProjectConfig::default(),
            conan: ConanConfig::default(),
            requires: default_requires(),
            copies: default_copy_rules(),
            resources: ResourcesConfig::default(),
        }
    }
}

impl Manifest {
    /// Load manifest from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest from {}", path.display()))?;

        Self::parse(&content).with_context(|| format!("Invalid manifest: {}", path.display()))
    }

    /// Parse manifest from TOML string
    ///
    /// Omitting `[[requires]]` keeps the default dependency set together with
    /// its copy rules. Declaring requirements without `[[copy]]` means no
    /// copy rules.
    pub fn parse(content: &str) -> Result<Self> {
        let raw: RawManifest = toml::from_str(content).context("Failed to parse ibm.toml")?;

        let (requires, copies) = match (raw.requires, raw.copies) {
            (None, None) => (default_requires(), default_copy_rules()),
            (None, Some(copies)) => (default_requires(), copies),
            (Some(requires), copies) => (requires, copies.unwrap_or_default()),
        };

        let manifest = Self {
            project: raw.project,
            conan: raw.conan,
            requires,
            copies,
            resources: raw.resources,
        };

        validate_manifest(&manifest)?;
        Ok(manifest)
    }

    /// Find the project root and its manifest, searching up from `start`
    ///
    /// Without an ibm.toml anywhere above `start`, `start` itself is the
    /// project root and the defaults apply.
    pub fn discover(start: &Path) -> Result<(PathBuf, Self)> {
        let mut dir = start;
        loop {
            let candidate = dir.join(MANIFEST_FILE);
            if candidate.is_file() {
                let manifest = Self::load_from_path(&candidate)?;
                return Ok((dir.to_path_buf(), manifest));
            }

            match dir.parent() {
                Some(parent) => dir = parent,
                None => return Ok((start.to_path_buf(), Self::default())),
            }
        }
    }

    /// Arguments appended to every `conan install .`
    pub fn conan_install_args(&self) -> String {
        let mut args = vec![format!("-s compiler.cppstd={}", self.project.cppstd)];
        args.extend(self.conan.conf.iter().map(|c| format!("-c {}", c)));
        args.push(format!("--build={}", self.conan.build));
        args.join(" ")
    }

    /// Label printed before a driver runs, e.g. `Image Binary Matrix : Build`
    pub fn project_label(&self, addition: &str) -> String {
        if addition.is_empty() {
            self.project.label.clone()
        } else {
            format!("{} : {}", self.project.label, addition)
        }
    }

    /// Resources destination relative to the project root
    pub fn resources_destination(&self) -> PathBuf {
        let mut path = PathBuf::from(&self.project.build_folder);
        path.extend(&self.resources.dest);
        path
    }
}
