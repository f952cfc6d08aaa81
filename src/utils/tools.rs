//! Tool detection and validation
//!
//! The build needs Conan and CMake on PATH. Missing tools are reported with an
//! installation hint before any command is run.

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::Result;
use which::which;

use crate::error::{hints, IbmError};

/// Tools every build shells out to
pub const REQUIRED_TOOLS: &[&str] = &["conan", "cmake"];

/// Tool detection result
#[derive(Debug, Clone)]
pub struct ToolInfo {
    /// Tool name
    pub name: String,
    /// Path to the tool executable
    pub path: PathBuf,
    /// First line of `--version` (if available)
    pub version: Option<String>,
}

/// Check if a tool exists and return its information
pub fn check_tool(tool_name: &str) -> Option<ToolInfo> {
    let path = which(tool_name).ok()?;
    let version = get_tool_version(&path);
    Some(ToolInfo {
        name: tool_name.to_string(),
        path,
        version,
    })
}

/// Get tool version by running `tool --version`
fn get_tool_version(path: &Path) -> Option<String> {
    let output = Command::new(path).arg("--version").output().ok()?;
    if !output.status.success() {
        return None;
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    stdout
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}

/// Require a tool to exist, return error with hint if missing
pub fn require_tool(tool_name: &str, required_for: &str) -> Result<ToolInfo> {
    check_tool(tool_name)
        .ok_or_else(|| IbmError::missing_tool(tool_name, required_for, get_tool_hint(tool_name)).into())
}

/// Require every tool in `tool_names`, failing on the first missing one
pub fn require_tools(tool_names: &[&str], required_for: &str) -> Result<Vec<ToolInfo>> {
    tool_names
        .iter()
        .map(|name| require_tool(name, required_for))
        .collect()
}

/// Get installation hint for a tool
pub fn get_tool_hint(tool_name: &str) -> &'static str {
    match tool_name {
        "cmake" => hints::cmake(),
        "conan" => hints::conan(),
        _ => "Install this tool and ensure it's in your PATH",
    }
}
