//! Manifest validation with helpful error messages

use std::collections::HashSet;
use std::path::{Component, Path};

use anyhow::Result;

use super::{CopyRule, Manifest, Requirement};
use crate::error::{hints, IbmError};

/// Validate the entire manifest
pub fn validate_manifest(manifest: &Manifest) -> Result<()> {
    if manifest.project.name.trim().is_empty() {
        return Err(IbmError::config_error_with_hint(
            "Project name cannot be empty",
            "Set [project] name to the CMake executable target, e.g. 'image-binary-matrix'",
        )
        .into());
    }

    validate_shell_safe("project.name", &manifest.project.name, "")?;
    validate_shell_safe("project.cppstd", &manifest.project.cppstd, "")?;
    validate_shell_safe("project.build_folder", &manifest.project.build_folder, "/")?;
    validate_relative_path("project.build_folder", &manifest.project.build_folder)?;
    validate_shell_safe("conan.build", &manifest.conan.build, "")?;
    for entry in &manifest.conan.conf {
        validate_shell_safe("conan.conf", entry, ":=/")?;
    }
    validate_relative_path("resources.source", &manifest.resources.source)?;
    for segment in &manifest.resources.dest {
        validate_relative_path("resources.dest", segment)?;
    }

    let mut seen = HashSet::new();
    for requirement in &manifest.requires {
        validate_requirement(requirement)?;
        if !seen.insert(requirement.name.as_str()) {
            return Err(IbmError::config_error_with_hint(
                format!("Requirement '{}' is declared more than once", requirement.name),
                "Keep a single [[requires]] entry per library",
            )
            .into());
        }
    }

    for rule in &manifest.copies {
        validate_copy_rule(rule, &seen)?;
    }

    Ok(())
}

fn validate_requirement(requirement: &Requirement) -> Result<()> {
    for (field, value) in [("name", &requirement.name), ("version", &requirement.version)] {
        if value.trim().is_empty() {
            return Err(IbmError::config_error_with_hint(
                format!("Requirement {} cannot be empty", field),
                hints::invalid_manifest(),
            )
            .into());
        }
        if value.contains('/') || value.contains('@') {
            return Err(IbmError::config_error(format!(
                "Requirement {} '{}' must not contain '/' or '@'",
                field, value
            ))
            .into());
        }
    }
    Ok(())
}

fn validate_copy_rule(rule: &CopyRule, declared: &HashSet<&str>) -> Result<()> {
    if !declared.contains(rule.lib.as_str()) {
        return Err(IbmError::config_error_with_hint(
            format!("Copy rule references unknown library '{}'", rule.lib),
            format!("Add a [[requires]] entry named '{}'", rule.lib),
        )
        .into());
    }

    if let Err(e) = glob::Pattern::new(&rule.pattern) {
        return Err(IbmError::config_error(format!(
            "Copy rule for '{}' has invalid pattern '{}': {}",
            rule.lib, rule.pattern, e
        ))
        .into());
    }

    for segment in rule.from.iter().chain(&rule.to) {
        validate_relative_path(&format!("copy rule for '{}'", rule.lib), segment)?;
    }

    Ok(())
}

/// Values spliced into `sh -c` / `cmd /C` lines are limited to
/// `[A-Za-z0-9._-]` plus `extra`
fn validate_shell_safe(field: &str, value: &str, extra: &str) -> Result<()> {
    let unsafe_char = value
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || "._-".contains(*c) || extra.contains(*c)));

    match unsafe_char {
        Some(c) => Err(IbmError::config_error_with_hint(
            format!("{}: '{}' contains unsupported character {:?}", field, value, c),
            format!(
                "{} is passed to the shell unquoted; use only letters, digits and '._-{}'",
                field, extra
            ),
        )
        .into()),
        None if value.is_empty() => Err(IbmError::config_error(format!(
            "{} cannot be empty",
            field
        ))
        .into()),
        None => Ok(()),
    }
}

/// Paths in the manifest must name something strictly inside the project root
fn validate_relative_path(field: &str, value: &str) -> Result<()> {
    let path = Path::new(value);
    let mut normal = 0;
    let mut escapes = value.trim().is_empty();
    for component in path.components() {
        match component {
            Component::Normal(_) => normal += 1,
            Component::CurDir => {}
            _ => escapes = true,
        }
    }

    if escapes || normal == 0 {
        return Err(IbmError::config_error_with_hint(
            format!("{}: '{}' must be a non-empty relative path", field, value),
            hints::invalid_manifest(),
        )
        .into());
    }
    Ok(())
}
