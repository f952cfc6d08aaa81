//! conanfile.py rendering
//!
//! Conan reads its recipe from Python, so the manifest is rendered into a
//! `conanfile.py` that declares the requirements, copies headers and bindings
//! out of each package folder into `libs/`, and seeds the runtime input folder
//! from `res/` at generate time.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::config::{CopyRule, Manifest};

/// Recipe file name Conan looks for in the project root
pub const CONANFILE: &str = "conanfile.py";

/// Quote a value as a Python string literal
fn py_str(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

fn py_list(values: &[String]) -> String {
    let items: Vec<String> = values.iter().map(|v| py_str(v)).collect();
    format!("[{}]", items.join(", "))
}

/// `Image Binary Matrix` -> `ImageBinaryMatrix`
fn class_name(label: &str) -> String {
    let name: String = label
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect();

    match name.chars().next() {
        Some(c) if c.is_ascii_alphabetic() => name,
        _ => format!("Project{}", name),
    }
}

fn copy_call(rule: &CopyRule) -> String {
    let mut args = vec![py_str(&rule.lib), py_list(&rule.from)];
    if rule.pattern != "*" || !rule.to.is_empty() {
        args.push(py_str(&rule.pattern));
    }
    if !rule.to.is_empty() {
        args.push(py_list(&rule.to));
    }
    format!("        self.copy_lib_files({})\n", args.join(", "))
}

/// Render the manifest as a Conan 2 recipe
pub fn render_conanfile(manifest: &Manifest) -> String {
    let mut out = String::new();

    out.push_str("# Generated by `ibm manifest` from ibm.toml. Edit ibm.toml instead.\n");
    out.push_str("import os\n\n");
    out.push_str("from conan import ConanFile\n");
    out.push_str("from conan.tools.cmake import cmake_layout\n");
    out.push_str("from conan.tools.files import copy\n\n\n");

    out.push_str(&format!("class {}(ConanFile):\n", class_name(&manifest.project.label)));
    out.push_str("    settings = \"os\", \"compiler\", \"build_type\", \"arch\"\n");
    out.push_str("    generators = \"CMakeDeps\", \"CMakeToolchain\"\n\n");

    out.push_str("    def requirements(self):\n");
    if manifest.requires.is_empty() {
        out.push_str("        pass\n");
    }
    for requirement in &manifest.requires {
        if requirement.overrides {
            out.push_str(&format!(
                "        self.requires({}, override=True)\n",
                py_str(&requirement.reference())
            ));
        } else {
            out.push_str(&format!(
                "        self.requires({})\n",
                py_str(&requirement.reference())
            ));
        }
    }
    out.push('\n');

    out.push_str("    def generate(self):\n");
    for rule in &manifest.copies {
        out.push_str(&copy_call(rule));
    }
    if !manifest.copies.is_empty() {
        out.push('\n');
    }

    let mut dest = vec![manifest.project.build_folder.clone()];
    dest.extend(manifest.resources.dest.iter().cloned());
    let dest: Vec<String> = dest.iter().map(|d| py_str(d)).collect();
    out.push_str("        copy(\n");
    out.push_str("            self,\n");
    out.push_str("            \"*\",\n");
    out.push_str(&format!(
        "            os.path.join(self.source_folder, {}),\n",
        py_str(&manifest.resources.source)
    ));
    out.push_str(&format!(
        "            os.path.join(self.source_folder, {})\n",
        dest.join(", ")
    ));
    out.push_str("        )\n\n");

    out.push_str("    def copy_lib_files(self, lib, from_path, pattern=\"*\", to_path=()):\n");
    out.push_str("        lib_folder = self.dependencies[lib].package_folder\n");
    out.push_str("        copy(\n");
    out.push_str("            self,\n");
    out.push_str("            pattern,\n");
    out.push_str("            os.path.join(lib_folder, *from_path),\n");
    out.push_str("            os.path.join(self.source_folder, \"libs\", lib, *to_path)\n");
    out.push_str("        )\n\n");

    out.push_str("    def layout(self):\n");
    out.push_str("        cmake_layout(self)\n");

    out
}

/// Write conanfile.py into `project_root`
///
/// An existing recipe is kept unless `overwrite` is set. Returns whether the
/// file was written.
pub fn write_conanfile(project_root: &Path, manifest: &Manifest, overwrite: bool) -> Result<bool> {
    let path = project_root.join(CONANFILE);
    if path.exists() && !overwrite {
        return Ok(false);
    }

    fs::write(&path, render_conanfile(manifest))
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(true)
}
