//! Project configuration (ibm.toml)

mod manifest;
mod validation;

pub use manifest::{CopyRule, Manifest, Requirement, MANIFEST_FILE};
