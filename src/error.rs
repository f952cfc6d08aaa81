//! Error types and helpers for user-friendly error messages
//!
//! Every failure that ends a build or run carries enough context to be acted on
//! without re-running: the failing command line with its full output, or the
//! missing tool with an installation hint.

use thiserror::Error;

/// Errors raised by the command runner and the drivers
#[derive(Error, Debug)]
pub enum IbmError {
    /// A command exited non-zero while success was expected
    #[error("Failed command: {command}\n{output}")]
    CommandFailed {
        command: String,
        exit_code: Option<i32>,
        output: String,
    },

    /// A command exited zero while failure was expected
    #[error("command succeeded (failure expected): {command}\n{output}")]
    UnexpectedSuccess { command: String, output: String },

    /// The shell could not be started for a command
    #[error("Failed to spawn command: {command}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Tool/executable not found on PATH
    #[error("Missing tool: {tool}")]
    MissingTool {
        tool: String,
        required_for: String,
        hint: String,
    },

    /// Manifest (ibm.toml) errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        hint: Option<String>,
    },

    /// The application binary has not been built yet
    #[error("Executable not found: {path}")]
    ExecutableMissing { path: String, hint: String },
}

impl IbmError {
    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            hint: None,
        }
    }

    /// Create a configuration error with a hint
    pub fn config_error_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    /// Create a missing tool error
    pub fn missing_tool(
        tool: impl Into<String>,
        required_for: impl Into<String>,
        hint: impl Into<String>,
    ) -> Self {
        Self::MissingTool {
            tool: tool.into(),
            required_for: required_for.into(),
            hint: hint.into(),
        }
    }

    /// Display error with formatting and hints
    ///
    /// `context` is the chain of messages wrapped around this error, outermost
    /// first, such as the manifest path that failed to load.
    pub fn display_with_hints(&self, context: &[String]) {
        use console::style;

        let mut prefix = context.join(": ");
        if !prefix.is_empty() {
            prefix.push_str(": ");
        }
        eprintln!("\n{} {}{}", style("ERROR:").red().bold(), prefix, self);

        match self {
            IbmError::Config { hint: Some(h), .. } => {
                eprintln!("\n{} {}", style("HINT:").yellow().bold(), h);
            }
            IbmError::MissingTool {
                hint, required_for, ..
            } => {
                eprintln!("{} {}", style("Required for:").dim(), required_for);
                eprintln!("\n{} {}", style("HINT:").yellow().bold(), hint);
            }
            IbmError::ExecutableMissing { hint, .. } => {
                eprintln!("\n{} {}", style("HINT:").yellow().bold(), hint);
            }
            IbmError::CommandFailed {
                exit_code: Some(code),
                ..
            } => {
                eprintln!("{} {}", style("Exit code:").dim(), code);
            }
            IbmError::Spawn { source, .. } => {
                eprintln!("{} {}", style("Caused by:").dim(), source);
            }
            _ => {}
        }

        eprintln!();
    }
}

/// Context messages attached above the first [`IbmError`] in the chain
pub fn context_chain(err: &anyhow::Error) -> Vec<String> {
    err.chain()
        .take_while(|cause| !cause.is::<IbmError>())
        .map(|cause| cause.to_string())
        .collect()
}

/// Print a top-level error, with hints when it carries an [`IbmError`]
pub fn report(err: &anyhow::Error) {
    match err.downcast_ref::<IbmError>() {
        Some(ibm_err) => ibm_err.display_with_hints(&context_chain(err)),
        None => crate::utils::terminal::print_error(&format!("{:#}", err)),
    }
}

/// Common error hints for missing tools
pub mod hints {
    /// Get hint for missing CMake
    pub fn cmake() -> &'static str {
        "Install CMake from https://cmake.org/ or use your package manager:\n\
         • macOS: brew install cmake\n\
         • Ubuntu: sudo apt install cmake\n\
         • Windows: winget install Kitware.CMake"
    }

    /// Get hint for missing Conan
    pub fn conan() -> &'static str {
        "Install Conan 2 with pip and create a default profile:\n\
         • pip install conan\n\
         • conan profile detect"
    }

    /// Get hint for a missing application binary
    pub fn executable_missing() -> &'static str {
        "Build the application first:\n\
         • Run: ibm build"
    }

    /// Get hint for invalid ibm.toml
    pub fn invalid_manifest() -> &'static str {
        "ibm.toml is invalid. Common issues:\n\
         • Invalid TOML syntax (check quotes, brackets, commas)\n\
         • A [[copy]] rule names a library missing from [[requires]]\n\
         • Paths must be relative and must not contain '..'"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_failed_message_carries_command_and_output() {
        let err = IbmError::CommandFailed {
            command: "conan install .".to_string(),
            exit_code: Some(1),
            output: "ERROR: missing profile\n".to_string(),
        };
        let message = err.to_string();
        assert!(message.starts_with("Failed command: conan install ."));
        assert!(message.contains("ERROR: missing profile"));
    }

    #[test]
    fn test_context_chain_keeps_manifest_path() {
        let err = anyhow::Error::new(IbmError::config_error("bad path"))
            .context("Invalid manifest: /work/ibm/ibm.toml");
        assert_eq!(context_chain(&err), vec!["Invalid manifest: /work/ibm/ibm.toml"]);
        assert!(err.downcast_ref::<IbmError>().is_some());
    }

    #[test]
    fn test_context_chain_empty_without_context() {
        let err = anyhow::Error::new(IbmError::config_error("bad path"));
        assert!(context_chain(&err).is_empty());
    }

    #[test]
    fn test_unexpected_success_message() {
        let err = IbmError::UnexpectedSuccess {
            command: "true".to_string(),
            output: String::new(),
        };
        assert!(err
            .to_string()
            .starts_with("command succeeded (failure expected): true"));
    }
}
