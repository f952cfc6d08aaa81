//! Shell command runner
//!
//! Every external tool the drivers invoke goes through [`CommandRunner`]: the
//! command line is handed to the host shell, stderr is merged into stdout by
//! the shell itself, each line is echoed as soon as it arrives and kept in a
//! buffer, and the exit status is checked against what the caller expected.

use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Instant;

use anyhow::Result;
use console::style;

use crate::build::platform::HostPlatform;
use crate::error::IbmError;

/// Result of a command that exited with the expected status
#[derive(Debug)]
pub struct CommandOutput {
    /// Merged stdout/stderr, in the order the child wrote it
    pub text: String,

    /// Process exit code (`None` when terminated by a signal)
    pub exit_code: Option<i32>,
}

/// Something that can run a shell command line
///
/// The drivers only talk to this trait, so a build or run sequence can be
/// replayed against a recorder instead of real tools.
pub trait Shell {
    /// Run `command`; with `expect_failure` a zero exit status is the error
    fn run(&mut self, command: &str, expect_failure: bool) -> Result<String>;
}

/// Runs command lines through `sh -c` or `cmd /C`
#[derive(Debug, Clone)]
pub struct CommandRunner {
    platform: HostPlatform,
    working_dir: Option<PathBuf>,
    verbose: bool,
}

impl CommandRunner {
    pub fn new(platform: HostPlatform) -> Self {
        Self {
            platform,
            working_dir: None,
            verbose: false,
        }
    }

    /// Run commands from `dir` instead of the current directory
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Enable verbose output
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn shell_command(&self, command: &str) -> Command {
        let (shell, flag) = self.platform.shell();
        let line = self.platform.merge_stderr(command);

        let mut cmd = Command::new(shell);
        cmd.arg(flag);

        // cmd.exe does its own quote parsing
        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            cmd.raw_arg(line);
        }
        #[cfg(not(windows))]
        cmd.arg(line);

        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        cmd.stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());
        cmd
    }

    /// Run `command`, echoing its output to `out`
    ///
    /// Console echo is best effort; a closed `out` does not stop the child.
    pub fn run_to<W: Write>(
        &self,
        command: &str,
        expect_failure: bool,
        out: &mut W,
    ) -> Result<CommandOutput, IbmError> {
        let _ = writeln!(out, "{} {}", style("Running:").cyan().bold(), command);
        if self.verbose {
            if let Some(dir) = &self.working_dir {
                eprintln!("  in {}", dir.display());
            }
        }

        let start = Instant::now();

        let mut child = self
            .shell_command(command)
            .spawn()
            .map_err(|source| IbmError::Spawn {
                command: command.to_string(),
                source,
            })?;

        let mut text = String::new();
        if let Some(stdout) = child.stdout.take() {
            let mut reader = BufReader::new(stdout);
            let mut line = Vec::new();
            loop {
                line.clear();
                match reader.read_until(b'\n', &mut line) {
                    Ok(0) => break,
                    Ok(_) => {
                        let chunk = String::from_utf8_lossy(&line);
                        let _ = out.write_all(chunk.as_bytes());
                        let _ = out.flush();
                        text.push_str(&chunk);
                    }
                    Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(_) => break,
                }
            }
        }

        let status = child.wait().map_err(|source| IbmError::Spawn {
            command: command.to_string(),
            source,
        })?;

        let duration = start.elapsed();
        let _ = writeln!(out, "Elapsed time: {:.2} seconds", duration.as_secs_f64());

        let exit_code = status.code();

        match (status.success(), expect_failure) {
            (false, false) => Err(IbmError::CommandFailed {
                command: command.to_string(),
                exit_code,
                output: text,
            }),
            (true, true) => Err(IbmError::UnexpectedSuccess {
                command: command.to_string(),
                output: text,
            }),
            _ => Ok(CommandOutput { text, exit_code }),
        }
    }
}

impl Shell for CommandRunner {
    fn run(&mut self, command: &str, expect_failure: bool) -> Result<String> {
        let mut stdout = std::io::stdout();
        let output = self.run_to(command, expect_failure, &mut stdout)?;
        if self.verbose {
            match output.exit_code {
                Some(code) => eprintln!("  exit code: {}", code),
                None => eprintln!("  terminated by signal"),
            }
        }
        Ok(output.text)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use serial_test::serial;

    fn run(command: &str, expect_failure: bool) -> (Result<CommandOutput, IbmError>, String) {
        let runner = CommandRunner::new(HostPlatform::Unix);
        let mut echo = Vec::new();
        let result = runner.run_to(command, expect_failure, &mut echo);
        (result, String::from_utf8_lossy(&echo).to_string())
    }

    #[test]
    fn test_success_returns_merged_output_in_order() {
        let (result, _) = run("echo one; echo two 1>&2; echo three", false);
        let output = result.unwrap();
        assert_eq!(output.text, "one\ntwo\nthree\n");
        assert_eq!(output.exit_code, Some(0));
    }

    #[test]
    fn test_output_is_echoed_with_timing() {
        let (result, echo) = run("echo hello", false);
        assert!(result.is_ok());
        assert!(echo.contains("Running:"));
        assert!(echo.contains("echo hello"));
        assert!(echo.contains("hello\n"));
        assert!(echo.contains("Elapsed time: "));
        assert!(echo.trim_end().ends_with("seconds"));
    }

    #[test]
    fn test_failure_carries_command_and_output() {
        let (result, echo) = run("echo broken 1>&2; exit 3", false);
        match result {
            Err(IbmError::CommandFailed {
                command,
                exit_code,
                output,
            }) => {
                assert_eq!(command, "echo broken 1>&2; exit 3");
                assert_eq!(exit_code, Some(3));
                assert_eq!(output, "broken\n");
            }
            other => panic!("expected CommandFailed, got {:?}", other),
        }
        // Timing is reported whatever the outcome
        assert!(echo.contains("Elapsed time: "));
    }

    #[test]
    fn test_failure_message_names_command() {
        let (result, _) = run("echo nope; false", false);
        let message = result.unwrap_err().to_string();
        assert!(message.contains("Failed command: echo nope; false"));
        assert!(message.contains("nope"));
    }

    #[test]
    fn test_expected_failure_returns_normally() {
        let (result, _) = run("echo expected; exit 1", true);
        let output = result.unwrap();
        assert_eq!(output.text, "expected\n");
        assert_eq!(output.exit_code, Some(1));
    }

    #[test]
    fn test_unexpected_success() {
        let (result, _) = run("echo fine", true);
        match result {
            Err(IbmError::UnexpectedSuccess { command, output }) => {
                assert_eq!(command, "echo fine");
                assert_eq!(output, "fine\n");
            }
            other => panic!("expected UnexpectedSuccess, got {:?}", other),
        }
    }

    #[test]
    fn test_output_without_trailing_newline() {
        let (result, _) = run("printf 'a\\nb'", false);
        assert_eq!(result.unwrap().text, "a\nb");
    }

    #[test]
    fn test_runs_in_working_dir() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(temp.path().join("marker.txt"), "here").unwrap();

        let runner = CommandRunner::new(HostPlatform::Unix).current_dir(temp.path());
        let mut echo = Vec::new();
        let output = runner.run_to("cat marker.txt", false, &mut echo).unwrap();
        assert_eq!(output.text, "here");
    }

    #[test]
    fn test_missing_working_dir_is_spawn_error() {
        let temp = tempfile::tempdir().unwrap();
        let runner = CommandRunner::new(HostPlatform::Unix).current_dir(temp.path().join("gone"));
        let mut echo = Vec::new();

        match runner.run_to("echo never", false, &mut echo) {
            Err(IbmError::Spawn { command, source }) => {
                assert_eq!(command, "echo never");
                assert_eq!(source.kind(), ErrorKind::NotFound);
            }
            other => panic!("expected Spawn, got {:?}", other),
        }
        assert!(!String::from_utf8_lossy(&echo).contains("Elapsed time"));
    }

    #[test]
    #[serial]
    fn test_inherits_environment() {
        std::env::set_var("IBM_RUNNER_TEST_VAR", "inherited");
        let (result, _) = run("echo $IBM_RUNNER_TEST_VAR", false);
        assert_eq!(result.unwrap().text, "inherited\n");
    }
}
