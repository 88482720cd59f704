//! Script execution.
//!
//! [`ProcessExecutor`] implements [`ScriptExecutor`] by spawning the script
//! with the host environment overlaid by the converted properties, feeding an
//! optional input stream to its stdin, and capturing stdout. The exit status
//! is logged but never interpreted: only the captured text drives the result.

use std::fmt;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::thread;

use tracing::{debug, warn};

use crate::environment::Environment;
use crate::error::ExecError;

/// Tracing target for script process operations.
const PROCESS_TARGET: &str = "lease_exec::process";

/// Everything needed to run one script: argv, environment overlay, working
/// directory and optional stdin contents.
///
/// An invocation is consumed by [`ScriptExecutor::execute`], so the input
/// stream is released when the call returns.
pub struct ScriptInvocation {
    argv: Vec<String>,
    environment: Environment,
    working_dir: Option<PathBuf>,
    input: Option<Box<dyn Read + Send>>,
}

impl ScriptInvocation {
    /// Creates an invocation with no working directory override and no input.
    #[must_use]
    pub const fn new(argv: Vec<String>, environment: Environment) -> Self {
        Self {
            argv,
            environment,
            working_dir: None,
            input: None,
        }
    }

    /// Runs the script from `dir`.
    #[must_use]
    pub fn with_working_dir(mut self, dir: Option<&Path>) -> Self {
        self.working_dir = dir.map(Path::to_path_buf);
        self
    }

    /// Pipes `input` to the script's stdin.
    #[must_use]
    pub fn with_input(mut self, input: impl Read + Send + 'static) -> Self {
        self.input = Some(Box::new(input));
        self
    }

    /// Argument vector, program first.
    #[must_use]
    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    /// Environment overlay.
    #[must_use]
    pub const fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Working directory override.
    #[must_use]
    pub fn working_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }

    /// Returns whether an input stream is attached.
    #[must_use]
    pub const fn has_input(&self) -> bool {
        self.input.is_some()
    }
}

impl fmt::Debug for ScriptInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptInvocation")
            .field("argv", &self.argv)
            .field("environment", &self.environment)
            .field("working_dir", &self.working_dir)
            .field("has_input", &self.input.is_some())
            .finish()
    }
}

/// Trait abstracting script execution for testability.
///
/// The production implementation is [`ProcessExecutor`]. Test code can
/// implement this trait to return canned status text without spawning
/// processes.
///
/// # Example
///
/// ```
/// use lease_exec::{ExecError, ScriptExecutor, ScriptInvocation};
///
/// struct CannedExecutor;
///
/// impl ScriptExecutor for CannedExecutor {
///     fn execute(&self, _invocation: ScriptInvocation) -> Result<String, ExecError> {
///         Ok(String::from("OK;lease-1\n"))
///     }
/// }
/// ```
pub trait ScriptExecutor {
    /// Runs the script and returns everything it wrote to stdout.
    ///
    /// # Errors
    ///
    /// Returns an [`ExecError`] if the script cannot be spawned or its
    /// streams cannot be serviced.
    fn execute(&self, invocation: ScriptInvocation) -> Result<String, ExecError>;
}

/// Executes scripts as child processes of the current process.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessExecutor;

impl ScriptExecutor for ProcessExecutor {
    fn execute(&self, invocation: ScriptInvocation) -> Result<String, ExecError> {
        run_script(invocation)
    }
}

fn run_script(invocation: ScriptInvocation) -> Result<String, ExecError> {
    let ScriptInvocation {
        argv,
        environment,
        working_dir,
        input,
    } = invocation;
    let (program, args) = argv.split_first().ok_or(ExecError::EmptyArgv)?;

    let mut command = Command::new(program);
    command.args(args);
    command.envs(&environment);
    if let Some(dir) = &working_dir {
        command.current_dir(dir);
    }
    command.stdin(if input.is_some() {
        Stdio::piped()
    } else {
        Stdio::null()
    });
    command.stdout(Stdio::piped());
    command.stderr(Stdio::piped());

    debug!(
        target: PROCESS_TARGET,
        program = %program,
        ?argv,
        env_vars = environment.len(),
        working_dir = ?working_dir,
        "spawning script"
    );

    let mut child = command.spawn().map_err(|err| ExecError::Spawn {
        program: program.clone(),
        source: Arc::new(err),
    })?;

    let stdin = child.stdin.take();
    let output = thread::scope(|scope| {
        let writer = match (stdin, input) {
            (Some(pipe), Some(reader)) => Some(scope.spawn(move || feed_input(pipe, reader))),
            _ => None,
        };
        let output = child.wait_with_output();
        let written = writer.map_or(Ok(()), |handle| {
            handle
                .join()
                .unwrap_or_else(|_| Err(io::Error::other("stdin writer panicked")))
        });
        written.and(output)
    })
    .map_err(|err| ExecError::Io {
        program: program.clone(),
        source: Arc::new(err),
    })?;

    log_stderr(program, &output.stderr);
    debug!(
        target: PROCESS_TARGET,
        program = %program,
        status = ?output.status,
        bytes = output.stdout.len(),
        "script exited"
    );

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Copies the input stream into the child's stdin and closes the pipe.
///
/// A broken pipe means the script exited without consuming its input, which
/// is not an error in itself.
fn feed_input(mut pipe: impl Write, mut reader: Box<dyn Read + Send>) -> io::Result<()> {
    match io::copy(&mut reader, &mut pipe).and_then(|_| pipe.flush()) {
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => {
            warn!(
                target: PROCESS_TARGET,
                "script closed stdin before consuming its input"
            );
            Ok(())
        }
        result => result,
    }
}

fn log_stderr(program: &str, stderr: &[u8]) {
    if stderr.is_empty() {
        return;
    }
    debug!(
        target: PROCESS_TARGET,
        program = %program,
        stderr = %String::from_utf8_lossy(stderr).trim(),
        "script stderr output"
    );
}

#[cfg(all(test, unix))]
mod tests {
    //! Process tests against real `/bin/sh` scripts.

    use std::io::Cursor;

    use rstest::rstest;

    use super::*;
    use crate::properties::Properties;

    fn sh(script: &str) -> Vec<String> {
        vec!["sh".into(), "-c".into(), script.into()]
    }

    #[test]
    fn captures_full_stdout() {
        let invocation =
            ScriptInvocation::new(sh("echo 'OK;lease-1'; echo more"), Environment::new());
        let output = ProcessExecutor.execute(invocation).expect("execute");
        assert_eq!(output, "OK;lease-1\nmore\n");
    }

    #[test]
    fn overlays_the_converted_properties() {
        let properties: Properties = [("unit.name", "alpha")].into_iter().collect();
        let invocation = ScriptInvocation::new(
            sh(r#"echo "OK $UNIT_NAME;${PATH:+has-path}""#),
            Environment::from_properties(&properties),
        );
        let output = ProcessExecutor.execute(invocation).expect("execute");
        assert_eq!(output.trim_end(), "OK alpha;has-path");
    }

    #[test]
    fn honours_the_working_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let canonical = dir.path().canonicalize().expect("canonicalize");
        let invocation = ScriptInvocation::new(sh("pwd -P"), Environment::new())
            .with_working_dir(Some(canonical.as_path()));
        let output = ProcessExecutor.execute(invocation).expect("execute");
        assert_eq!(Path::new(output.trim_end()), canonical.as_path());
    }

    #[test]
    fn pipes_the_input_stream() {
        let invocation =
            ScriptInvocation::new(sh(r#"read line; echo "OK $line;x""#), Environment::new())
                .with_input(Cursor::new(b"from stdin\n".to_vec()));
        let output = ProcessExecutor.execute(invocation).expect("execute");
        assert_eq!(output.trim_end(), "OK from stdin;x");
    }

    #[test]
    fn tolerates_scripts_that_ignore_their_input() {
        let input = vec![b'x'; 1 << 20];
        let invocation = ScriptInvocation::new(sh("echo OK;"), Environment::new())
            .with_input(Cursor::new(input));
        let output = ProcessExecutor.execute(invocation).expect("execute");
        assert_eq!(output, "OK\n");
    }

    #[test]
    fn stdin_is_empty_without_input() {
        let invocation = ScriptInvocation::new(sh("cat; echo 'OK;done'"), Environment::new());
        let output = ProcessExecutor.execute(invocation).expect("execute");
        assert_eq!(output, "OK;done\n");
    }

    #[rstest]
    #[case::non_zero(sh("echo 'ERROR bad'; exit 3"), "ERROR bad\n")]
    #[case::zero_without_output(sh("exit 0"), "")]
    fn exit_code_is_not_interpreted(#[case] argv: Vec<String>, #[case] expected: &str) {
        let invocation = ScriptInvocation::new(argv, Environment::new());
        let output = ProcessExecutor.execute(invocation).expect("execute");
        assert_eq!(output, expected);
    }

    #[test]
    fn spawn_failure_is_an_execution_error() {
        let invocation = ScriptInvocation::new(
            vec!["/nonexistent/lease-exec-script".into()],
            Environment::new(),
        );
        let error = ProcessExecutor.execute(invocation).expect_err("should fail");
        assert!(
            matches!(&error, ExecError::Spawn { program, .. } if program == "/nonexistent/lease-exec-script"),
            "unexpected error: {error}"
        );
    }

    #[test]
    fn empty_argv_is_rejected() {
        let invocation = ScriptInvocation::new(Vec::new(), Environment::new());
        let error = ProcessExecutor.execute(invocation).expect_err("should fail");
        assert!(matches!(error, ExecError::EmptyArgv));
    }
}
