//! Process launch seam.
//!
//! The [`ToolRunner`] trait is the only place the pipeline touches the OS
//! process API. The production implementation is [`SubprocessRunner`]; tests
//! substitute a recording mock so argument vectors, failure mapping and temp
//! cleanup can be checked without the external tool installed.

use std::ffi::{OsStr, OsString};
use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

/// What to do with the child's stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdoutMode {
    /// Redirect to the null device; the result comes from a file.
    Discard,
    /// Collect; the result is parsed from it.
    Capture,
}

/// One fully-built external tool command line.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub stdout: StdoutMode,
}

impl Invocation {
    /// Program and arguments joined with spaces, for logs and errors.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_os_str())
            .chain(self.args.iter().map(OsString::as_os_str))
            .map(OsStr::to_string_lossy)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Exit outcome and captured streams of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    pub success: bool,
    /// Empty when stdout was discarded.
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// Launches an [`Invocation`] and waits for it to exit.
///
/// Implementations must drain the captured streams while the process runs
/// and return only after it has exited.
pub trait ToolRunner: Send + Sync {
    fn run(&self, invocation: &Invocation) -> impl Future<Output = io::Result<ToolOutput>> + Send;
}

/// Runs invocations as real child processes via tokio.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubprocessRunner;

impl ToolRunner for SubprocessRunner {
    async fn run(&self, invocation: &Invocation) -> io::Result<ToolOutput> {
        let stdout = match invocation.stdout {
            StdoutMode::Discard => Stdio::null(),
            StdoutMode::Capture => Stdio::piped(),
        };
        let child = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(Stdio::piped())
            // A dropped (cancelled) call must not leave the tool running.
            .kill_on_drop(true)
            .spawn()?;

        // Reads stdout and stderr concurrently with waiting for exit, so a
        // chatty tool cannot block on a full pipe.
        let output = child.wait_with_output().await?;
        Ok(ToolOutput {
            success: output.status.success(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}
