//! The write-input → invoke-tool → read-output protocol shared by every
//! operation.
//!
//! ```text
//! buffers ──write──▶ temp inputs ──┐
//!                                  ├─ build_args ─▶ tool ──▶ temp output ──read──▶ bytes
//!                   temp output ───┘                    └──▶ stdout ──parse──▶ T
//! ```
//!
//! [`Pipeline::run_file_result`] returns the bytes of a designated output
//! file; [`Pipeline::run_stdout_result`] parses the tool's stdout instead.
//! Both open a [`TempScope`](super::temp::TempScope) first, so every temp path
//! they allocate is gone before the call returns, whatever the outcome.

use super::runner::{Invocation, StdoutMode, SubprocessRunner, ToolOutput, ToolRunner};
use super::temp::TempStore;
use crate::config::ToolConfig;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum MagickError {
    /// Bad or missing parameters, detected before anything was launched.
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// The tool exited unsuccessfully, could not be launched, or produced no
    /// readable output.
    #[error("Command failed: {command}: {stderr}")]
    ToolFailed { command: String, stderr: String },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// The tool succeeded but its stdout could not be decoded.
    #[error("Unexpected tool output: {0}")]
    UnexpectedOutput(String),
}

/// Result type for pipeline and image operations.
pub type Result<T> = std::result::Result<T, MagickError>;

/// Which of the configured executables an invocation uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    /// The transform tool (`convert`).
    Convert,
    /// The inspection tool (`identify`).
    Identify,
}

/// Executes external-tool transforms with scoped temp files.
///
/// Holds no per-call state, so one pipeline can serve any number of
/// concurrent operations.
#[derive(Debug, Clone)]
pub struct Pipeline<R = SubprocessRunner> {
    temp: TempStore,
    runner: R,
    convert_program: PathBuf,
    identify_program: PathBuf,
    launch_gate: Option<Arc<Semaphore>>,
}

impl Pipeline<SubprocessRunner> {
    /// Build a pipeline that launches real processes, resolving the temp root
    /// from the config and, if unset, the environment.
    pub fn from_config(config: &ToolConfig) -> Result<Self> {
        Self::with_runner(config, config.temp_root(), SubprocessRunner)
    }
}

impl<R: ToolRunner> Pipeline<R> {
    /// Build a pipeline with an explicit temp root and runner.
    pub fn with_runner(config: &ToolConfig, temp_root: PathBuf, runner: R) -> Result<Self> {
        config
            .validate()
            .map_err(|e| MagickError::Configuration(e.to_string()))?;
        Ok(Self {
            temp: TempStore::new(temp_root)?,
            runner,
            convert_program: config.tools.convert.clone(),
            identify_program: config.tools.identify.clone(),
            launch_gate: config
                .processing
                .max_processes
                .map(|n| Arc::new(Semaphore::new(n))),
        })
    }

    pub fn temp_store(&self) -> &TempStore {
        &self.temp
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    fn program(&self, tool: Tool) -> &Path {
        match tool {
            Tool::Convert => &self.convert_program,
            Tool::Identify => &self.identify_program,
        }
    }

    /// Write `inputs` to temp files, run `tool` with the arguments from
    /// `build_args(input_paths, output_path)`, and return the output file's
    /// contents.
    ///
    /// Input paths are passed in input order. Succeeds only if the tool exits
    /// successfully *and* the output file is readable.
    pub async fn run_file_result<F>(
        &self,
        tool: Tool,
        inputs: &[impl AsRef<[u8]>],
        build_args: F,
    ) -> Result<Vec<u8>>
    where
        F: FnOnce(&[PathBuf], &Path) -> Vec<OsString>,
    {
        let mut scope = self.temp.scope();

        let input_paths: Vec<PathBuf> = inputs.iter().map(|_| scope.allocate_path()).collect();
        for (path, data) in input_paths.iter().zip(inputs) {
            tokio::fs::write(path, data.as_ref()).await?;
        }
        let output_path = scope.allocate_path();

        let invocation = Invocation {
            program: self.program(tool).to_path_buf(),
            args: build_args(&input_paths, &output_path),
            stdout: StdoutMode::Discard,
        };
        self.execute(&invocation).await?;

        match tokio::fs::read(&output_path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) => {
                let command = invocation.command_line();
                warn!(%command, error = %e, "command produced no readable output");
                Err(MagickError::ToolFailed {
                    command,
                    stderr: format!("no readable output at {}: {e}", output_path.display()),
                })
            }
        }
        // `scope` drops here, after the read and before the result is returned.
    }

    /// Write `input` to a temp file, run `tool` with the arguments from
    /// `build_args(input_path)` capturing stdout, and decode it with `parse`.
    pub async fn run_stdout_result<T, F, P>(
        &self,
        tool: Tool,
        input: &[u8],
        build_args: F,
        parse: P,
    ) -> Result<T>
    where
        F: FnOnce(&Path) -> Vec<OsString>,
        P: FnOnce(&str) -> Result<T>,
    {
        let mut scope = self.temp.scope();

        let input_path = scope.allocate_path();
        tokio::fs::write(&input_path, input).await?;

        let invocation = Invocation {
            program: self.program(tool).to_path_buf(),
            args: build_args(&input_path),
            stdout: StdoutMode::Capture,
        };
        let output = self.execute(&invocation).await?;

        parse(&String::from_utf8_lossy(&output.stdout))
    }

    /// Launch under the concurrency gate and map failure to
    /// [`MagickError::ToolFailed`].
    async fn execute(&self, invocation: &Invocation) -> Result<ToolOutput> {
        let _permit = match &self.launch_gate {
            Some(gate) => Some(
                gate.acquire()
                    .await
                    .map_err(|e| MagickError::Configuration(e.to_string()))?,
            ),
            None => None,
        };

        let command = invocation.command_line();
        debug!(%command, "running");

        let output = match self.runner.run(invocation).await {
            Ok(output) => output,
            // A missing binary is just another tool failure.
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(%command, error = %e, "command could not be launched");
                return Err(MagickError::ToolFailed {
                    command,
                    stderr: e.to_string(),
                });
            }
            Err(e) => return Err(MagickError::Io(e)),
        };

        if !output.success {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            warn!(%command, %stderr, "command failed");
            return Err(MagickError::ToolFailed { command, stderr });
        }
        Ok(output)
    }
}
