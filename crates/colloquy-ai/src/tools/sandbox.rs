//! Sandbox that confines code execution to a throwaway directory.
//!
//! Each run gets a fresh scratch directory as its working directory and
//! `HOME`, a cleared environment, no stdin, a wall-clock limit and a cap on
//! captured output. On Unix the interpreter leads its own process group,
//! which is killed once the run ends. Limit violations are reported as outcomes, not errors.

use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tracing::warn;

/// Interpreters the sandbox is allowed to launch.
pub const ALLOWED_INTERPRETERS: &[&str] =
    &["python3", "python", "node", "ruby", "lua", "bash", "sh"];

const SCRIPT_NAME: &str = "snippet";

pub const NO_OUTPUT_ADVICE: &str =
    "Code executed successfully but produced no output. Use print() to display results.";

/// How long the pipes may stay open after the interpreter exits.
const DRAIN_GRACE: Duration = Duration::from_millis(500);

const TRUNCATION_MARKER: &str = "\n[output truncated]";

/// What happened when a snippet ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// Exited successfully and printed something.
    Output { stdout: String, truncated: bool },
    /// Exited successfully without printing anything.
    NoOutput,
    /// Raised, exited non-zero, or could not be started.
    Failed { detail: String },
    /// Killed after exceeding the wall-clock limit.
    TimedOut { limit: Duration },
}

impl ExecutionOutcome {
    /// Short label for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            ExecutionOutcome::Output { .. } => "output",
            ExecutionOutcome::NoOutput => "no_output",
            ExecutionOutcome::Failed { .. } => "failed",
            ExecutionOutcome::TimedOut { .. } => "timed_out",
        }
    }

    /// The text the model sees as the tool result.
    pub fn into_result_text(self) -> String {
        match self {
            ExecutionOutcome::Output { stdout, truncated } => {
                let mut text = format!("Output:\n{stdout}");
                if truncated {
                    text.push_str(TRUNCATION_MARKER);
                }
                text
            }
            ExecutionOutcome::NoOutput => NO_OUTPUT_ADVICE.to_string(),
            ExecutionOutcome::Failed { detail } => {
                format!("Error while executing code:\n{detail}")
            }
            ExecutionOutcome::TimedOut { limit } => format!(
                "Execution stopped: exceeded the {}s time limit",
                limit.as_secs_f64()
            ),
        }
    }
}

/// Restricts how model-supplied code is run.
#[derive(Debug, Clone)]
pub struct ExecutionSandbox {
    interpreter: String,
    interpreter_args: Vec<String>,
    timeout: Duration,
    max_output_bytes: usize,
}

impl ExecutionSandbox {
    /// Create a sandbox for `interpreter`, which must be on the allowlist.
    pub fn new(interpreter: impl Into<String>, interpreter_args: Vec<String>) -> Result<Self, String> {
        let interpreter = interpreter.into();
        validate_interpreter(&interpreter)?;
        Ok(Self {
            interpreter,
            interpreter_args,
            timeout: Duration::from_secs(10),
            max_output_bytes: 16 * 1024,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_output_bytes(mut self, max: usize) -> Self {
        self.max_output_bytes = max;
        self
    }

    pub fn interpreter(&self) -> &str {
        &self.interpreter
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run `code` to completion or until a limit is hit.
    pub async fn run(&self, code: &str) -> ExecutionOutcome {
        let scratch = match tempfile::Builder::new().prefix("colloquy-run-").tempdir() {
            Ok(dir) => dir,
            Err(e) => {
                return ExecutionOutcome::Failed {
                    detail: format!("could not create scratch directory: {e}"),
                }
            }
        };

        let script = scratch.path().join(SCRIPT_NAME);
        if let Err(e) = tokio::fs::write(&script, code).await {
            return ExecutionOutcome::Failed {
                detail: format!("could not write code to scratch directory: {e}"),
            };
        }

        let outcome = self.run_script(scratch.path(), &script).await;

        if let Err(e) = scratch.close() {
            warn!("failed to remove scratch directory: {e}");
        }
        outcome
    }

    async fn run_script(&self, dir: &Path, script: &Path) -> ExecutionOutcome {
        let mut command = Command::new(&self.interpreter);
        command
            .args(&self.interpreter_args)
            .arg(script)
            .current_dir(dir)
            .env_clear()
            .env("HOME", dir)
            .env("LANG", "C.UTF-8")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        command.process_group(0);
        if let Some(path) = std::env::var_os("PATH") {
            command.env("PATH", path);
        }

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                return ExecutionOutcome::Failed {
                    detail: format!("failed to start interpreter '{}': {e}", self.interpreter),
                }
            }
        };

        // Captured before waiting; tokio forgets the pid once the child is reaped.
        let group = child.id();
        let cap = self.max_output_bytes;
        let mut out_buf = Vec::new();
        let mut err_buf = Vec::new();

        let collected = self
            .collect(&mut child, group, cap, &mut out_buf, &mut err_buf)
            .await;

        let (status, out_dropped) = match collected {
            Collected::TimedOut => {
                if let Err(e) = child.kill().await {
                    warn!("failed to kill timed-out interpreter: {e}");
                }
                return ExecutionOutcome::TimedOut {
                    limit: self.timeout,
                };
            }
            Collected::Failed(e) => {
                return ExecutionOutcome::Failed {
                    detail: format!("failed to collect interpreter output: {e}"),
                }
            }
            Collected::Exited {
                status,
                out_dropped,
            } => (status, out_dropped),
        };

        if status.success() {
            if out_buf.is_empty() {
                ExecutionOutcome::NoOutput
            } else {
                ExecutionOutcome::Output {
                    stdout: lossy_text(&out_buf, out_dropped),
                    truncated: out_dropped,
                }
            }
        } else {
            let stderr = lossy_text(&err_buf, false);
            let detail = if stderr.trim().is_empty() {
                format!("process exited with {status}")
            } else {
                stderr.trim_end().to_string()
            };
            ExecutionOutcome::Failed { detail }
        }
    }

    /// Wait for the interpreter to exit while reading both pipes.
    ///
    /// When it exits or runs out of time, its process group is killed so
    /// background processes die with it. The pipes then get [`DRAIN_GRACE`]
    /// to reach EOF.
    async fn collect(
        &self,
        child: &mut Child,
        group: Option<u32>,
        cap: usize,
        out_buf: &mut Vec<u8>,
        err_buf: &mut Vec<u8>,
    ) -> Collected {
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let reading = async {
            let (out, err) = tokio::join!(
                read_capped(stdout, cap, out_buf),
                read_capped(stderr, cap, err_buf)
            );
            Ok::<_, std::io::Error>((out?, err?))
        };
        tokio::pin!(reading);
        let deadline = tokio::time::sleep(self.timeout);
        tokio::pin!(deadline);

        let mut read = None;
        let status = loop {
            tokio::select! {
                result = &mut reading, if read.is_none() => read = Some(result),
                status = child.wait() => break status,
                _ = &mut deadline => {
                    kill_process_group(group);
                    return Collected::TimedOut;
                }
            }
        };
        kill_process_group(group);
        let status = match status {
            Ok(status) => status,
            Err(e) => return Collected::Failed(e),
        };

        let read = match read {
            Some(result) => result,
            None => match tokio::time::timeout(DRAIN_GRACE, &mut reading).await {
                Ok(result) => result,
                Err(_) => {
                    warn!("output pipes still open after the interpreter exited");
                    Ok((false, false))
                }
            },
        };
        match read {
            Ok((out_dropped, _)) => Collected::Exited {
                status,
                out_dropped,
            },
            Err(e) => Collected::Failed(e),
        }
    }
}

/// How collecting a child's output ended.
enum Collected {
    Exited { status: ExitStatus, out_dropped: bool },
    Failed(std::io::Error),
    TimedOut,
}

/// SIGKILL every process in the group led by the interpreter.
#[cfg(unix)]
fn kill_process_group(group: Option<u32>) {
    let Some(pgid) = group.and_then(|pid| libc::pid_t::try_from(pid).ok()) else {
        return;
    };
    // SAFETY: killpg only sends a signal and has no memory effects.
    // ESRCH means the group is already gone.
    unsafe {
        libc::killpg(pgid, libc::SIGKILL);
    }
}

#[cfg(not(unix))]
fn kill_process_group(_group: Option<u32>) {}

/// Validate that the binary name of `interpreter` is on the allowlist.
pub(crate) fn validate_interpreter(interpreter: &str) -> Result<(), String> {
    // Strip any leading path prefix so `/usr/bin/python3` is treated as `python3`.
    let binary_name = interpreter.rsplit('/').next().unwrap_or(interpreter);

    if ALLOWED_INTERPRETERS.contains(&binary_name) {
        Ok(())
    } else {
        Err(format!("Interpreter not allowed: {binary_name}"))
    }
}

/// Read up to `cap` bytes into `buf`, then drain the rest so the child
/// never blocks on a full pipe. Returns whether anything was dropped.
///
/// Bytes land in `buf` as they arrive, so a cancelled read keeps them.
async fn read_capped<R>(reader: Option<R>, cap: usize, buf: &mut Vec<u8>) -> std::io::Result<bool>
where
    R: AsyncRead + Unpin,
{
    let Some(mut reader) = reader else {
        return Ok(false);
    };

    (&mut reader).take(cap as u64).read_to_end(buf).await?;
    let dropped = tokio::io::copy(&mut reader, &mut tokio::io::sink()).await?;
    Ok(dropped > 0)
}

fn lossy_text(bytes: &[u8], cut: bool) -> String {
    let mut text = String::from_utf8_lossy(bytes).into_owned();
    // A cut can split a multi-byte character; drop the replacement char it leaves.
    if cut && text.ends_with('\u{FFFD}') {
        text.pop();
    }
    text
}
