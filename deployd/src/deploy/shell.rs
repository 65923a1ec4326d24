//! Shell pipeline executor

use std::process::{ExitStatus, Stdio};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::deploy::executor::PipelineExecutor;
use crate::deploy::pipeline::{Pipeline, PipelineStep};
use crate::deploy::result::{FailureReason, PipelineFailure, PipelineOutput, PipelineResult};

/// How long output readers may keep draining after a step was killed
const KILL_GRACE: Duration = Duration::from_secs(2);

/// How long output readers may keep draining after a step exited on its own
///
/// Background processes a step leaves behind can hold the pipes open forever.
const EXIT_GRACE: Duration = Duration::from_millis(250);

/// Runs each step with the platform shell, in order, under one deadline
pub struct ShellExecutor {
    pipeline: Pipeline,
}

impl ShellExecutor {
    pub fn new(pipeline: Pipeline) -> Self {
        Self { pipeline }
    }
}

#[async_trait]
impl PipelineExecutor for ShellExecutor {
    async fn execute(&self) -> PipelineResult {
        let steps = self.pipeline.steps();
        let timeout = self.pipeline.timeout();
        let mut output = PipelineOutput::default();

        if steps.is_empty() {
            error!("Refusing to run an empty pipeline");
            return PipelineResult::Failure {
                output,
                failure: PipelineFailure {
                    step_index: None,
                    command: None,
                    reason: FailureReason::EmptyPipeline,
                },
            };
        }

        let started = Instant::now();
        let deadline = started + timeout;

        for (index, step) in steps.iter().enumerate() {
            info!(
                step = index,
                command = %step.command,
                dir = %step.working_dir.display(),
                "Running pipeline step"
            );

            let run = run_step(step, deadline).await;
            output.push(&run.stdout, &run.stderr);

            let reason = match run.exit {
                StepExit::Exited(status) if status.success() => {
                    debug!(step = index, "Pipeline step succeeded");
                    continue;
                }
                StepExit::Exited(status) => FailureReason::ExitStatus {
                    code: status.code(),
                },
                StepExit::TimedOut => FailureReason::TimedOut { after: timeout },
                StepExit::SpawnFailed(message) => FailureReason::Spawn { message },
            };

            let failure = PipelineFailure::at_step(index, &step.command, reason);
            if failure.is_timeout() {
                warn!("Pipeline aborted: {}", failure);
            } else {
                error!("Pipeline failed: {}", failure);
            }

            return PipelineResult::Failure { output, failure };
        }

        info!(
            steps = steps.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Pipeline completed"
        );
        PipelineResult::Success(output)
    }
}

enum StepExit {
    Exited(ExitStatus),
    TimedOut,
    SpawnFailed(String),
}

struct StepRun {
    exit: StepExit,
    stdout: String,
    stderr: String,
}

async fn run_step(step: &PipelineStep, deadline: Instant) -> StepRun {
    let mut command = shell_command(&step.command);
    command
        .current_dir(&step.working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    // The step leads its own process group so a timeout can kill everything it started.
    #[cfg(unix)]
    command.process_group(0);

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(e) => {
            return StepRun {
                exit: StepExit::SpawnFailed(e.to_string()),
                stdout: String::new(),
                stderr: String::new(),
            }
        }
    };
    let pid = child.id();

    let mut stdout = Capture::spawn(child.stdout.take());
    let mut stderr = Capture::spawn(child.stderr.take());

    let finished = tokio::time::timeout_at(deadline, child.wait()).await;

    let exit = match finished {
        Ok(Ok(status)) => {
            let grace = EXIT_GRACE.min(deadline.saturating_duration_since(Instant::now()));
            stdout.drain_for(grace).await;
            stderr.drain_for(grace).await;
            StepExit::Exited(status)
        }
        Ok(Err(e)) => StepExit::SpawnFailed(format!("failed to wait for process: {}", e)),
        Err(_) => {
            kill_process_tree(&mut child, pid).await;
            stdout.drain_for(KILL_GRACE).await;
            stderr.drain_for(KILL_GRACE).await;
            StepExit::TimedOut
        }
    };

    StepRun {
        exit,
        stdout: stdout.take(),
        stderr: stderr.take(),
    }
}

fn shell_command(script: &str) -> Command {
    if cfg!(windows) {
        let mut command = Command::new("cmd");
        command.arg("/C").arg(script);
        command
    } else {
        let mut command = Command::new("sh");
        command.arg("-c").arg(script);
        command
    }
}

async fn kill_process_tree(child: &mut Child, pid: Option<u32>) {
    #[cfg(unix)]
    {
        if let Some(pid) = pid.and_then(|pid| libc::pid_t::try_from(pid).ok()) {
            // SAFETY: kill(2) only signals; a negative pid targets the group the step leads.
            let rc = unsafe { libc::kill(-pid, libc::SIGKILL) };
            if rc != 0 {
                debug!("Process group {} already gone", pid);
            }
        }
    }
    #[cfg(not(unix))]
    let _ = pid;

    if let Err(e) = child.kill().await {
        debug!("Failed to kill step process: {}", e);
    }
}

/// Background reader collecting one output stream
///
/// The buffer is shared so partial output survives when the reader is
/// aborted after a timeout.
struct Capture {
    buffer: Arc<Mutex<Vec<u8>>>,
    task: Option<JoinHandle<()>>,
}

impl Capture {
    fn spawn<R>(reader: Option<R>) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let task = reader.map(|mut reader| {
            let buffer = buffer.clone();
            tokio::spawn(async move {
                let mut chunk = [0u8; 8192];
                loop {
                    match reader.read(&mut chunk).await {
                        Ok(0) => break,
                        Ok(n) => {
                            if let Ok(mut buffer) = buffer.lock() {
                                buffer.extend_from_slice(&chunk[..n]);
                            }
                        }
                        Err(e) => {
                            debug!("Output stream read failed: {}", e);
                            break;
                        }
                    }
                }
            })
        });

        Self { buffer, task }
    }

    async fn drained(&mut self) {
        if let Some(task) = self.task.as_mut() {
            let _ = task.await;
            self.task = None;
        }
    }

    async fn drain_for(&mut self, grace: Duration) {
        if tokio::time::timeout(grace, self.drained()).await.is_err() {
            if let Some(task) = self.task.take() {
                task.abort();
            }
        }
    }

    fn take(&self) -> String {
        match self.buffer.lock() {
            Ok(mut buffer) => String::from_utf8_lossy(&std::mem::take(&mut *buffer)).into_owned(),
            Err(_) => String::new(),
        }
    }
}
