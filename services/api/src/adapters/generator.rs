//! services/api/src/adapters/generator.rs
//!
//! This module contains the adapter that runs the external documentation
//! generator as a child process. It implements the `DocumentGenerator` port
//! from the `core` crate.

use async_trait::async_trait;
use std::io;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};
use yaydoc_core::domain::{ArgumentList, ExitOutcome, GeneratorEvent};
use yaydoc_core::ports::{DocumentGenerator, GeneratorEvents, PortError, PortResult};

/// Variables the child may see. Everything else is stripped.
const PASSTHROUGH_ENV: [&str; 4] = ["PATH", "HOME", "LANG", "TMPDIR"];

/// How long output is still collected after the generator has exited.
const OUTPUT_DRAIN: Duration = Duration::from_millis(250);

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `DocumentGenerator` port with `tokio::process`.
#[derive(Clone, Debug)]
pub struct ProcessGenerator {
    program: PathBuf,
    leading_args: Vec<String>,
    working_dir: Option<PathBuf>,
    timeout: Duration,
}

impl ProcessGenerator {
    /// Creates a new `ProcessGenerator` that kills jobs running longer than `timeout`.
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
            working_dir: None,
            timeout,
        }
    }

    /// Arguments placed before the job arguments, e.g. a script path for an interpreter.
    pub fn with_leading_args(mut self, args: Vec<String>) -> Self {
        self.leading_args = args;
        self
    }

    pub fn with_working_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.working_dir = dir;
        self
    }

    fn command(&self, args: &ArgumentList) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.leading_args)
            .args(args.iter())
            .env_clear()
            .envs(std::env::vars_os().filter(|(key, _)| {
                key.to_str()
                    .is_some_and(|key| PASSTHROUGH_ENV.contains(&key))
            }))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }
        command
    }
}

//=========================================================================================
// `DocumentGenerator` Trait Implementation
//=========================================================================================

#[async_trait]
impl DocumentGenerator for ProcessGenerator {
    async fn invoke(&self, args: &ArgumentList) -> PortResult<GeneratorEvents> {
        let mut child = self.command(args).spawn().map_err(|e| {
            PortError::Unexpected(format!(
                "failed to start generator `{}`: {}",
                self.program.display(),
                e
            ))
        })?;
        info!(
            program = %self.program.display(),
            pid = ?child.id(),
            "Generator process started"
        );
        debug!(args = ?args.as_slice(), "Generator arguments");

        let stdout = child.stdout.take().ok_or_else(|| {
            PortError::Unexpected("generator stdout was not captured".to_string())
        })?;
        let stderr = child.stderr.take().ok_or_else(|| {
            PortError::Unexpected("generator stderr was not captured".to_string())
        })?;
        let timeout = self.timeout;

        let events = async_stream::stream! {
            let deadline = tokio::time::sleep(timeout);
            tokio::pin!(deadline);

            let mut stdout = BufReader::new(stdout).split(b'\n');
            let mut stderr = BufReader::new(stderr).split(b'\n');
            let mut stdout_open = true;
            let mut stderr_open = true;

            // The exit status decides completion; closed pipes do not.
            let status = loop {
                let step = tokio::select! {
                    line = stdout.next_segment(), if stdout_open => {
                        Step::from_read(line, GeneratorEvent::Stdout, Channel::Stdout)
                    }
                    line = stderr.next_segment(), if stderr_open => {
                        Step::from_read(line, GeneratorEvent::Stderr, Channel::Stderr)
                    }
                    status = child.wait() => Step::Exited(status),
                    _ = &mut deadline => Step::Deadline,
                };
                match step {
                    Step::Line(event) => yield event,
                    Step::Closed(Channel::Stdout) => stdout_open = false,
                    Step::Closed(Channel::Stderr) => stderr_open = false,
                    Step::Exited(status) => break Some(status),
                    Step::Deadline => break None,
                }
            };

            let outcome = match status {
                Some(status) => {
                    // Background processes may keep the pipes open after exit,
                    // so buffered output only gets a short grace period.
                    let drain = tokio::time::sleep(OUTPUT_DRAIN);
                    tokio::pin!(drain);
                    while stdout_open || stderr_open {
                        let step = tokio::select! {
                            line = stdout.next_segment(), if stdout_open => {
                                Step::from_read(line, GeneratorEvent::Stdout, Channel::Stdout)
                            }
                            line = stderr.next_segment(), if stderr_open => {
                                Step::from_read(line, GeneratorEvent::Stderr, Channel::Stderr)
                            }
                            _ = &mut drain => Step::Deadline,
                        };
                        match step {
                            Step::Line(event) => yield event,
                            Step::Closed(Channel::Stdout) => stdout_open = false,
                            Step::Closed(Channel::Stderr) => stderr_open = false,
                            Step::Exited(_) | Step::Deadline => break,
                        }
                    }
                    exit_outcome(status)
                }
                None => kill(&mut child, timeout).await,
            };
            yield GeneratorEvent::Exited(outcome);
        };

        Ok(Box::pin(events))
    }
}

//=========================================================================================
// Helpers
//=========================================================================================

enum Channel {
    Stdout,
    Stderr,
}

enum Step {
    Line(GeneratorEvent),
    Closed(Channel),
    Exited(io::Result<ExitStatus>),
    Deadline,
}

impl Step {
    fn from_read(
        read: io::Result<Option<Vec<u8>>>,
        wrap: fn(String) -> GeneratorEvent,
        channel: Channel,
    ) -> Self {
        match read {
            Ok(Some(bytes)) => {
                let line = String::from_utf8_lossy(&bytes);
                Step::Line(wrap(line.trim_end_matches('\r').to_string()))
            }
            Ok(None) => Step::Closed(channel),
            Err(e) => {
                warn!("Failed to read generator output: {}", e);
                Step::Closed(channel)
            }
        }
    }
}

fn exit_outcome(status: io::Result<ExitStatus>) -> ExitOutcome {
    match status {
        Ok(status) => match status.code() {
            Some(code) => ExitOutcome::Code(code),
            None => ExitOutcome::Signalled,
        },
        Err(e) => ExitOutcome::Lost(e.to_string()),
    }
}

async fn kill(child: &mut Child, timeout: Duration) -> ExitOutcome {
    warn!(
        pid = ?child.id(),
        "Generator exceeded {}s, killing it",
        timeout.as_secs_f64()
    );
    if let Err(e) = child.kill().await {
        warn!("Failed to kill generator process: {}", e);
    }
    ExitOutcome::TimedOut(timeout)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use futures::StreamExt;
    use std::time::Instant;
    use tempfile::TempDir;

    /// Writes `body` as a shell script and returns a generator that runs it via `/bin/sh`.
    fn script(dir: &TempDir, body: &str, timeout: Duration) -> ProcessGenerator {
        let path = dir.path().join("generate.sh");
        std::fs::write(&path, body).unwrap();
        ProcessGenerator::new("/bin/sh", timeout)
            .with_leading_args(vec![path.to_string_lossy().into_owned()])
    }

    fn args(values: &[&str]) -> ArgumentList {
        ArgumentList::new(values.iter().map(|s| s.to_string()).collect())
    }

    async fn run(generator: &ProcessGenerator, list: &ArgumentList) -> Vec<GeneratorEvent> {
        generator.invoke(list).await.unwrap().collect().await
    }

    #[tokio::test]
    async fn output_lines_precede_the_exit_event() {
        let dir = TempDir::new().unwrap();
        let generator = script(
            &dir,
            "echo cloning\necho 'theme missing' >&2\necho done\nexit 0\n",
            Duration::from_secs(10),
        );

        let events = run(&generator, &args(&[])).await;

        assert_eq!(events.last(), Some(&GeneratorEvent::Exited(ExitOutcome::Code(0))));
        let stdout: Vec<&GeneratorEvent> = events
            .iter()
            .filter(|e| matches!(e, GeneratorEvent::Stdout(_)))
            .collect();
        assert_eq!(
            stdout,
            [
                &GeneratorEvent::Stdout("cloning".to_string()),
                &GeneratorEvent::Stdout("done".to_string()),
            ]
        );
        assert!(events.contains(&GeneratorEvent::Stderr("theme missing".to_string())));
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, GeneratorEvent::Exited(_)))
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn non_zero_exit_code_is_reported() {
        let dir = TempDir::new().unwrap();
        let generator = script(&dir, "echo failing >&2\nexit 3\n", Duration::from_secs(10));

        let events = run(&generator, &args(&[])).await;

        assert_eq!(events.last(), Some(&GeneratorEvent::Exited(ExitOutcome::Code(3))));
    }

    #[tokio::test]
    async fn arguments_arrive_verbatim() {
        let dir = TempDir::new().unwrap();
        let generator = script(&dir, "printf '%s\\n' \"$@\"\n", Duration::from_secs(10));
        let list = args(&["-a", "Jane \"JD\" Doe", "-o", "$(whoami) `id`", "-p", "docs/my folder"]);

        let events = run(&generator, &list).await;

        let printed: Vec<String> = events
            .into_iter()
            .filter_map(|e| match e {
                GeneratorEvent::Stdout(line) => Some(line),
                _ => None,
            })
            .collect();
        assert_eq!(printed, list.as_slice());
    }

    #[tokio::test]
    async fn slow_generators_are_killed_at_the_deadline() {
        let dir = TempDir::new().unwrap();
        let limit = Duration::from_millis(300);
        let generator = script(&dir, "echo started\nsleep 30\n", limit);

        let started = Instant::now();
        let events = run(&generator, &args(&[])).await;

        assert!(started.elapsed() < Duration::from_secs(10));
        assert_eq!(events.first(), Some(&GeneratorEvent::Stdout("started".to_string())));
        assert_eq!(
            events.last(),
            Some(&GeneratorEvent::Exited(ExitOutcome::TimedOut(limit)))
        );
    }

    #[tokio::test]
    async fn exit_is_reported_while_background_jobs_hold_the_pipes() {
        let dir = TempDir::new().unwrap();
        let generator = script(&dir, "echo done\nsleep 5 &\nexit 0\n", Duration::from_secs(3));

        let started = Instant::now();
        let events = run(&generator, &args(&[])).await;

        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(events.contains(&GeneratorEvent::Stdout("done".to_string())));
        assert_eq!(events.last(), Some(&GeneratorEvent::Exited(ExitOutcome::Code(0))));
    }

    #[tokio::test]
    async fn child_runs_in_the_configured_directory() {
        let dir = TempDir::new().unwrap();
        let workdir = TempDir::new().unwrap();
        let generator = script(&dir, "pwd -P\n", Duration::from_secs(10))
            .with_working_dir(Some(workdir.path().to_path_buf()));

        let events = run(&generator, &args(&[])).await;

        let expected = workdir.path().canonicalize().unwrap();
        assert_eq!(
            events.first(),
            Some(&GeneratorEvent::Stdout(expected.to_string_lossy().into_owned()))
        );
    }

    #[tokio::test]
    async fn missing_program_fails_to_start() {
        let generator =
            ProcessGenerator::new("/definitely/not/a/generator", Duration::from_secs(1));

        let result = generator.invoke(&args(&[])).await;

        assert!(matches!(result, Err(PortError::Unexpected(_))));
    }
}
