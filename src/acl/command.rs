//! External command runner with captured output and a timeout.

use crate::error::{Result, VpnBlockError};
use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Output of a command that exited successfully.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Standard output from the command.
    pub stdout: String,
    /// Standard error from the command (trimmed).
    pub stderr: String,
}

/// Run `argv` and wait at most `timeout` for it to finish.
///
/// # Returns
///
/// * `Ok(CommandOutput)` - On exit code 0
/// * `Err(VpnBlockError::CommandError)` - Spawn failure, non-zero exit, or
///   timeout (the child is killed)
pub fn run_command(argv: &[String], timeout: Duration) -> Result<CommandOutput> {
    let display = shell_words::join(argv);
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| VpnBlockError::UserError("cannot run an empty command".to_string()))?;

    log::info!("Running command: {}", display);

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| VpnBlockError::CommandError(format!("failed to execute {}: {}", display, e)))?;

    // Drain both pipes while waiting so a chatty child cannot block on a full pipe.
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let Some(status) = wait_with_timeout(&mut child, timeout, &display)? else {
        // A grandchild (sudo, a shell wrapper) can outlive the kill and keep
        // the pipes open. The readers are left detached instead of joined.
        drop(stdout);
        drop(stderr);
        return Err(VpnBlockError::CommandError(format!(
            "{} timed out after {}s",
            display,
            timeout.as_secs_f64()
        )));
    };

    let stdout = join_drain(stdout);
    let stderr = join_drain(stderr).trim().to_string();

    if status.success() {
        Ok(CommandOutput { stdout, stderr })
    } else {
        let exit_code = status.code().unwrap_or(-1);
        Err(VpnBlockError::CommandError(format!(
            "{} failed (exit code {}): {}",
            display, exit_code, stderr
        )))
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<String>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            String::from_utf8_lossy(&buf).into_owned()
        })
    })
}

fn join_drain(handle: Option<JoinHandle<String>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}

/// Wait for a child process with timeout.
///
/// Returns `None` if the process was killed because it ran too long.
fn wait_with_timeout(
    child: &mut Child,
    timeout: Duration,
    display: &str,
) -> Result<Option<std::process::ExitStatus>> {
    let start = Instant::now();
    let poll_interval = Duration::from_millis(20);

    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(Some(status)),
            Ok(None) => {
                if start.elapsed() >= timeout {
                    // On Unix this is SIGKILL; on Windows it is TerminateProcess.
                    let _ = child.kill();
                    let _ = child.wait();
                    return Ok(None);
                }
                thread::sleep(poll_interval);
            }
            Err(e) => {
                return Err(VpnBlockError::CommandError(format!(
                    "failed to check status of {}: {}",
                    display, e
                )));
            }
        }
    }
}
