//! One disposable worker process and its teardown.

use codex_core::{GatewayError, RuntimeSpec};
use serde::Serialize;
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::time::timeout;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum CleanupError {
    #[error("failed to signal worker {pid}: {source}")]
    Terminate { pid: u32, source: std::io::Error },
    #[error("failed to kill worker: {0}")]
    Kill(std::io::Error),
    #[error("failed to reap worker: {0}")]
    Wait(std::io::Error),
}

pub struct Worker {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: BufReader<ChildStdout>,
    pid: Option<u32>,
}

impl Worker {
    /// Launch `<runtime> <script>` with all three standard streams piped.
    pub fn spawn(runtime: &RuntimeSpec, script: &Path, working_dir: &Path) -> Result<Self, GatewayError> {
        let mut cmd = Command::new(&runtime.program);
        cmd.arg(script)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(var) = &runtime.search_path_var {
            cmd.env(var, search_path(working_dir, std::env::var_os(var)));
        }

        let mut child = cmd.spawn()?;
        let pid = child.id();

        let stdin = child.stdin.take();
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| GatewayError::Internal("worker stdout was not captured".to_string()))?;

        if let Some(stderr) = child.stderr.take() {
            let label = script.display().to_string();
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    debug!("[{}] {}", label, line);
                }
            });
        }

        debug!("Spawned worker {:?} for {}", pid, script.display());

        Ok(Self {
            child,
            stdin,
            stdout: BufReader::new(stdout),
            pid,
        })
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Write one message as a single newline-terminated JSON line.
    pub async fn send<T: Serialize>(&mut self, message: &T) -> std::io::Result<()> {
        let mut line = serde_json::to_vec(message)?;
        line.push(b'\n');

        let stdin = self.stdin.as_mut().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::BrokenPipe, "worker stdin already closed")
        })?;
        stdin.write_all(&line).await?;
        stdin.flush().await
    }

    /// Next raw line from the worker without its terminator, or `None` once
    /// its output is closed. Bytes are not checked for UTF-8 here.
    pub async fn read_line(&mut self) -> std::io::Result<Option<Vec<u8>>> {
        let mut line = Vec::new();
        if self.stdout.read_until(b'\n', &mut line).await? == 0 {
            return Ok(None);
        }
        while matches!(line.last(), Some(b'\n' | b'\r')) {
            line.pop();
        }
        debug!("Worker {:?} -> {}", self.pid, String::from_utf8_lossy(&line));
        Ok(Some(line))
    }

    /// Close stdin, ask the worker to stop, force-kill it after `grace`.
    pub async fn shutdown(mut self, grace: Duration) -> Result<(), CleanupError> {
        drop(self.stdin.take());

        match self.child.try_wait() {
            Ok(Some(status)) => {
                debug!("Worker {:?} already exited with {}", self.pid, status);
                return Ok(());
            }
            Ok(None) => {}
            Err(e) => {
                warn!("Could not poll worker {:?}: {}", self.pid, e);
            }
        }

        if let Err(e) = self.terminate() {
            warn!("{}", e);
        } else {
            match timeout(grace, self.child.wait()).await {
                Ok(Ok(status)) => {
                    debug!("Worker {:?} terminated with {}", self.pid, status);
                    return Ok(());
                }
                Ok(Err(e)) => warn!("Waiting on worker {:?} failed: {}", self.pid, e),
                Err(_) => warn!(
                    "Worker {:?} ignored termination for {:?}, killing",
                    self.pid, grace
                ),
            }
        }

        self.child.kill().await.map_err(CleanupError::Kill)?;
        self.child.wait().await.map_err(CleanupError::Wait)?;
        Ok(())
    }

    #[cfg(unix)]
    fn terminate(&mut self) -> Result<(), CleanupError> {
        let Some(pid) = self.pid else {
            return Ok(());
        };
        // SAFETY: plain signal delivery to a child we have not reaped yet.
        let rc = unsafe { libc::kill(pid as libc::pid_t, libc::SIGTERM) };
        if rc == 0 {
            Ok(())
        } else {
            Err(CleanupError::Terminate {
                pid,
                source: std::io::Error::last_os_error(),
            })
        }
    }

    #[cfg(not(unix))]
    fn terminate(&mut self) -> Result<(), CleanupError> {
        self.child.start_kill().map_err(CleanupError::Kill)
    }
}

/// `working_dir` first, then whatever the parent already had.
fn search_path(working_dir: &Path, existing: Option<OsString>) -> OsString {
    let mut paths = vec![working_dir.to_path_buf()];
    if let Some(existing) = existing {
        paths.extend(std::env::split_paths(&existing).filter(|p| !p.as_os_str().is_empty()));
    }
    std::env::join_paths(paths).unwrap_or_else(|_| working_dir.as_os_str().to_os_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_search_path_prepends_working_dir() {
        let joined = search_path(Path::new("/srv/codex"), Some(OsString::from("/opt/lib")));
        let parts: Vec<PathBuf> = std::env::split_paths(&joined).collect();
        assert_eq!(parts, vec![PathBuf::from("/srv/codex"), PathBuf::from("/opt/lib")]);
    }

    #[test]
    fn test_search_path_without_existing() {
        let joined = search_path(Path::new("/srv/codex"), None);
        assert_eq!(joined, OsString::from("/srv/codex"));
    }
}
