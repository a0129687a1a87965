//! Inter-process command channel.
//!
//! A single named unix datagram socket: external tools (the `send`
//! subcommand, the web panel) write one UTF-8 text message per command, the
//! daemon is the only reader. Nothing is acknowledged; a command sent while
//! the daemon is away is simply lost.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use tokio::net::UnixDatagram;

/// Bounded wait of one poll; the main loop provides the pacing.
const POLL_TIMEOUT: Duration = Duration::from_millis(10);
const MAX_COMMAND_LEN: usize = 512;

pub struct CommandChannel {
    socket: UnixDatagram,
    path: PathBuf,
}

impl CommandChannel {
    /// Bind the command socket. Failure here is fatal for the daemon; there
    /// is no degraded mode without a command channel.
    pub fn bind(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            // Stale socket from a previous run.
            std::fs::remove_file(path)
                .with_context(|| format!("Cannot remove stale socket {}", path.display()))?;
        }
        let socket = UnixDatagram::bind(path)
            .with_context(|| format!("Cannot bind command socket {}", path.display()))?;
        log::debug!("Command socket bound at {}", path.display());
        Ok(CommandChannel {
            socket,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Receive one pending message, waiting at most [`POLL_TIMEOUT`].
    /// Absence of a message is not an error.
    pub async fn poll(&self) -> Option<String> {
        let mut buf = [0u8; MAX_COMMAND_LEN];
        match tokio::time::timeout(POLL_TIMEOUT, self.socket.recv(&mut buf)).await {
            Err(_) => None,
            Ok(Err(error)) => {
                log::warn!("Receiving from the command socket failed: {error}");
                None
            }
            Ok(Ok(len)) => match std::str::from_utf8(&buf[..len]) {
                Ok(text) => Some(text.trim().to_string()),
                Err(_) => {
                    log::error!("Ignoring non-UTF-8 command message");
                    None
                }
            },
        }
    }
}

impl Drop for CommandChannel {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Client side: deliver one command message to a daemon listening at `path`.
pub async fn send_command(path: &Path, message: &str) -> anyhow::Result<()> {
    let socket = UnixDatagram::unbound().context("Cannot create socket")?;
    socket
        .send_to(message.as_bytes(), path)
        .await
        .with_context(|| format!("Cannot reach a daemon at {}", path.display()))?;
    Ok(())
}
