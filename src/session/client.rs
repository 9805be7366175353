//! TCP client for the OpenVPN management interface.

use super::SessionTerminator;
use super::types::{SessionState, TerminateOutcome};
use crate::error::{Result, VpnBlockError};
use std::io::{self, BufRead, BufReader, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

/// Prefix of the greeting the server sends on connect.
const BANNER_PREFIX: &str = ">INFO:OpenVPN Management";

/// Management interface endpoint plus the deadline for one conversation.
#[derive(Debug, Clone)]
pub struct ManagementClient {
    host: String,
    port: u16,
    timeout: Duration,
}

impl ManagementClient {
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            timeout,
        }
    }

    /// `host:port` for messages.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn kill(&self, identity: &str) -> Result<TerminateOutcome> {
        let mut session = Session::new(self.address(), self.timeout);

        let stream = session.connect(&self.host, self.port)?;
        let mut writer = stream
            .try_clone()
            .map_err(|e| session.fail_io("clone socket", e))?;
        let mut reader = BufReader::new(stream);

        session.transition(SessionState::AwaitingBanner);
        loop {
            let line = session.read_line(&mut reader, "banner")?;
            if line.starts_with(BANNER_PREFIX) {
                break;
            }
            log::debug!("management: skipping pre-banner line {:?}", line);
        }

        session.transition(SessionState::SendingCommand);
        session.send(&mut writer, &format!("kill {}\n", identity))?;

        session.transition(SessionState::AwaitingAck);
        let outcome = loop {
            let line = session.read_line(&mut reader, "kill acknowledgement")?;

            if let Some(message) = line.strip_prefix("SUCCESS:") {
                break TerminateOutcome::Terminated(message.trim().to_string());
            }
            if let Some(message) = line.strip_prefix("ERROR:") {
                let message = message.trim();
                if message.contains("not found") {
                    break TerminateOutcome::NotConnected(message.to_string());
                }
                return Err(session.fail(format!("server rejected kill: {}", message)));
            }
            // Real-time notifications (">LOG:", ">CLIENT:", ...) can arrive at any time.
            log::debug!("management: ignoring {:?}", line);
        };

        if let Err(e) = writer.write_all(b"quit\n") {
            log::debug!("management: quit not delivered: {}", e);
        }
        session.transition(SessionState::Done);

        Ok(outcome)
    }
}

impl SessionTerminator for ManagementClient {
    fn terminate(&self, identity: &str) -> Result<TerminateOutcome> {
        if identity.is_empty()
            || identity.contains(|c: char| c.is_whitespace() || c.is_control())
        {
            return Err(VpnBlockError::ValidationError(format!(
                "{:?} cannot be sent as a management command argument",
                identity
            )));
        }
        self.kill(identity)
    }
}

/// One conversation: current state plus the shared deadline.
#[derive(Debug)]
pub(super) struct Session {
    address: String,
    state: SessionState,
    deadline: Instant,
}

impl Session {
    pub(super) fn new(address: String, timeout: Duration) -> Self {
        Self {
            address,
            state: SessionState::Connecting,
            deadline: Instant::now() + timeout,
        }
    }

    #[cfg(test)]
    pub(super) fn state(&self) -> SessionState {
        self.state
    }

    pub(super) fn transition(&mut self, next: SessionState) {
        debug_assert!(!self.state.is_terminal(), "transition out of {}", self.state);
        log::debug!("management {}: {} -> {}", self.address, self.state, next);
        self.state = next;
    }

    /// Move to `Failed` and build the error to return.
    pub(super) fn fail(&mut self, reason: String) -> VpnBlockError {
        let during = self.state;
        self.transition(SessionState::Failed);
        VpnBlockError::SessionError(format!("{} ({}): {}", self.address, during, reason))
    }

    fn fail_io(&mut self, action: &str, e: io::Error) -> VpnBlockError {
        if is_timeout(&e) {
            self.fail(format!("timed out while trying to {}", action))
        } else {
            self.fail(format!("failed to {}: {}", action, e))
        }
    }

    /// Time left before the deadline, or a failure if it has passed.
    fn remaining(&mut self, action: &str) -> Result<Duration> {
        let left = self.deadline.saturating_duration_since(Instant::now());
        if left.is_zero() {
            return Err(self.fail(format!("timed out while trying to {}", action)));
        }
        Ok(left)
    }

    fn connect(&mut self, host: &str, port: u16) -> Result<TcpStream> {
        let addrs: Vec<_> = (host, port)
            .to_socket_addrs()
            .map_err(|e| self.fail_io("resolve address", e))?
            .collect();

        let mut last_error = None;
        for addr in addrs {
            let left = self.remaining("connect")?;
            match TcpStream::connect_timeout(&addr, left) {
                Ok(stream) => return Ok(stream),
                Err(e) => last_error = Some(e),
            }
        }

        Err(match last_error {
            Some(e) => self.fail_io("connect", e),
            None => self.fail("address resolved to nothing".to_string()),
        })
    }

    /// Read one line with the terminator stripped. EOF is a failure.
    fn read_line(
        &mut self,
        reader: &mut BufReader<TcpStream>,
        waiting_for: &str,
    ) -> Result<String> {
        let action = format!("read {}", waiting_for);
        let left = self.remaining(&action)?;
        reader
            .get_ref()
            .set_read_timeout(Some(left))
            .map_err(|e| self.fail_io("set read timeout", e))?;

        let mut buf = Vec::new();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|e| self.fail_io(&action, e))?;
        if read == 0 {
            return Err(self.fail(format!(
                "connection closed while waiting for {}",
                waiting_for
            )));
        }

        let line = String::from_utf8_lossy(&buf);
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn send(&mut self, stream: &mut TcpStream, command: &str) -> Result<()> {
        let left = self.remaining("send command")?;
        stream
            .set_write_timeout(Some(left))
            .and_then(|()| stream.write_all(command.as_bytes()))
            .and_then(|()| stream.flush())
            .map_err(|e| self.fail_io("send command", e))
    }
}

fn is_timeout(e: &io::Error) -> bool {
    matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut)
}
