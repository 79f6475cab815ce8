//! A single non-blocking loopback connection with readiness-polled I/O.
//!
//! Reads never block indefinitely: each attempt waits for readability
//! with a fixed timeout, then takes whatever bytes are available, capped
//! to the bytes the current packet still owes. Reassembly of one packet
//! from an unbounded number of partial reads lives here; the framing
//! arithmetic itself is `wirecheck_core::packet`.

use std::io;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use wirecheck_core::error::HarnessError;
use wirecheck_core::packet::{self, Packet, HEADER_LEN, LEN_FIELD};

/// Readiness-poll timeout per attempt during send and receive.
pub const POLL_TIMEOUT: Duration = Duration::from_secs(10);

/// Bounded wait for connection attempts, probe and persistent alike.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome of a reachability probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortStatus {
    Open,
    Closed,
}

/// One open connection to the system under test.
pub struct Connection {
    stream: TcpStream,
    port: u16,
    poll_timeout: Duration,
}

impl Connection {
    /// Probe loopback `port` with a short-lived TCP connect.
    ///
    /// This is a real handshake, not a passive scan; the connection is
    /// closed again regardless of outcome.
    pub async fn probe(port: u16) -> PortStatus {
        match timeout(CONNECT_TIMEOUT, TcpStream::connect(("127.0.0.1", port))).await {
            Ok(Ok(_stream)) => {
                debug!(port, "probe connected");
                PortStatus::Open
            }
            Ok(Err(e)) => {
                debug!(port, "probe refused: {e}");
                PortStatus::Closed
            }
            Err(_) => {
                debug!(port, "probe timed out");
                PortStatus::Closed
            }
        }
    }

    /// Open the persistent connection to loopback `port`.
    ///
    /// Tokio streams are non-blocking by construction; all subsequent
    /// reads go through the readiness-polled path below.
    pub async fn open(port: u16) -> Result<Self, HarnessError> {
        let stream = timeout(CONNECT_TIMEOUT, TcpStream::connect(("127.0.0.1", port)))
            .await
            .map_err(|_| HarnessError::Timeout(CONNECT_TIMEOUT))??;
        debug!(port, "connection opened");
        Ok(Self {
            stream,
            port,
            poll_timeout: POLL_TIMEOUT,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    #[cfg(test)]
    fn with_poll_timeout(mut self, poll_timeout: Duration) -> Self {
        self.poll_timeout = poll_timeout;
        self
    }

    /// Encode and write one full packet, returning the wire bytes for
    /// diagnostic recording.
    pub async fn send(&mut self, payload: &str, id: &str) -> Result<Vec<u8>, HarnessError> {
        let wire = packet::encode(payload.as_bytes(), id)?;
        timeout(self.poll_timeout, self.stream.write_all(&wire))
            .await
            .map_err(|_| HarnessError::Timeout(self.poll_timeout))??;
        debug!(id, bytes = wire.len(), "packet sent");
        Ok(wire)
    }

    /// Receive one packet, reassembling it from partial reads.
    ///
    /// Header phase first: accumulate the 3-byte length prefix, decode
    /// the declared payload length, then keep reading until the full
    /// `header + payload` is in hand. Returns the decoded packet along
    /// with its raw wire bytes.
    pub async fn receive(&mut self) -> Result<(Packet, Vec<u8>), HarnessError> {
        let mut buf: Vec<u8> = Vec::with_capacity(HEADER_LEN);

        self.fill_to(LEN_FIELD, &mut buf).await?;
        let declared = packet::decode_length([0, buf[0], buf[1], buf[2]]) as usize;
        let total = HEADER_LEN + declared;

        self.fill_to(total, &mut buf).await?;

        let packet = packet::decode(&buf)?;
        debug!(id = %packet.id, bytes = buf.len(), "packet received");
        Ok((packet, buf))
    }

    /// Poll-and-read until `buf` holds at least `target` bytes.
    ///
    /// Each read is capped to the bytes still owed, so bytes belonging
    /// to a subsequent packet are never consumed.
    async fn fill_to(&mut self, target: usize, buf: &mut Vec<u8>) -> Result<(), HarnessError> {
        while buf.len() < target {
            timeout(self.poll_timeout, self.stream.readable())
                .await
                .map_err(|_| HarnessError::Timeout(self.poll_timeout))??;

            let mut chunk = vec![0u8; target - buf.len()];
            match self.stream.try_read(&mut chunk) {
                // Readable plus a zero-byte read means the peer hung up.
                Ok(0) => return Err(HarnessError::PeerClosed),
                Ok(n) => buf.extend_from_slice(&chunk[..n]),
                // Readiness can be spurious; poll again.
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}
