//! Owner of the harness's at-most-one connection.
//!
//! The connection handle is deliberately not process-global: the context
//! owns `Option<Connection>` and every networked operation goes through
//! it, so the absent/open/closed lifecycle is checked in exactly one
//! place.

use tracing::{debug, info, warn};

use wirecheck_core::error::HarnessError;

use crate::harness::connection::Connection;
use crate::harness::journal::{hex, Event, Journal};

/// Mutable state shared by the registered test operations.
pub struct HarnessContext {
    connection: Option<Connection>,
    journal: Journal,
}

impl HarnessContext {
    pub fn new(journal: Journal) -> Self {
        Self {
            connection: None,
            journal,
        }
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Open the persistent connection to loopback `port`, replacing any
    /// previous one. Returns whether the connection is now open; on
    /// failure nothing is stored.
    pub async fn connect(&mut self, port: u16) -> bool {
        if self.connection.is_some() {
            debug!("replacing existing connection");
        }
        match Connection::open(port).await {
            Ok(conn) => {
                info!(port, "connected");
                self.journal.record(Event::Connected { port });
                self.connection = Some(conn);
                true
            }
            Err(e) => {
                warn!(port, "connect failed: {e}");
                self.journal.record(Event::ConnectFailed {
                    port,
                    reason: e.to_string(),
                });
                self.connection = None;
                false
            }
        }
    }

    /// Close and clear the current connection. Idempotent: disconnecting
    /// when nothing is open logs and succeeds.
    pub fn disconnect(&mut self) -> bool {
        match self.connection.take() {
            Some(conn) => {
                info!(port = conn.port(), "disconnected");
                self.journal.record(Event::Disconnected);
            }
            None => debug!("disconnect with no open connection"),
        }
        true
    }

    /// Encode and transmit one packet on the current connection.
    pub async fn send(&mut self, payload: &str, id: &str) -> Result<(), HarnessError> {
        let conn = self.connection.as_mut().ok_or(HarnessError::NotConnected)?;
        let wire = conn.send(payload, id).await?;
        self.journal.record(Event::Sent {
            id,
            payload,
            raw: hex(&wire),
        });
        Ok(())
    }

    /// Receive one reassembled packet and compare both fields against
    /// expectations. True only on exact match of payload and identifier.
    pub async fn verify_next(
        &mut self,
        expected_payload: &str,
        expected_id: &str,
    ) -> Result<bool, HarnessError> {
        let conn = self.connection.as_mut().ok_or(HarnessError::NotConnected)?;
        match conn.receive().await {
            Ok((packet, raw)) => {
                self.journal.record(Event::Received {
                    id: &packet.id,
                    payload: &packet.payload,
                    raw: hex(&raw),
                });
                Ok(packet.payload == expected_payload && packet.id == expected_id)
            }
            Err(e) => {
                self.journal.record(Event::ReceiveFailed {
                    reason: e.to_string(),
                });
                if matches!(e, HarnessError::PeerClosed) {
                    // The stream is dead; drop the handle so later
                    // commands see NotConnected instead of a zombie.
                    self.connection = None;
                }
                Err(e)
            }
        }
    }
}
