//! The mailbox dispatch loop.
//!
//! One iteration: scan the mailbox for the single pending command file,
//! parse its stem, dispatch the resolved operation against the harness
//! context, write the `good`/`bad` sentinel, and delete the consumed
//! file. The loop stops on a `quit` command or on a fatal condition
//! (single-slot violation, mailbox I/O failure). A drop guard deletes
//! the command file on every exit path from dispatch, so a failing
//! operation can never leave a stale command behind to be re-detected.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use wirecheck_core::command;
use wirecheck_core::error::HarnessError;

use crate::harness::connection::{Connection, PortStatus};
use crate::harness::context::HarnessContext;
use crate::harness::journal::Event;
use crate::harness::mailbox::{Mailbox, QUIT_COMMAND};
use crate::harness::registry::{Operation, Registry};

/// Bounded wait between empty mailbox scans. Short enough to stay
/// responsive to the driver, long enough not to peg a core.
pub const IDLE_WAIT: Duration = Duration::from_millis(20);

/// Commands whose message payload lives in the file body rather than
/// the filename.
const BODY_COMMANDS: &[&str] = &["send", "read"];

/// The top-level harness state machine.
pub struct MailboxLoop {
    mailbox: Mailbox,
    registry: Registry,
    ctx: HarnessContext,
    idle_wait: Duration,
}

impl MailboxLoop {
    pub fn new(mailbox: Mailbox, registry: Registry, ctx: HarnessContext) -> Self {
        Self {
            mailbox,
            registry,
            ctx,
            idle_wait: IDLE_WAIT,
        }
    }

    pub fn with_idle_wait(mut self, idle_wait: Duration) -> Self {
        self.idle_wait = idle_wait;
        self
    }

    /// Run until a `quit` command or a fatal condition.
    ///
    /// Returns `Err` only for conditions the driver cannot recover from
    /// by reading a sentinel: the single-slot invariant violation and
    /// mailbox I/O failures. Every other failure is reported as a `bad`
    /// sentinel and the loop continues.
    pub async fn run(&mut self) -> Result<(), HarnessError> {
        info!(dir = %self.mailbox.dir().display(), "mailbox loop started");

        loop {
            let Some(pending) = self.mailbox.scan()? else {
                sleep(self.idle_wait).await;
                continue;
            };

            if pending.stem() == QUIT_COMMAND {
                drop(pending.into_guard());
                info!("quit command received, stopping");
                return Ok(());
            }

            let cmd = command::parse(pending.stem());
            debug!(command = %cmd.name, args = ?cmd.args, "command found");

            // For send/read the payload rides in the file body; the
            // filename carries only the routing metadata.
            let body = if BODY_COMMANDS.contains(&cmd.name.as_str()) {
                match pending.read_body() {
                    Ok(body) => Some(body),
                    Err(e) => {
                        warn!(command = %cmd.name, "failed to read command body: {e}");
                        let _guard = pending.into_guard();
                        self.mailbox.write_sentinel(false)?;
                        continue;
                    }
                }
            } else {
                None
            };

            let mut args = cmd.args;
            args.extend(body);

            // Cleanup is owed from here on no matter how dispatch ends.
            let _guard = pending.into_guard();

            let passed = match self.dispatch(&cmd.name, &args).await {
                Ok(passed) => passed,
                Err(e) => {
                    warn!(command = %cmd.name, "command failed: {e}");
                    false
                }
            };

            self.ctx.journal().record(Event::Dispatched {
                command: &cmd.name,
                passed,
            });
            debug!(command = %cmd.name, passed, "command dispatched");
            self.mailbox.write_sentinel(passed)?;
        }
    }

    /// Resolve and invoke one operation against the harness context.
    async fn dispatch(&mut self, name: &str, args: &[String]) -> Result<bool, HarnessError> {
        let Some(op) = self.registry.resolve(name) else {
            return Err(HarnessError::UnresolvedCommand(name.to_string()));
        };

        match op {
            Operation::Predicate(predicate) => Ok(predicate(args)),
            Operation::Connect => {
                let port = port_arg(args)?;
                Ok(self.ctx.connect(port).await)
            }
            Operation::Disconnect => Ok(self.ctx.disconnect()),
            Operation::VerifyOpen => {
                let port = port_arg(args)?;
                Ok(Connection::probe(port).await == PortStatus::Open)
            }
            Operation::VerifyClose => {
                let port = port_arg(args)?;
                Ok(Connection::probe(port).await == PortStatus::Closed)
            }
            Operation::Send => {
                let (id, payload) = id_and_payload_args(args)?;
                self.ctx.send(payload, id).await?;
                Ok(true)
            }
            Operation::Read => {
                let (id, expected) = id_and_payload_args(args)?;
                self.ctx.verify_next(expected, id).await
            }
        }
    }
}

fn port_arg(args: &[String]) -> Result<u16, HarnessError> {
    let raw = args
        .first()
        .ok_or_else(|| HarnessError::InvalidArguments("expected a port argument".into()))?;
    raw.parse()
        .map_err(|_| HarnessError::InvalidArguments(format!("'{raw}' is not a valid port")))
}

fn id_and_payload_args(args: &[String]) -> Result<(&str, &str), HarnessError> {
    match args {
        [id, payload] => Ok((id.as_str(), payload.as_str())),
        _ => Err(HarnessError::InvalidArguments(format!(
            "expected an id and a message payload, got {} arguments",
            args.len()
        ))),
    }
}
