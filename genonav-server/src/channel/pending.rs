//! Pending navigation commands awaiting acknowledgement
//!
//! The connection reader resolves acknowledgements while the query worker
//! registers new commands, so entries live in a concurrent map keyed by
//! correlation id.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use genonav_protocol::{CorrelationId, GenomicLocation, NavigationAck, NavigationCommand};
use tokio::sync::oneshot;
use tracing::{debug, trace};

/// Lifecycle state of an outbound command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandState {
    Pending,
    Acknowledged,
    TimedOut,
}

/// What a waiter learns about its command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResolution {
    Acknowledged {
        status: String,
        message: Option<String>,
    },
    TimedOut,
    /// The connection closed first
    Cancelled,
}

/// A command that has been sent and not yet purged
#[derive(Debug)]
pub struct PendingCommand {
    pub correlation_id: CorrelationId,
    pub location: GenomicLocation,
    pub issued_at: DateTime<Utc>,
    pub state: CommandState,
    waiter: Option<oneshot::Sender<CommandResolution>>,
}

impl PendingCommand {
    fn release(&mut self, resolution: CommandResolution) {
        if let Some(waiter) = self.waiter.take() {
            // Receiver gone just means nobody is waiting
            let _ = waiter.send(resolution);
        }
    }
}

/// Registry of in-flight commands for one connection
#[derive(Debug, Default)]
pub struct PendingRegistry {
    commands: DashMap<CorrelationId, PendingCommand>,
    closed: AtomicBool,
}

impl PendingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a command before it is transmitted
    ///
    /// The receiver resolves once the command is acknowledged, expires or is
    /// cancelled. Dropping it is fine when nobody needs to wait. Returns
    /// `None` once the registry is closed.
    pub fn register(
        &self,
        command: &NavigationCommand,
    ) -> Option<oneshot::Receiver<CommandResolution>> {
        if self.is_closed() {
            return None;
        }

        let (tx, rx) = oneshot::channel();
        self.commands.insert(
            command.correlation_id,
            PendingCommand {
                correlation_id: command.correlation_id,
                location: command.payload.clone(),
                issued_at: command.timestamp,
                state: CommandState::Pending,
                waiter: Some(tx),
            },
        );

        // close() may have drained the map between the check and the insert
        if self.is_closed() {
            self.commands.remove(&command.correlation_id);
            return None;
        }

        trace!(correlation_id = %command.correlation_id, "Command registered");
        Some(rx)
    }

    /// Resolve a pending command from a client acknowledgement
    ///
    /// Returns `false` when the id matches nothing still pending; such
    /// acknowledgements have no effect.
    pub fn acknowledge(&self, ack: &NavigationAck) -> bool {
        let Some(id) = CorrelationId::parse(&ack.correlation_id) else {
            debug!(raw_id = %ack.correlation_id, "Acknowledgement with unparseable id ignored");
            return false;
        };

        let Some(mut entry) = self.commands.get_mut(&id) else {
            debug!(correlation_id = %id, "Acknowledgement for unknown command ignored");
            return false;
        };

        if entry.state != CommandState::Pending {
            return false;
        }

        entry.state = CommandState::Acknowledged;
        entry.release(CommandResolution::Acknowledged {
            status: ack.status.clone(),
            message: ack.message.clone(),
        });
        true
    }

    /// Purge a command whose acknowledgement window has closed
    ///
    /// Returns `true` if it was still pending, i.e. it timed out.
    pub fn expire(&self, id: &CorrelationId) -> bool {
        let Some((_, mut command)) = self.commands.remove(id) else {
            return false;
        };

        if command.state != CommandState::Pending {
            return false;
        }

        command.state = CommandState::TimedOut;
        command.release(CommandResolution::TimedOut);
        true
    }

    /// Drop every command, releasing waiters with a cancellation
    ///
    /// Returns how many commands were still pending.
    pub fn cancel_all(&self) -> usize {
        let ids: Vec<CorrelationId> = self.commands.iter().map(|entry| *entry.key()).collect();
        let mut cancelled = 0;
        for id in ids {
            if let Some((_, mut command)) = self.commands.remove(&id) {
                if command.state == CommandState::Pending {
                    command.state = CommandState::TimedOut;
                    command.release(CommandResolution::Cancelled);
                    cancelled += 1;
                }
            }
        }
        cancelled
    }

    /// Refuse new commands and cancel everything still pending
    ///
    /// Returns how many commands were still pending.
    pub fn close(&self) -> usize {
        self.closed.store(true, Ordering::SeqCst);
        self.cancel_all()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn state(&self, id: &CorrelationId) -> Option<CommandState> {
        self.commands.get(id).map(|entry| entry.state)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
