//! The receive, decode, dispatch and respond loop.

use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::bus::MessageBus;
use crate::driver::HardwareDriver;

use super::envelope::{Envelope, SENTINEL_UUID};
use super::errors::DispatchError;
use super::request::Request;
use super::router::{Command, CommandRouter, DISPATCH_TARGET};

/// Topic every response is published on.
pub const REPLY_TOPIC: &str = "REPLY";

/// What happened during one pass of the loop.
#[derive(Debug)]
pub enum CycleOutcome {
    /// The bus was unhealthy or the receive failed; the loop backed off.
    Disconnected,
    /// A control frame arrived and was discarded.
    Ignored,
    /// The request failed before reaching a handler.
    Rejected(DispatchError),
    /// A handler ran and its envelope was published.
    Dispatched {
        /// Command that ran.
        command: Command,
        /// Whether the handler reported success.
        ok: bool,
    },
}

/// Drives requests from the bus through the command router.
#[derive(Debug)]
pub struct Dispatcher<B, D> {
    bus: B,
    router: CommandRouter<D>,
    backoff: Duration,
}

impl<B: MessageBus, D: HardwareDriver> Dispatcher<B, D> {
    /// Creates a dispatcher that sleeps for `backoff` while the bus is down.
    pub fn new(bus: B, router: CommandRouter<D>, backoff: Duration) -> Self {
        Self {
            bus,
            router,
            backoff,
        }
    }

    /// The bus session.
    pub const fn bus(&self) -> &B {
        &self.bus
    }

    /// The command router.
    pub const fn router(&self) -> &CommandRouter<D> {
        &self.router
    }

    /// Processes messages forever.
    pub fn run(&mut self) -> ! {
        info!(target: DISPATCH_TARGET, "dispatch loop started");
        loop {
            let outcome = self.run_cycle();
            debug!(target: DISPATCH_TARGET, ?outcome, "cycle complete");
        }
    }

    /// Waits for one bus frame and handles it.
    pub fn run_cycle(&mut self) -> CycleOutcome {
        let Some(message) = self.bus.wait_for_message() else {
            warn!(
                target: DISPATCH_TARGET,
                backoff_ms = self.backoff.as_millis(),
                "no message received; bus unavailable"
            );
            thread::sleep(self.backoff);
            return CycleOutcome::Disconnected;
        };
        if !message.is_data() {
            debug!(target: DISPATCH_TARGET, kind = ?message.kind, "ignoring control frame");
            return CycleOutcome::Ignored;
        }

        let (request, command) = match Self::prepare(&message.payload) {
            Ok(prepared) => prepared,
            Err(error) => {
                warn!(
                    target: DISPATCH_TARGET,
                    category = error.category().as_str(),
                    error = %error,
                    detail = ?error,
                    "request rejected"
                );
                self.respond(&Envelope::error(SENTINEL_UUID, error.to_string()));
                return CycleOutcome::Rejected(error);
            }
        };

        let envelope = self.router.route(command, &request.uuid, request.data);
        let ok = envelope.is_ok();
        self.respond(&envelope);
        CycleOutcome::Dispatched { command, ok }
    }

    fn prepare(payload: &[u8]) -> Result<(Request, Command), DispatchError> {
        let request = Request::parse(payload)?;
        let command = Command::parse(&request.command)?;
        Ok((request, command))
    }

    fn respond(&mut self, envelope: &Envelope) {
        self.bus.publish(REPLY_TOPIC, &envelope.encode());
    }
}
