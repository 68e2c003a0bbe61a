//! Request dispatch for the daemon.
//!
//! Each inbound bus message is decoded into a [`Request`], looked up as a
//! [`Command`], routed to its handler and answered with exactly one
//! [`Envelope`] on the [`REPLY_TOPIC`]. Failures at any stage become ERROR
//! envelopes; the loop itself never stops.

mod dispatcher;
mod envelope;
mod errors;
mod request;
mod router;

pub use self::dispatcher::{CycleOutcome, Dispatcher, REPLY_TOPIC};
pub use self::envelope::{Envelope, SENTINEL_UUID, Status, build_envelope};
pub use self::errors::{DispatchError, ErrorCategory};
pub use self::request::Request;
pub use self::router::{Command, CommandRouter};
