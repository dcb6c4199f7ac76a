//! Transport module - the duplex byte stream a buffer reads from.
//!
//! Provides:
//! - The [`Transport`] trait: a blocking `Read` plus a per-read deadline
//! - [`DeadlineReader`]: applies a fresh deadline before every read
//! - Implementations for TCP and Unix domain sockets
//! - [`ScriptedTransport`]: an in-memory stream replaying a fixed script

mod deadline;
mod scripted;
mod socket;

use std::io::{self, Read};
use std::time::Instant;

pub use deadline::DeadlineReader;
pub use scripted::ScriptedTransport;

/// A blocking duplex stream the buffer can read from.
///
/// `read` follows the `std::io::Read` contract: it may return fewer bytes
/// than requested, and returns `Ok(0)` only at end-of-stream.
pub trait Transport: Read {
    /// Set or clear the deadline for subsequent reads.
    ///
    /// A read still pending when the deadline passes fails with a timeout
    /// error (`TimedOut` or `WouldBlock`, depending on the platform).
    fn set_read_deadline(&mut self, deadline: Option<Instant>) -> io::Result<()>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn set_read_deadline(&mut self, deadline: Option<Instant>) -> io::Result<()> {
        (**self).set_read_deadline(deadline)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn set_read_deadline(&mut self, deadline: Option<Instant>) -> io::Result<()> {
        (**self).set_read_deadline(deadline)
    }
}
