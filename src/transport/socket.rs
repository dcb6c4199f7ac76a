//! Socket transports.
//!
//! Std sockets only know relative read timeouts, so the absolute deadline is
//! converted on every call.

use std::io;
use std::net::TcpStream;
use std::time::{Duration, Instant};

use super::Transport;

/// Time left until `deadline`, or a `TimedOut` error if it already passed.
///
/// Std sockets reject a zero timeout, so an elapsed deadline never reaches them.
fn remaining(deadline: Instant) -> io::Result<Duration> {
    let left = deadline.saturating_duration_since(Instant::now());
    if left.is_zero() {
        return Err(io::Error::new(
            io::ErrorKind::TimedOut,
            "read deadline already elapsed",
        ));
    }
    Ok(left)
}

impl Transport for TcpStream {
    fn set_read_deadline(&mut self, deadline: Option<Instant>) -> io::Result<()> {
        match deadline {
            Some(at) => self.set_read_timeout(Some(remaining(at)?)),
            None => self.set_read_timeout(None),
        }
    }
}

/// Lets one socket serve as both the buffer's read side and the caller's
/// write side, since `&TcpStream` implements `Read` and `Write`.
impl Transport for &TcpStream {
    fn set_read_deadline(&mut self, deadline: Option<Instant>) -> io::Result<()> {
        match deadline {
            Some(at) => self.set_read_timeout(Some(remaining(at)?)),
            None => self.set_read_timeout(None),
        }
    }
}

#[cfg(unix)]
impl Transport for std::os::unix::net::UnixStream {
    fn set_read_deadline(&mut self, deadline: Option<Instant>) -> io::Result<()> {
        match deadline {
            Some(at) => self.set_read_timeout(Some(remaining(at)?)),
            None => self.set_read_timeout(None),
        }
    }
}
