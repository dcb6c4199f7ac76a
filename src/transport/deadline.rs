//! Transport read adapter with an optional per-read deadline.

use std::io;
use std::time::{Duration, Instant};

use super::Transport;

/// Wraps a [`Transport`] and bounds every read by a fresh deadline.
///
/// With a timeout configured, each call to [`read`](Self::read) first sets
/// the deadline to `now + timeout`, so a slow stream is judged per read, not
/// per frame. Expiry surfaces as the transport's own timeout error.
#[derive(Debug)]
pub struct DeadlineReader<T> {
    inner: T,
    timeout: Option<Duration>,
}

impl<T: Transport> DeadlineReader<T> {
    /// Create a reader with no deadline.
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            timeout: None,
        }
    }

    /// Create a reader with the given per-read timeout. `None` or a zero
    /// duration disables the deadline.
    pub fn with_timeout(inner: T, timeout: Option<Duration>) -> Self {
        let mut reader = Self::new(inner);
        reader.set_timeout(timeout);
        reader
    }

    /// Perform one bounded read.
    pub fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if let Some(timeout) = self.timeout {
            self.inner.set_read_deadline(Some(Instant::now() + timeout))?;
        }
        self.inner.read(out)
    }

    /// Change the per-read timeout.
    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout.filter(|t| !t.is_zero());
    }

    /// Current per-read timeout.
    #[inline]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Get a reference to the underlying transport.
    #[inline]
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Get a mutable reference to the underlying transport.
    #[inline]
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Unwrap the underlying transport.
    pub fn into_inner(self) -> T {
        self.inner
    }
}
