//! Write-side checkouts.
//!
//! Outgoing frames are built in the same storage incoming frames are read
//! into. That is only sound once every incoming byte has been consumed, so
//! each checkout fails with [`BufferError::BusyBuffer`] while unread data is
//! pending.

use super::{PacketBuffer, ReadState, DEFAULT_BUF_SIZE};
use crate::error::{BufferError, Result};
use crate::transport::Transport;

impl<T: Transport> PacketBuffer<T> {
    /// Check the buffer is idle and point it back at the large region.
    fn begin_checkout(&mut self) -> Result<()> {
        if self.state.unread > 0 {
            return Err(BufferError::BusyBuffer);
        }
        self.state = ReadState::new();
        self.spill = Vec::new();
        Ok(())
    }

    /// Borrow exactly `length` bytes for building an outgoing frame.
    ///
    /// Served from the large region when it is big enough. Otherwise a
    /// new region of exactly `length` bytes is allocated: below the packet
    /// size cap it replaces the large region for later reuse, at or above it
    /// it is used once and dropped.
    pub fn take_buffer(&mut self, length: usize) -> Result<&mut [u8]> {
        self.begin_checkout()?;

        if length <= self.large.len() {
            return Ok(&mut self.large[..length]);
        }

        if length < self.max_packet_size {
            tracing::debug!(from = self.large.len(), to = length, "growing large buffer for write");
            self.large = vec![0u8; length];
            return Ok(&mut self.large[..]);
        }

        tracing::debug!(length, max = self.max_packet_size, "oversized write uses one-off buffer");
        self.spill = vec![0u8; length];
        Ok(&mut self.spill[..])
    }

    /// Borrow `length` bytes where `length` is known to be at most
    /// [`DEFAULT_BUF_SIZE`]. Skips the size checks of
    /// [`take_buffer`](Self::take_buffer).
    pub fn take_small_buffer(&mut self, length: usize) -> Result<&mut [u8]> {
        debug_assert!(length <= DEFAULT_BUF_SIZE);
        if length > self.large.len() {
            return self.take_buffer(length);
        }
        self.begin_checkout()?;
        Ok(&mut self.large[..length])
    }

    /// Borrow the whole large region, for frames whose size is only known
    /// once they are written.
    pub fn take_complete_buffer(&mut self) -> Result<&mut [u8]> {
        self.begin_checkout()?;
        Ok(&mut self.large[..])
    }

    /// Offer a buffer used for an outgoing frame back for reuse.
    ///
    /// It becomes the new large region if its capacity is larger than the
    /// current one and within the packet size cap; otherwise it is dropped.
    pub fn store(&mut self, mut buf: Vec<u8>) -> Result<()> {
        if self.state.unread > 0 {
            return Err(BufferError::BusyBuffer);
        }

        let capacity = buf.capacity();
        if capacity > self.large.len() && capacity <= self.max_packet_size {
            tracing::debug!(from = self.large.len(), to = capacity, "adopting stored buffer");
            buf.resize(capacity, 0);
            self.large = buf;
            self.state = ReadState::new();
        } else {
            tracing::trace!(capacity, current = self.large.len(), "stored buffer not adopted");
        }
        Ok(())
    }
}
