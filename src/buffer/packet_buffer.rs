//! The per-connection packet buffer.
//!
//! # Example
//!
//! ```
//! use packetwire::{FillMode, PacketBuffer};
//! use packetwire::transport::ScriptedTransport;
//!
//! // A 4-byte length-prefixed frame arriving in two pieces.
//! let transport = ScriptedTransport::new().chunk(&[5, 0, 0, 0, b'h']).chunk(b"ello");
//! let mut buffer = PacketBuffer::new(transport);
//!
//! let header = buffer.read_next(4, FillMode::Large).unwrap();
//! let len = u32::from_le_bytes(header.try_into().unwrap()) as usize;
//! assert_eq!(buffer.read_next(len, FillMode::Large).unwrap(), b"hello");
//!
//! // Fully consumed: the same storage now builds the reply.
//! let out = buffer.take_buffer(3).unwrap();
//! out.copy_from_slice(b"ack");
//! ```

use std::fmt;
use std::time::Duration;

use bytes::Bytes;

use super::fill::{fill_large, read_until, skip_stream};
use super::retained::LargeReader;
use super::{grow_to, FillMode, ReadState, Region, DEFAULT_BUF_SIZE, TINY_BUFFER_SIZE};
use crate::config::BufferConfig;
use crate::error::Result;
use crate::transport::{DeadlineReader, Transport};

/// Which safe-side region a safe fill landed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SafeSide {
    Safe,
    Spill,
}

/// Reusable read/write buffer for one connection.
///
/// Views returned by the read and checkout methods borrow the buffer, so the
/// compiler rejects any further call on it until the view is dropped. Copy
/// out what has to live longer, or use [`read_retained`](Self::read_retained).
///
/// # Concurrency
///
/// There is no internal locking. The protocol is strictly request/response,
/// so a connection is never read and written at once; callers sharing a
/// buffer across threads must serialize access themselves.
pub struct PacketBuffer<T> {
    /// Transport with the per-read deadline applied.
    pub(super) conn: DeadlineReader<T>,
    /// Reusable storage; grows and keeps its size.
    pub(super) large: Vec<u8>,
    /// Fixed storage for views that must survive a large refill.
    pub(super) safe: Vec<u8>,
    /// One-off storage, empty when unused.
    pub(super) spill: Vec<u8>,
    pub(super) state: ReadState,
    /// Reuse cap for checkout buffers.
    pub(super) max_packet_size: usize,
}

impl<T: Transport> PacketBuffer<T> {
    /// Create a buffer over `conn` with default settings.
    pub fn new(conn: T) -> Self {
        Self::with_config(conn, BufferConfig::default())
    }

    /// Create a buffer over `conn` with the given configuration.
    pub fn with_config(conn: T, config: BufferConfig) -> Self {
        Self {
            conn: DeadlineReader::with_timeout(conn, config.read_timeout()),
            large: vec![0u8; DEFAULT_BUF_SIZE],
            safe: vec![0u8; TINY_BUFFER_SIZE],
            spill: Vec::new(),
            state: ReadState::new(),
            max_packet_size: config.max_packet_size,
        }
    }

    /// Make at least `need` unread bytes available, reading from the
    /// transport as required.
    ///
    /// Unread bytes are moved to the front of the target region first. With
    /// [`FillMode::Large`] the large region grows to fit `need` and keeps
    /// that size. With [`FillMode::Safe`] the bytes land in the safe region,
    /// or in a one-off allocation when they do not fit there.
    ///
    /// # Errors
    ///
    /// [`BufferError::UnexpectedEof`](crate::BufferError::UnexpectedEof) if
    /// the stream ends first; transport errors unchanged. Bytes read before
    /// the failure stay buffered.
    pub fn ensure(&mut self, need: usize, mode: FillMode) -> Result<()> {
        let result = match mode {
            FillMode::Large => {
                let held = match self.state.active {
                    Region::Large => None,
                    Region::Safe => Some(&self.safe[..]),
                    Region::Spill => Some(&self.spill[..]),
                };
                fill_large(&mut self.conn, &mut self.large, held, &mut self.state, need)
            }
            FillMode::Safe => self.fill_safe(need).map(|_| ()),
        };
        self.release_spill();
        result
    }

    /// Fill the safe side, returning which of its two regions now holds
    /// the unread bytes.
    fn fill_safe(&mut self, need: usize) -> Result<SafeSide> {
        let (start, len) = (self.state.cursor, self.state.unread);
        let target = need.max(len);

        let side = if target <= self.safe.len() {
            match self.state.active {
                Region::Safe => {
                    if start > 0 && len > 0 {
                        self.safe.copy_within(start..start + len, 0);
                    }
                }
                Region::Large => self.safe[..len].copy_from_slice(&self.large[start..start + len]),
                Region::Spill => self.safe[..len].copy_from_slice(&self.spill[start..start + len]),
            }
            self.state.active = Region::Safe;
            SafeSide::Safe
        } else {
            let mut spill = vec![0u8; grow_to(target)];
            spill[..len].copy_from_slice(&self.active_region()[start..start + len]);
            tracing::trace!(size = spill.len(), need, "safe fill spilled to one-off buffer");
            self.spill = spill;
            self.state.active = Region::Spill;
            SafeSide::Spill
        };
        self.state.cursor = 0;

        let region = match side {
            SafeSide::Safe => &mut self.safe[..],
            SafeSide::Spill => &mut self.spill[..],
        };
        read_until(&mut self.conn, region, &mut self.state, need)?;
        Ok(side)
    }

    /// Return the next unread byte without consuming it.
    pub fn peek_byte(&mut self, mode: FillMode) -> Result<u8> {
        if self.state.unread < 1 {
            self.ensure(1, mode)?;
        }
        Ok(self.active_region()[self.state.cursor])
    }

    /// Consume and return the next `need` bytes.
    ///
    /// The view borrows the buffer and is only valid until the next call
    /// that mutates it.
    pub fn read_next(&mut self, need: usize, mode: FillMode) -> Result<&[u8]> {
        if self.state.unread < need {
            self.ensure(need, mode)?;
        }
        let offset = self.state.consume(need);
        Ok(&self.active_region()[offset..offset + need])
    }

    /// Consume the next `need` bytes into an owned copy.
    pub fn read_next_owned(&mut self, need: usize) -> Result<Bytes> {
        self.read_next(need, FillMode::Large).map(Bytes::copy_from_slice)
    }

    /// Consume the next `need` bytes as a view that stays valid while
    /// reading continues.
    ///
    /// The bytes are served from the safe side of the buffer. The returned
    /// [`LargeReader`] keeps reading through the large region, growing or
    /// compacting it as needed, without touching the view. Both borrow the
    /// buffer; drop them to use it directly again.
    pub fn read_retained(&mut self, need: usize) -> Result<(&[u8], LargeReader<'_, T>)> {
        let side = match self.state.active {
            Region::Safe if self.state.unread >= need => SafeSide::Safe,
            Region::Spill if self.state.unread >= need => SafeSide::Spill,
            _ => self.fill_safe(need)?,
        };

        let held: &[u8] = match side {
            SafeSide::Safe => &self.safe,
            SafeSide::Spill => &self.spill,
        };
        let offset = self.state.consume(need);
        let data = &held[offset..offset + need];

        let rest = LargeReader::new(&mut self.conn, &mut self.large, held, &mut self.state);
        Ok((data, rest))
    }

    /// Discard the next `need` bytes without exposing them.
    ///
    /// Buffered bytes go first; the remainder is read from the transport and
    /// dropped, never growing the buffer.
    pub fn skip(&mut self, need: usize) -> Result<()> {
        skip_stream(&mut self.conn, &mut self.state, need)
    }

    /// Drop any buffered unread bytes.
    ///
    /// For connection layers that resynchronize after a failed exchange.
    pub fn clear(&mut self) {
        self.state.cursor = 0;
        self.state.unread = 0;
    }

    /// Number of buffered bytes not yet consumed.
    #[inline]
    pub fn buffered(&self) -> usize {
        self.state.unread
    }

    /// Whether no unread bytes are pending, i.e. checkouts will succeed.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.state.unread == 0
    }

    /// Size of the reusable large region.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.large.len()
    }

    /// Reuse cap for checkout buffers.
    #[inline]
    pub fn max_packet_size(&self) -> usize {
        self.max_packet_size
    }

    /// Current per-read deadline.
    pub fn read_timeout(&self) -> Option<Duration> {
        self.conn.timeout()
    }

    /// Change the per-read deadline. `None` or zero disables it.
    pub fn set_read_timeout(&mut self, timeout: Option<Duration>) {
        self.conn.set_timeout(timeout);
    }

    /// Get a reference to the underlying transport.
    pub fn get_ref(&self) -> &T {
        self.conn.get_ref()
    }

    /// Get a mutable reference to the underlying transport, e.g. to write a
    /// frame built in a checkout buffer.
    ///
    /// Reading from it directly bypasses the buffer and desynchronizes it.
    pub fn get_mut(&mut self) -> &mut T {
        self.conn.get_mut()
    }

    /// Unwrap the underlying transport, dropping any buffered bytes.
    pub fn into_inner(self) -> T {
        self.conn.into_inner()
    }

    pub(super) fn active_region(&self) -> &[u8] {
        match self.state.active {
            Region::Large => &self.large,
            Region::Safe => &self.safe,
            Region::Spill => &self.spill,
        }
    }

    /// Free the one-off region once nothing points into it.
    pub(super) fn release_spill(&mut self) {
        if self.state.active != Region::Spill && !self.spill.is_empty() {
            self.spill = Vec::new();
        }
    }
}

impl<T> fmt::Debug for PacketBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PacketBuffer")
            .field("active", &self.state.active)
            .field("cursor", &self.state.cursor)
            .field("unread", &self.state.unread)
            .field("large", &self.large.len())
            .field("spill", &self.spill.len())
            .field("max_packet_size", &self.max_packet_size)
            .finish_non_exhaustive()
    }
}
