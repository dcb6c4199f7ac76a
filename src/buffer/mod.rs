//! Buffer module - the reusable byte region behind one connection.
//!
//! The buffer serves both directions of a synchronous request/response
//! protocol. Incoming bytes are filled in and handed out as borrowed views;
//! outgoing frames are built in the same storage through checkouts. Because
//! the peer never speaks while we write, one allocation covers both sides.
//!
//! Storage is split into three regions, selected by an internal tag:
//! - **large**: the reusable allocation, grown on demand and kept
//! - **safe**: a tiny fixed allocation for views that must outlive a refill
//!   of the large region (see [`PacketBuffer::read_retained`])
//! - **spill**: a one-off allocation for safe fills that overflow the safe
//!   region and for checkouts above the packet size cap

mod checkout;
mod fill;
mod packet_buffer;
mod retained;
mod scratch;

pub use packet_buffer::PacketBuffer;
pub use retained::LargeReader;

/// Default allocation unit. Fill-path growth rounds up to a multiple of it.
pub const DEFAULT_BUF_SIZE: usize = 4096;

/// Capacity of the safe region.
pub const TINY_BUFFER_SIZE: usize = 64;

/// Default cap on reusable checkout buffers (16 MiB - 1).
pub const MAX_PACKET_SIZE: usize = (1 << 24) - 1;

/// Where a fill lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillMode {
    /// Fill the large region, growing it if needed.
    #[default]
    Large,
    /// Fill the safe region so the returned view is not disturbed by a
    /// later fill of the large region.
    Safe,
}

/// Storage currently backing the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Region {
    Large,
    Safe,
    Spill,
}

/// Cursor over the active region.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ReadState {
    pub(crate) active: Region,
    /// Offset of the next unread byte.
    pub(crate) cursor: usize,
    /// Buffered bytes not yet consumed.
    pub(crate) unread: usize,
}

impl ReadState {
    pub(crate) fn new() -> Self {
        Self {
            active: Region::Large,
            cursor: 0,
            unread: 0,
        }
    }

    /// Consume `need` buffered bytes, returning the offset they start at.
    #[inline]
    pub(crate) fn consume(&mut self, need: usize) -> usize {
        debug_assert!(need <= self.unread);
        let offset = self.cursor;
        self.cursor += need;
        self.unread -= need;
        offset
    }
}

/// Size for a grown region: `need` rounded up to a multiple of
/// [`DEFAULT_BUF_SIZE`].
#[inline]
pub(crate) fn grow_to(need: usize) -> usize {
    need.div_ceil(DEFAULT_BUF_SIZE).max(1) * DEFAULT_BUF_SIZE
}
