//! Continued reading while a safe-side view is held.

use super::fill::{fill_large, skip_stream};
use super::{ReadState, Region};
use crate::error::Result;
use crate::transport::{DeadlineReader, Transport};

/// Reader over the large region, returned by
/// [`PacketBuffer::read_retained`](super::PacketBuffer::read_retained).
///
/// It borrows everything except the storage the retained view points into,
/// so fills may grow or compact the large region while the view stays valid.
/// Bytes still buffered on the safe side are served before any new read.
pub struct LargeReader<'a, T> {
    conn: &'a mut DeadlineReader<T>,
    large: &'a mut Vec<u8>,
    /// Region the retained view lives in.
    held: &'a [u8],
    state: &'a mut ReadState,
}

impl<'a, T: Transport> LargeReader<'a, T> {
    pub(super) fn new(
        conn: &'a mut DeadlineReader<T>,
        large: &'a mut Vec<u8>,
        held: &'a [u8],
        state: &'a mut ReadState,
    ) -> Self {
        Self {
            conn,
            large,
            held,
            state,
        }
    }

    /// Make at least `need` unread bytes available in the large region.
    pub fn ensure(&mut self, need: usize) -> Result<()> {
        let held = match self.state.active {
            Region::Large => None,
            Region::Safe | Region::Spill => Some(self.held),
        };
        fill_large(&mut *self.conn, &mut *self.large, held, &mut *self.state, need)
    }

    /// Return the next unread byte without consuming it.
    pub fn peek_byte(&mut self) -> Result<u8> {
        if self.state.unread < 1 {
            self.ensure(1)?;
        }
        Ok(self.region()[self.state.cursor])
    }

    /// Consume and return the next `need` bytes.
    pub fn read_next(&mut self, need: usize) -> Result<&[u8]> {
        if self.state.unread < need {
            self.ensure(need)?;
        }
        let offset = self.state.consume(need);
        Ok(&self.region()[offset..offset + need])
    }

    /// Discard the next `need` bytes.
    pub fn skip(&mut self, need: usize) -> Result<()> {
        skip_stream(&mut *self.conn, &mut *self.state, need)
    }

    /// Number of buffered bytes not yet consumed.
    #[inline]
    pub fn buffered(&self) -> usize {
        self.state.unread
    }

    fn region(&self) -> &[u8] {
        match self.state.active {
            Region::Large => &self.large[..],
            Region::Safe | Region::Spill => self.held,
        }
    }
}
