//! Fill and skip routines shared by [`PacketBuffer`](super::PacketBuffer)
//! and [`LargeReader`](super::LargeReader).
//!
//! These take the buffer's parts separately so a caller can keep one region
//! borrowed while the others are refilled.

use std::io;

use super::scratch::with_scratch;
use super::{grow_to, ReadState, Region};
use crate::error::{BufferError, Result};
use crate::transport::{DeadlineReader, Transport};

/// Fill `large` until it holds at least `need` unread bytes.
///
/// `held` is the region the unread bytes currently live in, or `None` when
/// that is `large` itself.
pub(crate) fn fill_large<T: Transport>(
    conn: &mut DeadlineReader<T>,
    large: &mut Vec<u8>,
    held: Option<&[u8]>,
    state: &mut ReadState,
    need: usize,
) -> Result<()> {
    relocate_into_large(large, held, state, need);
    read_until(conn, large, state, need)
}

/// Move the unread bytes to the front of `large`, growing it first if it
/// cannot hold `need` bytes. Growth is kept for later fills.
fn relocate_into_large(
    large: &mut Vec<u8>,
    held: Option<&[u8]>,
    state: &mut ReadState,
    need: usize,
) {
    let (start, len) = (state.cursor, state.unread);
    let target = need.max(len);

    match held {
        None => {
            if target > large.len() {
                let mut grown = vec![0u8; grow_to(target)];
                grown[..len].copy_from_slice(&large[start..start + len]);
                tracing::debug!(from = large.len(), to = grown.len(), "growing large buffer");
                *large = grown;
            } else if start > 0 && len > 0 {
                large.copy_within(start..start + len, 0);
            }
        }
        Some(src) => {
            if target > large.len() {
                let size = grow_to(target);
                tracing::debug!(from = large.len(), to = size, "growing large buffer");
                *large = vec![0u8; size];
            }
            large[..len].copy_from_slice(&src[start..start + len]);
        }
    }

    state.active = Region::Large;
    state.cursor = 0;
}

/// Read into `region` behind the `state.unread` bytes already at its front
/// until at least `need` bytes are held.
///
/// On failure the bytes read so far stay buffered.
pub(crate) fn read_until<T: Transport>(
    conn: &mut DeadlineReader<T>,
    region: &mut [u8],
    state: &mut ReadState,
    need: usize,
) -> Result<()> {
    debug_assert_eq!(state.cursor, 0);
    debug_assert!(region.len() >= need);

    let mut filled = state.unread;
    let result = loop {
        if filled >= need {
            break Ok(());
        }
        match conn.read(&mut region[filled..]) {
            Ok(0) => {
                tracing::debug!(filled, need, "stream ended inside a frame");
                break Err(BufferError::UnexpectedEof);
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => break Err(e.into()),
        }
    };

    state.unread = filled;
    result
}

/// Discard `need` bytes: buffered ones first, the rest straight from the
/// transport through the scratch sink.
pub(crate) fn skip_stream<T: Transport>(
    conn: &mut DeadlineReader<T>,
    state: &mut ReadState,
    need: usize,
) -> Result<()> {
    if state.unread >= need {
        state.consume(need);
        return Ok(());
    }

    let mut remaining = need - state.unread;
    let buffered = state.unread;
    state.consume(buffered);

    with_scratch(|scratch| {
        while remaining > 0 {
            let chunk = remaining.min(scratch.len());
            match conn.read(&mut scratch[..chunk]) {
                Ok(0) => {
                    tracing::debug!(remaining, need, "stream ended while skipping");
                    return Err(BufferError::UnexpectedEof);
                }
                Ok(n) => remaining -= n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    })
}
