//! Scratch space for discarding skipped bytes.
//!
//! Skipped bytes are never looked at, so every buffer on a thread can share
//! one sink. If the sink is already in use (a transport that itself skips on
//! another buffer from inside `read`), a stack array takes its place.

use std::cell::RefCell;

use super::DEFAULT_BUF_SIZE;

thread_local! {
    static SCRATCH: RefCell<[u8; DEFAULT_BUF_SIZE]> =
        const { RefCell::new([0u8; DEFAULT_BUF_SIZE]) };
}

/// Run `f` with a [`DEFAULT_BUF_SIZE`] scratch slice.
pub(crate) fn with_scratch<F, R>(f: F) -> R
where
    F: FnOnce(&mut [u8]) -> R,
{
    SCRATCH.with(|cell| match cell.try_borrow_mut() {
        Ok(mut scratch) => f(&mut scratch[..]),
        Err(_) => {
            let mut local = [0u8; DEFAULT_BUF_SIZE];
            f(&mut local)
        }
    })
}
