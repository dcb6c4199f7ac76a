//! # packetwire
//!
//! Packet-framing buffer for synchronous request/response database wire
//! protocols.
//!
//! One [`PacketBuffer`] sits on each connection and backs every read and
//! write on it. Incoming frames are read into a reusable allocation and
//! handed to the decoder as borrowed views; outgoing frames are built in
//! the same allocation once the incoming one is fully consumed.
//!
//! ## Architecture
//!
//! - **Transport** ([`transport`]): a blocking byte stream with an optional
//!   per-read deadline
//! - **Fill**: reads until a requested number of bytes is buffered, growing
//!   the allocation in [`DEFAULT_BUF_SIZE`] steps
//! - **Views**: [`PacketBuffer::read_next`], [`PacketBuffer::peek_byte`],
//!   [`PacketBuffer::skip`]
//! - **Checkout**: [`PacketBuffer::take_buffer`] and friends lend the storage
//!   to the encoder, [`PacketBuffer::store`] takes a grown buffer back
//!
//! The buffer does not parse frames. Headers, sequence numbers and commands
//! belong to the protocol layer above it.
//!
//! ## Example
//!
//! ```no_run
//! use std::net::TcpStream;
//! use std::time::Duration;
//! use packetwire::{BufferConfig, FillMode, PacketBuffer};
//!
//! # fn main() -> Result<(), packetwire::BufferError> {
//! let stream = TcpStream::connect("127.0.0.1:3306")?;
//! let config = BufferConfig::new().with_read_timeout(Duration::from_secs(30));
//! let mut buffer = PacketBuffer::with_config(stream, config);
//!
//! let header = buffer.read_next(4, FillMode::Large)?;
//! let len = u32::from_le_bytes([header[0], header[1], header[2], 0]) as usize;
//! let payload = buffer.read_next(len, FillMode::Large)?;
//! println!("greeting: {} bytes", payload.len());
//! # Ok(())
//! # }
//! ```

pub mod buffer;
pub mod config;
pub mod error;
pub mod transport;

pub use buffer::{
    FillMode, LargeReader, PacketBuffer, DEFAULT_BUF_SIZE, MAX_PACKET_SIZE, TINY_BUFFER_SIZE,
};
pub use config::BufferConfig;
pub use error::{BufferError, Result};
pub use transport::{DeadlineReader, ScriptedTransport, Transport};
