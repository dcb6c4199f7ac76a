//! In-memory transport replaying a fixed script.
//!
//! Each step is delivered by exactly one `read` call (split further if the
//! caller's buffer is smaller), which makes chunk boundaries deterministic.
//! Once the script runs out the stream reports end-of-stream.
//!
//! # Example
//!
//! ```
//! use packetwire::{FillMode, PacketBuffer};
//! use packetwire::transport::ScriptedTransport;
//!
//! let transport = ScriptedTransport::new().chunk(b"AB").chunk(b"CDE");
//! let mut buffer = PacketBuffer::new(transport);
//!
//! assert_eq!(buffer.read_next(1, FillMode::Large).unwrap(), b"A");
//! assert_eq!(buffer.read_next(3, FillMode::Large).unwrap(), b"BCD");
//! ```

use std::collections::VecDeque;
use std::io::{self, Read};
use std::time::Instant;

use super::Transport;

#[derive(Debug)]
enum Step {
    Data(Vec<u8>),
    Fail(io::ErrorKind),
}

/// A [`Transport`] that plays back data chunks and errors, then ends.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    steps: VecDeque<Step>,
    deadlines: Vec<Option<Instant>>,
    reads: usize,
    reject_deadlines: bool,
}

impl ScriptedTransport {
    /// Create an empty script (immediate end-of-stream).
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a script from a sequence of chunks.
    pub fn from_chunks<I, C>(chunks: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: AsRef<[u8]>,
    {
        chunks
            .into_iter()
            .fold(Self::new(), |script, chunk| script.chunk(chunk.as_ref()))
    }

    /// Append a data chunk, delivered by the next read.
    ///
    /// Empty chunks are dropped: a zero-length read means end-of-stream.
    pub fn chunk(mut self, data: &[u8]) -> Self {
        if !data.is_empty() {
            self.steps.push_back(Step::Data(data.to_vec()));
        }
        self
    }

    /// Append a read error of the given kind.
    pub fn error(mut self, kind: io::ErrorKind) -> Self {
        self.steps.push_back(Step::Fail(kind));
        self
    }

    /// Make `set_read_deadline` fail with `InvalidInput`.
    pub fn fail_deadlines(mut self) -> Self {
        self.reject_deadlines = true;
        self
    }

    /// Every deadline set so far, in order.
    pub fn deadlines(&self) -> &[Option<Instant>] {
        &self.deadlines
    }

    /// Number of `read` calls served, end-of-stream reads included.
    pub fn reads(&self) -> usize {
        self.reads
    }

    /// Bytes still queued in the script.
    pub fn remaining(&self) -> usize {
        self.steps
            .iter()
            .map(|step| match step {
                Step::Data(data) => data.len(),
                Step::Fail(_) => 0,
            })
            .sum()
    }
}

impl Read for ScriptedTransport {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        self.reads += 1;
        if out.is_empty() {
            return Ok(0);
        }

        match self.steps.pop_front() {
            None => Ok(0),
            Some(Step::Fail(kind)) => Err(io::Error::new(kind, "scripted failure")),
            Some(Step::Data(mut data)) => {
                if data.len() > out.len() {
                    let rest = data.split_off(out.len());
                    self.steps.push_front(Step::Data(rest));
                }
                out[..data.len()].copy_from_slice(&data);
                Ok(data.len())
            }
        }
    }
}

impl Transport for ScriptedTransport {
    fn set_read_deadline(&mut self, deadline: Option<Instant>) -> io::Result<()> {
        if self.reject_deadlines {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "deadline rejected",
            ));
        }
        self.deadlines.push(deadline);
        Ok(())
    }
}
