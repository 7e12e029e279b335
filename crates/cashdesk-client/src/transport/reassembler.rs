//! Reusable buffers turning transport chunks into complete messages.

use crate::config::MIN_RECEIVE_BUFFER_BYTES;

/// Owns the read chunk handed to `FrameSource::receive` and the growable
/// message arena. Both are allocated once per connection; the arena is
/// cleared, not reallocated, between messages and only grows when a single
/// message exceeds its current capacity.
#[derive(Debug)]
pub struct FrameReassembler {
    chunk: Vec<u8>,
    message: Vec<u8>,
    complete: bool,
}

impl FrameReassembler {
    /// `size` is raised to the 4 KiB floor.
    pub fn new(size: usize) -> Self {
        let size = size.max(MIN_RECEIVE_BUFFER_BYTES);
        Self {
            chunk: vec![0; size],
            message: Vec::with_capacity(size),
            complete: false,
        }
    }

    /// Read target for the next transport call.
    pub fn chunk_mut(&mut self) -> &mut [u8] {
        &mut self.chunk
    }

    /// Append the first `count` bytes of the chunk. Returns true when the
    /// accumulated bytes form one complete message.
    ///
    /// A chunk accepted after a completed message starts a new one.
    pub fn accept(&mut self, count: usize, end_of_message: bool) -> bool {
        if self.complete {
            self.clear();
        }
        let count = count.min(self.chunk.len());
        self.message.extend_from_slice(&self.chunk[..count]);
        self.complete = end_of_message;
        end_of_message
    }

    /// Accumulated bytes of the current (possibly partial) message.
    pub fn message(&self) -> &[u8] {
        &self.message
    }

    pub fn clear(&mut self) {
        self.message.clear();
        self.complete = false;
    }

    pub fn capacity(&self) -> usize {
        self.message.capacity()
    }

    pub fn chunk_len(&self) -> usize {
        self.chunk.len()
    }
}
