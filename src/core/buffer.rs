//! # Output Buffer Module / 输出缓冲模块
//!
//! Bounded, append-only byte accumulator used for each captured stream.
//! Bytes past the capacity are dropped and counted so the report can say
//! how much was lost.
//!
//! 每个被捕获流使用的有界、仅追加字节累加器。
//! 超出容量的字节会被丢弃并计数，以便报告中说明丢失了多少。

/// Default number of bytes captured per stream.
/// 每个流默认捕获的字节数。
pub const DEFAULT_BUFFER_CAPACITY: usize = 4096;

/// A fixed-capacity capture buffer for one stream of one process.
///
/// Once [`close`](OutputBuffer::close) has been called (the stream reached EOF)
/// the buffer is frozen: further appends are ignored.
#[derive(Debug, Clone)]
pub struct OutputBuffer {
    data: Vec<u8>,
    capacity: usize,
    dropped: usize,
    closed: bool,
}

impl OutputBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity.min(DEFAULT_BUFFER_CAPACITY)),
            capacity,
            dropped: 0,
            closed: false,
        }
    }

    /// Appends as much of `bytes` as still fits and returns how many bytes were kept.
    /// A chunk straddling the limit is split so the buffer fills exactly to capacity.
    ///
    /// 追加 `bytes` 中仍能容纳的部分，返回保留的字节数。
    pub fn append(&mut self, bytes: &[u8]) -> usize {
        if self.closed {
            return 0;
        }
        let room = self.capacity - self.data.len();
        let kept = bytes.len().min(room);
        self.data.extend_from_slice(&bytes[..kept]);
        self.dropped += bytes.len() - kept;
        kept
    }

    /// Freezes the buffer once its stream reached EOF.
    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// `true` if at least one byte was dropped because the buffer was full.
    pub fn is_truncated(&self) -> bool {
        self.dropped > 0
    }

    pub fn dropped_bytes(&self) -> usize {
        self.dropped
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_CAPACITY)
    }
}
