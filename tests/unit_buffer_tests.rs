//! # Output Buffer Unit Tests / 输出缓冲单元测试
//!
//! Capacity limits, chunk splitting and freezing of [`OutputBuffer`].
//!
//! [`OutputBuffer`] 的容量限制、分块截断和冻结行为。

use func_runner::core::buffer::{DEFAULT_BUFFER_CAPACITY, OutputBuffer};

#[cfg(test)]
mod output_buffer_tests {
    use super::*;

    #[test]
    fn test_default_capacity_is_4096() {
        let buffer = OutputBuffer::default();
        assert_eq!(buffer.capacity(), 4096);
        assert_eq!(DEFAULT_BUFFER_CAPACITY, 4096);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_append_below_capacity_keeps_everything() {
        let mut buffer = OutputBuffer::new(8);
        assert_eq!(buffer.append(b"abc"), 3);
        assert_eq!(buffer.append(b"de"), 2);
        assert_eq!(buffer.as_bytes(), b"abcde");
        assert!(!buffer.is_truncated());
    }

    #[test]
    fn test_chunk_straddling_the_limit_is_split() {
        let mut buffer = OutputBuffer::new(8);
        buffer.append(b"abcdef");
        assert_eq!(buffer.append(b"ghijk"), 2);
        assert_eq!(buffer.as_bytes(), b"abcdefgh");
        assert_eq!(buffer.dropped_bytes(), 3);
    }

    #[test]
    fn test_full_buffer_drops_and_counts() {
        let mut buffer = OutputBuffer::new(4);
        buffer.append(b"1234");
        assert!(!buffer.is_truncated());
        assert_eq!(buffer.append(b"5"), 0);
        assert_eq!(buffer.append(b"678"), 0);
        assert_eq!(buffer.len(), 4);
        assert_eq!(buffer.dropped_bytes(), 4);
        assert!(buffer.is_truncated());
    }

    #[test]
    fn test_closed_buffer_ignores_appends() {
        let mut buffer = OutputBuffer::new(16);
        buffer.append(b"kept");
        buffer.close();
        assert!(buffer.is_closed());
        assert_eq!(buffer.append(b"late"), 0);
        assert_eq!(buffer.as_bytes(), b"kept");
        assert_eq!(buffer.dropped_bytes(), 0);
    }

    #[test]
    fn test_empty_append_is_a_no_op() {
        let mut buffer = OutputBuffer::new(2);
        assert_eq!(buffer.append(b""), 0);
        assert!(buffer.is_empty());
        assert!(!buffer.is_truncated());
    }
}
