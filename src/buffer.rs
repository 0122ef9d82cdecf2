//! Pull-based reader over a host text buffer.
//!
//! The engine asks for bytes at an offset; [`ChunkReader`] answers with at
//! most one chunk at a time from a [`TextBuffer`]. The pull interface has no
//! way to report a failure mid-parse, so a short read only flips a flag that
//! the caller checks once the parse has returned.

use ropey::Rope;
use std::borrow::Cow;
use std::cell::Cell;

/// Largest read handed to the engine in one call.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// A host text buffer addressed by byte offset.
pub trait TextBuffer {
    /// Total length in bytes.
    fn buffer_size(&self) -> usize;

    /// Bytes `offset..offset + count`.
    ///
    /// Returning fewer than `count` bytes is a short read.
    fn read_range(&self, offset: usize, count: usize) -> Cow<'_, [u8]>;
}

impl TextBuffer for [u8] {
    fn buffer_size(&self) -> usize {
        self.len()
    }

    fn read_range(&self, offset: usize, count: usize) -> Cow<'_, [u8]> {
        let start = offset.min(self.len());
        let end = offset.saturating_add(count).min(self.len());
        Cow::Borrowed(&self[start..end])
    }
}

impl TextBuffer for str {
    fn buffer_size(&self) -> usize {
        self.len()
    }

    fn read_range(&self, offset: usize, count: usize) -> Cow<'_, [u8]> {
        self.as_bytes().read_range(offset, count)
    }
}

impl TextBuffer for String {
    fn buffer_size(&self) -> usize {
        self.len()
    }

    fn read_range(&self, offset: usize, count: usize) -> Cow<'_, [u8]> {
        self.as_bytes().read_range(offset, count)
    }
}

impl TextBuffer for Rope {
    fn buffer_size(&self) -> usize {
        self.len_bytes()
    }

    fn read_range(&self, offset: usize, count: usize) -> Cow<'_, [u8]> {
        let len = self.len_bytes();
        if offset >= len || count == 0 {
            return Cow::Borrowed(&[]);
        }
        let end = offset.saturating_add(count).min(len);
        let (mut chunks, chunk_start, _, _) = self.chunks_at_byte(offset);

        // Chunks may split multi-byte characters; we copy raw bytes so that
        // never matters here.
        let Some(first) = chunks.next() else {
            return Cow::Borrowed(&[]);
        };
        let first = first.as_bytes();
        let from = offset - chunk_start;
        if chunk_start + first.len() >= end {
            return Cow::Borrowed(&first[from..end - chunk_start]);
        }

        let mut out = Vec::with_capacity(end - offset);
        out.extend_from_slice(&first[from..]);
        for chunk in chunks {
            let want = end - offset - out.len();
            let bytes = chunk.as_bytes();
            out.extend_from_slice(&bytes[..want.min(bytes.len())]);
            if out.len() == end - offset {
                break;
            }
        }
        Cow::Owned(out)
    }
}

impl<T: TextBuffer + ?Sized> TextBuffer for &T {
    fn buffer_size(&self) -> usize {
        (**self).buffer_size()
    }

    fn read_range(&self, offset: usize, count: usize) -> Cow<'_, [u8]> {
        (**self).read_range(offset, count)
    }
}

/// Engine input over a [`TextBuffer`] for the duration of one parse.
///
/// The buffer size is read once, when the reader is built.
pub struct ChunkReader<'b, B: ?Sized> {
    buffer: &'b B,
    size: usize,
    chunk_size: usize,
    success: Cell<bool>,
    reads: Cell<usize>,
}

impl<'b, B: TextBuffer + ?Sized> ChunkReader<'b, B> {
    pub fn new(buffer: &'b B, chunk_size: usize) -> Self {
        Self {
            buffer,
            size: buffer.buffer_size(),
            chunk_size: chunk_size.max(1),
            success: Cell::new(true),
            reads: Cell::new(0),
        }
    }

    /// Next chunk starting at `offset`; empty means end of input.
    pub fn read(&self, offset: usize) -> Cow<'b, [u8]> {
        if !self.success.get() {
            return Cow::Borrowed(&[]);
        }
        let count = self.size.saturating_sub(offset).min(self.chunk_size);
        if count == 0 {
            return Cow::Borrowed(&[]);
        }

        self.reads.set(self.reads.get() + 1);
        let bytes = self.buffer.read_range(offset, count);
        if bytes.len() != count {
            tracing::warn!(
                offset,
                requested = count,
                got = bytes.len(),
                "short read from buffer, ending input early"
            );
            self.success.set(false);
            return Cow::Borrowed(&[]);
        }
        bytes
    }

    /// False once any read came back short.
    pub fn success(&self) -> bool {
        self.success.get()
    }

    /// Size of the buffer as seen when the reader was built.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of non-empty reads served to the buffer.
    pub fn reads(&self) -> usize {
        self.reads.get()
    }
}
