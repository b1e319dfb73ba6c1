//! Fixed-size chunking of an object's byte stream.

use tokio::io::AsyncReadExt;
use tracing::trace;

use indexing_types::ByteStream;

use crate::error::IndexingError;
use crate::sanitize::{sanitize, SanitizedChunk};

/// Bytes per chunk for an object of `byte_size` bytes.
///
/// The object is split into `bulk_count` chunks. Objects smaller than
/// `bulk_count` bytes are read as one chunk.
pub fn chunk_size(byte_size: u64, bulk_count: u32) -> Result<usize, IndexingError> {
    if bulk_count == 0 {
        return Err(IndexingError::InvalidInput(
            "bulk_count must be greater than zero".to_string(),
        ));
    }

    let size = match byte_size / u64::from(bulk_count) {
        0 => byte_size.max(1),
        size => size,
    };

    usize::try_from(size).map_err(|_| {
        IndexingError::InvalidInput(format!("chunk size [{}] exceeds addressable memory", size))
    })
}

/// One sanitized chunk and its position in the object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub index: u64,
    pub text: SanitizedChunk,
}

/// Reads an object's content as a sequence of sanitized chunks.
///
/// Every chunk but the last holds exactly `chunk_size` raw bytes. The
/// stream is dropped with the chunker.
pub struct ContentChunker {
    stream: ByteStream,
    buffer: Vec<u8>,
    next_index: u64,
    exhausted: bool,
}

impl ContentChunker {
    pub fn new(stream: ByteStream, chunk_size: usize) -> Self {
        Self {
            stream,
            buffer: vec![0; chunk_size.max(1)],
            next_index: 0,
            exhausted: false,
        }
    }

    /// Number of chunks produced so far.
    pub fn chunks_read(&self) -> u64 {
        self.next_index
    }

    /// Read the next chunk, or `None` at end of stream.
    pub async fn next_chunk(&mut self) -> Result<Option<Chunk>, IndexingError> {
        if self.exhausted {
            return Ok(None);
        }

        let mut filled = 0;
        while filled < self.buffer.len() {
            let n = self.stream.read(&mut self.buffer[filled..]).await?;
            if n == 0 {
                self.exhausted = true;
                break;
            }
            filled += n;
        }

        if filled == 0 {
            return Ok(None);
        }

        let chunk = Chunk {
            index: self.next_index,
            text: sanitize(&self.buffer[..filled]),
        };
        trace!(index = chunk.index, bytes = filled, "Read chunk");
        self.next_index += 1;
        Ok(Some(chunk))
    }
}
