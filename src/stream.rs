use std::io::{self, Cursor, Read};

use crate::cancel::{self, Cancellable};
use crate::error::{IngestError, Result};

/// Size of each read from a non-seekable input.
pub const CHUNK_SIZE: usize = 8192;

/// The fully buffered contents of an input stream.
#[derive(Debug)]
pub struct BufferedStream {
    data: Vec<u8>,
}

impl BufferedStream {
    /// Reads `input` to the end in [`CHUNK_SIZE`] chunks, checking `cancel`
    /// before each chunk.
    pub fn read_from<R: Read>(
        mut input: R,
        cancel: Option<&Cancellable>,
    ) -> Result<BufferedStream> {
        let mut data = Vec::new();
        let mut chunk = vec![0u8; CHUNK_SIZE];
        loop {
            cancel::check(cancel)?;
            let count = match input.read(&mut chunk) {
                Ok(0) => break,
                Ok(count) => count,
                Err(error) if error.kind() == io::ErrorKind::Interrupted => {
                    continue
                }
                Err(error) => {
                    return Err(IngestError::io("failed to read input stream", error))
                }
            };
            data.extend_from_slice(&chunk[..count]);
        }
        Ok(BufferedStream { data })
    }

    /// Total number of bytes read.
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// The buffered bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Converts the buffer into a seekable reader.
    pub fn into_seekable(self) -> Cursor<Vec<u8>> {
        Cursor::new(self.data)
    }
}
