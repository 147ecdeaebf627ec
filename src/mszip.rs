use std::io;

use flate2::{Decompress, FlushDecompress, Status};

const MSZIP_SIGNATURE: [u8; 2] = *b"CK";
const DEFLATE_MAX_DICT_LEN: usize = 0x8000;

/// Decoder for the blocks of one MSZIP folder.
///
/// Every block is an independent deflate stream, except that back-references
/// may reach into the previous 32 KiB of output.  The window is restored
/// before each block by feeding the decoder a stored deflate block holding
/// the saved history.
pub(crate) struct MsZipDecompressor {
    inflater: Decompress,
    history: Vec<u8>,
}

impl MsZipDecompressor {
    pub(crate) fn new() -> MsZipDecompressor {
        MsZipDecompressor {
            inflater: Decompress::new(false),
            history: Vec::with_capacity(DEFLATE_MAX_DICT_LEN),
        }
    }

    pub(crate) fn decompress_block(
        &mut self,
        data: &[u8],
        uncompressed_size: usize,
    ) -> io::Result<Vec<u8>> {
        let payload = match data.strip_prefix(&MSZIP_SIGNATURE[..]) {
            Some(payload) => payload,
            None => invalid_data!(
                "MSZIP decompression failed: Invalid block signature"
            ),
        };
        self.inflater.reset(false);
        self.restore_history()?;

        // One spare byte so a block that inflates past its declared size
        // shows up as too long instead of being cut off.
        let mut out = Vec::with_capacity(uncompressed_size + 1);
        let total_in = self.inflater.total_in();
        let status = match self.inflater.decompress_vec(
            payload,
            &mut out,
            FlushDecompress::Finish,
        ) {
            Ok(status) => status,
            Err(error) => invalid_data!("MSZIP decompression failed: {}", error),
        };
        if out.len() != uncompressed_size {
            invalid_data!(
                "MSZIP decompression failed: Incorrect uncompressed size \
                 (expected {}, was actually {})",
                uncompressed_size,
                out.len()
            );
        }
        let consumed = (self.inflater.total_in() - total_in) as usize;
        if consumed != payload.len() && status != Status::StreamEnd {
            invalid_data!(
                "MSZIP decompression failed: {} of {} compressed bytes left \
                 unread",
                payload.len() - consumed,
                payload.len()
            );
        }
        self.remember(&out);
        Ok(out)
    }

    fn restore_history(&mut self) -> io::Result<()> {
        if self.history.is_empty() {
            return Ok(());
        }
        let length = self.history.len() as u16;
        let mut stored = Vec::with_capacity(5 + self.history.len());
        stored.push(0);
        stored.extend_from_slice(&length.to_le_bytes());
        stored.extend_from_slice(&(!length).to_le_bytes());
        stored.extend_from_slice(&self.history);
        let mut sink = Vec::with_capacity(self.history.len());
        match self.inflater.decompress_vec(
            &stored,
            &mut sink,
            FlushDecompress::Sync,
        ) {
            Ok(Status::Ok) => Ok(()),
            Ok(status) => invalid_data!(
                "MSZIP decompression failed: could not restore window \
                 (status {:?})",
                status
            ),
            Err(error) => invalid_data!(
                "MSZIP decompression failed: could not restore window: {}",
                error
            ),
        }
    }

    fn remember(&mut self, out: &[u8]) {
        if out.len() >= DEFLATE_MAX_DICT_LEN {
            self.history.clear();
            self.history
                .extend_from_slice(&out[out.len() - DEFLATE_MAX_DICT_LEN..]);
        } else {
            let total = self.history.len() + out.len();
            if total > DEFLATE_MAX_DICT_LEN {
                self.history.drain(..total - DEFLATE_MAX_DICT_LEN);
            }
            self.history.extend_from_slice(out);
        }
    }
}
