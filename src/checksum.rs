/// Running CAB data block checksum.
///
/// Input is folded in as little-endian 32-bit words; a trailing partial word
/// is folded in big-endian order when the value is taken.
pub(crate) struct Checksum {
    value: u32,
    pending: [u8; 4],
    pending_len: usize,
}

impl Checksum {
    pub(crate) fn new() -> Checksum {
        Checksum { value: 0, pending: [0; 4], pending_len: 0 }
    }

    pub(crate) fn update(&mut self, buf: &[u8]) {
        for &byte in buf {
            self.pending[self.pending_len] = byte;
            self.pending_len += 1;
            if self.pending_len == 4 {
                self.value ^= u32::from_le_bytes(self.pending);
                self.pending_len = 0;
            }
        }
    }

    pub(crate) fn value(&self) -> u32 {
        let tail = self.pending[..self.pending_len]
            .iter()
            .fold(0u32, |acc, &byte| (acc << 8) | byte as u32);
        self.value ^ tail
    }
}

/// Computes the checksum stored in a `CFDATA` header for the given block.
pub(crate) fn data_block_checksum(
    reserve_data: &[u8],
    compressed_data: &[u8],
    uncompressed_size: u16,
) -> u32 {
    let mut checksum = Checksum::new();
    checksum.update(reserve_data);
    checksum.update(compressed_data);
    checksum.value()
        ^ ((compressed_data.len() as u32) | ((uncompressed_size as u32) << 16))
}
