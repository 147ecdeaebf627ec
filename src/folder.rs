use std::io::{self, Read, Seek, SeekFrom};

use byteorder::{LittleEndian, ReadBytesExt};

use crate::checksum::data_block_checksum;
use crate::ctype::{CompressionType, Decompressor};

/// Metadata about one folder (compressed stream) in a cabinet.
#[derive(Debug, Clone)]
pub(crate) struct FolderEntry {
    pub(crate) first_data_block_offset: u32,
    pub(crate) num_data_blocks: u16,
    pub(crate) compression_type: CompressionType,
}

pub(crate) fn parse_folder_entry<R: Read>(
    mut reader: R,
    reserve_size: usize,
) -> io::Result<FolderEntry> {
    let first_data_block_offset = reader.read_u32::<LittleEndian>()?;
    let num_data_blocks = reader.read_u16::<LittleEndian>()?;
    let compression_bits = reader.read_u16::<LittleEndian>()?;
    let compression_type = CompressionType::from_bitfield(compression_bits)?;
    io::copy(&mut (&mut reader).take(reserve_size as u64), &mut io::sink())?;
    Ok(FolderEntry { first_data_block_offset, num_data_blocks, compression_type })
}

/// Reads the decompressed contents of one folder front to back.
///
/// Data blocks are consumed in order straight off the underlying reader, so
/// nothing else may move the reader while a `FolderReader` is alive.
pub(crate) struct FolderReader<'a, R> {
    reader: &'a mut R,
    decompressor: Decompressor,
    data_reserve_size: usize,
    blocks_remaining: u16,
    block_index: usize,
    block: Vec<u8>,
    offset_within_block: usize,
}

impl<'a, R: Read + Seek> FolderReader<'a, R> {
    pub(crate) fn new(
        reader: &'a mut R,
        entry: &FolderEntry,
        data_reserve_size: u8,
    ) -> io::Result<FolderReader<'a, R>> {
        let decompressor = entry.compression_type.decompressor()?;
        reader.seek(SeekFrom::Start(entry.first_data_block_offset as u64))?;
        Ok(FolderReader {
            reader,
            decompressor,
            data_reserve_size: data_reserve_size as usize,
            blocks_remaining: entry.num_data_blocks,
            block_index: 0,
            block: Vec::new(),
            offset_within_block: 0,
        })
    }

    fn load_next_block(&mut self) -> io::Result<()> {
        let checksum = self.reader.read_u32::<LittleEndian>()?;
        let compressed_size = self.reader.read_u16::<LittleEndian>()?;
        let uncompressed_size = self.reader.read_u16::<LittleEndian>()?;
        let mut reserve_data = vec![0u8; self.data_reserve_size];
        self.reader.read_exact(&mut reserve_data)?;
        let mut compressed = vec![0u8; compressed_size as usize];
        self.reader.read_exact(&mut compressed)?;
        if checksum != 0 {
            let actual =
                data_block_checksum(&reserve_data, &compressed, uncompressed_size);
            if actual != checksum {
                invalid_data!(
                    "Checksum error in data block {} \
                     (expected {:08x}, actual {:08x})",
                    self.block_index,
                    checksum,
                    actual
                );
            }
        }
        self.block = self
            .decompressor
            .decompress(compressed, uncompressed_size as usize)?;
        self.offset_within_block = 0;
        self.block_index += 1;
        self.blocks_remaining -= 1;
        Ok(())
    }
}

impl<'a, R: Read + Seek> Read for FolderReader<'a, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        while self.offset_within_block == self.block.len() {
            if self.blocks_remaining == 0 {
                return Ok(0);
            }
            self.load_next_block()?;
        }
        let available = &self.block[self.offset_within_block..];
        let count = available.len().min(buf.len());
        buf[..count].copy_from_slice(&available[..count]);
        self.offset_within_block += count;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read};

    use super::{parse_folder_entry, FolderEntry, FolderReader};
    use crate::ctype::CompressionType;

    #[test]
    fn parse_entry_skips_reserve_data() {
        let binary: &[u8] = b"\x43\0\0\0\x02\0\x01\0\xaa\xbb\xcc";
        let mut cursor = Cursor::new(binary);
        let entry = parse_folder_entry(&mut cursor, 2).unwrap();
        assert_eq!(entry.first_data_block_offset, 0x43);
        assert_eq!(entry.num_data_blocks, 2);
        assert_eq!(entry.compression_type, CompressionType::MsZip);
        assert_eq!(cursor.position(), 10);
    }

    #[test]
    fn read_two_stored_blocks() {
        let binary: &[u8] = b"\0\0\0\0\x06\0\x06\0Hello,\
            \0\0\0\0\x08\0\x08\0 world!\n";
        let entry = FolderEntry {
            first_data_block_offset: 0,
            num_data_blocks: 2,
            compression_type: CompressionType::None,
        };
        let mut cursor = Cursor::new(binary);
        let mut folder = FolderReader::new(&mut cursor, &entry, 0).unwrap();
        let mut data = Vec::new();
        folder.read_to_end(&mut data).unwrap();
        assert_eq!(data, b"Hello, world!\n");
    }

    #[test]
    fn bad_checksum_is_rejected() {
        let binary: &[u8] = b"\x4d\x1a\x2e\x7f\x0e\0\x0e\0Hello, world!\n";
        let entry = FolderEntry {
            first_data_block_offset: 0,
            num_data_blocks: 1,
            compression_type: CompressionType::None,
        };
        let mut cursor = Cursor::new(binary);
        let mut folder = FolderReader::new(&mut cursor, &entry, 0).unwrap();
        let mut data = Vec::new();
        assert!(folder.read_to_end(&mut data).is_err());
    }

    #[test]
    fn truncated_block_is_an_error() {
        let binary: &[u8] = b"\0\0\0\0\x0e\0\x0e\0Hello";
        let entry = FolderEntry {
            first_data_block_offset: 0,
            num_data_blocks: 1,
            compression_type: CompressionType::None,
        };
        let mut cursor = Cursor::new(binary);
        let mut folder = FolderReader::new(&mut cursor, &entry, 0).unwrap();
        let mut data = Vec::new();
        assert!(folder.read_to_end(&mut data).is_err());
    }
}
