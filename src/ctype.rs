use std::io;

use lzxd::{Lzxd, WindowSize};

use crate::mszip::MsZipDecompressor;

const CTYPE_MASK: u16 = 0x000f;
const CTYPE_NONE: u16 = 0;
const CTYPE_MSZIP: u16 = 1;
const CTYPE_QUANTUM: u16 = 2;
const CTYPE_LZX: u16 = 3;

const QUANTUM_LEVELS: std::ops::RangeInclusive<u16> = 1..=7;
const QUANTUM_MEMORY: std::ops::RangeInclusive<u16> = 10..=21;

/// The scheme used to compress the data blocks of one cabinet folder.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum CompressionType {
    /// Blocks are stored as-is.
    None,
    /// MSZIP: one raw deflate stream per block, prefixed with `CK`.
    MsZip,
    /// Quantum with the given level and memory.  Recognized, not decodable.
    Quantum(u16, u16),
    /// LZX with the given window size.
    Lzx(WindowSize),
}

impl CompressionType {
    pub(crate) fn from_bitfield(bits: u16) -> io::Result<CompressionType> {
        match bits & CTYPE_MASK {
            CTYPE_NONE => Ok(CompressionType::None),
            CTYPE_MSZIP => Ok(CompressionType::MsZip),
            CTYPE_QUANTUM => {
                let level = (bits & 0x00f0) >> 4;
                let memory = (bits & 0x1f00) >> 8;
                if !QUANTUM_LEVELS.contains(&level) {
                    invalid_data!("Invalid Quantum level: 0x{:02x}", level);
                }
                if !QUANTUM_MEMORY.contains(&memory) {
                    invalid_data!("Invalid Quantum memory: 0x{:02x}", memory);
                }
                Ok(CompressionType::Quantum(level, memory))
            }
            CTYPE_LZX => {
                let window = (bits & 0x1f00) >> 8;
                match lzx_window_size(window) {
                    Some(size) => Ok(CompressionType::Lzx(size)),
                    None => {
                        invalid_data!("Invalid LZX window: 0x{:02x}", window)
                    }
                }
            }
            _ => invalid_data!("Invalid compression type: 0x{:04x}", bits),
        }
    }

    /// Creates a fresh decoder for a folder compressed with this scheme.
    pub(crate) fn decompressor(self) -> io::Result<Decompressor> {
        match self {
            CompressionType::None => Ok(Decompressor::Stored),
            CompressionType::MsZip => {
                Ok(Decompressor::MsZip(Box::new(MsZipDecompressor::new())))
            }
            CompressionType::Quantum(..) => {
                invalid_data!("Quantum decompression is not supported")
            }
            CompressionType::Lzx(window_size) => {
                Ok(Decompressor::Lzx(Box::new(Lzxd::new(window_size))))
            }
        }
    }
}

fn lzx_window_size(bits: u16) -> Option<WindowSize> {
    Some(match bits {
        15 => WindowSize::KB32,
        16 => WindowSize::KB64,
        17 => WindowSize::KB128,
        18 => WindowSize::KB256,
        19 => WindowSize::KB512,
        20 => WindowSize::MB1,
        21 => WindowSize::MB2,
        22 => WindowSize::MB4,
        23 => WindowSize::MB8,
        24 => WindowSize::MB16,
        25 => WindowSize::MB32,
        _ => return None,
    })
}

pub(crate) enum Decompressor {
    Stored,
    MsZip(Box<MsZipDecompressor>),
    Lzx(Box<Lzxd>),
}

impl Decompressor {
    pub(crate) fn decompress(
        &mut self,
        data: Vec<u8>,
        uncompressed_size: usize,
    ) -> io::Result<Vec<u8>> {
        match self {
            Decompressor::Stored => {
                if data.len() != uncompressed_size {
                    invalid_data!(
                        "Stored block size mismatch \
                         (compressed {}, uncompressed {})",
                        data.len(),
                        uncompressed_size
                    );
                }
                Ok(data)
            }
            Decompressor::MsZip(decompressor) => {
                decompressor.decompress_block(&data, uncompressed_size)
            }
            Decompressor::Lzx(decompressor) => Ok(decompressor
                .decompress_next(&data, uncompressed_size)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?
                .to_vec()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CompressionType;

    #[test]
    fn compression_type_from_bitfield() {
        assert_eq!(
            CompressionType::from_bitfield(0x0).unwrap(),
            CompressionType::None
        );
        assert_eq!(
            CompressionType::from_bitfield(0x1).unwrap(),
            CompressionType::MsZip
        );
        assert_eq!(
            CompressionType::from_bitfield(0x1472).unwrap(),
            CompressionType::Quantum(7, 20)
        );
        assert_eq!(
            CompressionType::from_bitfield(0x1503).unwrap(),
            CompressionType::Lzx(lzxd::WindowSize::MB2)
        );
    }

    #[test]
    fn invalid_bitfields_are_rejected() {
        assert!(CompressionType::from_bitfield(0x0004).is_err());
        assert!(CompressionType::from_bitfield(0x1402).is_err());
        assert!(CompressionType::from_bitfield(0x0e03).is_err());
    }

    #[test]
    fn quantum_has_no_decompressor() {
        let ctype = CompressionType::from_bitfield(0x1472).unwrap();
        assert!(ctype.decompressor().is_err());
    }
}
