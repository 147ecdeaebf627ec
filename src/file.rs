use std::io::{self, Read};

use byteorder::{LittleEndian, ReadBytesExt};

use crate::consts;

/// Metadata about one member stored in a cabinet.
#[derive(Debug, Clone)]
pub struct FileEntry {
    name: String,
    uncompressed_size: u32,
    attributes: u16,
    pub(crate) folder_index: u16,
    pub(crate) uncompressed_offset: u32,
}

impl FileEntry {
    /// Returns the member name exactly as stored, including any `\`
    /// separators.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the size of the member once decompressed, in bytes.
    pub fn uncompressed_size(&self) -> u32 {
        self.uncompressed_size
    }

    /// Returns true if the name was stored as UTF-8 rather than in a
    /// code page.
    pub fn is_name_utf(&self) -> bool {
        (self.attributes & consts::ATTR_NAME_IS_UTF) != 0
    }
}

pub(crate) fn parse_file_entry<R: Read>(mut reader: R) -> io::Result<FileEntry> {
    let uncompressed_size = reader.read_u32::<LittleEndian>()?;
    let uncompressed_offset = reader.read_u32::<LittleEndian>()?;
    let folder_index = reader.read_u16::<LittleEndian>()?;
    let _date = reader.read_u16::<LittleEndian>()?;
    let _time = reader.read_u16::<LittleEndian>()?;
    let attributes = reader.read_u16::<LittleEndian>()?;
    let is_utf8 = (attributes & consts::ATTR_NAME_IS_UTF) != 0;
    let name = read_null_terminated_string(&mut reader, is_utf8)?;
    Ok(FileEntry {
        name,
        uncompressed_size,
        attributes,
        folder_index,
        uncompressed_offset,
    })
}

pub(crate) fn read_null_terminated_string<R: Read>(
    reader: &mut R,
    is_utf8: bool,
) -> io::Result<String> {
    let mut bytes = Vec::with_capacity(32);
    loop {
        match reader.read_u8()? {
            0 => break,
            _ if bytes.len() == consts::MAX_STRING_SIZE => invalid_data!(
                "String longer than maximum of {} bytes",
                consts::MAX_STRING_SIZE
            ),
            byte => bytes.push(byte),
        }
    }
    if is_utf8 {
        match String::from_utf8(bytes) {
            Ok(string) => Ok(string),
            Err(error) => invalid_data!("Invalid UTF-8 name: {}", error),
        }
    } else {
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
