use std::io::{self, Read, Seek, SeekFrom};
use std::slice;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::consts;
use crate::file::{parse_file_entry, read_null_terminated_string, FileEntry};
use crate::folder::{parse_folder_entry, FolderEntry, FolderReader};

/// A read-only view of a cabinet file.
pub struct Cabinet<R> {
    reader: R,
    data_reserve_size: u8,
    folders: Vec<FolderEntry>,
    files: Vec<FileEntry>,
}

impl<R: Read + Seek> Cabinet<R> {
    /// Parses the cabinet header, folder table and file table.
    pub fn new(mut reader: R) -> io::Result<Cabinet<R>> {
        let signature = reader.read_u32::<LittleEndian>()?;
        if signature != consts::FILE_SIGNATURE {
            invalid_data!("Not a cabinet file (invalid file signature)");
        }
        let _reserved1 = reader.read_u32::<LittleEndian>()?;
        let total_size = reader.read_u32::<LittleEndian>()?;
        if total_size > consts::MAX_TOTAL_CAB_SIZE {
            invalid_data!(
                "Cabinet total size field is too large \
                 ({} bytes; max is {} bytes)",
                total_size,
                consts::MAX_TOTAL_CAB_SIZE
            );
        }
        let _reserved2 = reader.read_u32::<LittleEndian>()?;
        let first_file_offset = reader.read_u32::<LittleEndian>()?;
        let _reserved3 = reader.read_u32::<LittleEndian>()?;
        let minor_version = reader.read_u8()?;
        let major_version = reader.read_u8()?;
        if major_version > consts::VERSION_MAJOR
            || major_version == consts::VERSION_MAJOR
                && minor_version > consts::VERSION_MINOR
        {
            invalid_data!(
                "Version {}.{} cabinet files are not supported",
                major_version,
                minor_version
            );
        }
        let num_folders = reader.read_u16::<LittleEndian>()? as usize;
        let num_files = reader.read_u16::<LittleEndian>()? as usize;
        let flags = reader.read_u16::<LittleEndian>()?;
        let _cabinet_set_id = reader.read_u16::<LittleEndian>()?;
        let _cabinet_set_index = reader.read_u16::<LittleEndian>()?;
        let mut header_reserve_size = 0u16;
        let mut folder_reserve_size = 0u8;
        let mut data_reserve_size = 0u8;
        if (flags & consts::FLAG_RESERVE_PRESENT) != 0 {
            header_reserve_size = reader.read_u16::<LittleEndian>()?;
            folder_reserve_size = reader.read_u8()?;
            data_reserve_size = reader.read_u8()?;
        }
        if header_reserve_size > 0 {
            reader.seek(SeekFrom::Current(header_reserve_size as i64))?;
        }
        for flag in [consts::FLAG_PREV_CABINET, consts::FLAG_NEXT_CABINET] {
            if (flags & flag) != 0 {
                let _cabinet_name = read_null_terminated_string(&mut reader, false)?;
                let _disk_name = read_null_terminated_string(&mut reader, false)?;
            }
        }
        let mut folders = Vec::with_capacity(num_folders);
        for _ in 0..num_folders {
            let entry =
                parse_folder_entry(&mut reader, folder_reserve_size as usize)?;
            folders.push(entry);
        }
        reader.seek(SeekFrom::Start(first_file_offset as u64))?;
        let mut files = Vec::with_capacity(num_files);
        for _ in 0..num_files {
            let entry = parse_file_entry(&mut reader)?;
            if entry.folder_index as usize >= folders.len() {
                invalid_data!(
                    "File entry {:?} refers to folder {} (cabinet has {})",
                    entry.name(),
                    entry.folder_index,
                    folders.len()
                );
            }
            files.push(entry);
        }
        Ok(Cabinet { reader, data_reserve_size, folders, files })
    }

    /// Returns the number of folders in this cabinet.
    pub fn folder_count(&self) -> usize {
        self.folders.len()
    }

    /// Returns an iterator over the file entries, in header order.
    pub fn file_entries(&self) -> slice::Iter<'_, FileEntry> {
        self.files.iter()
    }

    /// Decompresses every member and passes it to `sink` along with its
    /// entry.
    ///
    /// Folders are visited in order and each one is decoded in a single
    /// pass; members within a folder are visited by increasing offset.  The
    /// reader handed to `sink` yields exactly the member's bytes; anything
    /// the sink leaves unread is skipped.
    pub fn for_each_file<F>(&mut self, mut sink: F) -> io::Result<()>
    where
        F: FnMut(&FileEntry, &mut dyn Read) -> io::Result<()>,
    {
        for (index, folder) in self.folders.iter().enumerate() {
            let mut members: Vec<&FileEntry> = self
                .files
                .iter()
                .filter(|file| file.folder_index as usize == index)
                .collect();
            if members.is_empty() {
                continue;
            }
            members.sort_by_key(|file| file.uncompressed_offset);

            let mut folder_reader = FolderReader::new(
                &mut self.reader,
                folder,
                self.data_reserve_size,
            )?;
            let mut position = 0u64;
            for entry in members {
                let start = entry.uncompressed_offset as u64;
                if start < position {
                    invalid_data!(
                        "File {:?} overlaps the previous file in folder {}",
                        entry.name(),
                        index
                    );
                }
                let gap = start - position;
                let skipped = io::copy(
                    &mut (&mut folder_reader).take(gap),
                    &mut io::sink(),
                )?;
                if skipped != gap {
                    invalid_data!(
                        "File {:?} starts past the end of folder {}",
                        entry.name(),
                        index
                    );
                }
                let size = entry.uncompressed_size() as u64;
                let mut data = (&mut folder_reader).take(size);
                sink(entry, &mut data)?;
                io::copy(&mut data, &mut io::sink())?;
                if data.limit() != 0 {
                    invalid_data!(
                        "File {:?} is truncated ({} of {} bytes present)",
                        entry.name(),
                        size - data.limit(),
                        size
                    );
                }
                position = start + size;
            }
        }
        Ok(())
    }
}
