#![allow(dead_code)]

use std::io::{Cursor, Read, Write};
use std::path::Path;

use appstream_cab::Cancellable;
use rand::{RngCore, SeedableRng};

// ========================================================================= //

/// Builds a single-folder cabinet holding `files` in order.
pub fn build_cab(
    compression: cab::CompressionType,
    files: &[(&str, &[u8])],
) -> Vec<u8> {
    let mut cab_builder = cab::CabinetBuilder::new();
    {
        let folder_builder = cab_builder.add_folder(compression);
        for &(name, _) in files {
            folder_builder.add_file(name);
        }
    }
    let mut cab_writer = cab_builder.build(Cursor::new(Vec::new())).unwrap();
    let mut index = 0;
    while let Some(mut file_writer) = cab_writer.next_file().unwrap() {
        file_writer.write_all(files[index].1).unwrap();
        index += 1;
    }
    cab_writer.finish().unwrap().into_inner()
}

pub fn build_uncompressed_cab(files: &[(&str, &[u8])]) -> Vec<u8> {
    build_cab(cab::CompressionType::None, files)
}

/// A firmware component with one release whose body is `release_body`.
pub fn metainfo(id: &str, release_body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<component type="firmware">
  <id>{}</id>
  <name>Test Device</name>
  <summary>Firmware for the test device</summary>
  <releases>
    <release version="1.2.3" timestamp="1424116753">
{}
    </release>
  </releases>
</component>
"#,
        id, release_body
    )
}

pub fn content_checksum(filename: &str) -> String {
    format!(
        r#"      <checksum filename="{}" target="content" type="sha1"/>"#,
        filename
    )
}

pub fn random_bytes(seed: u64, size: usize) -> Vec<u8> {
    let mut data = vec![0u8; size];
    rand::rngs::SmallRng::seed_from_u64(seed).fill_bytes(&mut data);
    data
}

/// Number of entries directly inside `dir`.
pub fn entry_count(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

// ========================================================================= //

/// Returns one chunk of data per read and trips a token after the first.
pub struct CancelAfterFirstRead {
    pub data: Vec<u8>,
    pub offset: usize,
    pub token: Cancellable,
}

impl Read for CancelAfterFirstRead {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let count = buf.len().min(self.data.len() - self.offset);
        buf[..count].copy_from_slice(&self.data[self.offset..][..count]);
        self.offset += count;
        self.token.cancel();
        Ok(count)
    }
}
