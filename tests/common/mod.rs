//! Builders for synthetic module archives.
#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{Cursor, Write};

use flate2::write::DeflateEncoder;
use flate2::Compression;
use sword::{Canon, Testament};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Zips `(name, bytes)` entries into an in-memory archive.
pub fn zip_archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::<()>::default().compression_method(CompressionMethod::Deflated);
    for (name, bytes) in entries {
        zip.start_file(*name, options).unwrap();
        zip.write_all(bytes).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

/// Raw DEFLATE stream of `data`.
pub fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

pub fn bzip2(data: &[u8]) -> Vec<u8> {
    let mut encoder = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

pub fn xz(data: &[u8]) -> Vec<u8> {
    let mut compressed = Vec::new();
    lzma_rs::xz_compress(&mut Cursor::new(data), &mut compressed).unwrap();
    compressed
}

/// One compressed testament: block table, verse table and blob.
///
/// Verses not given a record are written as all-zero records.
#[derive(Default)]
pub struct CompressedTestament {
    blocks: Vec<(Vec<u8>, u32)>,
    records: HashMap<(String, u32, u32), (u16, u32, u16)>,
}

impl CompressedTestament {
    /// Adds a block holding `text` compressed with `compress`, returning its number.
    pub fn add_block(&mut self, text: &[u8], compress: fn(&[u8]) -> Vec<u8>) -> u16 {
        self.blocks.push((compress(text), text.len() as u32));
        (self.blocks.len() - 1) as u16
    }

    /// Places a verse at `start..start+length` of an inflated block.
    pub fn verse(&mut self, book: &str, chapter: u32, verse: u32, block: u16, start: u32, length: u16) -> &mut Self {
        self.records.insert((book.to_string(), chapter, verse), (block, start, length));
        self
    }

    /// Writes one chapter into its own block: a `[Book Chapter]` heading, then
    /// each verse's text. `None` verses get an all-zero record.
    pub fn add_chapter(
        &mut self,
        book: &str,
        chapter: u32,
        verses: &[Option<String>],
        compress: fn(&[u8]) -> Vec<u8>,
    ) -> u16 {
        let block = self.blocks.len() as u16;
        let mut text = format!("[{} {}]", book, chapter).into_bytes();
        for (verse, content) in (1u32..).zip(verses) {
            if let Some(content) = content {
                self.verse(book, chapter, verse, block, text.len() as u32, content.len() as u16);
                text.extend_from_slice(content.as_bytes());
            }
        }
        self.add_block(&text, compress)
    }

    /// `(block table, verse table, blob)` for the testament.
    pub fn build(&self, testament: Testament) -> (Vec<u8>, Vec<u8>, Vec<u8>) {
        let mut block_table = Vec::new();
        let mut blob = Vec::new();
        for (compressed, uncompressed_length) in &self.blocks {
            block_table.extend((blob.len() as i32).to_le_bytes());
            block_table.extend((compressed.len() as i32).to_le_bytes());
            block_table.extend(uncompressed_length.to_le_bytes());
            blob.extend_from_slice(compressed);
        }

        let mut verse_table = vec![0u8; 40];
        for (book, info) in Canon::book_infos("kjv", testament).unwrap() {
            for (chapter, &verse_max) in (1u32..).zip(&info.max_verses) {
                if verse_max == 0 {
                    continue;
                }
                for verse in 1..=verse_max {
                    let (block, start, length) = self
                        .records
                        .get(&(book.clone(), chapter, verse))
                        .copied()
                        .unwrap_or((0, 0, 0));
                    verse_table.extend(block.to_le_bytes());
                    verse_table.extend([0u8, 0]);
                    verse_table.extend(start.to_le_bytes());
                    verse_table.extend(length.to_le_bytes());
                }
                verse_table.extend([0u8; 10]);
            }
            verse_table.extend([0u8; 10]);
        }
        (block_table, verse_table, blob)
    }
}

/// Conf text for a module.
pub fn conf(modname: &str, lines: &[&str]) -> Vec<u8> {
    let mut text = format!("[{}]\n", modname);
    for line in lines {
        text.push_str(line);
        text.push('\n');
    }
    text.into_bytes()
}

/// Per-verse table for a raw testament; `long` selects 4-byte lengths.
pub fn raw_verse_table(testament: Testament, long: bool, records: &HashMap<String, (u32, u32)>) -> Vec<u8> {
    let record_size = if long { 8 } else { 6 };
    let mut table = vec![0u8; record_size * 2];
    for (book, info) in Canon::book_infos("kjv", testament).unwrap() {
        table.extend(vec![0u8; record_size]);
        for (chapter, &verse_max) in (1u32..).zip(&info.max_verses) {
            table.extend(vec![0u8; record_size]);
            for verse in 1..=verse_max {
                let key = format!("{}.{}:{}", book, chapter, verse);
                let (start, length) = records.get(&key).copied().unwrap_or((0, 0));
                table.extend(start.to_le_bytes());
                if long {
                    table.extend(length.to_le_bytes());
                } else {
                    table.extend((length as u16).to_le_bytes());
                }
            }
        }
    }
    table
}

/// `(idx, dat)` for a flat dictionary with 8-byte records.
pub fn dictionary(entries: &[(&str, &str)]) -> (Vec<u8>, Vec<u8>) {
    let mut idx = Vec::new();
    let mut dat = Vec::new();
    for (key, text) in entries {
        let start = dat.len() as u32;
        dat.extend_from_slice(key.as_bytes());
        dat.extend_from_slice(b"\r\n");
        dat.extend_from_slice(text.as_bytes());
        idx.extend(start.to_le_bytes());
        idx.extend((dat.len() as u32 - start).to_le_bytes());
    }
    (idx, dat)
}
