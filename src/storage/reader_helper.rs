//! Helper functions for reading index tables and decoding module text.
//!
//! This module provides utility functions for:
//! - Bounds-checked little-endian reads over fixed-stride index tables
//! - Resolving a conf `Encoding` label to an `encoding_rs` encoding
//! - Decoding text slices with that encoding

use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt};
use encoding_rs::Encoding;
use log::{debug, warn};

use crate::{Result, SwordError};

/// Encoding applied when a module declares none.
pub const DEFAULT_ENCODING: &Encoding = encoding_rs::WINDOWS_1252;

/// Gets an encoding object by its conf label.
///
/// SWORD confs say `UTF-8` or `Latin-1`; anything `encoding_rs` knows by
/// WHATWG label is accepted as well.
///
/// # Errors
///
/// Returns an error if the encoding label is not recognized.
pub fn get_encoding_object_by_label(label: &str) -> Result<&'static Encoding> {
    let encoding = label.trim().to_lowercase();
    let label = match encoding.as_str() {
        "latin-1" | "latin_1" | "cp-1252" => "windows-1252",
        "utf-16" => "utf-16le",
        _ => encoding.as_str(),
    };
    Encoding::for_label(label.as_bytes())
        .ok_or_else(|| SwordError::invalid_parameter(format!("Invalid encoding: {}", encoding)))
}

/// Resolves an optional label, falling back to windows-1252.
pub fn resolve_encoding(label: Option<&str>) -> &'static Encoding {
    match label {
        None => DEFAULT_ENCODING,
        Some(label) => get_encoding_object_by_label(label).unwrap_or_else(|e| {
            warn!("{}, decoding as {}", e, DEFAULT_ENCODING.name());
            DEFAULT_ENCODING
        }),
    }
}

/// Decodes bytes to a string using the specified encoding.
///
/// Malformed sequences are replaced rather than rejected.
pub fn decode_bytes_to_string(bytes: &[u8], encoding_obj: &'static Encoding) -> String {
    let (decoded, _, had_errors) = encoding_obj.decode(bytes);
    if had_errors {
        debug!("Decoding error with: {}", encoding_obj.name());
    }
    decoded.into_owned()
}

/// Bounds-checked reader over one fixed-stride index table.
///
/// Skips only move the position; a read past the end fails with
/// `CorruptIndex` naming the table and the offending offset.
pub struct IndexCursor<'a> {
    cursor: Cursor<&'a [u8]>,
    table: &'static str,
}

impl<'a> IndexCursor<'a> {
    pub fn new(data: &'a [u8], table: &'static str) -> Self {
        Self { cursor: Cursor::new(data), table }
    }

    /// Starts reading at `offset` (usually past a header).
    pub fn at(data: &'a [u8], table: &'static str, offset: u64) -> Self {
        let mut reader = Self::new(data, table);
        reader.skip(offset);
        reader
    }

    #[inline]
    pub fn position(&self) -> u64 {
        self.cursor.position()
    }

    #[inline]
    pub fn len(&self) -> u64 {
        self.cursor.get_ref().len() as u64
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cursor.get_ref().is_empty()
    }

    #[inline]
    pub fn remaining(&self) -> u64 {
        self.len().saturating_sub(self.position())
    }

    #[inline]
    pub fn skip(&mut self, count: u64) {
        let position = self.cursor.position().saturating_add(count);
        self.cursor.set_position(position);
    }

    fn out_of_bounds(&self, width: u64) -> SwordError {
        SwordError::corrupt_index(format!(
            "{}: reading {} bytes at offset {} past end of {}-byte table",
            self.table,
            width,
            self.position(),
            self.len()
        ))
    }

    #[inline]
    pub fn read_u16(&mut self) -> Result<u16> {
        let position = self.position();
        self.cursor.read_u16::<LittleEndian>().map_err(|_| {
            self.cursor.set_position(position);
            self.out_of_bounds(2)
        })
    }

    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> {
        let position = self.position();
        self.cursor.read_u32::<LittleEndian>().map_err(|_| {
            self.cursor.set_position(position);
            self.out_of_bounds(4)
        })
    }

    #[inline]
    pub fn read_i32(&mut self) -> Result<i32> {
        let position = self.position();
        self.cursor.read_i32::<LittleEndian>().map_err(|_| {
            self.cursor.set_position(position);
            self.out_of_bounds(4)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding_labels() {
        assert_eq!(get_encoding_object_by_label("UTF-8").unwrap(), encoding_rs::UTF_8);
        assert_eq!(get_encoding_object_by_label("Latin-1").unwrap(), encoding_rs::WINDOWS_1252);
        assert_eq!(get_encoding_object_by_label("CP1252").unwrap(), encoding_rs::WINDOWS_1252);
        assert!(get_encoding_object_by_label("SCSU").is_err());
        assert_eq!(resolve_encoding(Some("SCSU")), DEFAULT_ENCODING);
        assert_eq!(resolve_encoding(None), DEFAULT_ENCODING);
    }

    #[test]
    fn test_decode_latin1() {
        let text = decode_bytes_to_string(&[0x63, 0x61, 0x66, 0xE9], encoding_rs::WINDOWS_1252);
        assert_eq!(text, "café");
    }

    #[test]
    fn test_cursor_bounds() {
        let data = [0x01, 0x00, 0x02, 0x00, 0x00, 0x00, 0xFF];
        let mut reader = IndexCursor::new(&data, "test.idx");
        assert_eq!(reader.read_u16().unwrap(), 1);
        assert_eq!(reader.read_u32().unwrap(), 2);
        let err = reader.read_u16().unwrap_err();
        assert!(matches!(err, SwordError::CorruptIndex { .. }));
        assert!(err.to_string().contains("test.idx"));

        let mut reader = IndexCursor::at(&data, "test.idx", 100);
        assert_eq!(reader.remaining(), 0);
        assert!(reader.read_u32().is_err());
    }
}
