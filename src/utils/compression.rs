//! Block decompression for compressed (zText/zCom) modules.
//!
//! This module provides a unified interface over the block compressions a
//! module can declare in its conf's `CompressType`:
//! - `ZIP`: DEFLATE (the default)
//! - `BZIP2`: Bzip2
//! - `XZ`: XZ/LZMA2

use std::io::{Cursor, Read};

use flate2::read::{DeflateDecoder, ZlibDecoder};
use crate::{SwordError, Result};

/// Compression methods a compressed module's text blocks may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionMethod {
    /// DEFLATE (conf `CompressType=ZIP`)
    #[default]
    Deflate,
    /// Bzip2 (conf `CompressType=BZIP2`)
    Bzip2,
    /// XZ (conf `CompressType=XZ`)
    Xz,
}

impl CompressionMethod {
    /// Maps a conf `CompressType` value; absent means `ZIP`.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedDriver` for compressions this crate cannot inflate (e.g. `LZSS`).
    pub fn from_conf_label(label: Option<&str>) -> Result<Self> {
        match label.map(|l| l.trim().to_uppercase()).as_deref() {
            None | Some("") | Some("ZIP") => Ok(CompressionMethod::Deflate),
            Some("BZIP2") => Ok(CompressionMethod::Bzip2),
            Some("XZ") => Ok(CompressionMethod::Xz),
            Some(other) => Err(SwordError::unsupported_driver(format!("CompressType={}", other))),
        }
    }
}

/// Upper bound on the expansion ratio trusted when pre-allocating output.
const MAX_PREALLOCATED_RATIO: usize = 16;

/// Capacity to reserve for inflating `compressed_len` bytes that claim to
/// expand to `declared_len`.
///
/// Declared sizes come from the archive itself, so they are clamped; the
/// output buffer still grows past this if the data really is larger.
pub(crate) fn preallocation(compressed_len: usize, declared_len: u64) -> usize {
    let declared_len = usize::try_from(declared_len).unwrap_or(usize::MAX);
    declared_len.min(compressed_len.saturating_mul(MAX_PREALLOCATED_RATIO))
}

/// Common interface for block decompression.
pub trait Decompressor {
    /// Decompresses one block.
    ///
    /// # Arguments
    ///
    /// * `data` - The compressed block
    /// * `size_hint` - Declared decompressed size, used only to pre-allocate (clamped)
    ///
    /// # Errors
    ///
    /// Returns `DecompressionError` if the stream is corrupt or truncated.
    fn decompress(&self, data: &[u8], size_hint: usize) -> Result<Vec<u8>>;
}

/// DEFLATE implementation.
///
/// Blocks are raw DEFLATE streams; a block that opens with a valid zlib
/// header is read through the zlib wrapper instead.
pub struct DeflateDecompressor;

impl DeflateDecompressor {
    fn has_zlib_header(data: &[u8]) -> bool {
        match data {
            [cmf, flg, ..] => {
                cmf & 0x0F == 8 && cmf >> 4 <= 7 && ((*cmf as u16) << 8 | *flg as u16) % 31 == 0
            }
            _ => false,
        }
    }
}

impl Decompressor for DeflateDecompressor {
    fn decompress(&self, data: &[u8], size_hint: usize) -> Result<Vec<u8>> {
        let mut decompressed = Vec::with_capacity(preallocation(data.len(), size_hint as u64));
        let result = if Self::has_zlib_header(data) {
            ZlibDecoder::new(data).read_to_end(&mut decompressed)
        } else {
            DeflateDecoder::new(data).read_to_end(&mut decompressed)
        };
        result.map_err(|e| SwordError::decompression_error(format!("Inflate error: {}", e)))?;
        Ok(decompressed)
    }
}

pub struct Bzip2Decompressor;

impl Decompressor for Bzip2Decompressor {
    fn decompress(&self, data: &[u8], size_hint: usize) -> Result<Vec<u8>> {
        let mut decoder = bzip2::read::BzDecoder::new(data);
        let mut decompressed = Vec::with_capacity(preallocation(data.len(), size_hint as u64));
        decoder.read_to_end(&mut decompressed)
            .map_err(|e| SwordError::decompression_error(format!("Bzip2 Err:{}", e)))?;
        Ok(decompressed)
    }
}

pub struct XzDecompressor;

impl Decompressor for XzDecompressor {
    fn decompress(&self, data: &[u8], size_hint: usize) -> Result<Vec<u8>> {
        let mut decompressed = Vec::with_capacity(preallocation(data.len(), size_hint as u64));
        lzma_rs::xz_decompress(&mut Cursor::new(data), &mut decompressed)
            .map_err(|e| SwordError::decompression_error(format!("Xz Err:{}", e)))?;
        Ok(decompressed)
    }
}

pub fn get_decompressor(method: CompressionMethod) -> Box<dyn Decompressor> {
    match method {
        CompressionMethod::Deflate => Box::new(DeflateDecompressor),
        CompressionMethod::Bzip2 => Box::new(Bzip2Decompressor),
        CompressionMethod::Xz => Box::new(XzDecompressor),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use flate2::write::{DeflateEncoder, ZlibEncoder};
    use flate2::Compression;

    use super::*;

    const TEXT: &[u8] = b"In the beginning God created the heaven and the earth.";

    #[test]
    fn test_conf_labels() {
        assert_eq!(CompressionMethod::from_conf_label(None).unwrap(), CompressionMethod::Deflate);
        assert_eq!(CompressionMethod::from_conf_label(Some("ZIP")).unwrap(), CompressionMethod::Deflate);
        assert_eq!(CompressionMethod::from_conf_label(Some("bzip2")).unwrap(), CompressionMethod::Bzip2);
        assert_eq!(CompressionMethod::from_conf_label(Some("XZ")).unwrap(), CompressionMethod::Xz);
        assert!(matches!(
            CompressionMethod::from_conf_label(Some("LZSS")),
            Err(SwordError::UnsupportedDriver { .. })
        ));
    }

    #[test]
    fn test_raw_and_zlib_deflate() {
        let mut raw = DeflateEncoder::new(Vec::new(), Compression::default());
        raw.write_all(TEXT).unwrap();
        let raw = raw.finish().unwrap();

        let mut wrapped = ZlibEncoder::new(Vec::new(), Compression::default());
        wrapped.write_all(TEXT).unwrap();
        let wrapped = wrapped.finish().unwrap();

        let decompressor = get_decompressor(CompressionMethod::Deflate);
        assert_eq!(decompressor.decompress(&raw, TEXT.len()).unwrap(), TEXT);
        assert_eq!(decompressor.decompress(&wrapped, TEXT.len()).unwrap(), TEXT);
    }

    #[test]
    fn test_bzip2_and_xz() {
        let mut bz = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::default());
        bz.write_all(TEXT).unwrap();
        let bz = bz.finish().unwrap();
        assert_eq!(get_decompressor(CompressionMethod::Bzip2).decompress(&bz, 0).unwrap(), TEXT);

        let mut xz = Vec::new();
        lzma_rs::xz_compress(&mut Cursor::new(TEXT), &mut xz).unwrap();
        assert_eq!(get_decompressor(CompressionMethod::Xz).decompress(&xz, 0).unwrap(), TEXT);
    }

    #[test]
    fn test_corrupt_block() {
        let garbage = [0xFFu8; 16];
        let err = get_decompressor(CompressionMethod::Deflate).decompress(&garbage, 0).unwrap_err();
        assert!(matches!(err, SwordError::DecompressionError { .. }));
    }

    #[test]
    fn test_declared_size_is_not_trusted() {
        assert_eq!(preallocation(100, 400), 400);
        assert_eq!(preallocation(100, u64::MAX), 1600);
        assert_eq!(preallocation(0, 1 << 40), 0);

        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(TEXT).unwrap();
        let compressed = encoder.finish().unwrap();
        for method in [CompressionMethod::Deflate, CompressionMethod::Bzip2, CompressionMethod::Xz] {
            let decompressor = get_decompressor(method);
            // a bogus block-table length must not drive the allocation
            let result = decompressor.decompress(&compressed, usize::MAX);
            if method == CompressionMethod::Deflate {
                assert_eq!(result.unwrap(), TEXT);
            } else {
                assert!(matches!(result, Err(SwordError::DecompressionError { .. })));
            }
        }
    }
}
