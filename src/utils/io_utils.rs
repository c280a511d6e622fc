//! I/O helpers for module archives on disk.
//!
//! # Examples
//!
//! ```no_run
//! use regex::Regex;
//! use sword::utils::io_utils::{bytes_from_file, scan_dir};
//!
//! let pattern = Regex::new(r"(?i)\.zip$")?;
//! for path in scan_dir("/usr/share/sword/bibles", &pattern, false)? {
//!     let archive = bytes_from_file(&path)?;
//!     println!("{}: {} bytes", path.display(), archive.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use regex::Regex;
use walkdir::WalkDir;

use crate::{Result, SwordError};

/// Converts Windows-style backslashes to forward slashes.
///
/// Archives written on Windows may store entry names this way.
pub fn windows_path_to_unix_path(path: &str) -> String {
    path.replace('\\', "/")
}

/// Reads all bytes from a file path.
pub fn bytes_from_file<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;
    Ok(buffer)
}

/// Scans a directory for files whose name matches `pattern`.
///
/// # Arguments
/// * `target_dir` - The directory to scan
/// * `pattern` - A regex pattern to match file names against
/// * `recursive` - Whether to scan subdirectories recursively
///
/// # Returns
/// The matching paths, sorted so repeated scans load modules in the same order.
pub fn scan_dir<P: AsRef<Path>>(target_dir: P, pattern: &Regex, recursive: bool) -> Result<Vec<PathBuf>> {
    let walker = if recursive {
        WalkDir::new(&target_dir).follow_links(true)
    } else {
        WalkDir::new(&target_dir).follow_links(true).max_depth(1)
    };

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| SwordError::invalid_parameter(format!("Walk directory error: {}", e)))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let file_name = entry
            .file_name()
            .to_str()
            .ok_or_else(|| SwordError::invalid_parameter("Invalid file name encoding"))?;
        if pattern.is_match(file_name) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}
