// Utility functions and helpers
//
// This module provides block decompression, file and directory I/O and
// progress reporting.

pub mod io_utils;
pub mod progress_report;
pub mod compression;

pub use io_utils::{bytes_from_file, scan_dir, windows_path_to_unix_path};
pub use progress_report::{ProgressState, ProgressReportFn};
pub use compression::{CompressionMethod, Decompressor, get_decompressor};
