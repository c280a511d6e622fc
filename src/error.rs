//! Error types and result type for the sword crate.
//!
//! This module defines all error variants that can occur while loading a SWORD
//! module archive, building its position tables and retrieving text from it.
//! It uses the `snafu` library for ergonomic error handling with automatic
//! backtrace capture.
//!
//! # Examples
//!
//! ```
//! use sword::{Result, SwordError};
//!
//! fn open_module() -> Result<String> {
//!     Err(SwordError::conf_not_found())
//! }
//!
//! match open_module() {
//!     Ok(name) => println!("Loaded {}", name),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```
//!
//! # Error Variants
//!
//! Load-time failures (fatal to that load, no module is produced):
//! - [`SwordError::Archive`], [`SwordError::ConfNotFound`], [`SwordError::ModuleNameMissing`]
//! - [`SwordError::UnsupportedDriver`], [`SwordError::IncompleteModule`]
//! - [`SwordError::MalformedConf`], [`SwordError::CorruptIndex`], [`SwordError::CanonNotFound`]
//!
//! Query-time failures (the module stays usable):
//! - [`SwordError::DecompressionError`], [`SwordError::ChapterNotFound`], [`SwordError::ReferenceNotFound`]
//! - [`SwordError::UnknownBook`], [`SwordError::ChapterOutOfRange`], [`SwordError::MalformedReference`]

use std::io;
use snafu::{Snafu, Backtrace};

// Re-export snafu for context providers
pub use snafu;

/// Main error type for the sword crate.
///
/// All errors include automatic backtrace capture for debugging purposes.
/// Use the helper methods on `SwordError` for convenient error construction.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum SwordError {
    /// I/O error occurred during file operations.
    #[snafu(display("IO error: {source}"))]
    Io {
        source: io::Error,
        backtrace: Backtrace,
    },

    /// Error parsing JSON data (reference overlays, library configuration).
    #[snafu(display("Parser error: {source}"))]
    ParserError {
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
        backtrace: Backtrace,
    },

    /// The module archive could not be opened or an entry could not be inflated.
    #[snafu(display("Archive error: {source}"))]
    Archive {
        source: zip::result::ZipError,
        backtrace: Backtrace,
    },

    /// The archive holds no `.conf` entry.
    #[snafu(display("Conf file not found in module archive"))]
    ConfNotFound {
        backtrace: Backtrace,
    },

    /// The conf file has no `[ModuleName]` section header.
    #[snafu(display("Module name not found in conf file"))]
    ModuleNameMissing {
        backtrace: Backtrace,
    },

    /// The conf bytes could not be decoded as text.
    #[snafu(display("Malformed conf: {message}"))]
    MalformedConf {
        message: String,
        backtrace: Backtrace,
    },

    /// The declared driver (or block compression) is not one this crate reads.
    #[snafu(display("Unsupported driver: {driver}"))]
    UnsupportedDriver {
        driver: String,
        backtrace: Backtrace,
    },

    /// A companion file required by the driver is missing from the archive.
    #[snafu(display("Incomplete module: {message}"))]
    IncompleteModule {
        message: String,
        backtrace: Backtrace,
    },

    /// The versification scheme, or one of its testaments, is unknown.
    #[snafu(display("Canon not found: {name}"))]
    CanonNotFound {
        name: String,
        backtrace: Backtrace,
    },

    /// A fixed-stride index walk ran past the end of its buffer.
    #[snafu(display("Corrupt index: {message}"))]
    CorruptIndex {
        message: String,
        backtrace: Backtrace,
    },

    /// A compressed text block failed to inflate.
    #[snafu(display("Decompression error: {message}"))]
    DecompressionError {
        message: String,
        backtrace: Backtrace,
    },

    /// The requested book has no entry in the module's position table.
    #[snafu(display("Reference not found: {reference}"))]
    ReferenceNotFound {
        reference: String,
        backtrace: Backtrace,
    },

    /// The requested chapter has no entry in the book's chapter index.
    #[snafu(display("Chapter not found: {book}.{chapter}"))]
    ChapterNotFound {
        book: String,
        chapter: u32,
        backtrace: Backtrace,
    },

    /// The book abbreviation is not part of the versification scheme.
    #[snafu(display("Unknown book {book} in canon {scheme}"))]
    UnknownBook {
        book: String,
        scheme: String,
        backtrace: Backtrace,
    },

    /// The chapter number exceeds the book's declared chapter count.
    #[snafu(display("Chapter {chapter} out of range for {book} (max {max_chapter})"))]
    ChapterOutOfRange {
        book: String,
        chapter: u32,
        max_chapter: u32,
        backtrace: Backtrace,
    },

    /// The reference string does not match `Book.Chapter[:verses]`.
    #[snafu(display("Malformed reference: {reference}"))]
    MalformedReference {
        reference: String,
        backtrace: Backtrace,
    },

    /// Function was called with invalid parameters.
    #[snafu(display("Invalid parameter: {message}"))]
    InvalidParameter {
        message: String,
        backtrace: Backtrace,
    },

    /// Operation was interrupted by user.
    #[snafu(display("User interrupted"))]
    UserInterrupted {
        backtrace: Backtrace,
    },
}

// For automatic conversions from standard error types
impl From<io::Error> for SwordError {
    fn from(source: io::Error) -> Self {
        Self::Io { source, backtrace: Backtrace::capture() }
    }
}

impl From<zip::result::ZipError> for SwordError {
    fn from(source: zip::result::ZipError) -> Self {
        Self::Archive { source, backtrace: Backtrace::capture() }
    }
}

impl From<serde_json::Error> for SwordError {
    fn from(source: serde_json::Error) -> Self {
        Self::ParserError {
            source: Box::new(source),
            backtrace: Backtrace::capture(),
        }
    }
}

impl From<regex::Error> for SwordError {
    fn from(source: regex::Error) -> Self {
        Self::ParserError {
            source: Box::new(source),
            backtrace: Backtrace::capture(),
        }
    }
}

/// Helper methods for creating errors without context providers.
impl SwordError {
    /// Creates an `InvalidParameter` error with the given message.
    ///
    /// # Examples
    ///
    /// ```
    /// use sword::SwordError;
    ///
    /// let error = SwordError::invalid_parameter("Path cannot be empty");
    /// ```
    pub fn invalid_parameter<S: Into<String>>(message: S) -> Self {
        Self::InvalidParameter {
            message: message.into(),
            backtrace: Backtrace::capture(),
        }
    }

    pub fn conf_not_found() -> Self {
        Self::ConfNotFound { backtrace: Backtrace::capture() }
    }

    pub fn module_name_missing() -> Self {
        Self::ModuleNameMissing { backtrace: Backtrace::capture() }
    }

    pub fn malformed_conf<S: Into<String>>(message: S) -> Self {
        Self::MalformedConf {
            message: message.into(),
            backtrace: Backtrace::capture(),
        }
    }

    pub fn unsupported_driver<S: Into<String>>(driver: S) -> Self {
        Self::UnsupportedDriver {
            driver: driver.into(),
            backtrace: Backtrace::capture(),
        }
    }

    pub fn incomplete_module<S: Into<String>>(message: S) -> Self {
        Self::IncompleteModule {
            message: message.into(),
            backtrace: Backtrace::capture(),
        }
    }

    pub fn canon_not_found<S: Into<String>>(name: S) -> Self {
        Self::CanonNotFound {
            name: name.into(),
            backtrace: Backtrace::capture(),
        }
    }

    /// Creates a `CorruptIndex` error with the given message.
    pub fn corrupt_index<S: Into<String>>(message: S) -> Self {
        Self::CorruptIndex {
            message: message.into(),
            backtrace: Backtrace::capture(),
        }
    }

    /// Creates a `DecompressionError` for inflate failures.
    pub fn decompression_error<S: Into<String>>(message: S) -> Self {
        Self::DecompressionError {
            message: message.into(),
            backtrace: Backtrace::capture(),
        }
    }

    pub fn reference_not_found<S: Into<String>>(reference: S) -> Self {
        Self::ReferenceNotFound {
            reference: reference.into(),
            backtrace: Backtrace::capture(),
        }
    }

    pub fn chapter_not_found<S: Into<String>>(book: S, chapter: u32) -> Self {
        Self::ChapterNotFound {
            book: book.into(),
            chapter,
            backtrace: Backtrace::capture(),
        }
    }

    pub fn unknown_book<S: Into<String>, T: Into<String>>(book: S, scheme: T) -> Self {
        Self::UnknownBook {
            book: book.into(),
            scheme: scheme.into(),
            backtrace: Backtrace::capture(),
        }
    }

    pub fn chapter_out_of_range<S: Into<String>>(book: S, chapter: u32, max_chapter: u32) -> Self {
        Self::ChapterOutOfRange {
            book: book.into(),
            chapter,
            max_chapter,
            backtrace: Backtrace::capture(),
        }
    }

    pub fn malformed_reference<S: Into<String>>(reference: S) -> Self {
        Self::MalformedReference {
            reference: reference.into(),
            backtrace: Backtrace::capture(),
        }
    }

    /// Creates a `UserInterrupted` error.
    pub fn user_interrupted() -> Self {
        Self::UserInterrupted {
            backtrace: Backtrace::capture(),
        }
    }

    /// Checks if this error only means "the module has no text for this request".
    ///
    /// These are raised per query and never invalidate the module.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            SwordError::ReferenceNotFound { .. } | SwordError::ChapterNotFound { .. }
        )
    }

    /// Checks if this error came from parsing a caller-supplied reference.
    pub fn is_reference_error(&self) -> bool {
        matches!(
            self,
            SwordError::UnknownBook { .. }
                | SwordError::ChapterOutOfRange { .. }
                | SwordError::MalformedReference { .. }
        )
    }
}

/// A specialized `Result` type for sword operations.
///
/// This is a convenience type alias that uses [`SwordError`] as the error type.
pub type Result<T> = std::result::Result<T, SwordError>;
