//! Versification schemes: book order, chapter counts and verse counts.
//!
//! The tables are bundled JSON assets decoded once, on first use, into
//! process-wide read-only state. Only lookups are exposed.
//!
//! # Examples
//!
//! ```
//! use sword::canon::{Canon, Testament};
//!
//! let genesis = Canon::book_info("kjv", "Gen")?;
//! assert_eq!(genesis.max_chapter, 50);
//! assert_eq!(genesis.max_verses[0], 31);
//!
//! let nt = Canon::book_infos("nrsv", Testament::Nt)?;
//! assert_eq!(nt.keys().next().map(String::as_str), Some("Matt"));
//! # Ok::<(), sword::SwordError>(())
//! ```

use std::fmt;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::{Result, SwordError};

/// One half of a canon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Testament {
    Ot,
    Nt,
}

impl Testament {
    pub fn as_str(&self) -> &'static str {
        match self {
            Testament::Ot => "ot",
            Testament::Nt => "nt",
        }
    }
}

impl fmt::Display for Testament {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Chapter and verse layout of one book.
///
/// `max_verses.len() == max_chapter`. A zero verse count marks a chapter that
/// is structurally absent but still occupies its slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookInfo {
    pub name: String,
    pub max_chapter: u32,
    pub max_verses: Vec<u32>,
}

impl BookInfo {
    /// Verse count of a 1-based chapter, `None` when the chapter is past the end.
    pub fn verse_count(&self, chapter: u32) -> Option<u32> {
        let index = chapter.checked_sub(1)?;
        self.max_verses.get(index as usize).copied()
    }
}

/// A named versification scheme.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonScheme {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub ot: IndexMap<String, BookInfo>,
    #[serde(default)]
    pub nt: IndexMap<String, BookInfo>,
}

impl CanonScheme {
    pub fn testament(&self, testament: Testament) -> &IndexMap<String, BookInfo> {
        match testament {
            Testament::Ot => &self.ot,
            Testament::Nt => &self.nt,
        }
    }

    /// Iterates books in canon order: old testament, then new.
    pub fn books(&self) -> impl Iterator<Item = (&String, &BookInfo)> {
        self.ot.iter().chain(self.nt.iter())
    }
}

/// Schemes without new testament books (`mt`, `leningrad`) omit the `nt` key.
const BUNDLED_SCHEMES: &[(&str, &str)] = &[
    ("kjv", include_str!("data/kjv.json")),
    ("kjva", include_str!("data/kjva.json")),
    ("german", include_str!("data/german.json")),
    ("catholic", include_str!("data/catholic.json")),
    ("catholic2", include_str!("data/catholic2.json")),
    ("leningrad", include_str!("data/leningrad.json")),
    ("luther", include_str!("data/luther.json")),
    ("lxx", include_str!("data/lxx.json")),
    ("mt", include_str!("data/mt.json")),
    ("nrsv", include_str!("data/nrsv.json")),
    ("nrsva", include_str!("data/nrsva.json")),
    ("orthodox", include_str!("data/orthodox.json")),
    ("synodal", include_str!("data/synodal.json")),
    ("synodalprot", include_str!("data/synodalprot.json")),
    ("vulg", include_str!("data/vulg.json")),
];

static CANONS: Lazy<IndexMap<&'static str, CanonScheme>> = Lazy::new(|| {
    BUNDLED_SCHEMES
        .iter()
        .map(|(name, json)| {
            let mut scheme: CanonScheme =
                serde_json::from_str(json).expect("bundled canon data is valid JSON");
            scheme.name = name.to_string();
            (*name, scheme)
        })
        .collect()
});

/// Lookup functions over the bundled versification schemes.
///
/// Scheme names are matched case-insensitively, so a conf's
/// `Versification=NRSV` finds `nrsv`.
pub struct Canon;

impl Canon {
    /// Returns a scheme by name.
    pub fn scheme(name: &str) -> Result<&'static CanonScheme> {
        CANONS
            .get(name.to_lowercase().as_str())
            .ok_or_else(|| SwordError::canon_not_found(name))
    }

    /// Names of all bundled schemes.
    pub fn scheme_names() -> Vec<&'static str> {
        CANONS.keys().copied().collect()
    }

    /// Ordered books of one testament.
    ///
    /// # Errors
    ///
    /// Returns `CanonNotFound` if the scheme is unknown or has no books in that testament.
    pub fn book_infos(scheme: &str, testament: Testament) -> Result<&'static IndexMap<String, BookInfo>> {
        let books = Self::scheme(scheme)?.testament(testament);
        if books.is_empty() {
            return Err(SwordError::canon_not_found(format!("{} {}", scheme, testament)));
        }
        Ok(books)
    }

    /// Finds a book, searching the old testament first.
    pub fn book_info(scheme: &str, book: &str) -> Result<&'static BookInfo> {
        let canon = Self::scheme(scheme)?;
        canon
            .ot
            .get(book)
            .or_else(|| canon.nt.get(book))
            .ok_or_else(|| SwordError::canon_not_found(format!("{} {}", scheme, book)))
    }

    /// Which testament holds the book.
    pub fn testament_of(scheme: &str, book: &str) -> Result<Option<Testament>> {
        let canon = Self::scheme(scheme)?;
        if canon.ot.contains_key(book) {
            Ok(Some(Testament::Ot))
        } else if canon.nt.contains_key(book) {
            Ok(Some(Testament::Nt))
        } else {
            Ok(None)
        }
    }

    /// Book abbreviations in canon order, old testament first.
    pub fn book_names(scheme: &str) -> Result<Vec<&'static str>> {
        let canon = Self::scheme(scheme)?;
        Ok(canon.books().map(|(name, _)| name.as_str()).collect())
    }

    /// Position of a book in [`Canon::book_names`] order, `None` if absent.
    pub fn book_index(scheme: &str, book: &str) -> Result<Option<usize>> {
        let canon = Self::scheme(scheme)?;
        if let Some(index) = canon.ot.get_index_of(book) {
            return Ok(Some(index));
        }
        Ok(canon.nt.get_index_of(book).map(|index| index + canon.ot.len()))
    }

    /// The chapter after `(book, chapter)`, moving into the next book at a book's end.
    ///
    /// Chapters with a zero verse count are skipped.
    pub fn next_chapter(scheme: &str, book: &str, chapter: u32) -> Result<Option<(&'static str, u32)>> {
        let canon = Self::scheme(scheme)?;
        let books: Vec<(&String, &BookInfo)> = canon.books().collect();
        let position = books
            .iter()
            .position(|(name, _)| name.as_str() == book)
            .ok_or_else(|| SwordError::unknown_book(book, scheme))?;

        let Some(mut next) = chapter.checked_add(1) else {
            return Ok(None);
        };
        for (name, info) in &books[position..] {
            while next <= info.max_chapter {
                if info.verse_count(next).unwrap_or(0) > 0 {
                    return Ok(Some((name.as_str(), next)));
                }
                next += 1;
            }
            next = 1;
        }
        Ok(None)
    }

    /// The chapter before `(book, chapter)`, moving into the previous book's last chapter.
    pub fn previous_chapter(scheme: &str, book: &str, chapter: u32) -> Result<Option<(&'static str, u32)>> {
        let canon = Self::scheme(scheme)?;
        let books: Vec<(&String, &BookInfo)> = canon.books().collect();
        let position = books
            .iter()
            .position(|(name, _)| name.as_str() == book)
            .ok_or_else(|| SwordError::unknown_book(book, scheme))?;

        let mut start = Some(chapter.min(books[position].1.max_chapter + 1));
        for (name, info) in books[..=position].iter().rev() {
            // earlier books are entered from one past their last chapter
            let mut previous = start.take().unwrap_or(info.max_chapter + 1);
            while previous > 1 {
                previous -= 1;
                if info.verse_count(previous).unwrap_or(0) > 0 {
                    return Ok(Some((name.as_str(), previous)));
                }
            }
        }
        Ok(None)
    }
}
