//! Parsing of textual scripture references (`Book.Chapter[:verses]`).
//!
//! # Examples
//!
//! ```
//! use sword::canon::ParsedReference;
//!
//! let parsed = ParsedReference::parse("Gen.1:3-5,9", "nrsv")?;
//! assert_eq!(parsed.book, "Gen");
//! assert_eq!(parsed.chapter, 1);
//! assert_eq!(parsed.verses, vec![3, 4, 5, 9]);
//! # Ok::<(), sword::SwordError>(())
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::canon_table::Canon;
use crate::{Result, SwordError};

static OSIS_REF_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\w+)\.(\d+)(?::([\d,-]+))?$").expect("static pattern compiles")
});

static LEMMA_NUMBER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.*?)(\d+)$").expect("static pattern compiles")
});

/// A reference resolved against a versification scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedReference {
    pub book: String,
    /// 1-based
    pub chapter: u32,
    /// 1-based, in the order written
    pub verses: Vec<u32>,
}

impl ParsedReference {
    /// Parses `Book.Chapter` or `Book.Chapter:verse-spec`.
    ///
    /// Without a verse spec the whole chapter is expanded from the scheme's
    /// verse counts. A verse spec is a comma separated list of numbers and
    /// `N-M` ranges; groups are concatenated as written, not sorted or deduplicated.
    ///
    /// # Errors
    ///
    /// - `MalformedReference` if the string does not match the grammar
    /// - `UnknownBook` if the book is not part of the scheme
    /// - `ChapterOutOfRange` if no verse spec is given and the chapter does not exist
    pub fn parse(osis_ref: &str, scheme: &str) -> Result<Self> {
        let captures = OSIS_REF_PATTERN
            .captures(osis_ref.trim())
            .ok_or_else(|| SwordError::malformed_reference(osis_ref))?;
        let book = captures[1].to_string();
        let chapter: u32 = captures[2]
            .parse()
            .map_err(|_| SwordError::malformed_reference(osis_ref))?;

        let book_info = match Canon::book_info(scheme, &book) {
            Ok(info) => info,
            Err(SwordError::CanonNotFound { .. }) if Canon::scheme(scheme).is_ok() => {
                return Err(SwordError::unknown_book(book, scheme));
            }
            Err(e) => return Err(e),
        };

        let verses = match captures.get(3) {
            Some(spec) => parse_verse_spec(spec.as_str())
                .ok_or_else(|| SwordError::malformed_reference(osis_ref))?,
            None => {
                let verse_max = book_info
                    .verse_count(chapter)
                    .ok_or_else(|| SwordError::chapter_out_of_range(&book, chapter, book_info.max_chapter))?;
                (1..=verse_max).collect()
            }
        };
        Ok(Self { book, chapter, verses })
    }

    /// Canonical `Book.Chapter:Verse` key for one verse of this reference.
    pub fn verse_key(&self, verse: u32) -> String {
        verse_key(&self.book, self.chapter, verse)
    }
}

/// Formats the canonical `Book.Chapter:Verse` key used by every result map.
pub fn verse_key(book: &str, chapter: u32, verse: u32) -> String {
    format!("{}.{}:{}", book, chapter, verse)
}

/// Largest verse number a verse record can address; also caps the size of
/// one expanded spec.
const MAX_VERSE: u32 = u16::MAX as u32;

/// Expands `3-5,9` into `[3, 4, 5, 9]`.
///
/// A group with a missing bound (`3-`) is the single verse; a descending
/// range expands to nothing. Verse numbers above [`MAX_VERSE`], or a spec
/// expanding to more than that many verses, are rejected.
fn parse_verse_spec(spec: &str) -> Option<Vec<u32>> {
    let mut verses = Vec::new();
    for group in spec.split(',') {
        let bounds: Vec<&str> = group.split('-').filter(|s| !s.is_empty()).collect();
        let (first, last) = match bounds.as_slice() {
            [single] => {
                let verse = parse_verse_number(single)?;
                (verse, verse)
            }
            [first, last, ..] => (parse_verse_number(first)?, parse_verse_number(last)?),
            [] => return None,
        };
        let count = last.checked_sub(first).map_or(0, |span| span as usize + 1);
        if verses.len() + count > MAX_VERSE as usize {
            return None;
        }
        verses.extend(first..=last);
    }
    Some(verses)
}

fn parse_verse_number(number: &str) -> Option<u32> {
    number.parse().ok().filter(|&verse| verse <= MAX_VERSE)
}

/// Moves a Strong's style lemma (`H0430`, `G25`) to a neighbouring number.
///
/// Zero padding is kept. Returns `None` when the lemma carries no trailing
/// number or the step would go below 1.
///
/// ```
/// use sword::canon::step_lemma;
///
/// assert_eq!(step_lemma("H0430", 1).as_deref(), Some("H0431"));
/// assert_eq!(step_lemma("G1", -1), None);
/// ```
pub fn step_lemma(lemma: &str, step: i64) -> Option<String> {
    let captures = LEMMA_NUMBER_PATTERN.captures(lemma)?;
    let digits = &captures[2];
    let number: i64 = digits.parse().ok()?;
    let stepped = number.checked_add(step)?;
    if stepped < 1 {
        return None;
    }
    Some(format!("{}{:0width$}", &captures[1], stepped, width = digits.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_chapter() {
        let parsed = ParsedReference::parse("Gen.1", "nrsv").unwrap();
        assert_eq!(parsed.book, "Gen");
        assert_eq!(parsed.chapter, 1);
        assert_eq!(parsed.verses, (1..=31).collect::<Vec<u32>>());

        // last chapter of a book is reachable
        let parsed = ParsedReference::parse("Gen.50", "kjv").unwrap();
        assert_eq!(parsed.verses.len(), 26);
    }

    #[test]
    fn test_verse_groups_keep_written_order() {
        let parsed = ParsedReference::parse("Gen.1:3-5,9", "nrsv").unwrap();
        assert_eq!(parsed.verses, vec![3, 4, 5, 9]);

        let parsed = ParsedReference::parse("John.3:16,1-2", "kjv").unwrap();
        assert_eq!(parsed.verses, vec![16, 1, 2]);

        let parsed = ParsedReference::parse("John.3:2,2", "kjv").unwrap();
        assert_eq!(parsed.verses, vec![2, 2]);

        let parsed = ParsedReference::parse("John.3:4-", "kjv").unwrap();
        assert_eq!(parsed.verses, vec![4]);
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            ParsedReference::parse("Tob.1", "kjv"),
            Err(SwordError::UnknownBook { .. })
        ));
        assert!(matches!(
            ParsedReference::parse("Gen.51", "kjv"),
            Err(SwordError::ChapterOutOfRange { max_chapter: 50, .. })
        ));
        assert!(matches!(
            ParsedReference::parse("Gen.0", "kjv"),
            Err(SwordError::ChapterOutOfRange { .. })
        ));
        assert!(matches!(
            ParsedReference::parse("Genesis 1:1", "kjv"),
            Err(SwordError::MalformedReference { .. })
        ));
        assert!(matches!(
            ParsedReference::parse("Gen.1:1,,2", "kjv"),
            Err(SwordError::MalformedReference { .. })
        ));
        assert!(matches!(
            ParsedReference::parse("Gen.1:1-4294967295", "kjv"),
            Err(SwordError::MalformedReference { .. })
        ));
        assert!(matches!(
            ParsedReference::parse("Gen.1:70000", "kjv"),
            Err(SwordError::MalformedReference { .. })
        ));
        let many_ranges = vec!["1-60000"; 3].join(",");
        assert!(matches!(
            ParsedReference::parse(&format!("Gen.1:{}", many_ranges), "kjv"),
            Err(SwordError::MalformedReference { .. })
        ));
        assert_eq!(ParsedReference::parse("Gen.1:65535", "kjv").unwrap().verses, vec![65535]);
        assert!(matches!(
            ParsedReference::parse("Gen.1", "vulgate"),
            Err(SwordError::CanonNotFound { .. })
        ));
    }

    #[test]
    fn test_verse_key() {
        let parsed = ParsedReference::parse("1John.2:1", "kjv").unwrap();
        assert_eq!(parsed.verse_key(1), "1John.2:1");
    }

    #[test]
    fn test_step_lemma() {
        assert_eq!(step_lemma("H0430", 1).as_deref(), Some("H0431"));
        assert_eq!(step_lemma("H0430", -1).as_deref(), Some("H0429"));
        assert_eq!(step_lemma("G0999", 1).as_deref(), Some("G1000"));
        assert_eq!(step_lemma("G99", 1).as_deref(), Some("G100"));
        assert_eq!(step_lemma("H0001", -1), None);
        assert_eq!(step_lemma("lemma", 1), None);
    }
}
