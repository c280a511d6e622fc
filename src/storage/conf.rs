//! Module descriptor (`.conf`) parsing.
//!
//! A conf is INI-like: one `[ModuleName]` section header followed by
//! `Key=Value` lines. Keys may repeat; repeated keys collect into an ordered
//! list. Parsing is lenient about structure; missing keys only show up as
//! `None` when they are looked up.
//!
//! # Examples
//!
//! ```
//! use sword::storage::ModuleConf;
//!
//! let (name, conf) = ModuleConf::parse("[KJV]\nModDrv=zText\nFeature=StrongsNumbers\nFeature=Footnotes\n");
//! assert_eq!(name.as_deref(), Some("KJV"));
//! assert_eq!(conf.get_str("ModDrv"), Some("zText"));
//! assert_eq!(conf.get_all("Feature"), vec!["StrongsNumbers", "Footnotes"]);
//! ```

use std::borrow::Cow;

use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{Result, SwordError};

pub const CONF_MOD_DRV: &str = "ModDrv";
pub const CONF_ENCODING: &str = "Encoding";
pub const CONF_VERSIFICATION: &str = "Versification";
pub const CONF_COMPRESS_TYPE: &str = "CompressType";
pub const CONF_DESCRIPTION: &str = "Description";

/// Versification used when a module declares none.
pub const DEFAULT_VERSIFICATION: &str = "kjv";

/// A conf value: a single string, or every value of a repeated key in file order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfValue {
    Single(String),
    Multiple(Vec<String>),
}

impl ConfValue {
    /// The first value.
    pub fn first(&self) -> &str {
        match self {
            ConfValue::Single(value) => value,
            ConfValue::Multiple(values) => values.first().map(String::as_str).unwrap_or(""),
        }
    }

    pub fn values(&self) -> Vec<&str> {
        match self {
            ConfValue::Single(value) => vec![value.as_str()],
            ConfValue::Multiple(values) => values.iter().map(String::as_str).collect(),
        }
    }

    fn push(&mut self, value: String) {
        match self {
            ConfValue::Single(first) => {
                let first = std::mem::take(first);
                *self = ConfValue::Multiple(vec![first, value]);
            }
            ConfValue::Multiple(values) => values.push(value),
        }
    }
}

/// Parsed key/value content of a module conf, in file order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleConf {
    entries: IndexMap<String, ConfValue>,
}

impl ModuleConf {
    /// Parses conf text into the module name (last section header wins) and its entries.
    ///
    /// Lines end at `\n`, `\r\n` or a bare `\r`. Blank lines and `#` comments are skipped. Other lines split on the first
    /// `=`; lines without one, or with an empty key, are ignored.
    pub fn parse(text: &str) -> (Option<String>, ModuleConf) {
        let mut modname = None;
        let mut conf = ModuleConf::default();
        for line in text.split(['\r', '\n']) {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if line.starts_with('[') && line.ends_with(']') && line.len() >= 2 {
                modname = Some(line[1..line.len() - 1].to_string());
                continue;
            }
            match line.split_once('=') {
                Some((key, value)) if !key.trim().is_empty() => {
                    conf.insert(key.trim(), value.trim());
                }
                _ => debug!("Ignoring conf line: {}", line),
            }
        }
        (modname, conf)
    }

    /// Decodes raw conf bytes and parses them.
    ///
    /// UTF-8 is tried first (a BOM is dropped); anything else is read as
    /// windows-1252. Bytes containing NUL are not text.
    ///
    /// # Errors
    ///
    /// Returns `MalformedConf` if the bytes cannot be decoded as text.
    pub fn parse_bytes(bytes: &[u8]) -> Result<(Option<String>, ModuleConf)> {
        Ok(Self::parse(&decode_conf_text(bytes)?))
    }

    /// Records a value, appending to the existing values when the key repeats.
    pub fn insert(&mut self, key: &str, value: &str) {
        match self.entries.get_mut(key) {
            Some(existing) => existing.push(value.to_string()),
            None => {
                self.entries.insert(key.to_string(), ConfValue::Single(value.to_string()));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&ConfValue> {
        self.entries.get(key)
    }

    /// First value of a key.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(ConfValue::first)
    }

    /// Every value of a key, empty when absent.
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.entries.get(key).map(ConfValue::values).unwrap_or_default()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ConfValue)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn mod_drv(&self) -> Option<&str> {
        self.get_str(CONF_MOD_DRV)
    }

    pub fn encoding(&self) -> Option<&str> {
        self.get_str(CONF_ENCODING)
    }

    /// Lower-cased `Versification`, `kjv` when absent.
    pub fn versification(&self) -> String {
        self.get_str(CONF_VERSIFICATION)
            .unwrap_or(DEFAULT_VERSIFICATION)
            .to_lowercase()
    }

    pub fn compress_type(&self) -> Option<&str> {
        self.get_str(CONF_COMPRESS_TYPE)
    }

    pub fn description(&self) -> Option<&str> {
        self.get_str(CONF_DESCRIPTION)
    }
}

fn decode_conf_text(bytes: &[u8]) -> Result<Cow<'_, str>> {
    if bytes.contains(&0) {
        return Err(SwordError::malformed_conf("conf contains NUL bytes"));
    }
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => Ok(Cow::Borrowed(text)),
        Err(e) => {
            debug!("conf is not UTF-8 ({}), reading it as windows-1252", e);
            let (text, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            Ok(text)
        }
    }
}
