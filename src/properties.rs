//! Flat `key=value` configuration files and the places we look for them.
//!
//! The dialect is the usual `.properties` one: `#`/`!` comments, `=` or `:`
//! (or plain whitespace) between key and value, backslash line continuation
//! and backslash escapes including `\uXXXX`.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::ConfigError;

/// Relative location of the properties file bundled beside the executable.
pub const RESOURCE_PATH: &str = "resources/config.properties";

/// Working-directory relative fallbacks, probed in this order.
pub const DEFAULT_CANDIDATES: [&str; 3] = [
    "config.properties",
    "config/config.properties",
    "demo/config/config.properties",
];

/// A parsed key-value file. Immutable once loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    origin: String,
    entries: HashMap<String, String>,
}

impl Properties {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Where the entries came from, used in error messages.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parse properties text. `origin` only labels errors.
pub fn parse(text: &str, origin: &str) -> Result<Properties, ConfigError> {
    let mut entries = HashMap::new();
    let mut logical = String::new();
    let mut start_line = 0;
    let mut continuing = false;

    for (idx, raw) in physical_lines(text).enumerate() {
        let line = raw.trim_start_matches([' ', '\t', '\x0c']);

        if !continuing {
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            start_line = idx + 1;
            logical.clear();
        }

        if ends_with_unescaped_backslash(line) {
            logical.push_str(&line[..line.len() - 1]);
            continuing = true;
            continue;
        }

        logical.push_str(line);
        continuing = false;
        let (key, value) = split_entry(&logical, origin, start_line)?;
        entries.insert(key, value);
    }

    // a continuation on the last line simply ends the entry
    if continuing {
        let (key, value) = split_entry(&logical, origin, start_line)?;
        entries.insert(key, value);
    }

    Ok(Properties {
        origin: origin.to_string(),
        entries,
    })
}

/// Lines end at `\r\n`, `\n` or a lone `\r`.
fn physical_lines(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = text;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let Some(end) = rest.find(['\r', '\n']) else {
            let line = rest;
            rest = "";
            return Some(line);
        };
        let line = &rest[..end];
        let width = if rest[end..].starts_with("\r\n") { 2 } else { 1 };
        rest = &rest[end + width..];
        Some(line)
    })
}

fn ends_with_unescaped_backslash(line: &str) -> bool {
    let trailing = line.bytes().rev().take_while(|b| *b == b'\\').count();
    trailing % 2 == 1
}

fn split_entry(line: &str, origin: &str, line_no: usize) -> Result<(String, String), ConfigError> {
    let malformed = |reason: &str| ConfigError::Malformed {
        origin: origin.to_string(),
        line: line_no,
        reason: reason.to_string(),
    };

    let mut key_end = line.len();
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' | ' ' | '\t' | '\x0c' => {
                key_end = i;
                break;
            }
            _ => {}
        }
    }

    let raw_key = &line[..key_end];
    let mut rest = line[key_end..].trim_start_matches([' ', '\t', '\x0c']);
    let mut had_separator = false;
    if let Some(stripped) = rest.strip_prefix(['=', ':']) {
        rest = stripped.trim_start_matches([' ', '\t', '\x0c']);
        had_separator = true;
    }

    if raw_key.is_empty() {
        let reason = if had_separator {
            "separator without a key"
        } else {
            "entry without a key"
        };
        return Err(malformed(reason));
    }

    let key = unescape(raw_key).map_err(|r| malformed(&r))?;
    let value = unescape(rest).map_err(|r| malformed(&r))?;
    Ok((key, value))
}

fn unescape(s: &str) -> Result<String, String> {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\x0c'),
            Some('u') => {
                let unit = read_hex4(&mut chars)?;
                let code = match unit {
                    0xD800..=0xDBFF => {
                        // supplementary characters arrive as a \uHIGH\uLOW pair
                        let mut ahead = chars.clone();
                        let low = match (ahead.next(), ahead.next()) {
                            (Some('\\'), Some('u')) => read_hex4(&mut ahead)?,
                            _ => return Err(format!("unpaired surrogate \\u{unit:04X}")),
                        };
                        if !(0xDC00..=0xDFFF).contains(&low) {
                            return Err(format!("unpaired surrogate \\u{unit:04X}"));
                        }
                        chars = ahead;
                        0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00)
                    }
                    0xDC00..=0xDFFF => return Err(format!("unpaired surrogate \\u{unit:04X}")),
                    _ => unit,
                };
                out.push(char::from_u32(code).ok_or_else(|| format!("invalid code point {code:X}"))?);
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    Ok(out)
}

fn read_hex4(chars: &mut std::str::Chars<'_>) -> Result<u32, String> {
    let hex: String = chars.by_ref().take(4).collect();
    (hex.len() == 4 && hex.chars().all(|c| c.is_ascii_hexdigit()))
        .then(|| u32::from_str_radix(&hex, 16).ok())
        .flatten()
        .ok_or_else(|| format!("invalid \\u escape \"\\u{hex}\""))
}

/// Finds and reads the properties file: bundled resource first, then each
/// candidate path in order.
#[derive(Debug, Clone)]
pub struct PropertiesLoader {
    resource: Option<PathBuf>,
    candidates: Vec<PathBuf>,
}

impl PropertiesLoader {
    pub fn new(resource: Option<PathBuf>, candidates: Vec<PathBuf>) -> Self {
        Self {
            resource,
            candidates,
        }
    }

    /// Resource beside the current executable plus [`DEFAULT_CANDIDATES`].
    pub fn with_defaults() -> Self {
        Self::new(
            bundled_resource_path(),
            DEFAULT_CANDIDATES.iter().map(PathBuf::from).collect(),
        )
    }

    /// Every path in the order it will be tried.
    pub fn probe_order(&self) -> Vec<&Path> {
        self.resource
            .iter()
            .chain(self.candidates.iter())
            .map(PathBuf::as_path)
            .collect()
    }

    /// First existing source, or `NotFound` listing everything tried.
    pub fn locate(&self) -> Result<PathBuf, ConfigError> {
        for path in self.probe_order() {
            if path.is_file() {
                debug!("[Config] Using {}", path.display());
                return Ok(path.to_path_buf());
            }
            debug!("[Config] No properties at {}", path.display());
        }
        Err(ConfigError::NotFound {
            tried: self.probe_order().into_iter().map(Path::to_path_buf).collect(),
        })
    }

    pub fn load(&self) -> Result<Properties, ConfigError> {
        let path = self.locate()?;
        read_properties(&path)
    }
}

impl Default for PropertiesLoader {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Read and parse one properties file. The handle is closed before parsing.
pub fn read_properties(path: &Path) -> Result<Properties, ConfigError> {
    let unreadable = |source| ConfigError::Unreadable {
        path: path.to_path_buf(),
        source,
    };
    let bytes = fs::read(path).map_err(unreadable)?;
    let text = String::from_utf8(bytes)
        .map_err(|e| unreadable(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;
    parse(&text, &path.display().to_string())
}

fn bundled_resource_path() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    Some(exe.parent()?.join(RESOURCE_PATH))
}
