use std::borrow::Borrow;
use std::convert::Infallible;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Characters stripped from raw input in addition to whitespace.
const HYPHENS: [char; 3] = ['-', '\u{2010}', '\u{2011}'];

/// Canonicalizes raw scanned or typed text into a lookup key.
///
/// Removes every whitespace and hyphen character, nothing else. There is no
/// checksum or length validation here, and the function never fails: an empty
/// (or all-whitespace) input produces an empty identifier, which callers must
/// reject before attempting a lookup.
///
/// ```
/// use shelfscan_catalog::normalize;
///
/// assert_eq!(normalize("978-0-13-468599-1").as_str(), "9780134685991");
/// assert_eq!(normalize(" 978 0134 685991 "), normalize("9780134685991"));
/// assert!(normalize(" - ").is_empty());
/// ```
pub fn normalize(raw: impl AsRef<str>) -> CatalogIdentifier {
    CatalogIdentifier(raw.as_ref().chars().filter(|c| !c.is_whitespace() && !HYPHENS.contains(c)).collect())
}

/// A normalized product code.
///
/// Can only be constructed through [`normalize`] (or the conversions that
/// call it), so equality is always exact string equality of the normalized
/// form.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "String", into = "String"))]
pub struct CatalogIdentifier(String);

/// The shape of an identifier, judged by length and character set only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IsbnKind {
    /// Ten characters: nine digits and a digit or `X` check character.
    Isbn10,
    /// Thirteen digits.
    Isbn13,
    /// Anything else (including the empty identifier).
    Other,
}

impl CatalogIdentifier {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn kind(&self) -> IsbnKind {
        let bytes = self.0.as_bytes();
        match bytes.len() {
            13 if bytes.iter().all(u8::is_ascii_digit) => IsbnKind::Isbn13,
            10 if bytes[..9].iter().all(u8::is_ascii_digit)
                && (bytes[9].is_ascii_digit() || bytes[9].eq_ignore_ascii_case(&b'x')) =>
            {
                IsbnKind::Isbn10
            },
            _ => IsbnKind::Other,
        }
    }

    /// Whether the identifier is an ISBN-10 or ISBN-13 with a correct check
    /// character.
    ///
    /// Informational only: lookups are never refused because of it.
    pub fn has_valid_checksum(&self) -> bool {
        let bytes = self.0.as_bytes();
        match self.kind() {
            IsbnKind::Isbn13 => {
                let sum: u32 = bytes
                    .iter()
                    .enumerate()
                    .map(|(i, b)| u32::from(b - b'0') * if i % 2 == 0 { 1 } else { 3 })
                    .sum();
                sum % 10 == 0
            },
            IsbnKind::Isbn10 => {
                let sum: u32 = bytes
                    .iter()
                    .zip((1..=10u32).rev())
                    .map(|(b, weight)| {
                        let value = if b.eq_ignore_ascii_case(&b'x') { 10 } else { u32::from(b - b'0') };
                        value * weight
                    })
                    .sum();
                sum % 11 == 0
            },
            IsbnKind::Other => false,
        }
    }
}

impl AsRef<str> for CatalogIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
impl Borrow<str> for CatalogIdentifier {
    fn borrow(&self) -> &str {
        &self.0
    }
}
impl FromStr for CatalogIdentifier {
    type Err = Infallible;
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Ok(normalize(raw))
    }
}
impl From<&str> for CatalogIdentifier {
    fn from(raw: &str) -> Self {
        normalize(raw)
    }
}
impl From<String> for CatalogIdentifier {
    fn from(raw: String) -> Self {
        normalize(raw)
    }
}
impl From<CatalogIdentifier> for String {
    fn from(id: CatalogIdentifier) -> Self {
        id.0
    }
}

impl Display for CatalogIdentifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}
