use crate::CatalogIdentifier;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Placeholder author used when a lookup result names nobody.
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

/// Book metadata resolved for a single [`CatalogIdentifier`].
///
/// Fields are private so that a record can't be altered after the resolver
/// builds it. The author list is never empty: constructing a record without
/// authors substitutes a single [`UNKNOWN_AUTHOR`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "RawBookRecord"))]
pub struct BookRecord {
    identifier: CatalogIdentifier,
    title: String,
    authors: Vec<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    cover: Option<String>,
}

impl BookRecord {
    pub fn new<A, S>(identifier: CatalogIdentifier, title: impl Into<String>, authors: A, cover: Option<String>) -> Self
    where
        A: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut authors: Vec<String> = authors.into_iter().map(Into::into).collect();
        if authors.is_empty() {
            authors.push(UNKNOWN_AUTHOR.to_string());
        }
        Self {
            identifier,
            title: title.into(),
            authors,
            cover,
        }
    }

    pub fn identifier(&self) -> &CatalogIdentifier {
        &self.identifier
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Authors in the order the lookup source listed them.
    pub fn authors(&self) -> &[String] {
        &self.authors
    }

    /// URI of a cover image, if the source had one.
    pub fn cover(&self) -> Option<&str> {
        self.cover.as_deref()
    }
}

/// Formats as `"{title} by {author}, {author}"`, the line format used by exports.
impl Display for BookRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{} by {}", self.title, self.authors.join(", "))
    }
}

/// Deserialization goes through [`BookRecord::new`] so that stored records
/// with an empty author list still uphold the invariant.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawBookRecord {
    identifier: CatalogIdentifier,
    title: String,
    #[serde(default)]
    authors: Vec<String>,
    #[serde(default)]
    cover: Option<String>,
}
#[cfg(feature = "serde")]
impl From<RawBookRecord> for BookRecord {
    fn from(raw: RawBookRecord) -> Self {
        Self::new(raw.identifier, raw.title, raw.authors, raw.cover)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize;

    #[test]
    fn test_missing_authors_become_placeholder() {
        let record = BookRecord::new(normalize("9780134685991"), "Effective Java", Vec::<String>::new(), None);
        assert_eq!(record.authors(), [UNKNOWN_AUTHOR]);
    }

    #[test]
    fn test_authors_keep_source_order() {
        let record = BookRecord::new(
            normalize("9780262033848"),
            "Introduction to Algorithms",
            ["Thomas H. Cormen", "Charles E. Leiserson", "Ronald L. Rivest"],
            Some("http://example.com/cover.jpg".to_string()),
        );
        assert_eq!(record.authors()[0], "Thomas H. Cormen");
        assert_eq!(record.authors()[2], "Ronald L. Rivest");
        assert_eq!(record.cover(), Some("http://example.com/cover.jpg"));
    }

    #[test]
    fn test_display_line() {
        let record = BookRecord::new(normalize("1"), "Good Omens", ["Terry Pratchett", "Neil Gaiman"], None);
        assert_eq!(record.to_string(), "Good Omens by Terry Pratchett, Neil Gaiman");
        let record = BookRecord::new(normalize("2"), "Beowulf", Vec::<&str>::new(), None);
        assert_eq!(record.to_string(), "Beowulf by Unknown Author");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_upholds_invariant() {
        let record: BookRecord =
            serde_json::from_str(r#"{"identifier": "978-0-13-468599-1", "title": "Effective Java", "authors": []}"#)
                .unwrap();
        assert_eq!(record.identifier().as_str(), "9780134685991");
        assert_eq!(record.authors(), [UNKNOWN_AUTHOR]);
        assert_eq!(record.cover(), None);
    }
}
