use crate::error::{Error, ErrorKind};
use exn::ResultExt;
use shelfscan_catalog::{BookRecord, normalize};
use time::UtcDateTime;

#[derive(sqlx::FromRow)]
pub(crate) struct BookRow {
    pub(crate) identifier: String,
    pub(crate) title: String,
    pub(crate) authors: String,
    pub(crate) cover_url: Option<String>,
    pub(crate) added_at: i64,
}
impl TryFrom<&BookRecord> for BookRow {
    type Error = Error;
    fn try_from(record: &BookRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            identifier: record.identifier().to_string(),
            title: record.title().to_string(),
            authors: serde_json::to_string(record.authors()).or_raise(|| ErrorKind::InvalidData("authors"))?,
            cover_url: record.cover().map(str::to_string),
            added_at: UtcDateTime::now().unix_timestamp(),
        })
    }
}
impl TryFrom<BookRow> for BookRecord {
    type Error = Error;
    fn try_from(row: BookRow) -> Result<Self, Self::Error> {
        let authors: Vec<String> = serde_json::from_str(&row.authors).or_raise(|| ErrorKind::InvalidData("authors"))?;
        Ok(BookRecord::new(normalize(row.identifier), row.title, authors, row.cover_url))
    }
}
