use shelfscan_catalog::BookRecord;

/// One `"{title} by {authors}"` line per book, newline separated, with no
/// trailing newline.
pub fn to_text(books: &[BookRecord]) -> String {
    books.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n")
}
