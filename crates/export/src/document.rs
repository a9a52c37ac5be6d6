use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use shelfscan_catalog::BookRecord;
use upon::{Engine, Template};

/// Heading used when none is configured.
pub const DEFAULT_TITLE: &str = "My Personal Library";

const TEMPLATE: &str = include_str!("../templates/library.html");

/// The printable HTML page handed to Chrome.
pub struct LibraryDocument {
    engine: Engine<'static>,
    template: Template<'static>,
}

impl LibraryDocument {
    pub fn new() -> Result<Self> {
        let mut engine = Engine::new();
        engine.set_default_formatter(&upon::fmt::escape_html);
        let template = engine.compile(TEMPLATE).or_raise(|| ErrorKind::Template)?;
        Ok(Self { engine, template })
    }

    /// Render the page: a heading, then one paragraph per book in library
    /// order.
    pub fn render(&self, title: &str, books: &[BookRecord]) -> Result<String> {
        let books: Vec<String> = books.iter().map(ToString::to_string).collect();
        self.template
            .render(&self.engine, upon::value! { title: title, books: books })
            .to_string()
            .or_raise(|| ErrorKind::Template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelfscan_catalog::normalize;

    #[test]
    fn test_render() {
        let html = LibraryDocument::new()
            .unwrap()
            .render(
                DEFAULT_TITLE,
                &[
                    BookRecord::new(normalize("1"), "Effective Java", ["Joshua Bloch"], None),
                    BookRecord::new(normalize("2"), "Good Omens", ["Terry Pratchett", "Neil Gaiman"], None),
                ],
            )
            .unwrap();
        assert!(html.contains("<h1>My Personal Library</h1>"));
        assert!(html.contains(r#"<p class="book">Effective Java by Joshua Bloch</p>"#));
        assert!(html.contains(r#"<p class="book">Good Omens by Terry Pratchett, Neil Gaiman</p>"#));
        assert!(html.find("Effective Java").unwrap() < html.find("Good Omens").unwrap());
    }

    #[test]
    fn test_escapes_markup() {
        let html = LibraryDocument::new()
            .unwrap()
            .render("Tom & Jerry's <Books>", &[BookRecord::new(normalize("1"), "<script>", ["A & B"], None)])
            .unwrap();
        assert!(html.contains("Tom &amp; Jerry"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt; by A &amp; B"));
    }
}
