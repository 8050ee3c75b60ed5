use std::io::{self, Write};

use bookforge_core::book::{Book, BookSummary};
use bookforge_core::pagination;
use bookforge_core::preferences::ReaderPreferences;
use bookforge_service::ReaderView;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

fn or_dash(s: &str) -> &str {
    if s.is_empty() {
        "-"
    } else {
        s
    }
}

pub fn summaries(out: &mut impl Write, books: &[BookSummary]) -> io::Result<()> {
    if books.is_empty() {
        return writeln!(out, "No books yet.");
    }
    writeln!(
        out,
        "{:<38} {:<32} {:<18} {:<8} {:>7}  CREATED",
        "ID", "TITLE", "AUTHOR", "SHARED", "WORDS"
    )?;
    for book in books {
        writeln!(
            out,
            "{:<38} {:<32} {:<18} {:<8} {:>7}  {}",
            book.id,
            truncate(&book.title, 32),
            truncate(or_dash(&book.author), 18),
            book.visibility,
            book.word_count,
            book.created_at.format(DATE_FORMAT),
        )?;
    }
    Ok(())
}

pub fn book_details(out: &mut impl Write, book: &Book) -> io::Result<()> {
    writeln!(out, "{}", book.title)?;
    writeln!(out, "  id:          {}", book.id)?;
    writeln!(out, "  author:      {}", or_dash(&book.author))?;
    writeln!(out, "  visibility:  {}", book.visibility)?;
    writeln!(out, "  words:       {}", pagination::word_count(&book.content))?;
    writeln!(out, "  cover scene: {}", book.cover_prompt)?;
    writeln!(out, "  created:     {}", book.created_at.format(DATE_FORMAT))?;
    Ok(())
}

/// Page numbers are shown 1-based.
pub fn page(out: &mut impl Write, view: &ReaderView) -> io::Result<()> {
    writeln!(out, "{}", view.title)?;
    if !view.author.is_empty() {
        writeln!(out, "by {}", view.author)?;
    }
    writeln!(out)?;
    writeln!(out, "{}", view.page.text)?;
    writeln!(out)?;

    let mut footer = format!(
        "page {} of {}",
        view.page.index + 1,
        view.page.total_pages
    );
    if view.page.has_previous {
        footer.push_str(&format!("  (prev: --page {})", view.page.index));
    }
    if view.page.has_next {
        footer.push_str(&format!("  (next: --page {})", view.page.index + 2));
    }
    writeln!(out, "{footer}")
}

pub fn preferences(out: &mut impl Write, prefs: &ReaderPreferences) -> io::Result<()> {
    let (background, foreground) = prefs.theme.palette();
    writeln!(out, "reader:         {}", prefs.reader_id)?;
    writeln!(out, "theme:          {} ({background} on {foreground})", prefs.theme)?;
    writeln!(out, "font:           {}", prefs.font_family)?;
    writeln!(out, "font size:      {}", prefs.font_size)?;
    writeln!(out, "words per page: {}", prefs.words_per_page)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut cut: String = s.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookforge_core::pagination::Page;

    fn view(index: usize, total_pages: usize) -> ReaderView {
        ReaderView {
            book_id: "b-1".into(),
            title: "Salt and Static".into(),
            author: String::new(),
            page: Page {
                index,
                total_pages,
                text: "The radio hummed.".into(),
                has_previous: index > 0,
                has_next: index + 1 < total_pages,
            },
            preferences: ReaderPreferences::defaults("r"),
        }
    }

    fn render_page(v: &ReaderView) -> String {
        let mut buf = Vec::new();
        page(&mut buf, v).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn page_footer_is_one_based() {
        let text = render_page(&view(0, 3));
        assert!(text.contains("page 1 of 3"), "{text}");
        assert!(text.contains("next: --page 2"));
        assert!(!text.contains("prev"));
        assert!(!text.contains("by "));

        let text = render_page(&view(2, 3));
        assert!(text.contains("page 3 of 3"));
        assert!(text.contains("prev: --page 2"));
        assert!(!text.contains("next"));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("añoranzas del mar", 6), "añora…");
    }

    #[test]
    fn empty_list_message() {
        let mut buf = Vec::new();
        summaries(&mut buf, &[]).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "No books yet.\n");
    }

    #[test]
    fn preferences_show_palette() {
        let mut buf = Vec::new();
        preferences(&mut buf, &ReaderPreferences::defaults("ana")).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("reader:         ana"));
        assert!(text.contains("#ffffff on #1a1a1a"));
    }
}
