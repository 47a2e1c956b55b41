//! Document renderings of a single card: markdown download, HTML, print and share text.
use chrono::{DateTime, SecondsFormat, Utc};
use pulldown_cmark::{html, Options, Parser};
use pulldown_cmark_escape::escape_html;

use crate::{Card, ExportFormat};

/// Front-matter header (id, title, tags, generation time), a blank line, then the raw content.
pub fn markdown_document(card: &Card, generated_at: DateTime<Utc>) -> String {
    format!(
        "---\nid: {}\ntitle: {}\ntags: [{}]\ndate: {}\n---\n\n{}",
        card.id,
        card.title,
        card.tags.join(", "),
        generated_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        card.content
    )
}

/// Standalone HTML page with the markdown content rendered.
pub fn html_document(card: &Card) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut body = String::new();
    html::push_html(&mut body, Parser::new_ext(&card.content, options));

    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n<body>\n<h1>{title}</h1>\n{body}{footer}</body>\n</html>\n",
        title = escape(&card.title),
        body = body,
        footer = footer_html(card),
    )
}

/// Minimal printable page: title heading, whitespace-preserving content, id and tags footer.
pub fn printable_document(card: &Card) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n<body>\n<div style=\"font-family: serif; max-width: 800px; margin: 0 auto;\">\n<h1 style=\"font-size: 24px; font-weight: bold; margin-bottom: 1rem;\">{title}</h1>\n<div style=\"margin-bottom: 2rem; line-height: 1.6; white-space: pre-wrap;\">{content}</div>\n{footer}</div>\n</body>\n</html>\n",
        title = escape(&card.title),
        content = escape(&card.content),
        footer = footer_html(card),
    )
}

fn footer_html(card: &Card) -> String {
    format!(
        "<div style=\"font-size: 12px; color: #666;\">\nID: {} <br/>\nTags: {}\n</div>\n",
        escape(&card.id),
        escape(&hashtags(&card.tags)),
    )
}

/// Tags rendered as `#a #b`.
pub fn hashtags(tags: &[String]) -> String {
    tags.iter()
        .map(|t| format!("#{}", t))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Plain text handed to the share facility or clipboard.
pub fn share_text(title: &str, content: &str) -> String {
    format!("{}\n\n{}", title, content)
}

/// File name for an exported card, derived from its title.
///
/// Falls back to `card` for a blank title; path separators are replaced so the
/// result stays a single path component.
pub fn export_file_name(title: &str, format: ExportFormat) -> String {
    let stem: String = title
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0' => '-',
            c if c.is_control() => '-',
            c => c,
        })
        .collect();
    let stem = if stem.is_empty() || stem == "." || stem == ".." {
        "card".to_string()
    } else {
        stem
    };

    let extension = match format {
        ExportFormat::Markdown => "md",
        ExportFormat::Html => "html",
    };
    format!("{}.{}", stem, extension)
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    // Writing into a String never fails.
    let _ = escape_html(&mut escaped, text);
    escaped
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::CardType;

    fn sample() -> Card {
        Card {
            id: "202405061230".into(),
            title: "Ownership".into(),
            content: "# Rules\n\n- one owner\n  <moves>".into(),
            card_type: CardType::Term,
            tags: vec!["rust".into(), "memory".into()],
            folder_id: None,
            created_at: 1,
            updated_at: 1,
        }
    }

    #[test]
    fn markdown_document_has_header_then_content() {
        let at = Utc.with_ymd_and_hms(2024, 5, 6, 12, 30, 0).unwrap();
        let doc = markdown_document(&sample(), at);
        assert_eq!(
            doc,
            "---\nid: 202405061230\ntitle: Ownership\ntags: [rust, memory]\ndate: 2024-05-06T12:30:00.000Z\n---\n\n# Rules\n\n- one owner\n  <moves>"
        );
    }

    #[test]
    fn file_name_falls_back_for_blank_titles() {
        assert_eq!(export_file_name("Ownership", ExportFormat::Markdown), "Ownership.md");
        assert_eq!(export_file_name("  ", ExportFormat::Markdown), "card.md");
        assert_eq!(export_file_name("a/b", ExportFormat::Html), "a-b.html");
        assert_eq!(export_file_name("..", ExportFormat::Markdown), "card.md");
        assert_eq!(
            export_file_name("Why? <a|b> \"*\"", ExportFormat::Markdown),
            "Why- -a-b- ---.md"
        );
    }

    #[test]
    fn printable_document_escapes_and_preserves_whitespace() {
        let doc = printable_document(&sample());
        assert!(doc.contains("<h1 style=\"font-size: 24px; font-weight: bold; margin-bottom: 1rem;\">Ownership</h1>"));
        assert!(doc.contains("white-space: pre-wrap;\"># Rules\n\n- one owner\n  &lt;moves&gt;</div>"));
        assert!(doc.contains("ID: 202405061230"));
        assert!(doc.contains("Tags: #rust #memory"));

        let mut quoted = sample();
        quoted.title = "\"Tom & Jerry's\"".into();
        assert!(printable_document(&quoted).contains("&quot;Tom &amp; Jerry&#39;s&quot;</h1>"));
    }

    #[test]
    fn html_document_renders_markdown() {
        let doc = html_document(&sample());
        assert!(doc.contains("<h1>Ownership</h1>"));
        assert!(doc.contains("<h1>Rules</h1>"));
        assert!(doc.contains("<li>"));
    }

    #[test]
    fn share_text_joins_title_and_content() {
        assert_eq!(share_text("T", "body"), "T\n\nbody");
        assert_eq!(hashtags(&[]), "");
    }
}
