use log::trace;

use crate::{CardError, Result};

// Helper method for parsing tags
pub fn parse_tags(tags: Option<String>) -> Vec<String> {
    let mut parsed = Vec::new();
    if let Some(t) = tags {
        let incoming: Vec<String> = t
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        add_unique_tags(&mut parsed, &incoming);
    }
    parsed
}

/// Appends tags not already present, keeping insertion order.
///
/// Comparison is exact: tags are stored case-sensitively.
pub fn add_unique_tags(tags: &mut Vec<String>, incoming: &[String]) {
    for tag in incoming {
        let tag = tag.trim();
        if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
            trace!("Adding tag {}", tag);
            tags.push(tag.to_string());
        }
    }
}

/// A card can only be saved with a non-blank title.
pub fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(CardError::EmptyTitle);
    }
    Ok(())
}

/// First non-empty line of the content, cut at `max_len` characters.
pub fn content_preview(content: &str, max_len: usize) -> String {
    let first_line = content
        .lines()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("");

    if first_line.chars().count() <= max_len {
        first_line.to_string()
    } else {
        let cut: String = first_line.chars().take(max_len).collect();
        format!("{}...", cut)
    }
}
