//! Highlight markup and length caps
//!
//! Excerpt words arrive with highlighted words wrapped in the sentinel characters. The
//! plain quote drops the sentinels, the annotated quote turns them into `<B>` tags, and
//! each highlight is recorded as a character range of the plain quote.
//!
//! Anything longer than its cap is cut to `cap - 5` characters followed by `...`. A cut
//! never leaves half an entity, half a tag or an unterminated `<B>` region behind.

use crate::sentex::normalization::{HIGHLIGHT_END, HIGHLIGHT_START};
use crate::sentex::settings::RenderLimits;
use serde::Serialize;

const ELLIPSIS: &str = "...";
const OPEN_TAG: &str = "<B>";
const CLOSE_TAG: &str = "</B>";

/// A highlighted character range `[start, end)` of a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Highlight {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedExcerpt {
    pub quote: String,
    pub annotated_quote: String,
    pub title: String,
    pub highlights: Vec<Highlight>,
}

/// Render restored excerpt text (sentinels still embedded) and a restored title.
pub fn render(restored: &str, restored_title: &str, limits: &RenderLimits) -> RenderedExcerpt {
    let mut quote = String::with_capacity(restored.len());
    let mut annotated = String::with_capacity(restored.len() + 16);
    let mut highlights = Vec::new();
    let mut quote_len = 0;
    let mut open: Option<usize> = None;

    for c in restored.chars() {
        match c {
            HIGHLIGHT_START => {
                open = Some(quote_len);
                annotated.push_str(OPEN_TAG);
            }
            HIGHLIGHT_END => {
                if let Some(start) = open.take() {
                    annotated.push_str(CLOSE_TAG);
                    highlights.push(Highlight {
                        start,
                        end: quote_len,
                    });
                }
            }
            _ => {
                quote.push(c);
                annotated.push(c);
                quote_len += 1;
            }
        }
    }
    if let Some(start) = open {
        annotated.push_str(CLOSE_TAG);
        highlights.push(Highlight {
            start,
            end: quote_len,
        });
    }

    let (quote, kept) = truncate(&quote, limits.max_quote_length);
    highlights.retain(|highlight| highlight.end <= kept);
    let (title, _) = truncate(restored_title, limits.max_title_length);

    RenderedExcerpt {
        quote,
        annotated_quote: truncate_annotated(&annotated, limits.max_annotated_quote_length),
        title: title.trim().to_string(),
        highlights,
    }
}

fn head(text: &str, max: usize) -> Option<String> {
    if text.chars().count() <= max {
        return None;
    }
    Some(
        text.chars()
            .take(max.saturating_sub(ELLIPSIS.len() + 2))
            .collect(),
    )
}

/// Cut plain text to `max` characters, returning it with the number of characters kept
/// from the original.
pub fn truncate(text: &str, max: usize) -> (String, usize) {
    match head(text, max) {
        None => (text.to_string(), text.chars().count()),
        Some(head) => {
            let head = drop_partial_entity(&head);
            (format!("{}{}", head, ELLIPSIS), head.chars().count())
        }
    }
}

/// Cut annotated text to `max` characters without leaving broken markup behind.
pub fn truncate_annotated(text: &str, max: usize) -> String {
    let Some(head) = head(text, max) else {
        return text.to_string();
    };
    let mut head = drop_partial_entity(&head).to_string();
    if let Some(at) = head.rfind('<') {
        if !head[at..].contains('>') {
            head.truncate(at);
        }
    }
    if let Some(open) = head.rfind(OPEN_TAG) {
        if head.rfind(CLOSE_TAG).map_or(true, |close| close < open) {
            head.truncate(open);
        }
    }
    head.push_str(ELLIPSIS);
    head
}

fn drop_partial_entity(text: &str) -> &str {
    match text.rfind('&') {
        Some(at) if !text[at..].contains(';') => &text[..at],
        _ => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits(quote: usize, annotated: usize, title: usize) -> RenderLimits {
        RenderLimits {
            max_quote_length: quote,
            max_annotated_quote_length: annotated,
            max_title_length: title,
        }
    }

    #[test]
    fn sentinels_become_tags_and_spans() {
        let rendered = render(
            "This is a \u{0}test\u{1} plus another \u{0}test\u{1} and the last \u{0}test\u{1}",
            "A title",
            &limits(256, 256, 100),
        );
        assert_eq!(
            rendered.quote,
            "This is a test plus another test and the last test"
        );
        assert_eq!(
            rendered.annotated_quote,
            "This is a <B>test</B> plus another <B>test</B> and the last <B>test</B>"
        );
        assert_eq!(rendered.highlights.len(), 3);
        for highlight in &rendered.highlights {
            let word: String = rendered
                .quote
                .chars()
                .skip(highlight.start)
                .take(highlight.end - highlight.start)
                .collect();
            assert_eq!(word, "test");
        }
    }

    #[test]
    fn unterminated_highlight_is_closed() {
        let rendered = render("very \u{0}clean", "", &limits(100, 100, 100));
        assert_eq!(rendered.annotated_quote, "very <B>clean</B>");
        assert_eq!(rendered.highlights, vec![Highlight { start: 5, end: 10 }]);
    }

    #[test]
    fn truncation_pulls_back_before_open_highlight() {
        let text = "The rooms were <B>spotless</B> and the staff were <B>wonderful</B> people";
        // The cut lands inside the second highlight.
        let cut = truncate_annotated(text, 60);
        assert_eq!(cut, "The rooms were <B>spotless</B> and the staff were ...");
        assert_eq!(cut.matches("<B>").count(), cut.matches("</B>").count());
    }

    #[test]
    fn truncation_never_splits_a_tag() {
        let text = "The rooms were <B>spotless</B> and more";
        // Cut inside the closing tag: the whole highlight goes.
        let cut = truncate_annotated(text, 32);
        assert_eq!(cut, "The rooms were ...");
        let cut = truncate_annotated(text, 35);
        assert_eq!(cut, "The rooms were <B>spotless</B>...");
    }

    #[test]
    fn truncation_never_splits_an_entity() {
        let (cut, kept) = truncate("fish &amp; chips", 12);
        assert_eq!(cut, "fish ...");
        assert_eq!(kept, 5);
    }

    #[test]
    fn highlights_past_the_cut_are_dropped() {
        let rendered = render(
            "a \u{0}clean\u{1} room and a \u{0}spotless\u{1} bathroom",
            "",
            &limits(20, 100, 100),
        );
        assert_eq!(rendered.quote, "a clean room an...");
        assert_eq!(rendered.highlights, vec![Highlight { start: 2, end: 7 }]);
    }

    #[test]
    fn titles_are_capped() {
        let rendered = render("ok", "A very long review title", &limits(100, 100, 12));
        assert_eq!(rendered.title, "A very ...");
    }
}
