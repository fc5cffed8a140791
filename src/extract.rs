//! Article-text extraction strategies.
//!
//! Extraction is a strategy seam so HTML heuristics never leak into callers
//! that already hold structured text: those use [`PlainTextExtractor`] (or
//! bypass extraction entirely via the pipeline's text entry point).

use scraper::{ElementRef, Html};

use crate::types::RagError;

/// Turns a raw fetched document into the text worth chunking.
pub trait Extractor: Send + Sync {
    /// Extracts article text from `raw`.
    ///
    /// Returns `RagError::InvalidDocument` when nothing usable is found.
    fn extract(&self, raw: &str) -> Result<String, RagError>;

    /// Name of this strategy, for logging.
    fn name(&self) -> &'static str;
}

/// Passthrough for already-clean text.
#[derive(Debug, Clone, Default)]
pub struct PlainTextExtractor;

impl Extractor for PlainTextExtractor {
    fn extract(&self, raw: &str) -> Result<String, RagError> {
        let text = raw.trim();
        if text.is_empty() {
            return Err(RagError::InvalidDocument("document is empty".into()));
        }
        Ok(text.to_string())
    }

    fn name(&self) -> &'static str {
        "plain-text"
    }
}

/// Picks the markup element carrying the most directly-owned text and returns
/// its subtree text.
///
/// The heuristic is "the largest block of text on the page is the article
/// body". It works well for old-school essay pages (long runs of text inside
/// a single `font` or `td` element) and tolerably for `<p>`-per-paragraph
/// layouts; it is knowingly fragile on everything else, which is why it lives
/// behind the [`Extractor`] seam.
#[derive(Debug, Clone, Default)]
pub struct DensestBlockExtractor;

impl DensestBlockExtractor {
    /// Direct text length of an element: text nodes that are immediate
    /// children, not text inside nested elements. This keeps page-wide
    /// containers from trivially winning over the block that actually holds
    /// the prose.
    fn direct_text_len(element: ElementRef<'_>) -> usize {
        element
            .children()
            .filter_map(|node| node.value().as_text())
            .map(|text| text.trim().len())
            .sum()
    }
}

impl Extractor for DensestBlockExtractor {
    fn extract(&self, raw: &str) -> Result<String, RagError> {
        let document = Html::parse_document(raw);

        let mut best: Option<(usize, String)> = None;
        for element in document.root_element().descendent_elements() {
            let tag = element.value().name();
            if matches!(tag, "script" | "style" | "head" | "title" | "noscript") {
                continue;
            }
            let len = Self::direct_text_len(element);
            if len == 0 {
                continue;
            }
            if best.as_ref().is_none_or(|(max, _)| len > *max) {
                let text = element.text().collect::<String>();
                best = Some((len, text));
            }
        }

        match best {
            Some((_, text)) if !text.trim().is_empty() => Ok(text.trim().to_string()),
            _ => Err(RagError::InvalidDocument(
                "no text-bearing block found in markup".into(),
            )),
        }
    }

    fn name(&self) -> &'static str {
        "densest-block"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_passed_through_trimmed() {
        let text = PlainTextExtractor.extract("  body text \n").unwrap();
        assert_eq!(text, "body text");
    }

    #[test]
    fn plain_text_rejects_empty_input() {
        let err = PlainTextExtractor.extract("   ").unwrap_err();
        assert!(matches!(err, RagError::InvalidDocument(_)));
    }

    #[test]
    fn densest_block_wins_over_navigation() {
        let html = r#"<html><body>
            <div id="nav"><a href="/">home</a> <a href="/about">about</a></div>
            <font size="2">This essay is the longest run of text on the whole
            page, and the extractor should select it over the navigation links
            and the footer both.</font>
            <div id="footer">copyright</div>
        </body></html>"#;

        let text = DensestBlockExtractor.extract(html).unwrap();
        assert!(text.contains("longest run of text"));
        assert!(!text.contains("about"));
        assert!(!text.contains("copyright"));
    }

    #[test]
    fn script_and_style_content_is_ignored() {
        let html = r#"<html><head><style>body { margin: 0; padding: 0; color: red; background: white; }</style></head>
        <body><script>var x = "a very long inline script that should never be mistaken for article text";</script>
        <p>Short real paragraph.</p></body></html>"#;

        let text = DensestBlockExtractor.extract(html).unwrap();
        assert_eq!(text, "Short real paragraph.");
    }

    #[test]
    fn markup_without_text_is_rejected() {
        let err = DensestBlockExtractor
            .extract("<html><body><img src=\"x.png\"></body></html>")
            .unwrap_err();
        assert!(matches!(err, RagError::InvalidDocument(_)));
    }
}
