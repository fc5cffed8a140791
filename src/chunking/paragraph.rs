//! Paragraph-aware chunking with overlapping windows.

use std::sync::OnceLock;

use regex::Regex;

use super::Chunker;
use crate::types::RagError;

/// Extra characters a window may grow past the target to finish a sentence.
const BOUNDARY_SLACK: usize = 50;

fn paragraph_splitter() -> &'static Regex {
    static SPLITTER: OnceLock<Regex> = OnceLock::new();
    SPLITTER.get_or_init(|| Regex::new(r"\n\s*\n").expect("paragraph splitter regex is valid"))
}

/// Splits documents on blank-line boundaries, then windows any paragraph that
/// exceeds the target size.
///
/// A window ends `target` characters after its start, or at the nearest
/// sentence terminator (`.`, `!`, `?` followed by whitespace) found within
/// `target + 50` characters, so chunks avoid mid-sentence cuts. The next
/// window starts `overlap` characters before the previous end, preserving
/// context across the split. All offsets are character offsets.
#[derive(Debug, Clone)]
pub struct ParagraphChunker {
    target: usize,
    overlap: usize,
}

impl ParagraphChunker {
    /// Creates a chunker with the given target size and overlap, both in
    /// characters.
    ///
    /// `overlap >= target` is rejected: it would allow a window start to move
    /// backwards or stall, so termination could no longer be guaranteed.
    pub fn new(target: usize, overlap: usize) -> Result<Self, RagError> {
        if target == 0 {
            return Err(RagError::InvalidConfig("chunk target must be positive".into()));
        }
        if overlap >= target {
            return Err(RagError::InvalidConfig(format!(
                "overlap ({overlap}) must be smaller than target ({target})"
            )));
        }
        Ok(Self { target, overlap })
    }

    /// Target chunk size in characters.
    pub fn target(&self) -> usize {
        self.target
    }

    /// Window overlap in characters.
    pub fn overlap(&self) -> usize {
        self.overlap
    }

    fn window_paragraph(&self, paragraph: &str, out: &mut Vec<String>) {
        let chars: Vec<char> = paragraph.chars().collect();
        let len = chars.len();
        let mut start = 0usize;

        while start < len {
            let mut end = usize::min(start + self.target, len);
            if end < len {
                let limit = usize::min(start + self.target + BOUNDARY_SLACK, len);
                if let Some(stop) = sentence_stop(&chars, end, limit) {
                    end = stop;
                }
            }

            let piece: String = chars[start..end].iter().collect();
            let piece = piece.trim();
            if !piece.is_empty() {
                out.push(piece.to_string());
            }

            if end >= len {
                break;
            }
            // end >= start + target > start + overlap, so the start strictly
            // advances each iteration.
            start = end - self.overlap;
        }
    }
}

/// Finds the first sentence terminator in `chars[from..limit]` and returns the
/// index just past it. A terminator only counts when followed by whitespace
/// (or the end of the scan window), so decimals and mid-token dots are kept
/// intact.
fn sentence_stop(chars: &[char], from: usize, limit: usize) -> Option<usize> {
    for i in from..limit {
        if matches!(chars[i], '.' | '!' | '?') {
            let followed_by_space = chars.get(i + 1).is_none_or(|c| c.is_whitespace());
            if followed_by_space {
                return Some(i + 1);
            }
        }
    }
    None
}

impl Chunker for ParagraphChunker {
    fn chunk(&self, text: &str) -> Result<Vec<String>, RagError> {
        let mut chunks = Vec::new();
        for paragraph in paragraph_splitter().split(text) {
            let paragraph = paragraph.trim();
            if paragraph.is_empty() {
                continue;
            }
            if paragraph.chars().count() <= self.target {
                chunks.push(paragraph.to_string());
            } else {
                self.window_paragraph(paragraph, &mut chunks);
            }
        }
        Ok(chunks)
    }

    fn name(&self) -> &'static str {
        "paragraph-windows"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunker(target: usize, overlap: usize) -> ParagraphChunker {
        ParagraphChunker::new(target, overlap).unwrap()
    }

    /// Deterministic filler without whitespace, so character offsets survive
    /// trimming and reconstruction checks stay exact.
    fn filler(len: usize) -> String {
        (0..len)
            .map(|i| char::from(b'a' + (i % 26) as u8))
            .collect()
    }

    #[test]
    fn short_paragraph_is_one_verbatim_chunk() {
        let chunks = chunker(1100, 150).chunk("  A short paragraph.  ").unwrap();
        assert_eq!(chunks, vec!["A short paragraph.".to_string()]);
    }

    #[test]
    fn blank_and_whitespace_paragraphs_are_dropped() {
        let text = "First paragraph.\n\n   \n\nSecond paragraph.\n\n\n";
        let chunks = chunker(1100, 150).chunk(text).unwrap();
        assert_eq!(chunks, vec!["First paragraph.", "Second paragraph."]);
    }

    #[test]
    fn two_thousand_chars_yield_two_overlapping_windows() {
        let para = filler(2000);
        let chunks = chunker(1100, 150).chunk(&para).unwrap();

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chars().count(), 1100);
        // The second window starts 150 characters before the first one ends.
        assert_eq!(chunks[1], para[1100 - 150..].to_string());
        assert_eq!(chunks[0][1100 - 150..], chunks[1][..150]);
    }

    #[test]
    fn windows_cover_the_paragraph_without_gaps() {
        let para = filler(5000);
        let overlap = 150;
        let chunks = chunker(1100, overlap).chunk(&para).unwrap();
        assert!(chunks.len() > 2);

        // Dropping each chunk's leading overlap reconstructs the original.
        let mut rebuilt = chunks[0].clone();
        for chunk in &chunks[1..] {
            rebuilt.push_str(&chunk[overlap..]);
        }
        assert_eq!(rebuilt, para);
    }

    #[test]
    fn window_extends_to_sentence_terminator() {
        // Terminator sits 10 characters past the target, well inside the
        // 50-character slack.
        let mut para = filler(110);
        para.push_str(". ");
        para.push_str(&filler(200));
        let chunks = chunker(100, 20).chunk(&para).unwrap();

        assert!(chunks[0].ends_with('.'), "chunk was {:?}", chunks[0]);
        assert_eq!(chunks[0].chars().count(), 111);
    }

    #[test]
    fn no_terminator_within_slack_keeps_hard_boundary() {
        let para = filler(300);
        let chunks = chunker(100, 20).chunk(&para).unwrap();
        assert_eq!(chunks[0].chars().count(), 100);
    }

    #[test]
    fn never_emits_empty_or_whitespace_chunks() {
        let text = "word\n\n\n\n.\n\n   \n\nanother word";
        for chunk in chunker(50, 10).chunk(text).unwrap() {
            assert!(!chunk.trim().is_empty());
        }
    }

    #[test]
    fn paragraph_shorter_than_overlap_is_single_chunk() {
        let chunks = chunker(1100, 150).chunk("tiny").unwrap();
        assert_eq!(chunks, vec!["tiny".to_string()]);
    }

    #[test]
    fn termination_is_proportional_to_text_length() {
        let para = filler(10_000);
        let target = 100;
        let overlap = 40;
        let chunks = chunker(target, overlap).chunk(&para).unwrap();
        // At most len / (target - overlap) + 1 windows.
        assert!(chunks.len() <= 10_000 / (target - overlap) + 1);
    }

    #[test]
    fn overlap_must_stay_below_target() {
        assert!(ParagraphChunker::new(100, 100).is_err());
        assert!(ParagraphChunker::new(100, 250).is_err());
        assert!(ParagraphChunker::new(100, 99).is_ok());
    }

    #[test]
    fn multibyte_text_is_windowed_on_character_boundaries() {
        let para: String = "héllo wörld ünïcode ".repeat(30);
        let chunks = chunker(100, 20).chunk(&para).unwrap();
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(!chunk.is_empty());
        }
    }
}
