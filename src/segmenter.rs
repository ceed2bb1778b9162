use serde::{Deserialize, Serialize};

/// A word of the paragraph with inclusive character offsets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordSpan {
    pub word: String,
    pub start_index: usize,
    pub end_index: usize,
}

impl WordSpan {
    /// True if `index` falls on the word itself or on the space right after it.
    pub fn covers(&self, index: usize) -> bool {
        index >= self.start_index && index <= self.end_index + 1
    }
}

/// Split a paragraph on spaces into word spans.
///
/// Offsets count chars, not bytes. Empty tokens (doubled spaces) produce no
/// span but still consume their separator.
pub fn segment(text: &str) -> Vec<WordSpan> {
    let total = text.chars().count();
    let mut spans = Vec::new();
    let mut offset = 0;

    for word in text.split(' ') {
        let len = word.chars().count();
        if len > 0 {
            spans.push(WordSpan {
                word: word.to_string(),
                start_index: offset,
                end_index: (offset + len - 1).min(total - 1),
            });
        }
        offset += len + 1;
    }

    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_two_words() {
        let spans = segment("cat dog");

        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].word, "cat");
        assert_eq!((spans[0].start_index, spans[0].end_index), (0, 2));
        assert_eq!(spans[1].word, "dog");
        assert_eq!((spans[1].start_index, spans[1].end_index), (4, 6));
    }

    #[test]
    fn test_segment_empty_paragraph() {
        assert!(segment("").is_empty());
    }

    #[test]
    fn test_segment_single_char() {
        let spans = segment("a");
        assert_eq!(spans.len(), 1);
        assert_eq!((spans[0].start_index, spans[0].end_index), (0, 0));
    }

    #[test]
    fn test_segment_counts_chars_not_bytes() {
        let spans = segment("ąžuolas šaka");

        assert_eq!((spans[0].start_index, spans[0].end_index), (0, 6));
        assert_eq!((spans[1].start_index, spans[1].end_index), (8, 11));
    }

    #[test]
    fn test_segment_skips_doubled_spaces() {
        let spans = segment("a  b");

        assert_eq!(spans.len(), 2);
        assert_eq!(spans[1].word, "b");
        assert_eq!(spans[1].start_index, 3);
    }

    #[test]
    fn test_segment_trailing_space() {
        let spans = segment("hi ");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].end_index, 1);
    }

    #[test]
    fn test_covers_includes_separator() {
        let spans = segment("cat dog");

        assert!(spans[0].covers(0));
        assert!(spans[0].covers(3));
        assert!(!spans[0].covers(4));
        assert!(spans[1].covers(4));
        assert!(spans[1].covers(6));
    }

    #[test]
    fn test_doubled_space_is_not_covered() {
        let spans = segment("a  b");
        assert!(!spans.iter().any(|s| s.covers(2)));
    }
}
