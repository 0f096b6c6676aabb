//! Text chunking for TTS processing.

use std::sync::OnceLock;

use regex::Regex;

use super::normalizer::normalize;
use super::TextChunk;

/// Default maximum chunk size in characters.
pub const DEFAULT_MAX_CHARS: usize = 1500;

/// Sentence boundary: terminal punctuation followed by whitespace.
static SENTENCE_END: OnceLock<Regex> = OnceLock::new();

fn sentence_end() -> &'static Regex {
    SENTENCE_END.get_or_init(|| Regex::new(r"[.!?]\s+").expect("sentence regex is valid"))
}

/// Split text into rough sentences.
///
/// A boundary sits right after any `.`, `!` or `?` followed by whitespace; the
/// whitespace itself is dropped. Abbreviations and decimals are not treated
/// specially.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for m in sentence_end().find_iter(text) {
        // The punctuation mark is ASCII, so +1 stays on a char boundary.
        sentences.push(&text[start..m.start() + 1]);
        start = m.end();
    }
    sentences.push(&text[start..]);

    sentences
}

/// Split text into chunks that are small enough for TTS engines.
///
/// Sentences are packed greedily into chunks of at most `max_chars`
/// characters, joined by single spaces. A sentence that alone exceeds the
/// bound is flushed on its own and hard-split into fixed-size slices with no
/// regard for word boundaries.
pub fn split(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut buf: Vec<&str> = Vec::new();
    let mut buf_len = 0;

    for sentence in split_sentences(text) {
        let sentence = sentence.trim();
        if sentence.is_empty() {
            continue;
        }

        let sentence_len = sentence.chars().count();

        // A single oversized sentence is hard-split on its own.
        if sentence_len > max_chars {
            flush(&mut buf, &mut buf_len, &mut chunks);
            chunks.extend(hard_split(sentence, max_chars));
            continue;
        }

        let tentative_len = if buf.is_empty() {
            sentence_len
        } else {
            buf_len + 1 + sentence_len
        };

        if tentative_len <= max_chars {
            buf.push(sentence);
            buf_len = tentative_len;
        } else {
            flush(&mut buf, &mut buf_len, &mut chunks);
            buf.push(sentence);
            buf_len = sentence_len;
        }
    }

    flush(&mut buf, &mut buf_len, &mut chunks);

    chunks.retain(|c| !c.trim().is_empty());
    chunks
}

/// Emit the buffered sentences as one chunk and clear the buffer.
fn flush(buf: &mut Vec<&str>, buf_len: &mut usize, chunks: &mut Vec<String>) {
    if !buf.is_empty() {
        chunks.push(buf.join(" ").trim().to_string());
        buf.clear();
        *buf_len = 0;
    }
}

/// Hard split text into consecutive slices of at most `max_chars` characters.
fn hard_split(text: &str, max_chars: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(max_chars)
        .map(|slice| slice.iter().collect())
        .collect()
}

/// Normalize a page's raw text and split it into keyed chunks.
///
/// Chunk indices are 1-based within the page.
pub fn chunk_page(page: usize, raw: &str, max_chars: usize) -> Vec<TextChunk> {
    let text = normalize(raw);

    split(&text, max_chars)
        .into_iter()
        .enumerate()
        .map(|(i, text)| TextChunk::new(page, i + 1, text))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_split_short_text() {
        let chunks = split("Hello world. How are you?", 1500);
        assert_eq!(chunks, vec!["Hello world. How are you?"]);
    }

    #[test]
    fn test_split_empty_text() {
        assert!(split("", 1500).is_empty());
        assert!(split("   ", 1500).is_empty());
        assert!(split("\n\n \t", 10).is_empty());
    }

    #[test]
    fn test_split_packs_sentences() {
        let text = "One two. Three four. Five six.";
        let chunks = split(text, 20);
        assert_eq!(chunks, vec!["One two. Three four.", "Five six."]);
    }

    #[test]
    fn test_split_exact_fit() {
        // "Aaaa. Bbbb." is 11 characters
        let chunks = split("Aaaa. Bbbb.", 11);
        assert_eq!(chunks, vec!["Aaaa. Bbbb."]);

        let chunks = split("Aaaa. Bbbb.", 10);
        assert_eq!(chunks, vec!["Aaaa.", "Bbbb."]);
    }

    #[test]
    fn test_split_oversized_sentence_is_hard_split() {
        let text = "Hi. abcdefghij! Bye.";
        let chunks = split(text, 4);
        assert_eq!(chunks, vec!["Hi.", "abcd", "efgh", "ij!", "Bye."]);
    }

    #[test]
    fn test_split_oversized_sentence_not_merged_with_neighbors() {
        let text = "A. 0123456789 B.";
        // "0123456789 B." has no boundary inside, so it is one long sentence
        let chunks = split(text, 6);
        assert_eq!(chunks, vec!["A.", "012345", "6789 B", "."]);
    }

    #[test]
    fn test_split_abbreviations_are_not_special() {
        let sentences = split_sentences("Dr. Smith paid 3.5 dollars. Done");
        assert_eq!(sentences, vec!["Dr.", "Smith paid 3.5 dollars.", "Done"]);
    }

    #[test]
    fn test_split_sentences_consumes_whitespace_runs() {
        let sentences = split_sentences("Wait!\n\n  Really?  Yes.");
        assert_eq!(sentences, vec!["Wait!", "Really?", "Yes."]);
    }

    #[test]
    fn test_split_counts_characters_not_bytes() {
        let text = "héllo wörld";
        let chunks = split(text, 5);
        assert_eq!(chunks, vec!["héllo", " wörl", "d"]);
    }

    #[test]
    fn test_split_zero_bound_is_clamped() {
        let chunks = split("abc", 0);
        assert_eq!(chunks, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_hard_split() {
        let parts = hard_split("abcdefghij", 3);
        assert_eq!(parts, vec!["abc", "def", "ghi", "j"]);
    }

    #[test]
    fn test_chunk_page_keys() {
        let text = "First sentence. Second sentence. Third sentence.";
        let chunks = chunk_page(5, text, 20);
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.page == 5));
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i + 1);
        }
    }

    #[test]
    fn test_chunk_page_blank() {
        assert!(chunk_page(1, " \r\n\t ", 1500).is_empty());
    }

    fn strip_whitespace(s: &str) -> String {
        s.chars().filter(|c| !c.is_whitespace()).collect()
    }

    proptest! {
        #[test]
        fn prop_chunks_respect_bound(text in "[a-z .!?\\n]{0,300}", max in 1usize..60) {
            for chunk in split(&text, max) {
                prop_assert!(chunk.chars().count() <= max, "{:?} > {}", chunk, max);
                prop_assert!(!chunk.trim().is_empty());
            }
        }

        #[test]
        fn prop_chunks_preserve_characters(text in "[a-z .!?\\n]{0,300}", max in 1usize..60) {
            let normalized = normalize(&text);
            let joined = split(&normalized, max).join(" ");
            prop_assert_eq!(strip_whitespace(&joined), strip_whitespace(&normalized));
        }
    }
}
