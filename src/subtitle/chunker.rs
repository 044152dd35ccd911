use crate::transcribe::Word;

/// Upper bound on words per caption cue
pub const MAX_WORDS_PER_CHUNK: usize = 8;

const SENTENCE_TERMINALS: [char; 3] = ['.', '!', '?'];

/// Contiguous run of words shown as one cue
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionChunk {
    pub words: Vec<String>,
    pub start: f64,
    pub end: f64,
}

impl CaptionChunk {
    pub fn text(&self) -> String {
        self.words.join(" ")
    }
}

fn ends_sentence(text: &str) -> bool {
    text.contains(SENTENCE_TERMINALS)
}

/// Greedy single-pass segmentation of a word sequence into caption chunks.
///
/// A chunk closes after a word containing `.`, `!` or `?`, once it holds
/// `MAX_WORDS_PER_CHUNK` words, or at the last word. Empty input yields no
/// chunks.
pub fn chunk_words(words: &[Word]) -> Vec<CaptionChunk> {
    let mut chunks = Vec::new();
    let mut current: Option<CaptionChunk> = None;

    for (index, word) in words.iter().enumerate() {
        let chunk = current.get_or_insert_with(|| CaptionChunk {
            words: Vec::with_capacity(MAX_WORDS_PER_CHUNK),
            start: word.start,
            end: word.end,
        });
        chunk.words.push(word.text.clone());
        chunk.end = word.end;

        let is_last = index + 1 == words.len();
        if ends_sentence(&word.text) || chunk.words.len() >= MAX_WORDS_PER_CHUNK || is_last {
            chunks.extend(current.take());
        }
    }

    chunks
}
