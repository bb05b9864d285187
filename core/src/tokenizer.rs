use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    // Two or more word characters; single letters never become terms.
    static ref RE: Regex = Regex::new(r"(?u)\b\w\w+\b").expect("valid regex");
}

/// English function words plus the request verbs people put in front of a
/// description ("show me", "tell me about").
pub const ENGLISH_STOPWORDS: &[&str] = &[
    "i","me","my","myself","we","our","ours","ourselves","you","your","yours","yourself","yourselves",
    "he","him","his","himself","she","her","hers","herself","it","its","itself",
    "they","them","their","theirs","themselves",
    "what","which","who","whom","this","that","these","those",
    "am","is","are","was","were","be","been","being","have","has","had","having","do","does","did","doing",
    "a","an","the","and","but","if","or","because","as","until","while",
    "of","at","by","for","with","about","against","between","into","through","during","before","after",
    "above","below","to","from","up","down","in","out","on","off","over","under",
    "again","further","then","once","here","there","when","where","why","how",
    "all","any","both","each","few","more","most","other","some","such",
    "no","nor","not","only","own","same","so","than","too","very",
    "s","t","can","will","just","don","should","now",
    "show","give","tell",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stopwords {
    words: HashSet<String>,
}

impl Stopwords {
    pub fn english() -> Self {
        Self::from_words(ENGLISH_STOPWORDS.iter().copied())
    }

    pub fn none() -> Self {
        Self { words: HashSet::new() }
    }

    /// Builds a set from arbitrary words; entries are lower-cased so they
    /// compare against tokenizer output.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::none();
        set.extend(words);
        set
    }

    pub fn extend<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for w in words {
            let w = w.as_ref().trim().to_lowercase();
            if !w.is_empty() {
                self.words.insert(w);
            }
        }
    }

    pub fn contains(&self, token: &str) -> bool {
        self.words.contains(token)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Default for Stopwords {
    fn default() -> Self {
        Self::english()
    }
}

/// Splits text into normalized terms. The stopword set travels with the
/// tokenizer, so an index and its queries always agree on it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tokenizer {
    stopwords: Stopwords,
}

impl Tokenizer {
    pub fn new(stopwords: Stopwords) -> Self {
        Self { stopwords }
    }

    pub fn stopwords(&self) -> &Stopwords {
        &self.stopwords
    }

    /// Tokenize text using NFKC normalization, lowercase and stopword removal.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }
        let normalized = text.nfkc().collect::<String>().to_lowercase();
        RE.find_iter(&normalized)
            .map(|m| m.as_str())
            .filter(|t| !self.stopwords.contains(t))
            .map(str::to_string)
            .collect()
    }
}
