//! Text normalization and tokenization shared by the profiler and the scorer

use regex::Regex;
use std::collections::HashSet;
use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone)]
pub struct TextProcessor {
    stop_words: HashSet<String>,
    min_token_length: usize,
    email_regex: Regex,
    url_regex: Regex,
}

impl Default for TextProcessor {
    fn default() -> Self {
        Self::new(3, &[])
    }
}

impl TextProcessor {
    pub fn new(min_token_length: usize, extra_stop_words: &[String]) -> Self {
        let mut stop_words = Self::create_stop_words();
        stop_words.extend(extra_stop_words.iter().map(|w| w.to_lowercase()));

        let email_regex = Regex::new(r"[\w.%+-]+@[\w.-]+\.[a-zA-Z]{2,}")
            .expect("Invalid email regex");

        let url_regex = Regex::new(r"(?:https?://|www\.)\S+")
            .expect("Invalid URL regex");

        Self {
            stop_words,
            min_token_length,
            email_regex,
            url_regex,
        }
    }

    /// Lowercase, drop URLs and emails, fold typographic punctuation
    pub fn normalize(&self, text: &str) -> String {
        let lowered = text.to_lowercase();
        let without_urls = self.url_regex.replace_all(&lowered, " ");
        let without_emails = self.email_regex.replace_all(&without_urls, " ");

        without_emails
            .chars()
            .map(|c| match c {
                '\u{2018}' | '\u{2019}' => '\'',
                '\u{201C}' | '\u{201D}' => '"',
                '\u{2013}' | '\u{2014}' => '-',
                '\u{2022}' | '\u{00B7}' => ' ',
                _ => c,
            })
            .collect()
    }

    /// Tokens of already normalized text, in order of appearance
    pub fn tokenize_normalized(&self, normalized: &str) -> Vec<String> {
        normalized
            .unicode_words()
            .filter(|word| word.chars().count() >= self.min_token_length)
            .filter(|word| word.chars().any(char::is_alphabetic))
            .filter(|word| !self.stop_words.contains(*word))
            .map(str::to_string)
            .collect()
    }

    pub fn tokenize(&self, text: &str) -> Vec<String> {
        self.tokenize_normalized(&self.normalize(text))
    }

    /// True when `term` survives tokenization unchanged as a single token
    pub fn is_single_token(&self, term: &str) -> bool {
        let tokens = self.tokenize(term);
        tokens.len() == 1 && tokens[0] == term
    }

    /// English stop words plus common Turkish function words
    fn create_stop_words() -> HashSet<String> {
        let stop_words = [
            // English
            "a", "about", "above", "after", "again", "against", "all", "also", "am", "an",
            "and", "any", "are", "as", "at", "be", "because", "been", "before", "being",
            "below", "between", "both", "but", "by", "can", "could", "did", "do", "does",
            "doing", "down", "during", "each", "etc", "few", "for", "from", "further", "had",
            "has", "have", "having", "he", "her", "here", "hers", "him", "his", "how", "i",
            "if", "in", "into", "is", "it", "its", "itself", "just", "me", "more", "most",
            "my", "myself", "no", "nor", "not", "now", "of", "off", "on", "once", "only",
            "or", "other", "our", "ours", "out", "over", "own", "same", "she", "should",
            "so", "some", "such", "than", "that", "the", "their", "theirs", "them", "then",
            "there", "these", "they", "this", "those", "through", "to", "too", "under",
            "until", "up", "very", "was", "we", "were", "what", "when", "where", "which",
            "while", "who", "whom", "why", "will", "with", "within", "would", "you", "your",
            "yours", "per", "via", "using", "used", "well", "including", "across", "around",
            // Turkish
            "ve", "ile", "için", "bir", "bu", "şu", "da", "de", "ki", "mi", "gibi", "olarak",
            "olan", "daha", "çok", "en", "veya", "ya", "ise", "her", "tüm", "kadar", "sonra",
            "önce", "üzere", "ayrıca", "ancak", "değil", "var", "yok",
        ];

        stop_words.iter().map(|&s| s.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenization_filters_short_and_stop_words() {
        let processor = TextProcessor::default();
        let tokens = processor.tokenize("Rust is a systems programming language for the web!");

        assert!(tokens.contains(&"rust".to_string()));
        assert!(tokens.contains(&"systems".to_string()));
        assert!(tokens.contains(&"programming".to_string()));
        assert!(!tokens.contains(&"is".to_string()));
        assert!(!tokens.contains(&"the".to_string()));
        assert!(!tokens.contains(&"for".to_string()));
    }

    #[test]
    fn test_urls_and_emails_are_dropped() {
        let processor = TextProcessor::default();
        let tokens = processor.tokenize("Reach me at jane.roe@example.com or https://janeroe.dev/portfolio");

        assert!(tokens.contains(&"reach".to_string()));
        assert!(!tokens.iter().any(|t| t.contains("example")));
        assert!(!tokens.iter().any(|t| t.contains("janeroe")));
    }

    #[test]
    fn test_min_length_counts_characters_not_bytes() {
        let processor = TextProcessor::new(3, &[]);
        // "iş" is two characters but three bytes
        let tokens = processor.tokenize("iş ilanı");
        assert_eq!(tokens, vec!["ilanı".to_string()]);
    }

    #[test]
    fn test_extra_stop_words_are_lowercased() {
        let processor = TextProcessor::new(3, &["Responsibilities".to_string()]);
        assert!(processor.tokenize("Responsibilities include Kotlin").iter().all(|t| t != "responsibilities"));
    }

    #[test]
    fn test_single_token_detection() {
        let processor = TextProcessor::default();
        assert!(processor.is_single_token("python"));
        assert!(!processor.is_single_token("machine learning"));
        assert!(!processor.is_single_token("c++"));
        assert!(!processor.is_single_token("ci/cd"));
    }
}
