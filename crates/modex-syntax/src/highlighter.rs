//! Cached highlighting front end.

use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::cache::SyntaxCache;
use crate::language::Language;
use crate::tokenizer::tokenize;
use crate::SyntaxToken;

/// Highlighter limits, loaded from the `[syntax]` config section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntaxConfig {
    /// Maximum cached lines before eviction
    pub cache_capacity: usize,
    /// Share of the oldest entries dropped when the cache is full
    pub evict_ratio: f64,
    /// Seconds between idle sweeps
    pub sweep_interval_secs: u64,
    /// Entries unused this long are swept
    pub idle_ttl_secs: u64,
    /// Longer lines (in characters) are never tokenized
    pub max_line_length: usize,
}

impl Default for SyntaxConfig {
    fn default() -> Self {
        Self {
            cache_capacity: 1000,
            evict_ratio: 0.7,
            sweep_interval_secs: 30,
            idle_ttl_secs: 60,
            max_line_length: 1000,
        }
    }
}

/// A line together with its tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightedLine {
    pub text: String,
    pub tokens: Vec<SyntaxToken>,
}

/// Tokenizes lines through a [`SyntaxCache`].
#[derive(Debug)]
pub struct Highlighter {
    cache: SyntaxCache,
    config: SyntaxConfig,
}

impl Highlighter {
    pub fn new(config: SyntaxConfig) -> Self {
        Self {
            cache: SyntaxCache::new(&config),
            config,
        }
    }

    /// Highlights one line of the file `filename` using the real clock.
    pub fn highlight_line(&mut self, filename: Option<&str>, text: &str) -> Vec<SyntaxToken> {
        self.highlight_line_at(filename, text, Instant::now())
    }

    /// Highlights one line at the given instant.
    ///
    /// Plain-text files and lines longer than `max_line_length` return no
    /// tokens and never touch the cache.
    pub fn highlight_line_at(
        &mut self,
        filename: Option<&str>,
        text: &str,
        now: Instant,
    ) -> Vec<SyntaxToken> {
        let language = Language::from_filename(filename);
        if language == Language::PlainText {
            return Vec::new();
        }
        if too_long(text, self.config.max_line_length) {
            tracing::trace!("Skipping highlight of {}-byte line", text.len());
            return Vec::new();
        }

        self.cache.maybe_sweep(now);
        let key = filename.unwrap_or_default();
        if let Some(tokens) = self.cache.get(key, text, now) {
            return tokens;
        }

        let tokens = tokenize(text, language);
        self.cache.insert(key, text, tokens.clone(), now);
        tokens
    }

    /// Highlights a run of lines (typically the viewport).
    pub fn highlight_lines<'a>(
        &mut self,
        filename: Option<&str>,
        lines: impl IntoIterator<Item = &'a str>,
    ) -> Vec<HighlightedLine> {
        let now = Instant::now();
        lines
            .into_iter()
            .map(|text| HighlightedLine {
                text: text.to_string(),
                tokens: self.highlight_line_at(filename, text, now),
            })
            .collect()
    }

    pub fn config(&self) -> &SyntaxConfig {
        &self.config
    }

    pub fn cache(&self) -> &SyntaxCache {
        &self.cache
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new(SyntaxConfig::default())
    }
}

/// Character-length ceiling check. The byte length bounds the character
/// count, so short lines skip the count.
fn too_long(text: &str, max_chars: usize) -> bool {
    text.len() > max_chars && text.chars().count() > max_chars
}
