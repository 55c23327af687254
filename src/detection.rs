//! Keyword search over transcripts.
//!
//! Matching is case-insensitive and positions are counted in characters, not
//! bytes, so spans stay meaningful for non-Latin scripts.

use crate::error::{KwsError, Result};
use serde::Serialize;
use strum::{Display, EnumString};

/// Case-fold a keyword or transcript for comparison
pub fn normalize_keyword(keyword: &str) -> String {
    keyword.to_lowercase()
}

/// Normalized, de-duplicated keywords in the order they were given
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordSet {
    keywords: Vec<String>,
}

impl KeywordSet {
    pub fn new<I, S>(keywords: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for keyword in keywords {
            let keyword = keyword.as_ref();
            if keyword.trim().is_empty() {
                return Err(KwsError::InvalidInput(
                    "Keywords cannot be empty".to_string(),
                ));
            }
            let keyword = normalize_keyword(keyword);
            if !normalized.contains(&keyword) {
                normalized.push(keyword);
            }
        }

        if normalized.is_empty() {
            return Err(KwsError::InvalidInput(
                "At least one keyword is required".to_string(),
            ));
        }
        Ok(Self {
            keywords: normalized,
        })
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.keywords.iter().any(|k| k == keyword)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum DetectionMode {
    /// Only the first occurrence of each keyword
    #[default]
    First,
    /// Every non-overlapping occurrence, left to right
    All,
}

/// A keyword occurrence as a character span `[start, end)` of the normalized transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordMatch {
    pub keyword: String,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordPositions {
    pub keyword: String,
    pub spans: Vec<(usize, usize)>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Detection {
    pub matches: Vec<KeywordMatch>,
    pub detected: Vec<String>,
    pub positions: Vec<KeywordPositions>,
    pub missing: Vec<String>,
    /// Length of the normalized transcript in characters
    pub transcript_chars: usize,
}

impl Detection {
    pub fn spans_of(&self, keyword: &str) -> &[(usize, usize)] {
        self.positions
            .iter()
            .find(|p| p.keyword == keyword)
            .map(|p| p.spans.as_slice())
            .unwrap_or(&[])
    }
}

/// Find every keyword of `keywords` in `transcript`
pub fn detect_keywords(transcript: &str, keywords: &KeywordSet, mode: DetectionMode) -> Detection {
    let haystack = normalize_keyword(transcript);
    let mut detection = Detection {
        transcript_chars: haystack.chars().count(),
        ..Detection::default()
    };

    for keyword in keywords.keywords() {
        let spans = find_spans(&haystack, keyword, mode);

        if spans.is_empty() {
            log::info!("Keyword '{}' not found.", keyword);
            detection.missing.push(keyword.clone());
        } else {
            log::debug!("Keyword '{}' found at {:?}", keyword, spans);
            detection.detected.push(keyword.clone());
            detection
                .matches
                .extend(spans.iter().map(|&(start, end)| KeywordMatch {
                    keyword: keyword.clone(),
                    start,
                    end,
                }));
        }

        detection.positions.push(KeywordPositions {
            keyword: keyword.clone(),
            spans,
        });
    }

    detection
}

fn find_spans(haystack: &str, needle: &str, mode: DetectionMode) -> Vec<(usize, usize)> {
    let needle_chars = needle.chars().count();
    let mut spans = Vec::new();
    let mut byte_pos = 0;
    let mut char_pos = 0;

    while let Some(found) = haystack[byte_pos..].find(needle) {
        let start = char_pos + haystack[byte_pos..byte_pos + found].chars().count();
        spans.push((start, start + needle_chars));

        if mode == DetectionMode::First {
            break;
        }
        byte_pos += found + needle.len();
        char_pos = start + needle_chars;
    }
    spans
}
