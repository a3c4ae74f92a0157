//! OS normalization: fuzzy-matches raw guest OS strings against the
//! pattern library.
//!
//! DESIGN
//! ======
//! The normalizer prefers over-flagging. A match scoring under the configured
//! threshold is returned with `low_confidence = true`, which the classifier
//! turns into `needs_info` instead of silently mis-classifying the VM.
//!
//! Scoring is a token-sort ratio: both sides are lowercased, stripped of
//! bit-depth noise, split on whitespace, sorted, re-joined and compared with
//! the normalized Indel similarity `2 * LCS / (len_a + len_b)`. Ties keep the
//! earliest library entry.

use std::sync::LazyLock;

use rapidfuzz::distance::indel;
use regex::Regex;
use tracing::{debug, warn};

use super::os_patterns::{OS_PATTERNS, OsPattern};

static NOISE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*\(\s*(?:32|64)\s*[- ]?\s*bit\s*\)\s*|\s*\(x86(?:-64)?\)\s*").expect("noise regex compiles")
});

// Most specific first: "2012 R2", "2022", "22.04 LTS", "15 SP4", "8".
static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{4}\s+R\d|\d{4}|\d+\.\d+(?:\.\d+)?(?:\s+LTS)?|\d+(?:\s+SP\d)?)\b").expect("version regex compiles")
});

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex compiles"));

/// Structured result of OS normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedOs {
    /// e.g. "Windows Server 2022", "RHEL 8", "Unknown".
    pub os_interpreted: String,
    pub os_vendor: Option<&'static str>,
    pub os_family: Option<&'static str>,
    pub os_version: Option<String>,
    /// 0.0 to 1.0.
    pub confidence: f64,
    pub low_confidence: bool,
}

impl NormalizedOs {
    fn unknown() -> Self {
        Self {
            os_interpreted: "Unknown".to_owned(),
            os_vendor: None,
            os_family: None,
            os_version: None,
            confidence: 0.0,
            low_confidence: true,
        }
    }
}

struct Choice {
    sorted: String,
    pattern: &'static OsPattern,
}

pub struct OsNormalizer {
    choices: Vec<Choice>,
    /// 0.0 to 1.0.
    threshold: f64,
}

impl OsNormalizer {
    /// Build a normalizer over the built-in pattern library.
    ///
    /// `threshold` is a ratio (0.0-1.0); see `Settings::confidence_threshold`.
    #[must_use]
    pub fn new(threshold: f64) -> Self {
        let choices = OS_PATTERNS
            .iter()
            .flat_map(|pattern| {
                pattern
                    .match_strings
                    .iter()
                    .map(move |s| Choice { sorted: sort_tokens(&preprocess(s)), pattern })
            })
            .collect();
        Self { choices, threshold }
    }

    /// Normalize a raw OS string. Never fails; unmatched input comes back as
    /// a low-confidence result.
    #[must_use]
    pub fn normalize(&self, raw_os: &str) -> NormalizedOs {
        if raw_os.trim().is_empty() {
            return NormalizedOs::unknown();
        }

        let version = extract_version(raw_os);
        let query = sort_tokens(&preprocess(raw_os));

        let mut best: Option<(&Choice, f64)> = None;
        for choice in &self.choices {
            let score = token_sort_ratio(&query, &choice.sorted);
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((choice, score));
            }
        }

        let Some((choice, confidence)) = best else {
            warn!(raw = raw_os, "os: pattern library is empty");
            return NormalizedOs { os_interpreted: raw_os.trim().to_owned(), os_version: version, ..NormalizedOs::unknown() };
        };

        let matched = choice.pattern;
        let low_confidence = confidence < self.threshold;
        let os_interpreted = match &version {
            Some(v) => format!("{} {v}", matched.canonical_name),
            None => matched.canonical_name.to_owned(),
        };

        if low_confidence {
            warn!(raw = raw_os, score = confidence, matched = matched.canonical_name, "os: low confidence match");
        } else {
            debug!(raw = raw_os, interpreted = %os_interpreted, confidence, "os: normalized");
        }

        NormalizedOs {
            os_interpreted,
            os_vendor: Some(matched.vendor),
            os_family: Some(matched.family),
            os_version: version,
            confidence,
            low_confidence,
        }
    }
}

/// Remove bit-depth qualifiers such as `(64-bit)` or `(x86)`.
fn strip_noise(s: &str) -> String {
    NOISE_RE.replace_all(s, " ").trim().to_owned()
}

/// First version token in the noise-stripped string.
pub(crate) fn extract_version(raw: &str) -> Option<String> {
    let cleaned = strip_noise(raw);
    VERSION_RE
        .captures(&cleaned)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_owned())
}

fn preprocess(s: &str) -> String {
    let lowered = strip_noise(s).to_lowercase();
    WHITESPACE_RE.replace_all(lowered.trim(), " ").into_owned()
}

/// Both inputs are already token-sorted.
fn token_sort_ratio(query: &str, choice: &str) -> f64 {
    indel::normalized_similarity(query.chars(), choice.chars())
}

fn sort_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

#[cfg(test)]
#[path = "os_normalizer_test.rs"]
mod tests;
