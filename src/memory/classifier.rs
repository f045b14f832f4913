//! Memory content classification
//!
//! Assigns a trust classification and semantic tags to memory content.
//! Tags are independent per category; a record may carry any subset.

use chrono::{DateTime, Utc};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{Error, Result};

/// Trust classification of a memory record.
///
/// The memory vocabulary, distinct from the sanitizer's
/// [`crate::guard::SourceTrust`]; the two are intentionally not unified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustLevel {
    /// Core identity, user preferences, security rules
    Verified,
    /// Projects, goals, relationships, tasks
    Trusted,
    /// Notes, conversations, learned facts
    Medium,
    /// External content, web/email summaries
    Untrusted,
}

impl TrustLevel {
    /// Lowercase wire name of the level.
    pub fn as_str(&self) -> &'static str {
        match self {
            TrustLevel::Verified => "verified",
            TrustLevel::Trusted => "trusted",
            TrustLevel::Medium => "medium",
            TrustLevel::Untrusted => "untrusted",
        }
    }

    /// Parse a trust level string. Unrecognized values coerce to
    /// `Untrusted`.
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "verified" => TrustLevel::Verified,
            "trusted" => TrustLevel::Trusted,
            "medium" => TrustLevel::Medium,
            _ => TrustLevel::Untrusted,
        }
    }
}

/// Tag: content phrased like commands or instructions.
pub const TAG_CONTAINS_COMMANDS: &str = "contains-commands";
/// Tag: secret-like keywords (password, token, key, ...).
pub const TAG_CONTAINS_SECRETS: &str = "contains-secrets";
/// Tag: URL-like substrings.
pub const TAG_CONTAINS_URLS: &str = "contains-urls";
/// Tag: shell/template expression syntax.
pub const TAG_CONTAINS_EXPRESSIONS: &str = "contains-expressions";
/// Tag: instruction-override phrasing.
pub const TAG_SUSPICIOUS_INSTRUCTIONS: &str = "suspicious-instructions";
/// Tag: destructive subprocess substitution.
pub const TAG_CRITICAL_DANGER: &str = "critical-danger";

/// Tag rules, each contributing one tag when matched.
const TAG_RULES: &[(&str, &str, bool)] = &[
    (TAG_CONTAINS_COMMANDS, r"instruction|command|do\s", true),
    (TAG_CONTAINS_SECRETS, r"password|token|key|secret|api", true),
    (TAG_CONTAINS_URLS, r"http|https|www\.", true),
    (TAG_CONTAINS_EXPRESSIONS, r"\$\(|\{|`", false),
    (TAG_SUSPICIOUS_INSTRUCTIONS, r"\bignore\b|\bdisregard\b", true),
    (TAG_CRITICAL_DANGER, r"\$\(rm|\$\(delete", true),
];

/// A classified piece of memory content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// The memory content, unmodified
    pub content: String,
    /// Trust classification
    pub classification: TrustLevel,
    /// When the record was classified
    pub timestamp: DateTime<Utc>,
    /// Whether the record must be verified before use
    pub requires_verification: bool,
    /// Semantic tags found in the content
    pub tags: BTreeSet<String>,
}

/// Produces classified memory records from raw content
#[derive(Debug)]
pub struct MemoryClassifier {
    rules: Vec<(&'static str, Regex)>,
}

impl MemoryClassifier {
    /// Create a classifier with the built-in tag rules compiled.
    pub fn new() -> Result<Self> {
        let rules = TAG_RULES
            .iter()
            .map(|(tag, pattern, case_insensitive)| {
                let regex = RegexBuilder::new(pattern)
                    .case_insensitive(*case_insensitive)
                    .build()
                    .map_err(|e| Error::Memory(format!("invalid tag rule '{}': {}", tag, e)))?;
                Ok((*tag, regex))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { rules })
    }

    /// Classify content under the given trust level.
    ///
    /// `requires_verification` derives solely from the classification,
    /// never from the tags.
    pub fn classify(&self, content: &str, classification: TrustLevel) -> MemoryRecord {
        MemoryRecord {
            content: content.to_string(),
            classification,
            timestamp: Utc::now(),
            requires_verification: classification == TrustLevel::Untrusted,
            tags: self.generate_tags(content),
        }
    }

    /// Scan content against every tag rule.
    pub fn generate_tags(&self, content: &str) -> BTreeSet<String> {
        self.rules
            .iter()
            .filter(|(_, regex)| regex.is_match(content))
            .map(|(tag, _)| (*tag).to_string())
            .collect()
    }
}
