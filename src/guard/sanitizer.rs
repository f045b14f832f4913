//! External content sanitization
//!
//! Rewrites externally sourced text by substituting dangerous constructs
//! with literal marker tokens, classifies the source's trust level, and
//! computes diagnostic warnings over the original input. Substitutions run
//! in a fixed order, globally, in a single pass; the rules never inspect
//! nesting depth or re-scan after a replacement.

use chrono::{DateTime, Utc};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Trust classification of a content source.
///
/// This is the sanitizer's vocabulary. The memory subsystem has its own,
/// separate trust vocabulary ([`crate::memory::TrustLevel`]); the two are
/// intentionally not unified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTrust {
    /// Direct user input
    High,
    /// Internally produced content (memory, files, skills)
    Medium,
    /// Externally fetched content (web, email, chat platforms)
    Low,
    /// Source not recognized
    Unknown,
}

/// Resolve a source name to its trust level. Lookup is case-insensitive.
pub fn source_trust(source: &str) -> SourceTrust {
    match source.to_lowercase().as_str() {
        "user" => SourceTrust::High,
        "memory" | "file" | "skill" => SourceTrust::Medium,
        "email" | "web" | "api" | "discord" | "telegram" | "whatsapp" => SourceTrust::Low,
        _ => SourceTrust::Unknown,
    }
}

/// Result of sanitizing one piece of content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SanitizationResult {
    /// The input exactly as received, retained for audit
    pub original: String,
    /// The rewritten text with dangerous constructs replaced by markers
    pub sanitized: String,
    /// Trust level resolved from the source
    pub trust_level: SourceTrust,
    /// Source name as given by the caller
    pub source: String,
    /// When sanitization ran
    pub timestamp: DateTime<Utc>,
    /// Diagnostic warnings computed over the original input
    pub warnings: Vec<String>,
}

/// Substitution rules, in application order. Each replacement is global.
const SUBSTITUTIONS: &[(&str, bool, &str)] = &[
    (
        r"ignore\s*(all)?\s*(previous)?\s*(instructions)?",
        true,
        "[BLOCKED-INSTRUCTION]",
    ),
    (
        r"disregard\s*(all)?\s*(previous)?\s*(instructions)?",
        true,
        "[BLOCKED-INSTRUCTION]",
    ),
    (
        r"do\s*(not|n't)?\s*(follow|obey|listen)\s*(to)?",
        true,
        "[BLOCKED-INSTRUCTION]",
    ),
    (r"\$\([^)]+\)", false, "[BLOCKED-SUBPROCESS]"),
    (r"`[^`]+`", false, "[BLOCKED-BACKTICK]"),
    (r"\{[^}]+\}", false, "[BLOCKED-BRACE]"),
];

/// Warning rules, each contributing one fixed message when matched.
const WARNING_RULES: &[(&str, bool, &str)] = &[
    (
        r"\b(rm|del|delete|wipe|format)\b",
        true,
        "Contains destructive command keywords",
    ),
    (r"\$\(", false, "Contains command substitution"),
    (r"sudo", true, "Requests elevated privileges"),
    (r"\|\s*(bash|sh|shell)", true, "Contains pipe to shell"),
    (r">\s*~", false, "Redirects to home directory"),
    (r";\s*rm", true, "Contains command chain with rm"),
];

struct Substitution {
    regex: Regex,
    marker: &'static str,
}

struct WarningRule {
    regex: Regex,
    message: &'static str,
}

/// Rewrites external content and classifies its source trust
pub struct ContentSanitizer {
    substitutions: Vec<Substitution>,
    warning_rules: Vec<WarningRule>,
}

impl ContentSanitizer {
    /// Create a sanitizer with the built-in rules compiled.
    pub fn new() -> Result<Self> {
        let substitutions = SUBSTITUTIONS
            .iter()
            .map(|&(pattern, case_insensitive, marker)| {
                Ok(Substitution {
                    regex: compile(pattern, case_insensitive)?,
                    marker,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let warning_rules = WARNING_RULES
            .iter()
            .map(|&(pattern, case_insensitive, message)| {
                Ok(WarningRule {
                    regex: compile(pattern, case_insensitive)?,
                    message,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            substitutions,
            warning_rules,
        })
    }

    /// Sanitize content from the named source.
    ///
    /// A single pass suffices because marker tokens do not themselves match
    /// any substitution rule; overlapping constructs spanning two rule
    /// types may still survive the pass (documented limitation).
    pub fn sanitize(&self, input: &str, source: &str) -> SanitizationResult {
        let mut sanitized = input.to_string();
        for sub in &self.substitutions {
            sanitized = sub.regex.replace_all(&sanitized, sub.marker).into_owned();
        }

        SanitizationResult {
            original: input.to_string(),
            sanitized,
            trust_level: source_trust(source),
            source: source.to_string(),
            timestamp: Utc::now(),
            warnings: self.detect_warnings(input),
        }
    }

    /// Compute diagnostic warnings for the input. Does not rewrite anything.
    pub fn detect_warnings(&self, input: &str) -> Vec<String> {
        self.warning_rules
            .iter()
            .filter(|rule| rule.regex.is_match(input))
            .map(|rule| rule.message.to_string())
            .collect()
    }
}

fn compile(pattern: &str, case_insensitive: bool) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .build()
        .map_err(|e| Error::Sanitize(format!("invalid rule '{}': {}", pattern, e)))
}
