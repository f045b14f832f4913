//! Injection pattern detection
//!
//! Evaluates text against a fixed set of named signatures covering
//! instruction-override phrasing, shell subprocess substitution, backtick
//! execution, and chained destructive commands. One detection contract
//! serves two call sites: raw commands (blocked on detection) and memory
//! content (escalated to a critical alert).

use crate::error::{Error, Result};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// Signature definitions, in declaration order.
///
/// The bool marks case-insensitive matching for natural-language phrasing;
/// syntactic signatures match case-sensitively.
const SIGNATURES: &[(&str, &str, bool)] = &[
    (
        "ignore_instructions",
        r"ignore\s*(all)?\s*(previous)?\s*(instructions)?",
        true,
    ),
    (
        "disregard_instructions",
        r"disregard\s*(all)?\s*(previous)?\s*(instructions)?",
        true,
    ),
    ("subprocess", r"\$\([^)]+\)", false),
    ("backtick", r"`[^`]+`", false),
    ("block_read", r"\bread\b.*\|\|.*\b(cat|head|tail)\b", true),
    ("command_injection", r";\s*(rm|curl|wget|ssh)", true),
];

/// Result of scanning text for injection signatures
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjectionFinding {
    /// Names of every signature that matched, in declaration order
    pub matched_signatures: Vec<String>,
    /// True iff no signature matched
    pub clean: bool,
}

/// Injection signature scanner.
///
/// All signatures are tested independently; a single input may match any
/// subset of them.
#[derive(Debug)]
pub struct InjectionDetector {
    signatures: Vec<(&'static str, Regex)>,
}

impl InjectionDetector {
    /// Create a detector with the built-in signature set compiled.
    pub fn new() -> Result<Self> {
        let signatures = SIGNATURES
            .iter()
            .map(|(name, pattern, case_insensitive)| {
                let regex = RegexBuilder::new(pattern)
                    .case_insensitive(*case_insensitive)
                    .build()
                    .map_err(|e| {
                        Error::Detection(format!("invalid signature '{}': {}", name, e))
                    })?;
                Ok((*name, regex))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { signatures })
    }

    /// Scan text against every signature.
    pub fn detect(&self, text: &str) -> InjectionFinding {
        let matched_signatures: Vec<String> = self
            .signatures
            .iter()
            .filter(|(_, regex)| regex.is_match(text))
            .map(|(name, _)| (*name).to_string())
            .collect();

        let clean = matched_signatures.is_empty();
        if !clean {
            tracing::warn!(
                signatures = ?matched_signatures,
                "Injection patterns detected"
            );
        }

        InjectionFinding {
            matched_signatures,
            clean,
        }
    }
}
