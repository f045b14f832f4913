//! Static policy table
//!
//! Pure data, loaded once at startup and immutable afterwards. The blocked
//! patterns are evaluated against the full command string, not just the
//! base token; their exact semantics (including case-insensitivity flags)
//! are part of the engine's interoperability contract and must not be
//! simplified.

use crate::error::{Error, Result};
use regex::{Regex, RegexBuilder};
use std::collections::HashSet;

/// Base commands that may execute without further checks.
pub const SAFE_COMMANDS: &[&str] = &[
    "read", "write", "edit", "list", "search",
    "mkdir", "ls", "cat", "grep", "find",
    "echo", "pwd", "whoami", "date", "head", "tail",
    "open", "touch", "cp", "mv", "stat", "wc",
];

/// Base commands that are denied with a verification-specific reason.
pub const SENSITIVE_COMMANDS: &[&str] = &[
    "rm", "delete", "destroy", "wipe", "format",
    "sudo", "chmod", "chown", "chgrp",
    "curl", "wget", "nc", "netcat",
    "git", "docker", "npm", "pip", "cargo",
    "ssh", "scp", "rsync",
    "export", "source", "eval", "exec",
    "kill", "pkill", "killall",
];

/// Blocked pattern sources, in evaluation order.
///
/// The bool marks case-insensitive matching (natural-language phrasing);
/// syntactic tokens match case-sensitively.
const BLOCKED_PATTERNS: &[(&str, bool)] = &[
    (r"ignore\s*(all)?\s*(previous)?\s*(instructions)?", true),
    (r"disregard\s*(all)?\s*(previous)?\s*(instructions)?", true),
    (r"do\s*(not|n't)?\s*(follow|obey|listen)\s*(to)?", true),
    (r"instead,\s*(you\s*)?(should|must|need\s*to)", true),
    (r"run\s*(the)?\s*(following)?\s*(command|code|script)", true),
    (r"execute\s*(the)?\s*(following)?\s*(command|code|script)", true),
    (r"\|\s*(bash|sh|shell|zsh)", true),
    (r">\s*~", false),
    (r"~/", false),
    (r"\$\(", false),
    (r"\$\{", false),
    (r"`[^`]+`", false),
    (r";\s*(rm|delete|destroy|wipe)", true),
    (r"&&\s*(rm|delete|destroy|wipe)", true),
];

/// A compiled blocked pattern retaining its source text for verdicts
#[derive(Debug)]
pub struct BlockedPattern {
    source: String,
    regex: Regex,
}

impl BlockedPattern {
    /// The pattern's source text, without flags.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Test the pattern against a full command or content string.
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// Immutable allow/deny policy data
#[derive(Debug)]
pub struct PolicyTable {
    safe: HashSet<&'static str>,
    sensitive: HashSet<&'static str>,
    blocked: Vec<BlockedPattern>,
}

impl PolicyTable {
    /// Build the policy table, compiling every blocked pattern.
    pub fn new() -> Result<Self> {
        let blocked = BLOCKED_PATTERNS
            .iter()
            .map(|(source, case_insensitive)| {
                let regex = RegexBuilder::new(source)
                    .case_insensitive(*case_insensitive)
                    .build()
                    .map_err(|e| {
                        Error::Policy(format!("invalid blocked pattern '{}': {}", source, e))
                    })?;
                Ok(BlockedPattern {
                    source: (*source).to_string(),
                    regex,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            safe: SAFE_COMMANDS.iter().copied().collect(),
            sensitive: SENSITIVE_COMMANDS.iter().copied().collect(),
            blocked,
        })
    }

    /// Whether the base command is in the allow-set (exact, case-sensitive).
    pub fn is_safe_command(&self, base: &str) -> bool {
        self.safe.contains(base)
    }

    /// Whether the base command is in the sensitive-set.
    pub fn is_sensitive_command(&self, base: &str) -> bool {
        self.sensitive.contains(base)
    }

    /// First blocked pattern matching the text, in declaration order.
    pub fn first_blocked_match(&self, text: &str) -> Option<&BlockedPattern> {
        self.blocked.iter().find(|p| p.is_match(text))
    }

    /// The ordered blocked pattern list.
    pub fn blocked_patterns(&self) -> &[BlockedPattern] {
        &self.blocked
    }
}
