//! Command authorization against the policy table

use super::table::PolicyTable;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Verdict for a single authorization check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyVerdict {
    /// Whether the command may execute
    pub safe: bool,
    /// Denial reason, when unsafe
    pub reason: Option<String>,
    /// Source text of the blocked pattern that matched, when applicable
    pub matched_rule: Option<String>,
}

impl PolicyVerdict {
    fn allow() -> Self {
        Self {
            safe: true,
            reason: None,
            matched_rule: None,
        }
    }

    fn deny(reason: &str, matched_rule: Option<String>) -> Self {
        Self {
            safe: false,
            reason: Some(reason.to_string()),
            matched_rule,
        }
    }
}

/// Evaluates command strings against the policy table.
///
/// Check order is deliberate: blocked patterns run before the whitelist so
/// injection via the arguments of an otherwise-safe command name is caught
/// first.
#[derive(Debug)]
pub struct CommandAuthorizer {
    table: PolicyTable,
}

impl CommandAuthorizer {
    /// Create an authorizer over a freshly built policy table.
    pub fn new() -> Result<Self> {
        Ok(Self {
            table: PolicyTable::new()?,
        })
    }

    /// Create an authorizer over an existing table.
    pub fn with_table(table: PolicyTable) -> Self {
        Self { table }
    }

    /// Authorize a command string. First match wins.
    pub fn authorize(&self, command: &str) -> PolicyVerdict {
        if let Some(pattern) = self.table.first_blocked_match(command) {
            return PolicyVerdict::deny(
                "Blocked pattern detected",
                Some(pattern.source().to_string()),
            );
        }

        // Base command: substring before the first whitespace. An empty
        // command yields an empty base and falls through to denial.
        let base = command.split(char::is_whitespace).next().unwrap_or(command);

        if self.table.is_safe_command(base) {
            PolicyVerdict::allow()
        } else if self.table.is_sensitive_command(base) {
            PolicyVerdict::deny("Sensitive command requires verification", None)
        } else {
            PolicyVerdict::deny("Command not in whitelist", None)
        }
    }
}
