//! Memory verification gate
//!
//! Every memory record passes through this gate before being surfaced to
//! agent context. The gate warns on danger tags and unverified records,
//! and the action table bounds what each trust level is permitted to do.

use serde::{Deserialize, Serialize};

use super::classifier::{
    MemoryRecord, TrustLevel, TAG_CRITICAL_DANGER, TAG_SUSPICIOUS_INSTRUCTIONS,
};

/// An action a memory record may participate in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    Read,
    Write,
    Execute,
    Share,
    ReadOnly,
    Flagged,
}

/// Actions permitted at each trust level.
pub fn allowed_actions(level: TrustLevel) -> &'static [Action] {
    match level {
        TrustLevel::Verified => &[Action::Read, Action::Write, Action::Execute, Action::Share],
        TrustLevel::Trusted => &[Action::Read, Action::Write, Action::Execute],
        TrustLevel::Medium => &[Action::Read, Action::Write],
        TrustLevel::Untrusted => &[Action::ReadOnly, Action::Flagged],
    }
}

/// Outcome of the pre-use verification check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationOutcome {
    /// True iff no warnings were produced
    pub verified: bool,
    /// True iff any warning was produced
    pub needs_review: bool,
    /// Human-readable warnings, in check order
    pub warnings: Vec<String>,
}

/// Check a memory record before it is used in agent context.
pub fn verify_before_use(record: &MemoryRecord) -> VerificationOutcome {
    let mut warnings = Vec::new();

    if record.tags.contains(TAG_CRITICAL_DANGER) {
        warnings.push("Memory contains critical danger markers".to_string());
    }

    if record.tags.contains(TAG_SUSPICIOUS_INSTRUCTIONS) {
        warnings.push("Memory contains suspicious instruction patterns".to_string());
    }

    if record.requires_verification {
        warnings.push("Memory requires verification before use".to_string());
    }

    VerificationOutcome {
        verified: warnings.is_empty(),
        needs_review: !warnings.is_empty(),
        warnings,
    }
}
