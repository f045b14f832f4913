//! Memory trust classification and verification
//!
//! Stored memory is a prompt-injection vector: content written by a
//! low-trust source today is read back into agent context tomorrow. Every
//! memory record therefore carries a trust classification and semantic
//! tags, and must pass the verification gate before it is surfaced.

pub mod classifier;
pub mod gate;

pub use classifier::{MemoryClassifier, MemoryRecord, TrustLevel};
pub use gate::{allowed_actions, verify_before_use, Action, VerificationOutcome};
