//! Injection detection and content sanitization
//!
//! Two sides of the same defense: the detector reports which injection
//! signatures a piece of text matches, while the sanitizer rewrites the
//! text so matched constructs are neutralized before the content reaches
//! an executing agent. Both are deterministic, single-pass, and free of
//! side effects beyond logging.

pub mod injection;
pub mod sanitizer;

pub use injection::{InjectionDetector, InjectionFinding};
pub use sanitizer::{source_trust, ContentSanitizer, SanitizationResult, SourceTrust};
