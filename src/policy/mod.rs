//! Command authorization policy
//!
//! A static, immutable policy table (allow-set, sensitive-set, and an
//! ordered list of blocked patterns) plus the authorizer that evaluates a
//! command string against it. Pattern checks run before the whitelist so a
//! whitelisted command name cannot smuggle a malicious payload through its
//! arguments.

pub mod authorizer;
pub mod table;

pub use authorizer::{CommandAuthorizer, PolicyVerdict};
pub use table::{PolicyTable, SAFE_COMMANDS, SENSITIVE_COMMANDS};
