//! Per-file legality checks
//!
//! Import paths go through a list of [`ImportPathRule`]s; composite literals of
//! standard-library types go through [`check_literals`].

pub mod literals;
pub mod rules;
pub mod validator;

pub use literals::{check_literals, LiteralChecker};
pub use rules::ImportPathRule;
pub use validator::ImportValidator;
