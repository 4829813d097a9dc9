//! Concrete rewrite rules.
//!
//! Every rule follows the same discipline: classify the node, check every
//! precondition (including external type resolution), and only then build
//! the replacement — all-or-nothing, never a partially-rewritten node.

pub mod lambda;

pub use lambda::SimplifyLambdaToReference;
