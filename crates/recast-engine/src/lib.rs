//! Recipe scheduling and the built-in rewrite rules.
//!
//! `recast-core` defines the tree, visitor, and context primitives; this
//! crate drives them: recipes bundle visitors, the engine applies a recipe
//! chain over a working set of source units until the trees converge, and
//! `rules` carries the concrete rewrites.

pub mod error;
pub mod recipe;
pub mod rules;
pub mod scheduler;

pub use recast_core::context::ExecutionContext;
pub use recast_core::error::{Error, Result};
pub use recipe::{CompositeRecipe, Recipe};
pub use scheduler::{Engine, EngineConfig, RunResult, UnitResult};
