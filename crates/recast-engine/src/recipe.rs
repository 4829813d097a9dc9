//! Recipes: named, composable rewrite units.
//!
//! A recipe is immutable configuration. It hands the engine a fresh visitor
//! on demand (one per unit per cycle, so visitors may keep per-unit state)
//! and may nest further recipes that run in declared order within the same
//! cycle, each seeing the previous one's output for that unit.

use recast_core::visitor::{NodeVisitor, NoopVisitor};
use std::sync::Arc;

pub trait Recipe: Send + Sync {
    fn display_name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    /// Factory for a fresh visitor. Purely composite recipes keep the
    /// default no-op.
    fn visitor(&self) -> Box<dyn NodeVisitor> {
        Box::new(NoopVisitor)
    }

    /// Nested recipes applied after this recipe's own visitor, in order,
    /// within the same cycle.
    fn recipe_list(&self) -> &[Arc<dyn Recipe>] {
        &[]
    }

    /// Static hint that this recipe's effects may only become visible after
    /// a second pass. Evaluated once per run, never recomputed from context
    /// state; see the scheduler's continuation rule.
    fn causes_another_cycle(&self) -> bool {
        false
    }
}

/// Aggregate the extra-cycle hint over a whole recipe tree. Evaluated once
/// at run start.
pub fn recipe_tree_causes_another_cycle(recipe: &dyn Recipe) -> bool {
    recipe.causes_another_cycle()
        || recipe
            .recipe_list()
            .iter()
            .any(|nested| recipe_tree_causes_another_cycle(nested.as_ref()))
}

/// Named sequence of recipes with no visitor of its own.
pub struct CompositeRecipe {
    name: String,
    description: String,
    recipes: Vec<Arc<dyn Recipe>>,
}

impl CompositeRecipe {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            recipes: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with(mut self, recipe: Arc<dyn Recipe>) -> Self {
        self.recipes.push(recipe);
        self
    }
}

impl Recipe for CompositeRecipe {
    fn display_name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn recipe_list(&self) -> &[Arc<dyn Recipe>] {
        &self.recipes
    }
}
