//! Multi-cycle convergence scheduler.
//!
//! One run: a working set of units, one ExecutionContext, and repeated
//! application of the recipe chain until the trees stop changing or the
//! cycle budget runs out. Change detection per unit is a reference
//! comparison on roots, which every visitor's unchanged-returns-same-node
//! contract makes sound.

use crate::error::{config_error, recipe_error};
use crate::recipe::{recipe_tree_causes_another_cycle, Recipe};
use itertools::Itertools;
use recast_core::context::ExecutionContext;
use recast_core::diagnostics::Diagnostic;
use recast_core::error::{Error, Result};
use recast_core::tree::{Node, SourceUnit, P};
use recast_core::{debug, warn};
use std::path::Path;
use std::sync::Arc;

/// Safety cap on convergence cycles. Recipes whose hint or oscillating
/// output would never let a run settle are cut off here and reported via a
/// non-fatal diagnostic instead of an error.
pub const MAX_CYCLES_DEFAULT: usize = 3;

pub const CYCLE_BUDGET_CODE: &str = "cycle-budget-exceeded";

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Cycles guaranteed to run even without changes. At least 1.
    pub min_cycles: usize,
    /// Hard cap on cycles per run.
    pub max_cycles: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_cycles: 1,
            max_cycles: MAX_CYCLES_DEFAULT,
        }
    }
}

impl EngineConfig {
    fn validate(&self) -> Result<()> {
        if self.min_cycles == 0 {
            return Err(config_error("min_cycles must be at least 1"));
        }
        if self.max_cycles == 0 {
            return Err(config_error("max_cycles must be at least 1"));
        }
        if self.min_cycles > self.max_cycles {
            return Err(config_error(format!(
                "min_cycles ({}) exceeds max_cycles ({})",
                self.min_cycles, self.max_cycles
            )));
        }
        Ok(())
    }
}

/// Outcome for one input unit. `after` shares the input root when the unit
/// never changed.
#[derive(Debug)]
pub struct UnitResult {
    pub original: SourceUnit,
    pub after: SourceUnit,
    pub changed: bool,
    /// Last failure recorded for this unit, if any. A malformed tree stops
    /// further cycles for the unit; a recipe execution failure only skips
    /// the failing cycle.
    pub error: Option<Error>,
}

#[derive(Debug)]
pub struct RunResult {
    pub results: Vec<UnitResult>,
    /// Completed cycle count.
    pub cycles: usize,
    /// False when the run hit the cycle budget while changes were still
    /// occurring, or was aborted externally.
    pub converged: bool,
    /// Keys of context messages nobody consumed.
    pub residual_messages: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl RunResult {
    /// Before/after pairs for every unit that changed.
    pub fn changed(&self) -> impl Iterator<Item = &UnitResult> {
        self.results.iter().filter(|result| result.changed)
    }

    pub fn any_changed(&self) -> bool {
        self.results.iter().any(|result| result.changed)
    }
}

struct WorkingUnit {
    unit: SourceUnit,
    current: P<Node>,
    changed: bool,
    failed: bool,
    error: Option<Error>,
}

pub struct Engine {
    config: EngineConfig,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn run(&self, units: Vec<SourceUnit>, recipe: Arc<dyn Recipe>) -> Result<RunResult> {
        self.run_with_abort(units, recipe, &|| false)
    }

    /// Run with an external abort check, consulted once per cycle boundary;
    /// an in-flight cycle always completes.
    pub fn run_with_abort(
        &self,
        units: Vec<SourceUnit>,
        recipe: Arc<dyn Recipe>,
        abort: &dyn Fn() -> bool,
    ) -> Result<RunResult> {
        self.config.validate()?;
        let ctx = ExecutionContext::new();
        // Static per-recipe hint, evaluated once for the whole run.
        let extra_cycle_hint = recipe_tree_causes_another_cycle(recipe.as_ref());

        let mut working: Vec<WorkingUnit> = units
            .into_iter()
            .map(|unit| {
                let current = unit.root().clone();
                WorkingUnit {
                    unit,
                    current,
                    changed: false,
                    failed: false,
                    error: None,
                }
            })
            .collect();

        let mut completed = 0usize;
        let mut any_changed_last = false;
        let mut aborted = false;

        loop {
            if abort() {
                aborted = true;
                break;
            }

            let mut any_changed = false;
            for entry in working.iter_mut() {
                if entry.failed {
                    continue;
                }
                match apply_recipe(recipe.as_ref(), entry.unit.path(), entry.current.clone(), &ctx)
                {
                    Ok(root) => {
                        if !P::ptr_eq(&root, &entry.current) {
                            entry.current = root;
                            entry.changed = true;
                            any_changed = true;
                        }
                    }
                    Err(err @ Error::MalformedTree { .. }) => {
                        warn!("{}: {}", entry.unit.path().display(), err);
                        ctx.add_diagnostic(Diagnostic::error(format!(
                            "{}: {}",
                            entry.unit.path().display(),
                            err
                        )));
                        entry.failed = true;
                        entry.error = Some(err);
                    }
                    Err(err) => {
                        // Carry the pre-failure tree forward; the unit stays
                        // in the run for subsequent cycles.
                        warn!("{}: {}", entry.unit.path().display(), err);
                        ctx.add_diagnostic(Diagnostic::warning(format!(
                            "{}: {}",
                            entry.unit.path().display(),
                            err
                        )));
                        entry.error = Some(err);
                    }
                }
            }

            completed = ctx.increment_cycle();
            any_changed_last = any_changed;
            debug!(
                "cycle {} of '{}' completed, changed={}",
                completed,
                recipe.display_name(),
                any_changed
            );

            let proceed = completed < self.config.max_cycles
                && (any_changed
                    || completed < self.config.min_cycles
                    || (completed == 1 && extra_cycle_hint));
            if !proceed {
                break;
            }
        }

        if aborted {
            ctx.add_diagnostic(Diagnostic::warning(format!(
                "run aborted after {} cycles",
                completed
            )));
        } else if completed == self.config.max_cycles && any_changed_last {
            ctx.add_diagnostic(
                Diagnostic::warning(format!(
                    "did not converge within {} cycles",
                    self.config.max_cycles
                ))
                .with_code(CYCLE_BUDGET_CODE),
            );
        }
        let converged = !aborted && !any_changed_last;

        let results = working
            .into_iter()
            .map(|entry| {
                let after = if entry.changed {
                    entry.unit.with_root(entry.current)
                } else {
                    entry.unit.clone()
                };
                UnitResult {
                    original: entry.unit,
                    after,
                    changed: entry.changed,
                    error: entry.error,
                }
            })
            .collect();

        Ok(RunResult {
            results,
            cycles: completed,
            converged,
            residual_messages: ctx.message_keys().into_iter().sorted().collect(),
            diagnostics: ctx.drain_diagnostics(),
        })
    }
}

/// Apply one recipe and its nested recipes to one unit for one cycle. Each
/// recipe gets a fresh visitor; nested recipes see the previous output.
fn apply_recipe(
    recipe: &dyn Recipe,
    path: &Path,
    root: P<Node>,
    ctx: &ExecutionContext,
) -> Result<P<Node>> {
    let mut visitor = recipe.visitor();
    let visited = visitor
        .visit(&root, ctx)
        .map_err(|err| attribute_error(recipe, path, err))?;
    let mut root = visited.current(&root);
    for nested in recipe.recipe_list() {
        root = apply_recipe(nested.as_ref(), path, root, ctx)?;
    }
    Ok(root)
}

fn attribute_error(recipe: &dyn Recipe, path: &Path, err: Error) -> Error {
    match err {
        err @ (Error::MalformedTree { .. } | Error::RecipeExecution { .. } | Error::Config(_)) => {
            err
        }
        Error::Generic(message) => recipe_error(
            recipe.display_name(),
            format!("{} ({})", message, path.display()),
        ),
    }
}
