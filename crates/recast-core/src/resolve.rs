//! Seam to the external type-resolution collaborator.
//!
//! Rewrite rules consult a [`TypeResolver`] before committing to a rewrite
//! that depends on a concrete type. A failed lookup is non-fatal: the rule
//! leaves the node unchanged and moves on.

use crate::common_struct;
use std::collections::HashMap;

common_struct! {
    /// Outcome of a successful type resolution.
    pub struct ResolvedTy {
        pub qualified_name: String,
    }
}

impl ResolvedTy {
    pub fn new(qualified_name: impl Into<String>) -> Self {
        Self {
            qualified_name: qualified_name.into(),
        }
    }

    /// The simple (unqualified) name, i.e. the last path segment.
    pub fn simple_name(&self) -> &str {
        self.qualified_name
            .rsplit('.')
            .next()
            .unwrap_or(&self.qualified_name)
    }
}

/// Optional resolved-type annotation on a node. Participates in structural
/// equality, unlike node ids and markers.
pub type TySlot = Option<ResolvedTy>;

pub trait TypeResolver: Send + Sync {
    fn resolve(&self, name: &str) -> Option<ResolvedTy>;
}

/// Map-backed resolver for drivers and tests: maps simple or qualified names
/// to resolved types.
#[derive(Default)]
pub struct StaticResolver {
    types: HashMap<String, ResolvedTy>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type under both its simple and qualified name.
    pub fn with_type(mut self, qualified_name: impl Into<String>) -> Self {
        let resolved = ResolvedTy::new(qualified_name);
        self.types
            .insert(resolved.simple_name().to_string(), resolved.clone());
        self.types
            .insert(resolved.qualified_name.clone(), resolved);
        self
    }
}

impl TypeResolver for StaticResolver {
    fn resolve(&self, name: &str) -> Option<ResolvedTy> {
        self.types.get(name).cloned()
    }
}

/// Resolver that knows nothing; every lookup fails.
pub struct NoResolver;

impl TypeResolver for NoResolver {
    fn resolve(&self, _name: &str) -> Option<ResolvedTy> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_resolver_answers_simple_and_qualified() {
        let resolver = StaticResolver::new().with_type("com.acme.CheckType");
        assert_eq!(
            resolver.resolve("CheckType").map(|t| t.qualified_name),
            Some("com.acme.CheckType".to_string())
        );
        assert!(resolver.resolve("com.acme.CheckType").is_some());
        assert!(resolver.resolve("Other").is_none());
    }
}
