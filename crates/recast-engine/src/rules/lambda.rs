//! Lambda-to-reference simplification.
//!
//! Rewrites single-expression-body lambdas into direct references to an
//! equivalent callable:
//!
//! - `x -> x instanceof T`      becomes `T::isInstance` (T must resolve)
//! - `x -> x == null`           becomes `Objects::isNull` (adds the import)
//! - `x -> x != null`           becomes `Objects::nonNull` (adds the import)
//! - `x -> (T) x`               becomes `T::cast` (T must resolve)
//! - `x -> recv.method(x)`      becomes `recv::method`
//!
//! A body with more than one statement is never touched, regardless of the
//! shape of any individual statement. Id policy: the replacement reference
//! keeps the lambda's node id (same logical construct, transformed); the
//! synthesized target identifiers mint fresh ids.

use crate::recipe::Recipe;
use itertools::Itertools;
use recast_core::context::ExecutionContext;
use recast_core::debug;
use recast_core::error::Result;
use recast_core::resolve::TypeResolver;
use recast_core::tree::{
    BinaryOp, LambdaExpr, Literal, MemberRef, Node, NodeKind, SourceFile, P,
};
use recast_core::visitor::{NodeVisitor, Visited};
use std::collections::HashSet;
use std::sync::Arc;

const IS_INSTANCE: &str = "isInstance";
const CAST: &str = "cast";
const IS_NULL: &str = "isNull";
const NON_NULL: &str = "nonNull";
const NULL_PREDICATE_OWNER: &str = "Objects";
const NULL_PREDICATE_IMPORT: &str = "java.util.Objects";

/// Context message carrying the number of lambdas simplified so far in the
/// run; peeked and overwritten, never consumed by the rule itself.
pub const SIMPLIFIED_COUNT_KEY: &str = "lambda.simplified.count";

pub struct SimplifyLambdaToReference {
    resolver: Arc<dyn TypeResolver>,
}

impl SimplifyLambdaToReference {
    pub fn new(resolver: Arc<dyn TypeResolver>) -> Self {
        Self { resolver }
    }
}

impl Recipe for SimplifyLambdaToReference {
    fn display_name(&self) -> &str {
        "simplify-lambda-to-reference"
    }

    fn description(&self) -> &str {
        "Replace single-expression lambdas with direct references to the equivalent callable"
    }

    fn visitor(&self) -> Box<dyn NodeVisitor> {
        Box::new(LambdaVisitor {
            resolver: self.resolver.clone(),
            pending_imports: Vec::new(),
        })
    }
}

struct LambdaVisitor {
    resolver: Arc<dyn TypeResolver>,
    /// Imports requested by rewrites under the current unit; applied once
    /// at the source-file level, deduplicated against existing imports.
    pending_imports: Vec<String>,
}

impl NodeVisitor for LambdaVisitor {
    fn visit_lambda(&mut self, node: &P<Node>, ctx: &ExecutionContext) -> Result<Visited> {
        // Children first, so nested lambdas inside the body simplify in the
        // same pass.
        let visited = self.visit_children(node, ctx)?;
        let current = visited.current(node);
        let NodeKind::Lambda(lambda) = current.kind() else {
            return Ok(visited);
        };
        match self.simplify(lambda) {
            Some(kind) => {
                let count = ctx
                    .get_message::<usize>(SIMPLIFIED_COUNT_KEY)
                    .map(|c| *c)
                    .unwrap_or(0);
                ctx.put_message(SIMPLIFIED_COUNT_KEY, count + 1);
                debug!("lambda {} simplified", current.id());
                Ok(Visited::Rewritten(current.rebuilt(kind)))
            }
            None => Ok(visited),
        }
    }

    fn visit_source_file(&mut self, node: &P<Node>, ctx: &ExecutionContext) -> Result<Visited> {
        let visited = self.visit_children(node, ctx)?;
        if self.pending_imports.is_empty() {
            return Ok(visited);
        }
        let current = visited.current(node);
        let NodeKind::SourceFile(file) = current.kind() else {
            return Ok(visited);
        };

        let existing: HashSet<&str> = file
            .imports
            .iter()
            .filter_map(|import| match import.kind() {
                NodeKind::Import(decl) => Some(decl.path.as_str()),
                _ => None,
            })
            .collect();
        let missing: Vec<String> = self
            .pending_imports
            .drain(..)
            .unique()
            .filter(|path| !existing.contains(path.as_str()))
            .collect();
        if missing.is_empty() {
            return Ok(visited);
        }

        let mut imports = file.imports.clone();
        imports.extend(missing.into_iter().map(Node::import));
        Ok(Visited::Rewritten(current.rebuilt(NodeKind::SourceFile(
            SourceFile {
                imports,
                stmts: file.stmts.clone(),
            },
        ))))
    }
}

impl LambdaVisitor {
    /// Classify a lambda and build its replacement kind. `None` means
    /// "leave unchanged" — either no pattern matched or a precondition
    /// (type resolution) failed.
    fn simplify(&mut self, lambda: &LambdaExpr) -> Option<NodeKind> {
        let expr = single_expression(&lambda.body)?;

        if let Some(kind) = eta_reduce(lambda, expr) {
            return Some(kind);
        }

        let [param] = lambda.params.as_slice() else {
            return None;
        };
        let param_name = ident_name(param)?;

        match expr.kind() {
            NodeKind::TypeTest(test) if ident_name(&test.expr) == Some(param_name) => {
                let resolved = self.resolver.resolve(&test.ty_name)?;
                Some(NodeKind::MemberRef(MemberRef {
                    target: Node::resolved_ident(&test.ty_name, resolved),
                    member: IS_INSTANCE.to_string(),
                }))
            }
            NodeKind::Cast(cast) if ident_name(&cast.expr) == Some(param_name) => {
                let resolved = self.resolver.resolve(&cast.ty_name)?;
                Some(NodeKind::MemberRef(MemberRef {
                    target: Node::resolved_ident(&cast.ty_name, resolved),
                    member: CAST.to_string(),
                }))
            }
            NodeKind::Binary(binary) if matches!(binary.op, BinaryOp::Eq | BinaryOp::Ne) => {
                let param_against_null = (ident_name(&binary.lhs) == Some(param_name)
                    && is_null(&binary.rhs))
                    || (is_null(&binary.lhs) && ident_name(&binary.rhs) == Some(param_name));
                if !param_against_null {
                    return None;
                }
                let member = match binary.op {
                    BinaryOp::Eq => IS_NULL,
                    _ => NON_NULL,
                };
                self.pending_imports.push(NULL_PREDICATE_IMPORT.to_string());
                let target = match self.resolver.resolve(NULL_PREDICATE_OWNER) {
                    // Annotate when the standard owner resolves; the rewrite
                    // itself is not gated on it.
                    Some(resolved) => Node::resolved_ident(NULL_PREDICATE_OWNER, resolved),
                    None => Node::ident(NULL_PREDICATE_OWNER),
                };
                Some(NodeKind::MemberRef(MemberRef {
                    target,
                    member: member.to_string(),
                }))
            }
            _ => None,
        }
    }
}

/// The lambda body's sole expression, or `None` when the body holds more
/// than one statement. This guard is absolute: no sub-expression of a
/// multi-statement body ever qualifies.
fn single_expression(body: &P<Node>) -> Option<&P<Node>> {
    match body.kind() {
        NodeKind::Block(block) => {
            let [stmt] = block.stmts.as_slice() else {
                return None;
            };
            match stmt.kind() {
                NodeKind::Return(ret) => ret.expr.as_ref(),
                _ => Some(stmt),
            }
        }
        _ => Some(body),
    }
}

/// `(a, b) -> recv.method(a, b)` where the arguments repeat the parameter
/// list exactly and the receiver is a plain name (or field path) free of
/// computation and of the parameters themselves.
fn eta_reduce(lambda: &LambdaExpr, expr: &P<Node>) -> Option<NodeKind> {
    let NodeKind::Invoke(invoke) = expr.kind() else {
        return None;
    };
    let receiver = invoke.receiver.as_ref()?;
    if !is_simple_receiver(receiver) {
        return None;
    }

    let params: Vec<&str> = lambda.params.iter().map(|p| ident_name(p)).collect::<Option<_>>()?;
    if params.is_empty() || invoke.args.len() != params.len() {
        return None;
    }
    let args: Vec<&str> = invoke.args.iter().map(|a| ident_name(a)).collect::<Option<_>>()?;
    if args != params {
        return None;
    }
    if mentions_any(receiver, &params) {
        return None;
    }

    // The receiver node is reused by reference; only the lambda shell is
    // replaced.
    Some(NodeKind::MemberRef(MemberRef {
        target: receiver.clone(),
        member: invoke.method.clone(),
    }))
}

fn ident_name(node: &P<Node>) -> Option<&str> {
    match node.kind() {
        NodeKind::Ident(ident) => Some(&ident.name),
        _ => None,
    }
}

fn is_null(node: &P<Node>) -> bool {
    matches!(node.kind(), NodeKind::Literal(Literal::Null))
}

fn is_simple_receiver(node: &P<Node>) -> bool {
    match node.kind() {
        NodeKind::Ident(_) => true,
        NodeKind::FieldAccess(access) => is_simple_receiver(&access.object),
        _ => false,
    }
}

fn mentions_any(node: &P<Node>, names: &[&str]) -> bool {
    match node.kind() {
        NodeKind::Ident(ident) => names.contains(&ident.name.as_str()),
        NodeKind::FieldAccess(access) => mentions_any(&access.object, names),
        _ => false,
    }
}

#[cfg(test)]
mod tests;
