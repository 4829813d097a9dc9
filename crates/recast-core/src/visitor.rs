//! Tree traversal with explicit change signaling.
//!
//! The engine's change detection relies on every visitor obeying one
//! contract: return [`Visited::Unchanged`] when nothing under a node was
//! touched, and [`Visited::Rewritten`] only when a replacement was actually
//! built. A freshly-allocated, structurally-identical node counts as changed
//! by contract, so rule authors short-circuit before allocating.

use crate::context::ExecutionContext;
use crate::error::Result;
use crate::tree::{
    BinaryExpr, BlockExpr, CastExpr, FieldAccess, IfStmt, InvokeExpr, LambdaExpr, MemberRef, Node,
    NodeKind, ReturnStmt, SourceFile, TypeTest, P,
};

/// Outcome of visiting one node: explicit two-case result instead of
/// incidental pointer aliasing.
#[derive(Debug, Clone)]
pub enum Visited {
    Unchanged,
    Rewritten(P<Node>),
}

impl Visited {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Visited::Unchanged)
    }

    /// The node this outcome leaves in place: the original for
    /// `Unchanged`, the replacement otherwise.
    pub fn current(&self, original: &P<Node>) -> P<Node> {
        match self {
            Visited::Unchanged => original.clone(),
            Visited::Rewritten(node) => node.clone(),
        }
    }
}

/// One dispatch entry point per node variant, each defaulting to
/// [`NodeVisitor::visit_children`]. Override only what you need.
#[allow(unused_variables)]
pub trait NodeVisitor {
    fn visit(&mut self, node: &P<Node>, ctx: &ExecutionContext) -> Result<Visited> {
        match node.kind() {
            NodeKind::Ident(_) => self.visit_ident(node, ctx),
            NodeKind::Literal(_) => self.visit_literal(node, ctx),
            NodeKind::FieldAccess(_) => self.visit_field_access(node, ctx),
            NodeKind::Lambda(_) => self.visit_lambda(node, ctx),
            NodeKind::Invoke(_) => self.visit_invoke(node, ctx),
            NodeKind::MemberRef(_) => self.visit_member_ref(node, ctx),
            NodeKind::TypeTest(_) => self.visit_type_test(node, ctx),
            NodeKind::Cast(_) => self.visit_cast(node, ctx),
            NodeKind::Binary(_) => self.visit_binary(node, ctx),
            NodeKind::Block(_) => self.visit_block(node, ctx),
            NodeKind::Return(_) => self.visit_return(node, ctx),
            NodeKind::If(_) => self.visit_if(node, ctx),
            NodeKind::Import(_) => self.visit_import(node, ctx),
            NodeKind::SourceFile(_) => self.visit_source_file(node, ctx),
        }
    }

    fn visit_ident(&mut self, node: &P<Node>, ctx: &ExecutionContext) -> Result<Visited> {
        self.visit_children(node, ctx)
    }

    fn visit_literal(&mut self, node: &P<Node>, ctx: &ExecutionContext) -> Result<Visited> {
        self.visit_children(node, ctx)
    }

    fn visit_field_access(&mut self, node: &P<Node>, ctx: &ExecutionContext) -> Result<Visited> {
        self.visit_children(node, ctx)
    }

    fn visit_lambda(&mut self, node: &P<Node>, ctx: &ExecutionContext) -> Result<Visited> {
        self.visit_children(node, ctx)
    }

    fn visit_invoke(&mut self, node: &P<Node>, ctx: &ExecutionContext) -> Result<Visited> {
        self.visit_children(node, ctx)
    }

    fn visit_member_ref(&mut self, node: &P<Node>, ctx: &ExecutionContext) -> Result<Visited> {
        self.visit_children(node, ctx)
    }

    fn visit_type_test(&mut self, node: &P<Node>, ctx: &ExecutionContext) -> Result<Visited> {
        self.visit_children(node, ctx)
    }

    fn visit_cast(&mut self, node: &P<Node>, ctx: &ExecutionContext) -> Result<Visited> {
        self.visit_children(node, ctx)
    }

    fn visit_binary(&mut self, node: &P<Node>, ctx: &ExecutionContext) -> Result<Visited> {
        self.visit_children(node, ctx)
    }

    fn visit_block(&mut self, node: &P<Node>, ctx: &ExecutionContext) -> Result<Visited> {
        self.visit_children(node, ctx)
    }

    fn visit_return(&mut self, node: &P<Node>, ctx: &ExecutionContext) -> Result<Visited> {
        self.visit_children(node, ctx)
    }

    fn visit_if(&mut self, node: &P<Node>, ctx: &ExecutionContext) -> Result<Visited> {
        self.visit_children(node, ctx)
    }

    fn visit_import(&mut self, node: &P<Node>, ctx: &ExecutionContext) -> Result<Visited> {
        self.visit_children(node, ctx)
    }

    fn visit_source_file(&mut self, node: &P<Node>, ctx: &ExecutionContext) -> Result<Visited> {
        self.visit_children(node, ctx)
    }

    /// Default recursive case: visit every child in order and reconstruct
    /// this node only if at least one child changed.
    fn visit_children(&mut self, node: &P<Node>, ctx: &ExecutionContext) -> Result<Visited> {
        walk_children(self, node, ctx)
    }
}

/// Visitor that touches nothing; useful as the visitor of purely composite
/// recipes.
pub struct NoopVisitor;

impl NodeVisitor for NoopVisitor {
    fn visit(&mut self, _node: &P<Node>, _ctx: &ExecutionContext) -> Result<Visited> {
        Ok(Visited::Unchanged)
    }
}

fn visit_child<V: NodeVisitor + ?Sized>(
    visitor: &mut V,
    child: &P<Node>,
    ctx: &ExecutionContext,
    changed: &mut bool,
) -> Result<P<Node>> {
    match visitor.visit(child, ctx)? {
        Visited::Unchanged => Ok(child.clone()),
        Visited::Rewritten(node) => {
            *changed = true;
            Ok(node)
        }
    }
}

fn visit_child_opt<V: NodeVisitor + ?Sized>(
    visitor: &mut V,
    child: &Option<P<Node>>,
    ctx: &ExecutionContext,
    changed: &mut bool,
) -> Result<Option<P<Node>>> {
    match child {
        Some(child) => Ok(Some(visit_child(visitor, child, ctx, changed)?)),
        None => Ok(None),
    }
}

fn visit_child_vec<V: NodeVisitor + ?Sized>(
    visitor: &mut V,
    children: &[P<Node>],
    ctx: &ExecutionContext,
    changed: &mut bool,
) -> Result<Vec<P<Node>>> {
    children
        .iter()
        .map(|child| visit_child(visitor, child, ctx, changed))
        .collect()
}

/// The default recursion shared by every `visit_*` method. Reuses all
/// unchanged children by reference and rebuilds the node (keeping its
/// identity) only when a child was replaced.
pub fn walk_children<V: NodeVisitor + ?Sized>(
    visitor: &mut V,
    node: &P<Node>,
    ctx: &ExecutionContext,
) -> Result<Visited> {
    let mut changed = false;
    let kind = match node.kind() {
        NodeKind::Ident(_) | NodeKind::Literal(_) | NodeKind::Import(_) => {
            return Ok(Visited::Unchanged)
        }
        NodeKind::FieldAccess(access) => NodeKind::FieldAccess(FieldAccess {
            object: visit_child(visitor, &access.object, ctx, &mut changed)?,
            field: access.field.clone(),
        }),
        NodeKind::Lambda(lambda) => NodeKind::Lambda(LambdaExpr {
            params: visit_child_vec(visitor, &lambda.params, ctx, &mut changed)?,
            body: visit_child(visitor, &lambda.body, ctx, &mut changed)?,
        }),
        NodeKind::Invoke(invoke) => NodeKind::Invoke(InvokeExpr {
            receiver: visit_child_opt(visitor, &invoke.receiver, ctx, &mut changed)?,
            method: invoke.method.clone(),
            args: visit_child_vec(visitor, &invoke.args, ctx, &mut changed)?,
        }),
        NodeKind::MemberRef(member_ref) => NodeKind::MemberRef(MemberRef {
            target: visit_child(visitor, &member_ref.target, ctx, &mut changed)?,
            member: member_ref.member.clone(),
        }),
        NodeKind::TypeTest(test) => NodeKind::TypeTest(TypeTest {
            expr: visit_child(visitor, &test.expr, ctx, &mut changed)?,
            ty_name: test.ty_name.clone(),
        }),
        NodeKind::Cast(cast) => NodeKind::Cast(CastExpr {
            ty_name: cast.ty_name.clone(),
            expr: visit_child(visitor, &cast.expr, ctx, &mut changed)?,
        }),
        NodeKind::Binary(binary) => NodeKind::Binary(BinaryExpr {
            op: binary.op.clone(),
            lhs: visit_child(visitor, &binary.lhs, ctx, &mut changed)?,
            rhs: visit_child(visitor, &binary.rhs, ctx, &mut changed)?,
        }),
        NodeKind::Block(block) => NodeKind::Block(BlockExpr {
            stmts: visit_child_vec(visitor, &block.stmts, ctx, &mut changed)?,
        }),
        NodeKind::Return(ret) => NodeKind::Return(ReturnStmt {
            expr: visit_child_opt(visitor, &ret.expr, ctx, &mut changed)?,
        }),
        NodeKind::If(iff) => NodeKind::If(IfStmt {
            cond: visit_child(visitor, &iff.cond, ctx, &mut changed)?,
            then: visit_child(visitor, &iff.then, ctx, &mut changed)?,
            elze: visit_child_opt(visitor, &iff.elze, ctx, &mut changed)?,
        }),
        NodeKind::SourceFile(file) => NodeKind::SourceFile(SourceFile {
            imports: visit_child_vec(visitor, &file.imports, ctx, &mut changed)?,
            stmts: visit_child_vec(visitor, &file.stmts, ctx, &mut changed)?,
        }),
    };
    if changed {
        Ok(Visited::Rewritten(node.rebuilt(kind)))
    } else {
        Ok(Visited::Unchanged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{BinaryOp, Ident};

    /// Renames one identifier; everything else untouched.
    struct Rename {
        from: String,
        to: String,
    }

    impl NodeVisitor for Rename {
        fn visit_ident(&mut self, node: &P<Node>, _ctx: &ExecutionContext) -> Result<Visited> {
            match node.kind() {
                NodeKind::Ident(ident) if ident.name == self.from => Ok(Visited::Rewritten(
                    node.rebuilt(NodeKind::Ident(Ident {
                        name: self.to.clone(),
                    })),
                )),
                _ => Ok(Visited::Unchanged),
            }
        }
    }

    #[test]
    fn default_traversal_reports_unchanged_without_allocating() {
        let ctx = ExecutionContext::new();
        let root = Node::source_file(
            vec![],
            vec![Node::binary(
                BinaryOp::Eq,
                Node::ident("a"),
                Node::ident("b"),
            )],
        );
        let mut visitor = Rename {
            from: "zzz".into(),
            to: "yyy".into(),
        };
        let visited = visitor.visit(&root, &ctx).unwrap();
        assert!(visited.is_unchanged());
        assert!(P::ptr_eq(&visited.current(&root), &root));
    }

    #[test]
    fn rebuild_is_limited_to_the_edited_path() {
        let ctx = ExecutionContext::new();
        let untouched = Node::binary(BinaryOp::Ne, Node::ident("p"), Node::null());
        let edited = Node::ident("a");
        let root = Node::source_file(vec![], vec![untouched.clone(), edited]);

        let mut visitor = Rename {
            from: "a".into(),
            to: "b".into(),
        };
        let visited = visitor.visit(&root, &ctx).unwrap();
        let Visited::Rewritten(new_root) = visited else {
            panic!("expected a rewrite");
        };

        // Same identity for the rebuilt root, same reference for siblings
        // off the edited path.
        assert_eq!(new_root.id(), root.id());
        let NodeKind::SourceFile(file) = new_root.kind() else {
            panic!("root must stay a source file");
        };
        assert!(P::ptr_eq(&file.stmts[0], &untouched));
        assert!(matches!(
            file.stmts[1].kind(),
            NodeKind::Ident(Ident { name }) if name == "b"
        ));
    }
}
