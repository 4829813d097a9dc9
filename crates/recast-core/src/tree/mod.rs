//! Persistent, immutable tree model.
//!
//! Nodes are shared behind [`P`] (an `Arc` alias) and never mutated after
//! construction. Every edit rebuilds the path from the root to the edited
//! position and reuses all untouched siblings and ancestors by reference,
//! which is what makes change detection by reference comparison safe.

use crate::id::{fresh_id, NodeId};
use crate::markers::Markers;
use crate::resolve::{ResolvedTy, TySlot};
use std::sync::Arc;

mod kind;
mod unit;

pub use kind::*;
pub use unit::*;

/// Pointer type for shared tree nodes.
pub type P<T> = Arc<T>;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Node {
    id: NodeId,
    markers: Markers,
    ty: TySlot,
    kind: NodeKind,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            id: fresh_id(),
            markers: Markers::empty(),
            ty: None,
            kind,
        }
    }

    pub fn with_markers(kind: NodeKind, markers: Markers) -> Self {
        Self {
            id: fresh_id(),
            markers,
            ty: None,
            kind,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn markers(&self) -> &Markers {
        &self.markers
    }

    pub fn ty(&self) -> Option<&ResolvedTy> {
        self.ty.as_ref()
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Attach a resolved-type annotation, consuming the builder.
    pub fn with_ty(mut self, ty: ResolvedTy) -> Self {
        self.ty = Some(ty);
        self
    }

    pub fn arc(self) -> P<Node> {
        P::new(self)
    }

    /// Replace this node's kind while keeping id, markers, and resolved
    /// type. Reconstruction after a child edit (or an in-place transform of
    /// the same logical construct) keeps the original identity.
    pub fn rebuilt(&self, kind: NodeKind) -> P<Node> {
        P::new(Node {
            id: self.id,
            markers: self.markers.clone(),
            ty: self.ty.clone(),
            kind,
        })
    }

    /// Copy of this node carrying an extra marker; identity is preserved.
    pub fn marked(&self, markers: Markers) -> P<Node> {
        P::new(Node {
            id: self.id,
            markers,
            ty: self.ty.clone(),
            kind: self.kind.clone(),
        })
    }

    // Construction helpers, one per commonly-built variant.

    pub fn ident(name: impl Into<String>) -> P<Node> {
        Node::new(NodeKind::Ident(Ident { name: name.into() })).arc()
    }

    pub fn resolved_ident(name: impl Into<String>, ty: ResolvedTy) -> P<Node> {
        Node::new(NodeKind::Ident(Ident { name: name.into() }))
            .with_ty(ty)
            .arc()
    }

    pub fn literal(literal: Literal) -> P<Node> {
        Node::new(NodeKind::Literal(literal)).arc()
    }

    pub fn null() -> P<Node> {
        Self::literal(Literal::Null)
    }

    pub fn field_access(object: P<Node>, field: impl Into<String>) -> P<Node> {
        Node::new(NodeKind::FieldAccess(FieldAccess {
            object,
            field: field.into(),
        }))
        .arc()
    }

    pub fn lambda(params: Vec<P<Node>>, body: P<Node>) -> P<Node> {
        Node::new(NodeKind::Lambda(LambdaExpr { params, body })).arc()
    }

    pub fn invoke(
        receiver: Option<P<Node>>,
        method: impl Into<String>,
        args: Vec<P<Node>>,
    ) -> P<Node> {
        Node::new(NodeKind::Invoke(InvokeExpr {
            receiver,
            method: method.into(),
            args,
        }))
        .arc()
    }

    pub fn member_ref(target: P<Node>, member: impl Into<String>) -> P<Node> {
        Node::new(NodeKind::MemberRef(MemberRef {
            target,
            member: member.into(),
        }))
        .arc()
    }

    pub fn type_test(expr: P<Node>, ty_name: impl Into<String>) -> P<Node> {
        Node::new(NodeKind::TypeTest(TypeTest {
            expr,
            ty_name: ty_name.into(),
        }))
        .arc()
    }

    pub fn cast(ty_name: impl Into<String>, expr: P<Node>) -> P<Node> {
        Node::new(NodeKind::Cast(CastExpr {
            ty_name: ty_name.into(),
            expr,
        }))
        .arc()
    }

    pub fn binary(op: BinaryOp, lhs: P<Node>, rhs: P<Node>) -> P<Node> {
        Node::new(NodeKind::Binary(BinaryExpr { op, lhs, rhs })).arc()
    }

    pub fn block(stmts: Vec<P<Node>>) -> P<Node> {
        Node::new(NodeKind::Block(BlockExpr { stmts })).arc()
    }

    pub fn ret(expr: Option<P<Node>>) -> P<Node> {
        Node::new(NodeKind::Return(ReturnStmt { expr })).arc()
    }

    pub fn iff(cond: P<Node>, then: P<Node>, elze: Option<P<Node>>) -> P<Node> {
        Node::new(NodeKind::If(IfStmt { cond, then, elze })).arc()
    }

    pub fn import(path: impl Into<String>) -> P<Node> {
        Node::new(NodeKind::Import(ImportDecl { path: path.into() })).arc()
    }

    pub fn source_file(imports: Vec<P<Node>>, stmts: Vec<P<Node>>) -> P<Node> {
        Node::new(NodeKind::SourceFile(SourceFile { imports, stmts })).arc()
    }
}

/// Structural equality: variant, children, and resolved-type annotations.
/// Node ids and markers are identity and metadata, not semantics, and are
/// deliberately excluded.
impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.ty == other.ty && self.kind == other.kind
    }
}

impl Eq for Node {}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn structural_equality_ignores_id_and_markers() {
        let a = Node::ident("x");
        let b = Node::ident("x");
        assert_ne!(a.id(), b.id());
        assert_eq!(a, b);

        let marked = a.marked(a.markers().with(crate::markers::Marker::Tag("seen".into())));
        assert_eq!(*a, *marked);
    }

    #[test]
    fn structural_equality_includes_resolved_type() {
        let plain = Node::ident("T");
        let typed = Node::resolved_ident("T", ResolvedTy::new("com.acme.T"));
        assert_ne!(plain, typed);
    }

    #[test]
    fn rebuilt_keeps_identity() {
        let lambda = Node::lambda(vec![Node::ident("x")], Node::ident("x"));
        let replacement = lambda.rebuilt(NodeKind::MemberRef(MemberRef {
            target: Node::ident("x"),
            member: "toString".into(),
        }));
        assert_eq!(lambda.id(), replacement.id());
        assert_ne!(*lambda, *replacement);
    }
}
