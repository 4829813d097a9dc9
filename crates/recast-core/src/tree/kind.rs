use crate::tree::{Node, P};
use crate::{common_enum, common_struct};

common_struct! {
    /// A bare name: a variable, a parameter, or a type written by its
    /// simple name.
    pub struct Ident {
        pub name: String,
    }
}

common_enum! {
    pub enum Literal {
        Null,
        Bool(bool),
        Int(i64),
        Str(String),
    }
}

common_struct! {
    /// `object.field`
    pub struct FieldAccess {
        pub object: P<Node>,
        pub field: String,
    }
}

common_struct! {
    /// `(params) -> body`; the body is either a single expression node or a
    /// block of statements.
    pub struct LambdaExpr {
        pub params: Vec<P<Node>>,
        pub body: P<Node>,
    }
}

common_struct! {
    /// `receiver.method(args)`, or `method(args)` when the receiver is
    /// implicit.
    pub struct InvokeExpr {
        pub receiver: Option<P<Node>>,
        pub method: String,
        pub args: Vec<P<Node>>,
    }
}

common_struct! {
    /// `target::member` — a direct reference to an existing callable.
    pub struct MemberRef {
        pub target: P<Node>,
        pub member: String,
    }
}

common_struct! {
    /// `expr instanceof ty_name`
    pub struct TypeTest {
        pub expr: P<Node>,
        pub ty_name: String,
    }
}

common_struct! {
    /// `(ty_name) expr`
    pub struct CastExpr {
        pub ty_name: String,
        pub expr: P<Node>,
    }
}

common_enum! {
    pub enum BinaryOp {
        Eq,
        Ne,
        Lt,
        Le,
        Gt,
        Ge,
    }
}

common_struct! {
    pub struct BinaryExpr {
        pub op: BinaryOp,
        pub lhs: P<Node>,
        pub rhs: P<Node>,
    }
}

common_struct! {
    pub struct BlockExpr {
        pub stmts: Vec<P<Node>>,
    }
}

common_struct! {
    pub struct ReturnStmt {
        pub expr: Option<P<Node>>,
    }
}

common_struct! {
    pub struct IfStmt {
        pub cond: P<Node>,
        pub then: P<Node>,
        pub elze: Option<P<Node>>,
    }
}

common_struct! {
    /// `import path;` at the top of a unit.
    pub struct ImportDecl {
        pub path: String,
    }
}

common_struct! {
    /// Root of one parsed source unit: its import declarations followed by
    /// its top-level statements.
    pub struct SourceFile {
        pub imports: Vec<P<Node>>,
        pub stmts: Vec<P<Node>>,
    }
}

common_enum! {
    /// Closed sum over every syntactic construct the engine understands.
    /// Dispatch is exhaustive matching, so adding a variant is a
    /// compile-time-checked operation across visitors and printers.
    pub enum NodeKind {
        Ident(Ident),
        Literal(Literal),
        FieldAccess(FieldAccess),
        Lambda(LambdaExpr),
        Invoke(InvokeExpr),
        MemberRef(MemberRef),
        TypeTest(TypeTest),
        Cast(CastExpr),
        Binary(BinaryExpr),
        Block(BlockExpr),
        Return(ReturnStmt),
        If(IfStmt),
        Import(ImportDecl),
        SourceFile(SourceFile),
    }
}

impl NodeKind {
    /// Short tag for logs and malformed-tree messages.
    pub fn tag(&self) -> &'static str {
        match self {
            NodeKind::Ident(_) => "ident",
            NodeKind::Literal(_) => "literal",
            NodeKind::FieldAccess(_) => "field-access",
            NodeKind::Lambda(_) => "lambda",
            NodeKind::Invoke(_) => "invoke",
            NodeKind::MemberRef(_) => "member-ref",
            NodeKind::TypeTest(_) => "type-test",
            NodeKind::Cast(_) => "cast",
            NodeKind::Binary(_) => "binary",
            NodeKind::Block(_) => "block",
            NodeKind::Return(_) => "return",
            NodeKind::If(_) => "if",
            NodeKind::Import(_) => "import",
            NodeKind::SourceFile(_) => "source-file",
        }
    }
}
