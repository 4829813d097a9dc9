//! Printing seam.
//!
//! Re-emitting source text belongs to an external collaborator that is
//! lossless for unmodified subtrees. The engine itself never compares text;
//! [`DebugPrinter`] exists for logs and tests only.

use crate::error::Result;
use crate::tree::{Literal, Node, NodeKind, SourceUnit};
use itertools::Itertools;

pub trait UnitPrinter: Send + Sync {
    fn print(&self, unit: &SourceUnit) -> Result<String>;
}

/// Renders a compact single-line-per-statement form of a unit. Not
/// byte-faithful to any surface syntax; intended for diagnostics.
pub struct DebugPrinter;

impl UnitPrinter for DebugPrinter {
    fn print(&self, unit: &SourceUnit) -> Result<String> {
        Ok(print_node(unit.root()))
    }
}

pub fn print_node(node: &Node) -> String {
    match node.kind() {
        NodeKind::Ident(ident) => ident.name.clone(),
        NodeKind::Literal(literal) => match literal {
            Literal::Null => "null".to_string(),
            Literal::Bool(b) => b.to_string(),
            Literal::Int(i) => i.to_string(),
            Literal::Str(s) => format!("{:?}", s),
        },
        NodeKind::FieldAccess(access) => {
            format!("{}.{}", print_node(&access.object), access.field)
        }
        NodeKind::Lambda(lambda) => {
            let params = lambda.params.iter().map(|p| print_node(p)).join(", ");
            format!("({}) -> {}", params, print_node(&lambda.body))
        }
        NodeKind::Invoke(invoke) => {
            let args = invoke.args.iter().map(|a| print_node(a)).join(", ");
            match &invoke.receiver {
                Some(receiver) => format!("{}.{}({})", print_node(receiver), invoke.method, args),
                None => format!("{}({})", invoke.method, args),
            }
        }
        NodeKind::MemberRef(member_ref) => {
            format!("{}::{}", print_node(&member_ref.target), member_ref.member)
        }
        NodeKind::TypeTest(test) => {
            format!("{} instanceof {}", print_node(&test.expr), test.ty_name)
        }
        NodeKind::Cast(cast) => format!("({}) {}", cast.ty_name, print_node(&cast.expr)),
        NodeKind::Binary(binary) => {
            let op = match binary.op {
                crate::tree::BinaryOp::Eq => "==",
                crate::tree::BinaryOp::Ne => "!=",
                crate::tree::BinaryOp::Lt => "<",
                crate::tree::BinaryOp::Le => "<=",
                crate::tree::BinaryOp::Gt => ">",
                crate::tree::BinaryOp::Ge => ">=",
            };
            format!("{} {} {}", print_node(&binary.lhs), op, print_node(&binary.rhs))
        }
        NodeKind::Block(block) => {
            let stmts = block.stmts.iter().map(|s| print_node(s)).join("; ");
            format!("{{ {} }}", stmts)
        }
        NodeKind::Return(ret) => match &ret.expr {
            Some(expr) => format!("return {}", print_node(expr)),
            None => "return".to_string(),
        },
        NodeKind::If(iff) => match &iff.elze {
            Some(elze) => format!(
                "if ({}) {} else {}",
                print_node(&iff.cond),
                print_node(&iff.then),
                print_node(elze)
            ),
            None => format!("if ({}) {}", print_node(&iff.cond), print_node(&iff.then)),
        },
        NodeKind::Import(import) => format!("import {}", import.path),
        NodeKind::SourceFile(file) => file
            .imports
            .iter()
            .chain(file.stmts.iter())
            .map(|n| print_node(n))
            .join("\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::BinaryOp;
    use pretty_assertions::assert_eq;

    #[test]
    fn renders_a_lambda_unit() {
        let lambda = Node::lambda(
            vec![Node::ident("o")],
            Node::binary(BinaryOp::Ne, Node::ident("o"), Node::null()),
        );
        let unit = SourceUnit::new(
            "demo.src",
            Node::source_file(vec![Node::import("java.util.List")], vec![lambda]),
        );
        assert_eq!(
            DebugPrinter.print(&unit).unwrap(),
            "import java.util.List\n(o) -> o != null"
        );
    }
}
