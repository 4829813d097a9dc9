use super::*;
use crate::scheduler::Engine;
use pretty_assertions::assert_eq;
use recast_core::resolve::{NoResolver, StaticResolver};
use recast_core::tree::SourceUnit;

fn resolver() -> Arc<dyn TypeResolver> {
    Arc::new(StaticResolver::new().with_type("com.acme.CheckType"))
}

fn recipe(resolver: Arc<dyn TypeResolver>) -> Arc<dyn Recipe> {
    Arc::new(SimplifyLambdaToReference::new(resolver))
}

fn unit_with(stmt: P<Node>) -> SourceUnit {
    SourceUnit::new("demo.src", Node::source_file(vec![], vec![stmt]))
}

fn first_stmt(unit: &SourceUnit) -> P<Node> {
    let NodeKind::SourceFile(file) = unit.root().kind() else {
        panic!("root must be a source file");
    };
    file.stmts[0].clone()
}

fn member_ref(node: &P<Node>) -> &MemberRef {
    let NodeKind::MemberRef(member_ref) = node.kind() else {
        panic!("expected a member reference, got {}", node.kind().tag());
    };
    member_ref
}

#[test]
fn instanceof_lambda_becomes_is_instance_reference() {
    let lambda = Node::lambda(
        vec![Node::ident("o")],
        Node::type_test(Node::ident("o"), "CheckType"),
    );
    let lambda_id = lambda.id();

    let result = Engine::default()
        .run(vec![unit_with(lambda)], recipe(resolver()))
        .unwrap();

    let rewritten = first_stmt(&result.results[0].after);
    let reference = member_ref(&rewritten);
    assert_eq!(reference.member, IS_INSTANCE);
    assert_eq!(
        reference.target.ty().map(|t| t.qualified_name.as_str()),
        Some("com.acme.CheckType")
    );
    // Same logical construct, transformed: the reference keeps the
    // lambda's id.
    assert_eq!(rewritten.id(), lambda_id);
    assert!(result.converged);
}

#[test]
fn unresolved_type_leaves_the_lambda_unchanged() {
    let lambda = Node::lambda(
        vec![Node::ident("o")],
        Node::type_test(Node::ident("o"), "CheckType"),
    );
    let input = unit_with(lambda);
    let root = input.root().clone();

    let result = Engine::default()
        .run(vec![input], recipe(Arc::new(NoResolver)))
        .unwrap();

    assert!(!result.results[0].changed);
    assert!(P::ptr_eq(result.results[0].after.root(), &root));
}

#[test]
fn non_null_check_becomes_predicate_reference_with_one_import() {
    let lambda = Node::lambda(
        vec![Node::ident("o")],
        Node::binary(BinaryOp::Ne, Node::ident("o"), Node::null()),
    );

    let result = Engine::default()
        .run(vec![unit_with(lambda)], recipe(resolver()))
        .unwrap();

    // Two cycles ran; the import must still appear exactly once.
    assert_eq!(result.cycles, 2);
    let after = &result.results[0].after;
    let NodeKind::SourceFile(file) = after.root().kind() else {
        panic!("root must be a source file");
    };
    let imports: Vec<_> = file
        .imports
        .iter()
        .filter_map(|import| match import.kind() {
            NodeKind::Import(decl) => Some(decl.path.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(imports, vec![NULL_PREDICATE_IMPORT.to_string()]);

    let rewritten = first_stmt(after);
    let reference = member_ref(&rewritten);
    assert_eq!(reference.member, NON_NULL);
}

#[test]
fn null_equality_uses_the_is_null_predicate() {
    let lambda = Node::lambda(
        vec![Node::ident("o")],
        Node::binary(BinaryOp::Eq, Node::null(), Node::ident("o")),
    );

    let result = Engine::default()
        .run(vec![unit_with(lambda)], recipe(resolver()))
        .unwrap();

    let rewritten = first_stmt(&result.results[0].after);
    let reference = member_ref(&rewritten);
    assert_eq!(reference.member, IS_NULL);
}

#[test]
fn existing_import_is_not_duplicated() {
    let lambda = Node::lambda(
        vec![Node::ident("o")],
        Node::binary(BinaryOp::Ne, Node::ident("o"), Node::null()),
    );
    let input = SourceUnit::new(
        "demo.src",
        Node::source_file(vec![Node::import(NULL_PREDICATE_IMPORT)], vec![lambda]),
    );

    let result = Engine::default()
        .run(vec![input], recipe(resolver()))
        .unwrap();

    let NodeKind::SourceFile(file) = result.results[0].after.root().kind() else {
        panic!("root must be a source file");
    };
    assert_eq!(file.imports.len(), 1);
    assert!(result.results[0].changed);
}

#[test]
fn cast_lambda_becomes_cast_reference() {
    let lambda = Node::lambda(
        vec![Node::ident("o")],
        Node::block(vec![Node::ret(Some(Node::cast(
            "CheckType",
            Node::ident("o"),
        )))]),
    );

    let result = Engine::default()
        .run(vec![unit_with(lambda)], recipe(resolver()))
        .unwrap();

    let rewritten = first_stmt(&result.results[0].after);
    let reference = member_ref(&rewritten);
    assert_eq!(reference.member, CAST);
    assert_eq!(
        reference.target.ty().map(|t| t.qualified_name.as_str()),
        Some("com.acme.CheckType")
    );
}

#[test]
fn eta_reducible_call_becomes_method_reference() {
    let receiver = Node::ident("receiver");
    let lambda = Node::lambda(
        vec![Node::ident("x")],
        Node::invoke(Some(receiver.clone()), "method", vec![Node::ident("x")]),
    );

    let result = Engine::default()
        .run(vec![unit_with(lambda)], recipe(resolver()))
        .unwrap();

    let rewritten = first_stmt(&result.results[0].after);
    let reference = member_ref(&rewritten);
    assert_eq!(reference.member, "method");
    // The receiver node is reused, not rebuilt.
    assert!(P::ptr_eq(&reference.target, &receiver));
}

#[test]
fn eta_reduction_accepts_field_access_receivers() {
    let receiver = Node::field_access(Node::ident("System"), "out");
    let lambda = Node::lambda(
        vec![Node::ident("x")],
        Node::invoke(Some(receiver.clone()), "println", vec![Node::ident("x")]),
    );

    let result = Engine::default()
        .run(vec![unit_with(lambda)], recipe(resolver()))
        .unwrap();

    let rewritten = first_stmt(&result.results[0].after);
    let reference = member_ref(&rewritten);
    assert_eq!(reference.member, "println");
    assert!(P::ptr_eq(&reference.target, &receiver));
}

#[test]
fn eta_reduction_unwraps_a_single_statement_block() {
    let receiver = Node::field_access(Node::ident("System"), "out");
    let lambda = Node::lambda(
        vec![Node::ident("x")],
        Node::block(vec![Node::invoke(
            Some(receiver.clone()),
            "println",
            vec![Node::ident("x")],
        )]),
    );

    let result = Engine::default()
        .run(vec![unit_with(lambda)], recipe(resolver()))
        .unwrap();

    let rewritten = first_stmt(&result.results[0].after);
    let reference = member_ref(&rewritten);
    assert_eq!(reference.member, "println");
    assert!(P::ptr_eq(&reference.target, &receiver));
}

#[test]
fn eta_reduction_requires_exact_argument_order() {
    let lambda = Node::lambda(
        vec![Node::ident("x"), Node::ident("y")],
        Node::invoke(
            Some(Node::ident("receiver")),
            "method",
            vec![Node::ident("y"), Node::ident("x")],
        ),
    );
    let input = unit_with(lambda);
    let root = input.root().clone();

    let result = Engine::default()
        .run(vec![input], recipe(resolver()))
        .unwrap();

    assert!(!result.results[0].changed);
    assert!(P::ptr_eq(result.results[0].after.root(), &root));
}

#[test]
fn eta_reduction_rejects_computed_receivers() {
    let computed = Node::invoke(None, "lookup", vec![]);
    let lambda = Node::lambda(
        vec![Node::ident("x")],
        Node::invoke(Some(computed), "method", vec![Node::ident("x")]),
    );
    let input = unit_with(lambda);

    let result = Engine::default()
        .run(vec![input], recipe(resolver()))
        .unwrap();

    assert!(!result.results[0].changed);
}

#[test]
fn multi_statement_bodies_are_never_rewritten() {
    // The first statement alone would qualify as an instanceof pattern;
    // the guard must still hold.
    let body = Node::block(vec![
        Node::iff(
            Node::type_test(Node::ident("o"), "CheckType"),
            Node::ret(Some(Node::ident("o"))),
            None,
        ),
        Node::ret(Some(Node::ident("o"))),
    ]);
    let lambda = Node::lambda(vec![Node::ident("o")], body);
    let input = unit_with(lambda);
    let root = input.root().clone();

    let result = Engine::default()
        .run(vec![input], recipe(resolver()))
        .unwrap();

    assert!(!result.results[0].changed);
    assert!(P::ptr_eq(result.results[0].after.root(), &root));
}

#[test]
fn converged_output_is_a_fixpoint() {
    let lambda = Node::lambda(
        vec![Node::ident("o")],
        Node::binary(BinaryOp::Ne, Node::ident("o"), Node::null()),
    );

    let first = Engine::default()
        .run(vec![unit_with(lambda)], recipe(resolver()))
        .unwrap();
    assert!(first.results[0].changed);

    let settled = first.results[0].after.clone();
    let second = Engine::default()
        .run(vec![settled], recipe(resolver()))
        .unwrap();
    assert!(!second.any_changed());
    assert_eq!(second.cycles, 1);
}

#[test]
fn nested_lambdas_simplify_in_one_pass() {
    // Outer lambda body holds two statements so only the inner lambda
    // qualifies.
    let inner = Node::lambda(
        vec![Node::ident("o")],
        Node::type_test(Node::ident("o"), "CheckType"),
    );
    let outer = Node::lambda(
        vec![Node::ident("x")],
        Node::block(vec![inner, Node::ret(Some(Node::ident("x")))]),
    );

    let result = Engine::default()
        .run(vec![unit_with(outer)], recipe(resolver()))
        .unwrap();

    let outer_after = first_stmt(&result.results[0].after);
    let NodeKind::Lambda(lambda) = outer_after.kind() else {
        panic!("outer lambda must survive");
    };
    let NodeKind::Block(block) = lambda.body.kind() else {
        panic!("outer body must stay a block");
    };
    assert!(matches!(block.stmts[0].kind(), NodeKind::MemberRef(_)));
    assert_eq!(result.cycles, 2);
}
