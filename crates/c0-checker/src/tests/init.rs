use std::rc::Rc;

use c0_common::{Interner, Span};
use c0_syntax::expr::{Expr, ExprNode, ExprPtr, Lit};
use c0_syntax::pattern::{Pattern, PatternNode};
use c0_syntax::{AstModule, Binding, Item, ModulePath, ProcedureDecl, StaticDecl, Visibility};

use super::*;

fn mpath(interner: &Interner, segs: &[&str]) -> ModulePath {
    segs.iter().map(|s| interner.intern(s)).collect()
}

fn value_ref(interner: &Interner, module: &[&str], name: &str) -> ExprPtr {
    Expr::new(
        ExprNode::PathExpr {
            path: mpath(interner, module),
            name: interner.intern(name),
        },
        Span::dummy(),
    )
}

fn static_with_init(interner: &Interner, name: &str, init: ExprPtr) -> Item {
    Item::Static(StaticDecl {
        vis: Visibility::Public,
        binding: Binding {
            pat: Pattern::new(PatternNode::Ident(interner.intern(name)), Span::dummy()),
            ty: None,
            init,
        },
        span: Span::dummy(),
    })
}

fn module(interner: &Interner, path: &[&str], items: Vec<Item>) -> AstModule {
    AstModule {
        path: mpath(interner, path),
        items,
        span: Span::dummy(),
    }
}

fn int(value: i128) -> ExprPtr {
    Expr::new(ExprNode::Literal(Lit::Int(value)), Span::dummy())
}

#[test]
fn independent_modules_order_by_index() {
    let interner = Interner::new();
    let mods = vec![
        module(&interner, &["b"], vec![static_with_init(&interner, "x", int(1))]),
        module(&interner, &["a"], vec![static_with_init(&interner, "y", int(2))]),
    ];
    let (plan, diags) = plan_initialization(&interner, &mods);
    assert!(diags.is_empty());
    assert!(plan.topo_ok);
    // ready set drains in ascending module-index order, not name order
    assert_eq!(plan.init_order, ["b", "a"]);
}

#[test]
fn eager_dependencies_order_initialization() {
    let interner = Interner::new();
    // m1's static reads m2::b, so m2 initializes first.
    let mods = vec![
        module(
            &interner,
            &["m1"],
            vec![static_with_init(&interner, "a", value_ref(&interner, &["m2"], "b"))],
        ),
        module(&interner, &["m2"], vec![static_with_init(&interner, "b", int(0))]),
    ];
    let (plan, diags) = plan_initialization(&interner, &mods);
    assert!(diags.is_empty());
    assert!(plan.topo_ok);
    assert_eq!(plan.init_order, ["m2", "m1"]);
    assert_eq!(plan.eager_edges[0], vec![1]);
    assert!(plan.eager_edges[1].is_empty());
}

#[test]
fn eager_cycle_fails_with_an_empty_order() {
    let interner = Interner::new();
    let mods = vec![
        module(
            &interner,
            &["m1"],
            vec![static_with_init(&interner, "a", value_ref(&interner, &["m2"], "b"))],
        ),
        module(
            &interner,
            &["m2"],
            vec![static_with_init(&interner, "b", value_ref(&interner, &["m1"], "a"))],
        ),
    ];
    let (plan, diags) = plan_initialization(&interner, &mods);
    assert!(!plan.topo_ok);
    assert!(plan.init_order.is_empty());
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, "E-MOD-1401");
}

#[test]
fn lazy_references_do_not_constrain_the_order() {
    let interner = Interner::new();
    // Bodies may reference each other cyclically.
    let body = |target: &str| {
        Some(Rc::new(c0_syntax::Block {
            stmts: Vec::new(),
            tail: Some(value_ref(&interner, &[target], "f")),
            span: Span::dummy(),
        }))
    };
    let proc = |name: &str, target: &str| {
        Item::Procedure(ProcedureDecl {
            vis: Visibility::Public,
            name: interner.intern(name),
            params: Vec::new(),
            ret: None,
            body: body(target),
            span: Span::dummy(),
        })
    };
    let mods = vec![
        module(&interner, &["m1"], vec![proc("f", "m2")]),
        module(&interner, &["m2"], vec![proc("f", "m1")]),
    ];
    let (plan, diags) = plan_initialization(&interner, &mods);
    assert!(diags.is_empty());
    assert!(plan.topo_ok);
    assert_eq!(plan.lazy_edges[0], vec![1]);
    assert_eq!(plan.lazy_edges[1], vec![0]);
    assert!(plan.eager_edges.iter().all(Vec::is_empty));
}

#[test]
fn type_positions_produce_type_edges() {
    let interner = Interner::new();
    let param_ty = c0_syntax::Type::new(
        c0_syntax::TypeNode::Path {
            path: vec![interner.intern("m2"), interner.intern("Point")],
            generic_args: Vec::new(),
        },
        Span::dummy(),
    );
    let mods = vec![
        module(
            &interner,
            &["m1"],
            vec![Item::Procedure(ProcedureDecl {
                vis: Visibility::Public,
                name: interner.intern("f"),
                params: vec![c0_syntax::Param {
                    name: interner.intern("p"),
                    mode: c0_syntax::ParamMode::Value,
                    ty: param_ty,
                    span: Span::dummy(),
                }],
                ret: None,
                body: None,
                span: Span::dummy(),
            })],
        ),
        module(&interner, &["m2"], vec![]),
    ];
    let (plan, _) = plan_initialization(&interner, &mods);
    assert_eq!(plan.type_edges[0], vec![1]);
    assert!(plan.topo_ok, "type edges may cycle without failing");
}

#[test]
fn self_references_are_dropped() {
    let interner = Interner::new();
    let mods = vec![module(
        &interner,
        &["m1"],
        vec![static_with_init(&interner, "a", value_ref(&interner, &["m1"], "b"))],
    )];
    let (plan, diags) = plan_initialization(&interner, &mods);
    assert!(diags.is_empty());
    assert!(plan.eager_edges[0].is_empty());
    assert_eq!(plan.init_order, ["m1"]);
}
