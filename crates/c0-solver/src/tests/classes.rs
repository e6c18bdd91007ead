use std::rc::Rc;

use c0_binder::Sigma;
use c0_common::{Interner, Span};
use c0_syntax::types::{Type, TypeNode, PrimType};
use c0_syntax::{
    ClassDecl, ClassItem, ClassMethodDecl, ClassPath, Receiver, ReceiverPerm, Visibility, path_key,
};

use super::*;

fn method(
    interner: &Interner,
    name: &str,
    receiver: ReceiverPerm,
    ret: Option<TypeNode>,
    concrete: bool,
) -> ClassMethodDecl {
    ClassMethodDecl {
        vis: Visibility::Public,
        name: interner.intern(name),
        receiver: Some(Receiver {
            perm: receiver,
            span: Span::dummy(),
        }),
        generics: Vec::new(),
        params: Vec::new(),
        ret: ret.map(|node| Type::new(node, Span::dummy())),
        body: concrete.then(|| {
            Rc::new(c0_syntax::Block {
                stmts: Vec::new(),
                tail: None,
                span: Span::dummy(),
            })
        }),
        static_dispatch_only: false,
        span: Span::dummy(),
    }
}

fn class_with(
    interner: &Interner,
    name: &str,
    supers: &[&str],
    items: Vec<ClassItem>,
) -> (c0_syntax::PathKey, ClassDecl) {
    let decl = ClassDecl {
        vis: Visibility::Public,
        name: interner.intern(name),
        generics: Vec::new(),
        supers: supers.iter().map(|s| vec![interner.intern(s)]).collect(),
        items,
        span: Span::dummy(),
    };
    (path_key(&[interner.intern(name)]), decl)
}

fn engine_with(interner: &Interner, classes: Vec<(c0_syntax::PathKey, ClassDecl)>) -> ClassEngine {
    let mut sigma = Sigma::default();
    for (key, decl) in classes {
        sigma.classes.insert(key, decl);
    }
    ClassEngine::new(Rc::new(sigma))
}

fn cp(interner: &Interner, name: &str) -> ClassPath {
    vec![interner.intern(name)]
}

#[test]
fn first_definition_wins_in_the_method_table() {
    let interner = Interner::new();
    let engine = engine_with(
        &interner,
        vec![
            class_with(
                &interner,
                "A",
                &[],
                vec![ClassItem::Method(method(
                    &interner,
                    "ping",
                    ReceiverPerm::Const,
                    None,
                    true,
                ))],
            ),
            class_with(
                &interner,
                "B",
                &["A"],
                vec![ClassItem::Method(method(
                    &interner,
                    "ping",
                    ReceiverPerm::Const,
                    None,
                    true,
                ))],
            ),
        ],
    );
    let table = engine.method_table(&cp(&interner, "B"));
    assert!(table.ok);
    let (owner, _) = &table.methods[&interner.intern("ping")];
    assert_eq!(owner, &cp(&interner, "B"));
}

#[test]
fn signature_conflicts_are_rejected() {
    let interner = Interner::new();
    let engine = engine_with(
        &interner,
        vec![
            class_with(
                &interner,
                "A",
                &[],
                vec![ClassItem::Method(method(
                    &interner,
                    "ping",
                    ReceiverPerm::Const,
                    Some(TypeNode::Prim(PrimType::I32)),
                    true,
                ))],
            ),
            class_with(
                &interner,
                "B",
                &["A"],
                vec![ClassItem::Method(method(
                    &interner,
                    "ping",
                    ReceiverPerm::Const,
                    Some(TypeNode::Prim(PrimType::Bool)),
                    true,
                ))],
            ),
        ],
    );
    let table = engine.method_table(&cp(&interner, "B"));
    assert!(!table.ok);
    assert_eq!(table.diag_id, Some("EffMethods-Conflict"));
}

#[test]
fn diamond_agreeing_signatures_merge() {
    let interner = Interner::new();
    let shared = |i: &Interner| {
        ClassItem::Method(method(i, "ping", ReceiverPerm::Const, None, true))
    };
    let engine = engine_with(
        &interner,
        vec![
            class_with(&interner, "A", &[], vec![]),
            class_with(&interner, "B", &["A"], vec![shared(&interner)]),
            class_with(&interner, "C", &["A"], vec![shared(&interner)]),
            class_with(&interner, "D", &["B", "C"], vec![]),
        ],
    );
    let linearized = engine.linearize(&cp(&interner, "D"));
    assert!(linearized.ok);
    let order: Vec<String> = linearized
        .order
        .iter()
        .map(|p| interner.resolve(p[0]).to_string())
        .collect();
    assert_eq!(order, ["D", "B", "C", "A"]);

    let table = engine.method_table(&cp(&interner, "D"));
    assert!(table.ok, "agreeing diamond must not conflict");
}

#[test]
fn by_value_receiver_blocks_dispatchability() {
    let interner = Interner::new();
    let engine = engine_with(
        &interner,
        vec![class_with(
            &interner,
            "A",
            &[],
            vec![ClassItem::Method(method(
                &interner,
                "consume",
                ReceiverPerm::Value,
                None,
                false,
            ))],
        )],
    );
    assert!(!class_dispatchable(&engine, &cp(&interner, "A")));
}

#[test]
fn static_dispatch_only_methods_are_exempt() {
    let interner = Interner::new();
    let mut by_value = method(&interner, "consume", ReceiverPerm::Value, None, false);
    by_value.static_dispatch_only = true;
    let engine = engine_with(
        &interner,
        vec![class_with(&interner, "A", &[], vec![ClassItem::Method(by_value)])],
    );
    assert!(class_dispatchable(&engine, &cp(&interner, "A")));
}

#[test]
fn self_by_value_in_params_blocks_dispatchability() {
    let interner = Interner::new();
    let mut with_self = method(&interner, "merge", ReceiverPerm::Const, None, false);
    with_self.params.push(c0_syntax::Param {
        name: interner.intern("other"),
        mode: c0_syntax::ParamMode::Value,
        ty: Type::new(TypeNode::SelfType, Span::dummy()),
        span: Span::dummy(),
    });
    let engine = engine_with(
        &interner,
        vec![class_with(&interner, "A", &[], vec![ClassItem::Method(with_self)])],
    );
    assert!(!class_dispatchable(&engine, &cp(&interner, "A")));
}

#[test]
fn generic_methods_block_dispatchability() {
    let interner = Interner::new();
    let mut generic = method(&interner, "map", ReceiverPerm::Const, None, false);
    generic.generics.push(c0_syntax::TypeParam {
        name: interner.intern("U"),
        span: Span::dummy(),
    });
    let engine = engine_with(
        &interner,
        vec![class_with(&interner, "A", &[], vec![ClassItem::Method(generic)])],
    );
    assert!(!class_dispatchable(&engine, &cp(&interner, "A")));
}

#[test]
fn class_subtyping_follows_the_linearization() {
    let interner = Interner::new();
    let engine = engine_with(
        &interner,
        vec![
            class_with(&interner, "A", &[], vec![]),
            class_with(&interner, "B", &["A"], vec![]),
        ],
    );
    assert!(class_subtypes(&engine, &cp(&interner, "B"), &cp(&interner, "A")));
    assert!(!class_subtypes(&engine, &cp(&interner, "A"), &cp(&interner, "B")));
}

#[test]
fn orphan_rule_requires_a_local_nominal() {
    let interner = Interner::new();
    let mut sigma = Sigma::default();
    let record = c0_syntax::RecordDecl {
        vis: Visibility::Public,
        name: interner.intern("Point"),
        generics: Vec::new(),
        implements: Vec::new(),
        members: Vec::new(),
        span: Span::dummy(),
    };
    sigma.types.insert(
        path_key(&[interner.intern("Point")]),
        c0_binder::TypeDecl::Record(record),
    );
    let engine = ClassEngine::new(Rc::new(sigma));
    assert!(check_orphan_rule(&engine, &vec![interner.intern("Point")]));
    assert!(!check_orphan_rule(&engine, &vec![interner.intern("Elsewhere")]));
}

#[test]
fn method_tables_are_deterministic() {
    let interner = Interner::new();
    let engine = engine_with(
        &interner,
        vec![
            class_with(
                &interner,
                "A",
                &[],
                vec![
                    ClassItem::Method(method(&interner, "a", ReceiverPerm::Const, None, true)),
                    ClassItem::Method(method(&interner, "b", ReceiverPerm::Const, None, true)),
                ],
            ),
            class_with(
                &interner,
                "B",
                &["A"],
                vec![ClassItem::Method(method(
                    &interner,
                    "c",
                    ReceiverPerm::Const,
                    None,
                    true,
                ))],
            ),
        ],
    );
    let t1 = engine.method_table(&cp(&interner, "B"));
    let t2 = engine.method_table(&cp(&interner, "B"));
    let names1: Vec<_> = t1.methods.keys().copied().collect();
    let names2: Vec<_> = t2.methods.keys().copied().collect();
    assert_eq!(names1, names2);
    // B's own method precedes the inherited ones in linearization order.
    assert_eq!(names1[0], interner.intern("c"));
}
