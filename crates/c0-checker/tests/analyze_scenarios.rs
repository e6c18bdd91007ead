//! End-to-end scenarios over hand-built projects.

use std::rc::Rc;

use c0_checker::analyze_quiet;
use c0_common::diagnostics::CompileStatus;
use c0_common::{Atom, Interner, Span};
use c0_syntax::expr::{Block, Expr, ExprNode, ExprPtr, Lit, Stmt};
use c0_syntax::pattern::{Pattern, PatternNode};
use c0_syntax::{
    AstModule, Binding, Item, ModulePath, ProcedureDecl, StaticDecl, UsingClause, UsingDecl,
    Visibility,
};

fn sp(start: u32, end: u32) -> Span {
    Span::offsets(Atom(0), start, end)
}

fn mpath(interner: &Interner, segs: &[&str]) -> ModulePath {
    segs.iter().map(|s| interner.intern(s)).collect()
}

fn module(interner: &Interner, path: &[&str], items: Vec<Item>) -> AstModule {
    AstModule {
        path: mpath(interner, path),
        items,
        span: Span::dummy(),
    }
}

fn empty_block() -> Rc<Block> {
    Rc::new(Block {
        stmts: Vec::new(),
        tail: None,
        span: Span::dummy(),
    })
}

fn proc_item(interner: &Interner, vis: Visibility, name: &str, body: Rc<Block>) -> Item {
    Item::Procedure(ProcedureDecl {
        vis,
        name: interner.intern(name),
        params: Vec::new(),
        ret: None,
        body: Some(body),
        span: Span::dummy(),
    })
}

fn static_item(interner: &Interner, name: &str, init: ExprPtr) -> Item {
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

fn using_path(interner: &Interner, vis: Visibility, path: &[&str], alias: Option<&str>) -> Item {
    Item::Using(UsingDecl {
        vis,
        clause: UsingClause::Path {
            path: mpath(interner, path),
            alias: alias.map(|a| interner.intern(a)),
        },
        span: Span::dummy(),
    })
}

fn qualified_call(interner: &Interner, path: &[&str], name: &str, span: Span) -> ExprPtr {
    Expr::new(
        ExprNode::QualifiedApply {
            path: mpath(interner, path),
            name: interner.intern(name),
            args: c0_syntax::ApplyArgs::Paren(Vec::new()),
        },
        span,
    )
}

fn path_value(interner: &Interner, path: &[&str], name: &str) -> ExprPtr {
    Expr::new(
        ExprNode::QualifiedName {
            path: mpath(interner, path),
            name: interner.intern(name),
        },
        Span::dummy(),
    )
}

/// S1: using re-export with aliasing resolves through to the
/// declaring module.
#[test]
fn s1_using_reexport_with_aliasing() {
    let interner = Rc::new(Interner::new());
    let m1 = module(
        &interner,
        &["m1"],
        vec![proc_item(&interner, Visibility::Public, "f", empty_block())],
    );
    let m2 = module(
        &interner,
        &["m2"],
        vec![using_path(&interner, Visibility::Public, &["m1", "f"], Some("g"))],
    );
    let caller_body = Rc::new(Block {
        stmts: vec![Stmt::Expr {
            value: qualified_call(&interner, &["m2"], "g", sp(1, 9)),
            span: sp(1, 9),
        }],
        tail: None,
        span: Span::dummy(),
    });
    let m3 = module(
        &interner,
        &["m3"],
        vec![
            using_path(&interner, Visibility::Private, &["m2", "g"], None),
            proc_item(&interner, Visibility::Public, "main", caller_body),
        ],
    );

    let analysis = analyze_quiet(Rc::clone(&interner), vec![m1, m2, m3]);
    assert!(analysis.diags.is_empty(), "{:?}", analysis.diags);
    assert_eq!(analysis.status(), CompileStatus::Ok);

    // m3's call site was rewritten to m1::f.
    let m3_resolved = &analysis.modules[2];
    let Item::Procedure(decl) = &m3_resolved.items[1] else {
        panic!("procedure expected");
    };
    let Stmt::Expr { value, .. } = &decl.body.as_ref().unwrap().stmts[0] else {
        panic!("expr stmt expected");
    };
    let ExprNode::Call { callee, .. } = &value.node else {
        panic!("call expected, got {:?}", value.node);
    };
    let ExprNode::PathExpr { path, name } = &callee.node else {
        panic!("path expected, got {:?}", callee.node);
    };
    assert_eq!(path, &mpath(&interner, &["m1"]));
    assert_eq!(*name, interner.intern("f"));
}

/// S2: a private procedure is inaccessible across modules, with exactly
/// one diagnostic at the call site.
#[test]
fn s2_private_visibility() {
    let interner = Rc::new(Interner::new());
    let m1 = module(
        &interner,
        &["m1"],
        vec![proc_item(&interner, Visibility::Private, "h", empty_block())],
    );
    let call_site = sp(10, 18);
    let caller_body = Rc::new(Block {
        stmts: vec![Stmt::Expr {
            value: qualified_call(&interner, &["m1"], "h", call_site),
            span: call_site,
        }],
        tail: None,
        span: Span::dummy(),
    });
    let m2 = module(
        &interner,
        &["m2"],
        vec![proc_item(&interner, Visibility::Public, "main", caller_body)],
    );

    let analysis = analyze_quiet(Rc::clone(&interner), vec![m1, m2]);
    let access_errors: Vec<_> = analysis
        .diags
        .iter()
        .filter(|d| d.code == "E-MOD-1207")
        .collect();
    assert_eq!(access_errors.len(), 1, "{:?}", analysis.diags);
    assert_eq!(access_errors[0].span, Some(call_site));
}

/// S3: duplicate top-level names produce E-MOD-1302 and keep the first
/// binding.
#[test]
fn s3_duplicate_top_level_name() {
    let interner = Rc::new(Interner::new());
    let m1 = module(
        &interner,
        &["m1"],
        vec![
            proc_item(&interner, Visibility::Public, "x", empty_block()),
            static_item(
                &interner,
                "x",
                Expr::new(ExprNode::Literal(Lit::Int(0)), Span::dummy()),
            ),
        ],
    );
    let analysis = analyze_quiet(Rc::clone(&interner), vec![m1]);
    assert!(analysis.diags.iter().any(|d| d.code == "E-MOD-1302"));
    assert_eq!(analysis.status(), CompileStatus::Fail);
}

/// S4: an eager initialization cycle fails the plan.
#[test]
fn s4_eager_cycle() {
    let interner = Rc::new(Interner::new());
    let m1 = module(
        &interner,
        &["m1"],
        vec![static_item(&interner, "a", path_value(&interner, &["m2"], "b"))],
    );
    let m2 = module(
        &interner,
        &["m2"],
        vec![static_item(&interner, "b", path_value(&interner, &["m1"], "a"))],
    );
    let analysis = analyze_quiet(Rc::clone(&interner), vec![m1, m2]);
    assert!(analysis.diags.iter().any(|d| d.code == "E-MOD-1401"));
    assert!(!analysis.init_plan.topo_ok);
    assert!(analysis.init_plan.init_order.is_empty());
}

/// S5: a pointer allocated in a region escapes through a return.
#[test]
fn s5_region_escape() {
    let interner = Rc::new(Interner::new());
    let r = interner.intern("r");
    let p = interner.intern("p");
    let return_span = sp(40, 49);

    let region_expr = Expr::new(
        ExprNode::RegionExpr {
            alias: Some(r),
            opts: None,
            body: Rc::new(Block {
                stmts: Vec::new(),
                tail: Some(Expr::new(
                    ExprNode::Alloc {
                        region: Some(r),
                        value: Expr::new(ExprNode::Literal(Lit::Int(42)), Span::dummy()),
                    },
                    sp(20, 24),
                )),
                span: Span::dummy(),
            }),
        },
        sp(10, 26),
    );
    let body = Rc::new(Block {
        stmts: vec![
            Stmt::Let {
                pat: Pattern::new(PatternNode::Ident(p), sp(4, 5)),
                ty: None,
                init: region_expr,
                span: sp(0, 26),
            },
            Stmt::Return {
                value: Some(Expr::new(ExprNode::Ident(p), sp(47, 48))),
                span: return_span,
            },
        ],
        tail: None,
        span: Span::dummy(),
    });
    let m1 = module(
        &interner,
        &["m1"],
        vec![proc_item(&interner, Visibility::Public, "leak", body)],
    );
    let analysis = analyze_quiet(Rc::clone(&interner), vec![m1]);
    let escapes: Vec<_> = analysis
        .diags
        .iter()
        .filter(|d| d.code == "E-REG-0002")
        .collect();
    assert_eq!(escapes.len(), 1, "{:?}", analysis.diags);
    assert_eq!(escapes[0].span, Some(return_span));
}

/// Warnings alone keep the compile status Ok.
#[test]
fn clean_project_analyzes_clean() {
    let interner = Rc::new(Interner::new());
    let m1 = module(
        &interner,
        &["m1"],
        vec![proc_item(&interner, Visibility::Public, "main", empty_block())],
    );
    let analysis = analyze_quiet(Rc::clone(&interner), vec![m1]);
    assert!(analysis.diags.is_empty(), "{:?}", analysis.diags);
    assert!(analysis.init_plan.topo_ok);
    assert_eq!(analysis.init_plan.init_order, ["m1"]);
}
