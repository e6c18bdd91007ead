use std::rc::Rc;

use c0_common::{Atom, Interner, Span};
use c0_syntax::expr::{Block, Expr, ExprNode, ExprPtr, Lit, Stmt};
use c0_syntax::pattern::{Pattern, PatternNode};
use c0_syntax::{AstModule, Binding, Item, ProcedureDecl, StaticDecl, Visibility};

use super::*;

fn sp(start: u32, end: u32) -> Span {
    Span::offsets(Atom(0), start, end)
}

fn int(value: i128) -> ExprPtr {
    Expr::new(ExprNode::Literal(Lit::Int(value)), Span::dummy())
}

fn alloc(region: Option<c0_syntax::Identifier>, span: Span) -> ExprPtr {
    Expr::new(
        ExprNode::Alloc {
            region,
            value: int(42),
        },
        span,
    )
}

fn block(stmts: Vec<Stmt>, tail: Option<ExprPtr>) -> Rc<Block> {
    Rc::new(Block {
        stmts,
        tail,
        span: Span::dummy(),
    })
}

fn proc_with_body(interner: &Interner, body: Rc<Block>) -> AstModule {
    AstModule {
        path: [interner.intern("m")].into_iter().collect(),
        items: vec![Item::Procedure(ProcedureDecl {
            vis: Visibility::Public,
            name: interner.intern("f"),
            params: Vec::new(),
            ret: None,
            body: Some(body),
            span: Span::dummy(),
        })],
        span: Span::dummy(),
    }
}

#[test]
fn allocation_outside_any_region_is_rejected() {
    let interner = Interner::new();
    let body = block(
        vec![Stmt::Expr {
            value: alloc(None, sp(5, 8)),
            span: sp(5, 8),
        }],
        None,
    );
    let diags = check_module_memory(&proc_with_body(&interner, body));
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, "E-REG-0001");
    assert_eq!(diags[0].span, Some(sp(5, 8)));
}

#[test]
fn allocation_inside_a_region_is_fine() {
    let interner = Interner::new();
    let region = Stmt::Region {
        alias: None,
        opts: None,
        body: block(
            vec![Stmt::Expr {
                value: alloc(None, sp(5, 8)),
                span: sp(5, 8),
            }],
            None,
        ),
        span: sp(0, 10),
    };
    let diags = check_module_memory(&proc_with_body(&interner, block(vec![region], None)));
    assert!(diags.is_empty(), "{diags:?}");
}

#[test]
fn returning_a_region_pointer_escapes() {
    // let p = region r { r^42 }; return p;  =>  E-REG-0002 at the return.
    let interner = Interner::new();
    let r = interner.intern("r");
    let p = interner.intern("p");
    let region_expr = Expr::new(
        ExprNode::RegionExpr {
            alias: Some(r),
            opts: None,
            body: block(Vec::new(), Some(alloc(Some(r), sp(20, 25)))),
        },
        sp(10, 30),
    );
    let body = block(
        vec![
            Stmt::Let {
                pat: Pattern::new(PatternNode::Ident(p), sp(4, 5)),
                ty: None,
                init: region_expr,
                span: sp(0, 30),
            },
            Stmt::Return {
                value: Some(Expr::new(ExprNode::Ident(p), sp(40, 41))),
                span: sp(33, 42),
            },
        ],
        None,
    );
    let diags = check_module_memory(&proc_with_body(&interner, body));
    assert_eq!(diags.len(), 1, "{diags:?}");
    assert_eq!(diags[0].code, "E-REG-0002");
    assert_eq!(diags[0].span, Some(sp(33, 42)));
}

#[test]
fn assignment_in_a_nested_scope_escapes_through_the_outer_binding() {
    // let p = 0; region r { p = r^1; } return p;  =>  E-REG-0002 at the
    // return: the assignment updates the declaring scope's binding, so
    // the provenance survives the region block's exit.
    let interner = Interner::new();
    let r = interner.intern("r");
    let p = interner.intern("p");
    let return_span = sp(30, 39);

    let region_stmt = Stmt::Region {
        alias: Some(r),
        opts: None,
        body: block(
            vec![Stmt::Assign {
                place: Expr::new(ExprNode::Ident(p), sp(12, 13)),
                value: alloc(Some(r), sp(16, 20)),
                span: sp(12, 20),
            }],
            None,
        ),
        span: sp(8, 22),
    };
    let body = block(
        vec![
            Stmt::Let {
                pat: Pattern::new(PatternNode::Ident(p), sp(4, 5)),
                ty: None,
                init: int(0),
                span: sp(0, 6),
            },
            region_stmt,
            Stmt::Return {
                value: Some(Expr::new(ExprNode::Ident(p), sp(37, 38))),
                span: return_span,
            },
        ],
        None,
    );
    let diags = check_module_memory(&proc_with_body(&interner, body));
    assert_eq!(diags.len(), 1, "{diags:?}");
    assert_eq!(diags[0].code, "E-REG-0002");
    assert_eq!(diags[0].span, Some(return_span));
}

#[test]
fn inner_declarations_shadow_instead_of_updating_outer_bindings() {
    // let p = 0; { let p = region { ^1 }; } return p;  =>  clean: the
    // inner `let` declares a new binding, the outer one stays
    // provenance-free.
    let interner = Interner::new();
    let p = interner.intern("p");
    let inner_region = Expr::new(
        ExprNode::RegionExpr {
            alias: None,
            opts: None,
            body: block(Vec::new(), Some(alloc(None, sp(14, 16)))),
        },
        sp(10, 18),
    );
    let inner_block = Expr::new(
        ExprNode::Block(block(
            vec![Stmt::Let {
                pat: Pattern::new(PatternNode::Ident(p), sp(8, 9)),
                ty: None,
                init: inner_region,
                span: sp(8, 18),
            }],
            None,
        )),
        sp(7, 20),
    );
    let body = block(
        vec![
            Stmt::Let {
                pat: Pattern::new(PatternNode::Ident(p), sp(4, 5)),
                ty: None,
                init: int(0),
                span: sp(0, 6),
            },
            Stmt::Expr {
                value: inner_block,
                span: sp(7, 20),
            },
            Stmt::Return {
                value: Some(Expr::new(ExprNode::Ident(p), sp(29, 30))),
                span: sp(22, 31),
            },
        ],
        None,
    );
    let diags = check_module_memory(&proc_with_body(&interner, body));
    assert!(diags.is_empty(), "{diags:?}");
}

#[test]
fn using_an_expired_pointer_is_rejected() {
    // let p = region { ^1 }; p.read();  =>  E-REG-0003 at the use.
    let interner = Interner::new();
    let p = interner.intern("p");
    let region_expr = Expr::new(
        ExprNode::RegionExpr {
            alias: None,
            opts: None,
            body: block(Vec::new(), Some(alloc(None, sp(8, 10)))),
        },
        sp(4, 12),
    );
    let use_expr = Expr::new(
        ExprNode::MethodCall {
            base: Expr::new(ExprNode::Ident(p), sp(15, 16)),
            name: interner.intern("read"),
            args: Vec::new(),
        },
        sp(15, 22),
    );
    let body = block(
        vec![
            Stmt::Let {
                pat: Pattern::new(PatternNode::Ident(p), sp(0, 1)),
                ty: None,
                init: region_expr,
                span: sp(0, 12),
            },
            Stmt::Expr {
                value: use_expr,
                span: sp(15, 22),
            },
        ],
        None,
    );
    let diags = check_module_memory(&proc_with_body(&interner, body));
    assert_eq!(diags.len(), 1, "{diags:?}");
    assert_eq!(diags[0].code, "E-REG-0003");
    assert_eq!(diags[0].span, Some(sp(15, 16)));
}

#[test]
fn frames_require_an_enclosing_region() {
    let interner = Interner::new();
    let frame = Stmt::Frame {
        target: None,
        body: block(Vec::new(), None),
        span: sp(0, 5),
    };
    let diags = check_module_memory(&proc_with_body(&interner, block(vec![frame], None)));
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, "E-REG-0004");
}

#[test]
fn frames_nest_inside_regions() {
    let interner = Interner::new();
    let frame = Stmt::Frame {
        target: None,
        body: block(
            vec![Stmt::Expr {
                value: alloc(None, sp(5, 8)),
                span: sp(5, 8),
            }],
            None,
        ),
        span: sp(3, 10),
    };
    let region = Stmt::Region {
        alias: None,
        opts: None,
        body: block(vec![frame], None),
        span: sp(0, 12),
    };
    let diags = check_module_memory(&proc_with_body(&interner, block(vec![region], None)));
    assert!(diags.is_empty(), "{diags:?}");
}

#[test]
fn frame_target_must_name_an_enclosing_region() {
    let interner = Interner::new();
    let ghost = interner.intern("ghost");
    let frame = Stmt::Frame {
        target: Some(ghost),
        body: block(Vec::new(), None),
        span: sp(3, 10),
    };
    let region = Stmt::Region {
        alias: None,
        opts: None,
        body: block(vec![frame], None),
        span: sp(0, 12),
    };
    let diags = check_module_memory(&proc_with_body(&interner, block(vec![region], None)));
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, "E-REG-0005");
}

#[test]
fn named_allocation_targets_the_outer_region() {
    let interner = Interner::new();
    let r = interner.intern("r");
    let inner_region = Stmt::Region {
        alias: None,
        opts: None,
        body: block(
            vec![Stmt::Expr {
                value: alloc(Some(r), sp(10, 14)),
                span: sp(10, 14),
            }],
            None,
        ),
        span: sp(5, 16),
    };
    let outer_region = Stmt::Region {
        alias: Some(r),
        opts: None,
        body: block(vec![inner_region], None),
        span: sp(0, 18),
    };
    let diags = check_module_memory(&proc_with_body(&interner, block(vec![outer_region], None)));
    assert!(diags.is_empty(), "{diags:?}");
}

#[test]
fn match_results_unify_to_the_widest_region() {
    // Two arms allocate in different regions; returning the result
    // escapes whichever way the match went.
    let interner = Interner::new();
    let p = interner.intern("p");
    let arm_value = |span| {
        Expr::new(
            ExprNode::RegionExpr {
                alias: None,
                opts: None,
                body: block(Vec::new(), Some(alloc(None, span))),
            },
            span,
        )
    };
    let matched = Expr::new(
        ExprNode::Match {
            scrutinee: int(0),
            arms: vec![
                c0_syntax::MatchArm {
                    pat: Pattern::new(PatternNode::Wildcard, Span::dummy()),
                    guard: None,
                    body: arm_value(sp(10, 12)),
                    span: sp(10, 12),
                },
                c0_syntax::MatchArm {
                    pat: Pattern::new(PatternNode::Wildcard, Span::dummy()),
                    guard: None,
                    body: arm_value(sp(14, 16)),
                    span: sp(14, 16),
                },
            ],
        },
        sp(5, 18),
    );
    let body = block(
        vec![
            Stmt::Let {
                pat: Pattern::new(PatternNode::Ident(p), sp(0, 1)),
                ty: None,
                init: matched,
                span: sp(0, 18),
            },
            Stmt::Return {
                value: Some(Expr::new(ExprNode::Ident(p), sp(28, 29))),
                span: sp(21, 30),
            },
        ],
        None,
    );
    let diags = check_module_memory(&proc_with_body(&interner, body));
    assert_eq!(diags.len(), 1, "{diags:?}");
    assert_eq!(diags[0].code, "E-REG-0002");
}

#[test]
fn implicit_tail_values_escape_like_returns() {
    // proc f() { region r { r^1 } }  =>  E-REG-0002 at the tail: the
    // body's implicit result leaves the procedure like a return would.
    let interner = Interner::new();
    let r = interner.intern("r");
    let tail_span = sp(10, 26);
    let tail = Expr::new(
        ExprNode::RegionExpr {
            alias: Some(r),
            opts: None,
            body: block(Vec::new(), Some(alloc(Some(r), sp(20, 24)))),
        },
        tail_span,
    );
    let diags = check_module_memory(&proc_with_body(&interner, block(Vec::new(), Some(tail))));
    assert_eq!(diags.len(), 1, "{diags:?}");
    assert_eq!(diags[0].code, "E-REG-0002");
    assert_eq!(diags[0].span, Some(tail_span));
}

#[test]
fn method_body_tails_are_checked_too() {
    let interner = Interner::new();
    let tail = Expr::new(
        ExprNode::RegionExpr {
            alias: None,
            opts: None,
            body: block(Vec::new(), Some(alloc(None, sp(8, 10)))),
        },
        sp(4, 12),
    );
    let method = c0_syntax::MethodDecl {
        vis: Visibility::Public,
        name: interner.intern("leak"),
        receiver: c0_syntax::Receiver {
            perm: c0_syntax::ReceiverPerm::Const,
            span: Span::dummy(),
        },
        params: Vec::new(),
        ret: None,
        body: Some(block(Vec::new(), Some(tail))),
        span: Span::dummy(),
    };
    let module = AstModule {
        path: [interner.intern("m")].into_iter().collect(),
        items: vec![Item::Record(c0_syntax::RecordDecl {
            vis: Visibility::Public,
            name: interner.intern("Holder"),
            generics: Vec::new(),
            implements: Vec::new(),
            members: vec![c0_syntax::RecordMember::Method(method)],
            span: Span::dummy(),
        })],
        span: Span::dummy(),
    };
    let diags = check_module_memory(&module);
    assert_eq!(diags.len(), 1, "{diags:?}");
    assert_eq!(diags[0].code, "E-REG-0002");
}

#[test]
fn static_initializers_are_walked() {
    let interner = Interner::new();
    let module = AstModule {
        path: [interner.intern("m")].into_iter().collect(),
        items: vec![Item::Static(StaticDecl {
            vis: Visibility::Public,
            binding: Binding {
                pat: Pattern::new(PatternNode::Ident(interner.intern("x")), Span::dummy()),
                ty: None,
                init: alloc(None, sp(4, 7)),
            },
            span: sp(0, 8),
        })],
        span: Span::dummy(),
    };
    let diags = check_module_memory(&module);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, "E-REG-0001");
}
