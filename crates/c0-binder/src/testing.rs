//! Hand-built AST fixtures for binder unit tests.

use std::rc::Rc;

use c0_common::{Interner, Span};
use c0_syntax::expr::{Expr, ExprNode, ExprPtr, Lit};
use c0_syntax::pattern::{Pattern, PatternNode};
use c0_syntax::{
    AstModule, Binding, Identifier, Item, ModulePath, ProcedureDecl, StaticDecl, UsingClause,
    UsingDecl, UsingSpec, Visibility,
};

use crate::scopes::{ScopeContext, Sigma};

pub fn sp() -> Span {
    Span::dummy()
}

pub fn mpath(interner: &Interner, segs: &[&str]) -> ModulePath {
    segs.iter().map(|s| interner.intern(s)).collect()
}

pub fn lit_unit() -> ExprPtr {
    Expr::new(ExprNode::Literal(Lit::Unit), sp())
}

pub fn int_expr(value: i128) -> ExprPtr {
    Expr::new(ExprNode::Literal(Lit::Int(value)), sp())
}

pub fn ident_pat(name: Identifier) -> Pattern {
    Pattern::new(PatternNode::Ident(name), sp())
}

pub fn proc_item(interner: &Interner, vis: Visibility, name: &str) -> Item {
    Item::Procedure(ProcedureDecl {
        vis,
        name: interner.intern(name),
        params: Vec::new(),
        ret: None,
        body: Some(Rc::new(c0_syntax::Block {
            stmts: Vec::new(),
            tail: None,
            span: sp(),
        })),
        span: sp(),
    })
}

pub fn static_item(interner: &Interner, vis: Visibility, name: &str, init: ExprPtr) -> Item {
    Item::Static(StaticDecl {
        vis,
        binding: Binding {
            pat: ident_pat(interner.intern(name)),
            ty: None,
            init,
        },
        span: sp(),
    })
}

pub fn using_path(interner: &Interner, vis: Visibility, path: &[&str], alias: Option<&str>) -> Item {
    Item::Using(UsingDecl {
        vis,
        clause: UsingClause::Path {
            path: mpath(interner, path),
            alias: alias.map(|a| interner.intern(a)),
        },
        span: sp(),
    })
}

pub fn using_list(
    interner: &Interner,
    vis: Visibility,
    module: &[&str],
    specs: &[(&str, Option<&str>)],
) -> Item {
    Item::Using(UsingDecl {
        vis,
        clause: UsingClause::List {
            module: mpath(interner, module),
            specs: specs
                .iter()
                .map(|(name, alias)| UsingSpec {
                    name: interner.intern(name),
                    alias: alias.map(|a| interner.intern(a)),
                    span: sp(),
                })
                .collect(),
        },
        span: sp(),
    })
}

pub fn using_wildcard(interner: &Interner, vis: Visibility, module: &[&str]) -> Item {
    Item::Using(UsingDecl {
        vis,
        clause: UsingClause::Wildcard {
            module: mpath(interner, module),
        },
        span: sp(),
    })
}

pub fn module(interner: &Interner, path: &[&str], items: Vec<Item>) -> AstModule {
    AstModule {
        path: mpath(interner, path),
        items,
        span: sp(),
    }
}

/// Context over a Σ of the given modules, positioned in the first one.
pub fn context_for(interner: Rc<Interner>, mods: Vec<AstModule>) -> ScopeContext {
    let current = mods
        .first()
        .map(|m| m.path.clone())
        .unwrap_or_default();
    let sigma = Sigma {
        types: indexmap::IndexMap::new(),
        classes: indexmap::IndexMap::new(),
        mods,
    };
    ScopeContext::for_module(Rc::new(sigma), interner, current, crate::scopes::Scope::new())
}
