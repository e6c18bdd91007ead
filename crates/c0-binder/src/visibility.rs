//! Visibility and access checking.
//!
//! Access is resolved per accessor-module against decl-module: `pub` and
//! `internal` always allow (the core is per-assembly), `priv` and
//! `protected` require the same module path, and `protected` is
//! additionally banned on top-level items.

use c0_common::{Span, make_diagnostic};
use c0_syntax::{
    AstModule, Identifier, Item, ModulePath, Visibility, item_span, item_visibility, pat_names,
    path_eq,
};
use c0_common::DiagnosticStream;
use c0_syntax::expr::{ApplyArgs, Block, Expr, ExprNode, ExprPtr, Stmt};

use crate::scopes::ScopeContext;

/// Outcome of an access check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessResult {
    pub ok: bool,
    pub diag_id: Option<&'static str>,
}

impl AccessResult {
    const ALLOW: AccessResult = AccessResult {
        ok: true,
        diag_id: None,
    };

    const DENY: AccessResult = AccessResult {
        ok: false,
        diag_id: Some("Access-Err"),
    };
}

/// The visibility matrix.
#[must_use]
pub fn can_access_vis(
    accessor_module: &[Identifier],
    decl_module: &[Identifier],
    vis: Visibility,
) -> AccessResult {
    match vis {
        Visibility::Public | Visibility::Internal => AccessResult::ALLOW,
        Visibility::Private | Visibility::Protected => {
            if path_eq(accessor_module, decl_module) {
                AccessResult::ALLOW
            } else {
                AccessResult::DENY
            }
        }
    }
}

/// Whether an item binds `name` at top level.
#[must_use]
pub fn item_binds_name(item: &Item, name: Identifier) -> bool {
    match item {
        Item::Using(decl) => using_clause_binds(decl, name),
        Item::Static(decl) => pat_names(&decl.binding.pat).contains(&name),
        Item::Procedure(decl) => decl.name == name,
        Item::Record(decl) => decl.name == name,
        Item::Enum(decl) => decl.name == name,
        Item::Modal(decl) => decl.name == name,
        Item::Class(decl) => decl.name == name,
        Item::TypeAlias(decl) => decl.name == name,
        Item::Error(_) => false,
    }
}

fn using_clause_binds(decl: &c0_syntax::UsingDecl, name: Identifier) -> bool {
    use c0_syntax::UsingClause;
    match &decl.clause {
        UsingClause::Path { path, alias } => match alias {
            Some(alias) => *alias == name,
            None => path.last() == Some(&name),
        },
        UsingClause::Wildcard { .. } => true,
        UsingClause::List { specs, .. } => specs.iter().any(|spec| match spec.alias {
            Some(alias) => alias == name,
            None => spec.name == name,
        }),
    }
}

/// Find the declaring item for `name` in a module. A non-using item wins
/// over a using clause that would also bind the name.
#[must_use]
pub fn find_decl_by_name<'a>(
    ctx: &'a ScopeContext,
    module_path: &[Identifier],
    name: Identifier,
) -> Option<&'a Item> {
    let module = ctx.sigma.module_by_path(module_path)?;
    let mut using_fallback = None;
    for item in &module.items {
        if !item_binds_name(item, name) {
            continue;
        }
        if matches!(item, Item::Using(_)) {
            if using_fallback.is_none() {
                using_fallback = Some(item);
            }
            continue;
        }
        return Some(item);
    }
    using_fallback
}

/// Check whether the context's module may access `module_path::name`.
/// Unknown declarations are allowed; resolution reports those separately.
#[must_use]
pub fn can_access(ctx: &ScopeContext, module_path: &[Identifier], name: Identifier) -> AccessResult {
    let Some(item) = find_decl_by_name(ctx, module_path, name) else {
        return AccessResult::ALLOW;
    };
    let Some(vis) = item_visibility(item) else {
        return AccessResult::ALLOW;
    };
    can_access_vis(&ctx.current_module, module_path, vis)
}

/// `protected` may not qualify a top-level item.
#[must_use]
pub fn top_level_vis(item: &Item) -> AccessResult {
    match item_visibility(item) {
        Some(Visibility::Protected) => AccessResult {
            ok: false,
            diag_id: Some("Protected-TopLevel-Err"),
        },
        _ => AccessResult::ALLOW,
    }
}

fn emit_code(diags: &mut DiagnosticStream, code: &str, span: Option<Span>) {
    if let Some(diag) = make_diagnostic(code, span) {
        diags.push(diag);
    }
}

fn check_expr_opt(ctx: &ScopeContext, expr: Option<&ExprPtr>, diags: &mut DiagnosticStream) {
    if let Some(expr) = expr {
        check_expr(ctx, expr, diags);
    }
}

fn check_block(ctx: &ScopeContext, block: &Block, diags: &mut DiagnosticStream) {
    for stmt in &block.stmts {
        check_stmt(ctx, stmt, diags);
    }
    check_expr_opt(ctx, block.tail.as_ref(), diags);
}

fn check_stmt(ctx: &ScopeContext, stmt: &Stmt, diags: &mut DiagnosticStream) {
    match stmt {
        Stmt::Let { init, .. }
        | Stmt::Var { init, .. }
        | Stmt::ShadowLet { init, .. }
        | Stmt::ShadowVar { init, .. } => check_expr(ctx, init, diags),
        Stmt::Assign { place, value, .. } | Stmt::CompoundAssign { place, value, .. } => {
            check_expr(ctx, place, diags);
            check_expr(ctx, value, diags);
        }
        Stmt::Expr { value, .. } | Stmt::Result { value, .. } => check_expr(ctx, value, diags),
        Stmt::Defer { body, .. } | Stmt::Frame { body, .. } | Stmt::Unsafe { body, .. } => {
            check_block(ctx, body, diags);
        }
        Stmt::Region { opts, body, .. } => {
            check_expr_opt(ctx, opts.as_ref(), diags);
            check_block(ctx, body, diags);
        }
        Stmt::Return { value, .. } | Stmt::Break { value, .. } => {
            check_expr_opt(ctx, value.as_ref(), diags);
        }
        Stmt::Continue { .. } => {}
    }
}

fn check_expr(ctx: &ScopeContext, expr: &Expr, diags: &mut DiagnosticStream) {
    match &expr.node {
        ExprNode::QualifiedName { path, name } => {
            let access = can_access(ctx, path, *name);
            if !access.ok {
                emit_code(diags, "E-MOD-1207", Some(expr.span));
            }
        }
        ExprNode::QualifiedApply { path, name, args } => {
            let access = can_access(ctx, path, *name);
            if !access.ok {
                emit_code(diags, "E-MOD-1207", Some(expr.span));
            }
            match args {
                ApplyArgs::Paren(args) => {
                    for arg in args {
                        check_expr(ctx, &arg.value, diags);
                    }
                }
                ApplyArgs::Record(fields) => {
                    for field in fields {
                        check_expr(ctx, &field.value, diags);
                    }
                }
            }
        }
        ExprNode::Call { callee, args } => {
            check_expr(ctx, callee, diags);
            for arg in args {
                check_expr(ctx, &arg.value, diags);
            }
        }
        ExprNode::MethodCall { base, args, .. } => {
            check_expr(ctx, base, diags);
            for arg in args {
                check_expr(ctx, &arg.value, diags);
            }
        }
        ExprNode::RecordExpr { fields, .. } => {
            for field in fields {
                check_expr(ctx, &field.value, diags);
            }
        }
        ExprNode::EnumLiteral { payload, .. } => match payload {
            Some(c0_syntax::EnumPayload::Paren(elems)) => {
                for elem in elems {
                    check_expr(ctx, elem, diags);
                }
            }
            Some(c0_syntax::EnumPayload::Record(fields)) => {
                for field in fields {
                    check_expr(ctx, &field.value, diags);
                }
            }
            None => {}
        },
        ExprNode::Field { base, .. } => check_expr(ctx, base, diags),
        ExprNode::Index { base, index } => {
            check_expr(ctx, base, diags);
            check_expr(ctx, index, diags);
        }
        ExprNode::Tuple(elems) | ExprNode::ArrayLit(elems) => {
            for elem in elems {
                check_expr(ctx, elem, diags);
            }
        }
        ExprNode::ArrayRepeat { value, len } => {
            check_expr(ctx, value, diags);
            check_expr(ctx, len, diags);
        }
        ExprNode::Unary { operand, .. } => check_expr(ctx, operand, diags),
        ExprNode::Binary { lhs, rhs, .. } => {
            check_expr(ctx, lhs, diags);
            check_expr(ctx, rhs, diags);
        }
        ExprNode::Cast { value, .. } => check_expr(ctx, value, diags),
        ExprNode::Range { lo, hi, .. } => {
            check_expr_opt(ctx, lo.as_ref(), diags);
            check_expr_opt(ctx, hi.as_ref(), diags);
        }
        ExprNode::If {
            cond,
            then_block,
            else_arm,
        } => {
            check_expr(ctx, cond, diags);
            check_block(ctx, then_block, diags);
            match else_arm {
                Some(c0_syntax::ElseArm::Block(block)) => check_block(ctx, block, diags),
                Some(c0_syntax::ElseArm::If(expr)) => check_expr(ctx, expr, diags),
                None => {}
            }
        }
        ExprNode::Match { scrutinee, arms } => {
            check_expr(ctx, scrutinee, diags);
            for arm in arms {
                check_expr_opt(ctx, arm.guard.as_ref(), diags);
                check_expr(ctx, &arm.body, diags);
            }
        }
        ExprNode::Loop { body } => check_block(ctx, body, diags),
        ExprNode::While { cond, body } => {
            check_expr(ctx, cond, diags);
            check_block(ctx, body, diags);
        }
        ExprNode::For { iter, body, .. } => {
            check_expr(ctx, iter, diags);
            check_block(ctx, body, diags);
        }
        ExprNode::Block(block) => check_block(ctx, block, diags),
        ExprNode::Alloc { value, .. } => check_expr(ctx, value, diags),
        ExprNode::RegionExpr { opts, body, .. } => {
            check_expr_opt(ctx, opts.as_ref(), diags);
            check_block(ctx, body, diags);
        }
        ExprNode::Literal(_)
        | ExprNode::Ident(_)
        | ExprNode::PathExpr { .. }
        | ExprNode::Error => {}
    }
}

fn check_item(ctx: &ScopeContext, item: &Item, diags: &mut DiagnosticStream) {
    match item {
        Item::Static(decl) => check_expr(ctx, &decl.binding.init, diags),
        Item::Procedure(decl) => {
            if let Some(body) = &decl.body {
                check_block(ctx, body, diags);
            }
        }
        Item::Record(decl) => {
            for member in &decl.members {
                match member {
                    c0_syntax::RecordMember::Field(field) => {
                        check_expr_opt(ctx, field.init.as_ref(), diags);
                    }
                    c0_syntax::RecordMember::Method(method) => {
                        if let Some(body) = &method.body {
                            check_block(ctx, body, diags);
                        }
                    }
                }
            }
        }
        Item::Modal(decl) => {
            for state in &decl.states {
                for member in &state.members {
                    match member {
                        c0_syntax::StateMember::Method(method) => {
                            if let Some(body) = &method.body {
                                check_block(ctx, body, diags);
                            }
                        }
                        c0_syntax::StateMember::Transition(transition) => {
                            if let Some(body) = &transition.body {
                                check_block(ctx, body, diags);
                            }
                        }
                        c0_syntax::StateMember::Field(_) => {}
                    }
                }
            }
        }
        Item::Class(decl) => {
            for class_item in &decl.items {
                if let c0_syntax::ClassItem::Method(method) = class_item {
                    if let Some(body) = &method.body {
                        check_block(ctx, body, diags);
                    }
                }
            }
        }
        Item::Using(_) | Item::Enum(_) | Item::TypeAlias(_) | Item::Error(_) => {}
    }
}

/// Walk a module, reporting protected-at-top-level and inaccessible
/// qualified uses.
#[must_use]
pub fn check_module_visibility(ctx: &ScopeContext, module: &AstModule) -> DiagnosticStream {
    let mut diags = DiagnosticStream::new();
    for item in &module.items {
        let vis = top_level_vis(item);
        if !vis.ok && vis.diag_id == Some("Protected-TopLevel-Err") {
            emit_code(&mut diags, "E-MOD-2440", Some(item_span(item)));
        }
        check_item(ctx, item, &mut diags);
    }
    diags
}

/// Convenience used by collection: whether `module_path` is one of the
/// project's modules.
#[must_use]
pub fn has_module(ctx: &ScopeContext, module_path: &ModulePath) -> bool {
    ctx.sigma.has_module(module_path)
}
