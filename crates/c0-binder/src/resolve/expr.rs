//! Expression and statement resolution.
//!
//! Qualified names and applies are disambiguated value → record → enum →
//! builtin and rewritten to their canonical forms. Blocks, match arms,
//! loop bodies, defers, regions, and frames each open a lexical scope.

use std::rc::Rc;

use c0_common::TraceSink;
use c0_syntax::expr::{
    ApplyArgs, Arg, Block, ElseArm, EnumPayload, Expr, ExprNode, ExprPtr, FieldInit, MatchArm,
    Stmt,
};
use c0_syntax::{Identifier, ModulePath};

use crate::qual::{ResolveErr, resolve_qualified};
use crate::scopes::{Entity, EntityKind, EntitySource};

use super::pat::{bind_pattern, resolve_pattern};
use super::types::{
    VariantShape, enum_has_variant, full_decl_path, is_record_path, resolve_type,
    resolve_type_path,
};
use super::{ResolveContext, with_scope};

/// Value namespaces built into the language.
const BUILTIN_VALUE_NAMESPACES: &[&str] = &["string", "bytes", "Region"];

fn is_builtin_namespace(ctx: &ResolveContext, path: &[Identifier]) -> bool {
    if path.len() != 1 {
        return false;
    }
    let head = ctx.scope.interner.resolve(path[0]);
    BUILTIN_VALUE_NAMESPACES.contains(&&*head)
}

pub(crate) fn resolve_expr_opt(
    ctx: &mut ResolveContext,
    expr: Option<&ExprPtr>,
) -> Result<Option<ExprPtr>, ResolveErr> {
    expr.map(|e| resolve_expr(ctx, e)).transpose()
}

fn resolve_args(ctx: &mut ResolveContext, args: &[Arg]) -> Result<Vec<Arg>, ResolveErr> {
    args.iter()
        .map(|arg| {
            Ok(Arg {
                value: resolve_expr(ctx, &arg.value)?,
                span: arg.span,
            })
        })
        .collect()
}

fn resolve_field_inits(
    ctx: &mut ResolveContext,
    fields: &[FieldInit],
) -> Result<Vec<FieldInit>, ResolveErr> {
    fields
        .iter()
        .map(|field| {
            Ok(FieldInit {
                name: field.name,
                value: resolve_expr(ctx, &field.value)?,
                span: field.span,
            })
        })
        .collect()
}

fn resolve_enum_payload(
    ctx: &mut ResolveContext,
    payload: Option<&EnumPayload>,
) -> Result<Option<EnumPayload>, ResolveErr> {
    match payload {
        None => Ok(None),
        Some(EnumPayload::Paren(elems)) => {
            let elems = elems
                .iter()
                .map(|e| resolve_expr(ctx, e))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Some(EnumPayload::Paren(elems)))
        }
        Some(EnumPayload::Record(fields)) => {
            Ok(Some(EnumPayload::Record(resolve_field_inits(ctx, fields)?)))
        }
    }
}

/// Resolve `path` as the type path of an enum and check `name` is a
/// variant of the given shape. Returns the canonical enum path.
fn resolve_enum_variant(
    ctx: &mut ResolveContext,
    path: &[Identifier],
    variant: Identifier,
    shape: VariantShape,
) -> Option<c0_syntax::TypePath> {
    let res = resolve_type_path(ctx, path).ok()?;
    enum_has_variant(ctx, &res, variant, shape).then(|| full_decl_path(&res))
}

/// Try `path::name` as a value reference.
fn try_value(
    ctx: &mut ResolveContext,
    path: &[Identifier],
    name: Identifier,
) -> Option<(ModulePath, Identifier)> {
    let res = resolve_qualified(&ctx.scope, &ctx.name_maps, path, name, EntityKind::Value).ok()?;
    Some((res.module_path, res.name))
}

/// Disambiguate a bare qualified name: value, then builtin namespace,
/// then enum unit variant.
fn resolve_qualified_name(
    ctx: &mut ResolveContext,
    expr: &Expr,
    path: &[Identifier],
    name: Identifier,
) -> Result<ExprPtr, ResolveErr> {
    if let Some((module_path, value_name)) = try_value(ctx, path, name) {
        ctx.scope.trace.rule("ResolveExpr-Qualified");
        return Ok(Expr::new(
            ExprNode::PathExpr {
                path: module_path,
                name: value_name,
            },
            expr.span,
        ));
    }
    if is_builtin_namespace(ctx, path) {
        return Ok(Expr::new(
            ExprNode::PathExpr {
                path: ModulePath::from_slice(path),
                name,
            },
            expr.span,
        ));
    }
    if let Some(enum_path) = resolve_enum_variant(ctx, path, name, VariantShape::Unit) {
        ctx.scope.trace.rule("ResolveExpr-EnumLiteral");
        return Ok(Expr::new(
            ExprNode::EnumLiteral {
                enum_path,
                variant: name,
                payload: None,
            },
            expr.span,
        ));
    }
    ctx.scope.trace.rule_at("ResolveExpr-Qualified-Err", expr.span);
    Err(ResolveErr::at("ResolveExpr-Qualified-Err", expr.span))
}

/// Disambiguate `path::name(args)` / `path::name { fields }`.
fn resolve_qualified_apply(
    ctx: &mut ResolveContext,
    expr: &Expr,
    path: &[Identifier],
    name: Identifier,
    args: &ApplyArgs,
) -> Result<ExprPtr, ResolveErr> {
    match args {
        ApplyArgs::Paren(call_args) => {
            if let Some((module_path, value_name)) = try_value(ctx, path, name) {
                ctx.scope.trace.rule("ResolveExpr-Call");
                let callee = Expr::new(
                    ExprNode::PathExpr {
                        path: module_path,
                        name: value_name,
                    },
                    expr.span,
                );
                return Ok(Expr::new(
                    ExprNode::Call {
                        callee,
                        args: resolve_args(ctx, call_args)?,
                    },
                    expr.span,
                ));
            }
            if is_builtin_namespace(ctx, path) {
                let callee = Expr::new(
                    ExprNode::PathExpr {
                        path: ModulePath::from_slice(path),
                        name,
                    },
                    expr.span,
                );
                return Ok(Expr::new(
                    ExprNode::Call {
                        callee,
                        args: resolve_args(ctx, call_args)?,
                    },
                    expr.span,
                ));
            }
            if let Some(enum_path) = resolve_enum_variant(ctx, path, name, VariantShape::Tuple) {
                ctx.scope.trace.rule("ResolveExpr-EnumLiteral");
                let elems = call_args
                    .iter()
                    .map(|arg| resolve_expr(ctx, &arg.value))
                    .collect::<Result<Vec<_>, _>>()?;
                return Ok(Expr::new(
                    ExprNode::EnumLiteral {
                        enum_path,
                        variant: name,
                        payload: Some(EnumPayload::Paren(elems)),
                    },
                    expr.span,
                ));
            }
            ctx.scope.trace.rule_at("ResolveExpr-Qualified-Err", expr.span);
            Err(ResolveErr::at("ResolveExpr-Qualified-Err", expr.span))
        }
        ApplyArgs::Record(fields) => {
            // Record literal: the full `path::name` names a record type.
            let mut full: Vec<Identifier> = path.to_vec();
            full.push(name);
            if let Ok(res) = resolve_type_path(ctx, &full) {
                if is_record_path(ctx, &res) {
                    ctx.scope.trace.rule("ResolveExpr-RecordExpr");
                    return Ok(Expr::new(
                        ExprNode::RecordExpr {
                            path: full_decl_path(&res),
                            fields: resolve_field_inits(ctx, fields)?,
                        },
                        expr.span,
                    ));
                }
            }
            // Record-variant literal: `path` names the enum, `name` the
            // variant.
            if let Some(enum_path) = resolve_enum_variant(ctx, path, name, VariantShape::Record) {
                ctx.scope.trace.rule("ResolveExpr-EnumLiteral");
                return Ok(Expr::new(
                    ExprNode::EnumLiteral {
                        enum_path,
                        variant: name,
                        payload: Some(EnumPayload::Record(resolve_field_inits(ctx, fields)?)),
                    },
                    expr.span,
                ));
            }
            ctx.scope.trace.rule_at("ResolveExpr-Qualified-Err", expr.span);
            Err(ResolveErr::at("ResolveExpr-Qualified-Err", expr.span))
        }
    }
}

fn resolve_arm(ctx: &mut ResolveContext, arm: &MatchArm) -> Result<MatchArm, ResolveErr> {
    with_scope(ctx, |ctx| {
        let pat = resolve_pattern(ctx, &arm.pat)?;
        bind_pattern(ctx, &pat)?;
        let guard = resolve_expr_opt(ctx, arm.guard.as_ref())?;
        let body = resolve_expr(ctx, &arm.body)?;
        Ok(MatchArm {
            pat,
            guard,
            body,
            span: arm.span,
        })
    })
}

/// Resolve a block: new scope, statements in order, then the tail.
pub fn resolve_block(ctx: &mut ResolveContext, block: &Block) -> Result<Rc<Block>, ResolveErr> {
    with_scope(ctx, |ctx| {
        let mut stmts = Vec::with_capacity(block.stmts.len());
        for stmt in &block.stmts {
            stmts.push(resolve_stmt(ctx, stmt)?);
        }
        let tail = resolve_expr_opt(ctx, block.tail.as_ref())?;
        Ok(Rc::new(Block {
            stmts,
            tail,
            span: block.span,
        }))
    })
}

fn resolve_let_parts(
    ctx: &mut ResolveContext,
    pat: &c0_syntax::Pattern,
    ty: Option<&Rc<c0_syntax::Type>>,
    init: &ExprPtr,
) -> Result<(c0_syntax::Pattern, Option<Rc<c0_syntax::Type>>, ExprPtr), ResolveErr> {
    // Initializer first: it sees the scope before the new names exist.
    let init = resolve_expr(ctx, init)?;
    let ty = ty.map(|t| resolve_type(ctx, t)).transpose()?;
    let pat = resolve_pattern(ctx, pat)?;
    Ok((pat, ty, init))
}

fn resolve_stmt(ctx: &mut ResolveContext, stmt: &Stmt) -> Result<Stmt, ResolveErr> {
    match stmt {
        Stmt::Let { pat, ty, init, span } => {
            let (pat, ty, init) = resolve_let_parts(ctx, pat, ty.as_ref(), init)?;
            bind_pattern(ctx, &pat)?;
            Ok(Stmt::Let {
                pat,
                ty,
                init,
                span: *span,
            })
        }
        Stmt::Var { pat, ty, init, span } => {
            let (pat, ty, init) = resolve_let_parts(ctx, pat, ty.as_ref(), init)?;
            bind_pattern(ctx, &pat)?;
            Ok(Stmt::Var {
                pat,
                ty,
                init,
                span: *span,
            })
        }
        Stmt::ShadowLet { pat, ty, init, span } => {
            let (pat, ty, init) = resolve_let_parts(ctx, pat, ty.as_ref(), init)?;
            super::pat::shadow_bind_pattern(ctx, &pat)?;
            Ok(Stmt::ShadowLet {
                pat,
                ty,
                init,
                span: *span,
            })
        }
        Stmt::ShadowVar { pat, ty, init, span } => {
            let (pat, ty, init) = resolve_let_parts(ctx, pat, ty.as_ref(), init)?;
            super::pat::shadow_bind_pattern(ctx, &pat)?;
            Ok(Stmt::ShadowVar {
                pat,
                ty,
                init,
                span: *span,
            })
        }
        Stmt::Assign { place, value, span } => Ok(Stmt::Assign {
            place: resolve_expr(ctx, place)?,
            value: resolve_expr(ctx, value)?,
            span: *span,
        }),
        Stmt::CompoundAssign {
            op,
            place,
            value,
            span,
        } => Ok(Stmt::CompoundAssign {
            op: *op,
            place: resolve_expr(ctx, place)?,
            value: resolve_expr(ctx, value)?,
            span: *span,
        }),
        Stmt::Expr { value, span } => Ok(Stmt::Expr {
            value: resolve_expr(ctx, value)?,
            span: *span,
        }),
        Stmt::Defer { body, span } => Ok(Stmt::Defer {
            body: resolve_block(ctx, body)?,
            span: *span,
        }),
        Stmt::Region {
            alias,
            opts,
            body,
            span,
        } => {
            let opts = resolve_expr_opt(ctx, opts.as_ref())?;
            let body = with_scope(ctx, |ctx| {
                if let Some(alias) = alias {
                    let result = crate::intro::intro(
                        &mut ctx.scope,
                        *alias,
                        Entity::region_alias(),
                    );
                    if !result.ok {
                        return Err(ResolveErr {
                            diag_id: result.diag_id.unwrap_or("BindPattern-Dup"),
                            span: Some(*span),
                        });
                    }
                }
                resolve_block(ctx, body)
            })?;
            Ok(Stmt::Region {
                alias: *alias,
                opts,
                body,
                span: *span,
            })
        }
        Stmt::Frame { target, body, span } => {
            if let Some(target) = target {
                let is_region_alias = ctx
                    .scope
                    .lookup(*target)
                    .is_some_and(|ent| ent.source == EntitySource::RegionAlias);
                if !is_region_alias {
                    ctx.scope.trace.rule_at("Region-Alias-Unbound", *span);
                    return Err(ResolveErr::at("Region-Alias-Unbound", *span));
                }
            }
            Ok(Stmt::Frame {
                target: *target,
                body: resolve_block(ctx, body)?,
                span: *span,
            })
        }
        Stmt::Return { value, span } => Ok(Stmt::Return {
            value: resolve_expr_opt(ctx, value.as_ref())?,
            span: *span,
        }),
        Stmt::Result { value, span } => Ok(Stmt::Result {
            value: resolve_expr(ctx, value)?,
            span: *span,
        }),
        Stmt::Break { value, span } => Ok(Stmt::Break {
            value: resolve_expr_opt(ctx, value.as_ref())?,
            span: *span,
        }),
        Stmt::Continue { span } => Ok(Stmt::Continue { span: *span }),
        Stmt::Unsafe { body, span } => Ok(Stmt::Unsafe {
            body: resolve_block(ctx, body)?,
            span: *span,
        }),
    }
}

/// Resolve one expression, producing the canonical rewritten form.
pub fn resolve_expr(ctx: &mut ResolveContext, expr: &ExprPtr) -> Result<ExprPtr, ResolveErr> {
    let span = expr.span;
    match &expr.node {
        // Already-canonical and atomic forms pass through untouched.
        ExprNode::Literal(_) | ExprNode::PathExpr { .. } | ExprNode::Error => {
            Ok(Rc::clone(expr))
        }
        ExprNode::Ident(name) => {
            let entity = ctx.scope.lookup(*name);
            let is_value = entity.is_some_and(|ent| ent.kind == EntityKind::Value);
            if !is_value {
                ctx.scope.trace.rule_at("ResolveExpr-Ident-Err", span);
                return Err(ResolveErr::at("ResolveExpr-Ident-Err", span));
            }
            ctx.scope.trace.rule("ResolveExpr-Ident");
            Ok(Rc::clone(expr))
        }
        ExprNode::QualifiedName { path, name } => {
            resolve_qualified_name(ctx, expr, path, *name)
        }
        ExprNode::QualifiedApply { path, name, args } => {
            resolve_qualified_apply(ctx, expr, path, *name, args)
        }
        ExprNode::Call { callee, args } => Ok(Expr::new(
            ExprNode::Call {
                callee: resolve_expr(ctx, callee)?,
                args: resolve_args(ctx, args)?,
            },
            span,
        )),
        ExprNode::MethodCall { base, name, args } => Ok(Expr::new(
            ExprNode::MethodCall {
                base: resolve_expr(ctx, base)?,
                name: *name,
                args: resolve_args(ctx, args)?,
            },
            span,
        )),
        ExprNode::RecordExpr { path, fields } => Ok(Expr::new(
            ExprNode::RecordExpr {
                path: path.clone(),
                fields: resolve_field_inits(ctx, fields)?,
            },
            span,
        )),
        ExprNode::EnumLiteral {
            enum_path,
            variant,
            payload,
        } => Ok(Expr::new(
            ExprNode::EnumLiteral {
                enum_path: enum_path.clone(),
                variant: *variant,
                payload: resolve_enum_payload(ctx, payload.as_ref())?,
            },
            span,
        )),
        ExprNode::Field { base, name } => Ok(Expr::new(
            ExprNode::Field {
                base: resolve_expr(ctx, base)?,
                name: *name,
            },
            span,
        )),
        ExprNode::Index { base, index } => Ok(Expr::new(
            ExprNode::Index {
                base: resolve_expr(ctx, base)?,
                index: resolve_expr(ctx, index)?,
            },
            span,
        )),
        ExprNode::Tuple(elems) => {
            let elems = elems
                .iter()
                .map(|e| resolve_expr(ctx, e))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Expr::new(ExprNode::Tuple(elems), span))
        }
        ExprNode::ArrayLit(elems) => {
            let elems = elems
                .iter()
                .map(|e| resolve_expr(ctx, e))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Expr::new(ExprNode::ArrayLit(elems), span))
        }
        ExprNode::ArrayRepeat { value, len } => Ok(Expr::new(
            ExprNode::ArrayRepeat {
                value: resolve_expr(ctx, value)?,
                len: resolve_expr(ctx, len)?,
            },
            span,
        )),
        ExprNode::Unary { op, operand } => Ok(Expr::new(
            ExprNode::Unary {
                op: *op,
                operand: resolve_expr(ctx, operand)?,
            },
            span,
        )),
        ExprNode::Binary { op, lhs, rhs } => Ok(Expr::new(
            ExprNode::Binary {
                op: *op,
                lhs: resolve_expr(ctx, lhs)?,
                rhs: resolve_expr(ctx, rhs)?,
            },
            span,
        )),
        ExprNode::Cast { value, ty } => Ok(Expr::new(
            ExprNode::Cast {
                value: resolve_expr(ctx, value)?,
                ty: resolve_type(ctx, ty)?,
            },
            span,
        )),
        ExprNode::Range { lo, hi, inclusive } => Ok(Expr::new(
            ExprNode::Range {
                lo: resolve_expr_opt(ctx, lo.as_ref())?,
                hi: resolve_expr_opt(ctx, hi.as_ref())?,
                inclusive: *inclusive,
            },
            span,
        )),
        ExprNode::If {
            cond,
            then_block,
            else_arm,
        } => {
            let cond = resolve_expr(ctx, cond)?;
            let then_block = resolve_block(ctx, then_block)?;
            let else_arm = match else_arm {
                None => None,
                Some(ElseArm::Block(block)) => Some(ElseArm::Block(resolve_block(ctx, block)?)),
                Some(ElseArm::If(inner)) => Some(ElseArm::If(resolve_expr(ctx, inner)?)),
            };
            Ok(Expr::new(
                ExprNode::If {
                    cond,
                    then_block,
                    else_arm,
                },
                span,
            ))
        }
        ExprNode::Match { scrutinee, arms } => {
            let scrutinee = resolve_expr(ctx, scrutinee)?;
            let arms = arms
                .iter()
                .map(|arm| resolve_arm(ctx, arm))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Expr::new(ExprNode::Match { scrutinee, arms }, span))
        }
        ExprNode::Loop { body } => Ok(Expr::new(
            ExprNode::Loop {
                body: resolve_block(ctx, body)?,
            },
            span,
        )),
        ExprNode::While { cond, body } => Ok(Expr::new(
            ExprNode::While {
                cond: resolve_expr(ctx, cond)?,
                body: resolve_block(ctx, body)?,
            },
            span,
        )),
        ExprNode::For { pat, iter, body } => with_scope(ctx, |ctx| {
            let iter = resolve_expr(ctx, iter)?;
            let pat = resolve_pattern(ctx, pat)?;
            bind_pattern(ctx, &pat)?;
            let body = resolve_block(ctx, body)?;
            Ok(Expr::new(ExprNode::For { pat, iter, body }, span))
        }),
        ExprNode::Block(block) => Ok(Expr::new(
            ExprNode::Block(resolve_block(ctx, block)?),
            span,
        )),
        ExprNode::Alloc { region, value } => {
            if let Some(region) = region {
                let is_region_alias = ctx
                    .scope
                    .lookup(*region)
                    .is_some_and(|ent| ent.source == EntitySource::RegionAlias);
                if !is_region_alias {
                    ctx.scope.trace.rule_at("Region-Alias-Unbound", span);
                    return Err(ResolveErr::at("Region-Alias-Unbound", span));
                }
            }
            Ok(Expr::new(
                ExprNode::Alloc {
                    region: *region,
                    value: resolve_expr(ctx, value)?,
                },
                span,
            ))
        }
        ExprNode::RegionExpr { alias, opts, body } => {
            let opts = resolve_expr_opt(ctx, opts.as_ref())?;
            let body = with_scope(ctx, |ctx| {
                if let Some(alias) = alias {
                    let result =
                        crate::intro::intro(&mut ctx.scope, *alias, Entity::region_alias());
                    if !result.ok {
                        return Err(ResolveErr {
                            diag_id: result.diag_id.unwrap_or("BindPattern-Dup"),
                            span: Some(span),
                        });
                    }
                }
                resolve_block(ctx, body)
            })?;
            Ok(Expr::new(
                ExprNode::RegionExpr {
                    alias: *alias,
                    opts,
                    body,
                },
                span,
            ))
        }
    }
}
