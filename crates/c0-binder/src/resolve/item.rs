//! Item resolution.
//!
//! Procedure, method, and transition bodies re-enter fresh lexical scopes
//! with their parameters introduced; signatures and field types resolve in
//! the module scope.

use std::rc::Rc;

use c0_syntax::{
    Binding, ClassDecl, ClassItem, ClassMethodDecl, EnumDecl, EnumVariant, FieldDecl, Item,
    MethodDecl, ModalDecl, Param, ProcedureDecl, RecordDecl, RecordMember, StateBlock,
    StateFieldDecl, StateMember, StateMethodDecl, StaticDecl, TransitionDecl, TypeAliasDecl,
    VariantPayload,
};

use crate::qual::ResolveErr;
use crate::scopes::{Entity, EntityKind, EntitySource};

use super::expr::{resolve_block, resolve_expr, resolve_expr_opt};
use super::pat::resolve_pattern;
use super::types::resolve_type;
use super::{ResolveContext, with_scope};

/// Run `f` with a declaration's generic parameters in scope as types.
fn with_generics<T>(
    ctx: &mut ResolveContext,
    generics: &[c0_syntax::TypeParam],
    f: impl FnOnce(&mut ResolveContext) -> Result<T, ResolveErr>,
) -> Result<T, ResolveErr> {
    with_scope(ctx, |ctx| {
        for generic in generics {
            let result = crate::intro::intro(
                &mut ctx.scope,
                generic.name,
                Entity {
                    kind: EntityKind::Type,
                    origin: None,
                    target: None,
                    source: EntitySource::Decl,
                },
            );
            if !result.ok {
                return Err(ResolveErr {
                    diag_id: result.diag_id.unwrap_or("BindPattern-Dup"),
                    span: Some(generic.span),
                });
            }
        }
        f(ctx)
    })
}

fn resolve_params(ctx: &mut ResolveContext, params: &[Param]) -> Result<Vec<Param>, ResolveErr> {
    let mut out = Vec::with_capacity(params.len());
    for param in params {
        let ty = resolve_type(ctx, &param.ty)?;
        let result = crate::intro::intro(
            &mut ctx.scope,
            param.name,
            Entity {
                kind: EntityKind::Value,
                origin: None,
                target: None,
                source: EntitySource::Decl,
            },
        );
        if !result.ok {
            return Err(ResolveErr {
                diag_id: result.diag_id.unwrap_or("BindPattern-Dup"),
                span: Some(param.span),
            });
        }
        out.push(Param {
            name: param.name,
            mode: param.mode,
            ty,
            span: param.span,
        });
    }
    Ok(out)
}

fn resolve_binding(ctx: &mut ResolveContext, binding: &Binding) -> Result<Binding, ResolveErr> {
    let init = resolve_expr(ctx, &binding.init)?;
    let ty = binding.ty.as_ref().map(|t| resolve_type(ctx, t)).transpose()?;
    let pat = resolve_pattern(ctx, &binding.pat)?;
    Ok(Binding { pat, ty, init })
}

fn resolve_procedure(
    ctx: &mut ResolveContext,
    decl: &ProcedureDecl,
) -> Result<ProcedureDecl, ResolveErr> {
    with_scope(ctx, |ctx| {
        let params = resolve_params(ctx, &decl.params)?;
        let ret = decl.ret.as_ref().map(|t| resolve_type(ctx, t)).transpose()?;
        let body = decl
            .body
            .as_ref()
            .map(|body| resolve_block(ctx, body))
            .transpose()?;
        Ok(ProcedureDecl {
            vis: decl.vis,
            name: decl.name,
            params,
            ret,
            body,
            span: decl.span,
        })
    })
}

fn resolve_field(ctx: &mut ResolveContext, field: &FieldDecl) -> Result<FieldDecl, ResolveErr> {
    Ok(FieldDecl {
        vis: field.vis,
        name: field.name,
        ty: resolve_type(ctx, &field.ty)?,
        init: resolve_expr_opt(ctx, field.init.as_ref())?,
        span: field.span,
    })
}

fn resolve_method(ctx: &mut ResolveContext, method: &MethodDecl) -> Result<MethodDecl, ResolveErr> {
    with_scope(ctx, |ctx| {
        let params = resolve_params(ctx, &method.params)?;
        let ret = method
            .ret
            .as_ref()
            .map(|t| resolve_type(ctx, t))
            .transpose()?;
        let body = method
            .body
            .as_ref()
            .map(|body| resolve_block(ctx, body))
            .transpose()?;
        Ok(MethodDecl {
            vis: method.vis,
            name: method.name,
            receiver: method.receiver.clone(),
            params,
            ret,
            body,
            span: method.span,
        })
    })
}

fn resolve_record(ctx: &mut ResolveContext, decl: &RecordDecl) -> Result<RecordDecl, ResolveErr> {
    let members = with_generics(ctx, &decl.generics, |ctx| {
        decl.members
            .iter()
            .map(|member| match member {
                RecordMember::Field(field) => Ok(RecordMember::Field(resolve_field(ctx, field)?)),
                RecordMember::Method(method) => {
                    Ok(RecordMember::Method(resolve_method(ctx, method)?))
                }
            })
            .collect::<Result<Vec<_>, ResolveErr>>()
    })?;
    Ok(RecordDecl {
        vis: decl.vis,
        name: decl.name,
        generics: decl.generics.clone(),
        implements: decl.implements.clone(),
        members,
        span: decl.span,
    })
}

fn resolve_variant(ctx: &mut ResolveContext, variant: &EnumVariant) -> Result<EnumVariant, ResolveErr> {
    let payload = match &variant.payload {
        None => None,
        Some(VariantPayload::Tuple(types)) => Some(VariantPayload::Tuple(
            types
                .iter()
                .map(|ty| resolve_type(ctx, ty))
                .collect::<Result<Vec<_>, _>>()?,
        )),
        Some(VariantPayload::Record(fields)) => Some(VariantPayload::Record(
            fields
                .iter()
                .map(|field| resolve_field(ctx, field))
                .collect::<Result<Vec<_>, _>>()?,
        )),
    };
    Ok(EnumVariant {
        name: variant.name,
        payload,
        span: variant.span,
    })
}

fn resolve_state_method(
    ctx: &mut ResolveContext,
    method: &StateMethodDecl,
) -> Result<StateMethodDecl, ResolveErr> {
    with_scope(ctx, |ctx| {
        let params = resolve_params(ctx, &method.params)?;
        let ret = method
            .ret
            .as_ref()
            .map(|t| resolve_type(ctx, t))
            .transpose()?;
        let body = method
            .body
            .as_ref()
            .map(|body| resolve_block(ctx, body))
            .transpose()?;
        Ok(StateMethodDecl {
            vis: method.vis,
            name: method.name,
            receiver_perm: method.receiver_perm,
            params,
            ret,
            body,
            span: method.span,
        })
    })
}

fn resolve_transition(
    ctx: &mut ResolveContext,
    transition: &TransitionDecl,
) -> Result<TransitionDecl, ResolveErr> {
    with_scope(ctx, |ctx| {
        let params = resolve_params(ctx, &transition.params)?;
        let body = transition
            .body
            .as_ref()
            .map(|body| resolve_block(ctx, body))
            .transpose()?;
        Ok(TransitionDecl {
            vis: transition.vis,
            name: transition.name,
            params,
            target_state: transition.target_state,
            body,
            span: transition.span,
        })
    })
}

fn resolve_modal(ctx: &mut ResolveContext, decl: &ModalDecl) -> Result<ModalDecl, ResolveErr> {
    let states = with_generics(ctx, &decl.generics, |ctx| {
        decl.states
            .iter()
            .map(|state| {
                let members = state
                    .members
                    .iter()
                    .map(|member| match member {
                        StateMember::Field(field) => Ok(StateMember::Field(StateFieldDecl {
                            vis: field.vis,
                            name: field.name,
                            ty: resolve_type(ctx, &field.ty)?,
                            span: field.span,
                        })),
                        StateMember::Method(method) => {
                            Ok(StateMember::Method(resolve_state_method(ctx, method)?))
                        }
                        StateMember::Transition(transition) => {
                            Ok(StateMember::Transition(resolve_transition(ctx, transition)?))
                        }
                    })
                    .collect::<Result<Vec<_>, ResolveErr>>()?;
                Ok(StateBlock {
                    name: state.name,
                    members,
                    span: state.span,
                })
            })
            .collect::<Result<Vec<_>, ResolveErr>>()
    })?;
    Ok(ModalDecl {
        vis: decl.vis,
        name: decl.name,
        generics: decl.generics.clone(),
        implements: decl.implements.clone(),
        states,
        span: decl.span,
    })
}

fn resolve_class_method(
    ctx: &mut ResolveContext,
    method: &ClassMethodDecl,
) -> Result<ClassMethodDecl, ResolveErr> {
    with_scope(ctx, |ctx| {
        let params = resolve_params(ctx, &method.params)?;
        let ret = method
            .ret
            .as_ref()
            .map(|t| resolve_type(ctx, t))
            .transpose()?;
        let body = method
            .body
            .as_ref()
            .map(|body| resolve_block(ctx, body))
            .transpose()?;
        Ok(ClassMethodDecl {
            vis: method.vis,
            name: method.name,
            receiver: method.receiver.clone(),
            generics: method.generics.clone(),
            params,
            ret,
            body,
            static_dispatch_only: method.static_dispatch_only,
            span: method.span,
        })
    })
}

fn resolve_class(ctx: &mut ResolveContext, decl: &ClassDecl) -> Result<ClassDecl, ResolveErr> {
    let items = with_generics(ctx, &decl.generics, |ctx| {
        decl.items
            .iter()
            .map(|item| match item {
                ClassItem::Method(method) => with_generics(ctx, &method.generics, |ctx| {
                    Ok(ClassItem::Method(resolve_class_method(ctx, method)?))
                }),
                ClassItem::Field(field) => Ok(ClassItem::Field(c0_syntax::ClassFieldDecl {
                    name: field.name,
                    ty: resolve_type(ctx, &field.ty)?,
                    span: field.span,
                })),
                ClassItem::AssociatedType(assoc) => Ok(ClassItem::AssociatedType(assoc.clone())),
                ClassItem::AbstractState(state) => Ok(ClassItem::AbstractState(state.clone())),
            })
            .collect::<Result<Vec<_>, ResolveErr>>()
    })?;
    Ok(ClassDecl {
        vis: decl.vis,
        name: decl.name,
        generics: decl.generics.clone(),
        supers: decl.supers.clone(),
        items,
        span: decl.span,
    })
}

/// Resolve one top-level item.
pub fn resolve_item(ctx: &mut ResolveContext, item: &Item) -> Result<Item, ResolveErr> {
    match item {
        Item::Using(decl) => Ok(Item::Using(decl.clone())),
        Item::Error(err) => Ok(Item::Error(err.clone())),
        Item::Static(decl) => {
            // The names were already bound at collection time; only the
            // initializer, annotation, and pattern paths get rewritten.
            let binding = resolve_binding(ctx, &decl.binding)?;
            Ok(Item::Static(StaticDecl {
                vis: decl.vis,
                binding,
                span: decl.span,
            }))
        }
        Item::Procedure(decl) => Ok(Item::Procedure(resolve_procedure(ctx, decl)?)),
        Item::Record(decl) => Ok(Item::Record(resolve_record(ctx, decl)?)),
        Item::Enum(decl) => {
            let variants = with_generics(ctx, &decl.generics, |ctx| {
                decl.variants
                    .iter()
                    .map(|variant| resolve_variant(ctx, variant))
                    .collect::<Result<Vec<_>, _>>()
            })?;
            Ok(Item::Enum(EnumDecl {
                vis: decl.vis,
                name: decl.name,
                generics: decl.generics.clone(),
                implements: decl.implements.clone(),
                variants,
                span: decl.span,
            }))
        }
        Item::Modal(decl) => Ok(Item::Modal(resolve_modal(ctx, decl)?)),
        Item::Class(decl) => Ok(Item::Class(resolve_class(ctx, decl)?)),
        Item::TypeAlias(decl) => {
            let ty = with_generics(ctx, &decl.generics, |ctx| resolve_type(ctx, &decl.ty))?;
            Ok(Item::TypeAlias(TypeAliasDecl {
                vis: decl.vis,
                name: decl.name,
                generics: decl.generics.clone(),
                ty,
                span: decl.span,
            }))
        }
    }
}
