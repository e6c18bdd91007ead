//! Syntactic type resolution.
//!
//! Homomorphic over compound types; only nominal heads, dynamic class
//! paths, modal-state references, and array lengths need real work.
//! Lowering to `TypeRef` is the solver's job.

use std::rc::Rc;

use c0_syntax::types::{FuncTypeParam, Type, TypeNode, TypePath};
use c0_syntax::{Identifier, split_last};

use crate::qual::{QualResolution, ResolveErr, resolve_qualified, resolve_scoped};
use crate::scopes::{EntityKind, TypeDecl};

use super::expr::resolve_expr;
use super::ResolveContext;

/// Resolve a type path (head identifier or qualified) to its declaring
/// module.
pub(crate) fn resolve_type_path(
    ctx: &ResolveContext,
    path: &[Identifier],
) -> Result<QualResolution, ResolveErr> {
    if path.len() == 1 {
        return resolve_scoped(&ctx.scope, &ctx.name_maps, path[0], EntityKind::Type)
            .ok_or(ResolveErr::new("Resolve-Item-Err"));
    }
    let Some((prefix, name)) = split_last(path) else {
        return Err(ResolveErr::new("Resolve-Item-Err"));
    };
    resolve_qualified(&ctx.scope, &ctx.name_maps, &prefix, name, EntityKind::Type)
}

/// Resolve a class path to its declaring module.
pub(crate) fn resolve_class_path(
    ctx: &ResolveContext,
    path: &[Identifier],
) -> Result<QualResolution, ResolveErr> {
    if path.len() == 1 {
        return resolve_scoped(&ctx.scope, &ctx.name_maps, path[0], EntityKind::Class)
            .ok_or(ResolveErr::new("Resolve-Item-Err"));
    }
    let Some((prefix, name)) = split_last(path) else {
        return Err(ResolveErr::new("Resolve-Item-Err"));
    };
    resolve_qualified(&ctx.scope, &ctx.name_maps, &prefix, name, EntityKind::Class)
}

/// Canonical declaring path: origin module plus declared name.
pub(crate) fn full_decl_path(res: &QualResolution) -> TypePath {
    let mut path: TypePath = res.module_path.iter().copied().collect();
    path.push(res.name);
    path
}

/// Whether a resolved type path names a record.
pub(crate) fn is_record_path(ctx: &ResolveContext, res: &QualResolution) -> bool {
    matches!(
        ctx.scope.sigma.type_decl(&full_decl_path(res)),
        Some(TypeDecl::Record(_))
    )
}

/// The shapes an enum-variant reference can take.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum VariantShape {
    Unit,
    Tuple,
    Record,
}

/// Whether a resolved type path names an enum with `variant` of the given
/// shape.
pub(crate) fn enum_has_variant(
    ctx: &ResolveContext,
    res: &QualResolution,
    variant: Identifier,
    shape: VariantShape,
) -> bool {
    let Some(TypeDecl::Enum(decl)) = ctx.scope.sigma.type_decl(&full_decl_path(res)) else {
        return false;
    };
    decl.variants.iter().any(|v| {
        v.name == variant
            && match (&v.payload, shape) {
                (None, VariantShape::Unit) => true,
                (Some(c0_syntax::VariantPayload::Tuple(_)), VariantShape::Tuple) => true,
                (Some(c0_syntax::VariantPayload::Record(_)), VariantShape::Record) => true,
                _ => false,
            }
    })
}

fn resolve_type_list(
    ctx: &mut ResolveContext,
    types: &[Rc<Type>],
) -> Result<Vec<Rc<Type>>, ResolveErr> {
    types.iter().map(|ty| resolve_type(ctx, ty)).collect()
}

/// Resolve a syntactic type, rewriting nominal heads to their canonical
/// declaring paths. Span-preserving.
pub fn resolve_type(ctx: &mut ResolveContext, ty: &Rc<Type>) -> Result<Rc<Type>, ResolveErr> {
    let node = match &ty.node {
        TypeNode::Prim(_) | TypeNode::String(_) | TypeNode::Bytes(_) | TypeNode::SelfType
        | TypeNode::Error => return Ok(Rc::clone(ty)),
        TypeNode::Path { path, generic_args } => {
            let res = resolve_type_path(ctx, path)?;
            TypeNode::Path {
                path: full_decl_path(&res),
                generic_args: resolve_type_list(ctx, generic_args)?,
            }
        }
        TypeNode::Perm { perm, base } => TypeNode::Perm {
            perm: *perm,
            base: resolve_type(ctx, base)?,
        },
        TypeNode::Tuple(elems) => TypeNode::Tuple(resolve_type_list(ctx, elems)?),
        TypeNode::Array { elem, len } => TypeNode::Array {
            elem: resolve_type(ctx, elem)?,
            len: resolve_expr(ctx, len)?,
        },
        TypeNode::Slice(elem) => TypeNode::Slice(resolve_type(ctx, elem)?),
        TypeNode::Union(members) => TypeNode::Union(resolve_type_list(ctx, members)?),
        TypeNode::Func { params, ret } => TypeNode::Func {
            params: params
                .iter()
                .map(|param| {
                    Ok(FuncTypeParam {
                        ty: resolve_type(ctx, &param.ty)?,
                        span: param.span,
                    })
                })
                .collect::<Result<Vec<_>, ResolveErr>>()?,
            ret: resolve_type(ctx, ret)?,
        },
        TypeNode::Ptr { elem, state } => TypeNode::Ptr {
            elem: resolve_type(ctx, elem)?,
            state: *state,
        },
        TypeNode::RawPtr { qual, elem } => TypeNode::RawPtr {
            qual: *qual,
            elem: resolve_type(ctx, elem)?,
        },
        TypeNode::Dynamic(class_path) => {
            let res = resolve_class_path(ctx, class_path)?;
            let mut path: TypePath = res.module_path.iter().copied().collect();
            path.push(res.name);
            TypeNode::Dynamic(path)
        }
        TypeNode::ModalState {
            path,
            state,
            generic_args,
        } => {
            let res = resolve_type_path(ctx, path)?;
            TypeNode::ModalState {
                path: full_decl_path(&res),
                state: *state,
                generic_args: resolve_type_list(ctx, generic_args)?,
            }
        }
        TypeNode::Refine { base, pred } => TypeNode::Refine {
            base: resolve_type(ctx, base)?,
            pred: resolve_expr(ctx, pred)?,
        },
    };
    Ok(Type::new(node, ty.span))
}
