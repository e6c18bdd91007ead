//! Pattern resolution and binding.
//!
//! Resolution is homomorphic. A record pattern whose path does not name a
//! record falls back to an enum-record pattern when `path`'s tail is a
//! record variant of the enum named by its prefix.

use c0_common::TraceSink;
use c0_syntax::pattern::{
    EnumPayloadPattern, FieldPattern, ModalFieldsPattern, Pattern, PatternNode,
};
use c0_syntax::{pat_names, split_last};

use crate::intro::intro;
use crate::qual::ResolveErr;
use crate::scopes::{Entity, EntityKind};

use super::types::{
    VariantShape, enum_has_variant, full_decl_path, is_record_path, resolve_type,
    resolve_type_path,
};
use super::ResolveContext;

fn resolve_field_patterns(
    ctx: &mut ResolveContext,
    fields: &[FieldPattern],
) -> Result<Vec<FieldPattern>, ResolveErr> {
    fields
        .iter()
        .map(|field| {
            Ok(FieldPattern {
                name: field.name,
                pattern: field
                    .pattern
                    .as_ref()
                    .map(|sub| resolve_pattern(ctx, sub).map(Box::new))
                    .transpose()?,
                span: field.span,
            })
        })
        .collect()
}

/// Resolve a pattern, rewriting nominal paths to canonical form.
pub fn resolve_pattern(ctx: &mut ResolveContext, pat: &Pattern) -> Result<Pattern, ResolveErr> {
    let span = pat.span;
    let node = match &pat.node {
        PatternNode::Wildcard | PatternNode::Literal(_) | PatternNode::Ident(_) => {
            return Ok(pat.clone());
        }
        PatternNode::Typed { name, ty } => PatternNode::Typed {
            name: *name,
            ty: resolve_type(ctx, ty)?,
        },
        PatternNode::Tuple(elems) => PatternNode::Tuple(
            elems
                .iter()
                .map(|elem| resolve_pattern(ctx, elem))
                .collect::<Result<Vec<_>, _>>()?,
        ),
        PatternNode::Record { path, fields } => {
            if let Ok(res) = resolve_type_path(ctx, path) {
                if is_record_path(ctx, &res) {
                    let canonical = full_decl_path(&res);
                    return Ok(Pattern::new(
                        PatternNode::Record {
                            path: canonical,
                            fields: resolve_field_patterns(ctx, fields)?,
                        },
                        span,
                    ));
                }
            }
            // Enum-record fallback: `E::V { … }` parsed as a record path.
            if let Some((prefix, variant)) = split_last(path) {
                if let Ok(res) = resolve_type_path(ctx, &prefix) {
                    if enum_has_variant(ctx, &res, variant, VariantShape::Record) {
                        ctx.scope.trace.rule("ResolvePat-Enum-Record-Fallback");
                        return Ok(Pattern::new(
                            PatternNode::Enum {
                                enum_path: full_decl_path(&res),
                                variant,
                                payload: Some(EnumPayloadPattern::Record(
                                    resolve_field_patterns(ctx, fields)?,
                                )),
                            },
                            span,
                        ));
                    }
                }
            }
            ctx.scope.trace.rule_at("Resolve-Item-Err", span);
            return Err(ResolveErr::at("Resolve-Item-Err", span));
        }
        PatternNode::Enum {
            enum_path,
            variant,
            payload,
        } => {
            let res = resolve_type_path(ctx, enum_path)
                .map_err(|err| ResolveErr {
                    diag_id: err.diag_id,
                    span: Some(span),
                })?;
            let payload = match payload {
                None => None,
                Some(EnumPayloadPattern::Tuple(elems)) => Some(EnumPayloadPattern::Tuple(
                    elems
                        .iter()
                        .map(|elem| resolve_pattern(ctx, elem))
                        .collect::<Result<Vec<_>, _>>()?,
                )),
                Some(EnumPayloadPattern::Record(fields)) => Some(EnumPayloadPattern::Record(
                    resolve_field_patterns(ctx, fields)?,
                )),
            };
            PatternNode::Enum {
                enum_path: full_decl_path(&res),
                variant: *variant,
                payload,
            }
        }
        PatternNode::Modal {
            path,
            state,
            fields,
        } => {
            let res = resolve_type_path(ctx, path).map_err(|err| ResolveErr {
                diag_id: err.diag_id,
                span: Some(span),
            })?;
            PatternNode::Modal {
                path: full_decl_path(&res),
                state: *state,
                fields: fields
                    .as_ref()
                    .map(|modal_fields| {
                        Ok(ModalFieldsPattern {
                            fields: resolve_field_patterns(ctx, &modal_fields.fields)?,
                        })
                    })
                    .transpose()?,
            }
        }
        PatternNode::Range { lo, hi } => PatternNode::Range {
            lo: Box::new(resolve_pattern(ctx, lo)?),
            hi: Box::new(resolve_pattern(ctx, hi)?),
        },
    };
    Ok(Pattern::new(node, span))
}

/// Introduce every name a pattern binds into the current scope.
pub fn bind_pattern(ctx: &mut ResolveContext, pat: &Pattern) -> Result<(), ResolveErr> {
    for name in pat_names(pat) {
        let result = intro(
            &mut ctx.scope,
            name,
            Entity {
                kind: EntityKind::Value,
                origin: None,
                target: None,
                source: crate::scopes::EntitySource::Decl,
            },
        );
        if !result.ok {
            return Err(ResolveErr {
                diag_id: result.diag_id.unwrap_or("BindPattern-Dup"),
                span: Some(pat.span),
            });
        }
    }
    Ok(())
}

/// Shadow-introduce every name a pattern binds; used by shadow let/var.
pub(crate) fn shadow_bind_pattern(
    ctx: &mut ResolveContext,
    pat: &Pattern,
) -> Result<(), ResolveErr> {
    for name in pat_names(pat) {
        let result = crate::intro::shadow_intro(
            &mut ctx.scope,
            name,
            Entity {
                kind: EntityKind::Value,
                origin: None,
                target: None,
                source: crate::scopes::EntitySource::Decl,
            },
        );
        if !result.ok {
            return Err(ResolveErr {
                diag_id: result.diag_id.unwrap_or("BindPattern-Dup"),
                span: Some(pat.span),
            });
        }
    }
    Ok(())
}
