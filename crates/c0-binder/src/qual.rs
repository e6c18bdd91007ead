//! Qualified-name resolution.
//!
//! `a::b` resolution strips module-alias prefixes and follows re-export
//! chains through the name maps to the declaring module. Accessibility
//! is a separate judgment; see the visibility walk.

use c0_common::Span;
use c0_syntax::{Identifier, ModulePath, path_key};

use crate::scopes::{Entity, EntityKind, EntitySource, NameMapTable, ScopeContext};

/// A resolution failure carrying the rule ID the orchestrator translates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolveErr {
    pub diag_id: &'static str,
    pub span: Option<Span>,
}

impl ResolveErr {
    #[must_use]
    pub fn new(diag_id: &'static str) -> Self {
        ResolveErr {
            diag_id,
            span: None,
        }
    }

    #[must_use]
    pub fn at(diag_id: &'static str, span: Span) -> Self {
        ResolveErr {
            diag_id,
            span: Some(span),
        }
    }
}

/// A fully resolved qualified name: the declaring module and the name
/// there.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QualResolution {
    pub module_path: ModulePath,
    pub name: Identifier,
    pub kind: EntityKind,
}

/// Expand a leading module alias. `alias::rest` becomes `origin::rest`
/// when `alias` is bound to a module alias in scope or in the current
/// module's name map. Chains expand until a real module path remains.
#[must_use]
pub fn alias_expand(
    ctx: &ScopeContext,
    name_maps: &NameMapTable,
    path: &[Identifier],
) -> ModulePath {
    let mut current = ModulePath::from_slice(path);
    // Alias chains are finite; the bound guards against accidental cycles.
    for _ in 0..16 {
        let Some(&head) = current.first() else {
            return current;
        };
        let alias_entity = ctx
            .lookup(head)
            .filter(|ent| ent.kind == EntityKind::ModuleAlias)
            .cloned()
            .or_else(|| {
                name_maps
                    .get(&path_key(&ctx.current_module))
                    .and_then(|map| map.get(&head))
                    .filter(|ent| ent.kind == EntityKind::ModuleAlias)
                    .cloned()
            });
        let Some(Entity {
            origin: Some(origin),
            ..
        }) = alias_entity
        else {
            return current;
        };
        let mut expanded = origin;
        expanded.extend(current.iter().skip(1).copied());
        if expanded == current {
            return current;
        }
        current = expanded;
    }
    current
}

/// Follow a using chain to the declaring module. Returns the final
/// `(module, name, kind)` triple.
fn follow_entity(
    ctx: &ScopeContext,
    name_maps: &NameMapTable,
    mut module_path: ModulePath,
    mut name: Identifier,
    mut ent: Entity,
) -> Result<QualResolution, ResolveErr> {
    // Re-export chains are finite for well-formed tables.
    for _ in 0..name_maps.len() + 1 {
        if ent.source != EntitySource::Using {
            return Ok(QualResolution {
                module_path,
                name,
                kind: ent.kind,
            });
        }
        let (Some(origin), Some(target)) = (ent.origin.clone(), ent.target) else {
            return Ok(QualResolution {
                module_path,
                name,
                kind: ent.kind,
            });
        };
        let next = name_maps
            .get(&path_key(&origin))
            .and_then(|map| map.get(&target))
            .cloned()
            .ok_or(ResolveErr::new("Resolve-Item-Err"))?;
        module_path = origin;
        name = target;
        ent = next;
    }
    Err(ResolveErr::new("Resolve-Item-Err"))
}

/// Resolve `path::name` to the declaring module, asserting the entity
/// kind. Resolution is purely name-based; accessibility is a separate
/// judgment reported by the visibility walk, so a private item still
/// resolves here.
pub fn resolve_qualified(
    ctx: &ScopeContext,
    name_maps: &NameMapTable,
    path: &[Identifier],
    name: Identifier,
    expected: EntityKind,
) -> Result<QualResolution, ResolveErr> {
    let module_path = alias_expand(ctx, name_maps, path);
    if !ctx.sigma.has_module(&module_path) {
        return Err(ResolveErr::new("Resolve-Item-Err"));
    }
    let ent = name_maps
        .get(&path_key(&module_path))
        .and_then(|map| map.get(&name))
        .cloned()
        .ok_or(ResolveErr::new("Resolve-Item-Err"))?;

    let resolved = follow_entity(ctx, name_maps, module_path, name, ent)?;
    if resolved.kind != expected {
        return Err(ResolveErr::new("Resolve-Item-Err"));
    }
    Ok(resolved)
}

/// Resolve a bare name through the scope stack to its declaring module,
/// following re-export chains. `None` when the name is unbound, locally
/// bound, or of the wrong kind.
#[must_use]
pub fn resolve_scoped(
    ctx: &ScopeContext,
    name_maps: &NameMapTable,
    name: Identifier,
    expected: EntityKind,
) -> Option<QualResolution> {
    let ent = ctx.lookup(name)?.clone();
    if ent.source == EntitySource::RegionAlias {
        return None;
    }
    // Universe builtins carry no origin; they resolve to the empty module.
    let Some(module_path) = ent.origin.clone() else {
        return (ent.kind == expected).then_some(QualResolution {
            module_path: ModulePath::new(),
            name,
            kind: ent.kind,
        });
    };
    let resolved = follow_entity(ctx, name_maps, module_path, name, ent).ok()?;
    (resolved.kind == expected).then_some(resolved)
}

/// Look a full path up as an item of a module, without kind expectations.
#[must_use]
pub fn item_of_path(
    ctx: &ScopeContext,
    name_maps: &NameMapTable,
    path: &[Identifier],
) -> Option<QualResolution> {
    let (module_path, name) = c0_syntax::split_last(path)?;
    let module_path = alias_expand(ctx, name_maps, &module_path);
    let ent = name_maps
        .get(&path_key(&module_path))
        .and_then(|map| map.get(&name))
        .cloned()?;
    follow_entity(ctx, name_maps, module_path, name, ent).ok()
}

#[cfg(test)]
#[path = "tests/qual.rs"]
mod tests;
