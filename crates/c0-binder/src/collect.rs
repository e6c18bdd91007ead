//! Top-level name collection.
//!
//! Each module's `NameMap` is derived from its items' bindings. Using
//! clauses may re-export names that other modules' using clauses then
//! import, so the maps are computed to a fixed point: starting from the
//! directly-declared names, every round re-collects every module against
//! the previous round's table until nothing changes. Termination holds
//! because maps only grow within the union of all declared names.

use c0_common::{Span, TraceSink, make_diagnostic};
use c0_common::DiagnosticStream;
use c0_syntax::{
    Identifier, Item, ModulePath, PathKey, UsingClause, UsingDecl, UsingSpec, Visibility,
    item_span, item_visibility, pat_names, path_key,
};
use tracing::debug;

use crate::scopes::{Entity, EntityKind, EntitySource, NameMap, NameMapTable, ScopeContext};
use crate::visibility::{can_access, find_decl_by_name};

/// One name an item binds.
#[derive(Clone, Debug)]
pub struct BoundName {
    pub name: Identifier,
    pub ent: Entity,
    pub span: Span,
}

/// Result of computing an item's bindings.
#[derive(Clone, Debug, Default)]
pub struct BindingsResult {
    pub ok: bool,
    pub diag_id: Option<&'static str>,
    pub span: Option<Span>,
    pub bindings: Vec<BoundName>,
}

impl BindingsResult {
    fn ok(bindings: Vec<BoundName>) -> Self {
        BindingsResult {
            ok: true,
            diag_id: None,
            span: None,
            bindings,
        }
    }

    fn err(diag_id: &'static str, span: Option<Span>) -> Self {
        BindingsResult {
            ok: false,
            diag_id: Some(diag_id),
            span,
            bindings: Vec::new(),
        }
    }
}

/// Result of collecting one module's names.
#[derive(Clone, Debug, Default)]
pub struct CollectNamesResult {
    pub ok: bool,
    pub diag_id: Option<&'static str>,
    pub span: Option<Span>,
    pub names: NameMap,
}

/// Classification of a using path.
#[derive(Clone, Debug, Default)]
pub struct ResolveUsingPathResult {
    pub ok: bool,
    pub diag_id: Option<&'static str>,
    pub module_path: ModulePath,
    pub item: Option<Identifier>,
    pub is_module: bool,
}

/// Item lookup through a full path.
#[derive(Clone, Debug, Default)]
pub struct ItemOfPathResult {
    pub ok: bool,
    pub module_path: ModulePath,
    pub name: Option<Identifier>,
}

/// Names bound by a using clause.
#[derive(Clone, Debug, Default)]
struct UsingNamesResult {
    ok: bool,
    diag_id: Option<&'static str>,
    span: Option<Span>,
    bindings: Vec<BoundName>,
}

/// Names of value/type/class entries in a module's name map.
fn item_names_of(name_maps: &NameMapTable, module_path: &[Identifier]) -> Vec<Identifier> {
    let Some(map) = name_maps.get(&path_key(module_path)) else {
        return Vec::new();
    };
    map.iter()
        .filter(|(_, ent)| {
            matches!(
                ent.kind,
                EntityKind::Value | EntityKind::Type | EntityKind::Class
            )
        })
        .map(|(&name, _)| name)
        .collect()
}

/// Look a full path up as `module::item`.
#[must_use]
pub fn item_of_path_in(
    ctx: &ScopeContext,
    name_maps: &NameMapTable,
    path: &[Identifier],
) -> ItemOfPathResult {
    let Some((module_path, name)) = c0_syntax::split_last(path) else {
        return ItemOfPathResult::default();
    };
    if !ctx.sigma.has_module(&module_path) {
        return ItemOfPathResult::default();
    }
    if !item_names_of(name_maps, &module_path).contains(&name) {
        return ItemOfPathResult::default();
    }
    ItemOfPathResult {
        ok: true,
        module_path,
        name: Some(name),
    }
}

/// Classify a using path as an item or a module. Both is ambiguous;
/// neither is unresolved.
#[must_use]
pub fn resolve_using_path(
    ctx: &ScopeContext,
    name_maps: &NameMapTable,
    path: &[Identifier],
) -> ResolveUsingPathResult {
    let item = item_of_path_in(ctx, name_maps, path);
    let is_module = ctx.sigma.has_module(path);

    if item.ok && !is_module {
        ctx.trace.rule("Resolve-Using-Item");
        return ResolveUsingPathResult {
            ok: true,
            diag_id: None,
            module_path: item.module_path,
            item: item.name,
            is_module,
        };
    }
    if is_module && !item.ok {
        ctx.trace.rule("Resolve-Using-Module");
        return ResolveUsingPathResult {
            ok: true,
            diag_id: None,
            module_path: ModulePath::from_slice(path),
            item: None,
            is_module,
        };
    }
    if is_module && item.ok {
        ctx.trace.rule("Resolve-Using-Ambig");
        return ResolveUsingPathResult {
            ok: false,
            diag_id: Some("Resolve-Using-Ambig"),
            module_path: ModulePath::new(),
            item: None,
            is_module,
        };
    }
    ctx.trace.rule("Resolve-Using-None");
    ResolveUsingPathResult {
        ok: false,
        diag_id: Some("Resolve-Using-None"),
        module_path: ModulePath::new(),
        item: None,
        is_module,
    }
}

fn importable_kind(kind: EntityKind) -> bool {
    matches!(
        kind,
        EntityKind::Value | EntityKind::Type | EntityKind::Class
    )
}

/// Whether the referenced declaration is public at its origin.
fn referent_is_public(ctx: &ScopeContext, module_path: &[Identifier], name: Identifier) -> bool {
    find_decl_by_name(ctx, module_path, name)
        .and_then(item_visibility)
        .is_some_and(|vis| vis == Visibility::Public)
}

fn distinct_spec_names(specs: &[UsingSpec]) -> bool {
    let mut names: Vec<Identifier> = specs.iter().map(|spec| spec.name).collect();
    names.sort_unstable();
    names.windows(2).all(|pair| pair[0] != pair[1])
}

fn using_names(
    ctx: &ScopeContext,
    name_maps: &NameMapTable,
    decl: &UsingDecl,
) -> UsingNamesResult {
    let err = |diag_id| UsingNamesResult {
        ok: false,
        diag_id: Some(diag_id),
        span: Some(decl.span),
        bindings: Vec::new(),
    };

    match &decl.clause {
        UsingClause::Path { path, alias } => {
            let resolved = resolve_using_path(ctx, name_maps, path);
            if !resolved.ok {
                return UsingNamesResult {
                    ok: false,
                    diag_id: resolved.diag_id,
                    span: Some(decl.span),
                    bindings: Vec::new(),
                };
            }
            if let Some(item) = resolved.item {
                let Some(map) = name_maps.get(&path_key(&resolved.module_path)) else {
                    return err("Resolve-Using-None");
                };
                let Some(ent) = map.get(&item) else {
                    return err("Resolve-Using-None");
                };
                if !importable_kind(ent.kind) {
                    return err("Resolve-Using-None");
                }
                if decl.vis == Visibility::Public
                    && !referent_is_public(ctx, &resolved.module_path, item)
                {
                    ctx.trace.rule("Using-Path-Item-Public-Err");
                    return err("Using-Path-Item-Public-Err");
                }
                let access = can_access(ctx, &resolved.module_path, item);
                if !access.ok {
                    return err(access.diag_id.unwrap_or("Access-Err"));
                }
                ctx.trace.rule("Using-Path-Item");
                let bind_name = alias.unwrap_or(item);
                return UsingNamesResult {
                    ok: true,
                    diag_id: None,
                    span: None,
                    bindings: vec![BoundName {
                        name: bind_name,
                        ent: Entity::using(ent.kind, resolved.module_path, item),
                        span: decl.span,
                    }],
                };
            }
            ctx.trace.rule("Using-Path-Module");
            let Some(&tail) = resolved.module_path.last() else {
                return err("Resolve-Using-None");
            };
            let bind_name = alias.unwrap_or(tail);
            UsingNamesResult {
                ok: true,
                diag_id: None,
                span: None,
                bindings: vec![BoundName {
                    name: bind_name,
                    ent: Entity::module_alias(resolved.module_path),
                    span: decl.span,
                }],
            }
        }
        UsingClause::Wildcard { module } => {
            if !ctx.sigma.has_module(module) {
                return err("Resolve-Using-None");
            }
            let Some(map) = name_maps.get(&path_key(module)) else {
                return err("Resolve-Using-None");
            };
            let mut bindings = Vec::new();
            for (&name, ent) in map {
                if !importable_kind(ent.kind) {
                    continue;
                }
                if decl.vis == Visibility::Public && !referent_is_public(ctx, module, name) {
                    ctx.trace.rule("Using-List-Public-Err");
                    return err("Using-List-Public-Err");
                }
                let access = can_access(ctx, module, name);
                if !access.ok {
                    return err(access.diag_id.unwrap_or("Access-Err"));
                }
                bindings.push(BoundName {
                    name,
                    ent: Entity::using(ent.kind, module.clone(), name),
                    span: decl.span,
                });
            }
            ctx.trace.rule("Using-Wildcard");
            UsingNamesResult {
                ok: true,
                diag_id: None,
                span: None,
                bindings,
            }
        }
        UsingClause::List { module, specs } => {
            if !ctx.sigma.has_module(module) {
                return err("Resolve-Using-None");
            }
            if !distinct_spec_names(specs) {
                ctx.trace.rule("Using-List-Dup");
                return err("Using-List-Dup");
            }
            let Some(map) = name_maps.get(&path_key(module)) else {
                return err("Resolve-Using-None");
            };

            let self_id = ctx.interner.intern("self");
            let mut bindings = Vec::new();
            if let Some(self_spec) = specs.iter().find(|spec| spec.name == self_id) {
                let Some(&tail) = module.last() else {
                    return err("Resolve-Using-None");
                };
                let bind_name = self_spec.alias.unwrap_or(tail);
                bindings.push(BoundName {
                    name: bind_name,
                    ent: Entity::module_alias(module.clone()),
                    span: decl.span,
                });
            }
            for spec in specs {
                if spec.name == self_id {
                    continue;
                }
                let Some(ent) = map.get(&spec.name) else {
                    return err("Resolve-Using-None");
                };
                if !importable_kind(ent.kind) {
                    return err("Resolve-Using-None");
                }
                if decl.vis == Visibility::Public && !referent_is_public(ctx, module, spec.name) {
                    ctx.trace.rule("Using-List-Public-Err");
                    return err("Using-List-Public-Err");
                }
                let access = can_access(ctx, module, spec.name);
                if !access.ok {
                    return err(access.diag_id.unwrap_or("Access-Err"));
                }
                let bind_name = spec.alias.unwrap_or(spec.name);
                bindings.push(BoundName {
                    name: bind_name,
                    ent: Entity::using(ent.kind, module.clone(), spec.name),
                    span: decl.span,
                });
            }
            ctx.trace.rule("Using-List");
            UsingNamesResult {
                ok: true,
                diag_id: None,
                span: None,
                bindings,
            }
        }
    }
}

/// The names one item binds in its module.
#[must_use]
pub fn item_bindings(
    ctx: &ScopeContext,
    name_maps: &NameMapTable,
    item: &Item,
    module_path: &ModulePath,
) -> BindingsResult {
    let decl_binding = |name, kind, span| {
        BindingsResult::ok(vec![BoundName {
            name,
            ent: Entity::decl(kind, module_path.clone()),
            span,
        }])
    };

    match item {
        Item::Using(decl) => {
            let names = using_names(ctx, name_maps, decl);
            if !names.ok {
                return BindingsResult {
                    ok: false,
                    diag_id: names.diag_id,
                    span: names.span,
                    bindings: Vec::new(),
                };
            }
            BindingsResult::ok(names.bindings)
        }
        Item::Procedure(decl) => decl_binding(decl.name, EntityKind::Value, decl.span),
        Item::Record(decl) => decl_binding(decl.name, EntityKind::Type, decl.span),
        Item::Enum(decl) => decl_binding(decl.name, EntityKind::Type, decl.span),
        Item::Modal(decl) => decl_binding(decl.name, EntityKind::Type, decl.span),
        Item::Class(decl) => decl_binding(decl.name, EntityKind::Class, decl.span),
        Item::TypeAlias(decl) => decl_binding(decl.name, EntityKind::Type, decl.span),
        Item::Static(decl) => {
            let bindings = pat_names(&decl.binding.pat)
                .into_iter()
                .map(|name| BoundName {
                    name,
                    ent: Entity::decl(EntityKind::Value, module_path.clone()),
                    span: decl.span,
                })
                .collect();
            BindingsResult::ok(bindings)
        }
        Item::Error(_) => BindingsResult::ok(Vec::new()),
    }
}

fn no_dup(bindings: &[BoundName]) -> bool {
    let mut names: Vec<Identifier> = bindings.iter().map(|b| b.name).collect();
    names.sort_unstable();
    names.windows(2).all(|pair| pair[0] != pair[1])
}

fn disjoint(bindings: &[BoundName], names: &NameMap) -> bool {
    bindings.iter().all(|b| !names.contains_key(&b.name))
}

/// Collect one module's name map against an external table.
#[must_use]
pub fn collect_names(
    ctx: &ScopeContext,
    name_maps: &NameMapTable,
    module: &c0_syntax::AstModule,
) -> CollectNamesResult {
    let mut names = NameMap::new();
    for item in &module.items {
        let bindings = item_bindings(ctx, name_maps, item, &module.path);
        if !bindings.ok {
            ctx.trace.rule("Collect-Err");
            return CollectNamesResult {
                ok: false,
                diag_id: bindings.diag_id,
                span: bindings.span,
                names: NameMap::new(),
            };
        }
        if !disjoint(&bindings.bindings, &names) || !no_dup(&bindings.bindings) {
            ctx.trace.rule("Collect-Dup");
            return CollectNamesResult {
                ok: false,
                diag_id: Some("Collect-Dup"),
                span: Some(item_span(item)),
                names: NameMap::new(),
            };
        }
        for binding in bindings.bindings {
            names.insert(binding.name, binding.ent);
        }
    }
    ctx.trace.rule("Collect-Ok");
    CollectNamesResult {
        ok: true,
        diag_id: None,
        span: None,
        names,
    }
}

/// Phase of the incremental name scan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NamesStateKind {
    Start,
    Scan,
    Done,
    Error,
}

/// Incremental per-item scan state, stepped by [`names_step`].
#[derive(Clone, Debug)]
pub struct NamesState<'m> {
    pub kind: NamesStateKind,
    pub module: &'m c0_syntax::AstModule,
    pub index: usize,
    pub names: NameMap,
    pub diag_id: Option<&'static str>,
}

/// Begin a scan over one module.
#[must_use]
pub fn names_start(module: &c0_syntax::AstModule) -> NamesState<'_> {
    NamesState {
        kind: NamesStateKind::Scan,
        module,
        index: 0,
        names: NameMap::new(),
        diag_id: None,
    }
}

/// Advance the scan by one item. Done and Error states are fixed points.
#[must_use]
pub fn names_step<'m>(
    ctx: &ScopeContext,
    name_maps: &NameMapTable,
    state: &NamesState<'m>,
) -> NamesState<'m> {
    match state.kind {
        NamesStateKind::Done | NamesStateKind::Error => return state.clone(),
        NamesStateKind::Start => return names_start(state.module),
        NamesStateKind::Scan => {}
    }
    let mut next = state.clone();
    let items = &state.module.items;
    if state.index >= items.len() {
        next.kind = NamesStateKind::Done;
        return next;
    }
    let item = &items[state.index];
    let bindings = item_bindings(ctx, name_maps, item, &state.module.path);
    if !bindings.ok {
        next.kind = NamesStateKind::Error;
        next.diag_id = bindings.diag_id;
        return next;
    }
    if !disjoint(&bindings.bindings, &state.names) || !no_dup(&bindings.bindings) {
        next.kind = NamesStateKind::Error;
        next.diag_id = Some("Names-Step-Dup");
        return next;
    }
    for binding in bindings.bindings {
        next.names.insert(binding.name, binding.ent);
    }
    next.index += 1;
    next
}

/// The names a module's non-using items declare, deduplicated and sorted.
#[must_use]
pub fn decl_names(ctx: &ScopeContext, module: &c0_syntax::AstModule) -> Vec<Identifier> {
    let mut names: Vec<Identifier> = Vec::new();
    for item in &module.items {
        if matches!(item, Item::Using(_)) {
            continue;
        }
        let bindings = item_bindings(ctx, &NameMapTable::new(), item, &module.path);
        if !bindings.ok {
            continue;
        }
        for binding in bindings.bindings {
            if !names.contains(&binding.name) {
                names.push(binding.name);
            }
        }
    }
    names.sort_unstable();
    names
}

/// Round-0 table: each module's directly-declared names.
fn decl_name_maps(ctx: &ScopeContext) -> NameMapTable {
    let mut maps = NameMapTable::new();
    for module in &ctx.sigma.mods {
        let mut names = NameMap::new();
        for item in &module.items {
            if matches!(item, Item::Using(_)) {
                continue;
            }
            let bindings = item_bindings(ctx, &NameMapTable::new(), item, &module.path);
            if bindings.ok {
                for binding in bindings.bindings {
                    // On duplicates the first declaration keeps the name.
                    names.entry(binding.name).or_insert(binding.ent);
                }
            }
        }
        maps.insert(path_key(&module.path), names);
    }
    maps
}

fn code_for_collect_diag(diag_id: &str) -> Option<&'static str> {
    match diag_id {
        "Resolve-Using-None" => Some("E-MOD-1204"),
        "Resolve-Using-Ambig" => Some("E-MOD-1208"),
        "Using-List-Dup" => Some("E-MOD-1206"),
        "Using-Path-Item-Public-Err" | "Using-List-Public-Err" => Some("E-MOD-1205"),
        "Collect-Dup" | "Names-Step-Dup" => Some("E-MOD-1302"),
        "Access-Err" => Some("E-MOD-1207"),
        _ => None,
    }
}

/// Result of the fixed-point build.
#[derive(Clone, Debug, Default)]
pub struct NameMapBuildResult {
    pub name_maps: NameMapTable,
    pub diags: DiagnosticStream,
}

/// Compute every module's name map to a fixed point, then report the last
/// round's failures.
#[must_use]
pub fn collect_name_maps(ctx: &mut ScopeContext) -> NameMapBuildResult {
    let mut result = NameMapBuildResult::default();
    let mut current = decl_name_maps(ctx);
    let mut last_results: Vec<(PathKey, CollectNamesResult)> = Vec::new();
    let modules = ctx.sigma.mods.clone();

    loop {
        let mut changed = false;
        last_results.clear();
        let mut next = current.clone();
        for module in &modules {
            ctx.current_module = module.path.clone();
            let collected = collect_names(ctx, &current, module);
            let key = path_key(&module.path);
            last_results.push((key.clone(), collected.clone()));
            if !collected.ok {
                continue;
            }
            if current.get(&key) != Some(&collected.names) {
                next.insert(key, collected.names);
                changed = true;
            }
        }
        current = next;
        if !changed {
            break;
        }
    }
    debug!(modules = modules.len(), "name maps stabilized");

    for (_, collected) in &last_results {
        if collected.ok {
            continue;
        }
        let Some(diag_id) = collected.diag_id else {
            continue;
        };
        if let Some(code) = code_for_collect_diag(diag_id) {
            if let Some(diag) = make_diagnostic(code, collected.span) {
                result.diags.push(diag);
            }
        }
    }

    result.name_maps = current;
    result
}

#[cfg(test)]
#[path = "tests/collect.rs"]
mod tests;
