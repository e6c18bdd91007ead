//! Name introduction and explicit shadowing.
//!
//! `intro` binds in the current scope and refuses to shadow implicitly;
//! `shadow_intro` binds only when there is an outer binding to shadow.
//! Both protect reserved identifiers, and neither may rebind a
//! universe-protected name at module scope.

use c0_common::TraceSink;
use c0_syntax::Identifier;

use crate::reserved::{is_keyword, reserved_cursive, reserved_gen, universe_protected};
use crate::scopes::{Entity, Scope, ScopeContext};

/// Outcome of an introduction attempt. `diag_id` is set only for failures
/// that carry their own rule; plain duplicates leave it empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IntroResult {
    pub ok: bool,
    pub diag_id: Option<&'static str>,
}

impl IntroResult {
    const OK: IntroResult = IntroResult {
        ok: true,
        diag_id: None,
    };

    const fn fail(diag_id: Option<&'static str>) -> Self {
        IntroResult { ok: false, diag_id }
    }
}

/// Whether `name` is bound in one scope.
#[must_use]
pub fn in_scope(scope: &Scope, name: Identifier) -> bool {
    scope.contains_key(&name)
}

/// Whether `name` is bound in any scope outside the current one.
#[must_use]
pub fn in_outer(ctx: &ScopeContext, name: Identifier) -> bool {
    ctx.scopes.iter().skip(1).any(|scope| in_scope(scope, name))
}

/// Bind `name` in the current scope.
pub fn intro(ctx: &mut ScopeContext, name: Identifier, ent: Entity) -> IntroResult {
    let text = ctx.interner.resolve(name);
    if reserved_gen(&text) {
        ctx.trace.rule("Intro-Reserved-Gen-Err");
        return IntroResult::fail(Some("Intro-Reserved-Gen-Err"));
    }
    if reserved_cursive(&text) {
        ctx.trace.rule("Intro-Reserved-Cursive-Err");
        return IntroResult::fail(Some("Intro-Reserved-Cursive-Err"));
    }
    if in_scope(ctx.current_scope(), name) {
        ctx.trace.rule("Intro-Dup");
        return IntroResult::fail(None);
    }
    if in_outer(ctx, name) {
        ctx.trace.rule("Intro-Shadow-Required");
        return IntroResult::fail(Some("Intro-Shadow-Required"));
    }
    if ctx.at_module_scope() && universe_protected(&ctx.interner, name) {
        return IntroResult::fail(None);
    }
    ctx.trace.rule("Intro-Ok");
    ctx.current_scope_mut().insert(name, ent);
    IntroResult::OK
}

/// Bind `name` in the current scope, shadowing an outer binding.
pub fn shadow_intro(ctx: &mut ScopeContext, name: Identifier, ent: Entity) -> IntroResult {
    let text = ctx.interner.resolve(name);
    if reserved_gen(&text) {
        ctx.trace.rule("Shadow-Reserved-Gen-Err");
        return IntroResult::fail(Some("Shadow-Reserved-Gen-Err"));
    }
    if reserved_cursive(&text) {
        ctx.trace.rule("Shadow-Reserved-Cursive-Err");
        return IntroResult::fail(Some("Shadow-Reserved-Cursive-Err"));
    }
    if in_scope(ctx.current_scope(), name) {
        return IntroResult::fail(None);
    }
    if !in_outer(ctx, name) {
        ctx.trace.rule("Shadow-Unnecessary");
        return IntroResult::fail(Some("Shadow-Unnecessary"));
    }
    if ctx.at_module_scope() && universe_protected(&ctx.interner, name) {
        return IntroResult::fail(None);
    }
    ctx.trace.rule("Shadow-Ok");
    ctx.current_scope_mut().insert(name, ent);
    IntroResult::OK
}

/// Outcome of module-name validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidateModuleNamesResult {
    pub ok: bool,
    pub diag_id: Option<&'static str>,
}

/// Forbid module-level names that are keywords or universe type names.
/// Names are checked in sorted order so the reported rule is stable.
#[must_use]
pub fn validate_module_names(ctx: &ScopeContext, names: &Scope) -> ValidateModuleNamesResult {
    let mut sorted: Vec<String> = names
        .keys()
        .map(|&id| ctx.interner.resolve(id).to_string())
        .collect();
    sorted.sort_unstable();

    for name in &sorted {
        if is_keyword(name) {
            ctx.trace.rule("Validate-Module-Keyword-Err");
            return ValidateModuleNamesResult {
                ok: false,
                diag_id: Some("Validate-Module-Keyword-Err"),
            };
        }
    }
    for name in &sorted {
        if crate::reserved::PRIM_TYPE_NAMES.contains(&name.as_str()) {
            ctx.trace.rule("Validate-Module-Prim-Shadow-Err");
            return ValidateModuleNamesResult {
                ok: false,
                diag_id: Some("Validate-Module-Prim-Shadow-Err"),
            };
        }
    }
    for name in &sorted {
        if crate::reserved::SPECIAL_TYPE_NAMES.contains(&name.as_str()) {
            ctx.trace.rule("Validate-Module-Special-Shadow-Err");
            return ValidateModuleNamesResult {
                ok: false,
                diag_id: Some("Validate-Module-Special-Shadow-Err"),
            };
        }
    }
    for name in &sorted {
        if crate::reserved::ASYNC_TYPE_NAMES.contains(&name.as_str()) {
            ctx.trace.rule("Validate-Module-Async-Shadow-Err");
            return ValidateModuleNamesResult {
                ok: false,
                diag_id: Some("Validate-Module-Async-Shadow-Err"),
            };
        }
    }

    ctx.trace.rule("Validate-Module-Ok");
    ValidateModuleNamesResult {
        ok: true,
        diag_id: None,
    }
}

#[cfg(test)]
#[path = "tests/intro.rs"]
mod tests;
