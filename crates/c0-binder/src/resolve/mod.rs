//! The module resolver: a functional, span-preserving rewrite.
//!
//! Each module is resolved against the stabilized name maps. Qualified
//! names collapse to canonical `PathExpr`/`RecordExpr`/`EnumLiteral`
//! forms, patterns bind their names through the scope engine, and every
//! block/arm/loop body re-enters a fresh lexical scope. Resolving an
//! already-resolved tree is a no-op.

use std::rc::Rc;

use c0_common::{Interner, TraceSink};
use c0_syntax::{AstModule, ModulePath, path_key};

use crate::qual::ResolveErr;
use crate::scopes::{NameMapTable, Scope, ScopeContext, Sigma};

mod expr;
mod item;
mod pat;
mod types;

pub use expr::{resolve_block, resolve_expr};
pub use item::resolve_item;
pub use pat::{bind_pattern, resolve_pattern};
pub use types::resolve_type;

/// Everything the resolver needs while walking one module.
pub struct ResolveContext {
    pub scope: ScopeContext,
    pub name_maps: NameMapTable,
}

impl ResolveContext {
    /// Context positioned in `module`, with the module scope seeded from
    /// its stabilized name map.
    #[must_use]
    pub fn for_module(
        sigma: Rc<Sigma>,
        interner: Rc<Interner>,
        name_maps: NameMapTable,
        module: &ModulePath,
    ) -> Self {
        let module_scope: Scope = name_maps
            .get(&path_key(module))
            .cloned()
            .unwrap_or_default();
        let scope = ScopeContext::for_module(sigma, interner, module.clone(), module_scope);
        ResolveContext { scope, name_maps }
    }

    #[must_use]
    pub fn with_trace(mut self, trace: Rc<dyn TraceSink>) -> Self {
        self.scope.trace = trace;
        self
    }
}

/// Run `f` inside a fresh lexical scope, popping on every exit path.
pub(crate) fn with_scope<T>(
    ctx: &mut ResolveContext,
    f: impl FnOnce(&mut ResolveContext) -> Result<T, ResolveErr>,
) -> Result<T, ResolveErr> {
    ctx.scope.push_scope();
    let result = f(ctx);
    ctx.scope.pop_scope();
    result
}

/// A module after resolution.
#[derive(Clone, Debug)]
pub struct ResolvedModule {
    pub module: AstModule,
}

/// Resolve a whole module. The rewrite shares unchanged subtrees with the
/// input and preserves every span.
pub fn resolve_module(
    ctx: &mut ResolveContext,
    module: &AstModule,
) -> Result<ResolvedModule, ResolveErr> {
    let mut items = Vec::with_capacity(module.items.len());
    for item in &module.items {
        items.push(resolve_item(ctx, item)?);
    }
    Ok(ResolvedModule {
        module: AstModule {
            path: module.path.clone(),
            items,
            span: module.span,
        },
    })
}

#[cfg(test)]
#[path = "../tests/resolve.rs"]
mod tests;
