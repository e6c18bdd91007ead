//! Scopes, entities, and the global environment Σ.
//!
//! The scope stack of a context is `[lexical…, module, universe]` with the
//! innermost scope first. Σ maps paths to type and class declarations and
//! holds the module list; it is populated once (built-ins, then user
//! declarations) and read-only during resolution.

use std::rc::Rc;

use c0_common::{Interner, NullSink, TraceSink};
use c0_syntax::{
    AstModule, ClassDecl, EnumDecl, Identifier, ModalDecl, ModulePath, PathKey, RecordDecl,
    TypeAliasDecl, path_key,
};
use indexmap::IndexMap;

use crate::reserved::{ASYNC_TYPE_NAMES, PRIM_TYPE_NAMES, SPECIAL_TYPE_NAMES};

/// What kind of thing a name refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityKind {
    Value,
    Type,
    Class,
    ModuleAlias,
}

/// How the name entered scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntitySource {
    Decl,
    Using,
    RegionAlias,
}

/// A named binding visible in some scope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entity {
    pub kind: EntityKind,
    /// Declaring module, when known.
    pub origin: Option<ModulePath>,
    /// Original name at the origin, when the binding is an alias.
    pub target: Option<Identifier>,
    pub source: EntitySource,
}

impl Entity {
    #[must_use]
    pub fn decl(kind: EntityKind, origin: ModulePath) -> Self {
        Entity {
            kind,
            origin: Some(origin),
            target: None,
            source: EntitySource::Decl,
        }
    }

    #[must_use]
    pub fn using(kind: EntityKind, origin: ModulePath, target: Identifier) -> Self {
        Entity {
            kind,
            origin: Some(origin),
            target: Some(target),
            source: EntitySource::Using,
        }
    }

    #[must_use]
    pub fn module_alias(origin: ModulePath) -> Self {
        Entity {
            kind: EntityKind::ModuleAlias,
            origin: Some(origin),
            target: None,
            source: EntitySource::Using,
        }
    }

    #[must_use]
    pub fn region_alias() -> Self {
        Entity {
            kind: EntityKind::Value,
            origin: None,
            target: None,
            source: EntitySource::RegionAlias,
        }
    }
}

/// One scope: name to entity. Iteration order is insertion order, which
/// keeps wildcard expansion and fixed-point comparison deterministic.
pub type Scope = IndexMap<Identifier, Entity>;

/// Per-module name map produced by collection.
pub type NameMap = IndexMap<Identifier, Entity>;

/// All modules' name maps, keyed by module path.
pub type NameMapTable = IndexMap<PathKey, NameMap>;

/// A user-declared nominal type.
#[derive(Clone, Debug)]
pub enum TypeDecl {
    Record(RecordDecl),
    Enum(EnumDecl),
    Modal(ModalDecl),
    Alias(TypeAliasDecl),
}

/// The global environment: declarations by path plus the module list.
#[derive(Clone, Debug, Default)]
pub struct Sigma {
    pub types: IndexMap<PathKey, TypeDecl>,
    pub classes: IndexMap<PathKey, ClassDecl>,
    pub mods: Vec<AstModule>,
}

impl Sigma {
    #[must_use]
    pub fn module_by_path(&self, path: &[Identifier]) -> Option<&AstModule> {
        self.mods.iter().find(|m| m.path.as_slice() == path)
    }

    #[must_use]
    pub fn has_module(&self, path: &[Identifier]) -> bool {
        self.module_by_path(path).is_some()
    }

    #[must_use]
    pub fn type_decl(&self, path: &[Identifier]) -> Option<&TypeDecl> {
        self.types.get(&path_key(path))
    }

    #[must_use]
    pub fn class_decl(&self, path: &[Identifier]) -> Option<&ClassDecl> {
        self.classes.get(&path_key(path))
    }
}

/// The resolver's cursor: scope stack, current module, and shared Σ.
///
/// The stack always ends with the module scope and the universe scope.
pub struct ScopeContext {
    pub scopes: Vec<Scope>,
    pub current_module: ModulePath,
    pub sigma: Rc<Sigma>,
    pub interner: Rc<Interner>,
    pub trace: Rc<dyn TraceSink>,
}

impl ScopeContext {
    /// Fresh context for a module: `[module-scope, universe]`.
    #[must_use]
    pub fn for_module(
        sigma: Rc<Sigma>,
        interner: Rc<Interner>,
        module: ModulePath,
        module_scope: Scope,
    ) -> Self {
        let universe = universe_bindings(&interner);
        ScopeContext {
            scopes: vec![module_scope, universe],
            current_module: module,
            sigma,
            interner,
            trace: Rc::new(NullSink),
        }
    }

    #[must_use]
    pub fn with_trace(mut self, trace: Rc<dyn TraceSink>) -> Self {
        self.trace = trace;
        self
    }

    /// Innermost scope.
    #[must_use]
    pub fn current_scope(&self) -> &Scope {
        &self.scopes[0]
    }

    pub fn current_scope_mut(&mut self) -> &mut Scope {
        &mut self.scopes[0]
    }

    /// Whether the module scope is the innermost (no lexical scopes open).
    #[must_use]
    pub fn at_module_scope(&self) -> bool {
        self.scopes.len() == 2
    }

    /// The named module-scope position (second from the end).
    #[must_use]
    pub fn module_scope(&self) -> &Scope {
        &self.scopes[self.scopes.len() - 2]
    }

    /// The universe scope (last).
    #[must_use]
    pub fn universe_scope(&self) -> &Scope {
        &self.scopes[self.scopes.len() - 1]
    }

    pub fn push_scope(&mut self) {
        self.scopes.insert(0, Scope::new());
    }

    pub fn pop_scope(&mut self) {
        debug_assert!(self.scopes.len() > 2, "popping a named scope");
        self.scopes.remove(0);
    }

    /// Look a name up through the stack, innermost first.
    #[must_use]
    pub fn lookup(&self, name: Identifier) -> Option<&Entity> {
        self.scopes.iter().find_map(|scope| scope.get(&name))
    }
}

/// The universe scope: prim, special, and async type names.
#[must_use]
pub fn universe_bindings(interner: &Interner) -> Scope {
    let mut scope = Scope::new();
    for &name in PRIM_TYPE_NAMES {
        scope.insert(
            interner.intern(name),
            Entity {
                kind: EntityKind::Type,
                origin: None,
                target: None,
                source: EntitySource::Decl,
            },
        );
    }
    for &name in SPECIAL_TYPE_NAMES {
        let kind = match name {
            "Drop" | "Bitcopy" | "Clone" | "ExecutionDomain" | "CpuDomain" | "GpuDomain"
            | "InlineDomain" => EntityKind::Class,
            _ => EntityKind::Type,
        };
        scope.insert(
            interner.intern(name),
            Entity {
                kind,
                origin: None,
                target: None,
                source: EntitySource::Decl,
            },
        );
    }
    for &name in ASYNC_TYPE_NAMES {
        scope.insert(
            interner.intern(name),
            Entity {
                kind: EntityKind::Type,
                origin: None,
                target: None,
                source: EntitySource::Decl,
            },
        );
    }
    scope
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> ScopeContext {
        let interner = Rc::new(Interner::new());
        ScopeContext::for_module(
            Rc::new(Sigma::default()),
            interner,
            ModulePath::new(),
            Scope::new(),
        )
    }

    #[test]
    fn fresh_context_has_module_and_universe() {
        let ctx = context();
        assert_eq!(ctx.scopes.len(), 2);
        assert!(ctx.at_module_scope());
        assert!(!ctx.universe_scope().is_empty());
    }

    #[test]
    fn push_pop_round_trips() {
        let mut ctx = context();
        ctx.push_scope();
        assert!(!ctx.at_module_scope());
        assert_eq!(ctx.scopes.len(), 3);
        ctx.pop_scope();
        assert!(ctx.at_module_scope());
    }

    #[test]
    fn lookup_prefers_inner_scopes() {
        let mut ctx = context();
        let name = ctx.interner.intern("x");
        ctx.current_scope_mut()
            .insert(name, Entity::decl(EntityKind::Type, ModulePath::new()));
        ctx.push_scope();
        ctx.current_scope_mut().insert(name, Entity::region_alias());
        let found = ctx.lookup(name).expect("bound");
        assert_eq!(found.source, EntitySource::RegionAlias);
        ctx.pop_scope();
        let found = ctx.lookup(name).expect("bound");
        assert_eq!(found.source, EntitySource::Decl);
    }

    #[test]
    fn universe_contains_prims_and_async_aliases() {
        let ctx = context();
        let i32_name = ctx.interner.intern("i32");
        let future = ctx.interner.intern("Future");
        assert!(ctx.universe_scope().contains_key(&i32_name));
        assert!(ctx.universe_scope().contains_key(&future));
    }
}
