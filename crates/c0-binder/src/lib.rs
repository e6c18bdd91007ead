//! Name resolution for Cursive 0.
//!
//! The binder owns everything between the parsed AST and the typed
//! queries: the scope engine, the name-collection fixed point over using
//! clauses, visibility checking, qualified-path resolution, and the
//! functional rewrite of modules into their resolved form.

pub mod scopes;
pub use scopes::{
    Entity, EntityKind, EntitySource, NameMap, NameMapTable, Scope, ScopeContext, Sigma, TypeDecl,
    universe_bindings,
};

pub mod reserved;
pub use reserved::{
    ASYNC_TYPE_NAMES, PRIM_TYPE_NAMES, SPECIAL_TYPE_NAMES, is_keyword, reserved_cursive,
    reserved_gen, reserved_id,
};

pub mod intro;
pub use intro::{IntroResult, ValidateModuleNamesResult, intro, shadow_intro, validate_module_names};

pub mod visibility;
pub use visibility::{
    AccessResult, can_access, can_access_vis, check_module_visibility, top_level_vis,
};

pub mod collect;
pub use collect::{
    BindingsResult, BoundName, CollectNamesResult, NameMapBuildResult, NamesState, NamesStateKind,
    collect_name_maps, collect_names, decl_names, item_bindings, names_start, names_step,
};

pub mod qual;
pub use qual::{QualResolution, ResolveErr, alias_expand, item_of_path, resolve_qualified};

pub mod resolve;
pub use resolve::{ResolveContext, ResolvedModule, resolve_module};

#[cfg(test)]
pub(crate) mod testing;
