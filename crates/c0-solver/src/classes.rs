//! The class engine: effective member tables and dispatchability.
//!
//! Tables are built over the linearization, first definition wins, and
//! later definitions under the same name must agree in signature with
//! `Self` substituted to the target class. Results are memoized per class
//! path; Σ is immutable after population so the caches live for the
//! compilation.

use std::cell::RefCell;
use std::rc::Rc;

use c0_binder::{Sigma, TypeDecl};
use c0_syntax::{
    ClassDecl, ClassFieldDecl, ClassItem, ClassMethodDecl, ClassPath, Identifier, PathKey,
    StateMember, TypePath, path_key,
};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::equiv::type_equiv;
use crate::linearize::{LinearizationResult, linearize_class};
use crate::lower::{lower_receiver_perm, lower_type, self_by_value, subst_self};
use crate::types::{FuncParamSig, MethodSig, ReceiverSig, TypeKind, TypeRef};

/// Effective methods of a class, in linearization order of first
/// definition.
#[derive(Clone, Debug, Default)]
pub struct ClassMethodTable {
    pub ok: bool,
    pub diag_id: Option<&'static str>,
    pub methods: IndexMap<Identifier, (ClassPath, ClassMethodDecl)>,
}

/// Effective abstract fields of a class.
#[derive(Clone, Debug, Default)]
pub struct ClassFieldTable {
    pub ok: bool,
    pub diag_id: Option<&'static str>,
    pub fields: IndexMap<Identifier, (ClassPath, ClassFieldDecl)>,
}

/// Result of implementation-completeness checking.
#[derive(Clone, Debug, Default)]
pub struct CompletenessResult {
    pub ok: bool,
    pub missing: Vec<Identifier>,
}

/// Memoizing facade over linearization and member tables.
pub struct ClassEngine {
    pub sigma: Rc<Sigma>,
    lin_cache: RefCell<FxHashMap<PathKey, LinearizationResult>>,
    method_cache: RefCell<FxHashMap<PathKey, ClassMethodTable>>,
    field_cache: RefCell<FxHashMap<PathKey, ClassFieldTable>>,
}

impl ClassEngine {
    #[must_use]
    pub fn new(sigma: Rc<Sigma>) -> Self {
        ClassEngine {
            sigma,
            lin_cache: RefCell::new(FxHashMap::default()),
            method_cache: RefCell::new(FxHashMap::default()),
            field_cache: RefCell::new(FxHashMap::default()),
        }
    }

    /// Memoized linearization.
    #[must_use]
    pub fn linearize(&self, path: &ClassPath) -> LinearizationResult {
        let key = path_key(path);
        if let Some(cached) = self.lin_cache.borrow().get(&key) {
            return cached.clone();
        }
        let result = linearize_class(&self.sigma, path);
        self.lin_cache.borrow_mut().insert(key, result.clone());
        result
    }

    /// Memoized effective method table.
    #[must_use]
    pub fn method_table(&self, path: &ClassPath) -> ClassMethodTable {
        let key = path_key(path);
        if let Some(cached) = self.method_cache.borrow().get(&key) {
            return cached.clone();
        }
        let result = build_method_table(self, path);
        self.method_cache.borrow_mut().insert(key, result.clone());
        result
    }

    /// Memoized effective field table.
    #[must_use]
    pub fn field_table(&self, path: &ClassPath) -> ClassFieldTable {
        let key = path_key(path);
        if let Some(cached) = self.field_cache.borrow().get(&key) {
            return cached.clone();
        }
        let result = build_field_table(self, path);
        self.field_cache.borrow_mut().insert(key, result.clone());
        result
    }
}

fn class_methods(decl: &ClassDecl) -> impl Iterator<Item = &ClassMethodDecl> {
    decl.items.iter().filter_map(|item| match item {
        ClassItem::Method(method) => Some(method),
        _ => None,
    })
}

fn class_fields(decl: &ClassDecl) -> impl Iterator<Item = &ClassFieldDecl> {
    decl.items.iter().filter_map(|item| match item {
        ClassItem::Field(field) => Some(field),
        _ => None,
    })
}

/// Build a method's signature with `Self` substituted to `target`.
fn method_sig_for(method: &ClassMethodDecl, target: &ClassPath) -> MethodSig {
    let self_ty: TypeRef = TypeKind::path(target.clone());
    let params = method
        .params
        .iter()
        .map(|param| FuncParamSig {
            mode: param.mode,
            ty: subst_self(&lower_type(&param.ty), &self_ty),
        })
        .collect();
    let ret = method
        .ret
        .as_ref()
        .map(|ty| subst_self(&lower_type(ty), &self_ty))
        .unwrap_or_else(TypeKind::unit);
    MethodSig {
        receiver: method.receiver.as_ref().map(lower_receiver_perm),
        params,
        ret,
    }
}

/// Signature equivalence over receiver, param modes and types, and
/// return type.
#[must_use]
pub fn sig_equal(lhs: &MethodSig, rhs: &MethodSig) -> bool {
    if lhs.receiver != rhs.receiver {
        return false;
    }
    if lhs.params.len() != rhs.params.len() {
        return false;
    }
    let params_match = lhs
        .params
        .iter()
        .zip(&rhs.params)
        .all(|(a, b)| a.mode == b.mode && type_equiv(&a.ty, &b.ty));
    params_match && type_equiv(&lhs.ret, &rhs.ret)
}

fn build_method_table(engine: &ClassEngine, path: &ClassPath) -> ClassMethodTable {
    let linearized = engine.linearize(path);
    if !linearized.ok {
        return ClassMethodTable {
            ok: false,
            diag_id: linearized.diag_id,
            methods: IndexMap::new(),
        };
    }
    let mut methods: IndexMap<Identifier, (ClassPath, ClassMethodDecl)> = IndexMap::new();
    for class_path in &linearized.order {
        let Some(decl) = engine.sigma.class_decl(class_path) else {
            continue;
        };
        for method in class_methods(decl) {
            match methods.get(&method.name) {
                None => {
                    methods.insert(method.name, (class_path.clone(), method.clone()));
                }
                Some((_, existing)) => {
                    let existing_sig = method_sig_for(existing, path);
                    let candidate_sig = method_sig_for(method, path);
                    if !sig_equal(&existing_sig, &candidate_sig) {
                        trace!(name = ?method.name, "effective method conflict");
                        return ClassMethodTable {
                            ok: false,
                            diag_id: Some("EffMethods-Conflict"),
                            methods: IndexMap::new(),
                        };
                    }
                }
            }
        }
    }
    ClassMethodTable {
        ok: true,
        diag_id: None,
        methods,
    }
}

fn build_field_table(engine: &ClassEngine, path: &ClassPath) -> ClassFieldTable {
    let linearized = engine.linearize(path);
    if !linearized.ok {
        return ClassFieldTable {
            ok: false,
            diag_id: linearized.diag_id,
            fields: IndexMap::new(),
        };
    }
    let mut fields: IndexMap<Identifier, (ClassPath, ClassFieldDecl)> = IndexMap::new();
    for class_path in &linearized.order {
        let Some(decl) = engine.sigma.class_decl(class_path) else {
            continue;
        };
        for field in class_fields(decl) {
            match fields.get(&field.name) {
                None => {
                    fields.insert(field.name, (class_path.clone(), field.clone()));
                }
                Some((_, existing)) => {
                    // Field types may not be overridden.
                    let existing_ty = lower_type(&existing.ty);
                    let candidate_ty = lower_type(&field.ty);
                    if !type_equiv(&existing_ty, &candidate_ty) {
                        return ClassFieldTable {
                            ok: false,
                            diag_id: Some("EffFields-Conflict"),
                            fields: IndexMap::new(),
                        };
                    }
                }
            }
        }
    }
    ClassFieldTable {
        ok: true,
        diag_id: None,
        fields,
    }
}

/// A method is vtable-eligible when it takes no `Self` by value anywhere
/// in its signature and declares no method-level generics.
#[must_use]
pub fn vtable_eligible(method: &ClassMethodDecl) -> bool {
    if !method.generics.is_empty() {
        return false;
    }
    if matches!(
        method.receiver.as_ref().map(lower_receiver_perm),
        Some(ReceiverSig::Value)
    ) {
        return false;
    }
    let self_in_params = method
        .params
        .iter()
        .any(|param| self_by_value(&lower_type(&param.ty)));
    let self_in_ret = method
        .ret
        .as_ref()
        .is_some_and(|ty| self_by_value(&lower_type(ty)));
    !self_in_params && !self_in_ret
}

/// A class is dispatchable when every non-`static_dispatch_only` method
/// in its effective table is vtable-eligible. Required for
/// `Dynamic(class)` well-formedness.
#[must_use]
pub fn class_dispatchable(engine: &ClassEngine, path: &ClassPath) -> bool {
    let table = engine.method_table(path);
    if !table.ok {
        return false;
    }
    table
        .methods
        .values()
        .filter(|(_, method)| !method.static_dispatch_only)
        .all(|(_, method)| vtable_eligible(method))
}

/// Whether `sub`'s linearization contains `super_path`.
#[must_use]
pub fn class_subtypes(engine: &ClassEngine, sub: &ClassPath, super_path: &ClassPath) -> bool {
    let linearized = engine.linearize(sub);
    linearized.ok && linearized.order.iter().any(|entry| entry == super_path)
}

fn implements_list(decl: &TypeDecl) -> &[ClassPath] {
    match decl {
        TypeDecl::Record(record) => &record.implements,
        TypeDecl::Enum(enum_decl) => &enum_decl.implements,
        TypeDecl::Modal(modal) => &modal.implements,
        TypeDecl::Alias(_) => &[],
    }
}

/// Whether the nominal at `type_path` implements `class_path`, directly
/// or through a listed class's hierarchy.
#[must_use]
pub fn type_implements_class(
    engine: &ClassEngine,
    type_path: &TypePath,
    class_path: &ClassPath,
) -> bool {
    let Some(decl) = engine.sigma.type_decl(type_path) else {
        return false;
    };
    implements_list(decl)
        .iter()
        .any(|listed| listed == class_path || class_subtypes(engine, listed, class_path))
}

fn type_member_names(decl: &TypeDecl) -> Vec<Identifier> {
    match decl {
        TypeDecl::Record(record) => record
            .members
            .iter()
            .filter_map(|member| match member {
                c0_syntax::RecordMember::Method(method) => Some(method.name),
                c0_syntax::RecordMember::Field(field) => Some(field.name),
            })
            .collect(),
        TypeDecl::Modal(modal) => modal
            .states
            .iter()
            .flat_map(|state| state.members.iter())
            .filter_map(|member| match member {
                StateMember::Method(method) => Some(method.name),
                StateMember::Transition(transition) => Some(transition.name),
                StateMember::Field(field) => Some(field.name),
            })
            .collect(),
        TypeDecl::Enum(_) | TypeDecl::Alias(_) => Vec::new(),
    }
}

/// Every abstract method of the class's effective table must have a
/// member of the same name on the implementing type.
#[must_use]
pub fn check_impl_completeness(
    engine: &ClassEngine,
    type_path: &TypePath,
    class_path: &ClassPath,
) -> CompletenessResult {
    let table = engine.method_table(class_path);
    if !table.ok {
        return CompletenessResult {
            ok: false,
            missing: Vec::new(),
        };
    }
    let Some(decl) = engine.sigma.type_decl(type_path) else {
        return CompletenessResult {
            ok: false,
            missing: Vec::new(),
        };
    };
    let member_names = type_member_names(decl);
    let missing: Vec<Identifier> = table
        .methods
        .values()
        .filter(|(_, method)| method.body.is_none())
        .filter(|(_, method)| !member_names.contains(&method.name))
        .map(|(_, method)| method.name)
        .collect();
    CompletenessResult {
        ok: missing.is_empty(),
        missing,
    }
}

/// Simplified orphan rule: an implementation is local when the nominal
/// head is declared by one of Σ's modules (the core is per-assembly, so
/// every Σ declaration counts as the current assembly).
#[must_use]
pub fn check_orphan_rule(engine: &ClassEngine, type_path: &TypePath) -> bool {
    engine.sigma.type_decl(type_path).is_some()
}

#[cfg(test)]
#[path = "tests/classes.rs"]
mod tests;
