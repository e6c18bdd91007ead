//! The type system core of Cursive 0.
//!
//! Resolved type references, lowering from the syntactic types, structural
//! equivalence, union introduction, variance, C3 class linearization with
//! method/field tables, the modal engine, bitcopy classification, and the
//! Σ built-ins.

pub mod types;
pub use types::{
    ConstLen, FuncParamSig, MethodSig, ReceiverSig, TypeKind, TypeRef, as_safe_ptr, ptr_state_of,
    strip_perm,
};

pub mod lower;
pub use lower::{lower_receiver_perm, lower_type, self_by_value, subst_self};

pub mod equiv;
pub use equiv::type_equiv;

pub mod union;
pub use union::union_introduce;

pub mod variance;
pub use variance::{
    Variance, check_generic_subtyping, combine_variance, invert_variance, join_variance,
    variance_of,
};

pub mod linearize;
pub use linearize::{LinearizationResult, linearize_class};

pub mod classes;
pub use classes::{
    ClassEngine, ClassFieldTable, ClassMethodTable, CompletenessResult, check_impl_completeness,
    check_orphan_rule, class_dispatchable, class_subtypes, sig_equal, type_implements_class,
    vtable_eligible,
};

pub mod modal;
pub use modal::{
    lookup_modal_field_decl, lookup_modal_state, lookup_state_method_decl, lookup_transition_decl,
    modal_field_visible, modal_state_names, state_member_visible, transition_result_type,
};

pub mod bitcopy;
pub use bitcopy::is_bitcopy;

pub mod builtins;
pub use builtins::{populate_builtins, populate_sigma};
