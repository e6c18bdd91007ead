//! The undefined-behavior model.
//!
//! Static UB is diagnosable at compile time and keyed by rule ID; dynamic
//! UB is unverified behavior (UVB) at runtime. Raw-pointer accesses are the
//! canonical dynamic-UB surface: reads require a defined address, writes
//! require a mutable pointer.

use serde::Serialize;

use crate::codes::{DiagCodeMap, DiagId, code};

/// Classification of an operation's runtime behavior.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum BehaviorClass {
    /// The operation's dynamic preconditions hold.
    Specified,
    /// Unverified behavior: the preconditions failed.
    Uvb,
}

/// Mutability of a raw pointer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum RawPtrPermission {
    Imm,
    Mut,
}

/// Classify behavior given whether the dynamic preconditions failed.
#[must_use]
pub fn behavior_of_dynamic_undefined(dynamic_undefined: bool) -> BehaviorClass {
    if dynamic_undefined {
        BehaviorClass::Uvb
    } else {
        BehaviorClass::Specified
    }
}

/// A raw-pointer read is dynamic UB when the address is not defined for
/// reads. The pointer's own permission does not matter for reads.
#[must_use]
pub fn dynamic_undefined_read_ptr(_perm: RawPtrPermission, read_addr_defined: bool) -> bool {
    !read_addr_defined
}

/// A raw-pointer write through an immutable raw pointer is dynamic UB.
#[must_use]
pub fn dynamic_undefined_write_ptr(perm: RawPtrPermission) -> bool {
    perm == RawPtrPermission::Imm
}

/// The code to emit for a statically-diagnosable UB rule, or `None` when
/// the rule carries no code (a dev-time assertion surface, left silent).
#[must_use]
pub fn static_undefined_code(
    spec_map: &DiagCodeMap,
    c0_map: &DiagCodeMap,
    id: &DiagId,
) -> Option<&'static str> {
    code(spec_map, c0_map, id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::{C0_CODE_MAP, SPEC_CODE_MAP};

    #[test]
    fn failed_preconditions_are_uvb() {
        assert_eq!(behavior_of_dynamic_undefined(true), BehaviorClass::Uvb);
        assert_eq!(behavior_of_dynamic_undefined(false), BehaviorClass::Specified);
    }

    #[test]
    fn reads_depend_only_on_address_definedness() {
        assert!(dynamic_undefined_read_ptr(RawPtrPermission::Imm, false));
        assert!(dynamic_undefined_read_ptr(RawPtrPermission::Mut, false));
        assert!(!dynamic_undefined_read_ptr(RawPtrPermission::Imm, true));
    }

    #[test]
    fn writes_through_imm_are_uvb() {
        assert!(dynamic_undefined_write_ptr(RawPtrPermission::Imm));
        assert!(!dynamic_undefined_write_ptr(RawPtrPermission::Mut));
    }

    #[test]
    fn static_codes_follow_the_code_maps() {
        assert_eq!(
            static_undefined_code(&SPEC_CODE_MAP, &C0_CODE_MAP, "Ptr-Expired"),
            Some("E-REG-0003")
        );
        assert_eq!(
            static_undefined_code(&SPEC_CODE_MAP, &C0_CODE_MAP, "No-Such-Rule"),
            None
        );
    }
}
