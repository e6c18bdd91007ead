//! Rule-ID to diagnostic-code maps.
//!
//! Rule IDs name decision points of the language specification. The spec
//! map carries the IDs the prose assigns codes to; the C0 map holds
//! implementation-assigned fallbacks. [`code`] consults the spec map first.
//! An ID present in neither map yields `None` and the caller stays silent.

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

/// A spec rule identifier such as `Resolve-Using-None`.
pub type DiagId = str;

/// Mapping from rule IDs to external diagnostic codes.
pub type DiagCodeMap = FxHashMap<&'static str, &'static str>;

/// Rule IDs assigned codes by the specification.
pub static SPEC_CODE_MAP: Lazy<DiagCodeMap> = Lazy::new(|| {
    FxHashMap::from_iter([
        ("Resolve-Using-None", "E-MOD-1204"),
        ("Resolve-Using-Ambig", "E-MOD-1208"),
        ("Using-List-Dup", "E-MOD-1206"),
        ("Using-Path-Item-Public-Err", "E-MOD-1205"),
        ("Using-List-Public-Err", "E-MOD-1205"),
        ("Collect-Dup", "E-MOD-1302"),
        ("Names-Step-Dup", "E-MOD-1302"),
        ("Access-Err", "E-MOD-1207"),
        ("Protected-TopLevel-Err", "E-MOD-2440"),
        ("WF-Acyclic-Eager", "E-MOD-1401"),
        ("Validate-Module-Keyword-Err", "E-CNF-0201"),
        ("Validate-Module-Prim-Shadow-Err", "E-CNF-0202"),
        ("Validate-Module-Special-Shadow-Err", "E-CNF-0203"),
        ("Validate-Module-Async-Shadow-Err", "E-CNF-0204"),
        ("Intro-Reserved-Gen-Err", "E-CNF-0103"),
        ("Shadow-Reserved-Gen-Err", "E-CNF-0103"),
        ("Intro-Reserved-Cursive-Err", "E-CNF-0104"),
        ("Shadow-Reserved-Cursive-Err", "E-CNF-0104"),
        ("IMPL-INCOMPLETE", "E-TYP-1501"),
        ("EffMethods-Conflict", "E-TYP-1504"),
        ("Lin-Fail", "E-TYP-1505"),
        ("EffFields-Conflict", "E-TYP-1507"),
        ("ValueUse-NonBitcopyPlace", "E-TYP-1601"),
        ("Index-Slice-Direct-Err", "E-TYP-1602"),
        ("Index-Array-NonConst-Err", "E-TYP-1603"),
        ("Alloc-Outside-Region", "E-REG-0001"),
        ("Region-Escape", "E-REG-0002"),
        ("Ptr-Expired", "E-REG-0003"),
        ("Frame-Nesting", "E-REG-0004"),
        ("Region-Alias-Unbound", "E-REG-0005"),
    ])
});

/// Implementation-assigned fallback codes for rule IDs the spec leaves
/// uncoded.
pub static C0_CODE_MAP: Lazy<DiagCodeMap> = Lazy::new(|| {
    FxHashMap::from_iter([
        ("ResolveExpr-Ident-Err", "E-MOD-1303"),
        ("ResolveExpr-Qualified-Err", "E-MOD-1304"),
        ("Resolve-Item-Err", "E-MOD-1306"),
        ("BindPattern-Dup", "E-MOD-1301"),
    ])
});

/// Look up a rule ID in the spec map.
#[must_use]
pub fn spec_code(spec_map: &DiagCodeMap, id: &DiagId) -> Option<&'static str> {
    spec_map.get(id).copied()
}

/// Look up a rule ID in the C0 map.
#[must_use]
pub fn c0_code(c0_map: &DiagCodeMap, id: &DiagId) -> Option<&'static str> {
    c0_map.get(id).copied()
}

/// Spec map first, C0 map as fallback.
#[must_use]
pub fn code(spec_map: &DiagCodeMap, c0_map: &DiagCodeMap, id: &DiagId) -> Option<&'static str> {
    spec_code(spec_map, id).or_else(|| c0_code(c0_map, id))
}

/// The compiler's default maps.
#[must_use]
pub fn default_code(id: &DiagId) -> Option<&'static str> {
    code(&SPEC_CODE_MAP, &C0_CODE_MAP, id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::lookup_entry;

    #[test]
    fn spec_map_wins_over_c0_map() {
        let mut spec = DiagCodeMap::default();
        let mut c0 = DiagCodeMap::default();
        spec.insert("Some-Rule", "E-MOD-1204");
        c0.insert("Some-Rule", "E-MOD-1205");
        assert_eq!(code(&spec, &c0, "Some-Rule"), Some("E-MOD-1204"));
    }

    #[test]
    fn c0_map_is_the_fallback() {
        let spec = DiagCodeMap::default();
        let mut c0 = DiagCodeMap::default();
        c0.insert("Other-Rule", "E-MOD-1306");
        assert_eq!(code(&spec, &c0, "Other-Rule"), Some("E-MOD-1306"));
    }

    #[test]
    fn unmapped_rules_are_silent() {
        assert_eq!(default_code("Totally-Unknown-Rule"), None);
    }

    #[test]
    fn every_mapped_code_is_in_the_message_table() {
        for map in [&*SPEC_CODE_MAP, &*C0_CODE_MAP] {
            for (&id, &code) in map {
                assert!(lookup_entry(code).is_some(), "{id} maps to unknown {code}");
            }
        }
    }

    #[test]
    fn using_diagnostics_map_to_module_codes() {
        assert_eq!(default_code("Resolve-Using-None"), Some("E-MOD-1204"));
        assert_eq!(default_code("Resolve-Using-Ambig"), Some("E-MOD-1208"));
        assert_eq!(default_code("Access-Err"), Some("E-MOD-1207"));
    }
}
