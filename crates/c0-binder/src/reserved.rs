//! Reserved-name and keyword tables.
//!
//! `gen_*` and `cursive*` identifiers belong to the compiler; the prim,
//! special, and async type names are universe bindings that module-level
//! declarations may not shadow.

use c0_common::Interner;
use c0_syntax::Identifier;

/// Language keywords; module-level names may not collide with these.
pub const KEYWORDS: &[&str] = &[
    "as", "break", "bytes", "class", "const", "continue", "defer", "dynamic", "else", "enum",
    "false", "for", "frame", "if", "implements", "in", "internal", "let", "loop", "match", "modal",
    "move", "priv", "proc", "protected", "pub", "record", "region", "result", "return", "self",
    "shadow", "shared", "state", "static", "string", "transition", "true", "type", "unique",
    "unsafe", "using", "var", "while",
];

/// Built-in scalar type names.
pub const PRIM_TYPE_NAMES: &[&str] = &[
    "i8", "i16", "i32", "i64", "i128", "u8", "u16", "u32", "u64", "u128", "isize", "usize", "f16",
    "f32", "f64", "bool", "char",
];

/// Universe-level special types and classes.
pub const SPECIAL_TYPE_NAMES: &[&str] = &[
    "AllocationError",
    "Async",
    "Bitcopy",
    "CancelToken",
    "Clone",
    "Context",
    "CpuDomain",
    "DirEntry",
    "DirIter",
    "Drop",
    "ExecutionDomain",
    "File",
    "FileKind",
    "GpuDomain",
    "InlineDomain",
    "IoError",
    "Ptr",
    "Region",
    "Spawned",
    "System",
    "Tracked",
];

/// Async convenience aliases.
pub const ASYNC_TYPE_NAMES: &[&str] = &["Sequence", "Future", "Stream", "Pipe", "Exchange"];

/// `gen_`-prefixed identifiers are reserved for generated symbols.
#[must_use]
pub fn reserved_gen(name: &str) -> bool {
    name.starts_with("gen_")
}

/// `cursive`-prefixed identifiers are reserved for the toolchain.
#[must_use]
pub fn reserved_cursive(name: &str) -> bool {
    name.starts_with("cursive")
}

/// Any reserved identifier.
#[must_use]
pub fn reserved_id(name: &str) -> bool {
    reserved_gen(name) || reserved_cursive(name)
}

/// Whether a name is a language keyword.
#[must_use]
pub fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name)
}

/// Whether an identifier names a universe-protected type.
#[must_use]
pub fn universe_protected(interner: &Interner, id: Identifier) -> bool {
    let name = interner.resolve(id);
    PRIM_TYPE_NAMES.contains(&&*name)
        || SPECIAL_TYPE_NAMES.contains(&&*name)
        || ASYNC_TYPE_NAMES.contains(&&*name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use c0_syntax::PrimType;

    #[test]
    fn gen_prefix_is_reserved() {
        assert!(reserved_gen("gen_tmp"));
        assert!(!reserved_gen("general"));
        assert!(reserved_id("gen_0"));
    }

    #[test]
    fn cursive_prefix_is_reserved() {
        assert!(reserved_cursive("cursive"));
        assert!(reserved_cursive("cursive_rt"));
        assert!(!reserved_cursive("cur"));
    }

    #[test]
    fn prim_names_match_the_prim_enum() {
        for prim in PrimType::ALL {
            let name = prim.name();
            if name == "()" || name == "!" {
                continue;
            }
            assert!(PRIM_TYPE_NAMES.contains(&name), "{name} missing");
        }
    }

    #[test]
    fn keyword_lookup() {
        assert!(is_keyword("proc"));
        assert!(is_keyword("region"));
        assert!(!is_keyword("widget"));
    }

    #[test]
    fn universe_protection_covers_all_three_tables() {
        let interner = Interner::new();
        for name in ["i32", "Region", "Future"] {
            assert!(universe_protected(&interner, interner.intern(name)), "{name}");
        }
        assert!(!universe_protected(&interner, interner.intern("widget")));
    }
}
