//! Identifiers, module paths, and canonical path keys.
//!
//! An identifier is an interned symbol: equality is byte identity via the
//! interner. A module path is an ordered identifier sequence; a path adds
//! a trailing name. `PathKey` is the canonical map-key form.

use c0_common::{Atom, Interner};
use smallvec::SmallVec;

/// A semantic symbol. Equality is interner identity.
pub type Identifier = Atom;

/// An ordered sequence of identifiers naming a module.
pub type ModulePath = SmallVec<[Identifier; 4]>;

/// A module path plus trailing name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Path {
    pub module: ModulePath,
    pub name: Identifier,
}

impl Path {
    #[must_use]
    pub fn new(module: ModulePath, name: Identifier) -> Self {
        Path { module, name }
    }
}

/// Canonical map key for a module path or full item path.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathKey(pub SmallVec<[Atom; 4]>);

/// Build the canonical key for a path.
#[must_use]
pub fn path_key(path: &[Identifier]) -> PathKey {
    PathKey(SmallVec::from_slice(path))
}

/// Elementwise path equality.
#[must_use]
pub fn path_eq(p: &[Identifier], q: &[Identifier]) -> bool {
    p == q
}

/// Split a path of length >= 2 into its module prefix and trailing name.
#[must_use]
pub fn split_last(path: &[Identifier]) -> Option<(ModulePath, Identifier)> {
    if path.len() < 2 {
        return None;
    }
    let (last, prefix) = path.split_last()?;
    Some((ModulePath::from_slice(prefix), *last))
}

/// Render a path as `a::b::c` for diagnostics and mangling input.
#[must_use]
pub fn string_of_path(interner: &Interner, path: &[Identifier]) -> String {
    let mut out = String::new();
    for (i, &id) in path.iter().enumerate() {
        if i > 0 {
            out.push_str("::");
        }
        out.push_str(&interner.resolve(id));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(interner: &Interner, names: &[&str]) -> ModulePath {
        names.iter().map(|n| interner.intern(n)).collect()
    }

    #[test]
    fn path_equality_is_elementwise() {
        let interner = Interner::new();
        let p = ids(&interner, &["a", "b"]);
        let q = ids(&interner, &["a", "b"]);
        let r = ids(&interner, &["a", "c"]);
        assert!(path_eq(&p, &q));
        assert!(!path_eq(&p, &r));
        assert_eq!(path_key(&p), path_key(&q));
    }

    #[test]
    fn split_last_requires_two_segments() {
        let interner = Interner::new();
        let single = ids(&interner, &["a"]);
        assert!(split_last(&single).is_none());

        let pair = ids(&interner, &["a", "b"]);
        let (module, name) = split_last(&pair).expect("two segments");
        assert_eq!(module.as_slice(), &pair[..1]);
        assert_eq!(name, pair[1]);
    }

    #[test]
    fn renders_double_colon_separated() {
        let interner = Interner::new();
        let p = ids(&interner, &["core", "mem"]);
        assert_eq!(string_of_path(&interner, &p), "core::mem");
        assert_eq!(string_of_path(&interner, &[]), "");
    }
}
