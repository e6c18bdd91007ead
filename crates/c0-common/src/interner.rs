//! String interning for identifier deduplication.
//!
//! Identifiers are semantic symbols: equality is byte identity, realized as
//! `Atom` index equality. The interner is single-threaded (the front end
//! runs analysis passes to completion on the calling thread) and uses
//! interior mutability so contexts can share it behind an `Rc`.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// An interned string, represented as an index into the owning [`Interner`].
///
/// Atoms from different interners must not be mixed; the compiler threads a
/// single interner through the whole compilation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Atom(pub u32);

impl Default for Atom {
    fn default() -> Self {
        Atom::INVALID
    }
}

impl Atom {
    /// Sentinel for "no atom" in contexts that need a placeholder.
    pub const INVALID: Atom = Atom(u32::MAX);

    #[inline]
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != u32::MAX
    }
}

#[derive(Default)]
struct InternerInner {
    map: FxHashMap<Rc<str>, Atom>,
    strings: Vec<Rc<str>>,
}

/// Deduplicating string store.
pub struct Interner {
    inner: RefCell<InternerInner>,
}

impl Interner {
    #[must_use]
    pub fn new() -> Self {
        Interner {
            inner: RefCell::new(InternerInner::default()),
        }
    }

    /// Intern a string, returning its atom. Repeated calls with equal
    /// strings return the same atom.
    pub fn intern(&self, s: &str) -> Atom {
        let mut inner = self.inner.borrow_mut();
        if let Some(&atom) = inner.map.get(s) {
            return atom;
        }
        let atom = Atom(inner.strings.len() as u32);
        let shared: Rc<str> = Rc::from(s);
        inner.strings.push(Rc::clone(&shared));
        inner.map.insert(shared, atom);
        atom
    }

    /// Resolve an atom back to its string. Cheap: clones an `Rc`.
    ///
    /// # Panics
    /// Panics if the atom did not come from this interner.
    #[must_use]
    pub fn resolve(&self, atom: Atom) -> Rc<str> {
        let inner = self.inner.borrow();
        Rc::clone(&inner.strings[atom.0 as usize])
    }

    /// Look up an already-interned string without inserting.
    #[must_use]
    pub fn get(&self, s: &str) -> Option<Atom> {
        self.inner.borrow().map.get(s).copied()
    }

    /// Number of distinct strings interned so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().strings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Interner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interner")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_dedupes() {
        let interner = Interner::new();
        let a = interner.intern("foo");
        let b = interner.intern("foo");
        let c = interner.intern("bar");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(interner.len(), 2);
    }

    #[test]
    fn resolve_round_trips() {
        let interner = Interner::new();
        let atom = interner.intern("region");
        assert_eq!(&*interner.resolve(atom), "region");
    }

    #[test]
    fn get_does_not_insert() {
        let interner = Interner::new();
        assert_eq!(interner.get("missing"), None);
        let atom = interner.intern("present");
        assert_eq!(interner.get("present"), Some(atom));
    }

    #[test]
    fn invalid_atom_is_marked() {
        assert!(!Atom::INVALID.is_valid());
        assert!(Atom(0).is_valid());
    }
}
