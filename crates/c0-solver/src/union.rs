//! Union introduction.
//!
//! Union members are flattened, de-duplicated, and order-insensitive.
//! A union of one member collapses to that member.

use std::rc::Rc;

use crate::equiv::type_equiv;
use crate::types::{TypeKind, TypeRef};

fn flatten_into(member: TypeRef, out: &mut Vec<TypeRef>) {
    match &*member {
        TypeKind::Union(inner) => {
            for nested in inner {
                flatten_into(Rc::clone(nested), out);
            }
        }
        _ => out.push(member),
    }
}

/// Build a canonical union from candidate members.
#[must_use]
pub fn union_introduce(members: Vec<TypeRef>) -> TypeRef {
    let mut flat = Vec::with_capacity(members.len());
    for member in members {
        flatten_into(member, &mut flat);
    }
    let mut deduped: Vec<TypeRef> = Vec::with_capacity(flat.len());
    for member in flat {
        if !deduped.iter().any(|existing| type_equiv(existing, &member)) {
            deduped.push(member);
        }
    }
    match deduped.pop() {
        None => TypeKind::never(),
        Some(last) if deduped.is_empty() => last,
        Some(last) => {
            deduped.push(last);
            Rc::new(TypeKind::Union(deduped))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use c0_syntax::types::PrimType;

    #[test]
    fn duplicates_collapse() {
        let out = union_introduce(vec![
            TypeKind::prim(PrimType::I32),
            TypeKind::prim(PrimType::I32),
        ]);
        assert!(matches!(*out, TypeKind::Prim(PrimType::I32)));
    }

    #[test]
    fn nested_unions_flatten() {
        let inner = Rc::new(TypeKind::Union(vec![
            TypeKind::prim(PrimType::I32),
            TypeKind::prim(PrimType::Bool),
        ]));
        let out = union_introduce(vec![inner, TypeKind::prim(PrimType::Bool)]);
        let TypeKind::Union(members) = &*out else {
            panic!("union expected");
        };
        assert_eq!(members.len(), 2);
    }

    #[test]
    fn empty_union_is_never() {
        let out = union_introduce(Vec::new());
        assert!(matches!(*out, TypeKind::Prim(PrimType::Never)));
    }

    #[test]
    fn introduction_is_order_insensitive() {
        let a = union_introduce(vec![
            TypeKind::prim(PrimType::I32),
            TypeKind::prim(PrimType::Bool),
        ]);
        let b = union_introduce(vec![
            TypeKind::prim(PrimType::Bool),
            TypeKind::prim(PrimType::I32),
        ]);
        assert!(type_equiv(&a, &b));
    }
}
