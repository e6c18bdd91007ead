use std::rc::Rc;

use c0_common::Interner;
use c0_syntax::Visibility;

use crate::collect::collect_name_maps;
use crate::scopes::EntityKind;
use crate::testing::{context_for, module, proc_item, using_path};

use super::*;

#[test]
fn resolves_a_direct_declaration() {
    let interner = Rc::new(Interner::new());
    let m1 = module(
        &interner,
        &["m1"],
        vec![proc_item(&interner, Visibility::Public, "f")],
    );
    let mut ctx = context_for(Rc::clone(&interner), vec![m1]);
    let maps = collect_name_maps(&mut ctx).name_maps;

    let path = crate::testing::mpath(&interner, &["m1"]);
    let f = interner.intern("f");
    let resolved = resolve_qualified(&ctx, &maps, &path, f, EntityKind::Value).expect("resolves");
    assert_eq!(resolved.module_path, path);
    assert_eq!(resolved.name, f);
}

#[test]
fn follows_reexport_chains_to_the_declaring_module() {
    let interner = Rc::new(Interner::new());
    let m1 = module(
        &interner,
        &["m1"],
        vec![proc_item(&interner, Visibility::Public, "f")],
    );
    let m2 = module(
        &interner,
        &["m2"],
        vec![using_path(&interner, Visibility::Public, &["m1", "f"], Some("g"))],
    );
    let mut ctx = context_for(Rc::clone(&interner), vec![m1, m2]);
    let maps = collect_name_maps(&mut ctx).name_maps;
    ctx.current_module = crate::testing::mpath(&interner, &["m2"]);

    let m2_path = crate::testing::mpath(&interner, &["m2"]);
    let g = interner.intern("g");
    let resolved =
        resolve_qualified(&ctx, &maps, &m2_path, g, EntityKind::Value).expect("resolves");
    assert_eq!(resolved.module_path, crate::testing::mpath(&interner, &["m1"]));
    assert_eq!(resolved.name, interner.intern("f"));
}

#[test]
fn kind_mismatch_is_an_error() {
    let interner = Rc::new(Interner::new());
    let m1 = module(
        &interner,
        &["m1"],
        vec![proc_item(&interner, Visibility::Public, "f")],
    );
    let mut ctx = context_for(Rc::clone(&interner), vec![m1]);
    let maps = collect_name_maps(&mut ctx).name_maps;
    let path = crate::testing::mpath(&interner, &["m1"]);
    let f = interner.intern("f");
    let err = resolve_qualified(&ctx, &maps, &path, f, EntityKind::Type).unwrap_err();
    assert_eq!(err.diag_id, "Resolve-Item-Err");
}

#[test]
fn private_items_resolve_but_fail_the_access_judgment() {
    let interner = Rc::new(Interner::new());
    let m1 = module(
        &interner,
        &["m1"],
        vec![proc_item(&interner, Visibility::Private, "h")],
    );
    let m2 = module(&interner, &["m2"], vec![]);
    let mut ctx = context_for(Rc::clone(&interner), vec![m1, m2]);
    let maps = collect_name_maps(&mut ctx).name_maps;
    ctx.current_module = crate::testing::mpath(&interner, &["m2"]);

    let m1_path = crate::testing::mpath(&interner, &["m1"]);
    let h = interner.intern("h");
    // Resolution is name-based and succeeds...
    assert!(resolve_qualified(&ctx, &maps, &m1_path, h, EntityKind::Value).is_ok());
    // ...while the visibility judgment rejects the access.
    let access = crate::visibility::can_access(&ctx, &m1_path, h);
    assert!(!access.ok);
    assert_eq!(access.diag_id, Some("Access-Err"));
}

#[test]
fn alias_expansion_rewrites_the_head_segment() {
    let interner = Rc::new(Interner::new());
    let m1 = module(
        &interner,
        &["m1"],
        vec![proc_item(&interner, Visibility::Public, "f")],
    );
    // `using m1 as one` then `one::f`
    let m2 = module(
        &interner,
        &["m2"],
        vec![using_path(&interner, Visibility::Private, &["m1"], Some("one"))],
    );
    let mut ctx = context_for(Rc::clone(&interner), vec![m1, m2]);
    let maps = collect_name_maps(&mut ctx).name_maps;
    ctx.current_module = crate::testing::mpath(&interner, &["m2"]);

    let aliased = crate::testing::mpath(&interner, &["one"]);
    let expanded = alias_expand(&ctx, &maps, &aliased);
    assert_eq!(expanded, crate::testing::mpath(&interner, &["m1"]));

    let f = interner.intern("f");
    let resolved =
        resolve_qualified(&ctx, &maps, &aliased, f, EntityKind::Value).expect("resolves");
    assert_eq!(resolved.module_path, crate::testing::mpath(&interner, &["m1"]));
}

#[test]
fn item_of_path_splits_and_follows() {
    let interner = Rc::new(Interner::new());
    let m1 = module(
        &interner,
        &["m1"],
        vec![proc_item(&interner, Visibility::Public, "f")],
    );
    let mut ctx = context_for(Rc::clone(&interner), vec![m1]);
    let maps = collect_name_maps(&mut ctx).name_maps;
    let full = crate::testing::mpath(&interner, &["m1", "f"]);
    let resolved = item_of_path(&ctx, &maps, &full).expect("item");
    assert_eq!(resolved.kind, EntityKind::Value);

    let single = crate::testing::mpath(&interner, &["m1"]);
    assert!(item_of_path(&ctx, &maps, &single).is_none());
}
