//! C3 class linearization.
//!
//! `linearize(C) = C :: merge(lin(S1), …, lin(Sn), [S1…Sn])`. Merge
//! repeatedly selects a good head: a list head appearing in no non-head
//! position of any list. Left-to-right head selection makes the result
//! deterministic; no good head means the hierarchy is ambiguous.

use c0_binder::Sigma;
use c0_syntax::{ClassPath, path_key};
use rustc_hash::FxHashSet;

use c0_syntax::PathKey;

/// Outcome of linearization. `ok == false` leaves `order` empty.
#[derive(Clone, Debug, Default)]
pub struct LinearizationResult {
    pub ok: bool,
    pub order: Vec<ClassPath>,
    pub diag_id: Option<&'static str>,
}

fn head_ok(head: &ClassPath, lists: &[Vec<ClassPath>]) -> bool {
    lists
        .iter()
        .all(|list| list.iter().skip(1).all(|entry| entry != head))
}

fn select_head(lists: &[Vec<ClassPath>]) -> Option<ClassPath> {
    lists
        .iter()
        .filter_map(|list| list.first())
        .find(|head| head_ok(head, lists))
        .cloned()
}

fn pop_all(head: &ClassPath, lists: Vec<Vec<ClassPath>>) -> Vec<Vec<ClassPath>> {
    lists
        .into_iter()
        .map(|list| {
            if list.first() == Some(head) {
                list[1..].to_vec()
            } else {
                list
            }
        })
        .collect()
}

/// C3 merge over linearization lists. `merge([]) == []`.
#[must_use]
pub fn merge(lists: Vec<Vec<ClassPath>>) -> LinearizationResult {
    let mut current = lists;
    let mut order = Vec::new();
    loop {
        if current.iter().all(Vec::is_empty) {
            return LinearizationResult {
                ok: true,
                order,
                diag_id: None,
            };
        }
        let Some(head) = select_head(&current) else {
            return LinearizationResult {
                ok: false,
                order: Vec::new(),
                diag_id: Some("Lin-Fail"),
            };
        };
        order.push(head.clone());
        current = pop_all(&head, current);
    }
}

fn linearize_impl(
    sigma: &Sigma,
    path: &ClassPath,
    active: &mut FxHashSet<PathKey>,
) -> LinearizationResult {
    let key = path_key(path);
    // Self-recursive entry fails the whole linearization.
    if !active.insert(key) {
        return LinearizationResult::default();
    }

    let result = (|| {
        let Some(decl) = sigma.class_decl(path) else {
            return LinearizationResult {
                ok: false,
                order: Vec::new(),
                diag_id: Some("Superclass-Undefined"),
            };
        };
        if decl.supers.is_empty() {
            return LinearizationResult {
                ok: true,
                order: vec![path.clone()],
                diag_id: None,
            };
        }
        let mut lists = Vec::with_capacity(decl.supers.len() + 1);
        for super_path in &decl.supers {
            let linearized = linearize_impl(sigma, super_path, active);
            if !linearized.ok {
                return linearized;
            }
            lists.push(linearized.order);
        }
        lists.push(decl.supers.clone());

        let merged = merge(lists);
        if !merged.ok {
            return merged;
        }
        let mut order = Vec::with_capacity(merged.order.len() + 1);
        order.push(path.clone());
        order.extend(merged.order);
        LinearizationResult {
            ok: true,
            order,
            diag_id: None,
        }
    })();

    active.remove(&path_key(path));
    result
}

/// Linearize a class against Σ. Callers memoize per `PathKey`
/// (see `ClassEngine`).
#[must_use]
pub fn linearize_class(sigma: &Sigma, path: &ClassPath) -> LinearizationResult {
    let mut active = FxHashSet::default();
    linearize_impl(sigma, path, &mut active)
}
