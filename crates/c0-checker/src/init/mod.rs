//! The module initialization planner.
//!
//! Three dependency families per module: types referenced at type
//! positions, values read eagerly by static initializers, and values
//! read lazily from field initializers and bodies. Only the eager-value
//! graph must be acyclic; its topological order, drained in ascending
//! module-index order, is the initialization order.

use c0_common::{DiagnosticStream, Interner, make_diagnostic};
use c0_syntax::{AstModule, PathKey, path_key, string_of_path};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

mod deps;
use deps::ModuleDeps;

/// The planner's output. Edge sets are indexed by module position in
/// `modules`; each entry lists the modules that module depends on.
#[derive(Clone, Debug, Default, Serialize)]
pub struct InitPlan {
    pub topo_ok: bool,
    pub init_order: Vec<String>,
    pub modules: Vec<String>,
    pub type_edges: Vec<Vec<usize>>,
    pub eager_edges: Vec<Vec<usize>>,
    pub lazy_edges: Vec<Vec<usize>>,
}

/// Stable topological order of the eager graph: ready modules are
/// emitted in ascending index order. `None` on a cycle.
fn topo_order(eager_edges: &[Vec<usize>]) -> Option<Vec<usize>> {
    let n = eager_edges.len();
    let mut remaining: Vec<Option<Vec<usize>>> =
        eager_edges.iter().map(|deps| Some(deps.clone())).collect();
    let mut order = Vec::with_capacity(n);
    let mut done = vec![false; n];

    while order.len() < n {
        let ready = (0..n).find(|&idx| {
            !done[idx]
                && remaining[idx]
                    .as_ref()
                    .is_some_and(|deps| deps.iter().all(|&dep| done[dep]))
        })?;
        done[ready] = true;
        remaining[ready] = None;
        order.push(ready);
    }
    Some(order)
}

/// Plan initialization for a set of resolved modules.
#[must_use]
pub fn plan_initialization(
    interner: &Interner,
    modules: &[AstModule],
) -> (InitPlan, DiagnosticStream) {
    let mut diags = DiagnosticStream::new();
    let index: IndexMap<PathKey, usize> = modules
        .iter()
        .enumerate()
        .map(|(idx, module)| (path_key(&module.path), idx))
        .collect();

    let mut plan = InitPlan {
        topo_ok: false,
        init_order: Vec::new(),
        modules: modules
            .iter()
            .map(|module| string_of_path(interner, &module.path))
            .collect(),
        type_edges: Vec::with_capacity(modules.len()),
        eager_edges: Vec::with_capacity(modules.len()),
        lazy_edges: Vec::with_capacity(modules.len()),
    };

    for (idx, module) in modules.iter().enumerate() {
        let deps = ModuleDeps::for_module(module, &index, idx);
        plan.type_edges.push(deps.type_deps);
        plan.eager_edges.push(deps.eager_deps);
        plan.lazy_edges.push(deps.lazy_deps);
    }

    match topo_order(&plan.eager_edges) {
        Some(order) => {
            plan.topo_ok = true;
            plan.init_order = order
                .into_iter()
                .map(|idx| plan.modules[idx].clone())
                .collect();
            debug!(modules = plan.modules.len(), "eager graph is acyclic");
        }
        None => {
            plan.topo_ok = false;
            plan.init_order = Vec::new();
            if let Some(diag) = make_diagnostic("E-MOD-1401", None) {
                diags.push(diag);
            }
        }
    }

    (plan, diags)
}

#[cfg(test)]
#[path = "../tests/init.rs"]
mod tests;
