//! The analysis orchestrator.
//!
//! One entry point: populate Σ, collect name maps to the fixed point,
//! validate module names and top-level visibility, resolve every module,
//! run the memory model, and plan initialization. Warnings never
//! short-circuit; every pass appends to one diagnostic stream.

use std::rc::Rc;

use c0_binder::resolve::{ResolveContext, resolve_module};
use c0_binder::{ScopeContext, collect_name_maps, validate_module_names};
use c0_common::codes::default_code;
use c0_common::{DiagnosticStream, Interner, NullSink, TraceSink, compile_status, make_diagnostic};
use c0_common::diagnostics::CompileStatus;
use c0_syntax::{AstModule, Item, ModulePath, full_type_path, path_key};
use c0_solver::{ClassEngine, check_impl_completeness, populate_sigma};
use tracing::{debug, info_span};

use crate::init::{InitPlan, plan_initialization};
use crate::memory::regions::check_module_memory;

/// Everything `analyze` produces.
#[derive(Clone, Debug)]
pub struct Analysis {
    /// Resolved modules; a module that failed resolution passes through
    /// in its parsed form.
    pub modules: Vec<AstModule>,
    pub diags: DiagnosticStream,
    pub init_plan: InitPlan,
}

impl Analysis {
    #[must_use]
    pub fn status(&self) -> CompileStatus {
        compile_status(&self.diags)
    }
}

fn emit_rule(diags: &mut DiagnosticStream, diag_id: &str, span: Option<c0_common::Span>) {
    if let Some(code) = default_code(diag_id) {
        if let Some(diag) = make_diagnostic(code, span) {
            diags.push(diag);
        }
    }
}

/// Analyze a parsed project.
#[must_use]
pub fn analyze(
    interner: Rc<Interner>,
    modules: Vec<AstModule>,
    trace: Rc<dyn TraceSink>,
) -> Analysis {
    let span = info_span!("analyze", modules = modules.len());
    let _guard = span.enter();

    let mut diags = DiagnosticStream::new();

    // Phase 1: Σ, built-ins first.
    let sigma = Rc::new(populate_sigma(&interner, modules));

    // Phase 2: name maps to the fixed point.
    let mut collect_ctx = ScopeContext::for_module(
        Rc::clone(&sigma),
        Rc::clone(&interner),
        ModulePath::new(),
        c0_binder::Scope::new(),
    )
    .with_trace(Rc::clone(&trace));
    let collected = collect_name_maps(&mut collect_ctx);
    diags.extend(collected.diags.iter().cloned());
    let name_maps = collected.name_maps;

    // Phase 3: module-name validation and visibility.
    for module in &sigma.mods {
        collect_ctx.current_module = module.path.clone();
        if let Some(names) = name_maps.get(&path_key(&module.path)) {
            let validated = validate_module_names(&collect_ctx, names);
            if let Some(diag_id) = validated.diag_id {
                emit_rule(&mut diags, diag_id, Some(module.span));
            }
        }
        let vis_diags = c0_binder::check_module_visibility(&collect_ctx, module);
        diags.extend(vis_diags);
    }

    // Phase 4: functional resolution rewrite.
    let mut resolved_modules = Vec::with_capacity(sigma.mods.len());
    for module in &sigma.mods {
        let mut ctx = ResolveContext::for_module(
            Rc::clone(&sigma),
            Rc::clone(&interner),
            name_maps.clone(),
            &module.path,
        )
        .with_trace(Rc::clone(&trace));
        match resolve_module(&mut ctx, module) {
            Ok(resolved) => resolved_modules.push(resolved.module),
            Err(err) => {
                emit_rule(&mut diags, err.diag_id, err.span);
                resolved_modules.push(module.clone());
            }
        }
    }
    debug!(resolved = resolved_modules.len(), "resolution finished");

    // Phase 5: class hierarchy and implementation completeness.
    let engine = ClassEngine::new(Rc::clone(&sigma));
    for module in &sigma.mods {
        for item in &module.items {
            let (name, implements, span) = match item {
                Item::Record(decl) => (decl.name, &decl.implements, decl.span),
                Item::Enum(decl) => (decl.name, &decl.implements, decl.span),
                Item::Modal(decl) => (decl.name, &decl.implements, decl.span),
                _ => continue,
            };
            let type_path = full_type_path(&module.path, name);
            for class_path in implements {
                // Classes referenced by a form Σ does not key (for
                // example unqualified same-module names) are left to the
                // resolver's own diagnostics.
                if sigma.class_decl(class_path).is_none() {
                    continue;
                }
                let linearized = engine.linearize(class_path);
                if !linearized.ok {
                    if let Some(diag_id) = linearized.diag_id {
                        emit_rule(&mut diags, diag_id, Some(span));
                    }
                    continue;
                }
                let completeness = check_impl_completeness(&engine, &type_path, class_path);
                if !completeness.ok {
                    let Some(&class_tail) = class_path.last() else {
                        continue;
                    };
                    let class_name = interner.resolve(class_tail);
                    if let Some(diag) = c0_common::diagnostics::make_diagnostic_with(
                        "E-TYP-1501",
                        Some(span),
                        &[("class", &class_name)],
                    ) {
                        diags.push(diag);
                    }
                }
            }
        }
    }

    // Phase 6: memory and lifetime analysis.
    for module in &resolved_modules {
        diags.extend(check_module_memory(module));
    }

    // Phase 7: initialization planning.
    let (init_plan, init_diags) = plan_initialization(&interner, &resolved_modules);
    diags.extend(init_diags);

    Analysis {
        modules: resolved_modules,
        diags,
        init_plan,
    }
}

/// Analyze without spec-trace capture.
#[must_use]
pub fn analyze_quiet(interner: Rc<Interner>, modules: Vec<AstModule>) -> Analysis {
    analyze(interner, modules, Rc::new(NullSink))
}
