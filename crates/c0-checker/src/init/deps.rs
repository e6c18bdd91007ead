//! Dependency extraction for the init planner.
//!
//! Resolved trees carry canonical module paths, so extraction is a plain
//! collection walk: `PathExpr` heads are value references, nominal type
//! heads are type references. Self-edges are dropped.

use std::rc::Rc;

use c0_syntax::expr::{ApplyArgs, Block, ElseArm, EnumPayload, Expr, ExprNode, Stmt};
use c0_syntax::pattern::{EnumPayloadPattern, Pattern, PatternNode};
use c0_syntax::types::{Type, TypeNode};
use c0_syntax::{
    AstModule, ClassItem, Identifier, Item, PathKey, RecordMember, StateMember, VariantPayload,
    path_key,
};
use indexmap::IndexMap;

/// Sorted, de-duplicated dependency sets for one module.
#[derive(Clone, Debug, Default)]
pub struct ModuleDeps {
    pub type_deps: Vec<usize>,
    pub eager_deps: Vec<usize>,
    pub lazy_deps: Vec<usize>,
}

struct Collector<'a> {
    index: &'a IndexMap<PathKey, usize>,
    own: usize,
    out: Vec<usize>,
}

impl<'a> Collector<'a> {
    fn new(index: &'a IndexMap<PathKey, usize>, own: usize) -> Self {
        Collector {
            index,
            own,
            out: Vec::new(),
        }
    }

    fn add_module(&mut self, path: &[Identifier]) {
        if path.is_empty() {
            return;
        }
        if let Some(&idx) = self.index.get(&path_key(path)) {
            if idx != self.own && !self.out.contains(&idx) {
                self.out.push(idx);
            }
        }
    }

    /// A nominal type path's module is everything before the type name.
    fn add_type_path(&mut self, path: &[Identifier]) {
        if path.len() >= 2 {
            self.add_module(&path[..path.len() - 1]);
        }
    }

    fn finish(mut self) -> Vec<usize> {
        self.out.sort_unstable();
        self.out
    }
}

fn walk_type(ty: &Rc<Type>, types: &mut Collector<'_>) {
    match &ty.node {
        TypeNode::Prim(_)
        | TypeNode::String(_)
        | TypeNode::Bytes(_)
        | TypeNode::SelfType
        | TypeNode::Error => {}
        TypeNode::Path { path, generic_args } => {
            types.add_type_path(path);
            for arg in generic_args {
                walk_type(arg, types);
            }
        }
        TypeNode::Perm { base, .. } => walk_type(base, types),
        TypeNode::Tuple(elems) | TypeNode::Union(elems) => {
            for elem in elems {
                walk_type(elem, types);
            }
        }
        TypeNode::Array { elem, len } => {
            walk_type(elem, types);
            walk_expr_types(len, types);
        }
        TypeNode::Slice(elem) => walk_type(elem, types),
        TypeNode::Func { params, ret } => {
            for param in params {
                walk_type(&param.ty, types);
            }
            walk_type(ret, types);
        }
        TypeNode::Ptr { elem, .. } => walk_type(elem, types),
        TypeNode::RawPtr { elem, .. } => walk_type(elem, types),
        TypeNode::Dynamic(class_path) => types.add_type_path(class_path),
        TypeNode::ModalState {
            path, generic_args, ..
        } => {
            types.add_type_path(path);
            for arg in generic_args {
                walk_type(arg, types);
            }
        }
        TypeNode::Refine { base, pred } => {
            walk_type(base, types);
            walk_expr_types(pred, types);
        }
    }
}

fn walk_pattern_types(pat: &Pattern, types: &mut Collector<'_>) {
    match &pat.node {
        PatternNode::Wildcard | PatternNode::Literal(_) | PatternNode::Ident(_) => {}
        PatternNode::Typed { ty, .. } => walk_type(ty, types),
        PatternNode::Tuple(elems) => {
            for elem in elems {
                walk_pattern_types(elem, types);
            }
        }
        PatternNode::Record { path, fields } => {
            types.add_type_path(path);
            for field in fields {
                if let Some(sub) = &field.pattern {
                    walk_pattern_types(sub, types);
                }
            }
        }
        PatternNode::Enum {
            enum_path, payload, ..
        } => {
            types.add_type_path(enum_path);
            match payload {
                Some(EnumPayloadPattern::Tuple(elems)) => {
                    for elem in elems {
                        walk_pattern_types(elem, types);
                    }
                }
                Some(EnumPayloadPattern::Record(fields)) => {
                    for field in fields {
                        if let Some(sub) = &field.pattern {
                            walk_pattern_types(sub, types);
                        }
                    }
                }
                None => {}
            }
        }
        PatternNode::Modal { path, fields, .. } => {
            types.add_type_path(path);
            if let Some(modal_fields) = fields {
                for field in &modal_fields.fields {
                    if let Some(sub) = &field.pattern {
                        walk_pattern_types(sub, types);
                    }
                }
            }
        }
        PatternNode::Range { lo, hi } => {
            walk_pattern_types(lo, types);
            walk_pattern_types(hi, types);
        }
    }
}

/// Type references reachable from an expression: casts, annotations in
/// nested patterns, and nominal literal heads.
fn walk_expr_types(expr: &Rc<Expr>, types: &mut Collector<'_>) {
    walk_expr(expr, &mut |_| {}, &mut |ty, t| walk_type(ty, t), types);
}

/// Generic expression walk invoking `on_value` for every resolved value
/// reference and `on_type` for every embedded type.
fn walk_expr(
    expr: &Rc<Expr>,
    on_value: &mut impl FnMut(&[Identifier]),
    on_type: &mut impl FnMut(&Rc<Type>, &mut Collector<'_>),
    types: &mut Collector<'_>,
) {
    match &expr.node {
        ExprNode::Literal(_) | ExprNode::Ident(_) | ExprNode::Error => {}
        ExprNode::PathExpr { path, .. } | ExprNode::QualifiedName { path, .. } => {
            on_value(path);
        }
        ExprNode::QualifiedApply { path, args, .. } => {
            on_value(path);
            match args {
                ApplyArgs::Paren(args) => {
                    for arg in args {
                        walk_expr(&arg.value, on_value, on_type, types);
                    }
                }
                ApplyArgs::Record(fields) => {
                    for field in fields {
                        walk_expr(&field.value, on_value, on_type, types);
                    }
                }
            }
        }
        ExprNode::Call { callee, args } => {
            walk_expr(callee, on_value, on_type, types);
            for arg in args {
                walk_expr(&arg.value, on_value, on_type, types);
            }
        }
        ExprNode::MethodCall { base, args, .. } => {
            walk_expr(base, on_value, on_type, types);
            for arg in args {
                walk_expr(&arg.value, on_value, on_type, types);
            }
        }
        ExprNode::RecordExpr { path, fields } => {
            types.add_type_path(path);
            for field in fields {
                walk_expr(&field.value, on_value, on_type, types);
            }
        }
        ExprNode::EnumLiteral {
            enum_path, payload, ..
        } => {
            types.add_type_path(enum_path);
            match payload {
                Some(EnumPayload::Paren(elems)) => {
                    for elem in elems {
                        walk_expr(elem, on_value, on_type, types);
                    }
                }
                Some(EnumPayload::Record(fields)) => {
                    for field in fields {
                        walk_expr(&field.value, on_value, on_type, types);
                    }
                }
                None => {}
            }
        }
        ExprNode::Field { base, .. } => walk_expr(base, on_value, on_type, types),
        ExprNode::Index { base, index } => {
            walk_expr(base, on_value, on_type, types);
            walk_expr(index, on_value, on_type, types);
        }
        ExprNode::Tuple(elems) | ExprNode::ArrayLit(elems) => {
            for elem in elems {
                walk_expr(elem, on_value, on_type, types);
            }
        }
        ExprNode::ArrayRepeat { value, len } => {
            walk_expr(value, on_value, on_type, types);
            walk_expr(len, on_value, on_type, types);
        }
        ExprNode::Unary { operand, .. } => walk_expr(operand, on_value, on_type, types),
        ExprNode::Binary { lhs, rhs, .. } => {
            walk_expr(lhs, on_value, on_type, types);
            walk_expr(rhs, on_value, on_type, types);
        }
        ExprNode::Cast { value, ty } => {
            walk_expr(value, on_value, on_type, types);
            on_type(ty, types);
        }
        ExprNode::Range { lo, hi, .. } => {
            if let Some(lo) = lo {
                walk_expr(lo, on_value, on_type, types);
            }
            if let Some(hi) = hi {
                walk_expr(hi, on_value, on_type, types);
            }
        }
        ExprNode::If {
            cond,
            then_block,
            else_arm,
        } => {
            walk_expr(cond, on_value, on_type, types);
            walk_block(then_block, on_value, on_type, types);
            match else_arm {
                Some(ElseArm::Block(block)) => walk_block(block, on_value, on_type, types),
                Some(ElseArm::If(inner)) => walk_expr(inner, on_value, on_type, types),
                None => {}
            }
        }
        ExprNode::Match { scrutinee, arms } => {
            walk_expr(scrutinee, on_value, on_type, types);
            for arm in arms {
                walk_pattern_types(&arm.pat, types);
                if let Some(guard) = &arm.guard {
                    walk_expr(guard, on_value, on_type, types);
                }
                walk_expr(&arm.body, on_value, on_type, types);
            }
        }
        ExprNode::Loop { body } => walk_block(body, on_value, on_type, types),
        ExprNode::While { cond, body } => {
            walk_expr(cond, on_value, on_type, types);
            walk_block(body, on_value, on_type, types);
        }
        ExprNode::For { pat, iter, body } => {
            walk_pattern_types(pat, types);
            walk_expr(iter, on_value, on_type, types);
            walk_block(body, on_value, on_type, types);
        }
        ExprNode::Block(block) => walk_block(block, on_value, on_type, types),
        ExprNode::Alloc { value, .. } => walk_expr(value, on_value, on_type, types),
        ExprNode::RegionExpr { opts, body, .. } => {
            if let Some(opts) = opts {
                walk_expr(opts, on_value, on_type, types);
            }
            walk_block(body, on_value, on_type, types);
        }
    }
}

fn walk_block(
    block: &Block,
    on_value: &mut impl FnMut(&[Identifier]),
    on_type: &mut impl FnMut(&Rc<Type>, &mut Collector<'_>),
    types: &mut Collector<'_>,
) {
    for stmt in &block.stmts {
        match stmt {
            Stmt::Let { pat, ty, init, .. }
            | Stmt::Var { pat, ty, init, .. }
            | Stmt::ShadowLet { pat, ty, init, .. }
            | Stmt::ShadowVar { pat, ty, init, .. } => {
                walk_pattern_types(pat, types);
                if let Some(ty) = ty {
                    on_type(ty, types);
                }
                walk_expr(init, on_value, on_type, types);
            }
            Stmt::Assign { place, value, .. } | Stmt::CompoundAssign { place, value, .. } => {
                walk_expr(place, on_value, on_type, types);
                walk_expr(value, on_value, on_type, types);
            }
            Stmt::Expr { value, .. } | Stmt::Result { value, .. } => {
                walk_expr(value, on_value, on_type, types);
            }
            Stmt::Defer { body, .. } | Stmt::Unsafe { body, .. } | Stmt::Frame { body, .. } => {
                walk_block(body, on_value, on_type, types);
            }
            Stmt::Region { opts, body, .. } => {
                if let Some(opts) = opts {
                    walk_expr(opts, on_value, on_type, types);
                }
                walk_block(body, on_value, on_type, types);
            }
            Stmt::Return { value, .. } | Stmt::Break { value, .. } => {
                if let Some(value) = value {
                    walk_expr(value, on_value, on_type, types);
                }
            }
            Stmt::Continue { .. } => {}
        }
    }
    if let Some(tail) = &block.tail {
        walk_expr(tail, on_value, on_type, types);
    }
}

/// Collect value-module references from one expression tree.
fn value_refs(expr: &Rc<Expr>, index: &IndexMap<PathKey, usize>, own: usize) -> Vec<usize> {
    let mut values = Collector::new(index, own);
    let mut types = Collector::new(index, own);
    let mut on_value = |path: &[Identifier]| values.add_module(path);
    walk_expr(expr, &mut on_value, &mut |_, _| {}, &mut types);
    values.finish()
}

fn merge_into(target: &mut Vec<usize>, extra: Vec<usize>) {
    for idx in extra {
        if !target.contains(&idx) {
            target.push(idx);
        }
    }
}

impl ModuleDeps {
    /// Extract all three dependency families for one module.
    #[must_use]
    pub fn for_module(
        module: &AstModule,
        index: &IndexMap<PathKey, usize>,
        own: usize,
    ) -> ModuleDeps {
        let mut type_collector = Collector::new(index, own);
        let mut eager = Vec::new();
        let mut lazy = Vec::new();

        for item in &module.items {
            match item {
                Item::Static(decl) => {
                    walk_pattern_types(&decl.binding.pat, &mut type_collector);
                    if let Some(ty) = &decl.binding.ty {
                        walk_type(ty, &mut type_collector);
                    }
                    walk_expr_types(&decl.binding.init, &mut type_collector);
                    merge_into(&mut eager, value_refs(&decl.binding.init, index, own));
                }
                Item::Procedure(decl) => {
                    for param in &decl.params {
                        walk_type(&param.ty, &mut type_collector);
                    }
                    if let Some(ret) = &decl.ret {
                        walk_type(ret, &mut type_collector);
                    }
                    if let Some(body) = &decl.body {
                        let body_expr = Expr::new(
                            ExprNode::Block(Rc::clone(body)),
                            body.span,
                        );
                        walk_expr_types(&body_expr, &mut type_collector);
                        merge_into(&mut lazy, value_refs(&body_expr, index, own));
                    }
                }
                Item::Record(decl) => {
                    for member in &decl.members {
                        match member {
                            RecordMember::Field(field) => {
                                walk_type(&field.ty, &mut type_collector);
                                if let Some(init) = &field.init {
                                    walk_expr_types(init, &mut type_collector);
                                    merge_into(&mut lazy, value_refs(init, index, own));
                                }
                            }
                            RecordMember::Method(method) => {
                                for param in &method.params {
                                    walk_type(&param.ty, &mut type_collector);
                                }
                                if let Some(ret) = &method.ret {
                                    walk_type(ret, &mut type_collector);
                                }
                                if let Some(body) = &method.body {
                                    let body_expr =
                                        Expr::new(ExprNode::Block(Rc::clone(body)), body.span);
                                    walk_expr_types(&body_expr, &mut type_collector);
                                    merge_into(&mut lazy, value_refs(&body_expr, index, own));
                                }
                            }
                        }
                    }
                }
                Item::Enum(decl) => {
                    for variant in &decl.variants {
                        match &variant.payload {
                            Some(VariantPayload::Tuple(elems)) => {
                                for elem in elems {
                                    walk_type(elem, &mut type_collector);
                                }
                            }
                            Some(VariantPayload::Record(fields)) => {
                                for field in fields {
                                    walk_type(&field.ty, &mut type_collector);
                                }
                            }
                            None => {}
                        }
                    }
                }
                Item::Modal(decl) => {
                    for state in &decl.states {
                        for member in &state.members {
                            match member {
                                StateMember::Field(field) => {
                                    walk_type(&field.ty, &mut type_collector);
                                }
                                StateMember::Method(method) => {
                                    for param in &method.params {
                                        walk_type(&param.ty, &mut type_collector);
                                    }
                                    if let Some(ret) = &method.ret {
                                        walk_type(ret, &mut type_collector);
                                    }
                                    if let Some(body) = &method.body {
                                        let body_expr =
                                            Expr::new(ExprNode::Block(Rc::clone(body)), body.span);
                                        merge_into(&mut lazy, value_refs(&body_expr, index, own));
                                    }
                                }
                                StateMember::Transition(transition) => {
                                    for param in &transition.params {
                                        walk_type(&param.ty, &mut type_collector);
                                    }
                                    if let Some(body) = &transition.body {
                                        let body_expr =
                                            Expr::new(ExprNode::Block(Rc::clone(body)), body.span);
                                        merge_into(&mut lazy, value_refs(&body_expr, index, own));
                                    }
                                }
                            }
                        }
                    }
                }
                Item::Class(decl) => {
                    for class_item in &decl.items {
                        match class_item {
                            ClassItem::Method(method) => {
                                for param in &method.params {
                                    walk_type(&param.ty, &mut type_collector);
                                }
                                if let Some(ret) = &method.ret {
                                    walk_type(ret, &mut type_collector);
                                }
                                if let Some(body) = &method.body {
                                    let body_expr =
                                        Expr::new(ExprNode::Block(Rc::clone(body)), body.span);
                                    merge_into(&mut lazy, value_refs(&body_expr, index, own));
                                }
                            }
                            ClassItem::Field(field) => {
                                walk_type(&field.ty, &mut type_collector);
                            }
                            ClassItem::AssociatedType(_) | ClassItem::AbstractState(_) => {}
                        }
                    }
                }
                Item::TypeAlias(decl) => walk_type(&decl.ty, &mut type_collector),
                Item::Using(_) | Item::Error(_) => {}
            }
        }

        let mut deps = ModuleDeps {
            type_deps: type_collector.finish(),
            eager_deps: eager,
            lazy_deps: lazy,
        };
        deps.eager_deps.sort_unstable();
        deps.lazy_deps.sort_unstable();
        deps
    }
}
