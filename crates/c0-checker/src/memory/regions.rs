//! Region, frame, provenance, and escape analysis.
//!
//! Every allocation's owning region is tracked as provenance. Pointers
//! are `Valid` while their region is live and `Expired` after it exits;
//! a pointer leaving its region (through a return or a region result) is
//! an escape. Frames subdivide regions and inherit their provenance.
//! Regions are numbered in creation order, so a smaller id always means
//! an outer (wider) region.

use c0_common::{DiagnosticStream, Span, make_diagnostic};
use c0_syntax::expr::{Block, ElseArm, ExprNode, ExprPtr, Stmt};
use c0_syntax::{AstModule, Identifier, Item, pat_names};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

type RegionId = usize;

struct RegionAnalysis {
    diags: DiagnosticStream,
    next_region: RegionId,
    /// Innermost-last stack of live regions.
    active: Vec<RegionId>,
    exited: FxHashSet<RegionId>,
    /// Region aliases in scope, innermost last.
    aliases: Vec<(Identifier, RegionId)>,
    /// Bindings per lexical scope, innermost last. Every declaration gets
    /// an entry, provenance-free ones included, so assignments made from
    /// nested scopes can find and update the declaring scope.
    env: Vec<FxHashMap<Identifier, Option<RegionId>>>,
}

impl RegionAnalysis {
    fn new() -> Self {
        RegionAnalysis {
            diags: DiagnosticStream::new(),
            next_region: 0,
            active: Vec::new(),
            exited: FxHashSet::default(),
            aliases: Vec::new(),
            env: vec![FxHashMap::default()],
        }
    }

    fn emit(&mut self, code: &str, span: Span) {
        if let Some(diag) = make_diagnostic(code, Some(span)) {
            self.diags.push(diag);
        }
    }

    fn current_region(&self) -> Option<RegionId> {
        self.active.last().copied()
    }

    fn alias_region(&self, name: Identifier) -> Option<RegionId> {
        self.aliases
            .iter()
            .rev()
            .find(|(alias, _)| *alias == name)
            .map(|&(_, id)| id)
    }

    fn lookup(&self, name: Identifier) -> Option<RegionId> {
        self.env
            .iter()
            .rev()
            .find_map(|scope| scope.get(&name).copied())
            .flatten()
    }

    /// Introduce a binding in the current scope.
    fn declare(&mut self, name: Identifier, provenance: Option<RegionId>) {
        if let Some(scope) = self.env.last_mut() {
            scope.insert(name, provenance);
        }
    }

    /// Update the scope that already holds `name`; the binding's
    /// provenance must survive the exit of whatever nested scope the
    /// assignment happened in. Unseen names fall back to the current
    /// scope.
    fn bind(&mut self, name: Identifier, provenance: Option<RegionId>) {
        for scope in self.env.iter_mut().rev() {
            if let Some(slot) = scope.get_mut(&name) {
                *slot = provenance;
                return;
            }
        }
        self.declare(name, provenance);
    }

    /// Widest-region unification: outer regions have smaller ids.
    fn unify(a: Option<RegionId>, b: Option<RegionId>) -> Option<RegionId> {
        match (a, b) {
            (Some(x), Some(y)) => Some(x.min(y)),
            (Some(x), None) | (None, Some(x)) => Some(x),
            (None, None) => None,
        }
    }

    /// Provenance of an expression's value, checking allocations and
    /// expired uses along the way.
    fn provenance_of(&mut self, expr: &ExprPtr) -> Option<RegionId> {
        match &expr.node {
            ExprNode::Alloc { region, value } => {
                self.walk_expr(value);
                match region {
                    Some(alias) => match self.alias_region(*alias) {
                        Some(id) => Some(id),
                        None => {
                            self.emit("E-REG-0005", expr.span);
                            None
                        }
                    },
                    None => match self.current_region() {
                        Some(id) => Some(id),
                        None => {
                            self.emit("E-REG-0001", expr.span);
                            None
                        }
                    },
                }
            }
            ExprNode::Ident(name) => self.lookup(*name),
            ExprNode::Block(block) => self.walk_block_value(block),
            ExprNode::RegionExpr { alias, opts, body } => {
                if let Some(opts) = opts {
                    self.walk_expr(opts);
                }
                let id = self.enter_region(*alias);
                let result = self.walk_block_value(body);
                self.exit_region(id, alias.is_some());
                // A result allocated in this region carries provenance of
                // an already-exited region; uses surface as escapes.
                result
            }
            ExprNode::If {
                cond,
                then_block,
                else_arm,
            } => {
                self.walk_expr(cond);
                let then_prov = self.walk_block_value(then_block);
                let else_prov = match else_arm {
                    Some(ElseArm::Block(block)) => self.walk_block_value(block),
                    Some(ElseArm::If(inner)) => self.provenance_of(inner),
                    None => None,
                };
                Self::unify(then_prov, else_prov)
            }
            ExprNode::Match { scrutinee, arms } => {
                self.walk_expr(scrutinee);
                let mut result = None;
                for arm in arms {
                    self.push_scope();
                    for name in pat_names(&arm.pat) {
                        self.declare(name, None);
                    }
                    if let Some(guard) = &arm.guard {
                        self.walk_expr(guard);
                    }
                    let arm_prov = self.provenance_of(&arm.body);
                    self.pop_scope();
                    result = Self::unify(result, arm_prov);
                }
                result
            }
            _ => {
                self.walk_expr(expr);
                None
            }
        }
    }

    /// Flag a use of an expired pointer.
    fn check_live_use(&mut self, expr: &ExprPtr) {
        if let ExprNode::Ident(name) = &expr.node {
            if let Some(region) = self.lookup(*name) {
                if self.exited.contains(&region) {
                    self.emit("E-REG-0003", expr.span);
                }
            }
        }
    }

    fn walk_expr(&mut self, expr: &ExprPtr) {
        match &expr.node {
            ExprNode::Literal(_)
            | ExprNode::Ident(_)
            | ExprNode::PathExpr { .. }
            | ExprNode::QualifiedName { .. }
            | ExprNode::Error => {}
            ExprNode::Alloc { .. } | ExprNode::RegionExpr { .. } => {
                let _ = self.provenance_of(expr);
            }
            ExprNode::QualifiedApply { args, .. } => match args {
                c0_syntax::ApplyArgs::Paren(args) => {
                    for arg in args {
                        self.walk_expr(&arg.value);
                    }
                }
                c0_syntax::ApplyArgs::Record(fields) => {
                    for field in fields {
                        self.walk_expr(&field.value);
                    }
                }
            },
            ExprNode::Call { callee, args } => {
                self.walk_expr(callee);
                for arg in args {
                    self.walk_expr(&arg.value);
                }
            }
            ExprNode::MethodCall { base, args, .. } => {
                self.check_live_use(base);
                self.walk_expr(base);
                for arg in args {
                    self.walk_expr(&arg.value);
                }
            }
            ExprNode::RecordExpr { fields, .. } => {
                for field in fields {
                    self.walk_expr(&field.value);
                }
            }
            ExprNode::EnumLiteral { payload, .. } => match payload {
                Some(c0_syntax::EnumPayload::Paren(elems)) => {
                    for elem in elems {
                        self.walk_expr(elem);
                    }
                }
                Some(c0_syntax::EnumPayload::Record(fields)) => {
                    for field in fields {
                        self.walk_expr(&field.value);
                    }
                }
                None => {}
            },
            ExprNode::Field { base, .. } => {
                self.check_live_use(base);
                self.walk_expr(base);
            }
            ExprNode::Index { base, index } => {
                self.check_live_use(base);
                self.walk_expr(base);
                self.walk_expr(index);
            }
            ExprNode::Tuple(elems) | ExprNode::ArrayLit(elems) => {
                for elem in elems {
                    self.walk_expr(elem);
                }
            }
            ExprNode::ArrayRepeat { value, len } => {
                self.walk_expr(value);
                self.walk_expr(len);
            }
            ExprNode::Unary { op, operand } => {
                if matches!(op, c0_syntax::UnaryOp::Deref) {
                    self.check_live_use(operand);
                }
                self.walk_expr(operand);
            }
            ExprNode::Binary { lhs, rhs, .. } => {
                self.walk_expr(lhs);
                self.walk_expr(rhs);
            }
            ExprNode::Cast { value, .. } => self.walk_expr(value),
            ExprNode::Range { lo, hi, .. } => {
                if let Some(lo) = lo {
                    self.walk_expr(lo);
                }
                if let Some(hi) = hi {
                    self.walk_expr(hi);
                }
            }
            ExprNode::If { .. } | ExprNode::Match { .. } | ExprNode::Block(_) => {
                let _ = self.provenance_of(expr);
            }
            ExprNode::Loop { body } => self.walk_block(body),
            ExprNode::While { cond, body } => {
                self.walk_expr(cond);
                self.walk_block(body);
            }
            ExprNode::For { pat, iter, body } => {
                self.walk_expr(iter);
                self.push_scope();
                for name in pat_names(pat) {
                    self.declare(name, None);
                }
                self.walk_block(body);
                self.pop_scope();
            }
        }
    }

    fn push_scope(&mut self) {
        self.env.push(FxHashMap::default());
    }

    fn pop_scope(&mut self) {
        self.env.pop();
    }

    fn enter_region(&mut self, alias: Option<Identifier>) -> RegionId {
        let id = self.next_region;
        self.next_region += 1;
        self.active.push(id);
        if let Some(alias) = alias {
            self.aliases.push((alias, id));
        }
        id
    }

    fn exit_region(&mut self, id: RegionId, aliased: bool) {
        self.active.pop();
        self.exited.insert(id);
        if aliased {
            self.aliases.pop();
        }
    }

    /// Walk a block, returning the provenance of its tail value.
    fn walk_block_value(&mut self, block: &Block) -> Option<RegionId> {
        self.push_scope();
        for stmt in &block.stmts {
            self.walk_stmt(stmt);
        }
        let result = block.tail.as_ref().and_then(|tail| self.provenance_of(tail));
        self.pop_scope();
        result
    }

    fn walk_block(&mut self, block: &Block) {
        let _ = self.walk_block_value(block);
    }

    /// Walk a procedure or method body. The implicit tail value leaves
    /// the body exactly like an explicit return, so region-owned
    /// provenance on it is an escape.
    fn walk_body(&mut self, body: &Block) {
        let provenance = self.walk_block_value(body);
        if provenance.is_some() {
            let span = body.tail.as_ref().map_or(body.span, |tail| tail.span);
            self.emit("E-REG-0002", span);
        }
    }

    fn walk_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Let { pat, init, .. }
            | Stmt::Var { pat, init, .. }
            | Stmt::ShadowLet { pat, init, .. }
            | Stmt::ShadowVar { pat, init, .. } => {
                let provenance = self.provenance_of(init);
                for name in pat_names(pat) {
                    self.declare(name, provenance);
                }
            }
            Stmt::Assign { place, value, .. } => {
                let provenance = self.provenance_of(value);
                if let ExprNode::Ident(name) = &place.node {
                    let merged = Self::unify(self.lookup(*name), provenance);
                    self.bind(*name, merged);
                } else {
                    self.walk_expr(place);
                }
            }
            Stmt::CompoundAssign { place, value, .. } => {
                self.walk_expr(place);
                self.walk_expr(value);
            }
            Stmt::Expr { value, .. } | Stmt::Result { value, .. } => self.walk_expr(value),
            Stmt::Defer { body, .. } => {
                // Defer bodies run at scope exit; they may allocate but
                // their results cannot leave the region.
                self.walk_block(body);
            }
            Stmt::Region {
                alias, opts, body, ..
            } => {
                if let Some(opts) = opts {
                    self.walk_expr(opts);
                }
                let id = self.enter_region(*alias);
                self.walk_block(body);
                self.exit_region(id, alias.is_some());
            }
            Stmt::Frame { target, body, span } => {
                if self.active.is_empty() {
                    self.emit("E-REG-0004", *span);
                }
                if let Some(target) = target {
                    if self.alias_region(*target).is_none() {
                        self.emit("E-REG-0005", *span);
                    }
                }
                // A frame shares its parent region's provenance.
                self.walk_block(body);
            }
            Stmt::Return { value, span } => {
                if let Some(value) = value {
                    let provenance = self.provenance_of(value);
                    if provenance.is_some() {
                        self.emit("E-REG-0002", *span);
                    }
                }
            }
            Stmt::Break { value, .. } => {
                if let Some(value) = value {
                    self.walk_expr(value);
                }
            }
            Stmt::Continue { .. } => {}
            Stmt::Unsafe { body, .. } => self.walk_block(body),
        }
    }
}

fn walk_item(analysis: &mut RegionAnalysis, item: &Item) {
    match item {
        Item::Static(decl) => analysis.walk_expr(&decl.binding.init),
        Item::Procedure(decl) => {
            if let Some(body) = &decl.body {
                analysis.walk_body(body);
            }
        }
        Item::Record(decl) => {
            for member in &decl.members {
                match member {
                    c0_syntax::RecordMember::Field(field) => {
                        if let Some(init) = &field.init {
                            analysis.walk_expr(init);
                        }
                    }
                    c0_syntax::RecordMember::Method(method) => {
                        if let Some(body) = &method.body {
                            analysis.walk_body(body);
                        }
                    }
                }
            }
        }
        Item::Modal(decl) => {
            for state in &decl.states {
                for member in &state.members {
                    match member {
                        c0_syntax::StateMember::Method(method) => {
                            if let Some(body) = &method.body {
                                analysis.walk_body(body);
                            }
                        }
                        c0_syntax::StateMember::Transition(transition) => {
                            if let Some(body) = &transition.body {
                                analysis.walk_body(body);
                            }
                        }
                        c0_syntax::StateMember::Field(_) => {}
                    }
                }
            }
        }
        Item::Class(decl) => {
            for class_item in &decl.items {
                if let c0_syntax::ClassItem::Method(method) = class_item {
                    if let Some(body) = &method.body {
                        analysis.walk_body(body);
                    }
                }
            }
        }
        Item::Using(_) | Item::Enum(_) | Item::TypeAlias(_) | Item::Error(_) => {}
    }
}

/// Run region/frame/provenance analysis over a resolved module.
#[must_use]
pub fn check_module_memory(module: &AstModule) -> DiagnosticStream {
    let mut analysis = RegionAnalysis::new();
    for item in &module.items {
        walk_item(&mut analysis, item);
    }
    debug!(
        regions = analysis.next_region,
        diags = analysis.diags.len(),
        "memory analysis finished"
    );
    analysis.diags
}

#[cfg(test)]
#[path = "../tests/regions.rs"]
mod tests;
