//! Name resolution, type checking and slot assignment.
use super::{
    scope::{FunSig, ScopeStack, Symbol},
    Annotations, VarSite,
};
use crate::{
    ast::{
        AssignStmt, BinOp, Block, Expr, ExprKind, ForStmt, FunDecl, IfStmt, LetInit, LetStmt,
        Program, ReturnStmt, Stmt, Type, TypeSpec, UnOp, WhileStmt,
    },
    diag::{DiagnosticKind, Diagnostics},
};

pub(super) struct Analyzer<'d> {
    scopes: ScopeStack,
    diag: &'d mut Diagnostics,
    notes: Annotations,
    /// Next free slot in the call frame being checked.
    next_slot: usize,
    /// Declared return type of the enclosing function; `None` in the
    /// entry sequence.
    current_ret: Option<Type>,
}

impl<'d> Analyzer<'d> {
    pub(super) fn new(node_count: u32, diag: &'d mut Diagnostics) -> Self {
        Self {
            scopes: ScopeStack::new(),
            diag,
            notes: Annotations::new(node_count),
            next_slot: 0,
            current_ret: None,
        }
    }

    pub(super) fn into_annotations(self) -> Annotations {
        self.notes
    }

    pub(super) fn run(&mut self, program: &Program) {
        // Pass 1: register every function signature so forward
        // references resolve.
        for stmt in &program.stmts {
            if let Stmt::Fun(fun) = stmt {
                // The entry sequence owns the `main` label.
                if fun.name == "main" {
                    self.error(
                        DiagnosticKind::Semantic,
                        fun.line,
                        "function name 'main' is reserved for the entry sequence",
                    );
                    continue;
                }
                let sig = FunSig {
                    params: fun.params.iter().map(|p| p.ty).collect(),
                    ret: fun.ret,
                };
                if self
                    .scopes
                    .declare(fun.name.clone(), Symbol::Function { sig })
                    .is_err()
                {
                    self.error(
                        DiagnosticKind::NameResolution,
                        fun.line,
                        format!("function '{}' is already declared", fun.name),
                    );
                }
            }
        }

        // Pass 2: check bodies and the entry sequence in source order.
        for stmt in &program.stmts {
            match stmt {
                Stmt::Fun(fun) => self.check_function(fun),
                other => self.check_stmt(other),
            }
        }

        self.notes.entry_slots = self.next_slot;
    }

    fn error(&mut self, kind: DiagnosticKind, line: u32, message: impl ToString) {
        self.diag.report(kind, line, message);
    }

    // ------------------------------------------------------------------------
    // Statements

    fn check_function(&mut self, fun: &FunDecl) {
        let entry_slot = std::mem::replace(&mut self.next_slot, 0);
        self.current_ret = Some(fun.ret);
        self.scopes.enter_function();

        for param in &fun.params {
            let slot = self.alloc_slots(1);
            if self
                .scopes
                .declare(
                    param.name.clone(),
                    Symbol::Parameter {
                        ty: param.ty,
                        slot,
                    },
                )
                .is_err()
            {
                self.error(
                    DiagnosticKind::NameResolution,
                    param.line,
                    format!("parameter '{}' is already declared", param.name),
                );
            }
        }

        self.check_block(&fun.body);

        self.scopes.leave_function();
        self.current_ret = None;

        self.notes.frames.insert(fun.name.clone(), self.next_slot);
        self.next_slot = entry_slot;

        if !block_returns(&fun.body) {
            self.error(
                DiagnosticKind::Semantic,
                fun.line,
                format!("function '{}' does not return a value on every path", fun.name),
            );
        }
    }

    fn check_block(&mut self, block: &Block) {
        self.scopes.push();
        for stmt in &block.stmts {
            self.check_stmt(stmt);
        }
        self.scopes.pop();
    }

    fn check_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Let(stmt) => self.check_let(stmt),
            Stmt::Assign(stmt) => self.check_assign(stmt),
            Stmt::If(stmt) => self.check_if(stmt),
            Stmt::While(stmt) => self.check_while(stmt),
            Stmt::For(stmt) => self.check_for(stmt),
            Stmt::Return(stmt) => self.check_return(stmt),
            Stmt::Block(block) => self.check_block(block),
            Stmt::Expr(expr) => {
                self.check_expr(expr);
            }
            Stmt::Fun(fun) => {
                // The parser only produces function declarations at the
                // top level, which `run` dispatches directly.
                debug_assert!(false, "nested function declaration: {}", fun.name);
            }
            Stmt::Print(expr) => {
                self.check_expr(expr);
            }
            Stmt::Delay(expr) => self.check_builtin_operand(expr, Type::Int, "__delay"),
            Stmt::Clear(expr) => self.check_builtin_operand(expr, Type::Colour, "__clear"),
            Stmt::Write([x, y, colour]) => {
                self.check_builtin_operand(x, Type::Int, "__write");
                self.check_builtin_operand(y, Type::Int, "__write");
                self.check_builtin_operand(colour, Type::Colour, "__write");
            }
            Stmt::WriteBox([x, y, w, h, colour]) => {
                self.check_builtin_operand(x, Type::Int, "__write_box");
                self.check_builtin_operand(y, Type::Int, "__write_box");
                self.check_builtin_operand(w, Type::Int, "__write_box");
                self.check_builtin_operand(h, Type::Int, "__write_box");
                self.check_builtin_operand(colour, Type::Colour, "__write_box");
            }
        }
    }

    fn check_builtin_operand(&mut self, expr: &Expr, expected: Type, builtin: &str) {
        if let Some(found) = self.check_expr(expr) {
            if found != expected {
                self.error(
                    DiagnosticKind::Type,
                    expr.line,
                    format!("'{}' expects '{}', found '{}'", builtin, expected, found),
                );
            }
        }
    }

    fn check_let(&mut self, stmt: &LetStmt) {
        // The initializer is checked before the name is visible, so a
        // declaration cannot read itself.
        match (&stmt.init, stmt.ty) {
            (LetInit::Scalar(expr), TypeSpec::Scalar(declared)) => {
                if let Some(found) = self.check_expr(expr) {
                    if found != declared {
                        self.error(
                            DiagnosticKind::Type,
                            stmt.line,
                            format!(
                                "cannot initialise '{}' of type '{}' with '{}'",
                                stmt.name, declared, found
                            ),
                        );
                    }
                }
            }
            (LetInit::Array(elements), TypeSpec::Array(element_ty, size)) => {
                if elements.len() != size {
                    self.error(
                        DiagnosticKind::Type,
                        stmt.line,
                        format!(
                            "array '{}' declares {} elements but the initializer has {}",
                            stmt.name,
                            size,
                            elements.len()
                        ),
                    );
                }
                for element in elements {
                    if let Some(found) = self.check_expr(element) {
                        if found != element_ty {
                            self.error(
                                DiagnosticKind::Type,
                                element.line,
                                format!(
                                    "array '{}' holds '{}', found element of type '{}'",
                                    stmt.name, element_ty, found
                                ),
                            );
                        }
                    }
                }
            }
            // The parser pairs scalar declarations with scalar
            // initializers and arrays with bracketed lists.
            _ => unreachable!("mismatched let shape"),
        }

        let slot = self.alloc_slots(stmt.ty.slot_count());
        self.notes.set_site(stmt.id, VarSite { slot, global: false });

        if self
            .scopes
            .declare(stmt.name.clone(), Symbol::Variable { ty: stmt.ty, slot })
            .is_err()
        {
            self.error(
                DiagnosticKind::NameResolution,
                stmt.line,
                format!("'{}' is already declared in this scope", stmt.name),
            );
        }
    }

    fn check_assign(&mut self, stmt: &AssignStmt) {
        let value_ty = self.check_expr(&stmt.value);
        if let Some(index) = &stmt.index {
            self.check_index_expr(index);
        }

        let (target_ty, site) = match self.scopes.resolve(&stmt.name) {
            None => {
                self.error(
                    DiagnosticKind::NameResolution,
                    stmt.line,
                    format!("'{}' is not declared", stmt.name),
                );
                return;
            }
            Some(resolved) => match resolved.symbol {
                Symbol::Function { .. } => {
                    self.error(
                        DiagnosticKind::Semantic,
                        stmt.line,
                        format!("cannot assign to function '{}'", stmt.name),
                    );
                    return;
                }
                Symbol::Parameter { ty, slot } => {
                    if stmt.index.is_some() {
                        self.error(
                            DiagnosticKind::Type,
                            stmt.line,
                            format!("'{}' is not an array", stmt.name),
                        );
                        return;
                    }
                    (
                        ty,
                        VarSite {
                            slot,
                            global: resolved.global,
                        },
                    )
                }
                Symbol::Variable { ty, slot } => {
                    let site = VarSite {
                        slot,
                        global: resolved.global,
                    };
                    match (ty, stmt.index.is_some()) {
                        (TypeSpec::Scalar(ty), false) => (ty, site),
                        (TypeSpec::Array(ty, _), true) => (ty, site),
                        (TypeSpec::Array(..), false) => {
                            self.error(
                                DiagnosticKind::Type,
                                stmt.line,
                                format!("array '{}' must be assigned through an index", stmt.name),
                            );
                            return;
                        }
                        (TypeSpec::Scalar(_), true) => {
                            self.error(
                                DiagnosticKind::Type,
                                stmt.line,
                                format!("'{}' is not an array", stmt.name),
                            );
                            return;
                        }
                    }
                }
            },
        };

        self.notes.set_site(stmt.id, site);

        if let Some(found) = value_ty {
            if found != target_ty {
                self.error(
                    DiagnosticKind::Type,
                    stmt.line,
                    format!(
                        "cannot assign '{}' to '{}' of type '{}'",
                        found, stmt.name, target_ty
                    ),
                );
            }
        }
    }

    fn check_if(&mut self, stmt: &IfStmt) {
        self.check_condition(&stmt.cond);
        self.check_block(&stmt.then_block);
        if let Some(else_block) = &stmt.else_block {
            self.check_block(else_block);
        }
    }

    fn check_while(&mut self, stmt: &WhileStmt) {
        self.check_condition(&stmt.cond);
        self.check_block(&stmt.body);
    }

    fn check_for(&mut self, stmt: &ForStmt) {
        // The header gets its own scope so the loop variable does not
        // leak, but its slot still lives in the enclosing frame.
        self.scopes.push();
        if let Some(init) = &stmt.init {
            self.check_stmt(init);
        }
        if let Some(cond) = &stmt.cond {
            self.check_condition(cond);
        }
        if let Some(step) = &stmt.step {
            self.check_stmt(step);
        }
        self.check_block(&stmt.body);
        self.scopes.pop();
    }

    fn check_condition(&mut self, cond: &Expr) {
        if let Some(found) = self.check_expr(cond) {
            if found != Type::Bool {
                self.error(
                    DiagnosticKind::Type,
                    cond.line,
                    format!("condition must be 'bool', found '{}'", found),
                );
            }
        }
    }

    fn check_return(&mut self, stmt: &ReturnStmt) {
        let value_ty = self.check_expr(&stmt.value);
        match self.current_ret {
            None => self.error(
                DiagnosticKind::Semantic,
                stmt.line,
                "return outside of a function",
            ),
            Some(declared) => {
                if let Some(found) = value_ty {
                    if found != declared {
                        self.error(
                            DiagnosticKind::Type,
                            stmt.line,
                            format!(
                                "return type mismatch: expected '{}', found '{}'",
                                declared, found
                            ),
                        );
                    }
                }
            }
        }
    }

    // ------------------------------------------------------------------------
    // Expressions

    /// Type an expression, record it in the annotations, and return it.
    /// `None` means a diagnostic was already reported below; callers
    /// stay quiet to avoid cascading errors.
    fn check_expr(&mut self, expr: &Expr) -> Option<Type> {
        let ty = match &expr.kind {
            ExprKind::Int(_) => Some(Type::Int),
            ExprKind::Float(_) => Some(Type::Float),
            ExprKind::Bool(_) => Some(Type::Bool),
            ExprKind::Colour(_) => Some(Type::Colour),
            ExprKind::Var(name) => self.check_var(expr, name),
            ExprKind::Index(name, index) => self.check_index(expr, name, index),
            ExprKind::Call(name, args) => self.check_call(expr, name, args),
            ExprKind::Unary(op, operand) => self.check_unary(expr, *op, operand),
            ExprKind::Binary(op, lhs, rhs) => self.check_binary(expr, *op, lhs, rhs),
            ExprKind::Cast(operand, target) => self.check_cast(expr, operand, *target),
            ExprKind::Width | ExprKind::Height => Some(Type::Int),
            ExprKind::RandomInt(bound) => {
                self.check_index_expr(bound);
                Some(Type::Int)
            }
            ExprKind::ReadPixel(x, y) => {
                self.check_index_expr(x);
                self.check_index_expr(y);
                Some(Type::Colour)
            }
        };

        if let Some(ty) = ty {
            self.notes.set_type(expr.id, ty);
        }
        ty
    }

    /// Check a subexpression that must be an `int`.
    fn check_index_expr(&mut self, expr: &Expr) {
        if let Some(found) = self.check_expr(expr) {
            if found != Type::Int {
                self.error(
                    DiagnosticKind::Type,
                    expr.line,
                    format!("expected 'int', found '{}'", found),
                );
            }
        }
    }

    fn check_var(&mut self, expr: &Expr, name: &str) -> Option<Type> {
        match self.scopes.resolve(name) {
            None => {
                self.error(
                    DiagnosticKind::NameResolution,
                    expr.line,
                    format!("'{}' is not declared", name),
                );
                None
            }
            Some(resolved) => {
                let global = resolved.global;
                match resolved.symbol {
                    Symbol::Function { .. } => {
                        self.error(
                            DiagnosticKind::Semantic,
                            expr.line,
                            format!("function '{}' used as a value", name),
                        );
                        None
                    }
                    Symbol::Variable {
                        ty: TypeSpec::Array(..),
                        ..
                    } => {
                        self.error(
                            DiagnosticKind::Type,
                            expr.line,
                            format!("array '{}' must be indexed", name),
                        );
                        None
                    }
                    Symbol::Variable {
                        ty: TypeSpec::Scalar(ty),
                        slot,
                    } => {
                        self.notes.set_site(expr.id, VarSite { slot, global });
                        Some(ty)
                    }
                    Symbol::Parameter { ty, slot } => {
                        self.notes.set_site(expr.id, VarSite { slot, global });
                        Some(ty)
                    }
                }
            }
        }
    }

    fn check_index(&mut self, expr: &Expr, name: &str, index: &Expr) -> Option<Type> {
        self.check_index_expr(index);

        match self.scopes.resolve(name) {
            None => {
                self.error(
                    DiagnosticKind::NameResolution,
                    expr.line,
                    format!("'{}' is not declared", name),
                );
                None
            }
            Some(resolved) => {
                let global = resolved.global;
                match resolved.symbol {
                    Symbol::Variable {
                        ty: TypeSpec::Array(element_ty, _),
                        slot,
                    } => {
                        self.notes.set_site(expr.id, VarSite { slot, global });
                        Some(element_ty)
                    }
                    _ => {
                        self.error(
                            DiagnosticKind::Type,
                            expr.line,
                            format!("'{}' is not an array", name),
                        );
                        None
                    }
                }
            }
        }
    }

    fn check_call(&mut self, expr: &Expr, name: &str, args: &[Expr]) -> Option<Type> {
        let sig = match self.scopes.resolve(name) {
            None => {
                self.error(
                    DiagnosticKind::NameResolution,
                    expr.line,
                    format!("'{}' is not declared", name),
                );
                None
            }
            Some(resolved) => match resolved.symbol {
                Symbol::Function { sig } => Some(sig.clone()),
                other => {
                    self.error(
                        DiagnosticKind::Semantic,
                        expr.line,
                        format!("'{}' is a {}, not a function", name, other.kind_name()),
                    );
                    None
                }
            },
        };

        let arg_types: Vec<Option<Type>> = args.iter().map(|arg| self.check_expr(arg)).collect();

        let sig = sig?;
        if args.len() != sig.params.len() {
            self.error(
                DiagnosticKind::Semantic,
                expr.line,
                format!(
                    "function '{}' expects {} arguments, found {}",
                    name,
                    sig.params.len(),
                    args.len()
                ),
            );
            return Some(sig.ret);
        }

        for (position, (expected, found)) in sig.params.iter().zip(&arg_types).enumerate() {
            if let Some(found) = found {
                if found != expected {
                    self.error(
                        DiagnosticKind::Type,
                        args[position].line,
                        format!(
                            "argument {} of '{}' expects '{}', found '{}'",
                            position + 1,
                            name,
                            expected,
                            found
                        ),
                    );
                }
            }
        }

        Some(sig.ret)
    }

    fn check_unary(&mut self, expr: &Expr, op: UnOp, operand: &Expr) -> Option<Type> {
        let ty = self.check_expr(operand)?;
        match op {
            UnOp::Neg if ty.is_numeric() => Some(ty),
            UnOp::Not if ty == Type::Bool => Some(Type::Bool),
            _ => {
                self.error(
                    DiagnosticKind::Type,
                    expr.line,
                    format!("operator '{}' cannot be applied to '{}'", op, ty),
                );
                None
            }
        }
    }

    fn check_binary(&mut self, expr: &Expr, op: BinOp, lhs: &Expr, rhs: &Expr) -> Option<Type> {
        let lhs_ty = self.check_expr(lhs);
        let rhs_ty = self.check_expr(rhs);
        let (lhs_ty, rhs_ty) = (lhs_ty?, rhs_ty?);

        let mismatch = |analyzer: &mut Self| {
            analyzer.error(
                DiagnosticKind::Type,
                expr.line,
                format!(
                    "operator '{}' cannot be applied to '{}' and '{}'",
                    op, lhs_ty, rhs_ty
                ),
            );
            None
        };

        if op.is_arithmetic() {
            return match (lhs_ty, rhs_ty) {
                (Type::Int, Type::Int) => Some(Type::Int),
                (Type::Float, Type::Float) if op != BinOp::Mod => Some(Type::Float),
                // Componentwise colour arithmetic, saturating; a colour
                // may also be scaled by an int.
                (Type::Colour, Type::Colour)
                    if matches!(op, BinOp::Add | BinOp::Sub | BinOp::Mul) =>
                {
                    Some(Type::Colour)
                }
                (Type::Colour, Type::Int) if op == BinOp::Mul => Some(Type::Colour),
                _ => mismatch(self),
            };
        }

        if op.is_relational() {
            return match (lhs_ty, rhs_ty) {
                (Type::Int, Type::Int) | (Type::Float, Type::Float) => Some(Type::Bool),
                _ => mismatch(self),
            };
        }

        if op.is_equality() {
            return if lhs_ty == rhs_ty {
                Some(Type::Bool)
            } else {
                mismatch(self)
            };
        }

        debug_assert!(op.is_logical());
        match (lhs_ty, rhs_ty) {
            (Type::Bool, Type::Bool) => Some(Type::Bool),
            _ => mismatch(self),
        }
    }

    fn check_cast(&mut self, expr: &Expr, operand: &Expr, target: Type) -> Option<Type> {
        let from = self.check_expr(operand)?;
        let allowed = matches!(
            (from, target),
            (Type::Int, Type::Float)
                | (Type::Float, Type::Int)
                | (Type::Int, Type::Colour)
                | (Type::Colour, Type::Int)
                | (Type::Bool, Type::Int)
                | (Type::Int, Type::Bool)
        );

        if allowed {
            Some(target)
        } else {
            self.error(
                DiagnosticKind::Type,
                expr.line,
                format!("cannot cast '{}' to '{}'", from, target),
            );
            None
        }
    }

    fn alloc_slots(&mut self, count: usize) -> usize {
        let slot = self.next_slot;
        self.next_slot += count;
        slot
    }
}

// ----------------------------------------------------------------------------
// Return path analysis

/// True when every path through the block ends in a `return`.
fn block_returns(block: &Block) -> bool {
    block.stmts.iter().any(stmt_returns)
}

fn stmt_returns(stmt: &Stmt) -> bool {
    match stmt {
        Stmt::Return(_) => true,
        Stmt::Block(block) => block_returns(block),
        Stmt::If(stmt) => match &stmt.else_block {
            Some(else_block) => block_returns(&stmt.then_block) && block_returns(else_block),
            // Without an else the condition may skip the branch.
            None => false,
        },
        // Loop bodies may never run.
        _ => false,
    }
}

#[cfg(test)]
mod test {
    use crate::{
        analysis,
        diag::{DiagnosticKind, Diagnostics},
        lex::tokenize,
        parsing,
        token_stream::TokenStream,
    };

    fn analyse(source: &str) -> Diagnostics {
        let mut diag = Diagnostics::new();
        let tokens = tokenize(source, &mut diag);
        let stream = TokenStream::new(tokens, source);
        let (program, node_count) = parsing::parse(stream, &mut diag);
        assert!(diag.is_empty(), "parse errors: {:?}", diag);
        analysis::analyse(&program, node_count, &mut diag);
        diag
    }

    fn kinds(diag: &Diagnostics) -> Vec<DiagnosticKind> {
        diag.iter().map(|d| d.kind).collect()
    }

    #[test]
    fn test_float_to_int_requires_cast() {
        let diag = analyse("let x:int = 1.5;");
        assert_eq!(kinds(&diag), vec![DiagnosticKind::Type]);

        let diag = analyse("let x:int = 1.5 as int;");
        assert!(diag.is_empty());
    }

    #[test]
    fn test_redeclaration_same_scope() {
        let diag = analyse("let x:int = 1; let x:int = 2;");
        assert_eq!(kinds(&diag), vec![DiagnosticKind::NameResolution]);
    }

    #[test]
    fn test_shadowing_in_nested_block() {
        let diag = analyse("let x:int = 1; { let x:float = 2.0; __print x; }");
        assert!(diag.is_empty());
    }

    #[test]
    fn test_forward_function_reference() {
        let diag = analyse(
            "let y:int = twice(4);\n\
             fun twice(n: int) -> int { return n * 2; }",
        );
        assert!(diag.is_empty());
    }

    #[test]
    fn test_missing_return_path() {
        let diag = analyse(
            "fun sign(n: int) -> int { if (n < 0) { return 0 - 1; } }\n\
             let s:int = sign(3);",
        );
        assert_eq!(kinds(&diag), vec![DiagnosticKind::Semantic]);

        let diag = analyse(
            "fun sign(n: int) -> int { if (n < 0) { return 0 - 1; } else { return 1; } }\n\
             let s:int = sign(3);",
        );
        assert!(diag.is_empty());
    }

    #[test]
    fn test_condition_must_be_bool() {
        let diag = analyse("if (1) { __print 1; }");
        assert_eq!(kinds(&diag), vec![DiagnosticKind::Type]);
    }

    #[test]
    fn test_array_rules() {
        assert!(analyse("let a:int[3] = [1, 2, 3]; __print a[0];").is_empty());

        // Initializer length must match the declared size.
        let diag = analyse("let a:int[3] = [1, 2];");
        assert_eq!(kinds(&diag), vec![DiagnosticKind::Type]);

        // Arrays must be indexed with ints.
        let diag = analyse("let a:int[2] = [1, 2]; __print a[1.0];");
        assert_eq!(kinds(&diag), vec![DiagnosticKind::Type]);

        // Bare array reference is not a value.
        let diag = analyse("let a:int[2] = [1, 2]; __print a;");
        assert_eq!(kinds(&diag), vec![DiagnosticKind::Type]);
    }

    #[test]
    fn test_colour_operators() {
        assert!(analyse("let c:colour = #102030 + #010101;").is_empty());
        assert!(analyse("let c:colour = #102030 * 2;").is_empty());

        let diag = analyse("let c:colour = #102030 / #010101;");
        assert_eq!(kinds(&diag), vec![DiagnosticKind::Type]);

        let diag = analyse("let c:colour = #102030 % #010101;");
        assert_eq!(kinds(&diag), vec![DiagnosticKind::Type]);
    }

    #[test]
    fn test_modulo_int_only() {
        let diag = analyse("let x:float = 1.0 % 2.0;");
        assert_eq!(kinds(&diag), vec![DiagnosticKind::Type]);
    }

    #[test]
    fn test_return_outside_function() {
        let diag = analyse("return 1;");
        assert_eq!(kinds(&diag), vec![DiagnosticKind::Semantic]);
    }

    #[test]
    fn test_call_arity_and_types() {
        let source = "fun f(a: int, b: bool) -> int { return a; }\nlet x:int = f(1);";
        let diag = analyse(source);
        assert_eq!(kinds(&diag), vec![DiagnosticKind::Semantic]);

        let source = "fun f(a: int, b: bool) -> int { return a; }\nlet x:int = f(1, 2);";
        let diag = analyse(source);
        assert_eq!(kinds(&diag), vec![DiagnosticKind::Type]);
    }

    #[test]
    fn test_all_errors_reported_together() {
        let diag = analyse("let x:int = 1.5; let y:bool = 2; __print z;");
        assert_eq!(diag.len(), 3);
    }

    #[test]
    fn test_identity_cast_rejected() {
        let diag = analyse("let x:int = 1 as int;");
        assert_eq!(kinds(&diag), vec![DiagnosticKind::Type]);
    }
}
