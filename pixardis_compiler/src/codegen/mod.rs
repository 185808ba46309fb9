//! Code generation.
//!
//! Walks the checked tree and emits textual stack-machine assembly.
//! Synthetic labels come from a monotonically increasing counter, so
//! compiling the same source twice yields byte-identical assembly.
//!
//! Layout: the entry sequence first (label `main`, which the loader
//! places at instruction 0), closed by `cframe`/`halt`, then every
//! function body in declaration order. Nothing can fall through into a
//! function because `halt` precedes the first one.
use std::fmt::Display;

use log::debug;

use crate::{
    analysis::{Annotations, VarSite},
    ast::{
        AssignStmt, BinOp, Block, Expr, ExprKind, ForStmt, FunDecl, IfStmt, LetInit, LetStmt,
        Program, Stmt, Type, UnOp, WhileStmt,
    },
};

/// Emit assembly for a program that passed semantic analysis.
pub fn generate(program: &Program, notes: &Annotations) -> String {
    let mut codegen = CodeGen::new(notes);
    codegen.gen_program(program);
    debug!(
        "generated {} assembly lines",
        codegen.asm.lines().count()
    );
    codegen.asm
}

struct CodeGen<'a> {
    notes: &'a Annotations,
    asm: String,
    next_label: u32,
}

impl<'a> CodeGen<'a> {
    fn new(notes: &'a Annotations) -> Self {
        Self {
            notes,
            asm: String::new(),
            next_label: 0,
        }
    }

    fn emit(&mut self, instr: impl Display) {
        self.asm.push_str("    ");
        self.asm.push_str(&instr.to_string());
        self.asm.push('\n');
    }

    fn emit_label(&mut self, label: impl Display) {
        self.asm.push_str(&label.to_string());
        self.asm.push_str(":\n");
    }

    fn fresh_label(&mut self) -> String {
        let label = format!("L{}", self.next_label);
        self.next_label += 1;
        label
    }

    /// Register-like reference for a resolved variable, with a slot
    /// displacement for array elements.
    fn slot_ref(site: VarSite, displacement: usize) -> String {
        if site.global {
            format!("[{}:g]", site.slot + displacement)
        } else {
            format!("[{}]", site.slot + displacement)
        }
    }

    // ------------------------------------------------------------------------
    // Program layout

    fn gen_program(&mut self, program: &Program) {
        let mut functions: Vec<&FunDecl> = Vec::new();

        self.emit_label("main");
        self.emit(format!("oframe {}", self.notes.entry_slots));

        for stmt in &program.stmts {
            match stmt {
                Stmt::Fun(fun) => functions.push(fun),
                other => self.gen_stmt(other),
            }
        }

        self.emit("cframe");
        self.emit("halt");

        for fun in functions {
            self.gen_function(fun);
        }
    }

    fn gen_function(&mut self, fun: &FunDecl) {
        let slots = self.notes.frames.get(&fun.name).copied().unwrap_or(0);

        self.emit_label(&fun.name);
        self.emit(format!("oframe {}", slots));
        self.gen_block(&fun.body);
        // Every path through the body ends in `ret`; analysis rejects
        // anything else.
    }

    // ------------------------------------------------------------------------
    // Statements

    fn gen_block(&mut self, block: &Block) {
        for stmt in &block.stmts {
            self.gen_stmt(stmt);
        }
    }

    fn gen_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Let(stmt) => self.gen_let(stmt),
            Stmt::Assign(stmt) => self.gen_assign(stmt),
            Stmt::If(stmt) => self.gen_if(stmt),
            Stmt::While(stmt) => self.gen_while(stmt),
            Stmt::For(stmt) => self.gen_for(stmt),
            Stmt::Return(stmt) => {
                self.gen_expr(&stmt.value);
                self.emit("ret");
            }
            Stmt::Block(block) => self.gen_block(block),
            Stmt::Expr(expr) => {
                self.gen_expr(expr);
                self.emit("drop");
            }
            Stmt::Fun(_) => unreachable!("functions are hoisted by gen_program"),
            Stmt::Print(expr) => {
                self.gen_expr(expr);
                self.emit("print");
            }
            Stmt::Delay(expr) => {
                self.gen_expr(expr);
                self.emit("delay");
            }
            Stmt::Clear(expr) => {
                self.gen_expr(expr);
                self.emit("clear");
            }
            // Operands are pushed in reverse so the opcode pops them in
            // its documented order, x on top.
            Stmt::Write([x, y, colour]) => {
                self.gen_expr(colour);
                self.gen_expr(y);
                self.gen_expr(x);
                self.emit("write_pixel");
            }
            Stmt::WriteBox([x, y, w, h, colour]) => {
                self.gen_expr(colour);
                self.gen_expr(h);
                self.gen_expr(w);
                self.gen_expr(y);
                self.gen_expr(x);
                self.emit("write_box");
            }
        }
    }

    fn gen_let(&mut self, stmt: &LetStmt) {
        let site = self.notes.site(stmt.id);
        match &stmt.init {
            LetInit::Scalar(expr) => {
                self.gen_expr(expr);
                self.emit(format!("pop {}", Self::slot_ref(site, 0)));
            }
            LetInit::Array(elements) => {
                // Elements are evaluated left-to-right, then copied
                // into their slots back-to-front.
                for element in elements {
                    self.gen_expr(element);
                }
                for displacement in (0..elements.len()).rev() {
                    self.emit(format!("pop {}", Self::slot_ref(site, displacement)));
                }
            }
        }
    }

    fn gen_assign(&mut self, stmt: &AssignStmt) {
        let site = self.notes.site(stmt.id);
        self.gen_expr(&stmt.value);
        match &stmt.index {
            None => self.emit(format!("pop {}", Self::slot_ref(site, 0))),
            Some(index) => {
                self.gen_expr(index);
                self.emit(format!("pop +{}", Self::slot_ref(site, 0)));
            }
        }
    }

    fn gen_if(&mut self, stmt: &IfStmt) {
        self.gen_expr(&stmt.cond);
        match &stmt.else_block {
            Some(else_block) => {
                let else_label = self.fresh_label();
                let end_label = self.fresh_label();
                self.emit(format!("jz {}", else_label));
                self.gen_block(&stmt.then_block);
                self.emit(format!("jmp {}", end_label));
                self.emit_label(&else_label);
                self.gen_block(else_block);
                self.emit_label(&end_label);
            }
            None => {
                let end_label = self.fresh_label();
                self.emit(format!("jz {}", end_label));
                self.gen_block(&stmt.then_block);
                self.emit_label(&end_label);
            }
        }
    }

    /// Test at the top, back-edge at the bottom.
    fn gen_while(&mut self, stmt: &WhileStmt) {
        let top_label = self.fresh_label();
        let end_label = self.fresh_label();

        self.emit_label(&top_label);
        self.gen_expr(&stmt.cond);
        self.emit(format!("jz {}", end_label));
        self.gen_block(&stmt.body);
        self.emit(format!("jmp {}", top_label));
        self.emit_label(&end_label);
    }

    fn gen_for(&mut self, stmt: &ForStmt) {
        if let Some(init) = &stmt.init {
            self.gen_stmt(init);
        }

        let top_label = self.fresh_label();
        self.emit_label(&top_label);

        let end_label = stmt.cond.as_ref().map(|cond| {
            self.gen_expr(cond);
            let end_label = self.fresh_label();
            self.emit(format!("jz {}", end_label));
            end_label
        });

        self.gen_block(&stmt.body);
        if let Some(step) = &stmt.step {
            self.gen_stmt(step);
        }
        self.emit(format!("jmp {}", top_label));

        if let Some(end_label) = end_label {
            self.emit_label(&end_label);
        }
    }

    // ------------------------------------------------------------------------
    // Expressions

    fn gen_expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Int(value) => self.emit(format!("push {}", value)),
            ExprKind::Float(value) => self.emit(format!("push {:?}", value)),
            ExprKind::Colour(value) => self.emit(format!("push #{:06X}", value)),
            // Immediates carry int, float or colour values only; a
            // boolean is materialised through its int form.
            ExprKind::Bool(value) => {
                self.emit(format!("push {}", *value as i32));
                self.emit("itob");
            }
            ExprKind::Var(_) => {
                let site = self.notes.site(expr.id);
                self.emit(format!("push {}", Self::slot_ref(site, 0)));
            }
            ExprKind::Index(_, index) => {
                let site = self.notes.site(expr.id);
                self.gen_expr(index);
                self.emit(format!("push +{}", Self::slot_ref(site, 0)));
            }
            ExprKind::Call(name, args) => {
                for arg in args {
                    self.gen_expr(arg);
                }
                self.emit(format!("call {}, {}", name, args.len()));
            }
            ExprKind::Unary(UnOp::Neg, operand) => {
                self.gen_expr(operand);
                self.emit("neg");
            }
            ExprKind::Unary(UnOp::Not, operand) => {
                self.gen_expr(operand);
                self.emit("not");
            }
            ExprKind::Binary(BinOp::And, lhs, rhs) => {
                // Short-circuit: the right side only runs when the left
                // leaves true on the stack.
                let end_label = self.fresh_label();
                self.gen_expr(lhs);
                self.emit("dup");
                self.emit(format!("jz {}", end_label));
                self.emit("drop");
                self.gen_expr(rhs);
                self.emit_label(&end_label);
            }
            ExprKind::Binary(BinOp::Or, lhs, rhs) => {
                let end_label = self.fresh_label();
                self.gen_expr(lhs);
                self.emit("dup");
                self.emit(format!("jnz {}", end_label));
                self.emit("drop");
                self.gen_expr(rhs);
                self.emit_label(&end_label);
            }
            ExprKind::Binary(op, lhs, rhs) => {
                self.gen_expr(lhs);
                self.gen_expr(rhs);
                self.emit(binary_opcode(*op));
            }
            ExprKind::Cast(operand, target) => {
                let from = self.notes.ty(operand.id);
                self.gen_expr(operand);
                self.emit(cast_opcode(from, *target));
            }
            ExprKind::Width => self.emit("width"),
            ExprKind::Height => self.emit("height"),
            ExprKind::RandomInt(bound) => {
                self.gen_expr(bound);
                self.emit("rand");
            }
            ExprKind::ReadPixel(x, y) => {
                self.gen_expr(y);
                self.gen_expr(x);
                self.emit("read_pixel");
            }
        }
    }
}

#[rustfmt::skip]
fn binary_opcode(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "add",
        BinOp::Sub => "sub",
        BinOp::Mul => "mul",
        BinOp::Div => "div",
        BinOp::Mod => "mod",
        BinOp::Eq  => "eq",
        BinOp::Ne  => "ne",
        BinOp::Lt  => "lt",
        BinOp::Le  => "le",
        BinOp::Gt  => "gt",
        BinOp::Ge  => "ge",
        BinOp::And | BinOp::Or => unreachable!("lowered with short-circuit jumps"),
    }
}

#[rustfmt::skip]
fn cast_opcode(from: Type, to: Type) -> &'static str {
    match (from, to) {
        (Type::Int, Type::Float)    => "itof",
        (Type::Float, Type::Int)    => "ftoi",
        (Type::Int, Type::Colour)   => "itoc",
        (Type::Colour, Type::Int)   => "ctoi",
        (Type::Bool, Type::Int)     => "btoi",
        (Type::Int, Type::Bool)     => "itob",
        // Analysis admits no other pair.
        _ => unreachable!("cast from {} to {}", from, to),
    }
}

#[cfg(test)]
mod test {
    use crate::{
        analysis, codegen,
        diag::Diagnostics,
        lex::tokenize,
        parsing,
        token_stream::TokenStream,
    };

    fn compile(source: &str) -> String {
        let mut diag = Diagnostics::new();
        let tokens = tokenize(source, &mut diag);
        let stream = TokenStream::new(tokens, source);
        let (program, node_count) = parsing::parse(stream, &mut diag);
        let notes = analysis::analyse(&program, node_count, &mut diag);
        assert!(diag.is_empty(), "unexpected errors: {:?}", diag);
        codegen::generate(&program, &notes)
    }

    #[test]
    fn test_emitted_assembly_is_deterministic() {
        let source = "let x:int = 0;\n\
                      while (x < 10) { if (x % 2 == 0) { __print x; } x = x + 1; }";
        assert_eq!(compile(source), compile(source));
    }

    #[test]
    fn test_entry_layout() {
        let asm = compile("let x:int = 1;");
        let lines: Vec<&str> = asm.lines().map(str::trim).collect();
        assert_eq!(
            lines,
            vec!["main:", "oframe 1", "push 1", "pop [0]", "cframe", "halt"]
        );
    }

    #[test]
    fn test_functions_emitted_after_halt() {
        let asm = compile(
            "fun one() -> int { return 1; }\n\
             __print one();",
        );
        let halt_at = asm.find("halt").unwrap();
        let fun_at = asm.find("one:").unwrap();
        assert!(fun_at > halt_at);
        assert!(asm.contains("call one, 0"));
    }

    #[test]
    fn test_short_circuit_uses_jumps() {
        let asm = compile("let b:bool = true and false;");
        assert!(asm.contains("jz L0"));
        assert!(asm.contains("dup"));
        assert!(asm.contains("drop"));
    }

    #[test]
    fn test_global_reference_from_function() {
        let asm = compile(
            "let total:int = 0;\n\
             fun bump() -> int { total = total + 1; return total; }\n\
             __print bump();",
        );
        // Inside `bump` the global is addressed through the entry frame.
        assert!(asm.contains("push [0:g]"));
        assert!(asm.contains("pop [0:g]"));
    }

    #[test]
    fn test_array_initializer_bulk_copy() {
        let asm = compile("let a:int[3] = [7, 8, 9];");
        let lines: Vec<&str> = asm.lines().map(str::trim).collect();
        assert_eq!(
            lines,
            vec![
                "main:", "oframe 3", "push 7", "push 8", "push 9", "pop [2]", "pop [1]",
                "pop [0]", "cframe", "halt"
            ]
        );
    }

    #[test]
    fn test_indexed_access() {
        let asm = compile("let a:int[2] = [1, 2]; a[1] = a[0]; __print a[1];");
        assert!(asm.contains("push +[0]"));
        assert!(asm.contains("pop +[0]"));
    }

    #[test]
    fn test_cast_opcodes() {
        let asm = compile("let f:float = 1 as float; let i:int = f as int;");
        assert!(asm.contains("itof"));
        assert!(asm.contains("ftoi"));
    }
}
