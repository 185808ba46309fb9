//! Source pretty printer.
//!
//! Renders a syntax tree back into canonical source text. Parentheses
//! are inserted only where precedence demands them, so printing the
//! parse of printed output reproduces it byte for byte. The round-trip
//! tests lean on that fixpoint.
use std::fmt::Write;

use crate::ast::{
    Block, Expr, ExprKind, ForStmt, FunDecl, LetInit, LetStmt, Program, Stmt, UnOp,
};

const INDENT: &str = "    ";

pub fn pretty(program: &Program) -> String {
    let mut out = String::new();
    for stmt in &program.stmts {
        print_stmt(&mut out, stmt, 0);
    }
    out
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

fn print_block(out: &mut String, block: &Block, depth: usize) {
    out.push_str("{\n");
    for stmt in &block.stmts {
        print_stmt(out, stmt, depth + 1);
    }
    indent(out, depth);
    out.push('}');
}

fn print_stmt(out: &mut String, stmt: &Stmt, depth: usize) {
    indent(out, depth);
    match stmt {
        Stmt::Let(stmt) => {
            print_let(out, stmt);
            out.push('\n');
        }
        Stmt::Assign(stmt) => {
            print_assign(out, stmt);
            out.push_str(";\n");
        }
        Stmt::If(stmt) => {
            out.push_str("if (");
            print_expr(out, &stmt.cond, 0);
            out.push_str(") ");
            print_block(out, &stmt.then_block, depth);
            if let Some(else_block) = &stmt.else_block {
                out.push_str(" else ");
                print_block(out, else_block, depth);
            }
            out.push('\n');
        }
        Stmt::While(stmt) => {
            out.push_str("while (");
            print_expr(out, &stmt.cond, 0);
            out.push_str(") ");
            print_block(out, &stmt.body, depth);
            out.push('\n');
        }
        Stmt::For(stmt) => {
            print_for_header(out, stmt);
            print_block(out, &stmt.body, depth);
            out.push('\n');
        }
        Stmt::Return(stmt) => {
            out.push_str("return ");
            print_expr(out, &stmt.value, 0);
            out.push_str(";\n");
        }
        Stmt::Block(block) => {
            print_block(out, block, depth);
            out.push('\n');
        }
        Stmt::Expr(expr) => {
            print_expr(out, expr, 0);
            out.push_str(";\n");
        }
        Stmt::Fun(fun) => {
            print_fun(out, fun, depth);
            out.push('\n');
        }
        Stmt::Print(expr) => {
            out.push_str("__print ");
            print_expr(out, expr, 0);
            out.push_str(";\n");
        }
        Stmt::Delay(expr) => {
            out.push_str("__delay ");
            print_expr(out, expr, 0);
            out.push_str(";\n");
        }
        Stmt::Clear(expr) => {
            out.push_str("__clear ");
            print_expr(out, expr, 0);
            out.push_str(";\n");
        }
        Stmt::Write(args) => {
            out.push_str("__write ");
            print_expr_list(out, args.iter());
            out.push_str(";\n");
        }
        Stmt::WriteBox(args) => {
            out.push_str("__write_box ");
            print_expr_list(out, args.iter());
            out.push_str(";\n");
        }
    }
}

fn print_let(out: &mut String, stmt: &LetStmt) {
    let _ = write!(out, "let {}: {} = ", stmt.name, stmt.ty);
    match &stmt.init {
        LetInit::Scalar(expr) => print_expr(out, expr, 0),
        LetInit::Array(elements) => {
            out.push('[');
            print_expr_list(out, elements.iter());
            out.push(']');
        }
    }
    out.push(';');
}

fn print_assign(out: &mut String, stmt: &crate::ast::AssignStmt) {
    out.push_str(&stmt.name);
    if let Some(index) = &stmt.index {
        out.push('[');
        print_expr(out, index, 0);
        out.push(']');
    }
    out.push_str(" = ");
    print_expr(out, &stmt.value, 0);
}

fn print_for_header(out: &mut String, stmt: &ForStmt) {
    out.push_str("for (");
    match &stmt.init {
        Some(init) => match init.as_ref() {
            Stmt::Let(stmt) => print_let(out, stmt),
            Stmt::Assign(stmt) => {
                print_assign(out, stmt);
                out.push(';');
            }
            other => unreachable!("for initialiser: {:?}", other),
        },
        None => out.push(';'),
    }
    if let Some(cond) = &stmt.cond {
        out.push(' ');
        print_expr(out, cond, 0);
    }
    out.push(';');
    if let Some(step) = &stmt.step {
        match step.as_ref() {
            Stmt::Assign(stmt) => {
                out.push(' ');
                print_assign(out, stmt);
            }
            other => unreachable!("for step: {:?}", other),
        }
    }
    out.push_str(") ");
}

fn print_fun(out: &mut String, fun: &FunDecl, depth: usize) {
    let _ = write!(out, "fun {}(", fun.name);
    for (position, param) in fun.params.iter().enumerate() {
        if position > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "{}: {}", param.name, param.ty);
    }
    let _ = write!(out, ") -> {} ", fun.ret);
    print_block(out, &fun.body, depth);
}

fn print_expr_list<'a>(out: &mut String, exprs: impl Iterator<Item = &'a Expr>) {
    for (position, expr) in exprs.enumerate() {
        if position > 0 {
            out.push_str(", ");
        }
        print_expr(out, expr, 0);
    }
}

/// Binding strength, matching the parser's climbing levels. The
/// argument-swallowing built-ins sit below everything so they get
/// parenthesized whenever they appear as an operand.
#[rustfmt::skip]
fn precedence(expr: &Expr) -> u8 {
    use crate::ast::BinOp as B;
    match &expr.kind {
        ExprKind::RandomInt(_) | ExprKind::ReadPixel(..) => 0,
        ExprKind::Binary(op, ..) => match op {
            B::Or                               => 1,
            B::And                              => 2,
            B::Eq | B::Ne                       => 3,
            B::Lt | B::Le | B::Gt | B::Ge       => 4,
            B::Add | B::Sub                     => 5,
            B::Mul | B::Div | B::Mod            => 6,
        },
        ExprKind::Unary(..)                     => 7,
        ExprKind::Cast(..)                      => 8,
        _                                       => 9,
    }
}

/// Render a float so it lexes as a float literal again: the shortest
/// roundtrip form, with a forced fraction when it would print bare
/// (`1e300` becomes `1.0e300`).
fn format_float(value: f64) -> String {
    let printed = format!("{:?}", value);
    if printed.contains('.') {
        printed
    } else if let Some(position) = printed.find(['e', 'E']) {
        format!("{}.0{}", &printed[..position], &printed[position..])
    } else {
        format!("{}.0", printed)
    }
}

fn print_expr(out: &mut String, expr: &Expr, min_precedence: u8) {
    let own = precedence(expr);
    if own < min_precedence {
        out.push('(');
        print_bare_expr(out, expr);
        out.push(')');
    } else {
        print_bare_expr(out, expr);
    }
}

fn print_bare_expr(out: &mut String, expr: &Expr) {
    let own = precedence(expr);
    match &expr.kind {
        ExprKind::Int(value) => {
            let _ = write!(out, "{}", value);
        }
        ExprKind::Float(value) => {
            out.push_str(&format_float(*value));
        }
        ExprKind::Bool(value) => {
            let _ = write!(out, "{}", value);
        }
        ExprKind::Colour(value) => {
            let _ = write!(out, "#{:06X}", value);
        }
        ExprKind::Var(name) => out.push_str(name),
        ExprKind::Index(name, index) => {
            out.push_str(name);
            out.push('[');
            print_expr(out, index, 0);
            out.push(']');
        }
        ExprKind::Call(name, args) => {
            out.push_str(name);
            out.push('(');
            print_expr_list(out, args.iter());
            out.push(')');
        }
        ExprKind::Unary(op, operand) => {
            match op {
                UnOp::Neg => out.push('-'),
                UnOp::Not => out.push_str("not "),
            }
            print_expr(out, operand, own);
        }
        ExprKind::Binary(op, lhs, rhs) => {
            // Left-associative: the right operand needs one more level
            // of binding to reproduce the same tree.
            print_expr(out, lhs, own);
            let _ = write!(out, " {} ", op);
            print_expr(out, rhs, own + 1);
        }
        ExprKind::Cast(operand, target) => {
            print_expr(out, operand, own);
            let _ = write!(out, " as {}", target);
        }
        ExprKind::Width => out.push_str("__width"),
        ExprKind::Height => out.push_str("__height"),
        ExprKind::RandomInt(bound) => {
            out.push_str("__random_int ");
            print_expr(out, bound, 0);
        }
        ExprKind::ReadPixel(x, y) => {
            out.push_str("__read ");
            print_expr(out, x, 0);
            out.push_str(", ");
            print_expr(out, y, 0);
        }
    }
}

#[cfg(test)]
mod test {
    use super::pretty;
    use crate::{diag::Diagnostics, lex::tokenize, parsing, token_stream::TokenStream};

    fn parse_pretty(source: &str) -> String {
        let mut diag = Diagnostics::new();
        let tokens = tokenize(source, &mut diag);
        let stream = TokenStream::new(tokens, source);
        let (program, _) = parsing::parse(stream, &mut diag);
        assert!(diag.is_empty(), "unexpected errors: {:?}", diag);
        pretty(&program)
    }

    /// `parse → pretty` reaches a fixpoint after one round.
    fn assert_round_trip(source: &str) {
        let printed = parse_pretty(source);
        let reprinted = parse_pretty(&printed);
        assert_eq!(printed, reprinted);
    }

    #[test]
    fn test_round_trip_statements() {
        assert_round_trip(
            "let x:int = 1+2*3;\n\
             fun mix(a: int, b: int) -> int { if (a < b) { return b; } return a; }\n\
             for (let i:int = 0; i < 10; i = i + 1) { __write i, i, #00FF00; }\n\
             while (x > 0) { x = x - 1; }\n\
             { __print x; }",
        );
    }

    #[test]
    fn test_round_trip_precedence() {
        assert_round_trip("let y:bool = (1 + 2) * 3 < 4 and not (true or false);");
        assert_round_trip("let z:int = -(1 + 2) % 3;");
        assert_round_trip("let f:float = (-1) as float;");
    }

    #[test]
    fn test_round_trip_builtin_expressions() {
        assert_round_trip("let c:colour = __read __width - 1, 0;");
        assert_round_trip("let n:int = (__random_int 10) + 1;");
        assert_round_trip("__print __random_int __width;");
    }

    #[test]
    fn test_parens_only_where_needed() {
        assert_eq!(
            parse_pretty("let x:int = ((1) + (2 * 3));"),
            "let x: int = 1 + 2 * 3;\n"
        );
        assert_eq!(
            parse_pretty("let x:int = (1 + 2) * 3;"),
            "let x: int = (1 + 2) * 3;\n"
        );
    }

    #[test]
    fn test_empty_for_header() {
        assert_round_trip("for (;;) { __delay 10; }");
    }
}
