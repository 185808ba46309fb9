//! Whole-pipeline tests for the compiler frontend.
use pixardis_compiler::compile;

const FIBONACCI: &str = "\
fun fib(n: int) -> int {
    if (n < 2) {
        return n;
    }
    return fib(n - 1) + fib(n - 2);
}

__print fib(5);
";

#[test]
fn test_compile_fibonacci() {
    let assembly = compile(FIBONACCI).expect("fibonacci should compile");
    assert!(assembly.starts_with("main:\n"));
    assert!(assembly.contains("call fib, 1"));
    assert!(assembly.contains("fib:"));
    assert!(assembly.contains("ret"));
    assert!(assembly.contains("halt"));
}

#[test]
fn test_assembly_is_byte_stable() {
    let first = compile(FIBONACCI).unwrap();
    let second = compile(FIBONACCI).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_error_format_carries_the_source_line() {
    let source = "let ok:int = 1;\nlet bad:int = 2.5;\n";
    let errors = compile(source).unwrap_err();

    assert_eq!(errors.len(), 1);
    let rendered = &errors[0];
    assert!(
        rendered.starts_with("In Line 2: let bad:int = 2.5;\nType Error:"),
        "unexpected rendering: {}",
        rendered
    );
}

#[test]
fn test_errors_are_reported_in_source_order() {
    let source = "\
let a:int = 1.5;
let b:int = 1;
let b:int = 2;
__print missing;
";
    let errors = compile(source).unwrap_err();
    assert_eq!(errors.len(), 3);
    assert!(errors[0].contains("Type Error"));
    assert!(errors[1].contains("Name Resolution Error"));
    assert!(errors[2].contains("Name Resolution Error"));
    assert!(errors[0].starts_with("In Line 1:"));
    assert!(errors[1].starts_with("In Line 3:"));
    assert!(errors[2].starts_with("In Line 4:"));
}

#[test]
fn test_lexical_errors_name_line_and_continue() {
    let source = "let a:colour = #12;\nlet b:int = 3 ` 4;\n";
    let errors = compile(source).unwrap_err();

    assert_eq!(errors.len(), 2);
    assert!(errors[0].contains("Lexical Error"));
    assert!(errors[0].starts_with("In Line 1:"));
    assert!(errors[1].starts_with("In Line 2:"));
}

#[test]
fn test_syntax_recovery_reports_several_errors() {
    let source = "\
let a:int 1;
let b:int = ;
let c:int = 3;
";
    let errors = compile(source).unwrap_err();
    assert!(errors.len() >= 2);
    assert!(errors.iter().all(|error| error.contains("Syntax Error")));
}

#[test]
fn test_no_assembly_on_any_error() {
    // A semantic error in one function suppresses output even though
    // the rest of the unit is fine.
    let source = "\
fun ok() -> int { return 1; }
fun broken() -> int { __print 1; }
__print ok();
";
    assert!(compile(source).is_err());
}

#[test]
fn test_omitted_array_size_is_rejected() {
    let errors = compile("let a:int[] = [1, 2, 3];").unwrap_err();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("Type Error"));
    assert!(errors[0].contains("explicit size"));
}

#[test]
fn test_function_declarations_only_at_top_level() {
    let source = "\
fun outer() -> int {
    fun inner() -> int { return 1; }
    return 1;
}
";
    let errors = compile(source).unwrap_err();
    assert!(errors[0].contains("Syntax Error"));
    assert!(errors[0].contains("top level"));
}

#[test]
fn test_builtin_aliases() {
    let via_alias = compile("__pixel 1, 2, #ABCDEF;").unwrap();
    let canonical = compile("__write 1, 2, #ABCDEF;").unwrap();
    assert_eq!(via_alias, canonical);
}
