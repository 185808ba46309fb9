//! End-to-end tests: compile Pixardis source, load it into the
//! machine and observe the framebuffer and print log.
use pixardis::{compile, PixardisVm};

const FIBONACCI: &str = include_str!("fibonacci.pix");
const ORBIT: &str = include_str!("orbit.pix");

fn compile_ok(source: &str) -> String {
    let output = compile(source);
    assert!(output.success, "compile failed:\n{}", output.errors.join("\n\n"));
    output.assembly
}

fn vm_with(source: &str, width: usize, height: usize) -> PixardisVm {
    let assembly = compile_ok(source);
    let mut vm = PixardisVm::new(width, height);
    vm.load_program(&assembly).unwrap();
    vm
}

/// Step until the program halts, with a generous budget.
fn run_to_halt(vm: &mut PixardisVm) {
    let outcome = vm.step(1_000_000);
    assert!(outcome.success, "runtime error: {:?}", outcome.error);
    assert!(vm.halted(), "program did not halt");
}

fn pixel(vm: &PixardisVm, x: usize, y_source: usize) -> [u8; 3] {
    let row = vm.height() - 1 - y_source;
    let offset = (row * vm.width() + x) * 3;
    let bytes = vm.framebuffer();
    [bytes[offset], bytes[offset + 1], bytes[offset + 2]]
}

// ----------------------------------------------------------------------------
// Concrete scenarios

#[test]
fn test_fibonacci_prints_five() {
    let mut vm = vm_with(FIBONACCI, 16, 16);
    run_to_halt(&mut vm);
    assert_eq!(vm.print_output(), ["5"]);
}

#[test]
fn test_clear_and_read_back() {
    let mut vm = vm_with("__clear #102030; __print __read 0, 0;", 8, 8);
    run_to_halt(&mut vm);

    assert_eq!(vm.print_output(), ["#102030"]);
    for triple in vm.framebuffer().chunks_exact(3) {
        assert_eq!(triple, &[0x10, 0x20, 0x30]);
    }
}

#[test]
fn test_coordinate_flip() {
    let mut vm = vm_with("__clear #000000; __write 0, 0, #FF0000;", 8, 8);
    run_to_halt(&mut vm);

    // Source (0, 0) is the bottom-left, which the byte view stores in
    // the last row.
    let height = vm.height();
    let width = vm.width();
    let offset = 3 * ((height - 1) * width);
    assert_eq!(&vm.framebuffer()[offset..offset + 3], &[0xFF, 0x00, 0x00]);
}

#[test]
fn test_box_fill() {
    let mut vm = vm_with(
        "__clear #000000; __write_box 10, 10, 4, 3, #00FF00;",
        64,
        48,
    );
    run_to_halt(&mut vm);

    let green = vm
        .framebuffer()
        .chunks_exact(3)
        .filter(|triple| *triple == [0x00, 0xFF, 0x00])
        .count();
    assert_eq!(green, 12);

    // Anchored at source (10, 10), 4 wide and 3 tall.
    for y in 10..13 {
        for x in 10..14 {
            assert_eq!(pixel(&vm, x, y), [0x00, 0xFF, 0x00]);
        }
    }
    assert_eq!(pixel(&vm, 9, 10), [0, 0, 0]);
    assert_eq!(pixel(&vm, 14, 10), [0, 0, 0]);
    assert_eq!(pixel(&vm, 10, 13), [0, 0, 0]);
}

#[test]
fn test_short_circuit_skips_calls() {
    let source = "\
let i:int = 0;
fun bump() -> bool {
    i = i + 1;
    return true;
}
let b:bool = (false and bump()) or (true or bump());
__print i;
";
    let mut vm = vm_with(source, 8, 8);
    run_to_halt(&mut vm);
    assert_eq!(vm.print_output(), ["0"]);
}

#[test]
fn test_split_steps_match_one_burst() {
    let assembly = compile_ok(ORBIT);

    let mut split = PixardisVm::new(32, 24);
    split.load_program(&assembly).unwrap();
    assert!(split.step(100).success);
    assert!(split.step(100).success);

    let mut single = PixardisVm::new(32, 24);
    single.load_program(&assembly).unwrap();
    assert!(single.step(200).success);

    assert_eq!(split.framebuffer(), single.framebuffer());
    assert_eq!(split.print_output(), single.print_output());
}

// ----------------------------------------------------------------------------
// Determinism

#[test]
fn test_runs_are_reproducible_with_same_seed() {
    let source = "\
__clear #000000;
let i:int = 0;
while (i < 500) {
    __write __random_int __width, __random_int __height, #FFFFFF;
    __print __random_int 1000;
    i = i + 1;
}
";
    let assembly = compile_ok(source);

    let run = |cycles: &[usize]| {
        let mut vm = PixardisVm::new(32, 32);
        vm.load_program(&assembly).unwrap();
        for &burst in cycles {
            assert!(vm.step(burst).success);
        }
        (vm.framebuffer().to_vec(), vm.print_output().to_vec())
    };

    let (frame_a, prints_a) = run(&[50_000]);
    let (frame_b, prints_b) = run(&[50_000]);
    assert_eq!(frame_a, frame_b);
    assert_eq!(prints_a, prints_b);
}

#[test]
fn test_print_formats_by_tag() {
    let source = "\
__print 42;
__print 2.5;
__print true;
__print #0A0B0C;
";
    let mut vm = vm_with(source, 8, 8);
    run_to_halt(&mut vm);
    assert_eq!(vm.print_output(), ["42", "2.5", "true", "#0A0B0C"]);
}

// ----------------------------------------------------------------------------
// Boundary behaviour

#[test]
fn test_random_zero_is_a_runtime_error() {
    let mut vm = vm_with("__print __random_int 0;", 8, 8);
    let outcome = vm.step(1_000);
    assert!(!outcome.success);
    assert!(outcome.error.unwrap().contains("random bound"));
}

#[test]
fn test_division_by_zero() {
    let mut vm = vm_with("let z:int = 0; __print 1 / z;", 8, 8);
    let outcome = vm.step(1_000);
    assert!(!outcome.success);
    assert!(outcome.error.unwrap().contains("division by zero"));

    let mut vm = vm_with("let z:float = 0.0; __print 1.0 / z;", 8, 8);
    assert!(!vm.step(1_000).success);
}

#[test]
fn test_pixel_write_out_of_bounds() {
    let mut vm = vm_with("__write __width, 0, #FFFFFF;", 8, 8);
    let outcome = vm.step(1_000);
    assert!(!outcome.success);
    assert!(outcome.error.unwrap().contains("outside the display"));
}

#[test]
fn test_runaway_recursion_hits_the_frame_cap() {
    let source = "\
fun forever(n: int) -> int {
    return forever(n + 1);
}
__print forever(0);
";
    let mut vm = vm_with(source, 8, 8);
    let outcome = vm.step(1_000_000);
    assert!(!outcome.success);
    assert!(outcome.error.unwrap().contains("call depth"));
}

#[test]
fn test_error_state_is_sticky_and_inspectable() {
    let mut vm = vm_with("__clear #112233; __print __random_int 0;", 8, 8);
    assert!(!vm.step(1_000).success);

    // The framebuffer survives the fault, and stepping again reports
    // the same error instead of running on.
    assert_eq!(&vm.framebuffer()[..3], &[0x11, 0x22, 0x33]);
    let again = vm.step(1_000);
    assert!(!again.success);
    assert!(vm.error().is_some());
}

#[test]
fn test_stepping_a_halted_vm_is_a_clean_no_op() {
    let mut vm = vm_with("__print 1;", 8, 8);
    run_to_halt(&mut vm);
    let outcome = vm.step(1_000);
    assert!(outcome.success);
    assert_eq!(vm.print_output(), ["1"]);
}

#[test]
fn test_delay_consumes_instruction_slots() {
    let mut vm = vm_with("__delay 10; __print 1;", 8, 8);

    // Five cycles are not enough to get past the armed delay.
    assert!(vm.step(5).success);
    assert!(vm.print_output().is_empty());

    assert!(vm.step(20).success);
    assert_eq!(vm.print_output(), ["1"]);
    assert!(vm.halted());
}

#[test]
fn test_load_preserves_framebuffer() {
    let mut vm = vm_with("__clear #445566;", 8, 8);
    run_to_halt(&mut vm);

    let before = vm.framebuffer().to_vec();
    vm.load_program(&compile_ok("__print 9;")).unwrap();
    assert_eq!(vm.framebuffer(), &before[..]);

    run_to_halt(&mut vm);
    assert_eq!(vm.print_output(), ["9"]);
}

#[test]
fn test_reset_discards_state() {
    let mut vm = vm_with("__clear #445566; __print 1;", 8, 8);
    run_to_halt(&mut vm);

    vm.reset();
    assert!(vm.print_output().is_empty());
    assert!(vm.framebuffer().iter().all(|&byte| byte == 0));
    assert!(!vm.halted());
}

// ----------------------------------------------------------------------------
// Language behaviour through the whole pipeline

#[test]
fn test_globals_shared_with_functions() {
    let source = "\
let total:int = 0;
fun add(n: int) -> int {
    total = total + n;
    return total;
}
let a:int = add(3);
let b:int = add(4);
__print total;
";
    let mut vm = vm_with(source, 8, 8);
    run_to_halt(&mut vm);
    assert_eq!(vm.print_output(), ["7"]);
}

#[test]
fn test_arrays_and_for_loop() {
    let source = "\
let squares:int[5] = [0, 0, 0, 0, 0];
for (let i:int = 0; i < 5; i = i + 1) {
    squares[i] = i * i;
}
let sum:int = 0;
for (let i:int = 0; i < 5; i = i + 1) {
    sum = sum + squares[i];
}
__print sum;
";
    let mut vm = vm_with(source, 8, 8);
    run_to_halt(&mut vm);
    assert_eq!(vm.print_output(), ["30"]);
}

#[test]
fn test_array_index_out_of_bounds_at_runtime() {
    let source = "\
let a:int[2] = [1, 2];
let i:int = 5;
__print a[i];
";
    let mut vm = vm_with(source, 8, 8);
    let outcome = vm.step(1_000);
    assert!(!outcome.success);
    assert!(outcome.error.unwrap().contains("out of bounds"));
}

#[test]
fn test_casts_between_primitives() {
    let source = "\
__print 7 / 2;
__print 7 as float / 2.0;
__print 3.9 as int;
__print (#0000FF as int) + 1;
__print true as int;
__print 2 as bool;
";
    let mut vm = vm_with(source, 8, 8);
    run_to_halt(&mut vm);
    assert_eq!(
        vm.print_output(),
        ["3", "3.5", "3", "256", "1", "true"]
    );
}

#[test]
fn test_colour_arithmetic_saturates() {
    let source = "\
__print #FF0000 + #020202;
__print #100000 - #200001;
__print #102030 * 2;
";
    let mut vm = vm_with(source, 8, 8);
    run_to_halt(&mut vm);
    assert_eq!(vm.print_output(), ["#FF0202", "#000000", "#204060"]);
}

#[test]
fn test_while_with_nested_scopes() {
    let source = "\
let n:int = 3;
let acc:int = 0;
while (n > 0) {
    let doubled:int = n * 2;
    acc = acc + doubled;
    n = n - 1;
}
__print acc;
";
    let mut vm = vm_with(source, 8, 8);
    run_to_halt(&mut vm);
    assert_eq!(vm.print_output(), ["12"]);
}
