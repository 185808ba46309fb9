//! Entrypoint for CLI
use std::{env, error::Error, fs, process};

use log::info;
use pixardis::{prelude::*, IMPL_VERSION};

static USAGE: &str = r#"
usage: pixardis CMD FILE [CYCLES]

commands:
    build   Compile the source file and print the assembly
    run     Compile the source file and execute it
    exec    Execute a pre-assembled text file

CYCLES bounds execution for run/exec (default 1000000).

examples:
    pixardis build rainbow.pix
    pixardis run rainbow.pix 200000
    pixardis exec rainbow.pasm
"#;

fn compile_file(filepath: &str) -> Result<String, Box<dyn Error>> {
    let source = fs::read_to_string(filepath)?;
    let output = compile(&source);

    if !output.success {
        // Diagnostics go to stderr in the editor format, blank line
        // separated.
        eprintln!("{}", output.errors.join("\n\n"));
        return Err("compilation failed".into());
    }

    Ok(output.assembly)
}

fn run_build(filepath: &str) -> Result<(), Box<dyn Error>> {
    let assembly = compile_file(filepath)?;
    print!("{}", assembly);
    Ok(())
}

fn execute(assembly: &str, cycles: usize) -> Result<(), Box<dyn Error>> {
    let mut vm = PixardisVm::with_conf(PixardisConf::default());
    vm.load_program(assembly)?;

    info!("stepping up to {} cycles", cycles);
    let outcome = vm.step(cycles);

    for line in vm.print_output() {
        println!("{}", line);
    }
    println!("{}", vm.dump_display()?);

    match outcome {
        StepOutcome { success: true, .. } => Ok(()),
        StepOutcome { error, .. } => {
            Err(error.unwrap_or_else(|| "execution failed".to_string()).into())
        }
    }
}

fn run_source(filepath: &str, cycles: usize) -> Result<(), Box<dyn Error>> {
    let assembly = compile_file(filepath)?;
    execute(&assembly, cycles)
}

fn run_assembly(filepath: &str, cycles: usize) -> Result<(), Box<dyn Error>> {
    let assembly = fs::read_to_string(filepath)?;
    execute(&assembly, cycles)
}

fn main() -> Result<(), Box<dyn Error>> {
    simple_logger::SimpleLogger::new().env().init()?;

    match parse_args() {
        Some(Cmd::Build { filepath }) => run_build(&filepath)?,
        Some(Cmd::Run { filepath, cycles }) => run_source(&filepath, cycles)?,
        Some(Cmd::Exec { filepath, cycles }) => run_assembly(&filepath, cycles)?,
        None => {
            print_usage();
            // FreeBSD EX_USAGE (64)
            process::exit(64)
        }
    }

    Ok(())
}

const DEFAULT_CYCLES: usize = 1_000_000;

enum Cmd {
    Build { filepath: String },
    Run { filepath: String, cycles: usize },
    Exec { filepath: String, cycles: usize },
}

fn parse_args() -> Option<Cmd> {
    let mut args = env::args().skip(1);
    let cmd = args.next()?;
    let filepath = args.next()?;
    let cycles = match args.next() {
        Some(count) => count.parse().ok()?,
        None => DEFAULT_CYCLES,
    };

    match cmd.as_str() {
        "build" => Some(Cmd::Build { filepath }),
        "run" => Some(Cmd::Run { filepath, cycles }),
        "exec" => Some(Cmd::Exec { filepath, cycles }),
        _ => None,
    }
}

fn print_usage() {
    println!("Pixardis v{IMPL_VERSION}");
    println!("{USAGE}");
}
