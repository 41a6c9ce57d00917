//! Orchestrates the phases in order, gating each on the diagnostics
//! sink's fatal flag. No phase is skipped for any reason other than a
//! fatal diagnostic or an early `--print-*` exit.

use std::fs;
use std::rc::Rc;
#[cfg(feature = "detailed_timers")]
use std::time::Instant;

use crate::codegen;
use crate::config::CompilerConfig;
use crate::diagnostics::Diagnostics;
use crate::ir;
use crate::parser::Parser;
use crate::print;
use crate::semantic;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;

/// Runs the pipeline, catching any internal panic (an arena `Id` that
/// doesn't resolve, an IR region with no parent — a bug in this compiler,
/// never a reaction to malformed user input) at this boundary so it is
/// reported as a single "compiler bug" diagnostic rather than an uncaught
/// panic reaching the user's terminal.
pub fn run(config: &CompilerConfig) -> i32 {
    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| run_pipeline(config))) {
        Ok(exit_code) => exit_code,
        Err(payload) => {
            eprintln!("error: internal compiler error: {}", panic_message(&payload));
            eprintln!("this is a compiler bug, not a problem with the input program");
            EXIT_FAILURE
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

fn run_pipeline(config: &CompilerConfig) -> i32 {
    let source = match fs::read_to_string(&config.input_path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("error: could not read '{}': {err}", config.input_path.display());
            return EXIT_FAILURE;
        }
    };

    let file = Rc::new(config.input_path.clone());
    let mut diagnostics = Diagnostics::new();

    #[cfg(feature = "show_tokens")]
    trace_tokens(&source, file.clone());

    let (tree, root) = time_phase(config, "parse", || {
        let parser = Parser::new(&source, file.clone(), &mut diagnostics);
        parser.parse_program()
    });

    if diagnostics.has_fatal() {
        diagnostics.print(&source);
        return EXIT_FAILURE;
    }

    time_phase(config, "semantic analysis", || {
        semantic::analyze(&tree, root, &mut diagnostics);
    });

    if diagnostics.has_fatal() {
        diagnostics.print(&source);
        return EXIT_FAILURE;
    }

    if config.print_ast {
        print!("{}", print::print_tree(&tree, root));
        return EXIT_SUCCESS;
    }

    let lowered = time_phase(config, "IR lowering", || ir::lower(&tree, root));

    #[cfg(feature = "show_ir")]
    print!("{}", print::print_function(&lowered));

    if config.print_ir {
        print!("{}", print::print_function(&lowered));
        return EXIT_SUCCESS;
    }

    let module = time_phase(config, "codegen", || codegen::emit(&lowered, file, &mut diagnostics));

    let Some(module) = module else {
        diagnostics.print(&source);
        return EXIT_FAILURE;
    };

    if let Err(err) = fs::write(&config.output_path, module) {
        eprintln!("error: could not write '{}': {err}", config.output_path.display());
        return EXIT_FAILURE;
    }

    EXIT_SUCCESS
}

#[cfg(feature = "detailed_timers")]
fn time_phase<T>(config: &CompilerConfig, phase: &str, f: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let result = f();
    if !config.disable_timers {
        let elapsed = start.elapsed();
        println!("timing: {phase} took {elapsed:?}");
    }
    result
}

#[cfg(not(feature = "detailed_timers"))]
fn time_phase<T>(_config: &CompilerConfig, _phase: &str, f: impl FnOnce() -> T) -> T {
    f()
}

#[cfg(feature = "show_tokens")]
fn trace_tokens(source: &str, file: Rc<std::path::PathBuf>) {
    use crate::lexer::Lexer;

    let mut scratch = Diagnostics::new();
    let mut lexer = Lexer::new(source, file);
    loop {
        let token = lexer.next_token(&mut scratch);
        let is_eof = token.is_eof();
        println!("token: {:?}", token.kind);
        if is_eof {
            break;
        }
    }
}
