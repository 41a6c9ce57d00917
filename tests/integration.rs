//! End-to-end tests driving the compiled `wacc` binary as a subprocess.
//!
//! This is a bin-only crate, so these scenarios exercise the thing the unit
//! tests can't: the actual CLI surface, file I/O, and (for the positive
//! scenarios) executing the emitted module in a real WASM runtime.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn wacc_bin() -> &'static str {
    env!("CARGO_BIN_EXE_wacc")
}

fn compile(dir: &Path, source: &str) -> (Output, PathBuf) {
    let input_path = dir.join("input.c");
    std::fs::write(&input_path, source).unwrap();
    let output_path = dir.join("output.wasm");

    let output = Command::new(wacc_bin())
        .arg(&input_path)
        .arg("-o")
        .arg(&output_path)
        .output()
        .expect("failed to run wacc");

    (output, output_path)
}

fn run_and_expect(source: &str, expected: i32) {
    let dir = tempfile::tempdir().unwrap();
    let (output, wasm_path) = compile(dir.path(), source);
    assert!(
        output.status.success(),
        "compilation of `{source}` failed: {}",
        String::from_utf8_lossy(&output.stdout)
    );

    let bytes = std::fs::read(&wasm_path).expect("compiler did not write an output file");

    let engine = wasmtime::Engine::default();
    let module = wasmtime::Module::new(&engine, &bytes).expect("emitted module failed to parse");
    let mut store = wasmtime::Store::new(&engine, ());
    let instance = wasmtime::Instance::new(&mut store, &module, &[]).expect("failed to instantiate module");
    let main = instance
        .get_typed_func::<(), i32>(&mut store, "main")
        .expect("module does not export a callable `main`");
    let result = main.call(&mut store, ()).expect("trapped during execution");

    assert_eq!(result, expected, "`{source}` returned {result}, expected {expected}");
}

fn expect_diagnostic(source: &str, code: u32) {
    let dir = tempfile::tempdir().unwrap();
    let (output, wasm_path) = compile(dir.path(), source);
    assert!(!output.status.success(), "`{source}` unexpectedly compiled successfully");
    assert!(
        !wasm_path.exists(),
        "`{source}` should not have produced an output file"
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains(&code.to_string()),
        "expected diagnostic {code} in output for `{source}`, got:\n{stdout}"
    );
}

#[test]
fn returns_a_constant() {
    run_and_expect("int main() { return 42; }", 42);
}

#[test]
fn unary_operators_compose() {
    run_and_expect("int main() { return -(~2 + 1); }", 2);
}

#[test]
fn locals_and_arithmetic() {
    run_and_expect("int main() { int a = 3; int b = 4; return a*a + b*b; }", 25);
}

#[test]
fn short_circuit_and_in_if_condition() {
    run_and_expect(
        "int main() { int x = 0; if (1 && (2 > 1)) x = 7; else x = 9; return x; }",
        7,
    );
}

#[test]
fn while_loop_accumulates() {
    run_and_expect(
        "int main() { int i = 0; int s = 0; while (i < 5) { s = s + i; i = i + 1; } return s; }",
        10,
    );
}

#[test]
fn nested_ternary_is_right_associative() {
    run_and_expect("int main() { return 1 ? 2 ? 3 : 4 : 5; }", 3);
}

#[test]
fn missing_semicolon_is_reported() {
    expect_diagnostic("int main() { return 42 }", 2003);
}

#[test]
fn undefined_variable_is_reported() {
    expect_diagnostic("int main() { return x; }", 3001);
}

#[test]
fn redeclaring_a_local_is_reported() {
    expect_diagnostic("int main() { int x; int x; return x; }", 3004);
}

#[test]
fn break_outside_loop_is_reported() {
    expect_diagnostic("int main() { break; }", 3007);
}

#[test]
fn bare_declaration_as_if_branch_is_reported() {
    expect_diagnostic("int main() { if (1) int x = 0; return 0; }", 3009);
}
