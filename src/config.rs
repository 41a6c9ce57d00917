//! Compiler-wide configuration and tuning constants.
//!
//! There is no project manifest in this subset — the accepted language is
//! a single source file with no module system — so configuration is just
//! what the CLI gathered from argv, plus a handful of named sizing
//! heuristics that would otherwise be scattered as magic numbers through
//! the arena-allocation call sites.

use std::path::PathBuf;

/// Rough guess at how many tokens a byte of source produces, used only to
/// pre-size the token arena and avoid a string of small reallocations on
/// anything but a trivial program. Purely a performance hint; an arena
/// that guesses wrong just reallocates.
pub const SRC_TO_TOKEN_RATIO: usize = 3;

/// Rough guess at how many tree nodes a token produces.
pub const TOKEN_TO_NODE_RATIO: usize = 2;

/// Rough guess at how many locals the smallest common function body
/// declares, used to pre-size a function's symbol scope.
pub const MINIMUM_LIKELY_LOCALS: usize = 4;

/// Hard cap on statements in a single block. This subset has no use for
/// deeply pathological input, and the cap exists purely so the parser's
/// statement-list loop has a bound to report against (error 4001) instead
/// of exhausting the arena on adversarial input.
pub const MAX_STATEMENTS_PER_BLOCK: usize = 4096;

/// Default output path when `-o` is not given.
pub const DEFAULT_OUTPUT_PATH: &str = "out.wasm";

/// What the driver was asked to do, assembled by the CLI layer from argv.
#[derive(Debug, Clone)]
pub struct CompilerConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub print_ast: bool,
    pub print_ir: bool,
    pub disable_timers: bool,
}

impl CompilerConfig {
    pub fn new(input_path: PathBuf) -> Self {
        CompilerConfig {
            input_path,
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            print_ast: false,
            print_ir: false,
            disable_timers: false,
        }
    }
}
