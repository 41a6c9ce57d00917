//! Renders collected diagnostics to stdout.
//!
//! Format is fixed by the external interface contract:
//! `filename:line:column: id N error|warning: message`, followed by the
//! offending source line, a caret under the offending span, and an
//! optional `note: <suggestion>` line.

use super::{CompilerError, Level, level_label};
use saying::say;

pub fn print_diagnostics(errors: &[CompilerError], source: &str) {
    for error in errors {
        print_one(error, source);
    }
}

fn print_one(error: &CompilerError, source: &str) {
    let loc = &error.location;
    let file = loc.file.display();
    let line = loc.line;
    let column = loc.column;
    let label = level_label(error.level);

    print!("{file}:{line}:{column}: id {} ", error.id);
    match error.level {
        Level::Warning => say!(Yellow {label}),
        _ => say!(Red {label}),
    }
    println!(": {}", error.message);

    if let Some(context_line) = nth_line(source, line) {
        println!("{context_line}");
        let indent = column.saturating_sub(1) as usize;
        let span = underline_width(loc.start_byte, loc.end_byte);
        println!("{}{}", " ".repeat(indent), "^".repeat(span));
    }

    if let Some(suggestion) = &error.suggestion {
        say!(Bright Black "note: ", {suggestion.as_str()});
    }
}

/// 1-based line lookup by scanning to the n-th newline, as the design
/// requires ("obtained lazily by scanning the buffer"). Source files in
/// this subset are small (one function), so this is not a hot path.
fn nth_line(source: &str, line: u32) -> Option<&str> {
    source.lines().nth(line.saturating_sub(1) as usize)
}

fn underline_width(start_byte: u32, end_byte: u32) -> usize {
    end_byte.saturating_sub(start_byte).max(1) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nth_line_is_one_indexed() {
        let source = "int main() {\n    return 1;\n}\n";
        assert_eq!(nth_line(source, 1), Some("int main() {"));
        assert_eq!(nth_line(source, 2), Some("    return 1;"));
        assert_eq!(nth_line(source, 99), None);
    }

    #[test]
    fn underline_width_is_at_least_one() {
        assert_eq!(underline_width(4, 4), 1);
        assert_eq!(underline_width(4, 7), 3);
    }
}
