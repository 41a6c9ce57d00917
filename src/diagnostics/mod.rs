//! Compiler diagnostics.
//!
//! Every phase collects [`CompilerError`]s into a single [`Diagnostics`]
//! sink rather than raising them; a sticky "fatal" flag records whether any
//! non-warning diagnostic was ever added, and the driver consults that flag
//! (never an exception or early return) to decide whether later phases run.

mod display;
pub mod codes;

use std::path::PathBuf;
use std::rc::Rc;

pub use display::print_diagnostics;

/// (filename, line, column) plus the absolute byte offset range into the
/// source buffer that a token or tree node came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: Rc<PathBuf>,
    pub line: u32,
    pub column: u32,
    pub start_byte: u32,
    pub end_byte: u32,
}

impl SourceLocation {
    pub fn new(file: Rc<PathBuf>, line: u32, column: u32, start_byte: u32, end_byte: u32) -> Self {
        SourceLocation {
            file,
            line,
            column,
            start_byte,
            end_byte,
        }
    }
}

/// Severity of a diagnostic. Only `Warning` is non-fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Lexical,
    Syntax,
    Semantic,
    Codegen,
    Warning,
}

impl Level {
    fn is_fatal(self) -> bool {
        !matches!(self, Level::Warning)
    }

    fn label(self) -> &'static str {
        match self {
            Level::Warning => "warning",
            _ => "error",
        }
    }
}

/// A single diagnostic: a stable numeric id (see the taxonomy in the
/// design doc — 1xxx lexical, 2xxx syntax, 3xxx semantic, 4xxx codegen),
/// a level, a location, a message, and an optional actionable suggestion.
#[derive(Debug, Clone)]
pub struct CompilerError {
    pub id: u32,
    pub level: Level,
    pub location: SourceLocation,
    pub message: String,
    pub suggestion: Option<String>,
}

impl CompilerError {
    pub fn new(id: u32, level: Level, location: SourceLocation, message: impl Into<String>) -> Self {
        CompilerError {
            id,
            level,
            location,
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Collects diagnostics for one compilation and tracks the sticky fatal flag.
#[derive(Debug, Default)]
pub struct Diagnostics {
    errors: Vec<CompilerError>,
    fatal: bool,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics::default()
    }

    pub fn add(&mut self, error: CompilerError) {
        if error.level.is_fatal() {
            self.fatal = true;
        }
        self.errors.push(error);
    }

    pub fn has_fatal(&self) -> bool {
        self.fatal
    }

    pub fn errors(&self) -> &[CompilerError] {
        &self.errors
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Formats and prints every collected diagnostic to stdout, in the
    /// order they were recorded, reading `source` for context lines.
    pub fn print(&self, source: &str) {
        print_diagnostics(&self.errors, source);
    }
}

pub(crate) fn level_label(level: Level) -> &'static str {
    level.label()
}
