//! Stable numeric diagnostic ids, grouped by phase.
//!
//! 1xxx lexical, 2xxx syntax, 3xxx semantic, 4xxx codegen. Names here are
//! the single source of truth for the taxonomy; call sites should always
//! reach for a named constant rather than an inline literal.

// Lexical
pub const INVALID_CHARACTER: u32 = 1001;
pub const UNTERMINATED_STRING: u32 = 1002;
pub const UNTERMINATED_COMMENT: u32 = 1003;
pub const INVALID_ESCAPE: u32 = 1004;
pub const NUMBER_TOO_LARGE: u32 = 1005;

// Syntax
pub const EXPECTED_TOKEN: u32 = 2001;
pub const UNEXPECTED_TOKEN: u32 = 2002;
pub const MISSING_SEMICOLON: u32 = 2003;
pub const MISSING_BRACE: u32 = 2004;
pub const MISSING_PAREN: u32 = 2005;
pub const MALFORMED_EXPRESSION: u32 = 2006;
pub const EXPECTED_FUNCTION: u32 = 2007;
pub const EXPECTED_STATEMENT: u32 = 2008;
pub const EXPECTED_EXPRESSION: u32 = 2009;
pub const MISSING_OPERATOR: u32 = 2010;

// Semantic
pub const UNDEFINED_VARIABLE: u32 = 3001;
pub const UNDEFINED_FUNCTION: u32 = 3002;
pub const TYPE_MISMATCH: u32 = 3003;
pub const REDEFINITION: u32 = 3004;
pub const INVALID_ASSIGNMENT_TARGET: u32 = 3005;
pub const INVALID_CALL: u32 = 3006;
pub const BREAK_OUTSIDE_LOOP: u32 = 3007;
pub const CONTINUE_OUTSIDE_LOOP: u32 = 3008;
pub const DEPENDENT_STATEMENT_DECLARATION: u32 = 3009;

// Codegen
pub const LIMIT_EXCEEDED: u32 = 4001;
pub const INVALID_MEMORY_ACCESS: u32 = 4002;
pub const UNSUPPORTED_OPERATION: u32 = 4003;
