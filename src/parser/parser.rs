//! Recursive-descent parser over the lexer's token stream.
//!
//! The parser holds exactly one token of lookahead (`current`); every
//! production either consumes it and asks the lexer for the next, or
//! inspects it without consuming. Syntax errors never abort the parse —
//! they are recorded on the diagnostics sink and the parser resynchronizes
//! at the next `;`, `{`, `}`, or EOF, so one bad statement never hides the
//! errors in the rest of the file.

use std::path::PathBuf;
use std::rc::Rc;

use crate::config::{self, MAX_STATEMENTS_PER_BLOCK};
use crate::diagnostics::{CompilerError, Diagnostics, Level, SourceLocation, codes};
use crate::lexer::Lexer;
use crate::lexer::tokens::{Keyword, Operator, Punct, Token, TokenKind};
use crate::parser::ast_nodes::{Node, NodeId, NodeKind, Tree};

pub struct Parser<'src, 'diag> {
    lexer: Lexer<'src>,
    diagnostics: &'diag mut Diagnostics,
    current: Token,
    tree: Tree,
}

impl<'src, 'diag> Parser<'src, 'diag> {
    pub fn new(source: &'src str, file: Rc<PathBuf>, diagnostics: &'diag mut Diagnostics) -> Self {
        let mut lexer = Lexer::new(source, file);
        let current = lexer.next_token(diagnostics);
        let tree = Tree::with_capacity(source.len() * config::SRC_TO_TOKEN_RATIO * config::TOKEN_TO_NODE_RATIO);
        Parser {
            lexer,
            diagnostics,
            current,
            tree,
        }
    }

    /// Parses `program := function` and returns the completed tree together
    /// with the id of the root `Program` node.
    pub fn parse_program(mut self) -> (Tree, NodeId) {
        let start = self.location();
        let root = if self.check_keyword(Keyword::Int) {
            let function = self.parse_function();
            self.alloc(NodeKind::Program { function }, start)
        } else {
            self.error(codes::EXPECTED_FUNCTION, start.clone(), "expected a function definition");
            let placeholder = self.empty_statement(start.clone());
            self.alloc(NodeKind::Program { function: placeholder }, start)
        };
        (self.tree, root)
    }

    // ---- token helpers ----------------------------------------------

    fn location(&self) -> SourceLocation {
        self.current.location.clone()
    }

    fn advance(&mut self) -> Token {
        let next = self.lexer.next_token(self.diagnostics);
        std::mem::replace(&mut self.current, next)
    }

    fn check_keyword(&self, keyword: Keyword) -> bool {
        matches!(&self.current.kind, TokenKind::Keyword(k) if *k == keyword)
    }

    fn check_punct(&self, punct: Punct) -> bool {
        matches!(&self.current.kind, TokenKind::Punct(p) if *p == punct)
    }

    fn check_operator(&self, op: Operator) -> bool {
        matches!(&self.current.kind, TokenKind::Operator(o) if *o == op)
    }

    fn at_end(&self) -> bool {
        matches!(self.current.kind, TokenKind::Eof)
    }

    fn error(&mut self, id: u32, location: SourceLocation, message: impl Into<String>) {
        self.diagnostics.add(CompilerError::new(id, Level::Syntax, location, message));
    }

    fn error_with_suggestion(&mut self, id: u32, location: SourceLocation, message: impl Into<String>, suggestion: impl Into<String>) {
        self.diagnostics
            .add(CompilerError::new(id, Level::Syntax, location, message).with_suggestion(suggestion));
    }

    fn expect_punct(&mut self, punct: Punct, id: u32, what: &str, suggestion: &str) -> bool {
        if self.check_punct(punct) {
            self.advance();
            true
        } else {
            let loc = self.location();
            self.error_with_suggestion(id, loc, format!("expected {what}"), suggestion);
            false
        }
    }

    /// Skips tokens until a synchronization point (`;`, `{`, `}`, EOF).
    /// Consumes a trailing `;` (it closes the bad statement); leaves `{`,
    /// `}` and EOF unconsumed so the caller's own loop structure handles
    /// them naturally.
    fn synchronize(&mut self) {
        loop {
            match &self.current.kind {
                TokenKind::Eof => return,
                TokenKind::Punct(Punct::Semicolon) => {
                    self.advance();
                    return;
                }
                TokenKind::Punct(Punct::LBrace) | TokenKind::Punct(Punct::RBrace) => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    fn alloc(&mut self, kind: NodeKind, location: SourceLocation) -> NodeId {
        self.tree.alloc(Node::new(kind, location))
    }

    fn empty_statement(&mut self, location: SourceLocation) -> NodeId {
        self.alloc(NodeKind::Compound { statements: Vec::new() }, location)
    }

    // ---- grammar ------------------------------------------------------

    fn parse_function(&mut self) -> NodeId {
        let start = self.location();
        self.advance(); // "int"

        let name = match &self.current.kind {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance();
                name
            }
            _ => {
                let loc = self.location();
                self.error(codes::EXPECTED_TOKEN, loc, "expected a function name");
                String::from("main")
            }
        };

        self.expect_punct(Punct::LParen, codes::MISSING_PAREN, "'(' after function name", "add the missing '('");
        self.expect_punct(Punct::RParen, codes::MISSING_PAREN, "')' to close the parameter list", "add the missing ')'");
        self.expect_punct(Punct::LBrace, codes::MISSING_BRACE, "'{' to start the function body", "use braces {} to create a compound statement");

        let body = self.parse_statement_list();

        self.expect_punct(Punct::RBrace, codes::MISSING_BRACE, "'}' to close the function body", "add the missing '}'");

        self.alloc(NodeKind::Function { name, body }, start)
    }

    /// Parses the `statement*` inside a `{ ... }`, stopping at `}`, EOF, or
    /// the statement cap (error 4001). Guarantees forward progress even
    /// when a statement fails to parse and resynchronization does not move
    /// the cursor.
    fn parse_statement_list(&mut self) -> Vec<NodeId> {
        let mut statements = Vec::new();
        while !self.check_punct(Punct::RBrace) && !self.at_end() {
            if statements.len() >= MAX_STATEMENTS_PER_BLOCK {
                let loc = self.location();
                self.diagnostics.add(CompilerError::new(
                    codes::LIMIT_EXCEEDED,
                    Level::Codegen,
                    loc,
                    format!("block exceeds the maximum of {MAX_STATEMENTS_PER_BLOCK} statements"),
                ));
                break;
            }
            let before = self.current.location.start_byte;
            if let Some(stmt) = self.parse_statement() {
                statements.push(stmt);
            }
            if self.current.location.start_byte == before && !self.at_end() {
                self.advance();
            }
        }
        statements
    }

    fn parse_statement(&mut self) -> Option<NodeId> {
        match &self.current.kind {
            TokenKind::Keyword(Keyword::Int) => Some(self.parse_declaration()),
            TokenKind::Keyword(Keyword::Return) => Some(self.parse_return()),
            TokenKind::Keyword(Keyword::If) => Some(self.parse_if()),
            TokenKind::Keyword(Keyword::While) => Some(self.parse_while()),
            TokenKind::Keyword(Keyword::Break) => Some(self.parse_break()),
            TokenKind::Keyword(Keyword::Continue) => Some(self.parse_continue()),
            TokenKind::Punct(Punct::LBrace) => Some(self.parse_compound()),
            TokenKind::Keyword(Keyword::Else) | TokenKind::Keyword(Keyword::Do) => {
                let loc = self.location();
                self.error(codes::EXPECTED_STATEMENT, loc, "expected a statement here");
                self.synchronize();
                None
            }
            _ => Some(self.parse_expr_stmt()),
        }
    }

    fn parse_declaration(&mut self) -> NodeId {
        let start = self.location();
        self.advance(); // "int"

        let name = match &self.current.kind {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance();
                name
            }
            _ => {
                let loc = self.location();
                self.error(codes::EXPECTED_TOKEN, loc, "expected a variable name");
                String::new()
            }
        };

        let init = if self.check_operator(Operator::Assign) {
            self.advance();
            Some(self.parse_expression())
        } else {
            None
        };

        self.expect_punct(Punct::Semicolon, codes::MISSING_SEMICOLON, "';' after declaration", "add a semicolon");

        self.alloc(NodeKind::VarDecl { name, init }, start)
    }

    fn parse_return(&mut self) -> NodeId {
        let start = self.location();
        self.advance(); // "return"
        let value = self.parse_expression();
        self.expect_punct(Punct::Semicolon, codes::MISSING_SEMICOLON, "';' after return value", "add a semicolon");
        self.alloc(NodeKind::ReturnStmt { value }, start)
    }

    fn parse_if(&mut self) -> NodeId {
        let start = self.location();
        self.advance(); // "if"
        self.expect_punct(Punct::LParen, codes::MISSING_PAREN, "'(' after 'if'", "add the missing '('");
        let condition = self.parse_expression();
        self.expect_punct(Punct::RParen, codes::MISSING_PAREN, "')' after if condition", "add the missing ')'");

        let then_branch = self.parse_statement().unwrap_or_else(|| {
            let loc = self.location();
            self.empty_statement(loc)
        });

        let else_branch = if self.check_keyword(Keyword::Else) {
            self.advance();
            Some(self.parse_statement().unwrap_or_else(|| {
                let loc = self.location();
                self.empty_statement(loc)
            }))
        } else {
            None
        };

        self.alloc(
            NodeKind::IfStmt {
                condition,
                then_branch,
                else_branch,
            },
            start,
        )
    }

    fn parse_while(&mut self) -> NodeId {
        let start = self.location();
        self.advance(); // "while"
        self.expect_punct(Punct::LParen, codes::MISSING_PAREN, "'(' after 'while'", "add the missing '('");
        let condition = self.parse_expression();
        self.expect_punct(Punct::RParen, codes::MISSING_PAREN, "')' after while condition", "add the missing ')'");
        let body = self.parse_statement().unwrap_or_else(|| {
            let loc = self.location();
            self.empty_statement(loc)
        });
        self.alloc(
            NodeKind::WhileStmt {
                condition,
                body,
                is_do_while: false,
            },
            start,
        )
    }

    fn parse_break(&mut self) -> NodeId {
        let start = self.location();
        self.advance();
        self.expect_punct(Punct::Semicolon, codes::MISSING_SEMICOLON, "';' after 'break'", "add a semicolon");
        self.alloc(NodeKind::BreakStmt, start)
    }

    fn parse_continue(&mut self) -> NodeId {
        let start = self.location();
        self.advance();
        self.expect_punct(Punct::Semicolon, codes::MISSING_SEMICOLON, "';' after 'continue'", "add a semicolon");
        self.alloc(NodeKind::ContinueStmt, start)
    }

    fn parse_compound(&mut self) -> NodeId {
        let start = self.location();
        self.advance(); // "{"
        let statements = self.parse_statement_list();
        self.expect_punct(Punct::RBrace, codes::MISSING_BRACE, "'}' to close the block", "add the missing '}'");
        self.alloc(NodeKind::Compound { statements }, start)
    }

    fn parse_expr_stmt(&mut self) -> NodeId {
        let expr = self.parse_expression();
        self.expect_punct(Punct::Semicolon, codes::MISSING_SEMICOLON, "';' after expression", "add a semicolon");
        expr
    }

    // ---- expressions, by precedence ------------------------------------

    fn parse_expression(&mut self) -> NodeId {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> NodeId {
        let left = self.parse_ternary();

        if self.check_operator(Operator::Assign) {
            let loc = self.tree.get(left).location.clone();
            self.advance();
            let value = self.parse_assignment();

            if let NodeKind::VarRef { name } = &self.tree.get(left).kind {
                let name = name.clone();
                return self.alloc(NodeKind::Assignment { name, value }, loc);
            }

            self.error(codes::INVALID_ASSIGNMENT_TARGET, loc, "left-hand side of '=' must be a variable");
            return left;
        }

        left
    }

    fn parse_ternary(&mut self) -> NodeId {
        let condition = self.parse_logical_or();
        if self.check_punct(Punct::Question) {
            let loc = self.location();
            self.advance();
            let then_branch = self.parse_expression();
            self.expect_punct(Punct::Colon, codes::MISSING_OPERATOR, "':' in ternary expression", "add the missing ':'");
            let else_branch = self.parse_ternary();
            return self.alloc(
                NodeKind::Ternary {
                    condition,
                    then_branch,
                    else_branch,
                },
                loc,
            );
        }
        condition
    }

    fn parse_logical_or(&mut self) -> NodeId {
        let mut left = self.parse_logical_and();
        while self.check_operator(Operator::OrOr) {
            let loc = self.location();
            self.advance();
            let right = self.parse_logical_and();
            left = self.alloc(NodeKind::BinaryOp { op: Operator::OrOr, left, right }, loc);
        }
        left
    }

    fn parse_logical_and(&mut self) -> NodeId {
        let mut left = self.parse_equality();
        while self.check_operator(Operator::AndAnd) {
            let loc = self.location();
            self.advance();
            let right = self.parse_equality();
            left = self.alloc(NodeKind::BinaryOp { op: Operator::AndAnd, left, right }, loc);
        }
        left
    }

    fn parse_equality(&mut self) -> NodeId {
        let mut left = self.parse_relational();
        loop {
            let op = match &self.current.kind {
                TokenKind::Operator(op @ (Operator::Eq | Operator::NotEq)) => *op,
                _ => break,
            };
            let loc = self.location();
            self.advance();
            let right = self.parse_relational();
            left = self.alloc(NodeKind::BinaryOp { op, left, right }, loc);
        }
        left
    }

    fn parse_relational(&mut self) -> NodeId {
        let mut left = self.parse_additive();
        loop {
            let op = match &self.current.kind {
                TokenKind::Operator(op @ (Operator::Lt | Operator::Gt | Operator::LtEq | Operator::GtEq)) => *op,
                _ => break,
            };
            let loc = self.location();
            self.advance();
            let right = self.parse_additive();
            left = self.alloc(NodeKind::BinaryOp { op, left, right }, loc);
        }
        left
    }

    fn parse_additive(&mut self) -> NodeId {
        let mut left = self.parse_multiplicative();
        loop {
            let op = match &self.current.kind {
                TokenKind::Operator(op @ (Operator::Plus | Operator::Minus)) => *op,
                _ => break,
            };
            let loc = self.location();
            self.advance();
            let right = self.parse_multiplicative();
            left = self.alloc(NodeKind::BinaryOp { op, left, right }, loc);
        }
        left
    }

    fn parse_multiplicative(&mut self) -> NodeId {
        let mut left = self.parse_unary();
        loop {
            let op = match &self.current.kind {
                TokenKind::Operator(op @ (Operator::Star | Operator::Slash | Operator::Percent)) => *op,
                _ => break,
            };
            let loc = self.location();
            self.advance();
            let right = self.parse_unary();
            left = self.alloc(NodeKind::BinaryOp { op, left, right }, loc);
        }
        left
    }

    fn parse_unary(&mut self) -> NodeId {
        let op = match &self.current.kind {
            TokenKind::Operator(op @ (Operator::Bang | Operator::Tilde | Operator::Minus)) => *op,
            _ => return self.parse_primary(),
        };
        let loc = self.location();
        self.advance();
        let operand = self.parse_unary();
        self.alloc(NodeKind::UnaryOp { op, operand }, loc)
    }

    fn parse_primary(&mut self) -> NodeId {
        let loc = self.location();
        match self.current.kind.clone() {
            TokenKind::IntLiteral(value) => {
                self.advance();
                self.alloc(NodeKind::IntLiteral { value }, loc)
            }
            TokenKind::Identifier(name) => {
                self.advance();
                self.alloc(NodeKind::VarRef { name }, loc)
            }
            TokenKind::Punct(Punct::LParen) => {
                self.advance();
                let inner = self.parse_expression();
                self.expect_punct(Punct::RParen, codes::MISSING_PAREN, "')' to close the expression", "add the missing ')'");
                inner
            }
            _ => {
                self.error(codes::EXPECTED_EXPRESSION, loc.clone(), "expected an expression");
                self.alloc(NodeKind::IntLiteral { value: 0 }, loc)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> (Tree, NodeId, Diagnostics) {
        let mut diagnostics = Diagnostics::new();
        let file = Rc::new(PathBuf::from("test.c"));
        let parser = Parser::new(source, file, &mut diagnostics);
        let (tree, root) = parser.parse_program();
        (tree, root, diagnostics)
    }

    fn function_body<'a>(tree: &'a Tree, root: NodeId) -> &'a [NodeId] {
        let NodeKind::Program { function } = &tree.get(root).kind else {
            panic!("expected Program root");
        };
        let NodeKind::Function { body, .. } = &tree.get(*function).kind else {
            panic!("expected Function node");
        };
        body
    }

    #[test]
    fn parses_minimal_return_function() {
        let (tree, root, diags) = parse("int main() { return 42; }");
        assert!(diags.is_empty());
        let body = function_body(&tree, root);
        assert_eq!(body.len(), 1);
        match &tree.get(body[0]).kind {
            NodeKind::ReturnStmt { value } => match &tree.get(*value).kind {
                NodeKind::IntLiteral { value } => assert_eq!(*value, 42),
                other => panic!("unexpected node {other:?}"),
            },
            other => panic!("unexpected node {other:?}"),
        }
    }

    #[test]
    fn respects_arithmetic_precedence() {
        let (tree, root, diags) = parse("int main() { return 1 + 2 * 3; }");
        assert!(diags.is_empty());
        let body = function_body(&tree, root);
        let NodeKind::ReturnStmt { value } = &tree.get(body[0]).kind else {
            panic!("expected return");
        };
        let NodeKind::BinaryOp { op: Operator::Plus, left, right } = &tree.get(*value).kind else {
            panic!("expected top-level '+'");
        };
        assert!(matches!(tree.get(*left).kind, NodeKind::IntLiteral { value: 1 }));
        assert!(matches!(tree.get(*right).kind, NodeKind::BinaryOp { op: Operator::Star, .. }));
    }

    #[test]
    fn assignment_is_right_associative() {
        let (tree, root, diags) = parse("int main() { int a = 0; int b = 0; a = b = 5; return a; }");
        assert!(diags.is_empty());
        let body = function_body(&tree, root);
        // statements[2] is the chained assignment expression-statement.
        let NodeKind::Assignment { name, value } = &tree.get(body[2]).kind else {
            panic!("expected outer assignment");
        };
        assert_eq!(name, "a");
        assert!(matches!(tree.get(*value).kind, NodeKind::Assignment { .. }));
    }

    #[test]
    fn non_variable_assignment_target_reports_invalid_target() {
        let (_, _, diags) = parse("int main() { 1 = 2; return 0; }");
        assert!(diags.errors().iter().any(|e| e.id == codes::INVALID_ASSIGNMENT_TARGET));
    }

    #[test]
    fn missing_semicolon_is_reported_and_recovers() {
        let (tree, root, diags) = parse("int main() { int a = 1 return a; }");
        assert!(diags.errors().iter().any(|e| e.id == codes::MISSING_SEMICOLON));
        // Recovery still yields a two-statement body.
        assert_eq!(function_body(&tree, root).len(), 2);
    }

    #[test]
    fn dangling_else_is_a_syntax_error() {
        let (_, _, diags) = parse("int main() { else return 0; }");
        assert!(diags.errors().iter().any(|e| e.id == codes::EXPECTED_STATEMENT));
    }

    #[test]
    fn ternary_is_right_associative_and_binds_looser_than_or() {
        let (tree, root, diags) = parse("int main() { return 1 || 0 ? 2 : 3; }");
        assert!(diags.is_empty());
        let body = function_body(&tree, root);
        let NodeKind::ReturnStmt { value } = &tree.get(body[0]).kind else {
            panic!("expected return");
        };
        assert!(matches!(tree.get(*value).kind, NodeKind::Ternary { .. }));
    }
}
