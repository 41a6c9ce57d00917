//! Single post-parse walk enforcing name resolution and structural rules.
//!
//! The analyzer never stops at the first error — like the parser, it
//! keeps going and reports every distinct problem it finds, relying on
//! the diagnostics sink's fatal flag (checked by the driver) to decide
//! whether IR lowering runs at all.

use crate::diagnostics::{CompilerError, Diagnostics, Level, SourceLocation, codes};
use crate::parser::ast_nodes::{NodeId, NodeKind, Tree};
use crate::semantic::symbol_table::SymbolTable;

pub fn analyze(tree: &Tree, root: NodeId, diagnostics: &mut Diagnostics) {
    let mut analyzer = Analyzer {
        tree,
        diagnostics,
        symbols: SymbolTable::new(),
        loop_depth: 0,
    };

    let NodeKind::Program { function } = &tree.get(root).kind else {
        return;
    };
    let NodeKind::Function { body, .. } = &tree.get(*function).kind else {
        return;
    };
    for &stmt in body {
        analyzer.analyze_statement(stmt);
    }
}

struct Analyzer<'a> {
    tree: &'a Tree,
    diagnostics: &'a mut Diagnostics,
    symbols: SymbolTable,
    loop_depth: u32,
}

impl<'a> Analyzer<'a> {
    fn loc(&self, id: NodeId) -> SourceLocation {
        self.tree.get(id).location.clone()
    }

    fn error(&mut self, id: u32, location: SourceLocation, message: impl Into<String>) {
        self.diagnostics.add(CompilerError::new(id, Level::Semantic, location, message));
    }

    fn error_with_suggestion(&mut self, id: u32, location: SourceLocation, message: impl Into<String>, suggestion: impl Into<String>) {
        self.diagnostics
            .add(CompilerError::new(id, Level::Semantic, location, message).with_suggestion(suggestion));
    }

    fn analyze_statement(&mut self, id: NodeId) {
        match &self.tree.get(id).kind {
            NodeKind::VarDecl { name, init } => {
                let name = name.clone();
                if let Some(init) = init {
                    self.analyze_expression(*init);
                }
                if !self.symbols.declare(&name) {
                    let loc = self.loc(id);
                    self.error(codes::REDEFINITION, loc, format!("redefinition of '{name}'"));
                }
            }
            NodeKind::ReturnStmt { value } => self.analyze_expression(*value),
            NodeKind::IfStmt {
                condition,
                then_branch,
                else_branch,
            } => {
                let (condition, then_branch, else_branch) = (*condition, *then_branch, *else_branch);
                self.analyze_expression(condition);
                self.check_dependent_declaration(then_branch);
                self.analyze_statement(then_branch);
                if let Some(else_branch) = else_branch {
                    self.check_dependent_declaration(else_branch);
                    self.analyze_statement(else_branch);
                }
            }
            NodeKind::WhileStmt { condition, body, .. } => {
                let (condition, body) = (*condition, *body);
                self.analyze_expression(condition);
                self.loop_depth += 1;
                self.analyze_statement(body);
                self.loop_depth -= 1;
            }
            NodeKind::BreakStmt => {
                if self.loop_depth == 0 {
                    let loc = self.loc(id);
                    self.error(codes::BREAK_OUTSIDE_LOOP, loc, "'break' outside any loop");
                }
            }
            NodeKind::ContinueStmt => {
                if self.loop_depth == 0 {
                    let loc = self.loc(id);
                    self.error(codes::CONTINUE_OUTSIDE_LOOP, loc, "'continue' outside any loop");
                }
            }
            NodeKind::Compound { statements } => {
                let statements = statements.clone();
                self.symbols.push_scope();
                for stmt in statements {
                    self.analyze_statement(stmt);
                }
                self.symbols.pop_scope();
            }
            kind if kind.is_expression() => self.analyze_expression(id),
            _ => {}
        }
    }

    fn analyze_expression(&mut self, id: NodeId) {
        match &self.tree.get(id).kind {
            NodeKind::IntLiteral { .. } => {}
            NodeKind::VarRef { name } => {
                if !self.symbols.is_visible(name) {
                    let name = name.clone();
                    let loc = self.loc(id);
                    self.error(codes::UNDEFINED_VARIABLE, loc, format!("use of undeclared variable '{name}'"));
                }
            }
            NodeKind::Assignment { name, value } => {
                let (name, value) = (name.clone(), *value);
                if !self.symbols.is_visible(&name) {
                    let loc = self.loc(id);
                    self.error(codes::UNDEFINED_VARIABLE, loc, format!("use of undeclared variable '{name}'"));
                }
                self.analyze_expression(value);
            }
            NodeKind::UnaryOp { operand, .. } => self.analyze_expression(*operand),
            NodeKind::BinaryOp { left, right, .. } => {
                let (left, right) = (*left, *right);
                self.analyze_expression(left);
                self.analyze_expression(right);
            }
            NodeKind::Ternary {
                condition,
                then_branch,
                else_branch,
            } => {
                let (condition, then_branch, else_branch) = (*condition, *then_branch, *else_branch);
                self.analyze_expression(condition);
                self.analyze_expression(then_branch);
                self.analyze_expression(else_branch);
            }
            _ => {}
        }
    }

    /// Error 3009: `if (c) int x;` is rejected because the declaration
    /// would be unreachable (its scope ends at the statement boundary).
    /// Only the immediate child is checked — see the "dependent-statement
    /// declaration" discussion in the design notes.
    fn check_dependent_declaration(&mut self, branch: NodeId) {
        if let NodeKind::VarDecl { .. } = &self.tree.get(branch).kind {
            let loc = self.loc(branch);
            self.error_with_suggestion(
                codes::DEPENDENT_STATEMENT_DECLARATION,
                loc,
                "a declaration cannot be the sole body of an 'if' branch",
                "use braces {} to create a compound statement",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::rc::Rc;

    use super::*;
    use crate::parser::Parser;

    fn analyze_source(source: &str) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        let file = Rc::new(PathBuf::from("test.c"));
        let parser = Parser::new(source, file, &mut diagnostics);
        let (tree, root) = parser.parse_program();
        analyze(&tree, root, &mut diagnostics);
        diagnostics
    }

    #[test]
    fn well_formed_program_has_no_semantic_errors() {
        let diags = analyze_source("int main() { int x = 1; return x; }");
        assert!(diags.is_empty());
    }

    #[test]
    fn undeclared_variable_is_reported() {
        let diags = analyze_source("int main() { return x; }");
        assert!(diags.errors().iter().any(|e| e.id == codes::UNDEFINED_VARIABLE));
    }

    #[test]
    fn redeclaration_in_same_scope_is_reported() {
        let diags = analyze_source("int main() { int x = 1; int x = 2; return x; }");
        assert!(diags.errors().iter().any(|e| e.id == codes::REDEFINITION));
    }

    #[test]
    fn shadowing_in_nested_compound_is_allowed() {
        let diags = analyze_source("int main() { int x = 1; { int x = 2; } return x; }");
        assert!(diags.is_empty());
    }

    #[test]
    fn break_outside_loop_is_reported() {
        let diags = analyze_source("int main() { break; return 0; }");
        assert!(diags.errors().iter().any(|e| e.id == codes::BREAK_OUTSIDE_LOOP));
    }

    #[test]
    fn break_inside_while_is_allowed() {
        let diags = analyze_source("int main() { while (1) { break; } return 0; }");
        assert!(diags.is_empty());
    }

    #[test]
    fn bare_declaration_as_if_branch_is_reported() {
        let diags = analyze_source("int main() { if (1) int x = 2; return 0; }");
        assert!(diags.errors().iter().any(|e| e.id == codes::DEPENDENT_STATEMENT_DECLARATION));
    }
}
