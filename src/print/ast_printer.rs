//! Indented tree dump used by `--print-ast`. A debugging aid, not part of
//! the compiler's correctness argument.

use std::fmt::Write;

use crate::parser::ast_nodes::{NodeId, NodeKind, Tree};

pub fn print_tree(tree: &Tree, root: NodeId) -> String {
    let mut out = String::new();
    write_node(tree, root, 0, &mut out);
    out
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn write_node(tree: &Tree, id: NodeId, depth: usize, out: &mut String) {
    indent(out, depth);
    match &tree.get(id).kind {
        NodeKind::Program { function } => {
            out.push_str("Program\n");
            write_node(tree, *function, depth + 1, out);
        }
        NodeKind::Function { name, body } => {
            let _ = writeln!(out, "Function {name}");
            for &stmt in body {
                write_node(tree, stmt, depth + 1, out);
            }
        }
        NodeKind::ReturnStmt { value } => {
            out.push_str("Return\n");
            write_node(tree, *value, depth + 1, out);
        }
        NodeKind::VarDecl { name, init } => {
            let _ = writeln!(out, "VarDecl {name}");
            if let Some(init) = init {
                write_node(tree, *init, depth + 1, out);
            }
        }
        NodeKind::VarRef { name } => {
            let _ = writeln!(out, "VarRef {name}");
        }
        NodeKind::Assignment { name, value } => {
            let _ = writeln!(out, "Assignment {name}");
            write_node(tree, *value, depth + 1, out);
        }
        NodeKind::IntLiteral { value } => {
            let _ = writeln!(out, "IntLiteral {value}");
        }
        NodeKind::UnaryOp { op, operand } => {
            let _ = writeln!(out, "UnaryOp {op:?}");
            write_node(tree, *operand, depth + 1, out);
        }
        NodeKind::BinaryOp { op, left, right } => {
            let _ = writeln!(out, "BinaryOp {op:?}");
            write_node(tree, *left, depth + 1, out);
            write_node(tree, *right, depth + 1, out);
        }
        NodeKind::Ternary {
            condition,
            then_branch,
            else_branch,
        } => {
            out.push_str("Ternary\n");
            write_node(tree, *condition, depth + 1, out);
            write_node(tree, *then_branch, depth + 1, out);
            write_node(tree, *else_branch, depth + 1, out);
        }
        NodeKind::IfStmt {
            condition,
            then_branch,
            else_branch,
        } => {
            out.push_str("If\n");
            write_node(tree, *condition, depth + 1, out);
            write_node(tree, *then_branch, depth + 1, out);
            if let Some(else_branch) = else_branch {
                write_node(tree, *else_branch, depth + 1, out);
            }
        }
        NodeKind::WhileStmt { condition, body, is_do_while } => {
            let _ = writeln!(out, "While do_while={is_do_while}");
            write_node(tree, *condition, depth + 1, out);
            write_node(tree, *body, depth + 1, out);
        }
        NodeKind::BreakStmt => out.push_str("Break\n"),
        NodeKind::ContinueStmt => out.push_str("Continue\n"),
        NodeKind::Compound { statements } => {
            out.push_str("Compound\n");
            for &stmt in statements {
                write_node(tree, stmt, depth + 1, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::rc::Rc;

    use super::*;
    use crate::diagnostics::Diagnostics;
    use crate::parser::Parser;

    #[test]
    fn prints_nested_structure_with_indentation() {
        let mut diagnostics = Diagnostics::new();
        let file = Rc::new(PathBuf::from("test.c"));
        let parser = Parser::new("int main() { return 1 + 2; }", file, &mut diagnostics);
        let (tree, root) = parser.parse_program();
        let printed = print_tree(&tree, root);
        assert!(printed.starts_with("Program\n"));
        assert!(printed.contains("BinaryOp Plus"));
    }
}
