//! Lowers a validated tree into the structured IR.
//!
//! Only reached once the semantic analyzer has cleared the fatal flag, so
//! every name lookup here is an invariant, not user input — an unresolved
//! `resolve` is an internal bug, not a diagnosable error, and is allowed
//! to panic.

use rustc_hash::FxHashMap;

use crate::arena::Arena;
use crate::ir::nodes::{Instruction, LoweredFunction, Region, RegionId, RegionKind, StreamItem};
use crate::lexer::tokens::Operator;
use crate::parser::ast_nodes::{NodeId, NodeKind, Tree};

pub fn lower(tree: &Tree, root: NodeId) -> LoweredFunction {
    let NodeKind::Program { function } = &tree.get(root).kind else {
        panic!("lowering requires a Program root");
    };
    let NodeKind::Function { name, body } = &tree.get(*function).kind else {
        panic!("lowering requires Program to wrap a Function");
    };
    let name = name.clone();
    let body = body.clone();

    let mut lowering = Lowering {
        tree,
        regions: Arena::new(),
        scopes: vec![FxHashMap::default()],
        next_slot: 0,
    };

    let mut stream = Vec::new();
    for stmt in body {
        stream.extend(lowering.lower_statement(stmt));
    }
    let function_region = lowering.regions.alloc(Region { kind: RegionKind::Function, stream });

    LoweredFunction {
        name,
        local_count: lowering.next_slot,
        body: function_region,
        regions: lowering.regions,
    }
}

struct Lowering<'a> {
    tree: &'a Tree,
    regions: Arena<Region>,
    scopes: Vec<FxHashMap<String, u32>>,
    next_slot: u32,
}

impl<'a> Lowering<'a> {
    fn push_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    fn declare_local(&mut self, name: String) -> u32 {
        let slot = self.next_slot;
        self.next_slot += 1;
        self.scopes.last_mut().expect("at least one scope").insert(name, slot);
        slot
    }

    fn resolve(&self, name: &str) -> u32 {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
            .copied()
            .unwrap_or_else(|| panic!("unresolved variable '{name}' reached IR lowering"))
    }

    fn block(&mut self, stream: Vec<StreamItem>) -> RegionId {
        self.regions.alloc(Region { kind: RegionKind::Block, stream })
    }

    // ---- expressions ---------------------------------------------------

    fn lower_expr(&mut self, node: NodeId) -> Vec<StreamItem> {
        match &self.tree.get(node).kind {
            NodeKind::IntLiteral { value } => {
                vec![StreamItem::Instruction(Instruction::ConstInt(*value as i32))]
            }
            NodeKind::VarRef { name } => {
                let slot = self.resolve(name);
                vec![StreamItem::Instruction(Instruction::LoadLocal(slot))]
            }
            NodeKind::Assignment { name, value } => {
                let (name, value) = (name.clone(), *value);
                let mut items = self.lower_expr(value);
                let slot = self.resolve(&name);
                items.push(StreamItem::Instruction(Instruction::StoreLocal(slot)));
                items.push(StreamItem::Instruction(Instruction::LoadLocal(slot)));
                items
            }
            NodeKind::UnaryOp { op, operand } => {
                let (op, operand) = (*op, *operand);
                let mut items = self.lower_expr(operand);
                items.push(StreamItem::Instruction(match op {
                    Operator::Minus => Instruction::Neg,
                    Operator::Bang => Instruction::LogicalNot,
                    Operator::Tilde => Instruction::BitwiseNot,
                    _ => unreachable!("parser only builds UnaryOp for !, ~, -"),
                }));
                items
            }
            NodeKind::BinaryOp { op, left, right } => {
                let (op, left, right) = (*op, *left, *right);
                match op {
                    Operator::AndAnd => {
                        let region = self.lower_short_circuit(left, right, true);
                        vec![StreamItem::Embed(region)]
                    }
                    Operator::OrOr => {
                        let region = self.lower_short_circuit(left, right, false);
                        vec![StreamItem::Embed(region)]
                    }
                    _ => {
                        let mut items = self.lower_expr(left);
                        items.extend(self.lower_expr(right));
                        items.push(StreamItem::Instruction(binary_opcode(op)));
                        items
                    }
                }
            }
            NodeKind::Ternary {
                condition,
                then_branch,
                else_branch,
            } => {
                let (condition, then_branch, else_branch) = (*condition, *then_branch, *else_branch);
                let condition_stream = self.lower_expr(condition);
                let then_stream = self.lower_expr(then_branch);
                let else_stream = self.lower_expr(else_branch);
                let then_region = self.block(then_stream);
                let else_region = self.block(else_stream);
                let region = self.regions.alloc(Region {
                    kind: RegionKind::If {
                        is_expression: true,
                        then_region,
                        else_region: Some(else_region),
                    },
                    stream: condition_stream,
                });
                vec![StreamItem::Embed(region)]
            }
            other => unreachable!("{other:?} is not an expression node"),
        }
    }

    /// `left && right` ≡ `left ? (right != 0) : 0`; `left || right` ≡
    /// `left ? 1 : (right != 0)` — built as an `If`-kind region rather
    /// than a dedicated opcode, since WASM has no short-circuiting
    /// boolean instructions.
    fn lower_short_circuit(&mut self, left: NodeId, right: NodeId, is_and: bool) -> RegionId {
        let condition_stream = self.lower_expr(left);
        let mut right_as_bool = self.lower_expr(right);
        right_as_bool.push(StreamItem::Instruction(Instruction::ConstInt(0)));
        right_as_bool.push(StreamItem::Instruction(Instruction::Ne));

        let (then_stream, else_stream) = if is_and {
            (right_as_bool, vec![StreamItem::Instruction(Instruction::ConstInt(0))])
        } else {
            (vec![StreamItem::Instruction(Instruction::ConstInt(1))], right_as_bool)
        };

        let then_region = self.block(then_stream);
        let else_region = self.block(else_stream);
        self.regions.alloc(Region {
            kind: RegionKind::If {
                is_expression: true,
                then_region,
                else_region: Some(else_region),
            },
            stream: condition_stream,
        })
    }

    // ---- statements -----------------------------------------------------

    fn lower_statement(&mut self, node: NodeId) -> Vec<StreamItem> {
        match &self.tree.get(node).kind {
            NodeKind::ReturnStmt { value } => {
                let mut items = self.lower_expr(*value);
                items.push(StreamItem::Instruction(Instruction::Return));
                items
            }
            NodeKind::VarDecl { name, init } => {
                let (name, init) = (name.clone(), *init);
                let slot = self.declare_local(name);
                match init {
                    Some(init) => {
                        let mut items = self.lower_expr(init);
                        items.push(StreamItem::Instruction(Instruction::StoreLocal(slot)));
                        items
                    }
                    None => Vec::new(),
                }
            }
            NodeKind::IfStmt {
                condition,
                then_branch,
                else_branch,
            } => {
                let (condition, then_branch, else_branch) = (*condition, *then_branch, *else_branch);
                let condition_stream = self.lower_expr(condition);
                let then_items = self.lower_statement(then_branch);
                let then_region = self.block(then_items);
                let else_region = else_branch.map(|branch| {
                    let items = self.lower_statement(branch);
                    self.block(items)
                });
                let region = self.regions.alloc(Region {
                    kind: RegionKind::If {
                        is_expression: false,
                        then_region,
                        else_region,
                    },
                    stream: condition_stream,
                });
                vec![StreamItem::Embed(region)]
            }
            NodeKind::WhileStmt { condition, body, is_do_while } => {
                let (condition, body, is_do_while) = (*condition, *body, *is_do_while);
                let condition_stream = self.lower_expr(condition);
                let body_items = self.lower_statement(body);
                let condition_region = self.block(condition_stream);
                let body_region = self.block(body_items);
                let region = self.regions.alloc(Region {
                    kind: RegionKind::Loop {
                        is_do_while,
                        condition: condition_region,
                        body: body_region,
                    },
                    stream: Vec::new(),
                });
                vec![StreamItem::Embed(region)]
            }
            NodeKind::BreakStmt => vec![StreamItem::Instruction(Instruction::Break)],
            NodeKind::ContinueStmt => vec![StreamItem::Instruction(Instruction::Continue)],
            NodeKind::Compound { statements } => {
                let statements = statements.clone();
                self.push_scope();
                let mut items = Vec::new();
                for stmt in statements {
                    items.extend(self.lower_statement(stmt));
                }
                self.pop_scope();
                items
            }
            kind if kind.is_expression() => {
                let mut items = self.lower_expr(node);
                items.push(StreamItem::Instruction(Instruction::Pop));
                items
            }
            other => unreachable!("{other:?} is not a statement node"),
        }
    }
}

fn binary_opcode(op: Operator) -> Instruction {
    match op {
        Operator::Plus => Instruction::Add,
        Operator::Minus => Instruction::Sub,
        Operator::Star => Instruction::Mul,
        Operator::Slash => Instruction::Div,
        Operator::Percent => Instruction::Mod,
        Operator::Eq => Instruction::Eq,
        Operator::NotEq => Instruction::Ne,
        Operator::Lt => Instruction::Lt,
        Operator::LtEq => Instruction::Le,
        Operator::Gt => Instruction::Gt,
        Operator::GtEq => Instruction::Ge,
        Operator::AndAnd | Operator::OrOr => unreachable!("short-circuit operators are lowered separately"),
        Operator::Assign | Operator::Bang | Operator::Tilde => unreachable!("not a binary arithmetic/comparison operator"),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::rc::Rc;

    use super::*;
    use crate::diagnostics::Diagnostics;
    use crate::parser::Parser;

    fn lower_source(source: &str) -> LoweredFunction {
        let mut diagnostics = Diagnostics::new();
        let file = Rc::new(PathBuf::from("test.c"));
        let parser = Parser::new(source, file, &mut diagnostics);
        let (tree, root) = parser.parse_program();
        assert!(!diagnostics.has_fatal());
        lower(&tree, root)
    }

    #[test]
    fn return_constant_lowers_to_const_and_return() {
        let lowered = lower_source("int main() { return 42; }");
        let function_region = lowered.regions.get(lowered.body);
        assert_eq!(function_region.stream.len(), 2);
        assert!(matches!(
            function_region.stream[0],
            StreamItem::Instruction(Instruction::ConstInt(42))
        ));
        assert!(matches!(function_region.stream[1], StreamItem::Instruction(Instruction::Return)));
    }

    #[test]
    fn declaration_allocates_a_slot_and_bumps_local_count() {
        let lowered = lower_source("int main() { int a = 1; int b = 2; return a + b; }");
        assert_eq!(lowered.local_count, 2);
    }

    #[test]
    fn short_circuit_and_lowers_to_an_expression_typed_if_region() {
        let lowered = lower_source("int main() { return 1 && 0; }");
        let function_region = lowered.regions.get(lowered.body);
        let StreamItem::Embed(if_region_id) = function_region.stream[0] else {
            panic!("expected an embedded If region for '&&'");
        };
        let if_region = lowered.regions.get(if_region_id);
        assert!(matches!(if_region.kind, RegionKind::If { is_expression: true, .. }));
    }

    #[test]
    fn while_loop_lowers_to_loop_region_with_condition_and_body() {
        let lowered = lower_source("int main() { while (1) { break; } return 0; }");
        let function_region = lowered.regions.get(lowered.body);
        let StreamItem::Embed(loop_region_id) = function_region.stream[0] else {
            panic!("expected an embedded Loop region");
        };
        let loop_region = lowered.regions.get(loop_region_id);
        assert!(matches!(loop_region.kind, RegionKind::Loop { is_do_while: false, .. }));
    }
}
