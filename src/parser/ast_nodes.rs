//! The typed syntax tree produced by the parser.
//!
//! Every node lives in the parser's [`Arena`] and is addressed by an
//! [`Id`]; children are stored as `Id<Node>` fields rather than boxed
//! pointers, which keeps the tree a flat `Vec` with no lifetime to thread
//! through the later phases.

use crate::arena::{Arena, Id};
use crate::diagnostics::SourceLocation;
use crate::lexer::tokens::Operator;

pub type NodeId = Id<Node>;

#[derive(Debug)]
pub struct Node {
    pub kind: NodeKind,
    pub location: SourceLocation,
}

#[derive(Debug)]
pub enum NodeKind {
    Program {
        function: NodeId,
    },
    Function {
        name: String,
        body: Vec<NodeId>,
    },
    ReturnStmt {
        value: NodeId,
    },
    VarDecl {
        name: String,
        init: Option<NodeId>,
    },
    VarRef {
        name: String,
    },
    Assignment {
        name: String,
        value: NodeId,
    },
    IntLiteral {
        value: i64,
    },
    UnaryOp {
        op: Operator,
        operand: NodeId,
    },
    BinaryOp {
        op: Operator,
        left: NodeId,
        right: NodeId,
    },
    Ternary {
        condition: NodeId,
        then_branch: NodeId,
        else_branch: NodeId,
    },
    IfStmt {
        condition: NodeId,
        then_branch: NodeId,
        else_branch: Option<NodeId>,
    },
    WhileStmt {
        condition: NodeId,
        body: NodeId,
        is_do_while: bool,
    },
    BreakStmt,
    ContinueStmt,
    Compound {
        statements: Vec<NodeId>,
    },
}

impl NodeKind {
    /// True for every shape the grammar treats as an expression: it must
    /// leave exactly one `i32` on the IR stack when lowered. Used by the
    /// semantic analyzer and the lowering pass to keep the "expressions
    /// produce one, statements produce zero" invariant checkable in one
    /// place rather than re-derived at each call site.
    pub fn is_expression(&self) -> bool {
        matches!(
            self,
            NodeKind::VarRef { .. }
                | NodeKind::Assignment { .. }
                | NodeKind::IntLiteral { .. }
                | NodeKind::UnaryOp { .. }
                | NodeKind::BinaryOp { .. }
                | NodeKind::Ternary { .. }
        )
    }
}

impl Node {
    pub fn new(kind: NodeKind, location: SourceLocation) -> Self {
        Node { kind, location }
    }
}

pub type Tree = Arena<Node>;
