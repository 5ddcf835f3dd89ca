//! The AST node surface the stepper dispatches on. Nodes are conceptually a
//! uniform `(kind, attrs, children)` tuple, but represented here as a closed,
//! tagged `enum Node` instead — one variant per `kind`, each holding its own
//! attrs and typed children directly rather than through an untyped bag.
//!
//! AST production (parsing C source into these nodes) is out of scope; nodes
//! are built directly, e.g. by the small constructor helpers tests use in
//! place of a parser.

use crate::value::{Address, BinaryOpcode, Type};
use std::rc::Rc;

/// The opcode carried by a `UnaryOperator` node. `Plus`/`Minus`/`LNot`/`Not`
/// route through `eval_unary_operation`; the rest have dedicated stepper
/// protocols.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryNodeOpcode {
    Plus,
    Minus,
    LNot,
    Not,
    PreInc,
    PreDec,
    PostInc,
    PostDec,
    AddrOf,
    Deref,
}

/// The opcode carried by a `BinaryOperator` node. `Assign` has its own
/// assignment stepper protocol; everything else is either handled directly
/// (short-circuit `Arith(LAnd)`/`Arith(LOr)`/`Arith(Comma)`) or forwarded to
/// `eval_binary_operation`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryNodeOpcode {
    Assign,
    Arith(BinaryOpcode),
}

/// A single AST node. `Rc` children let the same subtree be revisited (loop
/// bodies, recursive calls) without cloning.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    // --- Statements ---
    CompoundStmt {
        children: Vec<Rc<Node>>,
    },
    /// A sequence of `VarDecl`s, e.g. `int a, b = 1;`.
    DeclStmt {
        decls: Vec<Rc<Node>>,
    },
    ForStmt {
        init: Rc<Node>,
        cond: Rc<Node>,
        update: Rc<Node>,
        body: Rc<Node>,
    },
    WhileStmt {
        cond: Rc<Node>,
        body: Rc<Node>,
    },
    DoStmt {
        body: Rc<Node>,
        cond: Rc<Node>,
    },
    BreakStmt,
    ContinueStmt,
    IfStmt {
        cond: Rc<Node>,
        then_branch: Rc<Node>,
        else_branch: Option<Rc<Node>>,
    },
    ReturnStmt {
        expr: Option<Rc<Node>>,
    },

    // --- Declarations ---
    VarDecl {
        name: String,
        var_type: Rc<Node>,
        init: Option<Rc<Node>>,
    },
    ParmVarDecl {
        name: String,
        var_type: Rc<Node>,
    },

    // --- Expressions ---
    ParenExpr {
        inner: Rc<Node>,
    },
    /// `children[0]` is the callee expression, `children[1..]` are arguments.
    CallExpr {
        children: Vec<Rc<Node>>,
    },
    ImplicitCastExpr {
        value: Rc<Node>,
        target_type: Rc<Node>,
    },
    CStyleCastExpr {
        target_type: Rc<Node>,
        value: Rc<Node>,
    },
    DeclRefExpr {
        identifier: String,
    },
    IntegerLiteral {
        lexeme: String,
    },
    CharacterLiteral {
        lexeme: String,
    },
    FloatingLiteral {
        lexeme: String,
    },
    /// `address`/`length` are the string literal's pre-materialized pointer
    /// attrs: the string's bytes are assumed already resident in memory at
    /// `address` by the time this node is stepped.
    StringLiteral {
        address: Address,
        length: usize,
    },
    UnaryOperator {
        opcode: UnaryNodeOpcode,
        operand: Rc<Node>,
    },
    /// `sizeof(expr)` — the clang AST surface calls this node kind
    /// `UnaryExprOrTypeTraitExpr`.
    SizeofExpr {
        operand: Rc<Node>,
    },
    BinaryOperator {
        opcode: BinaryNodeOpcode,
        lhs: Rc<Node>,
        rhs: Rc<Node>,
    },
    /// `op=` forms. `opcode` is the underlying arithmetic operator (e.g.
    /// `Add` for `+=`).
    CompoundAssignOperator {
        opcode: BinaryOpcode,
        lhs: Rc<Node>,
        rhs: Rc<Node>,
    },
    ArraySubscriptExpr {
        array: Rc<Node>,
        index: Rc<Node>,
    },
    ConditionalOperator {
        cond: Rc<Node>,
        then_branch: Rc<Node>,
        else_branch: Rc<Node>,
    },

    // --- Types ---
    BuiltinType {
        name: String,
    },
    PointerType {
        pointee: Rc<Node>,
    },
    ConstantArrayType {
        elem: Rc<Node>,
        count: Rc<Node>,
    },
    FunctionProtoType {
        result: Rc<Node>,
        params: Vec<Rc<Node>>,
    },
    FunctionNoProtoType {
        result: Rc<Node>,
    },

    /// A top-level function definition. Its call protocol only makes sense
    /// if a function-callable binding actually points at something with a
    /// prototype and a body, so this is the node that binding refers to. The
    /// driver is expected to populate `GlobalMap` with one `Binding::Callable`
    /// per such definition before interpretation begins; `step` never visits
    /// one directly except to read its fields during the call protocol.
    FunctionDecl {
        name: String,
        proto_type: Rc<Node>,
        body: Rc<Node>,
    },
}

impl Node {
    pub fn rc(self) -> Rc<Node> {
        Rc::new(self)
    }
}

/// Small constructor helpers used by tests in place of a parser. Each just
/// wraps its arguments in `Rc` and the matching `Node` variant.
pub mod build {
    use super::*;

    pub fn compound(children: Vec<Rc<Node>>) -> Rc<Node> {
        Node::CompoundStmt { children }.rc()
    }

    pub fn decl_stmt(decls: Vec<Rc<Node>>) -> Rc<Node> {
        Node::DeclStmt { decls }.rc()
    }

    pub fn for_stmt(init: Rc<Node>, cond: Rc<Node>, update: Rc<Node>, body: Rc<Node>) -> Rc<Node> {
        Node::ForStmt { init, cond, update, body }.rc()
    }

    pub fn while_stmt(cond: Rc<Node>, body: Rc<Node>) -> Rc<Node> {
        Node::WhileStmt { cond, body }.rc()
    }

    pub fn do_stmt(body: Rc<Node>, cond: Rc<Node>) -> Rc<Node> {
        Node::DoStmt { body, cond }.rc()
    }

    pub fn break_stmt() -> Rc<Node> {
        Node::BreakStmt.rc()
    }

    pub fn continue_stmt() -> Rc<Node> {
        Node::ContinueStmt.rc()
    }

    pub fn if_stmt(cond: Rc<Node>, then_branch: Rc<Node>, else_branch: Option<Rc<Node>>) -> Rc<Node> {
        Node::IfStmt { cond, then_branch, else_branch }.rc()
    }

    pub fn return_stmt(expr: Option<Rc<Node>>) -> Rc<Node> {
        Node::ReturnStmt { expr }.rc()
    }

    pub fn var_decl(name: &str, var_type: Rc<Node>, init: Option<Rc<Node>>) -> Rc<Node> {
        Node::VarDecl { name: name.into(), var_type, init }.rc()
    }

    pub fn parm_var_decl(name: &str, var_type: Rc<Node>) -> Rc<Node> {
        Node::ParmVarDecl { name: name.into(), var_type }.rc()
    }

    pub fn paren(inner: Rc<Node>) -> Rc<Node> {
        Node::ParenExpr { inner }.rc()
    }

    pub fn call(callee: Rc<Node>, args: Vec<Rc<Node>>) -> Rc<Node> {
        let mut children = vec![callee];
        children.extend(args);
        Node::CallExpr { children }.rc()
    }

    pub fn implicit_cast(value: Rc<Node>, target_type: Rc<Node>) -> Rc<Node> {
        Node::ImplicitCastExpr { value, target_type }.rc()
    }

    pub fn c_style_cast(target_type: Rc<Node>, value: Rc<Node>) -> Rc<Node> {
        Node::CStyleCastExpr { target_type, value }.rc()
    }

    pub fn decl_ref(identifier: &str) -> Rc<Node> {
        Node::DeclRefExpr { identifier: identifier.into() }.rc()
    }

    pub fn int_literal(lexeme: &str) -> Rc<Node> {
        Node::IntegerLiteral { lexeme: lexeme.into() }.rc()
    }

    pub fn char_literal(lexeme: &str) -> Rc<Node> {
        Node::CharacterLiteral { lexeme: lexeme.into() }.rc()
    }

    pub fn float_literal(lexeme: &str) -> Rc<Node> {
        Node::FloatingLiteral { lexeme: lexeme.into() }.rc()
    }

    pub fn string_literal(address: Address, length: usize) -> Rc<Node> {
        Node::StringLiteral { address, length }.rc()
    }

    pub fn unary(opcode: UnaryNodeOpcode, operand: Rc<Node>) -> Rc<Node> {
        Node::UnaryOperator { opcode, operand }.rc()
    }

    pub fn sizeof(operand: Rc<Node>) -> Rc<Node> {
        Node::SizeofExpr { operand }.rc()
    }

    pub fn binary(opcode: BinaryNodeOpcode, lhs: Rc<Node>, rhs: Rc<Node>) -> Rc<Node> {
        Node::BinaryOperator { opcode, lhs, rhs }.rc()
    }

    pub fn compound_assign(opcode: BinaryOpcode, lhs: Rc<Node>, rhs: Rc<Node>) -> Rc<Node> {
        Node::CompoundAssignOperator { opcode, lhs, rhs }.rc()
    }

    pub fn subscript(array: Rc<Node>, index: Rc<Node>) -> Rc<Node> {
        Node::ArraySubscriptExpr { array, index }.rc()
    }

    pub fn conditional(cond: Rc<Node>, then_branch: Rc<Node>, else_branch: Rc<Node>) -> Rc<Node> {
        Node::ConditionalOperator { cond, then_branch, else_branch }.rc()
    }

    pub fn builtin_type(name: &str) -> Rc<Node> {
        Node::BuiltinType { name: name.into() }.rc()
    }

    pub fn pointer_type(pointee: Rc<Node>) -> Rc<Node> {
        Node::PointerType { pointee }.rc()
    }

    pub fn array_type(elem: Rc<Node>, count: Rc<Node>) -> Rc<Node> {
        Node::ConstantArrayType { elem, count }.rc()
    }

    pub fn function_proto(result: Rc<Node>, params: Vec<Rc<Node>>) -> Rc<Node> {
        Node::FunctionProtoType { result, params }.rc()
    }

    pub fn function_no_proto(result: Rc<Node>) -> Rc<Node> {
        Node::FunctionNoProtoType { result }.rc()
    }

    pub fn function_decl(name: &str, proto_type: Rc<Node>, body: Rc<Node>) -> Rc<Node> {
        Node::FunctionDecl { name: name.into(), proto_type, body }.rc()
    }
}
