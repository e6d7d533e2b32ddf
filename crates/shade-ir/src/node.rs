//! IR node kinds.
//!
//! The node set is closed: symbols, constants, binary and unary operations,
//! aggregates (sequences, declarations, function definitions and calls),
//! selections, loops and branches. Child links are [`NodeId`] handles into
//! the owning [`Tree`](crate::Tree)'s arena.

use serde::{Deserialize, Serialize};

use crate::arena::Handle;
use crate::types::Type;

/// Handle to a node in a [`Tree`](crate::Tree).
pub type NodeId = Handle<Node>;

/// A reference to a named variable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    /// Front-end symbol id. `0` marks a symbol not backed by a symbol table
    /// entry, which is what synthesized and renamed symbols carry.
    #[serde(default)]
    pub id: u32,
    pub name: String,
    pub ty: Type,
}

/// One component of a constant.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstantValue {
    Float(f32),
    Int(i32),
    Bool(bool),
}

/// A folded constant, one value per component.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Constant {
    pub values: Vec<ConstantValue>,
    pub ty: Type,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    Assign,
    /// Assignment that is part of a declaration (`vec4 a = ...`).
    Initialize,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    Add,
    Sub,
    Mul,
    Div,
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
    LessThanEqual,
    GreaterThanEqual,
    LogicalAnd,
    LogicalOr,
    LogicalXor,
    IndexDirect,
    IndexIndirect,
    VectorSwizzle,
}

impl BinaryOp {
    /// Whether the operator writes its left operand.
    pub fn is_assignment(self) -> bool {
        matches!(
            self,
            BinaryOp::Assign
                | BinaryOp::Initialize
                | BinaryOp::AddAssign
                | BinaryOp::SubAssign
                | BinaryOp::MulAssign
                | BinaryOp::DivAssign
        )
    }

    /// Whether the operator yields a `bool` regardless of its operands.
    pub fn is_boolean(self) -> bool {
        matches!(
            self,
            BinaryOp::Equal
                | BinaryOp::NotEqual
                | BinaryOp::LessThan
                | BinaryOp::GreaterThan
                | BinaryOp::LessThanEqual
                | BinaryOp::GreaterThanEqual
                | BinaryOp::LogicalAnd
                | BinaryOp::LogicalOr
                | BinaryOp::LogicalXor
        )
    }

    pub fn describe(self) -> &'static str {
        match self {
            BinaryOp::Assign => "assign",
            BinaryOp::Initialize => "initialize",
            BinaryOp::AddAssign => "add second child into first child",
            BinaryOp::SubAssign => "subtract second child into first child",
            BinaryOp::MulAssign => "multiply second child into first child",
            BinaryOp::DivAssign => "divide second child into first child",
            BinaryOp::Add => "add",
            BinaryOp::Sub => "subtract",
            BinaryOp::Mul => "multiply",
            BinaryOp::Div => "divide",
            BinaryOp::Equal => "compare equal",
            BinaryOp::NotEqual => "compare not equal",
            BinaryOp::LessThan => "compare less than",
            BinaryOp::GreaterThan => "compare greater than",
            BinaryOp::LessThanEqual => "compare less than or equal",
            BinaryOp::GreaterThanEqual => "compare greater than or equal",
            BinaryOp::LogicalAnd => "logical-and",
            BinaryOp::LogicalOr => "logical-or",
            BinaryOp::LogicalXor => "logical-xor",
            BinaryOp::IndexDirect => "direct index",
            BinaryOp::IndexIndirect => "indirect index",
            BinaryOp::VectorSwizzle => "vector swizzle",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Binary {
    pub op: BinaryOp,
    pub left: NodeId,
    pub right: NodeId,
    pub ty: Type,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    Negate,
    LogicalNot,
    PreIncrement,
    PreDecrement,
    PostIncrement,
    PostDecrement,
}

impl UnaryOp {
    pub fn describe(self) -> &'static str {
        match self {
            UnaryOp::Negate => "negation",
            UnaryOp::LogicalNot => "logical not",
            UnaryOp::PreIncrement => "pre-increment",
            UnaryOp::PreDecrement => "pre-decrement",
            UnaryOp::PostIncrement => "post-increment",
            UnaryOp::PostDecrement => "post-decrement",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Unary {
    pub op: UnaryOp,
    pub operand: NodeId,
    pub ty: Type,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateOp {
    /// Ordered statements: the global scope or a block.
    Sequence,
    /// One declared symbol or one initialization.
    Declaration,
    /// Function definition: `[parameters]` or `[parameters, body]`.
    Function,
    FunctionCall,
    /// Parameter list of a function definition.
    Parameters,
    /// Type constructor such as `vec4(x, y, z, w)` that was not folded.
    Construct,
}

/// A node owning an ordered list of children.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    pub op: AggregateOp,
    /// Mangled name for functions and calls, empty otherwise.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub children: Vec<NodeId>,
    pub ty: Type,
}

/// `if`/`else` statement or ternary expression.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub condition: NodeId,
    #[serde(default)]
    pub true_block: Option<NodeId>,
    #[serde(default)]
    pub false_block: Option<NodeId>,
    pub ty: Type,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopKind {
    For,
    While,
    DoWhile,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Loop {
    pub kind: LoopKind,
    #[serde(default)]
    pub init: Option<NodeId>,
    #[serde(default)]
    pub condition: Option<NodeId>,
    #[serde(default)]
    pub expression: Option<NodeId>,
    #[serde(default)]
    pub body: Option<NodeId>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchKind {
    Discard,
    Return,
    Break,
    Continue,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    pub kind: BranchKind,
    #[serde(default)]
    pub expression: Option<NodeId>,
}

/// An IR node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Symbol(Symbol),
    Constant(Constant),
    Binary(Binary),
    Unary(Unary),
    Aggregate(Aggregate),
    Selection(Selection),
    Loop(Loop),
    Branch(Branch),
}

impl Node {
    pub fn symbol(name: impl Into<String>, ty: Type) -> Node {
        Node::Symbol(Symbol {
            id: 0,
            name: name.into(),
            ty,
        })
    }

    pub fn constant(values: Vec<ConstantValue>, ty: Type) -> Node {
        Node::Constant(Constant { values, ty })
    }

    pub fn binary(op: BinaryOp, left: NodeId, right: NodeId, ty: Type) -> Node {
        Node::Binary(Binary {
            op,
            left,
            right,
            ty,
        })
    }

    pub fn aggregate(op: AggregateOp, name: impl Into<String>, children: Vec<NodeId>, ty: Type) -> Node {
        Node::Aggregate(Aggregate {
            op,
            name: name.into(),
            children,
            ty,
        })
    }

    /// Human-readable kind, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Symbol(_) => "symbol",
            Node::Constant(_) => "constant",
            Node::Binary(_) => "binary operation",
            Node::Unary(_) => "unary operation",
            Node::Aggregate(agg) => match agg.op {
                AggregateOp::Sequence => "sequence",
                AggregateOp::Declaration => "declaration",
                AggregateOp::Function => "function definition",
                AggregateOp::FunctionCall => "function call",
                AggregateOp::Parameters => "parameter list",
                AggregateOp::Construct => "constructor",
            },
            Node::Selection(_) => "selection",
            Node::Loop(_) => "loop",
            Node::Branch(_) => "branch",
        }
    }

    /// The node's type. Loops and branches are statements without one.
    pub fn ty(&self) -> Option<&Type> {
        match self {
            Node::Symbol(s) => Some(&s.ty),
            Node::Constant(c) => Some(&c.ty),
            Node::Binary(b) => Some(&b.ty),
            Node::Unary(u) => Some(&u.ty),
            Node::Aggregate(a) => Some(&a.ty),
            Node::Selection(s) => Some(&s.ty),
            Node::Loop(_) | Node::Branch(_) => None,
        }
    }

    pub fn ty_mut(&mut self) -> Option<&mut Type> {
        match self {
            Node::Symbol(s) => Some(&mut s.ty),
            Node::Constant(c) => Some(&mut c.ty),
            Node::Binary(b) => Some(&mut b.ty),
            Node::Unary(u) => Some(&mut u.ty),
            Node::Aggregate(a) => Some(&mut a.ty),
            Node::Selection(s) => Some(&mut s.ty),
            Node::Loop(_) | Node::Branch(_) => None,
        }
    }

    /// Direct children in traversal order.
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            Node::Symbol(_) | Node::Constant(_) => Vec::new(),
            Node::Binary(b) => vec![b.left, b.right],
            Node::Unary(u) => vec![u.operand],
            Node::Aggregate(a) => a.children.clone(),
            Node::Selection(s) => std::iter::once(s.condition)
                .chain(s.true_block)
                .chain(s.false_block)
                .collect(),
            Node::Loop(l) => [l.init, l.condition, l.expression, l.body]
                .into_iter()
                .flatten()
                .collect(),
            Node::Branch(b) => b.expression.into_iter().collect(),
        }
    }

    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self {
            Node::Symbol(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_symbol_mut(&mut self) -> Option<&mut Symbol> {
        match self {
            Node::Symbol(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_aggregate(&self) -> Option<&Aggregate> {
        match self {
            Node::Aggregate(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_aggregate_mut(&mut self) -> Option<&mut Aggregate> {
        match self {
            Node::Aggregate(a) => Some(a),
            _ => None,
        }
    }

    /// Whether this is an aggregate with the given operator.
    pub fn is_aggregate(&self, op: AggregateOp) -> bool {
        matches!(self, Node::Aggregate(a) if a.op == op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;
    use crate::types::{Precision, Qualifier};

    #[test]
    fn children_follow_traversal_order() {
        let mut arena: Arena<Node> = Arena::new();
        let cond = arena.append(Node::symbol("c", Type::bool()));
        let then = arena.append(Node::aggregate(AggregateOp::Sequence, "", vec![], Type::void()));
        let selection = Node::Selection(Selection {
            condition: cond,
            true_block: Some(then),
            false_block: None,
            ty: Type::void(),
        });
        assert_eq!(selection.children(), vec![cond, then]);

        let body = arena.append(Node::aggregate(AggregateOp::Sequence, "", vec![], Type::void()));
        let lp = Node::Loop(Loop {
            kind: LoopKind::While,
            init: None,
            condition: Some(cond),
            expression: None,
            body: Some(body),
        });
        assert_eq!(lp.children(), vec![cond, body]);
    }

    #[test]
    fn statements_have_no_type() {
        let ret = Node::Branch(Branch {
            kind: BranchKind::Return,
            expression: None,
        });
        assert!(ret.ty().is_none());
        assert!(ret.children().is_empty());

        let sym = Node::symbol("x", Type::vec(2, Precision::Low, Qualifier::Temporary));
        assert_eq!(sym.ty().map(|t| t.size), Some(2));
    }

    #[test]
    fn kind_names_distinguish_aggregates() {
        let f = Node::aggregate(AggregateOp::Function, "main(", vec![], Type::void());
        assert_eq!(f.kind_name(), "function definition");
        assert!(f.is_aggregate(AggregateOp::Function));
        assert!(!f.is_aggregate(AggregateOp::Sequence));
    }
}
