//! Intermediate representation of a type-checked fragment shader.
//!
//! Provides the arena-backed [`Tree`], the closed [`Node`] set, [`Type`]
//! descriptors with precision and storage qualifiers, and the
//! [`SymbolRegistry`] view over the front end's declarations. The crate is
//! pure data: passes that rewrite the tree live in `shade-rewrite`.

pub mod arena;
pub mod dump;
pub mod node;
pub mod span;
pub mod symbols;
pub mod tree;
pub mod types;

pub use arena::{Arena, Handle};
pub use dump::dump_tree;
pub use node::{
    Aggregate, AggregateOp, Binary, BinaryOp, Branch, BranchKind, Constant, ConstantValue, Loop,
    LoopKind, Node, NodeId, Selection, Symbol, Unary, UnaryOp,
};
pub use span::Span;
pub use symbols::{SymbolInfo, SymbolRegistry, SymbolTable};
pub use tree::{Tree, TreeError};
pub use types::{mangle_function_name, BasicType, Precision, Qualifier, Type};
