//! The program tree of one compilation unit.
//!
//! A [`Tree`] owns the node arena and knows which node is the root. All
//! structural accessors the rewrite pass needs go through it, so callers
//! never hold references into the arena across mutations.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::arena::Arena;
use crate::node::{AggregateOp, Node, NodeId};
use crate::types::{Qualifier, Type};

/// A structural defect found while adopting nodes from a front end.
#[derive(Clone, Debug, PartialEq)]
pub enum TreeError {
    /// The root handle does not point into the arena.
    RootOutOfBounds { root: usize, len: usize },
    /// A node links to a child outside the arena.
    DanglingChild { parent: usize, child: usize },
    /// A node is linked from more than one parent, or the root is linked
    /// from inside the tree.
    SharedNode { node: usize },
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeError::RootOutOfBounds { root, len } => {
                write!(f, "root node [{root}] is outside the arena of {len} nodes")
            }
            TreeError::DanglingChild { parent, child } => {
                write!(f, "node [{parent}] links to missing child [{child}]")
            }
            TreeError::SharedNode { node } => {
                write!(f, "node [{node}] has more than one owner")
            }
        }
    }
}

impl std::error::Error for TreeError {}

#[derive(Deserialize)]
struct RawTree {
    nodes: Arena<Node>,
    root: NodeId,
}

impl TryFrom<RawTree> for Tree {
    type Error = TreeError;

    fn try_from(raw: RawTree) -> Result<Self, Self::Error> {
        Tree::from_parts(raw.nodes, raw.root)
    }
}

/// Arena-backed program tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTree")]
pub struct Tree {
    nodes: Arena<Node>,
    root: NodeId,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// Create a tree whose root is an empty global `Sequence`.
    pub fn new() -> Self {
        let mut nodes = Arena::new();
        let root = nodes.append(Node::aggregate(
            AggregateOp::Sequence,
            "",
            Vec::new(),
            Type::void(),
        ));
        Tree { nodes, root }
    }

    /// Adopt nodes built elsewhere, checking that every link resolves and
    /// that no node has two owners.
    pub fn from_parts(nodes: Arena<Node>, root: NodeId) -> Result<Self, TreeError> {
        if !nodes.contains(root) {
            return Err(TreeError::RootOutOfBounds {
                root: root.index(),
                len: nodes.len(),
            });
        }
        let mut owned = vec![false; nodes.len()];
        owned[root.index()] = true;
        for (parent, node) in nodes.iter() {
            for child in node.children() {
                if !nodes.contains(child) {
                    return Err(TreeError::DanglingChild {
                        parent: parent.index(),
                        child: child.index(),
                    });
                }
                if owned[child.index()] {
                    return Err(TreeError::SharedNode {
                        node: child.index(),
                    });
                }
                owned[child.index()] = true;
            }
        }
        Ok(Tree { nodes, root })
    }

    /// Allocate a detached node. It becomes part of the program only once a
    /// parent links to it.
    pub fn alloc(&mut self, node: Node) -> NodeId {
        self.nodes.append(node)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn set_root(&mut self, root: NodeId) {
        self.root = root;
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id]
    }

    /// Number of allocated nodes, linked or not.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> &Arena<Node> {
        &self.nodes
    }

    // ── Structural accessors ──────────────────────────────────────────

    /// Children of an aggregate, `None` for every other kind.
    pub fn sequence(&self, id: NodeId) -> Option<&[NodeId]> {
        self.nodes[id].as_aggregate().map(|a| a.children.as_slice())
    }

    pub fn sequence_mut(&mut self, id: NodeId) -> Option<&mut Vec<NodeId>> {
        self.nodes[id].as_aggregate_mut().map(|a| &mut a.children)
    }

    pub fn ty(&self, id: NodeId) -> Option<&Type> {
        self.nodes[id].ty()
    }

    pub fn set_ty(&mut self, id: NodeId, ty: Type) {
        if let Some(slot) = self.nodes[id].ty_mut() {
            *slot = ty;
        }
    }

    pub fn qualifier(&self, id: NodeId) -> Option<Qualifier> {
        self.ty(id).map(|t| t.qualifier)
    }

    pub fn set_qualifier(&mut self, id: NodeId, qualifier: Qualifier) {
        if let Some(ty) = self.nodes[id].ty_mut() {
            ty.qualifier = qualifier;
        }
    }

    pub fn symbol_name(&self, id: NodeId) -> Option<&str> {
        self.nodes[id].as_symbol().map(|s| s.name.as_str())
    }

    pub fn set_symbol_name(&mut self, id: NodeId, name: impl Into<String>) {
        if let Some(sym) = self.nodes[id].as_symbol_mut() {
            sym.name = name.into();
        }
    }

    /// Mangled name of a function or call aggregate.
    pub fn aggregate_name(&self, id: NodeId) -> Option<&str> {
        self.nodes[id].as_aggregate().map(|a| a.name.as_str())
    }

    pub fn is_aggregate(&self, id: NodeId, op: AggregateOp) -> bool {
        self.nodes[id].is_aggregate(op)
    }

    // ── Queries ───────────────────────────────────────────────────────

    /// All nodes reachable from the root, in depth-first pre-order.
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            order.push(id);
            let children = self.nodes[id].children();
            stack.extend(children.into_iter().rev());
        }
        order
    }

    /// The first function definition at global scope with the given mangled
    /// name.
    pub fn find_function(&self, name: &str) -> Option<NodeId> {
        self.sequence(self.root)?
            .iter()
            .copied()
            .find(|&id| matches!(self.node(id), Node::Aggregate(a) if a.op == AggregateOp::Function && a.name == name))
    }

    /// Whether any reachable symbol node carries `name`.
    pub fn is_symbol_used(&self, name: &str) -> bool {
        self.preorder()
            .into_iter()
            .any(|id| self.symbol_name(id) == Some(name))
    }
}
