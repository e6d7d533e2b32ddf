//! Indented text dump of a tree, one node per line.
//!
//! Used by `shadec --emit ir` and by snapshot tests. Nodes that are
//! allocated but not linked from the root are not printed.

use std::fmt::Write;

use crate::node::{AggregateOp, BranchKind, ConstantValue, LoopKind, Node, NodeId};
use crate::tree::Tree;

/// Render the whole tree starting at its root.
pub fn dump_tree(tree: &Tree) -> String {
    let mut out = String::new();
    // Explicit stack: front-end trees can be arbitrarily deep.
    let mut stack: Vec<(NodeId, usize)> = vec![(tree.root(), 0)];
    while let Some((id, depth)) = stack.pop() {
        let node = tree.node(id);
        for _ in 0..depth {
            out.push_str("  ");
        }
        let _ = writeln!(out, "{}", describe(node));
        stack.extend(node.children().into_iter().rev().map(|child| (child, depth + 1)));
    }
    out
}

fn describe(node: &Node) -> String {
    match node {
        Node::Symbol(sym) => format!("'{}' ({})", sym.name, sym.ty),
        Node::Constant(c) => {
            let values: Vec<String> = c
                .values
                .iter()
                .map(|v| match v {
                    ConstantValue::Float(x) => format!("{x:?}"),
                    ConstantValue::Int(i) => i.to_string(),
                    ConstantValue::Bool(b) => b.to_string(),
                })
                .collect();
            format!("Constant [{}] ({})", values.join(", "), c.ty)
        }
        Node::Binary(b) => format!("{} ({})", b.op.describe(), b.ty),
        Node::Unary(u) => format!("{} ({})", u.op.describe(), u.ty),
        Node::Aggregate(agg) => match agg.op {
            AggregateOp::Sequence => "Sequence".to_string(),
            AggregateOp::Declaration => "Declaration".to_string(),
            AggregateOp::Parameters => "Parameters".to_string(),
            AggregateOp::Function => format!("Function '{}' ({})", agg.name, agg.ty),
            AggregateOp::FunctionCall => format!("Call '{}' ({})", agg.name, agg.ty),
            AggregateOp::Construct => format!("Construct ({})", agg.ty),
        },
        Node::Selection(sel) => format!("Selection ({})", sel.ty),
        Node::Loop(lp) => match lp.kind {
            LoopKind::For => "Loop for".to_string(),
            LoopKind::While => "Loop while".to_string(),
            LoopKind::DoWhile => "Loop do-while".to_string(),
        },
        Node::Branch(br) => match br.kind {
            BranchKind::Discard => "Branch discard".to_string(),
            BranchKind::Return => "Branch return".to_string(),
            BranchKind::Break => "Branch break".to_string(),
            BranchKind::Continue => "Branch continue".to_string(),
        },
    }
}
