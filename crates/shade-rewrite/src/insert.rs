//! Structural insertion into the global scope and into function bodies.
//!
//! A function definition is an aggregate with one child (its parameter
//! list) or two (parameters and a body `Sequence`). Insertion into a
//! function without a body synthesizes an empty body first. Any other shape
//! means the front end handed over a malformed tree.

use shade_ir::{AggregateOp, Node, NodeId, Tree, Type};

use crate::error::RewriteError;

/// The root, checked to be the global `Sequence`.
pub fn root_sequence(tree: &Tree) -> Result<NodeId, RewriteError> {
    let root = tree.root();
    if tree.is_aggregate(root, AggregateOp::Sequence) {
        Ok(root)
    } else {
        Err(RewriteError::MissingRootSequence {
            found: tree.node(root).kind_name(),
        })
    }
}

/// Make `node` the first top-level child. Repeated calls stack, so the
/// last node inserted ends up first.
pub fn insert_at_top_of_shader(tree: &mut Tree, node: NodeId) -> Result<(), RewriteError> {
    let root = root_sequence(tree)?;
    if let Some(globals) = tree.sequence_mut(root) {
        globals.insert(0, node);
    }
    log::debug!("inserted {} at top of shader", tree.node(node).kind_name());
    Ok(())
}

/// Make `node` the last top-level child.
pub fn insert_at_end_of_shader(tree: &mut Tree, node: NodeId) -> Result<(), RewriteError> {
    let root = root_sequence(tree)?;
    if let Some(globals) = tree.sequence_mut(root) {
        globals.push(node);
    }
    log::debug!("inserted {} at end of shader", tree.node(node).kind_name());
    Ok(())
}

/// Append `node` as the last statement of `function`'s body.
pub fn insert_at_end_of_function(
    tree: &mut Tree,
    node: NodeId,
    function: NodeId,
) -> Result<(), RewriteError> {
    let body = get_or_create_function_body(tree, function)?;
    if let Some(statements) = tree.sequence_mut(body) {
        statements.push(node);
    }
    log::debug!(
        "appended {} to function '{}'",
        tree.node(node).kind_name(),
        tree.aggregate_name(function).unwrap_or_default()
    );
    Ok(())
}

/// Prepend `node` as the first statement of `function`'s body.
pub fn insert_at_beginning_of_function(
    tree: &mut Tree,
    node: NodeId,
    function: NodeId,
) -> Result<(), RewriteError> {
    let body = get_or_create_function_body(tree, function)?;
    if let Some(statements) = tree.sequence_mut(body) {
        statements.insert(0, node);
    }
    log::debug!(
        "prepended {} to function '{}'",
        tree.node(node).kind_name(),
        tree.aggregate_name(function).unwrap_or_default()
    );
    Ok(())
}

fn get_or_create_function_body(tree: &mut Tree, function: NodeId) -> Result<NodeId, RewriteError> {
    let (name, children) = match tree.node(function) {
        Node::Aggregate(agg) if agg.op == AggregateOp::Function => {
            (agg.name.clone(), agg.children.clone())
        }
        other => {
            return Err(RewriteError::MalformedFunction {
                name: other.kind_name().to_string(),
                children: other.children().len(),
            })
        }
    };

    match children.as_slice() {
        [_params] => {
            let body = tree.alloc(Node::aggregate(
                AggregateOp::Sequence,
                "",
                Vec::new(),
                Type::void(),
            ));
            if let Some(params_and_body) = tree.sequence_mut(function) {
                params_and_body.push(body);
            }
            log::debug!("synthesized empty body for function '{name}'");
            Ok(body)
        }
        [_params, body] => {
            if tree.is_aggregate(*body, AggregateOp::Sequence) {
                Ok(*body)
            } else {
                Err(RewriteError::MalformedFunctionBody {
                    name,
                    found: tree.node(*body).kind_name(),
                })
            }
        }
        _ => Err(RewriteError::MalformedFunction {
            name,
            children: children.len(),
        }),
    }
}
