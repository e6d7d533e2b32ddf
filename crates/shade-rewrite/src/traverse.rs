//! The single depth-first pass over the tree.
//!
//! Every reference to the output color is redirected to the hidden alias,
//! and every entry-function definition receives the composition statement
//! at the end of its body. The walk follows child order, so renames and
//! insertions land in the same place on every run.

use shade_ir::{AggregateOp, BinaryOp, Node, NodeId, Precision, Qualifier, Tree, Type};

use crate::config::{ENTRY_FUNCTION, OUTPUT_COLOR, TEXTURE2D};
use crate::error::RewriteError;
use crate::factory::NodeFactory;
use crate::insert::insert_at_end_of_function;

/// Names and types needed to build
/// `gl_FragColor = alias * texture2D(texture, texCoord)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Composition {
    /// Type of the output-color symbol as the front end declares it.
    pub output_ty: Type,
    pub alias_name: String,
    pub alias_precision: Precision,
    pub texture_uniform: String,
    pub tex_coord_varying: String,
    /// Return type of `texture2D`.
    pub sample_ty: Type,
}

impl Composition {
    /// Build the detached composition statement.
    pub fn build(&self, tree: &mut Tree) -> NodeId {
        let mut f = NodeFactory::new(tree);
        let alias = f.global_vec4(self.alias_name.clone(), self.alias_precision);
        let sampler = f.uniform_sampler2d(self.texture_uniform.clone());
        let coord = f.varying_vec2(self.tex_coord_varying.clone());
        let sample = f.texture2d_call(TEXTURE2D, sampler, coord, self.sample_ty.clone());
        let blended = f.binary(BinaryOp::Mul, alias, sample);
        let output = f.symbol(OUTPUT_COLOR, self.output_ty.clone());
        f.binary(BinaryOp::Assign, output, blended)
    }
}

/// What one traversal changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RewriteReport {
    /// References to the output color redirected to the alias.
    pub renamed_references: usize,
    /// Entry-function definitions that received the composition statement.
    pub entry_functions: usize,
}

/// Walk the whole tree once, renaming and composing.
pub fn traverse(tree: &mut Tree, composition: &Composition) -> Result<RewriteReport, RewriteError> {
    let mut walker = Walker {
        composition,
        report: RewriteReport::default(),
    };
    walker.walk(tree)?;
    Ok(walker.report)
}

enum Frame {
    Visit(NodeId),
    /// All children of this entry function have been visited.
    Compose(NodeId),
}

struct Walker<'c> {
    composition: &'c Composition,
    report: RewriteReport,
}

impl Walker<'_> {
    // Explicit stack: front-end trees can be arbitrarily deep.
    fn walk(&mut self, tree: &mut Tree) -> Result<(), RewriteError> {
        let mut stack = vec![Frame::Visit(tree.root())];
        while let Some(frame) = stack.pop() {
            let id = match frame {
                Frame::Visit(id) => id,
                Frame::Compose(function) => {
                    let statement = self.composition.build(tree);
                    insert_at_end_of_function(tree, statement, function)?;
                    self.report.entry_functions += 1;
                    continue;
                }
            };
            let node = tree.node(id);
            let children = node.children();
            match node {
                Node::Symbol(sym) => {
                    if sym.name == OUTPUT_COLOR {
                        self.rename_output(tree, id);
                    }
                }
                Node::Constant(_) => {}
                Node::Aggregate(agg) if agg.op == AggregateOp::Function && agg.name == ENTRY_FUNCTION => {
                    // Compose only after the existing subtree is walked so the
                    // injected statement's own reference to the output color
                    // keeps its name.
                    stack.push(Frame::Compose(id));
                }
                Node::Binary(_)
                | Node::Unary(_)
                | Node::Aggregate(_)
                | Node::Selection(_)
                | Node::Loop(_)
                | Node::Branch(_) => {}
            }
            stack.extend(children.into_iter().rev().map(Frame::Visit));
        }
        Ok(())
    }

    fn rename_output(&mut self, tree: &mut Tree, id: NodeId) {
        tree.set_symbol_name(id, self.composition.alias_name.clone());
        if let Some(ty) = tree.node_mut(id).ty_mut() {
            ty.qualifier = Qualifier::Global;
            ty.precision = self.composition.alias_precision;
        }
        if let Some(sym) = tree.node_mut(id).as_symbol_mut() {
            sym.id = 0;
        }
        self.report.renamed_references += 1;
    }
}

/// Rename a function definition and every call to it. Both names are
/// mangled. Returns the number of nodes renamed.
pub fn rename_function(tree: &mut Tree, old_name: &str, new_name: &str) -> usize {
    let mut renamed = 0;
    for id in tree.preorder() {
        if let Some(agg) = tree.node_mut(id).as_aggregate_mut() {
            let is_function = matches!(agg.op, AggregateOp::Function | AggregateOp::FunctionCall);
            if is_function && agg.name == old_name {
                agg.name = new_name.to_string();
                renamed += 1;
            }
        }
    }
    if renamed > 0 {
        log::debug!("renamed function '{old_name}' to '{new_name}' at {renamed} sites");
    }
    renamed
}
