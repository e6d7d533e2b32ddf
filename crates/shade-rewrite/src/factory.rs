//! Node construction with self-consistent type metadata.
//!
//! Every constructor allocates into the tree's arena and returns the new
//! handle; nothing is linked into the program until the inserter places it.

use shade_ir::{
    AggregateOp, BinaryOp, ConstantValue, Node, NodeId, Precision, Qualifier, Tree, Type,
};

/// Builds detached IR fragments inside a tree's arena.
pub struct NodeFactory<'t> {
    tree: &'t mut Tree,
}

impl<'t> NodeFactory<'t> {
    pub fn new(tree: &'t mut Tree) -> Self {
        Self { tree }
    }

    /// `vec4(x, y, z, w)` folded to a constant.
    pub fn vec4_constant(&mut self, x: f32, y: f32, z: f32, w: f32) -> NodeId {
        let values = [x, y, z, w].into_iter().map(ConstantValue::Float).collect();
        self.tree.alloc(Node::constant(
            values,
            Type::vec(4, Precision::Undefined, Qualifier::Const),
        ))
    }

    pub fn symbol(&mut self, name: impl Into<String>, ty: Type) -> NodeId {
        self.tree.alloc(Node::symbol(name, ty))
    }

    pub fn global_vec4(&mut self, name: impl Into<String>, precision: Precision) -> NodeId {
        self.symbol(name, Type::vec(4, precision, Qualifier::Global))
    }

    pub fn uniform_sampler2d(&mut self, name: impl Into<String>) -> NodeId {
        self.symbol(name, Type::sampler2d(Qualifier::Uniform))
    }

    pub fn varying_vec2(&mut self, name: impl Into<String>) -> NodeId {
        self.symbol(name, Type::vec(2, Precision::High, Qualifier::VaryingIn))
    }

    /// A call with no arguments yet; see [`add_argument`](Self::add_argument).
    pub fn function_call(&mut self, mangled_name: impl Into<String>, ty: Type) -> NodeId {
        self.tree.alloc(Node::aggregate(
            AggregateOp::FunctionCall,
            mangled_name,
            Vec::new(),
            ty,
        ))
    }

    pub fn add_argument(&mut self, call: NodeId, argument: NodeId) {
        debug_assert!(self.tree.is_aggregate(call, AggregateOp::FunctionCall));
        if let Some(args) = self.tree.sequence_mut(call) {
            args.push(argument);
        }
    }

    /// `texture2D(sampler, coord)` returning `ty`.
    pub fn texture2d_call(
        &mut self,
        mangled_name: &str,
        sampler: NodeId,
        coord: NodeId,
        ty: Type,
    ) -> NodeId {
        let call = self.function_call(mangled_name, ty);
        self.add_argument(call, sampler);
        self.add_argument(call, coord);
        call
    }

    /// A binary operation typed from its operands.
    pub fn binary(&mut self, op: BinaryOp, left: NodeId, right: NodeId) -> NodeId {
        let ty = match (self.tree.ty(left), self.tree.ty(right)) {
            (Some(l), Some(r)) => binary_result_type(op, l, r),
            (Some(l), None) => l.clone().with_qualifier(Qualifier::Temporary),
            _ => Type::void(),
        };
        self.tree.alloc(Node::binary(op, left, right, ty))
    }

    /// Wraps one symbol or initialization as a declaration statement.
    pub fn declaration(&mut self, child: NodeId) -> NodeId {
        self.tree.alloc(Node::aggregate(
            AggregateOp::Declaration,
            "",
            vec![child],
            Type::void(),
        ))
    }

    /// `<precision> vec4 name = rhs` at global scope.
    pub fn initialized_global_vec4(
        &mut self,
        name: impl Into<String>,
        precision: Precision,
        rhs: NodeId,
    ) -> NodeId {
        let symbol = self.global_vec4(name, precision);
        let init = self.binary(BinaryOp::Initialize, symbol, rhs);
        self.tree
            .set_ty(init, Type::vec(4, precision, Qualifier::Temporary));
        init
    }
}

/// Result type of `left op right`.
///
/// Assignments take the left operand's type, comparisons and logical
/// operators yield `bool`, indexing yields one component (or one column of
/// a matrix), and arithmetic takes the non-scalar operand's shape at the
/// wider of the two precisions. Results are always temporaries.
pub fn binary_result_type(op: BinaryOp, left: &Type, right: &Type) -> Type {
    if op.is_assignment() {
        return left.clone().with_qualifier(Qualifier::Temporary);
    }
    if op.is_boolean() {
        return Type::bool();
    }
    match op {
        BinaryOp::IndexDirect | BinaryOp::IndexIndirect => {
            let size = if left.matrix { left.size } else { 1 };
            let mut ty = Type::new(left.basic, left.precision, Qualifier::Temporary, size);
            if left.array_size.is_some() {
                ty = left.clone().with_qualifier(Qualifier::Temporary);
                ty.array_size = None;
            }
            ty
        }
        BinaryOp::VectorSwizzle => left.clone().with_qualifier(Qualifier::Temporary),
        _ => {
            let shape = if left.is_scalar() && !right.is_scalar() {
                right
            } else {
                left
            };
            let mut ty = shape.clone().with_qualifier(Qualifier::Temporary);
            ty.precision = left.precision.max(right.precision);
            ty
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shade_ir::BasicType;

    #[test]
    fn vec4_constant_is_const_typed() {
        let mut tree = Tree::new();
        let c = NodeFactory::new(&mut tree).vec4_constant(1.0, 0.0, 0.0, 1.0);
        match tree.node(c) {
            Node::Constant(constant) => {
                assert_eq!(constant.values.len(), 4);
                assert_eq!(constant.values[0], ConstantValue::Float(1.0));
                assert_eq!(constant.ty.qualifier, Qualifier::Const);
                assert_eq!(constant.ty.size, 4);
            }
            other => panic!("expected constant, got {other:?}"),
        }
    }

    #[test]
    fn symbol_constructors_bake_in_qualifiers() {
        let mut tree = Tree::new();
        let mut f = NodeFactory::new(&mut tree);
        let g = f.global_vec4("g", Precision::High);
        let u = f.uniform_sampler2d("u");
        let v = f.varying_vec2("v");

        assert_eq!(tree.qualifier(g), Some(Qualifier::Global));
        assert_eq!(tree.qualifier(u), Some(Qualifier::Uniform));
        assert_eq!(tree.ty(u).map(|t| t.basic), Some(BasicType::Sampler2D));
        assert_eq!(tree.qualifier(v), Some(Qualifier::VaryingIn));
        assert_eq!(tree.ty(v).map(|t| t.size), Some(2));
    }

    #[test]
    fn constructed_nodes_stay_detached() {
        let mut tree = Tree::new();
        let before = tree.sequence(tree.root()).map(|s| s.len());
        NodeFactory::new(&mut tree).global_vec4("detached", Precision::Low);
        assert_eq!(tree.sequence(tree.root()).map(|s| s.len()), before);
        assert!(!tree.is_symbol_used("detached"));
    }

    #[test]
    fn assignment_takes_left_type_as_temporary() {
        let left = Type::vec(4, Precision::Medium, Qualifier::FragColor);
        let right = Type::vec(4, Precision::High, Qualifier::Temporary);
        let ty = binary_result_type(BinaryOp::Assign, &left, &right);
        assert_eq!(ty, Type::vec(4, Precision::Medium, Qualifier::Temporary));
    }

    #[test]
    fn vector_product_keeps_shape_and_widest_precision() {
        let left = Type::vec(4, Precision::High, Qualifier::Global);
        let right = Type::vec(4, Precision::Low, Qualifier::Temporary);
        let ty = binary_result_type(BinaryOp::Mul, &left, &right);
        assert_eq!(ty, Type::vec(4, Precision::High, Qualifier::Temporary));
    }

    #[test]
    fn scalar_times_vector_takes_vector_shape() {
        let left = Type::vec(1, Precision::Medium, Qualifier::Uniform);
        let right = Type::vec(3, Precision::Low, Qualifier::Temporary);
        let ty = binary_result_type(BinaryOp::Mul, &left, &right);
        assert_eq!(ty, Type::vec(3, Precision::Medium, Qualifier::Temporary));
    }

    #[test]
    fn comparisons_yield_bool() {
        let f = Type::vec(1, Precision::High, Qualifier::Temporary);
        assert_eq!(binary_result_type(BinaryOp::LessThan, &f, &f), Type::bool());
    }

    #[test]
    fn indexing_a_vector_yields_a_component() {
        let v = Type::vec(4, Precision::Medium, Qualifier::Uniform);
        let i = Type::new(BasicType::Int, Precision::High, Qualifier::Const, 1);
        assert_eq!(
            binary_result_type(BinaryOp::IndexDirect, &v, &i),
            Type::vec(1, Precision::Medium, Qualifier::Temporary)
        );
    }

    #[test]
    fn call_collects_arguments_in_order() {
        let mut tree = Tree::new();
        let mut f = NodeFactory::new(&mut tree);
        let u = f.uniform_sampler2d("u");
        let v = f.varying_vec2("v");
        let call = f.texture2d_call(
            "texture2D(s21;vf2;",
            u,
            v,
            Type::vec(4, Precision::Low, Qualifier::Temporary),
        );
        assert_eq!(tree.sequence(call), Some(&[u, v][..]));
        assert_eq!(tree.aggregate_name(call), Some("texture2D(s21;vf2;"));
    }

    #[test]
    fn initialization_is_typed_as_temporary_vec4() {
        let mut tree = Tree::new();
        let mut f = NodeFactory::new(&mut tree);
        let white = f.vec4_constant(1.0, 1.0, 1.0, 1.0);
        let init = f.initialized_global_vec4("alias", Precision::Medium, white);
        let decl = f.declaration(init);

        assert_eq!(
            tree.ty(init),
            Some(&Type::vec(4, Precision::Medium, Qualifier::Temporary))
        );
        assert_eq!(tree.sequence(decl), Some(&[init][..]));
        match tree.node(init) {
            Node::Binary(b) => {
                assert_eq!(b.op, BinaryOp::Initialize);
                assert_eq!(tree.symbol_name(b.left), Some("alias"));
                assert_eq!(tree.qualifier(b.left), Some(Qualifier::Global));
                assert_eq!(b.right, white);
            }
            other => panic!("expected binary, got {other:?}"),
        }
    }
}
