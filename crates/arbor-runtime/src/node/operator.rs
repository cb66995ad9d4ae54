use super::{ExecutableNode, Tree};
use crate::{
    call::CallFrame,
    error::{CompilerError, RuntimeError},
    value::Value,
};

/// Evaluates the left operand, the right operand and then the operator body, in that
/// order. The operands' results are observed by the body through the frame's locals
/// (typically the operand trees assign them), the node's value is the body's value.
#[derive(Debug)]
pub struct BinaryOperatorNode {
    left: Tree,
    right: Tree,
    body: Tree,
}

impl BinaryOperatorNode {
    pub fn new(left: Tree, right: Tree, body: Tree) -> Self {
        Self { left, right, body }
    }
}

impl ExecutableNode for BinaryOperatorNode {
    fn execute(&self, frame: &mut CallFrame<'_>) -> Result<Value, RuntimeError> {
        self.left.execute(frame)?;
        self.right.execute(frame)?;
        self.body.execute(frame)
    }

    fn deep_copy(&self) -> Tree {
        BinaryOperatorNode::new(
            self.left.deep_copy(),
            self.right.deep_copy(),
            self.body.deep_copy(),
        )
        .into_tree()
    }

    fn children(&self) -> Vec<Tree> {
        vec![self.left.clone(), self.right.clone(), self.body.clone()]
    }

    fn short_name(&self) -> &'static str {
        "binary_operator"
    }
}

/// Combines three suppliers into one producing a [`BinaryOperatorNode`]. The parts are
/// realized left, right, body; the first failure aborts the rest.
pub fn operator_supplier(
    left: impl Fn() -> Result<Tree, CompilerError> + Send + Sync + 'static,
    right: impl Fn() -> Result<Tree, CompilerError> + Send + Sync + 'static,
    body: impl Fn() -> Result<Tree, CompilerError> + Send + Sync + 'static,
) -> impl Fn() -> Result<Tree, CompilerError> + Send + Sync + 'static {
    move || {
        let left = left()?;
        let right = right()?;
        let body = body()?;
        Ok(BinaryOperatorNode::new(left, right, body).into_tree())
    }
}
