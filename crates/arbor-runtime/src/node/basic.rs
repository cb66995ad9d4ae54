//! The node library method bodies are assembled from.

use smol_str::SmolStr;
use std::fmt;

use super::{ExecutableNode, Tree, deep_copy_all};
use crate::{
    Shared,
    call::{Arguments, CallFrame},
    error::RuntimeError,
    primitives::Primitive,
    range::SourceSection,
    types::{Atom, AtomConstructor},
    value::{Function, Value},
};

fn evaluate_all(trees: &[Tree], frame: &mut CallFrame<'_>) -> Result<Arguments, RuntimeError> {
    trees.iter().map(|tree| tree.execute(frame)).collect()
}

#[derive(Debug, Clone)]
pub struct LiteralNode {
    value: Value,
}

impl LiteralNode {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

impl ExecutableNode for LiteralNode {
    fn execute(&self, _frame: &mut CallFrame<'_>) -> Result<Value, RuntimeError> {
        Ok(self.value.clone())
    }

    fn deep_copy(&self) -> Tree {
        self.clone().into_tree()
    }

    fn short_name(&self) -> &'static str {
        "literal"
    }
}

#[derive(Debug, Clone)]
pub struct ReadArgumentNode {
    index: usize,
}

impl ReadArgumentNode {
    pub fn new(index: usize) -> Self {
        Self { index }
    }
}

impl ExecutableNode for ReadArgumentNode {
    fn execute(&self, frame: &mut CallFrame<'_>) -> Result<Value, RuntimeError> {
        frame
            .argument(self.index)
            .cloned()
            .ok_or(RuntimeError::UndefinedSlot(self.index))
    }

    fn deep_copy(&self) -> Tree {
        self.clone().into_tree()
    }

    fn short_name(&self) -> &'static str {
        "read_argument"
    }
}

#[derive(Debug, Clone)]
pub struct ReadLocalNode {
    slot: usize,
}

impl ReadLocalNode {
    pub fn new(slot: usize) -> Self {
        Self { slot }
    }
}

impl ExecutableNode for ReadLocalNode {
    fn execute(&self, frame: &mut CallFrame<'_>) -> Result<Value, RuntimeError> {
        frame.local(self.slot).cloned()
    }

    fn deep_copy(&self) -> Tree {
        self.clone().into_tree()
    }

    fn short_name(&self) -> &'static str {
        "read_local"
    }
}

/// Stores the value of `value` in a local slot. Evaluates to `Nothing`.
#[derive(Debug)]
pub struct AssignLocalNode {
    slot: usize,
    value: Tree,
}

impl AssignLocalNode {
    pub fn new(slot: usize, value: Tree) -> Self {
        Self { slot, value }
    }
}

impl ExecutableNode for AssignLocalNode {
    fn execute(&self, frame: &mut CallFrame<'_>) -> Result<Value, RuntimeError> {
        let value = self.value.execute(frame)?;
        frame.set_local(self.slot, value)?;
        Ok(Value::Nothing)
    }

    fn deep_copy(&self) -> Tree {
        AssignLocalNode::new(self.slot, self.value.deep_copy()).into_tree()
    }

    fn children(&self) -> Vec<Tree> {
        vec![Shared::clone(&self.value)]
    }

    fn short_name(&self) -> &'static str {
        "assign_local"
    }
}

/// Runs statements in order and evaluates to the last one, or `Nothing` when empty.
#[derive(Debug)]
pub struct BlockNode {
    statements: Vec<Tree>,
}

impl BlockNode {
    pub fn new(statements: Vec<Tree>) -> Self {
        Self { statements }
    }
}

impl ExecutableNode for BlockNode {
    fn execute(&self, frame: &mut CallFrame<'_>) -> Result<Value, RuntimeError> {
        self.statements
            .iter()
            .try_fold(Value::Nothing, |_, statement| statement.execute(frame))
    }

    fn deep_copy(&self) -> Tree {
        BlockNode::new(deep_copy_all(&self.statements)).into_tree()
    }

    fn children(&self) -> Vec<Tree> {
        self.statements.clone()
    }

    fn short_name(&self) -> &'static str {
        "block"
    }
}

/// Calls a method by its fully qualified name. The callee is looked up on every call so
/// that a re-registered module is picked up.
#[derive(Debug)]
pub struct InvokeNode {
    qualified_name: SmolStr,
    arguments: Vec<Tree>,
    section: Option<SourceSection>,
}

impl InvokeNode {
    pub fn new(qualified_name: impl Into<SmolStr>, arguments: Vec<Tree>) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            arguments,
            section: None,
        }
    }

    pub fn with_section(mut self, section: SourceSection) -> Self {
        self.section = Some(section);
        self
    }
}

impl ExecutableNode for InvokeNode {
    fn execute(&self, frame: &mut CallFrame<'_>) -> Result<Value, RuntimeError> {
        let method = frame.context().resolve_method(&self.qualified_name)?;
        let arguments = evaluate_all(&self.arguments, frame)?;
        frame.invoke(&method, arguments)
    }

    fn deep_copy(&self) -> Tree {
        InvokeNode {
            qualified_name: self.qualified_name.clone(),
            arguments: deep_copy_all(&self.arguments),
            section: self.section.clone(),
        }
        .into_tree()
    }

    fn children(&self) -> Vec<Tree> {
        self.arguments.clone()
    }

    fn source_section(&self) -> Option<&SourceSection> {
        self.section.as_ref()
    }

    fn short_name(&self) -> &'static str {
        "invoke"
    }
}

/// Calls `method` on the type of the first argument.
#[derive(Debug)]
pub struct DispatchNode {
    method: SmolStr,
    arguments: Vec<Tree>,
    section: Option<SourceSection>,
}

impl DispatchNode {
    /// `arguments` must contain the receiver as its first element.
    pub fn new(method: impl Into<SmolStr>, arguments: Vec<Tree>) -> Self {
        Self {
            method: method.into(),
            arguments,
            section: None,
        }
    }

    pub fn with_section(mut self, section: SourceSection) -> Self {
        self.section = Some(section);
        self
    }
}

impl ExecutableNode for DispatchNode {
    fn execute(&self, frame: &mut CallFrame<'_>) -> Result<Value, RuntimeError> {
        let arguments = evaluate_all(&self.arguments, frame)?;
        let receiver = arguments
            .first()
            .ok_or_else(|| RuntimeError::NotExecutable(self.method.to_string()))?;
        let ty = receiver.type_of(frame.builtins());
        let method = frame.context().lookup_method(&ty, &self.method)?;
        frame.invoke(&method, arguments)
    }

    fn deep_copy(&self) -> Tree {
        DispatchNode {
            method: self.method.clone(),
            arguments: deep_copy_all(&self.arguments),
            section: self.section.clone(),
        }
        .into_tree()
    }

    fn children(&self) -> Vec<Tree> {
        self.arguments.clone()
    }

    fn source_section(&self) -> Option<&SourceSection> {
        self.section.as_ref()
    }

    fn short_name(&self) -> &'static str {
        "dispatch"
    }
}

/// Calls the value `callee` evaluates to.
#[derive(Debug)]
pub struct ApplyNode {
    callee: Tree,
    arguments: Vec<Tree>,
}

impl ApplyNode {
    pub fn new(callee: Tree, arguments: Vec<Tree>) -> Self {
        Self { callee, arguments }
    }
}

impl ExecutableNode for ApplyNode {
    fn execute(&self, frame: &mut CallFrame<'_>) -> Result<Value, RuntimeError> {
        let callee = self.callee.execute(frame)?;
        let arguments = evaluate_all(&self.arguments, frame)?;
        frame.execute_value(&callee, arguments)
    }

    fn deep_copy(&self) -> Tree {
        ApplyNode::new(self.callee.deep_copy(), deep_copy_all(&self.arguments)).into_tree()
    }

    fn children(&self) -> Vec<Tree> {
        let mut children = vec![Shared::clone(&self.callee)];
        children.extend(self.arguments.iter().cloned());
        children
    }

    fn short_name(&self) -> &'static str {
        "apply"
    }
}

/// Evaluates to the function value of a method, looked up by qualified name.
#[derive(Debug, Clone)]
pub struct FunctionRefNode {
    qualified_name: SmolStr,
}

impl FunctionRefNode {
    pub fn new(qualified_name: impl Into<SmolStr>) -> Self {
        Self {
            qualified_name: qualified_name.into(),
        }
    }
}

impl ExecutableNode for FunctionRefNode {
    fn execute(&self, frame: &mut CallFrame<'_>) -> Result<Value, RuntimeError> {
        let method = frame.context().resolve_method(&self.qualified_name)?;
        Ok(Value::Function(Function::new(method)))
    }

    fn deep_copy(&self) -> Tree {
        self.clone().into_tree()
    }

    fn short_name(&self) -> &'static str {
        "function_ref"
    }
}

/// Builds an atom from its field values.
#[derive(Debug)]
pub struct InstantiateNode {
    constructor: Shared<AtomConstructor>,
    arguments: Vec<Tree>,
}

impl InstantiateNode {
    pub fn new(constructor: Shared<AtomConstructor>, arguments: Vec<Tree>) -> Self {
        Self {
            constructor,
            arguments,
        }
    }
}

impl ExecutableNode for InstantiateNode {
    fn execute(&self, frame: &mut CallFrame<'_>) -> Result<Value, RuntimeError> {
        let fields = evaluate_all(&self.arguments, frame)?.into_vec();
        let atom = Atom::new(Shared::clone(&self.constructor), fields)?;
        Ok(Value::Atom(Shared::new(atom)))
    }

    fn deep_copy(&self) -> Tree {
        InstantiateNode::new(
            Shared::clone(&self.constructor),
            deep_copy_all(&self.arguments),
        )
        .into_tree()
    }

    fn children(&self) -> Vec<Tree> {
        self.arguments.clone()
    }

    fn short_name(&self) -> &'static str {
        "instantiate"
    }
}

/// Applies a builtin primitive to its evaluated arguments.
pub struct BuiltinNode {
    name: SmolStr,
    primitive: Primitive,
    arguments: Vec<Tree>,
}

impl BuiltinNode {
    pub fn new(name: impl Into<SmolStr>, primitive: Primitive, arguments: Vec<Tree>) -> Self {
        Self {
            name: name.into(),
            primitive,
            arguments,
        }
    }
}

impl fmt::Debug for BuiltinNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuiltinNode")
            .field("name", &self.name)
            .field("arguments", &self.arguments)
            .finish_non_exhaustive()
    }
}

impl ExecutableNode for BuiltinNode {
    fn execute(&self, frame: &mut CallFrame<'_>) -> Result<Value, RuntimeError> {
        let arguments = evaluate_all(&self.arguments, frame)?;
        (self.primitive)(frame, &arguments)
    }

    fn deep_copy(&self) -> Tree {
        BuiltinNode::new(
            self.name.clone(),
            self.primitive,
            deep_copy_all(&self.arguments),
        )
        .into_tree()
    }

    fn children(&self) -> Vec<Tree> {
        self.arguments.clone()
    }

    fn short_name(&self) -> &'static str {
        "builtin"
    }
}
