//! Executable trees.
//!
//! A method body is a tree of [`ExecutableNode`]s shared behind [`Tree`] handles. Trees
//! are immutable once built, the only structural change at run time is a frame swapping
//! its lazy body for the materialized tree (see [`lazy`]).

pub mod basic;
pub mod lazy;
pub mod operator;

use std::fmt;

use crate::{Shared, call::CallFrame, error::RuntimeError, range::SourceSection, value::Value};

pub type Tree = Shared<dyn ExecutableNode>;

pub trait ExecutableNode: fmt::Debug + Send + Sync {
    fn execute(&self, frame: &mut CallFrame<'_>) -> Result<Value, RuntimeError>;

    /// A structurally equal tree that shares no nodes with this one.
    fn deep_copy(&self) -> Tree;

    fn children(&self) -> Vec<Tree> {
        Vec::new()
    }

    fn source_section(&self) -> Option<&SourceSection> {
        None
    }

    fn short_name(&self) -> &'static str;

    fn into_tree(self) -> Tree
    where
        Self: Sized + 'static,
    {
        Shared::new(self)
    }
}

/// Visits `tree` and all its descendants in pre-order.
pub fn walk(tree: &Tree, visit: &mut impl FnMut(&Tree)) {
    visit(tree);
    for child in tree.children() {
        walk(&child, visit);
    }
}

pub(crate) fn deep_copy_all(trees: &[Tree]) -> Vec<Tree> {
    trees.iter().map(|tree| tree.deep_copy()).collect()
}
