//! Deferred method bodies.
//!
//! A frame created from a [`TreeSupplier`] holds a placeholder until its first call. The
//! first caller builds the tree and installs it in the frame's [`BodySlot`]; every later
//! call runs the installed tree directly.

use std::{
    fmt,
    sync::{PoisonError, RwLock},
};
use tracing::debug;

use super::Tree;
use crate::{
    Shared,
    builtins::Builtins,
    call::CallFrame,
    context::Context,
    error::{CompilerError, PanicException, RuntimeError},
    frame::MethodFrame,
    range::SourceSection,
    value::Value,
};

/// Produces the tree of a method body on demand.
pub type TreeSupplier = Shared<dyn Fn() -> Result<Tree, CompilerError> + Send + Sync>;

pub struct LazyBody {
    supplier: TreeSupplier,
    section: Option<SourceSection>,
}

impl LazyBody {
    pub fn new(
        supplier: impl Fn() -> Result<Tree, CompilerError> + Send + Sync + 'static,
        section: Option<SourceSection>,
    ) -> Self {
        Self {
            supplier: Shared::new(supplier),
            section,
        }
    }

    pub fn source_section(&self) -> Option<&SourceSection> {
        self.section.as_ref()
    }

    /// Runs the supplier. A compile failure is raised as a panic carrying a
    /// `Compile_Error` value at the placeholder's location.
    pub fn materialize(&self, builtins: &Builtins) -> Result<Tree, RuntimeError> {
        (self.supplier)().map_err(|err| {
            RuntimeError::Panic(PanicException::new(
                builtins.make_compile_error(err.message()),
                self.section.clone(),
            ))
        })
    }
}

impl fmt::Debug for LazyBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyBody")
            .field("section", &self.section)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
enum Body {
    Lazy(Shared<LazyBody>),
    Ready(Tree),
}

/// The body of a frame. Moves from lazy to ready at most once and never back.
#[derive(Debug)]
pub struct BodySlot {
    body: RwLock<Body>,
}

impl BodySlot {
    pub fn ready(tree: Tree) -> Self {
        Self {
            body: RwLock::new(Body::Ready(tree)),
        }
    }

    pub fn lazy(body: LazyBody) -> Self {
        Self {
            body: RwLock::new(Body::Lazy(Shared::new(body))),
        }
    }

    // The slot always holds a complete body, so a poisoned lock is still readable.
    fn snapshot(&self) -> Body {
        self.body
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The installed tree, if the body has been materialized.
    pub fn get(&self) -> Option<Tree> {
        match self.snapshot() {
            Body::Ready(tree) => Some(tree),
            Body::Lazy(_) => None,
        }
    }

    pub fn is_materialized(&self) -> bool {
        matches!(self.snapshot(), Body::Ready(_))
    }

    /// Returns the body tree, materializing it first if needed.
    ///
    /// Concurrent first calls may each run the supplier, but only the first tree to be
    /// installed is kept and every caller gets that tree back.
    pub fn resolve(&self, context: &Context, owner: &MethodFrame) -> Result<Tree, RuntimeError> {
        let lazy = match self.snapshot() {
            Body::Ready(tree) => return Ok(tree),
            Body::Lazy(lazy) => lazy,
        };

        let tree = lazy.materialize(context.builtins())?;

        {
            let mut body = self.body.write().unwrap_or_else(PoisonError::into_inner);
            if let Body::Ready(winner) = &*body {
                debug!(
                    method = %owner.qualified_name(),
                    "Lost materialization race, using installed body"
                );
                return Ok(Shared::clone(winner));
            }
            *body = Body::Ready(Shared::clone(&tree));
        }

        debug!(method = %owner.qualified_name(), "Materialized method body");
        context.notify_replaced(owner, &tree);
        Ok(tree)
    }

    pub fn execute(
        &self,
        owner: &MethodFrame,
        frame: &mut CallFrame<'_>,
    ) -> Result<Value, RuntimeError> {
        let tree = self.resolve(frame.context(), owner)?;
        tree.execute(frame)
    }
}
