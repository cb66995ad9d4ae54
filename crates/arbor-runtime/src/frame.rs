//! Method and constructor frames: the root of every executable tree.

use smol_str::SmolStr;
use std::fmt;
use tracing::trace;

use crate::{
    Shared,
    call::{self, CallFrame},
    context::Context,
    error::{CompilerError, RuntimeError},
    node::{
        Tree,
        lazy::{BodySlot, LazyBody},
        operator::operator_supplier,
    },
    qualified_name::{METHOD_SEPARATOR, ModuleName},
    range::SourceSection,
    scope::LocalScope,
    types::{AtomConstructor, Type},
    value::{Function, Value},
};

/// What every frame is built from: where it lives and what it is called.
#[derive(Debug, Clone)]
pub struct FrameHeader {
    pub module: ModuleName,
    pub owner: Shared<Type>,
    pub name: SmolStr,
    pub scope: LocalScope,
    pub section: Option<SourceSection>,
}

impl FrameHeader {
    pub fn new(
        module: impl Into<ModuleName>,
        owner: Shared<Type>,
        name: impl Into<SmolStr>,
        scope: LocalScope,
    ) -> Self {
        Self {
            module: module.into(),
            owner,
            name: name.into(),
            scope,
            section: None,
        }
    }

    pub fn with_section(mut self, section: SourceSection) -> Self {
        self.section = Some(section);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameKind {
    Method,
    /// The frame builds instances of the given constructor.
    Constructor(Shared<AtomConstructor>),
}

#[derive(Debug)]
pub struct MethodFrame {
    module: ModuleName,
    owner: Shared<Type>,
    name: SmolStr,
    qualified_name: String,
    scope: LocalScope,
    section: Option<SourceSection>,
    kind: FrameKind,
    body: BodySlot,
}

impl MethodFrame {
    fn from_parts(header: FrameHeader, kind: FrameKind, body: BodySlot) -> Self {
        let FrameHeader {
            module,
            owner,
            name,
            scope,
            section,
        } = header;
        let qualified_name = format!(
            "{module}{METHOD_SEPARATOR}{}{METHOD_SEPARATOR}{name}",
            owner.qualified_name()
        );

        Self {
            module,
            owner,
            name,
            qualified_name,
            scope,
            section,
            kind,
            body,
        }
    }

    /// A method whose body is already built.
    pub fn new(header: FrameHeader, body: Tree) -> Self {
        Self::from_parts(header, FrameKind::Method, BodySlot::ready(body))
    }

    /// A method whose body is built by `supplier` on the first call.
    pub fn lazy(
        header: FrameHeader,
        supplier: impl Fn() -> Result<Tree, CompilerError> + Send + Sync + 'static,
    ) -> Self {
        let section = header.section.clone();
        Self::from_parts(
            header,
            FrameKind::Method,
            BodySlot::lazy(LazyBody::new(supplier, section)),
        )
    }

    /// The frame of a constructor. Its owner and name are taken from `constructor`.
    pub fn constructor(
        module: impl Into<ModuleName>,
        constructor: Shared<AtomConstructor>,
        scope: LocalScope,
        body: Tree,
        section: Option<SourceSection>,
    ) -> Self {
        let header = FrameHeader {
            module: module.into(),
            owner: Shared::clone(constructor.owner()),
            name: constructor.name().into(),
            scope,
            section,
        };
        Self::from_parts(
            header,
            FrameKind::Constructor(constructor),
            BodySlot::ready(body),
        )
    }

    /// An operator method. The three parts are built together on the first call, and each
    /// call evaluates them left, right, body.
    pub fn operator(
        header: FrameHeader,
        read_left: impl Fn() -> Result<Tree, CompilerError> + Send + Sync + 'static,
        read_right: impl Fn() -> Result<Tree, CompilerError> + Send + Sync + 'static,
        body: impl Fn() -> Result<Tree, CompilerError> + Send + Sync + 'static,
    ) -> Self {
        Self::lazy(header, operator_supplier(read_left, read_right, body))
    }

    /// `<module>::<owner type>::<name>`. Never changes for the lifetime of the frame.
    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    /// `<owner type name>.<name>`, for display.
    pub fn short_name(&self) -> String {
        format!("{}.{}", self.owner.name(), self.name)
    }

    pub fn method_name(&self) -> &str {
        &self.name
    }

    pub fn owner_type(&self) -> &Shared<Type> {
        &self.owner
    }

    pub fn module(&self) -> &ModuleName {
        &self.module
    }

    pub fn scope(&self) -> &LocalScope {
        &self.scope
    }

    pub fn source_section(&self) -> Option<&SourceSection> {
        self.section.as_ref()
    }

    pub fn kind(&self) -> &FrameKind {
        &self.kind
    }

    pub fn as_constructor(&self) -> Option<&Shared<AtomConstructor>> {
        match &self.kind {
            FrameKind::Constructor(constructor) => Some(constructor),
            FrameKind::Method => None,
        }
    }

    pub fn is_subject_to_instrumentation(&self) -> bool {
        true
    }

    pub fn is_materialized(&self) -> bool {
        self.body.is_materialized()
    }

    /// The body tree, if it has been built.
    pub fn body(&self) -> Option<Tree> {
        self.body.get()
    }

    /// Builds the body without running it.
    pub fn force_materialize(&self, context: &Context) -> Result<Tree, RuntimeError> {
        self.body.resolve(context, self)
    }

    pub fn execute(&self, frame: &mut CallFrame<'_>) -> Result<Value, RuntimeError> {
        self.body.execute(self, frame)
    }

    /// Calls this method from the top level.
    pub fn call(
        &self,
        context: &Context,
        arguments: impl IntoIterator<Item = Value>,
    ) -> Result<Value, RuntimeError> {
        call::enter(context, self, arguments, 0)
    }

    /// A new frame with the same identity sharing this frame's body tree.
    pub fn copy(&self, context: &Context) -> Result<Self, RuntimeError> {
        let tree = self.force_materialize(context)?;
        trace!(method = %self.qualified_name, "Copy frame");
        Ok(self.with_body(tree))
    }

    /// A new frame with the same identity and its own copy of the body tree.
    pub fn deep_copy(&self, context: &Context) -> Result<Self, RuntimeError> {
        let tree = self.force_materialize(context)?;
        trace!(method = %self.qualified_name, "Deep copy frame");
        Ok(self.with_body(tree.deep_copy()))
    }

    fn with_body(&self, tree: Tree) -> Self {
        Self {
            module: self.module.clone(),
            owner: Shared::clone(&self.owner),
            name: self.name.clone(),
            qualified_name: self.qualified_name.clone(),
            scope: self.scope.clone(),
            section: self.section.clone(),
            kind: self.kind.clone(),
            body: BodySlot::ready(tree),
        }
    }
}

impl fmt::Display for MethodFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.qualified_name)
    }
}

/// The constructor a function value builds, if it is a constructor's function.
pub fn constructor_for(function: &Function) -> Option<Shared<AtomConstructor>> {
    function.frame().as_constructor().cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        node::{
            ExecutableNode,
            basic::{InstantiateNode, LiteralNode, ReadArgumentNode},
        },
        qualified_name::QualifiedName,
    };
    use rstest::rstest;
    use std::sync::{
        Mutex, OnceLock, Weak,
        atomic::{AtomicUsize, Ordering},
    };

    fn vector() -> Shared<Type> {
        Shared::new(Type::new("Vector"))
    }

    fn header(name: &str) -> FrameHeader {
        FrameHeader::new(
            QualifiedName::parse("Standard.Base"),
            vector(),
            name,
            LocalScope::new(["self"], 0),
        )
    }

    #[rstest]
    #[case("length", "Standard.Base::Vector::length", "Vector.length")]
    #[case("at", "Standard.Base::Vector::at", "Vector.at")]
    fn test_names(#[case] name: &str, #[case] qualified: &str, #[case] short: &str) {
        let frame = MethodFrame::new(header(name), LiteralNode::new(Value::Integer(0)).into_tree());
        assert_eq!(frame.qualified_name(), qualified);
        assert_eq!(frame.short_name(), short);
        assert_eq!(frame.to_string(), qualified);
    }

    #[test]
    fn test_lazy_body_is_built_once() {
        let context = Context::new();
        let calls = Shared::new(AtomicUsize::new(0));
        let counter = Shared::clone(&calls);
        let frame = MethodFrame::lazy(header("length"), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(LiteralNode::new(Value::Integer(3)).into_tree())
        });

        assert!(!frame.is_materialized());
        assert!(frame.body().is_none());
        assert_eq!(frame.call(&context, [Value::Nothing]).unwrap(), Value::Integer(3));
        let first = frame.body().unwrap();
        assert_eq!(frame.call(&context, [Value::Nothing]).unwrap(), Value::Integer(3));

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(Shared::ptr_eq(&first, &frame.body().unwrap()));
        assert_eq!(frame.qualified_name(), "Standard.Base::Vector::length");
    }

    #[test]
    fn test_losing_materialization_adopts_installed_body() {
        let context = Context::new();
        let calls = Shared::new(AtomicUsize::new(0));
        let this: Shared<OnceLock<Weak<MethodFrame>>> = Shared::new(OnceLock::new());
        let installed: Shared<Mutex<Option<Tree>>> = Shared::new(Mutex::new(None));

        let (counter, handle, nested) = (
            Shared::clone(&calls),
            Shared::clone(&this),
            Shared::clone(&installed),
        );
        let frame = Shared::new(MethodFrame::lazy(header("length"), move || {
            // The first build materializes the same frame before returning.
            if counter.fetch_add(1, Ordering::SeqCst) == 0
                && let Some(frame) = handle.get().and_then(Weak::upgrade)
            {
                *nested.lock().unwrap() = frame.force_materialize(&Context::new()).ok();
            }
            Ok(LiteralNode::new(Value::Integer(7)).into_tree())
        }));
        this.set(Shared::downgrade(&frame)).unwrap();

        let tree = frame.force_materialize(&context).unwrap();
        let nested = installed.lock().unwrap().clone().unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(Shared::ptr_eq(&tree, &nested));
        assert!(Shared::ptr_eq(&frame.body().unwrap(), &nested));
        assert_eq!(frame.call(&context, [Value::Nothing]).unwrap(), Value::Integer(7));
    }

    #[test]
    fn test_failed_materialization_is_retried() {
        let context = Context::new();
        let calls = Shared::new(AtomicUsize::new(0));
        let counter = Shared::clone(&calls);
        let frame = MethodFrame::lazy(header("length"), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(CompilerError::new("Unresolved symbol"))
        });

        assert!(matches!(
            frame.call(&context, [Value::Nothing]),
            Err(RuntimeError::Panic(_))
        ));
        assert!(frame.call(&context, [Value::Nothing]).is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(!frame.is_materialized());
    }

    #[rstest]
    #[case::shallow(false)]
    #[case::deep(true)]
    fn test_copy_forces_materialization(#[case] deep: bool) {
        let context = Context::new();
        let frame = MethodFrame::lazy(header("length"), || {
            Ok(LiteralNode::new(Value::Integer(7)).into_tree())
        });

        let copy = if deep {
            frame.deep_copy(&context).unwrap()
        } else {
            frame.copy(&context).unwrap()
        };

        assert!(frame.is_materialized());
        assert!(copy.is_materialized());
        assert_eq!(copy.qualified_name(), frame.qualified_name());
        assert_eq!(
            Shared::ptr_eq(&copy.body().unwrap(), &frame.body().unwrap()),
            !deep
        );
        assert_eq!(copy.call(&context, [Value::Nothing]).unwrap(), Value::Integer(7));
    }

    #[test]
    fn test_copy_of_broken_body_fails() {
        let context = Context::new();
        let frame = MethodFrame::lazy(header("length"), || Err(CompilerError::new("boom")));
        assert!(frame.copy(&context).is_err());
        assert!(frame.deep_copy(&context).is_err());
    }

    #[test]
    fn test_constructor_frame() {
        let owner = Shared::new(Type::new("Standard.Base.Data.Pair"));
        let constructor = Shared::new(AtomConstructor::new(
            "Value",
            Shared::clone(&owner),
            ["first", "second"],
        ));
        let body = InstantiateNode::new(
            Shared::clone(&constructor),
            vec![
                ReadArgumentNode::new(0).into_tree(),
                ReadArgumentNode::new(1).into_tree(),
            ],
        )
        .into_tree();
        let frame = Shared::new(MethodFrame::constructor(
            QualifiedName::parse("Standard.Base.Data"),
            Shared::clone(&constructor),
            LocalScope::new(["first", "second"], 0),
            body,
            None,
        ));

        assert_eq!(frame.short_name(), "Pair.Value");
        assert_eq!(
            frame.qualified_name(),
            "Standard.Base.Data::Standard.Base.Data.Pair::Value"
        );
        assert_eq!(frame.as_constructor(), Some(&constructor));

        let function = Function::new(Shared::clone(&frame));
        assert_eq!(constructor_for(&function), Some(constructor));

        let value = frame
            .call(&Context::new(), [Value::Integer(1), Value::Integer(2)])
            .unwrap();
        assert_eq!(value.to_string(), "(Value 1 2)");
    }

    #[test]
    fn test_method_is_not_a_constructor() {
        let frame = Shared::new(MethodFrame::new(
            header("length"),
            LiteralNode::new(Value::Integer(0)).into_tree(),
        ));
        assert_eq!(frame.kind(), &FrameKind::Method);
        assert!(constructor_for(&Function::new(frame)).is_none());
    }
}
