//! The per-interpreter state every call runs against.

use dashmap::DashMap;
use smol_str::SmolStr;
use std::fmt;
use tracing::{debug, trace, warn};

use crate::{
    Shared,
    builtins::Builtins,
    error::RuntimeError,
    frame::MethodFrame,
    node::Tree,
    options::Options,
    qualified_name::{ModuleName, QualifiedName},
    scope::ModuleScope,
    types::Type,
    value::Value,
};

/// Receives structural notifications from running trees.
pub trait Instrumentation: fmt::Debug + Send + Sync {
    /// Called once the lazy body of `frame` has been replaced by its materialized tree.
    fn on_node_replaced(&self, _frame: &MethodFrame, _node: &Tree) {}
}

#[derive(Debug)]
pub struct Context {
    builtins: Builtins,
    options: Options,
    instrumentation: Option<Shared<dyn Instrumentation>>,
    modules: DashMap<ModuleName, Shared<ModuleScope>>,
    methods: DashMap<SmolStr, Shared<MethodFrame>>,
    dispatch: DashMap<(QualifiedName, SmolStr), Shared<MethodFrame>>,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    pub fn with_options(options: Options) -> Self {
        Self {
            builtins: Builtins::new(),
            options,
            instrumentation: None,
            modules: DashMap::new(),
            methods: DashMap::new(),
            dispatch: DashMap::new(),
        }
    }

    pub fn builtins(&self) -> &Builtins {
        &self.builtins
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn set_max_call_depth(&mut self, max_call_depth: u32) {
        self.options.max_call_depth = max_call_depth;
    }

    pub fn set_instrumentation(&mut self, instrumentation: Shared<dyn Instrumentation>) {
        self.instrumentation = Some(instrumentation);
    }

    pub(crate) fn notify_replaced(&self, frame: &MethodFrame, node: &Tree) {
        if !self.options.instrumentation || !frame.is_subject_to_instrumentation() {
            return;
        }

        if let Some(instrumentation) = &self.instrumentation {
            instrumentation.on_node_replaced(frame, node);
        }
    }

    /// Makes the methods of `module` callable. A module registered under the same name
    /// is replaced along with its methods.
    pub fn register_module(&self, module: ModuleScope) -> Shared<ModuleScope> {
        let module = Shared::new(module);

        if let Some(previous) = self
            .modules
            .insert(module.name().clone(), Shared::clone(&module))
        {
            warn!(module = %module.name(), "Module is already registered, replacing it");
            self.forget_methods(&previous);
        }

        for frame in module.methods() {
            self.methods
                .insert(frame.qualified_name().into(), Shared::clone(frame));

            let key = (
                frame.owner_type().qualified_name().clone(),
                SmolStr::new(frame.method_name()),
            );
            if let Some(previous) = self.dispatch.insert(key, Shared::clone(frame)) {
                debug!(
                    method = %frame.qualified_name(),
                    shadowed = %previous.qualified_name(),
                    "Method shadows an earlier definition"
                );
            }

            if self.options.eager_materialization
                && let Err(err) = frame.force_materialize(self)
            {
                warn!(
                    method = %frame.qualified_name(),
                    error = %err,
                    "Failed to materialize method body"
                );
            }
        }

        debug!(module = %module.name(), "Registered module");
        module
    }

    pub fn unregister_module(&self, name: &ModuleName) -> Option<Shared<ModuleScope>> {
        let (_, module) = self.modules.remove(name)?;
        self.forget_methods(&module);
        debug!(module = %name, "Unregistered module");
        Some(module)
    }

    pub fn module(&self, name: &ModuleName) -> Option<Shared<ModuleScope>> {
        self.modules
            .get(name)
            .map(|module| Shared::clone(module.value()))
    }

    /// Finds a method by its fully qualified name, `<module>::<type>::<method>`.
    pub fn resolve_method(
        &self,
        qualified_name: &str,
    ) -> Result<Shared<MethodFrame>, RuntimeError> {
        self.methods
            .get(qualified_name)
            .map(|frame| Shared::clone(frame.value()))
            .ok_or_else(|| RuntimeError::MethodNotFound(qualified_name.to_string()))
    }

    /// Finds the method `name` defined on `ty`, falling back to methods defined on `Any`.
    pub fn lookup_method(
        &self,
        ty: &Type,
        name: &str,
    ) -> Result<Shared<MethodFrame>, RuntimeError> {
        let name = SmolStr::new(name);
        let found = self
            .dispatch
            .get(&(ty.qualified_name().clone(), name.clone()))
            .or_else(|| {
                self.dispatch
                    .get(&(self.builtins.any().qualified_name().clone(), name.clone()))
            })
            .map(|frame| Shared::clone(frame.value()));

        trace!(owner = %ty, method = %name, found = found.is_some(), "Method lookup");

        found.ok_or_else(|| RuntimeError::NoSuchMethod {
            type_name: ty.to_string(),
            method: name.to_string(),
        })
    }

    /// Calls the method with the given fully qualified name.
    pub fn call(
        &self,
        qualified_name: &str,
        arguments: impl IntoIterator<Item = Value>,
    ) -> Result<Value, RuntimeError> {
        self.resolve_method(qualified_name)?.call(self, arguments)
    }

    fn forget_methods(&self, module: &ModuleScope) {
        for frame in module.methods() {
            self.methods
                .remove_if(frame.qualified_name(), |_, current| Shared::ptr_eq(current, frame));

            let key = (
                frame.owner_type().qualified_name().clone(),
                SmolStr::new(frame.method_name()),
            );
            self.dispatch
                .remove_if(&key, |_, current| Shared::ptr_eq(current, frame));
        }
    }
}
