//! Name scopes: the argument and local layout of one method, and the definitions of one module.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use smol_str::SmolStr;

use crate::{
    Shared,
    frame::MethodFrame,
    qualified_name::{ModuleName, QualifiedName},
    types::{AtomConstructor, Type},
};

/// Argument names and the number of local slots of a method body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalScope {
    arguments: SmallVec<[SmolStr; 4]>,
    locals: usize,
}

impl LocalScope {
    pub fn new(arguments: impl IntoIterator<Item = impl Into<SmolStr>>, locals: usize) -> Self {
        Self {
            arguments: arguments.into_iter().map(Into::into).collect(),
            locals,
        }
    }

    pub fn arity(&self) -> usize {
        self.arguments.len()
    }

    pub fn local_count(&self) -> usize {
        self.locals
    }

    pub fn arguments(&self) -> &[SmolStr] {
        &self.arguments
    }

    pub fn argument_index(&self, name: &str) -> Option<usize> {
        self.arguments.iter().position(|argument| argument == name)
    }
}

/// The types, constructors and methods defined by one module.
#[derive(Debug, Default)]
pub struct ModuleScope {
    name: ModuleName,
    types: FxHashMap<SmolStr, Shared<Type>>,
    constructors: FxHashMap<SmolStr, Shared<AtomConstructor>>,
    methods: FxHashMap<(QualifiedName, SmolStr), Shared<MethodFrame>>,
}

impl ModuleScope {
    pub fn new(name: impl Into<ModuleName>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &ModuleName {
        &self.name
    }

    /// Defines a type in this module, named `<module>.<name>`.
    pub fn register_type(&mut self, name: impl Into<SmolStr>) -> Shared<Type> {
        let name = name.into();
        let ty = Shared::new(Type::new(self.name.create_child(name.clone())));
        self.types.insert(name, Shared::clone(&ty));
        ty
    }

    pub fn find_type(&self, name: &str) -> Option<&Shared<Type>> {
        self.types.get(name)
    }

    pub fn register_constructor(
        &mut self,
        constructor: AtomConstructor,
    ) -> Shared<AtomConstructor> {
        let constructor = Shared::new(constructor);
        self.constructors
            .insert(constructor.name().into(), Shared::clone(&constructor));
        constructor
    }

    pub fn constructor(&self, name: &str) -> Option<&Shared<AtomConstructor>> {
        self.constructors.get(name)
    }

    /// Adds a method, replacing an earlier definition of the same name on the same type.
    pub fn register_method(&mut self, frame: MethodFrame) -> Shared<MethodFrame> {
        let frame = Shared::new(frame);
        let key = (
            frame.owner_type().qualified_name().clone(),
            SmolStr::new(frame.method_name()),
        );
        self.methods.insert(key, Shared::clone(&frame));
        frame
    }

    pub fn method(&self, owner: &QualifiedName, name: &str) -> Option<&Shared<MethodFrame>> {
        self.methods.get(&(owner.clone(), SmolStr::new(name)))
    }

    pub fn methods(&self) -> impl Iterator<Item = &Shared<MethodFrame>> {
        self.methods.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        frame::FrameHeader,
        node::{ExecutableNode, basic::LiteralNode},
        value::Value,
    };
    use rstest::rstest;

    #[rstest]
    #[case("self", Some(0))]
    #[case("that", Some(1))]
    #[case("other", None)]
    fn test_argument_index(#[case] name: &str, #[case] expected: Option<usize>) {
        let scope = LocalScope::new(["self", "that"], 2);
        assert_eq!(scope.argument_index(name), expected);
        assert_eq!(scope.arity(), 2);
        assert_eq!(scope.local_count(), 2);
    }

    #[test]
    fn test_register_type_and_method() {
        let mut module = ModuleScope::new(QualifiedName::parse("Standard.Base.Data"));
        let vector = module.register_type("Vector");
        assert_eq!(vector.qualified_name().to_string(), "Standard.Base.Data.Vector");
        assert_eq!(module.find_type("Vector"), Some(&vector));

        let header = FrameHeader::new(
            module.name().clone(),
            Shared::clone(&vector),
            "length",
            LocalScope::new(["self"], 0),
        );
        let frame = module.register_method(crate::frame::MethodFrame::new(
            header,
            LiteralNode::new(Value::Integer(0)).into_tree(),
        ));

        let found = module.method(vector.qualified_name(), "length").unwrap();
        assert!(Shared::ptr_eq(found, &frame));
        assert!(module.method(vector.qualified_name(), "size").is_none());
        assert_eq!(module.methods().count(), 1);
    }

    #[test]
    fn test_register_constructor() {
        let mut module = ModuleScope::new(QualifiedName::parse("Main"));
        let pair = module.register_type("Pair");
        let constructor = module.register_constructor(AtomConstructor::new(
            "Pair",
            Shared::clone(&pair),
            ["first", "second"],
        ));
        assert_eq!(module.constructor("Pair"), Some(&constructor));
        assert_eq!(constructor.arity(), 2);
    }
}
