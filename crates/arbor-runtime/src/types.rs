use itertools::Itertools;
use smallvec::SmallVec;
use smol_str::SmolStr;
use std::fmt;

use crate::{Shared, error::RuntimeError, qualified_name::QualifiedName, value::Value};

/// A language level type. Methods are looked up by the type's qualified name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Type {
    qualified_name: QualifiedName,
    builtin: bool,
}

impl Type {
    pub fn new(qualified_name: impl Into<QualifiedName>) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            builtin: false,
        }
    }

    pub(crate) fn builtin(qualified_name: impl Into<QualifiedName>) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            builtin: true,
        }
    }

    pub fn name(&self) -> &str {
        self.qualified_name.item()
    }

    pub fn qualified_name(&self) -> &QualifiedName {
        &self.qualified_name
    }

    pub fn is_builtin(&self) -> bool {
        self.builtin
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.qualified_name)
    }
}

/// One constructor of a type, e.g. `Cons` of `List`.
#[derive(Debug, PartialEq, Eq)]
pub struct AtomConstructor {
    name: SmolStr,
    owner: Shared<Type>,
    fields: SmallVec<[SmolStr; 4]>,
}

impl AtomConstructor {
    pub fn new(
        name: impl Into<SmolStr>,
        owner: Shared<Type>,
        fields: impl IntoIterator<Item = impl Into<SmolStr>>,
    ) -> Self {
        Self {
            name: name.into(),
            owner,
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn owner(&self) -> &Shared<Type> {
        &self.owner
    }

    pub fn fields(&self) -> &[SmolStr] {
        &self.fields
    }

    pub fn arity(&self) -> usize {
        self.fields.len()
    }
}

/// An instance of an [`AtomConstructor`].
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    constructor: Shared<AtomConstructor>,
    fields: Vec<Value>,
}

impl Atom {
    pub fn new(
        constructor: Shared<AtomConstructor>,
        fields: Vec<Value>,
    ) -> Result<Self, RuntimeError> {
        if fields.len() != constructor.arity() {
            return Err(RuntimeError::ArityMismatch {
                name: format!("{}.{}", constructor.owner.name(), constructor.name),
                expected: constructor.arity(),
                actual: fields.len(),
            });
        }

        Ok(Self::from_parts(constructor, fields))
    }

    /// Builds an atom whose field count is already known to match the constructor.
    pub(crate) fn from_parts(constructor: Shared<AtomConstructor>, fields: Vec<Value>) -> Self {
        debug_assert_eq!(constructor.arity(), fields.len());
        Self {
            constructor,
            fields,
        }
    }

    pub fn constructor(&self) -> &Shared<AtomConstructor> {
        &self.constructor
    }

    pub fn fields(&self) -> &[Value] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.constructor
            .fields
            .iter()
            .position(|field| field == name)
            .and_then(|index| self.fields.get(index))
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fields.is_empty() {
            write!(f, "{}", self.constructor.name)
        } else {
            write!(
                f,
                "({} {})",
                self.constructor.name,
                self.fields.iter().join(" ")
            )
        }
    }
}
