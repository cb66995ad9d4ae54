use std::fmt;

use super::{ForeignObject, InteropError};
use crate::{Shared, builtins::Builtins, call::Caller, types::Type, value::Value};

/// Turns a callback producing elements into a polyglot array.
///
/// Nothing is materialized: every read calls the producer with the requested index,
/// which lets computed sequences (rows of a table, for example) be exposed without
/// copying them. Reading the same index twice calls the producer twice.
#[derive(Debug, Clone)]
pub struct ArrayProxy {
    length: u64,
    at: Value,
}

impl ArrayProxy {
    pub fn new(length: u64, at: Value) -> Self {
        Self { length, at }
    }

    pub fn len(&self) -> u64 {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// The callable producing the element at a given index.
    pub fn producer(&self) -> &Value {
        &self.at
    }
}

impl fmt::Display for ArrayProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(Array_Proxy {} {})", self.length, self.at)
    }
}

impl ForeignObject for ArrayProxy {
    fn to_display_string(&self) -> String {
        self.to_string()
    }

    fn has_meta_object(&self) -> bool {
        true
    }

    fn meta_object(&self, builtins: &Builtins) -> Result<Shared<Type>, InteropError> {
        Ok(Shared::clone(builtins.array()))
    }

    fn has_type(&self) -> bool {
        true
    }

    fn type_of(&self, builtins: &Builtins) -> Result<Shared<Type>, InteropError> {
        Ok(Shared::clone(builtins.array()))
    }

    fn has_array_elements(&self) -> bool {
        true
    }

    fn array_size(&self) -> Result<u64, InteropError> {
        Ok(self.length)
    }

    fn is_array_element_readable(&self, index: i64) -> bool {
        u64::try_from(index).is_ok_and(|index| index < self.length)
    }

    fn read_array_element(&self, index: i64, caller: Caller<'_>) -> Result<Value, InteropError> {
        if !self.is_array_element_readable(index) {
            return Err(InteropError::InvalidArrayIndex(index));
        }

        self.at
            .execute(&[Value::Integer(index)], caller)
            .map_err(InteropError::unsupported_by)
    }
}
