//! The boundary between interpreter values and a polyglot host.
//!
//! Every value crossing the boundary answers the fixed capability contract of
//! [`ForeignObject`]. A capability a value does not have is reported through its
//! predicate (`has_array_elements`, `is_time_zone`, ...) and the matching accessor
//! fails with [`InteropError::UnsupportedMessage`].

mod array_proxy;
mod host;
mod time_zone;
mod value;

use chrono::{NaiveDate, NaiveTime};
use std::fmt;
use thiserror::Error;

use crate::{
    Shared, builtins::Builtins, call::Caller, error::RuntimeError, types::Type, value::Value,
};

pub use array_proxy::ArrayProxy;
pub use host::{HostDateTime, HostFunction};
pub use time_zone::{OffsetPrefix, TimeZone, Zone};

type BoxedError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum InteropError {
    #[error("Invalid array index {0}")]
    InvalidArrayIndex(i64),
    #[error("Unsupported message")]
    UnsupportedMessage(#[source] Option<BoxedError>),
    #[error("Invalid number of arguments, expected {expected}, got {actual}")]
    Arity { expected: usize, actual: usize },
    #[error("Unsupported argument types: {0}")]
    UnsupportedType(String),
    #[error("Invalid date time: {0}")]
    InvalidDateTime(String),
    #[error("Unknown time zone \"{id}\": {reason}")]
    ZoneRules { id: String, reason: String },
    #[error(transparent)]
    Runtime(Box<RuntimeError>),
}

impl InteropError {
    pub fn unsupported() -> Self {
        InteropError::UnsupportedMessage(None)
    }

    /// Folds any failure into the single unsupported message shape, keeping the
    /// original failure as the error source.
    pub fn unsupported_by(err: InteropError) -> Self {
        match err {
            InteropError::UnsupportedMessage(source) => InteropError::UnsupportedMessage(source),
            other => InteropError::UnsupportedMessage(Some(Box::new(other))),
        }
    }
}

impl From<RuntimeError> for InteropError {
    fn from(err: RuntimeError) -> Self {
        match err {
            RuntimeError::ArityMismatch {
                expected, actual, ..
            } => InteropError::Arity { expected, actual },
            RuntimeError::Interop(err) => err,
            other => InteropError::Runtime(Box::new(other)),
        }
    }
}

/// The capability contract of a value exposed to the polyglot host.
pub trait ForeignObject: fmt::Debug + Send + Sync {
    fn to_display_string(&self) -> String;

    fn has_meta_object(&self) -> bool {
        false
    }

    fn meta_object(&self, _builtins: &Builtins) -> Result<Shared<Type>, InteropError> {
        Err(InteropError::unsupported())
    }

    fn has_type(&self) -> bool {
        false
    }

    fn type_of(&self, _builtins: &Builtins) -> Result<Shared<Type>, InteropError> {
        Err(InteropError::unsupported())
    }

    fn has_array_elements(&self) -> bool {
        false
    }

    fn array_size(&self) -> Result<u64, InteropError> {
        Err(InteropError::unsupported())
    }

    fn is_array_element_readable(&self, _index: i64) -> bool {
        false
    }

    fn read_array_element(&self, _index: i64, _caller: Caller<'_>) -> Result<Value, InteropError> {
        Err(InteropError::unsupported())
    }

    fn is_time_zone(&self) -> bool {
        false
    }

    fn as_time_zone(&self) -> Result<Zone, InteropError> {
        Err(InteropError::unsupported())
    }

    fn is_date(&self) -> bool {
        false
    }

    fn as_date(&self) -> Result<NaiveDate, InteropError> {
        Err(InteropError::unsupported())
    }

    fn is_time(&self) -> bool {
        false
    }

    fn as_time(&self) -> Result<NaiveTime, InteropError> {
        Err(InteropError::unsupported())
    }

    fn is_executable(&self) -> bool {
        false
    }

    fn execute(&self, _arguments: &[Value], _caller: Caller<'_>) -> Result<Value, InteropError> {
        Err(InteropError::unsupported())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use std::error::Error as _;

    #[derive(Debug)]
    struct Opaque;

    impl ForeignObject for Opaque {
        fn to_display_string(&self) -> String {
            "opaque".to_string()
        }
    }

    #[test]
    fn test_default_capabilities_are_unsupported() {
        let context = Context::new();
        let object = Opaque;

        assert!(!object.has_array_elements());
        assert!(!object.is_time_zone());
        assert!(!object.is_executable());
        assert!(!object.is_array_element_readable(0));
        assert!(matches!(
            object.read_array_element(0, Caller::host(&context)),
            Err(InteropError::UnsupportedMessage(None))
        ));
        assert!(matches!(
            object.as_date(),
            Err(InteropError::UnsupportedMessage(None))
        ));
        assert!(object.type_of(context.builtins()).is_err());
    }

    #[test]
    fn test_unsupported_by_keeps_source() {
        let err = InteropError::unsupported_by(InteropError::Arity {
            expected: 1,
            actual: 2,
        });
        let InteropError::UnsupportedMessage(Some(_)) = &err else {
            panic!("expected an unsupported message, got {err:?}");
        };
        assert_eq!(
            err.source().map(|s| s.to_string()).as_deref(),
            Some("Invalid number of arguments, expected 1, got 2")
        );
    }

    #[test]
    fn test_unsupported_by_does_not_nest() {
        let err = InteropError::unsupported_by(InteropError::unsupported());
        assert!(matches!(err, InteropError::UnsupportedMessage(None)));
    }

    #[test]
    fn test_from_runtime_error() {
        let err = InteropError::from(RuntimeError::ArityMismatch {
            name: "f".to_string(),
            expected: 1,
            actual: 0,
        });
        assert!(matches!(
            err,
            InteropError::Arity {
                expected: 1,
                actual: 0
            }
        ));

        let err = InteropError::from(RuntimeError::RecursionError(10));
        assert!(matches!(err, InteropError::Runtime(_)));
    }
}
