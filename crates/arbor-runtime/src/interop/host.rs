//! Values handed to the interpreter by the polyglot host.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use smol_str::SmolStr;
use std::fmt;

use super::{ForeignObject, InteropError};
use crate::{Shared, call::Caller, value::Value};

/// A host side local date-time exposing its date and time components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostDateTime(NaiveDateTime);

impl HostDateTime {
    pub fn new(date_time: NaiveDateTime) -> Self {
        Self(date_time)
    }
}

impl From<NaiveDateTime> for HostDateTime {
    fn from(date_time: NaiveDateTime) -> Self {
        Self(date_time)
    }
}

impl ForeignObject for HostDateTime {
    fn to_display_string(&self) -> String {
        self.0.to_string()
    }

    fn is_date(&self) -> bool {
        true
    }

    fn as_date(&self) -> Result<NaiveDate, InteropError> {
        Ok(self.0.date())
    }

    fn is_time(&self) -> bool {
        true
    }

    fn as_time(&self) -> Result<NaiveTime, InteropError> {
        Ok(self.0.time())
    }
}

type HostCallback = dyn Fn(&[Value]) -> Result<Value, InteropError> + Send + Sync;

/// A host callable with a fixed arity.
#[derive(Clone)]
pub struct HostFunction {
    name: SmolStr,
    arity: usize,
    callback: Shared<HostCallback>,
}

impl HostFunction {
    pub fn new(
        name: impl Into<SmolStr>,
        arity: usize,
        callback: impl Fn(&[Value]) -> Result<Value, InteropError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            arity,
            callback: Shared::new(callback),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for HostFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostFunction")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

impl ForeignObject for HostFunction {
    fn to_display_string(&self) -> String {
        format!("<host function {}>", self.name)
    }

    fn is_executable(&self) -> bool {
        true
    }

    fn execute(&self, arguments: &[Value], _caller: Caller<'_>) -> Result<Value, InteropError> {
        if arguments.len() != self.arity {
            return Err(InteropError::Arity {
                expected: self.arity,
                actual: arguments.len(),
            });
        }
        (self.callback)(arguments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;

    #[test]
    fn test_host_date_time_components() {
        let date_time = NaiveDate::from_ymd_opt(2024, 7, 1)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap();
        let host = HostDateTime::from(date_time);

        assert!(host.is_date() && host.is_time());
        assert_eq!(host.as_date().unwrap(), date_time.date());
        assert_eq!(host.as_time().unwrap(), date_time.time());
        assert!(!host.is_executable());
    }

    #[test]
    fn test_host_function_checks_arity() {
        let context = Context::new();
        let add = HostFunction::new("add", 2, |args| match args {
            [Value::Integer(a), Value::Integer(b)] => Ok(Value::Integer(a + b)),
            _ => Err(InteropError::UnsupportedType("integers expected".to_string())),
        });

        assert_eq!(
            add.execute(&[Value::Integer(1), Value::Integer(2)], Caller::host(&context))
                .unwrap(),
            Value::Integer(3)
        );
        assert!(matches!(
            add.execute(&[Value::Integer(1)], Caller::host(&context)),
            Err(InteropError::Arity {
                expected: 2,
                actual: 1
            })
        ));
        assert_eq!(add.name(), "add");
    }
}
