use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use itertools::Itertools;
use smol_str::SmolStr;
use std::fmt;

use crate::{
    Shared,
    builtins::Builtins,
    frame::MethodFrame,
    interop::{ArrayProxy, ForeignObject, TimeZone},
    types::{Atom, Type},
};

#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Nothing,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(SmolStr),
    Array(Shared<Vec<Value>>),
    Atom(Shared<Atom>),
    Function(Function),
    Date(NaiveDate),
    TimeOfDay(NaiveTime),
    DateTime(NaiveDateTime),
    TimeZone(TimeZone),
    ArrayProxy(Shared<ArrayProxy>),
    /// A value owned by the polyglot host.
    Foreign(Shared<dyn ForeignObject>),
}

impl Value {
    pub fn array(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Array(Shared::new(items.into_iter().collect()))
    }

    pub fn foreign(object: impl ForeignObject + 'static) -> Self {
        Value::Foreign(Shared::new(object))
    }

    /// The language level type of this value. Host values without a type are `Any`.
    pub fn type_of(&self, builtins: &Builtins) -> Shared<Type> {
        let ty = match self {
            Value::Nothing => builtins.nothing(),
            Value::Boolean(_) => builtins.boolean(),
            Value::Integer(_) => builtins.integer(),
            Value::Float(_) => builtins.float(),
            Value::Text(_) => builtins.text(),
            Value::Array(_) | Value::ArrayProxy(_) => builtins.array(),
            Value::Atom(atom) => atom.constructor().owner(),
            Value::Function(_) => builtins.function(),
            Value::Date(_) => builtins.date(),
            Value::TimeOfDay(_) => builtins.time_of_day(),
            Value::DateTime(_) => builtins.date_time(),
            Value::TimeZone(_) => builtins.time_zone(),
            Value::Foreign(object) => {
                return object
                    .type_of(builtins)
                    .unwrap_or_else(|_| Shared::clone(builtins.any()));
            }
        };
        Shared::clone(ty)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Value::Nothing => "nothing",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Array(_) => "array",
            Value::Atom(_) => "atom",
            Value::Function(_) => "function",
            Value::Date(_) => "date",
            Value::TimeOfDay(_) => "time_of_day",
            Value::DateTime(_) => "date_time",
            Value::TimeZone(_) => "time_zone",
            Value::ArrayProxy(_) => "array_proxy",
            Value::Foreign(_) => "foreign",
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Value::Function(function) => Some(function),
            _ => None,
        }
    }
}

// Array proxies, host objects and functions compare by identity, everything else
// structurally.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nothing, Value::Nothing) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Atom(a), Value::Atom(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::TimeOfDay(a), Value::TimeOfDay(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::TimeZone(a), Value::TimeZone(b)) => a == b,
            (Value::ArrayProxy(a), Value::ArrayProxy(b)) => Shared::ptr_eq(a, b),
            (Value::Foreign(a), Value::Foreign(b)) => Shared::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nothing => write!(f, "Nothing"),
            Value::Boolean(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{n:?}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Array(items) => write!(f, "[{}]", items.iter().join(", ")),
            Value::Atom(atom) => write!(f, "{atom}"),
            Value::Function(function) => write!(f, "{function}"),
            Value::Date(date) => write!(f, "{date}"),
            Value::TimeOfDay(time) => write!(f, "{time}"),
            Value::DateTime(date_time) => write!(f, "{}", date_time.format("%Y-%m-%dT%H:%M:%S")),
            Value::TimeZone(zone) => write!(f, "{zone}"),
            Value::ArrayProxy(proxy) => write!(f, "{proxy}"),
            Value::Foreign(object) => write!(f, "{}", object.to_display_string()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s.into())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(Shared::new(items))
    }
}

impl From<Function> for Value {
    fn from(function: Function) -> Self {
        Value::Function(function)
    }
}

impl From<TimeZone> for Value {
    fn from(zone: TimeZone) -> Self {
        Value::TimeZone(zone)
    }
}

impl From<ArrayProxy> for Value {
    fn from(proxy: ArrayProxy) -> Self {
        Value::ArrayProxy(Shared::new(proxy))
    }
}

impl From<NaiveDateTime> for Value {
    fn from(date_time: NaiveDateTime) -> Self {
        Value::DateTime(date_time)
    }
}

/// A callable value. Calling it runs the body of the frame it points to.
#[derive(Clone)]
pub struct Function {
    frame: Shared<MethodFrame>,
}

impl Function {
    pub fn new(frame: Shared<MethodFrame>) -> Self {
        Self { frame }
    }

    pub fn frame(&self) -> &Shared<MethodFrame> {
        &self.frame
    }

    pub fn arity(&self) -> usize {
        self.frame.scope().arity()
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        Shared::ptr_eq(&self.frame, &other.frame)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Function")
            .field(&self.frame.qualified_name())
            .finish()
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.frame.short_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::nothing(Value::Nothing, "Nothing")]
    #[case::boolean(Value::Boolean(true), "True")]
    #[case::integer(Value::Integer(42), "42")]
    #[case::float(Value::Float(1.5), "1.5")]
    #[case::whole_float(Value::Float(2.0), "2.0")]
    #[case::text(Value::from("hello"), "hello")]
    #[case::array(Value::array([Value::Integer(1), Value::from("a")]), "[1, a]")]
    #[case::date_time(
        Value::DateTime(
            NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(10, 5, 0)
                .unwrap()
        ),
        "2024-03-01T10:05:00"
    )]
    fn test_display(#[case] value: Value, #[case] expected: &str) {
        assert_eq!(value.to_string(), expected);
    }

    #[rstest]
    #[case::integer(Value::Integer(1), "Integer")]
    #[case::text(Value::from("a"), "Text")]
    #[case::array(Value::array(Vec::new()), "Array")]
    #[case::zone(Value::TimeZone(TimeZone::utc()), "Time_Zone")]
    #[case::proxy(Value::from(ArrayProxy::new(0, Value::Nothing)), "Array")]
    fn test_type_of(#[case] value: Value, #[case] expected: &str) {
        let builtins = Builtins::new();
        assert_eq!(value.type_of(&builtins).name(), expected);
    }

    #[test]
    fn test_reference_values_compare_by_identity() {
        let proxy = Value::from(ArrayProxy::new(3, Value::Nothing));
        let same = proxy.clone();
        let other = Value::from(ArrayProxy::new(3, Value::Nothing));
        assert_eq!(proxy, same);
        assert_ne!(proxy, other);
    }

    #[test]
    fn test_arrays_compare_structurally() {
        let array = Value::array([Value::Integer(1), Value::from("a")]);
        assert_eq!(array, Value::array([Value::Integer(1), Value::from("a")]));
        assert_ne!(array, Value::array([Value::Integer(1)]));
    }
}
