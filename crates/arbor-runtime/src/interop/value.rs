use chrono::{NaiveDate, NaiveTime};

use super::{ForeignObject, InteropError, Zone};
use crate::{Shared, builtins::Builtins, call::Caller, types::Type, value::Value};

// Interpreter values answer the host protocol directly, proxies and host objects
// forward to their own implementation.
impl ForeignObject for Value {
    fn to_display_string(&self) -> String {
        self.to_string()
    }

    fn has_meta_object(&self) -> bool {
        match self {
            Value::Foreign(object) => object.has_meta_object(),
            _ => true,
        }
    }

    fn meta_object(&self, builtins: &Builtins) -> Result<Shared<Type>, InteropError> {
        match self {
            Value::Foreign(object) => object.meta_object(builtins),
            _ => Ok(self.type_of(builtins)),
        }
    }

    fn has_type(&self) -> bool {
        match self {
            Value::Foreign(object) => object.has_type(),
            _ => true,
        }
    }

    fn type_of(&self, builtins: &Builtins) -> Result<Shared<Type>, InteropError> {
        match self {
            Value::Foreign(object) => object.type_of(builtins),
            _ => Ok(Value::type_of(self, builtins)),
        }
    }

    fn has_array_elements(&self) -> bool {
        match self {
            Value::Array(_) => true,
            Value::ArrayProxy(proxy) => proxy.has_array_elements(),
            Value::Foreign(object) => object.has_array_elements(),
            _ => false,
        }
    }

    fn array_size(&self) -> Result<u64, InteropError> {
        match self {
            Value::Array(items) => Ok(items.len() as u64),
            Value::ArrayProxy(proxy) => proxy.array_size(),
            Value::Foreign(object) => object.array_size(),
            _ => Err(InteropError::unsupported()),
        }
    }

    fn is_array_element_readable(&self, index: i64) -> bool {
        match self {
            Value::Array(items) => usize::try_from(index).is_ok_and(|i| i < items.len()),
            Value::ArrayProxy(proxy) => proxy.is_array_element_readable(index),
            Value::Foreign(object) => object.is_array_element_readable(index),
            _ => false,
        }
    }

    fn read_array_element(&self, index: i64, caller: Caller<'_>) -> Result<Value, InteropError> {
        match self {
            Value::Array(items) => usize::try_from(index)
                .ok()
                .and_then(|i| items.get(i))
                .cloned()
                .ok_or(InteropError::InvalidArrayIndex(index)),
            Value::ArrayProxy(proxy) => proxy.read_array_element(index, caller),
            Value::Foreign(object) => object.read_array_element(index, caller),
            _ => Err(InteropError::unsupported()),
        }
    }

    fn is_time_zone(&self) -> bool {
        match self {
            Value::TimeZone(_) => true,
            Value::Foreign(object) => object.is_time_zone(),
            _ => false,
        }
    }

    fn as_time_zone(&self) -> Result<Zone, InteropError> {
        match self {
            Value::TimeZone(zone) => Ok(zone.zone()),
            Value::Foreign(object) => object.as_time_zone(),
            _ => Err(InteropError::unsupported()),
        }
    }

    fn is_date(&self) -> bool {
        match self {
            Value::Date(_) | Value::DateTime(_) => true,
            Value::Foreign(object) => object.is_date(),
            _ => false,
        }
    }

    fn as_date(&self) -> Result<NaiveDate, InteropError> {
        match self {
            Value::Date(date) => Ok(*date),
            Value::DateTime(date_time) => Ok(date_time.date()),
            Value::Foreign(object) => object.as_date(),
            _ => Err(InteropError::unsupported()),
        }
    }

    fn is_time(&self) -> bool {
        match self {
            Value::TimeOfDay(_) | Value::DateTime(_) => true,
            Value::Foreign(object) => object.is_time(),
            _ => false,
        }
    }

    fn as_time(&self) -> Result<NaiveTime, InteropError> {
        match self {
            Value::TimeOfDay(time) => Ok(*time),
            Value::DateTime(date_time) => Ok(date_time.time()),
            Value::Foreign(object) => object.as_time(),
            _ => Err(InteropError::unsupported()),
        }
    }

    fn is_executable(&self) -> bool {
        match self {
            Value::Function(_) => true,
            Value::Foreign(object) => object.is_executable(),
            _ => false,
        }
    }

    fn execute(&self, arguments: &[Value], caller: Caller<'_>) -> Result<Value, InteropError> {
        match self {
            Value::Function(function) => caller
                .call(function.frame(), arguments.iter().cloned())
                .map_err(InteropError::from),
            Value::Foreign(object) => object.execute(arguments, caller),
            _ => Err(InteropError::unsupported()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        context::Context,
        interop::{ArrayProxy, HostDateTime, HostFunction, TimeZone},
    };
    use chrono::NaiveDateTime;
    use rstest::rstest;

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 7, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[rstest]
    #[case(0, Some(Value::Integer(10)))]
    #[case(2, Some(Value::Integer(30)))]
    #[case(3, None)]
    #[case(-1, None)]
    fn test_native_array_elements(#[case] index: i64, #[case] expected: Option<Value>) {
        let context = Context::new();
        let array = Value::array([10, 20, 30].map(Value::Integer));

        assert!(array.has_array_elements());
        assert_eq!(array.array_size().unwrap(), 3);
        assert_eq!(array.is_array_element_readable(index), expected.is_some());
        match expected {
            Some(value) => assert_eq!(
                array
                    .read_array_element(index, Caller::host(&context))
                    .unwrap(),
                value
            ),
            None => assert!(matches!(
                array.read_array_element(index, Caller::host(&context)),
                Err(InteropError::InvalidArrayIndex(i)) if i == index
            )),
        }
    }

    #[test]
    fn test_proxy_value_delegates() {
        let context = Context::new();
        let producer = Value::foreign(HostFunction::new("double", 1, |args| match args {
            [Value::Integer(i)] => Ok(Value::Integer(i * 2)),
            _ => Err(InteropError::unsupported()),
        }));
        let proxy = Value::from(ArrayProxy::new(4, producer));

        assert_eq!(proxy.array_size().unwrap(), 4);
        assert_eq!(
            proxy.read_array_element(3, Caller::host(&context)).unwrap(),
            Value::Integer(6)
        );
        assert_eq!(
            ForeignObject::type_of(&proxy, context.builtins()).unwrap().name(),
            "Array"
        );
    }

    #[test]
    fn test_instant_components() {
        let date_time = Value::DateTime(noon());
        assert_eq!(date_time.as_date().unwrap(), noon().date());
        assert_eq!(date_time.as_time().unwrap(), noon().time());

        let date = Value::Date(noon().date());
        assert!(date.is_date() && !date.is_time());
        assert!(date.as_time().is_err());

        let host = Value::foreign(HostDateTime::new(noon()));
        assert_eq!(host.as_time().unwrap(), noon().time());
    }

    #[test]
    fn test_time_zone_value() {
        let zone = TimeZone::from_offset(-3, 0, 0).unwrap();
        let value = Value::from(zone);
        assert!(value.is_time_zone());
        assert_eq!(value.as_time_zone().unwrap(), zone.zone());
        assert_eq!(value.to_display_string(), "-03:00");
        assert!(Value::Integer(1).as_time_zone().is_err());
    }

    #[test]
    fn test_non_executable_value() {
        let context = Context::new();
        assert!(!Value::from("text").is_executable());
        assert!(matches!(
            Value::from("text").execute(&[], Caller::host(&context)),
            Err(InteropError::UnsupportedMessage(None))
        ));
    }
}
