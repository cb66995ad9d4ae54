//! Builtin operations applied by [`BuiltinNode`](crate::node::basic::BuiltinNode).

use crate::{
    call::CallFrame,
    error::RuntimeError,
    interop::{ArrayProxy, ForeignObject, TimeZone},
    value::Value,
};

pub type Primitive = fn(&CallFrame<'_>, &[Value]) -> Result<Value, RuntimeError>;

/// Finds a primitive by the name a compiler refers to it with.
pub fn lookup(name: &str) -> Option<Primitive> {
    let primitive: Primitive = match name {
        "+" => integer_add,
        "-" => integer_subtract,
        "*" => integer_multiply,
        "array_proxy_new" => array_proxy_new,
        "array_length" => array_length,
        "array_at" => array_at,
        "time_zone_parse" => time_zone_parse,
        "time_zone_new" => time_zone_new,
        "time_zone_system" => time_zone_system,
        "time_zone_id" => time_zone_id,
        "time_zone_offset" => time_zone_offset,
        _ => return None,
    };
    Some(primitive)
}

#[inline(always)]
fn expect_arguments<'a, const N: usize>(
    name: &str,
    args: &'a [Value],
) -> Result<&'a [Value; N], RuntimeError> {
    <&[Value; N]>::try_from(args).map_err(|_| RuntimeError::ArityMismatch {
        name: name.to_string(),
        expected: N,
        actual: args.len(),
    })
}

fn arithmetic(
    name: &str,
    args: &[Value],
    integer: fn(i64, i64) -> Option<i64>,
    float: fn(f64, f64) -> f64,
) -> Result<Value, RuntimeError> {
    match expect_arguments::<2>(name, args)? {
        [Value::Integer(a), Value::Integer(b)] => integer(*a, *b)
            .map(Value::Integer)
            .ok_or_else(|| RuntimeError::Overflow(name.to_string())),
        [Value::Float(a), Value::Float(b)] => Ok(Value::Float(float(*a, *b))),
        [Value::Integer(a), Value::Float(b)] => Ok(Value::Float(float(*a as f64, *b))),
        [Value::Float(a), Value::Integer(b)] => Ok(Value::Float(float(*a, *b as f64))),
        _ => Err(RuntimeError::invalid_types(name, args)),
    }
}

pub fn integer_add(_frame: &CallFrame<'_>, args: &[Value]) -> Result<Value, RuntimeError> {
    arithmetic("+", args, i64::checked_add, |a, b| a + b)
}

pub fn integer_subtract(_frame: &CallFrame<'_>, args: &[Value]) -> Result<Value, RuntimeError> {
    arithmetic("-", args, i64::checked_sub, |a, b| a - b)
}

pub fn integer_multiply(_frame: &CallFrame<'_>, args: &[Value]) -> Result<Value, RuntimeError> {
    arithmetic("*", args, i64::checked_mul, |a, b| a * b)
}

/// `array_proxy_new length producer`
pub fn array_proxy_new(_frame: &CallFrame<'_>, args: &[Value]) -> Result<Value, RuntimeError> {
    match expect_arguments::<2>("array_proxy_new", args)? {
        [Value::Integer(length), producer] if *length >= 0 => {
            Ok(Value::from(ArrayProxy::new(length.unsigned_abs(), producer.clone())))
        }
        _ => Err(RuntimeError::invalid_types("array_proxy_new", args)),
    }
}

pub fn array_length(_frame: &CallFrame<'_>, args: &[Value]) -> Result<Value, RuntimeError> {
    let [array] = expect_arguments::<1>("array_length", args)?;
    let size = array.array_size()?;
    i64::try_from(size)
        .map(Value::Integer)
        .map_err(|_| RuntimeError::Overflow("array_length".to_string()))
}

pub fn array_at(frame: &CallFrame<'_>, args: &[Value]) -> Result<Value, RuntimeError> {
    match expect_arguments::<2>("array_at", args)? {
        [array, Value::Integer(index)] => Ok(array.read_array_element(*index, frame.caller())?),
        _ => Err(RuntimeError::invalid_types("array_at", args)),
    }
}

pub fn time_zone_parse(_frame: &CallFrame<'_>, args: &[Value]) -> Result<Value, RuntimeError> {
    match expect_arguments::<1>("time_zone_parse", args)? {
        [Value::Text(id)] => Ok(Value::TimeZone(TimeZone::parse(id)?)),
        _ => Err(RuntimeError::invalid_types("time_zone_parse", args)),
    }
}

/// `time_zone_new hours minutes seconds`
pub fn time_zone_new(_frame: &CallFrame<'_>, args: &[Value]) -> Result<Value, RuntimeError> {
    match expect_arguments::<3>("time_zone_new", args)? {
        [
            Value::Integer(hours),
            Value::Integer(minutes),
            Value::Integer(seconds),
        ] => Ok(Value::TimeZone(TimeZone::from_offset(
            *hours, *minutes, *seconds,
        )?)),
        _ => Err(RuntimeError::invalid_types("time_zone_new", args)),
    }
}

pub fn time_zone_system(_frame: &CallFrame<'_>, args: &[Value]) -> Result<Value, RuntimeError> {
    expect_arguments::<0>("time_zone_system", args)?;
    Ok(Value::TimeZone(TimeZone::system()))
}

pub fn time_zone_id(_frame: &CallFrame<'_>, args: &[Value]) -> Result<Value, RuntimeError> {
    let [zone] = expect_arguments::<1>("time_zone_id", args)?;
    Ok(Value::from(zone.as_time_zone()?.id()))
}

/// `time_zone_offset zone at`, in seconds.
pub fn time_zone_offset(_frame: &CallFrame<'_>, args: &[Value]) -> Result<Value, RuntimeError> {
    let [zone, at] = expect_arguments::<2>("time_zone_offset", args)?;
    let zone = TimeZone::new(zone.as_time_zone()?);
    Ok(Value::Integer(zone.offset(at)))
}
