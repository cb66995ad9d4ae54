use smallvec::SmallVec;
use tracing::trace;

use crate::{
    builtins::Builtins,
    context::Context,
    error::RuntimeError,
    frame::MethodFrame,
    interop::ForeignObject,
    value::Value,
};

pub type Arguments = SmallVec<[Value; 4]>;

/// The context and call depth a call made through the host protocol runs at.
///
/// Calls that pass through a proxy or host callback and come back into the interpreter
/// continue at the caller's depth, so the call depth limit also holds across the boundary.
#[derive(Debug, Clone, Copy)]
pub struct Caller<'a> {
    context: &'a Context,
    depth: u32,
}

impl<'a> Caller<'a> {
    /// A caller outside any running method: the callee runs as a top-level call.
    pub fn host(context: &'a Context) -> Self {
        Self { context, depth: 0 }
    }

    pub fn context(&self) -> &'a Context {
        self.context
    }

    /// The depth the callee runs at.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn call(
        &self,
        method: &MethodFrame,
        arguments: impl IntoIterator<Item = Value>,
    ) -> Result<Value, RuntimeError> {
        enter(self.context, method, arguments, self.depth)
    }
}

/// The state of one running method call: its arguments, local slots and call depth.
#[derive(Debug)]
pub struct CallFrame<'a> {
    context: &'a Context,
    arguments: Arguments,
    locals: Vec<Option<Value>>,
    depth: u32,
}

impl<'a> CallFrame<'a> {
    pub fn context(&self) -> &'a Context {
        self.context
    }

    pub fn builtins(&self) -> &'a Builtins {
        self.context.builtins()
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn arguments(&self) -> &[Value] {
        &self.arguments
    }

    pub fn argument(&self, index: usize) -> Option<&Value> {
        self.arguments.get(index)
    }

    pub fn local(&self, slot: usize) -> Result<&Value, RuntimeError> {
        self.locals
            .get(slot)
            .and_then(Option::as_ref)
            .ok_or(RuntimeError::UndefinedSlot(slot))
    }

    pub fn set_local(&mut self, slot: usize, value: Value) -> Result<(), RuntimeError> {
        let local = self
            .locals
            .get_mut(slot)
            .ok_or(RuntimeError::UndefinedSlot(slot))?;
        *local = Some(value);
        Ok(())
    }

    /// The caller handed to foreign objects invoked from this frame.
    pub fn caller(&self) -> Caller<'a> {
        Caller {
            context: self.context,
            depth: self.depth + 1,
        }
    }

    /// Calls `method` one level deeper than this frame.
    pub fn invoke(
        &self,
        method: &MethodFrame,
        arguments: impl IntoIterator<Item = Value>,
    ) -> Result<Value, RuntimeError> {
        self.caller().call(method, arguments)
    }

    /// Calls any executable value: interpreter functions run as nested calls, host
    /// values go through the foreign protocol.
    pub fn execute_value(
        &self,
        callee: &Value,
        arguments: Arguments,
    ) -> Result<Value, RuntimeError> {
        match callee {
            Value::Function(function) => self.invoke(function.frame(), arguments),
            _ if callee.is_executable() => Ok(callee.execute(&arguments, self.caller())?),
            _ => Err(RuntimeError::NotExecutable(callee.to_string())),
        }
    }
}

pub(crate) fn enter(
    context: &Context,
    method: &MethodFrame,
    arguments: impl IntoIterator<Item = Value>,
    depth: u32,
) -> Result<Value, RuntimeError> {
    if depth > context.options().max_call_depth {
        return Err(RuntimeError::RecursionError(depth));
    }

    let arguments: Arguments = arguments.into_iter().collect();
    let arity = method.scope().arity();
    if arguments.len() != arity {
        return Err(RuntimeError::ArityMismatch {
            name: method.qualified_name().to_string(),
            expected: arity,
            actual: arguments.len(),
        });
    }

    trace!(method = %method.qualified_name(), depth, "Enter");

    let mut frame = CallFrame {
        context,
        arguments,
        locals: vec![None; method.scope().local_count()],
        depth,
    };
    method.execute(&mut frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Shared,
        frame::FrameHeader,
        interop::HostFunction,
        node::{ExecutableNode, basic::ReadArgumentNode},
        scope::LocalScope,
        types::Type,
    };
    use rstest::rstest;

    fn identity() -> MethodFrame {
        MethodFrame::new(
            FrameHeader::new(
                "Main",
                Shared::new(Type::new("Main")),
                "identity",
                LocalScope::new(["x"], 1),
            ),
            ReadArgumentNode::new(0).into_tree(),
        )
    }

    #[test]
    fn test_enter_checks_arity() {
        let context = Context::new();
        let method = identity();

        assert_eq!(
            enter(&context, &method, [Value::Integer(1)], 0).unwrap(),
            Value::Integer(1)
        );
        assert!(matches!(
            enter(&context, &method, [], 0),
            Err(RuntimeError::ArityMismatch {
                expected: 1,
                actual: 0,
                ..
            })
        ));
    }

    #[test]
    fn test_enter_checks_depth() {
        let mut context = Context::new();
        context.set_max_call_depth(4);
        let method = identity();

        assert!(enter(&context, &method, [Value::Nothing], 4).is_ok());
        assert!(matches!(
            enter(&context, &method, [Value::Nothing], 5),
            Err(RuntimeError::RecursionError(5))
        ));
    }

    #[test]
    fn test_caller_continues_at_frame_depth() {
        let mut context = Context::new();
        context.set_max_call_depth(4);
        let method = identity();
        let frame = CallFrame {
            context: &context,
            arguments: Arguments::new(),
            locals: Vec::new(),
            depth: 4,
        };

        assert_eq!(Caller::host(&context).depth(), 0);
        assert_eq!(
            Caller::host(&context).call(&method, [Value::Integer(1)]).unwrap(),
            Value::Integer(1)
        );
        assert_eq!(frame.caller().depth(), 5);
        assert!(matches!(
            frame.caller().call(&method, [Value::Nothing]),
            Err(RuntimeError::RecursionError(5))
        ));
    }

    #[test]
    fn test_locals() {
        let context = Context::new();
        let mut frame = CallFrame {
            context: &context,
            arguments: Arguments::new(),
            locals: vec![None; 1],
            depth: 0,
        };

        assert!(matches!(frame.local(0), Err(RuntimeError::UndefinedSlot(0))));
        frame.set_local(0, Value::Integer(9)).unwrap();
        assert_eq!(frame.local(0).unwrap(), &Value::Integer(9));
        assert!(matches!(
            frame.set_local(1, Value::Nothing),
            Err(RuntimeError::UndefinedSlot(1))
        ));
    }

    #[rstest]
    #[case::host(
        Value::foreign(HostFunction::new("inc", 1, |args| match args {
            [Value::Integer(i)] => Ok(Value::Integer(i + 1)),
            _ => Err(crate::interop::InteropError::unsupported()),
        })),
        Ok(Value::Integer(2))
    )]
    #[case::function(
        Value::Function(crate::value::Function::new(Shared::new(identity()))),
        Ok(Value::Integer(1))
    )]
    #[case::not_executable(Value::from("text"), Err(()))]
    fn test_execute_value(#[case] callee: Value, #[case] expected: Result<Value, ()>) {
        let context = Context::new();
        let frame = CallFrame {
            context: &context,
            arguments: Arguments::new(),
            locals: Vec::new(),
            depth: 0,
        };

        let mut arguments = Arguments::new();
        arguments.push(Value::Integer(1));
        match expected {
            Ok(value) => assert_eq!(frame.execute_value(&callee, arguments).unwrap(), value),
            Err(()) => assert!(matches!(
                frame.execute_value(&callee, arguments),
                Err(RuntimeError::NotExecutable(_))
            )),
        }
    }
}
