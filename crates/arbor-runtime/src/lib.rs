//! `arbor-runtime` is the execution core of the arbor interpreter: compiled methods as
//! lazily materialized executable trees, and the layer exposing interpreter values to a
//! polyglot host.
//!
//! ## Examples
//!
//! ```rust
//! use arbor_runtime::{
//!     Context, ExecutableNode, FrameHeader, LocalScope, MethodFrame, Shared, Type, Value,
//!     node::basic::LiteralNode,
//! };
//!
//! let context = Context::new();
//! let vector = Shared::new(Type::new("Vector"));
//! let header = FrameHeader::new("Standard.Base", vector, "length", LocalScope::new(["self"], 0));
//!
//! // The body is only built when the method is first called.
//! let frame = MethodFrame::lazy(header, || Ok(LiteralNode::new(Value::Integer(3)).into_tree()));
//! assert_eq!(frame.qualified_name(), "Standard.Base::Vector::length");
//! assert!(!frame.is_materialized());
//!
//! assert_eq!(frame.call(&context, [Value::Nothing]).unwrap(), Value::Integer(3));
//! assert!(frame.is_materialized());
//! ```
//!
//! Interop values answer the [`ForeignObject`] protocol:
//!
//! ```rust
//! use arbor_runtime::{ArrayProxy, Caller, Context, ForeignObject, HostFunction, TimeZone, Value};
//!
//! let context = Context::new();
//! let squares = Value::foreign(HostFunction::new("square", 1, |args| match args {
//!     [Value::Integer(i)] => Ok(Value::Integer(i * i)),
//!     _ => Err(arbor_runtime::InteropError::unsupported()),
//! }));
//! let proxy = ArrayProxy::new(5, squares);
//! assert_eq!(proxy.read_array_element(4, Caller::host(&context)).unwrap(), Value::Integer(16));
//!
//! let zone = TimeZone::from_offset(1, 30, 0).unwrap();
//! assert_eq!(zone.zone_id(), "+01:30");
//! ```
mod builtins;
mod call;
mod context;
mod error;
mod frame;
mod interop;
pub mod node;
mod options;
pub mod primitives;
mod qualified_name;
mod range;
mod scope;
mod types;
mod value;

/// Shared ownership handle used for trees, frames and values.
pub type Shared<T> = std::sync::Arc<T>;

pub use builtins::Builtins;
pub use call::{CallFrame, Caller};
pub use context::{Context, Instrumentation};
pub use error::{CompilerError, Error, PanicException, RuntimeError};
pub use frame::{FrameHeader, FrameKind, MethodFrame, constructor_for};
pub use interop::{
    ArrayProxy, ForeignObject, HostDateTime, HostFunction, InteropError, OffsetPrefix, TimeZone,
    Zone,
};
pub use node::{ExecutableNode, Tree, walk};
pub use options::{DEFAULT_MAX_CALL_DEPTH, Options, OptionsError};
pub use qualified_name::{METHOD_SEPARATOR, ModuleName, QualifiedName};
pub use range::{Position, Range, SourceSection};
pub use scope::{LocalScope, ModuleScope};
pub use types::{Atom, AtomConstructor, Type};
pub use value::{Function, Value};
