use miette::{Diagnostic, SourceOffset, SourceSpan};
use std::fmt;
use thiserror::Error;

use crate::{interop::InteropError, range::SourceSection, value::Value};

/// Raised by the external compiler when a lazily supplied tree cannot be built.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct CompilerError {
    message: String,
}

impl CompilerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A non-resumable fault carrying a language level payload.
#[derive(Debug, Clone, PartialEq)]
pub struct PanicException {
    payload: Value,
    location: Option<SourceSection>,
}

impl PanicException {
    pub fn new(payload: Value, location: Option<SourceSection>) -> Self {
        Self { payload, location }
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn location(&self) -> Option<&SourceSection> {
        self.location.as_ref()
    }
}

impl fmt::Display for PanicException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.payload)
    }
}

impl std::error::Error for PanicException {}

#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Panic: {0}")]
    Panic(PanicException),
    #[error("Invalid number of arguments in \"{name}\", expected {expected}, got {actual}")]
    ArityMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
    #[error("\"{0}\" is not executable")]
    NotExecutable(String),
    #[error(r#"Invalid types for "{name}", got {actual}"#)]
    InvalidTypes { name: String, actual: String },
    #[error("Method \"{0}\" is not defined")]
    MethodNotFound(String),
    #[error("No method \"{method}\" on type {type_name}")]
    NoSuchMethod { type_name: String, method: String },
    #[error("Local slot {0} is not defined")]
    UndefinedSlot(usize),
    #[error("Integer overflow in \"{0}\"")]
    Overflow(String),
    #[error("Maximum recursion depth exceeded \"{0}\"")]
    RecursionError(u32),
    #[error(transparent)]
    Interop(#[from] InteropError),
}

impl RuntimeError {
    #[cold]
    pub fn location(&self) -> Option<&SourceSection> {
        match self {
            RuntimeError::Panic(panic) => panic.location(),
            RuntimeError::ArityMismatch { .. }
            | RuntimeError::NotExecutable(_)
            | RuntimeError::InvalidTypes { .. }
            | RuntimeError::MethodNotFound(_)
            | RuntimeError::NoSuchMethod { .. }
            | RuntimeError::UndefinedSlot(_)
            | RuntimeError::Overflow(_)
            | RuntimeError::RecursionError(_)
            | RuntimeError::Interop(_) => None,
        }
    }

    pub fn invalid_types(name: impl Into<String>, args: &[Value]) -> Self {
        RuntimeError::InvalidTypes {
            name: name.into(),
            actual: args
                .iter()
                .map(Value::name)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

/// Represents a runtime error with diagnostic information for the user.
#[derive(Debug, Error)]
#[error("{cause}")]
pub struct Error {
    /// The underlying cause of the error.
    pub cause: RuntimeError,
    /// The source code of the module the error was raised in.
    pub source_code: String,
    /// The location in the source code for diagnostics.
    pub location: SourceSpan,
}

impl Error {
    pub fn from_error(source_code: impl Into<String>, cause: RuntimeError) -> Self {
        let source_code = source_code.into();
        let location = match cause.location() {
            Some(section) => {
                let range = section.range;
                let start = SourceOffset::from_location(
                    &source_code,
                    range.start.line as usize,
                    range.start.column,
                );
                let end = SourceOffset::from_location(
                    &source_code,
                    range.end.line as usize,
                    range.end.column,
                );
                SourceSpan::new(
                    start,
                    std::cmp::max(end.offset().saturating_sub(start.offset()), 1),
                )
            }
            None => SourceSpan::new(SourceOffset::from_location(&source_code, 0, 0), 1),
        };

        Self {
            cause,
            source_code,
            location,
        }
    }
}

impl Diagnostic for Error {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let c = match &self.cause {
            RuntimeError::Panic(_) => "RuntimeError::Panic",
            RuntimeError::ArityMismatch { .. } => "RuntimeError::ArityMismatch",
            RuntimeError::NotExecutable(_) => "RuntimeError::NotExecutable",
            RuntimeError::InvalidTypes { .. } => "RuntimeError::InvalidTypes",
            RuntimeError::MethodNotFound(_) => "RuntimeError::MethodNotFound",
            RuntimeError::NoSuchMethod { .. } => "RuntimeError::NoSuchMethod",
            RuntimeError::UndefinedSlot(_) => "RuntimeError::UndefinedSlot",
            RuntimeError::Overflow(_) => "RuntimeError::Overflow",
            RuntimeError::RecursionError(_) => "RuntimeError::RecursionError",
            RuntimeError::Interop(InteropError::InvalidArrayIndex(_)) => {
                "InteropError::InvalidArrayIndex"
            }
            RuntimeError::Interop(InteropError::UnsupportedMessage(_)) => {
                "InteropError::UnsupportedMessage"
            }
            RuntimeError::Interop(InteropError::Arity { .. }) => "InteropError::Arity",
            RuntimeError::Interop(InteropError::UnsupportedType(_)) => {
                "InteropError::UnsupportedType"
            }
            RuntimeError::Interop(InteropError::InvalidDateTime(_)) => {
                "InteropError::InvalidDateTime"
            }
            RuntimeError::Interop(InteropError::ZoneRules { .. }) => "InteropError::ZoneRules",
            RuntimeError::Interop(InteropError::Runtime(_)) => "InteropError::Runtime",
        };

        Some(Box::new(c))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let msg = match &self.cause {
            RuntimeError::Panic(_) => Some(
                "The method body could not be executed. Check the reported compile error."
                    .to_string(),
            ),
            RuntimeError::ArityMismatch {
                expected, actual, ..
            } => Some(format!(
                "Invalid number of arguments: expected {expected}, got {actual}."
            )),
            RuntimeError::MethodNotFound(name) => Some(format!(
                "'{name}' is not defined. Is the module that defines it loaded?"
            )),
            RuntimeError::RecursionError(_) => Some(
                "Recursion limit reached. Raise `max_call_depth` or check for infinite recursion."
                    .to_string(),
            ),
            RuntimeError::Interop(InteropError::InvalidArrayIndex(_)) => {
                Some("Index out of bounds. Check your array indices.".to_string())
            }
            RuntimeError::Interop(InteropError::InvalidDateTime(_))
            | RuntimeError::Interop(InteropError::ZoneRules { .. }) => Some(
                "Invalid time zone. Use a region like `Europe/Warsaw` or an offset like `+01:30`."
                    .to_string(),
            ),
            _ => None,
        };

        msg.map(|m| Box::new(m) as Box<dyn fmt::Display>)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = miette::LabeledSpan> + '_>> {
        Some(Box::new(std::iter::once(
            miette::LabeledSpan::new_with_span(Some(format!("{}", self.cause)), self.location),
        )))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.source_code)
    }
}
